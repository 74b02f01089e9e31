//! UI rendering for the TUI

use chrono::{Datelike, Local, NaiveDate};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table,
        Tabs, Wrap,
    },
};

use super::state::{AppState, Mode, Tab};
use crate::calendar::{CalendarView, posts_on};
use crate::models::{KpiSummary, Post, Trend};
use crate::theme::ThemeColors;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ICON: &str = "📅";
const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Main render function
pub fn render(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();

    let area = frame.area();
    let bg_block = Block::default().style(Style::default().bg(colors.bg));
    frame.render_widget(bg_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_tabs(frame, state, chunks[0]);
    match state.tab {
        Tab::Calendar => render_calendar_tab(frame, state, chunks[1]),
        Tab::List => render_list_tab(frame, state, chunks[1]),
        Tab::Brands => render_brands_tab(frame, state, chunks[1]),
        Tab::Kpis => render_kpis_tab(frame, state, chunks[1]),
    }
    render_status_bar(frame, state, chunks[2]);

    match state.mode {
        Mode::Help => render_help_popup(frame, state),
        Mode::Search => render_search_popup(frame, state),
        Mode::ConfirmDelete => render_confirm_popup(frame, state),
        Mode::Normal => {}
    }
}

fn render_tabs(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();

    let titles: Vec<Line> = Tab::all()
        .iter()
        .map(|tab| {
            let marker = if *tab == state.tab { "●" } else { "○" };
            Line::from(format!("{marker}  {}", tab.name()))
        })
        .collect();

    let brand = state
        .planner
        .current_brand()
        .map_or_else(|| "no brand".to_string(), |b| b.name.clone());

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.block())
                .title(format!(" {ICON} Warp Planner · {brand} "))
                .title_style(colors.logo_style()),
        )
        .select(state.tab.index())
        .style(colors.tab())
        .highlight_style(colors.tab_active())
        .divider(Span::styled(" │ ", colors.text_muted()));

    frame.render_widget(tabs, area);
}

fn rounded_block<'a>(title: impl Into<Line<'a>>, colors: &ThemeColors, focused: bool) -> Block<'a> {
    Block::default()
        .title(title)
        .title_style(colors.text_primary())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused { colors.block_focus() } else { colors.block() })
}

fn empty_hint<'a>(colors: &ThemeColors, message: &'a str, hint: &'a str) -> Vec<Line<'a>> {
    vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  ℹ ", colors.text_info()),
            Span::styled(message, colors.text_muted()),
        ]),
        Line::from(""),
        Line::from(Span::styled(format!("  {hint}"), colors.text_muted())),
    ]
}

// ==================== Calendar ====================

fn render_calendar_tab(frame: &mut Frame, state: &AppState, area: Rect) {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(area);

    let colors = state.theme.colors();
    let title = format!(
        " {} · {} ({}) ",
        state.view.name(),
        state.view.title(state.cursor),
        state.filter.describe()
    );
    let block = rounded_block(title, &colors, true);
    let inner = block.inner(horizontal[0]);
    frame.render_widget(block, horizontal[0]);

    let posts = state.visible_posts();
    match state.view {
        CalendarView::Month | CalendarView::Week => render_grid(frame, state, &posts, inner),
        CalendarView::Day => render_day_view(frame, state, &posts, inner),
    }
    render_day_detail(frame, state, horizontal[1]);
}

/// Month or week grid, one cell per day
fn render_grid(frame: &mut Frame, state: &AppState, posts: &[&Post], area: Rect) {
    let colors = state.theme.colors();
    let days = state.view.visible_days(state.cursor);
    let weeks = days.len().div_ceil(7).max(1);
    let today = Local::now().date_naive();

    let mut rows_constraints = vec![Constraint::Length(1)];
    rows_constraints.extend((0..weeks).map(|_| Constraint::Ratio(1, weeks as u32)));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(rows_constraints)
        .split(area);

    let column_constraints = [Constraint::Ratio(1, 7); 7];
    let header = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(column_constraints)
        .split(rows[0]);
    for (label, cell) in WEEKDAYS.iter().zip(header.iter()) {
        frame.render_widget(
            Paragraph::new(*label)
                .alignment(Alignment::Center)
                .style(colors.text_muted()),
            *cell,
        );
    }

    for (week, chunk) in days.chunks(7).enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(column_constraints)
            .split(rows[week + 1]);
        for (day, cell) in chunk.iter().zip(cells.iter()) {
            render_day_cell(frame, state, &posts_on(posts, *day), *day, today, *cell);
        }
    }
}

fn render_day_cell(
    frame: &mut Frame,
    state: &AppState,
    posts: &[&Post],
    day: NaiveDate,
    today: NaiveDate,
    area: Rect,
) {
    let colors = state.theme.colors();
    let focused = day == state.cursor;
    let in_period = state.view != CalendarView::Month || day.month() == state.cursor.month();

    let number_style = if day == today {
        colors.highlight()
    } else if in_period {
        colors.text()
    } else {
        colors.text_muted()
    };
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused { colors.block_focus() } else { colors.block() })
        .title(Span::styled(format!(" {} ", day.day()), number_style));
    if day == today {
        block = block.style(Style::default().bg(colors.bg_highlight));
    }

    let inner = block.inner(area);
    let capacity = inner.height as usize;
    let mut lines: Vec<Line> = posts
        .iter()
        .take(if posts.len() > capacity { capacity.saturating_sub(1) } else { capacity })
        .map(|post| {
            // code, time and two spaces
            let room = (inner.width as usize).saturating_sub(post.platform.code().width() + 7);
            Line::from(vec![
                Span::styled(post.platform.code(), colors.platform(post.platform)),
                Span::raw(" "),
                Span::styled(post.time_str(), colors.status(post.status)),
                Span::raw(" "),
                Span::styled(fit_width(post.clean_objective(), room), colors.text_muted()),
            ])
        })
        .collect();
    if posts.len() > lines.len() && capacity > 0 {
        lines.push(Line::styled(
            format!("+{} more", posts.len() - lines.len()),
            colors.text_muted(),
        ));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_day_view(frame: &mut Frame, state: &AppState, posts: &[&Post], area: Rect) {
    let colors = state.theme.colors();
    let on_day = posts_on(posts, state.cursor);
    if on_day.is_empty() {
        frame.render_widget(
            Paragraph::new(empty_hint(&colors, "Nothing planned", "Press [ or ] to change day")),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = on_day
        .iter()
        .map(|post| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(post.time_str(), colors.text_primary()),
                    Span::raw("  "),
                    Span::styled(
                        format!("{} {}", post.platform.emoji(), post.platform.name()),
                        colors.platform(post.platform),
                    ),
                    Span::raw("  "),
                    Span::styled(post.status.label(), colors.status(post.status)),
                ]),
                Line::styled(format!("   {}", post.clean_objective()), colors.text()),
                Line::styled(format!("   {}", post.preview(80)), colors.text_muted()),
                Line::from(""),
            ])
        })
        .collect();

    let mut list_state = ListState::default().with_selected(Some(state.day_selection));
    frame.render_stateful_widget(
        List::new(items).highlight_style(colors.selected()),
        area,
        &mut list_state,
    );
}

/// Posts of the focused day with the selected one expanded
fn render_day_detail(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let title = format!(" {} ", state.cursor.format("%a %b %-d"));
    let block = rounded_block(title, &colors, false);

    let day_posts = state.day_posts();
    if day_posts.is_empty() {
        frame.render_widget(
            Paragraph::new(empty_hint(&colors, "No posts on this day", "Add one with `warp-planner post add`"))
                .block(block),
            area,
        );
        return;
    }

    let mut lines = Vec::new();
    for (i, post) in day_posts.iter().enumerate() {
        let style = if i == state.day_selection {
            colors.selected()
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", post.platform.emoji()), style),
            Span::styled(format!("{} ", post.time_str()), style.patch(colors.text_primary())),
            Span::styled(post.clean_objective().to_string(), style.patch(colors.text())),
        ]));
    }
    lines.push(Line::from(""));

    if let Some(post) = day_posts.get(state.day_selection) {
        lines.extend(post_detail(post, &colors, &state.config.report.currency));
    }

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn post_detail<'a>(post: &'a Post, colors: &ThemeColors, currency: &str) -> Vec<Line<'a>> {
    let field = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!(" {label:<10}"), colors.text_muted()),
            Span::styled(value, colors.text()),
        ])
    };
    let metadata = post.platform.metadata();

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", post.platform.name()), colors.platform(post.platform)),
            Span::styled(
                format!("{} {}", post.status.emoji(), post.status.label()),
                colors.status(post.status),
            ),
        ]),
        field("When", format!("{} {}", post.date.format("%Y-%m-%d"), post.time_str())),
        field("Budget", post.budget_label(currency)),
    ];
    if let Some(campaign) = &post.campaign_name {
        lines.push(field("Campaign", campaign.clone()));
    }
    if metadata.show_ad_group
        && let Some(group) = &post.ad_group_name
    {
        lines.push(field("Ad group", group.clone()));
    }
    if let Some(ad_id) = &post.ad_id {
        lines.push(field("Ad ID", ad_id.clone()));
    }
    if let Some(url) = post.image_url() {
        lines.push(field("Image", url));
    }
    lines.push(Line::from(""));
    lines.push(Line::styled(" Objective", colors.text_muted()));
    lines.push(Line::styled(format!(" {}", post.clean_objective()), colors.text()));
    lines.push(Line::from(""));
    lines.push(Line::styled(" Copy", colors.text_muted()));
    lines.extend(post.copy.lines().map(|l| Line::styled(format!(" {l}"), colors.text())));
    lines.push(Line::styled(format!(" id {}", post.id), colors.text_muted()));
    lines
}

// ==================== List ====================

fn render_list_tab(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let posts = state.visible_posts();
    let block = rounded_block(
        format!(" 📰 Posts ({}) · {} ", posts.len(), state.filter.describe()),
        &colors,
        true,
    );

    if posts.is_empty() {
        let message = if state.filter.is_active() { "No posts match the filter" } else { "No posts yet" };
        frame.render_widget(
            Paragraph::new(empty_hint(&colors, message, "Press c to clear the filter")).block(block),
            horizontal[0],
        );
    } else {
        let width = horizontal[0].width.saturating_sub(40) as usize;
        let items: Vec<ListItem> = posts
            .iter()
            .map(|post| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{} {} ", post.date.format("%Y-%m-%d"), post.time_str()),
                        colors.text_muted(),
                    ),
                    Span::styled(format!("{:<3}", post.platform.code()), colors.platform(post.platform)),
                    Span::styled(format!("{:<10}", post.status.label()), colors.status(post.status)),
                    Span::styled(post.preview(width.max(10)), colors.text()),
                ]))
            })
            .collect();
        let mut list_state = ListState::default().with_selected(Some(state.list_selection));
        frame.render_stateful_widget(
            List::new(items)
                .block(block)
                .highlight_style(colors.selected())
                .highlight_symbol("▸ "),
            horizontal[0],
            &mut list_state,
        );
    }

    let detail_block = rounded_block(" Detail ", &colors, false);
    let detail = state
        .selected_post()
        .map(|post| post_detail(post, &colors, &state.config.report.currency))
        .unwrap_or_default();
    frame.render_widget(
        Paragraph::new(detail).block(detail_block).wrap(Wrap { trim: false }),
        horizontal[1],
    );
}

// ==================== Brands ====================

fn render_brands_tab(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let brands = state.planner.brands();
    let block = rounded_block(format!(" 🏷 Brands ({}) ", brands.len()), &colors, true);

    if brands.is_empty() {
        frame.render_widget(
            Paragraph::new(empty_hint(&colors, "No brands yet", "Add one with `warp-planner brand add <name>`"))
                .block(block),
            area,
        );
        return;
    }

    let current = state.planner.current_brand_id();
    let items: Vec<ListItem> = brands
        .iter()
        .map(|brand| {
            let marker = if Some(brand.id) == current { "●" } else { "○" };
            let swatch = brand
                .rgb()
                .map_or(colors.text_muted(), |(r, g, b)| {
                    Style::default().fg(ratatui::style::Color::Rgb(r, g, b))
                });
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!("{marker} "), colors.text_primary()),
                    Span::styled("■ ", swatch),
                    Span::styled(brand.name.clone(), colors.text().add_modifier(Modifier::BOLD)),
                    Span::styled(format!("  {}", brand.industry), colors.text_muted()),
                ]),
                Line::styled(format!("    {}", brand.networks_label()), colors.text_muted()),
            ])
        })
        .collect();

    let mut list_state = ListState::default().with_selected(Some(state.brand_selection));
    frame.render_stateful_widget(
        List::new(items).block(block).highlight_style(colors.selected()),
        area,
        &mut list_state,
    );
}

// ==================== KPIs ====================

fn render_kpis_tab(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(5), Constraint::Length(6)])
        .split(area);

    match state.kpi_summary() {
        Some(summary) => render_kpi_cards(frame, &summary, &colors, vertical[0]),
        None => frame.render_widget(
            Paragraph::new(empty_hint(&colors, "No KPI records", "Press y to sync or use `warp-planner kpi set`"))
                .block(rounded_block(" 📊 Summary ", &colors, false)),
            vertical[0],
        ),
    }

    let header = Row::new(
        ["Month", "Reach", "Impr.", "ER %", "Clicks", "CTR %", "Conv.", "Spend", "CPC", "ROAS"]
            .map(|h| Cell::from(h).style(colors.text_primary())),
    );
    let rows: Vec<Row> = state
        .kpis
        .iter()
        .rev()
        .map(|r| {
            Row::new(vec![
                Cell::from(r.month.clone()),
                Cell::from(format!("{:.0}", r.awareness.reach)),
                Cell::from(format!("{:.0}", r.awareness.impressions)),
                Cell::from(format!("{:.2}", r.engagement.engagement_rate)),
                Cell::from(format!("{:.0}", r.performance.clicks)),
                Cell::from(format!("{:.2}", r.performance.ctr)),
                Cell::from(format!("{:.0}", r.performance.conversions)),
                Cell::from(format!("{:.2}", r.financials.total_spend)),
                Cell::from(format!("{:.2}", r.financials.cpc)),
                Cell::from(format!("{:.2}", r.financials.roas)),
            ])
            .style(colors.text())
        })
        .collect();
    let table = Table::new(rows, [Constraint::Ratio(1, 10); 10])
        .header(header)
        .block(rounded_block(" Monthly records ", &colors, false));
    frame.render_widget(table, vertical[1]);

    let mut lines = Vec::new();
    match &state.last_fetch {
        None if state.syncing => lines.push(Line::styled(
            format!(" {} Fetching...", state.spinner()),
            colors.text_warning(),
        )),
        None => lines.push(Line::styled(" No fetch this session", colors.text_muted())),
        Some(result) => {
            let style = if result.success && result.errors.is_empty() {
                colors.text_success()
            } else {
                colors.text_warning()
            };
            lines.push(Line::styled(format!(" {}", result.summary()), style));
            for data in &result.data {
                lines.push(Line::styled(
                    format!(
                        "   {:<10} spend {:.2}  impressions {:.0}  clicks {:.0}",
                        data.platform.name(),
                        data.spend,
                        data.impressions,
                        data.clicks
                    ),
                    colors.text(),
                ));
            }
            for error in &result.errors {
                lines.push(Line::styled(
                    format!("   {}: {}", error.platform, error.message),
                    colors.text_error(),
                ));
            }
        }
    }
    frame.render_widget(
        Paragraph::new(lines).block(rounded_block(" Last fetch ", &colors, false)),
        vertical[2],
    );
}

fn render_kpi_cards(frame: &mut Frame, summary: &KpiSummary, colors: &ThemeColors, area: Rect) {
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);
    for (card, cell) in summary.cards().iter().zip(cells.iter()) {
        let trend_style = match card.trend {
            Trend::Up => colors.text_success(),
            Trend::Down => colors.text_error(),
        };
        let lines = vec![
            Line::styled(card.value.clone(), colors.text().add_modifier(Modifier::BOLD)),
            Line::from(vec![
                Span::styled(format!("{} {}", card.trend.arrow(), card.change), trend_style),
                Span::styled(format!("  {}", summary.month), colors.text_muted()),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(rounded_block(format!(" {} ", card.title), colors, false)),
            *cell,
        );
    }
}

// ==================== Status bar & popups ====================

fn render_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();

    let mut left = vec![Span::raw(" ")];
    if state.busy() {
        left.push(Span::styled(format!("{} ", state.spinner()), colors.text_warning()));
    }
    left.push(Span::styled(state.status.clone(), colors.text()));

    let hints = [("?", "help"), ("Tab", "tabs"), ("b", "brand"), ("y", "sync"), ("p", "report"), ("q", "quit")];
    let mut right = Vec::new();
    for (key, label) in hints {
        right.push(Span::styled(key, colors.key_hint()));
        right.push(Span::styled(format!(" {label}  "), colors.text_muted()));
    }

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(50)])
        .split(area);
    frame.render_widget(Paragraph::new(Line::from(left)), halves[0]);
    frame.render_widget(
        Paragraph::new(Line::from(right)).alignment(Alignment::Right),
        halves[1],
    );
}

fn render_help_popup(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let popup_area = centered_rect(60, 80, frame.area());
    frame.render_widget(Clear, popup_area);

    let sections: [(&str, &[(&str, &str)]); 4] = [
        (
            "Global",
            &[
                ("Tab / 1-4", "Switch tab"),
                ("b", "Next brand"),
                ("y", "Sync KPIs from connected platforms"),
                ("p", "PDF report of the current month"),
                ("r", "Reload from the database"),
                ("q", "Quit"),
            ],
        ),
        (
            "Calendar",
            &[
                ("h/l j/k", "Move day / week"),
                ("[ ]", "Previous / next period"),
                ("J/K", "Select post of the day"),
                ("v", "Month → Week → Day"),
                ("t", "Today"),
            ],
        ),
        (
            "Posts",
            &[
                ("f / F", "Cycle platform / status filter"),
                ("/", "Search copy and objective"),
                ("c", "Clear filter"),
                ("s", "Advance status"),
                ("d", "Delete (asks first)"),
                ("o", "Open image"),
                ("Enter", "Show in calendar (list)"),
            ],
        ),
        ("Brands", &[("j/k", "Move"), ("Enter", "Make current")]),
    ];

    let mut lines: Vec<Line> = crate::LOGO
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| Line::styled(l, colors.text_primary()))
        .collect();
    lines.push(Line::from(""));
    for (title, keys) in sections {
        lines.push(Line::styled(format!(" {title}"), colors.text_primary()));
        for (key, action) in keys {
            lines.push(Line::from(vec![
                Span::styled(format!("   {key:<12}"), colors.key_hint()),
                Span::styled(*action, colors.text()),
            ]));
        }
        lines.push(Line::from(""));
    }

    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(colors.block_focus())
            .style(Style::default().bg(colors.bg))
            .title(format!(" ❓ Help · v{} ", crate::VERSION))
            .title_style(colors.text_primary()),
    );
    frame.render_widget(help, popup_area);
}

fn render_search_popup(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let area = frame.area();

    let popup_area = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup_area);

    let content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(
                if state.search_input.is_empty() {
                    "Type to search..."
                } else {
                    &state.search_input
                },
                if state.search_input.is_empty() {
                    colors.text_muted()
                } else {
                    colors.text()
                },
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled("Enter", colors.key_hint()),
            Span::styled(" search  ", colors.text_muted()),
            Span::styled("Esc", colors.key_hint()),
            Span::styled(" cancel", colors.text_muted()),
        ]),
    ];

    let search = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(colors.block_focus())
            .style(Style::default().bg(colors.bg))
            .title(" 🔍 Search ")
            .title_style(colors.text_primary()),
    );

    frame.render_widget(search, popup_area);
}

fn render_confirm_popup(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let area = frame.area();

    let popup_width = 54u16;
    let popup_height = 8u16;
    let popup_area = Rect {
        x: area.width.saturating_sub(popup_width) / 2,
        y: area.height.saturating_sub(popup_height) / 2,
        width: popup_width.min(area.width),
        height: popup_height.min(area.height),
    };
    frame.render_widget(Clear, popup_area);

    let summary = state.selected_post().map_or_else(String::new, |p| {
        format!("{} {} · {}", p.date.format("%Y-%m-%d"), p.time_str(), p.platform.name())
    });
    let lines = vec![
        Line::from(""),
        Line::styled("Delete this post?", colors.text()),
        Line::styled(summary, colors.text_muted()),
        Line::from(""),
        Line::from(vec![
            Span::styled(" [Y] ", colors.text_error().add_modifier(Modifier::BOLD)),
            Span::raw("Delete"),
            Span::raw("    "),
            Span::styled(" [N/Esc] ", colors.text_muted()),
            Span::raw("Cancel"),
        ]),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(colors.text_error())
            .style(Style::default().bg(colors.bg))
            .title(" 🗑 Confirm ")
            .title_style(colors.text_error()),
    );
    frame.render_widget(paragraph, popup_area);
}

/// Helper function to create a centered rect
/// Cut text to a display width, marking the cut with an ellipsis
fn fit_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        used += w;
        out.push(c);
    }
    if width > 0 {
        out.push('…');
    }
    out
}

const fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_width = r.width * percent_x / 100;
    let popup_height = r.height * percent_y / 100;
    Rect {
        x: r.x + (r.width.saturating_sub(popup_width)) / 2,
        y: r.y + (r.height.saturating_sub(popup_height)) / 2,
        width: popup_width,
        height: popup_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::tests::test_state;
    use ratatui::{Terminal, backend::TestBackend};

    fn draw(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|frame| render(frame, state)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_fit_width() {
        assert_eq!(fit_width("Launch", 10), "Launch");
        assert_eq!(fit_width("Spring launch", 7), "Spring…");
        assert_eq!(fit_width("📅📅📅", 4), "📅…");
        assert_eq!(fit_width("abc", 0), "");
    }

    #[test]
    fn test_centered_rect() {
        let r = centered_rect(50, 50, Rect::new(0, 0, 100, 40));
        assert_eq!(r, Rect::new(25, 10, 50, 20));
    }

    #[test]
    fn test_every_tab_renders() {
        let (mut state, _dir) = test_state();
        let calendar = draw(&state);
        assert!(calendar.contains("Warp Planner"));
        assert!(calendar.contains("March 2026"));

        state.tab = Tab::List;
        assert!(draw(&state).contains("Posts (3)"));

        state.tab = Tab::Brands;
        assert!(draw(&state).contains("Acme"));

        state.tab = Tab::Kpis;
        assert!(draw(&state).contains("No KPI records"));
    }

    #[test]
    fn test_views_and_popups_render() {
        let (mut state, _dir) = test_state();
        for _ in 0..3 {
            state.cycle_view();
            draw(&state);
        }
        state.mode = Mode::Help;
        assert!(draw(&state).contains("Help"));
        state.mode = Mode::ConfirmDelete;
        assert!(draw(&state).contains("Delete this post?"));
    }
}
