//! Month grid pages

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::calendar::{month_bounds, week_start};
use crate::config::ReportSettings;
use crate::models::Post;

use super::layout::{Align, Color, Font, MARGIN, PAGE_HEIGHT, PAGE_WIDTH, Page, clip, text_width};
use super::{ReportRequest, draw_header};

const GRID_TOP: f32 = 38.0;
const GAP: f32 = 2.0;
const ICON: f32 = 8.0 / 2.834_65;
const WEEKDAYS: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// One page per month from the start month through the end month
pub(super) fn pages(request: &ReportRequest, settings: &ReportSettings, today: NaiveDate) -> Vec<Page> {
    let (mut month, _) = month_bounds(request.start);
    let (last, _) = month_bounds(request.end);

    let mut pages = Vec::new();
    while month <= last {
        pages.push(month_page(request, settings, month, today));
        match month.checked_add_months(Months::new(1)) {
            Some(next) => month = next,
            None => break,
        }
    }
    pages
}

fn month_page(request: &ReportRequest, settings: &ReportSettings, month: NaiveDate, today: NaiveDate) -> Page {
    let mut page = Page::default();
    draw_header(
        &mut page,
        &format!("{} - {}", request.title, month.format("%B %Y")),
        today,
    );

    let cell_w = (PAGE_WIDTH - MARGIN * 2.0) / 7.0;
    let cell_h = (PAGE_HEIGHT - GRID_TOP - MARGIN) / 6.0;

    for (i, label) in WEEKDAYS.iter().enumerate() {
        let x = MARGIN + col_offset(i, cell_w) + cell_w / 2.0;
        page.text(*label, x, GRID_TOP - 4.0, 8.0, Font::Bold, Color::FAINT, Align::Center);
    }

    let mut day = week_start(month);
    for row in 0..6 {
        for col in 0..7 {
            let x = MARGIN + col_offset(col, cell_w) + GAP / 2.0;
            let y = GRID_TOP + col_offset(row, cell_h) + GAP / 2.0;
            let cell = Cell {
                x,
                y,
                w: cell_w - GAP,
                h: cell_h - GAP,
            };
            let in_month = day.month() == month.month() && day.year() == month.year();
            draw_day(&mut page, &cell, day, in_month, day == today);

            let mut on_day: Vec<&Post> = request.posts.iter().filter(|p| p.date == day).collect();
            on_day.sort_by_key(|p| p.time);
            draw_badges(&mut page, &cell, &on_day, settings.badges_per_day);

            day += Duration::days(1);
        }
    }
    page
}

#[allow(clippy::cast_precision_loss)]
fn col_offset(index: usize, size: f32) -> f32 {
    index as f32 * size
}

struct Cell {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

fn draw_day(page: &mut Page, cell: &Cell, day: NaiveDate, in_month: bool, is_today: bool) {
    let number_color = match (in_month, is_today) {
        (true, true) => {
            page.fill_rect(cell.x + 0.5, cell.y + 0.5, cell.w, cell.h, 2.0, Color(100, 149, 237));
            page.card(cell.x, cell.y, cell.w, cell.h, 2.0, Color::WHITE, Color::BLUE, 0.8);
            Color::BLUE
        }
        (true, false) => {
            page.card(cell.x, cell.y, cell.w, cell.h, 2.0, Color::WHITE, Color::BORDER, 0.2);
            Color(30, 30, 30)
        }
        (false, _) => {
            page.card(cell.x, cell.y, cell.w, cell.h, 2.0, Color(250, 250, 250), Color(229, 231, 235), 0.1);
            Color(200, 200, 200)
        }
    };
    page.text(
        day.day().to_string(),
        cell.x + 3.0,
        cell.y + 5.0,
        9.0,
        Font::Bold,
        number_color,
        Align::Left,
    );
}

/// Badges for the first `max` posts, then `+N more...`
fn draw_badges(page: &mut Page, cell: &Cell, posts: &[&Post], max: usize) {
    const PAD_X: f32 = 1.5;
    const PAD_Y: f32 = 1.0;
    const SPACING: f32 = 1.5;

    let mut y = cell.y + 8.0;
    for post in posts.iter().take(max) {
        let palette = post.platform.palette();
        let time = post.time_str();
        let objective = clip(post.clean_objective(), 14);

        let time_w = text_width(&time, 6.0, Font::Bold);
        let objective_w = text_width(&objective, 6.0, Font::Regular);
        let badge_w = (PAD_X + ICON + SPACING + time_w + SPACING + objective_w + PAD_X).min(cell.w - 2.0);
        let badge_h = ICON + PAD_Y * 2.0;
        let x = cell.x + 1.0;

        page.fill_rect(x + 1.5, y + 1.5, badge_w, badge_h, badge_h / 2.0, Color::SHADOW);
        page.fill_rect(x, y, badge_w, badge_h, badge_h / 2.0, palette.bg.into());

        let icon_cx = x + PAD_X + ICON / 2.0;
        let icon_cy = y + PAD_Y + ICON / 2.0;
        page.circle(icon_cx, icon_cy, ICON / 2.0, palette.accent.into());
        page.text(post.platform.code(), icon_cx, icon_cy + 0.5, 3.5, Font::Bold, Color::WHITE, Align::Center);

        let text_y = y + PAD_Y + ICON - 0.7;
        let text_x = x + PAD_X + ICON + SPACING;
        page.text(time, text_x, text_y, 6.0, Font::Bold, palette.text.into(), Align::Left);
        page.text(
            objective,
            text_x + time_w + SPACING,
            text_y,
            6.0,
            Font::Regular,
            palette.text.into(),
            Align::Left,
        );

        y += badge_h + 1.5;
    }

    let overflow = posts.len().saturating_sub(max);
    if overflow > 0 {
        page.text(
            format!("+{overflow} more..."),
            cell.x + 2.0,
            y + 2.0,
            6.0,
            Font::Regular,
            Color::MUTED,
            Align::Left,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewPost, Platform};
    use chrono::NaiveTime;
    use uuid::Uuid;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn post(date: NaiveDate, hour: u32, objective: &str) -> Post {
        let mut new = NewPost::new(date, NaiveTime::from_hms_opt(hour, 0, 0).unwrap(), Platform::TikTok, "copy");
        new.objective = objective.to_string();
        new.into_post(Uuid::nil())
    }

    #[test]
    fn test_one_page_per_month() {
        let request = ReportRequest::new("Acme", day(2026, 1, 20), day(2026, 3, 2), vec![]);
        let pages = pages(&request, &ReportSettings::default(), day(2026, 1, 1));
        assert_eq!(pages.len(), 3);
        assert!(pages[0].texts().any(|t| t == "Acme - January 2026"));
        assert!(pages[2].texts().any(|t| t == "Acme - March 2026"));
        assert!(pages[1].texts().any(|t| t == "Generated: 2026-01-01"));
    }

    #[test]
    fn test_day_badges_and_overflow() {
        let date = day(2026, 3, 10);
        let posts = vec![
            post(date, 18, "Evening"),
            post(date, 9, "[Li L] Lead generation campaign"),
            post(date, 12, "Noon"),
            post(date, 15, "Afternoon"),
        ];
        let request = ReportRequest::new("Acme", day(2026, 3, 1), day(2026, 3, 31), posts);
        let page = &pages(&request, &ReportSettings::default(), day(2026, 3, 1))[0];
        let texts: Vec<&str> = page.texts().collect();

        assert!(texts.contains(&"09:00"));
        assert!(texts.contains(&"Lead generatio"));
        assert!(texts.contains(&"12:00"));
        assert!(!texts.contains(&"15:00"));
        assert!(texts.contains(&"+2 more..."));
        assert_eq!(texts.iter().filter(|t| **t == "TK").count(), 2);
    }

    #[test]
    fn test_grid_has_42_days_and_weekday_labels() {
        let request = ReportRequest::new("Acme", day(2026, 2, 1), day(2026, 2, 28), vec![]);
        let page = &pages(&request, &ReportSettings::default(), day(2026, 2, 14))[0];
        let texts: Vec<&str> = page.texts().collect();
        for label in WEEKDAYS {
            assert!(texts.contains(&label));
        }
        // Feb 2026 starts on a Sunday, so the grid runs to March 14
        assert!(texts.contains(&"14"));
        let numbers = texts.iter().filter(|t| t.parse::<u32>().is_ok()).count();
        assert_eq!(numbers, 42);
    }
}
