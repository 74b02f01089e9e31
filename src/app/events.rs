//! Event handling

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::async_ops::AsyncCommand;
use super::state::{AppState, Mode, Tab};
use crate::calendar::month_range;
use crate::models::DateRange;
use crate::paths;
use crate::report::ReportRequest;

/// Handle key events, returning an optional async command
pub fn handle_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match state.mode {
        Mode::Help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter) {
                state.mode = Mode::Normal;
            }
            return None;
        }
        Mode::Search => {
            handle_search_key(state, key);
            return None;
        }
        Mode::ConfirmDelete => {
            handle_confirm_key(state, key);
            return None;
        }
        Mode::Normal => {}
    }

    // Global shortcuts
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Char('q')) => {
            state.should_quit = true;
            return None;
        }
        (_, KeyCode::Char('?') | KeyCode::F(1)) => {
            state.mode = Mode::Help;
            return None;
        }
        (_, KeyCode::Tab) => {
            state.tab = state.tab.next();
            return None;
        }
        (_, KeyCode::BackTab) => {
            state.tab = state.tab.prev();
            return None;
        }
        (_, KeyCode::Char('1')) => {
            state.tab = Tab::Calendar;
            return None;
        }
        (_, KeyCode::Char('2')) => {
            state.tab = Tab::List;
            return None;
        }
        (_, KeyCode::Char('3')) => {
            state.tab = Tab::Brands;
            return None;
        }
        (_, KeyCode::Char('4')) => {
            state.tab = Tab::Kpis;
            return None;
        }
        (_, KeyCode::Char('b')) => {
            report_error(state, AppState::next_brand);
            return None;
        }
        (_, KeyCode::Char('r')) => {
            report_error(state, AppState::refresh);
            if state.status.is_empty() {
                state.set_status("✓ Refreshed");
            }
            return None;
        }
        (_, KeyCode::Char('y')) => return start_sync(state),
        (_, KeyCode::Char('p')) => return start_report(state),
        (_, KeyCode::Esc) => {
            state.clear_status();
            return None;
        }
        _ => {}
    }

    match state.tab {
        Tab::Calendar => handle_calendar_key(state, key),
        Tab::List => handle_list_key(state, key),
        Tab::Brands => handle_brands_key(state, key),
        Tab::Kpis => {}
    }
    None
}

/// Run a fallible state change, showing any error in the status bar
fn report_error(state: &mut AppState, action: fn(&mut AppState) -> anyhow::Result<()>) {
    state.clear_status();
    if let Err(e) = action(state) {
        tracing::warn!("{e:#}");
        state.set_status(format!("❌ {e}"));
    }
}

/// Keys shared by the calendar and list tabs
fn handle_post_key(state: &mut AppState, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('f') => state.cycle_platform_filter(),
        KeyCode::Char('F') => state.cycle_status_filter(),
        KeyCode::Char('c') => state.clear_filter(),
        KeyCode::Char('/') => {
            state.search_input = state.filter.query.clone();
            state.mode = Mode::Search;
        }
        KeyCode::Char('s') => report_error(state, AppState::cycle_selected_status),
        KeyCode::Char('d') => {
            if state.selected_post().is_some() {
                state.mode = Mode::ConfirmDelete;
            }
        }
        KeyCode::Char('o') => open_image(state),
        _ => return false,
    }
    true
}

fn handle_calendar_key(state: &mut AppState, key: KeyEvent) {
    if handle_post_key(state, key) {
        return;
    }
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => state.move_cursor(-1),
        KeyCode::Right | KeyCode::Char('l') => state.move_cursor(1),
        KeyCode::Up | KeyCode::Char('k') => state.move_cursor(-7),
        KeyCode::Down | KeyCode::Char('j') => state.move_cursor(7),
        KeyCode::Char('J') => state.select_next_post(),
        KeyCode::Char('K') => state.select_prev_post(),
        KeyCode::Char('[') | KeyCode::PageUp => state.navigate(false),
        KeyCode::Char(']') | KeyCode::PageDown => state.navigate(true),
        KeyCode::Char('t') => state.go_today(),
        KeyCode::Char('v') => {
            state.cycle_view();
            state.set_status(format!("View: {}", state.view.name()));
        }
        _ => {}
    }
}

fn handle_list_key(state: &mut AppState, key: KeyEvent) {
    if handle_post_key(state, key) {
        return;
    }
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => state.select_next_post(),
        KeyCode::Up | KeyCode::Char('k') => state.select_prev_post(),
        KeyCode::Char('g') => state.list_selection = 0,
        KeyCode::Char('G') => {
            state.list_selection = state.visible_posts().len().saturating_sub(1);
        }
        KeyCode::Enter => {
            // jump to the post's day in the calendar
            if let Some(post) = state.selected_post() {
                let (date, id) = (post.date, post.id);
                state.cursor = date;
                state.day_selection = state.day_posts().iter().position(|p| p.id == id).unwrap_or(0);
                state.tab = Tab::Calendar;
            }
        }
        _ => {}
    }
}

fn handle_brands_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => state.select_next_brand_row(),
        KeyCode::Up | KeyCode::Char('k') => state.select_prev_brand_row(),
        KeyCode::Enter => report_error(state, AppState::select_highlighted_brand),
        _ => {}
    }
}

fn handle_search_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            state.mode = Mode::Normal;
            state.search_input.clear();
        }
        KeyCode::Enter => {
            state.apply_search();
            state.mode = Mode::Normal;
        }
        KeyCode::Char(c) => state.search_input.push(c),
        KeyCode::Backspace => {
            state.search_input.pop();
        }
        _ => {}
    }
}

fn handle_confirm_key(state: &mut AppState, key: KeyEvent) {
    state.mode = Mode::Normal;
    if matches!(key.code, KeyCode::Char('y' | 'Y') | KeyCode::Enter) {
        report_error(state, AppState::delete_selected);
    } else {
        state.set_status("Delete cancelled");
    }
}

fn open_image(state: &mut AppState) {
    let Some(url) = state.selected_post().and_then(|p| p.image_url()) else {
        state.set_status("⚠ Post has no image");
        return;
    };
    match open::that(&url) {
        Ok(()) => state.set_status("✓ Opened image in browser"),
        Err(e) => state.set_status(format!("❌ Could not open {url}: {e}")),
    }
}

/// Queue a KPI fetch for the current brand
fn start_sync(state: &mut AppState) -> Option<AsyncCommand> {
    if state.syncing {
        return None;
    }
    let Some(brand_id) = state.planner.current_brand_id() else {
        state.set_status("⚠ No brand selected");
        return None;
    };
    let credentials = match state.planner.db().get_credentials(brand_id) {
        Ok(creds) => creds.into_iter().filter(|c| c.is_connected).collect::<Vec<_>>(),
        Err(e) => {
            state.set_status(format!("❌ {e}"));
            return None;
        }
    };
    if credentials.is_empty() {
        state.set_status("⚠ No connected platforms, add some with `warp-planner creds set`");
        return None;
    }

    state.syncing = true;
    state.set_status("Syncing...");
    Some(AsyncCommand::FetchKpis {
        brand_id,
        credentials,
        range: DateRange::last_days(state.config.api.lookback_days),
        settings: state.config.api.clone(),
    })
}

/// Queue a report of the current month for the current brand
fn start_report(state: &mut AppState) -> Option<AsyncCommand> {
    if state.reporting {
        return None;
    }
    let Some(brand) = state.planner.current_brand() else {
        state.set_status("⚠ No brand selected");
        return None;
    };
    let (start, end) = month_range(Local::now().date_naive());
    let request = ReportRequest::new(brand.name.clone(), start, end, state.planner.posts().to_vec());

    state.reporting = true;
    state.set_status("Generating report...");
    Some(AsyncCommand::GenerateReport {
        request,
        settings: state.config.report.clone(),
        out_dir: paths::output_dir(),
    })
}
