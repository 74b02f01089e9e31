//! TUI Application module

mod async_ops;
mod events;
mod state;
mod ui;

pub use state::{AppState, Mode, Tab};

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, error::TryRecvError};

use crate::config::Config;
use crate::db::Database;
use crate::planner::Planner;
use crate::sync::{fold_into_kpis, record_sync};

use async_ops::{AsyncCommand, AsyncHandle, AsyncResult, spawn_worker};

/// Run the TUI application
pub fn run() -> Result<()> {
    let rt = Runtime::new()?;

    let config = Config::load()?;
    let db = Database::open()?;
    let planner = Planner::open(db, config.selected_brand_id)?;

    let async_handle = rt.block_on(async { spawn_worker() });

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = AppState::new(config, planner)
        .and_then(|mut state| run_app(&mut terminal, &mut state, async_handle));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    mut async_handle: AsyncHandle,
) -> Result<()> {
    if state.planner.brands().is_empty() {
        state.set_status("No brands yet. Add one with `warp-planner brand add <name>`");
    } else {
        state.set_status("Press ? for help");
    }

    loop {
        // Process any async results
        loop {
            match async_handle.result_rx.try_recv() {
                Ok(result) => handle_async_result(state, result),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if state.busy() {
                        worker_lost(state);
                    }
                    break;
                }
            }
        }

        terminal.draw(|frame| ui::render(frame, state))?;

        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
            && let Some(cmd) = events::handle_key(state, key)
        {
            dispatch(state, &async_handle.cmd_tx, cmd);
        }

        state.tick();

        if state.should_quit {
            let _ = async_handle
                .cmd_tx
                .blocking_send(AsyncCommand::Shutdown);
            break;
        }
    }

    // Save config on exit
    state.config.save()?;

    Ok(())
}

/// Queue a command for the worker; a stopped worker clears the busy flags
fn dispatch(state: &mut AppState, cmd_tx: &mpsc::Sender<AsyncCommand>, cmd: AsyncCommand) {
    if let Err(e) = cmd_tx.blocking_send(cmd) {
        tracing::error!("Background worker unavailable: {e}");
        worker_lost(state);
    }
}

fn worker_lost(state: &mut AppState) {
    state.syncing = false;
    state.reporting = false;
    state.set_status("❌ Background worker stopped, restart to sync or report");
}

fn handle_async_result(state: &mut AppState, result: AsyncResult) {
    match result {
        AsyncResult::KpisFetched {
            brand_id,
            month,
            outcome,
        } => {
            state.syncing = false;
            let db = state.planner.db();
            let stored = record_sync(db, &outcome).and_then(|()| {
                if outcome.result.data.is_empty() {
                    Ok(())
                } else {
                    fold_into_kpis(db, brand_id, &month, &outcome.result.data).map(|_| ())
                }
            });
            if let Err(e) = stored.and_then(|()| state.reload_kpis()) {
                tracing::error!("Failed to store fetched KPIs: {e:#}");
                state.set_status(format!("❌ {e}"));
            } else {
                state.set_status(outcome.result.summary());
            }
            state.last_fetch = Some(outcome.result);
        }
        AsyncResult::ReportGenerated { path } => {
            state.reporting = false;
            state.set_status(format!("✓ Report written to {}", path.display()));
        }
        AsyncResult::Error { message } => {
            state.syncing = false;
            state.reporting = false;
            state.set_status(format!("❌ {message}"));
        }
        AsyncResult::Status { message } => {
            state.set_status(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApiPlatform, DataFetchResult, FetchError, FetchedKpiData};
    use crate::sync::SyncOutcome;
    use super::state::tests::test_state;

    #[test]
    fn test_fetched_kpis_are_folded() {
        let (mut state, _dir) = test_state();
        state.syncing = true;
        let brand_id = state.planner.current_brand_id().unwrap();

        let outcome = SyncOutcome {
            result: DataFetchResult {
                success: true,
                data: vec![FetchedKpiData::new(ApiPlatform::Meta, 200.0, 10_000.0, 400.0)],
                errors: vec![FetchError::platform(ApiPlatform::TikTok, "Unauthorized")],
            },
            synced: Vec::new(),
        };
        handle_async_result(
            &mut state,
            AsyncResult::KpisFetched {
                brand_id,
                month: "2026-03".into(),
                outcome,
            },
        );

        assert!(!state.syncing);
        assert_eq!(state.kpis.len(), 1);
        assert_eq!(state.kpis[0].month, "2026-03");
        assert_eq!(state.kpis[0].financials.total_spend, 200.0);
        assert!(state.status.contains("1 failed"));
        assert_eq!(state.last_fetch.as_ref().unwrap().errors.len(), 1);
    }

    #[test]
    fn test_closed_worker_clears_busy_flags() {
        let (mut state, _dir) = test_state();
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        state.syncing = true;
        dispatch(&mut state, &tx, AsyncCommand::Shutdown);
        assert!(!state.busy());
        assert!(state.status.contains("worker stopped"));
    }

    #[test]
    fn test_open_worker_keeps_busy_flag() {
        let (mut state, _dir) = test_state();
        let (tx, mut rx) = mpsc::channel(1);

        state.reporting = true;
        dispatch(&mut state, &tx, AsyncCommand::Shutdown);
        assert!(state.reporting);
        assert!(matches!(rx.try_recv(), Ok(AsyncCommand::Shutdown)));
    }

    #[test]
    fn test_report_and_error_results() {
        let (mut state, _dir) = test_state();
        state.reporting = true;
        handle_async_result(
            &mut state,
            AsyncResult::ReportGenerated {
                path: "/tmp/SocialPlan.pdf".into(),
            },
        );
        assert!(!state.reporting);
        assert!(state.status.contains("SocialPlan.pdf"));

        state.syncing = true;
        handle_async_result(
            &mut state,
            AsyncResult::Error {
                message: "boom".into(),
            },
        );
        assert!(!state.busy());
        assert_eq!(state.status, "❌ boom");
    }
}
