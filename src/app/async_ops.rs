//! Async operations for the TUI
//!
//! Uses channels to communicate between the sync TUI loop and async tasks.
//! The database stays on the UI thread: commands carry everything the worker
//! needs and results are written back by the loop.

use std::path::PathBuf;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::config::{ApiSettings, ReportSettings};
use crate::models::{ApiCredentials, DateRange};
use crate::report::{self, ReportRequest};
use crate::sync::{SyncOutcome, fetch_all};

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum AsyncCommand {
    /// Pull KPI data from a brand's connected platforms
    FetchKpis {
        brand_id: Uuid,
        credentials: Vec<ApiCredentials>,
        range: DateRange,
        settings: ApiSettings,
    },
    /// Lay out and write a PDF report
    GenerateReport {
        request: ReportRequest,
        settings: ReportSettings,
        out_dir: PathBuf,
    },
    /// Shutdown the worker
    Shutdown,
}

/// Results sent back from the async worker to the TUI
#[derive(Debug)]
pub enum AsyncResult {
    /// Platform fetches finished
    KpisFetched {
        brand_id: Uuid,
        month: String,
        outcome: SyncOutcome,
    },
    /// Report written
    ReportGenerated { path: PathBuf },
    /// An error occurred
    Error { message: String },
    /// Status message (for progress updates)
    Status { message: String },
}

/// Channel handles for communicating with the async worker
pub struct AsyncHandle {
    /// Send commands to the worker
    pub cmd_tx: mpsc::Sender<AsyncCommand>,
    /// Receive results from the worker
    pub result_rx: mpsc::Receiver<AsyncResult>,
}

/// Spawn the async worker and return handles
pub fn spawn_worker() -> AsyncHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<AsyncCommand>(32);
    let (result_tx, result_rx) = mpsc::channel::<AsyncResult>(32);

    tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                AsyncCommand::Shutdown => break,
                AsyncCommand::FetchKpis {
                    brand_id,
                    credentials,
                    range,
                    settings,
                } => {
                    handle_fetch(&result_tx, brand_id, credentials, range, settings).await;
                }
                AsyncCommand::GenerateReport {
                    request,
                    settings,
                    out_dir,
                } => {
                    handle_report(&result_tx, request, settings, out_dir).await;
                }
            }
        }
    });

    AsyncHandle { cmd_tx, result_rx }
}

/// Deliver a result; the UI loop only drops its receiver on exit
async fn send(result_tx: &mpsc::Sender<AsyncResult>, result: AsyncResult) {
    if result_tx.send(result).await.is_err() {
        tracing::debug!("UI closed before a worker result was delivered");
    }
}

async fn handle_fetch(
    result_tx: &mpsc::Sender<AsyncResult>,
    brand_id: Uuid,
    credentials: Vec<ApiCredentials>,
    range: DateRange,
    settings: ApiSettings,
) {
    send(
        result_tx,
        AsyncResult::Status {
            message: format!("Fetching {} platform(s)...", credentials.len()),
        },
    )
    .await;

    let outcome = fetch_all(&credentials, &range, &settings).await;
    send(
        result_tx,
        AsyncResult::KpisFetched {
            brand_id,
            month: range.end_month(),
            outcome,
        },
    )
    .await;
}

async fn handle_report(
    result_tx: &mpsc::Sender<AsyncResult>,
    request: ReportRequest,
    settings: ReportSettings,
    out_dir: PathBuf,
) {
    send(
        result_tx,
        AsyncResult::Status {
            message: "Writing report...".to_string(),
        },
    )
    .await;

    let written =
        tokio::task::spawn_blocking(move || report::generate(&request, &settings, &out_dir)).await;

    let result = match written {
        Ok(Ok(path)) => AsyncResult::ReportGenerated { path },
        Ok(Err(e)) => AsyncResult::Error {
            message: format!("Report failed: {e:#}"),
        },
        Err(e) => AsyncResult::Error {
            message: format!("Report task failed: {e}"),
        },
    };
    send(result_tx, result).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_fetch_without_credentials() {
        let mut handle = spawn_worker();
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        );
        handle
            .cmd_tx
            .send(AsyncCommand::FetchKpis {
                brand_id: Uuid::nil(),
                credentials: Vec::new(),
                range,
                settings: ApiSettings::default(),
            })
            .await
            .unwrap();

        assert!(matches!(
            handle.result_rx.recv().await,
            Some(AsyncResult::Status { .. })
        ));
        match handle.result_rx.recv().await {
            Some(AsyncResult::KpisFetched { month, outcome, .. }) => {
                assert_eq!(month, "2026-03");
                assert!(outcome.result.success);
                assert!(outcome.result.data.is_empty());
            }
            other => panic!("unexpected result: {other:?}"),
        }
        handle.cmd_tx.send(AsyncCommand::Shutdown).await.unwrap();
    }

    #[tokio::test]
    async fn test_report_is_written() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut handle = spawn_worker();
        let request = ReportRequest::new(
            "Acme",
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            Vec::new(),
        );
        handle
            .cmd_tx
            .send(AsyncCommand::GenerateReport {
                request,
                settings: ReportSettings::default(),
                out_dir: dir.path().to_path_buf(),
            })
            .await
            .unwrap();

        let _status = handle.result_rx.recv().await;
        match handle.result_rx.recv().await {
            Some(AsyncResult::ReportGenerated { path }) => assert!(path.exists()),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
