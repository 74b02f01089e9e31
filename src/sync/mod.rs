//! KPI data fetching across a brand's connected ad platforms

use anyhow::Result;
use chrono::Utc;
use futures::future::join_all;
use uuid::Uuid;

use crate::api::get_client;
use crate::config::ApiSettings;
use crate::db::Database;
use crate::models::{
    ApiCredentials, Brand, DataFetchResult, DateRange, FetchError, FetchedKpiData, KpiRecord,
};

/// Everything a fetch needs, loaded from the database up front
#[derive(Debug, Clone)]
pub struct SyncPlan {
    /// Brand being synced
    pub brand: Brand,
    /// Connected credentials of the brand
    pub credentials: Vec<ApiCredentials>,
}

/// Fetch result plus the credentials that produced data
#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    /// Aggregated result
    pub result: DataFetchResult,
    /// Credential ids whose platform answered
    pub synced: Vec<Uuid>,
}

/// Load the brand and its connected credentials; `None` if the brand is gone
pub fn plan_sync(db: &Database, brand_id: Uuid) -> Result<Option<SyncPlan>> {
    let Some(brand) = db.get_brand(brand_id)? else {
        return Ok(None);
    };
    let credentials = db
        .get_credentials(brand_id)?
        .into_iter()
        .filter(|c| c.is_connected)
        .collect();
    Ok(Some(SyncPlan { brand, credentials }))
}

/// Fetch every platform concurrently; one failure never affects the others
pub async fn fetch_all(
    credentials: &[ApiCredentials],
    range: &DateRange,
    settings: &ApiSettings,
) -> SyncOutcome {
    let mut outcome = SyncOutcome {
        result: DataFetchResult {
            success: true,
            ..DataFetchResult::default()
        },
        synced: Vec::new(),
    };

    if credentials.is_empty() {
        tracing::warn!("No connected API credentials, nothing to fetch");
        return outcome;
    }

    let fetches = credentials.iter().map(|creds| async move {
        let fetched = match get_client(creds, settings) {
            Ok(client) => client.fetch_with_retry(range, settings.max_retries).await,
            Err(e) => Err(e),
        };
        (creds, fetched)
    });

    for (creds, fetched) in join_all(fetches).await {
        match fetched {
            Ok(data) => {
                tracing::info!("Fetched {} data: spend {:.2}", creds.platform.name(), data.spend);
                outcome.synced.push(creds.id);
                outcome.result.data.push(data);
            }
            Err(e) => {
                tracing::error!("Error fetching {} data: {}", creds.platform.name(), e);
                outcome
                    .result
                    .errors
                    .push(FetchError::platform(creds.platform, e.to_string()));
            }
        }
    }

    outcome
}

/// Stamp `last_sync` on the credentials that answered
pub fn record_sync(db: &Database, outcome: &SyncOutcome) -> Result<()> {
    let now = Utc::now();
    for id in &outcome.synced {
        db.mark_synced(*id, now)?;
    }
    Ok(())
}

/// Fold fetched data into the brand's KPI record for `month`, creating it if needed
pub fn fold_into_kpis(
    db: &Database,
    brand_id: Uuid,
    month: &str,
    data: &[FetchedKpiData],
) -> Result<KpiRecord> {
    let mut record = db
        .get_kpi(brand_id, month)?
        .unwrap_or_else(|| KpiRecord::new(brand_id, month));
    record.merge_fetched(data);
    db.upsert_kpi(&record)?;
    Ok(record)
}

/// Fetch all connected platforms of a brand and stamp the ones that answered
pub async fn fetch_brand_data(
    db: &Database,
    brand_id: Uuid,
    range: &DateRange,
    settings: &ApiSettings,
) -> Result<DataFetchResult> {
    let Some(plan) = plan_sync(db, brand_id)? else {
        return Ok(DataFetchResult::failed(format!("Brand not found: {brand_id}")));
    };
    tracing::debug!(
        "Syncing {} ({} connected platforms)",
        plan.brand.name,
        plan.credentials.len()
    );

    let outcome = fetch_all(&plan.credentials, range, settings).await;
    record_sync(db, &outcome)?;
    Ok(outcome.result)
}
