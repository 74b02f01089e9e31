//! Meta (Facebook & Instagram) Marketing API client

use serde::Deserialize;

use crate::models::{ApiPlatform, DateRange, FetchedKpiData};

use super::{AdsApi, ApiError, lenient_f64, lenient_opt_f64, map_reqwest_error, read_json};

/// Graph API base URL
pub const GRAPH_URL: &str = "https://graph.facebook.com/v19.0";

const INSIGHT_FIELDS: &str = "spend,purchase_roas,cpc,ctr,impressions,actions";

/// Meta Marketing API client
pub struct MetaClient {
    http: reqwest::Client,
    access_token: String,
    ad_account_id: String,
}

impl MetaClient {
    /// Create a client for an ad account (`act_` is added when missing)
    pub fn new(http: reqwest::Client, access_token: &str, ad_account_id: &str) -> Self {
        let ad_account_id = if ad_account_id.starts_with("act_") {
            ad_account_id.to_string()
        } else {
            format!("act_{ad_account_id}")
        };
        Self {
            http,
            access_token: access_token.to_string(),
            ad_account_id,
        }
    }

    /// Campaign-level insights URL for a range
    pub fn insights_url(&self, range: &DateRange) -> String {
        let time_range = serde_json::json!({
            "since": range.start.format("%Y-%m-%d").to_string(),
            "until": range.end.format("%Y-%m-%d").to_string(),
        });
        format!(
            "{GRAPH_URL}/{}/insights?access_token={}&level=campaign&fields={}&time_range={}",
            self.ad_account_id,
            urlencoding::encode(&self.access_token),
            urlencoding::encode(INSIGHT_FIELDS),
            urlencoding::encode(&time_range.to_string()),
        )
    }
}

impl AdsApi for MetaClient {
    fn platform(&self) -> ApiPlatform {
        ApiPlatform::Meta
    }

    async fn fetch_insights(&self, range: &DateRange) -> Result<FetchedKpiData, ApiError> {
        let response = self
            .http
            .get(self.insights_url(range))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let (insights, raw): (MetaInsightsResponse, _) = read_json(response).await?;
        let mut data = aggregate(&insights);
        data.raw = raw;
        tracing::debug!(
            "Meta insights: {} campaigns, spend {:.2}",
            insights.data.len(),
            data.spend
        );
        Ok(data)
    }
}

/// Insights response body
#[derive(Debug, Deserialize)]
pub struct MetaInsightsResponse {
    /// One row per campaign
    #[serde(default)]
    pub data: Vec<MetaCampaign>,
}

/// Campaign row (Meta sends numbers as strings)
#[derive(Debug, Deserialize)]
pub struct MetaCampaign {
    /// Spend
    #[serde(default, deserialize_with = "lenient_f64")]
    pub spend: f64,
    /// Impressions
    #[serde(default, deserialize_with = "lenient_f64")]
    pub impressions: f64,
    /// Click-through rate, if reported
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub ctr: Option<f64>,
    /// Purchase ROAS entries
    #[serde(default)]
    pub purchase_roas: Vec<MetaValue>,
    /// Action counters
    #[serde(default)]
    pub actions: Vec<MetaAction>,
}

/// `{ "value": "..." }` entry
#[derive(Debug, Deserialize)]
pub struct MetaValue {
    /// Value
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: f64,
}

/// Action counter
#[derive(Debug, Deserialize)]
pub struct MetaAction {
    /// Action kind (`link_click`, `purchase`...)
    pub action_type: String,
    /// Count
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: f64,
}

/// Aggregate campaign rows into one record
pub fn aggregate(insights: &MetaInsightsResponse) -> FetchedKpiData {
    let mut spend = 0.0;
    let mut impressions = 0.0;
    let mut clicks = 0.0;
    let mut ctrs = Vec::new();
    let mut roas = Vec::new();

    for campaign in &insights.data {
        spend += campaign.spend;
        impressions += campaign.impressions;
        if let Some(ctr) = campaign.ctr {
            ctrs.push(ctr);
        }
        if let Some(first) = campaign.purchase_roas.first() {
            roas.push(first.value);
        }
        clicks += campaign
            .actions
            .iter()
            .filter(|a| a.action_type == "link_click")
            .map(|a| a.value)
            .sum::<f64>();
    }

    FetchedKpiData {
        ctr: mean(&ctrs),
        roas: mean(&roas),
        ..FetchedKpiData::new(ApiPlatform::Meta, spend, impressions, clicks)
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const FIXTURE: &str = r#"{
        "data": [
            {
                "spend": "120.50",
                "impressions": "10000",
                "cpc": "0.5",
                "ctr": "1.2",
                "purchase_roas": [{"action_type": "omni_purchase", "value": "3.5"}],
                "actions": [
                    {"action_type": "link_click", "value": "200"},
                    {"action_type": "post_engagement", "value": "900"}
                ]
            },
            {
                "spend": "79.50",
                "impressions": "5000",
                "ctr": "0.8",
                "actions": [{"action_type": "link_click", "value": "50"}]
            },
            {
                "spend": "oops",
                "impressions": "1000"
            }
        ],
        "paging": {"cursors": {}}
    }"#;

    #[test]
    fn test_aggregate_fixture() {
        let insights: MetaInsightsResponse = serde_json::from_str(FIXTURE).unwrap();
        let data = aggregate(&insights);
        assert_eq!(data.platform, ApiPlatform::Meta);
        assert!((data.spend - 200.0).abs() < 1e-9);
        assert_eq!(data.impressions, 16_000.0);
        assert_eq!(data.clicks, 250.0);
        assert!((data.cpc - 0.8).abs() < 1e-9);
        assert!((data.ctr.unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(data.roas, Some(3.5));
    }

    #[test]
    fn test_aggregate_empty() {
        let insights: MetaInsightsResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        let data = aggregate(&insights);
        assert_eq!(data.spend, 0.0);
        assert_eq!(data.cpc, 0.0);
        assert_eq!(data.ctr, None);
        assert_eq!(data.roas, None);
    }

    #[test]
    fn test_insights_url() {
        let client = MetaClient::new(reqwest::Client::new(), "EAAB tok", "123");
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        );
        let url = client.insights_url(&range);
        assert!(url.starts_with("https://graph.facebook.com/v19.0/act_123/insights?"));
        assert!(url.contains("access_token=EAAB%20tok"));
        assert!(url.contains("level=campaign"));
        assert!(url.contains("since%22%3A%222026-03-01"));
    }
}
