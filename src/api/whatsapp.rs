//! WhatsApp Business Cloud analytics client

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use crate::models::{ApiPlatform, DateRange, FetchedKpiData};

use super::meta::GRAPH_URL;
use super::{AdsApi, ApiError, lenient_f64, map_reqwest_error, read_json};

/// WhatsApp Business account analytics client
pub struct WhatsAppClient {
    http: reqwest::Client,
    access_token: String,
    waba_id: String,
}

impl WhatsAppClient {
    /// Create a client for a WhatsApp Business account
    pub fn new(http: reqwest::Client, access_token: &str, waba_id: &str) -> Self {
        Self {
            http,
            access_token: access_token.to_string(),
            waba_id: waba_id.to_string(),
        }
    }

    /// Analytics URL; the range is sent as unix seconds covering whole UTC days
    pub fn analytics_url(&self, range: &DateRange) -> String {
        let start = unix_seconds(range.start, NaiveTime::MIN);
        let end = unix_seconds(range.end, NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN));
        format!(
            "{GRAPH_URL}/{}?access_token={}&start={start}&end={end}&granularity=daily",
            urlencoding::encode(&self.waba_id),
            urlencoding::encode(&self.access_token),
        )
    }
}

fn unix_seconds(day: NaiveDate, time: NaiveTime) -> i64 {
    DateTime::<Utc>::from_naive_utc_and_offset(day.and_time(time), Utc).timestamp()
}

impl AdsApi for WhatsAppClient {
    fn platform(&self) -> ApiPlatform {
        ApiPlatform::WhatsApp
    }

    async fn fetch_insights(&self, range: &DateRange) -> Result<FetchedKpiData, ApiError> {
        let response = self
            .http
            .get(self.analytics_url(range))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let (analytics, raw): (WhatsAppAnalytics, _) = read_json(response).await?;
        let mut data = aggregate(&analytics);
        data.raw = raw;
        Ok(data)
    }
}

/// Analytics response body
#[derive(Debug, Default, Deserialize)]
pub struct WhatsAppAnalytics {
    /// Conversation analytics block
    #[serde(default)]
    pub conversation_analytics: Option<ConversationAnalytics>,
    /// Messages delivered in the range
    #[serde(default, deserialize_with = "lenient_f64")]
    pub messages_delivered: f64,
}

/// Conversation cost entries
#[derive(Debug, Default, Deserialize)]
pub struct ConversationAnalytics {
    /// One entry per conversation bucket
    #[serde(default)]
    pub cost: Vec<CostEntry>,
}

/// Cost of one bucket
#[derive(Debug, Deserialize)]
pub struct CostEntry {
    /// Amount
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: f64,
}

/// Conversations stand in for impressions and delivered messages for clicks
pub fn aggregate(analytics: &WhatsAppAnalytics) -> FetchedKpiData {
    let costs = analytics
        .conversation_analytics
        .as_ref()
        .map(|c| c.cost.as_slice())
        .unwrap_or_default();
    let spend: f64 = costs.iter().map(|c| c.value).sum();
    let conversations = costs.len() as f64;
    let delivered = analytics.messages_delivered;

    FetchedKpiData {
        cpc: if conversations > 0.0 { spend / conversations } else { 0.0 },
        conversions: Some(delivered),
        ..FetchedKpiData::new(ApiPlatform::WhatsApp, spend, conversations, delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::parse_body;

    #[test]
    fn test_aggregate_fixture() {
        let (analytics, _): (WhatsAppAnalytics, _) = parse_body(
            r#"{
                "id": "1029",
                "messages_delivered": 480,
                "conversation_analytics": {
                    "cost": [{"value": 1.5}, {"value": 2.5}, {"value": "2.0"}, {"value": 0}]
                }
            }"#,
        )
        .unwrap();
        let data = aggregate(&analytics);
        assert_eq!(data.platform, ApiPlatform::WhatsApp);
        assert!((data.spend - 6.0).abs() < 1e-9);
        assert_eq!(data.impressions, 4.0);
        assert_eq!(data.clicks, 480.0);
        assert!((data.cpc - 1.5).abs() < 1e-9);
        assert_eq!(data.conversions, Some(480.0));
    }

    #[test]
    fn test_aggregate_without_analytics() {
        let (analytics, _): (WhatsAppAnalytics, _) = parse_body(r#"{"id": "1029"}"#).unwrap();
        let data = aggregate(&analytics);
        assert_eq!(data.spend, 0.0);
        assert_eq!(data.impressions, 0.0);
        assert_eq!(data.cpc, 0.0);
    }

    #[test]
    fn test_analytics_url_uses_whole_days() {
        let client = WhatsAppClient::new(reqwest::Client::new(), "EAAG", "1029");
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        );
        let url = client.analytics_url(&range);
        assert!(url.starts_with("https://graph.facebook.com/v19.0/1029?access_token=EAAG"));
        // 2026-03-01T00:00:00Z and 2026-03-02T23:59:59Z
        assert!(url.contains("start=1772323200"));
        assert!(url.contains("end=1772495999"));
        assert!(url.ends_with("granularity=daily"));
    }
}
