//! LinkedIn Marketing ad analytics client

use chrono::Datelike;
use serde::Deserialize;

use crate::models::{ApiPlatform, DateRange, FetchedKpiData};

use super::{AdsApi, ApiError, lenient_f64, map_reqwest_error, read_json};

const ANALYTICS_URL: &str = "https://api.linkedin.com/v2/adAnalyticsV2";
const ACCOUNT_URN_PREFIX: &str = "urn:li:sponsoredAccount:";
const FIELDS: &str = "costInLocalCurrency,impressions,clicks,externalWebsiteConversions";

/// LinkedIn ad analytics client
pub struct LinkedInClient {
    http: reqwest::Client,
    access_token: String,
    account_urn: String,
}

impl LinkedInClient {
    /// Create a client; bare account ids are turned into sponsored-account URNs
    pub fn new(http: reqwest::Client, access_token: &str, ad_account: &str) -> Self {
        let account_urn = if ad_account.starts_with("urn:") {
            ad_account.to_string()
        } else {
            format!("{ACCOUNT_URN_PREFIX}{ad_account}")
        };
        Self {
            http,
            access_token: access_token.to_string(),
            account_urn,
        }
    }

    /// Campaign-pivoted analytics URL for a range
    pub fn analytics_url(&self, range: &DateRange) -> String {
        let date = |d: chrono::NaiveDate| {
            serde_json::json!({ "year": d.year(), "month": d.month(), "day": d.day() })
        };
        let date_range = serde_json::json!({ "start": date(range.start), "end": date(range.end) });
        format!(
            "{ANALYTICS_URL}?q=analytics&pivot=CAMPAIGN&dateRange={}&accounts={}&fields={}",
            urlencoding::encode(&date_range.to_string()),
            urlencoding::encode(&self.account_urn),
            urlencoding::encode(FIELDS),
        )
    }
}

impl AdsApi for LinkedInClient {
    fn platform(&self) -> ApiPlatform {
        ApiPlatform::LinkedIn
    }

    async fn fetch_insights(&self, range: &DateRange) -> Result<FetchedKpiData, ApiError> {
        let response = self
            .http
            .get(self.analytics_url(range))
            .bearer_auth(&self.access_token)
            .header("X-Restli-Protocol-Version", "2.0.0")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let (analytics, raw): (LinkedInAnalytics, _) = read_json(response).await?;
        let mut data = aggregate(&analytics);
        data.raw = raw;
        Ok(data)
    }
}

/// Analytics response body
#[derive(Debug, Deserialize)]
pub struct LinkedInAnalytics {
    /// One element per campaign
    #[serde(default)]
    pub elements: Vec<LinkedInElement>,
}

/// Campaign analytics
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct LinkedInElement {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cost_in_local_currency: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub impressions: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub clicks: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub external_website_conversions: f64,
}

/// Sum campaign elements; ctr is a percentage of impressions
pub fn aggregate(analytics: &LinkedInAnalytics) -> FetchedKpiData {
    let mut spend = 0.0;
    let mut impressions = 0.0;
    let mut clicks = 0.0;
    let mut conversions = 0.0;
    for element in &analytics.elements {
        spend += element.cost_in_local_currency;
        impressions += element.impressions;
        clicks += element.clicks;
        conversions += element.external_website_conversions;
    }

    FetchedKpiData {
        ctr: Some(if impressions > 0.0 { clicks / impressions * 100.0 } else { 0.0 }),
        conversions: Some(conversions),
        ..FetchedKpiData::new(ApiPlatform::LinkedIn, spend, impressions, clicks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::parse_body;
    use chrono::NaiveDate;

    #[test]
    fn test_aggregate_fixture() {
        let (analytics, _): (LinkedInAnalytics, _) = parse_body(
            r#"{
                "paging": {"count": 10, "start": 0},
                "elements": [
                    {"costInLocalCurrency": "150.0", "impressions": 20000, "clicks": 300, "externalWebsiteConversions": 12},
                    {"costInLocalCurrency": 50, "impressions": 5000, "clicks": 100}
                ]
            }"#,
        )
        .unwrap();
        let data = aggregate(&analytics);
        assert_eq!(data.platform, ApiPlatform::LinkedIn);
        assert_eq!(data.spend, 200.0);
        assert_eq!(data.impressions, 25_000.0);
        assert_eq!(data.clicks, 400.0);
        assert!((data.cpc - 0.5).abs() < 1e-9);
        assert!((data.ctr.unwrap() - 1.6).abs() < 1e-9);
        assert_eq!(data.conversions, Some(12.0));
    }

    #[test]
    fn test_aggregate_empty() {
        let (analytics, _): (LinkedInAnalytics, _) = parse_body(r#"{"elements": []}"#).unwrap();
        let data = aggregate(&analytics);
        assert_eq!(data.cpc, 0.0);
        assert_eq!(data.ctr, Some(0.0));
    }

    #[test]
    fn test_account_urn() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        );
        let bare = LinkedInClient::new(reqwest::Client::new(), "tok", "5551234");
        assert!(bare.analytics_url(&range).contains("accounts=urn%3Ali%3AsponsoredAccount%3A5551234"));

        let full = LinkedInClient::new(reqwest::Client::new(), "tok", "urn:li:sponsoredAccount:9");
        let url = full.analytics_url(&range);
        assert!(url.contains("accounts=urn%3Ali%3AsponsoredAccount%3A9&"));
        assert!(url.starts_with("https://api.linkedin.com/v2/adAnalyticsV2?q=analytics&pivot=CAMPAIGN"));
        assert!(url.contains("%22month%22%3A3"));
    }
}
