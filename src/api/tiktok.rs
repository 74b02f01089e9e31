//! TikTok Business API client

use serde::{Deserialize, Serialize};

use crate::models::{ApiPlatform, DateRange, FetchedKpiData};

use super::{AdsApi, ApiError, lenient_f64, map_reqwest_error, read_json};

/// Integrated report endpoint
pub const REPORT_URL: &str = "https://business-api.tiktok.com/open_api/v1.3/reports/integrated/get/";

const METRICS: [&str; 9] = [
    "spend",
    "cpc",
    "clicks",
    "conversion",
    "video_views_p75",
    "comments",
    "likes",
    "shares",
    "impressions",
];

/// TikTok Business API client
pub struct TikTokClient {
    http: reqwest::Client,
    access_token: String,
    advertiser_id: String,
}

impl TikTokClient {
    /// Create a client for an advertiser
    pub fn new(http: reqwest::Client, access_token: &str, advertiser_id: &str) -> Self {
        Self {
            http,
            access_token: access_token.to_string(),
            advertiser_id: advertiser_id.to_string(),
        }
    }

    /// Report request body for a range
    pub fn report_request(&self, range: &DateRange) -> ReportRequest {
        ReportRequest {
            advertiser_id: self.advertiser_id.clone(),
            service_type: "AUCTION",
            report_type: "BASIC",
            data_level: "AUCTION_CAMPAIGN",
            dimensions: vec!["campaign_id", "stat_time_day"],
            metrics: METRICS.to_vec(),
            start_date: range.start.format("%Y-%m-%d").to_string(),
            end_date: range.end.format("%Y-%m-%d").to_string(),
            page_size: 1000,
        }
    }
}

impl AdsApi for TikTokClient {
    fn platform(&self) -> ApiPlatform {
        ApiPlatform::TikTok
    }

    async fn fetch_insights(&self, range: &DateRange) -> Result<FetchedKpiData, ApiError> {
        let response = self
            .http
            .post(REPORT_URL)
            .header("Access-Token", &self.access_token)
            .json(&self.report_request(range))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let (report, raw): (TikTokResponse, _) = read_json(response).await?;
        if report.code != 0 {
            return Err(ApiError::Vendor {
                code: report.code,
                message: report.message,
            });
        }

        let rows = report.data.map(|d| d.list).unwrap_or_default();
        tracing::debug!("TikTok report: {} rows", rows.len());
        let mut data = aggregate(&rows);
        data.raw = raw;
        Ok(data)
    }
}

/// Body of the integrated report request
#[derive(Debug, Serialize)]
pub struct ReportRequest {
    advertiser_id: String,
    service_type: &'static str,
    report_type: &'static str,
    data_level: &'static str,
    dimensions: Vec<&'static str>,
    metrics: Vec<&'static str>,
    start_date: String,
    end_date: String,
    page_size: u32,
}

/// Response envelope (`code` 0 means success)
#[derive(Debug, Deserialize)]
pub struct TikTokResponse {
    /// Vendor status code
    #[serde(default)]
    pub code: i64,
    /// Vendor message
    #[serde(default)]
    pub message: String,
    /// Payload
    #[serde(default)]
    pub data: Option<TikTokData>,
}

/// Report payload
#[derive(Debug, Default, Deserialize)]
pub struct TikTokData {
    /// Report rows
    #[serde(default)]
    pub list: Vec<TikTokRow>,
}

/// One row of the report
#[derive(Debug, Default, Deserialize)]
pub struct TikTokRow {
    /// Metric values
    #[serde(default)]
    pub metrics: TikTokMetrics,
}

/// Metric values (TikTok sends most of them as strings)
#[derive(Debug, Default, Deserialize)]
#[allow(missing_docs)]
pub struct TikTokMetrics {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub spend: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cpc: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub clicks: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub conversion: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub impressions: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub likes: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub comments: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub shares: f64,
}

/// Aggregate report rows: sums, mean row cpc and engagement rate
pub fn aggregate(rows: &[TikTokRow]) -> FetchedKpiData {
    let sum = |f: fn(&TikTokMetrics) -> f64| rows.iter().map(|r| f(&r.metrics)).sum::<f64>();

    let spend = sum(|m| m.spend);
    let impressions = sum(|m| m.impressions);
    let clicks = sum(|m| m.clicks);
    let conversions = sum(|m| m.conversion);
    let interactions = sum(|m| m.likes) + sum(|m| m.comments) + sum(|m| m.shares);

    let cpc = if rows.is_empty() {
        0.0
    } else {
        sum(|m| m.cpc) / rows.len() as f64
    };
    let engagement_rate = (impressions > 0.0).then(|| interactions / impressions * 100.0);

    FetchedKpiData {
        cpc,
        conversions: Some(conversions),
        engagement_rate,
        ..FetchedKpiData::new(ApiPlatform::TikTok, spend, impressions, clicks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::parse_body;
    use chrono::NaiveDate;

    const FIXTURE: &str = r#"{
        "code": 0,
        "message": "OK",
        "request_id": "2026031712",
        "data": {
            "page_info": {"page": 1, "total_number": 2},
            "list": [
                {
                    "dimensions": {"campaign_id": "17", "stat_time_day": "2026-03-01 00:00:00"},
                    "metrics": {"spend": "40.00", "cpc": "0.40", "clicks": "100", "conversion": "4",
                                "impressions": "5000", "likes": "300", "comments": "20", "shares": "30"}
                },
                {
                    "dimensions": {"campaign_id": "17", "stat_time_day": "2026-03-02 00:00:00"},
                    "metrics": {"spend": "60.00", "cpc": "0.60", "clicks": "100", "conversion": "6",
                                "impressions": "5000", "likes": "100", "comments": "30", "shares": "20"}
                }
            ]
        }
    }"#;

    #[test]
    fn test_aggregate_fixture() {
        let (report, _): (TikTokResponse, _) = parse_body(FIXTURE).unwrap();
        assert_eq!(report.code, 0);
        let rows = report.data.unwrap().list;
        let data = aggregate(&rows);

        assert_eq!(data.platform, ApiPlatform::TikTok);
        assert!((data.spend - 100.0).abs() < 1e-9);
        assert_eq!(data.impressions, 10_000.0);
        assert_eq!(data.clicks, 200.0);
        assert!((data.cpc - 0.5).abs() < 1e-9);
        assert_eq!(data.conversions, Some(10.0));
        assert!((data.engagement_rate.unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_no_rows() {
        let data = aggregate(&[]);
        assert_eq!(data.cpc, 0.0);
        assert_eq!(data.engagement_rate, None);
        assert_eq!(data.conversions, Some(0.0));
    }

    #[test]
    fn test_error_envelope() {
        let (report, _): (TikTokResponse, _) =
            parse_body(r#"{"code": 40105, "message": "Access token is invalid", "data": {}}"#).unwrap();
        assert_eq!(report.code, 40105);
        assert_eq!(report.message, "Access token is invalid");
    }

    #[test]
    fn test_report_request_body() {
        let client = TikTokClient::new(reqwest::Client::new(), "tok", "7000");
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        );
        let body = serde_json::to_value(client.report_request(&range)).unwrap();
        assert_eq!(body["advertiser_id"], "7000");
        assert_eq!(body["data_level"], "AUCTION_CAMPAIGN");
        assert_eq!(body["start_date"], "2026-03-01");
        assert_eq!(body["end_date"], "2026-03-31");
        assert_eq!(body["page_size"], 1000);
        assert_eq!(body["metrics"].as_array().unwrap().len(), 9);
    }
}
