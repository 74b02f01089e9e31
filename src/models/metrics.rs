//! Unified results of marketing API fetches

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ApiPlatform;

/// Inclusive date range for API queries and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day
    pub start: NaiveDate,
    /// Last day
    pub end: NaiveDate,
}

impl DateRange {
    /// Range from `start` to `end`, swapped if given backwards
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// The last `days` days ending on `today`
    pub fn last_days_from(today: NaiveDate, days: u32) -> Self {
        Self::new(today - Duration::days(i64::from(days)), today)
    }

    /// The last `days` days ending today
    pub fn last_days(days: u32) -> Self {
        Self::last_days_from(Local::now().date_naive(), days)
    }

    /// Whether `day` falls inside the range
    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }

    /// `YYYY-MM` of the range end (month a sync is attributed to)
    pub fn end_month(&self) -> String {
        self.end.format("%Y-%m").to_string()
    }
}

/// Normalized numbers fetched from one platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedKpiData {
    /// Source API
    pub platform: ApiPlatform,
    /// Total spend
    pub spend: f64,
    /// Total impressions
    pub impressions: f64,
    /// Total clicks
    pub clicks: f64,
    /// Cost per click
    pub cpc: f64,
    /// Click-through rate (%)
    pub ctr: Option<f64>,
    /// Return on ad spend
    pub roas: Option<f64>,
    /// Engagement rate (%)
    pub engagement_rate: Option<f64>,
    /// Conversions
    pub conversions: Option<f64>,
    /// Raw response body
    #[serde(default)]
    pub raw: serde_json::Value,
    /// When the data was fetched
    pub fetched_at: DateTime<Utc>,
}

impl FetchedKpiData {
    /// Base record with the always-present totals
    pub fn new(platform: ApiPlatform, spend: f64, impressions: f64, clicks: f64) -> Self {
        Self {
            platform,
            spend,
            impressions,
            clicks,
            cpc: if clicks > 0.0 { spend / clicks } else { 0.0 },
            ctr: None,
            roas: None,
            engagement_rate: None,
            conversions: None,
            raw: serde_json::Value::Null,
            fetched_at: Utc::now(),
        }
    }
}

/// A platform that failed during a fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchError {
    /// Platform key, or `system` for errors not tied to one
    pub platform: String,
    /// Human-readable reason
    pub message: String,
}

impl FetchError {
    /// Error tied to a platform
    pub fn platform(platform: ApiPlatform, message: impl Into<String>) -> Self {
        Self {
            platform: platform.as_str().to_string(),
            message: message.into(),
        }
    }

    /// Error not tied to a platform
    pub fn system(message: impl Into<String>) -> Self {
        Self {
            platform: "system".to_string(),
            message: message.into(),
        }
    }
}

/// Outcome of fetching every connected platform of a brand
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFetchResult {
    /// False only when the fetch could not run at all
    pub success: bool,
    /// Data from platforms that succeeded
    pub data: Vec<FetchedKpiData>,
    /// Per-platform failures
    pub errors: Vec<FetchError>,
}

impl DataFetchResult {
    /// Failed result with a single system error
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            errors: vec![FetchError::system(message)],
        }
    }

    /// One-line description for status bars
    pub fn summary(&self) -> String {
        if !self.success {
            return self
                .errors
                .first()
                .map_or_else(|| "Fetch failed".to_string(), |e| e.message.clone());
        }
        let spend: f64 = self.data.iter().map(|d| d.spend).sum();
        let mut text = format!(
            "Fetched {} platform(s), spend ${spend:.2}",
            self.data.len()
        );
        if !self.errors.is_empty() {
            text.push_str(&format!(", {} failed", self.errors.len()));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_days_range() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let range = DateRange::last_days_from(today, 30);
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(range.end, today);
        assert_eq!(range.end_month(), "2026-03");
    }

    #[test]
    fn test_range_is_normalized() {
        let a = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        let range = DateRange::new(a, b);
        assert_eq!(range.start, b);
        assert!(range.contains(NaiveDate::from_ymd_opt(2026, 4, 15).unwrap()));
    }

    #[test]
    fn test_summary_lists_failures() {
        let result = DataFetchResult {
            success: true,
            data: vec![FetchedKpiData::new(ApiPlatform::Meta, 12.5, 100.0, 5.0)],
            errors: vec![FetchError::platform(ApiPlatform::TikTok, "401")],
        };
        assert_eq!(result.summary(), "Fetched 1 platform(s), spend $12.50, 1 failed");
        assert_eq!(DataFetchResult::failed("Brand not found").summary(), "Brand not found");
    }
}
