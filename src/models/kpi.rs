//! Monthly KPI records and the latest-vs-previous summary

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::FetchedKpiData;

/// Reach-side metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Awareness {
    /// Unique accounts reached
    #[serde(default, deserialize_with = "metric_value")]
    pub reach: f64,
    /// Total impressions
    #[serde(default, deserialize_with = "metric_value")]
    pub impressions: f64,
    /// Share of voice (%)
    #[serde(default, deserialize_with = "metric_value")]
    pub share_of_voice: f64,
    /// Audience growth (%)
    #[serde(default, deserialize_with = "metric_value")]
    pub growth_rate: f64,
}

/// Interaction metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Engagement {
    /// Likes
    #[serde(default, deserialize_with = "metric_value")]
    pub likes: f64,
    /// Comments
    #[serde(default, deserialize_with = "metric_value")]
    pub comments: f64,
    /// Shares
    #[serde(default, deserialize_with = "metric_value")]
    pub shares: f64,
    /// Saves
    #[serde(default, deserialize_with = "metric_value")]
    pub saves: f64,
    /// Engagement rate (%)
    #[serde(default, deserialize_with = "metric_value")]
    pub engagement_rate: f64,
    /// Sentiment score
    #[serde(default, deserialize_with = "metric_value")]
    pub sentiment: f64,
}

/// Traffic and conversion metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    /// Clicks
    #[serde(default, deserialize_with = "metric_value")]
    pub clicks: f64,
    /// Click-through rate (%)
    #[serde(default, deserialize_with = "metric_value")]
    pub ctr: f64,
    /// Conversions
    #[serde(default, deserialize_with = "metric_value")]
    pub conversions: f64,
    /// Bounce rate (%)
    #[serde(default, deserialize_with = "metric_value")]
    pub bounce_rate: f64,
    /// Leads
    #[serde(default, deserialize_with = "metric_value")]
    pub leads: f64,
}

/// Cost metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Financials {
    /// Total ad spend
    #[serde(default, deserialize_with = "metric_value")]
    pub total_spend: f64,
    /// Cost per click
    #[serde(default, deserialize_with = "metric_value")]
    pub cpc: f64,
    /// Cost per mille
    #[serde(default, deserialize_with = "metric_value")]
    pub cpm: f64,
    /// Cost per lead
    #[serde(default, deserialize_with = "metric_value")]
    pub cpl: f64,
    /// Return on ad spend
    #[serde(default, deserialize_with = "metric_value")]
    pub roas: f64,
    /// Customer acquisition cost
    #[serde(default, deserialize_with = "metric_value")]
    pub cac: f64,
}

/// Stored metric value; `null` (how JSON writes NaN and infinities) reads as 0
fn metric_value<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = Option::<f64>::deserialize(d)?;
    Ok(value.filter(|v| v.is_finite()).unwrap_or(0.0))
}

/// Monthly metrics of a brand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiRecord {
    /// Unique identifier
    pub id: Uuid,
    /// Owning brand
    pub brand_id: Uuid,
    /// Month as `YYYY-MM`
    pub month: String,
    /// Awareness block
    #[serde(default)]
    pub awareness: Awareness,
    /// Engagement block
    #[serde(default)]
    pub engagement: Engagement,
    /// Performance block
    #[serde(default)]
    pub performance: Performance,
    /// Financials block
    #[serde(default)]
    pub financials: Financials,
}

/// Every addressable metric name, in display order
pub const METRIC_NAMES: &[&str] = &[
    "awareness.reach",
    "awareness.impressions",
    "awareness.share_of_voice",
    "awareness.growth_rate",
    "engagement.likes",
    "engagement.comments",
    "engagement.shares",
    "engagement.saves",
    "engagement.engagement_rate",
    "engagement.sentiment",
    "performance.clicks",
    "performance.ctr",
    "performance.conversions",
    "performance.bounce_rate",
    "performance.leads",
    "financials.total_spend",
    "financials.cpc",
    "financials.cpm",
    "financials.cpl",
    "financials.roas",
    "financials.cac",
];

impl KpiRecord {
    /// Empty record for a brand and month
    pub fn new(brand_id: Uuid, month: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            brand_id,
            month: month.into(),
            awareness: Awareness::default(),
            engagement: Engagement::default(),
            performance: Performance::default(),
            financials: Financials::default(),
        }
    }

    /// Canonical `group.field` name for a metric name or alias
    fn canonical(name: &str) -> Option<&'static str> {
        let key: String = name
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
            .collect();
        let field = key.rsplit('.').next().unwrap_or(&key);
        let canonical = match field {
            "reach" => "awareness.reach",
            "impressions" => "awareness.impressions",
            "shareofvoice" | "sov" => "awareness.share_of_voice",
            "growthrate" | "growth" => "awareness.growth_rate",
            "likes" => "engagement.likes",
            "comments" => "engagement.comments",
            "shares" => "engagement.shares",
            "saves" => "engagement.saves",
            "engagementrate" | "er" => "engagement.engagement_rate",
            "sentiment" => "engagement.sentiment",
            "clicks" => "performance.clicks",
            "ctr" => "performance.ctr",
            "conversions" => "performance.conversions",
            "bouncerate" => "performance.bounce_rate",
            "leads" => "performance.leads",
            "totalspend" | "spend" | "cost" => "financials.total_spend",
            "cpc" => "financials.cpc",
            "cpm" => "financials.cpm",
            "cpl" => "financials.cpl",
            "roas" => "financials.roas",
            "cac" => "financials.cac",
            _ => return None,
        };
        Some(canonical)
    }

    /// Every metric with its canonical name, in [`METRIC_NAMES`] order
    pub fn values(&self) -> [(&'static str, f64); 21] {
        let (a, e, p, f) = (&self.awareness, &self.engagement, &self.performance, &self.financials);
        [
            ("awareness.reach", a.reach),
            ("awareness.impressions", a.impressions),
            ("awareness.share_of_voice", a.share_of_voice),
            ("awareness.growth_rate", a.growth_rate),
            ("engagement.likes", e.likes),
            ("engagement.comments", e.comments),
            ("engagement.shares", e.shares),
            ("engagement.saves", e.saves),
            ("engagement.engagement_rate", e.engagement_rate),
            ("engagement.sentiment", e.sentiment),
            ("performance.clicks", p.clicks),
            ("performance.ctr", p.ctr),
            ("performance.conversions", p.conversions),
            ("performance.bounce_rate", p.bounce_rate),
            ("performance.leads", p.leads),
            ("financials.total_spend", f.total_spend),
            ("financials.cpc", f.cpc),
            ("financials.cpm", f.cpm),
            ("financials.cpl", f.cpl),
            ("financials.roas", f.roas),
            ("financials.cac", f.cac),
        ]
    }

    fn slot_mut(&mut self, canonical: &str) -> Option<&mut f64> {
        let slot = match canonical {
            "awareness.reach" => &mut self.awareness.reach,
            "awareness.impressions" => &mut self.awareness.impressions,
            "awareness.share_of_voice" => &mut self.awareness.share_of_voice,
            "awareness.growth_rate" => &mut self.awareness.growth_rate,
            "engagement.likes" => &mut self.engagement.likes,
            "engagement.comments" => &mut self.engagement.comments,
            "engagement.shares" => &mut self.engagement.shares,
            "engagement.saves" => &mut self.engagement.saves,
            "engagement.engagement_rate" => &mut self.engagement.engagement_rate,
            "engagement.sentiment" => &mut self.engagement.sentiment,
            "performance.clicks" => &mut self.performance.clicks,
            "performance.ctr" => &mut self.performance.ctr,
            "performance.conversions" => &mut self.performance.conversions,
            "performance.bounce_rate" => &mut self.performance.bounce_rate,
            "performance.leads" => &mut self.performance.leads,
            "financials.total_spend" => &mut self.financials.total_spend,
            "financials.cpc" => &mut self.financials.cpc,
            "financials.cpm" => &mut self.financials.cpm,
            "financials.cpl" => &mut self.financials.cpl,
            "financials.roas" => &mut self.financials.roas,
            "financials.cac" => &mut self.financials.cac,
            _ => return None,
        };
        Some(slot)
    }

    /// Set a metric by name (`reach`, `awareness.reach`, `er`, `spend`...).
    ///
    /// Returns false when the name is not a known metric or the value is
    /// NaN or infinite.
    pub fn set_metric(&mut self, name: &str, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        match Self::canonical(name).and_then(|c| self.slot_mut(c)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Read a metric by name
    pub fn metric(&self, name: &str) -> Option<f64> {
        let canonical = Self::canonical(name)?;
        self.values()
            .into_iter()
            .find(|(n, _)| *n == canonical)
            .map(|(_, v)| v)
    }

    /// Fold API fetch results into a record for `month`.
    ///
    /// Spend, impressions, clicks and conversions are totalled; cpc and ctr are
    /// derived from the totals; roas is the mean over platforms reporting it.
    pub fn from_fetched(brand_id: Uuid, month: impl Into<String>, data: &[FetchedKpiData]) -> Self {
        let mut record = Self::new(brand_id, month);
        record.merge_fetched(data);
        record
    }

    /// Overwrite the API-sourced metrics of this record with fetched data
    pub fn merge_fetched(&mut self, data: &[FetchedKpiData]) {
        let spend: f64 = data.iter().map(|d| d.spend).sum();
        let impressions: f64 = data.iter().map(|d| d.impressions).sum();
        let clicks: f64 = data.iter().map(|d| d.clicks).sum();
        let conversions: f64 = data.iter().filter_map(|d| d.conversions).sum();
        let roas: Vec<f64> = data.iter().filter_map(|d| d.roas).collect();

        self.financials.total_spend = spend;
        self.awareness.impressions = impressions;
        self.performance.clicks = clicks;
        self.performance.conversions = conversions;
        self.financials.cpc = if clicks > 0.0 { spend / clicks } else { 0.0 };
        self.performance.ctr = if impressions > 0.0 {
            clicks / impressions * 100.0
        } else {
            0.0
        };
        self.financials.cpm = if impressions > 0.0 {
            spend / impressions * 1000.0
        } else {
            0.0
        };
        if !roas.is_empty() {
            self.financials.roas = roas.iter().sum::<f64>() / roas.len() as f64;
        }
        let rates: Vec<f64> = data.iter().filter_map(|d| d.engagement_rate).collect();
        if !rates.is_empty() {
            self.engagement.engagement_rate = rates.iter().sum::<f64>() / rates.len() as f64;
        }
    }
}

/// Direction of a metric compared with the previous month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    /// Improved (or no previous month)
    Up,
    /// Same or worse
    Down,
}

impl Trend {
    /// Arrow glyph
    pub const fn arrow(&self) -> &'static str {
        match self {
            Self::Up => "▲",
            Self::Down => "▼",
        }
    }
}

/// One summary card
#[derive(Debug, Clone, PartialEq)]
pub struct MetricCard {
    /// Card title
    pub title: &'static str,
    /// Formatted latest value
    pub value: String,
    /// Signed change vs previous month
    pub change: String,
    /// Trend direction
    pub trend: Trend,
}

/// Latest-vs-previous month summary for a brand
#[derive(Debug, Clone, PartialEq)]
pub struct KpiSummary {
    /// Month of the latest record
    pub month: String,
    /// Total reach
    pub reach: MetricCard,
    /// Engagement rate
    pub engagement_rate: MetricCard,
    /// Total spend
    pub spend: MetricCard,
    /// Return on ad spend
    pub roas: MetricCard,
}

impl KpiSummary {
    /// Build from records ordered by month; `None` when there are none
    pub fn from_records(records: &[KpiRecord]) -> Option<Self> {
        let latest = records.last()?;
        let previous = records.len().checked_sub(2).and_then(|i| records.get(i));

        let card = |title, value: String, pick: fn(&KpiRecord) -> f64| {
            let current = pick(latest);
            let prev = previous.map(pick);
            MetricCard {
                title,
                value,
                change: change_string(current, prev),
                trend: trend(current, prev),
            }
        };

        Some(Self {
            month: latest.month.clone(),
            reach: card(
                "Total Reach",
                format_reach(latest.awareness.reach),
                |r| r.awareness.reach,
            ),
            engagement_rate: card(
                "Engagement Rate",
                format!("{:.1}%", latest.engagement.engagement_rate),
                |r| r.engagement.engagement_rate,
            ),
            spend: card(
                "Total Spend",
                format!("${:.1}k", latest.financials.total_spend / 1000.0),
                |r| r.financials.total_spend,
            ),
            roas: card(
                "ROAS",
                format!("{:.1}×", latest.financials.roas),
                |r| r.financials.roas,
            ),
        })
    }

    /// Cards in display order
    pub fn cards(&self) -> [&MetricCard; 4] {
        [&self.reach, &self.engagement_rate, &self.spend, &self.roas]
    }
}

fn format_reach(reach: f64) -> String {
    if reach > 1_000_000.0 {
        format!("{:.1}M", reach / 1_000_000.0)
    } else {
        format!("{:.0}k", reach / 1000.0)
    }
}

/// Signed percent change with one decimal (`+0%` without a usable previous)
pub fn change_string(current: f64, previous: Option<f64>) -> String {
    match previous {
        Some(prev) if prev != 0.0 => {
            let change = (current - prev) / prev * 100.0;
            if change > 0.0 {
                format!("+{change:.1}%")
            } else {
                format!("{change:.1}%")
            }
        }
        _ => "+0%".to_string(),
    }
}

fn trend(current: f64, previous: Option<f64>) -> Trend {
    match previous {
        Some(prev) if current <= prev => Trend::Down,
        _ => Trend::Up,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApiPlatform;

    fn record(month: &str, reach: f64, spend: f64) -> KpiRecord {
        let mut r = KpiRecord::new(Uuid::nil(), month);
        r.awareness.reach = reach;
        r.financials.total_spend = spend;
        r
    }

    #[test]
    fn test_set_metric_accepts_aliases() {
        let mut r = KpiRecord::new(Uuid::nil(), "2026-01");
        assert!(r.set_metric("awareness.reach", 1200.0));
        assert!(r.set_metric("ER", 4.5));
        assert!(r.set_metric("cost", 300.0));
        assert!(r.set_metric("Total Spend", 350.0));
        assert!(!r.set_metric("followers", 1.0));
        assert_eq!(r.metric("reach"), Some(1200.0));
        assert_eq!(r.engagement.engagement_rate, 4.5);
        assert_eq!(r.financials.total_spend, 350.0);
    }

    #[test]
    fn test_set_metric_rejects_non_finite() {
        let mut r = KpiRecord::new(Uuid::nil(), "2026-01");
        r.set_metric("reach", 10.0);
        assert!(!r.set_metric("reach", f64::NAN));
        assert!(!r.set_metric("roas", f64::INFINITY));
        assert!(!r.set_metric("spend", f64::NEG_INFINITY));
        assert_eq!(r.metric("reach"), Some(10.0));
        assert_eq!(r.metric("roas"), Some(0.0));
    }

    #[test]
    fn test_metric_reads_every_name() {
        let mut r = KpiRecord::new(Uuid::nil(), "2026-01");
        for (i, name) in METRIC_NAMES.iter().enumerate() {
            assert!(r.set_metric(name, i as f64), "{name}");
        }
        for (i, name) in METRIC_NAMES.iter().enumerate() {
            assert_eq!(r.metric(name), Some(i as f64), "{name}");
        }
        let names: Vec<_> = r.values().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, METRIC_NAMES);
        assert_eq!(r.metric("followers"), None);
    }

    #[test]
    fn test_null_metrics_read_as_zero() {
        let awareness: Awareness =
            serde_json::from_str(r#"{"reach":null,"impressions":12.0,"share_of_voice":1.0}"#).unwrap();
        assert_eq!(awareness.reach, 0.0);
        assert_eq!(awareness.impressions, 12.0);
        assert_eq!(awareness.growth_rate, 0.0);
    }

    #[test]
    fn test_summary_without_previous() {
        let summary = KpiSummary::from_records(&[record("2026-01", 2_500_000.0, 1500.0)]).unwrap();
        assert_eq!(summary.reach.value, "2.5M");
        assert_eq!(summary.reach.change, "+0%");
        assert_eq!(summary.reach.trend, Trend::Up);
        assert_eq!(summary.spend.value, "$1.5k");
    }

    #[test]
    fn test_summary_compares_with_previous() {
        let records = [
            record("2026-01", 40_000.0, 2000.0),
            record("2026-02", 50_000.0, 1000.0),
        ];
        let summary = KpiSummary::from_records(&records).unwrap();
        assert_eq!(summary.month, "2026-02");
        assert_eq!(summary.reach.value, "50k");
        assert_eq!(summary.reach.change, "+25.0%");
        assert_eq!(summary.reach.trend, Trend::Up);
        assert_eq!(summary.spend.change, "-50.0%");
        assert_eq!(summary.spend.trend, Trend::Down);
        // previous roas is zero
        assert_eq!(summary.roas.change, "+0%");
        assert_eq!(summary.roas.trend, Trend::Down);
    }

    #[test]
    fn test_summary_empty() {
        assert!(KpiSummary::from_records(&[]).is_none());
    }

    #[test]
    fn test_from_fetched_totals_and_derives() {
        let meta = FetchedKpiData {
            roas: Some(3.0),
            ..FetchedKpiData::new(ApiPlatform::Meta, 100.0, 10_000.0, 50.0)
        };
        let tiktok = FetchedKpiData {
            conversions: Some(4.0),
            ..FetchedKpiData::new(ApiPlatform::TikTok, 100.0, 10_000.0, 150.0)
        };
        let r = KpiRecord::from_fetched(Uuid::nil(), "2026-03", &[meta, tiktok]);
        assert_eq!(r.financials.total_spend, 200.0);
        assert_eq!(r.awareness.impressions, 20_000.0);
        assert_eq!(r.performance.clicks, 200.0);
        assert_eq!(r.performance.conversions, 4.0);
        assert_eq!(r.financials.cpc, 1.0);
        assert_eq!(r.performance.ctr, 1.0);
        assert_eq!(r.financials.roas, 3.0);
    }
}
