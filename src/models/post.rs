//! Planned post model

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Platform;

/// Workflow status of a planned post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Being written
    #[default]
    Draft,
    /// Signed off by the client
    Approved,
    /// Queued on the platform
    Scheduled,
    /// Live
    Published,
}

impl PostStatus {
    /// Get all statuses in workflow order
    pub const fn all() -> &'static [Self] {
        &[Self::Draft, Self::Approved, Self::Scheduled, Self::Published]
    }

    /// Get status as string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Approved => "approved",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
        }
    }

    /// Display label
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Approved => "Approved",
            Self::Scheduled => "Scheduled",
            Self::Published => "Published",
        }
    }

    /// Parse status from string (`posted` is accepted as published)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "approved" => Some(Self::Approved),
            "scheduled" => Some(Self::Scheduled),
            "published" | "posted" => Some(Self::Published),
            _ => None,
        }
    }

    /// Next status in the workflow (wraps around)
    pub const fn next(&self) -> Self {
        match self {
            Self::Draft => Self::Approved,
            Self::Approved => Self::Scheduled,
            Self::Scheduled => Self::Published,
            Self::Published => Self::Draft,
        }
    }

    /// Get emoji for status
    pub const fn emoji(&self) -> &'static str {
        match self {
            Self::Draft => "📝",
            Self::Approved => "👍",
            Self::Scheduled => "⏳",
            Self::Published => "✅",
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A planned post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: Uuid,
    /// Owning brand
    pub brand_id: Uuid,
    /// Publication day
    pub date: NaiveDate,
    /// Publication time (minute precision)
    pub time: NaiveTime,
    /// Target platform
    pub platform: Platform,
    /// What the post is meant to achieve
    pub objective: String,
    /// Workflow status
    pub status: PostStatus,
    /// Whether the post is promoted
    pub is_paid: bool,
    /// Promotion budget (0 when organic)
    pub budget: f64,
    /// Post copy
    pub copy: String,
    /// Creative URL
    pub image: Option<String>,
    /// Master campaign (groups posts across platforms)
    pub campaign_name: Option<String>,
    /// Ad set / ad group / campaign group
    pub ad_group_name: Option<String>,
    /// Platform-specific ad id
    pub ad_id: Option<String>,
    /// When the post was created
    pub created_at: DateTime<Utc>,
    /// Last modification
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    /// Publication day
    pub date: NaiveDate,
    /// Publication time
    pub time: NaiveTime,
    /// Target platform
    pub platform: Platform,
    /// Objective
    pub objective: String,
    /// Initial status
    #[serde(default)]
    pub status: PostStatus,
    /// Promoted?
    #[serde(default)]
    pub is_paid: bool,
    /// Promotion budget
    #[serde(default)]
    pub budget: f64,
    /// Copy
    pub copy: String,
    /// Creative URL
    #[serde(default)]
    pub image: Option<String>,
    /// Campaign
    #[serde(default)]
    pub campaign_name: Option<String>,
    /// Ad group
    #[serde(default)]
    pub ad_group_name: Option<String>,
    /// Ad id
    #[serde(default)]
    pub ad_id: Option<String>,
}

impl NewPost {
    /// Create a draft with the required fields
    pub fn new(date: NaiveDate, time: NaiveTime, platform: Platform, copy: impl Into<String>) -> Self {
        Self {
            date,
            time,
            platform,
            objective: "General".to_string(),
            status: PostStatus::Draft,
            is_paid: false,
            budget: 0.0,
            copy: copy.into(),
            image: None,
            campaign_name: None,
            ad_group_name: None,
            ad_id: None,
        }
    }

    /// Materialize into a post owned by `brand_id`
    pub fn into_post(self, brand_id: Uuid) -> Post {
        let now = Utc::now();
        Post {
            id: Uuid::new_v4(),
            brand_id,
            date: self.date,
            time: self.time,
            platform: self.platform,
            objective: self.objective,
            status: self.status,
            is_paid: self.is_paid,
            budget: if self.is_paid { self.budget } else { 0.0 },
            copy: self.copy,
            image: non_blank(self.image),
            campaign_name: non_blank(self.campaign_name),
            ad_group_name: non_blank(self.ad_group_name),
            ad_id: non_blank(self.ad_id),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; `None` leaves a field untouched.
///
/// The optional text fields use `Some(None)` to clear a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostUpdate {
    /// New day
    pub date: Option<NaiveDate>,
    /// New time
    pub time: Option<NaiveTime>,
    /// New platform
    pub platform: Option<Platform>,
    /// New objective
    pub objective: Option<String>,
    /// New status
    pub status: Option<PostStatus>,
    /// Paid flag
    pub is_paid: Option<bool>,
    /// Budget
    pub budget: Option<f64>,
    /// Copy
    pub copy: Option<String>,
    /// Creative URL
    pub image: Option<Option<String>>,
    /// Campaign
    pub campaign_name: Option<Option<String>>,
    /// Ad group
    pub ad_group_name: Option<Option<String>>,
    /// Ad id
    pub ad_id: Option<Option<String>>,
}

impl PostUpdate {
    /// Update that only changes the status
    pub fn status(status: PostStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply onto a post in place and bump `updated_at`
    pub fn apply(&self, post: &mut Post) {
        if let Some(date) = self.date {
            post.date = date;
        }
        if let Some(time) = self.time {
            post.time = time;
        }
        if let Some(platform) = self.platform {
            post.platform = platform;
        }
        if let Some(objective) = &self.objective {
            post.objective.clone_from(objective);
        }
        if let Some(status) = self.status {
            post.status = status;
        }
        if let Some(is_paid) = self.is_paid {
            post.is_paid = is_paid;
        }
        if let Some(budget) = self.budget {
            post.budget = budget;
        }
        if let Some(copy) = &self.copy {
            post.copy.clone_from(copy);
        }
        if let Some(image) = &self.image {
            post.image = non_blank(image.clone());
        }
        if let Some(campaign) = &self.campaign_name {
            post.campaign_name = non_blank(campaign.clone());
        }
        if let Some(ad_group) = &self.ad_group_name {
            post.ad_group_name = non_blank(ad_group.clone());
        }
        if let Some(ad_id) = &self.ad_id {
            post.ad_id = non_blank(ad_id.clone());
        }
        if !post.is_paid {
            post.budget = 0.0;
        }
        post.updated_at = Utc::now();
    }
}

impl Post {
    /// Get a short preview of the copy (for list display)
    pub fn preview(&self, max_len: usize) -> String {
        let content = self.copy.replace('\n', " ");
        if content.chars().count() <= max_len {
            content
        } else {
            let cut: String = content.chars().take(max_len.saturating_sub(3)).collect();
            format!("{cut}...")
        }
    }

    /// Time formatted as HH:MM
    pub fn time_str(&self) -> String {
        self.time.format("%H:%M").to_string()
    }

    /// Creative URL with share links rewritten to direct image links
    pub fn image_url(&self) -> Option<String> {
        self.image.as_deref().map(normalize_image_url)
    }

    /// Objective without the legacy `[Li L]` prefix some imports carry
    pub fn clean_objective(&self) -> &str {
        let objective = self.objective.trim();
        match (objective.get(..6), objective.get(6..)) {
            (Some(tag), Some(rest)) if tag.eq_ignore_ascii_case("[li l]") => rest.trim_start(),
            _ => objective,
        }
    }

    /// Budget label (`Paid $120.00` / `Organic`)
    pub fn budget_label(&self, currency: &str) -> String {
        if self.is_paid {
            format!("Paid {currency}{:.2}", self.budget)
        } else {
            "Organic".to_string()
        }
    }
}

/// Rewrite Google Drive share links to a direct image host.
pub fn normalize_image_url(url: &str) -> String {
    if url.contains("drive.google.com")
        && let Some(idx) = url.find("/d/")
    {
        let id: String = url[idx + 3..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .collect();
        if !id.is_empty() {
            return format!("https://lh3.googleusercontent.com/d/{id}");
        }
    }
    url.to_string()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
