//! Errors callers branch on

use thiserror::Error;
use uuid::Uuid;

use crate::models::Platform;

/// Planner-level failures (everything else travels as `anyhow::Error`)
#[derive(Debug, Error)]
pub enum PlannerError {
    /// An operation needs a current brand
    #[error("No brand selected")]
    NoBrandSelected,

    /// Brand id not in the store
    #[error("Brand not found: {0}")]
    BrandNotFound(Uuid),

    /// No brand matches a name or id prefix
    #[error("No brand matches '{0}'")]
    BrandNotMatched(String),

    /// Post id not in the store
    #[error("Post not found: {0}")]
    PostNotFound(Uuid),

    /// Ad id rejected by the platform pattern
    #[error("Invalid ad id '{ad_id}' for {platform}: expected {helper}")]
    InvalidAdId {
        /// Platform of the post
        platform: Platform,
        /// Rejected value
        ad_id: String,
        /// Expected format
        helper: &'static str,
    },

    /// Any other rejected input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PlannerError {
    /// Build an [`PlannerError::InvalidAdId`] for `platform`
    pub fn invalid_ad_id(platform: Platform, ad_id: &str) -> Self {
        Self::InvalidAdId {
            platform,
            ad_id: ad_id.to_string(),
            helper: platform.metadata().ad_id_helper,
        }
    }
}
