//! Data models for the planner

mod brand;
mod credentials;
mod kpi;
mod metrics;
mod platform;
mod post;

pub use brand::{Brand, BrandUpdate, DEFAULT_BRAND_COLOR, parse_hex_color, parse_networks};
pub use credentials::{ApiCredentials, ApiPlatform, CredentialFields, mask_secret};
pub use kpi::{
    Awareness, Engagement, Financials, KpiRecord, KpiSummary, METRIC_NAMES, MetricCard,
    Performance, Trend, change_string,
};
pub use metrics::{DataFetchResult, DateRange, FetchError, FetchedKpiData};
pub use platform::{Platform, PlatformMetadata, PlatformPalette, Rgb};
pub use post::{NewPost, Post, PostStatus, PostUpdate, normalize_image_url};
