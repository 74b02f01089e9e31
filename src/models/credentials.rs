//! Marketing API credentials per brand

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Marketing APIs KPIs can be pulled from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiPlatform {
    /// Meta Marketing API (Facebook + Instagram)
    Meta,
    /// TikTok Business API
    TikTok,
    /// WhatsApp Business Cloud API
    WhatsApp,
    /// LinkedIn Marketing API
    LinkedIn,
}

impl ApiPlatform {
    /// Get all API platforms
    pub const fn all() -> &'static [Self] {
        &[Self::Meta, Self::TikTok, Self::WhatsApp, Self::LinkedIn]
    }

    /// Get platform as string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Meta => "meta",
            Self::TikTok => "tiktok",
            Self::WhatsApp => "whatsapp",
            Self::LinkedIn => "linkedin",
        }
    }

    /// Get the display name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Meta => "Meta",
            Self::TikTok => "TikTok",
            Self::WhatsApp => "WhatsApp",
            Self::LinkedIn => "LinkedIn",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "meta" | "facebook" | "instagram" => Some(Self::Meta),
            "tiktok" => Some(Self::TikTok),
            "whatsapp" => Some(Self::WhatsApp),
            "linkedin" => Some(Self::LinkedIn),
            _ => None,
        }
    }

    /// Field names a client needs before it can be built
    pub const fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Meta => &["page_access_token", "ad_account_id"],
            Self::TikTok => &["access_token", "advertiser_id"],
            Self::WhatsApp => &["waba_id", "permanent_access_token"],
            Self::LinkedIn => &["access_token", "ad_account_urn"],
        }
    }
}

impl std::fmt::Display for ApiPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Secret fields for every supported API; each platform uses a subset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialFields {
    /// Meta app id
    pub app_id: Option<String>,
    /// Meta app secret
    pub app_secret: Option<String>,
    /// Meta page/system-user token
    pub page_access_token: Option<String>,
    /// Meta ad account (`act_...`)
    pub ad_account_id: Option<String>,
    /// TikTok client key
    pub client_key: Option<String>,
    /// TikTok / LinkedIn client secret
    pub client_secret: Option<String>,
    /// TikTok / LinkedIn access token
    pub access_token: Option<String>,
    /// TikTok advertiser id
    pub advertiser_id: Option<String>,
    /// WhatsApp phone number id
    pub phone_number_id: Option<String>,
    /// WhatsApp Business Account id
    pub waba_id: Option<String>,
    /// WhatsApp permanent token
    pub permanent_access_token: Option<String>,
    /// LinkedIn client id
    pub client_id: Option<String>,
    /// LinkedIn sponsored account (id or URN)
    pub ad_account_urn: Option<String>,
}

impl CredentialFields {
    /// Field names accepted by [`Self::set`]
    pub const NAMES: &'static [&'static str] = &[
        "app_id",
        "app_secret",
        "page_access_token",
        "ad_account_id",
        "client_key",
        "client_secret",
        "access_token",
        "advertiser_id",
        "phone_number_id",
        "waba_id",
        "permanent_access_token",
        "client_id",
        "ad_account_urn",
    ];

    fn slot(&mut self, name: &str) -> Option<&mut Option<String>> {
        let slot = match name.trim().to_lowercase().replace('-', "_").as_str() {
            "app_id" => &mut self.app_id,
            "app_secret" => &mut self.app_secret,
            "page_access_token" => &mut self.page_access_token,
            "ad_account_id" => &mut self.ad_account_id,
            "client_key" => &mut self.client_key,
            "client_secret" => &mut self.client_secret,
            "access_token" => &mut self.access_token,
            "advertiser_id" => &mut self.advertiser_id,
            "phone_number_id" => &mut self.phone_number_id,
            "waba_id" => &mut self.waba_id,
            "permanent_access_token" => &mut self.permanent_access_token,
            "client_id" => &mut self.client_id,
            "ad_account_urn" => &mut self.ad_account_urn,
            _ => return None,
        };
        Some(slot)
    }

    /// Set a field by name; blank values clear it. False for unknown names.
    pub fn set(&mut self, name: &str, value: &str) -> bool {
        let value = value.trim();
        match self.slot(name) {
            Some(slot) => {
                *slot = (!value.is_empty()).then(|| value.to_string());
                true
            }
            None => false,
        }
    }

    /// Read a field by name
    pub fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            "app_id" => &self.app_id,
            "app_secret" => &self.app_secret,
            "page_access_token" => &self.page_access_token,
            "ad_account_id" => &self.ad_account_id,
            "client_key" => &self.client_key,
            "client_secret" => &self.client_secret,
            "access_token" => &self.access_token,
            "advertiser_id" => &self.advertiser_id,
            "phone_number_id" => &self.phone_number_id,
            "waba_id" => &self.waba_id,
            "permanent_access_token" => &self.permanent_access_token,
            "client_id" => &self.client_id,
            "ad_account_urn" => &self.ad_account_urn,
            _ => return None,
        };
        value.as_deref().filter(|v| !v.trim().is_empty())
    }

    /// Required fields for `platform` that are missing or blank
    pub fn missing_for(&self, platform: ApiPlatform) -> Vec<&'static str> {
        platform
            .required_fields()
            .iter()
            .copied()
            .filter(|name| self.get(name).is_none())
            .collect()
    }
}

/// Stored API connection of a brand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCredentials {
    /// Unique identifier
    pub id: Uuid,
    /// Owning brand
    pub brand_id: Uuid,
    /// Which API
    pub platform: ApiPlatform,
    /// Secret fields (sealed at rest)
    pub fields: CredentialFields,
    /// Whether the connection is enabled for sync
    pub is_connected: bool,
    /// Last successful fetch
    pub last_sync: Option<DateTime<Utc>>,
}

impl ApiCredentials {
    /// New connected credentials
    pub fn new(brand_id: Uuid, platform: ApiPlatform, fields: CredentialFields) -> Self {
        Self {
            id: Uuid::new_v4(),
            brand_id,
            platform,
            fields,
            is_connected: true,
            last_sync: None,
        }
    }

    /// Required fields still missing
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.fields.missing_for(self.platform)
    }
}

/// Mask a secret for display, keeping the last four characters
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{tail}", "*".repeat(count.min(12) - 4))
}
