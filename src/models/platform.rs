//! Platform definitions and per-platform metadata

use serde::{Deserialize, Serialize};

/// Supported publishing platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Instagram (feed, stories, reels)
    #[default]
    Instagram,
    /// Facebook pages
    Facebook,
    /// Twitter / X
    Twitter,
    /// Google Ads
    GoogleAds,
    /// WhatsApp Business
    WhatsApp,
    /// TikTok
    TikTok,
    /// LinkedIn
    LinkedIn,
}

/// RGB triple used by the report palette
pub type Rgb = (u8, u8, u8);

/// Colours used when drawing a platform in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformPalette {
    /// Pastel background for cards and badges
    pub bg: Rgb,
    /// Text drawn on the background
    pub text: Rgb,
    /// Accent for bars, strips and donut sectors
    pub accent: Rgb,
}

/// Platform-specific terminology for the strategy fields of a post
#[derive(Debug, Clone, Copy)]
pub struct PlatformMetadata {
    /// Label for the ad group field (Ad Set, Ad Group, Campaign Group...)
    pub ad_group_label: &'static str,
    /// Example shown next to the ad id field
    pub ad_id_helper: &'static str,
    /// Pattern an ad id must match, if any
    pub ad_id_pattern: Option<&'static str>,
    /// Whether the ad group field applies to this platform
    pub show_ad_group: bool,
}

impl Platform {
    /// Get all supported platforms
    pub const fn all() -> &'static [Self] {
        &[
            Self::Instagram,
            Self::Facebook,
            Self::Twitter,
            Self::GoogleAds,
            Self::WhatsApp,
            Self::TikTok,
            Self::LinkedIn,
        ]
    }

    /// Get the display name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Instagram => "Instagram",
            Self::Facebook => "Facebook",
            Self::Twitter => "Twitter",
            Self::GoogleAds => "Google Ads",
            Self::WhatsApp => "WhatsApp",
            Self::TikTok => "TikTok",
            Self::LinkedIn => "LinkedIn",
        }
    }

    /// Stable lowercase key used in the database
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
            Self::GoogleAds => "google_ads",
            Self::WhatsApp => "whatsapp",
            Self::TikTok => "tiktok",
            Self::LinkedIn => "linkedin",
        }
    }

    /// Two-letter badge code (used where there is no room for an icon)
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Instagram => "IG",
            Self::Facebook => "FB",
            Self::Twitter => "X",
            Self::GoogleAds => "G",
            Self::WhatsApp => "WA",
            Self::TikTok => "TK",
            Self::LinkedIn => "IN",
        }
    }

    /// Get the emoji icon
    pub const fn emoji(&self) -> &'static str {
        match self {
            Self::Instagram => "📸",
            Self::Facebook => "📘",
            Self::Twitter => "🐦",
            Self::GoogleAds => "🔎",
            Self::WhatsApp => "💬",
            Self::TikTok => "🎵",
            Self::LinkedIn => "💼",
        }
    }

    /// Report palette
    pub const fn palette(&self) -> PlatformPalette {
        match self {
            Self::Instagram => PlatformPalette {
                bg: (253, 242, 248),
                text: (157, 23, 77),
                accent: (236, 72, 153),
            },
            Self::Facebook => PlatformPalette {
                bg: (239, 246, 255),
                text: (30, 64, 175),
                accent: (59, 130, 246),
            },
            Self::TikTok => PlatformPalette {
                bg: (228, 228, 231),
                text: (24, 24, 27),
                accent: (0, 0, 0),
            },
            Self::LinkedIn | Self::Twitter => PlatformPalette {
                bg: (240, 249, 255),
                text: (12, 74, 110),
                accent: (14, 165, 233),
            },
            Self::WhatsApp => PlatformPalette {
                bg: (240, 253, 244),
                text: (20, 83, 45),
                accent: (34, 197, 94),
            },
            Self::GoogleAds => PlatformPalette {
                bg: (239, 246, 255),
                text: (30, 55, 155),
                accent: (66, 133, 244),
            },
        }
    }

    /// Strategy-field terminology for this platform
    pub const fn metadata(&self) -> PlatformMetadata {
        match self {
            Self::Facebook | Self::Instagram => PlatformMetadata {
                ad_group_label: "Ad Set Name",
                ad_id_helper: "e.g. 23847656221840001 (digits only)",
                ad_id_pattern: Some(r"^\d+$"),
                show_ad_group: true,
            },
            Self::TikTok => PlatformMetadata {
                ad_group_label: "Ad Group Name",
                ad_id_helper: "e.g. 1789234567890 (digits only)",
                ad_id_pattern: Some(r"^\d+$"),
                show_ad_group: true,
            },
            Self::GoogleAds | Self::Twitter => PlatformMetadata {
                ad_group_label: "Ad Group Name",
                ad_id_helper: "e.g. 1234567890",
                ad_id_pattern: Some(r"^\d+$"),
                show_ad_group: true,
            },
            Self::LinkedIn => PlatformMetadata {
                ad_group_label: "Campaign Group",
                ad_id_helper: "e.g. urn:li:share:1234567890 or 1234567890",
                ad_id_pattern: Some(r"^(urn:li:\w+:\d+|\d+)$"),
                show_ad_group: true,
            },
            Self::WhatsApp => PlatformMetadata {
                ad_group_label: "Audience Segment",
                ad_id_helper: "Optional, not used by WhatsApp",
                ad_id_pattern: None,
                show_ad_group: true,
            },
        }
    }

    /// Check a platform-specific ad id. Empty ids are always valid.
    pub fn validate_ad_id(&self, id: &str) -> bool {
        let id = id.trim();
        if id.is_empty() {
            return true;
        }
        match self.metadata().ad_id_pattern {
            Some(pattern) => regex_lite::Regex::new(pattern)
                .map(|re| re.is_match(id))
                .unwrap_or(true),
            None => true,
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect();
        match key.as_str() {
            "instagram" | "ig" => Some(Self::Instagram),
            "facebook" | "fb" => Some(Self::Facebook),
            "twitter" | "x" | "twitter/x" => Some(Self::Twitter),
            "googleads" | "google" => Some(Self::GoogleAds),
            "whatsapp" | "wa" => Some(Self::WhatsApp),
            "tiktok" | "tt" => Some(Self::TikTok),
            "linkedin" | "li" => Some(Self::LinkedIn),
            _ => None,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(Platform::from_str("Google Ads"), Some(Platform::GoogleAds));
        assert_eq!(Platform::from_str("google_ads"), Some(Platform::GoogleAds));
        assert_eq!(Platform::from_str("X"), Some(Platform::Twitter));
        assert_eq!(Platform::from_str("TIKTOK"), Some(Platform::TikTok));
        assert_eq!(Platform::from_str("myspace"), None);
    }

    #[test]
    fn test_db_key_round_trips_through_parser() {
        for platform in Platform::all() {
            assert_eq!(Platform::from_str(platform.as_str()), Some(*platform));
        }
    }

    #[test]
    fn test_ad_id_validation() {
        assert!(Platform::Facebook.validate_ad_id(""));
        assert!(Platform::Facebook.validate_ad_id("23847656221840001"));
        assert!(!Platform::Facebook.validate_ad_id("abc123"));
        assert!(Platform::LinkedIn.validate_ad_id("urn:li:share:1234567890"));
        assert!(Platform::LinkedIn.validate_ad_id("1234567890"));
        assert!(!Platform::LinkedIn.validate_ad_id("urn:li:share:abc"));
        assert!(Platform::WhatsApp.validate_ad_id("anything goes"));
    }
}
