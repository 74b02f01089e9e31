//! Brand (client) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Platform;

/// Default brand colour when none is given
pub const DEFAULT_BRAND_COLOR: &str = "#4f46e5";

/// A client whose content is planned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Primary colour (hex)
    pub color: String,
    /// Industry / vertical
    #[serde(default)]
    pub industry: String,
    /// Logo URL
    #[serde(default)]
    pub logo: Option<String>,
    /// Platforms the brand publishes on
    #[serde(default)]
    pub active_networks: Vec<Platform>,
    /// Secondary colour (hex)
    #[serde(default)]
    pub secondary_color: Option<String>,
    /// When the brand was created
    pub created_at: DateTime<Utc>,
    /// Last modification
    pub updated_at: DateTime<Utc>,
}

impl Brand {
    /// Create a brand with the default colour and no networks
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            color: DEFAULT_BRAND_COLOR.to_string(),
            industry: String::new(),
            logo: None,
            active_networks: Vec::new(),
            secondary_color: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder-style colour setter
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Builder-style industry setter
    #[must_use]
    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = industry.into();
        self
    }

    /// Builder-style networks setter
    #[must_use]
    pub fn with_networks(mut self, networks: Vec<Platform>) -> Self {
        self.active_networks = networks;
        self
    }

    /// Primary colour as RGB, if it is a valid `#rrggbb` string
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        parse_hex_color(&self.color)
    }

    /// Comma-separated network names
    pub fn networks_label(&self) -> String {
        if self.active_networks.is_empty() {
            return "-".to_string();
        }
        self.active_networks
            .iter()
            .map(Platform::name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Partial brand update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandUpdate {
    /// New name
    pub name: Option<String>,
    /// New primary colour
    pub color: Option<String>,
    /// New industry
    pub industry: Option<String>,
    /// New logo (`Some(None)` clears it)
    pub logo: Option<Option<String>>,
    /// New network list
    pub active_networks: Option<Vec<Platform>>,
    /// New secondary colour (`Some(None)` clears it)
    pub secondary_color: Option<Option<String>>,
}

impl BrandUpdate {
    /// Apply onto a brand in place and bump `updated_at`
    pub fn apply(&self, brand: &mut Brand) {
        if let Some(name) = &self.name {
            brand.name = name.trim().to_string();
        }
        if let Some(color) = &self.color {
            brand.color.clone_from(color);
        }
        if let Some(industry) = &self.industry {
            brand.industry.clone_from(industry);
        }
        if let Some(logo) = &self.logo {
            brand.logo.clone_from(logo);
        }
        if let Some(networks) = &self.active_networks {
            brand.active_networks.clone_from(networks);
        }
        if let Some(secondary) = &self.secondary_color {
            brand.secondary_color.clone_from(secondary);
        }
        brand.updated_at = Utc::now();
    }
}

/// Parse a `#rrggbb` (or `rrggbb`) colour
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Parse a comma-separated list of platforms, skipping unknown names
pub fn parse_networks(list: &str) -> Vec<Platform> {
    let mut networks = Vec::new();
    for platform in list.split(',').filter_map(Platform::from_str) {
        if !networks.contains(&platform) {
            networks.push(platform);
        }
    }
    networks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#4f46e5"), Some((79, 70, 229)));
        assert_eq!(parse_hex_color("ffffff"), Some((255, 255, 255)));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_parse_networks_dedupes() {
        let networks = parse_networks("ig, facebook, x, IG, myspace");
        assert_eq!(
            networks,
            vec![Platform::Instagram, Platform::Facebook, Platform::Twitter]
        );
    }

    #[test]
    fn test_update_keeps_unset_fields() {
        let mut brand = Brand::new("  Acme ").with_industry("Retail");
        assert_eq!(brand.name, "Acme");
        BrandUpdate {
            color: Some("#000000".to_string()),
            ..Default::default()
        }
        .apply(&mut brand);
        assert_eq!(brand.color, "#000000");
        assert_eq!(brand.industry, "Retail");
    }
}
