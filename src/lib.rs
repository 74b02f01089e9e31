//! # Warp Planner 📅
//!
//! A terminal content planner for social media brands.
//!
//! ## Overview
//!
//! Warp Planner keeps the editorial calendar of several brands in one local
//! database: posts per platform and day, paid budgets with campaign and ad
//! group names, monthly KPIs pulled from the ad platforms, and a printable
//! PDF plan for the client.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    App / CLI (main.rs)                      │
//! │   Calendar, list, brand and KPI tabs; scripted subcommands  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │     Planner     │ │      Sync       │ │     Report      │
//! │                 │ │                 │ │                 │
//! │ • Brands        │ │ • Fan-out fetch │ │ • Calendar page │
//! │ • Posts         │ │ • Fold into KPI │ │ • Investment    │
//! │ • Campaigns     │ │ • Last sync     │ │ • Post cards    │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//!          │                   │                   │
//!          └───────────────────┴───────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │    Database     │ │       API       │ │     Models      │
//! │                 │ │                 │ │                 │
//! │ • Brands, posts │ │ • Meta          │ │ • Brand, Post   │
//! │ • KPI records   │ │ • TikTok        │ │ • Platform      │
//! │ • Sealed creds  │ │ • WhatsApp      │ │ • KPI, metrics  │
//! │                 │ │ • LinkedIn      │ │                 │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`] — Marketing API clients (Meta, TikTok, WhatsApp, LinkedIn)
//! - [`app`] — TUI application state and event loop
//! - [`backup`] — JSON export and restore
//! - [`calendar`] — Calendar views, filters and ordering
//! - [`config`] — Configuration management
//! - [`db`] — `SQLite` database for brands, posts, KPIs and credentials
//! - [`models`] — Data models (Brand, Post, Platform, KPIs)
//! - [`planner`] — Brand selection and post operations over the database
//! - [`report`] — PDF content plan
//! - [`schedule`] — Date and time parsing for posts
//! - [`sync`] — KPI fetch across connected platforms
//! - [`theme`] — Theme support via ratatui-themes
//! - [`vault`] — Encryption of stored API secrets
//!
//! ## Example
//!
//! ```no_run
//! use warp_planner::app;
//!
//! fn main() -> anyhow::Result<()> {
//!     app::run()
//! }
//! ```
//!
//! ## Features
//!
//! - **Multi-Brand** — Every brand with its own colour, networks and calendar
//! - **Seven Platforms** — Instagram, Facebook, X, Google Ads, WhatsApp, TikTok, LinkedIn
//! - **Ad KPIs** — Spend, impressions and clicks fetched from the ad APIs
//! - **PDF Reports** — Monthly calendar, investment summary and post cards
//! - **Secure** — API secrets sealed with AES-GCM at rest

#![doc(html_root_url = "https://docs.rs/warp-planner/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::unused_async)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::if_not_else)]
#![allow(clippy::single_match_else)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::use_self)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::similar_names)]
#![allow(clippy::if_same_then_else)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::branches_sharing_code)]
#![allow(clippy::wrong_self_convention)]
#![allow(clippy::return_self_not_must_use)]

pub mod api;
pub mod app;
pub mod backup;
pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod paths;
pub mod planner;
pub mod report;
pub mod schedule;
pub mod sync;
pub mod theme;
pub mod vault;

// Re-export main types for convenience
pub use app::AppState;
pub use config::Config;
pub use db::Database;
pub use error::PlannerError;
pub use models::{ApiPlatform, Brand, KpiRecord, Platform, Post, PostStatus};
pub use planner::Planner;
pub use theme::{Theme, ThemeColors};

// Re-export theme types from ratatui-themes crate
pub use ratatui_themes::{ThemeName, ThemePalette};

/// ASCII logo for the application
pub const LOGO: &str = r"
 _      __                 ___  __
| | /| / /__ ________  ___/ _ \/ /__ ____  ___  ___ ____
| |/ |/ / _ `/ __/ _ \/___/ ___/ / _ `/ _ \/ _ \/ -_) __/
|__/|__/\_,_/_/ / .__/   /_/  /_/\_,_/_//_/_//_/\__/_/
               /_/
";

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
