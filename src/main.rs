//! Warp Planner - social media content planning from the terminal
#![allow(clippy::uninlined_format_args)]

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use warp_planner::backup;
use warp_planner::calendar::{PostFilter, month_range, sort_chronologically};
use warp_planner::models::{
    ApiCredentials, ApiPlatform, Brand, BrandUpdate, CredentialFields, DateRange, KpiRecord,
    KpiSummary, METRIC_NAMES, NewPost, Platform, Post, PostStatus, PostUpdate, mask_secret,
    parse_networks,
};
use warp_planner::report::{self, ReportRequest};
use warp_planner::schedule::{parse_month, parse_post_date, parse_post_time};
use warp_planner::{Config, Database, Planner, paths, sync};

#[derive(Parser, Debug)]
#[command(name = "warp-planner")]
#[command(about = "Plan social media content across brands and platforms")]
#[command(version)]
struct Cli {
    /// Brand to work on (name or id prefix); defaults to the selected brand
    #[arg(short, long, global = true, env = "WARP_PLANNER_BRAND")]
    brand: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage brands
    #[command(subcommand)]
    Brand(BrandCommand),
    /// Manage posts of the current brand
    #[command(subcommand)]
    Post(PostCommand),
    /// List campaign names used by the current brand
    Campaigns {
        /// Only names containing this text
        query: Option<String>,
    },
    /// List platforms with their ad metadata
    Platforms,
    /// Monthly KPI records
    #[command(subcommand)]
    Kpi(KpiCommand),
    /// Marketing API credentials
    #[command(subcommand)]
    Creds(CredsCommand),
    /// Fetch KPI data from every connected platform
    Sync {
        /// First day (defaults to `lookback_days` before today)
        #[arg(long)]
        from: Option<String>,
        /// Last day (defaults to today)
        #[arg(long)]
        to: Option<String>,
        /// Store the fetched totals in the KPI record of this month (YYYY-MM)
        #[arg(long)]
        month: Option<String>,
    },
    /// Write a PDF content plan
    Report {
        /// First day (defaults to the first of this month)
        #[arg(long)]
        from: Option<String>,
        /// Last day (defaults to the end of this month)
        #[arg(long)]
        to: Option<String>,
        /// Report title (defaults to the brand name)
        #[arg(long)]
        title: Option<String>,
        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// JSON backup of brands and posts
    #[command(subcommand)]
    Backup(BackupCommand),
}

#[derive(Subcommand, Debug)]
enum BrandCommand {
    /// List brands
    List,
    /// Add a brand and make it current
    Add {
        name: String,
        /// Primary colour (#rrggbb)
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        industry: Option<String>,
        /// Comma-separated platforms
        #[arg(long)]
        networks: Option<String>,
    },
    /// Make a brand current
    Use {
        #[arg(value_name = "BRAND")]
        target: String,
    },
    /// Change a brand
    Edit {
        #[arg(value_name = "BRAND")]
        target: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        industry: Option<String>,
        #[arg(long)]
        networks: Option<String>,
        /// Logo URL (empty to clear)
        #[arg(long)]
        logo: Option<String>,
    },
    /// Delete a brand with its posts, KPIs and credentials
    Rm {
        #[arg(value_name = "BRAND")]
        target: String,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum PostCommand {
    /// List posts chronologically
    List {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(short, long, value_parser = platform_arg)]
        platform: Option<Platform>,
        #[arg(short, long, value_parser = status_arg)]
        status: Option<PostStatus>,
        /// Text in copy or objective
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Plan a post
    Add {
        /// Post copy
        copy: String,
        /// Date: today, tomorrow, +3d, friday, 2026-03-14, 14/03/2026
        #[arg(short, long, default_value = "today")]
        date: String,
        /// Time: 15:00, 3pm (defaults to the configured time)
        #[arg(short, long)]
        time: Option<String>,
        #[arg(short, long, value_parser = platform_arg)]
        platform: Option<Platform>,
        #[command(flatten)]
        fields: PostFields,
    },
    /// Change a post
    Edit {
        /// Post id (or a unique prefix)
        id: String,
        #[arg(long)]
        copy: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        time: Option<String>,
        #[arg(short, long, value_parser = platform_arg)]
        platform: Option<Platform>,
        #[command(flatten)]
        fields: PostFields,
    },
    /// Delete posts
    Rm {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Set the status of posts
    Status {
        #[arg(value_parser = status_arg)]
        status: PostStatus,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Show a post
    Show { id: String },
}

/// Optional post fields shared by `add` and `edit`; empty strings clear
#[derive(Args, Debug, Default)]
struct PostFields {
    #[arg(long)]
    objective: Option<String>,
    #[arg(long, value_parser = status_arg)]
    status: Option<PostStatus>,
    /// Paid budget (0 makes the post organic)
    #[arg(long, value_parser = budget_arg)]
    budget: Option<f64>,
    /// Creative URL
    #[arg(long)]
    image: Option<String>,
    #[arg(long)]
    campaign: Option<String>,
    #[arg(long)]
    ad_group: Option<String>,
    #[arg(long)]
    ad_id: Option<String>,
}

#[derive(Subcommand, Debug)]
enum KpiCommand {
    /// List monthly records
    List,
    /// Set metrics of a month: `kpi set 2026-03 reach=120000 roas=3.2`
    Set {
        month: String,
        #[arg(required = true)]
        metrics: Vec<String>,
    },
    /// Latest month against the previous one
    Summary,
    /// Delete a month's record
    Rm { month: String },
}

#[derive(Subcommand, Debug)]
enum CredsCommand {
    /// List stored connections
    List,
    /// Store fields: `creds set meta page_access_token=... ad_account_id=...`
    Set {
        #[arg(value_parser = api_platform_arg)]
        platform: ApiPlatform,
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Stop syncing a platform (credentials are kept)
    Disconnect {
        #[arg(value_parser = api_platform_arg)]
        platform: ApiPlatform,
    },
}

#[derive(Subcommand, Debug)]
enum BackupCommand {
    /// Write every brand and post to a JSON file
    Export {
        /// File or directory (defaults to the current directory)
        path: Option<PathBuf>,
    },
    /// Merge a JSON backup into the database
    Restore { path: PathBuf },
    /// Delete every post
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

fn platform_arg(s: &str) -> Result<Platform, String> {
    Platform::from_str(s).ok_or_else(|| {
        let names: Vec<_> = Platform::all().iter().map(|p| p.as_str()).collect();
        format!("unknown platform '{s}' (one of: {})", names.join(", "))
    })
}

fn budget_arg(s: &str) -> Result<f64, String> {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(format!("'{s}' is not a valid budget")),
    }
}

fn status_arg(s: &str) -> Result<PostStatus, String> {
    PostStatus::from_str(s).ok_or_else(|| format!("unknown status '{s}' (draft, approved, scheduled, published)"))
}

fn api_platform_arg(s: &str) -> Result<ApiPlatform, String> {
    ApiPlatform::from_str(s).ok_or_else(|| format!("unknown API platform '{s}' (meta, tiktok, whatsapp, linkedin)"))
}

fn main() -> Result<()> {
    // Initialize logging (RUST_LOG=debug for verbose output)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        return warp_planner::app::run();
    };

    let mut config = Config::load()?;
    let mut planner = open_planner(&config, cli.brand.as_deref())?;

    match command {
        Command::Brand(cmd) => brand_cli(&mut planner, &mut config, cmd),
        Command::Post(cmd) => post_cli(&mut planner, &config, cmd),
        Command::Campaigns { query } => {
            require_brand(&planner)?;
            for name in planner.campaign_suggestions(query.as_deref().unwrap_or_default()) {
                println!("{name}");
            }
            Ok(())
        }
        Command::Platforms => {
            list_platforms();
            Ok(())
        }
        Command::Kpi(cmd) => kpi_cli(&planner, cmd),
        Command::Creds(cmd) => creds_cli(&planner, cmd),
        Command::Sync { from, to, month } => sync_cli(&planner, &config, from, to, month),
        Command::Report {
            from,
            to,
            title,
            out,
        } => report_cli(&planner, &config, from, to, title, out),
        Command::Backup(cmd) => backup_cli(&planner, cmd),
    }
}

/// Open the store and select the `--brand` override, if any
fn open_planner(config: &Config, brand: Option<&str>) -> Result<Planner> {
    let db = Database::open()?;
    let mut planner = Planner::open(db, config.selected_brand_id)?;
    if let Some(query) = brand {
        let id = planner.find_brand(query)?.id;
        planner.select_brand(id)?;
    }
    Ok(planner)
}

fn require_brand(planner: &Planner) -> Result<&Brand> {
    planner
        .current_brand()
        .ok_or_else(|| anyhow!("No brand selected. Add one with: warp-planner brand add <name>"))
}

/// Split `name=value`
fn parse_assignment(arg: &str) -> Result<(&str, &str)> {
    arg.split_once('=')
        .map(|(name, value)| (name.trim(), value.trim()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| anyhow!("Expected name=value, got '{arg}'"))
}

/// A finite KPI value; NaN and infinities are rejected
fn parse_metric_value(input: &str) -> Result<f64> {
    let value: f64 = input
        .parse()
        .with_context(|| format!("'{input}' is not a number"))?;
    if !value.is_finite() {
        bail!("'{input}' is not a finite number");
    }
    Ok(value)
}

/// Empty input clears an optional field
fn optional(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| {
        let v = v.trim().to_string();
        (!v.is_empty()).then_some(v)
    })
}

fn parse_date_arg(input: Option<&str>, default: NaiveDate) -> Result<NaiveDate> {
    input.map_or(Ok(default), parse_post_date)
}

fn parse_time_arg(input: &str) -> Result<NaiveTime> {
    parse_post_time(input).ok_or_else(|| anyhow!("Could not parse time: '{input}' (try 15:00 or 3pm)"))
}

// ==================== Brands ====================

fn brand_cli(planner: &mut Planner, config: &mut Config, cmd: BrandCommand) -> Result<()> {
    match cmd {
        BrandCommand::List => {
            if planner.brands().is_empty() {
                println!("No brands yet.\n\nAdd one with:\n  warp-planner brand add \"Acme\"");
                return Ok(());
            }
            let current = planner.current_brand_id();
            for brand in planner.brands() {
                let marker = if Some(brand.id) == current { "●" } else { " " };
                println!(
                    "{marker} {:<24} {:<8} {:<16} {}\n    id {}",
                    brand.name,
                    brand.color,
                    brand.industry,
                    brand.networks_label(),
                    brand.id
                );
            }
        }
        BrandCommand::Add {
            name,
            color,
            industry,
            networks,
        } => {
            let mut brand = Brand::new(name);
            if let Some(color) = color {
                brand = brand.with_color(color);
            }
            if let Some(industry) = industry {
                brand = brand.with_industry(industry);
            }
            if let Some(networks) = networks {
                brand = brand.with_networks(parse_networks(&networks));
            }
            let brand = planner.add_brand(brand)?;
            println!("✓ Added {} ({})", brand.name, brand.id);
            config.selected_brand_id = Some(brand.id);
            config.save()?;
        }
        BrandCommand::Use { target } => {
            let (id, name) = {
                let brand = planner.find_brand(&target)?;
                (brand.id, brand.name.clone())
            };
            planner.select_brand(id)?;
            config.selected_brand_id = Some(id);
            config.save()?;
            println!("✓ Now planning for {name}");
        }
        BrandCommand::Edit {
            target,
            name,
            color,
            industry,
            networks,
            logo,
        } => {
            let id = planner.find_brand(&target)?.id;
            let update = BrandUpdate {
                name,
                color,
                industry,
                logo: optional(logo),
                active_networks: networks.as_deref().map(parse_networks),
                ..BrandUpdate::default()
            };
            let brand = planner.update_brand(id, &update)?;
            println!("✓ Updated {}", brand.name);
        }
        BrandCommand::Rm { target, yes } => {
            let (id, name) = {
                let brand = planner.find_brand(&target)?;
                (brand.id, brand.name.clone())
            };
            if !yes {
                bail!("This deletes {name} with all its posts, KPIs and credentials. Re-run with --yes");
            }
            planner.delete_brand(id)?;
            if config.selected_brand_id == Some(id) {
                config.selected_brand_id = planner.current_brand_id();
                config.save()?;
            }
            println!("✓ Deleted {name}");
        }
    }
    Ok(())
}

// ==================== Posts ====================

fn post_cli(planner: &mut Planner, config: &Config, cmd: PostCommand) -> Result<()> {
    let currency = &config.report.currency;
    match cmd {
        PostCommand::List {
            from,
            to,
            platform,
            status,
            query,
        } => {
            require_brand(planner)?;
            let filter = PostFilter {
                platform,
                status,
                brand: None,
                query: query.unwrap_or_default(),
            };
            let from = parse_date_arg(from.as_deref(), NaiveDate::MIN)?;
            let to = parse_date_arg(to.as_deref(), NaiveDate::MAX)?;
            let mut posts: Vec<&Post> = filter
                .apply(planner.posts(), planner.brands())
                .into_iter()
                .filter(|p| p.date >= from && p.date <= to)
                .collect();
            sort_chronologically(&mut posts);

            if posts.is_empty() {
                println!("No posts.");
            }
            for post in posts {
                println!(
                    "{} {} {} {:<10} {:<10} {}",
                    &post.id.to_string()[..8],
                    post.date.format("%Y-%m-%d"),
                    post.time_str(),
                    post.platform.name(),
                    post.status.label(),
                    post.preview(60)
                );
            }
        }
        PostCommand::Add {
            copy,
            date,
            time,
            platform,
            fields,
        } => {
            let date = parse_post_date(&date)?;
            let time = match time {
                Some(t) => parse_time_arg(&t)?,
                None => config.default_post_time(),
            };
            let mut new = NewPost::new(date, time, platform.unwrap_or(config.default_platform), copy);
            if let Some(objective) = fields.objective {
                new.objective = objective;
            }
            if let Some(status) = fields.status {
                new.status = status;
            }
            if let Some(budget) = fields.budget {
                new.is_paid = budget > 0.0;
                new.budget = budget;
            }
            new.image = optional(fields.image).flatten();
            new.campaign_name = optional(fields.campaign).flatten();
            new.ad_group_name = optional(fields.ad_group).flatten();
            new.ad_id = optional(fields.ad_id).flatten();

            let post = planner.add_post(new)?;
            println!(
                "✓ Planned {} {} for {} {} [{}]",
                post.platform.emoji(),
                post.platform.name(),
                post.date.format("%Y-%m-%d"),
                post.time_str(),
                &post.id.to_string()[..8]
            );
        }
        PostCommand::Edit {
            id,
            copy,
            date,
            time,
            platform,
            fields,
        } => {
            let id = planner.find_post(&id)?.id;
            let update = PostUpdate {
                date: date.as_deref().map(parse_post_date).transpose()?,
                time: time.as_deref().map(parse_time_arg).transpose()?,
                platform,
                objective: fields.objective,
                status: fields.status,
                is_paid: fields.budget.map(|b| b > 0.0),
                budget: fields.budget,
                copy,
                image: optional(fields.image),
                campaign_name: optional(fields.campaign),
                ad_group_name: optional(fields.ad_group),
                ad_id: optional(fields.ad_id),
            };
            if update.is_empty() {
                bail!("Nothing to change");
            }
            let post = planner.update_post(id, &update)?;
            println!("✓ Updated {}", &post.id.to_string()[..8]);
        }
        PostCommand::Rm { ids } => {
            let ids = resolve_posts(planner, &ids)?;
            let count = planner.bulk_delete_posts(&ids)?;
            println!("✓ Deleted {count} post(s)");
        }
        PostCommand::Status { status, ids } => {
            let ids = resolve_posts(planner, &ids)?;
            let count = planner.bulk_update_status(&ids, status)?;
            println!("✓ {count} post(s) now {} {}", status.emoji(), status.label());
        }
        PostCommand::Show { id } => {
            let post = planner.find_post(&id)?;
            print_post(post, currency);
        }
    }
    Ok(())
}

fn resolve_posts(planner: &Planner, prefixes: &[String]) -> Result<Vec<uuid::Uuid>> {
    prefixes
        .iter()
        .map(|prefix| -> Result<uuid::Uuid> { Ok(planner.find_post(prefix)?.id) })
        .collect()
}

fn print_post(post: &Post, currency: &str) {
    let metadata = post.platform.metadata();
    println!("{} {}  ({})", post.platform.emoji(), post.platform.name(), post.id);
    println!("{}", "─".repeat(60));
    println!("When:      {} {}", post.date.format("%A %Y-%m-%d"), post.time_str());
    println!("Status:    {} {}", post.status.emoji(), post.status.label());
    println!("Budget:    {}", post.budget_label(currency));
    if !post.objective.is_empty() {
        println!("Objective: {}", post.clean_objective());
    }
    if let Some(campaign) = &post.campaign_name {
        println!("Campaign:  {campaign}");
    }
    if let Some(group) = &post.ad_group_name {
        println!("{}: {group}", metadata.ad_group_label);
    }
    if let Some(ad_id) = &post.ad_id {
        println!("Ad ID:     {ad_id}");
    }
    if let Some(url) = post.image_url() {
        println!("Image:     {url}");
    }
    println!("\n{}", post.copy);
}

fn list_platforms() {
    for platform in Platform::all() {
        let metadata = platform.metadata();
        println!(
            "{} {:<3} {:<11} ad group: {:<16} ad id: {}",
            platform.emoji(),
            platform.code(),
            platform.name(),
            if metadata.show_ad_group { metadata.ad_group_label } else { "-" },
            metadata.ad_id_helper
        );
    }
}

// ==================== KPIs ====================

fn kpi_cli(planner: &Planner, cmd: KpiCommand) -> Result<()> {
    let brand_id = require_brand(planner)?.id;
    let db = planner.db();
    match cmd {
        KpiCommand::List => {
            let records = db.get_kpis(brand_id)?;
            if records.is_empty() {
                println!("No KPI records.");
            }
            println!(
                "{:<8} {:>10} {:>11} {:>7} {:>8} {:>7} {:>10} {:>7}",
                "Month", "Reach", "Impressions", "ER %", "Clicks", "CTR %", "Spend", "ROAS"
            );
            for r in records {
                println!(
                    "{:<8} {:>10.0} {:>11.0} {:>7.2} {:>8.0} {:>7.2} {:>10.2} {:>7.2}",
                    r.month,
                    r.awareness.reach,
                    r.awareness.impressions,
                    r.engagement.engagement_rate,
                    r.performance.clicks,
                    r.performance.ctr,
                    r.financials.total_spend,
                    r.financials.roas
                );
            }
        }
        KpiCommand::Set { month, metrics } => {
            let month = parse_month(&month)?;
            let mut record = db
                .get_kpi(brand_id, &month)?
                .unwrap_or_else(|| KpiRecord::new(brand_id, month.clone()));
            for arg in &metrics {
                let (name, value) = parse_assignment(arg)?;
                let value = parse_metric_value(value)?;
                if !record.set_metric(name, value) {
                    bail!("Unknown metric '{name}' (one of: {})", METRIC_NAMES.join(", "));
                }
            }
            db.upsert_kpi(&record)?;
            println!("✓ Saved {} metric(s) for {month}", metrics.len());
        }
        KpiCommand::Summary => {
            let records = db.get_kpis(brand_id)?;
            let Some(summary) = KpiSummary::from_records(&records) else {
                println!("No KPI records.");
                return Ok(());
            };
            println!("KPIs for {}\n", summary.month);
            for card in summary.cards() {
                println!(
                    "{:<16} {:>10}  {} {}",
                    card.title,
                    card.value,
                    card.trend.arrow(),
                    card.change
                );
            }
        }
        KpiCommand::Rm { month } => {
            let month = parse_month(&month)?;
            if !db.delete_kpi(brand_id, &month)? {
                bail!("No KPI record for {month}");
            }
            println!("✓ Deleted KPIs of {month}");
        }
    }
    Ok(())
}

// ==================== Credentials ====================

fn creds_cli(planner: &Planner, cmd: CredsCommand) -> Result<()> {
    let brand_id = require_brand(planner)?.id;
    let db = planner.db();
    match cmd {
        CredsCommand::List => {
            let all = db.get_credentials(brand_id)?;
            if all.is_empty() {
                println!("No API credentials.\n\nAdd some with:\n  warp-planner creds set meta page_access_token=... ad_account_id=...");
            }
            for creds in all {
                let state = if creds.is_connected { "connected" } else { "disconnected" };
                let synced = creds
                    .last_sync
                    .map_or_else(|| "never".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
                println!("{} ({state}, last sync {synced})", creds.platform.name());
                for name in CredentialFields::NAMES {
                    if let Some(value) = creds.fields.get(name) {
                        println!("    {name:<24} {}", mask_secret(value));
                    }
                }
                let missing = creds.missing_fields();
                if !missing.is_empty() {
                    println!("    missing: {}", missing.join(", "));
                }
            }
        }
        CredsCommand::Set { platform, fields } => {
            let mut creds = db
                .get_credentials(brand_id)?
                .into_iter()
                .find(|c| c.platform == platform)
                .unwrap_or_else(|| ApiCredentials::new(brand_id, platform, CredentialFields::default()));
            for arg in &fields {
                let (name, value) = parse_assignment(arg)?;
                if !creds.fields.set(name, value) {
                    bail!("Unknown field '{name}' (one of: {})", CredentialFields::NAMES.join(", "));
                }
            }
            let missing = creds.missing_fields();
            creds.is_connected = missing.is_empty();
            db.upsert_credentials(&creds)?;
            if missing.is_empty() {
                println!("✓ {} connected", platform.name());
            } else {
                println!("✓ Saved; {} still needs: {}", platform.name(), missing.join(", "));
            }
        }
        CredsCommand::Disconnect { platform } => {
            if !db.set_credentials_connected(brand_id, platform, false)? {
                bail!("No {} credentials stored", platform.name());
            }
            println!("✓ {} disconnected", platform.name());
        }
    }
    Ok(())
}

// ==================== Sync, report, backup ====================

fn sync_cli(
    planner: &Planner,
    config: &Config,
    from: Option<String>,
    to: Option<String>,
    month: Option<String>,
) -> Result<()> {
    let brand = require_brand(planner)?;
    let default = DateRange::last_days(config.api.lookback_days);
    let range = DateRange::new(
        parse_date_arg(from.as_deref(), default.start)?,
        parse_date_arg(to.as_deref(), default.end)?,
    );
    let month = month.as_deref().map(parse_month).transpose()?;

    println!(
        "Fetching {} from {} to {}...",
        brand.name,
        range.start.format("%Y-%m-%d"),
        range.end.format("%Y-%m-%d")
    );
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(sync::fetch_brand_data(planner.db(), brand.id, &range, &config.api))?;

    for data in &result.data {
        println!(
            "  {:<10} spend {:>10.2}  impressions {:>10.0}  clicks {:>8.0}  cpc {:.2}",
            data.platform.name(),
            data.spend,
            data.impressions,
            data.clicks,
            data.cpc
        );
    }
    for error in &result.errors {
        eprintln!("  ⚠ {}: {}", error.platform, error.message);
    }
    println!("{}", result.summary());

    if let Some(month) = month
        && !result.data.is_empty()
    {
        sync::fold_into_kpis(planner.db(), brand.id, &month, &result.data)?;
        println!("✓ Stored in KPIs of {month}");
    }
    Ok(())
}

fn report_cli(
    planner: &Planner,
    config: &Config,
    from: Option<String>,
    to: Option<String>,
    title: Option<String>,
    out: Option<PathBuf>,
) -> Result<()> {
    let brand = require_brand(planner)?;
    let (first, last) = month_range(Local::now().date_naive());
    let request = ReportRequest::new(
        title.unwrap_or_else(|| brand.name.clone()),
        parse_date_arg(from.as_deref(), first)?,
        parse_date_arg(to.as_deref(), last)?,
        planner.posts().to_vec(),
    );
    let out = out.unwrap_or_else(paths::output_dir);
    let path = report::generate(&request, &config.report, &out)?;
    println!("✓ Report written to {}", path.display());
    Ok(())
}

fn backup_cli(planner: &Planner, cmd: BackupCommand) -> Result<()> {
    let db = planner.db();
    match cmd {
        BackupCommand::Export { path } => {
            let path = backup::export(db, &path.unwrap_or_else(|| PathBuf::from(".")))?;
            println!("✓ Backup written to {}", path.display());
        }
        BackupCommand::Restore { path } => {
            let count = backup::restore_file(db, &path)?;
            println!("✓ Restored {count} post(s)");
        }
        BackupCommand::Clear { yes } => {
            if !yes {
                let count = db.count_posts()?;
                bail!("This deletes all {count} posts of every brand. Re-run with --yes");
            }
            let count = db.clear_posts()?;
            println!("✓ Deleted {count} post(s)");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_command_runs_tui() {
        let cli = Cli::try_parse_from(["warp-planner"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_post_add_args() {
        let cli = Cli::try_parse_from([
            "warp-planner",
            "post",
            "add",
            "Spring launch",
            "--date",
            "tomorrow",
            "-p",
            "ig",
            "--budget",
            "50",
            "--brand",
            "Acme",
        ])
        .unwrap();
        assert_eq!(cli.brand.as_deref(), Some("Acme"));
        match cli.command {
            Some(Command::Post(PostCommand::Add { copy, date, platform, fields, .. })) => {
                assert_eq!(copy, "Spring launch");
                assert_eq!(date, "tomorrow");
                assert_eq!(platform, Some(Platform::Instagram));
                assert_eq!(fields.budget, Some(50.0));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_platform() {
        assert!(Cli::try_parse_from(["warp-planner", "post", "list", "-p", "myspace"]).is_err());
        assert!(Cli::try_parse_from(["warp-planner", "creds", "disconnect", "snap"]).is_err());
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("reach = 1200").unwrap(), ("reach", "1200"));
        assert_eq!(parse_assignment("token=a=b").unwrap(), ("token", "a=b"));
        assert!(parse_assignment("reach").is_err());
        assert!(parse_assignment("=5").is_err());
    }

    #[test]
    fn test_budget_must_be_finite() {
        assert_eq!(budget_arg("50"), Ok(50.0));
        assert!(budget_arg("NaN").is_err());
        assert!(budget_arg("inf").is_err());
        assert!(budget_arg("-5").is_err());
        assert!(Cli::try_parse_from(["warp-planner", "post", "add", "x", "--budget", "NaN"]).is_err());
    }

    #[test]
    fn test_metric_values_must_be_finite() {
        assert_eq!(parse_metric_value("3.2").unwrap(), 3.2);
        assert!(parse_metric_value("NaN").is_err());
        assert!(parse_metric_value("inf").is_err());
        assert!(parse_metric_value("-infinity").is_err());
        assert!(parse_metric_value("lots").is_err());
    }

    #[test]
    fn test_optional_clears_on_empty() {
        assert_eq!(optional(None), None);
        assert_eq!(optional(Some("  ".into())), Some(None));
        assert_eq!(optional(Some("x".into())), Some(Some("x".into())));
    }
}
