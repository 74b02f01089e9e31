//! Database module for `SQLite` storage (brands, posts, KPI records, API credentials)

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::path::Path;
use std::path::PathBuf;
use uuid::Uuid;

use crate::models::{
    ApiCredentials, ApiPlatform, Awareness, Brand, BrandUpdate, CredentialFields, Engagement,
    Financials, KpiRecord, Performance, Platform, Post, PostStatus, PostUpdate,
};
use crate::paths;
use crate::vault::Vault;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

const POST_COLUMNS: &str = "id, brand_id, date, time, platform, objective, status, is_paid, budget, \
     copy, image, campaign_name, ad_group_name, ad_id, created_at, updated_at";

const BRAND_COLUMNS: &str =
    "id, name, color, industry, logo, active_networks, secondary_color, created_at, updated_at";

/// Database connection wrapper
pub struct Database {
    conn: Connection,
    vault: Vault,
}

impl Database {
    /// Open or create the database at the default location
    pub fn open() -> Result<Self> {
        let path = Self::default_path()?;
        Self::open_path(&path)
    }

    /// Open or create the database at a specific path, sealing with the machine key
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open_with_vault(path, Vault::machine())
    }

    /// Open or create the database at a specific path with an explicit vault
    pub fn open_with_vault(path: &Path, vault: Vault) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create data directory")?;
        }

        let conn = Connection::open(path).context("Failed to open database")?;

        let db = Self { conn, vault };
        db.init()?;

        Ok(db)
    }

    /// Get the default database path
    pub fn default_path() -> Result<PathBuf> {
        paths::database_path()
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r"
            PRAGMA foreign_keys = ON;

            -- Brands table
            CREATE TABLE IF NOT EXISTS brands (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                color TEXT NOT NULL,
                industry TEXT NOT NULL DEFAULT '',
                logo TEXT,
                active_networks TEXT NOT NULL DEFAULT '[]',
                secondary_color TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Posts table
            CREATE TABLE IF NOT EXISTS posts (
                id TEXT PRIMARY KEY,
                brand_id TEXT NOT NULL REFERENCES brands(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                platform TEXT NOT NULL,
                objective TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'draft',
                is_paid INTEGER NOT NULL DEFAULT 0,
                budget REAL NOT NULL DEFAULT 0,
                copy TEXT NOT NULL DEFAULT '',
                image TEXT,
                campaign_name TEXT,
                ad_group_name TEXT,
                ad_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- KPI records table (one per brand and month)
            CREATE TABLE IF NOT EXISTS kpis (
                id TEXT PRIMARY KEY,
                brand_id TEXT NOT NULL REFERENCES brands(id) ON DELETE CASCADE,
                month TEXT NOT NULL,
                metrics TEXT NOT NULL,
                UNIQUE(brand_id, month)
            );

            -- API credentials table (fields sealed)
            CREATE TABLE IF NOT EXISTS api_credentials (
                id TEXT PRIMARY KEY,
                brand_id TEXT NOT NULL REFERENCES brands(id) ON DELETE CASCADE,
                platform TEXT NOT NULL,
                sealed_fields TEXT NOT NULL,
                is_connected INTEGER NOT NULL DEFAULT 1,
                last_sync TEXT,
                UNIQUE(brand_id, platform)
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_posts_brand_date ON posts(brand_id, date);
            CREATE INDEX IF NOT EXISTS idx_kpis_brand ON kpis(brand_id, month);
            ",
        )?;

        Ok(())
    }

    // ==================== Brands ====================

    /// Insert a new brand
    pub fn insert_brand(&self, brand: &Brand) -> Result<()> {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO brands ({BRAND_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                params_from_iter(brand_values(brand)?),
            )
            .context("Failed to insert brand")?;
        Ok(())
    }

    /// Insert or overwrite brands by id (used by restore)
    pub fn upsert_brands(&self, brands: &[Brand]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        for brand in brands {
            tx.execute(
                &format!(
                    "INSERT INTO brands ({BRAND_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                     ON CONFLICT(id) DO UPDATE SET
                        name = excluded.name, color = excluded.color, industry = excluded.industry,
                        logo = excluded.logo, active_networks = excluded.active_networks,
                        secondary_color = excluded.secondary_color, updated_at = excluded.updated_at"
                ),
                params_from_iter(brand_values(brand)?),
            )?;
        }
        tx.commit().context("Failed to restore brands")?;
        Ok(brands.len())
    }

    /// Get all brands ordered by name
    pub fn get_brands(&self) -> Result<Vec<Brand>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BRAND_COLUMNS} FROM brands ORDER BY name COLLATE NOCASE, created_at"
        ))?;
        let brands = stmt.query_map([], Self::row_to_brand)?;
        brands.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Get a brand by id
    pub fn get_brand(&self, id: Uuid) -> Result<Option<Brand>> {
        self.conn
            .query_row(
                &format!("SELECT {BRAND_COLUMNS} FROM brands WHERE id = ?1"),
                params![id.to_string()],
                Self::row_to_brand,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Apply a partial update; returns the updated brand, or `None` if it doesn't exist
    pub fn update_brand(&self, id: Uuid, update: &BrandUpdate) -> Result<Option<Brand>> {
        let Some(mut brand) = self.get_brand(id)? else {
            return Ok(None);
        };
        update.apply(&mut brand);
        self.conn.execute(
            "UPDATE brands SET name = ?2, color = ?3, industry = ?4, logo = ?5,
                active_networks = ?6, secondary_color = ?7, updated_at = ?8
             WHERE id = ?1",
            params![
                brand.id.to_string(),
                brand.name,
                brand.color,
                brand.industry,
                brand.logo,
                networks_json(&brand.active_networks)?,
                brand.secondary_color,
                brand.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(Some(brand))
    }

    /// Delete a brand together with its posts, KPI records and credentials
    pub fn delete_brand(&self, id: Uuid) -> Result<bool> {
        let count = self
            .conn
            .execute("DELETE FROM brands WHERE id = ?1", params![id.to_string()])?;
        Ok(count > 0)
    }

    /// Helper to convert a row to `Brand`
    fn row_to_brand(row: &Row<'_>) -> rusqlite::Result<Brand> {
        let networks: String = row.get(5)?;
        Ok(Brand {
            id: parse_uuid(row, 0)?,
            name: row.get(1)?,
            color: row.get(2)?,
            industry: row.get(3)?,
            logo: row.get(4)?,
            active_networks: serde_json::from_str::<Vec<String>>(&networks)
                .unwrap_or_default()
                .iter()
                .filter_map(|s| Platform::from_str(s))
                .collect(),
            secondary_color: row.get(6)?,
            created_at: parse_timestamp(row, 7)?,
            updated_at: parse_timestamp(row, 8)?,
        })
    }

    // ==================== Posts ====================

    /// Insert a new post
    pub fn insert_post(&self, post: &Post) -> Result<()> {
        self.conn
            .execute(&insert_post_sql(false), params_from_iter(post_values(post)))
            .context("Failed to insert post")?;
        Ok(())
    }

    /// Insert several posts in one transaction; nothing is written if any insert fails
    pub fn insert_posts(&self, posts: &[Post]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(&insert_post_sql(false))?;
            for post in posts {
                stmt.execute(params_from_iter(post_values(post)))
                    .with_context(|| format!("Failed to insert post {}", post.id))?;
            }
        }
        tx.commit().context("Failed to commit bulk insert")?;
        Ok(())
    }

    /// Insert or overwrite posts by id (used by restore)
    pub fn upsert_posts(&self, posts: &[Post]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(&insert_post_sql(true))?;
            for post in posts {
                stmt.execute(params_from_iter(post_values(post)))?;
            }
        }
        tx.commit().context("Failed to restore posts")?;
        Ok(posts.len())
    }

    /// Get all posts of a brand, newest first
    pub fn get_posts(&self, brand_id: Uuid) -> Result<Vec<Post>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE brand_id = ?1 ORDER BY date DESC, time DESC"
        ))?;
        let posts = stmt.query_map(params![brand_id.to_string()], Self::row_to_post)?;
        posts.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Get a brand's posts between two days (inclusive), chronologically
    pub fn get_posts_in_range(
        &self,
        brand_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Post>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE brand_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date ASC, time ASC"
        ))?;
        let posts = stmt.query_map(
            params![
                brand_id.to_string(),
                start.format(DATE_FORMAT).to_string(),
                end.format(DATE_FORMAT).to_string()
            ],
            Self::row_to_post,
        )?;
        posts.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Get every post of every brand (used by backup)
    pub fn get_all_posts(&self) -> Result<Vec<Post>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY date ASC, time ASC"
        ))?;
        let posts = stmt.query_map([], Self::row_to_post)?;
        posts.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Get a post by id
    pub fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
        self.conn
            .query_row(
                &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"),
                params![id.to_string()],
                Self::row_to_post,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Apply a partial update; returns the updated post, or `None` if it doesn't exist
    pub fn update_post(&self, id: Uuid, update: &PostUpdate) -> Result<Option<Post>> {
        let Some(mut post) = self.get_post(id)? else {
            return Ok(None);
        };
        update.apply(&mut post);
        self.conn.execute(
            "UPDATE posts SET date = ?2, time = ?3, platform = ?4, objective = ?5, status = ?6,
                is_paid = ?7, budget = ?8, copy = ?9, image = ?10, campaign_name = ?11,
                ad_group_name = ?12, ad_id = ?13, updated_at = ?14
             WHERE id = ?1",
            params![
                post.id.to_string(),
                post.date.format(DATE_FORMAT).to_string(),
                post.time.format(TIME_FORMAT).to_string(),
                post.platform.as_str(),
                post.objective,
                post.status.as_str(),
                i32::from(post.is_paid),
                post.budget,
                post.copy,
                post.image,
                post.campaign_name,
                post.ad_group_name,
                post.ad_id,
                post.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(Some(post))
    }

    /// Delete a post
    pub fn delete_post(&self, id: Uuid) -> Result<bool> {
        let count = self
            .conn
            .execute("DELETE FROM posts WHERE id = ?1", params![id.to_string()])?;
        Ok(count > 0)
    }

    /// Delete several posts in one transaction; returns how many existed
    pub fn delete_posts(&self, ids: &[Uuid]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut count = 0;
        for id in ids {
            count += tx.execute("DELETE FROM posts WHERE id = ?1", params![id.to_string()])?;
        }
        tx.commit()?;
        Ok(count)
    }

    /// Set the status of several posts in one transaction
    pub fn update_posts_status(&self, ids: &[Uuid], status: PostStatus) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let now = Utc::now().to_rfc3339();
        let mut count = 0;
        for id in ids {
            count += tx.execute(
                "UPDATE posts SET status = ?2, updated_at = ?3 WHERE id = ?1",
                params![id.to_string(), status.as_str(), now],
            )?;
        }
        tx.commit()?;
        Ok(count)
    }

    /// Delete every post of every brand
    pub fn clear_posts(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM posts", [])?)
    }

    /// Count posts of every brand
    pub fn count_posts(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Distinct non-blank campaign names of a brand, sorted
    pub fn get_campaign_names(&self, brand_id: Uuid) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT TRIM(campaign_name) AS name FROM posts
             WHERE brand_id = ?1 AND campaign_name IS NOT NULL AND TRIM(campaign_name) != ''
             ORDER BY name COLLATE NOCASE",
        )?;
        let names = stmt.query_map(params![brand_id.to_string()], |row| row.get(0))?;
        names.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Helper to convert a row to `Post`
    fn row_to_post(row: &Row<'_>) -> rusqlite::Result<Post> {
        let platform: String = row.get(4)?;
        let status: String = row.get(6)?;

        Ok(Post {
            id: parse_uuid(row, 0)?,
            brand_id: parse_uuid(row, 1)?,
            date: parse_with(row, 2, |s| NaiveDate::parse_from_str(s, DATE_FORMAT))?,
            time: parse_with(row, 3, |s| NaiveTime::parse_from_str(s, TIME_FORMAT))?,
            platform: Platform::from_str(&platform).unwrap_or_default(),
            objective: row.get(5)?,
            status: PostStatus::from_str(&status).unwrap_or_default(),
            is_paid: row.get::<_, i32>(7)? != 0,
            budget: row.get(8)?,
            copy: row.get(9)?,
            image: row.get(10)?,
            campaign_name: row.get(11)?,
            ad_group_name: row.get(12)?,
            ad_id: row.get(13)?,
            created_at: parse_timestamp(row, 14)?,
            updated_at: parse_timestamp(row, 15)?,
        })
    }

    // ==================== KPI records ====================

    /// Save a KPI record; a record for the same brand and month is replaced
    pub fn upsert_kpi(&self, record: &KpiRecord) -> Result<()> {
        let metrics = serde_json::to_string(&KpiMetrics::from(record))?;
        self.conn
            .execute(
                "INSERT INTO kpis (id, brand_id, month, metrics) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(brand_id, month) DO UPDATE SET metrics = excluded.metrics",
                params![
                    record.id.to_string(),
                    record.brand_id.to_string(),
                    record.month,
                    metrics
                ],
            )
            .context("Failed to save KPI record")?;
        Ok(())
    }

    /// Get a brand's KPI records ordered by month
    pub fn get_kpis(&self, brand_id: Uuid) -> Result<Vec<KpiRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, brand_id, month, metrics FROM kpis WHERE brand_id = ?1 ORDER BY month ASC",
        )?;
        let records = stmt.query_map(params![brand_id.to_string()], Self::row_to_kpi)?;
        records.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Get the record of one month
    pub fn get_kpi(&self, brand_id: Uuid, month: &str) -> Result<Option<KpiRecord>> {
        self.conn
            .query_row(
                "SELECT id, brand_id, month, metrics FROM kpis WHERE brand_id = ?1 AND month = ?2",
                params![brand_id.to_string(), month],
                Self::row_to_kpi,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Delete the record of one month
    pub fn delete_kpi(&self, brand_id: Uuid, month: &str) -> Result<bool> {
        let count = self.conn.execute(
            "DELETE FROM kpis WHERE brand_id = ?1 AND month = ?2",
            params![brand_id.to_string(), month],
        )?;
        Ok(count > 0)
    }

    /// Helper to convert a row to `KpiRecord`
    fn row_to_kpi(row: &Row<'_>) -> rusqlite::Result<KpiRecord> {
        let metrics: KpiMetrics = parse_with(row, 3, |s| serde_json::from_str(s))?;
        Ok(KpiRecord {
            id: parse_uuid(row, 0)?,
            brand_id: parse_uuid(row, 1)?,
            month: row.get(2)?,
            awareness: metrics.awareness,
            engagement: metrics.engagement,
            performance: metrics.performance,
            financials: metrics.financials,
        })
    }

    // ==================== API credentials ====================

    /// Save credentials; an existing row for the same brand and platform is replaced
    pub fn upsert_credentials(&self, creds: &ApiCredentials) -> Result<()> {
        let sealed = self.vault.seal_json(&creds.fields)?;
        self.conn
            .execute(
                "INSERT INTO api_credentials (id, brand_id, platform, sealed_fields, is_connected, last_sync)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(brand_id, platform) DO UPDATE SET
                    sealed_fields = excluded.sealed_fields,
                    is_connected = excluded.is_connected,
                    last_sync = excluded.last_sync",
                params![
                    creds.id.to_string(),
                    creds.brand_id.to_string(),
                    creds.platform.as_str(),
                    sealed,
                    i32::from(creds.is_connected),
                    creds.last_sync.map(|dt| dt.to_rfc3339()),
                ],
            )
            .context("Failed to save credentials")?;
        Ok(())
    }

    /// Get a brand's credentials (opened)
    pub fn get_credentials(&self, brand_id: Uuid) -> Result<Vec<ApiCredentials>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, brand_id, platform, sealed_fields, is_connected, last_sync
             FROM api_credentials WHERE brand_id = ?1 ORDER BY platform",
        )?;
        let rows = stmt.query_map(params![brand_id.to_string()], |row| {
            let platform: String = row.get(2)?;
            Ok((
                parse_uuid(row, 0)?,
                parse_uuid(row, 1)?,
                ApiPlatform::from_str(&platform),
                row.get::<_, String>(3)?,
                row.get::<_, i32>(4)? != 0,
                row.get::<_, Option<String>>(5)?
                    .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                    .map(|dt| dt.with_timezone(&Utc)),
            ))
        })?;

        let mut creds = Vec::new();
        for row in rows {
            let (id, brand_id, platform, sealed, is_connected, last_sync) = row?;
            let Some(platform) = platform else {
                tracing::warn!("Skipping credentials {id} with unknown platform");
                continue;
            };
            let fields: CredentialFields = self
                .vault
                .open_json(&sealed)
                .with_context(|| format!("Failed to open {} credentials", platform.name()))?;
            creds.push(ApiCredentials {
                id,
                brand_id,
                platform,
                fields,
                is_connected,
                last_sync,
            });
        }
        Ok(creds)
    }

    /// Enable or disable a connection
    pub fn set_credentials_connected(
        &self,
        brand_id: Uuid,
        platform: ApiPlatform,
        connected: bool,
    ) -> Result<bool> {
        let count = self.conn.execute(
            "UPDATE api_credentials SET is_connected = ?3 WHERE brand_id = ?1 AND platform = ?2",
            params![brand_id.to_string(), platform.as_str(), i32::from(connected)],
        )?;
        Ok(count > 0)
    }

    /// Stamp a successful fetch
    pub fn mark_synced(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "UPDATE api_credentials SET last_sync = ?2 WHERE id = ?1",
            params![id.to_string(), at.to_rfc3339()],
        )?;
        Ok(())
    }
}

/// Serialized body of the `kpis.metrics` column
#[derive(serde::Serialize, serde::Deserialize)]
struct KpiMetrics {
    #[serde(default)]
    awareness: Awareness,
    #[serde(default)]
    engagement: Engagement,
    #[serde(default)]
    performance: Performance,
    #[serde(default)]
    financials: Financials,
}

impl From<&KpiRecord> for KpiMetrics {
    fn from(record: &KpiRecord) -> Self {
        Self {
            awareness: record.awareness,
            engagement: record.engagement,
            performance: record.performance,
            financials: record.financials,
        }
    }
}

fn insert_post_sql(upsert: bool) -> String {
    let mut sql = format!(
        "INSERT INTO posts ({POST_COLUMNS})
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
    );
    if upsert {
        sql.push_str(
            " ON CONFLICT(id) DO UPDATE SET
                brand_id = excluded.brand_id, date = excluded.date, time = excluded.time,
                platform = excluded.platform, objective = excluded.objective,
                status = excluded.status, is_paid = excluded.is_paid, budget = excluded.budget,
                copy = excluded.copy, image = excluded.image,
                campaign_name = excluded.campaign_name, ad_group_name = excluded.ad_group_name,
                ad_id = excluded.ad_id, updated_at = excluded.updated_at",
        );
    }
    sql
}

fn post_values(post: &Post) -> Vec<Value> {
    vec![
        post.id.to_string().into(),
        post.brand_id.to_string().into(),
        post.date.format(DATE_FORMAT).to_string().into(),
        post.time.format(TIME_FORMAT).to_string().into(),
        post.platform.as_str().to_string().into(),
        post.objective.clone().into(),
        post.status.as_str().to_string().into(),
        i64::from(post.is_paid).into(),
        post.budget.into(),
        post.copy.clone().into(),
        post.image.clone().into(),
        post.campaign_name.clone().into(),
        post.ad_group_name.clone().into(),
        post.ad_id.clone().into(),
        post.created_at.to_rfc3339().into(),
        post.updated_at.to_rfc3339().into(),
    ]
}

fn brand_values(brand: &Brand) -> Result<Vec<Value>> {
    Ok(vec![
        brand.id.to_string().into(),
        brand.name.clone().into(),
        brand.color.clone().into(),
        brand.industry.clone().into(),
        brand.logo.clone().into(),
        networks_json(&brand.active_networks)?.into(),
        brand.secondary_color.clone().into(),
        brand.created_at.to_rfc3339().into(),
        brand.updated_at.to_rfc3339().into(),
    ])
}

fn networks_json(networks: &[Platform]) -> Result<String> {
    let keys: Vec<&str> = networks.iter().map(Platform::as_str).collect();
    serde_json::to_string(&keys).context("Failed to serialize networks")
}

/// Read a text column and convert it, mapping failures to a conversion error
fn parse_with<T, E>(
    row: &Row<'_>,
    idx: usize,
    parse: impl FnOnce(&str) -> Result<T, E>,
) -> rusqlite::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    parse(&text).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    parse_with(row, idx, Uuid::parse_str)
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    parse_with(row, idx, DateTime::parse_from_rfc3339).map(|dt| dt.with_timezone(&Utc))
}
