//! JSON backup and restore of brands and posts

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::models::{Brand, Post};

/// Current backup format version
pub const BACKUP_VERSION: u32 = 1;

/// Backup document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    /// Format version
    pub version: u32,
    /// When the backup was taken
    pub created_at: DateTime<Utc>,
    /// Brands (older backups may not have them)
    #[serde(default)]
    pub brands: Vec<Brand>,
    /// Posts
    pub posts: Vec<Post>,
}

/// Default backup file name for a day
pub fn backup_file_name(day: NaiveDate) -> String {
    format!("content_backup_{}.json", day.format("%Y-%m-%d"))
}

/// Snapshot every brand and post
pub fn snapshot(db: &Database) -> Result<Backup> {
    Ok(Backup {
        version: BACKUP_VERSION,
        created_at: Utc::now(),
        brands: db.get_brands()?,
        posts: db.get_all_posts()?,
    })
}

/// Write a backup; a directory target gets the default file name
pub fn export(db: &Database, target: &Path) -> Result<PathBuf> {
    let path = if target.is_dir() {
        target.join(backup_file_name(Utc::now().date_naive()))
    } else {
        target.to_path_buf()
    };

    let backup = snapshot(db)?;
    let json = serde_json::to_string_pretty(&backup)?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write backup: {}", path.display()))?;

    tracing::info!(
        "Exported {} brands and {} posts to {}",
        backup.brands.len(),
        backup.posts.len(),
        path.display()
    );
    Ok(path)
}

/// Parse a backup document; a document without `posts` is rejected
pub fn parse(json: &str) -> Result<Backup> {
    let value: serde_json::Value = serde_json::from_str(json).context("Backup is not valid JSON")?;
    if !value.get("posts").is_some_and(serde_json::Value::is_array) {
        bail!("Invalid backup format: no posts");
    }
    serde_json::from_value(value).context("Invalid backup format")
}

/// Merge a backup into the database. Returns the number of posts restored.
///
/// Brands go first so posts can reference them; posts whose brand is in
/// neither the backup nor the database are skipped.
pub fn restore(db: &Database, backup: &Backup) -> Result<usize> {
    if backup.version > BACKUP_VERSION {
        tracing::warn!("Backup version {} is newer than {}", backup.version, BACKUP_VERSION);
    }

    db.upsert_brands(&backup.brands)?;
    let known: HashSet<_> = db.get_brands()?.into_iter().map(|b| b.id).collect();

    let (posts, orphans): (Vec<Post>, Vec<Post>) = backup
        .posts
        .iter()
        .cloned()
        .partition(|p| known.contains(&p.brand_id));
    if !orphans.is_empty() {
        tracing::warn!("Skipping {} posts of unknown brands", orphans.len());
    }

    db.upsert_posts(&posts)
}

/// Read and restore a backup file
pub fn restore_file(db: &Database, path: &Path) -> Result<usize> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read backup: {}", path.display()))?;
    restore(db, &parse(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewPost, Platform};
    use crate::vault::Vault;
    use chrono::NaiveTime;
    use tempfile::TempDir;

    fn test_db(dir: &TempDir, name: &str) -> Database {
        Database::open_with_vault(&dir.path().join(name), Vault::with_key("test")).unwrap()
    }

    fn new_post(brand: &Brand, day: u32, copy: &str) -> Post {
        NewPost::new(
            NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            Platform::Instagram,
            copy,
        )
        .into_post(brand.id)
    }

    #[test]
    fn test_backup_file_name() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(backup_file_name(day), "content_backup_2026-03-07.json");
    }

    #[test]
    fn test_export_and_restore_into_fresh_db() {
        let dir = TempDir::new().unwrap();
        let source = test_db(&dir, "a.db");
        let brand = Brand::new("Acme");
        source.insert_brand(&brand).unwrap();
        source.insert_post(&new_post(&brand, 1, "one")).unwrap();
        source.insert_post(&new_post(&brand, 2, "two")).unwrap();

        let path = export(&source, dir.path()).unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("content_backup_"));

        let json = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], 1);
        assert!(value["createdAt"].is_string());

        let target = test_db(&dir, "b.db");
        assert_eq!(restore_file(&target, &path).unwrap(), 2);
        assert_eq!(target.get_brands().unwrap().len(), 1);
        assert_eq!(target.count_posts().unwrap(), 2);

        // restoring twice merges instead of duplicating
        assert_eq!(restore_file(&target, &path).unwrap(), 2);
        assert_eq!(target.count_posts().unwrap(), 2);
    }

    #[test]
    fn test_restore_skips_orphans() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir, "a.db");
        let brand = Brand::new("Acme");
        let ghost = Brand::new("Ghost");
        let backup = Backup {
            version: 1,
            created_at: Utc::now(),
            brands: vec![brand.clone()],
            posts: vec![new_post(&brand, 1, "kept"), new_post(&ghost, 2, "dropped")],
        };
        assert_eq!(restore(&db, &backup).unwrap(), 1);
        assert_eq!(db.get_all_posts().unwrap()[0].copy, "kept");
    }

    #[test]
    fn test_parse_rejects_missing_posts() {
        let err = parse(r#"{"version": 1, "createdAt": "2026-03-01T00:00:00Z", "brands": []}"#)
            .unwrap_err();
        assert!(err.to_string().contains("no posts"));
        assert!(parse("not json").is_err());

        let backup = parse(r#"{"version": 1, "createdAt": "2026-03-01T00:00:00Z", "posts": []}"#).unwrap();
        assert!(backup.brands.is_empty());
    }
}
