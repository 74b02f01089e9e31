//! Brand and post state over the store
//!
//! Holds the brand list, the current brand and its posts. Every write goes to
//! the database first; the in-memory copy only changes once that succeeded.

use anyhow::Result;
use uuid::Uuid;

use crate::db::Database;
use crate::error::PlannerError;
use crate::models::{Brand, BrandUpdate, NewPost, Post, PostStatus, PostUpdate};

/// In-memory planner state backed by a [`Database`]
pub struct Planner {
    db: Database,
    brands: Vec<Brand>,
    current: Option<Uuid>,
    posts: Vec<Post>,
}

impl Planner {
    /// Load brands and select `preferred` if it still exists, else the first brand
    pub fn open(db: Database, preferred: Option<Uuid>) -> Result<Self> {
        let brands = db.get_brands()?;
        let current = preferred
            .filter(|id| brands.iter().any(|b| b.id == *id))
            .or_else(|| brands.first().map(|b| b.id));

        let mut planner = Self {
            db,
            brands,
            current,
            posts: Vec::new(),
        };
        planner.refresh_posts()?;
        Ok(planner)
    }

    /// Underlying store
    pub const fn db(&self) -> &Database {
        &self.db
    }

    /// All brands ordered by name
    pub fn brands(&self) -> &[Brand] {
        &self.brands
    }

    /// Current brand id
    pub const fn current_brand_id(&self) -> Option<Uuid> {
        self.current
    }

    /// Current brand
    pub fn current_brand(&self) -> Option<&Brand> {
        self.current
            .and_then(|id| self.brands.iter().find(|b| b.id == id))
    }

    /// Posts of the current brand, newest first
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Find a loaded post
    pub fn post(&self, id: Uuid) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    fn require_brand(&self) -> Result<Uuid, PlannerError> {
        self.current.ok_or(PlannerError::NoBrandSelected)
    }

    // ==================== Brands ====================

    /// Make `id` the current brand and load its posts
    pub fn select_brand(&mut self, id: Uuid) -> Result<()> {
        if !self.brands.iter().any(|b| b.id == id) {
            return Err(PlannerError::BrandNotFound(id).into());
        }
        self.current = Some(id);
        self.refresh_posts()
    }

    /// Cycle to the next brand (by name order)
    pub fn select_next_brand(&mut self) -> Result<Option<&Brand>> {
        if self.brands.is_empty() {
            return Ok(None);
        }
        let idx = self
            .current
            .and_then(|id| self.brands.iter().position(|b| b.id == id))
            .map_or(0, |i| (i + 1) % self.brands.len());
        let id = self.brands[idx].id;
        self.select_brand(id)?;
        Ok(self.current_brand())
    }

    /// Resolve a brand by exact name (case-insensitive) or id prefix
    pub fn find_brand(&self, query: &str) -> Result<&Brand, PlannerError> {
        let query = query.trim();
        let lower = query.to_lowercase();
        self.brands
            .iter()
            .find(|b| b.name.to_lowercase() == lower)
            .or_else(|| {
                let mut matches = self
                    .brands
                    .iter()
                    .filter(|b| !lower.is_empty() && b.id.to_string().starts_with(&lower));
                match (matches.next(), matches.next()) {
                    (Some(brand), None) => Some(brand),
                    _ => None,
                }
            })
            .ok_or_else(|| PlannerError::BrandNotMatched(query.to_string()))
    }

    /// Store a new brand and make it current
    pub fn add_brand(&mut self, brand: Brand) -> Result<&Brand> {
        if brand.name.trim().is_empty() {
            return Err(PlannerError::InvalidInput("brand name is empty".to_string()).into());
        }
        self.db.insert_brand(&brand)?;
        tracing::debug!("Added brand {} ({})", brand.name, brand.id);
        let id = brand.id;
        self.brands.push(brand);
        self.sort_brands();
        self.current = Some(id);
        self.posts.clear();
        Ok(self.current_brand().ok_or(PlannerError::BrandNotFound(id))?)
    }

    /// Apply a partial update to a brand
    pub fn update_brand(&mut self, id: Uuid, update: &BrandUpdate) -> Result<&Brand> {
        let brand = self
            .db
            .update_brand(id, update)?
            .ok_or(PlannerError::BrandNotFound(id))?;
        if let Some(slot) = self.brands.iter_mut().find(|b| b.id == id) {
            *slot = brand;
        }
        self.sort_brands();
        Ok(self
            .brands
            .iter()
            .find(|b| b.id == id)
            .ok_or(PlannerError::BrandNotFound(id))?)
    }

    /// Delete a brand and its dependants; selects the first remaining brand if it was current
    pub fn delete_brand(&mut self, id: Uuid) -> Result<()> {
        if !self.db.delete_brand(id)? {
            return Err(PlannerError::BrandNotFound(id).into());
        }
        tracing::debug!("Deleted brand {id}");
        self.brands.retain(|b| b.id != id);
        if self.current == Some(id) {
            self.current = self.brands.first().map(|b| b.id);
            self.refresh_posts()?;
        }
        Ok(())
    }

    fn sort_brands(&mut self) {
        self.brands
            .sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    }

    // ==================== Posts ====================

    /// Reload the current brand's posts from the store
    pub fn refresh_posts(&mut self) -> Result<()> {
        self.posts = match self.current {
            Some(id) => self.db.get_posts(id)?,
            None => Vec::new(),
        };
        Ok(())
    }

    fn validate(post: &Post) -> Result<(), PlannerError> {
        if let Some(ad_id) = &post.ad_id
            && !post.platform.validate_ad_id(ad_id)
        {
            return Err(PlannerError::invalid_ad_id(post.platform, ad_id));
        }
        if post.budget < 0.0 {
            return Err(PlannerError::InvalidInput("budget is negative".to_string()));
        }
        Ok(())
    }

    /// Create a post for the current brand
    pub fn add_post(&mut self, new: NewPost) -> Result<&Post> {
        let brand_id = self.require_brand()?;
        let post = new.into_post(brand_id);
        Self::validate(&post)?;
        self.db.insert_post(&post)?;
        let id = post.id;
        self.posts.push(post);
        self.sort_posts();
        Ok(self.post(id).ok_or(PlannerError::PostNotFound(id))?)
    }

    /// Create several posts for the current brand, all or nothing
    pub fn bulk_add_posts(&mut self, posts: Vec<NewPost>) -> Result<usize> {
        let brand_id = self.require_brand()?;
        let posts: Vec<Post> = posts.into_iter().map(|p| p.into_post(brand_id)).collect();
        for post in &posts {
            Self::validate(post)?;
        }
        self.db.insert_posts(&posts)?;
        let count = posts.len();
        self.posts.extend(posts);
        self.sort_posts();
        tracing::debug!("Added {count} posts");
        Ok(count)
    }

    /// Apply a partial update to a post
    pub fn update_post(&mut self, id: Uuid, update: &PostUpdate) -> Result<&Post> {
        let mut preview = self
            .db
            .get_post(id)?
            .ok_or(PlannerError::PostNotFound(id))?;
        update.apply(&mut preview);
        Self::validate(&preview)?;

        let post = self
            .db
            .update_post(id, update)?
            .ok_or(PlannerError::PostNotFound(id))?;
        if Some(post.brand_id) == self.current {
            match self.posts.iter_mut().find(|p| p.id == id) {
                Some(slot) => *slot = post,
                None => self.posts.push(post),
            }
            self.sort_posts();
        }
        Ok(self
            .post(id)
            .ok_or(PlannerError::PostNotFound(id))?)
    }

    /// Delete a post
    pub fn delete_post(&mut self, id: Uuid) -> Result<()> {
        if !self.db.delete_post(id)? {
            return Err(PlannerError::PostNotFound(id).into());
        }
        self.posts.retain(|p| p.id != id);
        Ok(())
    }

    /// Delete several posts; returns how many existed
    pub fn bulk_delete_posts(&mut self, ids: &[Uuid]) -> Result<usize> {
        let count = self.db.delete_posts(ids)?;
        self.posts.retain(|p| !ids.contains(&p.id));
        Ok(count)
    }

    /// Set the status of several posts
    pub fn bulk_update_status(&mut self, ids: &[Uuid], status: PostStatus) -> Result<usize> {
        let count = self.db.update_posts_status(ids, status)?;
        for post in self.posts.iter_mut().filter(|p| ids.contains(&p.id)) {
            post.status = status;
        }
        Ok(count)
    }

    /// Distinct campaign names of the current brand matching `query` (case-insensitive)
    pub fn campaign_suggestions(&self, query: &str) -> Vec<String> {
        let query = query.trim().to_lowercase();
        let mut names: Vec<String> = self
            .posts
            .iter()
            .filter_map(|p| p.campaign_name.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .filter(|name| name.to_lowercase().contains(&query))
            .map(ToString::to_string)
            .collect();
        // case variants count as one name, like the store's NOCASE lookup
        names.sort_by_key(|n| n.to_lowercase());
        names.dedup_by_key(|n| n.to_lowercase());
        names
    }

    /// Resolve a loaded post by id prefix
    pub fn find_post(&self, prefix: &str) -> Result<&Post, PlannerError> {
        let prefix = prefix.trim().to_lowercase();
        let mut matches = self
            .posts
            .iter()
            .filter(|p| !prefix.is_empty() && p.id.to_string().starts_with(&prefix));
        match (matches.next(), matches.next()) {
            (Some(post), None) => Ok(post),
            (Some(_), Some(_)) => Err(PlannerError::InvalidInput(format!(
                "post id prefix '{prefix}' is ambiguous"
            ))),
            _ => Err(PlannerError::InvalidInput(format!("no post matches '{prefix}'"))),
        }
    }

    fn sort_posts(&mut self) {
        self.posts
            .sort_by(|a, b| (b.date, b.time).cmp(&(a.date, a.time)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;
    use crate::vault::Vault;
    use chrono::{NaiveDate, NaiveTime};

    fn planner() -> (tempfile::TempDir, Planner) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_with_vault(&dir.path().join("p.sqlite"), Vault::with_key("t")).unwrap();
        (dir, Planner::open(db, None).unwrap())
    }

    fn draft(day: u32, hour: u32) -> NewPost {
        NewPost::new(
            NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            Platform::Facebook,
            format!("post {day} {hour}"),
        )
    }

    #[test]
    fn test_add_post_requires_brand() {
        let (_dir, mut planner) = planner();
        let err = planner.add_post(draft(1, 9)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PlannerError>(),
            Some(PlannerError::NoBrandSelected)
        ));
    }

    #[test]
    fn test_add_brand_selects_it() {
        let (_dir, mut planner) = planner();
        planner.add_brand(Brand::new("Zeta")).unwrap();
        let acme = planner.add_brand(Brand::new("Acme")).unwrap().id;
        assert_eq!(planner.current_brand_id(), Some(acme));
        assert_eq!(planner.brands()[0].name, "Acme");
        assert!(planner.add_brand(Brand::new("   ")).is_err());
    }

    #[test]
    fn test_open_restores_selection_or_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.sqlite");
        let zeta = Brand::new("Zeta");
        {
            let db = Database::open_with_vault(&path, Vault::with_key("t")).unwrap();
            db.insert_brand(&Brand::new("Acme")).unwrap();
            db.insert_brand(&zeta).unwrap();
        }
        let db = Database::open_with_vault(&path, Vault::with_key("t")).unwrap();
        let planner = Planner::open(db, Some(zeta.id)).unwrap();
        assert_eq!(planner.current_brand().unwrap().name, "Zeta");

        let db = Database::open_with_vault(&path, Vault::with_key("t")).unwrap();
        let planner = Planner::open(db, Some(Uuid::new_v4())).unwrap();
        assert_eq!(planner.current_brand().unwrap().name, "Acme");
    }

    #[test]
    fn test_posts_stay_sorted_newest_first() {
        let (_dir, mut planner) = planner();
        planner.add_brand(Brand::new("Acme")).unwrap();
        planner.add_post(draft(5, 9)).unwrap();
        planner
            .bulk_add_posts(vec![draft(1, 9), draft(5, 18), draft(9, 8)])
            .unwrap();
        let days: Vec<String> = planner
            .posts()
            .iter()
            .map(|p| format!("{} {}", p.date, p.time_str()))
            .collect();
        assert_eq!(
            days,
            vec!["2026-03-09 08:00", "2026-03-05 18:00", "2026-03-05 09:00", "2026-03-01 09:00"]
        );
    }

    #[test]
    fn test_invalid_ad_id_is_rejected_before_write() {
        let (_dir, mut planner) = planner();
        planner.add_brand(Brand::new("Acme")).unwrap();
        let mut bad = draft(1, 9);
        bad.ad_id = Some("not-a-number".to_string());
        let err = planner.bulk_add_posts(vec![draft(2, 9), bad]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PlannerError>(),
            Some(PlannerError::InvalidAdId { .. })
        ));
        assert!(planner.posts().is_empty());
        assert_eq!(planner.db().count_posts().unwrap(), 0);
    }

    #[test]
    fn test_update_and_delete_posts() {
        let (_dir, mut planner) = planner();
        planner.add_brand(Brand::new("Acme")).unwrap();
        let a = planner.add_post(draft(1, 9)).unwrap().id;
        let b = planner.add_post(draft(2, 9)).unwrap().id;
        let c = planner.add_post(draft(3, 9)).unwrap().id;

        let updated = planner
            .update_post(a, &PostUpdate::status(PostStatus::Scheduled))
            .unwrap();
        assert_eq!(updated.status, PostStatus::Scheduled);

        let bad = PostUpdate {
            ad_id: Some(Some("abc".to_string())),
            ..Default::default()
        };
        assert!(planner.update_post(a, &bad).is_err());
        assert!(planner.db().get_post(a).unwrap().unwrap().ad_id.is_none());

        assert_eq!(planner.bulk_update_status(&[b, c], PostStatus::Approved).unwrap(), 2);
        assert!(planner.posts().iter().filter(|p| p.id != a).all(|p| p.status == PostStatus::Approved));

        planner.delete_post(a).unwrap();
        assert!(planner.delete_post(a).is_err());
        assert_eq!(planner.bulk_delete_posts(&[b, c]).unwrap(), 2);
        assert!(planner.posts().is_empty());
    }

    #[test]
    fn test_delete_current_brand_selects_first_remaining() {
        let (_dir, mut planner) = planner();
        let acme = planner.add_brand(Brand::new("Acme")).unwrap().id;
        let zeta = planner.add_brand(Brand::new("Zeta")).unwrap().id;
        planner.add_post(draft(1, 9)).unwrap();

        planner.delete_brand(zeta).unwrap();
        assert_eq!(planner.current_brand_id(), Some(acme));
        assert!(planner.posts().is_empty());

        planner.delete_brand(acme).unwrap();
        assert!(planner.current_brand().is_none());
    }

    #[test]
    fn test_campaign_suggestions() {
        let (_dir, mut planner) = planner();
        planner.add_brand(Brand::new("Acme")).unwrap();
        let mut posts = Vec::new();
        for name in ["Summer Sale", "spring drop", "Summer Sale", " ", "Black Friday"] {
            let mut p = draft(1, 9);
            p.campaign_name = Some(name.to_string());
            posts.push(p);
        }
        planner.bulk_add_posts(posts).unwrap();
        assert_eq!(
            planner.campaign_suggestions(""),
            vec!["Black Friday", "spring drop", "Summer Sale"]
        );
        assert_eq!(planner.campaign_suggestions("SUM"), vec!["Summer Sale"]);
    }

    #[test]
    fn test_campaign_suggestions_ignore_case_variants() {
        let (_dir, mut planner) = planner();
        planner.add_brand(Brand::new("Acme")).unwrap();
        let mut posts = Vec::new();
        for name in ["Summer Sale", "summer sale", "Autumn", "SUMMER SALE", "autumn"] {
            let mut p = draft(1, 9);
            p.campaign_name = Some(name.to_string());
            posts.push(p);
        }
        planner.bulk_add_posts(posts).unwrap();

        let summer = planner.campaign_suggestions("sum");
        assert_eq!(summer.len(), 1);
        assert!(summer[0].eq_ignore_ascii_case("summer sale"));
        assert_eq!(planner.campaign_suggestions("").len(), 2);
    }

    #[test]
    fn test_find_brand_by_name_or_prefix() {
        let (_dir, mut planner) = planner();
        let id = planner.add_brand(Brand::new("Acme Co")).unwrap().id;
        assert_eq!(planner.find_brand("acme co").unwrap().id, id);
        assert_eq!(planner.find_brand(&id.to_string()[..8]).unwrap().id, id);
        assert!(planner.find_brand("nope").is_err());
    }
}
