//! Application state

use anyhow::Result;
use chrono::{Duration, Local, NaiveDate};

use crate::calendar::{CalendarView, PostFilter, posts_on, sort_chronologically};
use crate::config::Config;
use crate::models::{DataFetchResult, KpiRecord, KpiSummary, Post, PostUpdate};
use crate::planner::Planner;
use crate::theme::Theme;

/// Top-level tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Calendar,
    List,
    Brands,
    Kpis,
}

impl Tab {
    pub const fn all() -> &'static [Self] {
        &[Self::Calendar, Self::List, Self::Brands, Self::Kpis]
    }

    pub const fn next(self) -> Self {
        match self {
            Self::Calendar => Self::List,
            Self::List => Self::Brands,
            Self::Brands => Self::Kpis,
            Self::Kpis => Self::Calendar,
        }
    }

    pub const fn prev(self) -> Self {
        match self {
            Self::Calendar => Self::Kpis,
            Self::List => Self::Calendar,
            Self::Brands => Self::List,
            Self::Kpis => Self::Brands,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Calendar => "Calendar",
            Self::List => "List",
            Self::Brands => "Brands",
            Self::Kpis => "KPIs",
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Calendar => 0,
            Self::List => 1,
            Self::Brands => 2,
            Self::Kpis => 3,
        }
    }
}

/// Input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Help,
    Search,
    ConfirmDelete,
}

/// Application state
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// Brand and post state
    pub planner: Planner,
    /// Whether to quit
    pub should_quit: bool,
    /// Current theme
    pub theme: Theme,
    /// Current tab
    pub tab: Tab,
    /// Input mode
    pub mode: Mode,

    /// Calendar granularity
    pub view: CalendarView,
    /// Focused day
    pub cursor: NaiveDate,
    /// Post selected among the focused day's posts
    pub day_selection: usize,

    /// Active filter
    pub filter: PostFilter,
    /// Search input buffer
    pub search_input: String,
    /// Selected row in the list tab
    pub list_selection: usize,
    /// Selected row in the brands tab
    pub brand_selection: usize,

    /// KPI records of the current brand, by month
    pub kpis: Vec<KpiRecord>,
    /// Result of the last API fetch
    pub last_fetch: Option<DataFetchResult>,

    /// Status message (bottom bar)
    pub status: String,
    /// Is a sync running?
    pub syncing: bool,
    /// Is a report being written?
    pub reporting: bool,

    /// Tick counter for the spinner
    tick: u64,
}

impl AppState {
    /// Create a new app state focused on today
    pub fn new(config: Config, planner: Planner) -> Result<Self> {
        Self::with_today(config, planner, Local::now().date_naive())
    }

    /// Create a new app state focused on `today`
    pub fn with_today(config: Config, planner: Planner, today: NaiveDate) -> Result<Self> {
        let theme = config.theme;
        let mut state = Self {
            config,
            planner,
            should_quit: false,
            theme,
            tab: Tab::Calendar,
            mode: Mode::Normal,
            view: CalendarView::Month,
            cursor: today,
            day_selection: 0,
            filter: PostFilter::default(),
            search_input: String::new(),
            list_selection: 0,
            brand_selection: 0,
            kpis: Vec::new(),
            last_fetch: None,
            status: String::new(),
            syncing: false,
            reporting: false,
            tick: 0,
        };
        state.reload_kpis()?;
        state.brand_selection = state.current_brand_index().unwrap_or(0);
        Ok(state)
    }

    /// Tick for the spinner
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Spinner frame while background work runs
    pub fn spinner(&self) -> &'static str {
        const FRAMES: [&str; 4] = ["⠋", "⠙", "⠹", "⠸"];
        FRAMES[(self.tick / 4 % 4) as usize]
    }

    /// Whether the worker is busy
    pub const fn busy(&self) -> bool {
        self.syncing || self.reporting
    }

    /// Set status message
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status.clear();
    }

    // ==================== Posts ====================

    /// Posts passing the filter, chronologically
    pub fn visible_posts(&self) -> Vec<&Post> {
        let mut posts = self.filter.apply(self.planner.posts(), self.planner.brands());
        sort_chronologically(&mut posts);
        posts
    }

    /// Visible posts on the focused day
    pub fn day_posts(&self) -> Vec<&Post> {
        posts_on(&self.visible_posts(), self.cursor)
    }

    /// Post the current tab points at
    pub fn selected_post(&self) -> Option<&Post> {
        match self.tab {
            Tab::Calendar => self.day_posts().get(self.day_selection).copied(),
            Tab::List => self.visible_posts().get(self.list_selection).copied(),
            Tab::Brands | Tab::Kpis => None,
        }
    }

    fn clamp_selections(&mut self) {
        let list_len = self.visible_posts().len();
        self.list_selection = self.list_selection.min(list_len.saturating_sub(1));
        let day_len = self.day_posts().len();
        self.day_selection = self.day_selection.min(day_len.saturating_sub(1));
    }

    /// Move the focused day by `days`
    pub fn move_cursor(&mut self, days: i64) {
        self.cursor += Duration::days(days);
        self.day_selection = 0;
    }

    /// Move the focused day one calendar period
    pub fn navigate(&mut self, forward: bool) {
        self.cursor = self.view.navigate(self.cursor, forward);
        self.day_selection = 0;
    }

    /// Focus today
    pub fn go_today(&mut self) {
        self.cursor = Local::now().date_naive();
        self.day_selection = 0;
    }

    /// Cycle Month → Week → Day
    pub fn cycle_view(&mut self) {
        self.view = self.view.next();
    }

    /// Move the selection within the focused day or the list
    pub fn select_next_post(&mut self) {
        match self.tab {
            Tab::Calendar => {
                let len = self.day_posts().len();
                if len > 0 {
                    self.day_selection = (self.day_selection + 1).min(len - 1);
                }
            }
            Tab::List => {
                let len = self.visible_posts().len();
                if len > 0 {
                    self.list_selection = (self.list_selection + 1).min(len - 1);
                }
            }
            Tab::Brands | Tab::Kpis => {}
        }
    }

    /// Move the selection back
    pub fn select_prev_post(&mut self) {
        match self.tab {
            Tab::Calendar => self.day_selection = self.day_selection.saturating_sub(1),
            Tab::List => self.list_selection = self.list_selection.saturating_sub(1),
            Tab::Brands | Tab::Kpis => {}
        }
    }

    /// Advance the selected post's status
    pub fn cycle_selected_status(&mut self) -> Result<()> {
        let Some((id, next)) = self.selected_post().map(|p| (p.id, p.status.next())) else {
            return Ok(());
        };
        self.planner.update_post(id, &PostUpdate::status(next))?;
        self.set_status(format!("{} {}", next.emoji(), next.label()));
        Ok(())
    }

    /// Delete the selected post
    pub fn delete_selected(&mut self) -> Result<()> {
        let Some(id) = self.selected_post().map(|p| p.id) else {
            return Ok(());
        };
        self.planner.delete_post(id)?;
        self.clamp_selections();
        self.set_status("✓ Post deleted");
        Ok(())
    }

    // ==================== Filter ====================

    pub fn cycle_platform_filter(&mut self) {
        self.filter.cycle_platform();
        self.clamp_selections();
        self.set_status(format!("Filter: {}", self.filter.describe()));
    }

    pub fn cycle_status_filter(&mut self) {
        self.filter.cycle_status();
        self.clamp_selections();
        self.set_status(format!("Filter: {}", self.filter.describe()));
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
        self.set_status("Filter cleared");
    }

    /// Apply the search buffer as the filter query
    pub fn apply_search(&mut self) {
        self.filter.query = std::mem::take(&mut self.search_input);
        self.list_selection = 0;
        self.day_selection = 0;
        let count = self.visible_posts().len();
        self.set_status(format!("✓ {count} posts match {}", self.filter.describe()));
    }

    // ==================== Brands ====================

    fn current_brand_index(&self) -> Option<usize> {
        let id = self.planner.current_brand_id()?;
        self.planner.brands().iter().position(|b| b.id == id)
    }

    /// Switch to the next brand and remember it
    pub fn next_brand(&mut self) -> Result<()> {
        let name = self.planner.select_next_brand()?.map(|b| b.name.clone());
        self.after_brand_change()?;
        match name {
            Some(name) => self.set_status(format!("Brand: {name}")),
            None => self.set_status("⚠ No brands yet, add one with `warp-planner brand add`"),
        }
        Ok(())
    }

    /// Make the brand under the brands-tab cursor current
    pub fn select_highlighted_brand(&mut self) -> Result<()> {
        let Some(brand) = self.planner.brands().get(self.brand_selection) else {
            return Ok(());
        };
        let (id, name) = (brand.id, brand.name.clone());
        self.planner.select_brand(id)?;
        self.after_brand_change()?;
        self.set_status(format!("Brand: {name}"));
        Ok(())
    }

    fn after_brand_change(&mut self) -> Result<()> {
        self.config.selected_brand_id = self.planner.current_brand_id();
        self.brand_selection = self.current_brand_index().unwrap_or(0);
        self.list_selection = 0;
        self.day_selection = 0;
        self.last_fetch = None;
        self.reload_kpis()
    }

    pub fn select_next_brand_row(&mut self) {
        let len = self.planner.brands().len();
        if len > 0 {
            self.brand_selection = (self.brand_selection + 1).min(len - 1);
        }
    }

    pub fn select_prev_brand_row(&mut self) {
        self.brand_selection = self.brand_selection.saturating_sub(1);
    }

    // ==================== KPIs ====================

    /// Reload KPI records of the current brand
    pub fn reload_kpis(&mut self) -> Result<()> {
        self.kpis = match self.planner.current_brand_id() {
            Some(id) => self.planner.db().get_kpis(id)?,
            None => Vec::new(),
        };
        Ok(())
    }

    /// Latest vs previous month
    pub fn kpi_summary(&self) -> Option<KpiSummary> {
        KpiSummary::from_records(&self.kpis)
    }

    /// Reload posts and KPIs from the store
    pub fn refresh(&mut self) -> Result<()> {
        self.planner.refresh_posts()?;
        self.reload_kpis()?;
        self.clamp_selections();
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{Brand, NewPost, Platform, PostStatus};
    use chrono::NaiveTime;
    use tempfile::TempDir;

    pub(crate) fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    pub(crate) fn test_state() -> (AppState, TempDir) {
        let dir = TempDir::new().unwrap();
        let db = Database::open_path(&dir.path().join("test.sqlite")).unwrap();
        let mut planner = Planner::open(db, None).unwrap();
        planner.add_brand(Brand::new("Acme")).unwrap();
        for (d, hour, platform) in [
            (10, 18, Platform::Instagram),
            (10, 9, Platform::TikTok),
            (12, 12, Platform::LinkedIn),
        ] {
            let mut post = NewPost::new(day(d), NaiveTime::from_hms_opt(hour, 0, 0).unwrap(), platform, "copy");
            post.objective = format!("{} launch", platform.name());
            planner.add_post(post).unwrap();
        }
        let state = AppState::with_today(Config::default(), planner, day(10)).unwrap();
        (state, dir)
    }

    #[test]
    fn test_tab_cycle() {
        let mut tab = Tab::Calendar;
        for _ in Tab::all() {
            tab = tab.next();
        }
        assert_eq!(tab, Tab::Calendar);
        assert_eq!(Tab::Calendar.prev(), Tab::Kpis);
        assert_eq!(Tab::Kpis.index(), 3);
    }

    #[test]
    fn test_day_posts_are_chronological() {
        let (state, _dir) = test_state();
        let day_posts = state.day_posts();
        assert_eq!(day_posts.len(), 2);
        assert_eq!(day_posts[0].platform, Platform::TikTok);
        assert_eq!(state.selected_post().map(|p| p.platform), Some(Platform::TikTok));
    }

    #[test]
    fn test_filter_narrows_selection() {
        let (mut state, _dir) = test_state();
        state.tab = Tab::List;
        state.list_selection = 2;
        state.cycle_platform_filter();
        assert_eq!(state.filter.platform, Some(Platform::Instagram));
        assert_eq!(state.visible_posts().len(), 1);
        assert_eq!(state.list_selection, 0);

        state.clear_filter();
        assert_eq!(state.visible_posts().len(), 3);
    }

    #[test]
    fn test_search_sets_query() {
        let (mut state, _dir) = test_state();
        state.search_input = "linkedin".into();
        state.apply_search();
        assert!(state.search_input.is_empty());
        assert_eq!(state.visible_posts().len(), 1);
    }

    #[test]
    fn test_cycle_status_and_delete() {
        let (mut state, _dir) = test_state();
        state.cycle_selected_status().unwrap();
        assert_eq!(state.selected_post().unwrap().status, PostStatus::Approved);

        state.select_next_post();
        state.delete_selected().unwrap();
        assert_eq!(state.day_posts().len(), 1);
        assert_eq!(state.day_selection, 0);
        assert_eq!(state.planner.posts().len(), 2);
    }

    #[test]
    fn test_navigation() {
        let (mut state, _dir) = test_state();
        state.move_cursor(2);
        assert_eq!(state.cursor, day(12));
        state.navigate(true);
        assert_eq!(state.cursor, NaiveDate::from_ymd_opt(2026, 4, 12).unwrap());
        state.cycle_view();
        assert_eq!(state.view, CalendarView::Week);
        state.navigate(false);
        assert_eq!(state.cursor, NaiveDate::from_ymd_opt(2026, 4, 5).unwrap());
    }

    #[test]
    fn test_brand_switch_updates_config() {
        let (mut state, _dir) = test_state();
        state.planner.add_brand(Brand::new("Zeta")).unwrap();
        state.brand_selection = 0;
        state.select_highlighted_brand().unwrap();
        assert_eq!(state.planner.current_brand().unwrap().name, "Acme");
        assert_eq!(state.config.selected_brand_id, state.planner.current_brand_id());

        state.next_brand().unwrap();
        assert_eq!(state.planner.current_brand().unwrap().name, "Zeta");
        assert_eq!(state.brand_selection, 1);
        assert!(state.planner.posts().is_empty());
    }
}
