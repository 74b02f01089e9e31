//! Calendar views, navigation and post filtering

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::models::{Brand, Platform, Post, PostStatus};

/// Calendar granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarView {
    /// Six-week month grid
    #[default]
    Month,
    /// Sunday to Saturday
    Week,
    /// A single day
    Day,
}

impl CalendarView {
    /// Next view in the cycle Month → Week → Day → Month
    pub const fn next(self) -> Self {
        match self {
            Self::Month => Self::Week,
            Self::Week => Self::Day,
            Self::Day => Self::Month,
        }
    }

    /// Display name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Month => "Month",
            Self::Week => "Week",
            Self::Day => "Day",
        }
    }

    /// Days shown for a cursor date
    pub fn visible_days(self, cursor: NaiveDate) -> Vec<NaiveDate> {
        match self {
            Self::Day => vec![cursor],
            Self::Week => {
                let start = week_start(cursor);
                (0..7).map(|i| start + Duration::days(i)).collect()
            }
            Self::Month => {
                let (first, last) = month_bounds(cursor);
                let start = week_start(first);
                let end = week_start(last) + Duration::days(6);
                days_between(start, end)
            }
        }
    }

    /// Move the cursor one period back or forward
    pub fn navigate(self, cursor: NaiveDate, forward: bool) -> NaiveDate {
        match self {
            Self::Day => cursor + Duration::days(if forward { 1 } else { -1 }),
            Self::Week => cursor + Duration::days(if forward { 7 } else { -7 }),
            Self::Month => {
                let shifted = if forward {
                    cursor.checked_add_months(Months::new(1))
                } else {
                    cursor.checked_sub_months(Months::new(1))
                };
                shifted.unwrap_or(cursor)
            }
        }
    }

    /// Heading for the period containing `cursor`
    pub fn title(self, cursor: NaiveDate) -> String {
        match self {
            Self::Month => cursor.format("%B %Y").to_string(),
            Self::Week => {
                let start = week_start(cursor);
                let end = start + Duration::days(6);
                format!("{} - {}", start.format("%b %-d"), end.format("%b %-d, %Y"))
            }
            Self::Day => cursor.format("%A, %B %-d, %Y").to_string(),
        }
    }
}

/// Sunday on or before `day`
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_sunday()))
}

/// First and last day of the month containing `day`
pub fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = day.with_day(1).unwrap_or(day);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first);
    (first, last)
}

/// Every day from `start` to `end` inclusive
pub fn days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Criteria narrowing the visible posts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Only this platform
    pub platform: Option<Platform>,
    /// Only this status
    pub status: Option<PostStatus>,
    /// Only posts of the brand with this name
    pub brand: Option<String>,
    /// Case-insensitive text in copy or objective
    pub query: String,
}

impl PostFilter {
    /// Whether any criterion is set
    pub fn is_active(&self) -> bool {
        self.platform.is_some()
            || self.status.is_some()
            || self.brand.is_some()
            || !self.query.trim().is_empty()
    }

    /// Reset every criterion
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Cycle the platform criterion through None → each platform → None
    pub fn cycle_platform(&mut self) {
        self.platform = cycle(self.platform, Platform::all());
    }

    /// Cycle the status criterion through None → each status → None
    pub fn cycle_status(&mut self) {
        self.status = cycle(self.status, PostStatus::all());
    }

    /// Whether `post` passes; `brands` resolves the brand criterion
    pub fn matches(&self, post: &Post, brands: &[Brand]) -> bool {
        if self.platform.is_some_and(|p| p != post.platform) {
            return false;
        }
        if self.status.is_some_and(|s| s != post.status) {
            return false;
        }
        if let Some(name) = &self.brand {
            let owner = brands.iter().find(|b| b.id == post.brand_id);
            if !owner.is_some_and(|b| b.name.eq_ignore_ascii_case(name)) {
                return false;
            }
        }
        let query = self.query.trim().to_lowercase();
        query.is_empty()
            || post.copy.to_lowercase().contains(&query)
            || post.objective.to_lowercase().contains(&query)
    }

    /// Posts passing the filter, in their original order
    pub fn apply<'a>(&self, posts: &'a [Post], brands: &[Brand]) -> Vec<&'a Post> {
        posts.iter().filter(|p| self.matches(p, brands)).collect()
    }

    /// Short description for status lines
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(platform) = self.platform {
            parts.push(platform.name().to_string());
        }
        if let Some(status) = self.status {
            parts.push(status.label().to_string());
        }
        if let Some(brand) = &self.brand {
            parts.push(brand.clone());
        }
        if !self.query.trim().is_empty() {
            parts.push(format!("\"{}\"", self.query.trim()));
        }
        if parts.is_empty() {
            "All".to_string()
        } else {
            parts.join(" · ")
        }
    }
}

fn cycle<T: Copy + PartialEq>(current: Option<T>, all: &[T]) -> Option<T> {
    match current {
        None => all.first().copied(),
        Some(value) => all
            .iter()
            .position(|v| *v == value)
            .and_then(|i| all.get(i + 1))
            .copied(),
    }
}

/// Posts on `day`, chronologically
pub fn posts_on<'a>(posts: &[&'a Post], day: NaiveDate) -> Vec<&'a Post> {
    let mut on_day: Vec<&Post> = posts.iter().copied().filter(|p| p.date == day).collect();
    on_day.sort_by_key(|p| p.time);
    on_day
}

/// Sort posts by date then time
pub fn sort_chronologically(posts: &mut [&Post]) {
    posts.sort_by_key(|p| (p.date, p.time));
}

/// Previous and next post around `id` in chronological order
pub fn neighbours<'a>(posts: &[&'a Post], id: uuid::Uuid) -> (Option<&'a Post>, Option<&'a Post>) {
    let mut sorted = posts.to_vec();
    sort_chronologically(&mut sorted);
    let Some(idx) = sorted.iter().position(|p| p.id == id) else {
        return (None, None);
    };
    let prev = idx.checked_sub(1).and_then(|i| sorted.get(i)).copied();
    let next = sorted.get(idx + 1).copied();
    (prev, next)
}

/// Default export/report range: the month containing `today`
pub fn month_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    month_bounds(today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewPost;
    use chrono::{NaiveTime, Weekday};
    use uuid::Uuid;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn post(date: NaiveDate, hour: u32, platform: Platform, copy: &str) -> Post {
        NewPost::new(date, NaiveTime::from_hms_opt(hour, 0, 0).unwrap(), platform, copy)
            .into_post(Uuid::nil())
    }

    #[test]
    fn test_month_grid_bounds() {
        // March 2026 starts on a Sunday and ends on a Tuesday
        let days = CalendarView::Month.visible_days(day(2026, 3, 18));
        assert_eq!(days.first(), Some(&day(2026, 3, 1)));
        assert_eq!(days.last(), Some(&day(2026, 4, 4)));
        assert_eq!(days.len(), 35);
        assert!(days.iter().step_by(7).all(|d| d.weekday() == Weekday::Sun));

        // February 2026 starts on a Sunday and ends on a Saturday
        let days = CalendarView::Month.visible_days(day(2026, 2, 10));
        assert_eq!(days.len(), 28);
    }

    #[test]
    fn test_week_and_day_views() {
        let week = CalendarView::Week.visible_days(day(2026, 3, 18));
        assert_eq!(week.first(), Some(&day(2026, 3, 15)));
        assert_eq!(week.last(), Some(&day(2026, 3, 21)));
        assert_eq!(CalendarView::Day.visible_days(day(2026, 3, 18)), vec![day(2026, 3, 18)]);
    }

    #[test]
    fn test_navigation() {
        assert_eq!(CalendarView::Day.navigate(day(2026, 3, 1), false), day(2026, 2, 28));
        assert_eq!(CalendarView::Week.navigate(day(2026, 3, 1), true), day(2026, 3, 8));
        assert_eq!(CalendarView::Month.navigate(day(2026, 1, 31), true), day(2026, 2, 28));
        assert_eq!(CalendarView::Month.navigate(day(2026, 3, 31), false), day(2026, 2, 28));
        assert_eq!(CalendarView::Month.navigate(day(2026, 12, 15), true), day(2027, 1, 15));
    }

    #[test]
    fn test_month_range() {
        assert_eq!(month_range(day(2028, 2, 10)), (day(2028, 2, 1), day(2028, 2, 29)));
        assert_eq!(month_range(day(2026, 12, 31)), (day(2026, 12, 1), day(2026, 12, 31)));
    }

    #[test]
    fn test_filter_matches() {
        let brand = Brand::new("Acme");
        let mut p = post(day(2026, 3, 1), 9, Platform::TikTok, "Dance challenge");
        p.brand_id = brand.id;
        p.objective = "Awareness".to_string();
        let brands = vec![brand];

        let mut filter = PostFilter::default();
        assert!(!filter.is_active());
        assert!(filter.matches(&p, &brands));

        filter.query = "AWARE".to_string();
        assert!(filter.matches(&p, &brands));
        filter.query = "dance".to_string();
        assert!(filter.matches(&p, &brands));

        filter.platform = Some(Platform::Instagram);
        assert!(!filter.matches(&p, &brands));
        filter.platform = Some(Platform::TikTok);
        filter.brand = Some("acme".to_string());
        assert!(filter.matches(&p, &brands));
        filter.status = Some(PostStatus::Published);
        assert!(!filter.matches(&p, &brands));
        assert!(filter.is_active());

        filter.clear();
        assert_eq!(filter, PostFilter::default());
    }

    #[test]
    fn test_cycle_platform_wraps_to_none() {
        let mut filter = PostFilter::default();
        for _ in Platform::all() {
            filter.cycle_platform();
            assert!(filter.platform.is_some());
        }
        filter.cycle_platform();
        assert!(filter.platform.is_none());
    }

    #[test]
    fn test_posts_on_and_neighbours() {
        let a = post(day(2026, 3, 2), 18, Platform::Facebook, "a");
        let b = post(day(2026, 3, 2), 9, Platform::Facebook, "b");
        let c = post(day(2026, 3, 1), 12, Platform::Facebook, "c");
        let all = vec![&a, &b, &c];

        let on_day = posts_on(&all, day(2026, 3, 2));
        assert_eq!(on_day.iter().map(|p| p.copy.as_str()).collect::<Vec<_>>(), vec!["b", "a"]);

        let (prev, next) = neighbours(&all, b.id);
        assert_eq!(prev.map(|p| p.copy.as_str()), Some("c"));
        assert_eq!(next.map(|p| p.copy.as_str()), Some("a"));
        let (prev, next) = neighbours(&all, a.id);
        assert_eq!(prev.map(|p| p.copy.as_str()), Some("b"));
        assert!(next.is_none());
    }
}
