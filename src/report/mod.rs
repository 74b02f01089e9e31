//! PDF content plan reports
//!
//! A report is laid out as a list of [`layout::Page`]s (calendar pages, the
//! investment summary, content detail cards) and then rendered to PDF by
//! [`pdf::render`]. Layout never touches the PDF backend, so it is tested on
//! its own.

mod calendar_page;
mod cards;
mod investment;
pub mod layout;
mod pdf;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::config::ReportSettings;
use crate::models::Post;

use layout::{Align, Color, Font, MARGIN, PAGE_HEIGHT, PAGE_WIDTH, Page};

/// What to put in a report
#[derive(Debug, Clone)]
pub struct ReportRequest {
    /// Report title (usually the brand name)
    pub title: String,
    /// First day covered
    pub start: NaiveDate,
    /// Last day covered
    pub end: NaiveDate,
    /// Posts to draw; calendar pages show all of them, the summary and cards
    /// only those within `start..=end`
    pub posts: Vec<Post>,
}

impl ReportRequest {
    /// Create a request; the range is swapped if given backwards
    pub fn new(title: impl Into<String>, start: NaiveDate, end: NaiveDate, posts: Vec<Post>) -> Self {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        Self {
            title: title.into(),
            start,
            end,
            posts,
        }
    }

    /// Output file name
    pub fn file_name(&self) -> String {
        format!(
            "SocialPlan_{}_{}.pdf",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }

    /// Posts within the range, by date then time
    pub fn posts_in_range(&self) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self
            .posts
            .iter()
            .filter(|p| p.date >= self.start && p.date <= self.end)
            .collect();
        posts.sort_by_key(|p| (p.date, p.time));
        posts
    }
}

/// A laid-out report
#[derive(Debug, Clone)]
pub struct Report {
    /// Pages in order, footers included
    pub pages: Vec<Page>,
}

/// Lay out every page of a report as of `today`
pub fn build(request: &ReportRequest, settings: &ReportSettings, today: NaiveDate) -> Report {
    let mut pages = calendar_page::pages(request, settings, today);
    pages.push(investment::page(request, settings, today));
    pages.extend(cards::pages(request, settings, today));

    let total = pages.len();
    for (i, page) in pages.iter_mut().enumerate() {
        page.text(
            format!("{} | Page {} of {total}", settings.agency, i + 1),
            PAGE_WIDTH - MARGIN,
            PAGE_HEIGHT - 5.0,
            8.0,
            Font::Regular,
            Color::FAINT,
            Align::Right,
        );
    }

    Report { pages }
}

/// Build, render and write a report into `out_dir`
pub fn generate(request: &ReportRequest, settings: &ReportSettings, out_dir: &Path) -> Result<PathBuf> {
    let today = chrono::Local::now().date_naive();
    let report = build(request, settings, today);
    let bytes = pdf::render(&request.title, &report)?;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let path = out_dir.join(request.file_name());
    std::fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("Report written: {} ({} pages)", path.display(), report.pages.len());
    Ok(path)
}

/// Pill header with the generated date and a rule underneath
pub(crate) fn draw_header(page: &mut Page, title: &str, today: NaiveDate) {
    let pill_w = layout::text_width(title, 22.0, Font::Bold) + 30.0;
    page.fill_rect(MARGIN - 2.0, 8.0, pill_w, 14.0, 7.0, Color::BORDER);
    page.text(title, MARGIN + 4.0, 18.0, 22.0, Font::Bold, Color(40, 40, 40), Align::Left);

    page.text(
        format!("Generated: {}", today.format("%Y-%m-%d")),
        PAGE_WIDTH - MARGIN,
        6.0,
        9.0,
        Font::Regular,
        Color(150, 150, 150),
        Align::Right,
    );
    page.line((MARGIN, 29.0), (PAGE_WIDTH - MARGIN, 29.0), Color(200, 200, 200), 0.2);
}

/// `March 2026`, or `March 2026 - April 2026` across months
pub(crate) fn month_span(start: NaiveDate, end: NaiveDate) -> String {
    let first = start.format("%B %Y").to_string();
    let last = end.format("%B %Y").to_string();
    if first == last { first } else { format!("{first} - {last}") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewPost, Platform};
    use chrono::NaiveTime;
    use uuid::Uuid;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn post(date: NaiveDate, hour: u32) -> Post {
        NewPost::new(date, NaiveTime::from_hms_opt(hour, 0, 0).unwrap(), Platform::Instagram, "copy")
            .into_post(Uuid::nil())
    }

    #[test]
    fn test_file_name_and_swap() {
        let request = ReportRequest::new("Acme", day(2026, 3, 31), day(2026, 3, 1), vec![]);
        assert_eq!(request.start, day(2026, 3, 1));
        assert_eq!(request.file_name(), "SocialPlan_2026-03-01_2026-03-31.pdf");
    }

    #[test]
    fn test_posts_in_range_sorted() {
        let posts = vec![
            post(day(2026, 3, 5), 18),
            post(day(2026, 4, 2), 9),
            post(day(2026, 3, 5), 9),
            post(day(2026, 3, 1), 12),
        ];
        let request = ReportRequest::new("Acme", day(2026, 3, 1), day(2026, 3, 31), posts);
        let in_range: Vec<_> = request.posts_in_range().iter().map(|p| (p.date, p.time)).collect();
        assert_eq!(in_range.len(), 3);
        assert!(in_range.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_month_span() {
        assert_eq!(month_span(day(2026, 1, 1), day(2026, 1, 31)), "January 2026");
        assert_eq!(month_span(day(2026, 1, 1), day(2026, 2, 3)), "January 2026 - February 2026");
    }

    #[test]
    fn test_build_footers_count_pages() {
        let posts = (1..=5).map(|d| post(day(2026, 3, d), 10)).collect();
        let request = ReportRequest::new("Acme", day(2026, 3, 1), day(2026, 4, 30), posts);
        let settings = ReportSettings::default();
        let report = build(&request, &settings, day(2026, 3, 10));

        // two calendar pages, the summary, two pages of cards
        assert_eq!(report.pages.len(), 5);
        for (i, page) in report.pages.iter().enumerate() {
            let footer = format!("Warp CR - Digital Agency | Page {} of 5", i + 1);
            assert!(page.texts().any(|t| t == footer));
        }
    }

    #[test]
    fn test_generate_writes_pdf() {
        let dir = tempfile::TempDir::new().unwrap();
        let request = ReportRequest::new("Acme", day(2026, 3, 1), day(2026, 3, 31), vec![post(day(2026, 3, 2), 9)]);
        let path = generate(&request, &ReportSettings::default(), dir.path()).unwrap();
        assert!(path.ends_with("SocialPlan_2026-03-01_2026-03-31.pdf"));
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
