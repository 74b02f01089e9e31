//! Investment summary page: KPI cards, spend bars and a donut chart

use std::f32::consts::TAU;

use chrono::NaiveDate;

use crate::config::ReportSettings;
use crate::models::{Platform, Post};

use super::layout::{Align, Color, Font, MARGIN, PAGE_WIDTH, Page};
use super::{ReportRequest, draw_header, month_span};

const DASH_TOP: f32 = 40.0;
const CARD_GAP: f32 = 10.0;
const CARD_H: f32 = 40.0;

/// Spend of paid posts within a range
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Investment {
    /// Number of paid posts
    pub paid_posts: usize,
    /// Sum of budgets
    pub total: f64,
    /// Spend per platform, highest first
    pub by_platform: Vec<(Platform, f64)>,
}

impl Investment {
    pub fn from_posts(posts: &[&Post]) -> Self {
        let paid: Vec<&&Post> = posts.iter().filter(|p| p.is_paid).collect();
        let total = paid.iter().map(|p| p.budget).sum();

        let mut by_platform: Vec<(Platform, f64)> = Platform::all()
            .iter()
            .filter_map(|platform| {
                let mut on_platform = paid.iter().filter(|p| p.platform == *platform).peekable();
                on_platform.peek()?;
                Some((*platform, on_platform.map(|p| p.budget).sum()))
            })
            .collect();
        by_platform.sort_by(|a, b| b.1.total_cmp(&a.1));

        Self {
            paid_posts: paid.len(),
            total,
            by_platform,
        }
    }

    /// Average budget per paid post
    pub fn average(&self) -> f64 {
        if self.paid_posts == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let count = self.paid_posts as f64;
            self.total / count
        }
    }

    /// Each platform's fraction of the total
    pub fn shares(&self) -> Vec<(Platform, f64)> {
        self.by_platform
            .iter()
            .map(|(p, amount)| (*p, if self.total > 0.0 { amount / self.total } else { 0.0 }))
            .collect()
    }
}

pub(super) fn page(request: &ReportRequest, settings: &ReportSettings, today: NaiveDate) -> Page {
    let mut page = Page::default();
    draw_header(
        &mut page,
        &format!("Investment Summary - {}", month_span(request.start, request.end)),
        today,
    );

    let posts = request.posts_in_range();
    let investment = Investment::from_posts(&posts);
    let currency = &settings.currency;

    let card_w = (PAGE_WIDTH - MARGIN * 2.0 - CARD_GAP * 2.0) / 3.0;
    kpi_card(
        &mut page,
        MARGIN,
        card_w,
        "Total Budget",
        &format!("{currency}{:.2}", investment.total),
        &format!("Across {} paid posts", investment.paid_posts),
    );
    kpi_card(
        &mut page,
        MARGIN + card_w + CARD_GAP,
        card_w,
        "Average Cost",
        &format!("{currency}{:.2}", investment.average()),
        "Per post",
    );
    let (top_name, top_amount) = investment
        .by_platform
        .first()
        .map_or(("-", 0.0), |(p, amount)| (p.name(), *amount));
    kpi_card(
        &mut page,
        MARGIN + (card_w + CARD_GAP) * 2.0,
        card_w,
        "Top Platform",
        top_name,
        &format!("{currency}{top_amount:.2}"),
    );

    let chart_top = DASH_TOP + CARD_H + 30.0;
    page.text("Breakdown by Platform", MARGIN, chart_top - 10.0, 14.0, Font::Regular, Color::INK, Align::Left);
    draw_bars(&mut page, &investment, currency, chart_top);
    draw_donut(&mut page, &investment, currency, chart_top);
    page
}

fn kpi_card(page: &mut Page, x: f32, w: f32, title: &str, value: &str, sub: &str) {
    page.fill_rect(x + 1.5, DASH_TOP + 1.5, w, CARD_H, 5.0, Color(243, 244, 246));
    page.card(x, DASH_TOP, w, CARD_H, 5.0, Color::WHITE, Color(229, 231, 235), 0.2);
    page.text(title, x + 6.0, DASH_TOP + 12.0, 10.0, Font::Regular, Color::MUTED, Align::Left);
    page.text(value, x + 6.0, DASH_TOP + 26.0, 18.0, Font::Bold, Color::INK, Align::Left);
    page.text(sub, x + 6.0, DASH_TOP + 35.0, 8.0, Font::Regular, Color::FAINT, Align::Left);
}

/// Horizontal bars scaled to the highest spend
fn draw_bars(page: &mut Page, investment: &Investment, currency: &str, top: f32) {
    let max_bar_w = (PAGE_WIDTH - MARGIN * 2.0) * 0.6 - 50.0;
    let max = investment.by_platform.first().map_or(0.0, |(_, amount)| *amount);

    let mut y = top;
    for (platform, amount) in &investment.by_platform {
        let accent: Color = platform.palette().accent.into();
        #[allow(clippy::cast_possible_truncation)]
        let bar_w = if max > 0.0 { (amount / max) as f32 * max_bar_w } else { 0.0 };

        page.circle(MARGIN + 2.5, y + 5.0, 2.5, accent);
        page.text(platform.name(), MARGIN + 8.0, y + 6.5, 9.0, Font::Regular, Color(55, 65, 81), Align::Left);
        if bar_w > 0.0 {
            page.fill_rect(MARGIN + 40.0, y + 4.0, bar_w, 3.0, 1.5, accent);
        }
        page.text(
            format!("{currency}{amount:.2}"),
            MARGIN + 40.0 + bar_w + 5.0,
            y + 6.5,
            8.0,
            Font::Regular,
            Color::MUTED,
            Align::Left,
        );
        y += 14.0;
    }
}

/// Donut of each platform's share, with the rounded total in the hole
fn draw_donut(page: &mut Page, investment: &Investment, currency: &str, top: f32) {
    let split_x = MARGIN + (PAGE_WIDTH - MARGIN * 2.0) * 0.65;
    let (cx, cy, r) = (split_x + 40.0, top + 25.0, 20.0);

    if investment.total > 0.0 {
        let mut angle = 0.0;
        for (platform, share) in investment.shares() {
            #[allow(clippy::cast_possible_truncation)]
            let sweep = share as f32 * TAU;
            if sweep > 0.0 {
                page.sector(cx, cy, r, angle, angle + sweep, platform.palette().accent.into());
            }
            angle += sweep;
        }
    } else {
        page.circle(cx, cy, r, Color(229, 231, 235));
    }

    page.circle(cx, cy, r * 0.6, Color::WHITE);
    page.text("Total", cx, cy - 2.0, 10.0, Font::Regular, Color(100, 100, 100), Align::Center);
    page.text(
        format!("{currency}{}", investment.total.round()),
        cx,
        cy + 4.0,
        12.0,
        Font::Bold,
        Color::INK,
        Align::Center,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewPost;
    use crate::report::layout::Shape;
    use chrono::NaiveTime;
    use uuid::Uuid;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn paid(date: NaiveDate, platform: Platform, budget: f64) -> Post {
        let mut new = NewPost::new(date, NaiveTime::from_hms_opt(9, 0, 0).unwrap(), platform, "copy");
        new.is_paid = budget > 0.0;
        new.budget = budget;
        new.into_post(Uuid::nil())
    }

    fn request() -> ReportRequest {
        let posts = vec![
            paid(day(1), Platform::Instagram, 100.0),
            paid(day(2), Platform::TikTok, 250.0),
            paid(day(3), Platform::Instagram, 50.0),
            paid(day(4), Platform::Facebook, 0.0),
            paid(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(), Platform::LinkedIn, 999.0),
        ];
        ReportRequest::new("Acme", day(1), day(31), posts)
    }

    #[test]
    fn test_investment_totals() {
        let request = request();
        let investment = Investment::from_posts(&request.posts_in_range());
        assert_eq!(investment.paid_posts, 3);
        assert_eq!(investment.total, 400.0);
        assert!((investment.average() - 133.333).abs() < 1e-3);
        assert_eq!(
            investment.by_platform,
            vec![(Platform::TikTok, 250.0), (Platform::Instagram, 150.0)]
        );
        let shares: f64 = investment.shares().iter().map(|(_, s)| s).sum();
        assert!((shares - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_investment() {
        let investment = Investment::from_posts(&[]);
        assert_eq!(investment.average(), 0.0);
        assert!(investment.shares().is_empty());
    }

    #[test]
    fn test_page_contents() {
        let page = page(&request(), &ReportSettings::default(), day(15));
        let texts: Vec<&str> = page.texts().collect();
        assert!(texts.contains(&"Investment Summary - March 2026"));
        assert!(texts.contains(&"$400.00"));
        assert!(texts.contains(&"Across 3 paid posts"));
        assert!(texts.contains(&"$133.33"));
        assert!(texts.contains(&"TikTok"));
        assert!(texts.contains(&"$250.00"));
        assert!(texts.contains(&"$400"));

        // TikTok bar is full width, Instagram's is scaled by 150 / 250
        let bar_widths: Vec<f32> = page
            .shapes
            .iter()
            .filter_map(|s| match s {
                Shape::Polygon { points, fill: Some(_), stroke: None } if points.len() > 4 => {
                    let xs = points.iter().map(|p| p.0);
                    let (min, max) = xs.fold((f32::MAX, f32::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
                    let ys = points.iter().map(|p| p.1);
                    let (ylo, yhi) = ys.fold((f32::MAX, f32::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));
                    ((yhi - ylo - 3.0).abs() < 1e-3).then_some(max - min)
                }
                _ => None,
            })
            .collect();
        assert_eq!(bar_widths.len(), 2);
        assert!((bar_widths[1] / bar_widths[0] - 0.6).abs() < 1e-3);
    }
}
