//! Content detail pages: two columns of post cards

use chrono::NaiveDate;

use crate::config::ReportSettings;
use crate::models::{Platform, Post};

use super::layout::{
    Align, Color, Font, MARGIN, PAGE_HEIGHT, PAGE_WIDTH, Page, contain_fit, text_width, wrap_text,
};
use super::{ReportRequest, draw_header};

const TOP: f32 = 35.0;
const COLUMNS: usize = 2;
const ROW_HEIGHT: f32 = 70.0;
const IMAGE_BOX: f32 = 40.0;
const ICON: f32 = 8.0 / 2.834_65;

/// Native width / height of the platform's feed creative
const fn media_aspect(platform: Platform) -> f32 {
    match platform {
        Platform::Instagram => 0.8,
        Platform::TikTok => 9.0 / 16.0,
        Platform::Twitter => 16.0 / 9.0,
        Platform::WhatsApp => 1.0,
        Platform::Facebook | Platform::LinkedIn | Platform::GoogleAds => 1.91,
    }
}

#[allow(clippy::cast_precision_loss)]
pub(super) fn pages(request: &ReportRequest, settings: &ReportSettings, today: NaiveDate) -> Vec<Page> {
    let heading = format!("{} - Content Details", request.title);
    let col_w = (PAGE_WIDTH - MARGIN * 2.0 - MARGIN * (COLUMNS as f32 - 1.0)) / COLUMNS as f32;

    let mut page = Page::default();
    draw_header(&mut page, &heading, today);
    let mut pages = Vec::new();
    let mut y = TOP;
    let mut col = 0;

    for post in request.posts_in_range() {
        if y + ROW_HEIGHT > PAGE_HEIGHT - MARGIN {
            pages.push(std::mem::take(&mut page));
            draw_header(&mut page, &format!("{heading} (Cont.)"), today);
            y = TOP;
            col = 0;
        }

        let x = MARGIN + col as f32 * (col_w + MARGIN);
        draw_card(&mut page, post, x, y, col_w, &settings.currency);

        col += 1;
        if col >= COLUMNS {
            col = 0;
            y += ROW_HEIGHT + MARGIN;
        }
    }

    pages.push(page);
    pages
}

fn draw_card(page: &mut Page, post: &Post, x: f32, y: f32, w: f32, currency: &str) {
    let palette = post.platform.palette();
    let accent: Color = palette.accent.into();

    page.fill_rect(x + 1.5, y + 1.5, w, ROW_HEIGHT, 3.0, Color::SHADOW);
    page.card(x, y, w, ROW_HEIGHT, 3.0, palette.bg.into(), Color::BORDER, 0.2);
    page.fill_rect(x, y, 1.5, ROW_HEIGHT, 0.0, accent);

    // platform and date badge
    let icon_x = x + 6.0;
    let icon_y = y + 8.0;
    let header = format!("{}  |  {}", post.platform.name(), post.date.format("%Y-%m-%d"));
    let badge_w = 2.0 + ICON + 2.0 + text_width(&header, 9.0, Font::Bold) + 2.0;
    let badge_h = ICON + 3.0;
    page.fill_rect(icon_x, icon_y - 4.0, badge_w, badge_h, badge_h / 2.0, Color::WHITE);
    page.circle(icon_x + 2.0 + ICON / 2.0, icon_y - 2.5 + ICON / 2.0, ICON / 2.0, accent);
    page.text(
        header,
        icon_x + 2.0 + ICON + 2.0,
        icon_y + 0.5,
        9.0,
        Font::Bold,
        palette.text.into(),
        Align::Left,
    );

    // creative placeholder
    let image_x = x + 6.0;
    let image_y = icon_y + 6.0;
    page.fill_rect(image_x, image_y, IMAGE_BOX, IMAGE_BOX, 0.0, Color(243, 244, 246));
    if post.image_url().is_some() {
        let (dx, dy, fw, fh) = contain_fit(IMAGE_BOX, media_aspect(post.platform));
        page.card(image_x + dx, image_y + dy, fw, fh, 1.0, Color(229, 231, 235), accent, 0.3);
        page.text(
            "Image",
            image_x + IMAGE_BOX / 2.0,
            image_y + IMAGE_BOX / 2.0,
            6.0,
            Font::Bold,
            Color::MUTED,
            Align::Center,
        );
    } else {
        page.text(
            "No Img",
            image_x + IMAGE_BOX / 2.0,
            image_y + IMAGE_BOX / 2.0,
            6.0,
            Font::Regular,
            Color::FAINT,
            Align::Center,
        );
    }

    // objective and strategy
    let text_x = image_x + IMAGE_BOX + 5.0;
    let max_text_w = w - IMAGE_BOX - 20.0;
    page.text("Objective", text_x, image_y + 3.0, 9.0, Font::Bold, Color(55, 65, 81), Align::Left);

    let lines = wrap_text(post.clean_objective(), max_text_w, 8.0, Font::Regular);
    let mut line_y = image_y + 8.0;
    for line in lines.into_iter().take(2) {
        page.text(line, text_x, line_y, 8.0, Font::Regular, Color(75, 85, 99), Align::Left);
        line_y += 4.2;
    }

    let strategy = [
        ("Campaign:".to_string(), post.campaign_name.as_deref()),
        (
            format!("{}:", post.platform.metadata().ad_group_label),
            post.ad_group_name.as_deref(),
        ),
    ];
    for (label, value) in strategy {
        let Some(value) = value else { continue };
        let label_w = text_width(&label, 7.0, Font::Bold) + 2.0;
        let first_line = wrap_text(value, max_text_w - label_w, 7.0, Font::Regular)
            .into_iter()
            .next()
            .unwrap_or_default();
        page.text(label, text_x, line_y, 7.0, Font::Bold, Color::MUTED, Align::Left);
        page.text(first_line, text_x + label_w, line_y, 7.0, Font::Regular, Color::MUTED, Align::Left);
        line_y += 3.0;
    }

    let mut footer = post.status.label().to_string();
    if post.is_paid {
        footer.push_str(&format!(" - {}", post.budget_label(currency)));
    }
    page.text(footer, x + 6.0, y + ROW_HEIGHT - 6.0, 7.0, Font::Regular, Color::MUTED, Align::Left);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewPost, PostStatus};
    use chrono::NaiveTime;
    use uuid::Uuid;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn post(d: u32, platform: Platform) -> Post {
        NewPost::new(day(d), NaiveTime::from_hms_opt(10, 0, 0).unwrap(), platform, "copy").into_post(Uuid::nil())
    }

    #[test]
    fn test_paging_four_cards_per_page() {
        let posts = (1..=9).map(|d| post(d, Platform::Facebook)).collect();
        let request = ReportRequest::new("Acme", day(1), day(31), posts);
        let pages = pages(&request, &ReportSettings::default(), day(1));

        assert_eq!(pages.len(), 3);
        assert!(pages[0].texts().any(|t| t == "Acme - Content Details"));
        assert!(pages[1].texts().any(|t| t == "Acme - Content Details (Cont.)"));
        assert!(pages[2].texts().any(|t| t == "Facebook  |  2026-03-09"));
        assert_eq!(pages[0].texts().filter(|t| *t == "No Img").count(), 4);
    }

    #[test]
    fn test_empty_range_still_has_a_page() {
        let request = ReportRequest::new("Acme", day(1), day(31), vec![]);
        let pages = pages(&request, &ReportSettings::default(), day(1));
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_card_details() {
        let mut p = post(2, Platform::GoogleAds);
        p.objective = "[Li L] Drive qualified traffic to the spring landing page before the launch event".into();
        p.campaign_name = Some("Spring".into());
        p.ad_group_name = Some("Retargeting".into());
        p.image = Some("https://example.com/creative.png".into());
        p.is_paid = true;
        p.budget = 120.0;
        p.status = PostStatus::Scheduled;

        let request = ReportRequest::new("Acme", day(1), day(31), vec![p]);
        let page = &pages(&request, &ReportSettings::default(), day(1))[0];
        let texts: Vec<&str> = page.texts().collect();

        assert!(texts.contains(&"Image"));
        assert!(!texts.contains(&"No Img"));
        assert!(texts.iter().any(|t| t.starts_with("Drive qualified")));
        assert!(!texts.iter().any(|t| t.contains("[Li L]")));
        assert!(texts.contains(&"Campaign:"));
        assert!(texts.contains(&"Ad Group Name:"));
        assert!(texts.contains(&"Retargeting"));
        assert!(texts.contains(&"Scheduled - Paid $120.00"));
    }

    #[test]
    fn test_media_aspect_fits_box() {
        for platform in Platform::all() {
            let (x, y, w, h) = contain_fit(IMAGE_BOX, media_aspect(*platform));
            assert!(x >= 0.0 && y >= 0.0);
            assert!(w <= IMAGE_BOX && h <= IMAGE_BOX);
            assert!((w - IMAGE_BOX).abs() < 1e-4 || (h - IMAGE_BOX).abs() < 1e-4);
        }
    }
}
