//! Backend-independent page layout: shapes in millimetres, origin top-left

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use textwrap::core::Fragment;
use textwrap::wrap_algorithms::wrap_first_fit;

/// Landscape A4 width
pub const PAGE_WIDTH: f32 = 297.0;
/// Landscape A4 height
pub const PAGE_HEIGHT: f32 = 210.0;
/// Outer margin
pub const MARGIN: f32 = 10.0;

const PT_TO_MM: f32 = 0.352_778;

/// RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// White
    pub const WHITE: Self = Self(255, 255, 255);
    /// Body text
    pub const INK: Self = Self(30, 41, 59);
    /// Secondary text
    pub const MUTED: Self = Self(107, 114, 128);
    /// Faint text and footers
    pub const FAINT: Self = Self(156, 163, 175);
    /// Card borders
    pub const BORDER: Self = Self(209, 213, 219);
    /// Drop shadows
    pub const SHADOW: Self = Self(240, 240, 240);
    /// Highlight blue
    pub const BLUE: Self = Self(37, 99, 235);
}

impl From<crate::models::Rgb> for Color {
    fn from(rgb: crate::models::Rgb) -> Self {
        Self(rgb.0, rgb.1, rgb.2)
    }
}

/// Built-in font weight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    /// Helvetica
    Regular,
    /// Helvetica Bold
    Bold,
}

/// Horizontal anchor of a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// `x` is the left edge
    Left,
    /// `x` is the centre
    Center,
    /// `x` is the right edge
    Right,
}

/// A drawing instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Filled and/or stroked closed polygon
    Polygon {
        /// Vertices
        points: Vec<(f32, f32)>,
        /// Fill colour
        fill: Option<Color>,
        /// Outline colour and thickness (mm)
        stroke: Option<(Color, f32)>,
    },
    /// Straight line
    Line {
        /// Start
        from: (f32, f32),
        /// End
        to: (f32, f32),
        /// Colour
        color: Color,
        /// Thickness (mm)
        width: f32,
    },
    /// Text run; `y` is the baseline
    Text {
        /// Content
        text: String,
        /// Anchor x
        x: f32,
        /// Baseline y
        y: f32,
        /// Size in points
        size: f32,
        /// Weight
        font: Font,
        /// Colour
        color: Color,
        /// Anchor
        align: Align,
    },
}

/// One page of shapes, drawn in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Display list
    pub shapes: Vec<Shape>,
}

impl Page {
    /// Filled rounded rectangle
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, r: f32, fill: Color) {
        self.shapes.push(Shape::Polygon {
            points: rounded_rect(x, y, w, h, r),
            fill: Some(fill),
            stroke: None,
        });
    }

    /// Filled and outlined rounded rectangle
    #[allow(clippy::too_many_arguments)]
    pub fn card(&mut self, x: f32, y: f32, w: f32, h: f32, r: f32, fill: Color, border: Color, thickness: f32) {
        self.shapes.push(Shape::Polygon {
            points: rounded_rect(x, y, w, h, r),
            fill: Some(fill),
            stroke: Some((border, thickness)),
        });
    }

    /// Filled circle
    pub fn circle(&mut self, cx: f32, cy: f32, r: f32, fill: Color) {
        self.shapes.push(Shape::Polygon {
            points: sector(cx, cy, r, 0.0, TAU),
            fill: Some(fill),
            stroke: None,
        });
    }

    /// Filled pie slice between two angles (radians, clockwise from 3 o'clock)
    pub fn sector(&mut self, cx: f32, cy: f32, r: f32, start: f32, end: f32, fill: Color) {
        let mut points = vec![(cx, cy)];
        points.extend(sector(cx, cy, r, start, end));
        self.shapes.push(Shape::Polygon {
            points,
            fill: Some(fill),
            stroke: None,
        });
    }

    /// Horizontal or vertical rule
    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, width: f32) {
        self.shapes.push(Shape::Line { from, to, color, width });
    }

    /// Text run
    #[allow(clippy::too_many_arguments)]
    pub fn text(&mut self, text: impl Into<String>, x: f32, y: f32, size: f32, font: Font, color: Color, align: Align) {
        self.shapes.push(Shape::Text {
            text: text.into(),
            x,
            y,
            size,
            font,
            color,
            align,
        });
    }

    /// All text runs on the page, in drawing order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Outline of a rounded rectangle; the radius is clamped to half the short side
pub fn rounded_rect(x: f32, y: f32, w: f32, h: f32, r: f32) -> Vec<(f32, f32)> {
    let r = r.clamp(0.0, w.min(h) / 2.0);
    if r <= f32::EPSILON {
        return vec![(x, y), (x + w, y), (x + w, y + h), (x, y + h)];
    }
    let corners = [
        (x + w - r, y + r, -FRAC_PI_2),
        (x + w - r, y + h - r, 0.0),
        (x + r, y + h - r, FRAC_PI_2),
        (x + r, y + r, PI),
    ];
    corners
        .iter()
        .flat_map(|&(cx, cy, start)| sector(cx, cy, r, start, start + FRAC_PI_2))
        .collect()
}

/// Points along an arc, at most 0.05 rad apart, both ends included
pub fn sector(cx: f32, cy: f32, r: f32, start: f32, end: f32) -> Vec<(f32, f32)> {
    let sweep = (end - start).max(0.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let steps = ((sweep / 0.05).ceil() as usize).max(1);
    (0..=steps)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let a = start + sweep * i as f32 / steps as f32;
            (cx + r * a.cos(), cy + r * a.sin())
        })
        .collect()
}

/// Largest box with the given aspect ratio (w / h) centred inside a square
/// container: `(x offset, y offset, width, height)`
pub fn contain_fit(container: f32, aspect: f32) -> (f32, f32, f32, f32) {
    if aspect <= 0.0 || !aspect.is_finite() {
        return (0.0, 0.0, container, container);
    }
    let (w, h) = if aspect >= 1.0 {
        (container, container / aspect)
    } else {
        (container * aspect, container)
    };
    ((container - w) / 2.0, (container - h) / 2.0, w, h)
}

/// Helvetica advance widths (1/1000 em) for ASCII 32..=126
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, //
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, //
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, //
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, //
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, //
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, //
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, //
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, //
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Rendered width of `text` in millimetres
pub fn text_width(text: &str, size: f32, font: Font) -> f32 {
    let table = match font {
        Font::Regular => &HELVETICA,
        Font::Bold => &HELVETICA_BOLD,
    };
    let units: u32 = text
        .chars()
        .map(|c| {
            let idx = (c as usize).wrapping_sub(32);
            u32::from(table.get(idx).copied().unwrap_or(556))
        })
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let em = units as f32 / 1000.0;
    em * size * PT_TO_MM
}

#[derive(Debug)]
struct Measured<'a> {
    word: &'a str,
    width: f64,
    space: f64,
}

impl Fragment for Measured<'_> {
    fn width(&self) -> f64 {
        self.width
    }

    fn whitespace_width(&self) -> f64 {
        self.space
    }

    fn penalty_width(&self) -> f64 {
        0.0
    }
}

/// Wrap `text` to `max_width` mm; words wider than a line keep a line of their own
pub fn wrap_text(text: &str, max_width: f32, size: f32, font: Font) -> Vec<String> {
    let space = f64::from(text_width(" ", size, font));
    let words: Vec<Measured<'_>> = text
        .split_whitespace()
        .map(|word| Measured {
            word,
            width: f64::from(text_width(word, size, font)),
            space,
        })
        .collect();

    wrap_first_fit(&words, &[f64::from(max_width)])
        .into_iter()
        .map(|line| line.iter().map(|m| m.word).collect::<Vec<_>>().join(" "))
        .collect()
}

/// First `max` characters of `text`
pub fn clip(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        // "Hi" = 722 + 222 units at 10pt
        let w = text_width("Hi", 10.0, Font::Regular);
        assert!((w - 0.944 * 10.0 * PT_TO_MM).abs() < 1e-4);
        assert!(text_width("Hi", 10.0, Font::Bold) > w);
        assert_eq!(text_width("", 12.0, Font::Regular), 0.0);
        // non-ASCII falls back to the average width
        assert!((text_width("é", 10.0, Font::Regular) - 0.556 * 10.0 * PT_TO_MM).abs() < 1e-4);
    }

    #[test]
    fn test_wrap_text_respects_width() {
        let text = "Launch the spring collection with a carousel of the five best sellers";
        let lines = wrap_text(text, 40.0, 8.0, Font::Regular);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, 8.0, Font::Regular) <= 40.0);
        }
        assert_eq!(lines.join(" "), text);
        assert!(wrap_text("   ", 40.0, 8.0, Font::Regular).is_empty());
    }

    #[test]
    fn test_contain_fit() {
        assert_eq!(contain_fit(40.0, 1.0), (0.0, 0.0, 40.0, 40.0));
        let (x, y, w, h) = contain_fit(40.0, 2.0);
        assert_eq!((x, y, w, h), (0.0, 10.0, 40.0, 20.0));
        let (x, y, w, h) = contain_fit(40.0, 0.5);
        assert_eq!((x, y, w, h), (10.0, 0.0, 20.0, 40.0));
        assert_eq!(contain_fit(40.0, 0.0), (0.0, 0.0, 40.0, 40.0));
    }

    #[test]
    fn test_rounded_rect_stays_in_bounds() {
        let points = rounded_rect(10.0, 20.0, 30.0, 8.0, 10.0);
        for (x, y) in &points {
            assert!(*x >= 10.0 - 1e-3 && *x <= 40.0 + 1e-3);
            assert!(*y >= 20.0 - 1e-3 && *y <= 28.0 + 1e-3);
        }
        assert_eq!(rounded_rect(0.0, 0.0, 5.0, 5.0, 0.0).len(), 4);
    }

    #[test]
    fn test_sector_endpoints() {
        let points = sector(0.0, 0.0, 10.0, 0.0, FRAC_PI_2);
        let first = points[0];
        let last = points[points.len() - 1];
        assert!((first.0 - 10.0).abs() < 1e-4 && first.1.abs() < 1e-4);
        assert!(last.0.abs() < 1e-4 && (last.1 - 10.0).abs() < 1e-4);
        assert_eq!(sector(0.0, 0.0, 1.0, 1.0, 1.0).len(), 2);
    }
}
