//! printpdf backend for laid-out pages

use anyhow::{Result, anyhow};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color as PdfColor, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point,
    Polygon, Rgb,
};

use super::Report;
use super::layout::{Align, Color, Font, PAGE_HEIGHT, PAGE_WIDTH, Shape, text_width};

const MM_TO_PT: f32 = 2.834_65;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    const fn get(&self, font: Font) -> &IndirectFontRef {
        match font {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
        }
    }
}

/// Render every page into a PDF document
pub(super) fn render(title: &str, report: &Report) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("Failed to load Helvetica: {e:?}"))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("Failed to load Helvetica Bold: {e:?}"))?,
    };

    for (i, page) in report.pages.iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_idx, layer_idx) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            doc.get_page(page_idx).get_layer(layer_idx)
        };
        for shape in &page.shapes {
            draw(&layer, &fonts, shape);
        }
    }

    doc.save_to_bytes().map_err(|e| anyhow!("Failed to encode PDF: {e:?}"))
}

/// Layout y grows downwards, PDF y grows upwards
fn point(x: f32, y: f32) -> Point {
    Point::new(Mm(x), Mm(PAGE_HEIGHT - y))
}

fn rgb(color: Color) -> PdfColor {
    PdfColor::Rgb(Rgb::new(
        f32::from(color.0) / 255.0,
        f32::from(color.1) / 255.0,
        f32::from(color.2) / 255.0,
        None,
    ))
}

fn draw(layer: &PdfLayerReference, fonts: &Fonts, shape: &Shape) {
    match shape {
        Shape::Polygon { points, fill, stroke } => {
            let mode = match (fill, stroke) {
                (Some(_), Some(_)) => PaintMode::FillStroke,
                (Some(_), None) => PaintMode::Fill,
                (None, _) => PaintMode::Stroke,
            };
            if let Some(fill) = fill {
                layer.set_fill_color(rgb(*fill));
            }
            if let Some((color, thickness)) = stroke {
                layer.set_outline_color(rgb(*color));
                layer.set_outline_thickness(thickness * MM_TO_PT);
            }
            layer.add_polygon(Polygon {
                rings: vec![points.iter().map(|&(x, y)| (point(x, y), false)).collect()],
                mode,
                winding_order: WindingOrder::NonZero,
            });
        }
        Shape::Line { from, to, color, width } => {
            layer.set_outline_color(rgb(*color));
            layer.set_outline_thickness(width * MM_TO_PT);
            layer.add_line(Line {
                points: vec![(point(from.0, from.1), false), (point(to.0, to.1), false)],
                is_closed: false,
            });
        }
        Shape::Text {
            text,
            x,
            y,
            size,
            font,
            color,
            align,
        } => {
            let text = latin_fold(text);
            let left = match align {
                Align::Left => *x,
                Align::Center => x - text_width(&text, *size, *font) / 2.0,
                Align::Right => x - text_width(&text, *size, *font),
            };
            layer.set_fill_color(rgb(*color));
            layer.use_text(text, *size, Mm(left), Mm(PAGE_HEIGHT - y), fonts.get(*font));
        }
    }
}

/// The built-in fonts only cover ASCII: strip accents, replace the rest
fn latin_fold(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c,
            'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
            'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => 'A',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
            'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'O',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'ñ' => 'n',
            'Ñ' => 'N',
            'ç' => 'c',
            'Ç' => 'C',
            '‘' | '’' => '\'',
            '“' | '”' => '"',
            '–' | '—' | '•' => '-',
            '\t' | '\n' | '\r' => ' ',
            _ => '?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin_fold() {
        assert_eq!(latin_fold("Campaña año nuevo"), "Campana ano nuevo");
        assert_eq!(latin_fold("Café • “Promo”"), "Cafe - \"Promo\"");
        assert_eq!(latin_fold("🎉 Launch"), "? Launch");
    }
}
