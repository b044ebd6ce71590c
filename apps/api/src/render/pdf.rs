//! Paints a [`PagePlan`] with printpdf's builtin Helvetica faces.

use printpdf::{BuiltinFont, Line, Mm, PdfDocument, PdfLayerReference, Point};

use crate::render::font_metrics::Face;
use crate::render::layout::PagePlan;
use crate::render::RenderError;

const LAYER_NAME: &str = "Layer 1";
const RULE_THICKNESS_PT: f32 = 0.75;

fn mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

/// Characters WinAnsiEncoding places in 0x80..=0x9F, other than the quotes,
/// dashes and ellipsis that are folded to ASCII.
const WIN_ANSI_SPECIALS: &[char] = &[
    '€', 'ƒ', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', 'Ž', '•', '˜', '™', 'š', '›', 'œ', 'ž', 'Ÿ',
];

/// Maps the text onto glyphs the builtin fonts can encode.
///
/// Typographic quotes, dashes and ellipsis fold to ASCII. Latin-1 and the other
/// WinAnsi characters pass through. Anything else becomes `?` so no glyph is
/// silently dropped. Layout measures this form, so it must match what is painted.
pub fn normalize_for_builtin_font(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2013}' | '\u{2014}' | '\u{2012}' | '\u{2212}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' | '\u{2009}' | '\u{202F}' => out.push(' '),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            '\u{00A1}'..='\u{00FF}' => out.push(c),
            c if WIN_ANSI_SPECIALS.contains(&c) => out.push(c),
            c if c.is_whitespace() => out.push(' '),
            _ => out.push('?'),
        }
    }
    out
}

pub fn paint(plan: &PagePlan, title: &str) -> Result<Vec<u8>, RenderError> {
    let width = mm(plan.page_width_pt);
    let height = mm(plan.page_height_pt);
    let (doc, first_page, first_layer) = PdfDocument::new(title, width, height, LAYER_NAME);

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| RenderError::Encode(e.to_string()))?;

    let mut layers: Vec<PdfLayerReference> = Vec::with_capacity(plan.page_count);
    layers.push(doc.get_page(first_page).get_layer(first_layer));
    for _ in 1..plan.page_count {
        let (page, layer) = doc.add_page(width, height, LAYER_NAME);
        layers.push(doc.get_page(page).get_layer(layer));
    }

    for item in &plan.texts {
        let layer = layers.get(item.page).ok_or_else(|| {
            RenderError::Encode(format!("text placed on missing page {}", item.page))
        })?;
        let font = match item.face {
            Face::Regular => &regular,
            Face::Bold => &bold,
        };
        layer.use_text(
            normalize_for_builtin_font(&item.text),
            item.size_pt,
            mm(item.x_pt),
            mm(item.y_pt),
            font,
        );
    }

    for rule in &plan.rules {
        let layer = layers.get(rule.page).ok_or_else(|| {
            RenderError::Encode(format!("rule placed on missing page {}", rule.page))
        })?;
        layer.set_outline_thickness(RULE_THICKNESS_PT);
        layer.add_line(Line {
            points: vec![
                (Point::new(mm(rule.x1_pt), mm(rule.y_pt)), false),
                (Point::new(mm(rule.x2_pt), mm(rule.y_pt)), false),
            ],
            is_closed: false,
        });
    }

    doc.save_to_bytes()
        .map_err(|e| RenderError::Encode(e.to_string()))
}
