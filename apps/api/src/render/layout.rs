//! Page layout: turns parsed blocks into positioned text on fixed-size pages.
//!
//! Engines only produce a [`PagePlan`]; painting the plan into PDF bytes lives in
//! `pdf.rs`, so pagination and wrapping are testable without decoding a PDF.

use crate::render::font_metrics::{measure, wrap_text, Face};
use crate::render::markdown::{Block, RenderedDocument};
use crate::render::{pdf, RenderError};

pub const POINTS_PER_INCH: f32 = 72.0;
pub const A4_PT: (f32, f32) = (595.28, 841.89);
pub const LETTER_PT: (f32, f32) = (612.0, 792.0);
const MARGIN_PT: f32 = 0.75 * POINTS_PER_INCH;

/// One run of text. Coordinates are PDF user space: origin bottom-left, `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub page: usize,
    pub x_pt: f32,
    pub y_pt: f32,
    pub text: String,
    pub face: Face,
    pub size_pt: f32,
}

/// A horizontal rule between `x1_pt` and `x2_pt` at height `y_pt`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRule {
    pub page: usize,
    pub x1_pt: f32,
    pub x2_pt: f32,
    pub y_pt: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub page_count: usize,
    pub texts: Vec<PlacedText>,
    pub rules: Vec<PlacedRule>,
}

#[cfg(test)]
impl PagePlan {
    /// All placed text on `page`, top to bottom.
    pub fn page_text(&self, page: usize) -> Vec<&str> {
        self.texts
            .iter()
            .filter(|t| t.page == page)
            .map(|t| t.text.as_str())
            .collect()
    }
}

pub trait LayoutEngine: Send + Sync {
    fn name(&self) -> &'static str;

    fn plan(&self, doc: &RenderedDocument) -> Result<PagePlan, RenderError>;

    fn render(&self, doc: &RenderedDocument) -> Result<Vec<u8>, RenderError> {
        let plan = self.plan(doc)?;
        pdf::paint(&plan, self.name())
    }
}

#[derive(Debug, Clone, Copy)]
enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    face: Face,
    size: f32,
    leading: f32,
}

impl TextStyle {
    const fn new(face: Face, size: f32, leading: f32) -> Self {
        Self {
            face,
            size,
            leading,
        }
    }
}

/// Vertical cursor over a sequence of equally sized pages.
struct Flow {
    width: f32,
    height: f32,
    margin: f32,
    /// Distance consumed below the top margin on the current page.
    cursor: f32,
    page: usize,
    texts: Vec<PlacedText>,
    rules: Vec<PlacedRule>,
}

impl Flow {
    fn new((width, height): (f32, f32), margin: f32) -> Self {
        Self {
            width,
            height,
            margin,
            cursor: 0.0,
            page: 0,
            texts: Vec::new(),
            rules: Vec::new(),
        }
    }

    fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    fn content_height(&self) -> f32 {
        self.height - 2.0 * self.margin
    }

    /// Vertical gap; swallowed at the top of a page.
    fn space(&mut self, pt: f32) {
        if self.cursor > 0.0 {
            self.cursor = (self.cursor + pt).min(self.content_height());
        }
    }

    fn break_if_needed(&mut self, needed: f32) {
        if self.cursor > 0.0 && self.cursor + needed > self.content_height() {
            self.page += 1;
            self.cursor = 0.0;
        }
    }

    /// Baseline of a line of `size_pt` text starting at the cursor.
    fn baseline(&self, size_pt: f32) -> f32 {
        self.height - self.margin - self.cursor - size_pt * 0.8
    }

    fn place(&mut self, x_pt: f32, y_pt: f32, text: String, face: Face, size_pt: f32) {
        self.texts.push(PlacedText {
            page: self.page,
            x_pt,
            y_pt,
            text,
            face,
            size_pt,
        });
    }

    /// Wraps `text` into the column starting `indent` from the left margin.
    /// `marker`, when given, is drawn at the margin on the first line only.
    fn paragraph(
        &mut self,
        text: &str,
        style: TextStyle,
        indent: f32,
        marker: Option<&str>,
        align: Align,
    ) {
        let TextStyle {
            face,
            size: size_pt,
            leading,
        } = style;
        let column = self.content_width() - indent;
        // measure exactly the glyphs that will be painted
        let text = pdf::normalize_for_builtin_font(text);
        let mut lines = wrap_text(&text, face, size_pt, column);
        if lines.is_empty() {
            lines.push(String::new());
        }

        for (i, line) in lines.into_iter().enumerate() {
            self.break_if_needed(leading);
            let y = self.baseline(size_pt);

            if i == 0 {
                if let Some(marker) = marker {
                    self.place(self.margin, y, marker.to_string(), face, size_pt);
                }
            }

            let x = match align {
                Align::Left => self.margin + indent,
                Align::Center => {
                    let slack = column - measure(&line, face, size_pt);
                    self.margin + indent + (slack / 2.0).max(0.0)
                }
            };
            if !line.is_empty() {
                self.place(x, y, line, face, size_pt);
            }
            self.cursor += leading;
        }
    }

    fn rule(&mut self, gap: f32) {
        self.break_if_needed(gap);
        let y = self.height - self.margin - self.cursor - gap / 2.0;
        self.rules.push(PlacedRule {
            page: self.page,
            x1_pt: self.margin,
            x2_pt: self.width - self.margin,
            y_pt: y,
        });
        self.cursor += gap;
    }

    fn finish(self) -> PagePlan {
        PagePlan {
            page_width_pt: self.width,
            page_height_pt: self.height,
            page_count: self.page + 1,
            texts: self.texts,
            rules: self.rules,
        }
    }
}

/// Primary layout: A4, distinct styles per block kind, bullet glyphs with hanging indent.
#[derive(Debug, Clone)]
pub struct StyledLayout {
    pub page_size: (f32, f32),
    pub margin_pt: f32,
    pub body_size: f32,
    pub line_spacing: f32,
    pub hanging_indent: f32,
}

impl Default for StyledLayout {
    fn default() -> Self {
        Self {
            page_size: A4_PT,
            margin_pt: MARGIN_PT,
            body_size: 11.0,
            line_spacing: 1.5,
            hanging_indent: 20.0,
        }
    }
}

impl LayoutEngine for StyledLayout {
    fn name(&self) -> &'static str {
        "styled"
    }

    fn plan(&self, doc: &RenderedDocument) -> Result<PagePlan, RenderError> {
        let min_width = self.hanging_indent + self.body_size * 2.0;
        if self.page_size.0 - 2.0 * self.margin_pt < min_width
            || self.page_size.1 - 2.0 * self.margin_pt < self.body_size * self.line_spacing
        {
            return Err(RenderError::Layout {
                engine: self.name(),
                message: "page too small for the configured margins".to_string(),
            });
        }

        let mut flow = Flow::new(self.page_size, self.margin_pt);
        let body = TextStyle::new(
            Face::Regular,
            self.body_size,
            self.body_size * self.line_spacing,
        );

        for block in &doc.blocks {
            match block {
                Block::Title(text) => {
                    flow.paragraph(
                        text,
                        TextStyle::new(Face::Bold, 20.0, 24.0),
                        0.0,
                        None,
                        Align::Center,
                    );
                    flow.space(8.0);
                }
                Block::Heading(text) => {
                    flow.space(16.0);
                    flow.paragraph(
                        text,
                        TextStyle::new(Face::Bold, 14.0, 18.0),
                        0.0,
                        None,
                        Align::Left,
                    );
                    flow.rule(8.0);
                }
                Block::SubHeading(text) => {
                    flow.space(12.0);
                    flow.paragraph(
                        text,
                        TextStyle::new(Face::Bold, 12.0, 15.0),
                        0.0,
                        None,
                        Align::Left,
                    );
                    flow.space(6.0);
                }
                Block::Bullet(text) => flow.paragraph(
                    text,
                    body,
                    self.hanging_indent,
                    Some("•"),
                    Align::Left,
                ),
                Block::NumberedItem(text) => {
                    let (marker, rest) = text.split_once(' ').unwrap_or((text.as_str(), ""));
                    flow.paragraph(
                        rest,
                        body,
                        self.hanging_indent,
                        Some(marker),
                        Align::Left,
                    );
                }
                Block::Plain(text) => flow.paragraph(text, body, 0.0, None, Align::Left),
                Block::Blank => flow.space(6.0),
            }
        }

        Ok(flow.finish())
    }
}

/// Fallback layout: US Letter, three plain styles and a spacer after every line.
#[derive(Debug, Clone)]
pub struct BasicLayout {
    pub page_size: (f32, f32),
    pub margin_pt: f32,
}

impl Default for BasicLayout {
    fn default() -> Self {
        Self {
            page_size: LETTER_PT,
            margin_pt: MARGIN_PT,
        }
    }
}

impl BasicLayout {
    const HEADING: TextStyle = TextStyle::new(Face::Bold, 18.0, 21.6);
    const SUBHEADING: TextStyle = TextStyle::new(Face::Bold, 13.0, 15.6);
    const BODY: TextStyle = TextStyle::new(Face::Regular, 11.0, 13.2);
    const SPACER_PT: f32 = 0.1 * POINTS_PER_INCH;
}

impl LayoutEngine for BasicLayout {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn plan(&self, doc: &RenderedDocument) -> Result<PagePlan, RenderError> {
        let mut flow = Flow::new(self.page_size, self.margin_pt);

        for block in &doc.blocks {
            let (style, text) = match block {
                Block::Title(t) => (Self::HEADING, t.clone()),
                Block::Heading(t) | Block::SubHeading(t) => (Self::SUBHEADING, t.clone()),
                Block::Bullet(t) => (Self::BODY, format!("- {t}")),
                Block::NumberedItem(t) | Block::Plain(t) => (Self::BODY, t.clone()),
                Block::Blank => {
                    flow.space(Self::SPACER_PT);
                    continue;
                }
            };
            flow.paragraph(&text, style, 0.0, None, Align::Left);
            flow.space(Self::SPACER_PT);
        }

        Ok(flow.finish())
    }
}
