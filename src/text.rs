use std::borrow::Cow;
use std::collections::HashMap;

use crate::arc_text::GlyphMeasure;
use crate::error::{RingletError, RingletResult};

/// Marker brush for parley layouts. Paint decisions (fill, outline) are made
/// at draw time, so the layout carries no color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrush;

/// One positioned glyph, in a coordinate frame whose origin is the center of
/// the shaped string (horizontally at half the advance, vertically at the
/// middle of the em box). This matches the center/middle anchoring every
/// text draw in the pipeline uses.
#[derive(Clone, Copy, Debug)]
pub struct ShapedGlyph {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

/// A shaped single-line string: its advance plus center-anchored glyphs.
#[derive(Clone, Debug)]
pub struct ShapedText {
    pub advance: f64,
    pub font_size: f32,
    pub glyphs: Vec<ShapedGlyph>,
}

/// Stateful shaper wrapping parley's font and layout contexts over one set
/// of caller-supplied font bytes.
///
/// Used both to measure character advances for the arc layout and to produce
/// glyph ids for the CPU rasterizer, so the two can never disagree.
pub struct TextShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    family_name: String,
    font_data: vello_cpu::peniko::FontData,
    char_cache: HashMap<(char, u32), ShapedText>,
}

impl TextShaper {
    /// Register the given TTF/OTF bytes and resolve the family they provide.
    pub fn new(font_bytes: Vec<u8>) -> RingletResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            RingletError::validation("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| RingletError::validation("registered font family has no name"))?
            .to_string();

        let font_data =
            vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font_data,
            char_cache: HashMap::new(),
        })
    }

    /// Name of the family the shaper resolved from its font bytes.
    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Font handle for the CPU rasterizer's glyph runs.
    pub(crate) fn font_data(&self) -> vello_cpu::peniko::FontData {
        self.font_data.clone()
    }

    /// Shape a single-line string at `size_px`. Whitespace keeps its advance
    /// (trailing spaces included), which the arc layout depends on.
    pub fn shape(&mut self, text: &str, size_px: f32) -> RingletResult<ShapedText> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(RingletError::geometry("text size_px must be finite and > 0"));
        }
        if text.is_empty() {
            return Ok(ShapedText {
                advance: 0.0,
                font_size: size_px,
                glyphs: Vec::new(),
            });
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);

        let advance = f64::from(layout.full_width());

        let mut glyphs = Vec::new();
        if let Some(line) = layout.lines().next() {
            let m = line.metrics();
            // Shift the baseline-relative layout so (0,0) is the center of
            // the em box, the anchor every caller positions against.
            let center_y = m.baseline + (m.descent - m.ascent) / 2.0;
            let center_x = (advance / 2.0) as f32;
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                for g in run.glyphs() {
                    glyphs.push(ShapedGlyph {
                        id: g.id,
                        x: g.x - center_x,
                        y: g.y - center_y,
                    });
                }
            }
        }

        Ok(ShapedText {
            advance,
            font_size: size_px,
            glyphs,
        })
    }

    /// Shape a single character, cached per (char, size).
    pub fn shape_char(&mut self, ch: char, size_px: f32) -> RingletResult<ShapedText> {
        let key = (ch, size_px.to_bits());
        if let Some(shaped) = self.char_cache.get(&key) {
            return Ok(shaped.clone());
        }
        let shaped = self.shape(ch.encode_utf8(&mut [0u8; 4]), size_px)?;
        self.char_cache.insert(key, shaped.clone());
        Ok(shaped)
    }
}

impl GlyphMeasure for TextShaper {
    fn advance_width(&mut self, ch: char, font_size: f64) -> RingletResult<f64> {
        Ok(self.shape_char(ch, font_size as f32)?.advance)
    }
}
