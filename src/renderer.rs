use std::f64::consts::PI;

use kurbo::Affine;

use crate::arc_text::{ArcLayout, Orientation, layout_arc};
use crate::bitmap::SourceBitmap;
use crate::color::ColorDef;
use crate::compose::{DrawOp, GlyphRunOp, RenderPlan, RingMode, compose_ring};
use crate::error::RingletResult;
use crate::geometry::CanvasGeometry;
use crate::params::{
    CAPTION_BASELINE_RATIO, CAPTION_MIN_PX, CAPTION_SIZE_MAX_RATIO, CAPTION_SIZE_MIN_RATIO,
    RenderParams,
};
use crate::render_cpu::{FrameRGBA, render_plan};
use crate::text::TextShaper;

/// Everything derived from a loaded bitmap. Recomputed only on load; the
/// other parameters never change the geometry.
#[derive(Clone, Debug)]
struct LoadedState {
    bitmap: SourceBitmap,
    geometry: CanvasGeometry,
    /// Caption size baseline, fixed at load time from the ring width and the
    /// multiplier in effect at that moment.
    caption_baseline_px: u32,
}

/// The editing session: owns the current bitmap and parameter bag and
/// sequences the compositor, the arc text layout, and the CPU renderer.
///
/// Two states: Empty (no bitmap; `render` is a no-op) and Loaded. Loading a
/// new bitmap replaces the old one wholesale; `reset` returns to Empty and
/// restores every parameter to its documented default.
pub struct Editor {
    shaper: TextShaper,
    params: RenderParams,
    loaded: Option<LoadedState>,
}

impl Editor {
    /// Create an empty editor rendering with the given TTF/OTF font bytes.
    pub fn new(font_bytes: Vec<u8>) -> RingletResult<Self> {
        Ok(Self {
            shaper: TextShaper::new(font_bytes)?,
            params: RenderParams::default(),
            loaded: None,
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn params(&self) -> &RenderParams {
        &self.params
    }

    /// Replace the parameter bag. Values are range-checked; geometry is
    /// untouched (it depends only on the bitmap).
    pub fn set_params(&mut self, params: RenderParams) -> RingletResult<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    pub fn geometry(&self) -> Option<&CanvasGeometry> {
        self.loaded.as_ref().map(|l| &l.geometry)
    }

    /// Dynamic caption-size range for the loaded bitmap, `(min, max)` pixels.
    pub fn caption_size_bounds(&self) -> Option<(u32, u32)> {
        let baseline = f64::from(self.loaded.as_ref()?.caption_baseline_px);
        let min = ((baseline * CAPTION_SIZE_MIN_RATIO).round() as u32).max(CAPTION_MIN_PX);
        let max = ((baseline * CAPTION_SIZE_MAX_RATIO).round() as u32).max(min);
        Some((min, max))
    }

    /// Empty -> Loaded. The bitmap has already been decoded and validated.
    pub fn load_bitmap(&mut self, bitmap: SourceBitmap) -> RingletResult<()> {
        let geometry = CanvasGeometry::derive(bitmap.width(), bitmap.height())?;
        let main_size = geometry.primary_font_size(self.params.font_size_multiplier);
        let caption_baseline_px = (main_size * CAPTION_BASELINE_RATIO).round() as u32;
        // A freshly loaded bitmap starts from the derived caption size, not
        // whatever was dialed in for the previous photo.
        self.params.caption.font_size_px = None;
        self.loaded = Some(LoadedState {
            bitmap,
            geometry,
            caption_baseline_px,
        });
        Ok(())
    }

    /// Loaded -> Empty: drop the bitmap and restore parameter defaults.
    pub fn reset(&mut self) {
        self.loaded = None;
        self.params = RenderParams::default();
    }

    /// Render the full composite. `Ok(None)` in the Empty state.
    pub fn render(&mut self) -> RingletResult<Option<FrameRGBA>> {
        let Some(loaded) = self.loaded.as_ref() else {
            return Ok(None);
        };
        render_frame(
            &loaded.bitmap,
            &loaded.geometry,
            &self.params,
            loaded.caption_baseline_px,
            &mut self.shaper,
        )
        .map(Some)
    }
}

/// Render one frame as a pure function of its inputs: identical bitmap and
/// parameters always produce a byte-identical frame.
#[tracing::instrument(skip_all, fields(canvas = geometry.canvas_size, overlay = params.overlay_mode))]
pub fn render_frame(
    bitmap: &SourceBitmap,
    geometry: &CanvasGeometry,
    params: &RenderParams,
    caption_baseline_px: u32,
    shaper: &mut TextShaper,
) -> RingletResult<FrameRGBA> {
    params.validate()?;

    let mut plan = compose_ring(
        bitmap.width(),
        bitmap.height(),
        geometry,
        params.ring_color,
        params.ring_opacity(),
        RingMode::from_overlay_flag(params.overlay_mode),
    );

    push_slogan_ops(&mut plan, geometry, params, shaper)?;
    if params.caption.enabled {
        push_caption_ops(&mut plan, geometry, params, caption_baseline_px, shaper)?;
    }

    tracing::debug!(
        base_ops = plan.base.len(),
        text_ops = plan.text.len(),
        "rendering composite"
    );
    let font = shaper.font_data();
    render_plan(&plan, bitmap, Some(&font))
}

/// The slogan runs along the middle of the ring band, split on the word
/// midpoint: the front half reads along the top of the ring, the back half
/// is mirrored inward so it reads correctly along the bottom.
fn push_slogan_ops(
    plan: &mut RenderPlan,
    geometry: &CanvasGeometry,
    params: &RenderParams,
    shaper: &mut TextShaper,
) -> RingletResult<()> {
    if params.slogan.is_empty() {
        return Ok(());
    }

    let size = geometry.primary_font_size(params.font_size_multiplier);
    let radius = geometry.slogan_radius();
    let outline = params.text_color.contrast_outline();
    let outline_width = (size / 20.0).max(2.0);
    let (front, back) = split_slogan(&params.slogan);

    for (text, angle, orientation) in [
        (front, 0.0, Orientation::Outward),
        (back, PI, Orientation::Inward),
    ] {
        if text.is_empty() {
            continue;
        }
        let layout = layout_arc(&text, radius, angle, size, orientation, shaper)?;
        push_arc_glyphs(
            &mut plan.text,
            geometry.center,
            &layout,
            size,
            params.text_color,
            outline,
            outline_width,
            shaper,
        )?;
    }
    Ok(())
}

fn push_caption_ops(
    plan: &mut RenderPlan,
    geometry: &CanvasGeometry,
    params: &RenderParams,
    caption_baseline_px: u32,
    shaper: &mut TextShaper,
) -> RingletResult<()> {
    let caption = &params.caption;
    let size = caption.resolved_size(caption_baseline_px);
    let text = caption.variant.text();
    let angle = caption_angle(caption.angle_deg);
    let outline = caption.color.contrast_outline();
    let outline_width = (size / 6.0).max(2.0);

    if caption.centered {
        let shaped = shaper.shape(text, size as f32)?;
        plan.text.push(DrawOp::Glyphs(GlyphRunOp {
            transform: Affine::translate((geometry.center, geometry.center))
                * Affine::rotate(angle),
            glyphs: shaped.glyphs,
            font_size: size as f32,
            fill: caption.color,
            outline,
            outline_width,
        }));
    } else {
        // Near the rim, pulled in by a quarter ring width plus half the font
        // size so larger captions keep their padding. The floor keeps
        // extreme size/geometry combinations renderable.
        let radius = (geometry.inner_radius - geometry.ring_width * 0.25 - size * 0.5).max(1.0);
        let layout = layout_arc(text, radius, angle, size, Orientation::Inward, shaper)?;
        push_arc_glyphs(
            &mut plan.text,
            geometry.center,
            &layout,
            size,
            caption.color,
            outline,
            outline_width,
            shaper,
        )?;
    }
    Ok(())
}

/// The configured degrees place 90 at the canvas top, so upright reading is
/// rotation zero after subtracting the 90 degree baseline.
fn caption_angle(angle_deg: u16) -> f64 {
    (f64::from(angle_deg) - 90.0).to_radians()
}

/// `ceil(words / 2)` words in the front half, the rest in the back half.
fn split_slogan(slogan: &str) -> (String, String) {
    let words: Vec<&str> = slogan.split(' ').collect();
    let mid = words.len().div_ceil(2);
    (words[..mid].join(" "), words[mid..].join(" "))
}

/// Expand arc placements into one glyph run per character. The per-glyph
/// transform rotates about the canvas center, applies the inward mirror,
/// then offsets radially; the shaped glyph is already center-anchored.
#[allow(clippy::too_many_arguments)]
fn push_arc_glyphs(
    ops: &mut Vec<DrawOp>,
    center: f64,
    layout: &ArcLayout,
    font_size: f64,
    fill: ColorDef,
    outline: ColorDef,
    outline_width: f64,
    shaper: &mut TextShaper,
) -> RingletResult<()> {
    for placement in &layout.placements {
        let shaped = shaper.shape_char(placement.ch, font_size as f32)?;
        if shaped.glyphs.is_empty() {
            continue;
        }
        let mut transform = Affine::translate((center, center)) * Affine::rotate(placement.rotation);
        if placement.mirrored {
            transform = transform * Affine::rotate(PI);
        }
        transform = transform * Affine::translate((0.0, placement.radial_offset));
        ops.push(DrawOp::Glyphs(GlyphRunOp {
            transform,
            glyphs: shaped.glyphs,
            font_size: font_size as f32,
            fill,
            outline,
            outline_width,
        }));
    }
    Ok(())
}
