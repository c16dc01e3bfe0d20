use kurbo::{Affine, BezPath, Circle, Point, Shape};

use crate::color::ColorDef;
use crate::geometry::CanvasGeometry;
use crate::text::ShapedGlyph;

/// Flattening tolerance for circle-to-bezier conversion.
const PATH_TOLERANCE: f64 = 0.1;

/// How the ring and the photo are combined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RingMode {
    /// Ring surrounds a circularly cropped photo.
    Outside,
    /// Ring painted semi-transparently over a full-bleed photo, then the
    /// whole square masked down to the outer disc.
    Overlay,
}

impl RingMode {
    pub fn from_overlay_flag(overlay: bool) -> Self {
        if overlay { Self::Overlay } else { Self::Outside }
    }
}

/// One drawing operation against the canvas. The source bitmap is not
/// embedded here; the ops reference the single bitmap the plan is rendered
/// with, keeping the plan a cheap pure value.
#[derive(Clone, Debug)]
pub enum DrawOp {
    /// Blit the source bitmap under `transform` (bitmap space to canvas
    /// space), optionally clipped to a canvas-space path.
    Image {
        transform: Affine,
        clip: Option<BezPath>,
    },
    /// Fill a canvas-space path with a straight-alpha color.
    FillPath { path: BezPath, color: ColorDef },
    /// Stroke-then-fill a run of center-anchored glyphs under `transform`.
    Glyphs(GlyphRunOp),
}

#[derive(Clone, Debug)]
pub struct GlyphRunOp {
    pub transform: Affine,
    pub glyphs: Vec<ShapedGlyph>,
    pub font_size: f32,
    pub fill: ColorDef,
    pub outline: ColorDef,
    pub outline_width: f64,
}

/// The full recipe for one frame: photo and ring ops, an optional
/// destination-in disc mask applied after them, and text ops composited on
/// top of the masked result.
#[derive(Clone, Debug)]
pub struct RenderPlan {
    pub canvas_size: u32,
    pub base: Vec<DrawOp>,
    /// Radius of the alpha mask disc (overlay mode only). Text is drawn
    /// after the mask, exactly like the original compositing order.
    pub mask_radius: Option<f64>,
    pub text: Vec<DrawOp>,
}

/// Build the photo + ring portion of a plan. Pure over its inputs; neither
/// the bitmap nor any parameter is touched.
pub fn compose_ring(
    bitmap_w: u32,
    bitmap_h: u32,
    geometry: &CanvasGeometry,
    ring_color: ColorDef,
    ring_opacity: f64,
    mode: RingMode,
) -> RenderPlan {
    let center = Point::new(geometry.center, geometry.center);
    let annulus = annulus_path(center, geometry.outer_radius, geometry.inner_radius);
    let ring_fill = DrawOp::FillPath {
        path: annulus,
        color: ring_color.with_opacity(ring_opacity),
    };

    let (w, h) = (f64::from(bitmap_w), f64::from(bitmap_h));
    match mode {
        RingMode::Outside => {
            // Cover-fit the photo into the inner disc: shorter side spans
            // the disc diameter, excess cropped by the clip.
            let scale = (geometry.inner_radius * 2.0) / w.min(h);
            let blit = DrawOp::Image {
                transform: centered_blit(center, w, h, scale),
                clip: Some(circle_path(center, geometry.inner_radius)),
            };
            RenderPlan {
                canvas_size: geometry.canvas_size,
                base: vec![blit, ring_fill],
                mask_radius: None,
                text: Vec::new(),
            }
        }
        RingMode::Overlay => {
            // Cover-fit the photo over the whole square, ring blended on
            // top, corners cut away by the disc mask.
            let size = f64::from(geometry.canvas_size);
            let scale = (size / w).max(size / h);
            let blit = DrawOp::Image {
                transform: centered_blit(center, w, h, scale),
                clip: None,
            };
            RenderPlan {
                canvas_size: geometry.canvas_size,
                base: vec![blit, ring_fill],
                mask_radius: Some(geometry.outer_radius),
                text: Vec::new(),
            }
        }
    }
}

/// Uniform `scale` about the bitmap's own origin, then translate so the
/// scaled bitmap is centered on `center`.
fn centered_blit(center: Point, w: f64, h: f64, scale: f64) -> Affine {
    let scaled_w = w * scale;
    let scaled_h = h * scale;
    Affine::translate((center.x - scaled_w / 2.0, center.y - scaled_h / 2.0))
        * Affine::scale(scale)
}

pub(crate) fn circle_path(center: Point, radius: f64) -> BezPath {
    let mut path = BezPath::new();
    for el in Circle::new(center, radius).path_elements(PATH_TOLERANCE) {
        path.push(el);
    }
    path
}

/// The ring band as a single path: outer circle plus the inner circle with
/// reversed winding, so the non-zero fill rule treats the inner circle as a
/// hole. Same-direction windings would fill the whole disc instead.
pub(crate) fn annulus_path(center: Point, outer_radius: f64, inner_radius: f64) -> BezPath {
    let mut path = circle_path(center, outer_radius);
    let inner = circle_path(center, inner_radius).reverse_subpaths();
    path.extend(inner.elements().iter().copied());
    path
}
