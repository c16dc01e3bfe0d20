use crate::error::{RingletError, RingletResult};

/// Ring thickness as a fraction of the larger source dimension. Keeping the
/// ring proportional makes the composite resolution-independent.
pub const RING_WIDTH_RATIO: f64 = 0.15;

/// Primary text size as a fraction of the ring width.
pub const BASE_FONT_RATIO: f64 = 0.8;

/// Slider value at which the primary-text multiplier equals 1.0.
pub const FONT_SIZE_BASELINE: u32 = 40;

/// Square canvas layout derived from the source bitmap dimensions.
///
/// Derived once per loaded bitmap; every other parameter change leaves the
/// geometry untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasGeometry {
    /// Edge length of the square output canvas in pixels.
    pub canvas_size: u32,
    /// Thickness of the ring band.
    pub ring_width: f64,
    /// Canvas center on both axes.
    pub center: f64,
    /// Radius of the outermost circle (half the canvas).
    pub outer_radius: f64,
    /// Radius of the photo disc; `outer_radius - ring_width`.
    pub inner_radius: f64,
    /// Primary text size before the user multiplier is applied.
    pub base_font_size: f64,
}

impl CanvasGeometry {
    /// Derive the canvas layout for a `width` x `height` source bitmap.
    pub fn derive(width: u32, height: u32) -> RingletResult<Self> {
        if width == 0 || height == 0 {
            return Err(RingletError::geometry(
                "source bitmap must have non-zero dimensions",
            ));
        }

        let max_dim = f64::from(width.max(height));
        let ring_width = max_dim * RING_WIDTH_RATIO;
        let canvas_size = (max_dim + ring_width * 2.0).round() as u32;

        let size = f64::from(canvas_size);
        let outer_radius = size / 2.0;
        let inner_radius = outer_radius - ring_width;
        // max_dim >= 1 keeps inner_radius at half the source dimension, so
        // this only trips if the derivation above changes.
        if inner_radius <= 0.0 {
            return Err(RingletError::geometry(format!(
                "inner radius collapsed for {width}x{height} source"
            )));
        }

        Ok(Self {
            canvas_size,
            ring_width,
            center: size / 2.0,
            outer_radius,
            inner_radius,
            base_font_size: ring_width * BASE_FONT_RATIO,
        })
    }

    /// Radius of the arc the primary slogan text follows (middle of the
    /// ring band).
    pub fn slogan_radius(&self) -> f64 {
        self.inner_radius + self.ring_width / 2.0
    }

    /// Primary text size for a slider `multiplier` (baseline 40 = x1.0).
    pub fn primary_font_size(&self, multiplier: u32) -> f64 {
        self.base_font_size * f64::from(multiplier) / f64::from(FONT_SIZE_BASELINE)
    }
}
