use serde::{Deserialize, Serialize};

use crate::color::ColorDef;
use crate::error::{RingletError, RingletResult};

/// Caption text below the configured floor never renders legibly, so the
/// dynamic size range bottoms out here.
pub const CAPTION_MIN_PX: u32 = 10;

/// Bounds of the caption size slider relative to its bitmap-derived baseline.
pub const CAPTION_SIZE_MIN_RATIO: f64 = 0.5;
pub const CAPTION_SIZE_MAX_RATIO: f64 = 2.5;

/// Caption baseline as a fraction of the primary text size at load time.
pub const CAPTION_BASELINE_RATIO: f64 = 0.65;

/// The two built-in caption texts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionVariant {
    #[default]
    Standard,
    Uncensored,
}

impl CaptionVariant {
    pub fn text(self) -> &'static str {
        match self {
            Self::Standard => "STOP ICE",
            Self::Uncensored => "FUCK ICE",
        }
    }
}

/// Secondary caption controls.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionParams {
    pub enabled: bool,
    pub color: ColorDef,
    /// Size in pixels. `None` uses the baseline derived from the loaded
    /// bitmap; any explicit value is clamped to [50%, 250%] of that baseline.
    pub font_size_px: Option<u32>,
    /// Angular position in degrees, 0-359, measured clockwise from 12
    /// o'clock after the fixed 90 degree baseline shift.
    pub angle_deg: u16,
    /// Draw flat at the canvas center instead of curved along the rim.
    pub centered: bool,
    pub variant: CaptionVariant,
}

impl Default for CaptionParams {
    fn default() -> Self {
        Self {
            enabled: true,
            color: ColorDef::WHITE,
            font_size_px: None,
            angle_deg: 270,
            centered: false,
            variant: CaptionVariant::Standard,
        }
    }
}

impl CaptionParams {
    /// Caption size actually rendered, given the baseline computed when the
    /// bitmap was loaded. Explicit values are clamped into the dynamic
    /// slider range rather than rejected.
    pub fn resolved_size(&self, baseline_px: u32) -> f64 {
        let min = ((f64::from(baseline_px) * CAPTION_SIZE_MIN_RATIO).round() as u32)
            .max(CAPTION_MIN_PX);
        let max = (f64::from(baseline_px) * CAPTION_SIZE_MAX_RATIO).round() as u32;
        let px = self.font_size_px.unwrap_or(baseline_px).clamp(min, max.max(min));
        f64::from(px)
    }
}

/// The full mutable parameter bag. Value-typed: callers replace it (or a
/// field) wholesale and re-render; nothing in here is derived state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderParams {
    /// Primary text size in slider units; 40 means x1.0 of the base size.
    pub font_size_multiplier: u32,
    pub text_color: ColorDef,
    pub ring_color: ColorDef,
    /// Ring opacity percentage, 0-100.
    pub ring_opacity_pct: u8,
    /// `false`: ring drawn around a circularly cropped photo. `true`: ring
    /// painted translucently over a full-bleed photo.
    pub overlay_mode: bool,
    pub caption: CaptionParams,
    /// Slogan laid along the ring, split into two half-arcs on the word
    /// midpoint. The layout does not depend on the literal content.
    pub slogan: String,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            font_size_multiplier: 40,
            text_color: ColorDef::WHITE,
            ring_color: ColorDef::rgb(0x25, 0x47, 0xa9),
            ring_opacity_pct: 94,
            overlay_mode: false,
            caption: CaptionParams::default(),
            slogan: "IMMIGRANTS MAKE AMERICA GREAT".to_string(),
        }
    }
}

impl RenderParams {
    /// Range checks for values arriving from outside (JSON files, flags).
    pub fn validate(&self) -> RingletResult<()> {
        if self.font_size_multiplier == 0 {
            return Err(RingletError::validation("font_size_multiplier must be > 0"));
        }
        if self.ring_opacity_pct > 100 {
            return Err(RingletError::validation(format!(
                "ring_opacity_pct must be 0-100, got {}",
                self.ring_opacity_pct
            )));
        }
        if self.caption.angle_deg > 359 {
            return Err(RingletError::validation(format!(
                "caption.angle_deg must be 0-359, got {}",
                self.caption.angle_deg
            )));
        }
        Ok(())
    }

    pub fn ring_opacity(&self) -> f64 {
        f64::from(self.ring_opacity_pct) / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_reset_values() {
        let p = RenderParams::default();
        assert_eq!(p.font_size_multiplier, 40);
        assert_eq!(p.text_color, ColorDef::WHITE);
        assert_eq!(p.ring_color, ColorDef::rgb(0x25, 0x47, 0xa9));
        assert_eq!(p.ring_opacity_pct, 94);
        assert!(!p.overlay_mode);
        assert!(p.caption.enabled);
        assert_eq!(p.caption.angle_deg, 270);
        assert!(!p.caption.centered);
        assert_eq!(p.caption.variant.text(), "STOP ICE");
        assert_eq!(p.slogan, "IMMIGRANTS MAKE AMERICA GREAT");
        p.validate().unwrap();
    }

    #[test]
    fn defaults_round_trip_through_json() {
        let p = RenderParams::default();
        let json = serde_json::to_string(&p).unwrap();
        let back: RenderParams = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn empty_json_object_yields_defaults() {
        let p: RenderParams = serde_json::from_str("{}").unwrap();
        assert_eq!(p, RenderParams::default());
    }

    #[test]
    fn validate_rejects_out_of_range() {
        let mut p = RenderParams::default();
        p.ring_opacity_pct = 101;
        assert!(p.validate().is_err());

        let mut p = RenderParams::default();
        p.caption.angle_deg = 360;
        assert!(p.validate().is_err());

        let mut p = RenderParams::default();
        p.font_size_multiplier = 0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn caption_size_clamps_to_dynamic_range() {
        let c = CaptionParams::default();
        // Unset: baseline passes through.
        assert_eq!(c.resolved_size(62), 62.0);

        let mut c = CaptionParams::default();
        c.font_size_px = Some(1);
        assert_eq!(c.resolved_size(62), 31.0); // 50% floor

        c.font_size_px = Some(10_000);
        assert_eq!(c.resolved_size(62), 155.0); // 250% ceiling

        // Tiny baselines bottom out at the absolute floor.
        c.font_size_px = Some(1);
        assert_eq!(c.resolved_size(8), 10.0);
    }
}
