use crate::error::{RingletError, RingletResult};

/// Uniform letter spacing added after every glyph, as a fraction of the font
/// size.
pub const LETTER_SPACING_RATIO: f64 = 0.15;

/// Source of character advance widths. The layout engine is pure geometry;
/// everything font-specific comes through this seam, which also keeps the
/// algorithm testable without a rasterizer.
pub trait GlyphMeasure {
    /// Straight-line advance width of `ch` at `font_size`, in pixels.
    fn advance_width(&mut self, ch: char, font_size: f64) -> RingletResult<f64>;
}

/// Which side of the arc the glyph tops face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// Tops face away from the circle center; natural for the upper arc.
    Outward,
    /// Tops face the circle center: the character sequence is reversed and
    /// every glyph is rotated a further 180 degrees, so text on the lower
    /// arc still reads left to right.
    Inward,
}

/// Placement of one character along the arc. Interpreted as: rotate by
/// `rotation` about the circle center, optionally rotate the glyph itself
/// 180 degrees (`mirrored`), then offset radially by `radial_offset` and
/// draw the glyph centered at that point.
#[derive(Clone, Copy, Debug)]
pub struct GlyphPlacement {
    pub ch: char,
    /// Rotation about the circle center, radians.
    pub rotation: f64,
    /// Signed translation along the rotated y axis: negative places the
    /// glyph on the outer side, positive on the inner side (after the flip).
    pub radial_offset: f64,
    /// Extra 180 degree glyph rotation for inward orientation.
    pub mirrored: bool,
}

/// Result of laying a string along an arc. `placements` are in draw order,
/// which for [`Orientation::Inward`] is the reversed character sequence.
#[derive(Clone, Debug, Default)]
pub struct ArcLayout {
    pub placements: Vec<GlyphPlacement>,
    /// Total arc angle consumed by the text, radians.
    ///
    /// This is the small-angle arc-length approximation: straight-line
    /// advance widths divided by the radius. It under-curves long strings on
    /// small radii; that behavior is intentional and kept as-is rather than
    /// replaced with a conformal mapping.
    pub total_angle: f64,
}

/// Lay `text` along a circle of `radius`, centered on `start_angle`
/// (radians), with uniform letter spacing of 15% of `font_size`.
///
/// Each glyph's center sits at the midpoint of its own angular slot rather
/// than at the slot boundary, which keeps cumulative rounding from opening
/// visible gaps. Whitespace keeps its advance. An empty `text` produces an
/// empty layout without consulting `measure`. A radius smaller than the
/// font size is allowed and simply yields a tight, overlapping curve.
pub fn layout_arc(
    text: &str,
    radius: f64,
    start_angle: f64,
    font_size: f64,
    orientation: Orientation,
    measure: &mut dyn GlyphMeasure,
) -> RingletResult<ArcLayout> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(RingletError::geometry(format!(
            "arc radius must be finite and > 0, got {radius}"
        )));
    }
    if !font_size.is_finite() || font_size <= 0.0 {
        return Err(RingletError::geometry(format!(
            "arc font size must be finite and > 0, got {font_size}"
        )));
    }
    if text.is_empty() {
        return Ok(ArcLayout::default());
    }

    let mut chars: Vec<char> = text.chars().collect();
    if orientation == Orientation::Inward {
        chars.reverse();
    }

    let spacing = font_size * LETTER_SPACING_RATIO;
    let mut advances = Vec::with_capacity(chars.len());
    let mut total_width = 0.0;
    for &ch in &chars {
        let advance = measure.advance_width(ch, font_size)?;
        total_width += advance + spacing;
        advances.push(advance);
    }

    let total_angle = total_width / radius;
    let (radial_offset, mirrored) = match orientation {
        Orientation::Outward => (-radius, false),
        Orientation::Inward => (radius, true),
    };

    let mut placements = Vec::with_capacity(chars.len());
    let mut angle = start_angle - total_angle / 2.0;
    for (&ch, &advance) in chars.iter().zip(&advances) {
        let char_angle = (advance + spacing) / radius;
        placements.push(GlyphPlacement {
            ch,
            rotation: angle + char_angle / 2.0,
            radial_offset,
            mirrored,
        });
        angle += char_angle;
    }

    Ok(ArcLayout {
        placements,
        total_angle,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    /// Deterministic fake metrics: advance varies per character so ordering
    /// bugs cannot cancel out.
    struct StubMeasure;

    impl GlyphMeasure for StubMeasure {
        fn advance_width(&mut self, ch: char, font_size: f64) -> RingletResult<f64> {
            let scale = match ch {
                ' ' => 0.3,
                'i' | 'l' => 0.4,
                'm' | 'w' | 'M' | 'W' => 0.9,
                _ => 0.6,
            };
            Ok(font_size * scale)
        }
    }

    #[test]
    fn one_placement_per_character() {
        let layout = layout_arc("RING TEXT", 100.0, 0.0, 20.0, Orientation::Outward, &mut StubMeasure)
            .unwrap();
        assert_eq!(layout.placements.len(), "RING TEXT".chars().count());
    }

    #[test]
    fn slot_angles_sum_to_total_angle() {
        let font_size = 24.0;
        let radius = 150.0;
        let layout =
            layout_arc("abc def", radius, 1.0, font_size, Orientation::Outward, &mut StubMeasure)
                .unwrap();

        let mut measure = StubMeasure;
        let spacing = font_size * LETTER_SPACING_RATIO;
        let summed: f64 = "abc def"
            .chars()
            .map(|ch| (measure.advance_width(ch, font_size).unwrap() + spacing) / radius)
            .sum();
        assert!((summed - layout.total_angle).abs() < 1e-12);
    }

    #[test]
    fn text_is_centered_on_start_angle() {
        for text in ["abc", "abcd", "Mi lw M"] {
            let start = 0.7;
            let layout =
                layout_arc(text, 120.0, start, 18.0, Orientation::Outward, &mut StubMeasure)
                    .unwrap();

            let mid = layout.placements.len() / 2;
            let half_slot = layout.total_angle / (layout.placements.len() as f64);
            assert!(
                (layout.placements[mid].rotation - start).abs() <= half_slot,
                "midpoint glyph of {text:?} strayed from the start angle"
            );

            // The occupied span itself is symmetric about the start angle.
            let first = layout.placements.first().unwrap().rotation;
            let last = layout.placements.last().unwrap().rotation;
            assert!(((first + last) / 2.0 - start).abs() < 1e-9);
        }
    }

    #[test]
    fn inward_is_a_mirror_of_the_reversed_text() {
        let text = "STOP ICE";
        let reversed: String = text.chars().rev().collect();

        let inward =
            layout_arc(text, 90.0, PI, 16.0, Orientation::Inward, &mut StubMeasure).unwrap();
        let outward =
            layout_arc(&reversed, 90.0, PI, 16.0, Orientation::Outward, &mut StubMeasure).unwrap();

        assert_eq!(inward.placements.len(), outward.placements.len());
        assert!((inward.total_angle - outward.total_angle).abs() < 1e-12);
        for (a, b) in inward.placements.iter().zip(&outward.placements) {
            assert_eq!(a.ch, b.ch);
            assert!((a.rotation - b.rotation).abs() < 1e-12);
            assert_eq!(a.radial_offset, -b.radial_offset);
            assert!(a.mirrored);
            assert!(!b.mirrored);
        }
    }

    #[test]
    fn whitespace_keeps_its_advance() {
        let spaces = layout_arc("   ", 100.0, 0.0, 20.0, Orientation::Outward, &mut StubMeasure)
            .unwrap();
        assert_eq!(spaces.placements.len(), 3);
        assert!(spaces.total_angle > 0.0);
    }

    #[test]
    fn empty_text_is_not_an_error() {
        let layout =
            layout_arc("", 100.0, 0.0, 20.0, Orientation::Outward, &mut StubMeasure).unwrap();
        assert!(layout.placements.is_empty());
        assert_eq!(layout.total_angle, 0.0);
    }

    #[test]
    fn tiny_radius_is_permitted() {
        // Radius far below the font size: a tight curve, not an error.
        let layout =
            layout_arc("abc", 4.0, 0.0, 64.0, Orientation::Outward, &mut StubMeasure).unwrap();
        assert_eq!(layout.placements.len(), 3);
        assert!(layout.total_angle > 2.0 * PI);
    }

    #[test]
    fn invalid_geometry_fails_fast() {
        for (radius, size) in [(0.0, 10.0), (-5.0, 10.0), (f64::NAN, 10.0), (10.0, 0.0), (10.0, -1.0)]
        {
            let err = layout_arc("x", radius, 0.0, size, Orientation::Outward, &mut StubMeasure)
                .unwrap_err();
            assert!(
                matches!(err, RingletError::Geometry(_)),
                "expected geometry error for radius={radius}, size={size}"
            );
        }
    }
}
