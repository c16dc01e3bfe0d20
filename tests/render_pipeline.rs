use ringlet::{
    CanvasGeometry, ColorDef, RingMode, SourceBitmap, compose_ring, render_plan,
};

fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn digest_u64(bytes: &[u8]) -> u64 {
    let mut state = 0x9E37_79B9_7F4A_7C15u64;
    for chunk in bytes.chunks(8) {
        let mut v = 0u64;
        for (i, &b) in chunk.iter().enumerate() {
            v |= (b as u64) << (i * 8);
        }
        state = mix64(state ^ v);
    }
    state
}

fn solid_bitmap(width: u32, height: u32, rgba: [u8; 4]) -> SourceBitmap {
    let mut px = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..width * height {
        px.extend_from_slice(&rgba);
    }
    SourceBitmap::from_straight_rgba8(width, height, px).unwrap()
}

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: ColorDef = ColorDef::rgb(0, 0, 255);

fn channels_close(actual: [u8; 4], expected: [u8; 4], tolerance: u8) -> bool {
    actual
        .iter()
        .zip(expected.iter())
        .all(|(a, e)| a.abs_diff(*e) <= tolerance)
}

#[test]
fn geometry_for_800x600_source() {
    let g = CanvasGeometry::derive(800, 600).unwrap();
    assert_eq!(g.canvas_size, 1040);
    assert_eq!(g.ring_width, 120.0);
    assert_eq!(g.inner_radius, 400.0);
    assert_eq!(g.outer_radius, 520.0);
}

#[test]
fn outside_mode_center_pixel_comes_from_the_photo() {
    let bitmap = solid_bitmap(800, 600, RED);
    let g = CanvasGeometry::derive(800, 600).unwrap();
    let plan = compose_ring(800, 600, &g, BLUE, 0.94, RingMode::Outside);
    let frame = render_plan(&plan, &bitmap, None).unwrap();

    assert_eq!(frame.width, 1040);
    assert_eq!(frame.height, 1040);
    assert!(channels_close(frame.pixel(520, 520), RED, 2));
}

#[test]
fn ring_band_carries_ring_color_at_configured_opacity() {
    let bitmap = solid_bitmap(800, 600, RED);
    let g = CanvasGeometry::derive(800, 600).unwrap();
    let plan = compose_ring(800, 600, &g, BLUE, 0.94, RingMode::Outside);
    let frame = render_plan(&plan, &bitmap, None).unwrap();

    // Mid-band sample on the +x axis: 94% blue over transparent background,
    // premultiplied.
    let mid = frame.pixel(980, 520);
    let a = (255.0f64 * 0.94).round() as u8;
    assert!(
        channels_close(mid, [0, 0, a, a], 3),
        "mid-ring pixel {mid:?} is not 94% ring blue"
    );

    // Several pixels inside the inner radius (beyond anti-aliasing bleed)
    // the photo shows, not the ring.
    assert!(channels_close(frame.pixel(520 + 393, 520), RED, 2));
    // And several pixels into the band from the inner edge it is ring again.
    let band = frame.pixel(520 + 407, 520);
    assert!(channels_close(band, [0, 0, a, a], 3));
}

#[test]
fn outside_mode_is_transparent_beyond_the_outer_circle() {
    let bitmap = solid_bitmap(800, 600, RED);
    let g = CanvasGeometry::derive(800, 600).unwrap();
    let plan = compose_ring(800, 600, &g, BLUE, 0.94, RingMode::Outside);
    let frame = render_plan(&plan, &bitmap, None).unwrap();

    for (x, y) in [(0, 0), (1039, 0), (0, 1039), (1039, 1039), (2, 2)] {
        assert_eq!(frame.pixel(x, y), [0, 0, 0, 0], "corner ({x},{y}) not clear");
    }
}

#[test]
fn overlay_mode_blends_ring_over_photo_and_masks_corners() {
    let bitmap = solid_bitmap(800, 600, RED);
    let g = CanvasGeometry::derive(800, 600).unwrap();
    let plan = compose_ring(800, 600, &g, BLUE, 0.5, RingMode::Overlay);
    let frame = render_plan(&plan, &bitmap, None).unwrap();

    // Photo fills the inner disc untouched.
    assert!(channels_close(frame.pixel(520, 520), RED, 2));

    // In the band, 50% blue over opaque red: both channels present, fully
    // opaque.
    let mid = frame.pixel(980, 520);
    assert_eq!(mid[3], 255);
    assert!(mid[0] > 100 && mid[0] < 150, "red bleed-through {mid:?}");
    assert!(mid[2] > 100 && mid[2] < 150, "ring blue {mid:?}");

    // The full-bleed photo covered the corners, so only the mask can have
    // cleared them.
    for (x, y) in [(0, 0), (1039, 0), (0, 1039), (1039, 1039)] {
        assert_eq!(frame.pixel(x, y), [0, 0, 0, 0], "corner ({x},{y}) not masked");
    }
    // Just inside the outer circle on the axis the ring is still there.
    assert!(frame.pixel(1035, 520)[3] > 0);
}

#[test]
fn fully_transparent_ring_leaves_band_clear_in_outside_mode() {
    let bitmap = solid_bitmap(200, 200, RED);
    let g = CanvasGeometry::derive(200, 200).unwrap();
    let plan = compose_ring(200, 200, &g, BLUE, 0.0, RingMode::Outside);
    let frame = render_plan(&plan, &bitmap, None).unwrap();

    // canvas 260, inner radius 100; mid-band on the axis stays empty.
    assert_eq!(frame.pixel(245, 130), [0, 0, 0, 0]);
}

#[test]
fn identical_inputs_render_byte_identical_frames() {
    let bitmap = solid_bitmap(317, 211, [17, 130, 201, 255]);
    let g = CanvasGeometry::derive(317, 211).unwrap();
    for mode in [RingMode::Outside, RingMode::Overlay] {
        let plan = compose_ring(317, 211, &g, ColorDef::rgb(37, 71, 169), 0.94, mode);
        let a = render_plan(&plan, &bitmap, None).unwrap();
        let b = render_plan(&plan, &bitmap, None).unwrap();
        assert!(a.premultiplied);
        assert_eq!(digest_u64(&a.data), digest_u64(&b.data));
        assert!(a.data.iter().any(|&x| x != 0));
    }
}

#[test]
fn glyph_ops_without_a_font_are_rejected() {
    use ringlet::DrawOp;
    use ringlet::compose::GlyphRunOp;
    use ringlet::text::ShapedGlyph;

    let bitmap = solid_bitmap(64, 64, RED);
    let g = CanvasGeometry::derive(64, 64).unwrap();
    let mut plan = compose_ring(64, 64, &g, BLUE, 1.0, RingMode::Outside);
    plan.text.push(DrawOp::Glyphs(GlyphRunOp {
        transform: kurbo::Affine::IDENTITY,
        glyphs: vec![ShapedGlyph { id: 0, x: 0.0, y: 0.0 }],
        font_size: 12.0,
        fill: ColorDef::WHITE,
        outline: ColorDef::BLACK,
        outline_width: 2.0,
    }));

    let err = render_plan(&plan, &bitmap, None).unwrap_err();
    assert!(matches!(err, ringlet::RingletError::Geometry(_)));
}
