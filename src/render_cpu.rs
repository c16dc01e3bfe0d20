use std::sync::Arc;

use crate::bitmap::SourceBitmap;
use crate::color::ColorDef;
use crate::compose::{DrawOp, GlyphRunOp, RenderPlan};
use crate::error::{RingletError, RingletResult};

/// Finished frame: square, premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Premultiplied RGBA of the pixel at (x, y). Test/support helper;
    /// panics out of bounds like a slice index would.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }
}

/// Execute a plan against the source bitmap.
///
/// Two rasterization passes: photo + ring, then (after the optional disc
/// alpha mask, matching the original compositing order) the text pass,
/// composited with a premultiplied `over`. `font` is only consulted when the
/// plan contains glyph runs.
pub fn render_plan(
    plan: &RenderPlan,
    bitmap: &SourceBitmap,
    font: Option<&vello_cpu::peniko::FontData>,
) -> RingletResult<FrameRGBA> {
    let size: u16 = plan
        .canvas_size
        .try_into()
        .map_err(|_| RingletError::geometry("canvas size exceeds u16"))?;
    if size == 0 {
        return Err(RingletError::geometry("canvas size is zero"));
    }

    let image_paint = bitmap_to_image(bitmap)?;

    let mut dst = vello_cpu::Pixmap::new(size, size);
    clear_pixmap_to_transparent(&mut dst);
    let mut ctx = vello_cpu::RenderContext::new(size, size);
    for op in &plan.base {
        draw_op(&mut ctx, op, &image_paint, font)?;
    }
    ctx.flush();
    ctx.render_to_pixmap(&mut dst);

    if let Some(radius) = plan.mask_radius {
        let center = f64::from(plan.canvas_size) / 2.0;
        disc_mask_apply(
            dst.data_as_u8_slice_mut(),
            plan.canvas_size,
            center,
            center,
            radius,
        );
    }

    if !plan.text.is_empty() {
        // vello_cpu renders into a fresh buffer, so the text pass goes to a
        // temporary surface and is over-composited onto the masked base.
        let mut tmp = vello_cpu::Pixmap::new(size, size);
        clear_pixmap_to_transparent(&mut tmp);
        let mut ctx = vello_cpu::RenderContext::new(size, size);
        for op in &plan.text {
            draw_op(&mut ctx, op, &image_paint, font)?;
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut tmp);
        premul_over_in_place(dst.data_as_u8_slice_mut(), tmp.data_as_u8_slice())?;
    }

    Ok(FrameRGBA {
        width: plan.canvas_size,
        height: plan.canvas_size,
        data: dst.data_as_u8_slice().to_vec(),
        premultiplied: true,
    })
}

fn draw_op(
    ctx: &mut vello_cpu::RenderContext,
    op: &DrawOp,
    image_paint: &vello_cpu::Image,
    font: Option<&vello_cpu::peniko::FontData>,
) -> RingletResult<()> {
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

    match op {
        DrawOp::Image { transform, clip } => {
            if let Some(clip) = clip {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.push_clip_layer(&bezpath_to_cpu(clip));
            }
            ctx.set_transform(affine_to_cpu(*transform));
            ctx.set_paint(image_paint.clone());
            let (w, h) = image_paint_size(image_paint)?;
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
            if clip.is_some() {
                ctx.pop_layer();
            }
            Ok(())
        }
        DrawOp::FillPath { path, color } => {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(color_to_cpu(*color));
            ctx.fill_path(&bezpath_to_cpu(path));
            Ok(())
        }
        DrawOp::Glyphs(run) => {
            let font = font.ok_or_else(|| {
                RingletError::geometry("plan contains glyph runs but no font was supplied")
            })?;
            draw_glyph_run(ctx, run, font);
            Ok(())
        }
    }
}

fn draw_glyph_run(
    ctx: &mut vello_cpu::RenderContext,
    run: &GlyphRunOp,
    font: &vello_cpu::peniko::FontData,
) {
    ctx.set_transform(affine_to_cpu(run.transform));

    let glyphs = |r: &GlyphRunOp| {
        r.glyphs
            .iter()
            .map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            })
            .collect::<Vec<_>>()
    };

    // Outline first so the fill sits on top of it.
    ctx.set_stroke(
        vello_cpu::kurbo::Stroke::new(run.outline_width)
            .with_caps(vello_cpu::kurbo::Cap::Round)
            .with_join(vello_cpu::kurbo::Join::Round),
    );
    ctx.set_paint(color_to_cpu(run.outline));
    ctx.glyph_run(font)
        .font_size(run.font_size)
        .stroke_glyphs(glyphs(run).into_iter());

    ctx.set_paint(color_to_cpu(run.fill));
    ctx.glyph_run(font)
        .font_size(run.font_size)
        .fill_glyphs(glyphs(run).into_iter());
}

fn color_to_cpu(c: ColorDef) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: kurbo::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn clear_pixmap_to_transparent(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn bitmap_to_image(bitmap: &SourceBitmap) -> RingletResult<vello_cpu::Image> {
    let w: u16 = bitmap
        .width()
        .try_into()
        .map_err(|_| RingletError::geometry("bitmap width exceeds u16"))?;
    let h: u16 = bitmap
        .height()
        .try_into()
        .map_err(|_| RingletError::geometry("bitmap height exceeds u16"))?;

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(bitmap.width() as usize * bitmap.height() as usize);
    for px in bitmap.rgba8_premul().chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        });
    }

    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn image_paint_size(image: &vello_cpu::Image) -> RingletResult<(f64, f64)> {
    match &image.image {
        vello_cpu::ImageSource::Pixmap(p) => Ok((f64::from(p.width()), f64::from(p.height()))),
        vello_cpu::ImageSource::OpaqueId(_) => Err(RingletError::geometry(
            "cpu renderer does not support opaque image ids",
        )),
    }
}

/// Destination-in against an analytic disc: every premultiplied channel is
/// scaled by the pixel's disc coverage (1 inside, 0 outside, a one-pixel
/// anti-aliased edge at the boundary). Guarantees zero alpha everywhere
/// outside the outer circle.
fn disc_mask_apply(data: &mut [u8], size: u32, cx: f64, cy: f64, radius: f64) {
    for y in 0..size {
        let dy = (f64::from(y) + 0.5) - cy;
        let row = (y * size * 4) as usize;
        for x in 0..size {
            let dx = (f64::from(x) + 0.5) - cx;
            let dist = (dx * dx + dy * dy).sqrt();
            let coverage = (radius + 0.5 - dist).clamp(0.0, 1.0);
            if coverage >= 1.0 {
                continue;
            }
            let w = (coverage * 255.0).round() as u16;
            let idx = row + (x * 4) as usize;
            let px = &mut data[idx..idx + 4];
            px[0] = mul_div255_u8(u16::from(px[0]), w);
            px[1] = mul_div255_u8(u16::from(px[1]), w);
            px[2] = mul_div255_u8(u16::from(px[2]), w);
            px[3] = mul_div255_u8(u16::from(px[3]), w);
        }
    }
}

/// Premultiplied source-over: `dst = src + dst * (1 - src.a)`.
fn premul_over_in_place(dst: &mut [u8], src: &[u8]) -> RingletResult<()> {
    if dst.len() != src.len() {
        return Err(RingletError::geometry("composite surface size mismatch"));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let inv_a = 255 - u16::from(s[3]);
        d[0] = s[0].saturating_add(mul_div255_u8(u16::from(d[0]), inv_a));
        d[1] = s[1].saturating_add(mul_div255_u8(u16::from(d[1]), inv_a));
        d[2] = s[2].saturating_add(mul_div255_u8(u16::from(d[2]), inv_a));
        d[3] = s[3].saturating_add(mul_div255_u8(u16::from(d[3]), inv_a));
    }
    Ok(())
}

fn mul_div255_u8(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}
