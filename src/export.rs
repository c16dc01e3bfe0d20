use std::io::Cursor;
use std::path::Path;

use anyhow::Context;

use crate::error::{RingletError, RingletResult};
use crate::render_cpu::FrameRGBA;

/// Encode a finished frame as PNG bytes (lossless, alpha preserved).
pub fn encode_png(frame: &FrameRGBA) -> RingletResult<Vec<u8>> {
    let mut straight = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_in_place(&mut straight);
    }

    let img = image::RgbaImage::from_raw(frame.width, frame.height, straight)
        .ok_or_else(|| RingletError::export("frame buffer does not match its dimensions"))?;

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| RingletError::export(format!("png encode failed: {e}")))?;
    Ok(buf)
}

/// Encode and write a frame to `path`, creating parent directories.
pub fn write_png(frame: &FrameRGBA, path: &Path) -> RingletResult<()> {
    let bytes = encode_png(frame)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

/// Collision-avoiding default download name. The timestamp is supplied by
/// the caller so the library itself stays clock-free.
pub fn suggested_file_name(epoch_ms: u128) -> String {
    format!("photo-overlay-{epoch_ms}.png")
}

fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_round_trips_pixels_and_alpha() {
        let frame = FrameRGBA {
            width: 2,
            height: 1,
            // One opaque red pixel, one half-transparent green (premul).
            data: vec![255, 0, 0, 255, 0, 64, 0, 128],
            premultiplied: true,
        };

        let bytes = encode_png(&frame).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (2, 1));
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 255]);
        // Unpremultiplied back to straight alpha.
        let px = decoded.get_pixel(1, 0).0;
        assert_eq!(px[3], 128);
        assert!((px[1] as i32 - 127).abs() <= 1);
    }

    #[test]
    fn zero_alpha_pixels_encode_as_fully_transparent() {
        let frame = FrameRGBA {
            width: 1,
            height: 1,
            data: vec![12, 34, 56, 0],
            premultiplied: true,
        };
        let bytes = encode_png(&frame).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn suggested_name_embeds_the_timestamp() {
        assert_eq!(
            suggested_file_name(1_700_000_000_000),
            "photo-overlay-1700000000000.png"
        );
    }
}
