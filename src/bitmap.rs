use std::sync::Arc;

use anyhow::Context;

use crate::error::{RingletError, RingletResult};

/// Largest accepted encoded photo, in bytes.
pub const MAX_SOURCE_BYTES: usize = 10 * 1024 * 1024;

/// Largest accepted pixel dimension on either axis.
pub const MAX_SOURCE_DIM: u32 = 4096;

/// Decoded source photograph in premultiplied RGBA8.
///
/// Immutable once built; the editor replaces it wholesale on a new load and
/// drops it on reset. Cloning is cheap (the pixel buffer is shared).
#[derive(Clone, Debug)]
pub struct SourceBitmap {
    width: u32,
    height: u32,
    rgba8_premul: Arc<Vec<u8>>,
}

impl SourceBitmap {
    /// Decode an encoded raster photo (PNG, JPEG, and the other formats the
    /// `image` crate handles) and validate it against the size limits.
    pub fn from_encoded_bytes(bytes: &[u8]) -> RingletResult<Self> {
        if bytes.len() > MAX_SOURCE_BYTES {
            return Err(RingletError::validation(format!(
                "photo is {} bytes; the limit is {} bytes",
                bytes.len(),
                MAX_SOURCE_BYTES
            )));
        }

        let dyn_img = image::load_from_memory(bytes).context("decode photo from memory")?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut rgba8_premul = rgba.into_raw();
        premultiply_rgba8_in_place(&mut rgba8_premul);

        Self::from_premul_rgba8(width, height, rgba8_premul)
    }

    /// Build from straight-alpha RGBA8 pixels (row-major, 4 bytes per pixel).
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba8: Vec<u8>) -> RingletResult<Self> {
        premultiply_rgba8_in_place(&mut rgba8);
        Self::from_premul_rgba8(width, height, rgba8)
    }

    fn from_premul_rgba8(width: u32, height: u32, rgba8_premul: Vec<u8>) -> RingletResult<Self> {
        if width == 0 || height == 0 {
            return Err(RingletError::validation("photo has zero-sized dimensions"));
        }
        if width > MAX_SOURCE_DIM || height > MAX_SOURCE_DIM {
            return Err(RingletError::validation(format!(
                "photo is {width}x{height}; dimensions must be at most {MAX_SOURCE_DIM} on each axis"
            )));
        }
        if rgba8_premul.len() != (width as usize) * (height as usize) * 4 {
            return Err(RingletError::validation("pixel buffer length mismatch"));
        }

        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major premultiplied RGBA8 pixel bytes.
    pub fn rgba8_premul(&self) -> &[u8] {
        &self.rgba8_premul
    }
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
