use serde::{Deserialize, Serialize};

use crate::error::{RingletError, RingletResult};

/// Straight-alpha sRGB color as it appears on the configuration surface.
///
/// Serializes as `#RRGGBB` (or `#RRGGBBAA` when alpha is not opaque), the
/// only representation the parameter bag accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorDef {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ColorDef {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#RRGGBB` / `#RRGGBBAA`, leading `#` optional, case-insensitive.
    pub fn parse_hex(s: &str) -> RingletResult<Self> {
        let t = s.trim();
        let t = t.strip_prefix('#').unwrap_or(t);

        fn hex_byte(pair: &str) -> RingletResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| RingletError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        match t.len() {
            6 => Ok(Self {
                r: hex_byte(&t[0..2])?,
                g: hex_byte(&t[2..4])?,
                b: hex_byte(&t[4..6])?,
                a: 255,
            }),
            8 => Ok(Self {
                r: hex_byte(&t[0..2])?,
                g: hex_byte(&t[2..4])?,
                b: hex_byte(&t[4..6])?,
                a: hex_byte(&t[6..8])?,
            }),
            _ => Err(RingletError::validation(format!(
                "color \"{s}\" must be #RRGGBB or #RRGGBBAA"
            ))),
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Scale the alpha channel by `opacity` in `[0, 1]`.
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = (f64::from(self.a) * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// Outline color that keeps text legible against the photo: black behind
    /// white text, white behind everything else (ignoring alpha).
    pub fn contrast_outline(self) -> Self {
        if (self.r, self.g, self.b) == (255, 255, 255) {
            Self::BLACK
        } else {
            Self::WHITE
        }
    }
}

impl Serialize for ColorDef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ColorDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a), the pixel format the
/// whole render pipeline works in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }
}

impl From<ColorDef> for Rgba8Premul {
    fn from(c: ColorDef) -> Self {
        Self::from_straight_rgba(c.r, c.g, c.b, c.a)
    }
}
