//! Ringlet renders circular "profile-ring" composites: a photograph masked
//! into a disc, a translucent colored ring inside or outside that disc, and
//! text laid out along arcs following the ring.
//!
//! The crate is organized the way the render path flows:
//!
//! - Load a validated [`SourceBitmap`] and a [`RenderParams`] bag into an
//!   [`Editor`]
//! - Every `render()` derives nothing new: [`CanvasGeometry`] was fixed at
//!   load, the compositor and arc-text layout are pure functions, and the
//!   CPU backend rasterizes the resulting plan into a [`FrameRGBA`]
//! - Hand the frame to [`export`] for lossless PNG output
#![forbid(unsafe_code)]

pub mod arc_text;
pub mod bitmap;
pub mod color;
pub mod compose;
pub mod error;
pub mod export;
pub mod geometry;
pub mod params;
pub mod render_cpu;
pub mod renderer;
pub mod text;

pub use arc_text::{ArcLayout, GlyphMeasure, GlyphPlacement, Orientation, layout_arc};
pub use bitmap::SourceBitmap;
pub use color::ColorDef;
pub use compose::{DrawOp, RenderPlan, RingMode, compose_ring};
pub use error::{RingletError, RingletResult};
pub use geometry::CanvasGeometry;
pub use params::{CaptionParams, CaptionVariant, RenderParams};
pub use render_cpu::{FrameRGBA, render_plan};
pub use renderer::{Editor, render_frame};
pub use text::TextShaper;
