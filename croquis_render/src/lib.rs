// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Croquis Render: replays paint tokens onto a drawing surface.
//!
//! The renderer is backend-agnostic. It lowers each [`Token`](croquis_tokens::Token)
//! to a small set of [`StateOp`]s and [`DrawOp`]s against the [`Surface`]
//! trait. Concrete rasterizers live in other crates (`croquis_render_vello_cpu`).
//!
//! Pieces:
//!
//! - [`Surface`], [`StateOp`], [`DrawOp`]: the seam a rasterizer implements.
//! - [`Renderer`] and [`render`]: token replay, text placement, image
//!   recoloring and the blur fallback.
//! - [`stack_blur`]: the linear-time blur used when a surface has no blur
//!   filter of its own.
//! - [`CapabilityProbe`]: how the renderer learns whether the surface blurs
//!   natively and whether it lays vertical text out itself.
//!   [`DetectedCapabilities`] asks the surface once per process;
//!   [`FixedCapabilities`] pins the answer.
//! - [`RecordingSurface`]: records operations with a state snapshot, for tests.
//!
//! # Example
//!
//! ```
//! use croquis_render::{
//!     DrawOp, FixedCapabilities, RecordingSurface, RenderOptions, render,
//! };
//! use croquis_tokens::{Fill, Shape, Token};
//!
//! let tokens = [Token::Fill(Fill {
//!     x: 0.0,
//!     y: 0.0,
//!     shape: Shape::Rect { width: 10.0, height: 10.0 },
//!     color: "rgb(255, 0, 0)".into(),
//!     filter: None,
//! })];
//!
//! let mut surface = RecordingSurface::new();
//! let options = RenderOptions { width: 10.0, height: 10.0, ..RenderOptions::default() };
//! render(&tokens, &mut surface, &FixedCapabilities::default(), options).unwrap();
//!
//! assert!(matches!(surface.draws().next(), Some((DrawOp::FillPath { .. }, _))));
//! ```

mod blur;
mod capabilities;
mod error;
mod recording;
mod renderer;
mod surface;

pub use blur::{MAX_RADIUS, stack_blur};
pub use capabilities::{
    Capabilities, CapabilityProbe, DetectedCapabilities, EngineFamily, FixedCapabilities,
    VerticalText, detect,
};
pub use error::RenderError;
pub use recording::{Event, RecordingSurface, StateSnapshot};
pub use renderer::{RenderOptions, Renderer, render, shape_path};
pub use surface::{DrawOp, Layer, Pixels, StateOp, Surface, TextRun};

/// Converts a non-negative, finite pixel count to `u32`.
pub(crate) fn device_pixels(value: f64) -> Option<u32> {
    if !(0.0..=f64::from(u32::MAX)).contains(&value) {
        return None;
    }
    #[allow(
        clippy::cast_possible_truncation,
        reason = "range is checked above"
    )]
    let pixels = value as u32;
    Some(pixels)
}
