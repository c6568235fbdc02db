// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Croquis on `vello_cpu`.
//!
//! [`VelloCpuSurface`] implements [`croquis_render::Surface`] on top of the
//! sparse-strips [`vello_cpu::RenderContext`]:
//!
//! - clips become clip layers and effects become composited layers,
//! - blurred fills use `vello_common`'s Gaussian blur filter, so the surface
//!   reports native blur,
//! - text is laid out one glyph per character from a [`FontBook`], with
//!   outlines read through `skrifa`; vertical runs are stacked top to bottom.
//!
//! Read the result back with [`VelloCpuSurface::into_rgba8`].
//!
//! ```
//! use croquis_render::{DrawOp, Surface};
//! use croquis_render_vello_cpu::VelloCpuSurface;
//! use kurbo::{Rect, Shape};
//! use peniko::{Color, Fill};
//!
//! let mut surface = VelloCpuSurface::new(4, 4).unwrap();
//! surface.draw(DrawOp::FillPath {
//!     path: Rect::new(0.0, 0.0, 4.0, 4.0).to_path(0.1),
//!     fill_rule: Fill::NonZero,
//!     color: Color::WHITE,
//! });
//! let rgba = surface.into_rgba8();
//! assert_eq!(&rgba[..4], &[255, 255, 255, 255]);
//! ```

#![deny(unsafe_code)]

mod fonts;
mod surface;
mod text;

pub use fonts::{FontBook, FontError};
pub use surface::VelloCpuSurface;
