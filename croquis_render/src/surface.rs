// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing-surface seam.

use std::sync::Arc;

use croquis_tokens::{FillRule, ImageData, TextAlign};
use kurbo::{Affine, BezPath, Point, Rect};
use peniko::{BlendMode, Blob, Color, ImageAlphaType, ImageFormat};

use crate::RenderError;

/// A composited layer pushed by [`StateOp::PushLayer`].
///
/// Contents are drawn with normal compositing inside the layer; `blend` and
/// `opacity` apply when the layer is composited into its parent.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Layer {
    /// Blend mode used when compositing into the parent.
    pub blend: Option<BlendMode>,
    /// Opacity (0-1) used when compositing into the parent.
    pub opacity: Option<f32>,
}

impl Layer {
    /// A layer composited with `blend` at full opacity.
    pub fn blended(blend: BlendMode) -> Self {
        Self {
            blend: Some(blend),
            opacity: None,
        }
    }
}

/// State operations. Each push is matched by the corresponding pop.
#[derive(Clone, Debug, PartialEq)]
pub enum StateOp {
    /// Intersect the clip with a path, in the current coordinate system.
    PushClip {
        /// Clip geometry.
        path: BezPath,
        /// Rule deciding the inside of `path`.
        fill_rule: FillRule,
    },
    /// Restore the clip saved by the matching [`StateOp::PushClip`].
    PopClip,
    /// Post-multiply the current transform.
    PushTransform(Affine),
    /// Restore the transform saved by the matching [`StateOp::PushTransform`].
    PopTransform,
    /// Start an offscreen layer.
    PushLayer(Layer),
    /// Composite the innermost layer into its parent.
    PopLayer,
}

/// A run of text ready to be laid out by the surface.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    /// Text to draw, whitespace already normalized.
    pub text: String,
    /// Family names in preference order.
    pub families: Vec<String>,
    /// Numeric font weight.
    pub weight: u16,
    /// Em size in CSS pixels.
    pub font_size: f64,
    /// Extra advance after each glyph.
    pub letter_spacing: f64,
    /// Text color.
    pub color: Color,
    /// Anchor point.
    ///
    /// For horizontal runs this is the top of the em box at the aligned edge.
    /// For vertical runs it is the top of the run, centered on the line.
    pub origin: Point,
    /// Which edge of a horizontal run sits at `origin.x`.
    pub align: TextAlign,
    /// Stack glyphs top to bottom instead of left to right.
    pub vertical: bool,
}

/// Premultiplied RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pixels {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8 data.
    pub data: Vec<u8>,
}

impl Pixels {
    /// A transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    /// The RGBA value at `(x, y)`, or `None` out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Whether any pixel has alpha of at least `threshold`.
    pub fn any_alpha_at_least(&self, threshold: u8) -> bool {
        self.data.chunks_exact(4).any(|px| px[3] >= threshold)
    }

    /// Wraps the pixels as premultiplied image data.
    pub fn to_image_data(&self) -> ImageData {
        ImageData {
            data: Blob::from(self.data.clone()),
            format: ImageFormat::Rgba8,
            alpha_type: ImageAlphaType::AlphaPremultiplied,
            width: self.width,
            height: self.height,
        }
    }
}

/// Draw operations, interpreted under the current state.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Fill a path with a solid color.
    FillPath {
        /// Geometry.
        path: BezPath,
        /// Rule deciding the inside of `path`.
        fill_rule: FillRule,
        /// Fill color.
        color: Color,
    },
    /// Fill a path through a Gaussian blur filter.
    ///
    /// Only issued when the surface reports native blur support. A surface
    /// without a blur filter draws it sharp.
    FillBlurred {
        /// Geometry.
        path: BezPath,
        /// Rule deciding the inside of `path`.
        fill_rule: FillRule,
        /// Fill color.
        color: Color,
        /// Standard deviation of the blur, in CSS pixels.
        radius: f64,
    },
    /// Draw an image scaled into a rectangle.
    DrawImage {
        /// Decoded image.
        image: ImageData,
        /// Destination.
        rect: Rect,
    },
    /// Draw a text run.
    FillText(TextRun),
    /// Stroke a straight line with butt caps.
    StrokeLine {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
        /// Line width.
        width: f64,
        /// Stroke color.
        color: Color,
    },
    /// Draw premultiplied pixels scaled into a rectangle.
    DrawPixels {
        /// Destination.
        rect: Rect,
        /// Source pixels.
        pixels: Arc<Pixels>,
    },
}

/// A 2D drawing surface that tokens are replayed onto.
///
/// This is the renderer's only view of the host. State is scoped: every push
/// is matched by a pop in LIFO order.
pub trait Surface {
    /// Apply a state operation.
    fn state(&mut self, op: StateOp);

    /// Apply a draw operation.
    fn draw(&mut self, op: DrawOp);

    /// Draws `ops` into a fresh, isolated buffer and returns its pixels.
    ///
    /// The buffer is `width` by `height` device pixels and `transform` maps
    /// the ops' coordinates into it. Nothing touches this surface.
    fn rasterize(
        &mut self,
        width: u32,
        height: u32,
        transform: Affine,
        ops: &[DrawOp],
    ) -> Result<Pixels, RenderError>;
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn state(&mut self, op: StateOp) {
        (**self).state(op);
    }

    fn draw(&mut self, op: DrawOp) {
        (**self).draw(op);
    }

    fn rasterize(
        &mut self,
        width: u32,
        height: u32,
        transform: Affine,
        ops: &[DrawOp],
    ) -> Result<Pixels, RenderError> {
        (**self).rasterize(width, height, transform, ops)
    }
}
