// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;
use std::sync::Arc;

use croquis_render::{DrawOp, Layer, Pixels, RenderError, StateOp, Surface, TextRun};
use kurbo::{Affine, BezPath, Cap, Point, Rect, Stroke};
use peniko::{Color, Fill, ImageData, ImageSampler};
use skrifa::FontRef;
use vello_common::filter_effects::{EdgeMode, Filter, FilterPrimitive};
use vello_cpu::{Image, ImageSource, Pixmap, RenderContext, RenderMode, RenderSettings};

use crate::fonts::FontBook;
use crate::text::run_path;

/// A [`Surface`] that rasterizes on the CPU with `vello_cpu`.
///
/// Coordinates are device pixels; the renderer pushes its own scale.
pub struct VelloCpuSurface {
    ctx: RenderContext,
    width: u16,
    height: u16,
    fonts: Arc<FontBook>,
    transform: Affine,
    transforms: Vec<Affine>,
    /// Open `vello_cpu` layers, clips included.
    layers: usize,
}

impl fmt::Debug for VelloCpuSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VelloCpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("transform", &self.transform)
            .field("layers", &self.layers)
            .finish_non_exhaustive()
    }
}

impl VelloCpuSurface {
    /// A transparent surface without fonts.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        Self::with_fonts(width, height, Arc::default())
    }

    /// A transparent surface drawing text from `fonts`.
    ///
    /// Fails with [`RenderError::MissingContext`] when either side is zero
    /// or larger than `u16::MAX`.
    pub fn with_fonts(width: u32, height: u32, fonts: Arc<FontBook>) -> Result<Self, RenderError> {
        let size = u16::try_from(width)
            .ok()
            .zip(u16::try_from(height).ok())
            .filter(|&(w, h)| w > 0 && h > 0);
        let Some((w, h)) = size else {
            return Err(RenderError::MissingContext {
                width: f64::from(width),
                height: f64::from(height),
            });
        };
        let settings = RenderSettings {
            render_mode: RenderMode::OptimizeSpeed,
            ..RenderSettings::default()
        };
        Ok(Self {
            ctx: RenderContext::new_with(w, h, settings),
            width: w,
            height: h,
            fonts,
            transform: Affine::IDENTITY,
            transforms: Vec::new(),
            layers: 0,
        })
    }

    /// Width in device pixels.
    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    /// Height in device pixels.
    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    /// The fonts text is drawn with.
    pub fn fonts(&self) -> &Arc<FontBook> {
        &self.fonts
    }

    /// Premultiplied pixels of everything drawn so far.
    pub fn to_pixels(&mut self) -> Pixels {
        let pixmap = self.pixmap();
        Pixels {
            width: self.width(),
            height: self.height(),
            data: pixmap.data_as_u8_slice().to_vec(),
        }
    }

    /// Unpremultiplied, row-major RGBA8 pixels.
    pub fn into_rgba8(mut self) -> Vec<u8> {
        self.pixmap()
            .take_unpremultiplied()
            .into_iter()
            .flat_map(|p| [p.r, p.g, p.b, p.a])
            .collect()
    }

    fn pixmap(&mut self) -> Pixmap {
        let mut pixmap = Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        pixmap
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
        self.ctx.set_transform(transform);
    }

    fn pop_layer(&mut self, what: &str) {
        if self.layers == 0 {
            tracing::warn!(what, "pop without a matching push; ignored");
            return;
        }
        self.layers -= 1;
        self.ctx.pop_layer();
    }

    fn fill(&mut self, path: &BezPath, fill_rule: Fill, color: Color) {
        self.ctx.set_fill_rule(fill_rule);
        self.ctx.set_paint(color);
        self.ctx.fill_path(path);
    }

    fn blurred(&mut self, path: &BezPath, fill_rule: Fill, color: Color, radius: f64) {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "blur radii are small CSS pixel values"
        )]
        let std_deviation = radius as f32;
        let filter = Filter::from_primitive(FilterPrimitive::GaussianBlur {
            std_deviation,
            edge_mode: EdgeMode::None,
        });
        self.ctx.push_layer(None, None, None, None, Some(filter));
        self.fill(path, fill_rule, color);
        self.ctx.pop_layer();
    }

    fn image(&mut self, image: &ImageData, rect: Rect) {
        if image.width == 0 || image.height == 0 || rect.is_zero_area() {
            return;
        }
        let (iw, ih) = (f64::from(image.width), f64::from(image.height));
        let local = Affine::translate(rect.origin().to_vec2())
            * Affine::scale_non_uniform(rect.width() / iw, rect.height() / ih);
        self.ctx.set_transform(self.transform * local);
        self.ctx.set_paint(Image {
            image: ImageSource::from_peniko_image_data(image),
            sampler: ImageSampler::default(),
        });
        self.ctx.fill_rect(&Rect::new(0.0, 0.0, iw, ih));
        self.ctx.set_transform(self.transform);
    }

    fn line(&mut self, from: Point, to: Point, width: f64, color: Color) {
        let mut path = BezPath::new();
        path.move_to(from);
        path.line_to(to);
        self.ctx.set_stroke(Stroke::new(width).with_caps(Cap::Butt));
        self.ctx.set_paint(color);
        self.ctx.stroke_path(&path);
    }

    fn text(&mut self, run: &TextRun) {
        let fonts = Arc::clone(&self.fonts);
        let Some(data) = fonts.resolve(&run.families, run.weight) else {
            tracing::warn!(families = ?run.families, "no font for text run; skipped");
            return;
        };
        let font = match FontRef::new(data.data()) {
            Ok(font) => font,
            Err(err) => {
                tracing::warn!(%err, "unreadable font; text run skipped");
                return;
            }
        };
        let path = run_path(&font, run);
        self.fill(&path, Fill::NonZero, run.color);
    }
}

impl Surface for VelloCpuSurface {
    fn state(&mut self, op: StateOp) {
        match op {
            StateOp::PushClip { path, fill_rule } => {
                self.ctx.set_fill_rule(fill_rule);
                self.ctx.push_clip_layer(&path);
                self.layers += 1;
            }
            StateOp::PushLayer(Layer { blend, opacity }) => {
                self.ctx.push_layer(None, blend, opacity, None, None);
                self.layers += 1;
            }
            StateOp::PopClip => self.pop_layer("clip"),
            StateOp::PopLayer => self.pop_layer("layer"),
            StateOp::PushTransform(transform) => {
                self.transforms.push(self.transform);
                self.set_transform(self.transform * transform);
            }
            StateOp::PopTransform => {
                let restored = self.transforms.pop().unwrap_or(Affine::IDENTITY);
                self.set_transform(restored);
            }
        }
    }

    fn draw(&mut self, op: DrawOp) {
        match op {
            DrawOp::FillPath {
                path,
                fill_rule,
                color,
            } => self.fill(&path, fill_rule, color),
            DrawOp::FillBlurred {
                path,
                fill_rule,
                color,
                radius,
            } => self.blurred(&path, fill_rule, color, radius),
            DrawOp::DrawImage { image, rect } => self.image(&image, rect),
            DrawOp::FillText(run) => self.text(&run),
            DrawOp::StrokeLine {
                from,
                to,
                width,
                color,
            } => self.line(from, to, width, color),
            DrawOp::DrawPixels { rect, pixels } => self.image(&pixels.to_image_data(), rect),
        }
    }

    fn rasterize(
        &mut self,
        width: u32,
        height: u32,
        transform: Affine,
        ops: &[DrawOp],
    ) -> Result<Pixels, RenderError> {
        let mut buffer = Self::with_fonts(width, height, Arc::clone(&self.fonts))?;
        buffer.state(StateOp::PushTransform(transform));
        for op in ops {
            buffer.draw(op.clone());
        }
        buffer.state(StateOp::PopTransform);
        Ok(buffer.to_pixels())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use croquis_render::{VerticalText, detect};
    use croquis_tokens::TextAlign;
    use kurbo::Shape;
    use peniko::{BlendMode, Compose};

    use crate::fonts::tests::dejavu;

    const RED: Color = Color::from_rgb8(255, 0, 0);

    fn rgba(bytes: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * width + x) * 4) as usize;
        [bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
        Rect::new(x0, y0, x1, y1).to_path(0.1)
    }

    fn fill(path: BezPath, color: Color) -> DrawOp {
        DrawOp::FillPath {
            path,
            fill_rule: Fill::NonZero,
            color,
        }
    }

    #[test]
    fn rejects_unusable_sizes() {
        assert!(matches!(
            VelloCpuSurface::new(0, 10),
            Err(RenderError::MissingContext { width, .. }) if width == 0.0
        ));
        assert!(matches!(
            VelloCpuSurface::new(10, 70_000),
            Err(RenderError::MissingContext { height, .. }) if height == 70_000.0
        ));
    }

    #[test]
    fn fills_under_the_current_transform() {
        let mut surface = VelloCpuSurface::new(10, 10).expect("surface");
        surface.state(StateOp::PushTransform(Affine::translate((5.0, 0.0))));
        surface.draw(fill(rect(0.0, 0.0, 5.0, 10.0), RED));
        surface.state(StateOp::PopTransform);
        let bytes = surface.into_rgba8();

        assert_eq!(rgba(&bytes, 10, 7, 5), [255, 0, 0, 255], "moved right");
        assert_eq!(rgba(&bytes, 10, 2, 5), [0, 0, 0, 0], "left half untouched");
    }

    #[test]
    fn clips_restrict_and_pop() {
        let mut surface = VelloCpuSurface::new(10, 10).expect("surface");
        surface.state(StateOp::PushClip {
            path: rect(0.0, 0.0, 5.0, 10.0),
            fill_rule: Fill::NonZero,
        });
        surface.draw(fill(rect(0.0, 0.0, 10.0, 5.0), RED));
        surface.state(StateOp::PopClip);
        surface.draw(fill(rect(0.0, 5.0, 10.0, 10.0), Color::BLACK));
        let bytes = surface.into_rgba8();

        assert_eq!(rgba(&bytes, 10, 2, 2), [255, 0, 0, 255], "inside the clip");
        assert_eq!(rgba(&bytes, 10, 7, 2)[3], 0, "outside the clip");
        assert_eq!(rgba(&bytes, 10, 7, 7), [0, 0, 0, 255], "clip is gone");
    }

    #[test]
    fn layers_apply_opacity_once() {
        let mut surface = VelloCpuSurface::new(4, 4).expect("surface");
        surface.state(StateOp::PushLayer(Layer {
            blend: None,
            opacity: Some(0.5),
        }));
        surface.draw(fill(rect(0.0, 0.0, 4.0, 4.0), RED));
        surface.draw(fill(rect(0.0, 0.0, 4.0, 4.0), RED));
        surface.state(StateOp::PopLayer);
        let alpha = rgba(&surface.into_rgba8(), 4, 1, 1)[3];
        assert!(alpha.abs_diff(128) <= 2, "half opacity, got {alpha}");
    }

    #[test]
    fn unmatched_pops_are_ignored() {
        let mut surface = VelloCpuSurface::new(2, 2).expect("surface");
        surface.state(StateOp::PopLayer);
        surface.state(StateOp::PopClip);
        surface.state(StateOp::PopTransform);
        surface.draw(fill(rect(0.0, 0.0, 2.0, 2.0), RED));
        assert_eq!(rgba(&surface.into_rgba8(), 2, 1, 1), [255, 0, 0, 255]);
    }

    #[test]
    fn images_and_pixels_fill_their_rect() {
        let mut blue = Pixels::new(1, 1);
        blue.data.copy_from_slice(&[0, 0, 255, 255]);
        let mut surface = VelloCpuSurface::new(8, 8).expect("surface");
        surface.draw(DrawOp::DrawImage {
            image: blue.to_image_data(),
            rect: Rect::new(0.0, 0.0, 4.0, 4.0),
        });
        surface.draw(DrawOp::DrawPixels {
            rect: Rect::new(4.0, 4.0, 8.0, 8.0),
            pixels: Arc::new(blue),
        });
        let bytes = surface.into_rgba8();

        assert_eq!(rgba(&bytes, 8, 2, 2), [0, 0, 255, 255], "image");
        assert_eq!(rgba(&bytes, 8, 6, 6), [0, 0, 255, 255], "pixels");
        assert_eq!(rgba(&bytes, 8, 6, 1)[3], 0, "nothing between");
    }

    #[test]
    fn dest_in_layer_keeps_image_coverage() {
        let mut mask = Pixels::new(2, 1);
        mask.data.copy_from_slice(&[255, 255, 255, 255, 0, 0, 0, 0]);
        let mut surface = VelloCpuSurface::new(2, 1).expect("surface");
        surface.state(StateOp::PushLayer(Layer::default()));
        surface.draw(fill(rect(0.0, 0.0, 2.0, 1.0), RED));
        surface.state(StateOp::PushLayer(Layer::blended(BlendMode::from(
            Compose::DestIn,
        ))));
        surface.draw(DrawOp::DrawImage {
            image: mask.to_image_data(),
            rect: Rect::new(0.0, 0.0, 2.0, 1.0),
        });
        surface.state(StateOp::PopLayer);
        surface.state(StateOp::PopLayer);
        let bytes = surface.into_rgba8();

        assert_eq!(rgba(&bytes, 2, 0, 0), [255, 0, 0, 255], "recolored");
        assert_eq!(rgba(&bytes, 2, 1, 0)[3], 0, "masked out");
    }

    #[test]
    fn underline_strokes_have_butt_caps() {
        let mut surface = VelloCpuSurface::new(10, 10).expect("surface");
        surface.draw(DrawOp::StrokeLine {
            from: Point::new(2.0, 5.0),
            to: Point::new(8.0, 5.0),
            width: 2.0,
            color: Color::BLACK,
        });
        let bytes = surface.into_rgba8();
        assert_eq!(rgba(&bytes, 10, 5, 4)[3], 255, "covered row");
        assert_eq!(rgba(&bytes, 10, 1, 4)[3], 0, "no cap past the start");
        assert_eq!(rgba(&bytes, 10, 5, 7)[3], 0, "thin line");
    }

    #[test]
    fn blurs_natively_and_lays_out_vertical_text() {
        let mut surface = VelloCpuSurface::new(4, 4).expect("surface");
        let capabilities = detect(&mut surface);
        assert!(capabilities.native_blur, "GaussianBlur filter spreads ink");
        assert_eq!(capabilities.vertical_text, VerticalText::Upright);
        assert_eq!(
            surface.into_rgba8(),
            vec![0; 64],
            "probes never touch the surface"
        );
    }

    #[test]
    fn text_needs_a_font() {
        let run = TextRun {
            text: "Hi".into(),
            families: vec!["DejaVu Sans".into()],
            weight: 400,
            font_size: 24.0,
            letter_spacing: 0.0,
            color: Color::BLACK,
            origin: Point::new(2.0, 2.0),
            align: TextAlign::Left,
            vertical: false,
        };
        let mut bare = VelloCpuSurface::new(40, 30).expect("surface");
        bare.draw(DrawOp::FillText(run.clone()));
        assert!(!bare.to_pixels().any_alpha_at_least(1), "skipped");

        let Some((regular, _)) = dejavu() else {
            return;
        };
        let mut fonts = FontBook::new();
        fonts.insert("DejaVu Sans", regular).expect("valid font");
        let mut surface = VelloCpuSurface::with_fonts(40, 30, Arc::new(fonts)).expect("surface");
        surface.draw(DrawOp::FillText(run));
        assert!(surface.to_pixels().any_alpha_at_least(255), "solid ink");
    }
}
