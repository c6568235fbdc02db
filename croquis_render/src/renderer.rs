// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Token replay.

use core::f64::consts::FRAC_PI_2;
use std::sync::Arc;

use croquis_css::{font_families, parse_length, to_rgba};
use croquis_tokens::{Fill, FillRule, Image, Shape, Text, TextAlign, Token, check_balance};
use kurbo::{Affine, BezPath, Point, Rect, Shape as _};
use peniko::{BlendMode, Color, Compose};

use crate::blur::stack_blur;
use crate::capabilities::{Capabilities, CapabilityProbe, EngineFamily, VerticalText};
use crate::surface::{DrawOp, Layer, StateOp, Surface, TextRun};
use crate::{RenderError, device_pixels};

const PATH_TOLERANCE: f64 = 0.1;

/// Canvas size and host description for a render pass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderOptions {
    /// Canvas width in CSS pixels.
    pub width: f64,
    /// Canvas height in CSS pixels.
    pub height: f64,
    /// Device pixels per CSS pixel.
    pub scale: f64,
    /// Engine whose text metrics are imitated.
    pub engine: EngineFamily,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            scale: 1.0,
            engine: EngineFamily::default(),
        }
    }
}

impl RenderOptions {
    /// Canvas size in device pixels, rounded up.
    ///
    /// Returns `None` when either side is not a positive, representable size.
    pub fn device_size(&self) -> Option<(u32, u32)> {
        let width = device_pixels((self.width * self.scale).ceil())?;
        let height = device_pixels((self.height * self.scale).ceil())?;
        (width > 0 && height > 0).then_some((width, height))
    }
}

/// Lowers a token shape, anchored at `(x, y)`, to a path.
pub fn shape_path(shape: &Shape, x: f64, y: f64) -> BezPath {
    match shape {
        Shape::Rect { width, height } => {
            Rect::new(x, y, x + width, y + height).to_path(PATH_TOLERANCE)
        }
        Shape::Path(path) => path.to_bez_path(x, y),
    }
}

/// Replays sorted tokens onto a [`Surface`].
///
/// Scoped tokens map one to one onto surface state: effects become layers,
/// clips become clips, transforms become transforms. Stacking-context markers
/// are ignored; order has already been settled by the sorter.
#[derive(Debug)]
pub struct Renderer<'a, S> {
    surface: &'a mut S,
    options: RenderOptions,
    capabilities: Capabilities,
}

impl<'a, S: Surface> Renderer<'a, S> {
    /// Prepares to render onto `surface`, asking `probe` what it supports.
    pub fn new(surface: &'a mut S, probe: &dyn CapabilityProbe, options: RenderOptions) -> Self {
        let capabilities = probe.capabilities(surface);
        Self {
            surface,
            options,
            capabilities,
        }
    }

    /// Capabilities used for this pass.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Draws `tokens` in order.
    ///
    /// The stream must be balanced. Everything is drawn under a
    /// `scale`-by-`scale` transform.
    pub fn render(&mut self, tokens: &[Token]) -> Result<(), RenderError> {
        check_balance(tokens)?;
        self.surface
            .state(StateOp::PushTransform(Affine::scale(self.options.scale)));
        for token in tokens {
            self.token(token)?;
        }
        self.surface.state(StateOp::PopTransform);
        tracing::debug!(count = tokens.len(), "rendered tokens");
        Ok(())
    }

    fn token(&mut self, token: &Token) -> Result<(), RenderError> {
        match token {
            Token::StackingContext(_) | Token::EndStackingContext => {}
            Token::Effect(effect) => self.surface.state(StateOp::PushLayer(Layer {
                blend: effect.blend_mode.map(|mode| mode.to_peniko()),
                opacity: effect.opacity,
            })),
            Token::EndEffect => self.surface.state(StateOp::PopLayer),
            Token::Clip(clip) => self.surface.state(StateOp::PushClip {
                path: shape_path(&clip.shape, clip.x, clip.y),
                fill_rule: clip.shape.fill_rule(),
            }),
            Token::EndClip => self.surface.state(StateOp::PopClip),
            Token::Transform(transform) => self
                .surface
                .state(StateOp::PushTransform(transform.to_affine())),
            Token::EndTransform => self.surface.state(StateOp::PopTransform),
            Token::Fill(fill) => self.fill(fill)?,
            Token::Text(text) => self.text(text),
            Token::Image(image) => self.image(image),
        }
        Ok(())
    }

    fn fill(&mut self, fill: &Fill) -> Result<(), RenderError> {
        let Some(color) = color(&fill.color) else {
            return Ok(());
        };
        let path = shape_path(&fill.shape, fill.x, fill.y);
        let fill_rule = fill.shape.fill_rule();
        let radius = fill
            .filter
            .and_then(|filter| filter.blur_radius())
            .filter(|radius| *radius > 0.0);
        match radius {
            None => self.surface.draw(DrawOp::FillPath {
                path,
                fill_rule,
                color,
            }),
            Some(radius) if self.capabilities.native_blur => {
                self.surface.draw(DrawOp::FillBlurred {
                    path,
                    fill_rule,
                    color,
                    radius,
                });
            }
            Some(radius) => self.blurred_by_hand(path, fill_rule, color, radius)?,
        }
        Ok(())
    }

    /// Rasterizes the fill alone, stack-blurs it and draws the pixels back.
    fn blurred_by_hand(
        &mut self,
        path: BezPath,
        fill_rule: FillRule,
        color: Color,
        radius: f64,
    ) -> Result<(), RenderError> {
        let scale = self.options.scale;
        let pad = radius.ceil();
        let bounds = path.bounding_box().inflate(pad, pad);
        let (Some(width), Some(height)) = (
            device_pixels((bounds.width() * scale).ceil()),
            device_pixels((bounds.height() * scale).ceil()),
        ) else {
            return Ok(());
        };
        if width == 0 || height == 0 {
            return Ok(());
        }

        let into_buffer = Affine::scale(scale) * Affine::translate(-bounds.origin().to_vec2());
        let fill = DrawOp::FillPath {
            path,
            fill_rule,
            color,
        };
        let mut pixels = self.surface.rasterize(width, height, into_buffer, &[fill])?;
        stack_blur(&mut pixels, device_pixels((radius * scale).round()).unwrap_or(0));

        let rect = Rect::from_origin_size(
            bounds.origin(),
            (f64::from(width) / scale, f64::from(height) / scale),
        );
        self.surface.draw(DrawOp::DrawPixels {
            rect,
            pixels: Arc::new(pixels),
        });
        Ok(())
    }

    fn text(&mut self, text: &Text) {
        let content = text.prepared_text();
        if content.is_empty() {
            return;
        }
        let Some(color) = color(&text.color) else {
            return;
        };
        let letter_spacing = parse_length(&text.letter_spacing);
        let run = TextRun {
            text: content,
            families: font_families(&text.font),
            weight: font_weight(&text.font),
            font_size: text.font_size,
            letter_spacing: if letter_spacing.is_finite() {
                letter_spacing
            } else {
                0.0
            },
            color,
            origin: Point::ZERO,
            align: text.text_align,
            vertical: false,
        };

        if text.writing_mode.is_vertical() {
            self.vertical_text(text, run);
            return;
        }

        let x = text.text_align.anchor(text.x, text.width);
        let y = text.y + (text.height - text.font_size) / 2.0 + self.options.engine.text_offset();
        let placement = Affine::translate((x, y)) * Affine::scale_non_uniform(text.scale_x, 1.0);
        self.surface.state(StateOp::PushTransform(placement));
        self.surface.draw(DrawOp::FillText(run));
        self.surface.state(StateOp::PopTransform);

        self.decoration(text);
    }

    /// Vertical runs are anchored at the top of the run, centered on the line.
    fn vertical_text(&mut self, text: &Text, mut run: TextRun) {
        let anchor = Point::new(text.x + text.width / 2.0, text.y);
        match self.capabilities.vertical_text {
            VerticalText::Upright => {
                run.origin = anchor;
                run.vertical = true;
                self.surface.draw(DrawOp::FillText(run));
            }
            VerticalText::Rotated => {
                run.origin = Point::new(0.0, -text.font_size / 2.0);
                run.align = TextAlign::Left;
                let rotation = Affine::translate(anchor.to_vec2()) * Affine::rotate(FRAC_PI_2);
                self.surface.state(StateOp::PushTransform(rotation));
                self.surface.draw(DrawOp::FillText(run));
                self.surface.state(StateOp::PopTransform);
            }
        }
    }

    fn decoration(&mut self, text: &Text) {
        let Some(decoration) = &text.text_decoration else {
            return;
        };
        if decoration.overline || decoration.line_through {
            tracing::debug!("overline and line-through are not drawn");
        }
        if !decoration.underline {
            return;
        }
        let Some(color) = color(&decoration.color) else {
            return;
        };
        let y = text.y + text.height + self.options.engine.underline_offset();
        self.surface.draw(DrawOp::StrokeLine {
            from: Point::new(text.x, y),
            to: Point::new(text.x + text.width, y),
            width: decoration.thickness,
            color,
        });
    }

    fn image(&mut self, image: &Image) {
        let rect = Rect::new(
            image.x,
            image.y,
            image.x + image.width,
            image.y + image.height,
        );
        let area = rect.area();
        if area.is_nan() || area <= 0.0 {
            return;
        }
        let blend = image.blend_mode.map(|mode| mode.to_peniko());
        let draw = DrawOp::DrawImage {
            image: image.image.data.clone(),
            rect,
        };
        let fill_color = image.fill_color.as_deref().and_then(color);

        match (fill_color, blend) {
            (None, None) => self.surface.draw(draw),
            (None, Some(blend)) => {
                self.surface.state(StateOp::PushLayer(Layer::blended(blend)));
                self.surface.draw(draw);
                self.surface.state(StateOp::PopLayer);
            }
            (Some(fill_color), blend) => {
                // Flood the rect, then keep it only where the image is opaque.
                self.surface.state(StateOp::PushLayer(Layer {
                    blend,
                    opacity: None,
                }));
                self.surface.draw(DrawOp::FillPath {
                    path: rect.to_path(PATH_TOLERANCE),
                    fill_rule: FillRule::NonZero,
                    color: fill_color,
                });
                self.surface
                    .state(StateOp::PushLayer(Layer::blended(BlendMode::from(
                        Compose::DestIn,
                    ))));
                self.surface.draw(draw);
                self.surface.state(StateOp::PopLayer);
                self.surface.state(StateOp::PopLayer);
            }
        }
    }
}

/// Renders `tokens` onto `surface`. See [`Renderer`].
pub fn render<S: Surface>(
    tokens: &[Token],
    surface: &mut S,
    probe: &dyn CapabilityProbe,
    options: RenderOptions,
) -> Result<(), RenderError> {
    Renderer::new(surface, probe, options).render(tokens)
}

fn color(css: &str) -> Option<Color> {
    let color = to_rgba(css);
    if color.is_none() {
        tracing::warn!(color = css, "unsupported color, skipping draw");
    }
    color
}

/// The weight word of a `style variant weight size/1 family` shorthand.
fn font_weight(font: &str) -> u16 {
    match font.split_whitespace().nth(2) {
        Some("bold" | "bolder") => 700,
        Some("lighter") => 300,
        Some(word) => word.parse().unwrap_or(400),
        None => 400,
    }
}
