// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! What the host surface can do, and engine-specific corrections.

use std::sync::OnceLock;

use croquis_tokens::{FillRule, TextAlign};
use kurbo::{Affine, Point, Rect, Shape};
use peniko::Color;

use crate::surface::{DrawOp, Surface, TextRun};

/// Host rendering engine, for the empirical text baseline corrections.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum EngineFamily {
    /// Blink and derivatives.
    #[default]
    Chromium,
    /// WebKit and derivatives.
    Safari,
}

impl EngineFamily {
    /// Added to the vertically centered top of a text run.
    pub fn text_offset(self) -> f64 {
        match self {
            Self::Chromium => 1.0,
            Self::Safari => -1.0,
        }
    }

    /// Added to the bottom of a text run to place the underline.
    pub fn underline_offset(self) -> f64 {
        match self {
            Self::Chromium => -2.5,
            Self::Safari => 0.5,
        }
    }
}

/// How a surface handles [`TextRun::vertical`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum VerticalText {
    /// Glyphs are stacked top to bottom.
    #[default]
    Upright,
    /// The flag is ignored and runs come out horizontal, so the renderer
    /// rotates them itself.
    Rotated,
}

/// Detected surface features.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// [`DrawOp::FillBlurred`] actually blurs.
    pub native_blur: bool,
    /// Vertical text handling.
    pub vertical_text: VerticalText,
}

/// Source of [`Capabilities`] for a render pass.
pub trait CapabilityProbe {
    /// Capabilities of `surface`.
    fn capabilities(&self, surface: &mut dyn Surface) -> Capabilities;
}

/// A probe that always answers the same.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FixedCapabilities(pub Capabilities);

impl CapabilityProbe for FixedCapabilities {
    fn capabilities(&self, _surface: &mut dyn Surface) -> Capabilities {
        self.0
    }
}

/// A probe that runs [`detect`] once and remembers the answer.
#[derive(Debug, Default)]
pub struct DetectedCapabilities {
    cache: OnceLock<Capabilities>,
}

impl DetectedCapabilities {
    /// An empty cache.
    pub const fn new() -> Self {
        Self {
            cache: OnceLock::new(),
        }
    }

    /// The process-wide cache.
    pub fn shared() -> &'static Self {
        static SHARED: DetectedCapabilities = DetectedCapabilities::new();
        &SHARED
    }

    /// The cached answer, if detection has run.
    pub fn cached(&self) -> Option<Capabilities> {
        self.cache.get().copied()
    }
}

impl CapabilityProbe for DetectedCapabilities {
    fn capabilities(&self, surface: &mut dyn Surface) -> Capabilities {
        *self.cache.get_or_init(|| detect(surface))
    }
}

/// Probes `surface` with two tiny offscreen draws.
///
/// Blur: one white pixel is blurred in a 2x1 buffer; any alpha in its
/// neighbour means the filter works. Vertical text: a wide glyph pair is set
/// vertically just left of a 10x5 buffer; ink inside the buffer means the run
/// came out horizontal.
pub fn detect(surface: &mut dyn Surface) -> Capabilities {
    let capabilities = Capabilities {
        native_blur: detect_native_blur(surface),
        vertical_text: detect_vertical_text(surface),
    };
    tracing::debug!(?capabilities, "detected surface capabilities");
    capabilities
}

fn detect_native_blur(surface: &mut dyn Surface) -> bool {
    let probe = DrawOp::FillBlurred {
        path: Rect::new(1.0, 0.0, 2.0, 1.0).to_path(0.1),
        fill_rule: FillRule::NonZero,
        color: Color::WHITE,
        radius: 1.0,
    };
    match surface.rasterize(2, 1, Affine::IDENTITY, &[probe]) {
        Ok(pixels) => pixels.pixel(0, 0).is_some_and(|[.., a]| a != 0),
        Err(err) => {
            tracing::warn!(%err, "blur probe failed");
            false
        }
    }
}

fn detect_vertical_text(surface: &mut dyn Surface) -> VerticalText {
    let probe = DrawOp::FillText(TextRun {
        text: "鬼鬼".into(),
        families: vec![
            "Hiragino Kaku Gothic".into(),
            "Meiryo".into(),
            "sans-serif".into(),
        ],
        weight: 400,
        font_size: 10.0,
        letter_spacing: 0.0,
        color: Color::BLACK,
        origin: Point::new(-6.0, 0.0),
        align: TextAlign::Left,
        vertical: true,
    });
    match surface.rasterize(10, 5, Affine::IDENTITY, &[probe]) {
        Ok(pixels) if pixels.any_alpha_at_least(32) => VerticalText::Rotated,
        Ok(_) => VerticalText::Upright,
        Err(err) => {
            tracing::warn!(%err, "vertical text probe failed");
            VerticalText::Upright
        }
    }
}
