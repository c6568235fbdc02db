// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Croquis Tokens: the paint-order token IR shared by the tokenizer and renderer.
//!
//! A DOM subtree is reduced to a flat, ordered list of [`Token`]s. Order is
//! paint order: the renderer replays the list front to back. Scoped tokens
//! come in pairs that must nest in strict LIFO order:
//!
//! - [`Token::StackingContext`] / [`Token::EndStackingContext`]
//! - [`Token::Clip`] / [`Token::EndClip`]
//! - [`Token::Transform`] / [`Token::EndTransform`]
//! - [`Token::Effect`] / [`Token::EndEffect`]
//!
//! Leaf tokens ([`Token::Fill`], [`Token::Text`], [`Token::Image`]) paint
//! pixels. All coordinates are CSS pixels relative to the tokenized root's
//! top-left corner, before any device scale.
//!
//! # Position in the stack
//!
//! - **Tokenizer**: walks a document and emits tokens (`croquis_tokenizer`).
//! - **Token IR (this crate)**: tokens, [`Path`] geometry, [`sort_by_z_index`],
//!   and [`check_balance`].
//! - **Renderer**: replays tokens onto a surface (`croquis_render`).
//!
//! # Example
//!
//! ```
//! use croquis_tokens::{BoxRect, Fill, Shape, Token, check_balance, geometry};
//!
//! let rect = BoxRect::new(0.0, 0.0, 100.0, 50.0);
//! let path = geometry::rounded_rect_path(rect, [10.0; 8]);
//! let tokens = vec![
//!     Token::Transform([1.0, 0.0, 0.0, 1.0, 8.0, 8.0].into()),
//!     Token::Fill(Fill {
//!         x: 0.0,
//!         y: 0.0,
//!         shape: Shape::Path(path),
//!         color: "red".into(),
//!         filter: None,
//!     }),
//!     Token::EndTransform,
//! ];
//! assert!(check_balance(&tokens).is_ok());
//! ```

mod balance;
pub mod geometry;
mod path;
mod sort;

use core::fmt;
use core::str::FromStr;
use std::sync::Arc;

use kurbo::Affine;
pub use peniko::{Fill as FillRule, ImageData};

pub use balance::{BalanceError, Scope, check_balance};
pub use geometry::{BoxRect, Radii};
pub use path::{Path, PathSegment};
pub use sort::sort_by_z_index;

/// One paint instruction.
///
/// The variant set is closed; each kind carries exactly the fields it needs.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// Opens an independent paint-order group.
    StackingContext(StackingContext),
    /// Closes the innermost [`Token::StackingContext`].
    EndStackingContext,
    /// Pushes a clip region.
    Clip(Clip),
    /// Pops the innermost clip region.
    EndClip,
    /// Pushes an affine transform.
    Transform(Transform),
    /// Pops the innermost transform.
    EndTransform,
    /// Pushes a composited layer.
    Effect(Effect),
    /// Pops and composites the innermost layer.
    EndEffect,
    /// Paints a flat color into a shape.
    Fill(Fill),
    /// Paints a run of text.
    Text(Box<Text>),
    /// Paints an image.
    Image(Image),
}

impl Token {
    /// The scope this token opens, if any.
    pub fn opens(&self) -> Option<Scope> {
        match self {
            Self::StackingContext(_) => Some(Scope::StackingContext),
            Self::Clip(_) => Some(Scope::Clip),
            Self::Transform(_) => Some(Scope::Transform),
            Self::Effect(_) => Some(Scope::Effect),
            _ => None,
        }
    }

    /// The scope this token closes, if any.
    pub fn closes(&self) -> Option<Scope> {
        match self {
            Self::EndStackingContext => Some(Scope::StackingContext),
            Self::EndClip => Some(Scope::Clip),
            Self::EndTransform => Some(Scope::Transform),
            Self::EndEffect => Some(Scope::Effect),
            _ => None,
        }
    }

    /// Short lowercase name of the token kind, as used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StackingContext(_) => "stackingContext",
            Self::EndStackingContext => "endStackingContext",
            Self::Clip(_) => "clip",
            Self::EndClip => "endClip",
            Self::Transform(_) => "transform",
            Self::EndTransform => "endTransform",
            Self::Effect(_) => "effect",
            Self::EndEffect => "endEffect",
            Self::Fill(_) => "fill",
            Self::Text(_) => "text",
            Self::Image(_) => "image",
        }
    }

    /// Returns the text payload if this is a text token.
    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the mutable text payload if this is a text token.
    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Marker for a stacking context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackingContext {
    /// Effective z-index of the group relative to its siblings.
    pub z_index: i32,
    /// Human-readable cause, e.g. `position: fixed`.
    pub reason: String,
    /// Whether the element truly isolates z ordering.
    ///
    /// Only isolated contexts open a group in [`sort_by_z_index`]; the others
    /// are markers that the sorter drops while keeping their contents in the
    /// enclosing group.
    pub isolated: bool,
}

/// Geometry of a clip or fill.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Axis-aligned rectangle anchored at the token's `x`/`y`.
    Rect {
        /// Width in CSS pixels.
        width: f64,
        /// Height in CSS pixels.
        height: f64,
    },
    /// Arbitrary path, offset by the token's `x`/`y`.
    Path(Path),
}

impl Shape {
    /// The fill rule used when the shape is filled or clipped.
    pub fn fill_rule(&self) -> FillRule {
        match self {
            Self::Rect { .. } => FillRule::NonZero,
            Self::Path(path) => path.fill_rule,
        }
    }
}

/// Clip region, in the current coordinate system.
#[derive(Clone, Debug, PartialEq)]
pub struct Clip {
    /// Horizontal offset of the shape.
    pub x: f64,
    /// Vertical offset of the shape.
    pub y: f64,
    /// Region to intersect with the current clip.
    pub shape: Shape,
}

/// A 2D affine transform as the six CSS `matrix(a, b, c, d, e, f)` values.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    /// `[a, b, c, d, e, f]`.
    pub matrix: [f64; 6],
}

impl Transform {
    /// A pure translation.
    pub fn translate(x: f64, y: f64) -> Self {
        Self {
            matrix: [1.0, 0.0, 0.0, 1.0, x, y],
        }
    }

    /// The equivalent [`Affine`].
    pub fn to_affine(self) -> Affine {
        Affine::new(self.matrix)
    }
}

impl From<[f64; 6]> for Transform {
    fn from(matrix: [f64; 6]) -> Self {
        Self { matrix }
    }
}

/// Opacity and blend mode for a composited layer.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Effect {
    /// Group opacity in `[0, 1]`.
    pub opacity: Option<f32>,
    /// Blend mode used to composite the group onto its backdrop.
    pub blend_mode: Option<BlendMode>,
}

impl Effect {
    /// True when neither opacity nor blend mode is set.
    pub fn is_empty(&self) -> bool {
        self.opacity.is_none() && self.blend_mode.is_none()
    }
}

/// Flat color fill.
#[derive(Clone, Debug, PartialEq)]
pub struct Fill {
    /// Horizontal offset of the shape.
    pub x: f64,
    /// Vertical offset of the shape.
    pub y: f64,
    /// Painted region.
    pub shape: Shape,
    /// CSS color string, as computed by the host.
    pub color: String,
    /// Optional filter applied to the painted shape.
    pub filter: Option<Filter>,
}

/// Filter applied to a fill.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Filter {
    /// Gaussian-like blur with the given radius in CSS pixels.
    Blur(f64),
}

impl Filter {
    /// Parses the CSS `blur(<length>px)` form.
    pub fn parse(value: &str) -> Option<Self> {
        let inner = value.trim().strip_prefix("blur(")?.strip_suffix(')')?;
        let number = inner.trim().trim_end_matches("px");
        number.parse::<f64>().ok().map(Self::Blur)
    }

    /// Blur radius, if this is a blur.
    pub fn blur_radius(self) -> Option<f64> {
        match self {
            Self::Blur(radius) => Some(radius),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blur(radius) => write!(f, "blur({radius}px)"),
        }
    }
}

/// CSS `mix-blend-mode` keywords other than `normal`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// `multiply`
    Multiply,
    /// `screen`
    Screen,
    /// `overlay`
    Overlay,
    /// `darken`
    Darken,
    /// `lighten`
    Lighten,
    /// `color-dodge`
    ColorDodge,
    /// `color-burn`
    ColorBurn,
    /// `hard-light`
    HardLight,
    /// `soft-light`
    SoftLight,
    /// `difference`
    Difference,
    /// `exclusion`
    Exclusion,
    /// `hue`
    Hue,
    /// `saturation`
    Saturation,
    /// `color`
    Color,
    /// `luminosity`
    Luminosity,
}

impl BlendMode {
    /// The CSS keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
            Self::Darken => "darken",
            Self::Lighten => "lighten",
            Self::ColorDodge => "color-dodge",
            Self::ColorBurn => "color-burn",
            Self::HardLight => "hard-light",
            Self::SoftLight => "soft-light",
            Self::Difference => "difference",
            Self::Exclusion => "exclusion",
            Self::Hue => "hue",
            Self::Saturation => "saturation",
            Self::Color => "color",
            Self::Luminosity => "luminosity",
        }
    }

    /// Maps to the equivalent source-over [`peniko::BlendMode`].
    pub fn to_peniko(self) -> peniko::BlendMode {
        use peniko::Mix;
        let mix = match self {
            Self::Multiply => Mix::Multiply,
            Self::Screen => Mix::Screen,
            Self::Overlay => Mix::Overlay,
            Self::Darken => Mix::Darken,
            Self::Lighten => Mix::Lighten,
            Self::ColorDodge => Mix::ColorDodge,
            Self::ColorBurn => Mix::ColorBurn,
            Self::HardLight => Mix::HardLight,
            Self::SoftLight => Mix::SoftLight,
            Self::Difference => Mix::Difference,
            Self::Exclusion => Mix::Exclusion,
            Self::Hue => Mix::Hue,
            Self::Saturation => Mix::Saturation,
            Self::Color => Mix::Color,
            Self::Luminosity => Mix::Luminosity,
        };
        peniko::BlendMode::new(mix, peniko::Compose::SrcOver)
    }
}

/// Error returned when a string is not a supported blend mode keyword.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unsupported blend mode `{0}`")]
pub struct UnknownBlendMode(pub String);

impl FromStr for BlendMode {
    type Err = UnknownBlendMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "multiply" => Self::Multiply,
            "screen" => Self::Screen,
            "overlay" => Self::Overlay,
            "darken" => Self::Darken,
            "lighten" => Self::Lighten,
            "color-dodge" => Self::ColorDodge,
            "color-burn" => Self::ColorBurn,
            "hard-light" => Self::HardLight,
            "soft-light" => Self::SoftLight,
            "difference" => Self::Difference,
            "exclusion" => Self::Exclusion,
            "hue" => Self::Hue,
            "saturation" => Self::Saturation,
            "color" => Self::Color,
            "luminosity" => Self::Luminosity,
            other => return Err(UnknownBlendMode(other.to_owned())),
        })
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Horizontal alignment of a text run inside its box.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    /// `start` and anything unrecognized.
    #[default]
    Start,
    /// `left`
    Left,
    /// `center`
    Center,
    /// `right`
    Right,
    /// `end`
    End,
}

impl TextAlign {
    /// Parses a computed `text-align` value.
    pub fn parse(value: &str) -> Self {
        match value {
            "left" => Self::Left,
            "center" | "-webkit-center" => Self::Center,
            "right" | "-webkit-right" => Self::Right,
            "end" => Self::End,
            _ => Self::Start,
        }
    }

    /// The horizontal anchor for a run spanning `x..x + width`.
    pub fn anchor(self, x: f64, width: f64) -> f64 {
        match self {
            Self::Start | Self::Left => x,
            Self::Center => x + width / 2.0,
            Self::Right | Self::End => x + width,
        }
    }
}

/// CSS `writing-mode`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum WritingMode {
    /// `horizontal-tb` and anything unrecognized.
    #[default]
    HorizontalTb,
    /// `vertical-rl`
    VerticalRl,
    /// `vertical-lr`
    VerticalLr,
}

impl WritingMode {
    /// Parses a computed `writing-mode` value.
    pub fn parse(value: &str) -> Self {
        match value {
            "vertical-rl" => Self::VerticalRl,
            "vertical-lr" => Self::VerticalLr,
            _ => Self::HorizontalTb,
        }
    }

    /// True for the vertical modes, where the inline axis is `y`.
    pub fn is_vertical(self) -> bool {
        matches!(self, Self::VerticalRl | Self::VerticalLr)
    }
}

/// Text decoration lines and their paint.
#[derive(Clone, Debug, PartialEq)]
pub struct TextDecoration {
    /// `underline` is set.
    pub underline: bool,
    /// `overline` is set.
    pub overline: bool,
    /// `line-through` is set.
    pub line_through: bool,
    /// Decoration color.
    pub color: String,
    /// Line thickness in CSS pixels.
    pub thickness: f64,
}

/// A run of text on a single line.
#[derive(Clone, Debug, PartialEq)]
pub struct Text {
    /// Left edge of the run.
    pub x: f64,
    /// Top edge of the run.
    pub y: f64,
    /// Width of the run, extended as characters are merged in.
    pub width: f64,
    /// Height of the first character's box.
    pub height: f64,
    /// Accumulated text.
    pub text: String,
    /// Fill color.
    pub color: String,
    /// Font shorthand: `style variant weight size/1 family`.
    pub font: String,
    /// Computed `font-kerning`.
    pub font_kerning: String,
    /// Computed `font-stretch`.
    pub font_stretch: String,
    /// Computed `font-variant-caps`.
    pub font_variant_caps: String,
    /// Computed `letter-spacing`.
    pub letter_spacing: String,
    /// Font size in CSS pixels.
    pub font_size: f64,
    /// Line height in CSS pixels; `NaN` for `normal`.
    pub line_height: f64,
    /// Horizontal alignment.
    pub text_align: TextAlign,
    /// Decoration, absent for `text-decoration-line: none`.
    pub text_decoration: Option<TextDecoration>,
    /// Computed `white-space`.
    pub white_space: String,
    /// Writing mode.
    pub writing_mode: WritingMode,
    /// Horizontal glyph stretch.
    pub scale_x: f64,
}

impl Text {
    /// Whether `white-space` keeps internal runs of whitespace.
    pub fn preserves_white_space(&self) -> bool {
        matches!(
            self.white_space.as_str(),
            "pre" | "pre-wrap" | "break-spaces" | "preserve-spaces"
        )
    }

    /// The text as it should be drawn.
    ///
    /// Preserved whitespace is only trimmed at both ends. Otherwise every
    /// run of whitespace, leading and trailing ones included, becomes a
    /// single space.
    pub fn prepared_text(&self) -> String {
        if self.preserves_white_space() {
            return self.text.trim().to_owned();
        }
        let mut out = String::with_capacity(self.text.len());
        let mut in_space = false;
        for ch in self.text.chars() {
            if ch.is_whitespace() {
                if !in_space {
                    out.push(' ');
                }
                in_space = true;
            } else {
                out.push(ch);
                in_space = false;
            }
        }
        out
    }
}

/// A decoded image shared between tokens.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageHandle {
    /// Source URL or path the image was loaded from.
    pub src: Arc<str>,
    /// Decoded pixels.
    pub data: ImageData,
}

impl ImageHandle {
    /// Intrinsic width in pixels.
    pub fn width(&self) -> u32 {
        self.data.width
    }

    /// Intrinsic height in pixels.
    pub fn height(&self) -> u32 {
        self.data.height
    }
}

/// Image draw.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    /// Left edge of the destination.
    pub x: f64,
    /// Top edge of the destination.
    pub y: f64,
    /// Destination width.
    pub width: f64,
    /// Destination height.
    pub height: f64,
    /// Source image.
    pub image: ImageHandle,
    /// Recolor the image's opaque pixels with this color.
    pub fill_color: Option<String>,
    /// Blend mode for this draw only.
    pub blend_mode: Option<BlendMode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(raw: &str, white_space: &str) -> Text {
        Text {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            text: raw.into(),
            color: "black".into(),
            font: String::new(),
            font_kerning: "auto".into(),
            font_stretch: "100%".into(),
            font_variant_caps: "normal".into(),
            letter_spacing: "normal".into(),
            font_size: 16.0,
            line_height: f64::NAN,
            text_align: TextAlign::Start,
            text_decoration: None,
            white_space: white_space.into(),
            writing_mode: WritingMode::HorizontalTb,
            scale_x: 1.0,
        }
    }

    #[test]
    fn filter_displays_and_parses_css_form() {
        let filter = Filter::Blur(10.0);
        assert_eq!(filter.to_string(), "blur(10px)");
        assert_eq!(Filter::parse("blur(10px)"), Some(filter));
        assert_eq!(Filter::parse("blur(2.5px)"), Some(Filter::Blur(2.5)));
        assert_eq!(Filter::parse("sepia(1)"), None);
    }

    #[test]
    fn blend_mode_keywords_round_trip() {
        for mode in [BlendMode::Multiply, BlendMode::SoftLight, BlendMode::Luminosity] {
            assert_eq!(mode.as_str().parse::<BlendMode>(), Ok(mode));
        }
        assert!("normal".parse::<BlendMode>().is_err());
        assert_eq!(
            BlendMode::Multiply.to_peniko(),
            peniko::BlendMode::new(peniko::Mix::Multiply, peniko::Compose::SrcOver)
        );
    }

    #[test]
    fn text_align_anchor() {
        assert_eq!(TextAlign::parse("left").anchor(10.0, 40.0), 10.0);
        assert_eq!(TextAlign::parse("center").anchor(10.0, 40.0), 30.0);
        assert_eq!(TextAlign::parse("right").anchor(10.0, 40.0), 50.0);
        assert_eq!(TextAlign::parse("justify").anchor(10.0, 40.0), 10.0);
    }

    #[test]
    fn whitespace_collapses_unless_preserved() {
        assert_eq!(text("  a \n\t b  ", "normal").prepared_text(), " a b ");
        assert_eq!(text("a  b ", "normal").prepared_text(), "a b ");
        assert_eq!(text("  a \n\t b  ", "pre-wrap").prepared_text(), "a \n\t b");
        assert_eq!(text(" x  y ", "break-spaces").prepared_text(), "x  y");
    }

    #[test]
    fn scope_tokens_report_their_kind() {
        let clip = Token::Clip(Clip {
            x: 0.0,
            y: 0.0,
            shape: Shape::Rect {
                width: 1.0,
                height: 1.0,
            },
        });
        assert_eq!(clip.opens(), Some(Scope::Clip));
        assert_eq!(Token::EndClip.closes(), Some(Scope::Clip));
        assert_eq!(Token::EndEffect.opens(), None);
        assert_eq!(Token::EndTransform.kind(), "endTransform");
    }
}
