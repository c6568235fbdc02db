// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Box decoration: background, borders, shadows and images.
//!
//! An inline element that wraps produces one client rect per line. Its
//! decoration is laid out once on a *virtual rect* that lines those rects up
//! end to end along the inline axis, then drawn per line by clipping to the
//! line's rect and shifting the virtual rect back by the inline extent of the
//! lines before it.

use croquis_css::{
    BoxShadow, ShadowPosition, is_transparent, parse_background_url, parse_border_radius_value,
    parse_box_shadow, parse_color, parse_length,
};
use croquis_tokens::geometry::{
    clamp_radii, composite_path, offset_radius, offset_rect, polygon_path, rect_path,
    rounded_rect_path,
};
use croquis_tokens::{
    BoxRect, Clip, Fill, FillRule, Filter, Image, ImageHandle, Path, Radii, Shape, Token,
    Transform, WritingMode,
};

use crate::document::Document;
use crate::error::TokenizeError;
use crate::loader::{ImageLoader, abbreviate};
use crate::style::ComputedStyle;

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

/// Maps between the inline/cross axes of a writing mode and physical x/y.
#[derive(Copy, Clone, Debug)]
struct Axis {
    vertical: bool,
}

impl Axis {
    fn inline_pos(self, rect: BoxRect) -> f64 {
        if self.vertical { rect.y } else { rect.x }
    }

    fn inline_len(self, rect: BoxRect) -> f64 {
        if self.vertical { rect.height } else { rect.width }
    }

    fn cross_pos(self, rect: BoxRect) -> f64 {
        if self.vertical { rect.x } else { rect.y }
    }

    fn cross_len(self, rect: BoxRect) -> f64 {
        if self.vertical { rect.width } else { rect.height }
    }

    /// Physical `(x, y)` of an inline/cross coordinate pair.
    fn point(self, inline: f64, cross: f64) -> (f64, f64) {
        if self.vertical {
            (cross, inline)
        } else {
            (inline, cross)
        }
    }

    fn rect(self, inline: f64, cross: f64, inline_len: f64, cross_len: f64) -> BoxRect {
        if self.vertical {
            BoxRect::new(cross, inline, cross_len, inline_len)
        } else {
            BoxRect::new(inline, cross, inline_len, cross_len)
        }
    }
}

/// One resolved border side. A width of 0 means the side is not drawn.
#[derive(Clone, Debug, PartialEq)]
struct Border {
    width: f64,
    color: String,
}

impl Border {
    fn read(style: &ComputedStyle, side: &str) -> Self {
        let line = style.get(&format!("border-{side}-style"));
        let width = parse_length(style.get(&format!("border-{side}-width")));
        let color = style.get(&format!("border-{side}-color"));
        if line == "none" || width.is_nan() || width <= 0.0 || is_transparent(color) {
            return Self {
                width: 0.0,
                color: String::new(),
            };
        }
        Self {
            width,
            color: color.to_owned(),
        }
    }
}

/// Outlines of the virtual rect.
#[derive(Clone, Debug)]
struct BoxGeometry {
    rect: BoxRect,
    radius: Radii,
    borders: [Border; 4],
    border_box: Path,
    padding_radius: Radii,
    padding_box: Path,
}

impl BoxGeometry {
    fn new(style: &ComputedStyle, rect: BoxRect) -> Self {
        let corner = |name: &str| {
            parse_border_radius_value(
                style.get(&format!("border-{name}-radius")),
                rect.width,
                rect.height,
            )
        };
        let (tl, tr, br, bl) = (
            corner("top-left"),
            corner("top-right"),
            corner("bottom-right"),
            corner("bottom-left"),
        );
        let radius = clamp_radii(
            [tl.0, tr.0, tr.1, br.1, br.0, bl.0, bl.1, tl.1],
            rect.width,
            rect.height,
        );
        let borders = SIDES.map(|side| Border::read(style, side));

        let inset = borders.each_ref().map(|b| -b.width);
        let padding_radius = offset_radius(radius, inset);
        Self {
            rect,
            radius,
            border_box: rounded_rect_path(rect, radius),
            padding_box: rounded_rect_path(offset_rect(rect, inset), padding_radius),
            padding_radius,
            borders,
        }
    }
}

/// Tokens for one element's box.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoxTokens {
    /// Tokens in paint order.
    pub tokens: Vec<Token>,
    /// An overflow clip was opened and is left open for the children.
    pub clipped: bool,
}

/// Emits the box decoration tokens of single elements.
///
/// Coordinates are made relative to `root_rect`.
#[derive(Debug)]
pub struct BoxTokenizer<'a, D, L> {
    document: &'a D,
    loader: &'a L,
    root_rect: BoxRect,
}

impl<'a, D: Document, L: ImageLoader> BoxTokenizer<'a, D, L> {
    /// Creates a box tokenizer rooted at `root_rect`.
    pub fn new(document: &'a D, loader: &'a L, root_rect: BoxRect) -> Self {
        Self {
            document,
            loader,
            root_rect,
        }
    }

    /// Tokenizes `node`'s own box.
    ///
    /// With `clip_overflow`, an overflow clip shaped like the border box is
    /// opened at the first rect and left open; [`BoxTokens::clipped`]
    /// reports whether that happened. Elements without rects, and those with
    /// `background-clip: text`, produce nothing.
    ///
    /// # Errors
    ///
    /// [`TokenizeError::ImageLoad`] when a background image or `<img>` source
    /// fails to load.
    pub async fn tokenize(
        &self,
        node: D::Node,
        clip_overflow: bool,
    ) -> Result<BoxTokens, TokenizeError> {
        let mut out = BoxTokens::default();
        let rects: Vec<BoxRect> = self
            .document
            .client_rects(node)
            .into_iter()
            .map(|r| r.translate(-self.root_rect.x, -self.root_rect.y))
            .collect();
        let Some(&first) = rects.first() else {
            return Ok(out);
        };
        let initial = ComputedStyle::new();
        let style = self.document.computed_style(node).unwrap_or(&initial);

        if style.get("background-clip") == "text" {
            tracing::debug!(node = ?node, "background-clip: text is not supported");
            return Ok(out);
        }

        let axis = Axis {
            vertical: WritingMode::parse(style.get("writing-mode")).is_vertical(),
        };
        let inline_total: f64 = rects.iter().map(|&r| axis.inline_len(r)).sum();
        let virtual_rect = axis.rect(0.0, 0.0, inline_total, axis.cross_len(first));
        if !virtual_rect.has_area() {
            return Ok(out);
        }
        let geometry = BoxGeometry::new(style, virtual_rect);

        if clip_overflow {
            out.tokens.push(Token::Clip(Clip {
                x: first.x,
                y: first.y,
                shape: Shape::Path(geometry.border_box.clone()),
            }));
            out.clipped = true;
        }

        let shadows = parse_box_shadow(style.get("box-shadow"));
        // The first declared shadow paints on top.
        let (outset, inset): (Vec<&BoxShadow>, Vec<&BoxShadow>) = shadows
            .iter()
            .rev()
            .partition(|s| s.position == ShadowPosition::Outset);
        let current_color = style.get("color");

        let background = parse_color(style.get("background-color"));
        let background_path = if style.get("background-clip") == "padding-box" {
            &geometry.padding_box
        } else {
            &geometry.border_box
        };
        let border_path = composite_path(
            [&geometry.border_box, &geometry.padding_box],
            FillRule::EvenOdd,
        );

        let last = rects.len() - 1;
        let mut offset = 0.0;
        for (i, &rect) in rects.iter().enumerate() {
            let (ox, oy) = axis.point(offset, 0.0);
            let tokens = &mut out.tokens;

            if !outset.is_empty() {
                let line = LineShadow {
                    axis,
                    rect,
                    first: i == 0,
                    last: i == last,
                    origin: (ox, oy),
                };
                line.outset(tokens, &geometry, &outset, current_color);
            }

            let transform_at = tokens.len();
            tokens.push(Token::Transform(Transform::translate(rect.x, rect.y)));

            if let Some(color) = background {
                tokens.push(Token::Clip(Clip {
                    x: 0.0,
                    y: 0.0,
                    shape: Shape::Rect {
                        width: rect.width,
                        height: rect.height,
                    },
                }));
                tokens.push(Token::Fill(Fill {
                    x: ox,
                    y: oy,
                    shape: Shape::Path(background_path.clone()),
                    color: color.to_owned(),
                    filter: None,
                }));
                tokens.push(Token::EndClip);
            }

            if !inset.is_empty() {
                inset_shadows(tokens, &geometry, &inset, current_color, rect, rects.len() > 1, (ox, oy));
            }

            for side in 0..4 {
                let border = &geometry.borders[side];
                if border.width <= 0.0 {
                    continue;
                }
                tokens.push(Token::Clip(Clip {
                    x: 0.0,
                    y: 0.0,
                    shape: Shape::Path(border_strip(&geometry, side, rect.width, rect.height)),
                }));
                tokens.push(Token::Fill(Fill {
                    x: ox,
                    y: oy,
                    shape: Shape::Path(border_path.clone()),
                    color: border.color.clone(),
                    filter: None,
                }));
                tokens.push(Token::EndClip);
            }

            if tokens.len() == transform_at + 1 {
                tokens.pop();
            } else {
                tokens.push(Token::EndTransform);
            }

            offset -= axis.inline_len(rect);
        }

        if let Some(url) = parse_background_url(style.get("background-image")) {
            let image = self.load(url).await?;
            let height = first.width / f64::from(image.width()) * f64::from(image.height());
            let blend_mode = match style.get("mix-blend-mode") {
                "normal" => None,
                mode => mode.parse().ok(),
            };
            out.tokens.push(Token::Image(Image {
                x: first.x,
                y: first.y,
                width: first.width,
                height,
                image,
                fill_color: None,
                blend_mode,
            }));
        }

        if self.document.tag_name(node) == Some("img")
            && let Some(src) = self.document.attribute(node, "src")
        {
            let image = self.load(src).await?;
            let fill_color = self
                .document
                .attribute(node, "data-fill-current-color")
                .and_then(|_| self.document.parent(node))
                .and_then(|parent| self.document.computed_style(parent))
                .map(|parent| parent.get("color").to_owned());
            out.tokens.push(Token::Image(Image {
                x: first.x,
                y: first.y,
                width: first.width,
                height: first.height,
                image,
                fill_color,
                blend_mode: None,
            }));
        }

        Ok(out)
    }

    async fn load(&self, src: &str) -> Result<ImageHandle, TokenizeError> {
        self.loader
            .load(src)
            .await
            .map_err(|source| TokenizeError::ImageLoad {
                src: abbreviate(src),
                source,
            })
    }
}

/// Outset shadows for one line of a possibly wrapped box.
struct LineShadow {
    axis: Axis,
    rect: BoxRect,
    first: bool,
    last: bool,
    /// Shift of the virtual rect for this line.
    origin: (f64, f64),
}

impl LineShadow {
    fn outset(
        &self,
        tokens: &mut Vec<Token>,
        geometry: &BoxGeometry,
        shadows: &[&BoxShadow],
        current_color: &str,
    ) {
        let Self {
            axis, rect, origin, ..
        } = *self;
        let bleed = shadows
            .iter()
            .map(|s| s.blur + s.spread + s.x.abs().max(s.y.abs()))
            .fold(0.0, f64::max);

        // Interior line breaks cut the shadow off; outer ends bleed.
        let start = axis.inline_pos(rect) - if self.first { bleed } else { 0.0 };
        let end = axis.inline_pos(rect) + axis.inline_len(rect) + if self.last { bleed } else { 0.0 };
        let line = axis.rect(
            start,
            axis.cross_pos(rect) - bleed,
            end - start,
            axis.cross_len(rect) + 2.0 * bleed,
        );
        tokens.push(Token::Clip(Clip {
            x: line.x,
            y: line.y,
            shape: Shape::Rect {
                width: line.width,
                height: line.height,
            },
        }));

        // Keep the shadow out of the border box.
        let outer = rect_path(offset_rect(geometry.rect, [bleed; 4]));
        tokens.push(Token::Clip(Clip {
            x: rect.x + origin.0,
            y: rect.y + origin.1,
            shape: Shape::Path(composite_path([&outer, &geometry.border_box], FillRule::EvenOdd)),
        }));

        for shadow in shadows {
            let grow = [shadow.spread; 4];
            tokens.push(Token::Fill(Fill {
                x: rect.x + shadow.x + origin.0,
                y: rect.y + shadow.y + origin.1,
                shape: Shape::Path(rounded_rect_path(
                    offset_rect(geometry.rect, grow),
                    offset_radius(geometry.radius, grow),
                )),
                color: shadow.color.clone().unwrap_or_else(|| current_color.to_owned()),
                filter: (shadow.blur > 0.0).then_some(Filter::Blur(shadow.blur)),
            }));
        }

        tokens.push(Token::EndClip);
        tokens.push(Token::EndClip);
    }
}

/// Inset shadows, drawn inside the current line transform.
fn inset_shadows(
    tokens: &mut Vec<Token>,
    geometry: &BoxGeometry,
    shadows: &[&BoxShadow],
    current_color: &str,
    rect: BoxRect,
    wrapped: bool,
    (ox, oy): (f64, f64),
) {
    if wrapped {
        tokens.push(Token::Clip(Clip {
            x: 0.0,
            y: 0.0,
            shape: Shape::Rect {
                width: rect.width,
                height: rect.height,
            },
        }));
    }
    tokens.push(Token::Clip(Clip {
        x: ox,
        y: oy,
        shape: Shape::Path(geometry.padding_box.clone()),
    }));

    for shadow in shadows {
        let bleed = shadow.blur + shadow.x.abs().max(shadow.y.abs());
        let outer = rect_path(offset_rect(geometry.rect, [bleed; 4]));
        let shrink = [-shadow.spread; 4];
        let inner = rounded_rect_path(
            offset_rect(geometry.rect, shrink),
            offset_radius(geometry.radius, shrink),
        );
        tokens.push(Token::Fill(Fill {
            x: ox + shadow.x,
            y: oy + shadow.y,
            shape: Shape::Path(composite_path([&outer, &inner], FillRule::EvenOdd)),
            color: shadow.color.clone().unwrap_or_else(|| current_color.to_owned()),
            filter: (shadow.blur > 0.0).then_some(Filter::Blur(shadow.blur)),
        }));
    }

    tokens.push(Token::EndClip);
    if wrapped {
        tokens.push(Token::EndClip);
    }
}

/// The clip region of one border side on a `width` x `height` line.
///
/// The strip runs along the side and is mitred towards the padding-box
/// corners, so adjacent sides of different colors meet on the diagonal.
/// Sides are numbered top, right, bottom, left; each is drawn as the top
/// side rotated into place.
fn border_strip(geometry: &BoxGeometry, side: usize, width: f64, height: f64) -> Path {
    const A: [f64; 4] = [1.0, 0.0, -1.0, 0.0];
    let rotate = |(x, y): (f64, f64)| {
        (
            A[side] * x + A[(side + 1) % 4] * y,
            A[(side + 3) % 4] * x + A[side] * y,
        )
    };
    let origin = [(0.0, 0.0), (width, 0.0), (width, height), (0.0, height)][side];
    let len = [width, height, width, height][side];

    let b = &geometry.borders;
    let r = &geometry.padding_radius;
    let w_n = b[side].width;
    let w_ts = b[(side + 3) % 4].width;
    let w_te = b[(side + 1) % 4].width;
    let r_sn = r[(side * 2 + 7) % 8];
    let r_st = r[(side * 2) % 8];
    let r_en = r[(side * 2 + 2) % 8];
    let r_et = r[(side * 2 + 1) % 8];

    let start = (0.0, 0.0);
    let end = (len, 0.0);
    let corner_start = (w_ts + r_st, w_n + r_sn);
    let corner_end = (len - (w_te + r_et), w_n + r_en);
    let mitre_start = (corner_start.1 * w_ts / w_n, corner_start.1);
    let mitre_end = (len - corner_end.1 * w_te / w_n, corner_end.1);

    let points = [start, mitre_start, corner_start, corner_end, mitre_end, end].map(|p| {
        let (x, y) = rotate(p);
        (x + origin.0, y + origin.1)
    });
    polygon_path(&points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use crate::loader::LocalImageLoader;
    use crate::loader::tests::png_data_url;
    use croquis_tokens::{BlendMode, PathSegment, check_balance};

    fn tokenize(doc: &MemoryDocument, node: crate::NodeId, clip: bool) -> BoxTokens {
        let loader = LocalImageLoader::new();
        let boxes = BoxTokenizer::new(doc, &loader, BoxRect::new(0.0, 0.0, 800.0, 600.0));
        pollster::block_on(boxes.tokenize(node, clip)).expect("tokenizes")
    }

    fn kinds(tokens: &[Token]) -> Vec<&'static str> {
        tokens.iter().map(Token::kind).collect()
    }

    fn arc_radii(shape: &Shape) -> Vec<(f64, f64)> {
        let Shape::Path(path) = shape else {
            return Vec::new();
        };
        path.segments
            .iter()
            .filter_map(|s| match *s {
                PathSegment::Arc { rx, ry, .. } => Some((rx, ry)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn rounded_background() {
        let mut doc = MemoryDocument::new();
        let div = doc.append_element(
            None,
            "div",
            "display: block; background-color: red; border-radius: 10px",
            &[BoxRect::new(20.0, 30.0, 100.0, 50.0)],
        );
        let out = tokenize(&doc, div, false);
        assert_eq!(
            kinds(&out.tokens),
            ["transform", "clip", "fill", "endClip", "endTransform"]
        );
        assert_eq!(out.tokens[0], Token::Transform(Transform::translate(20.0, 30.0)));
        let Token::Fill(fill) = &out.tokens[2] else {
            panic!("expected a fill");
        };
        assert_eq!(fill.color, "red");
        assert_eq!((fill.x, fill.y), (0.0, 0.0));
        assert_eq!(arc_radii(&fill.shape), vec![(10.0, 10.0); 4]);
        assert!(!out.clipped);
    }

    #[test]
    fn boxes_without_paint_are_empty() {
        let mut doc = MemoryDocument::new();
        let bare = doc.append_element(None, "div", "display: block", &[BoxRect::new(0.0, 0.0, 10.0, 10.0)]);
        assert!(tokenize(&doc, bare, false).tokens.is_empty());

        let no_box = doc.append_element(None, "div", "background-color: red", &[]);
        assert!(tokenize(&doc, no_box, true).tokens.is_empty());

        let text_clip = doc.append_element(
            None,
            "div",
            "background-color: red; background-clip: text",
            &[BoxRect::new(0.0, 0.0, 10.0, 10.0)],
        );
        assert!(tokenize(&doc, text_clip, false).tokens.is_empty());

        let flat = doc.append_element(None, "div", "background-color: red", &[BoxRect::new(0.0, 0.0, 10.0, 0.0)]);
        assert!(tokenize(&doc, flat, true).tokens.is_empty());
    }

    #[test]
    fn overflow_clip_stays_open() {
        let mut doc = MemoryDocument::new();
        let div = doc.append_element(None, "div", "display: block", &[BoxRect::new(5.0, 6.0, 10.0, 10.0)]);
        let out = tokenize(&doc, div, true);
        assert!(out.clipped);
        assert_eq!(kinds(&out.tokens), ["clip"]);
        let Token::Clip(clip) = &out.tokens[0] else {
            panic!("expected a clip");
        };
        assert_eq!((clip.x, clip.y), (5.0, 6.0));
    }

    #[test]
    fn outset_shadow_is_excluded_from_border_box() {
        let mut doc = MemoryDocument::new();
        let div = doc.append_element(
            None,
            "div",
            "display: block; box-shadow: rgba(0, 0, 0, 0.5) 5px 5px 10px 0px",
            &[BoxRect::new(10.0, 10.0, 100.0, 50.0)],
        );
        let out = tokenize(&doc, div, false);
        assert_eq!(kinds(&out.tokens), ["clip", "clip", "fill", "endClip", "endClip"]);
        let Token::Clip(exclusion) = &out.tokens[1] else {
            panic!("expected the exclusion clip");
        };
        assert_eq!(exclusion.shape.fill_rule(), FillRule::EvenOdd);
        let Token::Fill(fill) = &out.tokens[2] else {
            panic!("expected the shadow");
        };
        assert_eq!((fill.x - exclusion.x, fill.y - exclusion.y), (5.0, 5.0));
        assert_eq!(fill.filter, Some(Filter::Blur(10.0)));
        assert_eq!(fill.color, "rgba(0, 0, 0, 0.5)");
    }

    #[test]
    fn shadows_paint_last_declared_first() {
        let mut doc = MemoryDocument::new();
        let div = doc.append_element(
            None,
            "div",
            "display: block; color: blue; box-shadow: rgb(255, 0, 0) 1px 1px, 2px 2px",
            &[BoxRect::new(0.0, 0.0, 10.0, 10.0)],
        );
        let out = tokenize(&doc, div, false);
        let fills: Vec<&str> = out
            .tokens
            .iter()
            .filter_map(|t| match t {
                Token::Fill(fill) => Some(fill.color.as_str()),
                _ => None,
            })
            .collect();
        // The second shadow has no color and falls back to `color`.
        assert_eq!(fills, ["blue", "rgb(255, 0, 0)"]);
    }

    #[test]
    fn inset_shadow_is_clipped_to_padding_box() {
        let mut doc = MemoryDocument::new();
        let div = doc.append_element(
            None,
            "div",
            "display: block; box-shadow: inset 0px 0px 4px 2px rgb(0, 0, 0)",
            &[BoxRect::new(0.0, 0.0, 40.0, 20.0)],
        );
        let out = tokenize(&doc, div, false);
        assert_eq!(
            kinds(&out.tokens),
            ["transform", "clip", "fill", "endClip", "endTransform"]
        );
        let Token::Fill(fill) = &out.tokens[2] else {
            panic!("expected the shadow");
        };
        assert_eq!(fill.shape.fill_rule(), FillRule::EvenOdd);
        assert_eq!(fill.filter, Some(Filter::Blur(4.0)));
    }

    #[test]
    fn each_visible_border_side_gets_a_strip() {
        let mut doc = MemoryDocument::new();
        let div = doc.append_element(
            None,
            "div",
            "display: block; border: 2px solid rgb(0, 0, 255); border-left-style: none",
            &[BoxRect::new(0.0, 0.0, 40.0, 20.0)],
        );
        let out = tokenize(&doc, div, false);
        let fills = out
            .tokens
            .iter()
            .filter(|t| matches!(t, Token::Fill(f) if f.color == "rgb(0, 0, 255)"))
            .count();
        assert_eq!(fills, 3);
        check_balance(&out.tokens).expect("balanced");
    }

    #[test]
    fn top_border_strip_is_mitred() {
        let style = ComputedStyle::parse("border: 2px solid red");
        let geometry = BoxGeometry::new(&style, BoxRect::new(0.0, 0.0, 40.0, 20.0));
        let strip = border_strip(&geometry, 0, 40.0, 20.0);
        let points: Vec<(f64, f64)> = strip
            .segments
            .iter()
            .filter_map(|s| match *s {
                PathSegment::MoveTo { x, y } | PathSegment::LineTo { x, y } => Some((x, y)),
                _ => None,
            })
            .collect();
        assert_eq!(
            points,
            [(0.0, 0.0), (2.0, 2.0), (2.0, 2.0), (38.0, 2.0), (38.0, 2.0), (40.0, 0.0)]
        );
    }

    #[test]
    fn wrapped_inline_shifts_virtual_rect_per_line() {
        let mut doc = MemoryDocument::new();
        let span = doc.append_element(
            None,
            "span",
            "background-color: red",
            &[BoxRect::new(50.0, 0.0, 30.0, 10.0), BoxRect::new(0.0, 10.0, 20.0, 10.0)],
        );
        let out = tokenize(&doc, span, false);
        let fills: Vec<(f64, f64)> = out
            .tokens
            .iter()
            .filter_map(|t| match t {
                Token::Fill(fill) => Some((fill.x, fill.y)),
                _ => None,
            })
            .collect();
        assert_eq!(fills, [(0.0, 0.0), (-30.0, 0.0)]);
        check_balance(&out.tokens).expect("balanced");
    }

    #[test]
    fn background_image_keeps_aspect_ratio() {
        let url = png_data_url(2, 1, &[0; 8]);
        let mut doc = MemoryDocument::new();
        let div = doc.append_element(
            None,
            "div",
            &format!("background-image: url(\"{url}\"); mix-blend-mode: multiply"),
            &[BoxRect::new(0.0, 0.0, 40.0, 40.0)],
        );
        let out = tokenize(&doc, div, false);
        let Some(Token::Image(image)) = out.tokens.last() else {
            panic!("expected an image");
        };
        assert_eq!((image.width, image.height), (40.0, 20.0));
        assert_eq!(image.blend_mode, Some(BlendMode::Multiply));
    }

    #[test]
    fn img_can_take_parent_color() {
        let url = png_data_url(1, 1, &[0, 0, 0, 255]);
        let mut doc = MemoryDocument::new();
        let parent = doc.append_element(None, "span", "color: rgb(9, 9, 9)", &[]);
        let img = doc.append_element(Some(parent), "img", "", &[BoxRect::new(1.0, 2.0, 16.0, 16.0)]);
        doc.set_attribute(img, "src", &url);
        doc.set_attribute(img, "data-fill-current-color", "");
        let out = tokenize(&doc, img, false);
        let [Token::Image(image)] = out.tokens.as_slice() else {
            panic!("expected one image");
        };
        assert_eq!(image.fill_color.as_deref(), Some("rgb(9, 9, 9)"));
        assert_eq!((image.x, image.y, image.width, image.height), (1.0, 2.0, 16.0, 16.0));
    }

    #[test]
    fn failed_image_load_is_an_error() {
        let mut doc = MemoryDocument::new();
        let img = doc.append_element(None, "img", "", &[BoxRect::new(0.0, 0.0, 1.0, 1.0)]);
        doc.set_attribute(img, "src", "https://example.com/a.png");
        let loader = LocalImageLoader::new();
        let boxes = BoxTokenizer::new(&doc, &loader, BoxRect::default());
        let err = pollster::block_on(boxes.tokenize(img, false)).expect_err("load fails");
        assert!(matches!(err, TokenizeError::ImageLoad { .. }));
    }
}
