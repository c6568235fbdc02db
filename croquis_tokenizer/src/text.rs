// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text runs from per-character wrapper rects.

use croquis_css::{font_shorthand, parse_length, scale_x};
use croquis_tokens::{BoxRect, Text, TextAlign, TextDecoration, WritingMode};

use crate::style::ComputedStyle;

/// Punctuation that starts a new run instead of merging into the previous one.
pub(crate) const SPACING_TRIM: &str =
    "、，。．・：；（〔［｛〈《「『【⦅〘〖«〝）〕］｝〉》」』】⦆〙〗»〟";

/// True when `next` sits on the same line as `prev`.
///
/// Each box's vertical midband, half its height, must overlap the other box.
pub(crate) fn is_same_line(next: BoxRect, prev: BoxRect) -> bool {
    let delta = next.height * 0.5;
    next.y + delta < prev.y + prev.height && prev.y + delta < next.y + next.height
}

/// Starts a run at `rect` with the font properties of `style`.
///
/// `root_pixel` resolves `text-decoration-thickness: auto`.
pub(crate) fn text_token(style: &ComputedStyle, rect: BoxRect, text: &str, root_pixel: f64) -> Text {
    let font_size = parse_length(style.get("font-size"));
    Text {
        x: rect.x,
        y: rect.y,
        width: rect.width,
        height: rect.height,
        text: text.to_owned(),
        color: style.get("color").to_owned(),
        font: font_shorthand(
            style.get("font-style"),
            style.get("font-variant"),
            style.get("font-weight"),
            style.get("font-size"),
            style.get("font-family"),
        ),
        font_kerning: style.get("font-kerning").to_owned(),
        font_stretch: style.get("font-stretch").to_owned(),
        font_variant_caps: style.get("font-variant-caps").to_owned(),
        letter_spacing: style.get("letter-spacing").to_owned(),
        font_size: if font_size.is_nan() { 0.0 } else { font_size },
        line_height: parse_length(style.get("line-height")),
        text_align: TextAlign::parse(style.get("text-align")),
        text_decoration: text_decoration(style, root_pixel),
        white_space: style.get("white-space").to_owned(),
        writing_mode: WritingMode::parse(style.get("writing-mode")),
        scale_x: scale_x(style.get("transform")),
    }
}

fn text_decoration(style: &ComputedStyle, root_pixel: f64) -> Option<TextDecoration> {
    let line = style.get("text-decoration-line");
    if line == "none" || line.is_empty() {
        return None;
    }
    let has = |keyword: &str| line.split_whitespace().any(|word| word == keyword);
    let thickness = match style.get("text-decoration-thickness") {
        "auto" => root_pixel,
        value => {
            let px = parse_length(value);
            if px.is_nan() { root_pixel } else { px }
        }
    };
    Some(TextDecoration {
        underline: has("underline"),
        overline: has("overline"),
        line_through: has("line-through"),
        color: style.get("text-decoration-color").to_owned(),
        thickness,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_line_uses_midbands() {
        let prev = BoxRect::new(0.0, 0.0, 10.0, 20.0);
        assert!(is_same_line(BoxRect::new(10.0, 0.0, 10.0, 20.0), prev));
        assert!(is_same_line(BoxRect::new(10.0, 8.0, 10.0, 20.0), prev));
        assert!(!is_same_line(BoxRect::new(0.0, 20.0, 10.0, 20.0), prev));
        assert!(!is_same_line(BoxRect::new(0.0, 12.0, 10.0, 20.0), prev));
    }

    #[test]
    fn font_properties_are_read() {
        let style = ComputedStyle::parse(
            "font-size: 20px; font-weight: 700; font-family: Inter, sans-serif; \
             color: rgb(1, 2, 3); line-height: 30px; text-align: center; \
             transform: matrix(0.8, 0, 0, 1, 0, 0); writing-mode: vertical-rl",
        );
        let text = text_token(&style, BoxRect::new(1.0, 2.0, 3.0, 4.0), "a", 1.0);
        assert_eq!(text.font, "normal normal 700 20px/1 Inter, sans-serif");
        assert_eq!(text.font_size, 20.0);
        assert_eq!(text.line_height, 30.0);
        assert_eq!(text.color, "rgb(1, 2, 3)");
        assert_eq!(text.text_align, TextAlign::Center);
        assert_eq!(text.writing_mode, WritingMode::VerticalRl);
        assert_eq!(text.scale_x, 0.8);
        assert_eq!((text.x, text.y, text.width, text.height), (1.0, 2.0, 3.0, 4.0));
        assert!(text.line_height.is_finite());
        assert!(text.text_decoration.is_none());
    }

    #[test]
    fn normal_line_height_is_nan() {
        let text = text_token(&ComputedStyle::new(), BoxRect::new(0.0, 0.0, 1.0, 1.0), "a", 1.0);
        assert!(text.line_height.is_nan());
        assert_eq!(text.font_size, 16.0);
        assert_eq!(text.scale_x, 1.0);
    }

    #[test]
    fn auto_thickness_uses_root_pixel() {
        let style = ComputedStyle::parse(
            "text-decoration-line: underline; text-decoration-color: red",
        );
        let text = text_token(&style, BoxRect::new(0.0, 0.0, 1.0, 1.0), "a", 1.25);
        let decoration = text.text_decoration.expect("underline");
        assert!(decoration.underline);
        assert!(!decoration.overline);
        assert_eq!(decoration.color, "red");
        assert_eq!(decoration.thickness, 1.25);

        let style = style.with("text-decoration-thickness", "3px");
        let text = text_token(&style, BoxRect::new(0.0, 0.0, 1.0, 1.0), "a", 1.25);
        assert_eq!(text.text_decoration.map(|d| d.thickness), Some(3.0));
    }

    #[test]
    fn spacing_trim_covers_cjk_brackets() {
        assert!(SPACING_TRIM.contains('「'));
        assert!(SPACING_TRIM.contains('。'));
        assert!(!SPACING_TRIM.contains('a'));
    }
}
