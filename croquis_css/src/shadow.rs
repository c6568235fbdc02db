// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::value::{CssToken, parse_css_value};

/// Whether a box shadow is drawn outside or inside the border box.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ShadowPosition {
    /// Drop shadow outside the border box.
    #[default]
    Outset,
    /// Shadow inside the padding box.
    Inset,
}

/// One entry of a `box-shadow` list.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxShadow {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset.
    pub y: f64,
    /// Blur radius, 0 when absent.
    pub blur: f64,
    /// Spread distance, 0 when absent.
    pub spread: f64,
    /// Shadow color; `None` means `currentcolor`.
    pub color: Option<String>,
    /// Outset or inset.
    pub position: ShadowPosition,
}

/// One entry of a `text-shadow` list.
#[derive(Clone, Debug, PartialEq)]
pub struct TextShadow {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset.
    pub y: f64,
    /// Blur radius, 0 when absent.
    pub blur: f64,
    /// Shadow color; `None` means `currentcolor`.
    pub color: Option<String>,
}

#[derive(Default)]
struct Group {
    numbers: [Option<f64>; 4],
    color: Option<String>,
    inset: bool,
}

impl Group {
    fn push_number(&mut self, value: f64, slots: usize) {
        if let Some(slot) = self.numbers[..slots].iter_mut().find(|n| n.is_none()) {
            *slot = Some(value);
        }
    }

    fn take_color(&mut self, color: &str) {
        if self.color.is_none() {
            self.color = Some(color.to_owned());
        }
    }
}

/// Splits tokens into comma-separated groups and folds each group.
fn fold_groups(value: &str, mut fold: impl FnMut(&mut Group, &CssToken)) -> Vec<Group> {
    let mut groups = Vec::new();
    let mut group = Group::default();
    for token in parse_css_value(value) {
        if token == CssToken::Separator {
            groups.push(core::mem::take(&mut group));
        } else {
            fold(&mut group, &token);
        }
    }
    groups.push(group);
    groups
}

/// Parses a computed `box-shadow` value.
///
/// Within each comma-separated group, numbers fill `x`, `y`, `blur`, and
/// `spread` in order, the first color wins, and `inset` marks an inset shadow.
/// Groups without a `y` are dropped.
pub fn parse_box_shadow(value: &str) -> Vec<BoxShadow> {
    if value.trim() == "none" {
        return Vec::new();
    }
    fold_groups(value, |group, token| match token {
        CssToken::Length(v) | CssToken::Percentage(v) => group.push_number(*v, 4),
        CssToken::Color(color) => group.take_color(color),
        CssToken::Keyword(keyword) if keyword == "inset" => group.inset = true,
        _ => {}
    })
    .into_iter()
    .filter_map(|group| {
        let [Some(x), Some(y), blur, spread] = group.numbers else {
            return None;
        };
        Some(BoxShadow {
            x,
            y,
            blur: blur.unwrap_or(0.0),
            spread: spread.unwrap_or(0.0),
            color: group.color,
            position: if group.inset {
                ShadowPosition::Inset
            } else {
                ShadowPosition::Outset
            },
        })
    })
    .collect()
}

/// Parses a computed `text-shadow` value.
///
/// Only lengths are consumed (`x`, `y`, `blur`); there is no spread or inset.
/// Groups without a `y` are dropped.
pub fn parse_text_shadow(value: &str) -> Vec<TextShadow> {
    if value.trim() == "none" {
        return Vec::new();
    }
    fold_groups(value, |group, token| match token {
        CssToken::Length(v) => group.push_number(*v, 3),
        CssToken::Color(color) => group.take_color(color),
        _ => {}
    })
    .into_iter()
    .filter_map(|group| {
        let [Some(x), Some(y), blur, _] = group.numbers else {
            return None;
        };
        Some(TextShadow {
            x,
            y,
            blur: blur.unwrap_or(0.0),
            color: group.color,
        })
    })
    .collect()
}
