// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::Color;
use peniko::color::{Srgb, parse_color as parse_css_color};

/// Whether a computed color is fully transparent.
///
/// Only the two canonical computed forms are recognized.
pub fn is_transparent(color: &str) -> bool {
    color == "transparent" || color == "rgba(0, 0, 0, 0)"
}

/// Returns the color unless it is transparent.
pub fn parse_color(color: &str) -> Option<&str> {
    (!is_transparent(color)).then_some(color)
}

/// Converts a CSS color string to an sRGB [`Color`].
///
/// Returns `None` for strings the color parser does not understand.
pub fn to_rgba(color: &str) -> Option<Color> {
    parse_css_color(color.trim())
        .ok()
        .map(|c| c.to_alpha_color::<Srgb>())
}
