// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Croquis CSS: small parsers for computed style strings.
//!
//! Computed styles arrive as strings already normalized by the host engine
//! (`rgb(0, 0, 0)`, `10px`, `matrix(1, 0, 0, 1, 0, 0)`). The parsers in this
//! crate are total: malformed input degrades to an empty list, `NaN`, or a
//! default value and never panics.
//!
//! - [`parse_css_value`]: a generic lexer for value lists.
//! - [`parse_box_shadow`] and [`parse_text_shadow`]: shadow lists.
//! - [`is_transparent`], [`parse_color`], [`to_rgba`]: colors.
//! - [`parse_length`], [`parse_z_index`], [`parse_border_radius_value`]: numbers.
//! - [`font_shorthand`], [`font_families`], [`scale_x`]: text properties.
//! - [`parse_background_url`]: single `url("...")` backgrounds.

mod color;
mod font;
mod number;
mod shadow;
mod value;

pub use color::{is_transparent, parse_color, to_rgba};
pub use font::{font_families, font_shorthand, scale_x};
pub use number::{parse_background_url, parse_border_radius_value, parse_length, parse_z_index};
pub use shadow::{BoxShadow, ShadowPosition, TextShadow, parse_box_shadow, parse_text_shadow};
pub use value::{CssToken, parse_css_value};
