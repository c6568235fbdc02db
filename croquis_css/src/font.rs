// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::number::parse_length;

/// Builds the `style variant weight size/1 family` font shorthand.
///
/// Line height is pinned to 1; line spacing is carried separately.
pub fn font_shorthand(style: &str, variant: &str, weight: &str, size: &str, family: &str) -> String {
    format!("{style} {variant} {weight} {size}/1 {family}")
}

/// The family list of a shorthand built by [`font_shorthand`].
///
/// Quotes are stripped and empty entries skipped.
pub fn font_families(shorthand: &str) -> Vec<String> {
    let Some((_, families)) = shorthand.split_once("/1 ") else {
        return Vec::new();
    };
    families
        .split(',')
        .map(|family| family.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|family| !family.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Horizontal glyph stretch from a computed `transform`.
///
/// Reads `a` from `matrix(a, ...)`; anything else is 1.
pub fn scale_x(transform: &str) -> f64 {
    let Some(start) = transform.find("matrix(") else {
        return 1.0;
    };
    let args = &transform[start + "matrix(".len()..];
    match args.find(',') {
        Some(end) if end > 0 => {
            let a = parse_length(&args[..end]);
            if a.is_finite() { a } else { 1.0 }
        }
        _ => 1.0,
    }
}
