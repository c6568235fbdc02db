// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Parses the leading number of a CSS length, ignoring any unit.
///
/// Leading whitespace is skipped. Returns `NaN` when no number is found.
pub fn parse_length(value: &str) -> f64 {
    let s = value.trim_start();
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    if s[i..].starts_with("Infinity") {
        return if bytes.first() == Some(&b'-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = i;
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    let mut digits = i - int_start;
    if bytes.get(i) == Some(&b'.') {
        let frac_start = i + 1;
        let mut j = frac_start;
        while bytes.get(j).is_some_and(u8::is_ascii_digit) {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }
    if digits == 0 {
        return f64::NAN;
    }

    // Exponent only counts when it has digits.
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_start = j;
        while bytes.get(j).is_some_and(u8::is_ascii_digit) {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    s[..i].parse().unwrap_or(f64::NAN)
}

/// Parses a computed `z-index`. `auto` and malformed values are `None`.
pub fn parse_z_index(value: &str) -> Option<i32> {
    let value = value.trim();
    if value == "auto" {
        return None;
    }
    value.parse().ok()
}

/// Resolves one corner's `border-*-radius` to `(horizontal, vertical)` pixels.
///
/// A single value applies to both axes. Percentages resolve against `width`
/// for the horizontal radius and `height` for the vertical one. Malformed
/// values become 0.
pub fn parse_border_radius_value(value: &str, width: f64, height: f64) -> (f64, f64) {
    let mut parts = value.split_whitespace();
    let Some(first) = parts.next() else {
        return (0.0, 0.0);
    };
    let second = parts.next().unwrap_or(first);
    let resolve = |v: &str, basis: f64| {
        let px = if v.ends_with('%') {
            parse_length(v) / 100.0 * basis
        } else {
            parse_length(v)
        };
        if px.is_finite() { px } else { 0.0 }
    };
    (resolve(first, width), resolve(second, height))
}

/// Extracts the URL from a `background-image: url("...")` value.
///
/// Gradients, multiple backgrounds and unquoted URLs yield `None`.
pub fn parse_background_url(value: &str) -> Option<&str> {
    let rest = value.strip_prefix("url(\"")?;
    let end = rest.rfind("\")")?;
    (end > 0).then(|| &rest[..end])
}
