// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// One lexeme of a CSS value list.
#[derive(Clone, Debug, PartialEq)]
pub enum CssToken {
    /// `,`
    Separator,
    /// `rgb(...)` or `rgba(...)`, verbatim.
    Color(String),
    /// `<number>%`
    Percentage(f64),
    /// A number with an optional `px|em|rem|vh|vw|vmin|vmax` unit.
    Length(f64),
    /// A run of ASCII letters and hyphens.
    Keyword(String),
    /// Anything else up to the next whitespace or comma.
    Error(String),
}

impl CssToken {
    /// The numeric value of a length or percentage.
    pub fn number(&self) -> Option<f64> {
        match *self {
            Self::Length(v) | Self::Percentage(v) => Some(v),
            _ => None,
        }
    }
}

const UNITS: [&str; 7] = ["px", "em", "rem", "vh", "vw", "vmin", "vmax"];

/// Splits a value list into [`CssToken`]s.
///
/// Unrecognized spans become [`CssToken::Error`] and lexing continues after
/// them.
pub fn parse_css_value(input: &str) -> Vec<CssToken> {
    let mut tokens = Vec::new();
    let mut rest = input.trim();

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix(',') {
            tokens.push(CssToken::Separator);
            rest = after.trim_start();
            continue;
        }
        if let Some(len) = match_color(rest) {
            tokens.push(CssToken::Color(rest[..len].to_owned()));
            rest = rest[len..].trim_start();
            continue;
        }
        if let Some((value, len)) = match_percentage(rest) {
            tokens.push(CssToken::Percentage(value));
            rest = rest[len..].trim_start();
            continue;
        }
        if let Some((value, len)) = match_length(rest) {
            tokens.push(CssToken::Length(value));
            rest = rest[len..].trim_start();
            continue;
        }

        let end = rest
            .find(|c: char| c.is_whitespace() || c == ',')
            .unwrap_or(rest.len());
        let content = &rest[..end];
        if content.chars().all(|c| c.is_ascii_alphabetic() || c == '-') {
            tokens.push(CssToken::Keyword(content.to_owned()));
        } else {
            tokens.push(CssToken::Error(content.to_owned()));
        }
        rest = rest[end..].trim_start();
    }

    tokens
}

/// Length of a leading `rgb(...)`/`rgba(...)` with non-empty arguments.
fn match_color(s: &str) -> Option<usize> {
    let open = ["rgba(", "rgb("].into_iter().find_map(|prefix| {
        s.get(..prefix.len())
            .filter(|head| head.eq_ignore_ascii_case(prefix))
            .map(|_| prefix.len())
    })?;
    let close = s[open..].find(')')?;
    (close > 0).then_some(open + close + 1)
}

/// Byte lengths of `-?\d+` and of `-?\d+\.\d+` at the start of `s`.
fn match_number(s: &str) -> Option<(usize, Option<usize>)> {
    let bytes = s.as_bytes();
    let mut i = usize::from(bytes.first() == Some(&b'-'));
    let digits_start = i;
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    if i == digits_start {
        return None;
    }
    let integer = i;
    let mut fraction = None;
    if bytes.get(i) == Some(&b'.') {
        let mut j = i + 1;
        while bytes.get(j).is_some_and(u8::is_ascii_digit) {
            j += 1;
        }
        if j > i + 1 {
            fraction = Some(j);
        }
    }
    Some((integer, fraction))
}

fn match_percentage(s: &str) -> Option<(f64, usize)> {
    let (integer, fraction) = match_number(s)?;
    let end = fraction.unwrap_or(integer);
    if s.as_bytes().get(end) != Some(&b'%') {
        return None;
    }
    Some((s[..end].parse().ok()?, end + 1))
}

fn match_length(s: &str) -> Option<(f64, usize)> {
    let (integer, fraction) = match_number(s)?;
    // Prefer the longest number, then fall back to the integer part.
    for end in fraction.into_iter().chain([integer]) {
        let tail = &s[end..];
        let unit = UNITS
            .iter()
            .filter(|unit| tail.starts_with(*unit) && is_word_boundary(&tail[unit.len()..]))
            .map(|unit| unit.len())
            .next();
        let len = match unit {
            Some(unit) => end + unit,
            None if is_word_boundary(tail) => end,
            None => continue,
        };
        return Some((s[..end].parse().ok()?, len));
    }
    None
}

/// Whether the position before `rest` is a `\b` after a word character.
fn is_word_boundary(rest: &str) -> bool {
    !rest
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
}
