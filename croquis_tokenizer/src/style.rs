// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Computed-style snapshots.

use hashbrown::HashMap;

/// A snapshot of an element's computed style, keyed by CSS property name.
///
/// Values are the host engine's serialized computed values
/// (`rgb(255, 0, 0)`, `10px`, `matrix(1, 0, 0, 1, 0, 0)`). Properties that
/// were never set read as their CSS initial value, see [`initial_value`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    properties: HashMap<String, String>,
}

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];
const CORNERS: [&str; 4] = ["top-left", "top-right", "bottom-right", "bottom-left"];

impl ComputedStyle {
    /// An empty style; every property reads as its initial value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `name: value; name: value` declaration list.
    ///
    /// Semicolons inside parentheses or quotes do not end a declaration, so
    /// `url("data:image/png;base64,...")` survives intact. The single-value
    /// shorthands `border`, `border-width`, `border-style`, `border-color`
    /// and `border-radius` expand to their per-side longhands.
    pub fn parse(declarations: &str) -> Self {
        let mut style = Self::new();
        for declaration in split_declarations(declarations) {
            let Some((name, value)) = declaration.split_once(':') else {
                continue;
            };
            let (name, value) = (name.trim().to_ascii_lowercase(), value.trim());
            if name.is_empty() {
                continue;
            }
            style.set_expanded(&name, value);
        }
        style
    }

    /// The computed value of `name`, or its initial value when unset.
    pub fn get(&self, name: &str) -> &str {
        self.properties
            .get(name)
            .map_or_else(|| initial_value(name), String::as_str)
    }

    /// Sets one property.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Builder form of [`ComputedStyle::set`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Number of explicitly set properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// True when no property was set explicitly.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    fn set_expanded(&mut self, name: &str, value: &str) {
        match name {
            "border-radius" => {
                for corner in CORNERS {
                    self.set(format!("border-{corner}-radius"), value);
                }
            }
            "border-width" | "border-style" | "border-color" => {
                let property = &name["border-".len()..];
                for side in SIDES {
                    self.set(format!("border-{side}-{property}"), value);
                }
            }
            "border" => {
                let mut parts = value.split_whitespace();
                let (width, style) = (parts.next(), parts.next());
                let color = parts.collect::<Vec<_>>().join(" ");
                for side in SIDES {
                    if let Some(width) = width {
                        self.set(format!("border-{side}-width"), width);
                    }
                    if let Some(style) = style {
                        self.set(format!("border-{side}-style"), style);
                    }
                    if !color.is_empty() {
                        self.set(format!("border-{side}-color"), color.as_str());
                    }
                }
            }
            _ => self.set(name, value),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ComputedStyle {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn split_declarations(input: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                out.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&input[start..]);
    out
}

/// The computed initial value of the properties the tokenizer reads.
///
/// Unknown properties read as the empty string.
pub fn initial_value(name: &str) -> &'static str {
    match name {
        "display" => "inline",
        "position" => "static",
        "z-index" | "isolation" | "will-change" | "-webkit-overflow-scrolling"
        | "font-kerning" | "text-decoration-thickness" => "auto",
        "opacity" => "1",
        "visibility" => "visible",
        "overflow" => "visible",
        "transform" | "scale" | "rotate" | "translate" | "filter" | "backdrop-filter"
        | "perspective" | "clip-path" | "mask" | "-webkit-mask" | "mask-image"
        | "mask-border" | "contain" | "background-image" | "box-shadow" | "text-shadow"
        | "text-decoration-line" => "none",
        "mix-blend-mode" | "container-type" | "font-style" | "font-variant"
        | "font-variant-caps" | "letter-spacing" | "line-height" | "white-space" => "normal",
        "background-color" => "rgba(0, 0, 0, 0)",
        "background-clip" => "border-box",
        "border-top-style" | "border-right-style" | "border-bottom-style"
        | "border-left-style" => "none",
        "border-top-width" | "border-right-width" | "border-bottom-width"
        | "border-left-width" | "border-top-left-radius" | "border-top-right-radius"
        | "border-bottom-right-radius" | "border-bottom-left-radius" => "0px",
        "color" | "border-top-color" | "border-right-color" | "border-bottom-color"
        | "border-left-color" | "text-decoration-color" => "rgb(0, 0, 0)",
        "writing-mode" => "horizontal-tb",
        "font-weight" => "400",
        "font-size" => "16px",
        "font-family" => "serif",
        "font-stretch" => "100%",
        "text-align" => "start",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_properties_read_initial_values() {
        let style = ComputedStyle::new();
        assert_eq!(style.get("display"), "inline");
        assert_eq!(style.get("background-color"), "rgba(0, 0, 0, 0)");
        assert_eq!(style.get("made-up"), "");
        assert!(style.is_empty());
    }

    #[test]
    fn parse_keeps_semicolons_inside_urls() {
        let style = ComputedStyle::parse(
            "display: block; background-image: url(\"data:image/png;base64,AAAA\") ; color:red",
        );
        assert_eq!(style.get("display"), "block");
        assert_eq!(
            style.get("background-image"),
            "url(\"data:image/png;base64,AAAA\")"
        );
        assert_eq!(style.get("color"), "red");
        assert_eq!(style.len(), 3);
    }

    #[test]
    fn border_shorthands_expand() {
        let style = ComputedStyle::parse("border: 2px solid rgb(0, 0, 255); border-radius: 10px");
        for side in SIDES {
            assert_eq!(style.get(&format!("border-{side}-width")), "2px");
            assert_eq!(style.get(&format!("border-{side}-style")), "solid");
            assert_eq!(style.get(&format!("border-{side}-color")), "rgb(0, 0, 255)");
        }
        assert_eq!(style.get("border-bottom-left-radius"), "10px");
    }

    #[test]
    fn collects_from_pairs() {
        let style: ComputedStyle = [("opacity", "0.5"), ("position", "fixed")].into_iter().collect();
        assert_eq!(style.get("opacity"), "0.5");
        assert_eq!(style.get("position"), "fixed");
    }
}
