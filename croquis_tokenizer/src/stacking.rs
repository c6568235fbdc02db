// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stacking-context classification.

use crate::document::{Document, NodeKind};
use crate::style::ComputedStyle;

/// Why an element affects stacking, and whether it isolates z ordering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackingClass {
    /// True when the element establishes an independent z-order group.
    ///
    /// Flagged-only elements (opacity, transforms, filters, containment, ...)
    /// are reported with `isolated: false`.
    pub isolated: bool,
    /// The property that triggered the classification, e.g. `position: fixed`.
    pub reason: String,
}

impl StackingClass {
    fn isolated(reason: impl Into<String>) -> Self {
        Self {
            isolated: true,
            reason: reason.into(),
        }
    }

    fn flagged(reason: impl Into<String>) -> Self {
        Self {
            isolated: false,
            reason: reason.into(),
        }
    }
}

/// Properties that flag a stacking context when not `none`.
const NOT_NONE: [&str; 11] = [
    "transform",
    "scale",
    "rotate",
    "translate",
    "filter",
    "backdrop-filter",
    "perspective",
    "clip-path",
    "mask",
    "mask-image",
    "mask-border",
];

/// Classifies `node` per the CSS stacking rules; first match wins.
///
/// Returns `None` for nodes that do not affect stacking.
pub fn classify_stacking_context<D: Document>(
    document: &D,
    node: D::Node,
) -> Option<StackingClass> {
    if document.tag_name(node) == Some("html") {
        return Some(StackingClass::isolated("root"));
    }
    if document.kind(node) != NodeKind::Element {
        return None;
    }
    let initial = ComputedStyle::new();
    let style = document.computed_style(node).unwrap_or(&initial);

    let position = style.get("position");
    if matches!(position, "fixed" | "sticky") {
        return Some(StackingClass::isolated(format!("position: {position}")));
    }

    let container_type = style.get("container-type");
    if matches!(container_type, "size" | "inline-size") {
        return Some(StackingClass::flagged(format!(
            "container-type: {container_type}"
        )));
    }

    let z_index = style.get("z-index");
    if z_index != "auto" && position != "static" {
        return Some(StackingClass::isolated(format!(
            "position: {position}; z-index: {z_index}"
        )));
    }

    if let Some(reason) = flagging_property(style) {
        return Some(StackingClass::flagged(reason));
    }

    if z_index != "auto"
        && let Some(parent) = document.parent(node)
        && let Some(parent_style) = document.computed_style(parent)
    {
        match parent_style.get("display") {
            "flex" | "inline-flex" => {
                return Some(StackingClass::isolated(format!(
                    "flex-item; z-index: {z_index}"
                )));
            }
            "grid" => {
                return Some(StackingClass::isolated(format!(
                    "child of grid container; z-index: {z_index}"
                )));
            }
            _ => {}
        }
    }

    None
}

/// The first property that flags a context without isolating it.
fn flagging_property(style: &ComputedStyle) -> Option<String> {
    let opacity = style.get("opacity");
    if opacity != "1" {
        return Some(format!("opacity: {opacity}"));
    }
    for name in NOT_NONE {
        let value = style.get(name);
        if value != "none" && !value.is_empty() {
            return Some(format!("{name}: {value}"));
        }
        if name == "mask" {
            let webkit = style.get("-webkit-mask");
            if webkit != "none" && !webkit.is_empty() {
                return Some(format!("-webkit-mask: {webkit}"));
            }
        }
    }
    let blend = style.get("mix-blend-mode");
    if blend != "normal" {
        return Some(format!("mix-blend-mode: {blend}"));
    }
    if style.get("isolation") == "isolate" {
        return Some("isolation: isolate".into());
    }
    let will_change = style.get("will-change");
    if matches!(will_change, "transform" | "opacity") {
        return Some(format!("will-change: {will_change}"));
    }
    if style.get("-webkit-overflow-scrolling") == "touch" {
        return Some("-webkit-overflow-scrolling: touch".into());
    }
    let contain = style.get("contain");
    if matches!(contain, "layout" | "paint" | "strict" | "content")
        || contain.contains("paint")
        || contain.contains("layout")
    {
        return Some(format!("contain: {contain}"));
    }
    None
}
