// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node traversal state.

use croquis_tokens::Effect;

use crate::document::{Document, NodeKind};
use crate::effects::parse_effects;
use crate::stacking::{StackingClass, classify_stacking_context};
use crate::style::ComputedStyle;

/// What the walker knows about a node when it is entered.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TraversalState {
    /// The element clips its overflow to its border box.
    pub clip_overflow: bool,
    /// The node and its whole subtree paint nothing.
    pub hidden: bool,
    /// Stacking classification of the node, if any.
    pub stacking_context: Option<StackingClass>,
    /// Layer effects the node carries.
    pub effects: Option<Effect>,
}

/// Computes `node`'s state from its computed style and its parent's state.
///
/// `hidden` is sticky: once an ancestor is hidden, so is every descendant.
/// Non-elements inherit `hidden` and nothing else.
pub fn read_state<D: Document>(
    document: &D,
    node: D::Node,
    parent: &TraversalState,
) -> TraversalState {
    if document.kind(node) != NodeKind::Element {
        return TraversalState {
            hidden: parent.hidden,
            ..TraversalState::default()
        };
    }
    let initial = ComputedStyle::new();
    let style = document.computed_style(node).unwrap_or(&initial);

    let display = style.get("display");
    let clip_overflow = !matches!(
        display,
        "inline" | "inline flow" | "none" | "contents" | "table" | "table-row"
    ) && matches!(style.get("overflow"), "hidden" | "clip" | "scroll" | "auto");

    let hidden = parent.hidden
        || display == "none"
        || style.get("opacity") == "0"
        || style.get("visibility") == "hidden";

    TraversalState {
        clip_overflow,
        hidden,
        stacking_context: classify_stacking_context(document, node),
        effects: parse_effects(style),
    }
}
