// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use croquis_css::parse_length;
use croquis_tokens::{BlendMode, Effect};

use crate::style::ComputedStyle;

/// Reads the layer effects an element carries.
///
/// Opacity counts when the computed value is not `1` and parses to a finite
/// number; blend mode counts when it is not `normal`. Returns `None` when
/// neither applies.
pub fn parse_effects(style: &ComputedStyle) -> Option<Effect> {
    let mut effect = Effect::default();

    let opacity = style.get("opacity");
    if opacity != "1" {
        let value = parse_length(opacity);
        if value.is_finite() {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "opacity is a unit fraction"
            )]
            let value = value.clamp(0.0, 1.0) as f32;
            effect.opacity = Some(value);
        }
    }

    let blend = style.get("mix-blend-mode");
    if blend != "normal" {
        match blend.parse::<BlendMode>() {
            Ok(mode) => effect.blend_mode = Some(mode),
            Err(err) => tracing::warn!("ignoring mix-blend-mode: {err}"),
        }
    }

    (!effect.is_empty()).then_some(effect)
}
