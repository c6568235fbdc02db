// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use croquis_render::EngineFamily;
use croquis_render_vello_cpu::FontBook;
use croquis_tokenizer::TokenizerOptions;

/// Settings for [`snapshot`](crate::snapshot).
#[derive(Clone, Debug, Default)]
pub struct Options {
    /// Logical canvas width. Defaults to the root's width.
    pub width: Option<f64>,
    /// Logical canvas height. Defaults to the root's height.
    pub height: Option<f64>,
    /// Device pixels per logical pixel. The sign is ignored; defaults to 1.
    pub scale: Option<f64>,
    /// Log the whole sorted token stream.
    pub debug: bool,
    /// Which engine's text metrics to imitate.
    pub engine: EngineFamily,
    /// Fonts for text. Text is skipped when no face matches.
    pub fonts: Arc<FontBook>,
    /// Wrapper tag names used by the text splitter.
    pub tokenizer: TokenizerOptions,
}

impl Options {
    /// The effective scale factor.
    pub fn scale(&self) -> f64 {
        self.scale.map_or(1.0, f64::abs)
    }
}
