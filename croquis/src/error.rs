// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use croquis_render::RenderError;
use croquis_tokenizer::TokenizeError;

/// Everything [`snapshot`](crate::snapshot) can fail with.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document could not be tokenized.
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    /// The canvas could not be created or the stream was malformed.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// PNG encoding failed.
    #[error("failed to encode PNG: {0}")]
    Png(#[from] png::EncodingError),
}
