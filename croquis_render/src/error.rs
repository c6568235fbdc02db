// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use croquis_tokens::BalanceError;

/// Fatal rendering errors.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RenderError {
    /// No drawing surface could be created for the requested size.
    #[error("no drawing surface for a {width}x{height} pixel canvas")]
    MissingContext {
        /// Requested width in device pixels.
        width: f64,
        /// Requested height in device pixels.
        height: f64,
    },
    /// The token stream does not nest its scopes correctly.
    #[error("unbalanced token stream")]
    Unbalanced(#[from] BalanceError),
}
