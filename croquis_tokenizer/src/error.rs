// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::loader::ImageLoadError;

/// Fatal tokenization errors.
#[derive(Debug, thiserror::Error)]
pub enum TokenizeError {
    /// The root has no client rects, so there is no coordinate origin.
    #[error("root element has no client rects")]
    DetachedRoot,
    /// A `background-image` or `<img>` source failed to load.
    #[error("failed to load image `{src}`")]
    ImageLoad {
        /// The source, shortened for display.
        src: String,
        /// Why the load failed.
        #[source]
        source: ImageLoadError,
    },
}
