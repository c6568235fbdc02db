// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Croquis: paints a laid-out document subtree into a bitmap.
//!
//! The pipeline has three stages, each its own crate:
//!
//! 1. [`croquis_tokenizer`] walks a [`Document`] and emits paint tokens in
//!    document order.
//! 2. [`croquis_tokens::sort_by_z_index`] reorders them into CSS painting
//!    order.
//! 3. [`croquis_render`] replays them onto a surface, here a
//!    [`VelloCpuSurface`].
//!
//! [`snapshot`] runs all three. It is async because image loads are; drive
//! it with any executor.
//!
//! ```
//! use croquis::{Options, snapshot};
//! use croquis_tokenizer::{LocalImageLoader, MemoryDocument};
//! use croquis_tokens::BoxRect;
//!
//! let mut doc = MemoryDocument::new();
//! let root = doc.append_element(
//!     None,
//!     "div",
//!     "display: block; background-color: rgb(0, 0, 255)",
//!     &[BoxRect::new(0.0, 0.0, 4.0, 2.0)],
//! );
//! let options = Options { scale: Some(2.0), ..Options::default() };
//! let shot = pollster::block_on(snapshot(&doc, root, &LocalImageLoader::new(), &options)).unwrap();
//!
//! assert_eq!((shot.width, shot.height), (8, 4));
//! assert_eq!(shot.pixel(7, 3), Some([0, 0, 255, 255]));
//! ```

mod error;
mod options;
mod snapshot;

pub use croquis_render::EngineFamily;
pub use croquis_render_vello_cpu::{FontBook, FontError, VelloCpuSurface};
pub use croquis_tokenizer::{Document, ImageLoader, LocalImageLoader, MemoryDocument};

pub use error::Error;
pub use options::Options;
pub use snapshot::{Snapshot, snapshot};
