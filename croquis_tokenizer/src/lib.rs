// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Croquis Tokenizer: turns a laid-out document subtree into paint tokens.
//!
//! The tokenizer never computes layout. It reads what the host engine already
//! decided, client rects and computed styles, through the [`Document`] trait
//! and emits a flat, balanced [`Token`](croquis_tokens::Token) stream in
//! document order. Sorting by z-index and rendering happen downstream.
//!
//! Pieces:
//!
//! - [`Document`]: the DOM seam. [`MemoryDocument`] is an arena-backed
//!   implementation for tests and captured snapshots.
//! - [`ComputedStyle`]: a property map with CSS initial values as defaults.
//! - [`classify_stacking_context`]: which elements open stacking contexts and
//!   which of those isolate z ordering.
//! - [`read_state`]: per-node overflow clipping, visibility, stacking and
//!   effects.
//! - [`BoxTokenizer`]: background, border, box-shadow and image tokens for
//!   one element.
//! - [`Tokenizer`]: the depth-first walk, including text runs built from the
//!   per-character wrappers of a text splitter.
//! - [`ImageLoader`]: async image decoding; [`LocalImageLoader`] reads PNGs
//!   from `data:` URLs and the filesystem.
//!
//! # Example
//!
//! ```
//! use croquis_tokenizer::{LocalImageLoader, MemoryDocument, Tokenizer};
//! use croquis_tokens::{BoxRect, Token, check_balance};
//!
//! let mut doc = MemoryDocument::new();
//! let root = doc.append_element(
//!     None,
//!     "div",
//!     "display: block; background-color: red; border-radius: 10px",
//!     &[BoxRect::new(8.0, 8.0, 100.0, 50.0)],
//! );
//!
//! let loader = LocalImageLoader::new();
//! let tokenizer = Tokenizer::new(&doc, root, &loader).unwrap();
//! let tokens = pollster::block_on(tokenizer.tokenize()).unwrap();
//!
//! assert!(tokens.iter().any(|t| matches!(t, Token::Fill(f) if f.color == "red")));
//! assert!(check_balance(&tokens).is_ok());
//! ```

mod boxes;
mod document;
mod effects;
mod error;
mod loader;
mod stacking;
mod state;
mod style;
mod text;
mod walker;

pub use boxes::{BoxTokenizer, BoxTokens};
pub use document::{Document, MemoryDocument, NodeId, NodeKind};
pub use effects::parse_effects;
pub use error::TokenizeError;
pub use loader::{ImageLoadError, ImageLoader, LocalImageLoader, decode_image};
pub use stacking::{StackingClass, classify_stacking_context};
pub use state::{TraversalState, read_state};
pub use style::{ComputedStyle, initial_value};
pub use walker::{Tokenizer, TokenizerOptions};
