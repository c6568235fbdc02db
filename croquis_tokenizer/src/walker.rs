// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Depth-first document walk.

use croquis_css::{parse_length, parse_z_index};
use croquis_tokens::{BoxRect, StackingContext, Token};

use crate::boxes::BoxTokenizer;
use crate::document::{Document, NodeKind};
use crate::error::TokenizeError;
use crate::loader::ImageLoader;
use crate::state::{TraversalState, read_state};
use crate::style::ComputedStyle;
use crate::text::{SPACING_TRIM, is_same_line, text_token};

/// Tag names of the synthetic elements a text splitter wraps text in.
///
/// Wrappers paint no box of their own; the per-character wrapper's rect is
/// the glyph's rect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// Per-line wrapper, `x-text` by default.
    pub text_wrapper_tag: String,
    /// Per-character wrapper, `x-char` by default.
    pub char_wrapper_tag: String,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            text_wrapper_tag: "x-text".into(),
            char_wrapper_tag: "x-char".into(),
        }
    }
}

/// Scopes a node opened on entry, closed again on exit.
#[derive(Copy, Clone, Debug, Default)]
struct Opened {
    stacking_context: bool,
    effect: bool,
    clip: bool,
}

impl Opened {
    fn close(self, tokens: &mut Vec<Token>) {
        if self.clip {
            tokens.push(Token::EndClip);
        }
        if self.effect {
            tokens.push(Token::EndEffect);
        }
        if self.stacking_context {
            tokens.push(Token::EndStackingContext);
        }
    }
}

#[derive(Debug)]
struct Frame<N> {
    node: N,
    state: TraversalState,
    opened: Opened,
}

/// Turns the subtree under a root node into a token stream.
///
/// Output coordinates are relative to the root's first client rect.
#[derive(Debug)]
pub struct Tokenizer<'a, D: Document, L> {
    document: &'a D,
    root: D::Node,
    loader: &'a L,
    options: TokenizerOptions,
    root_rect: BoxRect,
    pixel: f64,
}

impl<'a, D: Document, L: ImageLoader> Tokenizer<'a, D, L> {
    /// Prepares to tokenize the subtree under `root`.
    ///
    /// # Errors
    ///
    /// [`TokenizeError::DetachedRoot`] when `root` has no client rects.
    pub fn new(document: &'a D, root: D::Node, loader: &'a L) -> Result<Self, TokenizeError> {
        let root_rect = document
            .client_rects(root)
            .first()
            .copied()
            .ok_or(TokenizeError::DetachedRoot)?;
        let initial = ComputedStyle::new();
        let font_size = parse_length(
            document
                .computed_style(root)
                .unwrap_or(&initial)
                .get("font-size"),
        );
        let pixel = if font_size.is_finite() && font_size > 0.0 {
            font_size / 16.0
        } else {
            1.0
        };
        Ok(Self {
            document,
            root,
            loader,
            options: TokenizerOptions::default(),
            root_rect,
            pixel,
        })
    }

    /// Replaces the wrapper tag names.
    #[must_use]
    pub fn with_options(mut self, options: TokenizerOptions) -> Self {
        self.options = options;
        self
    }

    /// The root's first client rect, the output coordinate origin.
    pub fn root_rect(&self) -> BoxRect {
        self.root_rect
    }

    /// One root pixel unit: the root font size over 16.
    pub fn pixel(&self) -> f64 {
        self.pixel
    }

    /// Walks the subtree and returns its tokens in document order.
    ///
    /// Every scope token is balanced. Images are loaded one at a time, in
    /// document order.
    ///
    /// # Errors
    ///
    /// [`TokenizeError::ImageLoad`] aborts the whole pass.
    pub async fn tokenize(&self) -> Result<Vec<Token>, TokenizeError> {
        let mut tokens = Vec::new();
        let mut stack: Vec<Frame<D::Node>> = Vec::new();
        let mut last_text_parent = None;
        let outer = TraversalState::default();

        let mut node = self.root;
        loop {
            let parent = stack.last().map_or(&outer, |frame| &frame.state);
            let state = read_state(self.document, node, parent);
            let opened = self
                .enter(node, &state, &mut tokens, &mut last_text_parent)
                .await?;
            stack.push(Frame {
                node,
                state,
                opened,
            });

            if let Some(child) = self.document.first_child(node) {
                node = child;
                continue;
            }

            // Close scopes until a node with an unvisited sibling is found.
            loop {
                let Some(frame) = stack.pop() else {
                    return Ok(self.finish(tokens));
                };
                frame.opened.close(&mut tokens);
                if frame.node == self.root {
                    return Ok(self.finish(tokens));
                }
                if let Some(next) = self.document.next_sibling(frame.node) {
                    node = next;
                    break;
                }
            }
        }
    }

    fn finish(&self, tokens: Vec<Token>) -> Vec<Token> {
        tracing::debug!(root = ?self.root, tokens = tokens.len(), "tokenized subtree");
        tokens
    }

    async fn enter(
        &self,
        node: D::Node,
        state: &TraversalState,
        tokens: &mut Vec<Token>,
        last_text_parent: &mut Option<D::Node>,
    ) -> Result<Opened, TokenizeError> {
        let mut opened = Opened::default();
        if state.hidden {
            return Ok(opened);
        }

        if let Some(class) = &state.stacking_context {
            let z_index = if class.isolated {
                self.document
                    .computed_style(node)
                    .and_then(|style| parse_z_index(style.get("z-index")))
                    .unwrap_or(0)
            } else {
                0
            };
            tokens.push(Token::StackingContext(StackingContext {
                z_index,
                reason: class.reason.clone(),
                isolated: class.isolated,
            }));
            opened.stacking_context = true;
        }
        if let Some(effect) = state.effects {
            tokens.push(Token::Effect(effect));
            opened.effect = true;
        }

        match self.document.kind(node) {
            NodeKind::Element if !self.is_wrapper(node) => {
                let boxes = BoxTokenizer::new(self.document, self.loader, self.root_rect)
                    .tokenize(node, state.clip_overflow)
                    .await?;
                tracing::debug!(
                    tag = self.document.tag_name(node).unwrap_or_default(),
                    tokens = boxes.tokens.len(),
                    "tokenized box"
                );
                opened.clip = boxes.clipped;
                tokens.extend(boxes.tokens);
            }
            NodeKind::Text => self.push_text(node, tokens, last_text_parent),
            _ => {}
        }
        Ok(opened)
    }

    fn is_wrapper(&self, node: D::Node) -> bool {
        self.document.tag_name(node).is_some_and(|tag| {
            tag == self.options.text_wrapper_tag || tag == self.options.char_wrapper_tag
        })
    }

    /// Starts a text run or extends the previous one.
    ///
    /// The text node sits in `parent > line wrapper > char wrapper > #text`;
    /// the char wrapper gives the rect and `parent` the font.
    fn push_text(
        &self,
        node: D::Node,
        tokens: &mut Vec<Token>,
        last_text_parent: &mut Option<D::Node>,
    ) {
        let Some(text) = self.document.text(node) else {
            return;
        };
        if text.chars().all(char::is_whitespace) {
            if let Some(prev) = tokens.last_mut().and_then(Token::as_text_mut) {
                prev.text.push_str(text);
            }
            return;
        }

        let Some(grapheme) = self.document.parent(node) else {
            return;
        };
        let logical = self
            .document
            .parent(grapheme)
            .and_then(|line| self.document.parent(line))
            .unwrap_or(grapheme);
        let Some(rect) = self
            .document
            .client_rects(grapheme)
            .first()
            .map(|r| r.translate(-self.root_rect.x, -self.root_rect.y))
        else {
            return;
        };
        if !rect.is_finite() || !rect.has_area() {
            return;
        }

        if let Some(prev) = tokens.last_mut().and_then(Token::as_text_mut)
            && *last_text_parent == Some(logical)
            && !text.chars().next().is_some_and(|c| SPACING_TRIM.contains(c))
            && is_same_line(rect, BoxRect::new(prev.x, prev.y, prev.width, prev.height))
        {
            prev.text.push_str(text);
            prev.width = rect.x + rect.width - prev.x;
            return;
        }

        let initial = ComputedStyle::new();
        let style = self.document.computed_style(logical).unwrap_or(&initial);
        tokens.push(Token::Text(Box::new(text_token(style, rect, text, self.pixel))));
        *last_text_parent = Some(logical);
    }
}
