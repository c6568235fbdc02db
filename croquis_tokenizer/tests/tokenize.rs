// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end tests for `croquis_tokenizer`.
//!
//! These build small documents with `MemoryDocument`, run the full walk and
//! check the token stream, including after z-index sorting.

use croquis_tokenizer::{LocalImageLoader, MemoryDocument, NodeId, TokenizeError, Tokenizer};
use croquis_tokens::{BoxRect, Filter, PathSegment, Shape, Token, check_balance, sort_by_z_index};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn tokenize(doc: &MemoryDocument, root: NodeId) -> Result<Vec<Token>, TokenizeError> {
    init_tracing();
    let loader = LocalImageLoader::new();
    let tokenizer = Tokenizer::new(doc, root, &loader)?;
    pollster::block_on(tokenizer.tokenize())
}

fn fills(tokens: &[Token]) -> Vec<&croquis_tokens::Fill> {
    tokens
        .iter()
        .filter_map(|t| match t {
            Token::Fill(fill) => Some(fill),
            _ => None,
        })
        .collect()
}

#[test]
fn rounded_red_div() {
    let mut doc = MemoryDocument::new();
    let root = doc.append_element(
        None,
        "div",
        "display: block; width: 100px; height: 50px; background-color: red; border-radius: 10px",
        &[BoxRect::new(0.0, 0.0, 100.0, 50.0)],
    );
    let tokens = tokenize(&doc, root).expect("tokenizes");
    check_balance(&tokens).expect("balanced");

    let [fill] = fills(&tokens)[..] else {
        panic!("expected one fill");
    };
    assert_eq!(fill.color, "red");
    let Shape::Path(path) = &fill.shape else {
        panic!("expected a path");
    };
    let arcs: Vec<(f64, f64)> = path
        .segments
        .iter()
        .filter_map(|s| match *s {
            PathSegment::Arc { rx, ry, .. } => Some((rx, ry)),
            _ => None,
        })
        .collect();
    assert_eq!(arcs, vec![(10.0, 10.0); 4]);
    assert_eq!(
        tokens.first(),
        Some(&Token::Transform(croquis_tokens::Transform::translate(0.0, 0.0)))
    );
}

#[test]
fn box_shadow_is_blurred_and_excluded() {
    let mut doc = MemoryDocument::new();
    let root = doc.append_element(
        None,
        "div",
        "display: block; box-shadow: rgba(0, 0, 0, 0.5) 5px 5px 10px 0px",
        &[BoxRect::new(20.0, 20.0, 100.0, 50.0)],
    );
    let tokens = tokenize(&doc, root).expect("tokenizes");
    check_balance(&tokens).expect("balanced");

    let blurred: Vec<_> = fills(&tokens)
        .into_iter()
        .filter(|fill| fill.filter == Some(Filter::Blur(10.0)))
        .collect();
    assert_eq!(blurred.len(), 1);
    let shadow_at = tokens
        .iter()
        .position(|t| matches!(t, Token::Fill(_)))
        .expect("shadow");
    let Token::Clip(exclusion) = &tokens[shadow_at - 1] else {
        panic!("the exclusion clip precedes the shadow");
    };
    assert_eq!((blurred[0].x - exclusion.x, blurred[0].y - exclusion.y), (5.0, 5.0));
}

#[test]
fn z_index_sorting_reorders_siblings() {
    let mut doc = MemoryDocument::new();
    let root = doc.append_element(None, "div", "display: block", &[BoxRect::new(0.0, 0.0, 100.0, 100.0)]);
    doc.append_element(
        Some(root),
        "div",
        "display: block; position: relative; z-index: 2; background-color: rgb(255, 0, 0)",
        &[BoxRect::new(0.0, 0.0, 50.0, 50.0)],
    );
    doc.append_element(
        Some(root),
        "div",
        "display: block; position: absolute; z-index: -1; background-color: rgb(0, 0, 255)",
        &[BoxRect::new(0.0, 0.0, 50.0, 50.0)],
    );
    doc.append_element(
        Some(root),
        "div",
        "display: block; background-color: rgb(0, 255, 0)",
        &[BoxRect::new(0.0, 50.0, 50.0, 50.0)],
    );

    let tokens = tokenize(&doc, root).expect("tokenizes");
    let document_order: Vec<&str> = fills(&tokens).iter().map(|f| f.color.as_str()).collect();
    assert_eq!(document_order, ["rgb(255, 0, 0)", "rgb(0, 0, 255)", "rgb(0, 255, 0)"]);

    let sorted = sort_by_z_index(tokens);
    check_balance(&sorted).expect("sorting keeps balance");
    let paint_order: Vec<&str> = fills(&sorted).iter().map(|f| f.color.as_str()).collect();
    assert_eq!(paint_order, ["rgb(0, 0, 255)", "rgb(0, 255, 0)", "rgb(255, 0, 0)"]);
    assert!(!sorted.iter().any(|t| matches!(t, Token::StackingContext(_))));
}

#[test]
fn failed_image_aborts_the_pass() {
    let mut doc = MemoryDocument::new();
    let root = doc.append_element(None, "div", "display: block", &[BoxRect::new(0.0, 0.0, 10.0, 10.0)]);
    let img = doc.append_element(Some(root), "img", "", &[BoxRect::new(0.0, 0.0, 10.0, 10.0)]);
    doc.set_attribute(img, "src", "/definitely/missing/image.png");

    let err = tokenize(&doc, root).expect_err("load fails");
    let TokenizeError::ImageLoad { src, .. } = &err else {
        panic!("expected an image load error, got {err:?}");
    };
    assert_eq!(src, "/definitely/missing/image.png");
}

#[test]
fn detached_root_is_rejected() {
    let mut doc = MemoryDocument::new();
    let root = doc.append_element(None, "div", "display: none", &[]);
    assert!(matches!(tokenize(&doc, root), Err(TokenizeError::DetachedRoot)));
}

#[test]
fn wrapped_text_and_boxes_stay_balanced() {
    let mut doc = MemoryDocument::new();
    let root = doc.append_element(
        None,
        "div",
        "display: block; overflow: hidden; border: 1px solid rgb(0, 0, 0)",
        &[BoxRect::new(0.0, 0.0, 100.0, 100.0)],
    );
    let span = doc.append_element(
        Some(root),
        "span",
        "background-color: yellow; opacity: 0.8; box-shadow: inset 1px 1px 2px rgb(0, 0, 0)",
        &[BoxRect::new(80.0, 0.0, 20.0, 16.0), BoxRect::new(0.0, 16.0, 30.0, 16.0)],
    );
    let line = doc.append_element(Some(span), "x-text", "", &[]);
    let mut x = 0.0;
    for ch in "wrap".chars() {
        let grapheme = doc.append_element(Some(line), "x-char", "", &[BoxRect::new(x, 16.0, 8.0, 16.0)]);
        doc.append_text(grapheme, &ch.to_string());
        x += 8.0;
    }

    let tokens = tokenize(&doc, root).expect("tokenizes");
    check_balance(&tokens).expect("balanced");
    let texts: Vec<&str> = tokens
        .iter()
        .filter_map(|t| t.as_text().map(|t| t.text.as_str()))
        .collect();
    assert_eq!(texts, ["wrap"]);
}
