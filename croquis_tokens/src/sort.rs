// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::Token;

#[derive(Debug)]
enum Node {
    Leaf(Token),
    Group { z_index: i32, children: Vec<Node> },
}

impl Node {
    fn z_index(&self) -> i32 {
        match self {
            Self::Leaf(_) => 0,
            Self::Group { z_index, .. } => *z_index,
        }
    }
}

/// Reorders a token stream into CSS painting order.
///
/// Each isolated [`Token::StackingContext`] becomes a group carrying its
/// z-index; every other token is a leaf at z-index 0. Children of each group
/// are stably sorted by z-index (innermost groups first), then the tree is
/// flattened. Stacking-context markers do not survive: isolated ones vanish
/// after grouping and non-isolated ones are dropped without opening a group.
///
/// A stray `EndStackingContext` is ignored and an unterminated context is
/// closed at the end of the stream.
pub fn sort_by_z_index(tokens: Vec<Token>) -> Vec<Token> {
    let len = tokens.len();
    let mut root = build_tree(tokens);
    sort_nodes(&mut root);
    let mut out = Vec::with_capacity(len);
    flatten(root, &mut out);
    out
}

fn build_tree(tokens: Vec<Token>) -> Vec<Node> {
    // Open groups, innermost last; the root sits at index 0.
    let mut groups: Vec<(i32, Vec<Node>)> = vec![(0, Vec::new())];
    // One entry per open marker: whether it opened a group.
    let mut markers: Vec<bool> = Vec::new();

    for token in tokens {
        match token {
            Token::StackingContext(ctx) => {
                markers.push(ctx.isolated);
                if ctx.isolated {
                    groups.push((ctx.z_index, Vec::new()));
                }
            }
            Token::EndStackingContext => {
                if markers.pop() == Some(true) {
                    close_group(&mut groups);
                }
            }
            token => {
                if let Some((_, children)) = groups.last_mut() {
                    children.push(Node::Leaf(token));
                }
            }
        }
    }
    while groups.len() > 1 {
        close_group(&mut groups);
    }
    groups.pop().map(|(_, children)| children).unwrap_or_default()
}

fn close_group(groups: &mut Vec<(i32, Vec<Node>)>) {
    if groups.len() < 2 {
        return;
    }
    if let Some((z_index, children)) = groups.pop()
        && let Some((_, parent)) = groups.last_mut()
    {
        parent.push(Node::Group { z_index, children });
    }
}

fn sort_nodes(nodes: &mut [Node]) {
    for node in nodes.iter_mut() {
        if let Node::Group { children, .. } = node {
            sort_nodes(children);
        }
    }
    // `sort_by_key` is stable: equal z-indices keep document order.
    nodes.sort_by_key(Node::z_index);
}

fn flatten(nodes: Vec<Node>, out: &mut Vec<Token>) {
    for node in nodes {
        match node {
            Node::Leaf(token) => out.push(token),
            Node::Group { children, .. } => flatten(children, out),
        }
    }
}
