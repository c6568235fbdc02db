// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use crate::Token;

/// Kinds of scoped tokens.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// `StackingContext` / `EndStackingContext`
    StackingContext,
    /// `Clip` / `EndClip`
    Clip,
    /// `Transform` / `EndTransform`
    Transform,
    /// `Effect` / `EndEffect`
    Effect,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StackingContext => "stacking context",
            Self::Clip => "clip",
            Self::Transform => "transform",
            Self::Effect => "effect",
        })
    }
}

/// A violation of the LIFO pairing of scoped tokens.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BalanceError {
    /// An end token with no open scope.
    #[error("token {index} closes a {scope} but nothing is open")]
    Unopened {
        /// Position in the stream.
        index: usize,
        /// Scope the token tried to close.
        scope: Scope,
    },
    /// An end token that does not match the innermost open scope.
    #[error("token {index} closes a {found} but the innermost open scope is a {expected}")]
    Mismatched {
        /// Position in the stream.
        index: usize,
        /// Innermost open scope.
        expected: Scope,
        /// Scope the token tried to close.
        found: Scope,
    },
    /// Scopes still open at the end of the stream.
    #[error("{count} scope(s) left open, innermost is a {innermost}")]
    Unclosed {
        /// Number of open scopes.
        count: usize,
        /// Innermost open scope.
        innermost: Scope,
    },
}

/// Checks that every scoped token is closed exactly once, in LIFO order.
pub fn check_balance(tokens: &[Token]) -> Result<(), BalanceError> {
    let mut open = Vec::new();
    for (index, token) in tokens.iter().enumerate() {
        if let Some(scope) = token.opens() {
            open.push(scope);
        } else if let Some(scope) = token.closes() {
            match open.pop() {
                None => return Err(BalanceError::Unopened { index, scope }),
                Some(expected) if expected != scope => {
                    return Err(BalanceError::Mismatched {
                        index,
                        expected,
                        found: scope,
                    });
                }
                Some(_) => {}
            }
        }
    }
    match open.last() {
        Some(&innermost) => Err(BalanceError::Unclosed {
            count: open.len(),
            innermost,
        }),
        None => Ok(()),
    }
}
