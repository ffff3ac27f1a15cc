//! Occurrence wrappers and their normalization.
//!
//! Wrapping an expression in `?`, `*` or `+` never nests wrappers in a way
//! that changes nothing. The result of [`Expr::occur`] depends only on the
//! requested occurrence and the wrapper chain of the inner expression:
//!
//! | request | inner      | result        |
//! |---------|------------|---------------|
//! | `?`     | `Occ01(x)` | `Occ01(x)`    |
//! | `?`     | `Occ0m(x)` | `Occ0m(x)`    |
//! | `?`     | `Occ1m(x)` | `Occ0m(x)`    |
//! | `*`     | any        | `Occ0m(core)` |
//! | `+`     | `Occ1m(x)` | `Occ1m(x)`    |
//! | `+`     | `Occ01(x)` | `Occ0m(x)`    |
//! | `+`     | `Occ0m(x)` | `Occ0m(x)`    |
//!
//! where `core` is the inner expression with every wrapper stripped.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Expr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occurrence {
    /// `?` or `[...]`
    ZeroOrOne,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

impl Occurrence {
    pub fn suffix(self) -> char {
        match self {
            Occurrence::ZeroOrOne => '?',
            Occurrence::ZeroOrMore => '*',
            Occurrence::OneOrMore => '+',
        }
    }

    /// Whether the occurrence admits zero repetitions.
    pub fn is_nullable(self) -> bool {
        !matches!(self, Occurrence::OneOrMore)
    }
}

impl fmt::Display for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

impl Expr {
    /// Wraps `self` in `occurrence`, normalizing nested wrappers.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use topdown::ast::{Expr, Occurrence};
    /// let x = Expr::rule_ref("x");
    /// let once = x.clone().occur(Occurrence::OneOrMore);
    /// let twice = once.clone().occur(Occurrence::ZeroOrOne);
    /// assert_eq!(twice, Expr::Occ0m(Box::new(x)));
    /// ```
    pub fn occur(self, occurrence: Occurrence) -> Expr {
        match occurrence {
            Occurrence::ZeroOrOne => match strip_while(self, |e| matches!(e, Expr::Occ01(_))) {
                inner @ Expr::Occ0m(_) => inner,
                Expr::Occ1m(item) => Expr::Occ0m(item),
                other => Expr::Occ01(Box::new(other)),
            },
            Occurrence::ZeroOrMore => {
                let core = strip_while(self, |e| e.wrapped().is_some());
                Expr::Occ0m(Box::new(core))
            }
            Occurrence::OneOrMore => match strip_while(self, |e| matches!(e, Expr::Occ1m(_))) {
                Expr::Occ01(item) => Expr::Occ0m(item),
                inner @ Expr::Occ0m(_) => inner,
                other => Expr::Occ1m(Box::new(other)),
            },
        }
    }

    /// The occurrence of this node, if it is a wrapper.
    pub fn occurrence(&self) -> Option<Occurrence> {
        match self {
            Expr::Occ01(_) => Some(Occurrence::ZeroOrOne),
            Expr::Occ0m(_) => Some(Occurrence::ZeroOrMore),
            Expr::Occ1m(_) => Some(Occurrence::OneOrMore),
            _ => None,
        }
    }
}

/// Unwraps wrappers for as long as `strip` holds for the current node.
fn strip_while(mut expr: Expr, strip: impl Fn(&Expr) -> bool) -> Expr {
    while strip(&expr) {
        expr = match expr {
            Expr::Occ01(item) | Expr::Occ0m(item) | Expr::Occ1m(item) => *item,
            other => return other,
        };
    }
    expr
}
