//! A recursive-descent engine for a small grammar-definition language.
//!
//! The engine reads grammar text such as
//!
//! ```text
//! expr: term ('+' term)*
//! term: r'\d+' | '\(' expr '\)'
//! ```
//!
//! into a [`Grammar`] of rule definitions. When the text does not parse,
//! the result is a [`ParseFailure`] naming where the parse stopped, the
//! chain of rules that led there and the patterns that were tried.
//!
//! ```rust
//! let grammar = topdown::parse_grammar("a: 'x' | b\nb: 'y'").unwrap();
//! assert_eq!(grammar.rules.len(), 2);
//!
//! let failure = topdown::parse_grammar("a:").unwrap_err();
//! assert_eq!(failure.position().col, 2);
//! ```

pub mod ast;
pub mod diagnostics;
pub mod driver;
pub mod engine;
pub mod source;
mod stack;
pub mod tokens;

pub use crate::ast::{ArgValue, Args, Expr, Grammar, Occurrence, Pattern, RuleDef};
pub use crate::diagnostics::{ConfigError, FailureRecord, ParseFailure};
pub use crate::driver::{parse, parse_grammar, parse_rule, parse_with, ParseOptions, ParseOutcome};
pub use crate::engine::rules::{Product, RuleId};
pub use crate::engine::{Parser, ScanError, ScanResult};
pub use crate::source::Position;
pub use crate::tokens::Token;
