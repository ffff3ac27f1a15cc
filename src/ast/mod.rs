//! AST module for grammar definitions
//!
//! This module provides the node types produced by the bootstrap grammar:
//! a [`Grammar`] holding [`RuleDef`]s whose bodies are [`Expr`] trees.
//! Nodes are built bottom-up once their rule body has parsed and are never
//! mutated afterwards.
//!
//! Two invariants hold for every tree built through this module:
//!
//! - `Or` and `Seq` always have at least two children; a single child is
//!   returned as itself by [`Expr::alternation`] and [`Expr::sequence`].
//! - Occurrence wrappers are normalized, see [`occurrence`].

// ============================================================================
// IMPORTS
// ============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod analysis;
pub mod occurrence;
pub mod value;

pub use occurrence::Occurrence;
pub use value::{ArgValue, Args};

use value::write_quoted;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// A whole grammar: optional top-level options, then its rules in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grammar {
    pub options: Option<Args>,
    pub rules: Vec<RuleDef>,
}

/// A single `name: [@(...)] body` definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDef {
    pub name: String,
    pub body: Expr,
    pub args: Option<Args>,
}

/// A terminal matched by a regular expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    /// The decoded regular-expression source.
    pub source: String,
    pub args: Option<Args>,
}

/// A rule body expression.
///
/// # Examples
///
/// ```rust
/// use topdown::ast::Expr;
/// let single = Expr::alternation(vec![Expr::rule_ref("a")]);
/// assert_eq!(single, Expr::rule_ref("a"));
/// let both = Expr::alternation(vec![Expr::rule_ref("a"), Expr::rule_ref("b")]);
/// assert_eq!(both.to_string(), "a | b");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Ordered choice; first matching alternative wins.
    Or(Vec<Expr>),
    Seq(Vec<Expr>),
    /// Zero or one.
    Occ01(Box<Expr>),
    /// Zero or more.
    Occ0m(Box<Expr>),
    /// One or more.
    Occ1m(Box<Expr>),
    Pattern(Pattern),
    RuleRef(String),
    /// An embedded, opaque code block.
    Code(String),
}

// ============================================================================
// CONSTRUCTORS
// ============================================================================

impl Expr {
    /// Builds an ordered choice, collapsing a single alternative to itself.
    pub fn alternation(items: Vec<Expr>) -> Expr {
        collapse(items, Expr::Or)
    }

    /// Builds a sequence, collapsing a single item to itself.
    pub fn sequence(items: Vec<Expr>) -> Expr {
        collapse(items, Expr::Seq)
    }

    pub fn pattern(source: impl Into<String>) -> Expr {
        Expr::Pattern(Pattern {
            source: source.into(),
            args: None,
        })
    }

    pub fn pattern_with_args(source: impl Into<String>, args: Option<Args>) -> Expr {
        Expr::Pattern(Pattern {
            source: source.into(),
            args,
        })
    }

    pub fn rule_ref(name: impl Into<String>) -> Expr {
        Expr::RuleRef(name.into())
    }

    /// Builds a code block; surrounding whitespace is not part of the code.
    pub fn code(text: &str) -> Expr {
        Expr::Code(text.trim().to_string())
    }

    /// The node directly inside an occurrence wrapper, if this is one.
    pub fn wrapped(&self) -> Option<&Expr> {
        match self {
            Expr::Occ01(item) | Expr::Occ0m(item) | Expr::Occ1m(item) => Some(item),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Expr::Or(_) => "ExprOr",
            Expr::Seq(_) => "ExprSeq",
            Expr::Occ01(_) => "ExprOcc01",
            Expr::Occ0m(_) => "ExprOcc0m",
            Expr::Occ1m(_) => "ExprOcc1m",
            Expr::Pattern(_) => "Pattern",
            Expr::RuleRef(_) => "RuleRef",
            Expr::Code(_) => "Code",
        }
    }
}

fn collapse(mut items: Vec<Expr>, wrap: fn(Vec<Expr>) -> Expr) -> Expr {
    if items.len() == 1 {
        if let Some(only) = items.pop() {
            return only;
        }
    }
    wrap(items)
}

impl Pattern {
    /// Key of the argument carrying regular-expression flags.
    pub const FLAGS_ARG: &'static str = "flags";

    /// The pattern's flags argument, `"0"` when absent.
    pub fn flags(&self) -> &str {
        self.args
            .as_ref()
            .and_then(|args| args.get(Self::FLAGS_ARG))
            .and_then(ArgValue::as_str)
            .unwrap_or("0")
    }
}

impl Grammar {
    /// Looks up a rule definition by name.
    pub fn rule(&self, name: &str) -> Option<&RuleDef> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.name.as_str())
    }

    /// Serializes the tree as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ============================================================================
// PRETTY PRINTING
// ============================================================================

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(options) = &self.options {
            writeln!(f, "{}", ArgsBlock(options))?;
        }
        for rule in &self.rules {
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}

impl fmt::Display for RuleDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.name)?;
        if let Some(args) = &self.args {
            write!(f, "{} ", ArgsBlock(args))?;
        }
        write!(f, "{}", self.body)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_quoted(f, &self.source)?;
        if let Some(args) = &self.args {
            write!(f, " {}", ArgsBlock(args))?;
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Or(items) => write_joined(f, items, " | ", |item| matches!(item, Expr::Or(_))),
            Expr::Seq(items) => write_joined(f, items, " ", |item| {
                matches!(item, Expr::Or(_) | Expr::Seq(_))
            }),
            Expr::Occ01(item) => write_suffixed(f, item, '?'),
            Expr::Occ0m(item) => write_suffixed(f, item, '*'),
            Expr::Occ1m(item) => write_suffixed(f, item, '+'),
            Expr::Pattern(pattern) => write!(f, "{pattern}"),
            Expr::RuleRef(name) => f.write_str(name),
            Expr::Code(text) => {
                let fence = "`".repeat(longest_backtick_run(text) + 1);
                write!(f, "{fence} {text} {fence}")
            }
        }
    }
}

/// Writes `items` separated by `sep`, parenthesizing those `nested` selects
/// so that the printed text parses back to the same tree.
fn write_joined(
    f: &mut fmt::Formatter<'_>,
    items: &[Expr],
    sep: &str,
    nested: fn(&Expr) -> bool,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        if nested(item) {
            write!(f, "({item})")?;
        } else {
            write!(f, "{item}")?;
        }
    }
    Ok(())
}

fn write_suffixed(f: &mut fmt::Formatter<'_>, item: &Expr, suffix: char) -> fmt::Result {
    match item {
        Expr::RuleRef(_) | Expr::Pattern(_) => write!(f, "{item}{suffix}"),
        _ => write!(f, "({item}){suffix}"),
    }
}

fn longest_backtick_run(text: &str) -> usize {
    text.split(|c| c != '`').map(str::len).max().unwrap_or(0)
}

struct ArgsBlock<'a>(&'a Args);

impl fmt::Display for ArgsBlock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("@(")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_composites_collapse() {
        assert_eq!(Expr::sequence(vec![Expr::pattern("x")]), Expr::pattern("x"));
        assert_eq!(
            Expr::alternation(vec![Expr::rule_ref("a"), Expr::rule_ref("b")]),
            Expr::Or(vec![Expr::rule_ref("a"), Expr::rule_ref("b")])
        );
    }

    #[test]
    fn code_is_trimmed_and_fenced_past_its_own_backticks() {
        let code = Expr::code("  a `b` ``c`` \n");
        assert_eq!(code, Expr::Code("a `b` ``c``".to_string()));
        assert_eq!(code.to_string(), "``` a `b` ``c`` ```");
    }

    #[test]
    fn pattern_flags_default_to_zero() {
        let Expr::Pattern(plain) = Expr::pattern("x") else {
            panic!("expected a pattern");
        };
        assert_eq!(plain.flags(), "0");

        let mut args = Args::new();
        args.insert("flags".to_string(), ArgValue::Str("re.I".to_string()));
        let Expr::Pattern(flagged) = Expr::pattern_with_args("x", Some(args)) else {
            panic!("expected a pattern");
        };
        assert_eq!(flagged.flags(), "re.I");
    }

    #[test]
    fn display_uses_grammar_notation() {
        let body = Expr::sequence(vec![
            Expr::Occ01(Box::new(Expr::pattern("x"))),
            Expr::alternation(vec![Expr::rule_ref("a"), Expr::rule_ref("b")]),
            Expr::Occ1m(Box::new(Expr::sequence(vec![
                Expr::rule_ref("c"),
                Expr::rule_ref("d"),
            ]))),
        ]);
        let rule = RuleDef {
            name: "r".to_string(),
            body,
            args: None,
        };
        assert_eq!(rule.to_string(), "r: 'x'? (a | b) (c d)+");
    }

    #[test]
    fn grammar_lookup_by_name() {
        let grammar = Grammar {
            options: None,
            rules: vec![
                RuleDef {
                    name: "a".to_string(),
                    body: Expr::rule_ref("b"),
                    args: None,
                },
                RuleDef {
                    name: "b".to_string(),
                    body: Expr::pattern("y"),
                    args: None,
                },
            ],
        };
        assert_eq!(grammar.rule("b").map(|r| &r.body), Some(&Expr::pattern("y")));
        assert!(grammar.rule("c").is_none());
        assert_eq!(grammar.rule_names().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
