//! The closed registry of bootstrap rules.
//!
//! Rule names are resolved to [`RuleId`] once, before parsing starts. An
//! unknown name is therefore a configuration error and never a parse
//! failure. Each rule's handler returns its own Rust type; [`Product`]
//! erases that type only at the root, where the driver may run any rule.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ast::{ArgValue, Args, Expr, Grammar, RuleDef};
use crate::diagnostics::ConfigError;

use super::{Parser, ScanResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    All,
    End,
    ArgsDef,
    ArgsSign,
    ArgsGroup,
    BrktBeg,
    BrktEnd,
    ArgItem,
    ArgExpr,
    ArgKey,
    ArgKvsep,
    ArgVal,
    LitVal,
    LitStr,
    LitNum,
    LitBool,
    LitNone,
    ArgSep,
    RuleSeq,
    RuleDef,
    RuleName,
    RuleColon,
    OrExpr,
    OrExprOp,
    SeqExpr,
    Code,
    OccExpr,
    Occ01Group,
    SqrbrktBeg,
    SqrbrktEnd,
    Occ01Trailer,
    Occ0mTrailer,
    Occ1mTrailer,
    Atom,
    RegexStr,
    RuleRef,
    Group,
}

/// Type-erased handler of a root rule.
pub type RuleFn<'a> = fn(&mut Parser<'a>) -> ScanResult<Product>;

impl RuleId {
    pub const ALL: [RuleId; 37] = [
        RuleId::All,
        RuleId::End,
        RuleId::ArgsDef,
        RuleId::ArgsSign,
        RuleId::ArgsGroup,
        RuleId::BrktBeg,
        RuleId::BrktEnd,
        RuleId::ArgItem,
        RuleId::ArgExpr,
        RuleId::ArgKey,
        RuleId::ArgKvsep,
        RuleId::ArgVal,
        RuleId::LitVal,
        RuleId::LitStr,
        RuleId::LitNum,
        RuleId::LitBool,
        RuleId::LitNone,
        RuleId::ArgSep,
        RuleId::RuleSeq,
        RuleId::RuleDef,
        RuleId::RuleName,
        RuleId::RuleColon,
        RuleId::OrExpr,
        RuleId::OrExprOp,
        RuleId::SeqExpr,
        RuleId::Code,
        RuleId::OccExpr,
        RuleId::Occ01Group,
        RuleId::SqrbrktBeg,
        RuleId::SqrbrktEnd,
        RuleId::Occ01Trailer,
        RuleId::Occ0mTrailer,
        RuleId::Occ1mTrailer,
        RuleId::Atom,
        RuleId::RegexStr,
        RuleId::RuleRef,
        RuleId::Group,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RuleId::All => "all",
            RuleId::End => "end",
            RuleId::ArgsDef => "args_def",
            RuleId::ArgsSign => "args_sign",
            RuleId::ArgsGroup => "args_group",
            RuleId::BrktBeg => "brkt_beg",
            RuleId::BrktEnd => "brkt_end",
            RuleId::ArgItem => "arg_item",
            RuleId::ArgExpr => "arg_expr",
            RuleId::ArgKey => "arg_key",
            RuleId::ArgKvsep => "arg_kvsep",
            RuleId::ArgVal => "arg_val",
            RuleId::LitVal => "lit_val",
            RuleId::LitStr => "lit_str",
            RuleId::LitNum => "lit_num",
            RuleId::LitBool => "lit_bool",
            RuleId::LitNone => "lit_none",
            RuleId::ArgSep => "arg_sep",
            RuleId::RuleSeq => "rule_seq",
            RuleId::RuleDef => "rule_def",
            RuleId::RuleName => "rule_name",
            RuleId::RuleColon => "rule_colon",
            RuleId::OrExpr => "or_expr",
            RuleId::OrExprOp => "or_expr_op",
            RuleId::SeqExpr => "seq_expr",
            RuleId::Code => "code",
            RuleId::OccExpr => "occ_expr",
            RuleId::Occ01Group => "occ01_group",
            RuleId::SqrbrktBeg => "sqrbrkt_beg",
            RuleId::SqrbrktEnd => "sqrbrkt_end",
            RuleId::Occ01Trailer => "occ01_trailer",
            RuleId::Occ0mTrailer => "occ0m_trailer",
            RuleId::Occ1mTrailer => "occ1m_trailer",
            RuleId::Atom => "atom",
            RuleId::RegexStr => "regex_str",
            RuleId::RuleRef => "rule_ref",
            RuleId::Group => "group",
        }
    }

    /// The handler of this rule with its result wrapped in a [`Product`].
    pub fn handler<'a>(self) -> RuleFn<'a> {
        match self {
            RuleId::All => |p| p.all().map(Product::from),
            RuleId::End => |p| p.end().map(Product::from),
            RuleId::ArgsDef => |p| p.args_def().map(Product::from),
            RuleId::ArgsSign => |p| p.args_sign().map(Product::from),
            RuleId::ArgsGroup => |p| p.args_group().map(Product::from),
            RuleId::BrktBeg => |p| p.brkt_beg().map(Product::from),
            RuleId::BrktEnd => |p| p.brkt_end().map(Product::from),
            RuleId::ArgItem => |p| p.arg_item().map(Product::from),
            RuleId::ArgExpr => |p| p.arg_expr().map(Product::from),
            RuleId::ArgKey => |p| p.arg_key().map(Product::from),
            RuleId::ArgKvsep => |p| p.arg_kvsep().map(Product::from),
            RuleId::ArgVal => |p| p.arg_val().map(Product::from),
            RuleId::LitVal => |p| p.lit_val().map(Product::from),
            RuleId::LitStr => |p| p.lit_str().map(Product::from),
            RuleId::LitNum => |p| p.lit_num().map(Product::from),
            RuleId::LitBool => |p| p.lit_bool().map(Product::from),
            RuleId::LitNone => |p| p.lit_none().map(Product::from),
            RuleId::ArgSep => |p| p.arg_sep().map(Product::from),
            RuleId::RuleSeq => |p| p.rule_seq().map(Product::from),
            RuleId::RuleDef => |p| p.rule_def().map(Product::from),
            RuleId::RuleName => |p| p.rule_name().map(Product::from),
            RuleId::RuleColon => |p| p.rule_colon().map(Product::from),
            RuleId::OrExpr => |p| p.or_expr().map(Product::from),
            RuleId::OrExprOp => |p| p.or_expr_op().map(Product::from),
            RuleId::SeqExpr => |p| p.seq_expr().map(Product::from),
            RuleId::Code => |p| p.code().map(Product::from),
            RuleId::OccExpr => |p| p.occ_expr().map(Product::from),
            RuleId::Occ01Group => |p| p.occ01_group().map(Product::from),
            RuleId::SqrbrktBeg => |p| p.sqrbrkt_beg().map(Product::from),
            RuleId::SqrbrktEnd => |p| p.sqrbrkt_end().map(Product::from),
            RuleId::Occ01Trailer => |p| p.occ01_trailer().map(Product::from),
            RuleId::Occ0mTrailer => |p| p.occ0m_trailer().map(Product::from),
            RuleId::Occ1mTrailer => |p| p.occ1m_trailer().map(Product::from),
            RuleId::Atom => |p| p.atom().map(Product::from),
            RuleId::RegexStr => |p| p.regex_str().map(Product::from),
            RuleId::RuleRef => |p| p.rule_ref().map(Product::from),
            RuleId::Group => |p| p.group().map(Product::from),
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RuleId {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        RuleId::ALL
            .into_iter()
            .find(|rule| rule.name() == name)
            .ok_or_else(|| ConfigError::UnknownRule(name.to_string()))
    }
}

// ============================================================================
// RULE PRODUCTS
// ============================================================================

/// The result of a root rule, whichever rule that was.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Product {
    Grammar(Grammar),
    RuleDefs(Vec<RuleDef>),
    RuleDef(RuleDef),
    Expr(Expr),
    Args(Args),
    ArgPairs(Vec<(String, ArgValue)>),
    ArgPair((String, ArgValue)),
    Value(ArgValue),
    Text(String),
    /// Rules that only consume input.
    Unit,
}

impl Product {
    pub fn into_grammar(self) -> Option<Grammar> {
        match self {
            Product::Grammar(grammar) => Some(grammar),
            _ => None,
        }
    }

    pub fn into_expr(self) -> Option<Expr> {
        match self {
            Product::Expr(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn as_grammar(&self) -> Option<&Grammar> {
        match self {
            Product::Grammar(grammar) => Some(grammar),
            _ => None,
        }
    }
}

macro_rules! product_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Product {
                fn from(value: $ty) -> Self {
                    Product::$variant(value)
                }
            }
        )*
    };
}

product_from! {
    Grammar => Grammar,
    Vec<RuleDef> => RuleDefs,
    RuleDef => RuleDef,
    Expr => Expr,
    Args => Args,
    Vec<(String, ArgValue)> => ArgPairs,
    (String, ArgValue) => ArgPair,
    ArgValue => Value,
    String => Text,
}

impl From<()> for Product {
    fn from(_: ()) -> Self {
        Product::Unit
    }
}
