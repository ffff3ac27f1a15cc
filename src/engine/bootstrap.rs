//! Handlers of the bootstrap grammar.
//!
//! ```text
//! all         : [args_def] rule_seq end
//! args_def    : '@' args_group
//! args_group  : '(' (')' | arg_item)
//! arg_item    : arg_expr (')' | ',' (')' | arg_item))
//! arg_expr    : arg_key '=' arg_val
//! lit_val     : lit_str | lit_num | lit_bool | lit_none
//! rule_seq    : rule_def+
//! rule_def    : rule_name ':' [args_def] or_expr
//! or_expr     : seq_expr ('|' seq_expr)*
//! seq_expr    : (code* occ_expr code*)+
//! occ_expr    : (occ01_group | atom) ['?' | '*' | '+']
//! occ01_group : '[' or_expr ']'
//! atom        : regex_str [args_def] | rule_ref | group
//! group       : '(' or_expr ')'
//! ```
//!
//! Every choice is made by peeking before anything is consumed. The peek
//! lists below name every token that may legally follow at that point, so
//! a failure reports the full set of alternatives.

use crate::ast::value::{decode_number, decode_string};
use crate::ast::{ArgValue, Args, Expr, Grammar, Occurrence, RuleDef};
use crate::tokens::Token::{self, *};

use super::rules::RuleId;
use super::{Parser, ScanResult};

/// Tokens that can start an atom, a group, or a code block.
const ITEM_START: [Token; 5] = [Code, RuleRef, RegexStr, BrktBeg, SqrbrktBeg];

impl<'a> Parser<'a> {
    // ------------------------------------------------------------------------
    // Grammar and arguments
    // ------------------------------------------------------------------------

    pub(crate) fn all(&mut self) -> ScanResult<Grammar> {
        let mut options = None;
        if self.expect_one(&[ArgsSign, RuleName])? == ArgsSign {
            options = Some(self.scan(RuleId::ArgsDef, Self::args_def)?);
        }
        let rules = self.scan(RuleId::RuleSeq, Self::rule_seq)?;
        self.scan(RuleId::End, Self::end)?;
        Ok(Grammar { options, rules })
    }

    pub(crate) fn end(&mut self) -> ScanResult<()> {
        self.scan_token(End).map(drop)
    }

    pub(crate) fn args_def(&mut self) -> ScanResult<Args> {
        self.scan(RuleId::ArgsSign, Self::args_sign)?;
        let pairs = self.scan(RuleId::ArgsGroup, Self::args_group)?;
        Ok(pairs.into_iter().collect())
    }

    pub(crate) fn args_sign(&mut self) -> ScanResult<()> {
        self.scan_token(ArgsSign).map(drop)
    }

    pub(crate) fn args_group(&mut self) -> ScanResult<Vec<(String, ArgValue)>> {
        self.scan(RuleId::BrktBeg, Self::brkt_beg)?;
        if self.peek(&[BrktEnd]).is_some() {
            self.scan(RuleId::BrktEnd, Self::brkt_end)?;
            Ok(Vec::new())
        } else if self.peek_branch(&[RuleName]).is_some() {
            self.scan(RuleId::ArgItem, Self::arg_item)
        } else {
            Err(self.fail())
        }
    }

    pub(crate) fn brkt_beg(&mut self) -> ScanResult<()> {
        self.scan_token(BrktBeg).map(drop)
    }

    pub(crate) fn brkt_end(&mut self) -> ScanResult<()> {
        self.scan_token(BrktEnd).map(drop)
    }

    /// One `key=value` pair followed by the rest of the argument list.
    pub(crate) fn arg_item(&mut self) -> ScanResult<Vec<(String, ArgValue)>> {
        let mut pairs = vec![self.scan(RuleId::ArgExpr, Self::arg_expr)?];
        if self.peek(&[BrktEnd]).is_some() {
            self.scan(RuleId::BrktEnd, Self::brkt_end)?;
        } else if self.peek_branch(&[ArgSep]).is_some() {
            self.scan(RuleId::ArgSep, Self::arg_sep)?;
            if self.peek(&[BrktEnd]).is_some() {
                self.scan(RuleId::BrktEnd, Self::brkt_end)?;
            } else if self.peek_branch(&[RuleName]).is_some() {
                pairs.extend(self.scan(RuleId::ArgItem, Self::arg_item)?);
            } else {
                return Err(self.fail());
            }
        } else {
            return Err(self.fail());
        }
        Ok(pairs)
    }

    pub(crate) fn arg_expr(&mut self) -> ScanResult<(String, ArgValue)> {
        let key = self.scan(RuleId::ArgKey, Self::arg_key)?;
        self.scan(RuleId::ArgKvsep, Self::arg_kvsep)?;
        let value = self.scan(RuleId::ArgVal, Self::arg_val)?;
        Ok((key, value))
    }

    pub(crate) fn arg_key(&mut self) -> ScanResult<String> {
        self.scan_token(RuleName).map(str::to_string)
    }

    pub(crate) fn arg_kvsep(&mut self) -> ScanResult<()> {
        self.scan_token(ArgKvsep).map(drop)
    }

    pub(crate) fn arg_val(&mut self) -> ScanResult<ArgValue> {
        self.scan(RuleId::LitVal, Self::lit_val)
    }

    pub(crate) fn lit_val(&mut self) -> ScanResult<ArgValue> {
        if self.peek(&[RegexStr]).is_some() {
            self.scan(RuleId::LitStr, Self::lit_str)
        } else if self.peek_branch(&[LitNum]).is_some() {
            self.scan(RuleId::LitNum, Self::lit_num)
        } else if self.peek_branch(&[LitBool]).is_some() {
            self.scan(RuleId::LitBool, Self::lit_bool)
        } else if self.peek_branch(&[LitNone]).is_some() {
            self.scan(RuleId::LitNone, Self::lit_none)
        } else {
            Err(self.fail())
        }
    }

    pub(crate) fn lit_str(&mut self) -> ScanResult<ArgValue> {
        let lexeme = self.scan_token(RegexStr)?;
        match decode_string(lexeme) {
            Some(text) => Ok(ArgValue::Str(text)),
            None => Err(self.fail_with(vec![RegexStr])),
        }
    }

    pub(crate) fn lit_num(&mut self) -> ScanResult<ArgValue> {
        let lexeme = self.scan_token(LitNum)?;
        match decode_number(lexeme) {
            Some(value) => Ok(value),
            None => Err(self.fail_with(vec![LitNum])),
        }
    }

    pub(crate) fn lit_bool(&mut self) -> ScanResult<ArgValue> {
        let lexeme = self.scan_token(LitBool)?;
        Ok(ArgValue::Bool(lexeme == "True"))
    }

    pub(crate) fn lit_none(&mut self) -> ScanResult<ArgValue> {
        self.scan_token(LitNone)?;
        Ok(ArgValue::None)
    }

    pub(crate) fn arg_sep(&mut self) -> ScanResult<()> {
        self.scan_token(ArgSep).map(drop)
    }

    // ------------------------------------------------------------------------
    // Rules
    // ------------------------------------------------------------------------

    pub(crate) fn rule_seq(&mut self) -> ScanResult<Vec<RuleDef>> {
        let mut rules = Vec::new();
        loop {
            rules.push(self.scan(RuleId::RuleDef, Self::rule_def)?);
            if self.expect_one(&[RuleName, End])? != RuleName {
                return Ok(rules);
            }
        }
    }

    pub(crate) fn rule_def(&mut self) -> ScanResult<RuleDef> {
        let name = self.scan(RuleId::RuleName, Self::rule_name)?;
        self.scan(RuleId::RuleColon, Self::rule_colon)?;
        let mut args = None;
        if self.expect_one(&[ArgsSign, RuleRef, RegexStr, Code, BrktBeg, SqrbrktBeg])? == ArgsSign {
            args = Some(self.scan(RuleId::ArgsDef, Self::args_def)?);
        }
        let body = self.scan(RuleId::OrExpr, Self::or_expr)?;
        Ok(RuleDef { name, body, args })
    }

    pub(crate) fn rule_name(&mut self) -> ScanResult<String> {
        self.scan_token(RuleName).map(str::to_string)
    }

    pub(crate) fn rule_colon(&mut self) -> ScanResult<()> {
        self.scan_token(RuleColon).map(drop)
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    pub(crate) fn or_expr(&mut self) -> ScanResult<Expr> {
        let mut items = vec![self.scan(RuleId::SeqExpr, Self::seq_expr)?];
        while self.expect_one(&[OrExprOp, RuleName, BrktEnd, SqrbrktEnd, End])? == OrExprOp {
            self.scan(RuleId::OrExprOp, Self::or_expr_op)?;
            items.push(self.scan(RuleId::SeqExpr, Self::seq_expr)?);
        }
        Ok(Expr::alternation(items))
    }

    pub(crate) fn or_expr_op(&mut self) -> ScanResult<()> {
        self.scan_token(OrExprOp).map(drop)
    }

    pub(crate) fn seq_expr(&mut self) -> ScanResult<Expr> {
        let mut items = Vec::new();
        loop {
            while self.expect_one(&ITEM_START)? == Code {
                items.push(self.scan(RuleId::Code, Self::code)?);
            }
            items.push(self.scan(RuleId::OccExpr, Self::occ_expr)?);
            while self.expect_one(&[
                Code, RuleRef, RegexStr, RuleName, BrktBeg, BrktEnd, SqrbrktBeg, SqrbrktEnd,
                OrExprOp, End,
            ])? == Code
            {
                items.push(self.scan(RuleId::Code, Self::code)?);
            }
            let next = self.expect_one(&[
                RuleRef, RegexStr, Code, BrktBeg, SqrbrktBeg, RuleName, BrktEnd, SqrbrktEnd,
                OrExprOp, End,
            ])?;
            if !ITEM_START.contains(&next) {
                return Ok(Expr::sequence(items));
            }
        }
    }

    pub(crate) fn code(&mut self) -> ScanResult<Expr> {
        let lexeme = self.scan_token(Code)?;
        let fence = lexeme.bytes().take_while(|&b| b == b'`').count();
        Ok(Expr::code(&lexeme[fence..lexeme.len() - fence]))
    }

    /// An atom or `[...]` group with an optional occurrence trailer.
    pub(crate) fn occ_expr(&mut self) -> ScanResult<Expr> {
        let item = if self.peek(&[SqrbrktBeg]).is_some() {
            self.scan(RuleId::Occ01Group, Self::occ01_group)?
        } else if self.peek_branch(&[RuleRef, RegexStr, BrktBeg]).is_some() {
            self.scan(RuleId::Atom, Self::atom)?
        } else {
            return Err(self.fail());
        };

        let next = self.expect_one(&[
            Occ0mTrailer, Occ1mTrailer, Occ01Trailer, RuleRef, RegexStr, RuleName, Code,
            BrktBeg, BrktEnd, SqrbrktBeg, SqrbrktEnd, OrExprOp, End,
        ])?;
        if !matches!(next, Occ0mTrailer | Occ1mTrailer | Occ01Trailer) {
            return Ok(item);
        }

        let occurrence = if self.peek(&[Occ01Trailer]).is_some() {
            self.scan(RuleId::Occ01Trailer, Self::occ01_trailer)?;
            Occurrence::ZeroOrOne
        } else if self.peek_branch(&[Occ0mTrailer]).is_some() {
            self.scan(RuleId::Occ0mTrailer, Self::occ0m_trailer)?;
            Occurrence::ZeroOrMore
        } else if self.peek_branch(&[Occ1mTrailer]).is_some() {
            self.scan(RuleId::Occ1mTrailer, Self::occ1m_trailer)?;
            Occurrence::OneOrMore
        } else {
            return Err(self.fail());
        };
        Ok(item.occur(occurrence))
    }

    pub(crate) fn occ01_group(&mut self) -> ScanResult<Expr> {
        self.scan(RuleId::SqrbrktBeg, Self::sqrbrkt_beg)?;
        let item = self.scan(RuleId::OrExpr, Self::or_expr)?;
        self.scan(RuleId::SqrbrktEnd, Self::sqrbrkt_end)?;
        Ok(item.occur(Occurrence::ZeroOrOne))
    }

    pub(crate) fn sqrbrkt_beg(&mut self) -> ScanResult<()> {
        self.scan_token(SqrbrktBeg).map(drop)
    }

    pub(crate) fn sqrbrkt_end(&mut self) -> ScanResult<()> {
        self.scan_token(SqrbrktEnd).map(drop)
    }

    pub(crate) fn occ01_trailer(&mut self) -> ScanResult<()> {
        self.scan_token(Occ01Trailer).map(drop)
    }

    pub(crate) fn occ0m_trailer(&mut self) -> ScanResult<()> {
        self.scan_token(Occ0mTrailer).map(drop)
    }

    pub(crate) fn occ1m_trailer(&mut self) -> ScanResult<()> {
        self.scan_token(Occ1mTrailer).map(drop)
    }

    pub(crate) fn atom(&mut self) -> ScanResult<Expr> {
        if self.peek(&[RegexStr]).is_some() {
            let source = self.scan(RuleId::RegexStr, Self::regex_str)?;
            let next = self.expect_one(&[
                ArgsSign, RuleRef, RegexStr, RuleName, Code, BrktBeg, BrktEnd, Occ0mTrailer,
                Occ1mTrailer, Occ01Trailer, SqrbrktBeg, SqrbrktEnd, OrExprOp, End,
            ])?;
            let mut args = None;
            if next == ArgsSign {
                args = Some(self.scan(RuleId::ArgsDef, Self::args_def)?);
            }
            Ok(Expr::pattern_with_args(source, args))
        } else if self.peek_branch(&[RuleRef]).is_some() {
            self.scan(RuleId::RuleRef, Self::rule_ref)
        } else if self.peek_branch(&[BrktBeg]).is_some() {
            self.scan(RuleId::Group, Self::group)
        } else {
            Err(self.fail())
        }
    }

    /// A pattern literal, decoded.
    pub(crate) fn regex_str(&mut self) -> ScanResult<String> {
        let lexeme = self.scan_token(RegexStr)?;
        match decode_string(lexeme) {
            Some(source) => Ok(source),
            None => Err(self.fail_with(vec![RegexStr])),
        }
    }

    pub(crate) fn rule_ref(&mut self) -> ScanResult<Expr> {
        let lexeme = self.scan_token(RuleRef)?;
        Ok(Expr::rule_ref(lexeme.trim_end()))
    }

    pub(crate) fn group(&mut self) -> ScanResult<Expr> {
        self.scan(RuleId::BrktBeg, Self::brkt_beg)?;
        let item = self.scan(RuleId::OrExpr, Self::or_expr)?;
        self.scan(RuleId::BrktEnd, Self::brkt_end)?;
        Ok(item)
    }
}
