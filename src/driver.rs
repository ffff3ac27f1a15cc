//! Entry points: build a fresh session, run a root rule, report.

use serde::Deserialize;
use tracing::debug;

use crate::ast::Grammar;
use crate::diagnostics::{ConfigError, ParseFailure};
use crate::engine::rules::{Product, RuleId};
use crate::engine::Parser;

/// What to parse and how.
///
/// Deserializes from any serde format; missing fields take their defaults.
///
/// ```rust
/// use topdown::{ParseOptions, RuleId};
/// let options = ParseOptions::from_json(r#"{"rule": "rule_def"}"#).unwrap();
/// assert_eq!(options.rule, RuleId::RuleDef);
/// assert!(!options.debug);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Root rule to run.
    pub rule: RuleId,
    /// Record a trace of every rule invocation.
    pub debug: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            rule: RuleId::All,
            debug: false,
        }
    }
}

impl ParseOptions {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Everything a parse produced: the session, and either a result or a failure.
pub struct ParseOutcome<'a> {
    pub parser: Parser<'a>,
    pub result: Result<Product, ParseFailure>,
}

impl<'a> ParseOutcome<'a> {
    pub fn ast(&self) -> Option<&Product> {
        self.result.as_ref().ok()
    }

    pub fn failure(&self) -> Option<&ParseFailure> {
        self.result.as_ref().err()
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn into_result(self) -> Result<Product, ParseFailure> {
        self.result
    }

    /// Splits into session, result-or-none and failure-or-none.
    pub fn into_parts(self) -> (Parser<'a>, Option<Product>, Option<ParseFailure>) {
        match self.result {
            Ok(product) => (self.parser, Some(product), None),
            Err(failure) => (self.parser, None, Some(failure)),
        }
    }

    /// The rendered debug trace, if the parse ran with `debug`.
    pub fn trace_report(&self) -> Option<String> {
        self.parser.is_debug().then(|| self.parser.trace_report())
    }
}

/// Parses a whole grammar with default options.
pub fn parse(text: &str) -> ParseOutcome<'_> {
    parse_with(text, &ParseOptions::default())
}

pub fn parse_with<'a>(text: &'a str, options: &ParseOptions) -> ParseOutcome<'a> {
    debug!(rule = %options.rule, debug = options.debug, bytes = text.len(), "parse started");

    let mut parser = Parser::new(text, options.debug);
    let result = parser.run(options.rule).map_err(|err| parser.explain(err));

    match &result {
        Ok(_) => debug!(rule = %options.rule, "parse succeeded"),
        Err(failure) => debug!(rule = %options.rule, at = %failure.position(), "parse failed"),
    }
    ParseOutcome { parser, result }
}

/// Parses with a root rule given by name.
pub fn parse_rule<'a>(text: &'a str, rule: &str, debug: bool) -> Result<ParseOutcome<'a>, ConfigError> {
    let rule = rule.parse()?;
    Ok(parse_with(text, &ParseOptions { rule, debug }))
}

/// Parses a whole grammar straight to its AST.
pub fn parse_grammar(text: &str) -> Result<Grammar, ParseFailure> {
    let mut parser = Parser::new(text, false);
    parser
        .scan(RuleId::All, Parser::all)
        .map_err(|err| parser.explain(err))
}
