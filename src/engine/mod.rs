//! The parsing session and its primitives.
//!
//! A [`Parser`] owns everything one parse needs: the cursor, the rule
//! invocation tree, the failure arena and its traces, and the optional
//! debug trace. Rule handlers (see `bootstrap`) are written purely in
//! terms of four primitives:
//!
//! - [`Parser::peek`] and friends look at the next token without consuming.
//! - [`Parser::scan_token`] consumes one token or fails.
//! - [`Parser::scan`] runs a rule handler inside a fresh invocation context.
//! - [`Parser::fail`] raises a failure naming what the last peek tried.
//!
//! Failures are values: a [`ScanError`] is a handle into the session's
//! failure arena and travels up through `?`. Nothing is retried; once a
//! handler commits to a branch, a failure inside it propagates.
//! [`Parser::attempt`] is the one exception, for callers that want to try
//! a rule and rewind on failure.

use crate::diagnostics::{FailureRecord, ParseFailure};
use crate::source::{Cursor, Position};
use crate::stack::ensure_sufficient_stack;
use crate::tokens::{skip_len, Token};

mod bootstrap;
pub mod context;
pub mod rules;
pub mod trace;

use context::{Context, ContextId, ContextTree};
use rules::{Product, RuleId};
use trace::{render_trace, TraceRecord};

// ============================================================================
// FAILURES
// ============================================================================

/// Handle to a failure raised in a [`Parser`].
///
/// Two handles are equal only if they name the same raised failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanError(usize);

pub type ScanResult<T> = Result<T, ScanError>;

/// A raised failure, as stored in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// The invocation that was running when the failure was raised.
    pub context: Option<ContextId>,
    pub position: Position,
    /// Tokens that were tried at `position`, in the order they were tried.
    pub patterns: Vec<Token>,
}

// ============================================================================
// PARSING SESSION
// ============================================================================

pub struct Parser<'a> {
    cursor: Cursor<'a>,
    debug: bool,
    trace: Vec<TraceRecord>,
    contexts: ContextTree,
    current: Option<ContextId>,
    depth: usize,
    /// Failure already appended to `branch_trace` by the innermost scan.
    last_failure: Option<ScanError>,
    failures: Vec<Failure>,
    branch_trace: Vec<ScanError>,
    /// Failures carried over from an earlier branch; the bootstrap handlers
    /// never fill it.
    prior_branch_trace: Vec<ScanError>,
    /// Tokens tried by the peeks since the last successful one.
    peeked: Option<Vec<Token>>,
}

impl<'a> Parser<'a> {
    pub fn new(text: &'a str, debug: bool) -> Self {
        Self {
            cursor: Cursor::new(text),
            debug,
            trace: Vec::new(),
            contexts: ContextTree::default(),
            current: None,
            depth: 0,
            last_failure: None,
            failures: Vec::new(),
            branch_trace: Vec::new(),
            prior_branch_trace: Vec::new(),
            peeked: None,
        }
    }

    pub fn text(&self) -> &'a str {
        self.cursor.text()
    }

    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Debug records, empty unless the session was created with `debug`.
    pub fn trace_records(&self) -> &[TraceRecord] {
        &self.trace
    }

    pub fn trace_report(&self) -> String {
        render_trace(&self.trace, self.text())
    }

    pub fn contexts(&self) -> &ContextTree {
        &self.contexts
    }

    pub fn failure(&self, err: ScanError) -> &Failure {
        &self.failures[err.0]
    }

    pub fn branch_trace(&self) -> &[ScanError] {
        &self.branch_trace
    }

    pub fn prior_branch_trace(&self) -> &[ScanError] {
        &self.prior_branch_trace
    }

    // ------------------------------------------------------------------------
    // Peeking
    // ------------------------------------------------------------------------

    /// Returns the first of `candidates` that matches at the cursor.
    ///
    /// On a miss the tried tokens replace the attempted set.
    pub fn peek(&mut self, candidates: &[Token]) -> Option<Token> {
        self.peek_with(candidates, false)
    }

    /// Like [`Parser::peek`], but a miss adds to the attempted set, so a
    /// failure after several alternatives names all of them.
    pub fn peek_branch(&mut self, candidates: &[Token]) -> Option<Token> {
        self.peek_with(candidates, true)
    }

    /// Like [`Parser::peek`], but a miss is a failure.
    pub fn expect_one(&mut self, candidates: &[Token]) -> ScanResult<Token> {
        match self.peek_with(candidates, false) {
            Some(token) => Ok(token),
            None => Err(self.fail()),
        }
    }

    fn peek_with(&mut self, candidates: &[Token], is_branch: bool) -> Option<Token> {
        let rest = self.cursor.rest();
        if let Some(&token) = candidates.iter().find(|t| t.match_len(rest).is_some()) {
            self.peeked = None;
            return Some(token);
        }

        let tried = match self.peeked.take() {
            Some(mut tried) if is_branch => {
                tried.extend_from_slice(candidates);
                tried
            }
            _ => candidates.to_vec(),
        };
        self.peeked = Some(tried);
        None
    }

    // ------------------------------------------------------------------------
    // Consuming
    // ------------------------------------------------------------------------

    /// Consumes `token` at the cursor and returns its text.
    pub fn scan_token(&mut self, token: Token) -> ScanResult<&'a str> {
        match token.match_len(self.cursor.rest()) {
            Some(len) => Ok(self.cursor.advance(len)),
            None => Err(self.fail_with(vec![token])),
        }
    }

    fn skip_whitespace(&mut self) {
        let len = skip_len(self.cursor.rest());
        self.cursor.advance(len);
    }

    /// Runs `body` as an invocation of `rule`.
    ///
    /// Whitespace and comments are skipped on both sides of the body. Depth
    /// and the current context are restored however the body returns. The
    /// body runs on a grown stack when the current one is nearly used up, so
    /// nesting depth is bounded by memory rather than the thread's stack.
    pub fn scan<T>(&mut self, rule: RuleId, body: fn(&mut Self) -> ScanResult<T>) -> ScanResult<T> {
        let parent = self.current;
        let depth = self.depth;
        self.depth += 1;

        self.skip_whitespace();
        let entry = self.cursor.position();
        self.current = Some(self.contexts.push(Context {
            rule,
            parent,
            entry,
        }));
        self.last_failure = None;

        let record = self.debug.then(|| {
            self.trace.push(TraceRecord {
                rule,
                position: entry,
                depth,
                succeeded: false,
            });
            self.trace.len() - 1
        });
        tracing::trace!(rule = rule.name(), depth, at = %entry, "scan");

        let result = ensure_sufficient_stack(|| body(self));
        match &result {
            Ok(_) => {
                if let Some(index) = record {
                    self.trace[index].succeeded = true;
                }
            }
            Err(err) => {
                if self.last_failure != Some(*err) {
                    self.last_failure = Some(*err);
                    self.branch_trace.push(*err);
                }
            }
        }

        self.depth = depth;
        self.current = parent;
        self.skip_whitespace();
        result
    }

    /// Runs `rule` from the registry, wrapping its result in a [`Product`].
    pub fn run(&mut self, rule: RuleId) -> ScanResult<Product> {
        self.scan(rule, rule.handler())
    }

    /// Runs `rule`, rewinding the cursor if it fails.
    ///
    /// The failure is not returned but stays in the branch trace, so a later
    /// report lists it under "Possible reasons".
    pub fn attempt(&mut self, rule: RuleId) -> Option<Product> {
        let start = self.cursor.position();
        match self.run(rule) {
            Ok(product) => Some(product),
            Err(_) => {
                self.cursor.restore(start);
                None
            }
        }
    }

    // ------------------------------------------------------------------------
    // Failing
    // ------------------------------------------------------------------------

    /// Raises a failure at the cursor naming the tokens of the last peeks.
    pub fn fail(&mut self) -> ScanError {
        let patterns = self.peeked.clone().unwrap_or_default();
        self.raise(patterns)
    }

    /// Raises a failure at the cursor naming `patterns`.
    pub fn fail_with(&mut self, patterns: Vec<Token>) -> ScanError {
        if patterns.is_empty() {
            return self.fail();
        }
        self.raise(patterns)
    }

    fn raise(&mut self, patterns: Vec<Token>) -> ScanError {
        let failure = Failure {
            context: self.current,
            position: self.cursor.position(),
            patterns,
        };
        tracing::trace!(
            rule = failure.context.map(|id| self.contexts.get(id).rule.name()),
            at = %failure.position,
            tried = failure.patterns.len(),
            "failure"
        );
        self.failures.push(failure);
        ScanError(self.failures.len() - 1)
    }

    // ------------------------------------------------------------------------
    // Reporting
    // ------------------------------------------------------------------------

    fn record(&self, err: ScanError) -> FailureRecord {
        let failure = self.failure(err);
        FailureRecord {
            rules: failure
                .context
                .map(|id| self.contexts.chain(id))
                .unwrap_or_default(),
            position: failure.position,
            patterns: failure.patterns.clone(),
        }
    }

    /// Resolves `err` into a self-contained report.
    ///
    /// Every other failure in the prior and current branch traces becomes
    /// a possible reason, in the order it was recorded.
    pub fn explain(&self, err: ScanError) -> ParseFailure {
        let reasons = self
            .prior_branch_trace
            .iter()
            .chain(&self.branch_trace)
            .filter(|&&other| other != err)
            .map(|&other| self.record(other))
            .collect();
        ParseFailure::new(self.text(), self.record(err), reasons)
    }
}
