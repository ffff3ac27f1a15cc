//! Parse diagnostics.
//!
//! A [`ParseFailure`] is the self-contained form of a failed parse: the
//! failure that ended it, every other failure recorded along the way, and
//! the text they point into. It can be rendered three ways:
//!
//! - [`ParseFailure::render`] produces the plain-text report.
//! - [`ParseFailure::write_colored`] writes the same report through `termcolor`.
//! - The `miette::Diagnostic` implementation feeds `miette::Report`.
//!
//! The plain-text report looks like this:
//!
//! ````text
//! # Parsing error
//!
//! Rule `rule_def` failed at 1.3 (3) (ctx: all rule_seq rule_def):
//! ```
//! a:
//!   ^
//! ```
//!
//! Failed matching one of the patterns:
//! @
//! ...
//! ````

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use std::fmt::Display;
use std::sync::Arc;
use termcolor::{Color, ColorSpec, WriteColor};
use thiserror::Error;
use unicode_width::UnicodeWidthStr;

use crate::engine::rules::RuleId;
use crate::source::{line_at, Position};
use crate::tokens::Token;

pub type SourceArc = Arc<NamedSource<String>>;

/// Name given to the input when the caller does not provide one.
pub const DEFAULT_SOURCE_NAME: &str = "grammar";

// ============================================================================
// CONFIGURATION ERRORS
// ============================================================================

/// A request the engine cannot serve, detected before any parsing.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown rule `{0}`")]
    #[diagnostic(
        code(topdown::config::unknown_rule),
        help("root rules are named after the bootstrap grammar, e.g. `all` or `rule_def`")
    )]
    UnknownRule(String),
}

// ============================================================================
// FAILURE RECORDS
// ============================================================================

/// One failure, resolved against the invocation tree it was raised in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    /// Rules from the root invocation down to the failing one.
    pub rules: Vec<RuleId>,
    pub position: Position,
    /// Tokens that were tried, in the order they were tried.
    pub patterns: Vec<Token>,
}

impl FailureRecord {
    /// The rule that was running when the failure was raised.
    pub fn rule(&self) -> Option<RuleId> {
        self.rules.last().copied()
    }

    fn rule_name(&self) -> &'static str {
        self.rule().map_or("", RuleId::name)
    }

    fn chain(&self) -> String {
        self.rules
            .iter()
            .map(|rule| rule.name())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The header line and marked source line of this failure.
    fn location(&self, text: &str) -> String {
        let line = line_at(text, self.position.row);
        let prefix: String = line.chars().take(self.position.col).collect();
        format!(
            "Rule `{rule}` failed at {position} (ctx: {chain}):\n```\n{line}\n{pad}^\n```",
            rule = self.rule_name(),
            position = self.position,
            chain = self.chain(),
            pad = " ".repeat(prefix.width()),
        )
    }

    fn patterns_section(&self) -> Option<String> {
        if self.patterns.is_empty() {
            return None;
        }
        let several = self.patterns.len() > 1;
        let listed: Vec<&str> = self.patterns.iter().map(|t| t.pattern()).collect();
        Some(format!(
            "Failed matching {}pattern{}:\n{}\n",
            if several { "one of the " } else { "the " },
            if several { "s" } else { "" },
            listed.join("\n"),
        ))
    }

    /// Byte span of the char at the failure, empty at end of input.
    fn span(&self, text: &str) -> (usize, usize) {
        let offset = self.position.offset;
        let len = text[offset..].chars().next().map_or(0, char::len_utf8);
        (offset, len)
    }
}

// ============================================================================
// PARSE FAILURE
// ============================================================================

/// A failed parse, with everything needed to explain it.
#[derive(Error, Debug, Clone)]
#[error("rule `{}` failed at {}", .primary.rule_name(), .primary.position)]
pub struct ParseFailure {
    src: SourceArc,
    primary: FailureRecord,
    reasons: Vec<FailureRecord>,
}

enum Section {
    Title,
    Location,
    Patterns,
    ReasonsHeader,
}

impl ParseFailure {
    pub fn new(text: &str, primary: FailureRecord, reasons: Vec<FailureRecord>) -> Self {
        Self {
            src: Arc::new(NamedSource::new(DEFAULT_SOURCE_NAME, text.to_string())),
            primary,
            reasons,
        }
    }

    /// Renames the input, e.g. after the file it was read from.
    pub fn with_source_name(mut self, name: impl AsRef<str>) -> Self {
        let text = self.text().to_string();
        self.src = Arc::new(NamedSource::new(name, text));
        self
    }

    pub fn text(&self) -> &str {
        self.src.inner()
    }

    pub fn source_name(&self) -> &str {
        self.src.name()
    }

    /// The failure that ended the parse.
    pub fn primary(&self) -> &FailureRecord {
        &self.primary
    }

    /// Every other failure recorded during the parse, oldest first.
    pub fn reasons(&self) -> &[FailureRecord] {
        &self.reasons
    }

    pub fn position(&self) -> Position {
        self.primary.position
    }

    pub fn rule_chain(&self) -> &[RuleId] {
        &self.primary.rules
    }

    fn sections(&self, title: &str) -> Vec<(Section, String)> {
        let text = self.text();
        let mut sections = vec![
            (Section::Title, title.to_string()),
            (Section::Location, self.primary.location(text)),
        ];
        if let Some(patterns) = self.primary.patterns_section() {
            sections.push((Section::Patterns, patterns));
        }
        if !self.reasons.is_empty() {
            sections.push((Section::ReasonsHeader, "Possible reasons:".to_string()));
            for reason in &self.reasons {
                sections.push((Section::Location, reason.location(text)));
            }
        }
        sections
    }

    /// Renders the report under `title`, sections separated by blank lines.
    pub fn render(&self, title: &str) -> String {
        self.sections(title)
            .into_iter()
            .map(|(_, body)| body)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Writes the report to `writer`, highlighting the title and headers.
    pub fn write_colored(&self, writer: &mut impl WriteColor, title: &str) -> std::io::Result<()> {
        for (i, (section, body)) in self.sections(title).into_iter().enumerate() {
            if i > 0 {
                write!(writer, "\n\n")?;
            }
            match section {
                Section::Title => {
                    writer.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
                    write!(writer, "{body}")?;
                    writer.reset()?;
                }
                Section::ReasonsHeader => {
                    writer.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
                    write!(writer, "{body}")?;
                    writer.reset()?;
                }
                Section::Location | Section::Patterns => {
                    let (header, rest) = body.split_once('\n').unwrap_or((body.as_str(), ""));
                    writer.set_color(ColorSpec::new().set_bold(true))?;
                    write!(writer, "{header}")?;
                    writer.reset()?;
                    if !rest.is_empty() {
                        write!(writer, "\n{rest}")?;
                    }
                }
            }
        }
        writeln!(writer)?;
        writer.reset()
    }
}

impl Diagnostic for ParseFailure {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new("topdown::parse::failed"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        if self.primary.patterns.is_empty() {
            return None;
        }
        let listed: Vec<&str> = self.primary.patterns.iter().map(|t| t.name()).collect();
        Some(Box::new(format!("expected one of: {}", listed.join(", "))))
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(self.src.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let text = self.text();
        let (offset, len) = self.primary.span(text);
        let mut labels = vec![LabeledSpan::new(
            Some(format!("`{}` failed here", self.primary.rule_name())),
            offset,
            len,
        )];
        for reason in &self.reasons {
            let (offset, len) = reason.span(text);
            labels.push(LabeledSpan::new(
                Some(format!("possible reason: `{}` failed here", reason.rule_name())),
                offset,
                len,
            ));
        }
        Some(Box::new(labels.into_iter()))
    }
}
