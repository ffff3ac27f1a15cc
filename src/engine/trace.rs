//! Debug trace of rule invocations.

use serde::Serialize;

use crate::source::{line_at, Position};

use super::rules::RuleId;

/// One rule invocation, recorded when it starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceRecord {
    pub rule: RuleId,
    pub position: Position,
    /// Nesting depth; the root invocation has depth 0.
    pub depth: usize,
    /// Set once the rule's handler has returned successfully.
    pub succeeded: bool,
}

impl TraceRecord {
    /// Renders this record as one line against the parsed `text`.
    ///
    /// ```text
    ///     !rule_def: 2.1 (8): "|b c"
    /// ```
    pub fn render(&self, text: &str) -> String {
        let line = line_at(text, self.position.row);
        let split = line
            .char_indices()
            .nth(self.position.col)
            .map_or(line.len(), |(at, _)| at);
        let marked = format!("{}|{}", &line[..split], &line[split..]);

        format!(
            "{indent}{sign}{rule}: {position}: {marked:?}",
            indent = "    ".repeat(self.depth),
            sign = if self.succeeded { "" } else { "!" },
            rule = self.rule,
            position = self.position,
        )
    }
}

/// Renders `records` one per line, in invocation order.
pub fn render_trace(records: &[TraceRecord], text: &str) -> String {
    records
        .iter()
        .map(|record| record.render(text))
        .collect::<Vec<_>>()
        .join("\n")
}
