//! Golden master tests for failure reports.
//!
//! These tests capture the exact rendered report of a `ParseFailure`
//! to ensure consistent error presentation across changes.

use miette::Diagnostic;
use topdown::{parse_grammar, ParseFailure, Parser, RuleId, Token};

const TITLE: &str = "# Parsing error";

fn failure_of(text: &str) -> ParseFailure {
    match parse_grammar(text) {
        Ok(grammar) => panic!("expected a failure, parsed:\n{grammar}"),
        Err(failure) => failure,
    }
}

fn chain(failure: &ParseFailure) -> Vec<&'static str> {
    failure.rule_chain().iter().map(|rule| rule.name()).collect()
}

#[test]
fn test_missing_body_report() {
    let failure = failure_of("a:");

    // Golden master snapshot
    let expected = "# Parsing error

Rule `rule_def` failed at 1.3 (3) (ctx: all rule_seq rule_def):
```
a:
  ^
```

Failed matching one of the patterns:
@
([a-zA-Z_][a-zA-Z0-9_]*)(?![a-zA-Z0-9_])[\\s]*(?![:])
r?('''|\"\"\"|'|\")((?:[^\\\\]|\\\\.)*?)(\\1)
(`+)((?:.|\\n)*?)\\1
\\(
\\[
";

    assert_eq!(failure.render(TITLE), expected);
}

#[test]
fn test_missing_body_names_the_item_tokens() {
    let failure = failure_of("a:");
    let position = failure.position();
    assert_eq!((position.offset, position.row, position.col), (2, 0, 2));

    let tried = &failure.primary().patterns;
    for token in [Token::RuleRef, Token::RegexStr, Token::Code] {
        assert!(tried.contains(&token), "{token:?} not among {tried:?}");
    }
    assert!(failure.reasons().is_empty());
}

#[test]
fn test_nested_failure_lists_every_enclosing_rule() {
    let failure = failure_of("a: 'x'\nb: x (y | [z @])\n");
    assert_eq!(
        chain(&failure),
        vec![
            "all", "rule_seq", "rule_def", "or_expr", "seq_expr", "occ_expr", "atom", "group",
            "or_expr", "seq_expr", "occ_expr", "occ01_group", "or_expr", "seq_expr", "occ_expr",
        ]
    );
    assert_eq!(failure.position().to_string(), "2.14 (21)");

    let report = failure.render(TITLE);
    assert!(report.contains(
        "Rule `occ_expr` failed at 2.14 (21) (ctx: all rule_seq rule_def or_expr seq_expr occ_expr atom group or_expr seq_expr occ_expr occ01_group or_expr seq_expr occ_expr):"
    ));
    assert!(report.contains("```\nb: x (y | [z @])\n             ^\n```"));
}

#[test]
fn test_failure_at_end_of_input_marks_an_empty_line() {
    let failure = failure_of("a: (b\n");
    assert_eq!(failure.position().to_string(), "2.1 (7)");
    assert_eq!(failure.primary().rule(), Some(RuleId::BrktEnd));
    assert!(failure
        .render(TITLE)
        .contains("Failed matching the pattern:\n\\)\n"));
}

#[test]
fn test_spaced_colon_on_a_later_rule_fails_inside_the_sequence() {
    let failure = failure_of("a: b\nc : d");
    assert_eq!(
        chain(&failure),
        vec!["all", "rule_seq", "rule_def", "or_expr", "seq_expr", "occ_expr"]
    );
    assert_eq!(failure.position().to_string(), "2.3 (8)");
    assert!(failure
        .render(TITLE)
        .contains("Rule `occ_expr` failed at 2.3 (8) (ctx: all rule_seq rule_def or_expr seq_expr occ_expr):\n```\nc : d\n  ^\n```"));
}

#[test]
fn test_attempted_rule_becomes_a_possible_reason() {
    let mut parser = Parser::new("x y", false);
    assert!(parser.attempt(RuleId::RuleDef).is_none());
    assert_eq!(parser.position().offset, 0);

    let err = parser.run(RuleId::RuleColon).unwrap_err();
    let failure = parser.explain(err);
    assert_eq!(failure.reasons().len(), 1);

    // Golden master snapshot
    let expected = "# Parsing error

Rule `rule_colon` failed at 1.1 (1) (ctx: rule_colon):
```
x y
^
```

Failed matching the pattern:
:


Possible reasons:

Rule `rule_colon` failed at 1.3 (3) (ctx: rule_def rule_colon):
```
x y
  ^
```";

    assert_eq!(failure.render(TITLE), expected);
}

#[test]
fn test_miette_report_carries_code_and_help() {
    let failure = failure_of("a 'x'").with_source_name("rules.grammar");
    assert_eq!(failure.code().map(|c| c.to_string()).as_deref(), Some("topdown::parse::failed"));
    assert_eq!(
        failure.help().map(|h| h.to_string()).as_deref(),
        Some("expected one of: rule_colon")
    );

    let labels: Vec<_> = failure.labels().expect("labels").collect();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].offset(), 2);
    assert_eq!(labels[0].len(), 1);

    let report = format!("{:?}", miette::Report::new(failure));
    assert!(report.contains("topdown::parse::failed"), "{report}");
    assert!(report.contains("rules.grammar"), "{report}");
}

#[test]
fn test_colored_report_matches_plain_text() {
    let failure = failure_of("a: [b");
    let mut out = termcolor::Ansi::new(Vec::new());
    failure.write_colored(&mut out, TITLE).unwrap();
    let written = String::from_utf8(out.into_inner()).unwrap();
    assert!(written.contains("\x1b["), "expected escape codes");

    let mut plain = termcolor::NoColor::new(Vec::new());
    failure.write_colored(&mut plain, TITLE).unwrap();
    let plain = String::from_utf8(plain.into_inner()).unwrap();
    assert_eq!(plain, format!("{}\n", failure.render(TITLE)));
}

#[test]
fn test_failure_positions_agree_with_newlines() {
    let inputs = [
        "a:",
        "\n\n  a: (",
        "a: 'x'\n\nb: c |\n",
        "@(k=)\na: b",
        "a: 'unterminated",
        "名前: ?",
    ];
    for text in inputs {
        let failure = failure_of(text);
        let position = failure.position();
        assert!(position.offset <= text.len(), "{text:?}");

        let before = &text[..position.offset];
        assert_eq!(position.row, before.matches('\n').count(), "{text:?}");
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        assert_eq!(position.col, before[line_start..].chars().count(), "{text:?}");
    }
}
