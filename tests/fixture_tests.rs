mod common;

use common::{load_fixtures, Fixture};
use topdown::{parse_grammar, Position};

fn row_col(position: Position) -> String {
    format!("{}.{}", position.row + 1, position.col + 1)
}

/// Row and column recomputed from the offset by counting newlines.
fn recount(text: &str, offset: usize) -> (usize, usize) {
    let before = &text[..offset];
    let row = before.matches('\n').count();
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    (row, before[line_start..].chars().count())
}

fn check_valid(fixture: &Fixture) {
    let grammar = parse_grammar(&fixture.text)
        .unwrap_or_else(|failure| panic!("{}:\n{}", fixture.name, failure.render("# Parsing error")));

    let names: Vec<&str> = grammar.rule_names().collect();
    assert_eq!(names, fixture.expected_words("rules"), "{}: rule names", fixture.name);

    let printed = grammar.to_string();
    let reparsed = parse_grammar(&printed)
        .unwrap_or_else(|failure| panic!("{}: printed form does not parse:\n{printed}\n{failure}", fixture.name));
    assert_eq!(reparsed, grammar, "{}: printed form:\n{printed}", fixture.name);
}

fn check_invalid(fixture: &Fixture) {
    let failure = match parse_grammar(&fixture.text) {
        Ok(grammar) => panic!("{}: expected a failure, parsed:\n{grammar}", fixture.name),
        Err(failure) => failure,
    };

    let position = failure.position();
    assert!(position.offset <= fixture.text.len(), "{}: offset out of range", fixture.name);
    assert_eq!(
        recount(&fixture.text, position.offset),
        (position.row, position.col),
        "{}: row/col disagree with offset",
        fixture.name
    );

    if let Some(expected) = fixture.expectation("fails-at") {
        assert_eq!(row_col(position), expected, "{}: failure position", fixture.name);
    }

    let chain: Vec<&str> = failure.rule_chain().iter().map(|rule| rule.name()).collect();
    assert_eq!(chain, fixture.expected_words("ctx"), "{}: rule chain", fixture.name);

    let tried: Vec<&str> = failure.primary().patterns.iter().map(|token| token.name()).collect();
    assert_eq!(tried, fixture.expected_words("tried"), "{}: tried patterns", fixture.name);

    let report = failure.render("# Parsing error");
    assert!(
        report.contains(&format!("(ctx: {})", chain.join(" "))),
        "{}: report:\n{report}",
        fixture.name
    );
}

#[test]
fn valid_fixtures_parse_and_print_back() {
    for fixture in load_fixtures("valid") {
        check_valid(&fixture);
    }
}

#[test]
fn invalid_fixtures_fail_where_expected() {
    for fixture in load_fixtures("invalid") {
        check_invalid(&fixture);
    }
}

#[test]
fn fixture_failures_are_deterministic() {
    for fixture in load_fixtures("invalid") {
        let first = parse_grammar(&fixture.text).err().map(|f| f.render("T"));
        let second = parse_grammar(&fixture.text).err().map(|f| f.render("T"));
        assert_eq!(first, second, "{}", fixture.name);
    }
}
