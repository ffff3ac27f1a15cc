//! Static queries over a parsed grammar.
//!
//! These never look at input text: they answer which rules a body refers
//! to, which patterns it uses, and which patterns can start a rule.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use super::{Expr, Grammar, Pattern};

/// A pattern together with its flags argument.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PatternInfo {
    pub source: String,
    pub flags: String,
}

impl From<&Pattern> for PatternInfo {
    fn from(pattern: &Pattern) -> Self {
        PatternInfo {
            source: pattern.source.clone(),
            flags: pattern.flags().to_string(),
        }
    }
}

/// One member of a FIRST set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FirstItem {
    /// The expression can match without consuming input.
    Empty,
    Pattern(PatternInfo),
}

pub type FirstSet = BTreeSet<FirstItem>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("rule `{referrer}` refers to undefined rule `{name}`")]
    UndefinedRule { name: String, referrer: String },
}

impl Expr {
    /// Names of every rule referenced anywhere in this expression.
    pub fn rule_refs(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.visit(&mut |expr| {
            if let Expr::RuleRef(name) = expr {
                names.insert(name.clone());
            }
        });
        names
    }

    /// Every pattern used in this expression, with its flags.
    pub fn pattern_infos(&self) -> BTreeSet<PatternInfo> {
        let mut infos = BTreeSet::new();
        self.visit(&mut |expr| {
            if let Expr::Pattern(pattern) = expr {
                infos.insert(PatternInfo::from(pattern));
            }
        });
        infos
    }

    /// Pre-order walk over this expression and all its descendants.
    fn visit(&self, f: &mut impl FnMut(&Expr)) {
        f(self);
        match self {
            Expr::Or(items) | Expr::Seq(items) => {
                for item in items {
                    item.visit(f);
                }
            }
            Expr::Occ01(item) | Expr::Occ0m(item) | Expr::Occ1m(item) => item.visit(f),
            Expr::Pattern(_) | Expr::RuleRef(_) | Expr::Code(_) => {}
        }
    }

    /// FIRST set of this expression given the current sets of all rules.
    ///
    /// An unknown rule contributes nothing; callers check references first.
    fn first_set(&self, rules: &BTreeMap<String, FirstSet>) -> FirstSet {
        match self {
            Expr::Pattern(pattern) if pattern.source.is_empty() => {
                FirstSet::from([FirstItem::Empty])
            }
            Expr::Pattern(pattern) => FirstSet::from([FirstItem::Pattern(pattern.into())]),
            Expr::Code(_) => FirstSet::from([FirstItem::Empty]),
            Expr::RuleRef(name) => rules.get(name).cloned().unwrap_or_default(),
            Expr::Or(items) => items.iter().flat_map(|item| item.first_set(rules)).collect(),
            Expr::Seq(items) => {
                let mut set = FirstSet::new();
                for item in items {
                    let item_set = item.first_set(rules);
                    let nullable = item_set.contains(&FirstItem::Empty);
                    set.extend(item_set.into_iter().filter(|i| *i != FirstItem::Empty));
                    if !nullable {
                        return set;
                    }
                }
                set.insert(FirstItem::Empty);
                set
            }
            Expr::Occ01(item) | Expr::Occ0m(item) => {
                let mut set = item.first_set(rules);
                set.insert(FirstItem::Empty);
                set
            }
            Expr::Occ1m(item) => item.first_set(rules),
        }
    }
}

impl Grammar {
    /// Checks that every referenced rule is defined.
    pub fn check_references(&self) -> Result<(), AnalysisError> {
        for rule in &self.rules {
            if let Some(name) = rule
                .body
                .rule_refs()
                .into_iter()
                .find(|name| self.rule(name).is_none())
            {
                return Err(AnalysisError::UndefinedRule {
                    name,
                    referrer: rule.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Every pattern used by any rule.
    pub fn pattern_infos(&self) -> BTreeSet<PatternInfo> {
        self.rules
            .iter()
            .flat_map(|rule| rule.body.pattern_infos())
            .collect()
    }

    /// Computes the FIRST set of every rule.
    ///
    /// Sets only grow between rounds and are bounded by the grammar's
    /// patterns, so the iteration terminates, left recursion included.
    pub fn first_sets(&self) -> Result<BTreeMap<String, FirstSet>, AnalysisError> {
        self.check_references()?;

        let mut sets: BTreeMap<String, FirstSet> = self
            .rules
            .iter()
            .map(|rule| (rule.name.clone(), FirstSet::new()))
            .collect();

        loop {
            let mut changed = false;
            for rule in &self.rules {
                let computed = rule.body.first_set(&sets);
                let current = sets.entry(rule.name.clone()).or_default();
                if !computed.is_subset(current) {
                    current.extend(computed);
                    changed = true;
                }
            }
            if !changed {
                return Ok(sets);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ArgValue, Args, RuleDef};

    fn rule(name: &str, body: Expr) -> RuleDef {
        RuleDef {
            name: name.to_string(),
            body,
            args: None,
        }
    }

    fn pat(source: &str) -> FirstItem {
        FirstItem::Pattern(PatternInfo {
            source: source.to_string(),
            flags: "0".to_string(),
        })
    }

    #[test]
    fn collects_rule_refs_and_patterns() {
        let mut args = Args::new();
        args.insert("flags".to_string(), ArgValue::Str("re.I".to_string()));
        let body = Expr::sequence(vec![
            Expr::rule_ref("a"),
            Expr::Occ0m(Box::new(Expr::alternation(vec![
                Expr::rule_ref("b"),
                Expr::pattern_with_args("x", Some(args)),
            ]))),
            Expr::rule_ref("a"),
        ]);
        assert_eq!(
            body.rule_refs().into_iter().collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        let infos: Vec<_> = body.pattern_infos().into_iter().collect();
        assert_eq!(
            infos,
            vec![PatternInfo {
                source: "x".to_string(),
                flags: "re.I".to_string()
            }]
        );
    }

    #[test]
    fn sequence_first_set_skips_nullable_items() {
        let grammar = Grammar {
            options: None,
            rules: vec![
                rule(
                    "s",
                    Expr::sequence(vec![
                        Expr::code("setup()"),
                        Expr::Occ01(Box::new(Expr::pattern("a"))),
                        Expr::rule_ref("t"),
                        Expr::pattern("never"),
                    ]),
                ),
                rule(
                    "t",
                    Expr::alternation(vec![
                        Expr::Occ1m(Box::new(Expr::pattern("b"))),
                        Expr::pattern("c"),
                    ]),
                ),
            ],
        };
        let sets = grammar.first_sets().unwrap();
        assert_eq!(sets["t"], FirstSet::from([pat("b"), pat("c")]));
        assert_eq!(sets["s"], FirstSet::from([pat("a"), pat("b"), pat("c")]));
    }

    #[test]
    fn fully_nullable_rules_contain_empty() {
        let grammar = Grammar {
            options: None,
            rules: vec![rule(
                "opt",
                Expr::sequence(vec![
                    Expr::Occ0m(Box::new(Expr::pattern("a"))),
                    Expr::pattern(""),
                ]),
            )],
        };
        let sets = grammar.first_sets().unwrap();
        assert_eq!(sets["opt"], FirstSet::from([FirstItem::Empty, pat("a")]));
    }

    #[test]
    fn left_recursion_reaches_a_fixed_point() {
        let grammar = Grammar {
            options: None,
            rules: vec![rule(
                "e",
                Expr::alternation(vec![
                    Expr::sequence(vec![Expr::rule_ref("e"), Expr::pattern("\\+")]),
                    Expr::pattern("n"),
                ]),
            )],
        };
        let sets = grammar.first_sets().unwrap();
        assert_eq!(sets["e"], FirstSet::from([pat("n")]));
    }

    #[test]
    fn undefined_references_are_reported() {
        let grammar = Grammar {
            options: None,
            rules: vec![rule("a", Expr::rule_ref("missing"))],
        };
        assert_eq!(
            grammar.first_sets(),
            Err(AnalysisError::UndefinedRule {
                name: "missing".to_string(),
                referrer: "a".to_string(),
            })
        );
    }
}
