//! The rule invocation tree.
//!
//! Every `scan` call pushes one record naming the rule, its parent
//! invocation and where it started. Records are never removed during a
//! session, so a failure raised deep inside a rule can still name the full
//! chain of rules that led to it after the stack has unwound.

use crate::source::Position;

use super::rules::RuleId;

/// Index of a record in a [`ContextTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub rule: RuleId,
    pub parent: Option<ContextId>,
    /// Cursor position after the leading whitespace skip.
    pub entry: Position,
}

/// Append-only arena of invocation records.
#[derive(Debug, Clone, Default)]
pub struct ContextTree {
    records: Vec<Context>,
}

impl ContextTree {
    pub fn push(&mut self, context: Context) -> ContextId {
        // Parents are always pushed before their children.
        debug_assert!(context.parent.map_or(true, |p| p.0 < self.records.len()));
        self.records.push(context);
        ContextId(self.records.len() - 1)
    }

    pub fn get(&self, id: ContextId) -> &Context {
        &self.records[id.0]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The rules from the root invocation down to `id`, inclusive.
    pub fn chain(&self, id: ContextId) -> Vec<RuleId> {
        let mut rules = Vec::new();
        let mut next = Some(id);
        while let Some(current) = next {
            let context = self.get(current);
            rules.push(context.rule);
            next = context.parent;
        }
        rules.reverse();
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_runs_from_root_to_leaf() {
        let mut tree = ContextTree::default();
        let root = tree.push(Context {
            rule: RuleId::All,
            parent: None,
            entry: Position::default(),
        });
        let seq = tree.push(Context {
            rule: RuleId::RuleSeq,
            parent: Some(root),
            entry: Position::default(),
        });
        let sibling = tree.push(Context {
            rule: RuleId::End,
            parent: Some(root),
            entry: Position::default(),
        });
        let leaf = tree.push(Context {
            rule: RuleId::RuleDef,
            parent: Some(seq),
            entry: Position::default(),
        });

        assert_eq!(
            tree.chain(leaf),
            vec![RuleId::All, RuleId::RuleSeq, RuleId::RuleDef]
        );
        assert_eq!(tree.chain(sibling), vec![RuleId::All, RuleId::End]);
        assert_eq!(tree.chain(root), vec![RuleId::All]);
        assert_eq!(tree.len(), 4);
    }
}
