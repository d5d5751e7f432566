//! LR(0) items and item sets (canonical collection construction),
//! section 4.4 of the spec.

use std::collections::BTreeSet;

use crate::rule::{RuleId, RuleSet};
use crate::symbol::Symbol;

pub type ItemSetId = usize;

/// `(production, dot_position)`. A dot of 0 marks an item not yet
/// started; a dot equal to the rule's length marks a completed
/// ("exhausted") item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    pub rule: RuleId,
    pub dot: usize,
}

impl Item {
    pub fn start(rule: RuleId) -> Self {
        Self { rule, dot: 0 }
    }

    /// A kernel item has dot > 0, or is the seed item of the augmented
    /// start production (rule 0).
    pub fn is_kernel(&self) -> bool {
        self.dot > 0 || self.rule == 0
    }

    pub fn is_exhausted(&self, rules: &RuleSet) -> bool {
        self.dot >= rules.get(self.rule).len()
    }

    /// The grammar symbol immediately after the dot, if any.
    pub fn symbol_after_dot(&self, rules: &RuleSet) -> Option<Symbol> {
        rules.get(self.rule).rhs.get(self.dot).copied()
    }

    pub fn advanced(&self) -> Self {
        Self {
            rule: self.rule,
            dot: self.dot + 1,
        }
    }
}

/// A state in the canonical LR(0) collection: the closure over a
/// kernel. States are numbered by first-encounter order starting at 0.
#[derive(Debug, Clone)]
pub struct ItemSet {
    pub id: ItemSetId,
    /// Full closure, deduplicated and sorted for deterministic
    /// iteration/display.
    items: BTreeSet<Item>,
}

impl PartialEq for ItemSet {
    /// Two item sets are the same LALR state iff their *kernels* match;
    /// this is what makes the canonical-collection construction
    /// LALR-ready (multiple LR(1) kernels that agree on their LR(0)
    /// core get merged into one state).
    fn eq(&self, other: &Self) -> bool {
        self.kernel().eq(&other.kernel())
    }
}

impl Eq for ItemSet {}

impl ItemSet {
    pub fn from_kernel(id: ItemSetId, kernel: impl IntoIterator<Item = Item>, rules: &RuleSet) -> Self {
        let mut set = Self {
            id,
            items: kernel.into_iter().collect(),
        };
        set.close(rules);
        set
    }

    pub fn kernel(&self) -> BTreeSet<Item> {
        self.items.iter().copied().filter(Item::is_kernel).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn contains(&self, item: &Item) -> bool {
        self.items.contains(item)
    }

    /// Closes the item set to a fixpoint: for every `A -> a . B b`,
    /// add `B -> . g` for every production with lhs `B`.
    pub fn close(&mut self, rules: &RuleSet) {
        loop {
            let mut added = Vec::new();
            for item in self.items.iter() {
                if let Some(sym) = item.symbol_after_dot(rules) {
                    if !rules.get(item.rule).rhs.is_empty() {
                        for rule in rules.iter() {
                            if rule.lhs == sym {
                                let candidate = Item::start(rule.id);
                                if !self.items.contains(&candidate) {
                                    added.push(candidate);
                                }
                            }
                        }
                    }
                }
            }
            if added.is_empty() {
                break;
            }
            self.items.extend(added);
        }
    }

    /// Symbols for which this state has at least one transition.
    pub fn transition_symbols(&self, rules: &RuleSet) -> BTreeSet<Symbol> {
        self.items
            .iter()
            .filter_map(|it| it.symbol_after_dot(rules))
            .collect()
    }

    /// The kernel items reached by moving the dot across `symbol`.
    pub fn goto_kernel(&self, symbol: Symbol, rules: &RuleSet) -> Vec<Item> {
        self.items
            .iter()
            .filter(|it| it.symbol_after_dot(rules) == Some(symbol))
            .map(Item::advanced)
            .collect()
    }

    pub fn has_item_reaching_end(&self, rules: &RuleSet, end: Symbol) -> bool {
        self.items.iter().any(|it| {
            it.rule == 0 && rules.get(it.rule).rhs.get(it.dot) == Some(&end)
        })
    }

    pub fn iter_exhausted<'a>(&'a self, rules: &'a RuleSet) -> impl Iterator<Item = &'a Item> + 'a {
        self.items.iter().filter(move |it| it.is_exhausted(rules) && it.rule != 0)
    }
}
