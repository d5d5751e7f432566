//! FIRST-set and nullability computation shared by the lookahead
//! propagator and the infinite-recursion validator.

use std::collections::{HashMap, HashSet};

use crate::rule::RuleSet;
use crate::symbol::{Symbol, SymbolTable};

#[derive(Debug, Default)]
pub struct FirstSets {
    first: HashMap<Symbol, HashSet<Symbol>>,
    nullable: HashSet<Symbol>,
}

impl FirstSets {
    pub fn compute(symbols: &SymbolTable, rules: &RuleSet) -> Self {
        let mut first: HashMap<Symbol, HashSet<Symbol>> = HashMap::new();
        let mut nullable: HashSet<Symbol> = HashSet::new();

        for sym in symbols.iter_terminals() {
            first.entry(sym).or_default().insert(sym);
        }
        for sym in symbols.iter_nonterminals() {
            first.entry(sym).or_default();
        }

        loop {
            let mut changed = false;

            for rule in rules.iter() {
                if rule.id == 0 {
                    continue;
                }

                if rule.rhs.is_empty() {
                    changed |= nullable.insert(rule.lhs);
                    continue;
                }

                let mut all_nullable_so_far = true;
                for sym in &rule.rhs {
                    let sym_first = first.get(sym).cloned().unwrap_or_default();
                    let before = first.entry(rule.lhs).or_default().len();
                    first.entry(rule.lhs).or_default().extend(sym_first);
                    changed |= first.get(&rule.lhs).map(|s| s.len()).unwrap_or(0) != before;

                    if !nullable.contains(sym) {
                        all_nullable_so_far = false;
                        break;
                    }
                }
                if all_nullable_so_far {
                    changed |= nullable.insert(rule.lhs);
                }
            }

            if !changed {
                break;
            }
        }

        Self { first, nullable }
    }

    pub fn is_nullable(&self, sym: Symbol) -> bool {
        self.nullable.contains(&sym)
    }

    pub fn first_of(&self, sym: Symbol) -> &HashSet<Symbol> {
        static EMPTY: std::sync::OnceLock<HashSet<Symbol>> = std::sync::OnceLock::new();
        self.first
            .get(&sym)
            .unwrap_or_else(|| EMPTY.get_or_init(HashSet::new))
    }

    /// FIRST of a whole symbol sequence, following the standard
    /// "stop at the first non-nullable symbol" rule. `trailing` is
    /// unioned in when the whole sequence is nullable (used to seed the
    /// `#` sentinel / an outer lookahead into a closure).
    pub fn first_of_sequence<'a>(
        &self,
        seq: impl IntoIterator<Item = &'a Symbol>,
        trailing: &HashSet<Symbol>,
    ) -> HashSet<Symbol> {
        let mut result = HashSet::new();
        let mut all_nullable = true;
        for sym in seq {
            result.extend(self.first_of(*sym).iter().copied());
            if !self.is_nullable(*sym) {
                all_nullable = false;
                break;
            }
        }
        if all_nullable {
            result.extend(trailing.iter().copied());
        }
        result
    }
}
