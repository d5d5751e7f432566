//! DeRemer-Pennello-style LALR(1) lookahead propagation on the LR(0)
//! kernel items (section 4.5 of the spec).
//!
//! For each kernel item of each state we take its closure once more,
//! this time tracking, for every item produced, whether its lookahead
//! is a concrete terminal generated "spontaneously" from the grammar's
//! own structure, or the sentinel `#` meaning "whatever the outer
//! item's lookahead turns out to be" (i.e. it must be *propagated*).
//! The propagation graph built from every kernel item's mini-closure is
//! then iterated to a fixpoint.

use std::collections::{HashMap, HashSet};

use crate::item::{Item, ItemSetId};
use crate::lr::first::FirstSets;
use crate::lr::graph::Graph;
use crate::rule::RuleSet;
use crate::symbol::{Symbol, SymbolTable};

pub type ItemKey = (ItemSetId, Item);

#[derive(Default, Clone)]
struct Marker {
    sentinel: bool,
    concrete: HashSet<Symbol>,
}

impl Marker {
    fn merge(&mut self, other: &Marker) -> bool {
        let mut changed = false;
        if other.sentinel && !self.sentinel {
            self.sentinel = true;
            changed = true;
        }
        for s in &other.concrete {
            changed |= self.concrete.insert(*s);
        }
        changed
    }
}

pub struct LookaheadTable {
    la: HashMap<ItemKey, HashSet<Symbol>>,
}

impl LookaheadTable {
    pub fn get(&self, state: ItemSetId, item: Item) -> HashSet<Symbol> {
        self.la.get(&(state, item)).cloned().unwrap_or_default()
    }
}

/// Computes the mini-closure for a single outer kernel item, following
/// the recipe in 4.5: closure with lookahead `#`, where `#` marks items
/// whose lookahead must come from outside (propagated) rather than
/// being generated by the grammar's own FIRST sets (spontaneous).
fn mini_closure(outer: Item, rules: &RuleSet, first: &FirstSets) -> HashMap<Item, Marker> {
    let mut table: HashMap<Item, Marker> = HashMap::new();
    table.insert(
        outer,
        Marker {
            sentinel: true,
            concrete: HashSet::new(),
        },
    );

    loop {
        let mut changed = false;
        let snapshot: Vec<(Item, Marker)> =
            table.iter().map(|(k, v)| (*k, v.clone())).collect();

        for (item, marker) in snapshot {
            let Some(x) = item.symbol_after_dot(rules) else {
                continue;
            };
            let rule = rules.get(item.rule);
            let beta = &rule.rhs[item.dot + 1..];

            let mut concrete: HashSet<Symbol> = HashSet::new();
            let mut all_beta_nullable = true;
            for sym in beta {
                concrete.extend(first.first_of(*sym).iter().copied());
                if !first.is_nullable(*sym) {
                    all_beta_nullable = false;
                    break;
                }
            }
            let sentinel = all_beta_nullable && marker.sentinel;
            if all_beta_nullable {
                concrete.extend(marker.concrete.iter().copied());
            }

            for target_rule in rules.iter().filter(|r| r.lhs == x) {
                let candidate = Item::start(target_rule.id);
                let entry = table.entry(candidate).or_default();
                changed |= entry.merge(&Marker {
                    sentinel,
                    concrete: concrete.clone(),
                });
            }
        }

        if !changed {
            break;
        }
    }

    table
}

pub fn compute(
    graph: &Graph<'_>,
    rules: &RuleSet,
    _symbols: &SymbolTable,
) -> LookaheadTable {
    let first = FirstSets::compute(_symbols, rules);
    let mut la: HashMap<ItemKey, HashSet<Symbol>> = HashMap::new();
    let mut propagation: Vec<(ItemKey, ItemKey)> = Vec::new();

    for set in graph.sets() {
        for outer in set.kernel() {
            let closure = mini_closure(outer, rules, &first);

            for (item, marker) in &closure {
                let target_key: ItemKey = match item.symbol_after_dot(rules) {
                    Some(x) => {
                        let Some(to_state) = graph.goto(set.id, x) else {
                            continue;
                        };
                        (to_state, item.advanced())
                    }
                    None => (set.id, *item),
                };

                la.entry(target_key).or_default().extend(marker.concrete.iter().copied());
                if marker.sentinel {
                    let source_key: ItemKey = (set.id, outer);
                    if source_key != target_key {
                        propagation.push((source_key, target_key));
                    }
                }
            }
        }
    }

    loop {
        let mut changed = false;
        for (from, to) in &propagation {
            let from_set = la.get(from).cloned().unwrap_or_default();
            if from_set.is_empty() {
                continue;
            }
            let to_set = la.entry(*to).or_default();
            for sym in from_set {
                changed |= to_set.insert(sym);
            }
        }
        if !changed {
            break;
        }
    }

    LookaheadTable { la }
}
