//! Canonical LR(0) set-of-items construction and the GOTO graph
//! (section 4.4 of the spec).

use std::collections::VecDeque;

use crate::item::{Item, ItemSet, ItemSetId};
use crate::rule::RuleSet;
use crate::symbol::Symbol;

pub struct Graph<'rules> {
    rules: &'rules RuleSet,
    pub(crate) sets: Vec<ItemSet>,
    pub(crate) edges: Vec<(ItemSetId, Symbol, ItemSetId)>,
}

impl<'rules> Graph<'rules> {
    pub fn new(rules: &'rules RuleSet) -> Self {
        let start = ItemSet::from_kernel(0, [Item::start(0)], rules);
        Self {
            rules,
            sets: vec![start],
            edges: vec![],
        }
    }

    fn find_id(&self, kernel: &ItemSet) -> Option<ItemSetId> {
        self.sets.iter().find(|s| *s == kernel).map(|s| s.id)
    }

    fn push(&mut self, set: ItemSet) -> ItemSetId {
        if let Some(id) = self.find_id(&set) {
            return id;
        }
        let id = self.sets.len();
        let mut set = set;
        set.id = id;
        self.sets.push(set);
        id
    }

    /// Builds the full canonical collection by breadth-first exploration
    /// of the GOTO relation starting at state 0.
    pub fn build(&mut self) {
        let mut queue = VecDeque::from([0]);
        let mut visited = std::collections::HashSet::new();

        while let Some(set_id) = queue.pop_front() {
            if !visited.insert(set_id) {
                continue;
            }

            let symbols: Vec<Symbol> = {
                let set = &self.sets[set_id];
                set.transition_symbols(self.rules).into_iter().collect()
            };

            for symbol in symbols {
                let kernel = self.sets[set_id].goto_kernel(symbol, self.rules);
                if kernel.is_empty() {
                    continue;
                }
                let candidate = ItemSet::from_kernel(self.sets.len(), kernel, self.rules);
                let to_id = self.push(candidate);
                self.edges.push((set_id, symbol, to_id));
                if !visited.contains(&to_id) {
                    queue.push_back(to_id);
                }
            }
        }
    }

    pub fn sets(&self) -> &[ItemSet] {
        &self.sets
    }

    pub fn edges(&self) -> &[(ItemSetId, Symbol, ItemSetId)] {
        &self.edges
    }

    pub fn goto(&self, from: ItemSetId, symbol: Symbol) -> Option<ItemSetId> {
        self.edges
            .iter()
            .find(|(f, s, _)| *f == from && *s == symbol)
            .map(|(_, _, to)| *to)
    }

    pub fn edges_from(&self, from: ItemSetId) -> impl Iterator<Item = (Symbol, ItemSetId)> + '_ {
        self.edges
            .iter()
            .filter(move |(f, _, _)| *f == from)
            .map(|(_, s, t)| (*s, *t))
    }
}
