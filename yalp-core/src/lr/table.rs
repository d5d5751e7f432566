//! ACTION/GOTO table construction, precedence-based conflict resolution
//! and the `prettytable-rs` dump used for debugging (section 4.6).

use std::collections::HashMap;

use prettytable::Table as PrettyTable;

use crate::error::Diagnostic;
use crate::grammar::Grammar;
use crate::item::ItemSetId;
use crate::lr::action::Action;
use crate::lr::graph::Graph;
use crate::lr::lookahead::{self, LookaheadTable};
use crate::rule::Assoc;
use crate::symbol::Symbol;

#[derive(Debug, Clone)]
pub struct Conflict {
    pub state: ItemSetId,
    pub symbol: Symbol,
    pub kind: ConflictKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

pub struct LrTable {
    action: HashMap<(ItemSetId, Symbol), Action>,
    goto: HashMap<(ItemSetId, Symbol), ItemSetId>,
    pub conflicts: Vec<Conflict>,
}

impl LrTable {
    /// Rebuilds a table straight from its maps, bypassing construction
    /// entirely. Used to replay a [`crate::cache::TableCache`] hit.
    pub fn from_parts(
        action: HashMap<(ItemSetId, Symbol), Action>,
        goto: HashMap<(ItemSetId, Symbol), ItemSetId>,
    ) -> Self {
        Self {
            action,
            goto,
            conflicts: Vec::new(),
        }
    }

    pub fn action(&self, state: ItemSetId, symbol: Symbol) -> Option<Action> {
        self.action.get(&(state, symbol)).copied()
    }

    pub fn goto(&self, state: ItemSetId, symbol: Symbol) -> Option<ItemSetId> {
        self.goto.get(&(state, symbol)).copied()
    }

    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }

    pub fn diagnostics(&self, grammar: &Grammar) -> Vec<Diagnostic> {
        self.conflicts
            .iter()
            .map(|c| {
                let kind = match c.kind {
                    ConflictKind::ShiftReduce => "shift/reduce",
                    ConflictKind::ReduceReduce => "reduce/reduce",
                };
                Diagnostic::warning(
                    "Conflict",
                    format!(
                        "{kind} conflict in state {} on '{}', resolved in favor of the earlier-declared action",
                        c.state,
                        grammar.symbols().name(c.symbol)
                    ),
                )
            })
            .collect()
    }

    /// Renders the ACTION/GOTO table as the teacher's tests expect to
    /// see it dumped for debugging, one row per state.
    pub fn display(&self, grammar: &Grammar, graph: &Graph<'_>) -> PrettyTable {
        let symbols = grammar.symbols();
        let terminals: Vec<Symbol> = symbols.iter_terminals().collect();
        let nonterminals: Vec<Symbol> = symbols
            .iter_nonterminals()
            .filter(|s| *s != symbols.start())
            .collect();

        let mut table = PrettyTable::new();

        table.add_row(
            ["state".to_string()]
                .into_iter()
                .chain(terminals.iter().map(|t| symbols.name(*t).to_string()))
                .chain(nonterminals.iter().map(|n| symbols.name(*n).to_string()))
                .collect(),
        );

        for set in graph.sets() {
            table.add_row(
                [set.id.to_string()]
                    .into_iter()
                    .chain(terminals.iter().map(|t| {
                        self.action(set.id, *t).map(|a| a.to_string()).unwrap_or_default()
                    }))
                    .chain(nonterminals.iter().map(|n| {
                        self.goto(set.id, *n).map(|s| s.to_string()).unwrap_or_default()
                    }))
                    .collect(),
            );
        }

        table
    }
}

struct Builder<'g> {
    grammar: &'g Grammar,
    action: HashMap<(ItemSetId, Symbol), Action>,
    goto: HashMap<(ItemSetId, Symbol), ItemSetId>,
    conflicts: Vec<Conflict>,
}

impl<'g> Builder<'g> {
    fn set_action(&mut self, state: ItemSetId, symbol: Symbol, candidate: Action) {
        let Some(existing) = self.action.get(&(state, symbol)).copied() else {
            self.action.insert((state, symbol), candidate);
            return;
        };
        if existing == candidate {
            return;
        }
        let resolved = self.resolve(state, symbol, existing, candidate);
        self.action.insert((state, symbol), resolved);
    }

    fn resolve(&mut self, state: ItemSetId, symbol: Symbol, a: Action, b: Action) -> Action {
        match (a, b) {
            (Action::Shift(_), Action::Reduce(rule)) | (Action::Reduce(rule), Action::Shift(_)) => {
                let shift = if matches!(a, Action::Shift(_)) { a } else { b };
                let term_prec = self.grammar.precedence_of(symbol);
                let rule_prec = self.grammar.rule_precedence(rule);
                if !term_prec.has_precedence() || !rule_prec.has_precedence() {
                    // No declared precedence to consult: the default
                    // shift resolution is a genuine, reported conflict.
                    self.conflicts.push(Conflict {
                        state,
                        symbol,
                        kind: ConflictKind::ShiftReduce,
                    });
                    return shift;
                }
                if rule_prec.level > term_prec.level {
                    Action::Reduce(rule)
                } else if term_prec.level > rule_prec.level {
                    shift
                } else {
                    match term_prec.assoc {
                        Assoc::Left => Action::Reduce(rule),
                        Assoc::Right => shift,
                        Assoc::NonAssoc => Action::Error,
                    }
                }
            }
            (Action::Reduce(r1), Action::Reduce(r2)) => {
                self.conflicts.push(Conflict {
                    state,
                    symbol,
                    kind: ConflictKind::ReduceReduce,
                });
                Action::Reduce(r1.min(r2))
            }
            _ => a,
        }
    }
}

/// Builds the ACTION/GOTO table from the canonical collection and its
/// LALR(1) lookaheads.
pub fn build(grammar: &Grammar, graph: &Graph<'_>, lookaheads: &LookaheadTable) -> LrTable {
    let symbols = grammar.symbols();
    let rules = grammar.rules();
    let end = symbols.end();

    let mut builder = Builder {
        grammar,
        action: HashMap::new(),
        goto: HashMap::new(),
        conflicts: Vec::new(),
    };

    for set in graph.sets() {
        for item in set.iter() {
            if item.rule == 0 {
                if rules.get(0).rhs.get(item.dot) == Some(&end) && item.dot + 1 == rules.get(0).len() {
                    builder.set_action(set.id, end, Action::Accept);
                }
                continue;
            }

            if let Some(sym) = item.symbol_after_dot(rules) {
                if symbols.data(sym).is_terminal() {
                    if let Some(to) = graph.goto(set.id, sym) {
                        builder.set_action(set.id, sym, Action::Shift(to));
                    }
                }
            } else {
                let la = lookaheads.get(set.id, *item);
                for sym in la {
                    builder.set_action(set.id, sym, Action::Reduce(item.rule));
                }
            }
        }

        for sym in set.transition_symbols(rules) {
            if !symbols.data(sym).is_terminal() {
                if let Some(to) = graph.goto(set.id, sym) {
                    builder.goto.insert((set.id, sym), to);
                }
            }
        }
    }

    LrTable {
        action: builder.action,
        goto: builder.goto,
        conflicts: builder.conflicts,
    }
}

/// Convenience: runs the whole LALR(1) pipeline (graph, lookaheads,
/// table) for a validated grammar.
pub fn build_from_grammar<'g>(grammar: &'g Grammar) -> (Graph<'g>, LrTable) {
    let mut graph = Graph::new(grammar.rules());
    graph.build();
    let lookaheads = lookahead::compute(&graph, grammar.rules(), grammar.symbols());
    let table = build(grammar, &graph, &lookaheads);
    (graph, table)
}

/// Like [`build_from_grammar`], but first tries `cache` and, on a hit,
/// skips LR(0)/LALR construction entirely. A miss (stale signature, or
/// a cache built by an older format version) falls back to a full
/// build silently; it is never treated as an error.
pub fn build_from_grammar_cached<'g>(
    grammar: &'g Grammar,
    cache: Option<&crate::cache::TableCache>,
) -> (Option<Graph<'g>>, LrTable) {
    if let Some(cache) = cache {
        if cache.matches(grammar) {
            if let Some(table) = cache.to_table(grammar) {
                return (None, table);
            }
        }
    }
    let (graph, table) = build_from_grammar(grammar);
    (Some(graph), table)
}
