//! Grammar validation beyond what [`crate::grammar::GrammarBuilder`]
//! checks while interning declarations: reachability and productivity
//! analysis over the fully resolved rule set (section 4.8).

use std::collections::HashSet;

use crate::error::Diagnostic;
use crate::rule::RuleSet;
use crate::symbol::{Symbol, SymbolTable};

/// Symbols reachable from the start symbol via some derivation chain,
/// found by a simple worklist fixpoint over rule right-hand sides.
fn reachable_symbols(start: Symbol, rules: &RuleSet) -> HashSet<Symbol> {
    let mut reachable = HashSet::new();
    let mut worklist = vec![start];
    while let Some(sym) = worklist.pop() {
        if !reachable.insert(sym) {
            continue;
        }
        for rule in rules.iter_by_lhs(sym) {
            for rhs_sym in &rule.rhs {
                if !reachable.contains(rhs_sym) {
                    worklist.push(*rhs_sym);
                }
            }
        }
    }
    reachable
}

/// A nonterminal is productive if some production's right-hand side is
/// made entirely of productive symbols (terminals are trivially
/// productive). A nonterminal that never becomes productive cannot
/// derive any finite terminal string: infinite recursion (section 4.8).
fn productive_symbols(symbols: &SymbolTable, rules: &RuleSet) -> HashSet<Symbol> {
    let mut productive: HashSet<Symbol> = symbols.iter_terminals().collect();

    loop {
        let mut changed = false;
        for rule in rules.iter() {
            if rule.id == 0 || productive.contains(&rule.lhs) {
                continue;
            }
            if rule.rhs.iter().all(|s| productive.contains(s)) {
                productive.insert(rule.lhs);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    productive
}

/// Runs every check in section 4.8 and returns its diagnostics.
/// Callers should treat any [`Diagnostic::is_error`] entry as fatal.
pub fn check(symbols: &SymbolTable, rules: &RuleSet, start: Symbol) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let reachable = reachable_symbols(start, rules);
    let productive = productive_symbols(symbols, rules);

    for sym in symbols.iter_terminals() {
        let used = rules.iter().any(|r| r.rhs.contains(&sym));
        if !used && sym != symbols.end() && sym != symbols.error() {
            diagnostics.push(Diagnostic::warning(
                "UnusedTerminal",
                format!("terminal '{}' is declared but never used in a production", symbols.name(sym)),
            ));
        }
    }

    for rule in rules.iter() {
        if rule.id == 0 {
            continue;
        }
        if !reachable.contains(&rule.lhs) {
            diagnostics.push(Diagnostic::warning(
                "UnusedRule",
                format!(
                    "production ({}) for '{}' is unreachable from the start symbol",
                    rule.id,
                    symbols.name(rule.lhs)
                ),
            ));
        }
    }

    for sym in symbols.iter_nonterminals() {
        if sym == symbols.start() {
            continue;
        }
        if !reachable.contains(&sym) {
            diagnostics.push(Diagnostic::warning(
                "UnreachableSymbol",
                format!("nonterminal '{}' is never reachable from the start symbol", symbols.name(sym)),
            ));
        }
    }

    for sym in symbols.iter_nonterminals() {
        if reachable.contains(&sym) && !productive.contains(&sym) {
            diagnostics.push(Diagnostic::error(
                "InfiniteRecursion",
                format!(
                    "nonterminal '{}' has no production that derives a finite terminal string",
                    symbols.name(sym)
                ),
            ));
        }
    }

    diagnostics
}
