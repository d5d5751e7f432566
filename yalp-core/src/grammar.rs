//! The grammar model: terminals, nonterminals, literals, precedence and
//! productions, populated once through [`GrammarBuilder`] and immutable
//! thereafter (section 3/4.1 of the spec).

use std::collections::HashMap;

use thiserror::Error;

use crate::error::{Diagnostic, DiagnosticBatch};
use crate::rule::{Assoc, Precedence, ReduceAction, Rule, RuleDef, RuleId};
use crate::symbol::{Symbol, SymbolKind, SymbolTable, END_SYMBOL, ERROR_SYMBOL, START_SYMBOL};

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("{0}")]
    Batch(#[from] DiagnosticBatch),
}

pub type GrammarResult<T> = Result<T, GrammarError>;

fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Builds a [`Grammar`] from an ordered sequence of declarations,
/// mirroring PLY's `tokens`/`literals`/`precedence`/`p_*` surface as an
/// explicit registration API (see spec section 9, "Dynamic introspection
/// -> explicit registration").
pub struct GrammarBuilder<Ast, Error> {
    symbols: SymbolTable,
    literals: Vec<char>,
    precedence: HashMap<Symbol, Precedence>,
    precedence_order: Vec<Symbol>,
    rule_defs: Vec<RuleDef>,
    reducers: Vec<ReduceAction<Ast, Error>>,
    diagnostics: Vec<Diagnostic>,
    start: Option<Symbol>,
}

impl<Ast, Error> Default for GrammarBuilder<Ast, Error> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ast, Error> GrammarBuilder<Ast, Error> {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            literals: Vec::new(),
            precedence: HashMap::new(),
            precedence_order: Vec::new(),
            rule_defs: Vec::new(),
            reducers: Vec::new(),
            diagnostics: Vec::new(),
            start: None,
        }
    }

    /// Declares a named terminal. Returns `self` for chaining.
    pub fn token(&mut self, name: &str) -> &mut Self {
        if !is_valid_identifier(name) {
            self.diagnostics.push(Diagnostic::error(
                "BadSymbol",
                format!("token name '{name}' is not a valid identifier"),
            ));
            return self;
        }
        if self.symbols.get_by_name(name).is_some() {
            self.diagnostics.push(Diagnostic::warning(
                "DuplicateToken",
                format!("token '{name}' is declared more than once"),
            ));
        }
        self.symbols.intern_with_kind(name, SymbolKind::Terminal);
        self
    }

    /// Declares a single-character literal terminal, e.g. `'+'`.
    pub fn literal(&mut self, ch: char) -> &mut Self {
        let name = ch.to_string();
        self.literals.push(ch);
        self.symbols.intern_with_kind(&name, SymbolKind::Literal);
        self
    }

    /// Declares a nonterminal explicitly. Nonterminals referenced as a
    /// production's `lhs` are also implicitly declared, so this is
    /// mostly useful to register a nonterminal with no productions yet
    /// (which will later be flagged as `UndefinedSymbol` if it stays
    /// empty).
    pub fn nonterminal(&mut self, name: &str) -> &mut Self {
        if let Some(existing) = self.symbols.get_by_name(name) {
            if self.symbols.data(existing).is_terminal() {
                self.diagnostics.push(Diagnostic::error(
                    "ReservedName",
                    format!("'{name}' is already declared as a terminal"),
                ));
            }
            return self;
        }
        self.symbols
            .intern_with_kind(name, SymbolKind::NonTerminal);
        self
    }

    /// Declares a precedence group; lowest-precedence group must be
    /// declared first.
    pub fn precedence(&mut self, assoc: Assoc, terms: &[&str]) -> &mut Self {
        let level = self.precedence_order_len() as u32 + 1;
        for term in terms {
            let sym = self.intern_prec_symbol(term);
            if self.precedence.contains_key(&sym) {
                self.diagnostics.push(Diagnostic::warning(
                    "DuplicatePrecedence",
                    format!("duplicate precedence assignment for '{term}', first wins"),
                ));
                continue;
            }
            self.precedence.insert(sym, Precedence { level, assoc });
            self.precedence_order.push(sym);
        }
        self
    }

    fn precedence_order_len(&self) -> usize {
        self.precedence
            .values()
            .map(|p| p.level)
            .max()
            .unwrap_or(0) as usize
    }

    fn intern_prec_symbol(&mut self, term: &str) -> Symbol {
        if let Some(sym) = self.symbols.get_by_name(term) {
            sym
        } else {
            // A precedence group may name a symbol not yet declared as
            // a token/literal; this is flagged later as a warning
            // rather than rejected outright, since %prec markers on
            // productions can legitimately precede the token list in
            // declaration order.
            self.symbols.intern_with_kind(term, SymbolKind::Terminal)
        }
    }

    /// Adds a production `lhs -> rhs[]` with its reduction action. The
    /// nonterminal `lhs` is implicitly declared if new. The first
    /// production added determines the grammar's start symbol.
    pub fn production<F>(&mut self, lhs: &str, rhs: &[&str], action: F) -> &mut Self
    where
        F: Fn(&Rule, Vec<Ast>) -> crate::error::YalpResult<Ast, Error> + Send + Sync + 'static,
    {
        self.production_prec(lhs, rhs, None, action)
    }

    /// Like [`Self::production`], but with an explicit `%prec term`
    /// override for conflict resolution.
    pub fn production_prec<F>(
        &mut self,
        lhs: &str,
        rhs: &[&str],
        prec_term: Option<&str>,
        action: F,
    ) -> &mut Self
    where
        F: Fn(&Rule, Vec<Ast>) -> crate::error::YalpResult<Ast, Error> + Send + Sync + 'static,
    {
        if let Some(existing) = self.symbols.get_by_name(lhs) {
            if self.symbols.data(existing).is_terminal() {
                self.diagnostics.push(Diagnostic::error(
                    "ReservedName",
                    format!("production lhs '{lhs}' is declared as a terminal"),
                ));
                return self;
            }
        }
        let lhs_sym = self.symbols.intern_with_kind(lhs, SymbolKind::NonTerminal);
        if self.start.is_none() {
            self.start = Some(lhs_sym);
        }

        let mut rhs_syms = Vec::with_capacity(rhs.len());
        for name in rhs {
            match self.symbols.get_by_name(name) {
                Some(sym) => rhs_syms.push(sym),
                None => {
                    // Forward references to nonterminals defined later
                    // are legal; we optimistically register the symbol
                    // as a nonterminal and let `build` demand it is
                    // eventually given at least one production.
                    let sym = self
                        .symbols
                        .intern_with_kind(name, SymbolKind::NonTerminal);
                    rhs_syms.push(sym);
                }
            }
        }

        let prec_override = prec_term.map(|t| self.intern_prec_symbol(t));

        self.rule_defs.push(RuleDef {
            lhs: lhs_sym,
            rhs: rhs_syms,
            prec_override,
        });
        self.reducers.push(Box::new(action));
        self
    }

    /// Validates all declarations and produces an immutable [`Grammar`]
    /// plus its reduction actions, or a batch of every diagnostic found.
    pub fn build(mut self) -> GrammarResult<(Grammar, Vec<ReduceAction<Ast, Error>>)> {
        let Some(start) = self.start else {
            self.diagnostics
                .push(Diagnostic::error("NoTokensList", "grammar has no productions"));
            return Err(GrammarError::Batch(DiagnosticBatch(self.diagnostics)));
        };

        // production 0: $start -> start_symbol $end
        let mut rules = Vec::with_capacity(self.rule_defs.len() + 1);
        rules.push(Rule {
            id: 0,
            lhs: START_SYMBOL,
            rhs: vec![start, END_SYMBOL],
            prec: Precedence::NONE,
        });

        let defined_nonterminals: std::collections::HashSet<Symbol> =
            self.rule_defs.iter().map(|d| d.lhs).collect();

        for (idx, def) in self.rule_defs.into_iter().enumerate() {
            for sym in std::iter::once(def.lhs).chain(def.rhs.iter().copied()) {
                let data = self.symbols.data(sym);
                if !data.is_terminal() && sym != START_SYMBOL && !defined_nonterminals.contains(&sym) {
                    self.diagnostics.push(Diagnostic::error(
                        "UndefinedSymbol",
                        format!(
                            "symbol '{}' is neither a declared terminal nor a defined nonterminal",
                            data.name
                        ),
                    ));
                }
            }

            let prec = def
                .prec_override
                .and_then(|s| self.precedence.get(&s).copied())
                .unwrap_or_else(|| {
                    def.rhs
                        .iter()
                        .rev()
                        .find(|s| self.symbols.data(**s).is_terminal())
                        .and_then(|s| self.precedence.get(s).copied())
                        .unwrap_or(Precedence::NONE)
                });

            rules.push(Rule {
                id: idx + 1,
                lhs: def.lhs,
                rhs: def.rhs,
                prec,
            });
        }

        for sym in self.precedence_order.iter() {
            if !self.symbols.data(*sym).is_terminal() {
                self.diagnostics.push(Diagnostic::warning(
                    "PrecedenceForUnknownSymbol",
                    format!(
                        "precedence declared for '{}' which is not a known terminal",
                        self.symbols.name(*sym)
                    ),
                ));
            }
        }

        if self.diagnostics.iter().any(Diagnostic::is_error) {
            return Err(GrammarError::Batch(DiagnosticBatch(self.diagnostics)));
        }

        let rule_set = crate::rule::RuleSet::new(rules);
        self.diagnostics
            .extend(crate::validate::check(&self.symbols, &rule_set, start));

        if self.diagnostics.iter().any(Diagnostic::is_error) {
            return Err(GrammarError::Batch(DiagnosticBatch(self.diagnostics)));
        }

        for d in &self.diagnostics {
            d.emit();
        }

        let grammar = Grammar {
            symbols: self.symbols,
            literals: self.literals,
            precedence: self.precedence,
            rules: rule_set,
            diagnostics: self.diagnostics,
        };

        Ok((grammar, self.reducers))
    }
}

/// The immutable, validated grammar. Productions are numbered in
/// declaration order starting at 1; production 0 is the synthetic
/// `$start -> S $end`.
#[derive(Debug)]
pub struct Grammar {
    pub(crate) symbols: SymbolTable,
    pub(crate) literals: Vec<char>,
    pub(crate) precedence: HashMap<Symbol, Precedence>,
    pub(crate) rules: crate::rule::RuleSet,
    /// Warnings accumulated during the build (errors would have aborted
    /// the build instead).
    pub diagnostics: Vec<Diagnostic>,
}

impl Grammar {
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn rules(&self) -> &crate::rule::RuleSet {
        &self.rules
    }

    pub fn literals(&self) -> &[char] {
        &self.literals
    }

    pub fn is_literal(&self, ch: char) -> bool {
        self.literals.contains(&ch)
    }

    pub fn precedence_of(&self, sym: Symbol) -> Precedence {
        self.precedence.get(&sym).copied().unwrap_or(Precedence::NONE)
    }

    pub fn rule_precedence(&self, id: RuleId) -> Precedence {
        self.rules.get(id).prec
    }

    pub fn start_symbol(&self) -> Symbol {
        // The real start symbol is the rhs[0] of production 0.
        self.rules.get(0).rhs[0]
    }

    pub fn error_symbol(&self) -> Symbol {
        ERROR_SYMBOL
    }

    pub fn end_symbol(&self) -> Symbol {
        END_SYMBOL
    }
}
