//! Grammar symbols: terminals, nonterminals, literals and the reserved
//! `error`/`$end`/start symbols.
//!
//! The teacher's original design kept symbols as borrowed `&'static str`
//! so a whole grammar could live in a `const`. This toolkit's grammars
//! are declared at runtime through [`crate::grammar::GrammarBuilder`],
//! so symbols are interned into an owned table instead; [`Symbol`] is a
//! cheap `Copy` handle (an index) into that table.

use std::fmt;

/// The reserved end-of-input terminal.
pub const END: &str = "$end";
/// The reserved panic-mode recovery terminal.
pub const ERROR: &str = "error";
/// The synthetic augmented start symbol, `S' -> S $end`.
pub const START: &str = "$start";

#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
pub enum SymbolKind {
    Terminal,
    /// A terminal declared as a single literal character (e.g. `'+'`).
    Literal,
    NonTerminal,
    /// The reserved `$end` terminal.
    End,
    /// The reserved `error` terminal.
    Error,
    /// The synthetic `$start` nonterminal of the augmented grammar.
    Start,
}

/// A handle into a [`SymbolTable`]. Symbols compare and hash by id, so
/// two handles from the same table are equal iff they name the same
/// symbol.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(pub(crate) usize);

/// An entry in a [`SymbolTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolData {
    pub name: String,
    pub kind: SymbolKind,
}

impl SymbolData {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            SymbolKind::Terminal | SymbolKind::Literal | SymbolKind::End | SymbolKind::Error
        )
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, SymbolKind::Literal)
    }

    pub fn is_end(&self) -> bool {
        matches!(self.kind, SymbolKind::End)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, SymbolKind::Error)
    }

    pub fn is_start(&self) -> bool {
        matches!(self.kind, SymbolKind::Start)
    }
}

/// The interning table backing a [`crate::grammar::Grammar`].
///
/// `$start`, `$end` and `error` are pre-registered by [`SymbolTable::new`]
/// so every grammar has them, matching the reserved terminals in the
/// distilled spec's data model.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<SymbolData>,
}

pub const START_SYMBOL: Symbol = Symbol(0);
pub const END_SYMBOL: Symbol = Symbol(1);
pub const ERROR_SYMBOL: Symbol = Symbol(2);

impl SymbolTable {
    pub fn new() -> Self {
        let mut table = Self {
            symbols: Vec::new(),
        };
        let start = table.intern_with_kind(START, SymbolKind::Start);
        let end = table.intern_with_kind(END, SymbolKind::End);
        let error = table.intern_with_kind(ERROR, SymbolKind::Error);
        debug_assert_eq!(start, START_SYMBOL);
        debug_assert_eq!(end, END_SYMBOL);
        debug_assert_eq!(error, ERROR_SYMBOL);
        table
    }

    pub fn get_by_name(&self, name: &str) -> Option<Symbol> {
        self.symbols
            .iter()
            .position(|s| s.name == name)
            .map(Symbol)
    }

    pub fn data(&self, sym: Symbol) -> &SymbolData {
        &self.symbols[sym.0]
    }

    pub fn name(&self, sym: Symbol) -> &str {
        &self.data(sym).name
    }

    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        (0..self.symbols.len()).map(Symbol)
    }

    pub fn iter_terminals(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.iter().filter(|s| self.data(*s).is_terminal())
    }

    pub fn iter_nonterminals(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.iter().filter(|s| !self.data(*s).is_terminal())
    }

    pub fn start(&self) -> Symbol {
        START_SYMBOL
    }

    pub fn end(&self) -> Symbol {
        END_SYMBOL
    }

    pub fn error(&self) -> Symbol {
        ERROR_SYMBOL
    }

    /// Interns `name` as `kind`, returning the existing handle if it is
    /// already registered (regardless of its original kind).
    pub(crate) fn intern_with_kind(&mut self, name: &str, kind: SymbolKind) -> Symbol {
        if let Some(existing) = self.get_by_name(name) {
            return existing;
        }
        self.symbols.push(SymbolData {
            name: name.to_string(),
            kind,
        });
        Symbol(self.symbols.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// A symbol paired with the table needed to render it, for `Display`
/// without threading a table reference through every call site.
pub struct DisplaySymbol<'a> {
    pub table: &'a SymbolTable,
    pub symbol: Symbol,
}

impl fmt::Display for DisplaySymbol<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table.name(self.symbol))
    }
}
