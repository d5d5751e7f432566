//! Public facade over `yalp-core`'s grammar model, regex lexer runtime
//! and LALR(1) parser generator (section 6 of the distilled spec).
//!
//! `yalp-core` keeps every piece (`Grammar`, `Lexer`, `LrTable`,
//! `LrParser`, ...) independently constructible and borrow-checked;
//! this crate adds the two convenience entry points a grammar author
//! actually calls, `build_lexer`/`build_parser`, plus an optional
//! `grammar!`/`lexer!` macro surface from `yalp-macros` that desugars
//! to the same builder calls.

pub use yalp_core::cache::TableCache;
pub use yalp_core::error::{Diagnostic, DiagnosticBatch, ErrorKind, NoCustomError, Severity, YalpError, YalpResult};
pub use yalp_core::grammar::{Grammar, GrammarBuilder, GrammarError, GrammarResult};
pub use yalp_core::lexer::{Lexer, LexerBuilder, LexerInstance, LexStateKind, INITIAL};
pub use yalp_core::lr::{Action, Conflict, ConflictKind, LrParser, LrTable};
pub use yalp_core::rule::{action_fn, Assoc, Precedence, ReduceAction, Rule, RuleId};
pub use yalp_core::span::Span;
pub use yalp_core::symbol::{Symbol, SymbolKind, SymbolTable};
pub use yalp_core::token::{Ast, Token};

pub use yalp_macros::{grammar, lexer};

use thiserror::Error;

use yalp_core::lr::build_from_grammar_cached;

/// A `LexerBuilder::build` failure: one or more declaration-time
/// diagnostics, at least one of which is an error.
#[derive(Debug, Error)]
pub enum LexBuildError {
    #[error("{0}")]
    Batch(#[from] DiagnosticBatch),
}

/// A grammar/table-construction failure surfaced by [`build_parser`].
#[derive(Debug, Error)]
pub enum ParseBuildError {
    #[error("{0}")]
    Batch(#[from] DiagnosticBatch),
}

/// Validates and compiles a lexer. `grammar` supplies the token
/// namespace a lexer's rule names resolve against and the set of
/// declared literal characters; a lexer has no symbol table of its
/// own, so this differs from a parameterless `build_lexer(builder)`
/// signature by that one shared reference (see `DESIGN.md`).
pub fn build_lexer<C>(builder: LexerBuilder<C>, grammar: &Grammar) -> Result<Lexer<C>, LexBuildError> {
    builder
        .build(grammar.symbols(), grammar.literals())
        .map_err(LexBuildError::Batch)
}

/// An owned grammar plus its compiled ACTION/GOTO table and reduction
/// actions, ready to drive any number of parses via [`ParserRuntime::parse`].
pub struct ParserRuntime<A, C> {
    grammar: Grammar,
    table: LrTable,
    reducers: Vec<ReduceAction<A, C>>,
}

impl<A, C> ParserRuntime<A, C> {
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn table(&self) -> &LrTable {
        &self.table
    }

    /// Lower-level access to the driver, for callers that want their
    /// own `on_error` recovery hook instead of the default one used by
    /// [`Self::parse`].
    pub fn driver(&self) -> LrParser<'_, A, C>
    where
        A: Ast,
        C: Clone,
    {
        LrParser::new(&self.grammar, &self.table, &self.reducers)
    }

    /// Runs a parse to completion, logging a warning and entering
    /// panic-mode recovery on every syntax error instead of splicing
    /// in a replacement token.
    pub fn parse<'a>(&self, lexer: &mut LexerInstance<'a, C>) -> YalpResult<A, C>
    where
        A: Ast,
        C: Clone,
    {
        let tokens = std::iter::from_fn(|| lexer.next_token().transpose());
        self.driver().parse(tokens, |token| {
            match token {
                Some(tok) => tracing::warn!(symbol = ?tok.symbol, span = %tok.span, "syntax error"),
                None => tracing::warn!("syntax error at end of input"),
            }
            None
        })
    }
}

/// Builds a grammar's ACTION/GOTO table and packages it with its
/// reduction actions into a reusable [`ParserRuntime`].
pub fn build_parser<A, C>(
    grammar: Grammar,
    reducers: Vec<ReduceAction<A, C>>,
) -> Result<ParserRuntime<A, C>, ParseBuildError> {
    let (_, table) = yalp_core::lr::build_from_grammar(&grammar);
    for diagnostic in table.diagnostics(&grammar) {
        diagnostic.emit();
    }
    Ok(ParserRuntime {
        grammar,
        table,
        reducers,
    })
}

/// Like [`build_parser`], but first tries `cache` and only falls back
/// to a full LALR(1) build on a miss (see [`TableCache`]).
pub fn build_parser_cached<A, C>(
    grammar: Grammar,
    reducers: Vec<ReduceAction<A, C>>,
    cache: Option<&TableCache>,
) -> Result<ParserRuntime<A, C>, ParseBuildError> {
    let (_, table) = build_from_grammar_cached(&grammar, cache);
    for diagnostic in table.diagnostics(&grammar) {
        diagnostic.emit();
    }
    Ok(ParserRuntime {
        grammar,
        table,
        reducers,
    })
}

/// Like [`build_parser`], but also returns a [`TableCache`] snapshot of
/// the freshly built table, ready to [`TableCache::save`] for reuse by
/// a later [`build_parser_cached`] call.
pub fn build_parser_capturing<A, C>(
    grammar: Grammar,
    reducers: Vec<ReduceAction<A, C>>,
) -> Result<(ParserRuntime<A, C>, TableCache), ParseBuildError> {
    let (graph, table) = yalp_core::lr::build_from_grammar(&grammar);
    for diagnostic in table.diagnostics(&grammar) {
        diagnostic.emit();
    }
    let cache = TableCache::capture(&grammar, &table, graph.sets().len());
    Ok((
        ParserRuntime {
            grammar,
            table,
            reducers,
        },
        cache,
    ))
}
