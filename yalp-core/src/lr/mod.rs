//! LALR(1) table construction (sections 4.4-4.6) and the table-driven
//! parser runtime with panic-mode error recovery (section 4.7).

pub mod action;
mod first;
pub mod graph;
pub mod lookahead;
pub mod table;

pub use action::Action;
pub use graph::Graph;
pub use lookahead::LookaheadTable;
pub use table::{build, build_from_grammar, build_from_grammar_cached, Conflict, ConflictKind, LrTable};

use crate::error::{ErrorKind, YalpError, YalpResult};
use crate::grammar::Grammar;
use crate::item::ItemSetId;
use crate::rule::ReduceAction;
use crate::symbol::Symbol;
use crate::token::{Ast, Token};

/// Drives a parse by walking the ACTION/GOTO table, calling the
/// grammar's reduction actions and performing panic-mode recovery when
/// it hits an `error` action.
pub struct LrParser<'g, A, C> {
    grammar: &'g Grammar,
    table: &'g LrTable,
    reducers: &'g [ReduceAction<A, C>],
}

struct Frame<A> {
    symbol: Symbol,
    state: ItemSetId,
    value: A,
}

impl<'g, A, C> LrParser<'g, A, C>
where
    A: Ast,
    C: Clone,
{
    pub fn new(grammar: &'g Grammar, table: &'g LrTable, reducers: &'g [ReduceAction<A, C>]) -> Self {
        Self {
            grammar,
            table,
            reducers,
        }
    }

    /// Runs the parse to completion. `on_error` is invoked with the
    /// offending token (`None` at EOF) whenever panic-mode recovery
    /// kicks in; it may return a token to splice into the stream as the
    /// next lookahead, bypassing the discard loop.
    pub fn parse<I>(&self, tokens: I, mut on_error: impl FnMut(Option<&Token>) -> Option<Token>) -> YalpResult<A, C>
    where
        I: IntoIterator<Item = YalpResult<Token, C>>,
    {
        let symbols = self.grammar.symbols();
        let mut input = tokens.into_iter().peekable();
        let mut stack: Vec<Frame<A>> = vec![];
        let mut states: Vec<ItemSetId> = vec![0];
        let mut in_error = false;

        let mut lookahead = Self::pull(&mut input)?;

        loop {
            let state = *states.last().unwrap();
            let sym = lookahead
                .as_ref()
                .map(|t| t.symbol)
                .unwrap_or_else(|| symbols.end());

            let action = self.table.action(state, sym);

            match action {
                Some(Action::Shift(to)) => {
                    let tok = lookahead.take().expect("shift requires a token");
                    let value = A::from(tok.clone());
                    stack.push(Frame {
                        symbol: sym,
                        state: to,
                        value,
                    });
                    states.push(to);
                    in_error = false;
                    lookahead = Self::pull(&mut input)?;
                }
                Some(Action::Reduce(rule_id)) => {
                    let rule = self.grammar.rules().get(rule_id);
                    let n = rule.len();
                    let split_at = stack.len() - n;
                    let args: Vec<A> = stack.split_off(split_at).into_iter().map(|f| f.value).collect();
                    states.truncate(states.len() - n);

                    let reducer = &self.reducers[rule_id - 1];
                    let result = reducer(rule, args)?;

                    let from_state = *states.last().unwrap();
                    let goto = self.table.goto(from_state, rule.lhs).ok_or_else(|| {
                        YalpError::new(
                            ErrorKind::unexpected_symbol(
                                symbols.name(rule.lhs),
                                symbols.iter_nonterminals().map(|s| symbols.name(s).to_string()),
                            ),
                            None,
                        )
                    })?;

                    states.push(goto);
                    stack.push(Frame {
                        symbol: rule.lhs,
                        state: goto,
                        value: result,
                    });
                }
                Some(Action::Accept) => {
                    return Ok(stack.pop().expect("accept with an empty stack").value);
                }
                Some(Action::Error) | None => {
                    if in_error {
                        // Already recovering: swallow this error and keep
                        // discarding input without calling the user hook
                        // again (idempotent recovery, section 4.7).
                        lookahead = Self::pull(&mut input)?;
                        if lookahead.is_none() && sym == symbols.end() {
                            return Err(YalpError::new(ErrorKind::Unrecoverable, None));
                        }
                        continue;
                    }

                    let span = lookahead.as_ref().map(|t| t.span);
                    let injected = on_error(lookahead.as_ref());
                    in_error = true;

                    let error_sym = symbols.error();
                    let mut recovered = false;
                    while let Some(&s) = states.last() {
                        if self.table.action(s, error_sym).is_some() {
                            recovered = true;
                            break;
                        }
                        states.pop();
                        stack.pop();
                    }
                    if !recovered {
                        return Err(YalpError::new(ErrorKind::ParseError(span), span));
                    }

                    let recovery_state = *states.last().unwrap();
                    let Some(Action::Shift(to)) = self.table.action(recovery_state, error_sym) else {
                        return Err(YalpError::new(ErrorKind::ParseError(span), span));
                    };
                    states.push(to);
                    stack.push(Frame {
                        symbol: error_sym,
                        state: to,
                        value: A::from(Token::new(error_sym, span.unwrap_or_default(), "")),
                    });

                    lookahead = match injected {
                        Some(tok) => Some(tok),
                        None => Self::discard_until_acceptable(&mut input, *states.last().unwrap(), self.table, symbols)?,
                    };
                }
            }
        }
    }

    fn pull<I>(input: &mut std::iter::Peekable<I>) -> YalpResult<Option<Token>, C>
    where
        I: Iterator<Item = YalpResult<Token, C>>,
    {
        input.next().transpose()
    }

    fn discard_until_acceptable<I>(
        input: &mut std::iter::Peekable<I>,
        state: ItemSetId,
        table: &LrTable,
        symbols: &crate::symbol::SymbolTable,
    ) -> YalpResult<Option<Token>, C>
    where
        I: Iterator<Item = YalpResult<Token, C>>,
    {
        loop {
            let next = Self::pull(input)?;
            match &next {
                None => return Ok(None),
                Some(tok) => {
                    if table.action(state, tok.symbol).is_some() || tok.symbol == symbols.end() {
                        return Ok(next);
                    }
                }
            }
        }
    }
}
