//! The lexer runtime: a regex-rule-driven scanner with inclusive and
//! exclusive states, ordered-priority token selection (function rules,
//! then longest-pattern string rules) and panic-mode recovery via the
//! `error` rule (sections 4.2-4.3).

pub mod action;
pub mod regex_front;

use std::collections::{HashMap, HashSet};

pub use action::LexAction;
use regex_front::{compile_rule, order_rules, try_match, LexRule, RuleBody};

use crate::error::{Diagnostic, DiagnosticBatch, ErrorKind, YalpError, YalpResult};
use crate::span::{NextColumn, NextLine, Span};
use crate::symbol::{Symbol, SymbolTable};
use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexStateKind {
    /// Rules from the default state still apply here.
    Inclusive,
    /// Only this state's own rules apply.
    Exclusive,
}

struct PendingRule<C> {
    name: String,
    pattern: String,
    body: RuleBody<C>,
    declared_order: usize,
}

struct StateBuilder<C> {
    name: String,
    kind: LexStateKind,
    rules: Vec<PendingRule<C>>,
    ignore: Option<String>,
    error: Option<LexAction<C>>,
}

/// Registers lexer states and rules, mirroring PLY's `states`/`t_*`
/// surface as an explicit builder (spec section 9).
pub struct LexerBuilder<C> {
    states: Vec<StateBuilder<C>>,
    diagnostics: Vec<Diagnostic>,
    next_order: usize,
}

pub const INITIAL: &str = "INITIAL";

impl<C> Default for LexerBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> LexerBuilder<C> {
    pub fn new() -> Self {
        Self {
            states: vec![StateBuilder {
                name: INITIAL.to_string(),
                kind: LexStateKind::Inclusive,
                rules: Vec::new(),
                ignore: None,
                error: None,
            }],
            diagnostics: Vec::new(),
            next_order: 0,
        }
    }

    pub fn state(&mut self, name: &str, kind: LexStateKind) -> &mut Self {
        if self.states.iter().any(|s| s.name == name) {
            self.diagnostics.push(Diagnostic::warning(
                "DuplicateState",
                format!("lexer state '{name}' is declared more than once"),
            ));
            return self;
        }
        self.states.push(StateBuilder {
            name: name.to_string(),
            kind,
            rules: Vec::new(),
            ignore: None,
            error: None,
        });
        self
    }

    fn state_mut(&mut self, name: &str) -> Option<&mut StateBuilder<C>> {
        self.states.iter_mut().find(|s| s.name == name)
    }

    /// A bare-pattern rule: a match directly yields a token of `name`'s
    /// kind, carrying the matched text as its lexeme.
    pub fn rule(&mut self, state: &str, name: &str, pattern: &str) -> &mut Self {
        if name == "error" {
            self.diagnostics.push(Diagnostic::error(
                "BadErrorForm",
                "the 'error' rule must be a function, not a bare pattern",
            ));
            return self;
        }
        let order = self.next_order;
        self.next_order += 1;
        let Some(st) = self.state_mut(state) else {
            self.diagnostics.push(unknown_state(state));
            return self;
        };
        st.rules.push(PendingRule {
            name: name.to_string(),
            pattern: pattern.to_string(),
            body: RuleBody::String,
            declared_order: order,
        });
        self
    }

    /// A rule backed by a user action, which may retag, discard or
    /// replace the match and switch lexer state.
    pub fn rule_fn<F>(&mut self, state: &str, name: &str, pattern: &str, action: F) -> &mut Self
    where
        F: Fn(&mut LexerInstance<'_, C>, Token) -> YalpResult<Option<Token>, C> + Send + Sync + 'static,
    {
        if name == "ignore" {
            self.diagnostics.push(Diagnostic::error(
                "BadIgnoreForm",
                "the 'ignore' rule must be a bare character set, not a function",
            ));
            return self;
        }
        let order = self.next_order;
        self.next_order += 1;
        let Some(st) = self.state_mut(state) else {
            self.diagnostics.push(unknown_state(state));
            return self;
        };
        st.rules.push(PendingRule {
            name: name.to_string(),
            pattern: pattern.to_string(),
            body: RuleBody::Function(Box::new(action)),
            declared_order: order,
        });
        self
    }

    /// The set of characters to skip without producing a token, as a
    /// raw (unanchored, non-regex) character string.
    pub fn ignore(&mut self, state: &str, chars: &str) -> &mut Self {
        if chars.contains('\\') {
            self.diagnostics.push(Diagnostic::warning(
                "IgnoreContainsBackslash",
                format!("ignore set for state '{state}' contains a literal backslash"),
            ));
        }
        let Some(st) = self.state_mut(state) else {
            self.diagnostics.push(unknown_state(state));
            return self;
        };
        st.ignore = Some(chars.to_string());
        self
    }

    pub fn error_rule<F>(&mut self, state: &str, action: F) -> &mut Self
    where
        F: Fn(&mut LexerInstance<'_, C>, Token) -> YalpResult<Option<Token>, C> + Send + Sync + 'static,
    {
        let Some(st) = self.state_mut(state) else {
            self.diagnostics.push(unknown_state(state));
            return self;
        };
        st.error = Some(Box::new(action));
        self
    }

    /// Validates every rule, compiles its regex and produces the
    /// immutable [`Lexer`], or a batch of every diagnostic found.
    pub fn build(mut self, symbols: &SymbolTable, literals: &[char]) -> Result<Lexer<C>, DiagnosticBatch> {
        let mut states = Vec::with_capacity(self.states.len());

        for st in self.states.drain(..) {
            let mut compiled = Vec::with_capacity(st.rules.len());
            for pending in st.rules {
                let Some(sym) = symbols.get_by_name(&pending.name) else {
                    self.diagnostics.push(Diagnostic::error(
                        "UnknownTokenKind",
                        format!("lexer rule targets undeclared token '{}'", pending.name),
                    ));
                    continue;
                };
                match compile_rule(sym, &pending.pattern, pending.declared_order, pending.body) {
                    Ok(rule) => compiled.push(rule),
                    Err(diag) => self.diagnostics.push(diag),
                }
            }
            compiled = order_rules(compiled);

            let ignore_str = st.ignore.unwrap_or_default();
            let ignore: HashSet<char> = ignore_str.chars().collect();

            if st.kind == LexStateKind::Exclusive && st.error.is_none() {
                self.diagnostics.push(Diagnostic::warning(
                    "NoErrorRuleForExclusiveState",
                    format!("exclusive lexer state '{}' has no 'error' rule", st.name),
                ));
            }

            states.push(LexState {
                name: st.name,
                kind: st.kind,
                rules: compiled,
                ignore,
                error: st.error,
            });
        }

        let mut literal_map = HashMap::new();
        for ch in literals {
            match symbols.get_by_name(&ch.to_string()) {
                Some(sym) => {
                    literal_map.insert(*ch, sym);
                }
                None => self.diagnostics.push(Diagnostic::error(
                    "UnknownTokenKind",
                    format!("literal '{ch}' was never declared on the grammar"),
                )),
            }
        }

        if self.diagnostics.iter().any(Diagnostic::is_error) {
            return Err(DiagnosticBatch(self.diagnostics));
        }
        for d in &self.diagnostics {
            d.emit();
        }

        let state_index = states
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.clone(), i))
            .collect();

        Ok(Lexer {
            states,
            state_index,
            literals: literal_map,
            end_symbol: symbols.end(),
            error_symbol: symbols.error(),
            diagnostics: self.diagnostics,
        })
    }
}

fn unknown_state(name: &str) -> Diagnostic {
    Diagnostic::error("UnknownState", format!("lexer state '{name}' was never declared"))
}

struct LexState<C> {
    name: String,
    kind: LexStateKind,
    rules: Vec<LexRule<C>>,
    ignore: HashSet<char>,
    error: Option<LexAction<C>>,
}

/// The compiled, immutable lexer. `Send + Sync`: many independent
/// [`LexerInstance`]s may scan from the same `Lexer` concurrently.
pub struct Lexer<C> {
    states: Vec<LexState<C>>,
    state_index: HashMap<String, usize>,
    literals: HashMap<char, Symbol>,
    end_symbol: Symbol,
    error_symbol: Symbol,
    pub diagnostics: Vec<Diagnostic>,
}

impl<C> Lexer<C> {
    /// Starts scanning `input` from the `INITIAL` state.
    pub fn instance<'a>(&'a self, input: &'a str) -> LexerInstance<'a, C> {
        LexerInstance {
            lexer: self,
            input,
            pos: 0,
            span: Span::start(),
            state_stack: vec![*self.state_index.get(INITIAL).unwrap()],
            ended: false,
        }
    }

    fn state_id(&self, name: &str) -> Option<usize> {
        self.state_index.get(name).copied()
    }
}

/// The mutable scan cursor for one input. `!Sync` by construction (no
/// interior mutability needed): a single parse owns one instance.
pub struct LexerInstance<'a, C> {
    lexer: &'a Lexer<C>,
    input: &'a str,
    pos: usize,
    span: Span,
    state_stack: Vec<usize>,
    ended: bool,
}

impl<'a, C> LexerInstance<'a, C> {
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn newline(&mut self) {
        self.span += NextLine;
    }

    /// Advances the cursor by `n` characters without matching a rule,
    /// for use inside an `error` action.
    pub fn skip(&mut self, n: usize) {
        let rest = &self.input[self.pos..];
        let mut consumed_bytes = rest.len();
        for (count, (byte_idx, _)) in rest.char_indices().enumerate() {
            if count == n {
                consumed_bytes = byte_idx;
                break;
            }
        }
        self.pos += consumed_bytes;
        for _ in 0..n {
            self.span += NextColumn;
        }
    }

    pub fn begin(&mut self, state: &str) {
        if let Some(id) = self.lexer.state_id(state) {
            *self.state_stack.last_mut().unwrap() = id;
        }
    }

    pub fn push_state(&mut self, state: &str) {
        if let Some(id) = self.lexer.state_id(state) {
            self.state_stack.push(id);
        }
    }

    pub fn pop_state(&mut self) {
        if self.state_stack.len() > 1 {
            self.state_stack.pop();
        }
    }

    fn current_state(&self) -> &'a LexState<C> {
        &self.lexer.states[*self.state_stack.last().unwrap()]
    }

    fn advance_ignore(&mut self, ch: char) {
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.span += NextLine;
        } else {
            self.span += NextColumn;
        }
    }

    fn advance_match(&mut self, lexeme: &str) {
        self.pos += lexeme.len();
        for _ in lexeme.chars() {
            self.span += NextColumn;
        }
    }

    /// Scans and returns the next token, or `None` once `$end` has
    /// already been yielded (section 4.3).
    pub fn next_token(&mut self) -> YalpResult<Option<Token>, C> {
        loop {
            if self.ended {
                return Ok(None);
            }

            if self.pos >= self.input.len() {
                self.ended = true;
                return Ok(Some(Token::new(self.lexer.end_symbol, self.span, "")));
            }

            let state = self.current_state();
            let rest = &self.input[self.pos..];
            let ch = rest.chars().next().expect("pos < len implies a char");

            if state.ignore.contains(&ch) {
                self.advance_ignore(ch);
                continue;
            }

            if let Some((idx, len)) = try_match(&self.current_state().rules, rest) {
                let lexeme = rest[..len].to_string();
                let span = self.span;
                self.advance_match(&lexeme);

                let name = self.current_state().rules[idx].name;
                match &self.current_state().rules[idx].body {
                    RuleBody::String => {
                        return Ok(Some(Token::new(name, span, lexeme)));
                    }
                    RuleBody::Function(action) => {
                        let tok = Token::new(name, span, lexeme);
                        let produced = action(self, tok)?;
                        match produced {
                            Some(t) => return Ok(Some(t)),
                            None => continue,
                        }
                    }
                }
            }

            if let Some(sym) = self.lexer.literals.get(&ch).copied() {
                let tok = Token::new(sym, self.span, ch.to_string());
                self.advance_ignore(ch);
                return Ok(Some(tok));
            }

            if let Some(action) = &self.current_state().error {
                let before = self.pos;
                let tok = Token::new(self.lexer.error_symbol, self.span, rest.to_string());
                let produced = action(self, tok)?;
                if self.pos == before {
                    return Err(YalpError::new(ErrorKind::LexError(self.span), Some(self.span)));
                }
                match produced {
                    Some(t) => return Ok(Some(t)),
                    None => continue,
                }
            }

            return Err(YalpError::new(ErrorKind::LexError(self.span), Some(self.span)));
        }
    }
}

impl<'a, C> Iterator for LexerInstance<'a, C> {
    type Item = YalpResult<Token, C>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}
