//! Productions, precedence and the user-supplied reduction actions.

use crate::error::YalpResult;
use crate::symbol::{Symbol, SymbolTable};

pub type RuleId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Assoc {
    Left,
    Right,
    NonAssoc,
}

/// `(level, assoc)` for one terminal. Level 0 means "no precedence",
/// matching the invariant in section 3 of the spec; real levels start
/// at 1 (lowest).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precedence {
    pub level: u32,
    pub assoc: Assoc,
}

impl Precedence {
    pub const NONE: Precedence = Precedence {
        level: 0,
        assoc: Assoc::NonAssoc,
    };

    pub fn has_precedence(&self) -> bool {
        self.level > 0
    }
}

impl Default for Precedence {
    fn default() -> Self {
        Self::NONE
    }
}

/// A production as declared by the grammar builder: `lhs -> rhs[]`,
/// with an optional `%prec` override naming a terminal.
#[derive(Debug, Clone)]
pub struct RuleDef {
    pub lhs: Symbol,
    pub rhs: Vec<Symbol>,
    pub prec_override: Option<Symbol>,
}

/// A fully resolved production: its id, symbols, and effective
/// precedence (explicit `%prec`, or inherited from the rightmost
/// terminal in the rhs).
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: RuleId,
    pub lhs: Symbol,
    pub rhs: Vec<Symbol>,
    pub prec: Precedence,
}

impl Rule {
    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }

    pub fn display<'a>(&'a self, table: &'a SymbolTable) -> RuleDisplay<'a> {
        RuleDisplay { rule: self, table }
    }
}

pub struct RuleDisplay<'a> {
    rule: &'a Rule,
    table: &'a SymbolTable,
}

impl std::fmt::Display for RuleDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}) {} ->",
            self.rule.id,
            self.table.name(self.rule.lhs)
        )?;
        for sym in &self.rule.rhs {
            write!(f, " {}", self.table.name(*sym))?;
        }
        Ok(())
    }
}

/// The user semantic action attached to a production.
///
/// Args are collected right-hand-side semantic values in rhs order;
/// the action returns the value to associate with `lhs`.
pub type ReduceAction<Ast, Error> =
    Box<dyn Fn(&Rule, Vec<Ast>) -> YalpResult<Ast, Error> + Send + Sync>;

/// A convenience wrapper so plain `fn` items can be stored alongside
/// closures without the caller boxing them by hand.
pub fn action_fn<Ast, Error, F>(f: F) -> ReduceAction<Ast, Error>
where
    F: Fn(&Rule, Vec<Ast>) -> YalpResult<Ast, Error> + Send + Sync + 'static,
{
    Box::new(f)
}

/// Read-only view over the fully resolved set of productions, used by
/// LR(0) construction and the parser runtime.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, id: RuleId) -> &Rule {
        &self.rules[id]
    }

    pub fn iter_by_lhs<'a>(&'a self, lhs: Symbol) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules.iter().filter(move |r| r.lhs == lhs)
    }
}
