//! Regex Compiler Front: per-rule anchored `regex::Regex` compilation,
//! ordering and the ordered-alternation `try_match` policy (section 4.2).
//!
//! The `regex` crate resolves alternation leftmost-first, not
//! leftmost-longest, so this toolkit never hands it one master
//! alternation. Each rule is compiled on its own; [`order_rules`] sorts
//! them function-rules-first (declaration order), then string rules
//! longest-pattern-first, and [`try_match`] returns the first of those
//! whose regex matches at the current position. A function rule always
//! wins over a string rule at the same position, even one with a
//! longer pattern or a longer actual match.

use regex::Regex;

use crate::error::Diagnostic;
use crate::lexer::action::LexAction;
use crate::symbol::Symbol;

pub enum RuleBody<C> {
    /// A bare pattern: matching it directly yields a token of `name`'s
    /// kind with the matched text as its lexeme.
    String,
    /// A pattern with a user action that may transform, discard or
    /// retag the match (and switch lexer state).
    Function(LexAction<C>),
}

pub struct LexRule<C> {
    pub name: Symbol,
    pub pattern: String,
    pub regex: Regex,
    pub declared_order: usize,
    pub body: RuleBody<C>,
}

impl<C> LexRule<C> {
    fn is_function(&self) -> bool {
        matches!(self.body, RuleBody::Function(_))
    }
}

/// Compiles one rule's pattern and runs the section-4.2 validations
/// that apply per-rule (the state-level ones, like
/// `NoErrorRuleForExclusiveState`, are checked by the caller).
pub fn compile_rule<C>(
    name: Symbol,
    pattern: &str,
    declared_order: usize,
    body: RuleBody<C>,
) -> Result<LexRule<C>, Diagnostic> {
    if pattern.is_empty() {
        return Err(Diagnostic::error("NoPattern", "lexer rule has an empty pattern"));
    }

    if pattern == "#" {
        return Err(Diagnostic::error(
            "EmptyMatch",
            "pattern '#' matches the empty string; did you mean to escape it as '\\#'?",
        ));
    }

    let anchored = format!("^(?:{pattern})");
    let regex = Regex::new(&anchored)
        .map_err(|e| Diagnostic::error("BadRegex", format!("invalid regex '{pattern}': {e}")))?;

    if regex.is_match("") {
        return Err(Diagnostic::error(
            "EmptyMatch",
            format!("pattern '{pattern}' matches the empty string"),
        ));
    }

    Ok(LexRule {
        name,
        pattern: pattern.to_string(),
        regex,
        declared_order,
        body,
    })
}

/// Orders a state's compiled rules per the `LexRule` ordering rule:
/// function rules first (declaration order), then string rules
/// (longest pattern first, ties by declaration order).
pub fn order_rules<C>(mut rules: Vec<LexRule<C>>) -> Vec<LexRule<C>> {
    rules.sort_by(|a, b| {
        match (a.is_function(), b.is_function()) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            (true, true) => a.declared_order.cmp(&b.declared_order),
            (false, false) => b
                .pattern
                .len()
                .cmp(&a.pattern.len())
                .then(a.declared_order.cmp(&b.declared_order)),
        }
    });
    rules
}

/// Runs `rules` against `input` (which must start at the current scan
/// position) in priority order (function rules first, then string
/// rules longest-pattern-first, per [`order_rules`]) and returns the
/// first one that matches. This is ordered-alternation, not
/// longest-match: a function rule earlier in `rules` wins even if a
/// later string rule would consume more input.
pub fn try_match<C>(rules: &[LexRule<C>], input: &str) -> Option<(usize, usize)> {
    for (idx, rule) in rules.iter().enumerate() {
        if let Some(m) = rule.regex.find(input) {
            return Some((idx, m.end()));
        }
    }
    None
}
