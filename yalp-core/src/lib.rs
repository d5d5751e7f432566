pub mod cache;
pub mod error;
pub mod grammar;
pub mod item;
pub mod lexer;
pub mod lr;
pub mod rule;
pub mod span;
pub mod symbol;
pub mod token;
pub mod validate;

pub use error::{Diagnostic, DiagnosticBatch, ErrorKind, NoCustomError, Severity, YalpError, YalpResult};
pub use grammar::{Grammar, GrammarBuilder, GrammarError, GrammarResult};
pub use lexer::{Lexer, LexerBuilder, LexerInstance, LexStateKind, INITIAL};
pub use lr::{Action, Conflict, ConflictKind, LrParser, LrTable};
pub use rule::{action_fn, Assoc, Precedence, ReduceAction, Rule, RuleId};
pub use span::Span;
pub use symbol::{Symbol, SymbolKind, SymbolTable};
pub use token::{Ast, Token};

#[cfg(test)]
pub mod fixtures {
    use crate::grammar::{Grammar, GrammarBuilder};
    use crate::rule::action_fn;

    /// `E -> E + T | T`, `T -> n`: the running example used across the
    /// LR(0)/LALR(1) construction tests.
    pub fn arithmetic_grammar() -> Grammar {
        let mut b: GrammarBuilder<i64, crate::error::NoCustomError> = GrammarBuilder::new();
        b.token("n");
        b.literal('+');
        b.production("E", &["E", "+", "T"], action_fn(|_, mut args| {
            let t = args.pop().unwrap();
            let e = args.pop().unwrap();
            Ok(e + t)
        }));
        b.production("E", &["T"], action_fn(|_, mut args| Ok(args.pop().unwrap())));
        b.production("T", &["n"], action_fn(|_, mut args| Ok(args.pop().unwrap())));
        b.build().expect("fixture grammar is valid").0
    }
}
