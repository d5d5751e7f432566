//! Dangling-else: with no precedence declared, the table builder's
//! default shift-wins resolution surfaces as exactly one shift/reduce
//! conflict.

use yalp::{action_fn, build_parser, Ast, ConflictKind, GrammarBuilder, NoCustomError, Token};

#[derive(Debug, Clone, PartialEq)]
struct Unit;

impl From<Token> for Unit {
    fn from(_: Token) -> Self {
        Unit
    }
}

impl Ast for Unit {}

/// S5: `S -> if E S | if E S else S | other`.
#[test]
fn dangling_else_produces_exactly_one_shift_reduce_conflict() {
    let mut builder: GrammarBuilder<Unit, NoCustomError> = GrammarBuilder::new();
    builder.token("if");
    builder.token("else");
    builder.token("c");
    builder.token("other");
    // `S`'s first production must be declared first: `GrammarBuilder`
    // takes the lhs of the first production added as the start symbol.
    builder.production("S", &["if", "E", "S"], action_fn(|_, mut args| Ok(args.pop().unwrap())));
    builder.production(
        "S",
        &["if", "E", "S", "else", "S"],
        action_fn(|_, mut args| Ok(args.pop().unwrap())),
    );
    builder.production("S", &["other"], action_fn(|_, mut args| Ok(args.pop().unwrap())));
    builder.production("E", &["c"], action_fn(|_, mut args| Ok(args.pop().unwrap())));

    let (grammar, reducers) = builder.build().expect("grammar is valid");
    let runtime = build_parser(grammar, reducers).expect("table construction succeeds");

    assert_eq!(runtime.table().conflict_count(), 1);
    assert_eq!(runtime.table().conflicts[0].kind, ConflictKind::ShiftReduce);
}
