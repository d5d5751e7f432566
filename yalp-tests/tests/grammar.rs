//! End-to-end calculator grammars: semantic values, precedence-resolved
//! ambiguity and unused-token detection.

use yalp::{action_fn, build_parser, Ast, Grammar, GrammarBuilder, NoCustomError, Span, Token};

#[derive(Debug, Clone, PartialEq)]
enum Val {
    Num(i64),
    Unit,
}

impl From<Token> for Val {
    fn from(tok: Token) -> Self {
        tok.lexeme.parse::<i64>().map(Val::Num).unwrap_or(Val::Unit)
    }
}

impl Ast for Val {}

fn tok(grammar: &Grammar, name: &str, lexeme: impl Into<String>) -> Token {
    let symbol = grammar.symbols().get_by_name(name).expect("symbol was declared");
    Token::new(symbol, Span::start(), lexeme)
}

/// S1: `S -> E`; `E -> E '+' T | T`; `T -> T '*' F | F`; `F -> NUM | '(' E ')'`.
#[test]
fn calculator_evaluates_with_operator_precedence_baked_into_the_grammar_shape() {
    let mut builder: GrammarBuilder<Val, NoCustomError> = GrammarBuilder::new();
    builder.token("NUM");
    builder.literal('+');
    builder.literal('*');
    builder.literal('(');
    builder.literal(')');

    builder.production("F", &["NUM"], action_fn(|_, mut args| Ok(args.pop().unwrap())));
    builder.production(
        "F",
        &["(", "E", ")"],
        action_fn(|_, mut args| {
            args.pop().unwrap();
            let e = args.pop().unwrap();
            args.pop().unwrap();
            Ok(e)
        }),
    );
    builder.production("T", &["F"], action_fn(|_, mut args| Ok(args.pop().unwrap())));
    builder.production(
        "T",
        &["T", "*", "F"],
        action_fn(|_, mut args| {
            let b = as_num(args.pop().unwrap());
            args.pop().unwrap();
            let a = as_num(args.pop().unwrap());
            Ok(Val::Num(a * b))
        }),
    );
    builder.production("E", &["T"], action_fn(|_, mut args| Ok(args.pop().unwrap())));
    builder.production(
        "E",
        &["E", "+", "T"],
        action_fn(|_, mut args| {
            let b = as_num(args.pop().unwrap());
            args.pop().unwrap();
            let a = as_num(args.pop().unwrap());
            Ok(Val::Num(a + b))
        }),
    );

    let (grammar, reducers) = builder.build().expect("grammar is valid");

    let tokens = vec![
        tok(&grammar, "NUM", "3"),
        tok(&grammar, "+", "+"),
        tok(&grammar, "NUM", "4"),
        tok(&grammar, "*", "*"),
        tok(&grammar, "NUM", "5"),
    ];

    let runtime = build_parser(grammar, reducers).expect("table construction succeeds");
    let result = runtime
        .driver()
        .parse(tokens.into_iter().map(Ok), |_| None)
        .expect("well-formed input parses");

    assert_eq!(result, Val::Num(23));
}

/// S2: declared `left '+'`, `left '*'` resolves the ambiguity without
/// any residual conflicts, and binds `*` tighter than `+`.
#[test]
fn declared_precedence_resolves_the_ambiguous_expression_grammar() {
    let mut builder: GrammarBuilder<Val, NoCustomError> = GrammarBuilder::new();
    builder.token("NUM");
    builder.literal('+');
    builder.literal('*');
    builder.precedence(yalp::Assoc::Left, &["+"]);
    builder.precedence(yalp::Assoc::Left, &["*"]);

    builder.production("E", &["NUM"], action_fn(|_, mut args| Ok(args.pop().unwrap())));
    builder.production(
        "E",
        &["E", "+", "E"],
        action_fn(|_, mut args| {
            let b = as_num(args.pop().unwrap());
            args.pop().unwrap();
            let a = as_num(args.pop().unwrap());
            Ok(Val::Num(a + b))
        }),
    );
    builder.production(
        "E",
        &["E", "*", "E"],
        action_fn(|_, mut args| {
            let b = as_num(args.pop().unwrap());
            args.pop().unwrap();
            let a = as_num(args.pop().unwrap());
            Ok(Val::Num(a * b))
        }),
    );

    let (grammar, reducers) = builder.build().expect("grammar is valid");

    let tokens = vec![
        tok(&grammar, "NUM", "1"),
        tok(&grammar, "+", "+"),
        tok(&grammar, "NUM", "2"),
        tok(&grammar, "*", "*"),
        tok(&grammar, "NUM", "3"),
    ];

    let runtime = build_parser(grammar, reducers).expect("table construction succeeds");
    assert_eq!(
        runtime.table().conflict_count(),
        0,
        "declared precedence should resolve every shift/reduce conflict"
    );

    let result = runtime
        .driver()
        .parse(tokens.into_iter().map(Ok), |_| None)
        .expect("well-formed input parses");

    assert_eq!(result, Val::Num(7));
}

/// S6: a declared-but-unused terminal surfaces as a grammar warning.
#[test]
fn unused_token_is_reported_as_a_warning_not_an_error() {
    let mut builder: GrammarBuilder<Val, NoCustomError> = GrammarBuilder::new();
    builder.token("A");
    builder.token("B");
    builder.token("C");
    builder.production("S", &["A", "B"], action_fn(|_, mut args| Ok(args.pop().unwrap())));

    let (grammar, _) = builder.build().expect("unused tokens are warnings, not build failures");

    let unused: Vec<_> = grammar.diagnostics.iter().filter(|d| d.code == "UnusedTerminal").collect();
    assert_eq!(unused.len(), 1, "exactly C should be flagged unused");
}

fn as_num(v: Val) -> i64 {
    match v {
        Val::Num(n) => n,
        Val::Unit => panic!("expected a numeric value"),
    }
}
