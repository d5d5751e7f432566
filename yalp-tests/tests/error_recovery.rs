//! Panic-mode recovery: a run of tokens unparsable at the statement
//! position is discarded as a block, recovered via the grammar's own
//! `error ';'` production, and parsing resumes normally afterward.

use yalp::{action_fn, build_parser, Ast, GrammarBuilder, NoCustomError, Span, Token};

#[derive(Debug, Clone, PartialEq)]
struct Unit;

impl From<Token> for Unit {
    fn from(_: Token) -> Self {
        Unit
    }
}

impl Ast for Unit {}

/// S3: `S -> stmt ';' S | stmt ';' | error ';'`; `stmt -> ID`.
#[test]
fn recovery_discards_a_bad_run_once_then_resumes_normal_parsing() {
    let mut builder: GrammarBuilder<Unit, NoCustomError> = GrammarBuilder::new();
    builder.token("ID");
    builder.token("SEMI");
    builder.token("BAD");
    builder.production("stmt", &["ID"], action_fn(|_, mut args| Ok(args.pop().unwrap())));
    builder.production(
        "S",
        &["stmt", "SEMI", "S"],
        action_fn(|_, mut args| Ok(args.pop().unwrap())),
    );
    builder.production("S", &["stmt", "SEMI"], action_fn(|_, mut args| {
        args.pop().unwrap();
        Ok(args.pop().unwrap())
    }));
    builder.production("S", &["error", "SEMI"], action_fn(|_, mut args| {
        args.pop().unwrap();
        Ok(args.pop().unwrap())
    }));

    let (grammar, reducers) = builder.build().expect("grammar is valid");

    let sym = |name: &str| grammar.symbols().get_by_name(name).expect("symbol was declared");
    let tokens = vec![
        Token::new(sym("BAD"), Span::start(), "a"),
        Token::new(sym("BAD"), Span::start(), "b"),
        Token::new(sym("BAD"), Span::start(), "c"),
        Token::new(sym("SEMI"), Span::start(), ";"),
        Token::new(sym("ID"), Span::start(), "d"),
        Token::new(sym("SEMI"), Span::start(), ";"),
    ];

    let runtime = build_parser(grammar, reducers).expect("table construction succeeds");

    let mut error_count = 0;
    let result = runtime
        .driver()
        .parse(tokens.into_iter().map(Ok), |_offending| {
            error_count += 1;
            None
        });

    assert_eq!(error_count, 1, "the whole bad run is one recovery, not one per token");
    assert!(result.is_ok(), "parsing should accept after recovering: {result:?}");
}
