//! `grammar!`/`lexer!` desugar to the same builder calls exercised
//! directly in `tests/grammar.rs`; this just checks the macro surface
//! itself expands and builds.

use yalp::{build_lexer, build_parser, grammar, lexer, Ast, NoCustomError, Token};

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

#[test]
fn grammar_macro_desugars_to_a_working_builder() {
    let builder: yalp::GrammarBuilder<Val, NoCustomError> = grammar! {
        tokens: [n],
        literals: ['+'],
        precedence: [left('+')],
        rules: {
            E -> E '+' E => |_, mut args| {
                let b = args.pop().unwrap();
                let a = args.pop().unwrap();
                match (a, b) {
                    (Val::Num(a), Val::Num(b)) => Ok(Val::Num(a + b)),
                    _ => Ok(Val::Unit),
                }
            };
            E -> n => |_, mut args| Ok(args.pop().unwrap());
        }
    };

    let (grammar, reducers) = builder.build().expect("macro-built grammar is valid");
    let sym = |name: &str| grammar.symbols().get_by_name(name).expect("symbol was declared");
    let tokens = vec![
        Token::new(sym("n"), yalp::Span::start(), "1"),
        Token::new(sym("+"), yalp::Span::start(), "+"),
        Token::new(sym("n"), yalp::Span::start(), "2"),
    ];

    let runtime = build_parser(grammar, reducers).expect("table construction succeeds");
    let result = runtime.driver().parse(tokens.into_iter().map(Ok), |_| None);
    assert_eq!(result.unwrap(), Val::Num(3));
}

#[test]
fn lexer_macro_desugars_to_a_working_builder() {
    let mut grammar_builder: yalp::GrammarBuilder<Val, NoCustomError> = yalp::GrammarBuilder::new();
    grammar_builder.token("n");
    grammar_builder.production("E", &["n"], yalp::action_fn(|_, mut args| Ok(args.pop().unwrap())));
    let (grammar, _) = grammar_builder.build().expect("grammar is valid");

    let builder: yalp::LexerBuilder<NoCustomError> = lexer! {
        rule INITIAL n "[0-9]+";
        ignore INITIAL " ";
    };

    let built = build_lexer(builder, &grammar).expect("macro-built lexer rules are well-formed");
    let mut instance = built.instance("1 2");
    let first = instance.next_token().unwrap().unwrap();
    assert_eq!(first.lexeme, "1");
}
