//! Lexer state switching: an exclusive `comment` state entered and
//! left from inside rule actions, with every matched span inside it
//! discarded rather than tokenized.

use yalp::{action_fn, build_lexer, Ast, GrammarBuilder, LexStateKind, LexerBuilder, NoCustomError, Token};

#[derive(Debug, Clone, PartialEq)]
struct Unit;

impl From<Token> for Unit {
    fn from(_: Token) -> Self {
        Unit
    }
}

impl Ast for Unit {}

/// S4: `/\*` enters an exclusive `comment` state; `[^*]+|\*+[^*/]` and
/// `\*+/` both discard their match, the latter also leaving the state.
#[test]
fn comment_rules_consume_input_without_emitting_a_token() {
    let mut grammar_builder: GrammarBuilder<Unit, NoCustomError> = GrammarBuilder::new();
    grammar_builder.token("NUM");
    grammar_builder.token("open");
    grammar_builder.token("body");
    grammar_builder.token("close");
    grammar_builder.production("S", &["NUM"], action_fn(|_, mut args| Ok(args.pop().unwrap())));
    let (grammar, _) = grammar_builder.build().expect("grammar is valid");

    let mut lexer_builder: LexerBuilder<NoCustomError> = LexerBuilder::new();
    lexer_builder.state("comment", LexStateKind::Exclusive);
    lexer_builder.rule("INITIAL", "NUM", "[0-9]+");
    lexer_builder.ignore("INITIAL", " ");
    lexer_builder.rule_fn("INITIAL", "open", r"/\*", |instance, _tok| {
        instance.begin("comment");
        Ok(None)
    });
    lexer_builder.rule_fn("comment", "body", r"[^*]+|\*+[^*/]", |_instance, _tok| Ok(None));
    lexer_builder.rule_fn("comment", "close", r"\*+/", |instance, _tok| {
        instance.begin("INITIAL");
        Ok(None)
    });

    let lexer = build_lexer(lexer_builder, &grammar).expect("lexer rules are well-formed");

    let mut instance = lexer.instance("1 /* x */ 2");
    let mut lexemes = Vec::new();
    while let Some(token) = instance.next_token().expect("input is fully covered by rules") {
        let name = grammar.symbols().name(token.symbol).to_string();
        if name == "$end" {
            lexemes.push(name);
            break;
        }
        lexemes.push(token.lexeme);
    }

    assert_eq!(lexemes, vec!["1".to_string(), "2".to_string(), "$end".to_string()]);
}
