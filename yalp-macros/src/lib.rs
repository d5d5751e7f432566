//! `grammar!`/`lexer!` declarative macros: a compile-time DSL that
//! desugars to `yalp_core::grammar::GrammarBuilder`/
//! `yalp_core::lexer::LexerBuilder` calls, expanding to an expression
//! of the respective builder type (left un-`.build()`-ed, so the call
//! site picks its own `Ast`/`Error`/context type parameters).

extern crate proc_macro;

use proc_macro::TokenStream;
use syn::parse_macro_input;

mod grammar;
mod lexer;

use grammar::GrammarSpec;
use lexer::LexerSpec;

/// Declares a grammar.
///
/// # Example
/// ```ignore
/// let builder = grammar! {
///     tokens: [n],
///     literals: ['+', '*'],
///     precedence: [left('+'), left('*')],
///     rules: {
///         E -> E '+' E => |_, mut args| { let b = args.pop().unwrap(); let a = args.pop().unwrap(); Ok(a + b) };
///         E -> n => |_, mut args| Ok(args.pop().unwrap());
///     }
/// };
/// ```
#[proc_macro]
pub fn grammar(stream: TokenStream) -> TokenStream {
    let spec = parse_macro_input!(stream as GrammarSpec);
    grammar::expand(&spec).into()
}

/// Declares a lexer.
///
/// # Example
/// ```ignore
/// let builder = lexer! {
///     rule INITIAL n "[0-9]+";
///     ignore INITIAL " \t";
/// };
/// ```
#[proc_macro]
pub fn lexer(stream: TokenStream) -> TokenStream {
    let spec = parse_macro_input!(stream as LexerSpec);
    lexer::expand(&spec).into()
}
