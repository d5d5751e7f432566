//! Parsing and codegen for the `lexer!` macro: a declarative surface
//! over [`LexerBuilder`]'s `.state`/`.rule`/`.rule_fn`/`.ignore`/
//! `.error_rule` calls (spec sections 4.2-4.3, 9).

use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::parse::{Parse, ParseStream};
use syn::{Expr, Ident, LitStr, Token};

/// `state NAME inclusive;` or `state NAME exclusive;`
struct StateDecl {
    name: Ident,
    exclusive: bool,
}

impl Parse for StateDecl {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let kw: Ident = input.parse()?;
        if kw != "state" {
            return Err(syn::Error::new(kw.span(), "expected `state`"));
        }
        let name: Ident = input.parse()?;
        let kind: Ident = input.parse()?;
        let exclusive = match kind.to_string().as_str() {
            "inclusive" => false,
            "exclusive" => true,
            other => {
                return Err(syn::Error::new(
                    kind.span(),
                    format!("expected `inclusive` or `exclusive`, found `{other}`"),
                ))
            }
        };
        input.parse::<Token![;]>()?;
        Ok(Self { name, exclusive })
    }
}

enum RuleDecl {
    /// `rule STATE NAME "pattern";`
    Bare {
        state: Ident,
        name: Ident,
        pattern: LitStr,
    },
    /// `rule_fn STATE NAME "pattern" |lexer, token| expr;`
    Fn {
        state: Ident,
        name: Ident,
        pattern: LitStr,
        action: Expr,
    },
    /// `rule_in STATE NAME "pattern";` alias for a bare rule declared
    /// inside a non-INITIAL state block, kept distinct only for
    /// readability at the call site.
    In {
        state: Ident,
        name: Ident,
        pattern: LitStr,
    },
    /// `ignore STATE "chars";`
    Ignore { state: Ident, chars: LitStr },
    /// `error_rule STATE |lexer, token| expr;`
    Error { state: Ident, action: Expr },
}

impl Parse for RuleDecl {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let kw: Ident = input.parse()?;
        let decl = match kw.to_string().as_str() {
            "rule" => {
                let state: Ident = input.parse()?;
                let name: Ident = input.parse()?;
                let pattern: LitStr = input.parse()?;
                RuleDecl::Bare { state, name, pattern }
            }
            "rule_in" => {
                let state: Ident = input.parse()?;
                let name: Ident = input.parse()?;
                let pattern: LitStr = input.parse()?;
                RuleDecl::In { state, name, pattern }
            }
            "rule_fn" => {
                let state: Ident = input.parse()?;
                let name: Ident = input.parse()?;
                let pattern: LitStr = input.parse()?;
                input.parse::<Token![,]>().ok();
                let action: Expr = input.parse()?;
                RuleDecl::Fn {
                    state,
                    name,
                    pattern,
                    action,
                }
            }
            "ignore" => {
                let state: Ident = input.parse()?;
                let chars: LitStr = input.parse()?;
                RuleDecl::Ignore { state, chars }
            }
            "error_rule" => {
                let state: Ident = input.parse()?;
                input.parse::<Token![,]>().ok();
                let action: Expr = input.parse()?;
                RuleDecl::Error { state, action }
            }
            other => {
                return Err(syn::Error::new(
                    kw.span(),
                    format!(
                        "unknown lexer! declaration `{other}`; expected one of state, rule, rule_fn, rule_in, ignore, error_rule"
                    ),
                ))
            }
        };
        input.parse::<Token![;]>()?;
        Ok(decl)
    }
}

#[derive(Default)]
pub struct LexerSpec {
    states: Vec<StateDecl>,
    rules: Vec<RuleDecl>,
}

impl Parse for LexerSpec {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut spec = LexerSpec::default();
        while !input.is_empty() {
            let fork = input.fork();
            let peek_kw: Ident = fork.parse()?;
            if peek_kw == "state" {
                spec.states.push(input.parse()?);
            } else {
                spec.rules.push(input.parse()?);
            }
        }
        Ok(spec)
    }
}

impl ToTokens for LexerSpec {
    fn to_tokens(&self, out: &mut TokenStream) {
        let state_decls = self.states.iter().map(|s| {
            let name = s.name.to_string();
            let kind = if s.exclusive {
                quote!(::yalp::LexStateKind::Exclusive)
            } else {
                quote!(::yalp::LexStateKind::Inclusive)
            };
            quote!(__builder.state(#name, #kind);)
        });

        let rule_decls = self.rules.iter().map(|r| match r {
            RuleDecl::Bare { state, name, pattern } | RuleDecl::In { state, name, pattern } => {
                let state = state.to_string();
                let name = name.to_string();
                quote!(__builder.rule(#state, #name, #pattern);)
            }
            RuleDecl::Fn {
                state,
                name,
                pattern,
                action,
            } => {
                let state = state.to_string();
                let name = name.to_string();
                quote!(__builder.rule_fn(#state, #name, #pattern, #action);)
            }
            RuleDecl::Ignore { state, chars } => {
                let state = state.to_string();
                quote!(__builder.ignore(#state, #chars);)
            }
            RuleDecl::Error { state, action } => {
                let state = state.to_string();
                quote!(__builder.error_rule(#state, #action);)
            }
        });

        out.extend(quote! {
            {
                let mut __builder = ::yalp::LexerBuilder::new();
                #(#state_decls)*
                #(#rule_decls)*
                __builder
            }
        });
    }
}

pub fn expand(spec: &LexerSpec) -> TokenStream {
    quote!(#spec)
}
