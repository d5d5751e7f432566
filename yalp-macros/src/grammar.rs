//! Parsing and codegen for the `grammar!` macro: a declarative surface
//! over `GrammarBuilder`'s `.token`/`.literal`/`.precedence`/
//! `.production` calls (spec section 9, "explicit registration").
//!
//! `yalp-core`'s own parser is deliberately not used to parse this
//! macro's input (no self-hosting): the macro runs at compile time, on
//! a `proc_macro2::TokenStream`, where `syn`'s recursive-descent
//! `Parse` trait is the idiomatic tool for the job.

use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{braced, bracketed, parenthesized, Expr, Ident, LitChar, Token};

/// A grammar symbol referenced on a production's right-hand side or in
/// a precedence group: either a named token/nonterminal, or a literal
/// character interned under its own single-char name.
enum SymbolRef {
    Named(Ident),
    Literal(LitChar),
}

impl Parse for SymbolRef {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(LitChar) {
            Ok(Self::Literal(input.parse()?))
        } else {
            Ok(Self::Named(input.parse()?))
        }
    }
}

impl SymbolRef {
    fn as_name_expr(&self) -> TokenStream {
        match self {
            Self::Named(ident) => {
                let name = ident.to_string();
                quote!(#name)
            }
            Self::Literal(lit) => {
                let name = lit.value().to_string();
                quote!(#name)
            }
        }
    }
}

enum Assoc {
    Left,
    Right,
    NonAssoc,
}

struct PrecGroup {
    assoc: Assoc,
    terms: Vec<SymbolRef>,
}

impl Parse for PrecGroup {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let kw: Ident = input.parse()?;
        let assoc = match kw.to_string().as_str() {
            "left" => Assoc::Left,
            "right" => Assoc::Right,
            "nonassoc" => Assoc::NonAssoc,
            other => {
                return Err(syn::Error::new(
                    kw.span(),
                    format!("expected `left`, `right` or `nonassoc`, found `{other}`"),
                ))
            }
        };
        let content;
        parenthesized!(content in input);
        let terms = Punctuated::<SymbolRef, Token![,]>::parse_terminated(&content)?
            .into_iter()
            .collect();
        Ok(Self { assoc, terms })
    }
}

/// One `lhs -> rhs... [%prec term] => action;` production.
struct Production {
    lhs: Ident,
    rhs: Vec<SymbolRef>,
    prec: Option<SymbolRef>,
    action: Expr,
}

impl Parse for Production {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let lhs: Ident = input.parse()?;
        input.parse::<Token![->]>()?;

        let mut rhs = Vec::new();
        while !input.peek(Token![=>]) && !input.peek(Token![%]) {
            rhs.push(input.parse()?);
        }

        let prec = if input.peek(Token![%]) {
            input.parse::<Token![%]>()?;
            let kw: Ident = input.parse()?;
            if kw != "prec" {
                return Err(syn::Error::new(kw.span(), "expected `%prec`"));
            }
            Some(input.parse::<SymbolRef>()?)
        } else {
            None
        };

        input.parse::<Token![=>]>()?;
        let action: Expr = input.parse()?;
        input.parse::<Token![;]>()?;

        Ok(Self {
            lhs,
            rhs,
            prec,
            action,
        })
    }
}

#[derive(Default)]
pub struct GrammarSpec {
    tokens: Vec<Ident>,
    literals: Vec<LitChar>,
    precedence: Vec<PrecGroup>,
    rules: Vec<Production>,
}

impl Parse for GrammarSpec {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut spec = GrammarSpec::default();

        while !input.is_empty() {
            let field: Ident = input.parse()?;
            input.parse::<Token![:]>()?;

            match field.to_string().as_str() {
                "tokens" => {
                    let content;
                    bracketed!(content in input);
                    spec.tokens = Punctuated::<Ident, Token![,]>::parse_terminated(&content)?
                        .into_iter()
                        .collect();
                }
                "literals" => {
                    let content;
                    bracketed!(content in input);
                    spec.literals = Punctuated::<LitChar, Token![,]>::parse_terminated(&content)?
                        .into_iter()
                        .collect();
                }
                "precedence" => {
                    let content;
                    bracketed!(content in input);
                    spec.precedence = Punctuated::<PrecGroup, Token![,]>::parse_terminated(&content)?
                        .into_iter()
                        .collect();
                }
                "rules" => {
                    let content;
                    braced!(content in input);
                    while !content.is_empty() {
                        spec.rules.push(content.parse()?);
                    }
                }
                other => {
                    return Err(syn::Error::new(
                        field.span(),
                        format!(
                            "unknown grammar! field `{other}`; expected one of tokens, literals, precedence, rules"
                        ),
                    ))
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(spec)
    }
}

impl ToTokens for GrammarSpec {
    fn to_tokens(&self, out: &mut TokenStream) {
        let token_decls = self.tokens.iter().map(|t| {
            let name = t.to_string();
            quote!(__builder.token(#name);)
        });

        let literal_decls = self.literals.iter().map(|l| quote!(__builder.literal(#l);));

        let prec_decls = self.precedence.iter().map(|group| {
            let assoc = match group.assoc {
                Assoc::Left => quote!(::yalp::Assoc::Left),
                Assoc::Right => quote!(::yalp::Assoc::Right),
                Assoc::NonAssoc => quote!(::yalp::Assoc::NonAssoc),
            };
            let terms = group.terms.iter().map(SymbolRef::as_name_expr);
            quote!(__builder.precedence(#assoc, &[#(#terms),*]);)
        });

        let rule_decls = self.rules.iter().map(|rule| {
            let lhs = rule.lhs.to_string();
            let rhs = rule.rhs.iter().map(SymbolRef::as_name_expr);
            let action = &rule.action;
            match &rule.prec {
                Some(term) => {
                    let term = term.as_name_expr();
                    quote! {
                        __builder.production_prec(#lhs, &[#(#rhs),*], ::std::option::Option::Some(#term), #action);
                    }
                }
                None => quote!(__builder.production(#lhs, &[#(#rhs),*], #action);),
            }
        });

        out.extend(quote! {
            {
                let mut __builder = ::yalp::GrammarBuilder::new();
                #(#token_decls)*
                #(#literal_decls)*
                #(#prec_decls)*
                #(#rule_decls)*
                __builder
            }
        });
    }
}

pub fn expand(spec: &GrammarSpec) -> TokenStream {
    quote!(#spec)
}
