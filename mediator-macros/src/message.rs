use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Item, LitStr, Result as SynResult, Token, parse::Parse, parse::ParseStream};
use syn::{parse_macro_input, parse_quote};

/// #[message] 宏实现
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as MessageAttrConfig);
    let input = parse_macro_input!(item as Item);

    let (ident, generics) = match &input {
        Item::Struct(s) => (&s.ident, &s.generics),
        Item::Enum(e) => (&e.ident, &e.generics),
        other => {
            return syn::Error::new(other.span(), "#[message] only on struct or enum")
                .to_compile_error()
                .into();
        }
    };

    let name = cfg
        .name
        .unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));

    if name.value().trim().is_empty() {
        return syn::Error::new(name.span(), "message name must not be empty")
            .to_compile_error()
            .into();
    }

    // 泛型消息需满足 Message 的 Send + Sync + 'static 约束
    let mut generics = generics.clone();
    for param in generics.type_params_mut() {
        param
            .bounds
            .push(parse_quote!(::core::marker::Send));
        param
            .bounds
            .push(parse_quote!(::core::marker::Sync));
        param.bounds.push(parse_quote!('static));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let out = quote! {
        #input

        impl #impl_generics ::mediator::message::Message for #ident #ty_generics #where_clause {
            const NAME: &'static str = #name;
        }
    };

    TokenStream::from(out)
}

// 解析 message 宏键值参数：name = "<str>"
struct MessageAttrConfig {
    name: Option<LitStr>,
}

impl Parse for MessageAttrConfig {
    fn parse(input: ParseStream) -> SynResult<Self> {
        let mut name: Option<LitStr> = None;

        if input.is_empty() {
            return Ok(Self { name });
        }

        let pairs: Punctuated<syn::MetaNameValue, Token![,]> =
            Punctuated::<syn::MetaNameValue, Token![,]>::parse_terminated(input)?;

        for kv in pairs.into_iter() {
            if !kv.path.is_ident("name") {
                return Err(syn::Error::new(
                    kv.path.span(),
                    "unknown key in attribute; expected 'name'",
                ));
            }
            if name.is_some() {
                return Err(syn::Error::new(
                    kv.path.span(),
                    "duplicate key 'name' in attribute",
                ));
            }
            let lit = match kv.value {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(lit),
                    ..
                }) => lit,
                other => {
                    return Err(syn::Error::new(
                        other.span(),
                        "expected string literal for 'name'",
                    ));
                }
            };
            name = Some(lit);
        }

        Ok(Self { name })
    }
}
