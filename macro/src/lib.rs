use proc_macro::TokenStream;
use quote::{quote, quote_spanned};
use syn::{parse_macro_input, spanned::Spanned, ItemFn};

/// Checks the shape shared by `#[main]` and `#[test]`: an `async fn` without
/// arguments.
fn check_signature(input: &ItemFn, attr: &str) -> Option<TokenStream> {
    if input.sig.asyncness.is_none() {
        let message = format!("fn must be `async fn` to use #[futures_flow::{attr}]");
        return Some(
            quote_spanned! { input.sig.fn_token.span()=>
                compile_error!(#message);
            }
            .into(),
        );
    }

    if !input.sig.inputs.is_empty() {
        let message = format!("arguments are not supported by #[futures_flow::{attr}]");
        return Some(
            quote_spanned! { input.sig.inputs.span()=>
                compile_error!(#message);
            }
            .into(),
        );
    }

    None
}

/// Runs an `async fn main` on the `futures_flow` event loop.
#[proc_macro_attribute]
pub fn attr_macro_main(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    if let Some(error) = check_signature(&input, "main") {
        return error;
    }

    if input.sig.ident != "main" {
        return quote_spanned! { input.sig.ident.span()=>
            compile_error!("only `async fn main` can be used for #[futures_flow::main]");
        }
        .into();
    }

    let attrs = input.attrs;
    let output = input.sig.output;
    let block = input.block;
    quote! {
        pub fn main() #output {
            #(#attrs)*
            async fn __run() #output {
                #block
            }

            ::futures_flow::runtime::block_on(__run())
        }
    }
    .into()
}

/// Turns an `async fn` into a `#[test]` driven by the `futures_flow` event
/// loop.
#[proc_macro_attribute]
pub fn attr_macro_test(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    if let Some(error) = check_signature(&input, "test") {
        return error;
    }

    let name = input.sig.ident;
    let attrs = input.attrs;
    let output = input.sig.output;
    let block = input.block;
    quote! {
        #[test]
        #(#attrs)*
        fn #name() #output {
            async fn __run() #output {
                #block
            }

            ::futures_flow::runtime::block_on(__run())
        }
    }
    .into()
}
