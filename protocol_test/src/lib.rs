use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous vote-protocol test into a synchronous one, set up
/// test logging, and inject fresh test doubles.
///
/// Injectable dependencies are `MockWallet` and `MockBackend`, each at most
/// once. Passing `connected` (i.e. `#[protocol_test(connected)]`) authorizes
/// the example account on the injected wallet before the test body runs.
#[proc_macro_attribute]
pub fn protocol_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Reject invalid signatures and find out what needs injecting.
    let injected = match check_sig(&item_fn.sig) {
        Ok(injected) => injected,
        Err(err) => return err.into_compile_error().into(),
    };

    // Rename the future so the test can keep its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Connect the wallet up front if asked.
    let maybe_connect = match parse_macro_input!(args as Option<Ident>) {
        Some(arg) if arg == "connected" => match injected.wallet() {
            Some(wallet) => quote! { #wallet.connect_example(); },
            None => {
                return syn::Error::new(
                    arg.span(),
                    "`connected` requires the test to accept a `MockWallet`",
                )
                .into_compile_error()
                .into();
            }
        },
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected `connected` or nothing")
                .into_compile_error()
                .into();
        }
        None => quote! {},
    };

    let idents = injected.idents();
    let types = injected.types();

    quote! {
        #[test]
        fn #name() {
            log4rs_test_utils::test_logging::init_logging_once_for(
                ["univote_client", "univote_protocol"],
                None,
                None,
            );

            /// The test itself.
            #item_fn

            #(
                let #idents = <#types as ::core::default::Default>::default();
            )*
            #maybe_connect

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(#new_name(#(#idents),*));
        }
    }
    .into()
}

/// The parameters a test asked for, in declaration order.
struct Injected(Vec<(Ident, Type, Double)>);

#[derive(PartialEq, Eq)]
enum Double {
    Wallet,
    Backend,
}

impl Injected {
    fn wallet(&self) -> Option<&Ident> {
        self.0
            .iter()
            .find(|(_, _, double)| *double == Double::Wallet)
            .map(|(ident, _, _)| ident)
    }

    fn idents(&self) -> Vec<&Ident> {
        self.0.iter().map(|(ident, _, _)| ident).collect()
    }

    fn types(&self) -> Vec<&Type> {
        self.0.iter().map(|(_, ty, _)| ty).collect()
    }
}

/// Ensure the wrapped test is async and only asks for known test doubles.
fn check_sig(sig: &Signature) -> Result<Injected, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut injected = Vec::new();
    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let (Pat::Ident(pat_ident), Type::Path(type_path)) =
                (&*pat_type.pat, &*pat_type.ty)
            {
                // Valid as the last path segment for any type is itself.
                let double = match type_path.path.segments.last() {
                    Some(segment) if segment.ident == "MockWallet" => Some(Double::Wallet),
                    Some(segment) if segment.ident == "MockBackend" => Some(Double::Backend),
                    _ => None,
                };
                if let Some(double) = double {
                    if injected.iter().any(|(_, _, seen)| *seen == double) {
                        return Err(syn::Error::new(
                            input.span(),
                            "Test cannot accept the same test double twice",
                        ));
                    }
                    injected.push((pat_ident.ident.clone(), (*pat_type.ty).clone(), double));
                    continue;
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `wallet_ident: MockWallet` or `backend_ident: MockBackend`",
        ));
    }

    Ok(Injected(injected))
}
