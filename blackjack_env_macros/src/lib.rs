use proc_macro::TokenStream;
use quote::ToTokens;
use syn::parse_quote;

/// This macro is added before a method of an environment struct in the impl
/// block. Use this macro to first check that the current round is still open.
///
/// The environment must expose a `round_over(&self) -> bool` method and the
/// annotated method must return `Result<_, EnvError>`. If the round has
/// already finished, the method returns `EnvError::RoundOver` without
/// touching any state.
#[proc_macro_attribute]
pub fn open_round(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut ast: syn::ImplItemFn = syn::parse(item).unwrap();
    let guard: syn::Stmt = parse_quote! {
        if self.round_over() {
            return Err(crate::EnvError::RoundOver);
        }
    };
    ast.block.stmts.insert(0, guard);
    ast.into_token_stream().into()
}
