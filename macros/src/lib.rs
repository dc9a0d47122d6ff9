//! Derive macros for `signet`.

use proc_macro::TokenStream;
use syn::Path;

mod component;

/// Implements `Component` for a type.
///
/// Non-generic types memoize their component id in a per-type static, so
/// repeated lookups skip the process-wide registry entirely.
#[proc_macro_derive(Component)]
pub fn derive_component(input: TokenStream) -> TokenStream {
    component::derive(input)
}

/// The path to the `signet` crate in generated code.
///
/// Can be overridden at build time with `SIGNET_CRATE_PATH` when the crate is
/// re-exported under another name.
fn crate_path() -> syn::Result<Path> {
    syn::parse_str(option_env!("SIGNET_CRATE_PATH").unwrap_or("signet"))
}
