use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{parse_macro_input, DeriveInput, Generics, Ident, Path};

use crate::crate_path;

pub fn derive(input: TokenStream) -> TokenStream {
    let DeriveComponent { ident, generics, crate_path } =
        parse_macro_input!(input);
    let (impl_generics, type_generics, where_clause) =
        generics.split_for_impl();

    // a static inside a generic impl would be shared by every instantiation,
    // so generic types use the `TypeId`-keyed default instead
    let id_fn: TokenStream2 = if generics.params.is_empty() {
        quote! {
            fn id() -> ::core::result::Result<
                ::#crate_path::component::ComponentId,
                ::#crate_path::component::ComponentCapacityError,
            > {
                static ID: ::#crate_path::component::ComponentIdCell<#ident> =
                    ::#crate_path::component::ComponentIdCell::new();

                ID.get_or_init()
            }
        }
    } else {
        TokenStream2::new()
    };

    quote! {
        #[automatically_derived]
        impl #impl_generics ::#crate_path::component::Component for #ident #type_generics
        #where_clause
        {
            #id_fn
        }
    }
    .into()
}

struct DeriveComponent {
    ident: Ident,
    generics: Generics,
    crate_path: Path,
}

impl Parse for DeriveComponent {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let DeriveInput { ident, generics, .. } = input.parse()?;
        let crate_path = crate_path()?;

        Ok(Self { ident, generics, crate_path })
    }
}
