use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

pub(crate) fn handle_derive_bit(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident;

    let variants: Vec<syn::Ident> = match input.data {
        Data::Enum(e) => e
            .variants
            .into_iter()
            .map(|v| match v.fields {
                Fields::Unit => v.ident,
                _ => panic!("Bit supports only fieldless enum variants"),
            })
            .collect(),
        _ => panic!("Bit can be derived only for enums"),
    };
    assert!(variants.len() <= 64, "Bit supports at most 64 variants");

    // Bits follow declaration order, explicit discriminants are ignored.
    let count = variants.len() as u32;
    let index_arms = variants.iter().enumerate().map(|(i, v)| {
        let idx = i as u32;
        quote! { #name::#v => #idx }
    });
    let from_arms = variants.iter().enumerate().map(|(i, v)| {
        let idx = i as u32;
        quote! { #idx => ::core::option::Option::Some(#name::#v) }
    });

    let expanded = quote! {
        impl ::padbind_bit_mask::Bitable for #name {
            const COUNT: u32 = #count;

            #[inline]
            fn bit(&self) -> u64 {
                1u64 << ::padbind_bit_mask::Bitable::index(self)
            }

            #[inline]
            fn index(&self) -> u32 {
                match self { #( #index_arms, )* }
            }

            #[inline]
            fn from_index(index: u32) -> ::core::option::Option<Self> {
                match index {
                    #( #from_arms, )*
                    _ => ::core::option::Option::None,
                }
            }
        }
    };

    TokenStream::from(expanded)
}
