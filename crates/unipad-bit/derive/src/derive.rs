use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

const MAX_VARIANTS: usize = 64;

pub(crate) fn handle_derive_bit(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Enum(data) = &input.data else {
        return syn::Error::new_spanned(name, "Bit can be derived only for enums")
            .to_compile_error()
            .into();
    };

    let mut variants = Vec::with_capacity(data.variants.len());
    for v in &data.variants {
        if !matches!(v.fields, Fields::Unit) {
            return syn::Error::new_spanned(
                v,
                "Bit supports only fieldless enum variants",
            )
            .to_compile_error()
            .into();
        }
        variants.push(v.ident.clone());
    }
    if variants.len() > MAX_VARIANTS {
        return syn::Error::new_spanned(
            name,
            "Bit supports at most 64 variants",
        )
        .to_compile_error()
        .into();
    }

    let count = variants.len();
    let bit_arms = variants.iter().enumerate().map(|(i, v)| {
        let idx = i as u64;
        quote! { #name::#v => 1u64 << #idx }
    });
    let index_arms = variants.iter().enumerate().map(|(i, v)| {
        let idx = i as u32;
        quote! { #idx => ::core::option::Option::Some(#name::#v) }
    });

    let expanded = quote! {
        impl #name {
            /// Every variant, in bit order.
            pub const ALL: [#name; #count] = [#( #name::#variants ),*];
        }

        impl ::unipad_bit_mask::Bitable for #name {
            #[inline]
            fn bit(&self) -> u64 {
                match self { #( #bit_arms, )* }
            }

            #[inline]
            fn index(&self) -> u32 { self.bit().trailing_zeros() }

            #[inline]
            fn from_index(index: u32) -> ::core::option::Option<Self> {
                match index {
                    #( #index_arms, )*
                    _ => ::core::option::Option::None,
                }
            }
        }
    };

    TokenStream::from(expanded)
}
