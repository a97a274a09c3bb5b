//! Proc-macro crate for `#[derive(FromBytes)]`.
//!
//! Generates `unsafe impl kestrel_binparse::FromBytes for T {}` and
//! `unsafe impl kestrel_binparse::AsBytes for T {}` with compile-time
//! assertions verifying `#[repr(C)]` layout, that all field types implement
//! the overlay traits, and that the struct contains no padding. Also
//! generates the field-by-field `kestrel_binparse::EndianSwap` impl.

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, Index, parse_macro_input};

/// Derives the overlay traits for a `#[repr(C)]` struct.
///
/// # Requirements
///
/// - The struct must have `#[repr(C)]` or `#[repr(C, packed)]`.
/// - All fields must implement `FromBytes`, `AsBytes` and `EndianSwap`.
/// - The field sizes must add up to the size of the struct (no padding).
///
/// # Example
///
/// ```ignore
/// #[derive(Clone, Copy, FromBytes)]
/// #[repr(C)]
/// pub struct Elf32Rel {
///     pub r_offset: U32,
///     pub r_info: U32,
/// }
/// ```
#[proc_macro_derive(FromBytes)]
pub fn derive_from_bytes(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_impl(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    // Verify #[repr(C)] or #[repr(C, packed)].
    let has_repr_c = input.attrs.iter().any(|attr| {
        if !attr.path().is_ident("repr") {
            return false;
        }
        let mut found = false;
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("C") {
                found = true;
            }
            Ok(())
        });
        found
    });

    if !has_repr_c {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "FromBytes requires #[repr(C)] or #[repr(C, packed)]",
        ));
    }

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "FromBytes cannot be derived for generic structs",
        ));
    }

    // Only support structs.
    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "FromBytes can only be derived for structs",
            ));
        }
    };

    let field_types: Vec<&syn::Type> = fields.iter().map(|f| &f.ty).collect();

    // Compile-time assertions that all field types implement the overlay traits.
    let field_assertions = field_types.iter().enumerate().map(|(i, ty)| {
        let assert_name = format_ident!("_AssertFromBytes_{}_{}", name, i);
        quote! {
            #[doc(hidden)]
            #[allow(non_camel_case_types, dead_code)]
            struct #assert_name where
                #ty: kestrel_binparse::FromBytes
                    + kestrel_binparse::AsBytes
                    + kestrel_binparse::EndianSwap;
        }
    });

    let padding_message = format!("{name} must not contain padding");
    let padding_assertion = quote! {
        const _: () = assert!(
            ::core::mem::size_of::<#name>() == 0 #(+ ::core::mem::size_of::<#field_types>())*,
            #padding_message
        );
    };

    let swap_body = match fields {
        Fields::Named(named) => {
            let idents: Vec<_> = named.named.iter().filter_map(|f| f.ident.as_ref()).collect();
            let sources = idents.clone();
            quote! {
                Self {
                    #(#idents: kestrel_binparse::EndianSwap::swap_bytes(&self.#sources),)*
                }
            }
        }
        Fields::Unnamed(unnamed) => {
            let indices = (0..unnamed.unnamed.len()).map(Index::from);
            quote! {
                Self(#(kestrel_binparse::EndianSwap::swap_bytes(&self.#indices),)*)
            }
        }
        Fields::Unit => quote! { Self },
    };

    Ok(quote! {
        #(#field_assertions)*

        #padding_assertion

        // SAFETY: The derive macro has verified:
        // 1. The struct has #[repr(C)] layout.
        // 2. All field types implement FromBytes (checked via where-clause assertions).
        // 3. The struct must also be Copy (enforced by the trait bound).
        unsafe impl kestrel_binparse::FromBytes for #name {}

        // SAFETY: every field implements AsBytes and the assertion above
        // proves the struct has no padding between or after its fields.
        unsafe impl kestrel_binparse::AsBytes for #name {}

        impl kestrel_binparse::EndianSwap for #name {
            fn swap_bytes(&self) -> Self {
                #swap_body
            }
        }
    })
}
