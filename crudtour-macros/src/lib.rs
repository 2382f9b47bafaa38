//! Procedural macros for the crudtour project.
//!
//! Provides `#[derive(Document)]`, which implements `crudtour_core::document::Document`
//! for a struct by returning the field marked `#[document(id)]`. The marked field must
//! be an `Option<ObjectId>`.

#[allow(unused_extern_crates)]
extern crate self as crudtour_macros;

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error, Fields, parse_macro_input, spanned::Spanned};

#[proc_macro_derive(Document, attributes(document))]
pub fn derive_document(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand_document(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

fn expand_document(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => return Err(Error::new(input.span(), "Document can only be derived for structs with named fields")),
        },
        _ => return Err(Error::new(input.span(), "Document can only be derived for structs")),
    };

    let mut id_fields = Vec::new();

    for field in fields {
        for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("document")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    id_fields.push(field);
                    Ok(())
                } else {
                    Err(meta.error("unsupported document attribute, expected `id`"))
                }
            })?;
        }
    }

    let id_field = match id_fields.as_slice() {
        [field] => field,
        [] => return Err(Error::new(input.span(), "missing a field marked #[document(id)]")),
        [_, second, ..] => return Err(Error::new(second.span(), "only one field may be marked #[document(id)]")),
    };

    let name = &input.ident;
    let id_ident = &id_field.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::crudtour_core::document::Document for #name #ty_generics #where_clause {
            fn id(&self) -> ::core::option::Option<&::crudtour_core::bson::oid::ObjectId> {
                self.#id_ident.as_ref()
            }
        }
    })
}
