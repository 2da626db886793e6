//! Implementation of #[derive(Context)].

use std::collections::HashMap;

use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::DeriveInput;

use crate::fields::named_fields;

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = named_fields(input, "Context")?;

    // One FromRef impl per field type: two fields of the same type would
    // produce overlapping impls, so reject them with a readable message.
    let mut seen: HashMap<String, &syn::Ident> = HashMap::new();
    let mut impls = Vec::with_capacity(fields.len());

    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let field_type = &field.ty;
        let key = field_type.to_token_stream().to_string();

        if let Some(previous) = seen.insert(key.clone(), field_name) {
            return Err(syn::Error::new_spanned(
                field_type,
                format!(
                    "fields `{previous}` and `{field_name}` share the type `{key}`; \
                     each context field needs a distinct type"
                ),
            ));
        }

        impls.push(quote! {
            impl #impl_generics crate::FromRef<#name #ty_generics> for #field_type #where_clause {
                fn from_ref(ctx: &#name #ty_generics) -> Self {
                    ::core::clone::Clone::clone(&ctx.#field_name)
                }
            }
        });
    }

    Ok(quote! { #(#impls)* })
}
