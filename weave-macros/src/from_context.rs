//! Implementation of #[derive(FromContext)].

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Field, LitStr, Type};

use crate::fields::named_fields;

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let context_type = context_type(input)?;
    let fields = named_fields(input, "FromContext")?;

    let mut inits = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let field_type = &field.ty;

        if is_default(field)? {
            inits.push(quote! {
                #field_name: <#field_type as ::core::default::Default>::default()
            });
        } else {
            inits.push(quote! {
                #field_name: <#field_type as crate::FromRef<#context_type>>::from_ref(ctx)
            });
        }
    }

    Ok(quote! {
        impl #impl_generics crate::FromRef<#context_type> for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn from_ref(ctx: &#context_type) -> Self {
                Self {
                    #(#inits),*
                }
            }
        }
    })
}

/// Reads `#[from_context(Context = "Path")]`, defaulting to `Context`.
fn context_type(input: &DeriveInput) -> syn::Result<TokenStream> {
    let mut context: Option<Type> = None;

    for attr in &input.attrs {
        if !attr.path().is_ident("from_context") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("Context") {
                let value: LitStr = meta.value()?.parse()?;
                context = Some(value.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `Context = \"Type\"`"))
            }
        })?;
    }

    Ok(match context {
        Some(ty) => quote! { #ty },
        None => quote! { Context },
    })
}

/// True when the field carries `#[from_context(default)]`.
fn is_default(field: &Field) -> syn::Result<bool> {
    let mut default = false;

    for attr in &field.attrs {
        if !attr.path().is_ident("from_context") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                default = true;
                Ok(())
            } else {
                Err(meta.error("expected `default`"))
            }
        })?;
    }

    Ok(default)
}
