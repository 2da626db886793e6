//! Compile-time wiring macros for scopeweave.
//!
//! Processors are assembled from a shared context without a runtime
//! container:
//! - `#[derive(Context)]` makes every field of the context extractable
//! - `#[derive(FromContext)]` builds a processor by extracting each field
//!
//! Generated code references `crate::FromRef`, so the consuming crate must
//! re-export the trait at its root.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod context;
mod fields;
mod from_context;

/// Derive macro for the wiring context.
///
/// Generates one `FromRef<Self>` implementation per field type. Every field
/// must implement `Clone` and have a type distinct from its siblings.
///
/// ```ignore
/// #[derive(Context, Clone)]
/// pub struct Context {
///     pub options: Arc<ProcessorOptions>,
///     pub processed: ProcessedSet,
/// }
///
/// // impl FromRef<Context> for Arc<ProcessorOptions> { ... }
/// // impl FromRef<Context> for ProcessedSet { ... }
/// ```
#[proc_macro_derive(Context)]
pub fn derive_context(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    context::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derive macro for types assembled from a context.
///
/// Each field is resolved with `FromRef::from_ref(ctx)`, except fields marked
/// `#[from_context(default)]`, which start from `Default::default()` and hold
/// per-instance state. The context type defaults to `Context` and can be
/// overridden with `#[from_context(Context = "OtherContext")]`.
///
/// ```ignore
/// #[derive(FromContext, Clone)]
/// pub struct MergeComponentProcessor {
///     options: Arc<ProcessorOptions>,
///     processed: ProcessedSet,
///     #[from_context(default)]
///     deferred_rounds: usize,
/// }
/// ```
#[proc_macro_derive(FromContext, attributes(from_context))]
pub fn derive_from_context(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_context::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
