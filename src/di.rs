//! Compile-time wiring of processors.
//!
//! Processors are built from the shared [`Context`](crate::context::Context)
//! with the `FromRef` trait and the derive macros from `weave-macros`.
//!
//! - `FromRef<T>`: extract a value from a reference to `T`
//! - `#[derive(Context)]`: makes each field of the context extractable
//! - `#[derive(FromContext)]`: builds a processor by extracting each field
//!
//! ```ignore
//! #[derive(FromContext, Clone)]
//! pub struct ContributesToProcessor {
//!     options: Arc<ProcessorOptions>,
//! }
//!
//! let processor = ContributesToProcessor::from_ref(&ctx);
//! ```

/// Extracts a value from a reference to another type.
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

/// Any Clone type can be extracted from itself.
impl<T: Clone> FromRef<T> for T {
    fn from_ref(input: &T) -> Self {
        input.clone()
    }
}

pub use weave_macros::{Context, FromContext};
