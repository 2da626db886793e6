//! scopeweave - scope-driven contribution merging for annotation-based
//! dependency injection.
//!
//! Processors run once per compilation round over a [`symbols::SymbolFacts`]
//! snapshot. Contribution processors turn annotated declarations into lookup
//! declarations in a shared namespace; the merge processor waits for a fixed
//! point, then aggregates every lookup of a scope into one generated
//! interface per merge request.

pub mod cli;
pub mod codegen;
pub mod config;
pub mod context;
pub mod di;
pub mod diagnostics;
pub mod error;
pub mod merge;
pub mod names;
pub mod processors;
pub mod registry;
pub mod scope;
pub mod session;
pub mod symbols;

// Re-export FromRef at crate root for weave-macros generated code
pub use di::FromRef;
