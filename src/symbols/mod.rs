//! Symbol facts facade.
//!
//! Processors never talk to the host compiler directly. They read the symbol
//! graph through the [`SymbolFacts`] trait:
//!
//! - [`SymbolFacts`] - the query contract the host must honor
//! - [`SymbolTable`] - in-memory implementation used by the session driver,
//!   the CLI and tests
//! - the model types (`Declaration`, `AnnotationUsage`, ...) shared by
//!   source and generated declarations

mod builtins;
mod facts;
mod model;
mod table;

pub use builtins::builtin_unit;
pub use facts::SymbolFacts;
pub use model::{
    AnnotationArgument, AnnotationParameter, AnnotationUsage, AnnotationValue, CompilationUnit,
    Declaration, DeclarationKind, FileId, Function, FunctionBody, Parameter, QualifiedName,
    SourceFile, Visibility,
};
pub use table::SymbolTable;
