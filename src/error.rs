//! Processor error types.
//!
//! Every variant is a fatal, local validation failure attached to one
//! declaration. Nothing here is retried.

use thiserror::Error;

use crate::symbols::{FileId, QualifiedName};

fn join(names: &[QualifiedName]) -> String {
    names
        .iter()
        .map(QualifiedName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn omissions(annotations: &[QualifiedName]) -> String {
    annotations
        .iter()
        .map(|annotation| format!("; @{annotation} omits scope"))
        .collect()
}

/// Errors raised while validating contributions and finalizing merges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    // Structural contract violations
    #[error("{declaration} must be public to be contributed")]
    NotPublic { declaration: QualifiedName },

    #[error("{declaration} is annotated with @{annotation}, which is only allowed on interfaces")]
    NotInterface {
        declaration: QualifiedName,
        annotation: QualifiedName,
    },

    #[error("{declaration} is annotated with @{annotation}, which is only allowed on classes and objects")]
    NotAClass {
        declaration: QualifiedName,
        annotation: QualifiedName,
    },

    #[error("{declaration} is annotated with @{annotation}, which is only allowed on annotation classes")]
    NotAnAnnotation {
        declaration: QualifiedName,
        annotation: QualifiedName,
    },

    #[error("contributed subcomponent {declaration} must be an interface or an abstract class")]
    NotInterfaceOrAbstract { declaration: QualifiedName },

    // Scope resolution conflicts
    #[error("couldn't find a scope for {declaration}: add a scope argument or a scope annotation")]
    MissingScope { declaration: QualifiedName },

    #[error("@{annotation} on {declaration} requires a scope argument")]
    NoScopeArgument {
        declaration: QualifiedName,
        annotation: QualifiedName,
    },

    #[error("{declaration} declares conflicting scopes: {}{}", join(.scopes), omissions(.omitted))]
    ConflictingScopes {
        declaration: QualifiedName,
        scopes: Vec<QualifiedName>,
        /// Contribution annotations used here without a scope argument.
        omitted: Vec<QualifiedName>,
    },

    #[error("{declaration} uses scope {explicit} in its contribution annotations, but its scope annotation uses {class_level}")]
    ScopeMismatch {
        declaration: QualifiedName,
        explicit: QualifiedName,
        class_level: QualifiedName,
    },

    #[error("{declaration} repeats scope {scope} already given by its scope annotation; remove the explicit scope argument")]
    RedundantExplicitScope {
        declaration: QualifiedName,
        scope: QualifiedName,
    },

    // Bound type ambiguity
    #[error("{declaration} has no super type to bind; declare a boundType")]
    NoBoundType { declaration: QualifiedName },

    #[error("{declaration} has multiple super types ({}); declare which one to bind with boundType", join(.candidates))]
    AmbiguousBoundType {
        declaration: QualifiedName,
        candidates: Vec<QualifiedName>,
    },

    // Duplicate contribution
    #[error("{declaration} contributes a binding for {bound_type} more than once")]
    DuplicateContribution {
        declaration: QualifiedName,
        bound_type: QualifiedName,
    },

    // Merge-time wiring
    #[error("{declaration} is merged with @Component but doesn't extend {expected}; add {expected} as a super type")]
    SuperTypeNotDeclared {
        declaration: QualifiedName,
        expected: QualifiedName,
    },

    // Subcomponent structure
    #[error("contributed subcomponent {subcomponent} must declare a nested factory interface annotated with @ContributesSubcomponent.Factory")]
    MissingFactory { subcomponent: QualifiedName },

    #[error("contributed subcomponent {subcomponent} declares more than one factory: {}", join(.factories))]
    MultipleFactories {
        subcomponent: QualifiedName,
        factories: Vec<QualifiedName>,
    },

    #[error("factory {factory} must declare exactly one abstract function, found {count}")]
    FactoryFunctionCount { factory: QualifiedName, count: usize },

    #[error("the function of factory {factory} must return {expected}, found {}", .actual.as_ref().map(QualifiedName::as_str).unwrap_or("no return type"))]
    FactoryReturnType {
        factory: QualifiedName,
        expected: QualifiedName,
        actual: Option<QualifiedName>,
    },

    #[error("factory {factory} must be nested inside a class annotated with @ContributesSubcomponent")]
    FactoryNotNested { factory: QualifiedName },

    #[error("subcomponent {subcomponent} is contributed to itself through {}", join(.lineage))]
    SubcomponentCycle {
        subcomponent: QualifiedName,
        lineage: Vec<QualifiedName>,
    },

    // Compatibility shims
    #[error("@{annotation} on {declaration} uses unsupported parameter '{parameter}'")]
    UnsupportedLegacyParameter {
        declaration: QualifiedName,
        annotation: QualifiedName,
        parameter: String,
    },

    // Host contract
    #[error("declaration not found: {0}")]
    UnknownDeclaration(QualifiedName),

    #[error("declaration defined twice: {0}")]
    DuplicateDeclaration(QualifiedName),

    #[error("file already exists: {0}")]
    FileAlreadyExists(FileId),
}

impl MergeError {
    /// The declaration the diagnostic is reported at.
    pub fn symbol(&self) -> Option<&QualifiedName> {
        match self {
            MergeError::NotPublic { declaration }
            | MergeError::NotInterface { declaration, .. }
            | MergeError::NotAClass { declaration, .. }
            | MergeError::NotAnAnnotation { declaration, .. }
            | MergeError::NotInterfaceOrAbstract { declaration }
            | MergeError::MissingScope { declaration }
            | MergeError::NoScopeArgument { declaration, .. }
            | MergeError::ConflictingScopes { declaration, .. }
            | MergeError::ScopeMismatch { declaration, .. }
            | MergeError::RedundantExplicitScope { declaration, .. }
            | MergeError::NoBoundType { declaration }
            | MergeError::AmbiguousBoundType { declaration, .. }
            | MergeError::DuplicateContribution { declaration, .. }
            | MergeError::SuperTypeNotDeclared { declaration, .. }
            | MergeError::UnsupportedLegacyParameter { declaration, .. } => Some(declaration),
            MergeError::MissingFactory { subcomponent }
            | MergeError::MultipleFactories { subcomponent, .. }
            | MergeError::SubcomponentCycle { subcomponent, .. } => Some(subcomponent),
            MergeError::FactoryFunctionCount { factory, .. }
            | MergeError::FactoryReturnType { factory, .. }
            | MergeError::FactoryNotNested { factory } => Some(factory),
            MergeError::UnknownDeclaration(name) | MergeError::DuplicateDeclaration(name) => {
                Some(name)
            }
            MergeError::FileAlreadyExists(_) => None,
        }
    }
}
