//! Shared shape of generated lookup declarations.

use crate::error::MergeError;
use crate::names;
use crate::scope::Scope;
use crate::symbols::{AnnotationUsage, AnnotationValue, Declaration, DeclarationKind};

/// Fails with `NotPublic` unless `declaration` is public.
pub fn require_public(declaration: &Declaration) -> Result<(), MergeError> {
    if declaration.is_public() {
        Ok(())
    } else {
        Err(MergeError::NotPublic {
            declaration: declaration.name.clone(),
        })
    }
}

/// An empty lookup interface `scopeweave.inject.lookup.<simple>` recording
/// its resolved scope and the declaration it was generated from.
pub fn lookup_declaration(simple: &str, origin: &Declaration, scope: &Scope) -> Declaration {
    Declaration::new(DeclarationKind::Interface, names::LOOKUP_NAMESPACE, simple)
        .annotated(
            AnnotationUsage::new(names::CONTRIBUTION_SCOPE).with_argument(
                names::SCOPE_PARAMETER,
                AnnotationValue::Type(scope.marker().clone()),
            ),
        )
        .with_origin(origin.name.clone())
}
