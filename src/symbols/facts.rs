//! Read-only query contract over the host's symbol table.

use super::{AnnotationParameter, AnnotationUsage, Declaration, FileId, QualifiedName};
use crate::names;

/// Read-only facts about the symbol graph of the current round.
///
/// Queries are idempotent within a round. Contract with the host:
///
/// - [`declarations_with_annotation`](Self::declarations_with_annotation)
///   eventually yields every matching declaration of the current compilation
///   across rounds, and may yield the same declaration in several rounds.
///   Callers dedupe by qualified name.
/// - [`declarations_in_namespace`](Self::declarations_in_namespace) and
///   [`declaration`](Self::declaration) also see every prior compilation
///   result the host was given. The host must supply the full transitive set
///   of prior results; missing ones cannot be detected here.
pub trait SymbolFacts {
    /// Resolves a declaration visible to this compilation.
    fn declaration(&self, name: &QualifiedName) -> Option<&Declaration>;

    /// Declarations of the current compilation annotated with `annotation`
    /// that are delivered this round.
    fn declarations_with_annotation(&self, annotation: &QualifiedName) -> Vec<&Declaration>;

    /// Top-level declarations in `namespace`, across all visible compilations.
    fn declarations_in_namespace(&self, namespace: &str) -> Vec<&Declaration>;

    /// Declarations nested directly inside `parent`.
    fn nested_declarations(&self, parent: &QualifiedName) -> Vec<&Declaration>;

    /// Files whose declarations became visible in the current round.
    fn newly_introduced_files(&self) -> Vec<&FileId>;

    /// Declarations defined in `file`.
    fn declarations_in_file(&self, file: &FileId) -> Vec<&Declaration>;

    /// Annotation usages on `declaration`.
    fn declaration_annotations<'a>(&'a self, declaration: &'a Declaration) -> &'a [AnnotationUsage] {
        &declaration.annotations
    }

    /// True when `annotation_type` is itself annotated as a scope marker.
    fn is_scope_marker(&self, annotation_type: &QualifiedName) -> bool {
        self.declaration(annotation_type)
            .is_some_and(|decl| decl.has_annotation(names::SCOPE))
    }

    /// Parameters declared by `annotation_type`, empty when it is unknown.
    fn annotation_parameters(&self, annotation_type: &QualifiedName) -> &[AnnotationParameter] {
        self.declaration(annotation_type)
            .map(|decl| decl.parameters.as_slice())
            .unwrap_or(&[])
    }

    /// The parameter `name` declared by `annotation_type`.
    fn annotation_parameter(
        &self,
        annotation_type: &QualifiedName,
        name: &str,
    ) -> Option<&AnnotationParameter> {
        self.annotation_parameters(annotation_type)
            .iter()
            .find(|parameter| parameter.name == name)
    }

    /// Argument `name` of `usage`, given either by name or by position in
    /// the annotation's declared parameter list.
    fn argument<'a>(
        &'a self,
        usage: &'a AnnotationUsage,
        name: &str,
    ) -> Option<&'a super::AnnotationValue> {
        if let Some(value) = usage.named(name) {
            return Some(value);
        }
        let index = self
            .annotation_parameters(&usage.annotation_type)
            .iter()
            .position(|parameter| parameter.name == name)?;
        usage.positional(index)
    }
}
