//! `@ContributingAnnotation`: registers a custom contribution annotation.
//!
//! The annotation class is recorded as a marker property in the extend
//! namespace. Merges in this and in later compilations read these markers
//! back and treat usages of the annotation as contributions when deciding
//! whether to wait for another round.

use std::collections::BTreeSet;

use crate::codegen::GeneratedFile;
use crate::context::Context;
use crate::di::FromContext;
use crate::error::MergeError;
use crate::names;
use crate::symbols::{Declaration, DeclarationKind, QualifiedName};

use super::{require_public, Round, SymbolProcessor};

#[derive(FromContext, Clone)]
pub struct ContributingAnnotationProcessor {
    #[from_context(default)]
    seen: BTreeSet<QualifiedName>,
}

impl ContributingAnnotationProcessor {
    pub const ID: &'static str = "scopeweave.ContributingAnnotationProcessor";

    pub(crate) fn generate(annotation: &Declaration) -> Result<Declaration, MergeError> {
        if annotation.kind != DeclarationKind::Annotation {
            return Err(MergeError::NotAnAnnotation {
                declaration: annotation.name.clone(),
                annotation: QualifiedName::new(names::CONTRIBUTING_ANNOTATION),
            });
        }
        require_public(annotation)?;

        Ok(Declaration::new(
            DeclarationKind::Property,
            names::EXTEND_NAMESPACE,
            &names::flatten(&annotation.name),
        )
        .with_origin(annotation.name.clone()))
    }
}

impl SymbolProcessor for ContributingAnnotationProcessor {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn process(&mut self, round: &mut Round<'_>) -> Vec<QualifiedName> {
        let facts = round.facts;
        let meta = QualifiedName::new(names::CONTRIBUTING_ANNOTATION);

        for annotation in facts.declarations_with_annotation(&meta) {
            if !self.seen.insert(annotation.name.clone()) {
                continue;
            }
            if let Some(marker) = round.diagnostics.report(Self::generate(annotation)) {
                tracing::debug!("Registered contributing annotation {}", annotation.name);
                round.emit(GeneratedFile::single(marker));
            }
        }

        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::AnnotationUsage;

    #[test]
    fn test_marker_property() {
        let annotation = Declaration::new(DeclarationKind::Annotation, "com.app", "ContributesRobot")
            .annotated(AnnotationUsage::new(names::CONTRIBUTING_ANNOTATION));

        let marker = ContributingAnnotationProcessor::generate(&annotation).unwrap();

        assert_eq!(marker.kind, DeclarationKind::Property);
        assert_eq!(marker.package, names::EXTEND_NAMESPACE);
        assert_eq!(marker.name, names::extend_marker_name(&annotation.name));
        assert_eq!(
            marker.name.as_str(),
            "scopeweave.inject.extend.ComAppContributesRobot"
        );
        assert_eq!(marker.origin, Some(annotation.name));
    }

    #[test]
    fn test_only_annotation_classes() {
        let class = Declaration::new(DeclarationKind::Class, "com.app", "Robot");
        let err = ContributingAnnotationProcessor::generate(&class).unwrap_err();
        assert!(matches!(err, MergeError::NotAnAnnotation { .. }));
    }
}
