//! Registry of annotations that mark contributions.
//!
//! Assembled fresh each round from three sources:
//! 1. the built-in contribution annotations
//! 2. the `scopeweave-contributing-annotations` option
//! 3. annotation classes annotated with `@ContributingAnnotation`: those
//!    delivered this round directly, earlier ones through the marker
//!    properties written for them in the extend namespace

use std::collections::BTreeSet;

use crate::config::ProcessorOptions;
use crate::names;
use crate::symbols::{DeclarationKind, QualifiedName, SymbolFacts};

const BUILTIN_CONTRIBUTIONS: &[&str] = &[
    names::CONTRIBUTES_TO,
    names::CONTRIBUTES_BINDING,
    names::CONTRIBUTES_SUBCOMPONENT,
    names::CONTRIBUTES_SUBCOMPONENT_FACTORY,
];

const LEGACY_CONTRIBUTIONS: &[&str] = &[
    names::LEGACY_CONTRIBUTES_BINDING,
    names::LEGACY_CONTRIBUTES_TO,
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributionRegistry {
    annotations: BTreeSet<QualifiedName>,
}

impl ContributionRegistry {
    /// Assembles the registry from a symbol snapshot. Pure: the same options
    /// and snapshot always give the same registry.
    pub fn assemble(options: &ProcessorOptions, facts: &dyn SymbolFacts) -> Self {
        let mut annotations: BTreeSet<QualifiedName> = BUILTIN_CONTRIBUTIONS
            .iter()
            .map(|name| QualifiedName::new(*name))
            .collect();

        if !options.is_disabled(crate::processors::CompatProcessor::ID) {
            annotations.extend(LEGACY_CONTRIBUTIONS.iter().map(|name| QualifiedName::new(*name)));
        }

        annotations.extend(options.contributing_annotations().iter().cloned());

        annotations.extend(
            facts
                .declarations_in_namespace(names::EXTEND_NAMESPACE)
                .into_iter()
                .filter(|decl| decl.kind == DeclarationKind::Property)
                .filter_map(|decl| decl.origin.clone()),
        );

        // Marker properties for these are only visible from the next round.
        annotations.extend(
            facts
                .declarations_with_annotation(&QualifiedName::new(names::CONTRIBUTING_ANNOTATION))
                .into_iter()
                .filter(|decl| decl.kind == DeclarationKind::Annotation)
                .map(|decl| decl.name.clone()),
        );

        Self { annotations }
    }

    pub fn contains(&self, annotation: &QualifiedName) -> bool {
        self.annotations.contains(annotation)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}
