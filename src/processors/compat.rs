//! Translation of legacy contribution annotations.
//!
//! `legacy.anvil.ContributesTo` and `legacy.anvil.ContributesBinding` are
//! accepted as if they were the native annotations. Parameters without a
//! native counterpart (`replaces`, `priority`, `rank`, `ignoreQualifier`)
//! fail the declaration, or only warn when
//! `scopeweave-compat-ignore-unsupported-parameters` is set.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::codegen::GeneratedFile;
use crate::config::ProcessorOptions;
use crate::context::Context;
use crate::di::FromContext;
use crate::error::MergeError;
use crate::names;
use crate::symbols::{AnnotationValue, Declaration, QualifiedName, SymbolFacts};

use super::{ContributesBindingProcessor, ContributesToProcessor, Round, SymbolProcessor};

/// Legacy parameters that change behavior and have no native counterpart.
const UNSUPPORTED_PARAMETERS: &[&str] = &["replaces", "priority", "rank", "ignoreQualifier"];

#[derive(FromContext, Clone)]
pub struct CompatProcessor {
    options: Arc<ProcessorOptions>,
    #[from_context(default)]
    seen: BTreeSet<(QualifiedName, &'static str)>,
}

impl CompatProcessor {
    pub const ID: &'static str = "scopeweave.CompatProcessor";

    /// Unsupported parameters actually set on `annotation` usages of `declaration`.
    fn unsupported_parameters(
        facts: &dyn SymbolFacts,
        declaration: &Declaration,
        annotation: &str,
    ) -> Vec<&'static str> {
        let mut found = Vec::new();
        for usage in declaration.annotations_of(annotation) {
            for parameter in UNSUPPORTED_PARAMETERS {
                let is_set = match facts.argument(usage, parameter) {
                    None => false,
                    Some(AnnotationValue::Types(types)) => !types.is_empty(),
                    Some(AnnotationValue::Bool(value)) => *value,
                    Some(_) => true,
                };
                if is_set && !found.contains(parameter) {
                    found.push(*parameter);
                }
            }
        }
        found
    }

    /// Reports unsupported parameters. Returns false when the declaration
    /// must not be translated.
    fn check_parameters(
        &self,
        round: &mut Round<'_>,
        declaration: &Declaration,
        annotation: &'static str,
    ) -> bool {
        let unsupported = Self::unsupported_parameters(round.facts, declaration, annotation);
        let mut supported = true;

        for parameter in unsupported {
            let err = MergeError::UnsupportedLegacyParameter {
                declaration: declaration.name.clone(),
                annotation: QualifiedName::new(annotation),
                parameter: parameter.to_string(),
            };
            if self.options.ignore_unsupported_legacy_parameters() {
                round
                    .diagnostics
                    .warn(format!("{err}; ignored"), Some(&declaration.name));
            } else {
                round.diagnostics.error(err);
                supported = false;
            }
        }

        supported
    }

    fn translate(
        &self,
        facts: &dyn SymbolFacts,
        declaration: &Declaration,
        annotation: &'static str,
    ) -> Result<Vec<Declaration>, MergeError> {
        if annotation == names::LEGACY_CONTRIBUTES_TO {
            ContributesToProcessor::generate(facts, declaration, annotation)
                .map(|lookup| vec![lookup])
        } else {
            ContributesBindingProcessor::generate(facts, declaration, annotation)
        }
    }
}

impl SymbolProcessor for CompatProcessor {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn process(&mut self, round: &mut Round<'_>) -> Vec<QualifiedName> {
        let facts = round.facts;

        for annotation in [names::LEGACY_CONTRIBUTES_TO, names::LEGACY_CONTRIBUTES_BINDING] {
            for declaration in facts.declarations_with_annotation(&QualifiedName::new(annotation)) {
                if !self.seen.insert((declaration.name.clone(), annotation)) {
                    continue;
                }
                if !self.check_parameters(round, declaration, annotation) {
                    continue;
                }

                let result = self.translate(facts, declaration, annotation);
                let Some(lookups) = round.diagnostics.report(result) else {
                    continue;
                };
                for lookup in lookups {
                    tracing::debug!(
                        "Translated @{} on {} into {}",
                        annotation,
                        declaration.name,
                        lookup.name
                    );
                    round.emit(GeneratedFile::single(lookup));
                }
            }
        }

        Vec::new()
    }
}
