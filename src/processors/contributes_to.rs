//! `@ContributesTo`: contributes an interface to every merge of its scope.

use std::collections::BTreeSet;

use crate::codegen::GeneratedFile;
use crate::context::Context;
use crate::di::FromContext;
use crate::error::MergeError;
use crate::names;
use crate::scope::ScopeParser;
use crate::symbols::{Declaration, QualifiedName, SymbolFacts};

use super::{lookup_declaration, require_public, Round, SymbolProcessor};

/// Generates one lookup interface per contributed interface:
///
/// ```text
/// @ContributesTo(AppScope::class)
/// interface AppGraph
///
/// // scopeweave.inject.lookup
/// @ContributionScope(AppScope::class)
/// interface ComAppAppGraph : com.app.AppGraph   // origin: com.app.AppGraph
/// ```
#[derive(FromContext, Clone)]
pub struct ContributesToProcessor {
    #[from_context(default)]
    seen: BTreeSet<QualifiedName>,
}

impl ContributesToProcessor {
    pub const ID: &'static str = "scopeweave.ContributesToProcessor";

    /// Validates `declaration` and builds its lookup. `annotation` is the
    /// contribution annotation being processed, used in diagnostics.
    pub(crate) fn generate(
        facts: &dyn SymbolFacts,
        declaration: &Declaration,
        annotation: &str,
    ) -> Result<Declaration, MergeError> {
        require_public(declaration)?;
        if !declaration.is_interface() {
            return Err(MergeError::NotInterface {
                declaration: declaration.name.clone(),
                annotation: QualifiedName::new(annotation),
            });
        }

        let scope = ScopeParser::new(facts).resolve(declaration)?;
        Ok(
            lookup_declaration(&names::flatten(&declaration.name), declaration, &scope)
                .extends(declaration.name.clone()),
        )
    }
}

impl SymbolProcessor for ContributesToProcessor {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn process(&mut self, round: &mut Round<'_>) -> Vec<QualifiedName> {
        let facts = round.facts;
        let annotation = QualifiedName::new(names::CONTRIBUTES_TO);

        for declaration in facts.declarations_with_annotation(&annotation) {
            if !self.seen.insert(declaration.name.clone()) {
                continue;
            }
            let result = Self::generate(facts, declaration, names::CONTRIBUTES_TO);
            if let Some(lookup) = round.diagnostics.report(result) {
                tracing::debug!("Contributed {} as {}", declaration.name, lookup.name);
                round.emit(GeneratedFile::single(lookup));
            }
        }

        Vec::new()
    }
}
