//! The fixed-point merge driver.
//!
//! Per merge request, across rounds:
//!
//! ```text
//! Discovered --(new contribution files this round)--> Deferred --next round--> Discovered
//! Discovered --(no new contribution files)----------> Processed (terminal)
//! ```
//!
//! [`MergeDriver::step`] runs once per round. It never waits: deferral is
//! returning the request names to the host so it delivers them again with a
//! more complete snapshot.

use crate::codegen::GeneratedFile;
use crate::config::ProcessorOptions;
use crate::error::MergeError;
use crate::names;
use crate::registry::ContributionRegistry;
use crate::symbols::{Declaration, DeclarationKind, QualifiedName, SymbolFacts};

use super::processed::ProcessedSet;
use super::request::MergeRequest;
use super::resolver::ScopeResolver;
use super::subcomponent::SubcomponentFinalizer;

/// Result of finalizing one merge request.
#[derive(Debug)]
pub struct FinalizedMerge {
    pub request: QualifiedName,
    pub result: Result<GeneratedFile, MergeError>,
}

/// What one round did with the merge requests it saw.
#[derive(Debug, Default)]
pub struct StepOutcome {
    /// Requests to deliver again next round.
    pub pending: Vec<QualifiedName>,
    /// Requests processed this round, in discovery order.
    pub finalized: Vec<FinalizedMerge>,
}

pub struct MergeDriver<'a> {
    facts: &'a dyn SymbolFacts,
    registry: ContributionRegistry,
}

impl<'a> MergeDriver<'a> {
    pub fn new(facts: &'a dyn SymbolFacts, options: &ProcessorOptions) -> Self {
        Self {
            facts,
            registry: ContributionRegistry::assemble(options, facts),
        }
    }

    /// Advances every merge request delivered this round.
    ///
    /// All requests are deferred together while this round's new files carry
    /// contributions. Otherwise all of them are finalized and marked
    /// processed, failures included.
    pub fn step(&self, processed: &ProcessedSet) -> StepOutcome {
        let requests = self.discover(processed);
        if requests.is_empty() {
            return StepOutcome::default();
        }

        if self.has_new_contributions() {
            let pending: Vec<QualifiedName> = requests
                .iter()
                .map(|request| request.name.clone())
                .collect();
            tracing::info!("Deferring {} merge request(s) to the next round", pending.len());
            return StepOutcome {
                pending,
                finalized: Vec::new(),
            };
        }

        let finalized = requests
            .into_iter()
            .map(|declaration| {
                processed.insert(declaration.name.clone());
                FinalizedMerge {
                    request: declaration.name.clone(),
                    result: self.finalize(declaration),
                }
            })
            .collect();

        StepOutcome {
            pending: Vec::new(),
            finalized,
        }
    }

    /// Merge requests delivered this round and not yet processed, deduped.
    fn discover(&self, processed: &ProcessedSet) -> Vec<&'a Declaration> {
        let mut requests: Vec<&'a Declaration> = Vec::new();
        let delivered = self
            .facts
            .declarations_with_annotation(&QualifiedName::new(names::MERGE_COMPONENT));
        for declaration in delivered {
            if processed.contains(&declaration.name)
                || requests.iter().any(|seen| seen.name == declaration.name)
            {
                continue;
            }
            requests.push(declaration);
        }
        requests
    }

    /// True when a file introduced this round declares anything annotated
    /// with a contribution annotation from the registry.
    pub fn has_new_contributions(&self) -> bool {
        self.facts
            .newly_introduced_files()
            .into_iter()
            .flat_map(|file| self.facts.declarations_in_file(file))
            .any(|declaration| {
                self.facts
                    .declaration_annotations(declaration)
                    .iter()
                    .any(|usage| self.registry.contains(&usage.annotation_type))
            })
    }

    /// Resolves one request and builds its aggregate and final subcomponents.
    pub fn finalize(&self, declaration: &'a Declaration) -> Result<GeneratedFile, MergeError> {
        let request = MergeRequest::parse(self.facts, declaration)?;
        let contributions =
            ScopeResolver::new(self.facts).resolve(&request.scope, &request.exclusions);

        let finalizer = SubcomponentFinalizer::new(self.facts, &declaration.package);
        let finals =
            finalizer.generate_final_components(request.name(), &contributions, &[])?;

        let mut aggregate = Declaration::new(
            DeclarationKind::Interface,
            &declaration.package,
            request.aggregate.simple_name(),
        )
        .with_origin(declaration.name.clone());
        aggregate.supertypes = contributions
            .iter()
            .map(|lookup| lookup.name.clone())
            .chain(finals.factories)
            .collect();

        tracing::info!(
            "Merged {} contributions into {} for scope {}",
            aggregate.supertypes.len(),
            aggregate.name,
            request.scope
        );

        let mut declarations = vec![aggregate];
        declarations.extend(finals.declarations);
        GeneratedFile::for_declarations(declarations)
            .ok_or_else(|| MergeError::UnknownDeclaration(declaration.name.clone()))
    }
}
