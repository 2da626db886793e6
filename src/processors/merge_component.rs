//! `@MergeComponent`: runs the merge driver once per round.

use std::sync::Arc;

use crate::config::ProcessorOptions;
use crate::context::Context;
use crate::di::FromContext;
use crate::merge::{MergeDriver, ProcessedSet};
use crate::symbols::QualifiedName;

use super::{Round, SymbolProcessor};

/// Emits one aggregate per merge request once contributions stop arriving.
#[derive(FromContext, Clone)]
pub struct MergeComponentProcessor {
    options: Arc<ProcessorOptions>,
    processed: ProcessedSet,
    /// Rounds in which at least one request was deferred.
    #[from_context(default)]
    deferred_rounds: usize,
}

impl MergeComponentProcessor {
    pub const ID: &'static str = "scopeweave.MergeComponentProcessor";

    pub fn deferred_rounds(&self) -> usize {
        self.deferred_rounds
    }
}

impl SymbolProcessor for MergeComponentProcessor {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn process(&mut self, round: &mut Round<'_>) -> Vec<QualifiedName> {
        let driver = MergeDriver::new(round.facts, &self.options);
        let outcome = driver.step(&self.processed);

        if !outcome.pending.is_empty() {
            self.deferred_rounds += 1;
        }

        for merge in outcome.finalized {
            match merge.result {
                Ok(file) => {
                    tracing::debug!("Finalized merge {} into {}", merge.request, file.id);
                    round.emit(file);
                }
                Err(err) => round.diagnostics.error(err),
            }
        }

        outcome.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::InMemoryCodeGenerator;
    use crate::diagnostics::Diagnostics;
    use crate::di::FromRef;
    use crate::names;
    use crate::symbols::{
        AnnotationUsage, AnnotationValue, Declaration, DeclarationKind, SourceFile, SymbolTable,
    };

    #[test]
    fn test_processed_set_is_shared_through_context() {
        let ctx = Context::new(ProcessorOptions::default());
        let mut processor = MergeComponentProcessor::from_ref(&ctx);

        let mut table = SymbolTable::new();
        table
            .add_file(SourceFile::new(
                "AppComponent.kt",
                vec![Declaration::new(DeclarationKind::Interface, "com.app", "AppComponent")
                    .annotated(
                        AnnotationUsage::new(names::MERGE_COMPONENT)
                            .with_argument("scope", AnnotationValue::Type("com.app.AppScope".into())),
                    )],
            ))
            .unwrap();
        table.begin_round([]);

        let mut codegen = InMemoryCodeGenerator::new();
        let mut diagnostics = Diagnostics::new();
        let mut round = Round {
            number: 1,
            facts: &table,
            codegen: &mut codegen,
            diagnostics: &mut diagnostics,
        };
        let deferred = processor.process(&mut round);

        assert!(deferred.is_empty());
        assert_eq!(processor.deferred_rounds(), 0);
        assert!(ctx.processed.contains(&"com.app.AppComponent".into()));
        assert_eq!(codegen.files().len(), 1);
        assert_eq!(
            codegen.files()[0].id.as_str(),
            "generated/com.app.AppComponentMerged"
        );
    }
}
