//! Symbol processors run once per round.
//!
//! Each processor reads the round's symbol snapshot, validates the
//! declarations it is responsible for and writes generated files. Errors are
//! reported per declaration: one malformed contribution does not stop the
//! others from being checked, but no lookup is emitted for it.
//!
//! Processors:
//! - [`ContributingAnnotationProcessor`]: marker properties for custom annotations
//! - [`ContributesToProcessor`]: lookups for contributed interfaces
//! - [`ContributesBindingProcessor`]: lookups with provider functions for bindings
//! - [`ContributesSubcomponentProcessor`]: subcomponent validation and factory lookups
//! - [`CompatProcessor`]: legacy annotation translation
//! - [`MergeComponentProcessor`]: the fixed-point merge driver

mod compat;
mod contributes_binding;
mod contributes_subcomponent;
mod contributes_to;
mod contributing_annotation;
mod lookup;
mod merge_component;

pub use compat::CompatProcessor;
pub use contributes_binding::ContributesBindingProcessor;
pub use contributes_subcomponent::{ContributesSubcomponentProcessor, SubcomponentShape};
pub use contributes_to::ContributesToProcessor;
pub use contributing_annotation::ContributingAnnotationProcessor;
pub use lookup::{lookup_declaration, require_public};
pub use merge_component::MergeComponentProcessor;

use crate::codegen::{CodeGenerator, GeneratedFile};
use crate::context::Context;
use crate::di::FromRef;
use crate::diagnostics::Diagnostics;
use crate::symbols::{QualifiedName, SymbolFacts};

/// Everything a processor sees and produces in one round.
pub struct Round<'a> {
    /// 1-based round number.
    pub number: usize,
    pub facts: &'a dyn SymbolFacts,
    pub codegen: &'a mut dyn CodeGenerator,
    pub diagnostics: &'a mut Diagnostics,
}

impl Round<'_> {
    /// Writes `file`, reporting a write conflict as a diagnostic.
    pub fn emit(&mut self, file: GeneratedFile) {
        if let Err(err) = self.codegen.create_file(file) {
            self.diagnostics.error(err);
        }
    }
}

/// A processor invoked by the host once per round.
pub trait SymbolProcessor {
    /// Identity used by the `<id> = "disabled"` option.
    fn id(&self) -> &'static str;

    /// Processes one round and returns the symbols to deliver again next round.
    fn process(&mut self, round: &mut Round<'_>) -> Vec<QualifiedName>;
}

/// The processors of a session, in invocation order.
pub struct Register {
    processors: Vec<Box<dyn SymbolProcessor>>,
}

impl Register {
    pub fn new() -> Self {
        Self {
            processors: Vec::new(),
        }
    }

    pub fn register(mut self, processor: impl SymbolProcessor + 'static) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// All built-in processors wired from `ctx`, minus the disabled ones.
    pub fn from_context(ctx: &Context) -> Self {
        let register = Self::new()
            .register(ContributingAnnotationProcessor::from_ref(ctx))
            .register(ContributesToProcessor::from_ref(ctx))
            .register(ContributesBindingProcessor::from_ref(ctx))
            .register(ContributesSubcomponentProcessor::from_ref(ctx))
            .register(CompatProcessor::from_ref(ctx))
            .register(MergeComponentProcessor::from_ref(ctx));

        let options = ctx.options.clone();
        register.retain(|processor| {
            let enabled = !options.is_disabled(processor.id());
            if !enabled {
                tracing::info!("Processor {} is disabled", processor.id());
            }
            enabled
        })
    }

    fn retain(mut self, keep: impl Fn(&dyn SymbolProcessor) -> bool) -> Self {
        self.processors.retain(|processor| keep(processor.as_ref()));
        self
    }

    /// Identities of the registered processors.
    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.processors.iter().map(|processor| processor.id())
    }

    /// Runs every processor on `round`; returns the union of deferred symbols.
    pub fn run_round(&mut self, round: &mut Round<'_>) -> Vec<QualifiedName> {
        let mut deferred = Vec::new();
        for processor in &mut self.processors {
            tracing::debug!("Round {}: running {}", round.number, processor.id());
            for symbol in processor.process(round) {
                if !deferred.contains(&symbol) {
                    deferred.push(symbol);
                }
            }
        }
        deferred
    }
}

impl Default for Register {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::config::ProcessorOptions;

    #[test]
    fn test_register_wires_every_processor_in_order() {
        let ctx = Context::new(ProcessorOptions::default());
        let register = Register::from_context(&ctx);

        assert_eq!(
            register.ids().collect::<Vec<_>>(),
            vec![
                ContributingAnnotationProcessor::ID,
                ContributesToProcessor::ID,
                ContributesBindingProcessor::ID,
                ContributesSubcomponentProcessor::ID,
                CompatProcessor::ID,
                MergeComponentProcessor::ID,
            ]
        );
    }

    #[test]
    fn test_register_skips_disabled_processors() {
        let options = ProcessorOptions::from_map(&BTreeMap::from([(
            CompatProcessor::ID.to_string(),
            "disabled".to_string(),
        )]));
        let register = Register::from_context(&Context::new(options));

        assert!(register.ids().all(|id| id != CompatProcessor::ID));
        assert_eq!(register.ids().count(), 5);
    }
}
