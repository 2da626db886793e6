//! The host round loop.
//!
//! A [`Session`] plays the part of the host compiler for one compilation:
//! it owns the symbol table, invokes every processor once per round, feeds
//! generated files back in as the next round's new files and re-delivers
//! deferred symbols. It stops when a round produces nothing and defers
//! nothing, when a round records an error, or at the round limit.

use thiserror::Error;

use crate::codegen::{GeneratedFile, InMemoryCodeGenerator};
use crate::config::{Config, ProcessorOptions, SessionConfig};
use crate::context::Context;
use crate::diagnostics::Diagnostics;
use crate::error::MergeError;
use crate::processors::{Register, Round};
use crate::symbols::{CompilationUnit, FileId, SymbolFacts, SymbolTable};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("compilation failed with {} error(s)", .diagnostics.errors().count())]
    Failed { diagnostics: Diagnostics },

    #[error("no fixed point reached after {rounds} rounds")]
    RoundLimit { rounds: usize },

    #[error(transparent)]
    Symbols(#[from] MergeError),
}

/// Everything a finished session produced.
#[derive(Debug)]
pub struct SessionOutput {
    /// Rounds run, the final empty round included.
    pub rounds: usize,
    /// Source and generated files; usable as a prior result elsewhere.
    pub unit: CompilationUnit,
    /// Generated files, in creation order.
    pub generated: Vec<FileId>,
    /// Warnings recorded along the way.
    pub diagnostics: Diagnostics,
}

pub struct Session {
    table: SymbolTable,
    context: Context,
    config: SessionConfig,
}

impl Session {
    pub fn new(options: ProcessorOptions, config: SessionConfig) -> Self {
        Self {
            table: SymbolTable::new(),
            context: Context::new(options),
            config,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.processor_options(), config.session.clone())
    }

    /// Makes a prior compilation result visible to this session.
    pub fn add_dependency(&mut self, unit: CompilationUnit) -> Result<(), SessionError> {
        self.table.add_dependency(unit)?;
        Ok(())
    }

    /// Adds source files to compile.
    pub fn add_sources(&mut self, unit: CompilationUnit) -> Result<(), SessionError> {
        self.table.add_sources(unit)?;
        Ok(())
    }

    /// Runs rounds until a fixed point.
    pub fn run(mut self) -> Result<SessionOutput, SessionError> {
        let mut register = Register::from_context(&self.context);
        let mut codegen = InMemoryCodeGenerator::new();
        let mut diagnostics = Diagnostics::new();
        let mut deferred = Vec::new();
        let mut rounds = 0;

        loop {
            if rounds == self.config.max_rounds {
                return Err(SessionError::RoundLimit { rounds });
            }
            rounds += 1;

            self.table.begin_round(deferred);
            tracing::info!(
                "Round {}: {} new file(s)",
                rounds,
                self.table.newly_introduced_files().len()
            );

            let before = codegen.files().len();
            let mut round = Round {
                number: rounds,
                facts: &self.table,
                codegen: &mut codegen,
                diagnostics: &mut diagnostics,
            };
            deferred = register.run_round(&mut round);

            if diagnostics.has_errors() {
                return Err(SessionError::Failed { diagnostics });
            }

            let generated: Vec<GeneratedFile> = codegen.files()[before..].to_vec();
            let produced = !generated.is_empty();
            for file in generated {
                self.table.add_file(file.into())?;
            }

            if !produced && deferred.is_empty() {
                break;
            }
        }

        tracing::info!(
            "Finished after {} round(s), {} file(s) generated",
            rounds,
            codegen.files().len()
        );

        Ok(SessionOutput {
            rounds,
            unit: self.table.local_unit(),
            generated: codegen.files().iter().map(|file| file.id.clone()).collect(),
            diagnostics,
        })
    }
}
