//! Scope subcommand - resolve the scope of one declaration.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::eyre;

use super::read_unit;
use crate::scope::ScopeParser;
use crate::symbols::{QualifiedName, SymbolFacts, SymbolTable};

/// Print the scope a declaration contributes or merges to.
#[derive(Parser)]
pub struct ScopeCommand {
    /// JSON compilation unit containing the declaration.
    pub input: PathBuf,

    /// Qualified name of the declaration.
    pub declaration: String,

    /// Prior compilation results, e.g. defining scope markers.
    #[arg(short, long = "dependency")]
    pub dependencies: Vec<PathBuf>,
}

impl ScopeCommand {
    /// Run the scope command.
    pub fn run(self) -> color_eyre::Result<()> {
        let mut table = SymbolTable::new();
        for path in &self.dependencies {
            table.add_dependency(read_unit(path)?)?;
        }
        table.add_sources(read_unit(&self.input)?)?;

        let name = QualifiedName::new(self.declaration);
        let declaration = table
            .declaration(&name)
            .ok_or_else(|| eyre!("declaration not found: {name}"))?;

        let scope = ScopeParser::new(&table).resolve(declaration)?;
        println!("{scope}");
        Ok(())
    }
}
