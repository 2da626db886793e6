//! CLI module for scopeweave.
//!
//! Subcommands:
//! - `process`: Run a whole processing session over JSON compilation units
//! - `scope`: Print the resolved scope of one declaration

mod process;
mod scope;

use std::fs;
use std::path::Path;

use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;

use crate::symbols::CompilationUnit;

pub use process::ProcessCommand;
pub use scope::ScopeCommand;

/// scopeweave - scope-driven contribution merging
#[derive(Parser)]
#[command(name = "scopeweave")]
#[command(about = "Merge scoped DI contributions into component aggregates")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run all processors over compilation units until a fixed point
    Process(ProcessCommand),

    /// Print the resolved scope of a declaration
    Scope(ScopeCommand),
}

impl App {
    /// Run the CLI application.
    pub fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Process(cmd) => cmd.run(),
            Command::Scope(cmd) => cmd.run(),
        }
    }
}

/// Reads a compilation unit from a JSON file.
fn read_unit(path: &Path) -> color_eyre::Result<CompilationUnit> {
    let content =
        fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content)
        .wrap_err_with(|| format!("{} is not a compilation unit", path.display()))
}
