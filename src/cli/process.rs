//! Process subcommand - run a session over JSON compilation units.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::eyre;

use super::read_unit;
use crate::config::Config;
use crate::session::{Session, SessionError};

/// Run every processor over the given sources.
#[derive(Parser)]
pub struct ProcessCommand {
    /// JSON compilation units of the current compilation.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Prior compilation results visible to this compilation.
    #[arg(short, long = "dependency")]
    pub dependencies: Vec<PathBuf>,

    /// Where to write the resulting compilation unit (stdout when absent).
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Processor option as key=value; repeatable.
    #[arg(short = 'o', long = "option", value_parser = parse_option)]
    pub options: Vec<(String, String)>,
}

impl ProcessCommand {
    /// Run the process command.
    pub fn run(self) -> color_eyre::Result<()> {
        let overrides: BTreeMap<String, String> = self.options.into_iter().collect();
        let config = Config::load_with_options(&overrides)?;

        let mut session = Session::from_config(&config);
        for path in &self.dependencies {
            session.add_dependency(read_unit(path)?)?;
        }
        for path in &self.inputs {
            session.add_sources(read_unit(path)?)?;
        }

        let output = match session.run() {
            Ok(output) => output,
            Err(SessionError::Failed { diagnostics }) => {
                for diagnostic in diagnostics.entries() {
                    eprintln!("{diagnostic}");
                }
                return Err(eyre!(
                    "processing failed with {} error(s)",
                    diagnostics.errors().count()
                ));
            }
            Err(err) => return Err(err.into()),
        };

        for warning in output.diagnostics.warnings() {
            eprintln!("{warning}");
        }
        tracing::info!(
            "Generated {} file(s) in {} round(s)",
            output.generated.len(),
            output.rounds
        );

        let json = serde_json::to_string_pretty(&output.unit)?;
        match self.output {
            Some(path) => fs::write(&path, json)?,
            None => println!("{json}"),
        }
        Ok(())
    }
}

/// Parses a `key=value` processor option.
pub fn parse_option(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing option name in '{raw}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
