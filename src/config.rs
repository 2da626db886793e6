//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/scopeweave/config.toml` (XDG) or platform config dir
//! 2. Project config: `.scopeweave.toml`
//! 3. Environment variables: `SCOPEWEAVE_*` (`__` separates nested keys)
//! 4. Command line `-o key=value` options
//!
//! # Intended Usage
//!
//! ```toml
//! [options]
//! scopeweave-contributing-annotations = "com.app.ContributesRenderer:com.app.ContributesRobot"
//! "scopeweave.ContributesBindingProcessor" = "disabled"
//! scopeweave-compat-ignore-unsupported-parameters = "true"
//!
//! [session]
//! max_rounds = 50
//! ```
//!
//! The `options` table is the free-form processor options map the host build
//! passes to every processor; [`ProcessorOptions`] is its parsed form.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Deref;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::symbols::QualifiedName;

/// Colon-delimited extra contribution annotations.
pub const CONTRIBUTING_ANNOTATIONS_OPTION: &str = "scopeweave-contributing-annotations";

/// Warn instead of failing on unsupported legacy annotation parameters.
pub const COMPAT_IGNORE_UNSUPPORTED_OPTION: &str =
    "scopeweave-compat-ignore-unsupported-parameters";

/// Value that turns off the processor whose identity is the option key.
pub const DISABLED: &str = "disabled";

const DEFAULT_MAX_ROUNDS: usize = 100;

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Processor options, passed through unchanged like a host options map.
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Limits of the round loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Rounds after which a session that still makes progress is aborted.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
}

fn default_max_rounds() -> usize {
    DEFAULT_MAX_ROUNDS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// Load config and apply command line `key=value` options on top.
    pub fn load_with_options(overrides: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let mut options = BTreeMap::new();
        options.insert("options", overrides.clone());
        Self::from_figment(Self::figment().merge(Serialized::defaults(options)))
    }

    /// The layered figment, before extraction.
    pub fn figment() -> Figment {
        Figment::new()
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(Self::user_config_path()))
            // Layer 2: Project config
            .merge(Toml::file(".scopeweave.toml"))
            // Layer 3: Environment variables (highest priority)
            .merge(Env::prefixed("SCOPEWEAVE_").split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        figment.extract().map_err(ConfigError::from)
    }

    pub fn processor_options(&self) -> ProcessorOptions {
        ProcessorOptions::from_map(&self.options)
    }

    /// User config path: ~/.config/scopeweave/config.toml (XDG) or platform config dir.
    fn user_config_path() -> std::path::PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("scopeweave").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        // Fall back to platform-specific config dir
        dirs::config_dir()
            .map(|p| p.join("scopeweave").join("config.toml"))
            .unwrap_or_default()
    }
}

/// Parsed processor options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessorOptions {
    contributing_annotations: Vec<QualifiedName>,
    disabled: BTreeSet<String>,
    ignore_unsupported_legacy_parameters: bool,
}

impl ProcessorOptions {
    pub fn from_map(options: &BTreeMap<String, String>) -> Self {
        let contributing_annotations = options
            .get(CONTRIBUTING_ANNOTATIONS_OPTION)
            .map(|value| {
                value
                    .split(':')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(QualifiedName::new)
                    .collect()
            })
            .unwrap_or_default();

        let disabled = options
            .iter()
            .filter(|(_, value)| value.trim().eq_ignore_ascii_case(DISABLED))
            .map(|(key, _)| key.clone())
            .collect();

        let ignore_unsupported_legacy_parameters = options
            .get(COMPAT_IGNORE_UNSUPPORTED_OPTION)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"));

        Self {
            contributing_annotations,
            disabled,
            ignore_unsupported_legacy_parameters,
        }
    }

    /// Extra contribution annotations given on the command line or build file.
    pub fn contributing_annotations(&self) -> &[QualifiedName] {
        &self.contributing_annotations
    }

    pub fn is_disabled(&self, processor_id: &str) -> bool {
        self.disabled.contains(processor_id)
    }

    pub fn ignore_unsupported_legacy_parameters(&self) -> bool {
        self.ignore_unsupported_legacy_parameters
    }
}
