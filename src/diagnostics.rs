//! Compiler-level diagnostics attached to source symbols.

use std::fmt;

use serde::Serialize;

use crate::error::MergeError;
use crate::symbols::QualifiedName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// A message reported at a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<QualifiedName>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "w",
            Severity::Error => "e",
        };
        match &self.symbol {
            Some(symbol) => write!(f, "{level}: [{symbol}] {}", self.message),
            None => write!(f, "{level}: {}", self.message),
        }
    }
}

/// Diagnostics collected during a session. Any error fails the build.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `err` at the declaration it names.
    pub fn error(&mut self, err: MergeError) {
        tracing::error!(symbol = ?err.symbol(), "{}", err);
        self.entries.push(Diagnostic {
            severity: Severity::Error,
            message: err.to_string(),
            symbol: err.symbol().cloned(),
        });
    }

    pub fn warn(&mut self, message: impl Into<String>, symbol: Option<&QualifiedName>) {
        let message = message.into();
        tracing::warn!(symbol = ?symbol, "{}", message);
        self.entries.push(Diagnostic {
            severity: Severity::Warning,
            message,
            symbol: symbol.cloned(),
        });
    }

    /// Records the error of `result`, if any, and passes the value through.
    pub fn report<T>(&mut self, result: Result<T, MergeError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.error(err);
                None
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|entry| entry.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|entry| entry.severity == Severity::Warning)
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_records_errors_at_symbol() {
        let mut diagnostics = Diagnostics::new();
        let value = diagnostics.report::<()>(Err(MergeError::NotPublic {
            declaration: "com.app.Hidden".into(),
        }));

        assert!(value.is_none());
        assert!(diagnostics.has_errors());
        let error = diagnostics.errors().next().unwrap();
        assert_eq!(error.symbol.as_ref().map(QualifiedName::as_str), Some("com.app.Hidden"));
        assert_eq!(
            error.to_string(),
            "e: [com.app.Hidden] com.app.Hidden must be public to be contributed"
        );
    }

    #[test]
    fn test_warnings_do_not_fail() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warn("legacy parameter ignored", None);

        assert!(!diagnostics.has_errors());
        assert_eq!(diagnostics.warnings().count(), 1);
    }
}
