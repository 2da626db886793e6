//! Shared state processors are wired from.

use std::sync::Arc;

use crate::config::ProcessorOptions;
use crate::di::Context as ContextDerive;
use crate::merge::ProcessedSet;

/// Root wiring context for one host compilation session.
///
/// `#[derive(Context)]` generates a `FromRef` implementation per field, so
/// processors deriving `FromContext` pick up exactly what they need.
#[derive(ContextDerive, Clone)]
pub struct Context {
    /// Parsed processor options.
    pub options: Arc<ProcessorOptions>,
    /// Merge requests already finalized in this session.
    pub processed: ProcessedSet,
}

impl Context {
    /// A context with a fresh processed set.
    pub fn new(options: ProcessorOptions) -> Self {
        Self {
            options: Arc::new(options),
            processed: ProcessedSet::default(),
        }
    }
}
