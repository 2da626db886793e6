//! Output side of the processors.
//!
//! Rendering declarations to source text belongs to the host backend; the
//! processors only hand over structured [`GeneratedFile`]s.

use std::collections::BTreeSet;

use crate::error::MergeError;
use crate::symbols::{Declaration, FileId, SourceFile};

/// One generated file: a primary declaration plus anything nested in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub id: FileId,
    pub declarations: Vec<Declaration>,
}

impl GeneratedFile {
    /// A file named after its first declaration.
    pub fn for_declarations(declarations: Vec<Declaration>) -> Option<Self> {
        let primary = declarations.first()?;
        Some(Self {
            id: FileId::generated(&primary.name),
            declarations,
        })
    }

    pub fn single(declaration: Declaration) -> Self {
        Self {
            id: FileId::generated(&declaration.name),
            declarations: vec![declaration],
        }
    }
}

impl From<GeneratedFile> for SourceFile {
    fn from(file: GeneratedFile) -> Self {
        SourceFile {
            id: file.id,
            declarations: file.declarations,
        }
    }
}

/// Sink for generated files. File identities are write-once.
pub trait CodeGenerator {
    fn create_file(&mut self, file: GeneratedFile) -> Result<(), MergeError>;
}

/// Collects generated files in memory, in creation order.
#[derive(Debug, Default)]
pub struct InMemoryCodeGenerator {
    files: Vec<GeneratedFile>,
    ids: BTreeSet<FileId>,
}

impl InMemoryCodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[GeneratedFile] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl CodeGenerator for InMemoryCodeGenerator {
    fn create_file(&mut self, file: GeneratedFile) -> Result<(), MergeError> {
        if self.ids.contains(&file.id) {
            return Err(MergeError::FileAlreadyExists(file.id));
        }
        tracing::debug!(file = %file.id, declarations = file.declarations.len(), "Generated file");
        self.ids.insert(file.id.clone());
        self.files.push(file);
        Ok(())
    }
}
