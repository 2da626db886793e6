//! In-memory symbol table implementing [`SymbolFacts`].
//!
//! Stands in for the host compiler: it holds the files of the current
//! compilation, the prior compilation results it depends on, and the
//! per-round view (files new this round, symbols re-delivered after being
//! deferred).

use std::collections::{BTreeMap, BTreeSet};

use super::{
    builtins, CompilationUnit, Declaration, FileId, QualifiedName, SourceFile, SymbolFacts,
};
use crate::error::MergeError;

#[derive(Debug, Default)]
pub struct SymbolTable {
    declarations: BTreeMap<QualifiedName, Declaration>,
    files: BTreeMap<FileId, Vec<QualifiedName>>,
    nested: BTreeMap<QualifiedName, Vec<QualifiedName>>,
    /// Files of the current compilation, in the order they were added.
    local_files: Vec<FileId>,
    /// Files added since the last round started.
    incoming: BTreeSet<FileId>,
    new_files: BTreeSet<FileId>,
    redelivered: BTreeSet<QualifiedName>,
}

impl SymbolTable {
    /// A table that already sees the built-in annotation declarations.
    pub fn new() -> Self {
        let mut table = Self::default();
        for file in builtins::builtin_unit().files {
            table.store_file(file, false);
        }
        table
    }

    /// Adds a prior compilation result. Its declarations are visible but
    /// never delivered as symbols of this compilation.
    pub fn add_dependency(&mut self, unit: CompilationUnit) -> Result<(), MergeError> {
        self.insert_unit(unit, false)
    }

    /// Adds a file of the current compilation; it is new in the next round.
    pub fn add_file(&mut self, file: SourceFile) -> Result<(), MergeError> {
        self.insert_file(file, true)
    }

    /// Adds every file of `unit` to the current compilation.
    pub fn add_sources(&mut self, unit: CompilationUnit) -> Result<(), MergeError> {
        self.insert_unit(unit, true)
    }

    /// Starts a round: files added since the previous round become the
    /// newly introduced set and `deferred` symbols are delivered again.
    pub fn begin_round(&mut self, deferred: impl IntoIterator<Item = QualifiedName>) {
        self.new_files = std::mem::take(&mut self.incoming);
        self.redelivered = deferred.into_iter().collect();
    }

    /// The current compilation's files, sources and generated output alike.
    pub fn local_unit(&self) -> CompilationUnit {
        let files = self
            .local_files
            .iter()
            .map(|id| SourceFile {
                id: id.clone(),
                declarations: self.file_declarations(id).cloned().collect(),
            })
            .collect();
        CompilationUnit::new(files)
    }

    fn insert_unit(&mut self, unit: CompilationUnit, local: bool) -> Result<(), MergeError> {
        for file in unit.files {
            self.insert_file(file, local)?;
        }
        Ok(())
    }

    fn insert_file(&mut self, file: SourceFile, local: bool) -> Result<(), MergeError> {
        if self.files.contains_key(&file.id) {
            return Err(MergeError::FileAlreadyExists(file.id));
        }
        if let Some(duplicate) = file
            .declarations
            .iter()
            .find(|decl| self.declarations.contains_key(&decl.name))
        {
            return Err(MergeError::DuplicateDeclaration(duplicate.name.clone()));
        }
        self.store_file(file, local);
        Ok(())
    }

    fn store_file(&mut self, file: SourceFile, local: bool) {
        let mut names = Vec::with_capacity(file.declarations.len());
        for decl in file.declarations {
            if let Some(parent) = &decl.parent {
                self.nested
                    .entry(parent.clone())
                    .or_default()
                    .push(decl.name.clone());
            }
            names.push(decl.name.clone());
            self.declarations.insert(decl.name.clone(), decl);
        }

        if local {
            self.local_files.push(file.id.clone());
            self.incoming.insert(file.id.clone());
        }
        self.files.insert(file.id, names);
    }

    fn file_declarations<'a>(&'a self, id: &FileId) -> impl Iterator<Item = &'a Declaration> + 'a {
        self.files
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|name| self.declarations.get(name))
    }

    fn is_delivered(&self, file: &FileId, decl: &Declaration) -> bool {
        self.new_files.contains(file) || self.redelivered.contains(&decl.name)
    }
}

impl SymbolFacts for SymbolTable {
    fn declaration(&self, name: &QualifiedName) -> Option<&Declaration> {
        self.declarations.get(name)
    }

    fn declarations_with_annotation(&self, annotation: &QualifiedName) -> Vec<&Declaration> {
        self.local_files
            .iter()
            .flat_map(|file| {
                self.file_declarations(file)
                    .filter(move |decl| self.is_delivered(file, decl))
            })
            .filter(|decl| decl.has_annotation(annotation.as_str()))
            .collect()
    }

    fn declarations_in_namespace(&self, namespace: &str) -> Vec<&Declaration> {
        self.declarations
            .values()
            .filter(|decl| decl.package == namespace && decl.parent.is_none())
            .collect()
    }

    fn nested_declarations(&self, parent: &QualifiedName) -> Vec<&Declaration> {
        self.nested
            .get(parent)
            .into_iter()
            .flatten()
            .filter_map(|name| self.declarations.get(name))
            .collect()
    }

    fn newly_introduced_files(&self) -> Vec<&FileId> {
        self.new_files.iter().collect()
    }

    fn declarations_in_file(&self, file: &FileId) -> Vec<&Declaration> {
        self.file_declarations(file).collect()
    }
}
