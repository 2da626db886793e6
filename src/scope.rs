//! Merge scopes and the scope parser.
//!
//! A scope names the merge domain a declaration contributes to. It comes
//! from one of two places:
//!
//! - an explicit `scope` argument on a contribution annotation, e.g.
//!   `@ContributesTo(scope = AppScope::class)`
//! - a class-level scope marker, i.e. an annotation whose own class is
//!   annotated as a scope (`@SingleIn(AppScope::class)`, `@Singleton`)
//!
//! A declaration resolves to exactly one scope. Explicit scopes must agree
//! with each other and must not restate the class-level marker.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::error::MergeError;
use crate::names;
use crate::symbols::{AnnotationUsage, Declaration, QualifiedName, SymbolFacts};

/// Where a scope value was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScopeSource {
    /// The `scope` argument of a contribution annotation.
    Argument { annotation: QualifiedName },
    /// A class-level scope-marker annotation.
    Marker { annotation: QualifiedName },
}

/// Normalized identity of a merge domain.
///
/// Two scopes are equal when they resolve to the same declared type; the
/// source is kept for diagnostics and does not take part in equality.
#[derive(Debug, Clone, Serialize)]
pub struct Scope {
    marker: QualifiedName,
    source: ScopeSource,
}

impl Scope {
    pub fn from_argument(marker: QualifiedName, annotation: QualifiedName) -> Self {
        Self {
            marker,
            source: ScopeSource::Argument { annotation },
        }
    }

    pub fn from_marker(marker: QualifiedName, annotation: QualifiedName) -> Self {
        Self {
            marker,
            source: ScopeSource::Marker { annotation },
        }
    }

    /// The declared type identifying this scope.
    pub fn marker(&self) -> &QualifiedName {
        &self.marker
    }

    pub fn source(&self) -> &ScopeSource {
        &self.source
    }

    /// True when the scope came from a class-level scope marker.
    pub fn is_class_level(&self) -> bool {
        matches!(self.source, ScopeSource::Marker { .. })
    }

    /// The marker usage to copy onto generated components, if class-level.
    pub fn marker_annotation(&self) -> Option<&QualifiedName> {
        match &self.source {
            ScopeSource::Marker { annotation } => Some(annotation),
            ScopeSource::Argument { .. } => None,
        }
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        self.marker == other.marker
    }
}

impl Eq for Scope {}

impl Hash for Scope {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.marker.hash(state);
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.marker.fmt(f)
    }
}

/// Resolves declarations to their scope against one symbol snapshot.
///
/// Resolution is pure: the same declaration against the same snapshot always
/// yields the same result. It is re-run every round because new declarations
/// (and so new annotation classes) may appear.
#[derive(Clone, Copy)]
pub struct ScopeParser<'a> {
    facts: &'a dyn SymbolFacts,
}

impl<'a> ScopeParser<'a> {
    pub fn new(facts: &'a dyn SymbolFacts) -> Self {
        Self { facts }
    }

    /// Resolves the single scope of `declaration`.
    pub fn resolve(&self, declaration: &Declaration) -> Result<Scope, MergeError> {
        let annotations = self.facts.declaration_annotations(declaration);
        let class_level = self.class_level(declaration, annotations)?;

        let explicit: Vec<&AnnotationUsage> = annotations
            .iter()
            .filter(|usage| self.declares_scope(usage))
            .collect();

        if explicit.is_empty() {
            return class_level.ok_or_else(|| MergeError::MissingScope {
                declaration: declaration.name.clone(),
            });
        }

        let mut given: Vec<Scope> = Vec::new();
        let mut omitted: Vec<QualifiedName> = Vec::new();
        for usage in explicit {
            match self.scope_argument(usage) {
                Some(marker) => given.push(Scope::from_argument(
                    marker.clone(),
                    usage.annotation_type.clone(),
                )),
                None if self.scope_is_optional(usage) => {
                    if !omitted.contains(&usage.annotation_type) {
                        omitted.push(usage.annotation_type.clone());
                    }
                }
                None => {
                    return Err(MergeError::NoScopeArgument {
                        declaration: declaration.name.clone(),
                        annotation: usage.annotation_type.clone(),
                    })
                }
            }
        }

        if given.is_empty() {
            // Every instance omitted its scope: fall back to the class-level marker.
            return class_level.ok_or_else(|| MergeError::MissingScope {
                declaration: declaration.name.clone(),
            });
        }

        let mut distinct = distinct_markers(&given);
        if !omitted.is_empty() || distinct.len() > 1 {
            if let Some(class_level) = &class_level {
                if !distinct.contains(class_level.marker()) {
                    distinct.push(class_level.marker().clone());
                }
            }
            return Err(MergeError::ConflictingScopes {
                declaration: declaration.name.clone(),
                scopes: distinct,
                omitted,
            });
        }

        let explicit = given.swap_remove(0);
        match class_level {
            None => Ok(explicit),
            Some(class_level) if class_level == explicit => {
                Err(MergeError::RedundantExplicitScope {
                    declaration: declaration.name.clone(),
                    scope: explicit.marker,
                })
            }
            Some(class_level) => Err(MergeError::ScopeMismatch {
                declaration: declaration.name.clone(),
                explicit: explicit.marker,
                class_level: class_level.marker,
            }),
        }
    }

    /// Resolves `declaration`, treating any resolution failure as "no scope".
    pub fn try_resolve(&self, declaration: &Declaration) -> Option<Scope> {
        self.resolve(declaration).ok()
    }

    /// The class-level scope of `declaration`: every scope-marker usage must agree.
    fn class_level(
        &self,
        declaration: &Declaration,
        annotations: &[AnnotationUsage],
    ) -> Result<Option<Scope>, MergeError> {
        let markers: Vec<Scope> = annotations
            .iter()
            .filter(|usage| self.facts.is_scope_marker(&usage.annotation_type))
            .map(|usage| self.marker_scope(usage))
            .collect();

        let distinct = distinct_markers(&markers);
        if distinct.len() > 1 {
            return Err(MergeError::ConflictingScopes {
                declaration: declaration.name.clone(),
                scopes: distinct,
                omitted: Vec::new(),
            });
        }
        Ok(markers.into_iter().next())
    }

    /// `@SingleIn(AppScope::class)` is `AppScope`; `@Singleton` is `Singleton`.
    fn marker_scope(&self, usage: &AnnotationUsage) -> Scope {
        let marker = self
            .scope_argument(usage)
            .cloned()
            .unwrap_or_else(|| usage.annotation_type.clone());
        Scope::from_marker(marker, usage.annotation_type.clone())
    }

    /// True for contribution annotations whose class declares a `scope` parameter.
    fn declares_scope(&self, usage: &AnnotationUsage) -> bool {
        !self.facts.is_scope_marker(&usage.annotation_type)
            && self
                .facts
                .annotation_parameter(&usage.annotation_type, names::SCOPE_PARAMETER)
                .is_some()
    }

    fn scope_is_optional(&self, usage: &AnnotationUsage) -> bool {
        self.facts
            .annotation_parameter(&usage.annotation_type, names::SCOPE_PARAMETER)
            .is_some_and(|parameter| parameter.has_default)
    }

    /// The class literal passed as `scope`, by name or by position.
    pub fn scope_argument<'u>(&'u self, usage: &'u AnnotationUsage) -> Option<&'u QualifiedName>
    where
        'a: 'u,
    {
        self.facts
            .argument(usage, names::SCOPE_PARAMETER)
            .and_then(|value| value.as_type())
    }
}

fn distinct_markers(scopes: &[Scope]) -> Vec<QualifiedName> {
    let mut distinct: Vec<QualifiedName> = Vec::new();
    for scope in scopes {
        if !distinct.contains(scope.marker()) {
            distinct.push(scope.marker().clone());
        }
    }
    distinct
}
