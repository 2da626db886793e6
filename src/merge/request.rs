//! Merge requests: declarations annotated with `@MergeComponent`.

use std::collections::BTreeSet;

use crate::error::MergeError;
use crate::names;
use crate::scope::{Scope, ScopeParser};
use crate::symbols::{AnnotationValue, Declaration, QualifiedName, SymbolFacts};

/// A parsed `@MergeComponent` declaration.
#[derive(Debug, Clone)]
pub struct MergeRequest<'a> {
    pub declaration: &'a Declaration,
    pub scope: Scope,
    /// Declarations left out of the merge even when their scope matches.
    pub exclusions: BTreeSet<QualifiedName>,
    /// Name of the aggregate interface generated for this request.
    pub aggregate: QualifiedName,
}

impl<'a> MergeRequest<'a> {
    pub fn parse(facts: &dyn SymbolFacts, declaration: &'a Declaration) -> Result<Self, MergeError> {
        let scope = ScopeParser::new(facts).resolve(declaration)?;
        let exclusions = exclusions(facts, declaration);
        let aggregate = aggregate_name(declaration);

        if declaration.has_annotation(names::COMPONENT) {
            require_aggregate_supertype(declaration, &aggregate)?;
        }

        Ok(Self {
            declaration,
            scope,
            exclusions,
            aggregate,
        })
    }

    pub fn name(&self) -> &QualifiedName {
        &self.declaration.name
    }
}

/// `<package>.<SimpleNamesJoined>Merged`.
pub fn aggregate_name(declaration: &Declaration) -> QualifiedName {
    let simple = format!("{}{}", declaration.joined_simple_name(), names::MERGED_SUFFIX);
    if declaration.package.is_empty() {
        QualifiedName::new(simple)
    } else {
        QualifiedName::new(format!("{}.{}", declaration.package, simple))
    }
}

/// The exclusion list, given as `exclude = [...]`, at the `exclude`
/// position, or as the only positional argument.
fn exclusions(facts: &dyn SymbolFacts, declaration: &Declaration) -> BTreeSet<QualifiedName> {
    let Some(usage) = declaration.annotation(names::MERGE_COMPONENT) else {
        return BTreeSet::new();
    };

    let value = facts.argument(usage, names::EXCLUDE_PARAMETER).or_else(|| {
        let mut positional = usage.arguments.iter().filter(|arg| arg.name.is_none());
        match (positional.next(), positional.next()) {
            (Some(only), None) if matches!(only.value, AnnotationValue::Types(_)) => {
                Some(&only.value)
            }
            _ => None,
        }
    });

    value
        .and_then(AnnotationValue::as_types)
        .unwrap_or_default()
        .into_iter()
        .collect()
}

/// A request that also builds the component must list its aggregate as a
/// super type in source, by qualified or simple name.
fn require_aggregate_supertype(
    declaration: &Declaration,
    aggregate: &QualifiedName,
) -> Result<(), MergeError> {
    let declared = declaration.supertypes.iter().any(|supertype| {
        supertype == aggregate || supertype.as_str() == aggregate.simple_name()
    });
    if declared {
        Ok(())
    } else {
        Err(MergeError::SuperTypeNotDeclared {
            declaration: declaration.name.clone(),
            expected: aggregate.clone(),
        })
    }
}
