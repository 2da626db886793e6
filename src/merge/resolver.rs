//! Scope matching and exclusion over lookup declarations.

use std::collections::BTreeSet;

use crate::names;
use crate::scope::{Scope, ScopeParser};
use crate::symbols::{AnnotationValue, Declaration, QualifiedName, SymbolFacts};

/// True for generated lookup declarations, local or from prior compilations.
pub fn is_lookup(declaration: &Declaration) -> bool {
    declaration.package == names::LOOKUP_NAMESPACE
        && declaration.has_annotation(names::CONTRIBUTION_SCOPE)
}

/// True for lookups contributing a subcomponent factory.
pub fn is_subcomponent_lookup(declaration: &Declaration) -> bool {
    is_lookup(declaration) && declaration.has_annotation(names::SUBCOMPONENT_FACTORY_MARKER)
}

/// Selects the lookups that belong to a merge. Pure over one snapshot.
#[derive(Clone, Copy)]
pub struct ScopeResolver<'a> {
    facts: &'a dyn SymbolFacts,
}

impl<'a> ScopeResolver<'a> {
    pub fn new(facts: &'a dyn SymbolFacts) -> Self {
        Self { facts }
    }

    /// Every visible lookup, sorted by qualified name.
    pub fn lookups(&self) -> Vec<&'a Declaration> {
        let mut lookups: Vec<&'a Declaration> = self
            .facts
            .declarations_in_namespace(names::LOOKUP_NAMESPACE)
            .into_iter()
            .filter(|declaration| is_lookup(declaration))
            .collect();
        lookups.sort_by(|a, b| a.name.cmp(&b.name));
        lookups
    }

    /// `lookup` followed by its origins, for as long as each origin is
    /// itself a lookup. The last element is the first non-lookup origin, or
    /// the last lookup whose origin isn't visible.
    pub fn origin_chain(&self, lookup: &'a Declaration) -> Vec<&'a Declaration> {
        let mut chain = vec![lookup];
        let mut visited = BTreeSet::from([lookup.name.clone()]);
        let mut current = lookup;

        while is_lookup(current) {
            let Some(origin) = current
                .origin
                .as_ref()
                .and_then(|origin| self.facts.declaration(origin))
            else {
                break;
            };
            if !visited.insert(origin.name.clone()) {
                break;
            }
            chain.push(origin);
            current = origin;
        }

        chain
    }

    /// Lookups whose origin chain reaches `scope` and avoids `exclusions`,
    /// sorted by qualified name.
    pub fn resolve(
        &self,
        scope: &Scope,
        exclusions: &BTreeSet<QualifiedName>,
    ) -> Vec<&'a Declaration> {
        self.lookups()
            .into_iter()
            .filter(|lookup| {
                let chain = self.origin_chain(*lookup);
                let in_scope = chain
                    .iter()
                    .any(|node| self.node_scope(node).as_ref() == Some(scope.marker()));
                let excluded = chain.iter().any(|node| exclusions.contains(&node.name))
                    || excluded_subcomponent(&chain, exclusions);
                in_scope && !excluded
            })
            .collect()
    }

    /// Scope recorded on a lookup, or resolved from a user declaration.
    fn node_scope(&self, node: &Declaration) -> Option<QualifiedName> {
        match node.annotation(names::CONTRIBUTION_SCOPE) {
            Some(usage) => self
                .facts
                .argument(usage, names::SCOPE_PARAMETER)
                .and_then(AnnotationValue::as_type)
                .cloned(),
            None => ScopeParser::new(self.facts)
                .try_resolve(node)
                .map(|scope| scope.marker().clone()),
        }
    }
}

/// A subcomponent lookup is also dropped when the subcomponent enclosing its
/// factory is excluded.
fn excluded_subcomponent(chain: &[&Declaration], exclusions: &BTreeSet<QualifiedName>) -> bool {
    let Some(lookup) = chain.first() else {
        return false;
    };
    if !is_subcomponent_lookup(lookup) {
        return false;
    }
    chain
        .last()
        .and_then(|factory| factory.parent.as_ref())
        .is_some_and(|subcomponent| exclusions.contains(subcomponent))
}
