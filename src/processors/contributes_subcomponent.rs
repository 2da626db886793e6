//! `@ContributesSubcomponent`: subcomponents attached to a parent scope
//! through their nested factory.
//!
//! ```text
//! @ContributesSubcomponent
//! @SingleIn(LoggedInScope::class)
//! interface LoggedInComponent {
//!     @ContributesSubcomponent.Factory(AppScope::class)
//!     interface Factory {
//!         fun create(user: User): LoggedInComponent
//!     }
//! }
//! ```
//!
//! Only the factory is contributed here. The concrete component is generated
//! later, once per parent, when the parent's merge is finalized.

use std::collections::BTreeSet;

use crate::codegen::GeneratedFile;
use crate::context::Context;
use crate::di::FromContext;
use crate::error::MergeError;
use crate::names;
use crate::scope::{Scope, ScopeParser};
use crate::symbols::{
    AnnotationUsage, Declaration, DeclarationKind, Function, QualifiedName, SymbolFacts,
};

use super::{lookup_declaration, require_public, Round, SymbolProcessor};

/// A validated subcomponent together with its single factory.
#[derive(Debug, Clone)]
pub struct SubcomponentShape<'a> {
    pub subcomponent: &'a Declaration,
    pub factory: &'a Declaration,
    /// The factory's single abstract function.
    pub function: &'a Function,
    /// Runtime scope of the subcomponent; its own contributions merge here.
    pub scope: Scope,
}

impl<'a> SubcomponentShape<'a> {
    /// Validates a `@ContributesSubcomponent` declaration and its factory.
    pub fn of_subcomponent(
        facts: &'a dyn SymbolFacts,
        subcomponent: &'a Declaration,
    ) -> Result<Self, MergeError> {
        require_public(subcomponent)?;
        let is_abstract_class =
            subcomponent.kind == DeclarationKind::Class && subcomponent.is_abstract;
        if !subcomponent.is_interface() && !is_abstract_class {
            return Err(MergeError::NotInterfaceOrAbstract {
                declaration: subcomponent.name.clone(),
            });
        }

        let scope = ScopeParser::new(facts).resolve(subcomponent)?;

        let factories: Vec<&Declaration> = facts
            .nested_declarations(&subcomponent.name)
            .into_iter()
            .filter(|nested| nested.has_annotation(names::CONTRIBUTES_SUBCOMPONENT_FACTORY))
            .collect();
        let factory = match factories.as_slice() {
            [] => {
                return Err(MergeError::MissingFactory {
                    subcomponent: subcomponent.name.clone(),
                })
            }
            [factory] => *factory,
            _ => {
                return Err(MergeError::MultipleFactories {
                    subcomponent: subcomponent.name.clone(),
                    factories: factories.iter().map(|factory| factory.name.clone()).collect(),
                })
            }
        };

        let function = validate_factory(subcomponent, factory)?;

        Ok(Self {
            subcomponent,
            factory,
            function,
            scope,
        })
    }

    /// Walks from a factory back to its enclosing subcomponent and validates both.
    pub fn of_factory(
        facts: &'a dyn SymbolFacts,
        factory: &'a Declaration,
    ) -> Result<Self, MergeError> {
        let subcomponent = enclosing_subcomponent(facts, factory)?;
        let shape = Self::of_subcomponent(facts, subcomponent)?;
        if shape.factory.name != factory.name {
            return Err(MergeError::MultipleFactories {
                subcomponent: subcomponent.name.clone(),
                factories: vec![shape.factory.name.clone(), factory.name.clone()],
            });
        }
        Ok(shape)
    }

    /// The subcomponent's scope-marker usage, copied onto generated components.
    pub fn scope_annotation(&self) -> Option<&'a AnnotationUsage> {
        let marker = self.scope.marker_annotation()?;
        self.subcomponent.annotation(marker.as_str())
    }
}

fn enclosing_subcomponent<'a>(
    facts: &'a dyn SymbolFacts,
    factory: &Declaration,
) -> Result<&'a Declaration, MergeError> {
    factory
        .parent
        .as_ref()
        .and_then(|parent| facts.declaration(parent))
        .filter(|parent| parent.has_annotation(names::CONTRIBUTES_SUBCOMPONENT))
        .ok_or_else(|| MergeError::FactoryNotNested {
            factory: factory.name.clone(),
        })
}

fn validate_factory<'a>(
    subcomponent: &Declaration,
    factory: &'a Declaration,
) -> Result<&'a Function, MergeError> {
    require_public(factory)?;
    if !factory.is_interface() {
        return Err(MergeError::NotInterface {
            declaration: factory.name.clone(),
            annotation: QualifiedName::new(names::CONTRIBUTES_SUBCOMPONENT_FACTORY),
        });
    }

    let functions: Vec<&Function> = factory.abstract_functions().collect();
    let [function] = functions.as_slice() else {
        return Err(MergeError::FactoryFunctionCount {
            factory: factory.name.clone(),
            count: functions.len(),
        });
    };

    if function.return_type.as_ref() != Some(&subcomponent.name) {
        return Err(MergeError::FactoryReturnType {
            factory: factory.name.clone(),
            expected: subcomponent.name.clone(),
            actual: function.return_type.clone(),
        });
    }

    Ok(*function)
}

/// Validates subcomponents and contributes their factories to the parent scope.
#[derive(FromContext, Clone)]
pub struct ContributesSubcomponentProcessor {
    #[from_context(default)]
    seen: BTreeSet<QualifiedName>,
}

impl ContributesSubcomponentProcessor {
    pub const ID: &'static str = "scopeweave.ContributesSubcomponentProcessor";

    /// Validates `subcomponent` and builds the lookup for its factory.
    pub(crate) fn generate(
        facts: &dyn SymbolFacts,
        subcomponent: &Declaration,
    ) -> Result<Declaration, MergeError> {
        let shape = SubcomponentShape::of_subcomponent(facts, subcomponent)?;
        let parent_scope = ScopeParser::new(facts).resolve(shape.factory)?;

        Ok(lookup_declaration(
            &names::flatten(&shape.factory.name),
            shape.factory,
            &parent_scope,
        )
        .extends(shape.factory.name.clone())
        .annotated(AnnotationUsage::new(names::SUBCOMPONENT_FACTORY_MARKER)))
    }
}

impl SymbolProcessor for ContributesSubcomponentProcessor {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn process(&mut self, round: &mut Round<'_>) -> Vec<QualifiedName> {
        let facts = round.facts;

        let subcomponents =
            facts.declarations_with_annotation(&QualifiedName::new(names::CONTRIBUTES_SUBCOMPONENT));
        for subcomponent in subcomponents {
            if !self.seen.insert(subcomponent.name.clone()) {
                continue;
            }
            let result = Self::generate(facts, subcomponent);
            if let Some(lookup) = round.diagnostics.report(result) {
                tracing::debug!("Contributed factory of {} as {}", subcomponent.name, lookup.name);
                round.emit(GeneratedFile::single(lookup));
            }
        }

        // Factories are checked through their subcomponent; only stray ones remain.
        let factories = facts.declarations_with_annotation(&QualifiedName::new(
            names::CONTRIBUTES_SUBCOMPONENT_FACTORY,
        ));
        for factory in factories {
            if !self.seen.insert(factory.name.clone()) {
                continue;
            }
            round
                .diagnostics
                .report(enclosing_subcomponent(facts, factory));
        }

        Vec::new()
    }
}
