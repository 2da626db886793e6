//! Final components for contributed subcomponents.
//!
//! For every subcomponent factory merged into a parent, a concrete component
//! is generated under the parent's name:
//!
//! ```text
//! // parent: com.app.AppComponent
//! @Component @SingleIn(LoggedInScope::class)
//! abstract class AppComponent.LoggedInComponentFinal(
//!     @Component val parentComponent: AppComponent,
//!     @Provides val user: User,
//! ) : LoggedInComponent, AppComponent.LoggedInComponentFinalMerged {
//!     interface Factory : LoggedInComponent.Factory {
//!         override fun create(user: User): LoggedInComponent =
//!             LoggedInComponentFinal(this as AppComponent, user)
//!     }
//! }
//!
//! interface AppComponent.LoggedInComponentFinalMerged : <LoggedInScope lookups>
//! ```
//!
//! The parent's aggregate extends `LoggedInComponentFinal.Factory`. The
//! subcomponent's own merge recurses with the final component as parent, so
//! names carry the full lineage and each (subcomponent, parent) pair is
//! generated once.

use std::collections::BTreeSet;

use crate::error::MergeError;
use crate::names;
use crate::processors::SubcomponentShape;
use crate::symbols::{
    AnnotationUsage, Declaration, DeclarationKind, Function, FunctionBody, Parameter,
    QualifiedName, SymbolFacts,
};

use super::resolver::{is_subcomponent_lookup, ScopeResolver};

const PARENT_PARAMETER: &str = "parentComponent";

/// Output of finalizing the subcomponents merged into one parent.
#[derive(Debug, Default)]
pub struct FinalComponents {
    /// Generated factory implementations, for the parent's aggregate to extend.
    pub factories: Vec<QualifiedName>,
    /// Every generated declaration, nested chains included.
    pub declarations: Vec<Declaration>,
}

pub struct SubcomponentFinalizer<'a> {
    facts: &'a dyn SymbolFacts,
    resolver: ScopeResolver<'a>,
    /// Package of the top-level merge request; generated names live under it.
    package: String,
}

impl<'a> SubcomponentFinalizer<'a> {
    pub fn new(facts: &'a dyn SymbolFacts, package: &str) -> Self {
        Self {
            facts,
            resolver: ScopeResolver::new(facts),
            package: package.to_string(),
        }
    }

    /// Finalizes every subcomponent lookup in `contributions` for `parent`.
    ///
    /// `lineage` lists the subcomponents already being finalized above
    /// `parent`; meeting one of them again is a cycle.
    pub fn generate_final_components(
        &self,
        parent: &QualifiedName,
        contributions: &[&'a Declaration],
        lineage: &[QualifiedName],
    ) -> Result<FinalComponents, MergeError> {
        let mut output = FinalComponents::default();

        let subcomponents = contributions
            .iter()
            .copied()
            .filter(|lookup| is_subcomponent_lookup(lookup));
        for lookup in subcomponents {
            let shape = self.shape_of(lookup)?;
            let factory = self.finalize(parent, &shape, lineage, &mut output.declarations)?;
            output.factories.push(factory);
        }

        Ok(output)
    }

    fn shape_of(&self, lookup: &'a Declaration) -> Result<SubcomponentShape<'a>, MergeError> {
        let chain = self.resolver.origin_chain(lookup);
        let factory = match chain.last() {
            Some(factory) if !is_subcomponent_lookup(factory) => *factory,
            _ => {
                let missing = lookup.origin.clone().unwrap_or_else(|| lookup.name.clone());
                return Err(MergeError::UnknownDeclaration(missing));
            }
        };
        SubcomponentShape::of_factory(self.facts, factory)
    }

    /// Generates the final component of `shape` under `parent`; returns the
    /// name of its factory implementation.
    fn finalize(
        &self,
        parent: &QualifiedName,
        shape: &SubcomponentShape<'a>,
        lineage: &[QualifiedName],
        declarations: &mut Vec<Declaration>,
    ) -> Result<QualifiedName, MergeError> {
        let subcomponent = &shape.subcomponent.name;
        let mut lineage = lineage.to_vec();
        let revisited = lineage.contains(subcomponent);
        lineage.push(subcomponent.clone());
        if revisited {
            return Err(MergeError::SubcomponentCycle {
                subcomponent: subcomponent.clone(),
                lineage,
            });
        }

        let final_name = parent.child(&format!(
            "{}{}",
            shape.subcomponent.joined_simple_name(),
            names::FINAL_SUFFIX
        ));
        let merged_name = final_name.with_suffix(names::MERGED_SUFFIX);
        let factory_name = final_name.child("Factory");

        // The subcomponent's own merge, with the final component as parent.
        let contributions = self.resolver.resolve(&shape.scope, &BTreeSet::new());
        let nested = self.generate_final_components(&final_name, &contributions, &lineage)?;

        tracing::debug!(
            "Finalizing {} under {} with {} contributions",
            subcomponent,
            parent,
            contributions.len()
        );

        let component = self
            .final_component(parent, shape, &final_name)
            .extends(subcomponent.clone())
            .extends(merged_name.clone());

        let factory = self.factory_implementation(parent, shape, &final_name, &factory_name);

        let mut merged = self.nested(DeclarationKind::Interface, parent, &merged_name);
        merged.supertypes = contributions
            .iter()
            .map(|lookup| lookup.name.clone())
            .chain(nested.factories)
            .collect();

        declarations.push(component);
        declarations.push(factory);
        declarations.push(merged);
        declarations.extend(nested.declarations);

        Ok(factory_name)
    }

    fn final_component(
        &self,
        parent: &QualifiedName,
        shape: &SubcomponentShape<'a>,
        final_name: &QualifiedName,
    ) -> Declaration {
        let mut component = self
            .nested(DeclarationKind::Class, parent, final_name)
            .abstract_type()
            .annotated(AnnotationUsage::new(names::COMPONENT))
            .with_origin(shape.subcomponent.name.clone())
            .with_constructor_parameter(
                Parameter::new(PARENT_PARAMETER, parent.clone())
                    .annotated(AnnotationUsage::new(names::COMPONENT)),
            );

        if let Some(scope) = shape.scope_annotation() {
            component = component.annotated(scope.clone());
        }

        for parameter in &shape.function.parameters {
            component = component.with_constructor_parameter(
                parameter
                    .clone()
                    .annotated(AnnotationUsage::new(names::PROVIDES)),
            );
        }

        component
    }

    fn factory_implementation(
        &self,
        parent: &QualifiedName,
        shape: &SubcomponentShape<'a>,
        final_name: &QualifiedName,
        factory_name: &QualifiedName,
    ) -> Declaration {
        let function = shape.function;
        let create = Function {
            name: function.name.clone(),
            parameters: function.parameters.clone(),
            return_type: function.return_type.clone(),
            is_abstract: false,
            annotations: Vec::new(),
            body: Some(FunctionBody::CreateComponent {
                component: final_name.clone(),
                parent: parent.clone(),
                arguments: function
                    .parameters
                    .iter()
                    .map(|parameter| parameter.name.clone())
                    .collect(),
            }),
        };

        self.nested(DeclarationKind::Interface, final_name, factory_name)
            .extends(shape.factory.name.clone())
            .with_function(create)
    }

    fn nested(
        &self,
        kind: DeclarationKind,
        parent: &QualifiedName,
        name: &QualifiedName,
    ) -> Declaration {
        let mut declaration = Declaration::new(kind, &self.package, name.simple_name());
        declaration.name = name.clone();
        declaration.parent = Some(parent.clone());
        declaration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::ContributesSubcomponentProcessor;
    use crate::scope::Scope;
    use crate::symbols::{AnnotationValue, SourceFile, SymbolTable};

    fn single_in(scope: &str) -> AnnotationUsage {
        AnnotationUsage::new(names::SINGLE_IN)
            .with_argument("scope", AnnotationValue::Type(scope.into()))
    }

    /// A subcomponent in `scope` whose factory is contributed to `parent_scope`.
    fn subcomponent(simple: &str, scope: &str, parent_scope: &str) -> Vec<Declaration> {
        let sub = Declaration::new(DeclarationKind::Interface, "com.app", simple)
            .annotated(AnnotationUsage::new(names::CONTRIBUTES_SUBCOMPONENT))
            .annotated(single_in(scope));
        let factory = Declaration::nested(DeclarationKind::Interface, &sub, "Factory")
            .annotated(
                AnnotationUsage::new(names::CONTRIBUTES_SUBCOMPONENT_FACTORY)
                    .with_argument("scope", AnnotationValue::Type(parent_scope.into())),
            )
            .with_function(
                Function::new("create")
                    .abstract_fn()
                    .with_parameter(Parameter::new("user", "com.app.User"))
                    .returning(sub.name.clone()),
            );
        vec![sub, factory]
    }

    /// A table holding `subcomponents` and the factory lookups generated for them.
    fn table(subcomponents: Vec<Vec<Declaration>>) -> SymbolTable {
        let mut table = SymbolTable::new();
        for (index, declarations) in subcomponents.into_iter().enumerate() {
            table
                .add_file(SourceFile::new(format!("sub{index}.kt"), declarations))
                .unwrap();
        }
        table.begin_round([]);

        let subs: Vec<Declaration> = table
            .declarations_with_annotation(&names::CONTRIBUTES_SUBCOMPONENT.into())
            .into_iter()
            .cloned()
            .collect();
        let lookups: Vec<Declaration> = subs
            .iter()
            .map(|sub| ContributesSubcomponentProcessor::generate(&table, sub).unwrap())
            .collect();
        table
            .add_file(SourceFile::new("lookups", lookups))
            .unwrap();
        table.begin_round([]);
        table
    }

    fn app_scope() -> Scope {
        Scope::from_argument("com.app.AppScope".into(), names::MERGE_COMPONENT.into())
    }

    #[test]
    fn test_final_component_shape() {
        let table = table(vec![subcomponent(
            "LoggedIn",
            "com.app.LoggedInScope",
            "com.app.AppScope",
        )]);
        let resolver = ScopeResolver::new(&table);
        let finalizer = SubcomponentFinalizer::new(&table, "com.app");
        let parent = QualifiedName::new("com.app.AppComponent");

        let contributions = resolver.resolve(&app_scope(), &BTreeSet::new());
        let finals = finalizer
            .generate_final_components(&parent, &contributions, &[])
            .unwrap();

        assert_eq!(
            finals.factories,
            vec![QualifiedName::new("com.app.AppComponent.LoggedInFinal.Factory")]
        );

        let component = &finals.declarations[0];
        assert_eq!(component.name.as_str(), "com.app.AppComponent.LoggedInFinal");
        assert_eq!(component.parent, Some(parent.clone()));
        assert!(component.has_annotation(names::COMPONENT));
        assert!(component.has_annotation(names::SINGLE_IN));
        assert_eq!(
            component.supertypes,
            vec![
                QualifiedName::new("com.app.LoggedIn"),
                QualifiedName::new("com.app.AppComponent.LoggedInFinalMerged"),
            ]
        );
        assert_eq!(component.constructor[0].type_name, parent);
        assert_eq!(component.constructor[1].name, "user");
        assert!(component.constructor[1]
            .annotations
            .iter()
            .any(|usage| usage.is(names::PROVIDES)));

        let factory = &finals.declarations[1];
        assert_eq!(factory.supertypes, vec![QualifiedName::new("com.app.LoggedIn.Factory")]);
        assert_eq!(
            factory.functions[0].body,
            Some(FunctionBody::CreateComponent {
                component: "com.app.AppComponent.LoggedInFinal".into(),
                parent: parent.clone(),
                arguments: vec!["user".to_string()],
            })
        );
    }

    #[test]
    fn test_chain_of_three() {
        let table = table(vec![
            subcomponent("A", "com.app.AScope", "com.app.AppScope"),
            subcomponent("B", "com.app.BScope", "com.app.AScope"),
            subcomponent("C", "com.app.CScope", "com.app.BScope"),
        ]);
        let resolver = ScopeResolver::new(&table);
        let finalizer = SubcomponentFinalizer::new(&table, "com.app");

        let contributions = resolver.resolve(&app_scope(), &BTreeSet::new());
        let finals = finalizer
            .generate_final_components(&"com.app.AppComponent".into(), &contributions, &[])
            .unwrap();

        let components: Vec<&Declaration> = finals
            .declarations
            .iter()
            .filter(|decl| decl.kind == DeclarationKind::Class)
            .collect();
        let names: Vec<&str> = components.iter().map(|decl| decl.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "com.app.AppComponent.AFinal",
                "com.app.AppComponent.AFinal.BFinal",
                "com.app.AppComponent.AFinal.BFinal.CFinal",
            ]
        );

        let parents: Vec<&str> = components
            .iter()
            .map(|decl| decl.constructor[0].type_name.as_str())
            .collect();
        assert_eq!(
            parents,
            vec![
                "com.app.AppComponent",
                "com.app.AppComponent.AFinal",
                "com.app.AppComponent.AFinal.BFinal",
            ]
        );

        let b_merged = finals
            .declarations
            .iter()
            .find(|decl| decl.name == "com.app.AppComponent.AFinal.BFinalMerged")
            .unwrap();
        assert!(b_merged
            .supertypes
            .contains(&"com.app.AppComponent.AFinal.BFinal.CFinal.Factory".into()));
    }

    #[test]
    fn test_cycle_is_reported() {
        let table = table(vec![
            subcomponent("A", "com.app.AScope", "com.app.AppScope"),
            subcomponent("B", "com.app.BScope", "com.app.AScope"),
            subcomponent("C", "com.app.AScope", "com.app.BScope"),
        ]);
        let resolver = ScopeResolver::new(&table);
        let finalizer = SubcomponentFinalizer::new(&table, "com.app");

        let contributions = resolver.resolve(&app_scope(), &BTreeSet::new());
        let err = finalizer
            .generate_final_components(&"com.app.AppComponent".into(), &contributions, &[])
            .unwrap_err();

        assert!(matches!(
            err,
            MergeError::SubcomponentCycle { subcomponent, .. } if subcomponent == "com.app.B"
        ));
    }
}
