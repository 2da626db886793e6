//! `@ContributesBinding`: binds an implementation to one of its super types.
//!
//! The annotation is repeatable, so one class can be bound to several super
//! types. Each instance becomes its own lookup with a provider function:
//!
//! ```text
//! @ContributesBinding(AppScope::class)
//! class RealAuthenticator : Authenticator
//!
//! // scopeweave.inject.lookup
//! @ContributionScope(AppScope::class)
//! interface ComAppRealAuthenticatorBindsComAppAuthenticator {
//!     @Provides fun provideRealAuthenticatorAuthenticator(
//!         realAuthenticator: RealAuthenticator,
//!     ): Authenticator = realAuthenticator
//! }
//! ```

use std::collections::BTreeSet;

use crate::codegen::GeneratedFile;
use crate::context::Context;
use crate::di::FromContext;
use crate::error::MergeError;
use crate::names;
use crate::scope::{Scope, ScopeParser};
use crate::symbols::{
    AnnotationUsage, AnnotationValue, Declaration, DeclarationKind, Function, FunctionBody,
    Parameter, QualifiedName, SymbolFacts,
};

use super::{lookup_declaration, require_public, Round, SymbolProcessor};

#[derive(FromContext, Clone)]
pub struct ContributesBindingProcessor {
    #[from_context(default)]
    seen: BTreeSet<QualifiedName>,
}

impl ContributesBindingProcessor {
    pub const ID: &'static str = "scopeweave.ContributesBindingProcessor";

    /// Validates `declaration` and builds one lookup per `annotation` instance.
    pub(crate) fn generate(
        facts: &dyn SymbolFacts,
        declaration: &Declaration,
        annotation: &str,
    ) -> Result<Vec<Declaration>, MergeError> {
        require_public(declaration)?;
        if !matches!(
            declaration.kind,
            DeclarationKind::Class | DeclarationKind::Object
        ) {
            return Err(MergeError::NotAClass {
                declaration: declaration.name.clone(),
                annotation: QualifiedName::new(annotation),
            });
        }

        let scope = ScopeParser::new(facts).resolve(declaration)?;

        let mut keys: BTreeSet<(QualifiedName, bool)> = BTreeSet::new();
        let mut lookups = Vec::new();
        for usage in declaration.annotations_of(annotation) {
            let (bound_type, multibinding) = Self::binding_key(facts, declaration, usage)?;
            if !keys.insert((bound_type.clone(), multibinding)) {
                return Err(MergeError::DuplicateContribution {
                    declaration: declaration.name.clone(),
                    bound_type,
                });
            }
            lookups.push(binding_lookup(declaration, &scope, &bound_type, multibinding));
        }

        Ok(lookups)
    }

    fn binding_key(
        facts: &dyn SymbolFacts,
        declaration: &Declaration,
        usage: &AnnotationUsage,
    ) -> Result<(QualifiedName, bool), MergeError> {
        let bound_type = match facts
            .argument(usage, names::BOUND_TYPE_PARAMETER)
            .and_then(AnnotationValue::as_type)
        {
            Some(bound_type) => bound_type.clone(),
            None => infer_bound_type(declaration)?,
        };
        let multibinding = facts
            .argument(usage, names::MULTIBINDING_PARAMETER)
            .and_then(AnnotationValue::as_bool)
            .unwrap_or(false);
        Ok((bound_type, multibinding))
    }
}

/// The single non-trivial super type of `declaration`.
pub(crate) fn infer_bound_type(declaration: &Declaration) -> Result<QualifiedName, MergeError> {
    let candidates: Vec<QualifiedName> = declaration
        .supertypes
        .iter()
        .filter(|supertype| !names::TRIVIAL_SUPERTYPES.contains(&supertype.as_str()))
        .cloned()
        .collect();

    match candidates.as_slice() {
        [] => Err(MergeError::NoBoundType {
            declaration: declaration.name.clone(),
        }),
        [bound_type] => Ok(bound_type.clone()),
        _ => Err(MergeError::AmbiguousBoundType {
            declaration: declaration.name.clone(),
            candidates,
        }),
    }
}

fn binding_lookup(
    declaration: &Declaration,
    scope: &Scope,
    bound_type: &QualifiedName,
    multibinding: bool,
) -> Declaration {
    let mut simple = format!(
        "{}Binds{}",
        names::flatten(&declaration.name),
        names::flatten(bound_type)
    );
    if multibinding {
        simple.push_str("IntoSet");
    }

    let implementation = declaration.joined_simple_name();
    let mut provider = Function::new(&format!(
        "provide{}{}",
        implementation,
        bound_type.simple_name()
    ))
    .returning(bound_type.clone())
    .annotated(AnnotationUsage::new(names::PROVIDES));

    if multibinding {
        provider = provider.annotated(AnnotationUsage::new(names::INTO_SET));
    }

    provider = if declaration.kind == DeclarationKind::Object {
        provider.with_body(FunctionBody::Instance {
            object: declaration.name.clone(),
        })
    } else {
        let parameter = names::decapitalize(&implementation);
        provider
            .with_parameter(Parameter::new(&parameter, declaration.name.clone()))
            .with_body(FunctionBody::Forward { parameter })
    };

    lookup_declaration(&simple, declaration, scope).with_function(provider)
}

impl SymbolProcessor for ContributesBindingProcessor {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn process(&mut self, round: &mut Round<'_>) -> Vec<QualifiedName> {
        let facts = round.facts;
        let annotation = QualifiedName::new(names::CONTRIBUTES_BINDING);

        for declaration in facts.declarations_with_annotation(&annotation) {
            if !self.seen.insert(declaration.name.clone()) {
                continue;
            }
            let result = Self::generate(facts, declaration, names::CONTRIBUTES_BINDING);
            let Some(lookups) = round.diagnostics.report(result) else {
                continue;
            };
            for lookup in lookups {
                tracing::debug!("Bound {} through {}", declaration.name, lookup.name);
                round.emit(GeneratedFile::single(lookup));
            }
        }

        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{SourceFile, SymbolTable};

    const APP_SCOPE: &str = "com.app.AppScope";

    fn binding() -> AnnotationUsage {
        AnnotationUsage::new(names::CONTRIBUTES_BINDING)
            .with_argument("scope", AnnotationValue::Type(APP_SCOPE.into()))
    }

    fn implementation(kind: DeclarationKind) -> Declaration {
        Declaration::new(kind, "com.app", "RealAuthenticator")
    }

    fn generate(decl: Declaration) -> Result<Vec<Declaration>, MergeError> {
        let mut table = SymbolTable::new();
        table
            .add_file(SourceFile::new("RealAuthenticator.kt", vec![decl.clone()]))
            .unwrap();
        table.begin_round([]);
        ContributesBindingProcessor::generate(&table, &decl, names::CONTRIBUTES_BINDING)
    }

    #[test]
    fn test_infers_single_super_type() {
        let lookups = generate(
            implementation(DeclarationKind::Class)
                .extends("kotlin.Any")
                .extends("com.app.Authenticator")
                .annotated(binding()),
        )
        .unwrap();

        assert_eq!(lookups.len(), 1);
        let lookup = &lookups[0];
        assert_eq!(
            lookup.name.as_str(),
            "scopeweave.inject.lookup.ComAppRealAuthenticatorBindsComAppAuthenticator"
        );

        let provider = &lookup.functions[0];
        assert_eq!(provider.name, "provideRealAuthenticatorAuthenticator");
        assert_eq!(provider.return_type.as_ref().map(QualifiedName::as_str), Some("com.app.Authenticator"));
        assert_eq!(provider.parameters[0].name, "realAuthenticator");
        assert_eq!(
            provider.body,
            Some(FunctionBody::Forward {
                parameter: "realAuthenticator".to_string()
            })
        );
        assert!(provider.annotations.iter().any(|a| a.is(names::PROVIDES)));
    }

    #[test]
    fn test_no_bound_type() {
        let err = generate(implementation(DeclarationKind::Class).annotated(binding())).unwrap_err();
        assert_eq!(
            err,
            MergeError::NoBoundType {
                declaration: "com.app.RealAuthenticator".into()
            }
        );
    }

    #[test]
    fn test_ambiguous_bound_type_names_all_candidates() {
        let err = generate(
            implementation(DeclarationKind::Class)
                .extends("com.app.Authenticator")
                .extends("com.app.Closeable")
                .annotated(binding()),
        )
        .unwrap_err();

        assert_eq!(
            err,
            MergeError::AmbiguousBoundType {
                declaration: "com.app.RealAuthenticator".into(),
                candidates: vec!["com.app.Authenticator".into(), "com.app.Closeable".into()],
            }
        );
    }

    #[test]
    fn test_repeated_bindings_to_different_types() {
        let lookups = generate(
            implementation(DeclarationKind::Class)
                .extends("com.app.Authenticator")
                .extends("com.app.Closeable")
                .annotated(binding().with_argument(
                    "boundType",
                    AnnotationValue::Type("com.app.Authenticator".into()),
                ))
                .annotated(binding().with_argument(
                    "boundType",
                    AnnotationValue::Type("com.app.Closeable".into()),
                )),
        )
        .unwrap();

        assert_eq!(lookups.len(), 2);
        assert_ne!(lookups[0].name, lookups[1].name);
    }

    #[test]
    fn test_duplicate_bound_type() {
        let bound = AnnotationValue::Type("com.app.Authenticator".into());
        let err = generate(
            implementation(DeclarationKind::Class)
                .extends("com.app.Authenticator")
                .annotated(binding().with_argument("boundType", bound.clone()))
                .annotated(binding()),
        )
        .unwrap_err();

        assert_eq!(
            err,
            MergeError::DuplicateContribution {
                declaration: "com.app.RealAuthenticator".into(),
                bound_type: "com.app.Authenticator".into(),
            }
        );
    }

    #[test]
    fn test_multibinding_and_binding_to_same_type() {
        let lookups = generate(
            implementation(DeclarationKind::Class)
                .extends("com.app.Authenticator")
                .annotated(binding())
                .annotated(binding().with_argument("multibinding", AnnotationValue::Bool(true))),
        )
        .unwrap();

        assert_eq!(lookups.len(), 2);
        assert!(lookups[1].name.as_str().ends_with("IntoSet"));
        assert!(lookups[1].functions[0]
            .annotations
            .iter()
            .any(|a| a.is(names::INTO_SET)));
    }

    #[test]
    fn test_object_binding_returns_instance() {
        let lookups = generate(
            implementation(DeclarationKind::Object)
                .extends("com.app.Authenticator")
                .annotated(binding()),
        )
        .unwrap();

        let provider = &lookups[0].functions[0];
        assert!(provider.parameters.is_empty());
        assert_eq!(
            provider.body,
            Some(FunctionBody::Instance {
                object: "com.app.RealAuthenticator".into()
            })
        );
    }

    #[test]
    fn test_rejects_interfaces() {
        let err = generate(
            implementation(DeclarationKind::Interface)
                .extends("com.app.Authenticator")
                .annotated(binding()),
        )
        .unwrap_err();
        assert!(matches!(err, MergeError::NotAClass { .. }));
    }
}
