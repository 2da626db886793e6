//! Annotation classes shipped with the runtime and annotation libraries.
//!
//! These are visible to every compilation the same way a library on the
//! classpath would be.

use super::{
    AnnotationParameter, AnnotationUsage, CompilationUnit, Declaration, DeclarationKind,
    SourceFile,
};
use crate::names;

fn annotation(name: &str) -> Declaration {
    let (package, simple) = name.rsplit_once('.').unwrap_or(("", name));
    Declaration::new(DeclarationKind::Annotation, package, simple)
}

/// The built-in annotation declarations as a prior compilation unit.
pub fn builtin_unit() -> CompilationUnit {
    let contributes_subcomponent = annotation(names::CONTRIBUTES_SUBCOMPONENT);
    let factory = Declaration::nested(
        DeclarationKind::Annotation,
        &contributes_subcomponent,
        "Factory",
    )
    .with_parameter(AnnotationParameter::required(names::SCOPE_PARAMETER));

    let inject = vec![
        annotation(names::CONTRIBUTES_TO)
            .with_parameter(AnnotationParameter::optional(names::SCOPE_PARAMETER)),
        annotation(names::CONTRIBUTES_BINDING)
            .with_parameter(AnnotationParameter::optional(names::SCOPE_PARAMETER))
            .with_parameter(AnnotationParameter::optional(names::BOUND_TYPE_PARAMETER))
            .with_parameter(AnnotationParameter::optional(names::MULTIBINDING_PARAMETER)),
        contributes_subcomponent,
        factory,
        annotation(names::MERGE_COMPONENT)
            .with_parameter(AnnotationParameter::optional(names::SCOPE_PARAMETER))
            .with_parameter(AnnotationParameter::optional(names::EXCLUDE_PARAMETER)),
        annotation(names::CONTRIBUTING_ANNOTATION),
        annotation(names::SINGLE_IN)
            .annotated(AnnotationUsage::new(names::SCOPE))
            .with_parameter(AnnotationParameter::required(names::SCOPE_PARAMETER)),
        annotation(names::CONTRIBUTION_SCOPE)
            .with_parameter(AnnotationParameter::required(names::SCOPE_PARAMETER)),
        annotation(names::SUBCOMPONENT_FACTORY_MARKER),
    ];

    let runtime = vec![
        annotation(names::COMPONENT),
        annotation(names::SCOPE),
        annotation(names::PROVIDES),
        annotation(names::INTO_SET),
    ];

    let legacy = vec![
        annotation(names::LEGACY_CONTRIBUTES_BINDING)
            .with_parameter(AnnotationParameter::required(names::SCOPE_PARAMETER))
            .with_parameter(AnnotationParameter::optional(names::BOUND_TYPE_PARAMETER))
            .with_parameter(AnnotationParameter::optional("replaces"))
            .with_parameter(AnnotationParameter::optional("priority"))
            .with_parameter(AnnotationParameter::optional("rank"))
            .with_parameter(AnnotationParameter::optional("ignoreQualifier")),
        annotation(names::LEGACY_CONTRIBUTES_TO)
            .with_parameter(AnnotationParameter::required(names::SCOPE_PARAMETER))
            .with_parameter(AnnotationParameter::optional("replaces")),
    ];

    CompilationUnit::new(vec![
        SourceFile::new("builtin/scopeweave-inject", inject),
        SourceFile::new("builtin/scopeweave-runtime", runtime),
        SourceFile::new("builtin/legacy-anvil", legacy),
    ])
}
