//! Well-known annotation names, namespaces and naming rules.

use crate::symbols::QualifiedName;

// --- Contribution annotations ---

pub const CONTRIBUTES_TO: &str = "scopeweave.inject.ContributesTo";
pub const CONTRIBUTES_BINDING: &str = "scopeweave.inject.ContributesBinding";
pub const CONTRIBUTES_SUBCOMPONENT: &str = "scopeweave.inject.ContributesSubcomponent";
pub const CONTRIBUTES_SUBCOMPONENT_FACTORY: &str =
    "scopeweave.inject.ContributesSubcomponent.Factory";
pub const MERGE_COMPONENT: &str = "scopeweave.inject.MergeComponent";
pub const CONTRIBUTING_ANNOTATION: &str = "scopeweave.inject.ContributingAnnotation";
pub const SINGLE_IN: &str = "scopeweave.inject.SingleIn";

// --- Written on generated lookups ---

pub const CONTRIBUTION_SCOPE: &str = "scopeweave.inject.internal.ContributionScope";
pub const SUBCOMPONENT_FACTORY_MARKER: &str =
    "scopeweave.inject.internal.SubcomponentFactoryMarker";

// --- Downstream injector ---

pub const COMPONENT: &str = "scopeweave.runtime.Component";
pub const SCOPE: &str = "scopeweave.runtime.Scope";
pub const PROVIDES: &str = "scopeweave.runtime.Provides";
pub const INTO_SET: &str = "scopeweave.runtime.IntoSet";

// --- Compatibility shims ---

pub const LEGACY_CONTRIBUTES_BINDING: &str = "legacy.anvil.ContributesBinding";
pub const LEGACY_CONTRIBUTES_TO: &str = "legacy.anvil.ContributesTo";

// --- Namespaces ---

/// Shared namespace holding every lookup declaration.
pub const LOOKUP_NAMESPACE: &str = "scopeweave.inject.lookup";

/// Namespace of marker properties recording custom contributing annotations.
pub const EXTEND_NAMESPACE: &str = "scopeweave.inject.extend";

// --- Parameter names ---

pub const SCOPE_PARAMETER: &str = "scope";
pub const BOUND_TYPE_PARAMETER: &str = "boundType";
pub const MULTIBINDING_PARAMETER: &str = "multibinding";
pub const EXCLUDE_PARAMETER: &str = "exclude";

// --- Suffixes ---

pub const MERGED_SUFFIX: &str = "Merged";
pub const FINAL_SUFFIX: &str = "Final";

/// Supertypes never considered when inferring a bound type.
pub const TRIVIAL_SUPERTYPES: &[&str] = &["Any", "kotlin.Any"];

/// Members every type carries; never counted as factory functions.
pub const UNIVERSAL_FUNCTIONS: &[&str] = &["equals", "hashCode", "toString"];

/// Capitalizes every dotted segment and joins them: `com.app.Foo` -> `ComAppFoo`.
pub fn flatten(name: &QualifiedName) -> String {
    name.segments().map(capitalize).collect()
}

/// Lower-cases the first character: `RealAuthenticator` -> `realAuthenticator`.
pub fn decapitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Name of the lookup declaration generated for `origin`.
pub fn lookup_name(origin: &QualifiedName) -> QualifiedName {
    QualifiedName::new(format!("{LOOKUP_NAMESPACE}.{}", flatten(origin)))
}

/// Name of the marker property recording a custom contributing annotation.
pub fn extend_marker_name(annotation: &QualifiedName) -> QualifiedName {
    QualifiedName::new(format!("{EXTEND_NAMESPACE}.{}", flatten(annotation)))
}
