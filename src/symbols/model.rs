//! Declarations, annotations and compilation units as seen by the processors.
//!
//! The host compiler owns these values; processors only read them. Generated
//! declarations use the same shapes so that later rounds (and later
//! compilations) can read them back through [`SymbolFacts`](super::SymbolFacts).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fully qualified, dot-separated name of a declaration or type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualifiedName(String);

impl QualifiedName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Dot-separated segments of the name.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|s| !s.is_empty())
    }

    /// Last segment of the name.
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Name of a declaration nested directly inside this one.
    pub fn child(&self, simple: &str) -> Self {
        Self(format!("{}.{}", self.0, simple))
    }

    /// Appends `suffix` to the last segment.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self(format!("{}{}", self.0, suffix))
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QualifiedName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for QualifiedName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for QualifiedName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for QualifiedName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Identity of a source or generated file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// File identity for generated output: encodes the full declaration name.
    pub fn generated(primary: &QualifiedName) -> Self {
        Self(format!("generated/{primary}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Interface,
    Class,
    Object,
    Annotation,
    Function,
    Property,
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeclarationKind::Interface => "interface",
            DeclarationKind::Class => "class",
            DeclarationKind::Object => "object",
            DeclarationKind::Annotation => "annotation class",
            DeclarationKind::Function => "function",
            DeclarationKind::Property => "property",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Internal,
    Protected,
    Private,
}

/// Value of one annotation argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationValue {
    /// A class literal, e.g. `AppScope::class`.
    Type(QualifiedName),
    /// An array of class literals, e.g. `[A::class, B::class]`.
    Types(Vec<QualifiedName>),
    String(String),
    Bool(bool),
    Int(i64),
}

impl AnnotationValue {
    pub fn as_type(&self) -> Option<&QualifiedName> {
        match self {
            AnnotationValue::Type(name) => Some(name),
            _ => None,
        }
    }

    /// Class literals in this value; a single literal counts as a one-element list.
    pub fn as_types(&self) -> Option<Vec<QualifiedName>> {
        match self {
            AnnotationValue::Type(name) => Some(vec![name.clone()]),
            AnnotationValue::Types(names) => Some(names.clone()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnnotationValue::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

/// One argument of an annotation usage, named or positional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationArgument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: AnnotationValue,
}

/// An annotation attached to a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationUsage {
    #[serde(rename = "type")]
    pub annotation_type: QualifiedName,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<AnnotationArgument>,
}

impl AnnotationUsage {
    pub fn new(annotation_type: impl Into<QualifiedName>) -> Self {
        Self {
            annotation_type: annotation_type.into(),
            arguments: Vec::new(),
        }
    }

    /// Adds a named argument.
    pub fn with_argument(mut self, name: &str, value: AnnotationValue) -> Self {
        self.arguments.push(AnnotationArgument {
            name: Some(name.to_string()),
            value,
        });
        self
    }

    /// Adds a positional argument.
    pub fn with_positional(mut self, value: AnnotationValue) -> Self {
        self.arguments.push(AnnotationArgument { name: None, value });
        self
    }

    pub fn is(&self, annotation_type: &str) -> bool {
        self.annotation_type == annotation_type
    }

    /// Value of the argument explicitly named `name`.
    pub fn named(&self, name: &str) -> Option<&AnnotationValue> {
        self.arguments
            .iter()
            .find(|arg| arg.name.as_deref() == Some(name))
            .map(|arg| &arg.value)
    }

    /// Value of the `index`-th unnamed argument.
    pub fn positional(&self, index: usize) -> Option<&AnnotationValue> {
        self.arguments
            .iter()
            .filter(|arg| arg.name.is_none())
            .nth(index)
            .map(|arg| &arg.value)
    }
}

/// A parameter declared by an annotation class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationParameter {
    pub name: String,
    #[serde(default)]
    pub has_default: bool,
}

impl AnnotationParameter {
    pub fn required(name: &str) -> Self {
        Self {
            name: name.to_string(),
            has_default: false,
        }
    }

    pub fn optional(name: &str) -> Self {
        Self {
            name: name.to_string(),
            has_default: true,
        }
    }
}

/// A function or constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: QualifiedName,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationUsage>,
}

impl Parameter {
    pub fn new(name: &str, type_name: impl Into<QualifiedName>) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.into(),
            annotations: Vec::new(),
        }
    }

    pub fn annotated(mut self, annotation: AnnotationUsage) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// Body of a generated function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FunctionBody {
    /// Returns the named parameter unchanged.
    Forward { parameter: String },
    /// Returns a singleton object instance.
    Instance { object: QualifiedName },
    /// Creates `component`, passing `this` cast to `parent` followed by the
    /// forwarded arguments.
    CreateComponent {
        component: QualifiedName,
        parent: QualifiedName,
        arguments: Vec<String>,
    },
}

/// A member function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<QualifiedName>,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<FunctionBody>,
}

impl Function {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parameters: Vec::new(),
            return_type: None,
            is_abstract: false,
            annotations: Vec::new(),
            body: None,
        }
    }

    pub fn abstract_fn(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn returning(mut self, return_type: impl Into<QualifiedName>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    pub fn annotated(mut self, annotation: AnnotationUsage) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_body(mut self, body: FunctionBody) -> Self {
        self.body = Some(body);
        self
    }
}

/// Any named type, interface, function or property in the symbol graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: QualifiedName,
    pub package: String,
    pub kind: DeclarationKind,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationUsage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supertypes: Vec<QualifiedName>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<Function>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructor: Vec<Parameter>,
    /// Parameters declared by an annotation class.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<AnnotationParameter>,
    /// Lexically enclosing declaration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<QualifiedName>,
    /// Declaration this one was generated from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<QualifiedName>,
}

impl Declaration {
    /// A top-level declaration `package.simple`.
    pub fn new(kind: DeclarationKind, package: &str, simple: &str) -> Self {
        let name = if package.is_empty() {
            QualifiedName::new(simple)
        } else {
            QualifiedName::new(format!("{package}.{simple}"))
        };
        Self {
            name,
            package: package.to_string(),
            kind,
            visibility: Visibility::Public,
            is_abstract: false,
            annotations: Vec::new(),
            supertypes: Vec::new(),
            functions: Vec::new(),
            constructor: Vec::new(),
            parameters: Vec::new(),
            parent: None,
            origin: None,
        }
    }

    /// A declaration nested directly inside `parent`.
    pub fn nested(kind: DeclarationKind, parent: &Declaration, simple: &str) -> Self {
        let mut declaration = Self::new(kind, &parent.package, simple);
        declaration.name = parent.name.child(simple);
        declaration.parent = Some(parent.name.clone());
        declaration
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn annotated(mut self, annotation: AnnotationUsage) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn extends(mut self, supertype: impl Into<QualifiedName>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }

    pub fn with_function(mut self, function: Function) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_constructor_parameter(mut self, parameter: Parameter) -> Self {
        self.constructor.push(parameter);
        self
    }

    pub fn with_parameter(mut self, parameter: AnnotationParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_origin(mut self, origin: impl Into<QualifiedName>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn is_interface(&self) -> bool {
        self.kind == DeclarationKind::Interface
    }

    /// Usages of `annotation_type` on this declaration, in source order.
    pub fn annotations_of<'a>(
        &'a self,
        annotation_type: &'a str,
    ) -> impl Iterator<Item = &'a AnnotationUsage> + 'a {
        self.annotations
            .iter()
            .filter(move |usage| usage.is(annotation_type))
    }

    pub fn annotation(&self, annotation_type: &str) -> Option<&AnnotationUsage> {
        self.annotations
            .iter()
            .find(|usage| usage.is(annotation_type))
    }

    pub fn has_annotation(&self, annotation_type: &str) -> bool {
        self.annotation(annotation_type).is_some()
    }

    /// The declaration's name with its package removed, e.g. `Outer.Inner`.
    pub fn relative_name(&self) -> &str {
        let name = self.name.as_str();
        if self.package.is_empty() {
            return name;
        }
        name.strip_prefix(&self.package)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(name)
    }

    /// Simple names of the declaration and its enclosing declarations joined:
    /// `com.app.Outer.Inner` -> `OuterInner`.
    pub fn joined_simple_name(&self) -> String {
        self.relative_name().split('.').collect()
    }

    /// Abstract functions, ignoring the universal `equals`/`hashCode`/`toString`.
    pub fn abstract_functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter().filter(|function| {
            function.is_abstract
                && !crate::names::UNIVERSAL_FUNCTIONS.contains(&function.name.as_str())
        })
    }
}

/// A file and the declarations it defines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub id: FileId,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl SourceFile {
    pub fn new(id: impl Into<String>, declarations: Vec<Declaration>) -> Self {
        Self {
            id: FileId::new(id),
            declarations,
        }
    }
}

/// All files of one compilation, sources and generated output alike.
///
/// A finished compilation can be handed to a later one as a prior result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationUnit {
    #[serde(default)]
    pub files: Vec<SourceFile>,
}

impl CompilationUnit {
    pub fn new(files: Vec<SourceFile>) -> Self {
        Self { files }
    }

    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.files.iter().flat_map(|file| file.declarations.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_declaration_names() {
        let outer = Declaration::new(DeclarationKind::Interface, "com.app", "Outer");
        let inner = Declaration::nested(DeclarationKind::Interface, &outer, "Inner");

        assert_eq!(inner.name.as_str(), "com.app.Outer.Inner");
        assert_eq!(inner.parent.as_ref(), Some(&outer.name));
        assert_eq!(inner.relative_name(), "Outer.Inner");
        assert_eq!(inner.joined_simple_name(), "OuterInner");
    }

    #[test]
    fn test_named_and_positional_arguments() {
        let usage = AnnotationUsage::new("a.B")
            .with_positional(AnnotationValue::Type("a.Scope".into()))
            .with_argument("exclude", AnnotationValue::Types(vec!["a.X".into()]));

        assert_eq!(
            usage.positional(0).and_then(AnnotationValue::as_type),
            Some(&QualifiedName::new("a.Scope"))
        );
        assert!(usage.positional(1).is_none());
        assert_eq!(
            usage.named("exclude").and_then(AnnotationValue::as_types),
            Some(vec![QualifiedName::new("a.X")])
        );
    }

    #[test]
    fn test_abstract_functions_skip_universal_members() {
        let decl = Declaration::new(DeclarationKind::Interface, "com.app", "Factory")
            .with_function(Function::new("create").abstract_fn())
            .with_function(Function::new("toString").abstract_fn())
            .with_function(Function::new("helper"));

        let names: Vec<_> = decl.abstract_functions().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["create"]);
    }

    #[test]
    fn test_declaration_json_shape() {
        let decl = Declaration::new(DeclarationKind::Interface, "com.app", "Foo").annotated(
            AnnotationUsage::new("scopeweave.inject.ContributesTo")
                .with_argument("scope", AnnotationValue::Type("com.app.AppScope".into())),
        );

        let json = serde_json::to_string(&decl).unwrap();
        assert!(json.contains("\"kind\":\"interface\""));
        assert!(json.contains("\"type\":\"scopeweave.inject.ContributesTo\""));
        assert!(json.contains("{\"type\":\"com.app.AppScope\"}"));

        let back: Declaration = serde_json::from_str(&json).unwrap();
        assert_eq!(back, decl);
    }
}
