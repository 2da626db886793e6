//! Whole-session tests: every processor, several rounds, prior results.

use std::collections::BTreeMap;

use scopeweave::config::{
    ProcessorOptions, SessionConfig, COMPAT_IGNORE_UNSUPPORTED_OPTION,
    CONTRIBUTING_ANNOTATIONS_OPTION,
};
use scopeweave::names;
use scopeweave::processors::ContributesToProcessor;
use scopeweave::session::{Session, SessionError, SessionOutput};
use scopeweave::symbols::{
    AnnotationUsage, AnnotationValue, CompilationUnit, Declaration, DeclarationKind, Function,
    FunctionBody, Parameter, QualifiedName, SourceFile,
};

const APP_SCOPE: &str = "com.app.AppScope";

fn scoped(annotation: &str, scope: &str) -> AnnotationUsage {
    AnnotationUsage::new(annotation).with_argument("scope", AnnotationValue::Type(scope.into()))
}

fn interface(simple: &str) -> Declaration {
    Declaration::new(DeclarationKind::Interface, "com.app", simple)
}

fn merge_request(simple: &str) -> Declaration {
    interface(simple).annotated(scoped(names::MERGE_COMPONENT, APP_SCOPE))
}

fn contributed(simple: &str, scope: &str) -> Declaration {
    interface(simple).annotated(scoped(names::CONTRIBUTES_TO, scope))
}

/// A contributed subcomponent in `scope` whose factory targets `parent_scope`.
fn subcomponent(simple: &str, scope: &str, parent_scope: &str) -> Vec<Declaration> {
    let sub = interface(simple)
        .annotated(AnnotationUsage::new(names::CONTRIBUTES_SUBCOMPONENT))
        .annotated(scoped(names::SINGLE_IN, scope));
    let factory = Declaration::nested(DeclarationKind::Interface, &sub, "Factory")
        .annotated(scoped(names::CONTRIBUTES_SUBCOMPONENT_FACTORY, parent_scope))
        .with_function(
            Function::new("create")
                .abstract_fn()
                .with_parameter(Parameter::new("user", "com.app.User"))
                .returning(sub.name.clone()),
        );
    vec![sub, factory]
}

fn unit(files: Vec<(&str, Vec<Declaration>)>) -> CompilationUnit {
    CompilationUnit::new(
        files
            .into_iter()
            .map(|(id, declarations)| SourceFile::new(id, declarations))
            .collect(),
    )
}

fn run(options: ProcessorOptions, sources: CompilationUnit) -> Result<SessionOutput, SessionError> {
    let mut session = Session::new(options, SessionConfig::default());
    session.add_sources(sources)?;
    session.run()
}

fn find<'a>(unit: &'a CompilationUnit, name: &str) -> &'a Declaration {
    unit.declarations()
        .find(|declaration| declaration.name.as_str() == name)
        .unwrap_or_else(|| panic!("{name} was not generated"))
}

fn supertypes(declaration: &Declaration) -> Vec<&str> {
    declaration.supertypes.iter().map(QualifiedName::as_str).collect()
}

#[test]
fn test_contributions_are_merged_into_aggregate() {
    let authenticator = Declaration::new(DeclarationKind::Class, "com.app", "RealAuth")
        .extends("com.app.Authenticator")
        .annotated(scoped(names::CONTRIBUTES_BINDING, APP_SCOPE));
    let sources = unit(vec![
        ("AppComponent.kt", vec![merge_request("AppComponent")]),
        ("AppGraph.kt", vec![contributed("AppGraph", APP_SCOPE)]),
        ("RealAuth.kt", vec![authenticator]),
        ("Other.kt", vec![contributed("OtherGraph", "com.app.OtherScope")]),
    ]);

    let output = run(ProcessorOptions::default(), sources).unwrap();

    assert_eq!(output.rounds, 3);
    let aggregate = find(&output.unit, "com.app.AppComponentMerged");
    assert_eq!(aggregate.origin, Some("com.app.AppComponent".into()));
    assert_eq!(
        supertypes(aggregate),
        vec![
            "scopeweave.inject.lookup.ComAppAppGraph",
            "scopeweave.inject.lookup.ComAppRealAuthBindsComAppAuthenticator",
        ]
    );

    let binding = find(
        &output.unit,
        "scopeweave.inject.lookup.ComAppRealAuthBindsComAppAuthenticator",
    );
    assert_eq!(
        binding.functions[0].body,
        Some(FunctionBody::Forward {
            parameter: "realAuth".to_string()
        })
    );
}

#[test]
fn test_excluded_contribution_is_not_merged() {
    let request = interface("AppComponent").annotated(
        scoped(names::MERGE_COMPONENT, APP_SCOPE)
            .with_argument("exclude", AnnotationValue::Types(vec!["com.app.X".into()])),
    );
    let sources = unit(vec![(
        "App.kt",
        vec![request, contributed("X", APP_SCOPE)],
    )]);

    let output = run(ProcessorOptions::default(), sources).unwrap();

    assert!(find(&output.unit, "com.app.AppComponentMerged")
        .supertypes
        .is_empty());
}

#[test]
fn test_prior_results_are_merged_by_later_compilations() {
    let library = run(
        ProcessorOptions::default(),
        unit(vec![("Foo.kt", vec![contributed("Foo", APP_SCOPE)])]),
    )
    .unwrap();
    assert_eq!(
        library.generated,
        vec![scopeweave::symbols::FileId::new(
            "generated/scopeweave.inject.lookup.ComAppFoo"
        )]
    );

    let mut session = Session::new(ProcessorOptions::default(), SessionConfig::default());
    session.add_dependency(library.unit).unwrap();
    session
        .add_sources(unit(vec![(
            "Components.kt",
            vec![merge_request("First"), merge_request("Second")],
        )]))
        .unwrap();
    let output = session.run().unwrap();

    // Nothing new to wait for: merged in the first round.
    assert_eq!(output.rounds, 2);
    for aggregate in ["com.app.FirstMerged", "com.app.SecondMerged"] {
        assert_eq!(
            supertypes(find(&output.unit, aggregate)),
            vec!["scopeweave.inject.lookup.ComAppFoo"]
        );
    }
}

#[test]
fn test_ambiguous_binding_fails_the_session() {
    let ambiguous = Declaration::new(DeclarationKind::Class, "com.app", "Impl")
        .extends("com.app.A")
        .extends("com.app.B")
        .annotated(scoped(names::CONTRIBUTES_BINDING, APP_SCOPE));
    let sources = unit(vec![(
        "App.kt",
        vec![merge_request("AppComponent"), ambiguous],
    )]);

    let err = run(ProcessorOptions::default(), sources).unwrap_err();
    let diagnostics = match err {
        SessionError::Failed { diagnostics } => diagnostics,
        other => panic!("expected a failed session, got {other:?}"),
    };
    let errors: Vec<_> = diagnostics.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].symbol, Some("com.app.Impl".into()));
    assert!(errors[0].message.contains("com.app.A"));
    assert!(errors[0].message.contains("com.app.B"));
}

#[test]
fn test_conflicting_repeated_scopes_fail() {
    let repeated = Declaration::new(DeclarationKind::Class, "com.app", "Impl")
        .extends("com.app.A")
        .annotated(scoped(names::CONTRIBUTES_BINDING, "com.app.S1"))
        .annotated(
            scoped(names::CONTRIBUTES_BINDING, "com.app.S2")
                .with_argument("multibinding", AnnotationValue::Bool(true)),
        );

    let err = run(
        ProcessorOptions::default(),
        unit(vec![("Impl.kt", vec![repeated])]),
    )
    .unwrap_err();
    let diagnostics = match err {
        SessionError::Failed { diagnostics } => diagnostics,
        other => panic!("expected a failed session, got {other:?}"),
    };
    assert!(diagnostics
        .errors()
        .any(|error| error.message.contains("conflicting scopes")));
}

#[test]
fn test_legacy_parameters_fail_unless_ignored() {
    let legacy = interface("LegacyGraph").annotated(
        scoped(names::LEGACY_CONTRIBUTES_TO, APP_SCOPE)
            .with_argument("replaces", AnnotationValue::Types(vec!["com.app.Old".into()])),
    );
    let sources = || {
        unit(vec![(
            "App.kt",
            vec![merge_request("AppComponent"), legacy.clone()],
        )])
    };

    let err = run(ProcessorOptions::default(), sources()).unwrap_err();
    assert!(matches!(err, SessionError::Failed { .. }));

    let options = ProcessorOptions::from_map(&BTreeMap::from([(
        COMPAT_IGNORE_UNSUPPORTED_OPTION.to_string(),
        "true".to_string(),
    )]));
    let output = run(options, sources()).unwrap();

    assert_eq!(output.diagnostics.warnings().count(), 1);
    assert_eq!(
        supertypes(find(&output.unit, "com.app.AppComponentMerged")),
        vec!["scopeweave.inject.lookup.ComAppLegacyGraph"]
    );
}

#[test]
fn test_disabled_processor_emits_nothing() {
    let options = ProcessorOptions::from_map(&BTreeMap::from([(
        ContributesToProcessor::ID.to_string(),
        "disabled".to_string(),
    )]));
    let sources = unit(vec![(
        "App.kt",
        vec![merge_request("AppComponent"), contributed("AppGraph", APP_SCOPE)],
    )]);

    let output = run(options, sources).unwrap();

    assert_eq!(output.generated.len(), 1);
    assert!(find(&output.unit, "com.app.AppComponentMerged")
        .supertypes
        .is_empty());
}

#[test]
fn test_request_order_does_not_change_output() {
    let forward = unit(vec![
        ("First.kt", vec![merge_request("First")]),
        ("Second.kt", vec![merge_request("Second")]),
        ("Graphs.kt", vec![contributed("B", APP_SCOPE), contributed("A", APP_SCOPE)]),
    ]);
    let backward = unit(vec![
        ("Graphs.kt", vec![contributed("A", APP_SCOPE), contributed("B", APP_SCOPE)]),
        ("Second.kt", vec![merge_request("Second")]),
        ("First.kt", vec![merge_request("First")]),
    ]);

    let forward = run(ProcessorOptions::default(), forward).unwrap();
    let backward = run(ProcessorOptions::default(), backward).unwrap();

    for aggregate in ["com.app.FirstMerged", "com.app.SecondMerged"] {
        assert_eq!(
            find(&forward.unit, aggregate),
            find(&backward.unit, aggregate)
        );
    }
}

#[test]
fn test_subcomponent_chain_is_finalized_under_its_parents() {
    let mut declarations = vec![
        merge_request("AppComponent"),
        contributed("BGraph", "com.app.BScope"),
    ];
    declarations.extend(subcomponent("A", "com.app.AScope", APP_SCOPE));
    declarations.extend(subcomponent("B", "com.app.BScope", "com.app.AScope"));
    declarations.extend(subcomponent("C", "com.app.CScope", "com.app.BScope"));

    let output = run(
        ProcessorOptions::default(),
        unit(vec![("App.kt", declarations)]),
    )
    .unwrap();

    assert_eq!(
        supertypes(find(&output.unit, "com.app.AppComponentMerged")),
        vec![
            "scopeweave.inject.lookup.ComAppAFactory",
            "com.app.AppComponent.AFinal.Factory"
        ]
    );

    let c_final = find(&output.unit, "com.app.AppComponent.AFinal.BFinal.CFinal");
    assert_eq!(c_final.constructor[0].name, "parentComponent");
    assert_eq!(
        c_final.constructor[0].type_name.as_str(),
        "com.app.AppComponent.AFinal.BFinal"
    );

    let b_merged = find(&output.unit, "com.app.AppComponent.AFinal.BFinalMerged");
    assert!(b_merged
        .supertypes
        .contains(&"scopeweave.inject.lookup.ComAppBGraph".into()));
    assert!(b_merged
        .supertypes
        .contains(&"com.app.AppComponent.AFinal.BFinal.CFinal.Factory".into()));

    // One final component per subcomponent.
    let finals = output
        .unit
        .declarations()
        .filter(|declaration| declaration.name.as_str().ends_with("Final"))
        .count();
    assert_eq!(finals, 3);
}

#[test]
fn test_custom_contributing_annotation_is_registered() {
    let widget = Declaration::new(DeclarationKind::Annotation, "com.custom", "ContributesWidget")
        .annotated(AnnotationUsage::new(names::CONTRIBUTING_ANNOTATION));

    let output = run(
        ProcessorOptions::default(),
        unit(vec![("Widget.kt", vec![widget])]),
    )
    .unwrap();

    let marker = find(&output.unit, "scopeweave.inject.extend.ComCustomContributesWidget");
    assert_eq!(marker.kind, DeclarationKind::Property);
    assert_eq!(marker.origin, Some("com.custom.ContributesWidget".into()));
}

#[test]
fn test_option_annotations_defer_the_merge() {
    let options = ProcessorOptions::from_map(&BTreeMap::from([(
        CONTRIBUTING_ANNOTATIONS_OPTION.to_string(),
        "com.custom.ContributesWidget".to_string(),
    )]));
    let widget = interface("Widget").annotated(AnnotationUsage::new("com.custom.ContributesWidget"));

    let output = run(
        options,
        unit(vec![("App.kt", vec![merge_request("AppComponent"), widget])]),
    )
    .unwrap();

    // Deferred once, finalized in the second round, then an empty round.
    assert_eq!(output.rounds, 3);
    assert_eq!(output.generated.len(), 1);
}

#[test]
fn test_custom_annotation_in_same_compilation_defers_the_merge() {
    let widget_annotation =
        Declaration::new(DeclarationKind::Annotation, "com.custom", "ContributesWidget")
            .annotated(AnnotationUsage::new(names::CONTRIBUTING_ANNOTATION));
    let widget = Declaration::new(DeclarationKind::Class, "com.app", "Widget")
        .annotated(AnnotationUsage::new("com.custom.ContributesWidget"));

    let output = run(
        ProcessorOptions::default(),
        unit(vec![
            ("Widget.kt", vec![widget_annotation, widget]),
            ("App.kt", vec![merge_request("AppComponent")]),
        ]),
    )
    .unwrap();

    // Round 1 writes the marker property and defers; round 2 merges.
    assert_eq!(output.rounds, 3);
    assert_eq!(
        output.generated,
        vec![
            scopeweave::symbols::FileId::new(
                "generated/scopeweave.inject.extend.ComCustomContributesWidget"
            ),
            scopeweave::symbols::FileId::new("generated/com.app.AppComponentMerged"),
        ]
    );
}

#[test]
fn test_subcomponent_from_prior_compilation_is_finalized() {
    let library = run(
        ProcessorOptions::default(),
        unit(vec![(
            "LoggedIn.kt",
            subcomponent("LoggedIn", "com.app.LoggedInScope", APP_SCOPE),
        )]),
    )
    .unwrap();

    let mut session = Session::new(ProcessorOptions::default(), SessionConfig::default());
    session.add_dependency(library.unit).unwrap();
    session
        .add_sources(unit(vec![(
            "AppComponent.kt",
            vec![merge_request("AppComponent")],
        )]))
        .unwrap();
    let output = session.run().unwrap();

    assert_eq!(
        supertypes(find(&output.unit, "com.app.AppComponentMerged")),
        vec![
            "scopeweave.inject.lookup.ComAppLoggedInFactory",
            "com.app.AppComponent.LoggedInFinal.Factory"
        ]
    );

    let component = find(&output.unit, "com.app.AppComponent.LoggedInFinal");
    assert_eq!(
        supertypes(component),
        vec!["com.app.LoggedIn", "com.app.AppComponent.LoggedInFinalMerged"]
    );
    assert_eq!(component.constructor[0].type_name.as_str(), "com.app.AppComponent");
    assert_eq!(component.constructor[1].name, "user");

    let factory = find(&output.unit, "com.app.AppComponent.LoggedInFinal.Factory");
    assert_eq!(supertypes(factory), vec!["com.app.LoggedIn.Factory"]);
}
