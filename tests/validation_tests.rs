// tests/validation_tests.rs

mod common;

use fstparse::config::AdapterConfig;
use fstparse::{
    validate, Constraint, ConstraintSet, ErrorKind, Language, NodeKind, Production, Snippet,
    SnippetAdapter,
};

use common::fixture;

fn inline(text: &str, language: Language, production: Production) -> Snippet {
    Snippet::inline(text, language, production)
}

#[test]
fn signature_only_rejects_a_method_body() {
    let constraints = ConstraintSet::new().with(Constraint::SignatureOnly);
    let adapter = SnippetAdapter::default();

    let err = adapter
        .parse(
            &inline("void run() { go(); }", Language::Java, Production::Method),
            Some(&constraints),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralConstraintViolation);
    assert_eq!(err.span().map(|s| s.start), Some(11));

    adapter
        .parse(
            &inline("abstract void run();", Language::Java, Production::Method),
            Some(&constraints),
        )
        .unwrap();
}

#[test]
fn forbid_kind_looks_below_the_root() {
    let constraints = ConstraintSet::new().with(Constraint::ForbidKind(NodeKind::Method));
    let text = "class Holder { int value; int get() { return value; } }";
    let err = SnippetAdapter::default()
        .parse(&inline(text, Language::Java, Production::Type), Some(&constraints))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralConstraintViolation);
    assert!(err.to_string().contains("method is not allowed"), "{err}");
}

#[test]
fn defaults_demand_a_named_declaration() {
    let adapter = SnippetAdapter::default();
    let err = adapter
        .parse(
            &inline("struct { int x; };", Language::C, Production::Declaration),
            None,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralConstraintViolation);

    let node = adapter
        .parse(
            &inline("struct { int x; };", Language::C, Production::Declaration),
            Some(&ConstraintSet::new()),
        )
        .unwrap();
    assert_eq!(node.name(), None);
}

#[test]
fn parameter_budget_via_child_count() {
    let constraints = ConstraintSet::new().with(Constraint::ChildCount {
        kind: NodeKind::Parameter,
        min: 0,
        max: Some(2),
    });
    let adapter = SnippetAdapter::default();
    let ok = adapter.parse(
        &inline("int add(int a, int b);", Language::C, Production::Function),
        Some(&constraints),
    );
    assert!(ok.is_ok());
    let err = adapter
        .parse(
            &inline("int add3(int a, int b, int c);", Language::C, Production::Function),
            Some(&constraints),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralConstraintViolation);
}

#[test]
fn config_file_overrides_production_defaults() {
    let config = AdapterConfig::load(fixture("config/signature_only.yaml")).unwrap();
    let adapter = SnippetAdapter::from_config(&config);
    assert!(adapter.strict());

    let method = Snippet::from_file(fixture("method.java"), Language::Java, Production::Method);
    let err = adapter.parse(&method, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralConstraintViolation);

    // Other pairs keep their defaults.
    let csharp = inline("void Run() { }", Language::CSharp, Production::Method);
    assert!(adapter.parse(&csharp, None).is_ok());
}

#[test]
fn config_constraints_use_plain_yaml_maps() {
    let config = AdapterConfig::load(fixture("config/shapes.yaml")).unwrap();
    assert_eq!(
        config.targets[0].constraints.constraints(),
        &[
            Constraint::RootKindIn(vec![NodeKind::Function]),
            Constraint::ExactlyOneChild(NodeKind::Identifier),
            Constraint::ChildCount {
                kind: NodeKind::Parameter,
                min: 0,
                max: Some(2),
            },
        ]
    );

    let adapter = SnippetAdapter::from_config(&config);
    let c = |text: &str| inline(text, Language::C, Production::Function);
    assert!(adapter.parse(&c("int add(int a, int b);"), None).is_ok());
    let err = adapter.parse(&c("int add3(int a, int b, int c);"), None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralConstraintViolation);

    let text = "class Bag { int Count { get; } }";
    let err = adapter
        .parse(&inline(text, Language::CSharp, Production::Type), None)
        .unwrap_err();
    assert!(err.to_string().contains("property is not allowed"), "{err}");
}

#[test]
fn validate_is_usable_on_its_own() {
    let node = fstparse::parse_snippet(
        "public Point(int x) { }",
        Language::CSharp,
        Production::Constructor,
        true,
    )
    .unwrap();
    let defaults = ConstraintSet::for_production(Production::Constructor);
    assert_eq!(validate(&node, &defaults), Ok(()));

    let wrong_root = ConstraintSet::new().with(Constraint::RootKindIn(vec![NodeKind::Method]));
    let violation = validate(&node, &wrong_root).unwrap_err();
    assert_eq!(violation.span, node.span());
}
