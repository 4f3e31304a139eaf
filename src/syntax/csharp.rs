//! C# member and type declarations.

use pest_derive::Parser;

use crate::engine::{Boundary, GrammarEngine, SyntaxError};
use crate::fst::{FstNode, NodeKind, Span};
use crate::syntax::{parse_with, NodeRole, RuleRole};
use crate::target::{Language, Production};

#[derive(Parser)]
#[grammar = "syntax/csharp.pest"]
struct CSharpGrammar;

impl RuleRole for Rule {
    fn role(&self) -> NodeRole {
        match self {
            Rule::method_declaration
            | Rule::destructor_declaration
            | Rule::operator_declaration
            | Rule::conversion_declaration => NodeRole::Node(NodeKind::Method),
            Rule::constructor_declaration => NodeRole::Node(NodeKind::Constructor),
            Rule::property_declaration | Rule::indexer_declaration => {
                NodeRole::Node(NodeKind::Property)
            }
            Rule::field_declaration => NodeRole::Node(NodeKind::Field),
            Rule::class_declaration => NodeRole::Node(NodeKind::Class),
            Rule::struct_declaration => NodeRole::Node(NodeKind::Struct),
            Rule::interface_declaration => NodeRole::Node(NodeKind::Interface),
            Rule::enum_declaration => NodeRole::Node(NodeKind::Enum),
            Rule::variable_declarator => NodeRole::Node(NodeKind::Variable),
            Rule::formal_parameter => NodeRole::Node(NodeKind::Parameter),
            Rule::decl_name
            | Rule::destructor_name
            | Rule::operator_name
            | Rule::conversion_name
            | Rule::indexer_name => NodeRole::Name,
            Rule::block | Rule::expression_body | Rule::initializer => NodeRole::Body,
            Rule::modifiers
            | Rule::attribute_section
            | Rule::type_parameters
            | Rule::type_constraints
            | Rule::return_type
            | Rule::type_ref
            | Rule::base_list
            | Rule::interface_qualifier
            | Rule::constructor_initializer
            | Rule::conversion_kind
            | Rule::default_value => NodeRole::Opaque,
            _ => NodeRole::Transparent,
        }
    }
}

/// C# grammar engine.
#[derive(Debug, Default)]
pub struct CSharpEngine;

impl CSharpEngine {
    pub fn new() -> Self {
        Self
    }

    fn entry_rule(production: Production) -> Option<Rule> {
        match production {
            Production::ClassMember => Some(Rule::class_member_entry),
            Production::Method => Some(Rule::method_entry),
            Production::Constructor => Some(Rule::constructor_entry),
            Production::Field => Some(Rule::field_entry),
            Production::Property => Some(Rule::property_entry),
            Production::Type => Some(Rule::type_entry),
            Production::ExternalDeclaration | Production::Function | Production::Declaration => {
                None
            }
        }
    }
}

impl GrammarEngine for CSharpEngine {
    fn language(&self) -> Language {
        Language::CSharp
    }

    fn parse(
        &mut self,
        input: &str,
        production: Production,
        boundary: Boundary,
    ) -> Result<FstNode, SyntaxError> {
        let entry = Self::entry_rule(production).ok_or_else(|| SyntaxError {
            message: format!("csharp has no {production} production"),
            label: "not parsed".to_string(),
            span: Span::new(0, 0),
        })?;
        parse_with::<CSharpGrammar, Rule>(input, entry, Rule::trailing, boundary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str, production: Production) -> Result<FstNode, SyntaxError> {
        CSharpEngine::new().parse(input, production, Boundary::Strict)
    }

    fn child_names(node: &FstNode) -> Vec<(NodeKind, Option<&str>)> {
        node.children().iter().map(|c| (c.kind(), c.name())).collect()
    }

    #[test]
    fn entry_rules_match_declared_productions() {
        for production in Production::ALL {
            assert_eq!(
                CSharpEngine::entry_rule(production).is_some(),
                Language::CSharp.supports(production),
                "{production}"
            );
        }
    }

    #[test]
    fn empty_method_has_only_its_identifier() {
        let node = parse("public void foo() { }", Production::Method).unwrap();
        assert_eq!(node.kind(), NodeKind::Method);
        assert_eq!(node.name(), Some("foo"));
        assert_eq!(child_names(&node), vec![(NodeKind::Identifier, Some("foo"))]);
        assert_eq!(node.span(), Span::new(0, 21));
    }

    #[test]
    fn method_parameters_with_modifiers_and_defaults() {
        let src = "[Obsolete] public static async Task<int?> Sum<T>(this IList<T> xs, ref int acc, params int[] rest, string sep = \",\") where T : struct { return 0; }";
        let node = parse(src, Production::Method).unwrap();
        assert_eq!(
            child_names(&node),
            vec![
                (NodeKind::Identifier, Some("Sum")),
                (NodeKind::Parameter, Some("xs")),
                (NodeKind::Parameter, Some("acc")),
                (NodeKind::Parameter, Some("rest")),
                (NodeKind::Parameter, Some("sep")),
            ]
        );
        assert_eq!(node.body().and_then(|b| b.slice(src)), Some("{ return 0; }"));
    }

    #[test]
    fn expression_bodied_and_explicit_interface_methods() {
        let src = "int Twice(int x) => x * 2;";
        let node = parse(src, Production::Method).unwrap();
        assert_eq!(node.body().and_then(|b| b.slice(src)), Some("x * 2"));

        let node = parse("void IDisposable.Dispose() { }", Production::Method).unwrap();
        assert_eq!(node.name(), Some("Dispose"));
    }

    #[test]
    fn properties_keep_accessors_as_body() {
        let src = "public List<string> Names { get; private set; } = new();";
        let node = parse(src, Production::Property).unwrap();
        assert_eq!(node.kind(), NodeKind::Property);
        assert_eq!(child_names(&node), vec![(NodeKind::Identifier, Some("Names"))]);
        assert_eq!(
            node.body().and_then(|b| b.slice(src)),
            Some("{ get; private set; }")
        );

        let node = parse("public int Count => items.Count;", Production::Property).unwrap();
        assert_eq!(node.name(), Some("Count"));
    }

    #[test]
    fn constructor_with_base_call() {
        let src = "public Point(int x, int y) : base(x) { Y = y; }";
        let node = parse(src, Production::Constructor).unwrap();
        assert_eq!(node.kind(), NodeKind::Constructor);
        assert_eq!(node.children().len(), 3);
        assert_eq!(node.body().and_then(|b| b.slice(src)), Some("{ Y = y; }"));
    }

    #[test]
    fn struct_members_become_children() {
        let src = "public readonly struct Pair<T> : IEquatable<Pair<T>>\n{\n    public readonly T Left, Right;\n    public Pair(T l, T r) { Left = l; Right = r; }\n    public bool IsEmpty => Left == null;\n    public bool Equals(Pair<T> other) => false;\n}";
        let node = parse(src, Production::Type).unwrap();
        assert_eq!(node.kind(), NodeKind::Struct);
        assert_eq!(
            child_names(&node),
            vec![
                (NodeKind::Identifier, Some("Pair")),
                (NodeKind::Field, Some("Left")),
                (NodeKind::Constructor, Some("Pair")),
                (NodeKind::Property, Some("IsEmpty")),
                (NodeKind::Method, Some("Equals")),
            ]
        );
        assert_eq!(node.children()[1].children().len(), 2);
    }

    #[test]
    fn class_member_dispatches_on_shape() {
        let kind = |src| parse(src, Production::ClassMember).unwrap().kind();
        assert_eq!(kind("Foo() { }"), NodeKind::Constructor);
        assert_eq!(kind("private string _name;"), NodeKind::Field);
        assert_eq!(kind("string Name { get; }"), NodeKind::Property);
        assert_eq!(kind("void Run();"), NodeKind::Method);
        assert_eq!(kind("enum Color : byte { Red, Green }"), NodeKind::Enum);
        assert_eq!(kind("record Person(string Name) { }"), NodeKind::Class);
    }

    #[test]
    fn special_members_parse_as_methods_and_properties() {
        let member = |src| parse(src, Production::ClassMember).unwrap();

        let finalizer = member("~Foo() { Release(); }");
        assert_eq!((finalizer.kind(), finalizer.name()), (NodeKind::Method, Some("~Foo")));

        let plus = member("public static Vec operator +(Vec a, Vec b) => a.Add(b);");
        assert_eq!((plus.kind(), plus.name()), (NodeKind::Method, Some("operator +")));
        assert_eq!(plus.children_of_kind(NodeKind::Parameter).count(), 2);

        let conversion = member("public static implicit operator int(Money m) { return m.Cents; }");
        assert_eq!(
            (conversion.kind(), conversion.name()),
            (NodeKind::Method, Some("operator int"))
        );

        let src = "public int this[int row, int col] { get => cells[row, col]; }";
        let indexer = member(src);
        assert_eq!(indexer.kind(), NodeKind::Property);
        assert_eq!(
            child_names(&indexer),
            vec![
                (NodeKind::Identifier, Some("this")),
                (NodeKind::Parameter, Some("row")),
                (NodeKind::Parameter, Some("col")),
            ]
        );
        assert_eq!(
            indexer.body().and_then(|b| b.slice(src)),
            Some("{ get => cells[row, col]; }")
        );
    }

    #[test]
    fn operators_are_reachable_from_the_method_production() {
        let src = "public static bool operator ==(Id a, Id b) => a.V == b.V;";
        let node = parse(src, Production::Method).unwrap();
        assert_eq!(node.name(), Some("operator =="));
        assert!(parse("~Foo() { }", Production::Method).is_ok());
        assert!(parse("int this[int i] => items[i];", Production::Property).is_ok());
    }

    #[test]
    fn events_with_accessors_are_properties() {
        let src =
            "public event EventHandler Changed { add { _h += value; } remove { _h -= value; } }";
        let node = parse(src, Production::ClassMember).unwrap();
        assert_eq!((node.kind(), node.name()), (NodeKind::Property, Some("Changed")));
        let field = parse("public event EventHandler Closed;", Production::ClassMember).unwrap();
        assert_eq!((field.kind(), field.name()), (NodeKind::Field, Some("Closed")));
    }

    #[test]
    fn trailing_comments_stay_outside_spans() {
        let src = "class A { }  // trailing note\n";
        let node = parse(src, Production::Type).unwrap();
        assert_eq!(node.text(src), Some("class A { }"));

        let src = "enum E { A }\n\n";
        assert_eq!(parse(src, Production::Type).unwrap().text(src), Some("enum E { A }"));

        let src = "class Outer { int P { get; }   /* gap */   int Q; }";
        let node = parse(src, Production::Type).unwrap();
        assert_eq!(node.children()[1].text(src), Some("int P { get; }"));
        assert_eq!(node.children()[2].text(src), Some("int Q;"));
        assert!(node.check_spans().is_ok());
    }

    #[test]
    fn positional_record_parameters_are_children() {
        let node = parse("public record Point(int X, int Y);", Production::Type).unwrap();
        assert_eq!(
            child_names(&node),
            vec![
                (NodeKind::Identifier, Some("Point")),
                (NodeKind::Parameter, Some("X")),
                (NodeKind::Parameter, Some("Y")),
            ]
        );
        assert_eq!(node.body(), None);
    }

    #[test]
    fn preprocessor_lines_are_skipped() {
        let src = "#if DEBUG\nprivate int _count;\n#endif\n";
        let node = parse(src, Production::Field).unwrap();
        assert_eq!(node.text(src), Some("private int _count;"));
    }

    #[test]
    fn verbatim_strings_do_not_confuse_bodies() {
        let src = "void f() { var s = @\"}\"\"{\"; }";
        assert!(parse(src, Production::Method).is_ok());
    }

    #[test]
    fn strict_rejects_second_member() {
        let err = parse("int A; int B;", Production::Field).unwrap_err();
        assert_eq!(err.span.start, 7);
    }
}
