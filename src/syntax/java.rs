//! Java member and type declarations.

use pest_derive::Parser;

use crate::engine::{Boundary, GrammarEngine, SyntaxError};
use crate::fst::{FstNode, NodeKind, Span};
use crate::syntax::{parse_with, NodeRole, RuleRole};
use crate::target::{Language, Production};

#[derive(Parser)]
#[grammar = "syntax/java.pest"]
struct JavaGrammar;

impl RuleRole for Rule {
    fn role(&self) -> NodeRole {
        match self {
            Rule::method_declaration => NodeRole::Node(NodeKind::Method),
            Rule::constructor_declaration | Rule::compact_constructor => {
                NodeRole::Node(NodeKind::Constructor)
            }
            Rule::field_declaration => NodeRole::Node(NodeKind::Field),
            Rule::initializer_block => NodeRole::Node(NodeKind::Initializer),
            Rule::class_declaration | Rule::record_declaration => NodeRole::Node(NodeKind::Class),
            Rule::interface_declaration | Rule::annotation_type_declaration => {
                NodeRole::Node(NodeKind::Interface)
            }
            Rule::enum_declaration => NodeRole::Node(NodeKind::Enum),
            Rule::variable_declarator => NodeRole::Node(NodeKind::Variable),
            Rule::formal_parameter => NodeRole::Node(NodeKind::Parameter),
            Rule::decl_name => NodeRole::Name,
            Rule::block | Rule::initializer => NodeRole::Body,
            Rule::modifiers
            | Rule::type_parameters
            | Rule::result_type
            | Rule::type_ref
            | Rule::type_list
            | Rule::class_type
            | Rule::permits_clause
            | Rule::element_value
            | Rule::throws_clause => NodeRole::Opaque,
            _ => NodeRole::Transparent,
        }
    }
}

/// Java grammar engine. Stateless; one is built per parse call.
#[derive(Debug, Default)]
pub struct JavaEngine;

impl JavaEngine {
    pub fn new() -> Self {
        Self
    }

    fn entry_rule(production: Production) -> Option<Rule> {
        match production {
            Production::ClassMember => Some(Rule::class_member_entry),
            Production::Method => Some(Rule::method_entry),
            Production::Constructor => Some(Rule::constructor_entry),
            Production::Field => Some(Rule::field_entry),
            Production::Type => Some(Rule::type_entry),
            Production::Property
            | Production::ExternalDeclaration
            | Production::Function
            | Production::Declaration => None,
        }
    }
}

impl GrammarEngine for JavaEngine {
    fn language(&self) -> Language {
        Language::Java
    }

    fn parse(
        &mut self,
        input: &str,
        production: Production,
        boundary: Boundary,
    ) -> Result<FstNode, SyntaxError> {
        let entry = Self::entry_rule(production).ok_or_else(|| SyntaxError {
            message: format!("java has no {production} production"),
            label: "not parsed".to_string(),
            span: Span::new(0, 0),
        })?;
        parse_with::<JavaGrammar, Rule>(input, entry, Rule::trailing, boundary)
    }
}
