//! C external declarations.

use pest_derive::Parser;

use crate::engine::{Boundary, GrammarEngine, SyntaxError};
use crate::fst::{FstNode, NodeKind, Span};
use crate::syntax::{parse_with, NodeRole, RuleRole};
use crate::target::{Language, Production};

#[derive(Parser)]
#[grammar = "syntax/c.pest"]
struct CGrammar;

impl RuleRole for Rule {
    fn role(&self) -> NodeRole {
        match self {
            Rule::function_definition => NodeRole::Node(NodeKind::Function),
            Rule::declaration => NodeRole::Node(NodeKind::Declaration),
            Rule::init_declarator => NodeRole::Node(NodeKind::Variable),
            Rule::parameter_declaration => NodeRole::Node(NodeKind::Parameter),
            Rule::decl_name => NodeRole::Name,
            Rule::tag_name => NodeRole::FallbackName,
            Rule::block | Rule::initializer => NodeRole::Body,
            Rule::pointer
            | Rule::declarator_suffix
            | Rule::struct_body
            | Rule::typedef_name
            | Rule::attribute_spec => NodeRole::Opaque,
            _ => NodeRole::Transparent,
        }
    }
}

/// C grammar engine.
#[derive(Debug, Default)]
pub struct CEngine;

impl CEngine {
    pub fn new() -> Self {
        Self
    }

    fn entry_rule(production: Production) -> Option<Rule> {
        match production {
            Production::ExternalDeclaration => Some(Rule::external_declaration_entry),
            Production::Function => Some(Rule::function_entry),
            Production::Declaration => Some(Rule::declaration_entry),
            Production::ClassMember
            | Production::Method
            | Production::Constructor
            | Production::Field
            | Production::Property
            | Production::Type => None,
        }
    }
}

impl GrammarEngine for CEngine {
    fn language(&self) -> Language {
        Language::C
    }

    fn parse(
        &mut self,
        input: &str,
        production: Production,
        boundary: Boundary,
    ) -> Result<FstNode, SyntaxError> {
        let entry = Self::entry_rule(production).ok_or_else(|| SyntaxError {
            message: format!("c has no {production} production"),
            label: "not parsed".to_string(),
            span: Span::new(0, 0),
        })?;
        parse_with::<CGrammar, Rule>(input, entry, Rule::trailing, boundary)
    }
}
