//! Traversal expressions.
//!
//! Composition directives locate nodes with a small XPath-like path language.
//! This module parses an expression into a [`TraversalPlan`]; it never walks a
//! tree itself. Syntax errors surface as
//! [`SnippetError::TraversalQuerySyntax`] and are never confused with source
//! grammar errors.
//!
//! ```
//! use fstparse::traversal::{parse_traversal, Axis};
//!
//! let plan = parse_traversal("class//method[@name='run']").unwrap();
//! assert_eq!(plan.steps[1].axis, Axis::Descendant);
//! assert_eq!(plan.to_string(), "child::class/descendant::method[@name='run']");
//! ```

use std::fmt;
use std::str::FromStr;

use pest::error::InputLocation;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{SnippetError, SourceContext};
use crate::fst::{NodeKind, Span};

#[derive(Parser)]
#[grammar = "traversal/grammar.pest"]
struct TraversalGrammar;

/// Source name used in traversal diagnostics.
const EXPRESSION_NAME: &str = "<traversal>";

// ============================================================================
// PLAN
// ============================================================================

/// Where evaluation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    /// The node the expression is applied to.
    #[default]
    Context,
    /// The root of the tree.
    Root,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    #[serde(rename = "self")]
    SelfNode,
    Parent,
    Ancestor,
}

impl Axis {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Axis::Child => "child",
            Axis::Descendant => "descendant",
            Axis::DescendantOrSelf => "descendant-or-self",
            Axis::SelfNode => "self",
            Axis::Parent => "parent",
            Axis::Ancestor => "ancestor",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Axis> {
        [
            Axis::Child,
            Axis::Descendant,
            Axis::DescendantOrSelf,
            Axis::SelfNode,
            Axis::Parent,
            Axis::Ancestor,
        ]
        .into_iter()
        .find(|axis| axis.as_str() == keyword)
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeTest {
    Any,
    Kind(NodeKind),
}

impl NodeTest {
    pub fn matches(&self, kind: NodeKind) -> bool {
        match self {
            NodeTest::Any => true,
            NodeTest::Kind(expected) => *expected == kind,
        }
    }
}

impl fmt::Display for NodeTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeTest::Any => f.write_str("*"),
            NodeTest::Kind(kind) => write!(f, "{kind}"),
        }
    }
}

/// Node attributes a predicate can inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Attribute {
    Name,
    Kind,
}

impl Attribute {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Attribute::Name => "name",
            Attribute::Kind => "kind",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Comparison {
    Equal,
    NotEqual,
}

impl Comparison {
    pub const fn symbol(&self) -> &'static str {
        match self {
            Comparison::Equal => "=",
            Comparison::NotEqual => "!=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Predicate {
    /// 1-based position among the nodes selected by the step.
    Position(usize),
    Has(Attribute),
    Compare {
        attribute: Attribute,
        comparison: Comparison,
        value: String,
    },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Position(n) => write!(f, "{n}"),
            Predicate::Has(attribute) => write!(f, "@{}", attribute.as_str()),
            Predicate::Compare {
                attribute,
                comparison,
                value,
            } => {
                let quote = if value.contains('\'') { '"' } else { '\'' };
                write!(
                    f,
                    "@{}{}{quote}{value}{quote}",
                    attribute.as_str(),
                    comparison.symbol()
                )
            }
            Predicate::And(lhs, rhs) => {
                write_operand(f, lhs)?;
                f.write_str(" and ")?;
                write_operand(f, rhs)
            }
            Predicate::Or(lhs, rhs) => write!(f, "{lhs} or {rhs}"),
        }
    }
}

// `or` binds looser than `and`, so an `or` under an `and` needs parentheses.
fn write_operand(f: &mut fmt::Formatter<'_>, operand: &Predicate) -> fmt::Result {
    match operand {
        Predicate::Or(..) => write!(f, "({operand})"),
        _ => write!(f, "{operand}"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predicates: Vec<Predicate>,
}

impl Step {
    pub fn new(axis: Axis, test: NodeTest) -> Self {
        Self {
            axis,
            test,
            predicates: Vec::new(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.axis, self.test)?;
        for predicate in &self.predicates {
            write!(f, "[{predicate}]")?;
        }
        Ok(())
    }
}

/// A parsed traversal expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalPlan {
    pub anchor: Anchor,
    pub steps: Vec<Step>,
}

impl fmt::Display for TraversalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.anchor == Anchor::Root {
            f.write_str("/")?;
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl FromStr for TraversalPlan {
    type Err = SnippetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_traversal(s)
    }
}

// ============================================================================
// PARSER
// ============================================================================

/// Parses a traversal expression.
///
/// A step written after `//` without an axis uses the `descendant` axis; with
/// an explicit axis, a `descendant-or-self::*` step is inserted before it.
pub fn parse_traversal(expr: &str) -> Result<TraversalPlan, SnippetError> {
    let source = SourceContext::new(EXPRESSION_NAME, expr);
    let mut pairs = TraversalGrammar::parse(Rule::expression, expr)
        .map_err(|e| convert_error(&source, e))?;
    let expression = pairs.next().ok_or_else(|| {
        SnippetError::traversal_syntax(&source, "empty expression", Span::new(0, expr.len()))
    })?;

    let mut plan = TraversalPlan {
        anchor: Anchor::Context,
        steps: Vec::new(),
    };
    let mut descend = false;
    let mut first = true;

    for pair in expression.into_inner() {
        match pair.as_rule() {
            Rule::descendant_sep | Rule::child_sep => {
                if first {
                    plan.anchor = Anchor::Root;
                }
                descend = pair.as_rule() == Rule::descendant_sep;
            }
            Rule::step => {
                first = false;
                let (step, explicit_axis) = build_step(&source, pair)?;
                if descend && explicit_axis {
                    plan.steps.push(Step::new(Axis::DescendantOrSelf, NodeTest::Any));
                }
                let step = if descend && !explicit_axis {
                    Step {
                        axis: Axis::Descendant,
                        ..step
                    }
                } else {
                    step
                };
                plan.steps.push(step);
                descend = false;
            }
            _ => {}
        }
    }

    debug!(expression = expr, steps = plan.steps.len(), "parsed traversal expression");
    Ok(plan)
}

/// Returns the step and whether its axis was written out.
fn build_step(source: &SourceContext, pair: Pair<'_, Rule>) -> Result<(Step, bool), SnippetError> {
    let Some(inner) = pair.into_inner().next() else {
        return Err(SnippetError::traversal_syntax(source, "empty step", Span::new(0, 0)));
    };
    match inner.as_rule() {
        Rule::parent_step => Ok((Step::new(Axis::Parent, NodeTest::Any), true)),
        Rule::self_step => Ok((Step::new(Axis::SelfNode, NodeTest::Any), true)),
        _ => {
            let mut step = Step::new(Axis::Child, NodeTest::Any);
            let mut explicit_axis = false;
            for part in inner.into_inner() {
                match part.as_rule() {
                    Rule::axis => {
                        step.axis = Axis::from_keyword(part.as_str()).ok_or_else(|| {
                            SnippetError::traversal_syntax(
                                source,
                                format!("unknown axis '{}'", part.as_str()),
                                span_of(&part),
                            )
                        })?;
                        explicit_axis = true;
                    }
                    Rule::node_test => step.test = build_node_test(source, part)?,
                    Rule::predicate => {
                        let Some(or_expr) = part.into_inner().next() else {
                            continue;
                        };
                        step.predicates.push(build_or(source, or_expr)?);
                    }
                    _ => {}
                }
            }
            Ok((step, explicit_axis))
        }
    }
}

fn build_node_test(source: &SourceContext, pair: Pair<'_, Rule>) -> Result<NodeTest, SnippetError> {
    let Some(inner) = pair.into_inner().next() else {
        return Ok(NodeTest::Any);
    };
    match inner.as_rule() {
        Rule::kind_name => parse_kind(source, &inner).map(NodeTest::Kind),
        _ => Ok(NodeTest::Any),
    }
}

fn build_or(source: &SourceContext, pair: Pair<'_, Rule>) -> Result<Predicate, SnippetError> {
    let mut result: Option<Predicate> = None;
    for and_expr in pair.into_inner().filter(|p| p.as_rule() == Rule::and_expr) {
        let rhs = build_and(source, and_expr)?;
        result = Some(match result {
            Some(lhs) => Predicate::Or(Box::new(lhs), Box::new(rhs)),
            None => rhs,
        });
    }
    result.ok_or_else(|| {
        SnippetError::traversal_syntax(source, "empty predicate", span_of_str(source))
    })
}

fn build_and(source: &SourceContext, pair: Pair<'_, Rule>) -> Result<Predicate, SnippetError> {
    let mut result: Option<Predicate> = None;
    for atom in pair.into_inner().filter(|p| p.as_rule() == Rule::atom) {
        let rhs = build_atom(source, atom)?;
        result = Some(match result {
            Some(lhs) => Predicate::And(Box::new(lhs), Box::new(rhs)),
            None => rhs,
        });
    }
    result.ok_or_else(|| {
        SnippetError::traversal_syntax(source, "empty predicate", span_of_str(source))
    })
}

fn build_atom(source: &SourceContext, pair: Pair<'_, Rule>) -> Result<Predicate, SnippetError> {
    let atom_span = span_of(&pair);
    let Some(inner) = pair.into_inner().next() else {
        return Err(SnippetError::traversal_syntax(source, "empty predicate", atom_span));
    };
    match inner.as_rule() {
        Rule::position => {
            let position: usize = inner.as_str().parse().map_err(|_| {
                SnippetError::traversal_syntax(source, "position is too large", span_of(&inner))
            })?;
            if position == 0 {
                return Err(SnippetError::traversal_syntax(
                    source,
                    "positions start at 1",
                    span_of(&inner),
                ));
            }
            Ok(Predicate::Position(position))
        }
        Rule::attribute_test => {
            let attribute = first_attribute(source, inner, atom_span)?;
            Ok(Predicate::Has(attribute))
        }
        Rule::comparison => {
            let mut attribute = None;
            let mut comparison = Comparison::Equal;
            let mut value = None;
            for part in inner.into_inner() {
                match part.as_rule() {
                    Rule::attribute => attribute = Some(parse_attribute(source, &part)?),
                    Rule::comparator => {
                        if part.as_str() == "!=" {
                            comparison = Comparison::NotEqual;
                        }
                    }
                    Rule::literal => {
                        let text = part
                            .clone()
                            .into_inner()
                            .next()
                            .map(|p| p.as_str().to_string())
                            .unwrap_or_default();
                        value = Some((text, span_of(&part)));
                    }
                    _ => {}
                }
            }
            let (Some(attribute), Some((value, value_span))) = (attribute, value) else {
                return Err(SnippetError::traversal_syntax(
                    source,
                    "incomplete comparison",
                    atom_span,
                ));
            };
            if attribute == Attribute::Kind && value.parse::<NodeKind>().is_err() {
                return Err(SnippetError::traversal_syntax(
                    source,
                    format!("unknown node kind '{value}'"),
                    value_span,
                ));
            }
            Ok(Predicate::Compare {
                attribute,
                comparison,
                value,
            })
        }
        Rule::or_expr => build_or(source, inner),
        _ => Err(SnippetError::traversal_syntax(
            source,
            "unsupported predicate",
            atom_span,
        )),
    }
}

fn first_attribute(
    source: &SourceContext,
    pair: Pair<'_, Rule>,
    fallback: Span,
) -> Result<Attribute, SnippetError> {
    match pair.into_inner().find(|p| p.as_rule() == Rule::attribute) {
        Some(attribute) => parse_attribute(source, &attribute),
        None => Err(SnippetError::traversal_syntax(source, "missing attribute", fallback)),
    }
}

fn parse_attribute(
    source: &SourceContext,
    pair: &Pair<'_, Rule>,
) -> Result<Attribute, SnippetError> {
    match pair.as_str() {
        "name" => Ok(Attribute::Name),
        "kind" => Ok(Attribute::Kind),
        other => Err(SnippetError::traversal_syntax(
            source,
            format!("unknown attribute '@{other}', expected @name or @kind"),
            span_of(pair),
        )),
    }
}

fn parse_kind(source: &SourceContext, pair: &Pair<'_, Rule>) -> Result<NodeKind, SnippetError> {
    pair.as_str()
        .parse()
        .map_err(|message: String| SnippetError::traversal_syntax(source, message, span_of(pair)))
}

fn span_of(pair: &Pair<'_, Rule>) -> Span {
    let span = pair.as_span();
    Span::new(span.start(), span.end())
}

fn span_of_str(source: &SourceContext) -> Span {
    Span::new(0, source.content.len())
}

fn convert_error(source: &SourceContext, error: pest::error::Error<Rule>) -> SnippetError {
    let span = match error.location {
        InputLocation::Pos(pos) => Span::new(pos, pos),
        InputLocation::Span((start, end)) => Span::new(start, end),
    };
    let message = error
        .renamed_rules(|rule| describe(*rule).to_string())
        .variant
        .message()
        .into_owned();
    SnippetError::traversal_syntax(source, message, span)
}

fn describe(rule: Rule) -> &'static str {
    match rule {
        Rule::EOI => "end of expression",
        Rule::step | Rule::axis_step => "step",
        Rule::axis => "axis",
        Rule::node_test | Rule::kind_name | Rule::wildcard => "node test",
        Rule::predicate => "'['",
        Rule::or_expr | Rule::and_expr | Rule::atom => "predicate",
        Rule::kw_and => "'and'",
        Rule::kw_or => "'or'",
        Rule::comparator | Rule::equal | Rule::not_equal => "'=' or '!='",
        Rule::literal => "quoted literal",
        Rule::attribute => "attribute name",
        Rule::position => "position",
        Rule::descendant_sep | Rule::child_sep => "'/'",
        _ => "token",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn plan(expr: &str) -> TraversalPlan {
        parse_traversal(expr).unwrap()
    }

    fn syntax_error(expr: &str) -> SnippetError {
        let err = parse_traversal(expr).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TraversalQuerySyntaxError);
        err
    }

    #[test]
    fn explicit_axis_and_name_predicate() {
        let p = plan("child::method[@name='foo']");
        assert_eq!(p.anchor, Anchor::Context);
        assert_eq!(
            p.steps,
            vec![Step {
                axis: Axis::Child,
                test: NodeTest::Kind(NodeKind::Method),
                predicates: vec![Predicate::Compare {
                    attribute: Attribute::Name,
                    comparison: Comparison::Equal,
                    value: "foo".to_string(),
                }],
            }]
        );
    }

    #[test]
    fn unclosed_predicate_is_a_syntax_error() {
        let err = syntax_error("child::method[@name='foo'");
        assert_eq!(err.span().map(|s| s.start), Some(25));
    }

    #[test]
    fn double_slash_means_descendant() {
        let p = plan("//class//field");
        assert_eq!(p.anchor, Anchor::Root);
        assert!(p.steps.iter().all(|s| s.axis == Axis::Descendant));
        assert_eq!(p.to_string(), "/descendant::class/descendant::field");
    }

    #[test]
    fn double_slash_before_explicit_axis_inserts_step() {
        let p = plan("class//child::method");
        assert_eq!(
            p.to_string(),
            "child::class/descendant-or-self::*/child::method"
        );
    }

    #[test]
    fn dot_steps() {
        assert_eq!(plan("../.").to_string(), "parent::*/self::*");
    }

    #[test]
    fn boolean_predicates_keep_precedence() {
        let p = plan("*[@name='a' or @name='b' and @kind!='field'][2]");
        assert_eq!(
            p.to_string(),
            "child::*[@name='a' or @name='b' and @kind!='field'][2]"
        );
        let p = plan("method[(@name='a' or @name='b') and @name]");
        assert_eq!(
            p.to_string(),
            "child::method[(@name='a' or @name='b') and @name]"
        );
    }

    #[test]
    fn canonical_form_reparses_to_same_plan() {
        for expr in [
            "/class/method[1]",
            "descendant-or-self::parameter[@name]",
            "ancestor::*[@kind='class']",
            "field[@name=\"it's\"]",
        ] {
            let p = plan(expr);
            assert_eq!(plan(&p.to_string()), p, "{expr}");
        }
    }

    #[test]
    fn rejects_unknown_names_and_position_zero() {
        assert!(syntax_error("child::widget").to_string().contains("widget"));
        assert!(syntax_error("method[@visibility='public']")
            .to_string()
            .contains("@visibility"));
        assert!(syntax_error("method[0]").to_string().contains("start at 1"));
        assert!(syntax_error("*[@kind='widget']").to_string().contains("widget"));
    }

    #[test]
    fn rejects_malformed_paths() {
        syntax_error("");
        syntax_error("method/");
        syntax_error("child:method");
        syntax_error("method[]");
        syntax_error("method[@name=foo]");
    }

    #[test]
    fn plans_serialize() {
        let json = serde_json::to_string(&plan("self::method")).unwrap();
        assert_eq!(
            json,
            r#"{"anchor":"context","steps":[{"axis":"self","test":{"kind":"method"}}]}"#
        );
    }
}
