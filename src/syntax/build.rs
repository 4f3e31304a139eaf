//! Turns pest parse trees into [`FstNode`]s.
//!
//! Grammars agree on a small vocabulary of rule roles rather than on rule
//! names, so one builder serves every language.

use pest::error::{Error, InputLocation};
use pest::iterators::{Pair, Pairs};
use pest::{Parser, RuleType};

use crate::engine::{Boundary, SyntaxError};
use crate::fst::{FstNode, NodeKind, Span};

/// What a grammar rule contributes to the tree.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum NodeRole {
    /// The rule is a declaration and becomes a node.
    Node(NodeKind),
    /// The declared name of the enclosing node.
    Name,
    /// A name used only when nothing else names a declaration (C struct tags).
    FallbackName,
    /// The opaque implementation text of the enclosing node.
    Body,
    /// Descend into the rule's children.
    Transparent,
    /// Skip the rule and everything below it.
    Opaque,
}

pub(crate) trait RuleRole: RuleType {
    fn role(&self) -> NodeRole;

    /// Human-readable rule name for syntax error messages.
    fn describe(&self) -> String {
        format!("{self:?}").replace('_', " ")
    }
}

/// Runs `entry` over `input` and builds the root node.
///
/// Under [`Boundary::Strict`] the `trailing` rule (`SOI ~ EOI`) must accept
/// whatever follows the production.
pub(crate) fn parse_with<P, R>(
    input: &str,
    entry: R,
    trailing: R,
    boundary: Boundary,
) -> Result<FstNode, SyntaxError>
where
    P: Parser<R>,
    R: RuleRole,
{
    let pairs = P::parse(entry, input).map_err(|e| convert_parse_error(e, input))?;
    let is_trivia = |text: &str| P::parse(trailing, text).is_ok();
    let builder = Builder {
        input,
        is_trivia: &is_trivia,
    };
    let root = builder.root(pairs).ok_or_else(|| SyntaxError {
        message: format!("{} matched no declaration", entry.describe()),
        label: "expected a declaration".to_string(),
        span: Span::new(0, input.len()),
    })?;

    if boundary == Boundary::Strict {
        let end = root.span().end;
        if let Err(e) = P::parse(trailing, &input[end..]) {
            let offset = end
                + match e.location {
                    InputLocation::Pos(pos) => pos,
                    InputLocation::Span((start, _)) => start,
                };
            return Err(SyntaxError {
                message: format!("unexpected content after the {}", root.kind()),
                label: "trailing content starts here".to_string(),
                span: Span::new(offset, input.len()),
            });
        }
    }

    debug_assert!(root.check_spans().is_ok(), "{:?}", root.check_spans());
    Ok(root)
}

struct Builder<'i> {
    input: &'i str,
    /// Accepts text made only of whitespace and comments.
    is_trivia: &'i dyn Fn(&str) -> bool,
}

impl Builder<'_> {
    fn root<R: RuleRole>(&self, pairs: Pairs<'_, R>) -> Option<FstNode> {
        for pair in pairs {
            match pair.as_rule().role() {
                NodeRole::Node(kind) => return Some(self.node(pair, kind)),
                NodeRole::Transparent => {
                    if let Some(node) = self.root(pair.into_inner()) {
                        return Some(node);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn node<R: RuleRole>(&self, pair: Pair<'_, R>, kind: NodeKind) -> FstNode {
        let mut node = FstNode::new(kind, self.span_of(&pair));
        let mut fallback = None;
        self.collect(&mut node, pair.into_inner(), &mut fallback);

        if node.name().is_none() && matches!(kind, NodeKind::Field | NodeKind::Declaration) {
            let first = node.children().first().and_then(|c| c.name()).map(str::to_owned);
            if let Some(name) = first.or(fallback) {
                node.set_name(name);
            }
        }
        node
    }

    fn collect<R: RuleRole>(
        &self,
        node: &mut FstNode,
        pairs: Pairs<'_, R>,
        fallback: &mut Option<String>,
    ) {
        for pair in pairs {
            match pair.as_rule().role() {
                NodeRole::Node(kind) => node.push_child(self.node(pair, kind)),
                NodeRole::Name => {
                    if node.name().is_none() {
                        let name = pair.as_str().to_string();
                        if node.kind().has_identifier_child() {
                            node.push_child(FstNode::named(
                                NodeKind::Identifier,
                                name.clone(),
                                self.span_of(&pair),
                            ));
                        }
                        node.set_name(name);
                    }
                }
                NodeRole::FallbackName => {
                    if fallback.is_none() {
                        *fallback = Some(pair.as_str().to_string());
                    }
                }
                NodeRole::Body => {
                    if node.body().is_none() {
                        node.set_body(self.span_of(&pair));
                    }
                }
                NodeRole::Transparent => self.collect(node, pair.into_inner(), fallback),
                NodeRole::Opaque => {}
            }
        }
    }

    /// The pair's span without trailing whitespace and comments.
    ///
    /// pest skips trivia before an optional element even when the element
    /// then fails to match, so a rule ending in `x?` can end after trivia.
    fn span_of<R: RuleType>(&self, pair: &Pair<'_, R>) -> Span {
        let span = pair.as_span();
        let (start, end) = (span.start(), span.end());
        let end = (start..end)
            .filter(|&at| self.input.is_char_boundary(at))
            .find(|&at| (self.is_trivia)(&self.input[at..end]))
            .unwrap_or(end);
        Span::new(start, end)
    }
}

fn convert_parse_error<R: RuleRole>(error: Error<R>, input: &str) -> SyntaxError {
    let span = match error.location {
        InputLocation::Pos(pos) => Span::new(pos, pos),
        InputLocation::Span((start, end)) => Span::new(start, end),
    };
    let detail = error
        .renamed_rules(|rule| rule.describe())
        .variant
        .message()
        .into_owned();

    let message = if span.start >= input.trim_end().len() {
        format!("unexpected end of input, {detail}")
    } else {
        detail
    };

    SyntaxError {
        message,
        label: "does not match here".to_string(),
        span,
    }
}
