//! Feature structure tree nodes.
//!
//! An [`FstNode`] is the unit of superimposition: a typed declaration with an
//! optional name, ordered children and the byte span it was parsed from. Nodes
//! are only ever produced by a successful parse and are read-only afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// SPANS
// ============================================================================

/// A byte range `[start, end)` into the snippet a node was parsed from.
///
/// # Examples
///
/// ```rust
/// use fstparse::fst::Span;
/// let span = Span::new(7, 10);
/// assert_eq!(span.slice("public void foo()"), Some("voi"));
/// assert_eq!(span.len(), 3);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} past end {end}");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The same span moved `offset` bytes to the right.
    pub fn shifted(self, offset: usize) -> Span {
        Span::new(self.start + offset, self.end + offset)
    }

    /// True when `other` lies entirely within this span.
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Reconstructs the text this span covers. `None` if the span does not
    /// fit `source` or splits a UTF-8 sequence.
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start..self.end)
    }

    /// 1-based line and column of the span start.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let prefix = source.get(..self.start).unwrap_or(source);
        let line = prefix.matches('\n').count() + 1;
        let column = match prefix.rfind('\n') {
            Some(newline) => prefix[newline + 1..].chars().count() + 1,
            None => prefix.chars().count() + 1,
        };
        (line, column)
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        miette::SourceSpan::from(span.start..span.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ============================================================================
// NODE KINDS
// ============================================================================

/// What syntactic construct a node stands for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Class,
    Interface,
    Struct,
    Enum,
    Method,
    Constructor,
    Field,
    Property,
    Initializer,
    Function,
    Declaration,
    Variable,
    Parameter,
    Identifier,
}

impl NodeKind {
    pub const ALL: [NodeKind; 14] = [
        NodeKind::Class,
        NodeKind::Interface,
        NodeKind::Struct,
        NodeKind::Enum,
        NodeKind::Method,
        NodeKind::Constructor,
        NodeKind::Field,
        NodeKind::Property,
        NodeKind::Initializer,
        NodeKind::Function,
        NodeKind::Declaration,
        NodeKind::Variable,
        NodeKind::Parameter,
        NodeKind::Identifier,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Class => "class",
            NodeKind::Interface => "interface",
            NodeKind::Struct => "struct",
            NodeKind::Enum => "enum",
            NodeKind::Method => "method",
            NodeKind::Constructor => "constructor",
            NodeKind::Field => "field",
            NodeKind::Property => "property",
            NodeKind::Initializer => "initializer",
            NodeKind::Function => "function",
            NodeKind::Declaration => "declaration",
            NodeKind::Variable => "variable",
            NodeKind::Parameter => "parameter",
            NodeKind::Identifier => "identifier",
        }
    }

    /// Type declarations: their members become children.
    pub const fn is_type(&self) -> bool {
        matches!(
            self,
            NodeKind::Class | NodeKind::Interface | NodeKind::Struct | NodeKind::Enum
        )
    }

    /// Kinds whose declared name is also materialised as an `identifier` child.
    pub const fn has_identifier_child(&self) -> bool {
        matches!(
            self,
            NodeKind::Class
                | NodeKind::Interface
                | NodeKind::Struct
                | NodeKind::Enum
                | NodeKind::Method
                | NodeKind::Constructor
                | NodeKind::Property
                | NodeKind::Function
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown node kind '{s}'"))
    }
}

// ============================================================================
// NODES
// ============================================================================

/// A structural node produced by parsing one production.
///
/// Invariants (checked by [`FstNode::check_spans`]):
/// - every child span and the body span lie inside the node span
/// - sibling spans do not overlap and appear in source order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FstNode {
    kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<FstNode>,
    span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<Span>,
}

impl FstNode {
    pub(crate) fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            name: None,
            children: Vec::new(),
            span,
            body: None,
        }
    }

    pub(crate) fn named(kind: NodeKind, name: impl Into<String>, span: Span) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(kind, span)
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn children(&self) -> &[FstNode] {
        &self.children
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Span of the implementation text (block, expression body, initializer).
    pub fn body(&self) -> Option<Span> {
        self.body
    }

    pub fn is_terminal(&self) -> bool {
        self.children.is_empty()
    }

    /// The source text this node was parsed from.
    pub fn text<'a>(&self, source: &'a str) -> Option<&'a str> {
        self.span.slice(source)
    }

    /// Pre-order walk over this node and all descendants.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// First descendant (pre-order, excluding `self`) of the given kind.
    pub fn find_kind(&self, kind: NodeKind) -> Option<&FstNode> {
        self.walk().skip(1).find(|node| node.kind == kind)
    }

    pub fn children_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &FstNode> {
        self.children.iter().filter(move |child| child.kind == kind)
    }

    /// Verifies the span invariants for the whole subtree.
    pub fn check_spans(&self) -> Result<(), String> {
        if let Some(body) = self.body {
            if !self.span.contains(body) {
                return Err(format!(
                    "{} body {} escapes node span {}",
                    self.kind, body, self.span
                ));
            }
        }
        let mut previous_end = self.span.start;
        for child in &self.children {
            if !self.span.contains(child.span) {
                return Err(format!(
                    "{} child {} at {} escapes parent span {}",
                    self.kind, child.kind, child.span, self.span
                ));
            }
            if child.span.start < previous_end {
                return Err(format!(
                    "{} child {} at {} overlaps or precedes its previous sibling",
                    self.kind, child.kind, child.span
                ));
            }
            previous_end = child.span.end;
            child.check_spans()?;
        }
        Ok(())
    }

    /// Indented tree rendering, one node per line.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        self.pretty_into(&mut out, 0);
        out
    }

    fn pretty_into(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(self.kind.as_str());
        if let Some(name) = &self.name {
            out.push_str(" \"");
            out.push_str(name);
            out.push('"');
        }
        out.push_str(&format!(" @{}", self.span));
        if let Some(body) = self.body {
            out.push_str(&format!(" body@{body}"));
        }
        out.push('\n');
        for child in &self.children {
            child.pretty_into(out, depth + 1);
        }
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub(crate) fn set_body(&mut self, body: Span) {
        self.body = Some(body);
    }

    pub(crate) fn push_child(&mut self, child: FstNode) {
        self.children.push(child);
    }

    /// Moves every span in the subtree `offset` bytes to the right.
    pub(crate) fn shifted(mut self, offset: usize) -> Self {
        self.span = self.span.shifted(offset);
        self.body = self.body.map(|body| body.shifted(offset));
        self.children = self
            .children
            .into_iter()
            .map(|child| child.shifted(offset))
            .collect();
        self
    }
}

impl fmt::Display for FstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pretty().trim_end())
    }
}

/// Iterator returned by [`FstNode::walk`].
pub struct Walk<'a> {
    stack: Vec<&'a FstNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a FstNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
