//! Shape checks on parsed nodes.
//!
//! A parse can succeed and still yield a node the composition engine cannot
//! superimpose: a method with a body where only a signature is allowed, a
//! field without declarators. Callers describe the acceptable shape with a
//! [`ConstraintSet`] and the adapter runs it after the grammar succeeds.
//!
//! Constraints run in order and the first failure wins. Validators never
//! mutate the node.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fst::{FstNode, NodeKind, Span};
use crate::target::Production;

/// Why a node was rejected, and where.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct Violation {
    pub reason: String,
    pub span: Span,
}

impl Violation {
    pub fn new(reason: impl Into<String>, span: Span) -> Self {
        Self {
            reason: reason.into(),
            span,
        }
    }
}

/// A check on the shape of a parsed root node.
pub trait ShapeValidator: Send + Sync {
    fn check(&self, root: &FstNode) -> Result<(), Violation>;
}

/// Declarative shape rules, as written in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Constraint {
    /// The root's kind is one of these.
    RootKindIn(Vec<NodeKind>),
    /// The root has exactly one direct child of this kind.
    ExactlyOneChild(NodeKind),
    /// The number of direct children of `kind` lies within `min..=max`.
    ChildCount {
        kind: NodeKind,
        #[serde(default)]
        min: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
    },
    /// No node below the root has this kind.
    ForbidKind(NodeKind),
    /// The root carries no body.
    SignatureOnly,
    /// The root carries a body.
    RequireBody,
    /// The root is named.
    RequireName,
}

impl ShapeValidator for Constraint {
    fn check(&self, root: &FstNode) -> Result<(), Violation> {
        match self {
            Constraint::RootKindIn(kinds) => {
                if kinds.contains(&root.kind()) {
                    Ok(())
                } else {
                    Err(Violation::new(
                        format!("root is a {}, expected one of: {}", root.kind(), kind_list(kinds)),
                        root.span(),
                    ))
                }
            }
            Constraint::ExactlyOneChild(kind) => {
                let matching: Vec<&FstNode> = root.children_of_kind(*kind).collect();
                match matching.as_slice() {
                    [_] => Ok(()),
                    [] => Err(Violation::new(
                        format!("{} has no {kind} child", root.kind()),
                        root.span(),
                    )),
                    [_, extra, ..] => Err(Violation::new(
                        format!(
                            "{} has {} {kind} children, expected exactly one",
                            root.kind(),
                            matching.len()
                        ),
                        extra.span(),
                    )),
                }
            }
            Constraint::ChildCount { kind, min, max } => {
                let count = root.children_of_kind(*kind).count();
                let too_many = max.is_some_and(|max| count > max);
                if count < *min || too_many {
                    let bounds = match max {
                        Some(max) if max == min => format!("exactly {min}"),
                        Some(max) => format!("between {min} and {max}"),
                        None => format!("at least {min}"),
                    };
                    Err(Violation::new(
                        format!("{} has {count} {kind} children, expected {bounds}", root.kind()),
                        root.span(),
                    ))
                } else {
                    Ok(())
                }
            }
            Constraint::ForbidKind(kind) => match root.walk().skip(1).find(|n| n.kind() == *kind) {
                Some(found) => Err(Violation::new(
                    format!("{kind} is not allowed inside a {}", root.kind()),
                    found.span(),
                )),
                None => Ok(()),
            },
            Constraint::SignatureOnly => match root.body() {
                Some(body) => Err(Violation::new(
                    format!("{} must be a signature without a body", root.kind()),
                    body,
                )),
                None => Ok(()),
            },
            Constraint::RequireBody => match root.body() {
                Some(_) => Ok(()),
                None => Err(Violation::new(
                    format!("{} has no body", root.kind()),
                    root.span(),
                )),
            },
            Constraint::RequireName => match root.name() {
                Some(_) => Ok(()),
                None => Err(Violation::new(
                    format!("{} has no name", root.kind()),
                    root.span(),
                )),
            },
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::RootKindIn(kinds) => write!(f, "root-kind-in [{}]", kind_list(kinds)),
            Constraint::ExactlyOneChild(kind) => write!(f, "exactly-one-child {kind}"),
            Constraint::ChildCount { kind, min, max } => match max {
                Some(max) => write!(f, "child-count {kind} {min}..={max}"),
                None => write!(f, "child-count {kind} {min}.."),
            },
            Constraint::ForbidKind(kind) => write!(f, "forbid-kind {kind}"),
            Constraint::SignatureOnly => f.write_str("signature-only"),
            Constraint::RequireBody => f.write_str("require-body"),
            Constraint::RequireName => f.write_str("require-name"),
        }
    }
}

fn kind_list(kinds: &[NodeKind]) -> String {
    kinds.iter().map(NodeKind::as_str).collect::<Vec<_>>().join(", ")
}

/// Ordered constraints, plus any custom validators registered by the caller.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstraintSet {
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    constraints: Vec<Constraint>,
    #[serde(skip)]
    custom: Vec<Arc<dyn ShapeValidator>>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shape a composition engine relies on for each production.
    pub fn for_production(production: Production) -> Self {
        let kinds: Vec<NodeKind> = NodeKind::ALL
            .into_iter()
            .filter(|kind| production.accepts(*kind))
            .collect();
        let set = Self::new().with(Constraint::RootKindIn(kinds));
        match production {
            Production::Method
            | Production::Constructor
            | Production::Function
            | Production::Property
            | Production::Type => set
                .with(Constraint::ExactlyOneChild(NodeKind::Identifier))
                .with(Constraint::RequireName),
            Production::Field => set
                .with(Constraint::ChildCount {
                    kind: NodeKind::Variable,
                    min: 1,
                    max: None,
                })
                .with(Constraint::RequireName),
            Production::Declaration => set.with(Constraint::RequireName),
            Production::ClassMember | Production::ExternalDeclaration => set,
        }
    }

    pub fn push(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn with(mut self, constraint: Constraint) -> Self {
        self.push(constraint);
        self
    }

    /// Adds a validator that runs after the declarative constraints.
    pub fn register(&mut self, validator: Arc<dyn ShapeValidator>) {
        self.custom.push(validator);
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty() && self.custom.is_empty()
    }

    pub fn len(&self) -> usize {
        self.constraints.len() + self.custom.len()
    }
}

impl fmt::Debug for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintSet")
            .field("constraints", &self.constraints)
            .field("custom", &self.custom.len())
            .finish()
    }
}

impl PartialEq for ConstraintSet {
    fn eq(&self, other: &Self) -> bool {
        self.constraints == other.constraints
            && self.custom.len() == other.custom.len()
            && self
                .custom
                .iter()
                .zip(&other.custom)
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

impl FromIterator<Constraint> for ConstraintSet {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        Self {
            constraints: iter.into_iter().collect(),
            custom: Vec::new(),
        }
    }
}

/// Runs every check in `constraints` against `node`, stopping at the first failure.
pub fn validate(node: &FstNode, constraints: &ConstraintSet) -> Result<(), Violation> {
    for constraint in &constraints.constraints {
        constraint.check(node)?;
    }
    for validator in &constraints.custom {
        validator.check(node)?;
    }
    Ok(())
}
