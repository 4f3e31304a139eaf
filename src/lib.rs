//! fstparse parses code snippets of a named production (a method, a field, a
//! class, a C function) into feature structure trees ready for
//! superimposition.

pub use crate::adapter::{parse_snippet, ParseOutcome, SnippetAdapter};
pub use crate::errors::{ErrorKind, SnippetError};
pub use crate::fst::{FstNode, NodeKind, Span};
pub use crate::source::{open_stream, CharStream, Snippet, SnippetContent};
pub use crate::target::{Language, Production};
pub use crate::traversal::{parse_traversal, TraversalPlan};
pub use crate::validation::{validate, Constraint, ConstraintSet, Violation};

pub mod adapter;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fst;
pub mod source;
pub mod syntax;
pub mod target;
pub mod traversal;
pub mod validation;
