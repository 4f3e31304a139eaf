//! Bundled source-language grammars.
//!
//! Each language is a pest grammar plus an engine that maps productions to the
//! grammar's entry rules. The grammars are declaration-level: they recognise
//! the shape of members and types and keep bodies and initializers as
//! balanced opaque text.

mod build;
pub mod c;
pub mod csharp;
pub mod java;

pub(crate) use build::{parse_with, NodeRole, RuleRole};
