//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use fstparse::{FstNode, NodeKind};

/// Absolute path of a file under `tests/fixtures`.
pub fn fixture(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

/// (kind, name) of each direct child, for compact assertions.
pub fn shape(node: &FstNode) -> Vec<(NodeKind, Option<String>)> {
    node.children()
        .iter()
        .map(|c| (c.kind(), c.name().map(str::to_owned)))
        .collect()
}
