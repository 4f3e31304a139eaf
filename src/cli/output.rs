//! Handles all user-facing output for the CLI.
//!
//! Trees, plans and batch summaries are printed here so every command shares
//! the same colours and layout.

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::fst::FstNode;
use crate::target::{Language, Production};
use crate::traversal::TraversalPlan;

/// Prints a parsed tree, either indented or as JSON.
pub fn print_node(node: &FstNode, json: bool) {
    if json {
        print_json(node);
    } else {
        print!("{}", node.pretty());
    }
}

pub fn print_plan(plan: &TraversalPlan, json: bool) {
    if json {
        print_json(plan);
    } else {
        println!("{plan}");
    }
}

pub fn print_productions(targets: &[(Language, Production)]) {
    if targets.is_empty() {
        println!("  No productions registered.");
        return;
    }
    for (language, production) in targets {
        println!("  {:<8} {}", language.as_str(), production.as_str());
    }
}

/// One line per batch file: a coloured mark, the path and the root it produced.
pub fn print_batch_line(path: &Path, node: Option<&FstNode>) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    match node {
        Some(node) => {
            let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
            let _ = write!(stdout, "✓");
            let _ = stdout.reset();
            let name = node.name().map(|n| format!(" {n}")).unwrap_or_default();
            let _ = writeln!(stdout, " {} ({}{name})", path.display(), node.kind());
        }
        None => {
            let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
            let _ = write!(stdout, "✗");
            let _ = stdout.reset();
            let _ = writeln!(stdout, " {}", path.display());
        }
    }
}

pub fn print_batch_summary(passed: usize, failed: usize, skipped: usize) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = writeln!(stdout);
    let _ = stdout.set_color(ColorSpec::new().set_bold(true));
    let _ = writeln!(stdout, "Batch Summary");
    let _ = stdout.reset();

    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
    let _ = writeln!(stdout, "  parsed:  {passed}");
    if failed > 0 {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
    } else {
        let _ = stdout.reset();
    }
    let _ = writeln!(stdout, "  failed:  {failed}");
    let _ = stdout.reset();
    if skipped > 0 {
        let _ = writeln!(stdout, "  skipped: {skipped}");
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            let _ = writeln!(io::stderr(), "Error: cannot encode JSON: {e}");
        }
    }
}
