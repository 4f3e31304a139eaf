//! The fstparse command-line interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use rayon::prelude::*;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use crate::adapter::SnippetAdapter;
use crate::cli::args::{Command, FstParseArgs};
use crate::config::AdapterConfig;
use crate::errors::print_error;
use crate::source::Snippet;
use crate::target::{Language, Production};
use crate::traversal::parse_traversal;
use crate::validation::ConstraintSet;

pub mod args;
pub mod output;

/// Exit code for usage and configuration problems.
const EXIT_USAGE: i32 = 2;

/// The main entry point for the CLI.
pub fn run() {
    let args = FstParseArgs::parse();
    init_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => AdapterConfig::load(path).unwrap_or_else(|e| {
            eprintln!("{:?}", miette::Report::new(e));
            process::exit(EXIT_USAGE);
        }),
        None => AdapterConfig::default(),
    };
    let adapter = SnippetAdapter::from_config(&config);

    let code = match args.command {
        Command::Parse {
            file,
            language,
            production,
            lenient,
            json,
            no_validate,
        } => {
            let adapter = if lenient { adapter.with_strict(false) } else { adapter };
            handle_parse(&adapter, file, language, production, json, no_validate)
        }
        Command::Query { expression, json } => handle_query(&expression, json),
        Command::Batch { dir, production } => handle_batch(&adapter, &dir, production),
        Command::Productions => {
            output::print_productions(&adapter.registry().targets());
            0
        }
    };

    if code != 0 {
        process::exit(code);
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

fn handle_parse(
    adapter: &SnippetAdapter,
    file: PathBuf,
    language: Option<Language>,
    production: Production,
    json: bool,
    no_validate: bool,
) -> i32 {
    let Some(language) = language.or_else(|| language_of(&file)) else {
        eprintln!(
            "Error: cannot infer the language of {}; pass --language",
            file.display()
        );
        return EXIT_USAGE;
    };

    let snippet = Snippet::from_file(file, language, production);
    let unconstrained = ConstraintSet::new();
    let constraints = no_validate.then_some(&unconstrained);

    match adapter.parse(&snippet, constraints) {
        Ok(node) => {
            output::print_node(&node, json);
            0
        }
        Err(e) => {
            print_error(e);
            1
        }
    }
}

fn handle_query(expression: &str, json: bool) -> i32 {
    match parse_traversal(expression) {
        Ok(plan) => {
            output::print_plan(&plan, json);
            0
        }
        Err(e) => {
            print_error(e);
            1
        }
    }
}

/// Parses every recognised file below `dir` in parallel. A failing file is
/// reported and the walk goes on.
fn handle_batch(adapter: &SnippetAdapter, dir: &Path, production: Option<Production>) -> i32 {
    if !dir.is_dir() {
        eprintln!("Error: {} is not a directory", dir.display());
        return EXIT_USAGE;
    }

    let (snippets, skipped) = discover_snippets(dir, production);
    debug!(files = snippets.len(), skipped, "discovered snippets");

    let outcomes: Vec<_> = snippets
        .par_iter()
        .map(|snippet| adapter.parse(snippet, None))
        .collect();

    let mut passed = 0;
    let mut failed = 0;
    for (snippet, outcome) in snippets.iter().zip(outcomes) {
        let path = PathBuf::from(snippet.content.name());
        match outcome {
            Ok(node) => {
                passed += 1;
                output::print_batch_line(&path, Some(&node));
            }
            Err(e) => {
                failed += 1;
                warn!(file = %path.display(), kind = %e.kind(), "rejected snippet");
                output::print_batch_line(&path, None);
                print_error(e);
            }
        }
    }

    output::print_batch_summary(passed, failed, skipped);
    if failed > 0 {
        1
    } else {
        0
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Walks `dir` in file-name order. Returns the snippets to parse and the
/// number of recognised files skipped because their language lacks the
/// requested production.
fn discover_snippets(dir: &Path, production: Option<Production>) -> (Vec<Snippet>, usize) {
    let mut snippets = Vec::new();
    let mut skipped = 0;

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "cannot walk entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(language) = language_of(path) else {
            continue;
        };
        let production = production.unwrap_or(language.member_production());
        if !language.supports(production) {
            debug!(file = %path.display(), %language, %production, "skipping file");
            skipped += 1;
            continue;
        }
        snippets.push(Snippet::from_file(path, language, production));
    }

    (snippets, skipped)
}

fn language_of(path: &Path) -> Option<Language> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(Language::from_extension)
}
