//! Defines the command-line arguments and subcommands for the fstparse CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::target::{Language, Production};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "fstparse",
    version,
    about = "Parses code snippets into feature structure trees for superimposition."
)]
pub struct FstParseArgs {
    /// YAML file with the strictness default and per-production constraints.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log adapter activity to stderr (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse one snippet file and print its tree.
    Parse {
        /// The snippet file.
        #[arg(required = true)]
        file: PathBuf,
        /// Source language; inferred from the file extension when omitted.
        #[arg(short, long)]
        language: Option<Language>,
        /// The production the snippet must match, e.g. `method`.
        #[arg(short, long)]
        production: Production,
        /// Ignore anything after the production instead of rejecting it.
        #[arg(long)]
        lenient: bool,
        /// Print the tree as JSON.
        #[arg(long)]
        json: bool,
        /// Skip shape constraints.
        #[arg(long)]
        no_validate: bool,
    },
    /// Parse a traversal expression and print its canonical form.
    Query {
        /// The traversal expression, e.g. `class//method[@name='run']`.
        #[arg(required = true)]
        expression: String,
        /// Print the plan as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Parse every snippet below a directory.
    Batch {
        /// Directory to walk.
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Production to parse each file as; defaults to the language's member production.
        #[arg(short, long)]
        production: Option<Production>,
    },
    /// List the supported (language, production) pairs.
    Productions,
}
