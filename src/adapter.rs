//! Snippet parser adapter.
//!
//! One generic entry point for every (language, production) pair. A call
//! moves through `stream opened -> parsed -> validated` and stops at the
//! first failure; nothing is retried and no other production is tried.
//!
//! ```
//! use fstparse::{parse_snippet, Language, NodeKind, Production};
//!
//! let node = parse_snippet("public void foo() { }", Language::Java, Production::Method, true).unwrap();
//! assert_eq!(node.kind(), NodeKind::Method);
//! assert_eq!(node.children().len(), 1);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::config::AdapterConfig;
use crate::engine::{Boundary, EngineRegistry};
use crate::errors::SnippetError;
use crate::fst::FstNode;
use crate::source::{open_stream, CharStream, Snippet};
use crate::target::{Language, Production};
use crate::validation::{validate, ConstraintSet};

/// Result of one parse attempt. There is no partial node on failure.
pub type ParseOutcome = Result<FstNode, SnippetError>;

static DEFAULT_ADAPTER: Lazy<SnippetAdapter> = Lazy::new(SnippetAdapter::default);

/// Parses `text` as `production` of `language` with the bundled grammars.
///
/// No shape constraints are applied; use [`SnippetAdapter::parse`] for that.
pub fn parse_snippet(
    text: &str,
    language: Language,
    production: Production,
    strict: bool,
) -> ParseOutcome {
    DEFAULT_ADAPTER.parse_snippet(text, language, production, strict)
}

/// Drives grammar engines for snippets. Cheap to clone and shareable
/// between threads; every call builds its own engine.
#[derive(Debug, Clone)]
pub struct SnippetAdapter {
    registry: Arc<EngineRegistry>,
    strict: bool,
    constraints: HashMap<(Language, Production), ConstraintSet>,
}

impl Default for SnippetAdapter {
    fn default() -> Self {
        Self::new(EngineRegistry::builtin())
    }
}

impl SnippetAdapter {
    pub fn new(registry: EngineRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            strict: true,
            constraints: HashMap::new(),
        }
    }

    /// Bundled grammars with the strictness and constraint overrides of `config`.
    pub fn from_config(config: &AdapterConfig) -> Self {
        let mut adapter = Self::default().with_strict(config.strict);
        for target in &config.targets {
            adapter
                .constraints
                .insert((target.language, target.production), target.constraints.clone());
        }
        adapter
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Replaces the default constraints for one pair.
    pub fn with_constraints(
        mut self,
        language: Language,
        production: Production,
        constraints: ConstraintSet,
    ) -> Self {
        self.constraints.insert((language, production), constraints);
        self
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn registry(&self) -> &EngineRegistry {
        &self.registry
    }

    /// Constraints applied when [`parse`](Self::parse) is given none.
    pub fn constraints_for(&self, language: Language, production: Production) -> ConstraintSet {
        self.constraints
            .get(&(language, production))
            .cloned()
            .unwrap_or_else(|| ConstraintSet::for_production(production))
    }

    /// Runs the grammar for exactly `production` over the rest of `stream`.
    pub fn parse_as_production(
        &self,
        stream: &mut CharStream,
        language: Language,
        production: Production,
        strict: bool,
    ) -> ParseOutcome {
        let mut engine = self
            .registry
            .construct(language, production)
            .ok_or(SnippetError::UnsupportedProduction {
                language,
                production,
            })?;
        debug!(%language, %production, "constructed grammar engine");

        let source = stream.source_context();
        let offset = stream.offset();
        let input = stream.read_to_end();

        let node = engine
            .parse(input, production, Boundary::from(strict))
            .map_err(|e| {
                let span = e.span.shifted(offset);
                SnippetError::grammar(&source, language, production, e.message, e.label, span)
            })?;

        if !production.accepts(node.kind()) {
            return Err(SnippetError::grammar(
                &source,
                language,
                production,
                format!("grammar produced a {} node", node.kind()),
                "not a valid result",
                node.span().shifted(offset),
            ));
        }

        debug!(kind = %node.kind(), name = node.name().unwrap_or(""), "parsed snippet");
        Ok(if offset == 0 { node } else { node.shifted(offset) })
    }

    /// Parses inline text. Shape constraints are not applied.
    pub fn parse_snippet(
        &self,
        text: &str,
        language: Language,
        production: Production,
        strict: bool,
    ) -> ParseOutcome {
        let mut stream = CharStream::new("<snippet>", text);
        self.parse_as_production(&mut stream, language, production, strict)
    }

    /// Opens, parses and validates `snippet`.
    ///
    /// With `constraints` of `None` the configured set for the pair applies,
    /// falling back to [`ConstraintSet::for_production`].
    #[tracing::instrument(
        level = "debug",
        skip(self, snippet, constraints),
        fields(
            source = %snippet.content.name(),
            language = %snippet.language,
            production = %snippet.production,
        )
    )]
    pub fn parse(&self, snippet: &Snippet, constraints: Option<&ConstraintSet>) -> ParseOutcome {
        let (language, production) = (snippet.language, snippet.production);
        if !self.registry.contains(language, production) {
            return Err(SnippetError::UnsupportedProduction {
                language,
                production,
            });
        }

        let mut stream = open_stream(&snippet.content)?;
        let source = stream.source_context();
        let node = self.parse_as_production(&mut stream, language, production, self.strict)?;

        let defaults;
        let constraints = match constraints {
            Some(set) => set,
            None => {
                defaults = self.constraints_for(language, production);
                &defaults
            }
        };
        validate(&node, constraints).map_err(|violation| {
            SnippetError::constraint_violation(&source, violation.reason, violation.span)
        })?;
        Ok(node)
    }
}
