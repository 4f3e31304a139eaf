//! Grammar engines and the registry that constructs them.
//!
//! A [`GrammarEngine`] is the black box the adapter drives: "parse production
//! P over this input, return the root node or a syntax error". The
//! [`EngineRegistry`] maps each (language, production) pair to a closure that
//! builds a fresh engine, so no engine instance is ever shared between calls.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::fst::{FstNode, Span};
use crate::syntax::{c::CEngine, csharp::CSharpEngine, java::JavaEngine};
use crate::target::{Language, Production};

/// How a production's boundaries are enforced.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Boundary {
    /// Only whitespace and comments may follow the production.
    #[default]
    Strict,
    /// Anything after the production is ignored.
    Lenient,
}

impl From<bool> for Boundary {
    fn from(strict: bool) -> Self {
        if strict {
            Boundary::Strict
        } else {
            Boundary::Lenient
        }
    }
}

/// The engine's native failure: where the text stopped matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub label: String,
    pub span: Span,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

/// One parser instance for one language.
pub trait GrammarEngine {
    fn language(&self) -> Language;

    /// Matches exactly `production` against `input`, once.
    fn parse(
        &mut self,
        input: &str,
        production: Production,
        boundary: Boundary,
    ) -> Result<FstNode, SyntaxError>;
}

/// Builds a fresh engine for one call.
pub type EngineFactory = Arc<dyn Fn() -> Box<dyn GrammarEngine> + Send + Sync>;

/// Maps (language, production) pairs to engine factories.
#[derive(Clone, Default)]
pub struct EngineRegistry {
    factories: HashMap<(Language, Production), EngineFactory>,
}

impl EngineRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every production of every bundled grammar.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for language in Language::ALL {
            let factory = builtin_factory(language);
            for &production in language.productions() {
                registry
                    .factories
                    .insert((language, production), Arc::clone(&factory));
            }
        }
        registry
    }

    pub fn register<F>(&mut self, language: Language, production: Production, factory: F)
    where
        F: Fn() -> Box<dyn GrammarEngine> + Send + Sync + 'static,
    {
        self.factories.insert((language, production), Arc::new(factory));
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_engine<F>(mut self, language: Language, production: Production, factory: F) -> Self
    where
        F: Fn() -> Box<dyn GrammarEngine> + Send + Sync + 'static,
    {
        self.register(language, production, factory);
        self
    }

    pub fn contains(&self, language: Language, production: Production) -> bool {
        self.factories.contains_key(&(language, production))
    }

    /// Constructs a new engine for the pair, if one is registered.
    pub fn construct(
        &self,
        language: Language,
        production: Production,
    ) -> Option<Box<dyn GrammarEngine>> {
        self.factories
            .get(&(language, production))
            .map(|factory| factory())
    }

    /// Registered pairs in a stable order.
    pub fn targets(&self) -> Vec<(Language, Production)> {
        let mut targets: Vec<_> = self.factories.keys().copied().collect();
        targets.sort_by_key(|(language, production)| (language.as_str(), production.as_str()));
        targets
    }
}

impl fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("targets", &self.targets())
            .finish()
    }
}

fn builtin_factory(language: Language) -> EngineFactory {
    match language {
        Language::Java => Arc::new(|| Box::new(JavaEngine::new()) as Box<dyn GrammarEngine>),
        Language::CSharp => Arc::new(|| Box::new(CSharpEngine::new()) as Box<dyn GrammarEngine>),
        Language::C => Arc::new(|| Box::new(CEngine::new()) as Box<dyn GrammarEngine>),
    }
}
