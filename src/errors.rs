//! fstparse error handling.
//!
//! A single public error enum covers every way a snippet can fail to become a
//! node. Variants are kept apart even where their causes look alike (grammar
//! versus traversal syntax errors) so callers branch on them explicitly.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::fst::Span;
use crate::target::{Language, Production};

// ============================================================================
// SOURCE CONTEXT
// ============================================================================

/// The named text an error points into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Convert to NamedSource for use with miette error reporting
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Every failure a snippet parse can end in.
#[derive(Error, Diagnostic, Debug)]
pub enum SnippetError {
    #[error("source unavailable: {name}: {reason}")]
    #[diagnostic(
        code(fstparse::source::unavailable),
        help("the snippet's backing resource could not be materialised")
    )]
    SourceUnavailable { name: String, reason: String },

    #[error("malformed {language} {production}: {message}")]
    #[diagnostic(
        code(fstparse::grammar),
        help("malformed feature fragment: the text does not match the expected production")
    )]
    Grammar {
        language: Language,
        production: Production,
        message: String,
        #[source_code]
        src: Arc<NamedSource<String>>,
        #[label("{label}")]
        span: SourceSpan,
        label: String,
    },

    #[error("malformed traversal expression: {message}")]
    #[diagnostic(
        code(fstparse::traversal::syntax),
        help("malformed composition directive: fix the traversal expression")
    )]
    TraversalQuerySyntax {
        message: String,
        #[source_code]
        src: Arc<NamedSource<String>>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("structural constraint violated: {reason}")]
    #[diagnostic(
        code(fstparse::constraint),
        help("the fragment parsed but its shape cannot be composed")
    )]
    StructuralConstraintViolation {
        reason: String,
        #[source_code]
        src: Arc<NamedSource<String>>,
        #[label("rejected")]
        span: SourceSpan,
    },

    #[error("{language} has no {production} production")]
    #[diagnostic(code(fstparse::unsupported))]
    UnsupportedProduction {
        language: Language,
        production: Production,
    },
}

/// Plain tag of a [`SnippetError`], for exhaustive branching and test assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SourceUnavailable,
    GrammarError,
    TraversalQuerySyntaxError,
    StructuralConstraintViolation,
    UnsupportedProduction,
}

impl ErrorKind {
    /// Get error code suffix for diagnostic codes
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            ErrorKind::SourceUnavailable => "source_unavailable",
            ErrorKind::GrammarError => "grammar_error",
            ErrorKind::TraversalQuerySyntaxError => "traversal_query_syntax_error",
            ErrorKind::StructuralConstraintViolation => "structural_constraint_violation",
            ErrorKind::UnsupportedProduction => "unsupported_production",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code_suffix())
    }
}

impl SnippetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SnippetError::SourceUnavailable { .. } => ErrorKind::SourceUnavailable,
            SnippetError::Grammar { .. } => ErrorKind::GrammarError,
            SnippetError::TraversalQuerySyntax { .. } => ErrorKind::TraversalQuerySyntaxError,
            SnippetError::StructuralConstraintViolation { .. } => {
                ErrorKind::StructuralConstraintViolation
            }
            SnippetError::UnsupportedProduction { .. } => ErrorKind::UnsupportedProduction,
        }
    }

    /// Primary span into the offending text, where there is one.
    pub fn span(&self) -> Option<Span> {
        match self {
            SnippetError::Grammar { span, .. }
            | SnippetError::TraversalQuerySyntax { span, .. }
            | SnippetError::StructuralConstraintViolation { span, .. } => {
                Some(Span::new(span.offset(), span.offset() + span.len()))
            }
            SnippetError::SourceUnavailable { .. }
            | SnippetError::UnsupportedProduction { .. } => None,
        }
    }

    pub fn source_unavailable(name: impl Into<String>, reason: impl fmt::Display) -> Self {
        SnippetError::SourceUnavailable {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn grammar(
        source: &SourceContext,
        language: Language,
        production: Production,
        message: impl Into<String>,
        label: impl Into<String>,
        span: Span,
    ) -> Self {
        SnippetError::Grammar {
            language,
            production,
            message: message.into(),
            src: source.to_named_source(),
            span: span.into(),
            label: label.into(),
        }
    }

    pub fn traversal_syntax(
        source: &SourceContext,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        SnippetError::TraversalQuerySyntax {
            message: message.into(),
            src: source.to_named_source(),
            span: span.into(),
        }
    }

    pub fn constraint_violation(
        source: &SourceContext,
        reason: impl Into<String>,
        span: Span,
    ) -> Self {
        SnippetError::StructuralConstraintViolation {
            reason: reason.into(),
            src: source.to_named_source(),
            span: span.into(),
        }
    }
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Prints a SnippetError with full miette diagnostics
pub fn print_error(error: SnippetError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
