//! Stream source: turns stored snippet content into a character stream.
//!
//! This is the only place in the crate that touches the filesystem. Snippet
//! text is never inspected here, only materialised.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::errors::{SnippetError, SourceContext};
use crate::target::{Language, Production};

/// Where a snippet's text lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnippetContent {
    /// Text held in memory, with a display name for diagnostics.
    Inline { name: String, text: String },
    /// Text stored in a backing file that is read when the stream is opened.
    File(PathBuf),
}

impl SnippetContent {
    pub fn name(&self) -> String {
        match self {
            SnippetContent::Inline { name, .. } => name.clone(),
            SnippetContent::File(path) => path.display().to_string(),
        }
    }
}

/// A parse request: opaque content plus the production it must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub content: SnippetContent,
    pub language: Language,
    pub production: Production,
}

impl Snippet {
    pub fn inline(text: impl Into<String>, language: Language, production: Production) -> Self {
        Self {
            content: SnippetContent::Inline {
                name: "<snippet>".to_string(),
                text: text.into(),
            },
            language,
            production,
        }
    }

    pub fn from_file(path: impl Into<PathBuf>, language: Language, production: Production) -> Self {
        Self {
            content: SnippetContent::File(path.into()),
            language,
            production,
        }
    }

    /// Renames an inline snippet; file-backed snippets keep their path.
    pub fn named(mut self, new_name: impl Into<String>) -> Self {
        if let SnippetContent::Inline { name, .. } = &mut self.content {
            *name = new_name.into();
        }
        self
    }
}

/// Sequential character source over materialised snippet text.
#[derive(Debug, Clone)]
pub struct CharStream {
    name: String,
    text: String,
    position: usize,
}

impl CharStream {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            position: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Byte offset of the next unread character.
    pub fn offset(&self) -> usize {
        self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.text.len()
    }

    /// Text not yet consumed.
    pub fn remaining(&self) -> &str {
        &self.text[self.position..]
    }

    /// Consumes the rest of the stream and returns it.
    pub fn read_to_end(&mut self) -> &str {
        let start = self.position;
        self.position = self.text.len();
        &self.text[start..]
    }

    pub fn source_context(&self) -> SourceContext {
        SourceContext::new(self.name.clone(), self.text.clone())
    }
}

impl Iterator for CharStream {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        let ch = self.remaining().chars().next()?;
        self.position += ch.len_utf8();
        Some(ch)
    }
}

/// Materialises snippet content as a stream positioned at offset 0.
///
/// Fails with `SourceUnavailable` when a backing file cannot be read or is
/// not valid UTF-8.
pub fn open_stream(content: &SnippetContent) -> Result<CharStream, SnippetError> {
    match content {
        SnippetContent::Inline { name, text } => Ok(CharStream::new(name.clone(), text.clone())),
        SnippetContent::File(path) => {
            let name = path.display().to_string();
            let text = fs::read_to_string(path)
                .map_err(|e| SnippetError::source_unavailable(name.clone(), e))?;
            debug!(source = %name, bytes = text.len(), "opened snippet stream");
            Ok(CharStream::new(name, text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn inline_stream_starts_at_zero() {
        let mut stream = open_stream(&SnippetContent::Inline {
            name: "s".into(),
            text: "int a;".into(),
        })
        .unwrap();
        assert_eq!(stream.offset(), 0);
        assert_eq!(stream.next(), Some('i'));
        assert_eq!(stream.remaining(), "nt a;");
    }

    #[test]
    fn read_to_end_exhausts_stream() {
        let mut stream = CharStream::new("s", "äb");
        assert_eq!(stream.next(), Some('ä'));
        assert_eq!(stream.offset(), 2);
        assert_eq!(stream.read_to_end(), "b");
        assert!(stream.is_exhausted());
        assert_eq!(stream.next(), None);
    }

    #[test]
    fn missing_file_is_source_unavailable() {
        let content = SnippetContent::File(PathBuf::from("definitely/not/here.java"));
        let err = open_stream(&content).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
        assert!(err.to_string().contains("definitely/not/here.java"));
    }

    #[test]
    fn named_only_renames_inline_content() {
        let snippet =
            Snippet::inline("int a;", Language::Java, Production::Field).named("Base.java#a");
        assert_eq!(snippet.content.name(), "Base.java#a");
    }
}
