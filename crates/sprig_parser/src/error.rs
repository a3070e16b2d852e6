//! Parse error types.

use sprig_tree::BuildError;
use thiserror::Error;

/// Errors that can occur while turning markup into a tree.
///
/// Construction is all-or-nothing: any of these means no tree was produced.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The XML tokenizer rejected the input.
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    /// Reading the input failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Input ended while an element was still open.
    #[error("Unclosed element: <{name}>")]
    UnclosedElement {
        /// Name of the innermost open element, as written in the source.
        name: String,
    },

    /// The adapter produced an event sequence the builder could not link.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The parser configuration could not be read.
    #[error("Invalid parser config: {0}")]
    Config(#[from] serde_json::Error),
}

impl ParseError {
    /// Creates a new unclosed element error.
    pub fn unclosed(name: impl Into<String>) -> Self {
        Self::UnclosedElement { name: name.into() }
    }
}
