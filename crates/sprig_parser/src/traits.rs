//! Parser trait definition.

use std::io::BufRead;

use sprig_tree::Tree;

use crate::ParseError;

/// Trait for parsing markup into a [`Tree`].
///
/// Implementations read the whole input, reduce it to canonical events and
/// hand back the finished tree. Nothing is returned on failure.
///
/// # Example
///
/// ```rust,ignore
/// use std::io::BufRead;
/// use sprig_parser::{ParseError, Parser};
/// use sprig_tree::Tree;
///
/// struct MyParser;
///
/// impl Parser for MyParser {
///     fn name(&self) -> &str {
///         "my-parser"
///     }
///
///     fn extensions(&self) -> &[&str] {
///         &["myext"]
///     }
///
///     fn parse_reader(&self, source: &mut dyn BufRead) -> Result<Tree, ParseError> {
///         // Parse implementation
///         todo!()
///     }
/// }
/// ```
pub trait Parser {
    /// Returns the name of this parser.
    fn name(&self) -> &str;

    /// Returns the file extensions this parser handles.
    ///
    /// Extensions should not include the leading dot (e.g., `["xml", "svg"]`).
    fn extensions(&self) -> &[&str];

    /// Reads `source` to the end and builds its tree.
    fn parse_reader(&self, source: &mut dyn BufRead) -> Result<Tree, ParseError>;

    /// Builds the tree of an in-memory document.
    fn parse(&self, source: &[u8]) -> Result<Tree, ParseError> {
        let mut source = source;
        self.parse_reader(&mut source)
    }

    /// Returns true if this parser can handle the given file extension.
    fn can_parse(&self, extension: &str) -> bool {
        self.extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}
