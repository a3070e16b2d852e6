//! # sprig_parser
//!
//! Markup adapters for sprig.
//!
//! This crate provides:
//! - A `Parser` trait for anything that turns bytes into a [`Tree`]
//! - An XML parser using `quick-xml`
//! - An HTML parser using `html5ever`, in document or fragment mode
//!
//! ## Architecture
//!
//! Each adapter reduces its input to canonical [`sprig_tree::Event`]s and
//! feeds them to a [`sprig_tree::TreeBuilder`]. The result is the same kind
//! of tree whichever parser produced it.
//!
//! ## Example
//!
//! ```rust
//! use sprig_parser::parse_xml;
//!
//! let tree = parse_xml(br#"<a x="1"><b>he</b>llo<!--c--></a>"#)?;
//! let a = tree.root().children().next().unwrap();
//!
//! assert!(a.equals("hello"));
//! assert_eq!(a.attribute("x").and_then(|x| x.value()), Some("1"));
//! # Ok::<(), sprig_parser::ParseError>(())
//! ```

mod config;
mod error;
mod html;
mod traits;
mod xml;

pub use config::{HtmlMode, HtmlOptions, ParserConfig, XmlOptions};
pub use error::ParseError;
pub use html::HtmlParser;
pub use traits::Parser;
pub use xml::XmlParser;

use sprig_tree::Tree;

/// Parses an XML document with default options.
pub fn parse_xml(source: &[u8]) -> Result<Tree, ParseError> {
    XmlParser::new().parse(source)
}

/// Parses an HTML document with default options.
pub fn parse_html(source: &[u8]) -> Result<Tree, ParseError> {
    HtmlParser::new().parse(source)
}

/// Returns a configured parser for a file extension (without the leading
/// dot), or `None` if no built-in parser handles it.
pub fn parser_for_extension(extension: &str, config: &ParserConfig) -> Option<Box<dyn Parser>> {
    let xml = XmlParser::with_options(config.xml.clone());
    if xml.can_parse(extension) {
        return Some(Box::new(xml));
    }

    let html = HtmlParser::with_options(config.html.clone());
    if html.can_parse(extension) {
        return Some(Box::new(html));
    }

    None
}
