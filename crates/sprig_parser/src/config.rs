//! Parser configuration.

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// Options for the XML adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct XmlOptions {
    /// Trim whitespace around each text run, entity references included;
    /// whitespace-only runs are dropped.
    #[serde(default)]
    pub trim_text: bool,

    /// Record the `<?xml ...?>` declaration as a processing instruction.
    #[serde(default = "default_true")]
    pub emit_declaration: bool,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            trim_text: false,
            emit_declaration: true,
        }
    }
}

/// How the HTML adapter treats its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HtmlMode {
    /// A whole document; content lands inside `html`/`head`/`body`.
    #[default]
    Document,
    /// A fragment parsed in the context of [`HtmlOptions::fragment_context`].
    Fragment,
}

/// Options for the HTML adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HtmlOptions {
    /// Whole document or fragment parsing.
    #[serde(default)]
    pub mode: HtmlMode,

    /// Local name of the context element for fragment mode.
    #[serde(default = "default_fragment_context")]
    pub fragment_context: String,

    /// Parse as a browser with scripting enabled would (affects `noscript`).
    #[serde(default = "default_true")]
    pub scripting: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            mode: HtmlMode::Document,
            fragment_context: default_fragment_context(),
            scripting: true,
        }
    }
}

/// Configuration for every built-in parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParserConfig {
    /// Options for the XML parser.
    #[serde(default)]
    pub xml: XmlOptions,

    /// Options for the HTML parser.
    #[serde(default)]
    pub html: HtmlOptions,
}

fn default_true() -> bool {
    true
}

fn default_fragment_context() -> String {
    "body".to_string()
}

impl ParserConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses configuration from a JSON string. Unknown fields are rejected.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(json)?)
    }
}
