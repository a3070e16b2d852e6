//! HTML adapter built on `html5ever`.
//!
//! The input is first parsed by the HTML5 tree-construction algorithm into
//! an `RcDom`, so implied tags, auto-closing and table fix-ups are already
//! applied. The DOM is then walked depth first to produce canonical events.

use std::io::BufRead;

use html5ever::driver::ParseOpts;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{namespace_url, ns, parse_document, parse_fragment, LocalName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use sprig_tree::{Event, QName, Tree, TreeBuilder};
use tracing::{debug, warn};

use crate::{HtmlMode, HtmlOptions, ParseError, Parser};

/// HTML parser.
///
/// Element and attribute names in the HTML namespace get an empty space;
/// foreign content (SVG, MathML) keeps its namespace URI. Doctypes produce
/// nothing, and `template` contents are walked as the element's children.
#[derive(Debug, Clone, Default)]
pub struct HtmlParser {
    options: HtmlOptions,
}

impl HtmlParser {
    /// File extensions supported by this parser.
    const EXTENSIONS: &'static [&'static str] = &["html", "htm", "xhtml"];

    /// Creates a new HTML parser with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new HTML parser with the given options.
    pub fn with_options(options: HtmlOptions) -> Self {
        Self { options }
    }

    /// Returns the options this parser was created with.
    pub fn options(&self) -> &HtmlOptions {
        &self.options
    }

    fn parse_opts(&self) -> ParseOpts {
        ParseOpts {
            tree_builder: TreeBuilderOpts {
                scripting_enabled: self.options.scripting,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn read_dom(&self, mut source: &mut dyn BufRead) -> Result<RcDom, ParseError> {
        let dom = match self.options.mode {
            HtmlMode::Document => parse_document(RcDom::default(), self.parse_opts())
                .from_utf8()
                .read_from(&mut source)?,
            HtmlMode::Fragment => {
                let context = html5ever::QualName::new(
                    None,
                    ns!(html),
                    LocalName::from(self.options.fragment_context.as_str()),
                );
                parse_fragment(RcDom::default(), self.parse_opts(), context, Vec::new())
                    .from_utf8()
                    .read_from(&mut source)?
            }
        };
        Ok(dom)
    }

    /// Nodes to walk: the document's children, or the children of the
    /// synthetic `html` element a fragment parse wraps its output in.
    fn top_level(&self, dom: &RcDom) -> Vec<Handle> {
        let children = dom.document.children.borrow();
        match self.options.mode {
            HtmlMode::Document => children.clone(),
            HtmlMode::Fragment => children
                .first()
                .map(|html| html.children.borrow().clone())
                .unwrap_or_default(),
        }
    }
}

impl Parser for HtmlParser {
    fn name(&self) -> &str {
        "html"
    }

    fn extensions(&self) -> &[&str] {
        Self::EXTENSIONS
    }

    fn parse_reader(&self, source: &mut dyn BufRead) -> Result<Tree, ParseError> {
        debug!("Parsing HTML (mode: {:?})", self.options.mode);

        // Dropping an RcDom node empties its subtree, so the DOM must outlive
        // the walk.
        let dom = self
            .read_dom(source)
            .inspect_err(|err| warn!("HTML input could not be read: {}", err))?;
        let tree = walk(self.top_level(&dom))?;

        debug!("Parsed HTML: {} nodes", tree.len());
        Ok(tree)
    }
}

enum Step {
    Enter(Handle),
    Leave,
}

/// Pre-order walk over `nodes`, wrapped in the synthetic root.
///
/// Uses an explicit stack, so nesting depth is bounded by memory only.
fn walk(nodes: Vec<Handle>) -> Result<Tree, ParseError> {
    let mut builder = TreeBuilder::new();
    builder.push(Event::root())?;

    let mut stack: Vec<Step> = nodes.into_iter().rev().map(Step::Enter).collect();
    while let Some(step) = stack.pop() {
        let handle = match step {
            Step::Leave => {
                builder.push(Event::End)?;
                continue;
            }
            Step::Enter(handle) => handle,
        };

        match &handle.data {
            NodeData::Element {
                name,
                attrs,
                template_contents,
                ..
            } => {
                builder.push(Event::Start(qualified(name)))?;
                for attr in attrs.borrow().iter() {
                    builder.push(Event::attr(qualified(&attr.name), &attr.value[..]))?;
                }

                stack.push(Step::Leave);
                let children = match template_contents.borrow().as_ref() {
                    Some(contents) => contents.children.borrow().clone(),
                    None => handle.children.borrow().clone(),
                };
                stack.extend(children.into_iter().rev().map(Step::Enter));
            }
            NodeData::Text { contents } => {
                // Tendrils have their own `as_bytes`; go through `str` for UTF-8.
                builder.push(Event::text(str::as_bytes(&contents.borrow())))?;
            }
            NodeData::Comment { contents } => {
                builder.push(Event::comment(str::as_bytes(contents)))?;
            }
            NodeData::ProcessingInstruction { target, contents } => {
                builder.push(Event::processing_instruction(
                    &target[..],
                    str::as_bytes(contents),
                ))?;
            }
            NodeData::Document => {
                let children = handle.children.borrow().clone();
                stack.extend(children.into_iter().rev().map(Step::Enter));
            }
            NodeData::Doctype { .. } => {}
        }
    }

    builder.push(Event::End)?;
    Ok(builder.finish()?)
}

fn qualified(name: &html5ever::QualName) -> QName {
    let space = if name.ns == ns!(html) || name.ns == ns!() {
        String::new()
    } else {
        name.ns.to_string()
    };
    QName::new(space, name.local.to_string())
}
