//! XML adapter built on `quick-xml`.
//!
//! Converts the tokenizer's flat event stream into canonical events and
//! feeds them straight into a [`TreeBuilder`]. Names are namespace-resolved
//! as they are read: a bound prefix becomes its URI, an undeclared prefix is
//! kept as written.

use std::borrow::Cow;
use std::io::BufRead;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesDecl, BytesStart, Event as XmlEvent};
use quick_xml::name::{PrefixDeclaration, QName as XmlName, ResolveResult};
use quick_xml::reader::NsReader;
use sprig_tree::{Event, QName, Tree, TreeBuilder};
use tracing::{debug, warn};

use crate::{ParseError, Parser, XmlOptions};

/// XML parser.
///
/// Text split by entity references is joined back into one run; each CDATA
/// section stays a run of its own. The document type declaration is
/// skipped.
#[derive(Debug, Clone, Default)]
pub struct XmlParser {
    options: XmlOptions,
}

impl XmlParser {
    /// File extensions supported by this parser.
    const EXTENSIONS: &'static [&'static str] = &["xml", "xsd", "xsl", "xslt", "svg", "rss", "atom"];

    /// Creates a new XML parser with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new XML parser with the given options.
    pub fn with_options(options: XmlOptions) -> Self {
        Self { options }
    }

    /// Returns the options this parser was created with.
    pub fn options(&self) -> &XmlOptions {
        &self.options
    }
}

impl Parser for XmlParser {
    fn name(&self) -> &str {
        "xml"
    }

    fn extensions(&self) -> &[&str] {
        Self::EXTENSIONS
    }

    fn parse_reader(&self, source: &mut dyn BufRead) -> Result<Tree, ParseError> {
        debug!("Parsing XML (trim_text: {})", self.options.trim_text);

        let tree = XmlAdapter::new(&self.options)
            .run(source)
            .inspect_err(|err| warn!("XML input rejected: {}", err))?;

        debug!("Parsed XML: {} nodes", tree.len());
        Ok(tree)
    }
}

struct XmlAdapter<'o> {
    options: &'o XmlOptions,
    builder: TreeBuilder,
    /// Character data not yet pushed; text and entity references accumulate
    /// here so that they form one run.
    pending: String,
    /// Raw names of the open elements, for error reporting.
    open: Vec<String>,
}

impl<'o> XmlAdapter<'o> {
    fn new(options: &'o XmlOptions) -> Self {
        Self {
            options,
            builder: TreeBuilder::new(),
            pending: String::new(),
            open: Vec::new(),
        }
    }

    fn run(mut self, source: &mut dyn BufRead) -> Result<Tree, ParseError> {
        // Trimming is applied to whole runs in `flush`; the tokenizer would
        // trim each piece between entity references.
        let mut reader = NsReader::from_reader(source);
        reader.config_mut().trim_text(false);
        let mut buf = Vec::new();

        self.builder.push(Event::root())?;

        loop {
            match reader.read_event_into(&mut buf)? {
                XmlEvent::Start(e) => {
                    self.flush()?;
                    self.start(&reader, &e)?;
                    self.open
                        .push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                }
                XmlEvent::Empty(e) => {
                    self.flush()?;
                    self.start(&reader, &e)?;
                    self.builder.push(Event::End)?;
                }
                XmlEvent::End(_) => {
                    self.flush()?;
                    self.open.pop();
                    self.builder.push(Event::End)?;
                }
                XmlEvent::Text(e) => {
                    let text = e.decode().map_err(quick_xml::Error::from)?;
                    self.pending.push_str(&normalize_newlines(&text));
                }
                XmlEvent::GeneralRef(e) => {
                    let name = e.decode().map_err(quick_xml::Error::from)?;
                    let reference = format!("&{};", name);
                    let resolved = unescape(&reference).map_err(quick_xml::Error::from)?;
                    self.pending.push_str(&resolved);
                }
                XmlEvent::CData(e) => {
                    self.flush()?;
                    let text = reader
                        .decoder()
                        .decode(&e)
                        .map_err(quick_xml::Error::from)?;
                    self.builder
                        .push(Event::text(normalize_newlines(&text).as_bytes()))?;
                }
                XmlEvent::Comment(e) => {
                    self.flush()?;
                    self.builder.push(Event::comment(e.into_inner()))?;
                }
                XmlEvent::PI(e) => {
                    self.flush()?;
                    let target = String::from_utf8_lossy(e.target()).into_owned();
                    let content = e.content().trim_ascii_start();
                    self.builder
                        .push(Event::processing_instruction(target, content))?;
                }
                XmlEvent::Decl(e) => {
                    if self.options.emit_declaration {
                        self.flush()?;
                        let content = declaration(&e)?;
                        self.builder
                            .push(Event::processing_instruction("xml", content.into_bytes()))?;
                    }
                }
                XmlEvent::DocType(_) => {}
                XmlEvent::Eof => break,
            }
            buf.clear();
        }

        self.flush()?;
        if let Some(name) = self.open.pop() {
            return Err(ParseError::unclosed(name));
        }
        self.builder.push(Event::End)?;

        Ok(self.builder.finish()?)
    }

    /// Pushes `Start` followed by one `Attr` per attribute.
    fn start<R>(&mut self, reader: &NsReader<R>, e: &BytesStart<'_>) -> Result<(), ParseError> {
        let (ns, local) = reader.resolve_element(e.name());
        let name = qualified(reader, ns, local.as_ref())?;
        self.builder.push(Event::Start(name))?;

        for attr in e.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let name = attribute_name(reader, attr.key)?;
            // Line ends are normalized before references are expanded, so
            // `&#13;` still yields a carriage return.
            let raw = reader
                .decoder()
                .decode(&attr.value)
                .map_err(quick_xml::Error::from)?;
            let value = unescape(&normalize_newlines(&raw))
                .map_err(quick_xml::Error::from)?
                .into_owned();
            self.builder.push(Event::attr(name, value))?;
        }
        Ok(())
    }

    /// Pushes the pending run, trimmed first if the options ask for it.
    /// An empty run produces no event.
    fn flush(&mut self) -> Result<(), ParseError> {
        let text = if self.options.trim_text {
            self.pending.trim_matches(is_xml_whitespace)
        } else {
            self.pending.as_str()
        };
        if !text.is_empty() {
            self.builder.push(Event::text(text.as_bytes()))?;
        }
        self.pending.clear();
        Ok(())
    }
}

fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Turns `\r\n` and lone `\r` into `\n`, as XML requires of parsed text.
fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

/// `xmlns` declarations keep the prefix as their local name under the
/// `xmlns` space; every other attribute is resolved like an element name.
fn attribute_name<R>(reader: &NsReader<R>, key: XmlName<'_>) -> Result<QName, quick_xml::Error> {
    match key.as_namespace_binding() {
        Some(PrefixDeclaration::Default) => Ok(QName::local("xmlns")),
        Some(PrefixDeclaration::Named(prefix)) => {
            Ok(QName::new("xmlns", reader.decoder().decode(prefix)?))
        }
        None => {
            let (ns, local) = reader.resolve_attribute(key);
            qualified(reader, ns, local.as_ref())
        }
    }
}

fn qualified<R>(
    reader: &NsReader<R>,
    ns: ResolveResult<'_>,
    local: &[u8],
) -> Result<QName, quick_xml::Error> {
    let decoder = reader.decoder();
    let space = match ns {
        ResolveResult::Bound(ns) => decoder.decode(ns.as_ref())?.into_owned(),
        ResolveResult::Unknown(prefix) => decoder.decode(&prefix)?.into_owned(),
        ResolveResult::Unbound => String::new(),
    };
    Ok(QName::new(space, decoder.decode(local)?))
}

/// Rebuilds the pseudo-attributes of `<?xml ...?>`.
fn declaration(decl: &BytesDecl<'_>) -> Result<String, quick_xml::Error> {
    let mut content = format!("version=\"{}\"", String::from_utf8_lossy(&decl.version()?));
    if let Some(encoding) = decl.encoding() {
        content.push_str(&format!(" encoding=\"{}\"", String::from_utf8_lossy(&encoding?)));
    }
    if let Some(standalone) = decl.standalone() {
        content.push_str(&format!(" standalone=\"{}\"", String::from_utf8_lossy(&standalone?)));
    }
    Ok(content)
}
