//! Canonical events.
//!
//! Both markup adapters reduce their source to this one sequence, which the
//! [`TreeBuilder`](crate::TreeBuilder) consumes.

use std::borrow::Cow;

use crate::QName;

/// A single canonical markup event.
///
/// Payloads borrow from the producer where they can; the builder copies them
/// into the tree's shared buffers on push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
    /// An element opens. Its attributes follow as `Attr` events.
    Start(QName),
    /// An attribute of the element opened by the preceding `Start`.
    Attr {
        /// Attribute name.
        name: QName,
        /// Attribute value, with references already resolved.
        value: Cow<'a, str>,
    },
    /// A run of character data.
    Text(Cow<'a, [u8]>),
    /// Comment contents, without delimiters.
    Comment(Cow<'a, [u8]>),
    /// A processing instruction.
    ProcessingInstruction {
        /// The instruction target, recorded as the node name.
        target: Cow<'a, str>,
        /// Everything after the target.
        content: Cow<'a, [u8]>,
    },
    /// The innermost open element closes.
    End,
}

impl<'a> Event<'a> {
    /// Text event from anything byte-like.
    pub fn text(bytes: impl Into<Cow<'a, [u8]>>) -> Self {
        Event::Text(bytes.into())
    }

    /// Comment event from anything byte-like.
    pub fn comment(bytes: impl Into<Cow<'a, [u8]>>) -> Self {
        Event::Comment(bytes.into())
    }

    /// Attribute event.
    pub fn attr(name: QName, value: impl Into<Cow<'a, str>>) -> Self {
        Event::Attr {
            name,
            value: value.into(),
        }
    }

    /// Processing-instruction event.
    pub fn processing_instruction(
        target: impl Into<Cow<'a, str>>,
        content: impl Into<Cow<'a, [u8]>>,
    ) -> Self {
        Event::ProcessingInstruction {
            target: target.into(),
            content: content.into(),
        }
    }

    /// The synthetic root every adapter wraps its output in.
    pub fn root() -> Self {
        Event::Start(QName::default())
    }
}
