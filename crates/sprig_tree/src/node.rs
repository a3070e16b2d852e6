//! Read-only node views and string-value queries.

use std::borrow::Cow;
use std::fmt;
use std::iter::FusedIterator;
use std::ops::Range;
use std::ptr;

use serde::Serialize;

use crate::tree::{DirectMembers, EntryKind};
use crate::{segmented, NodeId, NodeKind, QName, Tree};

/// A node of a [`Tree`].
///
/// `Node` is a copyable view: a borrow of the tree plus an index. It can
/// never outlive the tree it points into.
///
/// # String value
///
/// The string value of an element is the concatenation of every descendant
/// text run in document order; comments, processing instructions and
/// attributes contribute nothing. For every other node it is the node's own
/// payload. [`equals`](Self::equals), [`starts_with`](Self::starts_with) and
/// [`contains`](Self::contains) answer against that value without building
/// it.
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t Tree,
    id: NodeId,
}

impl<'t> Node<'t> {
    #[inline]
    pub(crate) const fn new(tree: &'t Tree, id: NodeId) -> Self {
        Self { tree, id }
    }

    /// This node's id within its tree.
    #[inline]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// The tree this node belongs to.
    #[inline]
    pub const fn tree(&self) -> &'t Tree {
        self.tree
    }

    /// The node's kind.
    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.tree.entry(self.id).kind.node_kind()
    }

    /// Qualified name. Empty for text, comments and the synthetic root;
    /// the target for processing instructions.
    #[inline]
    pub fn name(&self) -> &'t QName {
        self.tree.names.get(self.tree.entry(self.id).name)
    }

    /// The attribute value, for `Attr` nodes.
    pub fn value(&self) -> Option<&'t str> {
        let entry = self.tree.entry(self.id);
        (entry.kind == EntryKind::Attr).then(|| entry.payload.slice_str(&self.tree.values))
    }

    /// The raw payload, for `Text`, `Comment` and `ProcessingInstruction` nodes.
    pub fn text(&self) -> Option<&'t [u8]> {
        let entry = self.tree.entry(self.id);
        match entry.kind {
            EntryKind::Text | EntryKind::Comment | EntryKind::ProcessingInstruction => {
                Some(entry.payload.slice(&self.tree.text))
            }
            _ => None,
        }
    }

    /// Half-open interval over the node store. An element's range covers
    /// itself and every descendant; any other node covers one slot.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.id.index()..self.tree.entry(self.id).end as usize
    }

    /// The enclosing element, or `None` for the root.
    #[inline]
    pub fn parent(&self) -> Option<Node<'t>> {
        self.tree
            .entry(self.id)
            .parent
            .map(|id| Node::new(self.tree, id))
    }

    /// Direct element, text, comment and processing-instruction children, in
    /// document order. Attributes are never listed here; see
    /// [`attributes`](Self::attributes).
    pub fn children(&self) -> Children<'t> {
        let ids = self.tree.entry(self.id).children.slice(&self.tree.children);
        Children {
            tree: self.tree,
            ids: ids.iter(),
        }
    }

    /// This element's attributes, in document order.
    ///
    /// Found by scanning the element's own range, not through the child list.
    pub fn attributes(&self) -> Attributes<'t> {
        Attributes {
            tree: self.tree,
            members: DirectMembers::new(&self.tree.entries, self.id),
        }
    }

    /// The first attribute whose local name is `local`.
    pub fn attribute(&self, local: &str) -> Option<Node<'t>> {
        self.attributes().find(|attr| attr.name().local == local)
    }

    /// Every node inside this one, in document order, attributes excluded.
    pub fn descendants(&self) -> Descendants<'t> {
        Descendants {
            tree: self.tree,
            next: self.id.index() + 1,
            end: self.tree.entry(self.id).end as usize,
        }
    }

    /// The byte runs whose concatenation is this node's string value.
    pub fn text_runs(&self) -> TextRuns<'t> {
        let entry = self.tree.entry(self.id);
        let inner = match entry.kind {
            EntryKind::Start => RunsInner::Descendants {
                tree: self.tree,
                next: self.id.index() + 1,
                end: entry.end as usize,
            },
            EntryKind::Attr => RunsInner::Single(Some(
                entry.payload.slice_str(&self.tree.values).as_bytes(),
            )),
            EntryKind::Text | EntryKind::Comment | EntryKind::ProcessingInstruction => {
                RunsInner::Single(Some(entry.payload.slice(&self.tree.text)))
            }
            EntryKind::End => RunsInner::Single(None),
        };
        TextRuns { inner }
    }

    /// The string value as bytes.
    ///
    /// Borrowed for every node whose value is a single run; an element's
    /// value is copied into one allocation of exactly the right size.
    pub fn bytes(&self) -> Cow<'t, [u8]> {
        let runs = self.text_runs();
        if let RunsInner::Single(run) = runs.inner {
            return Cow::Borrowed(run.unwrap_or_default());
        }

        let len = runs.clone().map(<[u8]>::len).sum();
        let mut buf = Vec::with_capacity(len);
        for run in runs {
            buf.extend_from_slice(run);
        }
        Cow::Owned(buf)
    }

    /// The string value, with invalid UTF-8 replaced.
    pub fn string(&self) -> Cow<'t, str> {
        match self.bytes() {
            Cow::Borrowed(bytes) => String::from_utf8_lossy(bytes),
            Cow::Owned(bytes) => match String::from_utf8(bytes) {
                Ok(s) => Cow::Owned(s),
                Err(err) => Cow::Owned(String::from_utf8_lossy(err.as_bytes()).into_owned()),
            },
        }
    }

    /// Returns true if the string value equals `needle`.
    pub fn equals(&self, needle: impl AsRef<[u8]>) -> bool {
        segmented::equals(self.text_runs(), needle.as_ref())
    }

    /// Returns true if the string value starts with `needle`.
    pub fn starts_with(&self, needle: impl AsRef<[u8]>) -> bool {
        segmented::starts_with(self.text_runs(), needle.as_ref())
    }

    /// Returns true if `needle` occurs in the string value, including across
    /// text runs that sit apart in the document.
    pub fn contains(&self, needle: impl AsRef<[u8]>) -> bool {
        segmented::contains(self.text_runs(), needle.as_ref())
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("name", &format_args!("{}", self.name()))
            .field("range", &self.range())
            .finish()
    }
}

/// Writes the string value.
impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string())
    }
}

impl Serialize for Node<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let kind = self.kind();
        let has_name = matches!(
            kind,
            NodeKind::Start | NodeKind::Attr | NodeKind::ProcessingInstruction
        );
        let has_attributes = kind == NodeKind::Start && self.attributes().next().is_some();

        let mut len = 1; // kind
        if has_name {
            len += 1;
        }
        if self.value().is_some() || self.text().is_some() {
            len += 1;
        }
        if has_attributes {
            len += 1;
        }
        if kind == NodeKind::Start {
            len += 1;
        }

        let mut state = serializer.serialize_struct("Node", len)?;
        state.serialize_field("kind", &kind)?;

        if has_name {
            state.serialize_field("name", &self.name().to_string())?;
        }
        if let Some(value) = self.value() {
            state.serialize_field("value", value)?;
        }
        if let Some(text) = self.text() {
            state.serialize_field("text", &String::from_utf8_lossy(text))?;
        }
        if has_attributes {
            state.serialize_field("attributes", &SerializeAttributes(*self))?;
        }
        if kind == NodeKind::Start {
            state.serialize_field("children", &SerializeChildren(*self))?;
        }

        state.end()
    }
}

struct SerializeAttributes<'t>(Node<'t>);

impl Serialize for SerializeAttributes<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.0.attributes())
    }
}

struct SerializeChildren<'t>(Node<'t>);

impl Serialize for SerializeChildren<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.0.children())
    }
}

/// Iterator over an element's child list. See [`Node::children`].
#[derive(Clone)]
pub struct Children<'t> {
    tree: &'t Tree,
    ids: std::slice::Iter<'t, NodeId>,
}

impl<'t> Iterator for Children<'t> {
    type Item = Node<'t>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.ids.next().map(|&id| Node::new(self.tree, id))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.ids.next_back().map(|&id| Node::new(self.tree, id))
    }
}

impl ExactSizeIterator for Children<'_> {}

impl FusedIterator for Children<'_> {}

/// Iterator over an element's attributes. See [`Node::attributes`].
pub struct Attributes<'t> {
    tree: &'t Tree,
    members: DirectMembers<'t>,
}

impl<'t> Iterator for Attributes<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        self.members
            .by_ref()
            .find(|(_, entry)| entry.kind == EntryKind::Attr)
            .map(|(id, _)| Node::new(self.tree, id))
    }
}

/// Document-order iterator over a node's descendants. See [`Node::descendants`].
#[derive(Clone)]
pub struct Descendants<'t> {
    tree: &'t Tree,
    next: usize,
    end: usize,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.end {
            let index = self.next;
            self.next += 1;
            match self.tree.entries.get(index)?.kind {
                EntryKind::Attr | EntryKind::End => continue,
                _ => return Some(Node::new(self.tree, NodeId(index as u32))),
            }
        }
        None
    }
}

impl FusedIterator for Descendants<'_> {}

/// The runs making up a node's string value. See [`Node::text_runs`].
///
/// Cloning is cheap, which lets the matchers resume from any run.
#[derive(Clone)]
pub struct TextRuns<'t> {
    inner: RunsInner<'t>,
}

#[derive(Clone)]
enum RunsInner<'t> {
    Single(Option<&'t [u8]>),
    Descendants {
        tree: &'t Tree,
        next: usize,
        end: usize,
    },
}

impl<'t> Iterator for TextRuns<'t> {
    type Item = &'t [u8];

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            RunsInner::Single(run) => run.take(),
            RunsInner::Descendants { tree, next, end } => {
                while *next < *end {
                    let entry = tree.entries.get(*next)?;
                    *next += 1;
                    if entry.kind == EntryKind::Text {
                        return Some(entry.payload.slice(&tree.text));
                    }
                }
                None
            }
        }
    }
}

impl FusedIterator for TextRuns<'_> {}
