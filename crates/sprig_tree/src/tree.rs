//! The immutable node store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::name::{NameId, NamePool};
use crate::{Node, Span};

/// Kind of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Matches any kind. Never produced by construction; reserved for query
    /// layers that need a "match anything" kind test.
    Wildcard,
    /// An element.
    Start,
    /// An attribute of an element.
    Attr,
    /// Character data.
    Text,
    /// A comment.
    Comment,
    /// A processing instruction.
    ProcessingInstruction,
}

impl NodeKind {
    /// Returns true for the kinds that appear in an element's child list.
    #[inline]
    pub const fn is_child_kind(self) -> bool {
        matches!(
            self,
            NodeKind::Start | NodeKind::Text | NodeKind::Comment | NodeKind::ProcessingInstruction
        )
    }
}

/// Index of a node in its tree's store.
///
/// Ids are only meaningful for the tree that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Position of the node in document order, counting every stored event.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a store entry holds. `End` marks where an element closed and is
/// never exposed as a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryKind {
    Start,
    Attr,
    Text,
    Comment,
    ProcessingInstruction,
    End,
}

impl EntryKind {
    /// `End` maps to `Wildcard`; nodes are never built over end markers.
    pub(crate) const fn node_kind(self) -> NodeKind {
        match self {
            EntryKind::Start => NodeKind::Start,
            EntryKind::Attr => NodeKind::Attr,
            EntryKind::Text => NodeKind::Text,
            EntryKind::Comment => NodeKind::Comment,
            EntryKind::ProcessingInstruction => NodeKind::ProcessingInstruction,
            EntryKind::End => NodeKind::Wildcard,
        }
    }
}

/// One event as stored in the tree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Entry {
    pub(crate) kind: EntryKind,
    pub(crate) name: NameId,
    /// Text/Comment/PI: span into `Tree::text`. Attr: span into `Tree::values`.
    pub(crate) payload: Span,
    /// Exclusive end of the node's range in the store.
    pub(crate) end: u32,
    pub(crate) parent: Option<NodeId>,
    /// Span into `Tree::children` (Start only).
    pub(crate) children: Span,
}

impl Entry {
    pub(crate) const fn new(kind: EntryKind, name: NameId, payload: Span) -> Self {
        Self {
            kind,
            name,
            payload,
            end: 0,
            parent: None,
            children: Span::EMPTY,
        }
    }
}

/// Entries whose parent is the element at `parent`, in document order.
///
/// Nested elements' ranges are skipped wholesale, so walking an element's
/// members costs only as much as its direct members.
pub(crate) struct DirectMembers<'a> {
    entries: &'a [Entry],
    next: usize,
    end: usize,
    parent: NodeId,
}

impl<'a> DirectMembers<'a> {
    pub(crate) fn new(entries: &'a [Entry], parent: NodeId) -> Self {
        let end = entries.get(parent.index()).map_or(0, |e| e.end as usize);
        Self {
            entries,
            next: parent.index() + 1,
            end,
            parent,
        }
    }
}

impl<'a> Iterator for DirectMembers<'a> {
    type Item = (NodeId, &'a Entry);

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.end {
            let index = self.next;
            let entry = self.entries.get(index)?;
            self.next = if entry.kind == EntryKind::Start {
                entry.end as usize + 1
            } else {
                index + 1
            };
            if entry.parent == Some(self.parent) {
                return Some((NodeId(index as u32), entry));
            }
        }
        None
    }
}

/// An immutable document tree.
///
/// All nodes live in one store in document order; every payload lives in a
/// handful of shared buffers. Dropping the tree releases everything at once,
/// and [`Node`] views borrow the tree so none can outlive it.
#[derive(Debug)]
pub struct Tree {
    pub(crate) entries: Vec<Entry>,
    pub(crate) text: Vec<u8>,
    pub(crate) values: String,
    pub(crate) names: NamePool,
    pub(crate) children: Vec<NodeId>,
    pub(crate) root: NodeId,
    pub(crate) node_count: usize,
}

impl Tree {
    /// Returns the synthetic root element.
    ///
    /// Its name is empty and its children are the document's top-level nodes.
    #[inline]
    pub fn root(&self) -> Node<'_> {
        Node::new(self, self.root)
    }

    /// Returns the node with the given id, if it exists in this tree.
    pub fn get(&self, id: NodeId) -> Option<Node<'_>> {
        match self.entries.get(id.index()) {
            Some(entry) if entry.kind != EntryKind::End => Some(Node::new(self, id)),
            _ => None,
        }
    }

    /// Number of nodes, attributes included.
    #[inline]
    pub fn len(&self) -> usize {
        self.node_count
    }

    /// Returns true if the tree holds no nodes. A built tree always holds at
    /// least its root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Every node, attributes included, in document order.
    pub fn nodes(&self) -> impl Iterator<Item = Node<'_>> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.kind != EntryKind::End)
            .map(|(index, _)| Node::new(self, NodeId(index as u32)))
    }

    #[inline]
    pub(crate) fn entry(&self, id: NodeId) -> &Entry {
        &self.entries[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Event, QName, TreeBuilder};

    fn build(events: Vec<Event<'static>>) -> Tree {
        let mut builder = TreeBuilder::new();
        for event in events {
            builder.push(event).unwrap();
        }
        builder.finish().unwrap()
    }

    #[test]
    fn test_child_kinds() {
        assert!(NodeKind::Start.is_child_kind());
        assert!(NodeKind::Text.is_child_kind());
        assert!(NodeKind::Comment.is_child_kind());
        assert!(NodeKind::ProcessingInstruction.is_child_kind());
        assert!(!NodeKind::Attr.is_child_kind());
        assert!(!NodeKind::Wildcard.is_child_kind());
    }

    #[test]
    fn test_get_skips_end_markers() {
        let tree = build(vec![Event::root(), Event::Start(QName::local("a")), Event::End, Event::End]);

        assert!(tree.get(NodeId(0)).is_some());
        assert!(tree.get(NodeId(1)).is_some());
        assert!(tree.get(NodeId(2)).is_none());
        assert!(tree.get(NodeId(3)).is_none());
        assert!(tree.get(NodeId(40)).is_none());
    }

    #[test]
    fn test_len_counts_nodes_not_markers() {
        let tree = build(vec![
            Event::root(),
            Event::Start(QName::local("a")),
            Event::attr(QName::local("x"), "1"),
            Event::text(&b"hi"[..]),
            Event::End,
            Event::End,
        ]);

        assert_eq!(tree.len(), 4);
        assert!(!tree.is_empty());
        let kinds: Vec<_> = tree.nodes().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::Start, NodeKind::Start, NodeKind::Attr, NodeKind::Text]
        );
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId(7).to_string(), "#7");
        assert_eq!(NodeId(7).index(), 7);
    }

    #[test]
    fn test_tree_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Tree>();
        assert_send_sync::<Node<'static>>();
    }
}
