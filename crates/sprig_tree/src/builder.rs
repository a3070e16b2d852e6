//! Arena builder: canonical events in, immutable [`Tree`] out.
//!
//! Building happens in two steps. [`TreeBuilder::push`] materializes each
//! event into the node store, copying payload bytes into shared buffers.
//! [`TreeBuilder::finish`] then makes one forward pass with a stack of open
//! elements to link parents, close ranges and hand out child lists.
//!
//! Child lists come out of a single pool sized up front to the number of
//! listable nodes. An element's list is cut from the pool when the element
//! closes; its children have all closed earlier, so the cuts never overlap.

use tracing::{debug, warn};

use crate::name::{NameId, NamePool};
use crate::tree::{DirectMembers, Entry, EntryKind};
use crate::{BuildError, Event, NodeId, QName, Span, Tree};

/// Accumulates canonical events and assembles them into a [`Tree`].
///
/// # Example
///
/// ```rust
/// use sprig_tree::{Event, QName, TreeBuilder};
///
/// let mut builder = TreeBuilder::new();
/// builder.push(Event::root())?;
/// builder.push(Event::Start(QName::local("p")))?;
/// builder.push(Event::text(&b"hello"[..]))?;
/// builder.push(Event::End)?;
/// builder.push(Event::End)?;
///
/// let tree = builder.finish()?;
/// let p = tree.root().children().next().unwrap();
/// assert_eq!(p.name().local, "p");
/// assert!(p.equals("hello"));
/// # Ok::<(), sprig_tree::BuildError>(())
/// ```
#[derive(Debug)]
pub struct TreeBuilder {
    entries: Vec<Entry>,
    text: Vec<u8>,
    values: String,
    names: NamePool,
    /// Count of Start/Text/Comment/PI entries: the child pool's final size.
    listed: usize,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a builder whose node store is pre-sized for `events` events.
    pub fn with_capacity(events: usize) -> Self {
        Self {
            entries: Vec::with_capacity(events),
            text: Vec::new(),
            values: String::new(),
            names: NamePool::new(),
            listed: 0,
        }
    }

    /// Number of events pushed so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends one event to the node store.
    ///
    /// Only storage limits are checked here; structure is validated by
    /// [`finish`](Self::finish).
    pub fn push(&mut self, event: Event<'_>) -> Result<(), BuildError> {
        // Keeps every position representable as u32 (and `end + 1` too).
        if self.entries.len() >= u32::MAX as usize - 1 {
            return Err(BuildError::capacity("node store"));
        }

        let entry = match event {
            Event::Start(name) => {
                self.listed += 1;
                Entry::new(EntryKind::Start, self.intern(name)?, Span::EMPTY)
            }
            Event::Attr { name, value } => {
                let name = self.intern(name)?;
                let start = offset(self.values.len(), "attribute values")?;
                self.values.push_str(&value);
                let end = offset(self.values.len(), "attribute values")?;
                Entry::new(EntryKind::Attr, name, Span::new(start, end))
            }
            Event::Text(bytes) => {
                self.listed += 1;
                let span = self.append_text(&bytes)?;
                Entry::new(EntryKind::Text, NameId::default(), span)
            }
            Event::Comment(bytes) => {
                self.listed += 1;
                let span = self.append_text(&bytes)?;
                Entry::new(EntryKind::Comment, NameId::default(), span)
            }
            Event::ProcessingInstruction { target, content } => {
                self.listed += 1;
                let name = self.intern(QName::local(target.into_owned()))?;
                let span = self.append_text(&content)?;
                Entry::new(EntryKind::ProcessingInstruction, name, span)
            }
            Event::End => Entry::new(EntryKind::End, NameId::default(), Span::EMPTY),
        };

        self.entries.push(entry);
        Ok(())
    }

    /// Links the pushed events into a tree.
    ///
    /// Succeeds only if the first event opens the root element and the stack
    /// of open elements empties exactly at the last event.
    pub fn finish(self) -> Result<Tree, BuildError> {
        let Self {
            mut entries,
            text,
            values,
            names,
            listed,
        } = self;

        if entries.first().map(|e| e.kind) != Some(EntryKind::Start) {
            warn!("Tree build failed: event sequence has no root element");
            return Err(BuildError::MissingRoot);
        }

        let mut stack: Vec<NodeId> = Vec::with_capacity(16);
        let mut pool: Vec<NodeId> = Vec::with_capacity(listed);
        let mut root: Option<NodeId> = None;

        for pos in 0..entries.len() {
            // `push` caps the store below u32::MAX.
            let id = NodeId(pos as u32);
            let kind = entries[pos].kind;

            if root.is_some() && kind != EntryKind::End {
                warn!("Tree build failed: event {} follows the root element", pos);
                return Err(BuildError::TrailingEvent { position: pos });
            }

            match kind {
                EntryKind::Start => {
                    entries[pos].parent = stack.last().copied();
                    stack.push(id);
                }
                EntryKind::Attr
                | EntryKind::Text
                | EntryKind::Comment
                | EntryKind::ProcessingInstruction => {
                    let entry = &mut entries[pos];
                    entry.parent = stack.last().copied();
                    entry.end = id.0 + 1;
                }
                EntryKind::End => {
                    let Some(open) = stack.pop() else {
                        warn!("Tree build failed: end event {} has no open element", pos);
                        return Err(BuildError::UnexpectedEnd { position: pos });
                    };
                    entries[open.index()].end = id.0;

                    let first = pool.len();
                    pool.extend(
                        DirectMembers::new(&entries, open)
                            .filter(|(_, entry)| entry.kind.node_kind().is_child_kind())
                            .map(|(child, _)| child),
                    );
                    // The pool never outgrows `listed`, which is below u32::MAX.
                    entries[open.index()].children = Span::new(first as u32, pool.len() as u32);

                    if stack.is_empty() {
                        root = Some(open);
                    }
                }
            }
        }

        let Some(root) = root else {
            warn!("Tree build failed: {} element(s) left open", stack.len());
            return Err(BuildError::Unclosed { open: stack.len() });
        };

        let node_count = entries.iter().filter(|e| e.kind != EntryKind::End).count();
        debug!(
            "Built tree: {} nodes, {} text bytes, {} distinct names",
            node_count,
            text.len(),
            names.len()
        );

        Ok(Tree {
            entries,
            text,
            values,
            names: names.freeze(),
            children: pool,
            root,
            node_count,
        })
    }

    fn intern(&mut self, name: QName) -> Result<NameId, BuildError> {
        self.names
            .intern(name)
            .ok_or_else(|| BuildError::capacity("name pool"))
    }

    fn append_text(&mut self, bytes: &[u8]) -> Result<Span, BuildError> {
        let start = offset(self.text.len(), "text buffer")?;
        self.text.extend_from_slice(bytes);
        let end = offset(self.text.len(), "text buffer")?;
        Ok(Span::new(start, end))
    }
}

fn offset(len: usize, what: &'static str) -> Result<u32, BuildError> {
    u32::try_from(len).map_err(|_| BuildError::capacity(what))
}
