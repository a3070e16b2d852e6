//! Qualified names and the per-tree name pool.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A qualified name: namespace plus local part.
///
/// The namespace is whatever the event source declared: a namespace URI, an
/// unresolved prefix, or empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct QName {
    /// Namespace (may be empty).
    pub space: String,
    /// Local part.
    pub local: String,
}

impl QName {
    /// Creates a name with a namespace.
    pub fn new(space: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            space: space.into(),
            local: local.into(),
        }
    }

    /// Creates a name with an empty namespace.
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            space: String::new(),
            local: local.into(),
        }
    }

    /// Returns true if both parts are empty (the synthetic root's name).
    pub fn is_empty(&self) -> bool {
        self.space.is_empty() && self.local.is_empty()
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.space.is_empty() {
            f.write_str(&self.local)
        } else {
            write!(f, "{}:{}", self.space, self.local)
        }
    }
}

/// Index into a [`NamePool`]. Id 0 is always the empty name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct NameId(pub(crate) u32);

/// Interning pool: each distinct name of a document is stored once.
#[derive(Debug)]
pub(crate) struct NamePool {
    names: Vec<QName>,
    index: HashMap<QName, NameId>,
}

impl NamePool {
    pub(crate) fn new() -> Self {
        let mut index = HashMap::new();
        index.insert(QName::default(), NameId(0));
        Self {
            names: vec![QName::default()],
            index,
        }
    }

    /// Interns `name`, returning `None` only if the pool outgrows `u32` ids.
    pub(crate) fn intern(&mut self, name: QName) -> Option<NameId> {
        if let Some(&id) = self.index.get(&name) {
            return Some(id);
        }
        let id = NameId(u32::try_from(self.names.len()).ok()?);
        self.names.push(name.clone());
        self.index.insert(name, id);
        Some(id)
    }

    pub(crate) fn get(&self, id: NameId) -> &QName {
        // Ids are only handed out by `intern`; fall back to the empty name.
        self.names.get(id.0 as usize).unwrap_or(&self.names[0])
    }

    pub(crate) fn len(&self) -> usize {
        self.names.len()
    }

    /// Drops the lookup index once building is done; the tree only reads by id.
    pub(crate) fn freeze(mut self) -> Self {
        self.index = HashMap::new();
        self
    }
}
