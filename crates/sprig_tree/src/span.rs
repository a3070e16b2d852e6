//! Span type for the tree's shared buffers.
//!
//! Every payload a tree stores (text bytes, attribute values, child lists)
//! lives in one growing buffer per payload kind. Nodes only record a
//! [`Span`] into that buffer.

use serde::{Deserialize, Serialize};

/// A half-open `[start, end)` interval over one of the tree's buffers.
///
/// Offsets are `u32` to keep node entries compact; the builder rejects
/// documents whose buffers outgrow that range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive).
    pub start: u32,
    /// End offset (exclusive).
    pub end: u32,
}

impl Span {
    /// The empty span at offset zero.
    pub const EMPTY: Span = Span::new(0, 0);

    /// Creates a new span.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Returns the length of the span.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns true if the span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if this span contains the given offset.
    #[inline]
    pub const fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Returns the span as a `usize` range for slicing.
    #[inline]
    pub const fn range(&self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }

    /// Slices `buf` by this span.
    ///
    /// Spans are only ever created by the buffer's owner, so an out-of-range
    /// span yields an empty slice rather than a panic.
    #[inline]
    pub fn slice<'a, T>(&self, buf: &'a [T]) -> &'a [T] {
        buf.get(self.range()).unwrap_or(&[])
    }

    /// Slices a string buffer by this span.
    #[inline]
    pub fn slice_str<'a>(&self, buf: &'a str) -> &'a str {
        buf.get(self.range()).unwrap_or("")
    }
}
