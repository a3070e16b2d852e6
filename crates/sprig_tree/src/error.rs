//! Tree construction errors.

use thiserror::Error;

/// An event sequence that cannot form a tree.
///
/// Adapters always wrap their output in a synthetic root, so any of these
/// means the event source broke its contract. They are reported instead of
/// producing a tree whose ranges or child lists would be inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// No events, or the first event does not open an element.
    #[error("event sequence does not start with a root element")]
    MissingRoot,

    /// An `End` event arrived with no element open.
    #[error("end event at position {position} has no open element")]
    UnexpectedEnd {
        /// Index of the offending event.
        position: usize,
    },

    /// Input ended with elements still open.
    #[error("{open} element(s) still open at end of input")]
    Unclosed {
        /// Number of elements left on the stack.
        open: usize,
    },

    /// An event followed the close of the root element.
    #[error("event at position {position} follows the root element")]
    TrailingEvent {
        /// Index of the offending event.
        position: usize,
    },

    /// A buffer or the node store outgrew 32-bit addressing.
    #[error("document too large: {what} exceeds u32 range")]
    CapacityExceeded {
        /// Which store overflowed.
        what: &'static str,
    },
}

impl BuildError {
    pub(crate) fn capacity(what: &'static str) -> Self {
        Self::CapacityExceeded { what }
    }
}
