//! # sprig_tree
//!
//! Immutable markup trees for sprig.
//!
//! This crate turns a sequence of canonical markup events into a read-only
//! tree and answers string-value queries against it.
//!
//! ## Architecture
//!
//! - Markup adapters reduce their input to [`Event`]s
//! - [`TreeBuilder`] materializes the events into one node store, then links
//!   parents and child lists in a single forward pass
//! - Text payloads share one buffer; child lists share one pool
//! - [`Node`] is a copyable view that borrows the [`Tree`]
//! - [`segmented`] matches needles against text split into runs, so a node's
//!   string value is never built just to be compared
//!
//! ## Example
//!
//! ```rust
//! use sprig_tree::{Event, NodeKind, QName, TreeBuilder};
//!
//! let mut builder = TreeBuilder::new();
//! for event in [
//!     Event::root(),
//!     Event::Start(QName::local("p")),
//!     Event::text(&b"ab"[..]),
//!     Event::comment(&b"note"[..]),
//!     Event::text(&b"cd"[..]),
//!     Event::End,
//!     Event::End,
//! ] {
//!     builder.push(event)?;
//! }
//! let tree = builder.finish()?;
//!
//! let p = tree.root().children().next().unwrap();
//! assert_eq!(p.kind(), NodeKind::Start);
//! assert!(p.contains("bc"));
//! # Ok::<(), sprig_tree::BuildError>(())
//! ```

mod builder;
mod error;
mod event;
mod name;
mod node;
pub mod segmented;
mod span;
mod tree;

pub use builder::TreeBuilder;
pub use error::BuildError;
pub use event::Event;
pub use name::QName;
pub use node::{Attributes, Children, Descendants, Node, TextRuns};
pub use span::Span;
pub use tree::{NodeId, NodeKind, Tree};
