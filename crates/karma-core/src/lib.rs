//! # karma-core
//!
//! Hierarchical error messages: every level of a call chain wraps the
//! failure it received with its own message and key-value context, and the
//! whole chain renders as a tree.
//!
//! ```text
//! unable to resolve
//! ├─ system error
//! ├─ host: example.com
//! └─ operation: resolv
//! ```
//!
//! - **Context**: [`ContextList`], a persistent ordered list of pairs, started
//!   with [`describe`]
//! - **Nodes**: [`Karma`] with a message, a polymorphic [`Reason`] and context
//! - **Rendering**: [`render`] draws the tree with configurable glyphs
//! - **Codec**: [`codec`] converts nodes to and from JSON
//! - **Flattening**: [`Karma::flatten`] produces a single-line form
//! - **Search**: [`contains`] and [`find`] look through a chain
//! - **Structure**: [`describe_structure`] turns a serializable value into
//!   context pairs
//! - **Logging**: [`logging`] subscriber setup and test capture

#![deny(unsafe_code)]

pub mod codec;
pub mod context;
pub mod describe;
pub mod errors;
pub mod flatten;
pub mod karma;
pub mod logging;
pub mod reason;
pub mod render;

pub use context::{ContextList, describe, value_text};
pub use describe::describe_structure;
pub use errors::CodecError;
pub use flatten::flatten;
pub use karma::{Karma, contains, find};
pub use reason::{DynError, Reason};
pub use render::{RenderConfig, config, render_karma, render_reason, set_config, with_config};
