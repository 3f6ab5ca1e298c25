//! # babbler-core
//!
//! Foundation types for the babbler chat brain:
//!
//! - **Branded IDs**: [`BrainId`], [`NodeId`] and [`Symbol`] integer newtypes
//! - **Sequence containers**: the sorted [`Dict`] keyword set and the ordered
//!   [`List`] sentence buffer
//! - **Text segmentation**: the word-boundary tokenizer and reply formatting
//!
//! This crate is a leaf: it never touches the store and holds no I/O beyond
//! the `rusqlite` column conversions for the ID newtypes.

#![deny(unsafe_code)]

pub mod dict;
pub mod ids;
pub mod list;
pub mod text;

pub use dict::Dict;
pub use ids::{BrainId, NodeId, Symbol};
pub use list::List;
pub use text::{capitalise, tokenize};
