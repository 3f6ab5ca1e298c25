//! # babbler-store
//!
//! `SQLite`-backed brain store for babbler:
//!
//! - **Connection**: single synchronous connection, WAL + foreign keys
//! - **Migrations**: `include_str!` SQL applied in version order
//! - **Repositories**: brains, words (the interner), lists, maps, nodes,
//!   model settings
//! - **`BrainStore` facade**: the store contract consumed by the model,
//!   codec and reply layers, plus caller-scoped transactions
//!
//! The store is the only component that speaks SQL; everything above it
//! addresses the tree through opaque ids.

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod migrations;
pub mod repositories;
pub mod store;

pub use errors::{Result, StoreError};
pub use repositories::list::ListCategory;
pub use repositories::map::MapCategory;
pub use repositories::model::DEFAULT_ORDER;
pub use repositories::node::{ChildRow, NodeRow};
pub use store::{BrainStore, ChildCycle};
