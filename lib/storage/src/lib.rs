//! # quotx Storage
//!
//! Durable persistence for part collections. Each collection snapshots to a
//! single bincode file under the store's data directory, written atomically
//! and verified by checksum on load. Opening a store restores whatever
//! snapshots are present; collections themselves are get-or-create.

pub mod snapshot;
pub mod store;

pub use snapshot::{CollectionSnapshot, SnapshotError};
pub use store::IndexStore;
