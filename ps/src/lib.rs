//! PlanStore - persistent itinerary record storage
//!
//! Stores serializable records keyed by a stable string id. Two backends:
//!
//! - [`JsonlStore`] - append-only JSONL file with an in-memory index,
//!   rewritten compactly on delete. Records survive process restarts.
//! - [`MemoryStore`] - purely in-memory, for tests and ephemeral runs.
//!
//! Records are immutable once created; the store never updates a record
//! in place. Callers delete and recreate if they need replacement.

mod store;

pub use store::{JsonlStore, MemoryStore, Record, Store, StoreError};
