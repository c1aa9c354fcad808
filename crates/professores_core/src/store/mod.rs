//! UI-facing entity store.
//!
//! # Responsibility
//! - Cache repository results for cheap synchronous reads.
//! - Dispatch mutations to the injected repository and mirror their results.
//! - Notify subscribers about loading and cache changes.
//!
//! # Invariants
//! - The cache is owned by the store; callers only get snapshots.
//! - The store never re-reads the whole collection after a mutation.

pub mod professor_store;

pub use professor_store::{ProfessorStore, StoreEvent, SubscriptionId};
