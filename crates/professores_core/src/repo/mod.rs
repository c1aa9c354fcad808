//! Repository layer for professor records.
//!
//! # Responsibility
//! - Define the async CRUD contract consumed by the store.
//! - Own load/save serialization of the persisted collection.
//!
//! # Invariants
//! - Expected conditions (missing fields, unknown ids) yield `None`, never errors.
//! - Persistence failures are logged and reported through `Persistence`, never raised.

pub mod professor_repo;

pub use professor_repo::{
    Mutation, Persistence, ProfessorRepository, SlotProfessorRepository, DEFAULT_STORAGE_KEY,
};
