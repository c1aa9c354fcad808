//! Domain model for professor records.
//!
//! # Responsibility
//! - Define the record shape shared by repository, store and CLI.
//! - Keep wire naming (`dataAdmissao`) aligned with the persisted JSON.
//!
//! # Invariants
//! - Every persisted record is identified by a repository-assigned `id`.

pub mod professor;
