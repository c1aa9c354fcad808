//! Core logic for professor record management.
//! Repository, store and boundary helpers consumed by front-ends.

pub mod date_format;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod slot;
pub mod store;
pub mod validation;
pub mod wiring;

pub use date_format::{format_iso_date, format_locale_date, DateInput, InputFormat, IsoStyle};
pub use logging::{default_log_level, init_logging, logging_status, LogError, LogSettings};
pub use model::professor::{Professor, ProfessorDraft, ProfessorId};
pub use repo::{
    Mutation, Persistence, ProfessorRepository, SlotProfessorRepository, DEFAULT_STORAGE_KEY,
};
pub use slot::{KeyValueSlot, MemorySlot, SlotError, SlotResult, SqliteSlot};
pub use store::{ProfessorStore, StoreEvent, SubscriptionId};
pub use validation::{
    validate_patch, validate_professor, FieldError, ProfessorField, ValidProfessor,
    ValidationErrors,
};
pub use wiring::{bootstrap, open_repository, Providers, StorageBackend, WiringError};

/// Minimal health-check API for front-end integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
