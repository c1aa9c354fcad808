//! Composition-root helpers binding a repository into the store.
//!
//! # Responsibility
//! - Build the concrete persistence adapter once per process.
//! - Hand it to the store through constructor injection, never a global.
//!
//! # Invariants
//! - Building a store without a bound repository fails immediately with
//!   `WiringError::RepositoryNotBound`.
//! - At most one professor repository is bound per `Providers`.

use crate::repo::{ProfessorRepository, SlotProfessorRepository};
use crate::slot::{MemorySlot, SlotError, SqliteSlot};
use crate::store::ProfessorStore;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

/// Wiring failure. Always a configuration bug, never a runtime condition.
#[derive(Debug)]
pub enum WiringError {
    /// A store was requested before any repository was provided.
    RepositoryNotBound,
    /// The persistence medium could not be opened.
    Storage(SlotError),
}

impl Display for WiringError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RepositoryNotBound => write!(f, "professor repository is not bound"),
            Self::Storage(err) => write!(f, "failed to open storage: {err}"),
        }
    }
}

impl Error for WiringError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::RepositoryNotBound => None,
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<SlotError> for WiringError {
    fn from(value: SlotError) -> Self {
        Self::Storage(value)
    }
}

/// Persistence medium selection for [`open_repository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process-local map; nothing survives the process.
    Memory,
    /// SQLite database file at the given path.
    Sqlite(PathBuf),
}

/// Explicit registry of injectable capabilities.
#[derive(Default)]
pub struct Providers {
    professor_repository: Option<Arc<dyn ProfessorRepository>>,
}

impl Providers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the repository used by stores built from this registry.
    ///
    /// Rebinding replaces the previous repository and is logged.
    pub fn provide_professor_repository(&mut self, repository: Arc<dyn ProfessorRepository>) {
        if self.professor_repository.replace(repository).is_some() {
            warn!(
                "event=wiring_bind module=wiring status=replaced capability=professor_repository"
            );
        }
    }

    pub fn with_professor_repository(mut self, repository: Arc<dyn ProfessorRepository>) -> Self {
        self.provide_professor_repository(repository);
        self
    }

    /// Returns the bound repository.
    pub fn professor_repository(&self) -> Result<Arc<dyn ProfessorRepository>, WiringError> {
        self.professor_repository.clone().ok_or_else(|| {
            error!(
                "event=wiring_resolve module=wiring status=error capability=professor_repository error_code=not_bound"
            );
            WiringError::RepositoryNotBound
        })
    }

    /// Builds a store over the bound repository.
    pub fn professor_store(&self) -> Result<ProfessorStore, WiringError> {
        Ok(ProfessorStore::new(self.professor_repository()?))
    }
}

/// Opens the configured medium and loads a repository over `storage_key`.
pub fn open_repository(
    backend: &StorageBackend,
    storage_key: &str,
) -> Result<Arc<dyn ProfessorRepository>, WiringError> {
    let repository: Arc<dyn ProfessorRepository> = match backend {
        StorageBackend::Memory => Arc::new(SlotProfessorRepository::load(
            MemorySlot::new(),
            storage_key,
        )),
        StorageBackend::Sqlite(path) => Arc::new(SlotProfessorRepository::load(
            SqliteSlot::open(path)?,
            storage_key,
        )),
    };

    info!(
        "event=wiring_open module=wiring status=ok backend={} key={storage_key}",
        backend_name(backend)
    );
    Ok(repository)
}

/// Builds a registry with a repository over the configured medium bound.
pub fn bootstrap(backend: &StorageBackend, storage_key: &str) -> Result<Providers, WiringError> {
    Ok(Providers::new().with_professor_repository(open_repository(backend, storage_key)?))
}

fn backend_name(backend: &StorageBackend) -> &'static str {
    match backend {
        StorageBackend::Memory => "memory",
        StorageBackend::Sqlite(_) => "sqlite",
    }
}
