//! Professor repository contract and slot-backed implementation.
//!
//! # Responsibility
//! - Provide create/read/update/delete over one serialized collection.
//! - Keep the whole collection in memory and rewrite the slot on every mutation.
//!
//! # Invariants
//! - Ids are unique within the collection and never change after creation.
//! - Every mutation persists the entire collection; there is no partial write.
//! - A failed save leaves the in-memory mutation applied (`Persistence::Failed`).
//! - Loading never fails: a missing or corrupt slot yields an empty collection.

use crate::model::professor::{Professor, ProfessorDraft, ProfessorId};
use crate::slot::{KeyValueSlot, SlotError};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error, info, warn};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Slot key holding the serialized professor collection.
pub const DEFAULT_STORAGE_KEY: &str = "professores_data";

/// Whether a mutation also reached the persistence medium.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    /// The full collection was written to the slot.
    Durable,
    /// The mutation only exists in memory; `reason` describes the failed save.
    Failed { reason: String },
}

impl Persistence {
    pub fn is_durable(&self) -> bool {
        matches!(self, Self::Durable)
    }
}

/// Value produced by a mutating repository call plus its persistence outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation<T> {
    pub value: T,
    pub persistence: Persistence,
}

impl<T> Mutation<T> {
    pub fn is_durable(&self) -> bool {
        self.persistence.is_durable()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Async CRUD contract for professor persistence.
///
/// Methods are async even when the medium is synchronous so that backends
/// stay interchangeable behind `Arc<dyn ProfessorRepository>`.
#[async_trait]
pub trait ProfessorRepository: Send + Sync {
    /// Returns the record with `id`, or `None`.
    async fn find_one(&self, id: ProfessorId) -> Option<Professor>;

    /// Returns every stored record. Callers must not rely on ordering.
    async fn get_all(&self) -> Vec<Professor>;

    /// Creates a record from a complete draft.
    ///
    /// Returns `None` without writing when a required field is missing or
    /// falsy. Any `id` in the draft is ignored.
    async fn create(&self, draft: &ProfessorDraft) -> Option<Mutation<Professor>>;

    /// Shallow-merges `patch` onto the record with `id`.
    ///
    /// Returns `None` without writing when `id` is unknown.
    async fn update(&self, id: ProfessorId, patch: &ProfessorDraft)
        -> Option<Mutation<Professor>>;

    /// Removes the record with `id`; unknown ids are a no-op.
    async fn destroy(&self, id: ProfessorId) -> Persistence;
}

#[derive(Debug, Default)]
struct Collection {
    records: Vec<Professor>,
    /// Highest id ever loaded or issued; floor for the next generated id.
    last_id: ProfessorId,
}

impl Collection {
    fn from_records(loaded: Vec<Professor>) -> (Self, usize) {
        let mut collection = Self::default();
        let mut duplicates = 0;

        for record in loaded {
            collection.last_id = collection.last_id.max(record.id);
            match collection.position(record.id) {
                // Later entries win but keep the first entry's position.
                Some(index) => {
                    collection.records[index] = record;
                    duplicates += 1;
                }
                None => collection.records.push(record),
            }
        }

        (collection, duplicates)
    }

    fn position(&self, id: ProfessorId) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    fn next_id(&mut self, now_millis: i64) -> ProfessorId {
        let id = now_millis.max(self.last_id.saturating_add(1));
        self.last_id = id;
        id
    }
}

/// Repository keeping professors as one JSON array under a single slot key.
pub struct SlotProfessorRepository<S: KeyValueSlot> {
    slot: S,
    storage_key: String,
    state: Mutex<Collection>,
}

impl<S: KeyValueSlot> SlotProfessorRepository<S> {
    /// Loads the collection stored under [`DEFAULT_STORAGE_KEY`].
    pub fn new(slot: S) -> Self {
        Self::load(slot, DEFAULT_STORAGE_KEY)
    }

    /// Loads the collection stored under `storage_key`.
    ///
    /// A missing, empty or unparseable value starts an empty collection and
    /// is logged; the slot itself is left untouched until the next mutation.
    pub fn load(slot: S, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let collection = load_collection(&slot, &storage_key);
        Self {
            slot,
            storage_key,
            state: Mutex::new(collection),
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    fn lock(&self) -> MutexGuard<'_, Collection> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn save(&self, collection: &Collection, operation: &'static str) -> Persistence {
        match encode_collection(&collection.records)
            .and_then(|json| self.slot.set(&self.storage_key, &json).map_err(SaveError::Slot))
        {
            Ok(()) => {
                debug!(
                    "event=slot_save module=repo status=ok op={operation} count={}",
                    collection.records.len()
                );
                Persistence::Durable
            }
            Err(err) => {
                error!(
                    "event=slot_save module=repo status=error op={operation} error_code={} error={err}",
                    err.code()
                );
                Persistence::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }
}

#[async_trait]
impl<S: KeyValueSlot> ProfessorRepository for SlotProfessorRepository<S> {
    async fn find_one(&self, id: ProfessorId) -> Option<Professor> {
        let collection = self.lock();
        collection
            .position(id)
            .map(|index| collection.records[index].clone())
    }

    async fn get_all(&self) -> Vec<Professor> {
        self.lock().records.clone()
    }

    async fn create(&self, draft: &ProfessorDraft) -> Option<Mutation<Professor>> {
        // Rejected drafts must not advance the id sequence.
        let Some(candidate) = Professor::from_draft(0, draft) else {
            debug!("event=professor_create module=repo status=rejected reason=missing_field");
            return None;
        };

        let mut collection = self.lock();
        let id = collection.next_id(Utc::now().timestamp_millis());
        let professor = Professor { id, ..candidate };
        collection.records.push(professor.clone());

        let persistence = self.save(&collection, "create");
        info!("event=professor_create module=repo status=ok id={id}");
        Some(Mutation {
            value: professor,
            persistence,
        })
    }

    async fn update(
        &self,
        id: ProfessorId,
        patch: &ProfessorDraft,
    ) -> Option<Mutation<Professor>> {
        let mut collection = self.lock();
        let Some(index) = collection.position(id) else {
            debug!("event=professor_update module=repo status=not_found id={id}");
            return None;
        };

        let merged = collection.records[index].merged(patch);
        collection.records[index] = merged.clone();

        let persistence = self.save(&collection, "update");
        info!("event=professor_update module=repo status=ok id={id}");
        Some(Mutation {
            value: merged,
            persistence,
        })
    }

    async fn destroy(&self, id: ProfessorId) -> Persistence {
        let mut collection = self.lock();
        let before = collection.records.len();
        collection.records.retain(|record| record.id != id);
        let removed = before - collection.records.len();

        let persistence = self.save(&collection, "destroy");
        info!("event=professor_destroy module=repo status=ok id={id} removed={removed}");
        persistence
    }
}

#[derive(Debug)]
enum SaveError {
    NonFinite(ProfessorId),
    Encode(serde_json::Error),
    Slot(SlotError),
}

impl SaveError {
    fn code(&self) -> &'static str {
        match self {
            Self::NonFinite(_) | Self::Encode(_) => "slot_encode_failed",
            Self::Slot(SlotError::QuotaExceeded { .. }) => "slot_quota_exceeded",
            Self::Slot(_) => "slot_write_failed",
        }
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinite(id) => write!(f, "salario of professor {id} is not a finite number"),
            Self::Encode(err) => write!(f, "failed to encode collection: {err}"),
            Self::Slot(err) => write!(f, "{err}"),
        }
    }
}

fn encode_collection(records: &[Professor]) -> Result<String, SaveError> {
    // serde_json writes non-finite floats as `null`, which would make the
    // whole slot unreadable on the next load.
    if let Some(record) = records.iter().find(|record| !record.salario.is_finite()) {
        return Err(SaveError::NonFinite(record.id));
    }
    serde_json::to_string(records).map_err(SaveError::Encode)
}

fn load_collection(slot: &impl KeyValueSlot, storage_key: &str) -> Collection {
    let raw = match slot.get(storage_key) {
        Ok(Some(raw)) if !raw.trim().is_empty() => raw,
        Ok(_) => {
            info!("event=slot_load module=repo status=empty key={storage_key}");
            return Collection::default();
        }
        Err(err) => {
            error!(
                "event=slot_load module=repo status=error key={storage_key} error_code=slot_read_failed error={err}"
            );
            return Collection::default();
        }
    };

    match serde_json::from_str::<Vec<Professor>>(&raw) {
        Ok(records) => {
            let (collection, duplicates) = Collection::from_records(records);
            if duplicates > 0 {
                warn!(
                    "event=slot_load module=repo status=degraded key={storage_key} duplicate_ids={duplicates}"
                );
            }
            info!(
                "event=slot_load module=repo status=ok key={storage_key} count={}",
                collection.records.len()
            );
            collection
        }
        Err(err) => {
            error!(
                "event=slot_load module=repo status=error key={storage_key} error_code=slot_parse_failed error={err}"
            );
            Collection::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Collection, SaveError};
    use crate::model::professor::Professor;

    fn professor(id: i64, nome: &str) -> Professor {
        Professor {
            id,
            nome: nome.to_string(),
            email: "p@x.com".to_string(),
            telefone: "1234567890".to_string(),
            data_admissao: "2020-01-01".to_string(),
            salario: 1000.0,
        }
    }

    #[test]
    fn next_id_follows_clock_when_it_advances() {
        let mut collection = Collection::default();
        assert_eq!(collection.next_id(1_000), 1_000);
        assert_eq!(collection.next_id(2_000), 2_000);
    }

    #[test]
    fn next_id_is_monotonic_within_one_clock_tick() {
        let mut collection = Collection::default();
        assert_eq!(collection.next_id(1_000), 1_000);
        assert_eq!(collection.next_id(1_000), 1_001);
        assert_eq!(collection.next_id(999), 1_002);
    }

    #[test]
    fn duplicate_ids_keep_first_position_and_last_value() {
        let (collection, duplicates) = Collection::from_records(vec![
            professor(1, "first"),
            professor(2, "other"),
            professor(1, "second"),
        ]);

        assert_eq!(duplicates, 1);
        assert_eq!(collection.records.len(), 2);
        assert_eq!(collection.records[0].nome, "second");
        assert_eq!(collection.last_id, 2);
    }

    #[test]
    fn encode_rejects_non_finite_salary() {
        let mut record = professor(5, "inf");
        record.salario = f64::INFINITY;
        let err = super::encode_collection(&[record]).unwrap_err();
        assert!(matches!(err, SaveError::NonFinite(5)));
    }
}
