//! Professor store: in-memory cache over an injected repository.
//!
//! # Invariants
//! - Internal locks are never held across a repository `.await`.
//! - Listeners run after the state lock is released and may read snapshots.
//! - `update` resolves the cached position before awaiting the repository.

use crate::model::professor::{Professor, ProfessorDraft, ProfessorId};
use crate::repo::{Mutation, Persistence, ProfessorRepository};
use log::{debug, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Handle returned by [`ProfessorStore::subscribe`].
pub type SubscriptionId = u64;

type Listener = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

/// Change notification emitted by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    LoadingChanged(bool),
    /// Cache replaced wholesale by `fetch_data`.
    Replaced { count: usize },
    Added(ProfessorId),
    Updated(ProfessorId),
    Removed(ProfessorId),
    /// A mutation was applied but the repository could not persist it.
    PersistenceFailed { reason: String },
}

#[derive(Debug, Default)]
struct StoreState {
    entities: Vec<Professor>,
    is_loading: bool,
}

/// Cache and mutation dispatcher consumed by UI layers.
pub struct ProfessorStore {
    repository: Arc<dyn ProfessorRepository>,
    state: Mutex<StoreState>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_subscription: AtomicU64,
}

impl ProfessorStore {
    /// Creates an empty store bound to `repository`.
    ///
    /// The cache starts empty; call [`Self::fetch_data`] to populate it.
    pub fn new(repository: Arc<dyn ProfessorRepository>) -> Self {
        Self {
            repository,
            state: Mutex::new(StoreState::default()),
            listeners: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// Returns a snapshot of the cached entities.
    pub fn entities(&self) -> Vec<Professor> {
        self.lock_state().entities.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock_state().is_loading
    }

    /// Registers a change listener.
    pub fn subscribe(
        &self,
        listener: impl Fn(&StoreEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.lock_listeners().push((id, Arc::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` when `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.lock_listeners();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Replaces the cache with the repository's full collection.
    ///
    /// Concurrent calls are not serialized; the last one to resolve wins.
    pub async fn fetch_data(&self) {
        self.set_loading(true);
        let entities = self.repository.get_all().await;
        let count = entities.len();
        self.lock_state().entities = entities;
        debug!("event=store_fetch module=store status=ok count={count}");
        self.emit(&StoreEvent::Replaced { count });
        self.set_loading(false);
    }

    /// Looks `id` up in the cache only; the repository is not consulted.
    pub fn find_one(&self, id: ProfessorId) -> Option<Professor> {
        self.set_loading(true);
        let found = self
            .lock_state()
            .entities
            .iter()
            .find(|professor| professor.id == id)
            .cloned();
        self.set_loading(false);
        found
    }

    /// Creates a record and appends it to the cache on success.
    pub async fn add(&self, draft: &ProfessorDraft) -> Option<Mutation<Professor>> {
        let mutation = self.repository.create(draft).await?;
        self.lock_state().entities.push(mutation.value.clone());
        self.emit(&StoreEvent::Added(mutation.value.id));
        self.report_persistence(&mutation.persistence);
        Some(mutation)
    }

    /// Updates a record and replaces its cache entry on success.
    ///
    /// Returns `None`, leaving the cache untouched, when the repository rejects
    /// the update or when `id` was not cached at call time.
    pub async fn update(
        &self,
        id: ProfessorId,
        patch: &ProfessorDraft,
    ) -> Option<Mutation<Professor>> {
        let cached_index = self.position(id);
        let outcome = self.repository.update(id, patch).await;

        let (Some(index), Some(mutation)) = (cached_index, outcome) else {
            debug!("event=store_update module=store status=skipped id={id}");
            return None;
        };

        let replaced = {
            let mut state = self.lock_state();
            // The entity may have moved or vanished while the update was in flight.
            let index = match state.entities.get(index) {
                Some(professor) if professor.id == id => Some(index),
                _ => state.entities.iter().position(|professor| professor.id == id),
            };
            match index {
                Some(index) => {
                    state.entities[index] = mutation.value.clone();
                    true
                }
                None => false,
            }
        };

        if replaced {
            self.emit(&StoreEvent::Updated(id));
        } else {
            warn!("event=store_update module=store status=stale id={id}");
        }
        self.report_persistence(&mutation.persistence);
        Some(mutation)
    }

    /// Deletes a record and drops it from the cache unconditionally.
    pub async fn destroy(&self, id: ProfessorId) -> Persistence {
        let persistence = self.repository.destroy(id).await;

        let removed = {
            let mut state = self.lock_state();
            let before = state.entities.len();
            state.entities.retain(|professor| professor.id != id);
            state.entities.len() != before
        };

        if removed {
            self.emit(&StoreEvent::Removed(id));
        }
        self.report_persistence(&persistence);
        persistence
    }

    fn position(&self, id: ProfessorId) -> Option<usize> {
        self.lock_state()
            .entities
            .iter()
            .position(|professor| professor.id == id)
    }

    fn set_loading(&self, is_loading: bool) {
        self.lock_state().is_loading = is_loading;
        self.emit(&StoreEvent::LoadingChanged(is_loading));
    }

    fn report_persistence(&self, persistence: &Persistence) {
        if let Persistence::Failed { reason } = persistence {
            self.emit(&StoreEvent::PersistenceFailed {
                reason: reason.clone(),
            });
        }
    }

    fn emit(&self, event: &StoreEvent) {
        let listeners: Vec<Listener> = self
            .lock_listeners()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Listener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
