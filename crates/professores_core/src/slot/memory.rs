//! Process-local slot, optionally bounded by a byte quota.

use super::{KeyValueSlot, SlotError, SlotResult};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// In-memory key-value slot.
///
/// With a quota, a write is rejected when the sum of key and value lengths
/// across all entries would exceed `limit_bytes`, the same accounting browser
/// storage applies.
#[derive(Debug, Default)]
pub struct MemorySlot {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(limit_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota_bytes: Some(limit_bytes),
        }
    }

    /// Total bytes currently accounted against the quota.
    pub fn used_bytes(&self) -> usize {
        self.lock()
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueSlot for MemorySlot {
    fn get(&self, key: &str) -> SlotResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> SlotResult<()> {
        let mut entries = self.lock();

        if let Some(limit_bytes) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(existing, _)| existing.as_str() != key)
                .map(|(existing, stored)| existing.len() + stored.len())
                .sum();
            let required_bytes = others + key.len() + value.len();
            if required_bytes > limit_bytes {
                return Err(SlotError::QuotaExceeded {
                    limit_bytes,
                    required_bytes,
                });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
