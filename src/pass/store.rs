//! Pass store contract and the in-process implementation.
//!
//! Writes are durable before a call returns, and `set_status` is a conditional
//! write: only `ACTIVE -> USED` is a legal transition, and of two concurrent
//! attempts on one token at most one succeeds.

use async_trait::async_trait;
use chrono::Utc;
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};
use tracing::debug;

use super::{
    error::StoreError,
    model::{Pass, PassStatus},
};

#[async_trait]
pub trait PassStore: Send + Sync {
    /// Looks up the pass issued to a registrant identifier (lower-cased).
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Pass>, StoreError>;

    /// Looks up a pass by its token; the comparison is exact.
    async fn find_by_token(&self, token: &str) -> Result<Option<Pass>, StoreError>;

    /// Persists a new pass; `AlreadyExists` if the token or identifier is taken.
    async fn create(&self, pass: &Pass) -> Result<(), StoreError>;

    /// Moves a pass to `status`, recording `actor` for the audit trail.
    ///
    /// Returns `NotFound` for unknown tokens and `Conflict` when the stored status
    /// does not allow the transition (in particular, a pass that is already `USED`).
    async fn set_status(&self, token: &str, status: PassStatus, actor: &str)
        -> Result<(), StoreError>;

    /// Checks the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Keeps passes in memory behind a mutex. Used for tests and single-process
/// deployments that do not need persistence across restarts.
#[derive(Debug, Default)]
pub struct MemoryPassStore {
    passes: Mutex<HashMap<String, Pass>>,
}

impl MemoryPassStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored passes.
    ///
    /// # Errors
    /// Returns `StoreError::Unavailable` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    /// # Errors
    /// Returns `StoreError::Unavailable` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Pass>>, StoreError> {
        self.passes
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl PassStore for MemoryPassStore {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Pass>, StoreError> {
        Ok(self
            .lock()?
            .values()
            .find(|pass| pass.identity().identifier == identifier)
            .cloned())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Pass>, StoreError> {
        Ok(self.lock()?.get(token).cloned())
    }

    async fn create(&self, pass: &Pass) -> Result<(), StoreError> {
        let mut passes = self.lock()?;
        let taken = passes.contains_key(pass.token())
            || passes
                .values()
                .any(|existing| existing.identity().identifier == pass.identity().identifier);
        if taken {
            return Err(StoreError::AlreadyExists);
        }
        passes.insert(pass.token().to_string(), pass.clone());
        debug!(token = pass.token(), "pass stored");
        Ok(())
    }

    async fn set_status(
        &self,
        token: &str,
        status: PassStatus,
        actor: &str,
    ) -> Result<(), StoreError> {
        let mut passes = self.lock()?;
        let pass = passes.get_mut(token).ok_or(StoreError::NotFound)?;
        match (pass.status(), status) {
            (PassStatus::Active, PassStatus::Used) => {
                pass.mark_used(actor, Utc::now());
                Ok(())
            }
            _ => Err(StoreError::Conflict),
        }
    }
}
