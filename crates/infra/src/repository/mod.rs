//! Keyed record storage boundary.
//!
//! Lifecycle decisions run through [`Repository::transition`], which reads the
//! current record and writes the decided mutation as one atomic step. Two
//! concurrent transitions on the same record are serialized; the second one
//! sees the first one's result.

pub mod in_memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use fellowship_core::DomainError;

pub use in_memory::InMemoryRepository;

/// What a lifecycle decision asks storage to do with the current record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation<V> {
    Replace(V),
    Remove,
    Unchanged,
}

/// Result of a committed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Committed<V> {
    Replaced(V),
    /// Carries the record as it was before removal.
    Removed(V),
    Unchanged(V),
}

impl<V> Committed<V> {
    pub fn value(&self) -> &V {
        match self {
            Committed::Replaced(v) | Committed::Removed(v) | Committed::Unchanged(v) => v,
        }
    }

    pub fn into_value(self) -> V {
        match self {
            Committed::Replaced(v) | Committed::Removed(v) | Committed::Unchanged(v) => v,
        }
    }

    pub fn is_removed(&self) -> bool {
        matches!(self, Committed::Removed(_))
    }
}

/// Decision evaluated against the current record under the write lock.
pub type Decide<V> = Box<dyn FnOnce(&V) -> Result<Mutation<V>, DomainError> + Send>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Duplicate key or unique-index collision.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("record not found")]
    NotFound,

    /// The decision passed to `transition` rejected the change.
    #[error(transparent)]
    Rejected(#[from] DomainError),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Repository<K, V>: Send + Sync
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> StoreResult<Option<V>>;

    async fn list(&self) -> StoreResult<Vec<V>>;

    /// Fails with `Conflict` if the key or any unique value already exists.
    async fn insert(&self, key: K, value: V) -> StoreResult<()>;

    /// Insert or overwrite; unique values must not collide with other records.
    async fn upsert(&self, key: K, value: V) -> StoreResult<()>;

    /// Returns the removed record, if there was one.
    async fn remove(&self, key: &K) -> StoreResult<Option<V>>;

    /// Run `decide` against the current record and apply its mutation atomically.
    async fn transition(&self, key: &K, decide: Decide<V>) -> StoreResult<Committed<V>>;
}

#[async_trait]
impl<K, V, S> Repository<K, V> for Arc<S>
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
    S: Repository<K, V> + ?Sized,
{
    async fn get(&self, key: &K) -> StoreResult<Option<V>> {
        (**self).get(key).await
    }

    async fn list(&self) -> StoreResult<Vec<V>> {
        (**self).list().await
    }

    async fn insert(&self, key: K, value: V) -> StoreResult<()> {
        (**self).insert(key, value).await
    }

    async fn upsert(&self, key: K, value: V) -> StoreResult<()> {
        (**self).upsert(key, value).await
    }

    async fn remove(&self, key: &K) -> StoreResult<Option<V>> {
        (**self).remove(key).await
    }

    async fn transition(&self, key: &K, decide: Decide<V>) -> StoreResult<Committed<V>> {
        (**self).transition(key, decide).await
    }
}
