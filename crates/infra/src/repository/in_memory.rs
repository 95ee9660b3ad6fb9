use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{Committed, Decide, Mutation, Repository, StoreError, StoreResult};

struct UniqueIndex<V> {
    name: &'static str,
    key: fn(&V) -> String,
}

/// In-memory repository for tests/dev.
///
/// Records are kept in key order. Unique indexes are checked by scanning, which
/// is fine at the sizes this is meant for.
pub struct InMemoryRepository<K, V> {
    records: RwLock<BTreeMap<K, V>>,
    unique: Vec<UniqueIndex<V>>,
}

impl<K, V> InMemoryRepository<K, V> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            unique: Vec::new(),
        }
    }

    /// Reject writes whose `key(value)` matches another record's.
    pub fn with_unique(mut self, name: &'static str, key: fn(&V) -> String) -> Self {
        self.unique.push(UniqueIndex { name, key });
        self
    }
}

impl<K, V> Default for InMemoryRepository<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> core::fmt::Debug for InMemoryRepository<K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let names: Vec<_> = self.unique.iter().map(|u| u.name).collect();
        f.debug_struct("InMemoryRepository").field("unique", &names).finish()
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

impl<K: Ord, V> InMemoryRepository<K, V> {
    /// Unique-index check against every record except `key` itself.
    fn check_unique(&self, records: &BTreeMap<K, V>, key: &K, value: &V) -> StoreResult<()> {
        for index in &self.unique {
            let wanted = (index.key)(value);
            let taken = records
                .iter()
                .any(|(other_key, other)| other_key != key && (index.key)(other) == wanted);
            if taken {
                return Err(StoreError::Conflict(format!("{} already in use", index.name)));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<K, V> Repository<K, V> for InMemoryRepository<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> StoreResult<Option<V>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.get(key).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<V>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.values().cloned().collect())
    }

    async fn insert(&self, key: K, value: V) -> StoreResult<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        if records.contains_key(&key) {
            return Err(StoreError::Conflict("record already exists".to_string()));
        }
        self.check_unique(&records, &key, &value)?;
        records.insert(key, value);
        Ok(())
    }

    async fn upsert(&self, key: K, value: V) -> StoreResult<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        self.check_unique(&records, &key, &value)?;
        records.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: &K) -> StoreResult<Option<V>> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        Ok(records.remove(key))
    }

    async fn transition(&self, key: &K, decide: Decide<V>) -> StoreResult<Committed<V>> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        let current = records.get(key).ok_or(StoreError::NotFound)?;
        let mutation = decide(current)?;

        match mutation {
            Mutation::Replace(next) => {
                self.check_unique(&records, key, &next)?;
                records.insert(key.clone(), next.clone());
                Ok(Committed::Replaced(next))
            }
            Mutation::Remove => {
                let removed = records.remove(key).ok_or(StoreError::NotFound)?;
                Ok(Committed::Removed(removed))
            }
            Mutation::Unchanged => records
                .get(key)
                .cloned()
                .map(Committed::Unchanged)
                .ok_or(StoreError::NotFound),
        }
    }
}
