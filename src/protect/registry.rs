//! Concurrent registries shared by copy operations.

use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

const SHARD_COUNT: usize = 16;

/// ContainerId identifies one container instance by its address.
///
/// The identity is only meaningful while the container stays in place;
/// moving the container (or the value holding it) yields a new identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(usize);

impl ContainerId {
    /// Returns the identity of `container`.
    pub fn of<T: ?Sized>(container: &T) -> Self {
        ContainerId(container as *const T as *const () as usize)
    }
}

/// ShardedMap is a hash map split into independently locked shards, so
/// operations on unrelated keys rarely contend.
pub(crate) struct ShardedMap<K, V> {
    shards: Vec<RwLock<HashMap<K, V>>>,
    hasher: RandomState,
}

impl<K: Hash + Eq, V: Clone> ShardedMap<K, V> {
    /// Creates a new empty map.
    pub(crate) fn new() -> Self {
        ShardedMap {
            shards: (0..SHARD_COUNT).map(|_| RwLock::new(HashMap::new())).collect(),
            hasher: RandomState::new(),
        }
    }

    fn shard(&self, key: &K) -> &RwLock<HashMap<K, V>> {
        let index = self.hasher.hash_one(key) as usize % self.shards.len();
        &self.shards[index]
    }

    pub(crate) fn get(&self, key: &K) -> Option<V> {
        read(self.shard(key)).get(key).cloned()
    }

    pub(crate) fn contains_key(&self, key: &K) -> bool {
        read(self.shard(key)).contains_key(key)
    }

    pub(crate) fn insert(&self, key: K, value: V) -> Option<V> {
        write(self.shard(&key)).insert(key, value)
    }

    pub(crate) fn remove(&self, key: &K) -> Option<V> {
        write(self.shard(key)).remove(key)
    }

    /// Returns the value for `key`, inserting the result of `init` if absent.
    pub(crate) fn get_or_insert_with(&self, key: K, init: impl FnOnce() -> V) -> V {
        let shard = self.shard(&key);
        if let Some(value) = read(shard).get(&key) {
            return value.clone();
        }
        write(shard).entry(key).or_insert_with(init).clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.shards.iter().map(|shard| read(shard).len()).sum()
    }
}

// A panic while holding a shard lock cannot leave a HashMap half-updated,
// so poisoned locks are recovered.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
