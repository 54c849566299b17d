use std::collections::BTreeMap;

use crate::store::codec::StoreError;

pub type KvIter<'a> = Box<dyn Iterator<Item = Result<(String, Vec<u8>), StoreError>> + 'a>;

/// Ordered string -> bytes store.
///
/// Iteration yields keys in byte order. Each call to [`KeyValueStore::iter`]
/// starts a fresh pass.
pub trait KeyValueStore {
    /// Store `value` under `key`, replacing any previous value. Must be
    /// durable when it returns.
    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn iter(&self) -> KvIter<'_>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Volatile store backed by a `BTreeMap`.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    map: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.map.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.map.get(key).cloned())
    }

    fn iter(&self) -> KvIter<'_> {
        Box::new(self.map.iter().map(|(k, v)| Ok((k.clone(), v.clone()))))
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}
