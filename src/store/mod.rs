//! Persistence of gene records.
//!
//! [`RecordStore`] puts typed, bincode-encoded records on top of any
//! [`KeyValueStore`]. The on-disk backend is [`LogStore`]; [`MemoryStore`]
//! serves tests and in-process use. [`records`] holds the plain record-file
//! helpers for dumps that do not need keyed access.

pub mod codec;
pub mod kv;
pub mod log_store;
pub mod records;

use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::model::Gene;

pub use self::codec::StoreError;
pub use self::kv::{KeyValueStore, MemoryStore};
pub use self::log_store::LogStore;

/// Typed view over a key-value store.
pub struct RecordStore<S, T> {
    kv: S,
    _record: PhantomData<fn() -> T>,
}

/// The store produced by a conversion: gene id -> [`Gene`].
pub type GeneStore = RecordStore<LogStore, Gene>;

impl<T> RecordStore<LogStore, T> {
    /// Destroy anything at `path` and start an empty store.
    pub fn rebuild(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self::new(LogStore::rebuild(path)?))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self::new(LogStore::open(path)?))
    }
}

impl<S: KeyValueStore, T> RecordStore<S, T> {
    pub fn new(kv: S) -> Self {
        Self {
            kv,
            _record: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.kv.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kv.is_empty()
    }

    /// Raw encoded bytes stored under `key`.
    pub fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.kv.get(key)
    }
}

impl<S: KeyValueStore, T: Serialize + DeserializeOwned> RecordStore<S, T> {
    pub fn put(&mut self, key: &str, record: &T) -> Result<(), StoreError> {
        let bytes = codec::encode(record)?;
        self.kv.put(key, &bytes)
    }

    pub fn get(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.kv.get(key)? {
            Some(bytes) => Ok(Some(codec::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Lazy pass over all records in key order.
    pub fn iter(&self) -> impl Iterator<Item = Result<(String, T), StoreError>> + '_ {
        self.kv
            .iter()
            .map(|entry| entry.and_then(|(k, v)| Ok((k, codec::decode(&v)?))))
    }
}

impl<S: KeyValueStore> RecordStore<S, Gene> {
    pub fn put_gene(&mut self, gene: &Gene) -> Result<(), StoreError> {
        self.put(&gene.id, gene)
    }

    pub fn genes(&self) -> impl Iterator<Item = Result<Gene, StoreError>> + '_ {
        self.iter().map(|r| r.map(|(_, g)| g))
    }

    pub fn summary(&self) -> Result<StoreSummary, StoreError> {
        let mut s = StoreSummary::default();
        for gene in self.genes() {
            let gene = gene?;
            s.genes += 1;
            if gene.has_seq {
                s.genes_with_sequence += 1;
            }
            s.transcripts += gene.transcripts.len();
            s.exons += gene.exon_count();
        }
        Ok(s)
    }
}

/// Record counts of a gene store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreSummary {
    pub genes: usize,
    pub genes_with_sequence: usize,
    pub transcripts: usize,
    pub exons: usize,
}

impl fmt::Display for StoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "GeneStore")?;
        writeln!(f, "  genes                 : {}", self.genes)?;
        writeln!(f, "  genes with sequence   : {}", self.genes_with_sequence)?;
        writeln!(f, "  transcripts           : {}", self.transcripts)?;
        write!(f, "  exons                 : {}", self.exons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Strand;

    fn gene(id: &str, has_seq: bool) -> Gene {
        let mut g = Gene::new(id, id, "1", Strand::Plus);
        g.has_seq = has_seq;
        g.add_transcript("T1", "T1");
        g
    }

    #[test]
    fn typed_records_over_memory_store() {
        let mut store: RecordStore<MemoryStore, Gene> = RecordStore::new(MemoryStore::new());
        store.put_gene(&gene("G2", true)).unwrap();
        store.put_gene(&gene("G1", false)).unwrap();

        assert_eq!(store.get("G1").unwrap(), Some(gene("G1", false)));
        assert_eq!(store.get("missing").unwrap(), None);

        let ids: Vec<String> = store.genes().map(|g| g.unwrap().id).collect();
        assert_eq!(ids, vec!["G1", "G2"]);

        let s = store.summary().unwrap();
        assert_eq!(s.genes, 2);
        assert_eq!(s.genes_with_sequence, 1);
        assert_eq!(s.transcripts, 2);
        assert_eq!(s.exons, 0);
    }

    #[test]
    fn undecodable_value_is_an_error() {
        let mut kv = MemoryStore::new();
        kv.put("G1", &[1, 2, 3]).unwrap();
        let store: RecordStore<MemoryStore, Gene> = RecordStore::new(kv);
        assert!(matches!(store.get("G1"), Err(StoreError::Codec(_))));
    }

    #[test]
    fn gene_store_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genes.db");
        {
            let mut store = GeneStore::rebuild(&path).unwrap();
            store.put_gene(&gene("G1", true)).unwrap();
        }
        let store = GeneStore::open(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("G1").unwrap(), Some(gene("G1", true)));
    }
}
