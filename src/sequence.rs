//! Contig sequence lookup.
//!
//! Annotation contig names are matched against the first whitespace-delimited
//! token of each FASTA header, so `>1 dna:chromosome chromosome:GRCm38:1:1:195471971:1 REF`
//! is found under `1`.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use noodles::fasta;
use serde::{Deserialize, Serialize};

use crate::types::ExonSpan;

/// A named set of contigs with 0-based random-access slicing.
pub trait SequenceSource {
    /// Full header keys of every contig.
    fn keys(&self) -> Vec<String>;

    /// 0-based half-open slice `[start, end)` of contig `key`.
    ///
    /// Returns `None` if `key` is unknown. A range running past the contig end
    /// is clamped.
    fn slice(&self, key: &str, start: usize, end: usize) -> Option<Vec<u8>>;

    /// Length of contig `key`.
    fn contig_len(&self, key: &str) -> Option<usize>;
}

/// In-memory FASTA sequences keyed by full header (name + description).
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastaSequences {
    seqs: HashMap<String, Vec<u8>>,
}

impl FastaSequences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, header: impl Into<String>, seq: impl Into<Vec<u8>>) {
        self.seqs.insert(header.into(), seq.into());
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    /// Load every record from a FASTA reader.
    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut reader = fasta::io::Reader::new(reader);
        let mut out = Self::new();

        for result in reader.records() {
            let record = result?;
            let mut header = String::from_utf8_lossy(record.name()).to_string();
            if let Some(desc) = record.description() {
                header.push(' ');
                header.push_str(&String::from_utf8_lossy(desc));
            }
            debug!("loaded contig '{}' ({} bp)", header, record.sequence().len());
            out.insert(header, record.sequence().as_ref().to_vec());
        }

        Ok(out)
    }

    /// Load a FASTA file; `.gz` paths are gunzipped on the fly.
    pub fn from_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let is_gz = path.extension().map(|e| e == "gz").unwrap_or(false);

        let seqs = if is_gz {
            Self::from_reader(BufReader::new(flate2::read::GzDecoder::new(file)))?
        } else {
            Self::from_reader(BufReader::new(file))?
        };

        info!("read {} contigs from {}", seqs.len(), path.display());
        Ok(seqs)
    }
}

impl SequenceSource for FastaSequences {
    fn keys(&self) -> Vec<String> {
        self.seqs.keys().cloned().collect()
    }

    fn slice(&self, key: &str, start: usize, end: usize) -> Option<Vec<u8>> {
        let seq = self.seqs.get(key)?;
        let end = end.min(seq.len());
        let start = start.min(end);
        Some(seq[start..end].to_vec())
    }

    fn contig_len(&self, key: &str) -> Option<usize> {
        self.seqs.get(key).map(Vec::len)
    }
}

/// One `.fai` line: where a contig's bases live in an uncompressed FASTA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContigIndex {
    pub name: String,
    pub length: u64,
    /// Byte offset of the first base.
    pub offset: u64,
    pub line_bases: u64,
    /// Bytes per line including the line terminator.
    pub line_width: u64,
}

impl From<fasta::fai::Record> for ContigIndex {
    fn from(r: fasta::fai::Record) -> Self {
        Self {
            name: String::from_utf8_lossy(r.name()).to_string(),
            length: r.length(),
            offset: r.offset(),
            line_bases: r.line_bases(),
            line_width: r.line_width(),
        }
    }
}

impl ContigIndex {
    /// File position of 0-based base `pos`.
    fn byte_offset(&self, pos: u64) -> u64 {
        self.offset + (pos / self.line_bases) * self.line_width + pos % self.line_bases
    }
}

/// Random-access FASTA: only the `.fai` index is held in memory, exon slices
/// are read from disk on demand.
///
/// Keys are the contig names of the index (first header token).
#[derive(Debug)]
pub struct IndexedFasta {
    path: PathBuf,
    file: File,
    contigs: HashMap<String, ContigIndex>,
}

impl IndexedFasta {
    /// `<path>.fai`
    pub fn fai_path(path: &Path) -> PathBuf {
        let mut p = OsString::from(path.as_os_str());
        p.push(".fai");
        PathBuf::from(p)
    }

    /// Read `<path>.fai` if present, otherwise scan the FASTA to build the index.
    pub fn index_for(path: &Path) -> io::Result<Vec<ContigIndex>> {
        let fai = Self::fai_path(path);
        let records: Vec<fasta::fai::Record> = if fai.exists() {
            debug!("reading index {}", fai.display());
            fasta::fai::io::Reader::new(BufReader::new(File::open(&fai)?))
                .read_index()?
                .into()
        } else {
            debug!("no {}, indexing {}", fai.display(), path.display());
            let mut indexer = fasta::io::Indexer::new(BufReader::new(File::open(path)?));
            let mut records = Vec::new();
            while let Some(record) = indexer.index_record()? {
                records.push(record);
            }
            records
        };
        Ok(records.into_iter().map(ContigIndex::from).collect())
    }

    pub fn open(path: impl AsRef<Path>, index: Vec<ContigIndex>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let contigs: HashMap<_, _> = index.into_iter().map(|c| (c.name.clone(), c)).collect();
        info!("indexed {} contigs in {}", contigs.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            file,
            contigs,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let index = Self::index_for(path)?;
        Self::open(path, index)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_range(&self, contig: &ContigIndex, start: u64, end: u64) -> io::Result<Vec<u8>> {
        let from = contig.byte_offset(start);
        let to = contig.byte_offset(end - 1) + 1;

        let mut raw = vec![0u8; (to - from) as usize];
        let mut f = &self.file;
        f.seek(SeekFrom::Start(from))?;
        f.read_exact(&mut raw)?;

        raw.retain(|b| *b != b'\n' && *b != b'\r');
        Ok(raw)
    }
}

impl SequenceSource for IndexedFasta {
    fn keys(&self) -> Vec<String> {
        self.contigs.keys().cloned().collect()
    }

    fn slice(&self, key: &str, start: usize, end: usize) -> Option<Vec<u8>> {
        let contig = self.contigs.get(key)?;
        let end = (end as u64).min(contig.length);
        let start = (start as u64).min(end);
        if start == end {
            return Some(Vec::new());
        }
        match self.read_range(contig, start, end) {
            Ok(seq) => Some(seq),
            Err(e) => {
                warn!("reading {key}:{start}-{end} from {}: {e}", self.path.display());
                Some(Vec::new())
            }
        }
    }

    fn contig_len(&self, key: &str) -> Option<usize> {
        self.contigs.get(key).map(|c| c.length as usize)
    }
}

/// Resolves annotation contig names + exon coordinates to sequence.
pub struct SequenceResolver {
    source: Box<dyn SequenceSource>,
    /// first header token -> full header key
    lookup: HashMap<String, String>,
    origin: String,
}

impl SequenceResolver {
    /// `origin` names the source in warnings (usually the FASTA path).
    pub fn new(source: impl SequenceSource + 'static, origin: impl Into<String>) -> Self {
        let mut lookup = HashMap::new();
        for key in source.keys() {
            lookup.insert(header_token(&key).to_string(), key);
        }
        Self {
            source: Box::new(source),
            lookup,
            origin: origin.into(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// True when `contig` matches the first token of some header.
    pub fn contains(&self, contig: &str) -> bool {
        self.lookup.contains_key(header_token(contig))
    }

    pub fn contig_len(&self, contig: &str) -> Option<usize> {
        let key = self.lookup.get(header_token(contig))?;
        self.source.contig_len(key)
    }

    /// Sequence of an exon span: the 0-based slice `[start - 1, end - 1)`.
    ///
    /// `None` means the contig is not in the source.
    pub fn resolve(&self, contig: &str, span: ExonSpan) -> Option<Vec<u8>> {
        let key = self.lookup.get(header_token(contig))?;
        let (s, e) = span.zero_based();
        self.source.slice(key, s as usize, e as usize)
    }
}

fn header_token(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or("")
}
