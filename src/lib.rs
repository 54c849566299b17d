//! gtf_gene_db
//!
//! Converts GTF exon annotations plus FASTA chromosome sequence into a
//! persistent, gene-id keyed store of gene -> transcript -> exon records,
//! and exports that store as transcript- and gene-level FASTA files.
//!
//! Coordinates follow the annotation: exon `start` is 1-based, `end` is
//! exclusive (GTF end + 1).

pub mod types;
pub mod model;
pub mod annotation;
pub mod sequence;
pub mod store;
pub mod export;
pub mod cache;
pub mod error;
pub mod pipeline;

pub use annotation::{ConvertOptions, Diagnostic, GeneModelBuilder, MinusStrandPolicy};
pub use error::ConvertError;
pub use model::{Exon, Gene, Transcript, Variant};
pub use pipeline::{convert, generate, GenerateConfig, GeneratedFiles};
pub use sequence::{ContigIndex, FastaSequences, IndexedFasta, SequenceResolver, SequenceSource};
pub use store::{GeneStore, KeyValueStore, LogStore, MemoryStore, RecordStore};
pub use types::{ExonSpan, Strand};
