//! FASTA views of a gene store.
//!
//! Only genes whose contig was found in the sequence source (`has_seq`) are
//! written; the others stay in the store but never reach these files.
//!
//! - transcript view: one `>transcript_id` record per transcript
//! - gene view: `>gene_id|tx1|tx2|...` followed by `seq1|seq2|...` on one line.
//!   This is not standard single-sequence FASTA; consumers split on `|`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, info};

use crate::model::Gene;
use crate::store::{KeyValueStore, RecordStore, StoreError};

const PROGRESS_EVERY: usize = 1000;

/// Counts of one export run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Genes with sequence that were written.
    pub genes: usize,
    /// Genes skipped because their sequence was unavailable.
    pub skipped: usize,
    /// FASTA records written.
    pub records: usize,
}

/// Genes of `store` that carry sequence, in key order.
fn genes_with_sequence<'a, S: KeyValueStore>(
    store: &'a RecordStore<S, Gene>,
    stats: &'a mut ExportStats,
) -> impl Iterator<Item = Result<Gene, StoreError>> + 'a {
    store
        .genes()
        .enumerate()
        .filter_map(move |(i, gene)| {
            if i % PROGRESS_EVERY == 0 {
                debug!("export: {i} genes visited");
            }
            match gene {
                Ok(g) if g.has_seq => Some(Ok(g)),
                Ok(_) => {
                    stats.skipped += 1;
                    None
                }
                Err(e) => Some(Err(e)),
            }
        })
}

/// Write one `>transcript_id` / sequence pair per transcript.
pub fn write_transcript_fasta<S: KeyValueStore, W: Write>(
    store: &RecordStore<S, Gene>,
    mut out: W,
) -> Result<ExportStats, StoreError> {
    let mut stats = ExportStats::default();
    let mut genes = 0;
    let mut records = 0;

    for gene in genes_with_sequence(store, &mut stats) {
        let gene = gene?;
        genes += 1;
        for tx in &gene.transcripts {
            out.write_all(b">")?;
            out.write_all(tx.id.as_bytes())?;
            out.write_all(b"\n")?;
            out.write_all(&tx.seq)?;
            out.write_all(b"\n")?;
            records += 1;
        }
    }
    out.flush()?;

    stats.genes = genes;
    stats.records = records;
    Ok(stats)
}

/// Write one `>gene_id|tx...` / `seq|seq...` pair per gene.
pub fn write_gene_fasta<S: KeyValueStore, W: Write>(
    store: &RecordStore<S, Gene>,
    mut out: W,
) -> Result<ExportStats, StoreError> {
    let mut stats = ExportStats::default();
    let mut genes = 0;

    for gene in genes_with_sequence(store, &mut stats) {
        let gene = gene?;
        genes += 1;

        out.write_all(b">")?;
        out.write_all(gene.id.as_bytes())?;
        for tx in &gene.transcripts {
            out.write_all(b"|")?;
            out.write_all(tx.id.as_bytes())?;
        }
        out.write_all(b"\n")?;

        for (i, tx) in gene.transcripts.iter().enumerate() {
            if i > 0 {
                out.write_all(b"|")?;
            }
            out.write_all(&tx.seq)?;
        }
        out.write_all(b"\n")?;
    }
    out.flush()?;

    stats.genes = genes;
    stats.records = genes;
    Ok(stats)
}

/// [`write_transcript_fasta`] into a new file at `path`.
pub fn export_transcript_fasta<S: KeyValueStore>(
    store: &RecordStore<S, Gene>,
    path: impl AsRef<Path>,
) -> Result<ExportStats, StoreError> {
    let path = path.as_ref();
    let stats = write_transcript_fasta(store, BufWriter::new(File::create(path)?))?;
    info!(
        "wrote {} transcripts of {} genes to {}",
        stats.records,
        stats.genes,
        path.display()
    );
    Ok(stats)
}

/// [`write_gene_fasta`] into a new file at `path`.
pub fn export_gene_fasta<S: KeyValueStore>(
    store: &RecordStore<S, Gene>,
    path: impl AsRef<Path>,
) -> Result<ExportStats, StoreError> {
    let path = path.as_ref();
    let stats = write_gene_fasta(store, BufWriter::new(File::create(path)?))?;
    info!("wrote {} genes to {}", stats.genes, path.display());
    Ok(stats)
}
