use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::info;

use crate::annotation::{AnnotationReader, AnnotationRecord, BuildReport, ConvertOptions, GeneModelBuilder, ParseError};
use crate::cache::ReadThroughCache;
use crate::error::ConvertError;
use crate::export::{export_gene_fasta, export_transcript_fasta, ExportStats};
use crate::model::Gene;
use crate::sequence::{FastaSequences, IndexedFasta, SequenceResolver};
use crate::store::{GeneStore, KeyValueStore, RecordStore};

/// Bump when the cached representation of a parsed FASTA changes.
const FASTA_CACHE_VERSION: u32 = 1;
/// Bump when the cached contig index layout changes.
const FAI_CACHE_VERSION: u32 = 1;

pub const TRANSCRIPT_FASTA: &str = "transcripts.fa";
pub const GENE_FASTA: &str = "genes.fa";
pub const TRANSCRIPT_FASTA_PC: &str = "transcripts.protein_coding.fa";
pub const GENE_FASTA_PC: &str = "genes.protein_coding.fa";

/// Open an annotation file; `.gz` paths are gunzipped on the fly.
pub fn open_annotation(path: &Path) -> Result<Box<dyn BufRead>, ConvertError> {
    let file = File::open(path).map_err(|e| ConvertError::input(path, e))?;
    let is_gz = path.extension().map(|e| e == "gz").unwrap_or(false);

    if is_gz {
        Ok(Box::new(BufReader::new(flate2::read::GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Run the builder over `records`, putting every finished gene into `store`.
pub fn build_into<I, S>(
    records: I,
    resolver: &SequenceResolver,
    store: &mut RecordStore<S, Gene>,
    options: ConvertOptions,
) -> Result<BuildReport, ConvertError>
where
    I: IntoIterator<Item = Result<AnnotationRecord, ParseError>>,
    S: KeyValueStore,
{
    GeneModelBuilder::new(resolver, options).run(records, |gene| {
        store.put_gene(&gene)?;
        Ok::<(), ConvertError>(())
    })
}

/// Convert GTF text from `reader` into `store`.
pub fn convert_reader<R: BufRead, S: KeyValueStore>(
    reader: R,
    resolver: &SequenceResolver,
    store: &mut RecordStore<S, Gene>,
    options: ConvertOptions,
) -> Result<BuildReport, ConvertError> {
    build_into(AnnotationReader::new(reader).records(), resolver, store, options)
}

/// Rebuild the store at `store_path` from the annotation at `annotation`.
///
/// The store is wiped first. A format error aborts the run; genes written
/// before the offending row remain in the store.
pub fn convert(
    annotation: &Path,
    resolver: &SequenceResolver,
    store_path: &Path,
    options: ConvertOptions,
) -> Result<BuildReport, ConvertError> {
    info!(
        "converting {} into {} (protein_coding_only={})",
        annotation.display(),
        store_path.display(),
        options.protein_coding_only
    );

    let reader = open_annotation(annotation)?;
    let mut store = GeneStore::rebuild(store_path)?;
    let records = AnnotationReader::new(reader)
        .with_origin(annotation.display().to_string())
        .records();
    let report = build_into(records, resolver, &mut store, options)?;

    info!(
        "{}: {} genes stored ({} strand conflicts, {} without sequence)",
        store_path.display(),
        report.genes,
        report.strand_conflicts(),
        report.genes_without_sequence()
    );
    Ok(report)
}

/// Load a FASTA file, through `cache` if given.
pub fn load_sequences(fasta: &Path, cache: Option<&ReadThroughCache>) -> Result<FastaSequences, ConvertError> {
    let load = || FastaSequences::from_path(fasta).map_err(|e| ConvertError::input(fasta, e));
    match cache {
        Some(cache) => cache.get_or_compute("fasta", FASTA_CACHE_VERSION, &fasta.display().to_string(), load),
        None => load(),
    }
}

/// Sequence resolver for `fasta`.
///
/// Plain FASTA is read through its `.fai` index (built by scanning the file
/// when no index exists; the scan result goes through `cache`). Gzipped FASTA
/// cannot be sought into and is loaded whole via [`load_sequences`].
pub fn open_sequences(fasta: &Path, cache: Option<&ReadThroughCache>) -> Result<SequenceResolver, ConvertError> {
    let origin = fasta.display().to_string();
    if fasta.extension().map(|e| e == "gz").unwrap_or(false) {
        let seqs = load_sequences(fasta, cache)?;
        return Ok(SequenceResolver::new(seqs, origin));
    }

    let index_for = || IndexedFasta::index_for(fasta).map_err(|e| ConvertError::input(fasta, e));
    let index = match cache {
        Some(cache) => cache.get_or_compute("fai", FAI_CACHE_VERSION, &origin, index_for)?,
        None => index_for()?,
    };
    let indexed = IndexedFasta::open(fasta, index).map_err(|e| ConvertError::input(fasta, e))?;
    Ok(SequenceResolver::new(indexed, origin))
}

/// Export both FASTA views of the store at `store_path`.
pub fn export_store(
    store_path: &Path,
    transcript_fasta: &Path,
    gene_fasta: &Path,
) -> Result<(ExportStats, ExportStats), ConvertError> {
    let store = GeneStore::open(store_path)?;
    let tx = export_transcript_fasta(&store, transcript_fasta)?;
    let genes = export_gene_fasta(&store, gene_fasta)?;
    Ok((tx, genes))
}

/// Store locations used by [`generate`] for a given annotation file:
/// `(unrestricted, protein_coding)`.
pub fn store_paths(annotation: &Path) -> (PathBuf, PathBuf) {
    let mut all = OsString::from(annotation.as_os_str());
    all.push(".genedb");
    let mut pc = all.clone();
    pc.push(".protein_coding");
    (PathBuf::from(all), PathBuf::from(pc))
}

/// Inputs of [`generate`].
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Directory receiving the four FASTA files.
    pub root: PathBuf,
    /// Full annotation.
    pub annotation: PathBuf,
    /// Annotation restricted to protein-coding rows.
    pub annotation_protein_coding: PathBuf,
    pub fasta: PathBuf,
    /// Memoize the FASTA index (or the parsed FASTA, when gzipped) here.
    pub cache_dir: Option<PathBuf>,
    /// Base options; `protein_coding_only` is set per run.
    pub options: ConvertOptions,
}

impl GenerateConfig {
    pub fn new(
        root: impl Into<PathBuf>,
        annotation: impl Into<PathBuf>,
        annotation_protein_coding: impl Into<PathBuf>,
        fasta: impl Into<PathBuf>,
    ) -> Self {
        Self {
            root: root.into(),
            annotation: annotation.into(),
            annotation_protein_coding: annotation_protein_coding.into(),
            fasta: fasta.into(),
            cache_dir: None,
            options: ConvertOptions::default(),
        }
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }
}

/// Paths written by [`generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub transcript_fasta: PathBuf,
    pub gene_fasta: PathBuf,
    pub transcript_fasta_protein_coding: PathBuf,
    pub gene_fasta_protein_coding: PathBuf,
}

/// Build the protein-coding and the unrestricted gene store and export
/// transcript and gene FASTA files for both.
///
/// Both stores are keyed off the full annotation path (see [`store_paths`]).
pub fn generate(config: &GenerateConfig) -> Result<GeneratedFiles, ConvertError> {
    fs::create_dir_all(&config.root).map_err(|e| ConvertError::input(&config.root, e))?;

    let cache = config.cache_dir.as_ref().map(ReadThroughCache::new);
    let resolver = open_sequences(&config.fasta, cache.as_ref())?;

    let out = GeneratedFiles {
        transcript_fasta: config.root.join(TRANSCRIPT_FASTA),
        gene_fasta: config.root.join(GENE_FASTA),
        transcript_fasta_protein_coding: config.root.join(TRANSCRIPT_FASTA_PC),
        gene_fasta_protein_coding: config.root.join(GENE_FASTA_PC),
    };
    let (store_all, store_pc) = store_paths(&config.annotation);

    convert(
        &config.annotation_protein_coding,
        &resolver,
        &store_pc,
        config.options.clone().protein_coding_only(true),
    )?;
    export_store(&store_pc, &out.transcript_fasta_protein_coding, &out.gene_fasta_protein_coding)?;

    convert(
        &config.annotation,
        &resolver,
        &store_all,
        config.options.clone().protein_coding_only(false),
    )?;
    export_store(&store_all, &out.transcript_fasta, &out.gene_fasta)?;

    Ok(out)
}
