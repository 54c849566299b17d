use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use gtf_gene_db::annotation::{AttributeKeys, ConvertOptions, MinusStrandPolicy};
use gtf_gene_db::pipeline::{self, GenerateConfig};
use gtf_gene_db::store::GeneStore;

/// Build gene record stores from GTF + FASTA and export them as FASTA.
#[derive(Parser, Debug)]
#[command(name = "gtf_gene_db")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build both stores (protein-coding and unrestricted) and write all four FASTA files
    Generate(GenerateArgs),

    /// Rebuild one gene store from an annotation
    Convert(ConvertArgs),

    /// Export transcript and gene FASTA from an existing store
    Export(ExportArgs),

    /// Load a store and print summary stats
    Stats(StatsArgs),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum MinusStrand {
    /// Reverse exon order only (bases as on the + strand)
    ReverseOrder,
    /// Reverse exon order and reverse-complement the bases
    ReverseComplement,
}

impl From<MinusStrand> for MinusStrandPolicy {
    fn from(m: MinusStrand) -> Self {
        match m {
            MinusStrand::ReverseOrder => MinusStrandPolicy::ReverseOrderOnly,
            MinusStrand::ReverseComplement => MinusStrandPolicy::ReverseComplement,
        }
    }
}

#[derive(Args, Debug)]
struct BuildOpts {
    /// How to assemble sequence of genes not on the + strand
    #[arg(long, value_enum, default_value_t = MinusStrand::ReverseOrder)]
    minus_strand: MinusStrand,

    /// Feature type that counts as an exon row
    #[arg(long, value_name = "TYPE", default_value = "exon")]
    exon_feature: String,

    /// Attribute key for gene id
    #[arg(long, value_name = "KEY", default_value = "gene_id")]
    gene_id_key: String,

    /// Attribute key for gene name
    #[arg(long, value_name = "KEY", default_value = "gene_name")]
    gene_name_key: String,

    /// Attribute key for transcript id
    #[arg(long, value_name = "KEY", default_value = "transcript_id")]
    transcript_id_key: String,

    /// Attribute key for transcript name
    #[arg(long, value_name = "KEY", default_value = "transcript_name")]
    transcript_name_key: String,

    /// Attribute key for the gene biotype
    #[arg(long, value_name = "KEY", default_value = "gene_biotype")]
    biotype_key: String,
}

impl BuildOpts {
    fn to_options(&self) -> ConvertOptions {
        ConvertOptions::new()
            .exon_feature(&self.exon_feature)
            .minus_strand(self.minus_strand.into())
            .keys(AttributeKeys {
                gene_id: self.gene_id_key.clone(),
                gene_name: self.gene_name_key.clone(),
                transcript_id: self.transcript_id_key.clone(),
                transcript_name: self.transcript_name_key.clone(),
                biotype: self.biotype_key.clone(),
            })
    }
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Output directory for the FASTA files
    #[arg(long, short)]
    root: PathBuf,

    /// Full annotation (.gtf / .gtf.gz)
    #[arg(long, short)]
    annotation: PathBuf,

    /// Protein-coding annotation (.gtf / .gtf.gz)
    #[arg(long, short = 'p')]
    annotation_protein_coding: PathBuf,

    /// Genome FASTA (.fa / .fa.gz)
    #[arg(long, short)]
    fasta: PathBuf,

    /// Cache the FASTA index (or the parsed FASTA, when gzipped) in this directory
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    #[command(flatten)]
    build: BuildOpts,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Input annotation (.gtf / .gtf.gz)
    #[arg(long, short)]
    annotation: PathBuf,

    /// Genome FASTA (.fa / .fa.gz)
    #[arg(long, short)]
    fasta: PathBuf,

    /// Store directory (wiped and rebuilt)
    #[arg(long, short)]
    store: PathBuf,

    /// Keep only protein_coding rows
    #[arg(long)]
    protein_coding_only: bool,

    #[command(flatten)]
    build: BuildOpts,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Store directory
    #[arg(long, short)]
    store: PathBuf,

    /// Transcript FASTA output
    #[arg(long, short)]
    transcripts: PathBuf,

    /// Gene FASTA output
    #[arg(long, short)]
    genes: PathBuf,
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// Store directory
    #[arg(long, short)]
    store: PathBuf,
}

fn main() -> Result<()> {
    pretty_env_logger::formatted_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Generate(args) => {
            let mut config = GenerateConfig::new(
                &args.root,
                &args.annotation,
                &args.annotation_protein_coding,
                &args.fasta,
            )
            .options(args.build.to_options());
            if let Some(dir) = &args.cache_dir {
                config = config.cache_dir(dir);
            }

            let files = pipeline::generate(&config)
                .with_context(|| format!("generating FASTA files in {}", args.root.display()))?;

            println!("{}", files.transcript_fasta.display());
            println!("{}", files.gene_fasta.display());
            println!("{}", files.transcript_fasta_protein_coding.display());
            println!("{}", files.gene_fasta_protein_coding.display());
        }

        Command::Convert(args) => {
            let resolver = pipeline::open_sequences(&args.fasta, None)
                .with_context(|| format!("loading {}", args.fasta.display()))?;
            let options = args.build.to_options().protein_coding_only(args.protein_coding_only);

            let report = pipeline::convert(&args.annotation, &resolver, &args.store, options)
                .with_context(|| format!("converting {}", args.annotation.display()))?;

            println!("{report}");
            eprintln!("Store written to {}", args.store.display());
        }

        Command::Export(args) => {
            let (tx, genes) = pipeline::export_store(&args.store, &args.transcripts, &args.genes)
                .with_context(|| format!("exporting {}", args.store.display()))?;
            eprintln!(
                "{} transcripts -> {}, {} genes -> {}",
                tx.records,
                args.transcripts.display(),
                genes.genes,
                args.genes.display()
            );
        }

        Command::Stats(args) => {
            let store = GeneStore::open(&args.store)
                .with_context(|| format!("reading store {}", args.store.display()))?;
            println!("{}", store.summary()?);
        }
    }

    Ok(())
}
