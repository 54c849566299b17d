use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::annotation::diagnostic::{Diagnostic, Severity};
use crate::annotation::io::{AnnotationRecord, AttributeKeys, ParseError};
use crate::model::{Exon, Gene};
use crate::sequence::SequenceResolver;
use crate::types::{ExonSpan, Strand};

pub const PROTEIN_CODING: &str = "protein_coding";

/// How exon sequence is assembled for genes that are not on the `+` strand.
///
/// In both cases the exons of such a gene are visited in reverse buffered order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MinusStrandPolicy {
    /// Reverse the exon order only; bases stay as read from the `+` strand.
    /// This is what existing stores were built with.
    #[default]
    ReverseOrderOnly,
    /// Reverse the exon order and reverse-complement each `-` strand exon.
    ReverseComplement,
}

impl MinusStrandPolicy {
    fn apply(self, strand: Strand, seq: Vec<u8>) -> Vec<u8> {
        match (self, strand) {
            (MinusStrandPolicy::ReverseComplement, Strand::Minus) => reverse_complement(&seq),
            _ => seq,
        }
    }
}

fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'a' => b't',
        b't' => b'a',
        b'c' => b'g',
        b'g' => b'c',
        other => other,
    }
}

fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|b| complement(*b)).collect()
}

/// Options for one conversion run.
///
/// ```
/// use gtf_gene_db::annotation::{ConvertOptions, MinusStrandPolicy};
///
/// let opts = ConvertOptions::new()
///     .protein_coding_only(true)
///     .minus_strand(MinusStrandPolicy::ReverseOrderOnly);
/// assert!(opts.protein_coding_only);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Keep only rows whose biotype is `protein_coding`.
    pub protein_coding_only: bool,
    /// Feature type that counts as an exon row (default: `exon`).
    pub exon_feature: String,
    pub minus_strand: MinusStrandPolicy,
    pub keys: AttributeKeys,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            protein_coding_only: false,
            exon_feature: "exon".into(),
            minus_strand: MinusStrandPolicy::default(),
            keys: AttributeKeys::default(),
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn protein_coding_only(mut self, on: bool) -> Self {
        self.protein_coding_only = on;
        self
    }

    pub fn exon_feature(mut self, feature: &str) -> Self {
        self.exon_feature = feature.to_string();
        self
    }

    pub fn minus_strand(mut self, policy: MinusStrandPolicy) -> Self {
        self.minus_strand = policy;
        self
    }

    pub fn keys(mut self, keys: AttributeKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Convenience: attribute key holding the gene id.
    pub fn gene_id_key(mut self, key: &str) -> Self {
        self.keys.gene_id = key.to_string();
        self
    }

    /// Convenience: attribute key holding the biotype.
    pub fn biotype_key(mut self, key: &str) -> Self {
        self.keys.biotype = key.to_string();
        self
    }
}

/// The gene being read: its record so far plus the exon coordinates
/// buffered per transcript id. Exons are only built in [`GeneModelBuilder::finalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneAccumulator {
    pub gene: Gene,
    pub last_transcript: String,
    pub exon_buffer: HashMap<String, Vec<ExonSpan>>,
}

impl GeneAccumulator {
    fn start(gene: Gene) -> Self {
        Self {
            gene,
            last_transcript: String::new(),
            exon_buffer: HashMap::new(),
        }
    }
}

/// Row-to-row state of a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BuilderState {
    /// No gene open yet.
    #[default]
    Empty,
    Accumulating(GeneAccumulator),
}

impl BuilderState {
    pub fn current_gene(&self) -> Option<&Gene> {
        match self {
            BuilderState::Empty => None,
            BuilderState::Accumulating(acc) => Some(&acc.gene),
        }
    }
}

/// Counters and diagnostics of one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub rows: usize,
    pub exon_rows: usize,
    pub skipped_biotype: usize,
    pub skipped_no_gene_id: usize,
    pub genes: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity() == Severity::Error)
    }

    pub fn strand_conflicts(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::StrandConflict { .. }))
            .count()
    }

    pub fn genes_without_sequence(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::MissingSequence { .. }))
            .count()
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BuildReport")?;
        writeln!(f, "  rows read             : {}", self.rows)?;
        writeln!(f, "  exon rows used        : {}", self.exon_rows)?;
        writeln!(f, "  skipped (biotype)     : {}", self.skipped_biotype)?;
        writeln!(f, "  skipped (no gene_id)  : {}", self.skipped_no_gene_id)?;
        writeln!(f, "  genes written         : {}", self.genes)?;
        writeln!(f, "  strand conflicts      : {}", self.strand_conflicts())?;
        write!(f, "  genes w/o sequence    : {}", self.genes_without_sequence())
    }
}

/// Streaming GTF -> [`Gene`] state machine.
///
/// Precondition: all rows of one gene are contiguous in the input (as in
/// Ensembl GTF releases). A gene id that reappears after another gene starts
/// a second, separate record with the same id; put into a store, the later
/// record replaces the earlier one.
///
/// The row state is an explicit [`BuilderState`] threaded through [`step`];
/// the builder itself only carries configuration, the sequence resolver and
/// the running [`BuildReport`].
///
/// [`step`]: GeneModelBuilder::step
pub struct GeneModelBuilder<'a> {
    resolver: &'a SequenceResolver,
    options: ConvertOptions,
    report: BuildReport,
}

impl<'a> GeneModelBuilder<'a> {
    pub fn new(resolver: &'a SequenceResolver, options: ConvertOptions) -> Self {
        Self {
            resolver,
            options,
            report: BuildReport::default(),
        }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn into_report(self) -> BuildReport {
        self.report
    }

    /// Consume one row. Returns the next state and the gene completed by this
    /// row, if the row opened a new gene.
    ///
    /// Coordinates are only checked on exon rows that pass the biotype and
    /// gene id filters; bad ones there are fatal.
    pub fn step(
        &mut self,
        state: BuilderState,
        rec: &AnnotationRecord,
    ) -> Result<(BuilderState, Option<Gene>), ParseError> {
        self.report.rows += 1;

        if !rec.is_feature(&self.options.exon_feature) {
            return Ok((state, None));
        }

        let attrs = rec.gene_attributes(&self.options.keys);

        if self.options.protein_coding_only && attrs.biotype.as_deref() != Some(PROTEIN_CODING) {
            self.report.skipped_biotype += 1;
            return Ok((state, None));
        }

        let Some(gene_id) = attrs.gene_id else {
            self.report.skipped_no_gene_id += 1;
            return Ok((state, None));
        };
        let span = rec
            .exon_span()
            .ok_or_else(|| ParseError::bad_coordinates(rec, &gene_id))?;
        self.report.exon_rows += 1;

        let (mut acc, completed) = match state {
            BuilderState::Accumulating(acc) if acc.gene.id == gene_id => (acc, None),
            previous => {
                let completed = self.finish(previous);
                let name = attrs.gene_name.unwrap_or_else(|| gene_id.clone());
                let gene = Gene::new(gene_id, name, rec.seqname.clone(), rec.strand);
                (GeneAccumulator::start(gene), completed)
            }
        };

        let tx_id = attrs.transcript_id.unwrap_or_default();
        if acc.gene.transcripts.is_empty() || acc.last_transcript != tx_id {
            let tx_name = attrs.transcript_name.unwrap_or_else(|| tx_id.clone());
            acc.gene.add_transcript(tx_id.clone(), tx_name);
            acc.last_transcript = tx_id.clone();
        }

        if rec.strand != acc.gene.strand {
            self.raise(Diagnostic::StrandConflict {
                gene_id: acc.gene.id.clone(),
                gene_name: acc.gene.name.clone(),
                recorded: acc.gene.strand,
                found: rec.strand,
            });
        }

        acc.exon_buffer.entry(tx_id).or_default().push(span);

        Ok((BuilderState::Accumulating(acc), completed))
    }

    /// End-of-gene transition: finalize whatever is open.
    /// Returns `None` for an empty state or a gene without id.
    pub fn finish(&mut self, state: BuilderState) -> Option<Gene> {
        match state {
            BuilderState::Empty => None,
            BuilderState::Accumulating(acc) => {
                let gene = self.finalize(acc);
                if gene.id.is_empty() {
                    return None;
                }
                self.report.genes += 1;
                Some(gene)
            }
        }
    }

    /// Build exons from the buffered coordinates and assemble sequences.
    pub fn finalize(&mut self, acc: GeneAccumulator) -> Gene {
        let GeneAccumulator {
            mut gene,
            exon_buffer,
            ..
        } = acc;
        let resolver = self.resolver;
        let policy = self.options.minus_strand;

        gene.has_seq = resolver.contains(&gene.seqname);
        if !gene.has_seq {
            self.raise(Diagnostic::MissingSequence {
                gene_id: gene.id.clone(),
                seqname: gene.seqname.clone(),
                origin: resolver.origin().to_string(),
            });
        }

        let mut truncated = Vec::new();
        for tx in gene.transcripts.iter_mut() {
            let spans = exon_buffer.get(&tx.id).cloned().unwrap_or_default();

            for span in order_spans(spans, gene.strand) {
                let seq = if gene.has_seq {
                    let seq = resolver.resolve(&gene.seqname, span).unwrap_or_default();
                    if (seq.len() as u64) < span.len() {
                        truncated.push(Diagnostic::TruncatedExon {
                            gene_id: gene.id.clone(),
                            transcript_id: tx.id.clone(),
                            start: span.start,
                            end: span.end,
                            resolved: seq.len(),
                        });
                    }
                    policy.apply(gene.strand, seq)
                } else {
                    Vec::new()
                };
                tx.push_exon(Exon::new(span, seq));
            }

            tx.rebase_variants();
        }
        for d in truncated {
            self.raise(d);
        }

        debug!(
            "finalized gene {} ({} transcripts, {} exons)",
            gene.id,
            gene.transcripts.len(),
            gene.exon_count()
        );
        gene
    }

    /// Drive the state machine over a whole record stream.
    ///
    /// Every completed gene is handed to `emit` as soon as it is complete.
    /// The first parse error (or `emit` error) aborts the run; genes emitted
    /// before it stay emitted.
    pub fn run<I, F, E>(mut self, records: I, mut emit: F) -> Result<BuildReport, E>
    where
        I: IntoIterator<Item = Result<AnnotationRecord, ParseError>>,
        F: FnMut(Gene) -> Result<(), E>,
        E: From<ParseError>,
    {
        let mut state = BuilderState::Empty;
        for rec in records {
            let rec = rec?;
            let (next, completed) = self.step(state, &rec)?;
            state = next;
            if let Some(gene) = completed {
                emit(gene)?;
            }
        }
        if let Some(gene) = self.finish(state) {
            emit(gene)?;
        }
        Ok(self.report)
    }

    fn raise(&mut self, diagnostic: Diagnostic) {
        diagnostic.log();
        self.report.diagnostics.push(diagnostic);
    }
}

/// Assembly order of one transcript's buffered exons:
/// ascending start on `+`, reverse buffered order otherwise.
pub fn order_spans(mut spans: Vec<ExonSpan>, strand: Strand) -> Vec<ExonSpan> {
    match strand {
        Strand::Plus => spans.sort_by_key(|s| s.start),
        Strand::Minus | Strand::Unknown => spans.reverse(),
    }
    spans
}

// -------------------- tests --------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::io::AnnotationReader;
    use crate::sequence::FastaSequences;
    use std::io::Cursor;

    fn resolver_with(contig: &str, seq: &[u8]) -> SequenceResolver {
        let mut fa = FastaSequences::new();
        fa.insert(contig, seq.to_vec());
        SequenceResolver::new(fa, "test.fa")
    }

    fn build(gtf: &str, resolver: &SequenceResolver, opts: ConvertOptions) -> (Vec<Gene>, BuildReport) {
        let mut genes = Vec::new();
        let records = AnnotationReader::new(Cursor::new(gtf.as_bytes())).records();
        let report = GeneModelBuilder::new(resolver, opts)
            .run(records, |g| {
                genes.push(g);
                Ok::<(), ParseError>(())
            })
            .unwrap();
        (genes, report)
    }

    const TWO_GENES: &str = "\
1\tsrc\texon\t1\t4\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\"; gene_biotype \"protein_coding\";
1\tsrc\tCDS\t1\t4\t.\t+\t0\tgene_id \"G1\"; transcript_id \"T1\"; gene_biotype \"protein_coding\";
1\tsrc\texon\t9\t10\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T2\"; transcript_name \"Tx2\"; gene_biotype \"protein_coding\";
1\tsrc\texon\t5\t6\t.\t-\t.\tgene_id \"G2\"; gene_name \"Two\"; transcript_id \"T3\"; gene_biotype \"lincRNA\";
1\tsrc\texon\t11\t12\t.\t-\t.\tgene_id \"G2\"; gene_name \"Two\"; transcript_id \"T3\"; gene_biotype \"lincRNA\";
";

    #[test]
    fn groups_rows_into_genes_and_transcripts() {
        let r = resolver_with("1", b"ACGTACGTACGT");
        let (genes, report) = build(TWO_GENES, &r, ConvertOptions::default());

        assert_eq!(genes.len(), 2);
        assert_eq!(report.genes, 2);
        assert_eq!(report.rows, 5);
        assert_eq!(report.exon_rows, 4);

        let g1 = &genes[0];
        assert_eq!(g1.id, "G1");
        assert_eq!(g1.name, "G1");
        assert!(g1.has_seq);
        assert_eq!(g1.transcripts.len(), 2);
        assert_eq!(g1.transcripts[0].seq, b"ACGT".to_vec());
        assert_eq!(g1.transcripts[1].name, "Tx2");
        // [9,11) -> 0-based [8,10)
        assert_eq!(g1.transcripts[1].seq, b"AC".to_vec());

        let g2 = &genes[1];
        assert_eq!(g2.name, "Two");
        assert_eq!(g2.strand, Strand::Minus);
        // minus strand: reverse buffered order, no complement
        let starts: Vec<u64> = g2.transcripts[0].exons.iter().map(|e| e.start).collect();
        assert_eq!(starts, vec![11, 5]);
        assert_eq!(g2.transcripts[0].seq, b"GTAC".to_vec());
    }

    #[test]
    fn protein_coding_only_drops_other_biotypes() {
        let r = resolver_with("1", b"ACGTACGTACGT");
        let opts = ConvertOptions::new().protein_coding_only(true);
        let (genes, report) = build(TWO_GENES, &r, opts);

        assert_eq!(genes.len(), 1);
        assert_eq!(genes[0].id, "G1");
        assert_eq!(report.skipped_biotype, 2);
    }

    #[test]
    fn plus_strand_exons_sorted_by_start() {
        let gtf = "\
1\tsrc\texon\t9\t10\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
1\tsrc\texon\t1\t2\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
";
        let r = resolver_with("1", b"ACGTACGTACGT");
        let (genes, _) = build(gtf, &r, ConvertOptions::default());
        let starts: Vec<u64> = genes[0].transcripts[0].exons.iter().map(|e| e.start).collect();
        assert_eq!(starts, vec![1, 9]);
        assert_eq!(genes[0].transcripts[0].seq, b"ACAC".to_vec());
    }

    #[test]
    fn reverse_complement_policy() {
        let gtf = "1\tsrc\texon\t1\t4\t.\t-\t.\tgene_id \"G1\"; transcript_id \"T1\";\n";
        let r = resolver_with("1", b"AACG");

        let (legacy, _) = build(gtf, &r, ConvertOptions::default());
        assert_eq!(legacy[0].transcripts[0].seq, b"AACG".to_vec());

        let opts = ConvertOptions::new().minus_strand(MinusStrandPolicy::ReverseComplement);
        let (fixed, _) = build(gtf, &r, opts);
        assert_eq!(fixed[0].transcripts[0].seq, b"CGTT".to_vec());
    }

    #[test]
    fn rows_without_gene_id_are_skipped() {
        let gtf = "\
1\tsrc\texon\t1\t2\t.\t+\t.\ttranscript_id \"T0\";
1\tsrc\texon\t1\t2\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
";
        let r = resolver_with("1", b"ACGT");
        let (genes, report) = build(gtf, &r, ConvertOptions::default());
        assert_eq!(genes.len(), 1);
        assert_eq!(report.skipped_no_gene_id, 1);
    }

    #[test]
    fn truncated_exon_is_clamped_and_reported() {
        let gtf = "1\tsrc\texon\t3\t10\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";\n";
        let r = resolver_with("1", b"ACGT");
        let (genes, report) = build(gtf, &r, ConvertOptions::default());
        assert_eq!(genes[0].transcripts[0].seq, b"GT".to_vec());
        assert!(matches!(
            report.diagnostics.as_slice(),
            [Diagnostic::TruncatedExon { resolved: 2, .. }]
        ));
    }

    #[test]
    fn step_exposes_state_transitions() {
        let r = resolver_with("1", b"ACGT");
        let mut b = GeneModelBuilder::new(&r, ConvertOptions::default());
        let row = |gid: &str| {
            crate::annotation::io::parse_record_line(&format!(
                "1\tsrc\texon\t1\t2\t.\t+\t.\tgene_id \"{gid}\"; transcript_id \"T\";"
            ))
            .unwrap()
        };

        let (state, done) = b.step(BuilderState::Empty, &row("G1")).unwrap();
        assert!(done.is_none());
        assert_eq!(state.current_gene().map(|g| g.id.as_str()), Some("G1"));

        let (state, done) = b.step(state, &row("G1")).unwrap();
        assert!(done.is_none());

        let (state, done) = b.step(state, &row("G2")).unwrap();
        assert_eq!(done.map(|g| g.id), Some("G1".to_string()));
        assert_eq!(state.current_gene().map(|g| g.id.as_str()), Some("G2"));

        assert_eq!(b.finish(state).map(|g| g.id), Some("G2".to_string()));
        assert!(b.finish(BuilderState::Empty).is_none());
        assert_eq!(b.report().genes, 2);
    }

    #[test]
    fn odd_non_exon_rows_do_not_abort() {
        let gtf = "\
1\tsrc\tgene\t1\t12\tNA\t+\t.\tgene_id \"G1\";
1\tsrc\tstart_codon\t1\t3\t.\t+\t3\tgene_id \"G1\"; transcript_id \"T1\";
1\tsrc\tCDS\tx\t4\t.\t+\t0\tgene_id \"G1\"; transcript_id \"T1\";
1\tsrc\texon\t1\t4\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
";
        let r = resolver_with("1", b"ACGTACGTACGT");
        let (genes, report) = build(gtf, &r, ConvertOptions::default());
        assert_eq!(report.rows, 4);
        assert_eq!(report.exon_rows, 1);
        assert_eq!(genes.len(), 1);
        assert_eq!(genes[0].transcripts[0].seq, b"ACGT".to_vec());
    }

    #[test]
    fn bad_coordinates_on_used_exon_row_are_fatal() {
        let gtf = "\
1\tsrc\texon\t1\t4\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
1\tsrc\texon\tx\t9\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
";
        let r = resolver_with("1", b"ACGTACGTACGT");
        let records = AnnotationReader::new(Cursor::new(gtf.as_bytes())).records();
        let err = GeneModelBuilder::new(&r, ConvertOptions::default())
            .run(records, |_| Ok::<(), ParseError>(()))
            .unwrap_err();
        match err {
            ParseError::BadCoordinates { line_no, gene_id, start, .. } => {
                assert_eq!(line_no, 2);
                assert_eq!(gene_id, "G1");
                assert_eq!(start, "?");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn bad_coordinates_on_filtered_rows_are_ignored() {
        // lincRNA row is dropped by the biotype filter, the last row has no gene id
        let gtf = "\
1\tsrc\texon\t9\t2\t.\t+\t.\tgene_id \"L1\"; transcript_id \"LT\"; gene_biotype \"lincRNA\";
1\tsrc\texon\t1\t4\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\"; gene_biotype \"protein_coding\";
1\tsrc\texon\t.\t.\t.\t+\t.\ttranscript_id \"T1\"; gene_biotype \"protein_coding\";
";
        let r = resolver_with("1", b"ACGTACGTACGT");
        let (genes, report) = build(gtf, &r, ConvertOptions::new().protein_coding_only(true));
        assert_eq!(genes.len(), 1);
        assert_eq!(report.skipped_biotype, 1);
        assert_eq!(report.skipped_no_gene_id, 1);
    }

    #[test]
    fn missing_transcript_id_groups_under_empty_id() {
        let gtf = "\
1\tsrc\texon\t5\t6\t.\t+\t.\tgene_id \"G1\";
1\tsrc\texon\t1\t2\t.\t+\t.\tgene_id \"G1\";
";
        let r = resolver_with("1", b"ACGTACGTACGT");
        let (genes, _) = build(gtf, &r, ConvertOptions::default());
        let txs = &genes[0].transcripts;
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].id, "");
        assert_eq!(txs[0].name, "");
        let starts: Vec<u64> = txs[0].exons.iter().map(|e| e.start).collect();
        assert_eq!(starts, vec![1, 5]);
        assert_eq!(txs[0].seq, b"ACAC".to_vec());
    }

    #[test]
    fn reappearing_transcript_id_shares_its_buffer() {
        let gtf = "\
1\tsrc\texon\t1\t2\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
1\tsrc\texon\t5\t6\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T2\";
1\tsrc\texon\t9\t10\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
";
        let r = resolver_with("1", b"ACGTACGTACGT");
        let (genes, _) = build(gtf, &r, ConvertOptions::default());
        let txs = &genes[0].transcripts;

        let ids: Vec<&str> = txs.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["T1", "T2", "T1"]);
        // both T1 entries carry every T1 exon
        for t in [&txs[0], &txs[2]] {
            let starts: Vec<u64> = t.exons.iter().map(|e| e.start).collect();
            assert_eq!(starts, vec![1, 9]);
            assert_eq!(t.seq, b"ACAC".to_vec());
        }
        assert_eq!(txs[1].exons.len(), 1);
        assert_eq!(genes[0].exon_count(), 5);
    }

    #[test]
    fn reappearing_gene_id_emits_a_second_record() {
        let gtf = "\
1\tsrc\texon\t1\t2\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
1\tsrc\texon\t5\t6\t.\t+\t.\tgene_id \"G2\"; transcript_id \"T2\";
1\tsrc\texon\t9\t10\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T3\";
";
        let r = resolver_with("1", b"ACGTACGTACGT");
        let (genes, report) = build(gtf, &r, ConvertOptions::default());
        let ids: Vec<&str> = genes.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["G1", "G2", "G1"]);
        assert_eq!(report.genes, 3);
        assert_eq!(genes[0].transcripts[0].id, "T1");
        assert_eq!(genes[2].transcripts[0].id, "T3");
    }
}
