use std::fmt;

use log::{error, warn};

use crate::types::Strand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// Non-fatal anomaly found while building gene models.
///
/// These never stop a conversion; they are logged when raised and handed
/// back in the [`crate::annotation::BuildReport`] so callers can decide what
/// to do with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A row disagrees with the strand recorded from the gene's first row.
    StrandConflict {
        gene_id: String,
        gene_name: String,
        recorded: Strand,
        found: Strand,
    },
    /// The gene's contig is not present in the sequence source.
    MissingSequence {
        gene_id: String,
        seqname: String,
        origin: String,
    },
    /// An exon runs past the end of its contig; its sequence was clamped.
    TruncatedExon {
        gene_id: String,
        transcript_id: String,
        start: u64,
        end: u64,
        resolved: usize,
    },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::StrandConflict { .. } => Severity::Error,
            Diagnostic::MissingSequence { .. } | Diagnostic::TruncatedExon { .. } => {
                Severity::Warning
            }
        }
    }

    pub fn gene_id(&self) -> &str {
        match self {
            Diagnostic::StrandConflict { gene_id, .. }
            | Diagnostic::MissingSequence { gene_id, .. }
            | Diagnostic::TruncatedExon { gene_id, .. } => gene_id,
        }
    }

    pub(crate) fn log(&self) {
        match self.severity() {
            Severity::Error => error!("{}", self),
            Severity::Warning => warn!("{}", self),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::StrandConflict {
                gene_name,
                recorded,
                found,
                ..
            } => write!(
                f,
                "Strands are not matched within a gene {gene_name} (recorded {recorded}, found {found})"
            ),
            Diagnostic::MissingSequence {
                gene_id,
                seqname,
                origin,
            } => write!(f, "cannot find sequence {seqname} in {origin} (gene {gene_id})"),
            Diagnostic::TruncatedExon {
                gene_id,
                transcript_id,
                start,
                end,
                resolved,
            } => write!(
                f,
                "exon [{start},{end}) of {gene_id}/{transcript_id} runs past its contig; {resolved} bp resolved"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_gene_and_message() {
        let conflict = Diagnostic::StrandConflict {
            gene_id: "ENSG1".into(),
            gene_name: "Actb".into(),
            recorded: Strand::Plus,
            found: Strand::Minus,
        };
        assert_eq!(conflict.severity(), Severity::Error);
        assert_eq!(conflict.gene_id(), "ENSG1");
        assert_eq!(
            conflict.to_string(),
            "Strands are not matched within a gene Actb (recorded +, found -)"
        );

        let missing = Diagnostic::MissingSequence {
            gene_id: "ENSG2".into(),
            seqname: "GL000192.1".into(),
            origin: "genome.fa".into(),
        };
        assert_eq!(missing.severity(), Severity::Warning);
        assert_eq!(missing.gene_id(), "ENSG2");
        assert_eq!(
            missing.to_string(),
            "cannot find sequence GL000192.1 in genome.fa (gene ENSG2)"
        );
    }
}
