use serde::{Deserialize, Serialize};

use crate::model::transcript::Transcript;
use crate::types::Strand;

/// Gene record: the unit persisted in the store, keyed by `id`.
///
/// Notes:
/// - `strand` is taken from the first row of the gene and never changes afterwards.
/// - `has_seq` is false when the gene's contig could not be found in the
///   sequence source; exons then carry coordinates only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gene {
    pub id: String,
    pub name: String,
    pub seqname: String,
    pub strand: Strand,
    pub has_seq: bool,
    pub transcripts: Vec<Transcript>,
}

impl Gene {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        seqname: impl Into<String>,
        strand: Strand,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            seqname: seqname.into(),
            strand,
            has_seq: false,
            transcripts: Vec::new(),
        }
    }

    /// Append a transcript stub (no exons yet).
    pub fn add_transcript(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.transcripts.push(Transcript::new(id, name));
    }

    /// Id of the most recently added transcript.
    pub fn last_transcript_id(&self) -> Option<&str> {
        self.transcripts.last().map(|t| t.id.as_str())
    }

    pub fn transcript(&self, id: &str) -> Option<&Transcript> {
        self.transcripts.iter().find(|t| t.id == id)
    }

    pub fn exon_count(&self) -> usize {
        self.transcripts.iter().map(|t| t.exons.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcripts_keep_insertion_order() {
        let mut g = Gene::new("G1", "GA", "1", Strand::Plus);
        g.add_transcript("T2", "T2");
        g.add_transcript("T1", "TA");

        let ids: Vec<_> = g.transcripts.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["T2", "T1"]);
        assert_eq!(g.last_transcript_id(), Some("T1"));
        assert_eq!(g.transcript("T1").map(|t| t.name.as_str()), Some("TA"));
        assert!(!g.has_seq);
    }
}
