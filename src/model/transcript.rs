use serde::{Deserialize, Serialize};

use crate::model::exon::{Exon, Variant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub id: String,
    pub name: String,
    pub seq: Vec<u8>,
    pub exons: Vec<Exon>,
    pub variants: Vec<Variant>,
}

impl Transcript {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            seq: Vec::new(),
            exons: Vec::new(),
            variants: Vec::new(),
        }
    }

    /// Append an exon and extend the assembled sequence with its slice.
    pub fn push_exon(&mut self, exon: Exon) {
        self.seq.extend_from_slice(&exon.seq);
        self.exons.push(exon);
    }

    /// Summed exon length in assembly order.
    pub fn exon_length(&self) -> u64 {
        self.exons.iter().map(Exon::len).sum()
    }

    /// Lift exon-level variants onto the transcript.
    ///
    /// Each variant's transcript-relative position is its exon-relative position
    /// plus the length of all exons preceding its exon in assembly order.
    pub fn rebase_variants(&mut self) {
        let mut offset = 0u64;
        for exon in &self.exons {
            for v in &exon.variants {
                self.variants.push(v.rebased(offset));
            }
            offset += exon.len();
        }
    }
}
