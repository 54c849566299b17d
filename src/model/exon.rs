use serde::{Deserialize, Serialize};

use crate::types::ExonSpan;

/// A positional sequence alteration attached to an exon or transcript.
///
/// `rel_pos` is relative to whatever owns the variant: exon-relative on an
/// [`Exon`], transcript-relative once re-based onto a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub abs_pos: u64,
    pub reference: String,
    pub alternate: String,
    pub rel_pos: u64,
}

impl Variant {
    /// Copy of this variant with `rel_pos` shifted by `offset`.
    pub fn rebased(&self, offset: u64) -> Variant {
        Variant {
            rel_pos: self.rel_pos + offset,
            ..self.clone()
        }
    }
}

/// Exon with its resolved sequence slice.
///
/// `start` is the 1-based annotation start, `end` is exclusive.
/// `seq` is empty when the contig could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exon {
    pub start: u64,
    pub end: u64,
    pub seq: Vec<u8>,
    pub variants: Vec<Variant>,
}

impl Exon {
    pub fn new(span: ExonSpan, seq: Vec<u8>) -> Self {
        Self {
            start: span.start,
            end: span.end,
            seq,
            variants: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}
