use std::fmt;

use serde::{Deserialize, Serialize};

/// Genomic strand/orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    Plus,
    Minus,
    Unknown,
}

impl Strand {
    /// Parse the GTF strand column. `.` and `?` are both "unknown".
    pub fn from_symbol(s: &str) -> Option<Strand> {
        match s {
            "+" => Some(Strand::Plus),
            "-" => Some(Strand::Minus),
            "." | "?" => Some(Strand::Unknown),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
            Strand::Unknown => '.',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A buffered exon coordinate pair as collected while reading a gene.
///
/// Coordinates:
/// - `start` keeps the annotation's 1-based start
/// - `end` is exclusive (annotation end + 1)
///
/// The matching 0-based half-open slice into a contig is `[start - 1, end - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExonSpan {
    pub start: u64,
    pub end: u64,
}

impl ExonSpan {
    /// Build from 1-based inclusive annotation coordinates.
    /// `None` for a zero start or `end_inclusive < start`.
    pub fn from_inclusive(start: u64, end_inclusive: u64) -> Option<Self> {
        if start == 0 || end_inclusive < start {
            return None;
        }
        Some(Self {
            start,
            end: end_inclusive + 1,
        })
    }

    #[inline]
    pub fn len(self) -> u64 {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.end <= self.start
    }

    /// 0-based half-open offsets into the contig sequence.
    #[inline]
    pub fn zero_based(self) -> (u64, u64) {
        (self.start.saturating_sub(1), self.end.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strand_symbols_roundtrip() {
        assert_eq!(Strand::from_symbol("+"), Some(Strand::Plus));
        assert_eq!(Strand::from_symbol("-"), Some(Strand::Minus));
        assert_eq!(Strand::from_symbol("?"), Some(Strand::Unknown));
        assert_eq!(Strand::from_symbol("x"), None);
        assert_eq!(Strand::Minus.to_string(), "-");
    }

    #[test]
    fn inclusive_end_becomes_exclusive() {
        // 100..200 inclusive -> [100, 201), 101 bases
        let span = ExonSpan::from_inclusive(100, 200).unwrap();
        assert_eq!(span.end, 201);
        assert_eq!(span.len(), 101);
        assert_eq!(span.zero_based(), (99, 200));

        // single-base exon still has end > start
        let one = ExonSpan::from_inclusive(7, 7).unwrap();
        assert!(one.end > one.start);
        assert_eq!(one.len(), 1);
    }

    #[test]
    fn invalid_inclusive_ranges_are_rejected() {
        assert_eq!(ExonSpan::from_inclusive(200, 100), None);
        assert_eq!(ExonSpan::from_inclusive(0, 10), None);
    }
}
