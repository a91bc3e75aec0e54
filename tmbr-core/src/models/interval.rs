use std::cmp::Ordering;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::errors::BurdenError;

/// Represent a genomic range from [start, end)
/// Inclusive of start, exclusive of end; coordinates are 0-based.
#[derive(Eq, PartialEq, Hash, Debug, Clone, Serialize, Deserialize)]
pub struct GenomicInterval {
    pub contig: String,
    pub start: u64,
    pub end: u64,
}

impl GenomicInterval {
    /// Construct a validated interval. Fails when the contig is empty or
    /// start is not strictly less than end.
    pub fn new(contig: impl Into<String>, start: u64, end: u64) -> Result<Self, BurdenError> {
        let contig = contig.into();
        if contig.is_empty() {
            return Err(BurdenError::InvalidInterval {
                contig,
                start,
                end,
                reason: "contig must not be empty",
            });
        }
        if start >= end {
            return Err(BurdenError::InvalidInterval {
                contig,
                start,
                end,
                reason: "start must be strictly less than end",
            });
        }
        Ok(GenomicInterval { contig, start, end })
    }

    /// Number of bases covered by the interval.
    #[inline]
    pub fn width(&self) -> u64 {
        self.end - self.start
    }

    /// Check if a 0-based position falls inside the interval.
    #[inline]
    pub fn contains(&self, position: u64) -> bool {
        self.start <= position && position < self.end
    }

    /// Check if the interval overlaps start .. end (same contig assumed).
    #[inline]
    pub fn overlap(&self, start: u64, end: u64) -> bool {
        self.start < end && self.end > start
    }
}

impl Ord for GenomicInterval {
    // Lexicographic by (contig, start, end) for deterministic sorts.
    #[inline]
    fn cmp(&self, other: &GenomicInterval) -> Ordering {
        self.contig
            .cmp(&other.contig)
            .then(self.start.cmp(&other.start))
            .then(self.end.cmp(&other.end))
    }
}

impl PartialOrd for GenomicInterval {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for GenomicInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.contig, self.start, self.end)
    }
}
