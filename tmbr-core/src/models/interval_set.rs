use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::io::bed::read_bed;
use crate::models::GenomicInterval;
use crate::utils::get_dynamic_writer;

///
/// An ordered mapping from contig to intervals on that contig.
///
/// A freshly built set carries its intervals as given; [`normalize`](IntervalSet::normalize)
/// establishes the sorted, non-overlapping, non-adjacent invariant that
/// [`subtract`](IntervalSet::subtract) and [`contains`](IntervalSet::contains) rely on.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalSet {
    intervals: BTreeMap<String, Vec<GenomicInterval>>,
}

impl From<Vec<GenomicInterval>> for IntervalSet {
    fn from(intervals: Vec<GenomicInterval>) -> Self {
        let mut by_contig: BTreeMap<String, Vec<GenomicInterval>> = BTreeMap::new();
        for interval in intervals {
            by_contig
                .entry(interval.contig.clone())
                .or_default()
                .push(interval);
        }
        IntervalSet {
            intervals: by_contig,
        }
    }
}

impl TryFrom<&Path> for IntervalSet {
    type Error = anyhow::Error;

    ///
    /// Create a new [IntervalSet] from a bed file.
    ///
    /// # Arguments:
    /// - value: path to bed file on disk.
    fn try_from(value: &Path) -> Result<Self> {
        let intervals = read_bed(value)?;
        Ok(IntervalSet::from(intervals))
    }
}

impl TryFrom<PathBuf> for IntervalSet {
    type Error = anyhow::Error;

    fn try_from(value: PathBuf) -> Result<Self> {
        IntervalSet::try_from(value.as_path())
    }
}

impl IntervalSet {
    /// Sort each contig's intervals by start and merge every interval whose
    /// start is <= the previous interval's end. Touching intervals
    /// (end == next start) merge as well, so a normalized set never carries
    /// zero-length gaps.
    ///
    /// Normalizing twice yields the same set, and the input order of the
    /// intervals never changes the result.
    pub fn normalize(&self) -> IntervalSet {
        let mut normalized: BTreeMap<String, Vec<GenomicInterval>> = BTreeMap::new();

        for (contig, intervals) in &self.intervals {
            let mut sorted = intervals.clone();
            sorted.sort();

            let mut merged: Vec<GenomicInterval> = Vec::with_capacity(sorted.len());
            for interval in sorted {
                match merged.last_mut() {
                    Some(previous) if interval.start <= previous.end => {
                        previous.end = previous.end.max(interval.end);
                    }
                    _ => merged.push(interval),
                }
            }

            if !merged.is_empty() {
                normalized.insert(contig.clone(), merged);
            }
        }

        IntervalSet {
            intervals: normalized,
        }
    }

    /// Remove, per contig, any portion of this set overlapping `exclusions`.
    /// One interval may come out of this as zero, one, two, or more pieces.
    /// An empty result is valid: exclusions may fully cover the target.
    ///
    /// Both sets must be normalized.
    pub fn subtract(&self, exclusions: &IntervalSet) -> IntervalSet {
        let mut remaining: BTreeMap<String, Vec<GenomicInterval>> = BTreeMap::new();

        for (contig, targets) in &self.intervals {
            let kept = match exclusions.intervals.get(contig) {
                None => targets.clone(),
                Some(excluded) => {
                    let mut kept = Vec::new();
                    let mut first_relevant = 0;

                    for target in targets {
                        while first_relevant < excluded.len()
                            && excluded[first_relevant].end <= target.start
                        {
                            first_relevant += 1;
                        }

                        let mut cursor = target.start;
                        let mut idx = first_relevant;
                        while idx < excluded.len() && excluded[idx].start < target.end {
                            let exclusion = &excluded[idx];
                            if exclusion.start > cursor {
                                kept.push(GenomicInterval {
                                    contig: contig.clone(),
                                    start: cursor,
                                    end: exclusion.start,
                                });
                            }
                            cursor = cursor.max(exclusion.end);
                            if cursor >= target.end {
                                break;
                            }
                            idx += 1;
                        }

                        if cursor < target.end {
                            kept.push(GenomicInterval {
                                contig: contig.clone(),
                                start: cursor,
                                end: target.end,
                            });
                        }
                    }

                    kept
                }
            };

            if !kept.is_empty() {
                remaining.insert(contig.clone(), kept);
            }
        }

        IntervalSet {
            intervals: remaining,
        }
    }

    /// Sum of (end - start) across every interval in every contig, in bases.
    pub fn total_length(&self) -> u64 {
        self.intervals
            .values()
            .flatten()
            .map(|interval| interval.width())
            .sum()
    }

    /// Binary search the contig's sorted interval list for a 0-based
    /// position. Half-open semantics: start <= position < end.
    ///
    /// The set must be normalized.
    pub fn contains(&self, contig: &str, position: u64) -> bool {
        let Some(intervals) = self.intervals.get(contig) else {
            return false;
        };

        let idx = intervals.partition_point(|interval| interval.start <= position);
        idx > 0 && position < intervals[idx - 1].end
    }

    /// Number of intervals across all contigs.
    pub fn len(&self) -> usize {
        self.intervals.values().map(|intervals| intervals.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Iterate intervals in (contig, start, end) order.
    pub fn iter(&self) -> impl Iterator<Item = &GenomicInterval> {
        self.intervals.values().flatten()
    }

    ///
    /// Dump the set to disk as BED. Writes gzip output when the path ends
    /// in `.gz`.
    ///
    /// # Arguments
    /// - path: the path to the file to dump to
    pub fn write_bed(&self, path: &Path) -> Result<()> {
        let mut writer = get_dynamic_writer(path)?;
        for interval in self.iter() {
            writeln!(
                writer,
                "{}\t{}\t{}",
                interval.contig, interval.start, interval.end
            )?;
        }
        writer.flush()?;

        Ok(())
    }
}
