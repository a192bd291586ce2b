//! Up-front validation of segment ids and gather indices.
//!
//! Every check a reducer performs happens here, before any output is allocated.
//! What survives validation is a small description of the id sequence
//! (`SortedLayout`) that the kernels consume without further checks.

use crate::error::SegReduceError;
use crate::ops::segment::element::SegmentIndex;

/// What to do with sorted ids that fall outside `[0, num_segments)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutOfRange {
    /// Dense sorted reduction: ids address output rows directly.
    Reject,
    /// Sparse reduction: out-of-range ids mask their entries out.
    Drop,
}

/// Validated run structure of a non-decreasing segment id sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SortedLayout {
    pub(crate) num_segments: usize,
    /// Positions `[start, end)` hold ids in `[0, num_segments)`.
    pub(crate) start: usize,
    pub(crate) end: usize,
}

impl SortedLayout {
    pub(crate) fn entries(&self) -> usize {
        self.end - self.start
    }

    pub(crate) fn dropped(&self, total: usize) -> usize {
        total - self.entries()
    }
}

/// Checks that `ids` is non-decreasing and derives the output row count.
///
/// `num_segments` defaults to `ids[last] + 1` (zero for an empty or all-negative
/// sequence). Monotonicity is checked over the whole sequence first, so a
/// descending step is always reported as `MalformedSegmentIds`.
pub(crate) fn validate_sorted_ids<I: SegmentIndex>(
    ids: &[I],
    num_segments: Option<usize>,
    policy: OutOfRange,
) -> Result<SortedLayout, SegReduceError> {
    for (position, pair) in ids.windows(2).enumerate() {
        let (previous, current) = (pair[0].as_i64(), pair[1].as_i64());
        if current < previous {
            return Err(SegReduceError::MalformedSegmentIds {
                position: position + 1,
                previous,
                current,
            });
        }
    }

    let num_segments = match num_segments {
        Some(n) => n,
        None => ids
            .last()
            .map(|id| id.as_i64())
            .filter(|&id| id >= 0)
            .map_or(0, |id| id as usize + 1),
    };

    let start = ids.partition_point(|id| id.as_i64() < 0);
    let bound = exclusive_bound(num_segments);
    let end = ids.partition_point(|id| id.as_i64() < bound);

    if policy == OutOfRange::Reject {
        let bad = if start > 0 { Some(0) } else if end < ids.len() { Some(end) } else { None };
        if let Some(position) = bad {
            return Err(SegReduceError::SegmentIdOutOfRange {
                position,
                id: ids[position].as_i64(),
                num_segments: Some(num_segments),
            });
        }
    }

    Ok(SortedLayout { num_segments, start, end })
}

/// Contiguous position ranges over the kept window of a sorted id sequence,
/// together with the output rows each range owns.
///
/// A run of equal ids may cross range boundaries. Its output row is owned by
/// the range in which the run starts; later ranges only contribute a partial
/// sum of their leading fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunPartition {
    /// `bounds[c]..bounds[c + 1]` are the positions scanned by part `c`.
    pub(crate) bounds: Vec<usize>,
    /// Part `c` writes output rows `first_rows[c]..first_rows[c + 1]`.
    pub(crate) first_rows: Vec<usize>,
}

impl RunPartition {
    pub(crate) fn parts(&self) -> usize {
        self.bounds.len() - 1
    }
}

/// Whether position `p` of the kept window begins a new run.
#[inline]
pub(crate) fn is_run_start<I: SegmentIndex>(ids: &[I], layout: &SortedLayout, p: usize) -> bool {
    p == layout.start || ids[p - 1].as_i64() != ids[p].as_i64()
}

/// Splits the kept window into `parts` equal position ranges (at least one,
/// at most one per entry), regardless of where runs begin.
pub(crate) fn partition_runs<I: SegmentIndex>(ids: &[I], layout: &SortedLayout, parts: usize) -> RunPartition {
    let entries = layout.entries();
    let parts = parts.clamp(1, entries.max(1));
    let bounds: Vec<usize> = (0..=parts).map(|c| layout.start + c * entries / parts).collect();
    let first_rows = bounds
        .iter()
        .enumerate()
        .map(|(c, &p)| {
            if c == 0 {
                0
            } else if p >= layout.end {
                layout.num_segments
            } else if is_run_start(ids, layout, p) {
                ids[p].as_i64() as usize
            } else {
                ids[p].as_i64() as usize + 1
            }
        })
        .collect();
    RunPartition { bounds, first_rows }
}

/// Exclusive upper bound `n` as an `i64`, saturated at `i64::MAX`.
#[inline]
pub(crate) fn exclusive_bound(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Checks every gather/scatter row index against `[0, bound)`.
pub(crate) fn validate_indices<I: SegmentIndex>(indices: &[I], bound: usize) -> Result<(), SegReduceError> {
    let limit = exclusive_bound(bound);
    match indices
        .iter()
        .position(|idx| idx.as_i64() < 0 || idx.as_i64() >= limit)
    {
        Some(position) => Err(SegReduceError::IndexOutOfRange {
            position,
            index: indices[position].as_i64(),
            bound,
        }),
        None => Ok(()),
    }
}

/// Number of ids that fall outside `[0, num_segments)`.
pub(crate) fn count_out_of_range<I: SegmentIndex>(ids: &[I], num_segments: usize) -> usize {
    let bound = exclusive_bound(num_segments);
    ids.iter()
        .filter(|id| {
            let id = id.as_i64();
            id < 0 || id >= bound
        })
        .count()
}

/// Per-segment entry counts over an arbitrary id sequence, plus the dropped count.
pub(crate) fn segment_counts<I: SegmentIndex>(ids: &[I], num_segments: usize) -> (Vec<usize>, usize) {
    let mut counts = vec![0usize; num_segments];
    let mut dropped = 0;
    let bound = exclusive_bound(num_segments);
    for id in ids {
        let id = id.as_i64();
        if id >= 0 && id < bound {
            counts[id as usize] += 1;
        } else {
            dropped += 1;
        }
    }
    (counts, dropped)
}

/// Checks that an id/index sequence has one entry per row.
pub(crate) fn check_len(actual: usize, expected: usize, what: &str, operation: &str) -> Result<(), SegReduceError> {
    if actual != expected {
        return Err(SegReduceError::ShapeMismatch {
            expected: format!("{} of length {}", what, expected),
            actual: format!("length {}", actual),
            operation: operation.to_string(),
        });
    }
    Ok(())
}
