//! Scatter-accumulate over an unordered entry list.
//!
//! Used by the unsorted reducer (entry = input row) and by the sparse gradient
//! (entry = forward contribution). Workers either own private partial outputs
//! over contiguous entry ranges, or own a block of output rows when partial
//! copies of the output would dwarf the input.

use crate::config::Executor;
use crate::ops::segment::element::SegmentFloat;
use crate::ops::segment::rows::{accumulate_scaled_row, merge_partials};
use num_traits::Zero;
use rayon::prelude::*;

/// Private partial buffers may hold at most this many times the visited input elements.
const PARTIALS_MEMORY_FACTOR: usize = 4;

/// One scatter contribution: `out[target] += scale * row`.
pub(crate) struct Contribution<'a, T: SegmentFloat> {
    pub(crate) target: usize,
    pub(crate) row: &'a [T],
    pub(crate) scale: T::Acc,
}

/// How a scatter call is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScatterPlan {
    /// One pass on the calling thread.
    Sequential,
    /// Each worker scatters a contiguous entry range into a private output copy.
    Partials { chunk_len: usize, chunks: usize },
    /// Each worker owns a contiguous block of output rows and scans every entry,
    /// keeping only the targets inside its block. No extra buffers.
    RowBlocks { rows_per_block: usize },
}

/// Picks the execution plan. Private partials are used only while their
/// combined size stays proportional to the input, so a large output with few
/// entries (an embedding table gradient) falls back to row blocks.
pub(crate) fn plan_scatter(executor: &Executor, entries: usize, out_rows: usize, cols: usize) -> ScatterPlan {
    let out_len = out_rows * cols;
    let work = entries * cols;
    if out_len == 0 || entries == 0 || !executor.is_parallel(work) {
        return ScatterPlan::Sequential;
    }
    let threads = executor.current_num_threads();
    let chunk_len = entries.div_ceil(threads);
    let chunks = entries.div_ceil(chunk_len);
    if out_len.saturating_mul(chunks) <= work.saturating_mul(PARTIALS_MEMORY_FACTOR) {
        ScatterPlan::Partials { chunk_len, chunks }
    } else {
        ScatterPlan::RowBlocks {
            rows_per_block: out_rows.div_ceil(threads),
        }
    }
}

/// Accumulates `entries` contributions into an `out_rows x cols` accumulator buffer.
///
/// `contribution(k)` returns `None` for masked entries. Targets must be in
/// `[0, out_rows)`; callers establish that during validation.
pub(crate) fn scatter_rows<'a, T, F>(
    executor: &Executor,
    entries: usize,
    out_rows: usize,
    cols: usize,
    contribution: F,
) -> Vec<T::Acc>
where
    T: SegmentFloat,
    F: Fn(usize) -> Option<Contribution<'a, T>> + Sync,
{
    let out_len = out_rows * cols;
    let scatter_range = |acc: &mut [T::Acc], range: std::ops::Range<usize>| {
        for k in range {
            if let Some(c) = contribution(k) {
                let dst = &mut acc[c.target * cols..(c.target + 1) * cols];
                accumulate_scaled_row(dst, c.row, c.scale);
            }
        }
    };

    match plan_scatter(executor, entries, out_rows, cols) {
        ScatterPlan::Sequential => {
            let mut acc = vec![T::Acc::zero(); out_len];
            scatter_range(acc.as_mut_slice(), 0..entries);
            acc
        }
        ScatterPlan::Partials { chunk_len, chunks } => {
            log::debug!(
                "scatter_rows: {} entries over {} partial buffers of {} rows",
                entries,
                chunks,
                out_rows
            );
            executor.install(|| {
                (0..chunks)
                    .into_par_iter()
                    .map(|chunk| {
                        let mut local = vec![T::Acc::zero(); out_len];
                        let start = chunk * chunk_len;
                        scatter_range(local.as_mut_slice(), start..(start + chunk_len).min(entries));
                        local
                    })
                    .reduce_with(|mut merged, partial| {
                        merge_partials(&mut merged, &partial);
                        merged
                    })
                    .unwrap_or_else(|| vec![T::Acc::zero(); out_len])
            })
        }
        ScatterPlan::RowBlocks { rows_per_block } => {
            log::debug!(
                "scatter_rows: {} entries into {} rows, {} rows per block",
                entries,
                out_rows,
                rows_per_block
            );
            let mut acc = vec![T::Acc::zero(); out_len];
            executor.install(|| {
                acc.par_chunks_mut(rows_per_block * cols)
                    .enumerate()
                    .for_each(|(block, dst)| {
                        let first = block * rows_per_block;
                        let rows = first..first + dst.len() / cols;
                        for k in 0..entries {
                            if let Some(c) = contribution(k) {
                                if rows.contains(&c.target) {
                                    let local = c.target - first;
                                    accumulate_scaled_row(&mut dst[local * cols..(local + 1) * cols], c.row, c.scale);
                                }
                            }
                        }
                    });
            });
            acc
        }
    }
}
