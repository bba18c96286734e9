//! Batch distribution for candidate evaluation.
//!
//! Splits work into batches so progress can be reported between them while
//! each batch still runs in parallel.

use rayon::prelude::*;

/// Split `total` items into up to `num_batches` ranges `[start, end)`.
/// Batches are as equal in size as possible; later batches may be smaller.
///
/// # Example
/// ```
/// # use supportdeck::parallel::batch_ranges;
/// let ranges = batch_ranges(100, 4);
/// assert_eq!(ranges, vec![(0, 25), (25, 50), (50, 75), (75, 100)]);
/// ```
pub fn batch_ranges(total: usize, num_batches: usize) -> Vec<(usize, usize)> {
    if total == 0 || num_batches == 0 {
        return Vec::new();
    }
    let num_batches = num_batches.min(total);
    let base = total / num_batches;
    let remainder = total % num_batches;
    let mut ranges = Vec::with_capacity(num_batches);
    let mut start = 0;
    for i in 0..num_batches {
        let size = base + if i < remainder { 1 } else { 0 };
        let end = start + size;
        ranges.push((start, end));
        start = end;
    }
    ranges
}

/// Maps `items` in up to `num_batches` batches, in parallel within a batch
/// when `parallel` is set. Output order matches input order.
/// `on_progress(done, total)` runs once up front and after every batch.
pub fn map_in_batches<T, R, F, P>(
    items: &[T],
    num_batches: usize,
    parallel: bool,
    map: F,
    mut on_progress: P,
) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
    P: FnMut(u32, u32),
{
    let total = items.len();
    if total == 0 {
        return Vec::new();
    }
    on_progress(0, total as u32);

    let mut results = Vec::with_capacity(total);
    for (start, end) in batch_ranges(total, num_batches.max(1)) {
        let batch = &items[start..end];
        if parallel {
            results.par_extend(batch.par_iter().map(&map));
        } else {
            results.extend(batch.iter().map(&map));
        }
        on_progress(end as u32, total as u32);
    }
    results
}
