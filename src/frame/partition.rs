//! Row partitioning of a frame
//!
//! A partition is a contiguous range of rows that is processed as one
//! parallel task on the session's thread pool.

use std::ops::Range;

use rayon::prelude::*;

use super::Frame;
use crate::session::Session;

/// Splits `num_rows` rows into `num_partitions` contiguous ranges.
///
/// The partition count is capped by the row count, and there is always at least one
/// (possibly empty) range. Earlier ranges receive the remainder rows.
pub(crate) fn split_ranges(num_rows: usize, num_partitions: usize) -> Vec<Range<usize>> {
    let n = num_partitions.min(num_rows).max(1);
    let base = num_rows / n;
    let remainder = num_rows % n;

    let mut start = 0;
    (0..n)
        .map(|i| {
            let len = base + usize::from(i < remainder);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

/// Runs `op` once per partition of `frame` on the session pool and returns the
/// results in partition order.
pub(crate) fn map_partitions<T, OP>(session: &Session, frame: &Frame, op: OP) -> Vec<T>
where
    T: Send,
    OP: Fn(Range<usize>) -> T + Sync + Send,
{
    session.install(|| {
        frame
            .partitions()
            .par_iter()
            .cloned()
            .map(&op)
            .collect()
    })
}
