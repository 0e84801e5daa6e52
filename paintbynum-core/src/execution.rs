//! Execution helpers for the pipeline stages that are safe to parallelize.
//!
//! A size threshold below which spinning up rayon's work-stealing isn't
//! worth it, plus the one iteration shape the pipeline actually needs: map a
//! slice, in parallel once it's big enough.

use rayon::prelude::*;

/// Below this many items, sequential iteration wins (thread-pool dispatch
/// overhead dominates for small buffers like thumbnails or tiny test
/// fixtures).
const PARALLEL_THRESHOLD: usize = 4096;

pub fn should_parallelize(len: usize) -> bool {
    len >= PARALLEL_THRESHOLD
}

/// Map `f` over `items`, in parallel once the slice is large enough to
/// justify it. Order of the output matches `items`.
pub fn map_maybe_parallel<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    if should_parallelize(items.len()) {
        items.par_iter().map(|item| f(item)).collect()
    } else {
        items.iter().map(|item| f(item)).collect()
    }
}
