//! Execution of independent work units on an optional dedicated thread pool.

use rayon::prelude::*;

use crate::errors::{ErrorInfo, YpError};

/// Evaluates `unit(0..units)` and returns the outputs in unit order.
///
/// `workers <= 1` runs sequentially on the calling thread; otherwise a
/// dedicated pool of `workers` threads is built for the call. Units must not
/// share mutable state, so the output is identical for every worker count.
pub fn map_units<T, F>(workers: usize, units: usize, unit: F) -> Result<Vec<T>, YpError>
where
    T: Send,
    F: Fn(usize) -> T + Send + Sync,
{
    if workers <= 1 || units <= 1 {
        return Ok((0..units).map(unit).collect());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|err| YpError::Execution(ErrorInfo::new("thread-pool", err.to_string())))?;
    Ok(pool.install(|| (0..units).into_par_iter().map(unit).collect()))
}

#[cfg(test)]
mod tests {
    use super::map_units;

    #[test]
    fn output_order_is_independent_of_worker_count() {
        let sequential = map_units(1, 64, |idx| idx * idx).unwrap();
        let parallel = map_units(4, 64, |idx| idx * idx).unwrap();
        assert_eq!(sequential, parallel);
        assert_eq!(sequential[7], 49);
    }
}
