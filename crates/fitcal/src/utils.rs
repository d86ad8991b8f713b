//! Rounding and thread-pool helpers shared by preparation, training and
//! prediction.

use rayon::prelude::*;

// =============================================================================
// Rounding
// =============================================================================

/// Round `value` to `decimals` decimal places, halves away from zero.
///
/// Used both for the derived BMI column and for the exposed prediction, so
/// training-time and request-time values go through the same rounding.
#[inline]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

// =============================================================================
// Threading
// =============================================================================

/// Execution mode handed down from [`run_with_threads`] to tree growth and
/// batch prediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parallelism {
    Sequential,
    Parallel,
}

impl Parallelism {
    /// `1`, or `0` on a single-threaded global pool, means sequential.
    #[inline]
    pub fn from_threads(n_threads: usize) -> Self {
        let single = n_threads == 1 || (n_threads == 0 && rayon::current_num_threads() == 1);
        if single { Self::Sequential } else { Self::Parallel }
    }

    #[inline]
    pub fn is_parallel(self) -> bool {
        self == Self::Parallel
    }

    /// Map `f` over `items`, keeping input order in the output.
    #[inline]
    pub fn maybe_par_map<T, B, I, F>(self, items: I, f: F) -> Vec<B>
    where
        T: Send,
        B: Send,
        I: IntoIterator<Item = T> + IntoParallelIterator<Item = T>,
        F: Fn(T) -> B + Sync + Send,
    {
        match self {
            Self::Parallel => items.into_par_iter().map(f).collect(),
            Self::Sequential => items.into_iter().map(f).collect(),
        }
    }
}

/// Call `f` inside a pool sized by `n_threads` (`0` = all cores, `1` = no
/// pool, `n` = exactly `n` workers).
///
/// Falls back to sequential execution if the pool cannot be created.
pub fn run_with_threads<T: Send>(n_threads: usize, f: impl FnOnce(Parallelism) -> T + Send) -> T {
    if !Parallelism::from_threads(n_threads).is_parallel() {
        return f(Parallelism::Sequential);
    }
    match rayon::ThreadPoolBuilder::new().num_threads(n_threads).build() {
        Ok(pool) => pool.install(|| f(Parallelism::Parallel)),
        Err(e) => {
            tracing::warn!(error = %e, n_threads, "thread pool unavailable, training sequentially");
            f(Parallelism::Sequential)
        }
    }
}
