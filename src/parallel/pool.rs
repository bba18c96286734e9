//! Rayon thread pool configuration for ranking workloads.
//!
//! Use [WorkerPool::install] to rank candidates on a fixed number of threads,
//! or rely on Rayon's default (all CPU cores).

use rayon::ThreadPoolBuilder;

/// Configures how many worker threads are used for parallel candidate evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerPool {
    /// Number of worker threads. If 0, use Rayon default (num_cpus).
    pub workers: usize,
}

impl WorkerPool {
    /// Use exactly `n` worker threads.
    pub fn with_workers(n: usize) -> Self {
        Self { workers: n }
    }

    /// Reads the worker count from an environment variable; unset or
    /// unparseable values mean the Rayon default.
    pub fn from_env(var: &str) -> Self {
        let workers = std::env::var(var)
            .ok()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(0);
        Self { workers }
    }

    /// Run a closure on a thread pool with this worker count. If [workers](WorkerPool::workers) is 0,
    /// uses the global Rayon pool. Otherwise builds a temporary pool with that many threads,
    /// falling back to the global pool if the build fails.
    pub fn install<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            return f();
        }
        match ThreadPoolBuilder::new().num_threads(self.workers).build() {
            Ok(pool) => pool.install(f),
            Err(err) => {
                log::warn!(
                    "unable to build {}-thread pool ({err}), using the global pool",
                    self.workers
                );
                f()
            }
        }
    }
}
