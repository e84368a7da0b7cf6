//! Bounded thread pool with a dedicated dispatcher thread.
//!
//! Submitted jobs go to a FIFO queue. The dispatcher takes them one by one and hands
//! each to an idle worker, spawning a new worker only when none is idle and the pool
//! is still below its maximum size. Workers are never destroyed before shutdown.
//!
//! ```
//! use dispool::ThreadPool;
//! use std::sync::mpsc;
//!
//! let pool = ThreadPool::new(4).unwrap();
//! let (tx, rx) = mpsc::channel();
//!
//! for i in 0..8 {
//!     let tx = tx.clone();
//!     pool.submit(move || tx.send(i).unwrap()).unwrap();
//! }
//!
//! assert_eq!(rx.iter().take(8).sum::<i32>(), 28);
//! pool.shutdown().unwrap();
//! ```

mod builder;
mod dispatcher;
mod error;
mod idle;
mod inner;
mod queue;
mod worker;

pub use builder::{Backpressure, ThreadPoolBuilder};
pub use error::{JobError, PoolError, Result};
pub use worker::WorkerId;

use inner::{Config, Inner};
use std::sync::Arc;


/// Job for worker
pub type Job = Box<dyn FnOnce() + Send>;

/// Pool-level error channel
type ErrorHandler = Arc<dyn Fn(JobError) + Send + Sync>;

/// Handle to the pool. Clones refer to the same pool; the last one dropped shuts
/// it down if that hasn't happened yet.
#[derive(Clone)]
pub struct ThreadPool(Arc<Inner>);

impl ThreadPool {
    /// Pool with at most `max_workers` threads and default settings
    pub fn new(max_workers: usize) -> Result<Self> {
        Self::builder().max_workers(max_workers).build()
    }

    /// Thread pool builder
    pub fn builder() -> ThreadPoolBuilder {
        ThreadPoolBuilder::default()
    }

    pub(crate) fn from_config(config: Config) -> Result<Self> {
        Inner::new(config).map(Self)
    }

    /// Queue a job. Never waits for a free worker; only a full bounded queue with
    /// [`Backpressure::Block`] makes it wait.
    ///
    /// Fails with [`PoolError::Closed`] once shutdown has begun.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) -> Result<()> {
        self.0.submit(Box::new(job))
    }

    /// Run every job accepted so far, then stop and join all threads.
    ///
    /// A second call returns [`PoolError::AlreadyShutdown`].
    pub fn shutdown(&self) -> Result<()> {
        self.0.shutdown()
    }

    pub fn is_running(&self) -> bool {
        self.0.is_running()
    }

    pub fn max_workers(&self) -> usize {
        self.0.max_workers()
    }

    /// Number of live worker threads
    pub fn worker_count(&self) -> usize {
        self.0.worker_count()
    }

    /// Jobs waiting for the dispatcher
    pub fn queued_jobs(&self) -> usize {
        self.0.queued_jobs()
    }
}
