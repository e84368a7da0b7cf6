use crate::{inner::Config, JobError, PoolError, ThreadPool};
use std::{num::NonZeroUsize, sync::Arc, thread};

const DEFAULT_NAME: &str = "dispool";

/// What `submit` does when a bounded job queue is full
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Backpressure {
    /// Wait until the dispatcher frees room in the queue
    #[default]
    Block,
    /// Fail with [`PoolError::QueueFull`]
    Reject,
}

/// Thread pool builder
#[derive(Default)]
pub struct ThreadPoolBuilder {
    name: Option<String>,
    max_workers: Option<usize>,
    queue_capacity: Option<usize>,
    backpressure: Backpressure,
    error_handler: Option<crate::ErrorHandler>,
}

impl ThreadPoolBuilder {
    /// Prefix for the names of pool threads
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Maximum number of worker threads. Defaults to the available parallelism.
    pub fn max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = Some(max_workers);
        self
    }

    /// Bound the job queue. Unbounded unless set.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    pub fn backpressure(mut self, backpressure: Backpressure) -> Self {
        self.backpressure = backpressure;
        self
    }

    /// Called with every job failure, from the thread where it happened
    pub fn error_handler(mut self, handler: impl Fn(JobError) + Send + Sync + 'static) -> Self {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Result<ThreadPool, PoolError> {
        let max_workers = match self.max_workers {
            Some(n) => NonZeroUsize::new(n).ok_or(PoolError::InvalidWorkerCount)?,
            None => thread::available_parallelism().unwrap_or(NonZeroUsize::MIN),
        };

        let queue_capacity = self
            .queue_capacity
            .map(|n| NonZeroUsize::new(n).ok_or(PoolError::InvalidQueueCapacity))
            .transpose()?;

        let config = Config {
            name: self.name.unwrap_or_else(|| DEFAULT_NAME.to_owned()),
            max_workers,
            queue_capacity,
            backpressure: self.backpressure,
            error_handler: self.error_handler,
        };

        ThreadPool::from_config(config)
    }
}
