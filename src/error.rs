use crate::WorkerId;
use std::{any::Any, io};
use thiserror::Error;

/// Errors returned by pool operations
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("maximum worker count must be greater than zero")]
    InvalidWorkerCount,

    #[error("job queue capacity must be greater than zero")]
    InvalidQueueCapacity,

    #[error("thread pool is closed")]
    Closed,

    #[error("thread pool is already shut down")]
    AlreadyShutdown,

    #[error("thread pool can't be shut down from one of its own threads")]
    ShutdownFromPoolThread,

    #[error("job queue is full")]
    QueueFull,

    #[error("failed to spawn dispatcher thread: {0}")]
    Spawn(#[from] io::Error),

    #[error("detected panicked threads while join: {0}")]
    PanickedThreads(usize),
}

/// Failure of a single job, delivered to the pool error handler
#[derive(Debug, Error)]
pub enum JobError {
    #[error("job panicked on worker {worker}: {message}")]
    Panicked { worker: WorkerId, message: String },

    #[error("job dropped, failed to spawn worker {worker}: {source}")]
    SpawnFailed {
        worker: WorkerId,
        #[source]
        source: io::Error,
    },
}

impl JobError {
    pub(crate) fn panicked(worker: WorkerId, payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<&'static str>() {
            Ok(s) => (*s).to_owned(),
            Err(payload) => match payload.downcast::<String>() {
                Ok(s) => *s,
                Err(_) => "non-string panic payload".to_owned(),
            },
        };

        Self::Panicked { worker, message }
    }

    /// Worker involved in the failure
    pub fn worker(&self) -> WorkerId {
        match self {
            Self::Panicked { worker, .. } | Self::SpawnFailed { worker, .. } => *worker,
        }
    }
}

pub type Result<T> = std::result::Result<T, PoolError>;
