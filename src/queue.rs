use crate::{Backpressure, Job, PoolError};
use log::trace;
use parking_lot::{Condvar, Mutex};
use std::{collections::VecDeque, num::NonZeroUsize};

/// FIFO of submitted jobs awaiting assignment. Any thread may add jobs, only the
/// dispatcher takes them.
pub(crate) struct JobQueue {
    inner: Mutex<QueueInner>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: Option<NonZeroUsize>,
    backpressure: Backpressure,
}

impl JobQueue {
    pub(crate) fn new(capacity: Option<NonZeroUsize>, backpressure: Backpressure) -> Self {
        Self {
            inner: Default::default(),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
            backpressure,
        }
    }

    /// Enqueue job and wake the dispatcher. On a full bounded queue the caller
    /// either waits for room or gets `QueueFull`, depending on the backpressure policy.
    pub(crate) fn add(&self, job: Job) -> Result<(), PoolError> {
        let mut lock = self.inner.lock();

        loop {
            if lock.shutdown {
                return Err(PoolError::Closed);
            }

            if !self.is_full(&lock) {
                break;
            }

            match self.backpressure {
                Backpressure::Reject => return Err(PoolError::QueueFull),
                Backpressure::Block => self.not_full.wait(&mut lock),
            }
        }

        lock.queue.push_back(job);
        trace!("job queued (queue size: {})", lock.queue.len());
        self.not_empty.notify_one();

        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Refuse new jobs and wake everybody sleeping on the queue. Jobs already
    /// queued are still handed out by `take`.
    pub(crate) fn shutdown(&self) {
        self.inner.lock().shutdown = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Get next job from the queue. If the queue is empty, then thread sleeps until
    /// adding new elements.
    ///
    /// Return `None` once the queue is shut down and drained.
    pub(crate) fn take(&self) -> Option<Job> {
        let mut lock = self.inner.lock();

        while lock.queue.is_empty() {
            if lock.shutdown {
                return None;
            };

            self.not_empty.wait(&mut lock);
        }

        let job = lock.queue.pop_front();

        if self.capacity.is_some() {
            self.not_full.notify_one();
        }

        job
    }

    fn is_full(&self, inner: &QueueInner) -> bool {
        self.capacity.is_some_and(|cap| inner.queue.len() >= cap.get())
    }
}

/// The queue and shutdown flag live under one mutex, otherwise the dispatcher might
/// go to sleep right after the shutdown flag has been set.
#[derive(Default)]
struct QueueInner {
    queue: VecDeque<Job>,
    shutdown: bool,
}
