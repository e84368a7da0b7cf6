use crate::WorkerId;
use log::trace;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

/// Result of asking the registry for a worker
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Acquired {
    /// An existing worker that has no job
    Idle(WorkerId),
    /// The pool has spare capacity: the caller must create a worker with this id.
    /// The slot is already counted as live.
    Vacant(WorkerId),
}

/// Workers currently able to accept a job, plus the bookkeeping needed to grow the
/// pool lazily up to its maximum size.
pub(crate) struct IdleRegistry {
    inner: Mutex<RegistryInner>,
    available: Condvar,
    max_workers: usize,
}

#[derive(Default)]
struct RegistryInner {
    idle: VecDeque<WorkerId>,
    live: usize,
    next_id: usize,
}

impl IdleRegistry {
    pub(crate) fn new(max_workers: usize) -> Self {
        Self {
            inner: Default::default(),
            available: Condvar::new(),
            max_workers,
        }
    }

    /// Put the worker back to the idle queue and wake the dispatcher
    pub(crate) fn register(&self, id: WorkerId) {
        let mut lock = self.inner.lock();
        debug_assert!(!lock.idle.contains(&id), "worker {id} is already idle");
        lock.idle.push_back(id);
        trace!("worker {id} is back to idle pool (idle: {})", lock.idle.len());
        self.available.notify_all();
    }

    /// Take the longest idle worker. If there is none and the pool is below its
    /// maximum size, reserve a slot for a new worker instead. Otherwise sleep until
    /// some worker becomes idle or retires.
    pub(crate) fn acquire(&self) -> Acquired {
        let mut lock = self.inner.lock();

        loop {
            if let Some(id) = lock.idle.pop_front() {
                return Acquired::Idle(id);
            }

            if lock.live < self.max_workers {
                let id = WorkerId::new(lock.next_id);
                lock.next_id += 1;
                lock.live += 1;
                return Acquired::Vacant(id);
            }

            self.available.wait(&mut lock);
        }
    }

    /// Forget the worker and release its capacity slot
    pub(crate) fn retire(&self, id: WorkerId) {
        let mut lock = self.inner.lock();
        lock.idle.retain(|idle| *idle != id);
        lock.live = lock.live.saturating_sub(1);
        self.available.notify_all();
    }

    pub(crate) fn live(&self) -> usize {
        self.inner.lock().live
    }
}
