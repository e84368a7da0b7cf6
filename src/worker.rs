use crate::{idle::IdleRegistry, ErrorHandler, Job, JobError};
use log::{error, trace};
use parking_lot::{Condvar, Mutex};
use scopeguard::defer;
use std::{
    fmt, io,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread::{self, JoinHandle, ThreadId},
};

/// Sequential worker identifier, starting from zero and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(usize);

impl WorkerId {
    pub(crate) fn new(id: usize) -> Self {
        Self(id)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Thread that executes at most one job at a time and reports back to the idle
/// registry after each one.
pub(crate) struct Worker {
    id: WorkerId,
    shared: Arc<WorkerShared>,
    handle: JoinHandle<()>,
}

struct WorkerShared {
    slot: Mutex<Slot>,
    assigned: Condvar,
}

/// Job slot and running flag are under one mutex so a stop signal can't slip in
/// between the check and the wait.
struct Slot {
    job: Option<Job>,
    busy: bool,
    running: bool,
}

impl Worker {
    pub(crate) fn spawn(
        id: WorkerId,
        name: &str,
        idle: Arc<IdleRegistry>,
        error_handler: Option<ErrorHandler>,
    ) -> io::Result<Self> {
        let shared = Arc::new(WorkerShared {
            slot: Mutex::new(Slot {
                job: None,
                busy: false,
                running: true,
            }),
            assigned: Condvar::new(),
        });

        let handle = thread::Builder::new()
            .name(format!("{name}-worker-{}", id.get()))
            .spawn({
                let shared = Arc::clone(&shared);
                move || Self::worker_loop(id, &shared, &idle, error_handler.as_ref())
            })?;

        trace!("worker {id} created");

        Ok(Self { id, shared, handle })
    }

    pub(crate) fn id(&self) -> WorkerId {
        self.id
    }

    pub(crate) fn thread_id(&self) -> ThreadId {
        self.handle.thread().id()
    }

    /// Hand a job to an idle worker. A busy or stopped worker gives the job back.
    pub(crate) fn assign(&self, job: Job) -> Result<(), Job> {
        let mut slot = self.shared.slot.lock();

        if slot.busy || slot.job.is_some() || !slot.running {
            return Err(job);
        }

        slot.job = Some(job);
        self.shared.assigned.notify_one();

        Ok(())
    }

    /// Ask the worker to exit at its next wait point. A job already in the slot
    /// still runs first.
    pub(crate) fn stop(&self) {
        self.shared.slot.lock().running = false;
        self.shared.assigned.notify_one();
    }

    /// Wait for the worker to finish. If the thread panicked, it returns `false`
    pub(crate) fn join(self) -> bool {
        self.handle.join().is_ok()
    }

    fn worker_loop(
        id: WorkerId,
        shared: &WorkerShared,
        idle: &IdleRegistry,
        error_handler: Option<&ErrorHandler>,
    ) {
        // Give the capacity slot back however the thread ends, unwinding included,
        // so the dispatcher never waits on a dead worker
        defer! {
            idle.retire(id);
            trace!("worker {id} terminated");
        };

        loop {
            let job = {
                let mut slot = shared.slot.lock();

                loop {
                    if let Some(job) = slot.job.take() {
                        slot.busy = true;
                        break job;
                    }

                    if !slot.running {
                        return;
                    }

                    shared.assigned.wait(&mut slot);
                }
            };

            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                let err = JobError::panicked(id, payload);
                error!("{err}");

                if let Some(handler) = error_handler {
                    handler(err);
                }
            }

            shared.slot.lock().busy = false;
            idle.register(id);
        }
    }
}
