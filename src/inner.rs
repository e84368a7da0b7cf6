use crate::{
    dispatcher, idle::IdleRegistry, queue::JobQueue, worker::Worker, Backpressure, ErrorHandler,
    Job, JobError, PoolError, WorkerId,
};
use log::{debug, error};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    mem,
    num::NonZeroUsize,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

/// State shared between the pool handle and the dispatcher thread
pub(crate) struct Shared {
    pub(crate) name: String,
    pub(crate) job_queue: JobQueue,
    pub(crate) idle: Arc<IdleRegistry>,
    pub(crate) workers: Mutex<HashMap<WorkerId, Worker>>,
    pub(crate) error_handler: Option<ErrorHandler>,
}

impl Shared {
    pub(crate) fn report(&self, err: JobError) {
        if let Some(handler) = &self.error_handler {
            handler(err);
        }
    }
}

pub(crate) struct Inner {
    shared: Arc<Shared>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    running: AtomicBool,
    max_workers: usize,
}

pub(crate) struct Config {
    pub(crate) name: String,
    pub(crate) max_workers: NonZeroUsize,
    pub(crate) queue_capacity: Option<NonZeroUsize>,
    pub(crate) backpressure: Backpressure,
    pub(crate) error_handler: Option<ErrorHandler>,
}

impl Inner {
    /// Start the dispatcher. Workers are created later, when jobs need them.
    pub(crate) fn new(config: Config) -> Result<Arc<Self>, PoolError> {
        let max_workers = config.max_workers.get();

        let shared = Arc::new(Shared {
            name: config.name,
            job_queue: JobQueue::new(config.queue_capacity, config.backpressure),
            idle: Arc::new(IdleRegistry::new(max_workers)),
            workers: Mutex::new(HashMap::new()),
            error_handler: config.error_handler,
        });

        let dispatcher = dispatcher::spawn(Arc::clone(&shared))?;

        debug!(
            "thread pool {} started (max workers: {max_workers})",
            shared.name
        );

        Ok(Arc::new(Self {
            shared,
            dispatcher: Mutex::new(Some(dispatcher)),
            running: AtomicBool::new(true),
            max_workers,
        }))
    }

    pub(crate) fn submit(&self, job: Job) -> Result<(), PoolError> {
        if !self.is_running() {
            return Err(PoolError::Closed);
        }

        self.shared.job_queue.add(job)
    }

    /// Close the queue, let the dispatcher hand out what is left, then stop and
    /// join every worker.
    ///
    /// Joining from a pool thread would wait on itself, so it's refused there and the
    /// pool keeps running.
    pub(crate) fn shutdown(&self) -> Result<(), PoolError> {
        if self.on_pool_thread() {
            return Err(PoolError::ShutdownFromPoolThread);
        }

        if !self.running.swap(false, Ordering::AcqRel) {
            return Err(PoolError::AlreadyShutdown);
        }

        self.shared.job_queue.shutdown();

        let mut panicked = 0;

        if let Some(dispatcher) = self.dispatcher.lock().take() {
            if dispatcher.join().is_err() {
                panicked += 1;
            }
        }

        // The dispatcher is gone, nobody touches the arena anymore
        let workers = mem::take(&mut *self.shared.workers.lock());

        workers.values().for_each(Worker::stop);

        workers.into_values().for_each(|worker| {
            if !worker.join() {
                panicked += 1;
            }
        });

        debug!("thread pool {} shutdown completed", self.shared.name);

        if panicked == 0 {
            Ok(())
        } else {
            Err(PoolError::PanickedThreads(panicked))
        }
    }

    /// Close the queue and leave the threads detached. The dispatcher still hands
    /// out every queued job and then stops the workers.
    fn abandon(&self) {
        self.running.store(false, Ordering::Release);
        self.shared.job_queue.shutdown();
        self.dispatcher.lock().take();

        debug!(
            "thread pool {} abandoned from its own thread, threads left detached",
            self.shared.name
        );
    }

    fn on_pool_thread(&self) -> bool {
        let current = thread::current().id();

        let on_dispatcher = self
            .dispatcher
            .lock()
            .as_ref()
            .is_some_and(|d| d.thread().id() == current);

        on_dispatcher
            || self
                .shared
                .workers
                .lock()
                .values()
                .any(|w| w.thread_id() == current)
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub(crate) fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub(crate) fn worker_count(&self) -> usize {
        self.shared.idle.live()
    }

    pub(crate) fn queued_jobs(&self) -> usize {
        self.shared.job_queue.len()
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if !self.is_running() {
            return;
        }

        if self.on_pool_thread() {
            self.abandon();
            return;
        }

        if let Err(err) = self.shutdown() {
            error!("thread pool {} shutdown on drop: {err}", self.shared.name);
        }
    }
}
