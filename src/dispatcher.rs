use crate::{idle::Acquired, inner::Shared, worker::Worker, Job, JobError};
use log::{debug, error, trace};
use scopeguard::defer;
use std::{
    io,
    sync::Arc,
    thread::{self, JoinHandle},
};

/// Start the thread that pairs queued jobs with idle workers
pub(crate) fn spawn(shared: Arc<Shared>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("{}-dispatcher", shared.name))
        .spawn(move || dispatch_loop(&shared))
}

fn dispatch_loop(shared: &Shared) {
    defer! {
        debug!("dispatcher thread terminated");
    };

    // `take` only gives up once the queue is closed and drained, so every accepted
    // job reaches a worker before this thread exits
    while let Some(job) = shared.job_queue.take() {
        dispatch(shared, job);
    }

    // Nothing left to hand out. Workers finish what they hold and exit, which is
    // all that happens when the pool was abandoned from one of its own threads.
    shared.workers.lock().values().for_each(Worker::stop);
}

fn dispatch(shared: &Shared, mut job: Job) {
    loop {
        let id = match shared.idle.acquire() {
            Acquired::Idle(id) => id,
            Acquired::Vacant(id) => {
                match Worker::spawn(
                    id,
                    &shared.name,
                    Arc::clone(&shared.idle),
                    shared.error_handler.clone(),
                ) {
                    Ok(worker) => {
                        shared.workers.lock().insert(id, worker);
                        id
                    }
                    Err(source) => {
                        shared.idle.retire(id);

                        let err = JobError::SpawnFailed { worker: id, source };
                        error!("{err}");
                        shared.report(err);
                        return;
                    }
                }
            }
        };

        let workers = shared.workers.lock();

        let Some(worker) = workers.get(&id) else {
            error!("idle worker {id} is missing from the pool");
            shared.idle.retire(id);
            continue;
        };

        match worker.assign(job) {
            Ok(()) => {
                trace!("job submitted to worker {}", worker.id());
                return;
            }
            Err(rejected) => {
                error!("worker {id} refused a job, looking for another one");
                job = rejected;
            }
        }
    }
}
