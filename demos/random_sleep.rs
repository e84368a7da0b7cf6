//! Submits 100 jobs that sleep for a random number of seconds to a pool of 8 workers
//! and waits for all of them before shutting the pool down.
//!
//! Run with `RUST_LOG=trace` to see the pool at work.

use dispool::ThreadPool;
use log::info;
use rand::Rng;
use std::{
    sync::{Arc, Condvar, Mutex},
    thread,
    time::Duration,
};

const JOBS: usize = 100;

fn main() -> dispool::Result<()> {
    env_logger::init();

    let pool = ThreadPool::new(8)?;
    let remaining = Arc::new((Mutex::new(JOBS), Condvar::new()));

    for i in 0..JOBS {
        info!("-> submitting job #{i}");

        let remaining = Arc::clone(&remaining);
        pool.submit(move || {
            let secs = rand::thread_rng().gen_range(1..=10);
            info!("+executing ({i})");
            thread::sleep(Duration::from_secs(secs));
            info!("-executed ({i})");

            let (count, cv) = &*remaining;
            *count.lock().unwrap() -= 1;
            cv.notify_all();
        })?;

        info!("-> job #{i} submitted");
    }

    let (count, cv) = &*remaining;
    let mut left = count.lock().unwrap();
    while *left != 0 {
        info!("*** count: {left}");
        left = cv.wait(left).unwrap();
    }
    drop(left);

    info!("shutting down thread pool...");
    pool.shutdown()?;
    info!("thread pool shut down");

    Ok(())
}
