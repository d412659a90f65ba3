//! A fixed-size worker pool with synchronous-handoff submission, in the
//! shape of `workpool.WorkPool`: a bounded job queue drained by a constant
//! number of worker tasks, so a full queue back-pressures the submitter
//! rather than letting work pile up unbounded.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Error returned by [`WorkerPool::submit`] when the pool has already been
/// shut down.
#[derive(Debug, thiserror::Error)]
#[error("worker pool is closed")]
pub struct PoolClosed;

/// A pool of `workers` tasks draining a job queue of capacity 1 — a
/// submission only completes once some worker has accepted the job.
pub struct WorkerPool {
    tx: mpsc::Sender<Job>,
}

impl WorkerPool {
    pub fn new(workers: usize) -> (WorkerPool, Vec<JoinHandle<()>>) {
        let (tx, rx) = mpsc::channel(1);
        let rx = Arc::new(Mutex::new(rx));
        let handles = (0..workers)
            .map(|_| {
                let rx = Arc::clone(&rx);
                lrp_ore::task::spawn(|| "watcher-worker", async move {
                    loop {
                        let job = { rx.lock().await.recv().await };
                        match job {
                            Some(job) => job.await,
                            None => return,
                        }
                    }
                })
            })
            .collect();
        (WorkerPool { tx }, handles)
    }

    /// Hands `job` to the pool, blocking until a worker accepts it.
    pub async fn submit(&self, job: Job) -> Result<(), PoolClosed> {
        self.tx.send(job).await.map_err(|_| PoolClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn runs_submitted_jobs_on_workers() {
        let (pool, handles) = WorkerPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..20 {
            let counter = Arc::clone(&counter);
            pool.submit(Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .await
            .unwrap();
        }
        drop(pool);
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 20);
    }
}
