use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{Notify, Semaphore};

use crate::app::Result;

/// Counts down once per finished unit of work and wakes the waiter at zero.
#[derive(Debug)]
pub struct Countdown {
    remaining: AtomicUsize,
    done: Notify,
}

impl Countdown {
    pub fn new(count: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(count),
            done: Notify::new(),
        }
    }

    /// Record one completion.
    pub fn count_down(&self) {
        let previous = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        if previous == Ok(1) {
            self.done.notify_one();
        }
    }

    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    /// Block until every unit has counted down.
    pub async fn wait(&self) {
        while self.remaining() > 0 {
            self.done.notified().await;
        }
    }
}

/// Counts down when dropped, so a task signals exactly once even if it panics.
struct CompletionGuard(Arc<Countdown>);

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.0.count_down();
    }
}

/// Totals of one `run_all` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Fixed-size pool running one task per item.
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `work` for every item with at most `workers` running at once, and
    /// return once every item has finished.
    ///
    /// Items start in list order. A failing or panicking item is logged and
    /// counted; it never stops the others.
    pub async fn run_all<T, F, Fut>(&self, items: Vec<T>, work: F) -> PoolReport
    where
        T: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let total = items.len();
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let countdown = Arc::new(Countdown::new(total));
        let succeeded = Arc::new(AtomicUsize::new(0));
        let work = Arc::new(work);

        for (index, item) in items.into_iter().enumerate() {
            let guard = CompletionGuard(countdown.clone());
            let semaphore = semaphore.clone();
            let succeeded = succeeded.clone();
            let work = work.clone();

            tokio::spawn(async move {
                let _guard = guard;
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    tracing::error!("Worker pool closed before item {} ran", index);
                    return;
                };

                match work(item).await {
                    Ok(()) => {
                        succeeded.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        tracing::warn!("Item {} failed: {}", index, e);
                    }
                }
            });
        }

        countdown.wait().await;

        let succeeded = succeeded.load(Ordering::Relaxed);
        PoolReport {
            total,
            succeeded,
            failed: total - succeeded,
        }
    }
}
