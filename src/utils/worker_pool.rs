//! Bounded-concurrency fan-out with per-task timeout
//!
//! Both probe kinds and the EPG source fetch need the same shape of work:
//! "run one task per item, at most C in flight, each task on its own clock,
//! collect everything before moving on." This is the one abstraction for it,
//! parameterized by concurrency limit and task timeout.

use std::future::Future;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::timeout;
use tracing::debug;

pub struct WorkerPool {
    concurrency: usize,
    task_timeout: Duration,
}

impl WorkerPool {
    pub fn new(concurrency: usize, task_timeout: Duration) -> Self {
        Self {
            concurrency: concurrency.max(1),
            task_timeout,
        }
    }

    /// Fan out one task per item. Results come back in a `Vec` indexed by the
    /// item's original position, regardless of completion order; a timed-out
    /// or failed task leaves `None` in its slot and never blocks the batch.
    pub async fn run<T, R, F, Fut, E>(&self, items: Vec<T>, task: F) -> Vec<Option<R>>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: std::fmt::Display,
    {
        let total = items.len();
        let mut slots: Vec<Option<R>> = Vec::with_capacity(total);
        slots.resize_with(total, || None);

        let task_timeout = self.task_timeout;
        let mut results = stream::iter(items.into_iter().enumerate().map(|(index, item)| {
            let fut = task(item);
            async move {
                let outcome = match timeout(task_timeout, fut).await {
                    Ok(Ok(result)) => Some(result),
                    Ok(Err(e)) => {
                        debug!("Task {}/{} failed: {}", index + 1, total, e);
                        None
                    }
                    Err(_) => {
                        debug!(
                            "Task {}/{} timed out after {:?}",
                            index + 1,
                            total,
                            task_timeout
                        );
                        None
                    }
                };
                (index, outcome)
            }
        }))
        .buffer_unordered(self.concurrency);

        while let Some((index, outcome)) = results.next().await {
            slots[index] = outcome;
        }

        slots
    }
}
