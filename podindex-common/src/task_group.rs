//! Bounded task group for parallel fetches
//!
//! Tasks are queued with a key, then [`TaskGroup::join`] runs them on the
//! tokio runtime with at most `min(max_workers, queued tasks)` in flight and
//! waits for all of them. Outcomes arrive in completion order. Each task
//! reports its own outcome; one failing task does not cancel the others.

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use std::future::Future;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a task produced no value
#[derive(Debug, Error)]
pub enum TaskError<E> {
    /// The task ran and returned an error
    #[error("task failed: {0}")]
    Failed(E),

    /// The task panicked or was aborted
    #[error("task aborted: {0}")]
    Aborted(String),
}

/// Result of one task, tagged with the key it was spawned under
#[derive(Debug)]
pub struct TaskOutcome<K, T, E> {
    pub key: K,
    pub result: Result<T, TaskError<E>>,
}

/// Group of keyed fallible tasks with bounded concurrency
pub struct TaskGroup<K, T, E> {
    max_workers: usize,
    tasks: Vec<(K, BoxFuture<'static, Result<T, E>>)>,
}

impl<K, T, E> TaskGroup<K, T, E>
where
    K: Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    /// `max_workers` of 0 is treated as 1
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            tasks: Vec::new(),
        }
    }

    /// Queue a task; nothing runs until [`join`](Self::join)
    pub fn spawn<F>(&mut self, key: K, task: F)
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.tasks.push((key, Box::pin(task)));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Effective worker count for the queued tasks
    pub fn worker_count(&self) -> usize {
        self.max_workers.min(self.tasks.len()).max(1)
    }

    /// Run every queued task and wait for all outcomes, in completion order
    pub async fn join(self) -> Vec<TaskOutcome<K, T, E>> {
        let workers = self.worker_count();
        debug!(tasks = self.tasks.len(), workers, "Starting task group");

        // boxed so callers hold a plain Send future rather than the nested
        // closure types, which trip rustc's higher-ranked Send inference
        // (rust-lang/rust#102211)
        let outcomes: BoxFuture<'static, Vec<TaskOutcome<K, T, E>>> = Box::pin(
            stream::iter(self.tasks)
                .map(|(key, task)| async move {
                    // spawned so a panic stays inside its own task
                    let result = match tokio::spawn(task).await {
                        Ok(Ok(value)) => Ok(value),
                        Ok(Err(e)) => Err(TaskError::Failed(e)),
                        Err(join_error) => {
                            warn!(error = %join_error, "Task in group aborted");
                            Err(TaskError::Aborted(join_error.to_string()))
                        }
                    };
                    TaskOutcome { key, result }
                })
                .buffer_unordered(workers)
                .collect(),
        );
        outcomes.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn outcome<'a, K: PartialEq, T, E>(
        outcomes: &'a [TaskOutcome<K, T, E>],
        key: &K,
    ) -> &'a TaskOutcome<K, T, E> {
        outcomes.iter().find(|o| &o.key == key).unwrap()
    }

    #[tokio::test]
    async fn test_all_outcomes_reported_with_keys() {
        let mut group: TaskGroup<String, u32, String> = TaskGroup::new(4);
        group.spawn("ok".to_string(), async { Ok(1) });
        group.spawn("bad".to_string(), async { Err("remote down".to_string()) });
        group.spawn("ok2".to_string(), async { Ok(2) });

        let outcomes = group.join().await;
        assert_eq!(outcomes.len(), 3);
        let ok = outcome(&outcomes, &"ok".to_string());
        assert_eq!(ok.result.as_ref().ok(), Some(&1));
        let bad = outcome(&outcomes, &"bad".to_string());
        assert!(matches!(bad.result, Err(TaskError::Failed(ref e)) if e == "remote down"));
        let ok2 = outcome(&outcomes, &"ok2".to_string());
        assert_eq!(ok2.result.as_ref().ok(), Some(&2));
    }

    #[tokio::test]
    async fn test_panicking_task_is_isolated() {
        let mut group: TaskGroup<u8, u8, ()> = TaskGroup::new(2);
        group.spawn(1, async {
            let explode = true;
            if explode {
                panic!("worker exploded");
            }
            Ok(1)
        });
        group.spawn(2, async { Ok(2) });

        let outcomes = group.join().await;
        assert!(matches!(outcome(&outcomes, &1).result, Err(TaskError::Aborted(_))));
        assert_eq!(outcome(&outcomes, &2).result.as_ref().ok(), Some(&2));
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let mut group: TaskGroup<usize, (), ()> = TaskGroup::new(3);

        for i in 0..10 {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            group.spawn(i, async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            });
        }

        assert_eq!(group.worker_count(), 3);
        let outcomes = group.join().await;
        assert_eq!(outcomes.len(), 10);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_outcomes_follow_completion_order() {
        let mut group: TaskGroup<&'static str, (), ()> = TaskGroup::new(2);
        group.spawn("slow", async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(())
        });
        group.spawn("fast", async { Ok(()) });

        let keys: Vec<_> = group.join().await.into_iter().map(|o| o.key).collect();
        assert_eq!(keys, vec!["fast", "slow"]);
    }

    #[test]
    fn test_worker_count_capped_by_tasks() {
        let mut group: TaskGroup<u8, (), ()> = TaskGroup::new(16);
        group.spawn(1, async { Ok(()) });
        group.spawn(2, async { Ok(()) });
        assert_eq!(group.worker_count(), 2);

        let empty: TaskGroup<u8, (), ()> = TaskGroup::new(0);
        assert_eq!(empty.worker_count(), 1);
    }
}
