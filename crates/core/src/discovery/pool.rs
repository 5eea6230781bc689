//! Bounded fan-out with one result per unit of work.
//!
//! Every unit runs to completion; a failure or panic in one never cancels
//! its siblings. Reports come back in input order.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::Error;

/// Outcome of one unit of work.
#[derive(Debug)]
pub struct TaskReport<R> {
    pub label: String,
    pub outcome: Result<R, Error>,
}

/// Run `work` over `items` with at most `limit` in flight.
pub async fn fan_out<T, R, F, Fut>(items: Vec<(String, T)>, limit: usize, work: F) -> Vec<TaskReport<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, Error>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let mut join_set = JoinSet::new();
    let mut pending = HashMap::new();
    let mut reports: Vec<(usize, TaskReport<R>)> = Vec::with_capacity(items.len());

    for (idx, (label, item)) in items.into_iter().enumerate() {
        let permit = match semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                reports.push((idx, TaskReport { label, outcome: Err(Error::Internal(e.to_string())) }));
                continue;
            }
        };

        let task = work(item);
        let handle = join_set.spawn(async move {
            let _permit = permit;
            task.await
        });
        pending.insert(handle.id(), (idx, label));
    }

    while let Some(joined) = join_set.join_next_with_id().await {
        let (id, outcome) = match joined {
            Ok((id, outcome)) => (id, outcome),
            Err(e) => (e.id(), Err(Error::Internal(format!("task failed: {e}")))),
        };
        if let Some((idx, label)) = pending.remove(&id) {
            reports.push((idx, TaskReport { label, outcome }));
        }
    }

    reports.sort_by_key(|(idx, _)| *idx);
    reports.into_iter().map(|(_, report)| report).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let items = vec![("a".to_string(), 1), ("b".to_string(), 2), ("c".to_string(), 3)];
        let reports = fan_out(items, 2, |n| async move {
            if n == 2 { Err(Error::SearchFailed("boom".into())) } else { Ok(n * 10) }
        })
        .await;

        let labels: Vec<&str> = reports.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);
        assert_eq!(reports[0].outcome.as_ref().unwrap(), &10);
        assert!(reports[1].outcome.is_err());
        assert_eq!(reports[2].outcome.as_ref().unwrap(), &30);
    }

    #[tokio::test]
    async fn test_respects_limit() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let items: Vec<_> = (0..12).map(|i| (format!("t{i}"), i)).collect();
        let reports = fan_out(items, 3, |_| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await;

        assert_eq!(reports.len(), 12);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let items = vec![("ok".to_string(), false), ("panics".to_string(), true)];
        let reports = fan_out(items, 2, |explode| async move {
            if explode {
                panic!("unit of work panicked");
            }
            Ok(1)
        })
        .await;

        assert!(reports[0].outcome.is_ok());
        assert!(matches!(reports[1].outcome, Err(Error::Internal(_))));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let reports = fan_out(Vec::<(String, ())>::new(), 5, |_| async { Ok(()) }).await;
        assert!(reports.is_empty());
    }
}
