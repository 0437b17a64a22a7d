//! Debouncing keyed by a logical operation.
//!
//! Each key owns at most one pending task. Scheduling again for the same key
//! aborts the pending task and restarts the quiet period, while tasks for
//! different keys never wait on each other.

use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;

/// Pending task handle tagged with the generation that scheduled it.
type PendingMap<K> = Arc<DashMap<K, (u64, JoinHandle<()>)>>;

/// Debouncer that collapses bursts of work per key.
pub struct KeyedDebouncer<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    delay: Duration,
    generation: AtomicU64,
    pending: PendingMap<K>,
}

impl<K> KeyedDebouncer<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    /// Create a debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: AtomicU64::new(0),
            pending: Arc::new(DashMap::new()),
        }
    }

    /// Run `task` once `key` has been quiet for the configured delay.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, key: K, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Some((_, (_, handle))) = self.pending.remove(&key) {
            handle.abort();
            tracing::trace!("debounce: restarted quiet period");
        }

        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let pending = Arc::clone(&self.pending);
        let delay = self.delay;
        let task_key = key.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // A newer generation may already own the slot.
            pending.remove_if(&task_key, |_, (owner, _)| *owner == generation);
            task.await;
        });

        self.pending.insert(key, (generation, handle));
    }

    /// Whether a task for `key` is still waiting out its quiet period.
    pub fn is_pending(&self, key: &K) -> bool {
        self.pending
            .get(key)
            .is_some_and(|entry| !entry.value().1.is_finished())
    }

    /// Number of keys with a task still waiting.
    pub fn pending_count(&self) -> usize {
        self.pending
            .iter()
            .filter(|entry| !entry.value().1.is_finished())
            .count()
    }

    /// Abort every pending task.
    pub fn cancel_all(&self) {
        self.pending.retain(|_, (_, handle)| {
            handle.abort();
            false
        });
    }
}

impl<K> Drop for KeyedDebouncer<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_schedules_collapse() {
        let debouncer = KeyedDebouncer::new(Duration::from_millis(500));
        let runs = counter();

        for _ in 0..5 {
            let runs = Arc::clone(&runs);
            debouncer.schedule("package.json", async move {
                runs.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        assert_eq!(runs.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(debouncer.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_keys_do_not_block_each_other() {
        let debouncer = KeyedDebouncer::new(Duration::from_millis(300));
        let runs = counter();

        for key in ["a/package.json", "b/package.json"] {
            let runs = Arc::clone(&runs);
            debouncer.schedule(key, async move {
                runs.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert!(debouncer.is_pending(&"a/package.json"));
        assert!(debouncer.is_pending(&"b/package.json"));
        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all() {
        let debouncer = KeyedDebouncer::new(Duration::from_millis(300));
        let runs = counter();

        let task_runs = Arc::clone(&runs);
        debouncer.schedule(1u32, async move {
            task_runs.fetch_add(1, Ordering::SeqCst);
        });
        debouncer.cancel_all();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(debouncer.pending_count(), 0);
    }
}
