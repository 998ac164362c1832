use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs a task after a quiet period. Rescheduling cancels the pending timer, never the
/// task itself: once the timer fires the task is spawned on its own and runs to completion.
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn schedule<F>(&mut self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(task);
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    const QUIET: Duration = Duration::from_secs(1);

    fn counting_task(counter: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_schedules_fire_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::default();

        for _ in 0..5 {
            debouncer.schedule(QUIET, counting_task(&counter));
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        // last schedule at t=800ms
        tokio::time::sleep(Duration::from_millis(799)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::default();
        debouncer.schedule(QUIET, counting_task(&counter));
        debouncer.cancel();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_does_not_cancel_running_task() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::default();

        let slow = {
            let counter = counter.clone();
            async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            }
        };
        debouncer.schedule(QUIET, slow);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        // The slow task is in flight; rescheduling only replaces the (finished) timer.
        debouncer.schedule(QUIET, counting_task(&counter));
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
