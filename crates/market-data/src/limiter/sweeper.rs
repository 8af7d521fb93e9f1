use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::RateLimiter;

/// Handle to a background task that evicts idle buckets.
///
/// The task stops when [`shutdown`](Self::shutdown) is awaited, when the
/// handle is dropped, or when the limiter it sweeps has been dropped.
pub struct SweeperHandle {
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Signal the task to stop and wait for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl RateLimiter {
    /// Spawn a task that calls [`sweep_idle`](Self::sweep_idle) every `every`.
    ///
    /// The task holds only a weak reference, so it never keeps the limiter
    /// alive. Must be called from within a Tokio runtime.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration, idle: Duration) -> SweeperHandle {
        let limiter = Arc::downgrade(self);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let Some(limiter) = limiter.upgrade() else {
                            break;
                        };
                        let removed = limiter.sweep_idle(idle);
                        if removed > 0 {
                            debug!("Rate limiter sweep removed {} idle buckets", removed);
                        }
                    }
                }
            }
        });

        SweeperHandle {
            stop: Some(stop_tx),
            task: Some(task),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limiter::RateLimitConfig;

    #[tokio::test]
    async fn test_sweeper_evicts_idle_buckets() {
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig::new(30, 60)));
        limiter.consume_token("client-a");
        limiter.consume_token("client-b");
        assert_eq!(limiter.bucket_count(), 2);

        let handle = limiter.spawn_sweeper(Duration::from_millis(10), Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(limiter.bucket_count(), 0);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_sweeper_keeps_recent_buckets() {
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig::new(30, 60)));
        limiter.consume_token("client-a");

        let handle = limiter.spawn_sweeper(Duration::from_millis(10), Duration::from_secs(300));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(limiter.bucket_count(), 1);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_sweeper_stops_when_limiter_dropped() {
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig::new(30, 60)));
        let handle = limiter.spawn_sweeper(Duration::from_millis(10), Duration::from_secs(300));

        drop(limiter);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(handle.is_finished());
    }

    #[tokio::test]
    async fn test_shutdown_completes() {
        let limiter = Arc::new(RateLimiter::default());
        let handle = limiter.spawn_sweeper(Duration::from_secs(300), Duration::from_secs(300));
        assert!(!handle.is_finished());

        tokio::time::timeout(Duration::from_secs(1), handle.shutdown())
            .await
            .expect("sweeper did not stop");
    }
}
