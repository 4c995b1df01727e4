//! A background task that periodically refreshes a cache.
use std::{sync::Weak, time::Duration};

use async_trait::async_trait;
use rand::{thread_rng, Rng};
use tokio::{sync::watch, task::JoinHandle};

use super::CacheError;

/// A cache that can be refreshed wholesale.
#[async_trait]
pub(crate) trait Refresh: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Refresh the cache. Failures are handled (logged) by the implementation, the refresh task
    /// just tries again on the next tick.
    async fn refresh(&self);
}

/// Configuration for [`RefreshTask`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct RefreshTaskConfig {
    pub interval: Duration,
    pub jitter: Duration,
}

/// A refresh task running on the tokio runtime.
///
/// The task refreshes its cache immediately after start and then every `interval` (minus a
/// random jitter). It only holds a weak reference to the cache and exits once the cache is dropped.
pub(crate) struct RefreshTask {
    join_handle: JoinHandle<()>,

    /// Used to send a stop command to the task.
    stop_sender: watch::Sender<bool>,
}

impl RefreshTask {
    /// Spawn the refresh task.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn start(target: Weak<dyn Refresh>, config: RefreshTaskConfig) -> RefreshTask {
        let (stop_sender, mut stop_receiver) = watch::channel(false);

        let join_handle = tokio::spawn(async move {
            loop {
                {
                    let Some(target) = target.upgrade() else {
                        log::debug!(target: "oddsfeed", "cache dropped, stopping refresh task");
                        return;
                    };
                    log::debug!(target: "oddsfeed", cache = target.name(); "refreshing cache");
                    target.refresh().await;
                }

                let timeout = jitter(config.interval, config.jitter);
                tokio::select! {
                    _ = tokio::time::sleep(timeout) => {
                        // Timed out. Loop back to refresh again.
                    }
                    _ = stop_receiver.changed() => {
                        // Either a stop command or the sender is gone (owner dropped).
                        log::debug!(target: "oddsfeed", "refresh task received stop command");
                        return;
                    }
                }
            }
        });

        RefreshTask {
            join_handle,
            stop_sender,
        }
    }

    /// Stop the refresh task.
    ///
    /// This function does not wait for the task to actually stop.
    pub fn stop(&self) {
        // Error means that the task has already exited, nothing to do then.
        let _ = self.stop_sender.send(true);
    }

    /// Stop the refresh task and wait for it to exit.
    pub async fn shutdown(self) -> Result<(), CacheError> {
        self.stop();
        self.join_handle
            .await
            .map_err(|_| CacheError::RefreshTaskPanicked)
    }
}

/// Apply randomized `jitter` to `interval`.
fn jitter(interval: Duration, jitter: Duration) -> Duration {
    Duration::saturating_sub(interval, thread_rng().gen_range(Duration::ZERO..=jitter))
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Weak,
        },
        time::Duration,
    };

    use async_trait::async_trait;

    use super::{Refresh, RefreshTask, RefreshTaskConfig};

    #[derive(Default)]
    struct Counter(AtomicUsize);

    #[async_trait]
    impl Refresh for Counter {
        fn name(&self) -> &'static str {
            "counter"
        }

        async fn refresh(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    const CONFIG: RefreshTaskConfig = RefreshTaskConfig {
        interval: Duration::from_secs(60),
        jitter: Duration::ZERO,
    };

    #[tokio::test(start_paused = true)]
    async fn refreshes_immediately_and_on_every_tick() {
        let counter = Arc::new(Counter::default());
        let target: Weak<dyn Refresh> = Arc::downgrade(&counter) as Weak<dyn Refresh>;
        let task = RefreshTask::start(target, CONFIG);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(counter.0.load(Ordering::SeqCst), 4);

        task.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stops_on_shutdown() {
        let counter = Arc::new(Counter::default());
        let target: Weak<dyn Refresh> = Arc::downgrade(&counter) as Weak<dyn Refresh>;
        let task = RefreshTask::start(target, CONFIG);

        tokio::time::sleep(Duration::from_secs(1)).await;
        task.shutdown().await.unwrap();

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exits_when_target_is_dropped() {
        let counter = Arc::new(Counter::default());
        let target: Weak<dyn Refresh> = Arc::downgrade(&counter) as Weak<dyn Refresh>;
        let task = RefreshTask::start(target, CONFIG);

        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(counter);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(task.join_handle.is_finished());
    }

    #[test]
    fn jitter_is_subtractive() {
        let interval = Duration::from_secs(30);
        let result = super::jitter(interval, Duration::from_secs(30));
        assert!(result <= interval, "{result:?} must be <= {interval:?}");
    }

    #[test]
    fn jitter_truncates_to_zero() {
        assert_eq!(
            super::jitter(Duration::ZERO, Duration::from_secs(30)),
            Duration::ZERO
        );
    }
}
