use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Tracks every interval and timeout a page starts so they can all be stopped on teardown.
///
/// Only handles registered here are aborted; dropping the registry aborts them too.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    handles: Mutex<Vec<AbortHandle>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `task` on the runtime and tracks it.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task).abort_handle();
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Runs `tick` every `period`, starting one period from now.
    /// A zero period is raised to one millisecond, since tokio rejects it.
    pub fn set_interval<F, Fut>(&self, period: Duration, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = period.max(MIN_PERIOD);
        self.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tick().await;
            }
        });
    }

    /// Runs `task` once after `delay`.
    pub fn set_timeout<F>(&self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
    }

    /// Number of tracked tasks that are still running.
    pub fn active(&self) -> usize {
        let handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles.iter().filter(|h| !h.is_finished()).count()
    }

    /// Aborts every tracked task and forgets them. Returns how many were still running.
    pub fn clear(&self) -> usize {
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        let running = handles.iter().filter(|h| !h.is_finished()).count();
        for handle in handles.drain(..) {
            handle.abort();
        }
        running
    }
}

impl Drop for TaskRegistry {
    fn drop(&mut self) {
        self.clear();
    }
}
