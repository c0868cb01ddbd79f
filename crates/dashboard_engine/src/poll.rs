//! Fixed-interval re-invocation of an async operation.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use dashboard_logging::{dash_debug, dash_warn};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Invokes an operation immediately and then once per interval until stopped.
///
/// Each invocation runs as its own task, so a slow invocation may still be in
/// flight when the next one starts. A failing invocation is logged and the
/// loop carries on.
#[derive(Debug, Clone)]
pub struct PollLoop {
    name: String,
    interval: Duration,
}

impl PollLoop {
    pub fn new(name: impl Into<String>, interval: Duration) -> Self {
        Self {
            name: name.into(),
            // tokio panics on a zero period.
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn spawn<F, Fut, E>(self, runtime: &Handle, mut op: F) -> PollHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let token = CancellationToken::new();
        let loop_token = token.clone();
        let spawner = runtime.clone();
        let PollLoop { name, interval } = self;

        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut tick: u64 = 0;

            loop {
                tokio::select! {
                    biased;
                    _ = loop_token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if loop_token.is_cancelled() {
                    break;
                }

                tick += 1;
                let invocation = op();
                let name = name.clone();
                spawner.spawn(async move {
                    if let Err(err) = invocation.await {
                        dash_warn!("Poll '{}' tick {} failed: {}", name, tick, err);
                    }
                });
            }

            dash_debug!("Poll '{}' stopped after {} ticks", name, tick);
        });

        PollHandle { token, task }
    }
}

/// Owner of a running poll loop. Dropping it stops the loop.
#[derive(Debug)]
pub struct PollHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Cancels the pending timer. An invocation already in flight may finish,
    /// but no new one starts.
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// True once the timer task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
