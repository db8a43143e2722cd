//! Background list refresh.

use super::session_client::SessionClient;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle to a running poller.
///
/// [`stop`](Self::stop) cancels the task and waits for it to finish.
/// Dropping the handle cancels it as well, so a poller never outlives its
/// owner. Detaching the client also stops every poller it started.
pub struct PollerHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub(crate) fn spawn(client: SessionClient, period: Duration, token: CancellationToken) -> Self {
        // A zero period would make `interval` panic.
        let period = period.max(Duration::from_millis(1));
        let task_token = token.clone();

        let task = tokio::spawn(async move {
            debug!(?period, "Document poller started");
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                // An in-flight refresh is dropped on stop; its sequence
                // number is simply never applied.
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    result = client.refresh() => {
                        if let Err(e) = result {
                            debug!("Poll refresh failed: {}", e);
                        }
                    }
                }
            }
            debug!("Document poller stopped");
        });

        Self {
            token,
            task: Some(task),
        }
    }

    /// Cancel the poller and wait until its task has exited.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
