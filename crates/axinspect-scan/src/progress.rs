//! Scan progress reporting.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use axinspect_core::AncestryPath;

/// Progress information during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanProgress {
    /// Periodic count of visited objects.
    Visited {
        nodes_visited: u64,
        current_path: AncestryPath,
        elapsed: Duration,
    },
    /// The scan is still running ("Searching...").
    StillWorking { elapsed: Duration },
    /// The scan completed.
    Finished {
        nodes_visited: u64,
        elapsed: Duration,
    },
}

impl ScanProgress {
    /// Message announced to the user for this update, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::StillWorking { .. } => Some("Searching...".to_string()),
            Self::Finished { nodes_visited, .. } => Some(format!("{nodes_visited} items")),
            Self::Visited { .. } => None,
        }
    }
}

/// Background task emitting [`ScanProgress::StillWorking`] while a scan runs.
///
/// The first notification comes after `delay`, further ones every `interval`.
/// The task shares nothing with the scan but its cancellation token; callers
/// must [`stop`](Heartbeat::stop) it before using the scan result.
pub struct Heartbeat {
    cancel: CancellationToken,
    handle: JoinHandle<u64>,
}

impl Heartbeat {
    /// Spawn the heartbeat on the current tokio runtime.
    pub fn spawn(
        progress_tx: broadcast::Sender<ScanProgress>,
        delay: Duration,
        interval: Duration,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let start = Instant::now();
            let mut pings = 0u64;

            tokio::select! {
                biased;
                _ = token.cancelled() => return pings,
                _ = tokio::time::sleep(delay) => {}
            }

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        pings += 1;
                        let _ = progress_tx.send(ScanProgress::StillWorking {
                            elapsed: start.elapsed(),
                        });
                    }
                }
            }
            pings
        });

        Self { cancel, handle }
    }

    /// Signal the task to stop and wait for it.
    ///
    /// Returns the number of notifications sent.
    pub async fn stop(self) -> u64 {
        self.cancel.cancel();
        let pings = self.handle.await.unwrap_or_default();
        debug!(pings, "heartbeat stopped");
        pings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_schedule() {
        let (tx, mut rx) = broadcast::channel(16);
        let heartbeat = Heartbeat::spawn(
            tx,
            Duration::from_millis(2000),
            Duration::from_millis(1500),
        );

        // Pings at 2.0s, 3.5s and 5.0s.
        tokio::time::sleep(Duration::from_millis(5100)).await;
        assert_eq!(heartbeat.stop().await, 3);

        let mut received = 0;
        while let Ok(progress) = rx.try_recv() {
            assert!(matches!(progress, ScanProgress::StillWorking { .. }));
            received += 1;
        }
        assert_eq!(received, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_stopped_before_delay() {
        let (tx, mut rx) = broadcast::channel(16);
        let heartbeat = Heartbeat::spawn(tx, Duration::from_secs(2), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(heartbeat.stop().await, 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_progress_message() {
        let still = ScanProgress::StillWorking {
            elapsed: Duration::ZERO,
        };
        assert_eq!(still.message().as_deref(), Some("Searching..."));

        let visited = ScanProgress::Visited {
            nodes_visited: 100,
            current_path: AncestryPath::root(),
            elapsed: Duration::ZERO,
        };
        assert_eq!(visited.message(), None);
    }
}
