//! Background scan and favorite tagging.

use std::sync::Arc;

use indexmap::IndexSet;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use axinspect_analyze::{IdentityHasher, StableId};
use axinspect_core::{AccessibleNode, AncestryPath, InspectConfig, ScanError, Snapshot};
use axinspect_scan::{Heartbeat, TreeScanner};

/// Result of a favorite tagging pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagOutcome {
    /// Snapshot indices whose identifier is in the favorite set.
    pub favorite_indices: Vec<usize>,
    /// Entries that could not be identified against the live tree.
    pub unidentifiable: usize,
}

/// Run a scan on a blocking task while a heartbeat reports "Searching...".
///
/// The heartbeat is stopped and joined before the result is returned.
pub async fn run_scan<N: AccessibleNode>(
    scanner: Arc<TreeScanner>,
    root: N,
    config: InspectConfig,
) -> Result<Snapshot<N>, ScanError> {
    let heartbeat = Heartbeat::spawn(
        scanner.progress_sender(),
        config.heartbeat_delay(),
        config.heartbeat_interval(),
    );

    let result = tokio::task::spawn_blocking(move || scanner.scan(&root, &config))
        .await
        .unwrap_or_else(|e| {
            Err(ScanError::Task {
                message: e.to_string(),
            })
        });

    let pings = heartbeat.stop().await;
    if let Err(err) = &result {
        warn!(error = %err, pings, "scan failed");
    }
    result
}

/// Identify every snapshot entry on a blocking task and report which ones
/// are favorites.
///
/// The task works on its own copy of the paths and identifier set; the join
/// handle is the completion signal.
pub fn spawn_tagging<N: AccessibleNode>(
    snapshot: &Snapshot<N>,
    favorites: IndexSet<StableId>,
) -> JoinHandle<TagOutcome> {
    let root = snapshot.root().clone();
    let paths: Vec<AncestryPath> = snapshot.iter().map(|node| node.path.clone()).collect();

    tokio::task::spawn_blocking(move || {
        if favorites.is_empty() {
            return TagOutcome::default();
        }

        let hasher = IdentityHasher::new();
        let mut outcome = TagOutcome::default();
        for (index, path) in paths.iter().enumerate() {
            match hasher.identify_path(&root, path) {
                Ok(id) if favorites.contains(&id) => outcome.favorite_indices.push(index),
                Ok(_) => {}
                Err(err) => {
                    debug!(%path, error = %err, "entry can not be identified");
                    outcome.unidentifiable += 1;
                }
            }
        }
        outcome
    })
}
