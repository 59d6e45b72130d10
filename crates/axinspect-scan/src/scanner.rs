//! Stack-based accessibility tree scanner.

use std::time::Instant;

use tokio::sync::broadcast;
use tracing::debug;

use axinspect_core::{
    AccessibleNode, AncestryPath, InspectConfig, NodeSnapshot, ScanError, Snapshot,
};

use crate::progress::ScanProgress;

/// Number of visited objects between progress updates.
const PROGRESS_EVERY: u64 = 100;

/// Scanner producing pre-order snapshots of visible objects.
pub struct TreeScanner {
    progress_tx: broadcast::Sender<ScanProgress>,
}

impl TreeScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self { progress_tx }
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Sender used for progress updates, shared with the heartbeat task.
    pub fn progress_sender(&self) -> broadcast::Sender<ScanProgress> {
        self.progress_tx.clone()
    }

    /// Scan the tree below `root`.
    ///
    /// The first entry is the root itself. A child is entered only when it
    /// has a non-degenerate bounding box and no invisible state; its path
    /// index counts every child, skipped or not. Document objects are not
    /// entered unless the config allows it. Any failed attribute read aborts
    /// the scan.
    pub fn scan<N: AccessibleNode>(
        &self,
        root: &N,
        config: &InspectConfig,
    ) -> Result<Snapshot<N>, ScanError> {
        let start = Instant::now();
        let app_name = root
            .app_name()
            .map_err(|e| ScanError::node(&AncestryPath::root(), e))?;

        let mut nodes: Vec<NodeSnapshot> = Vec::new();
        let mut stack: Vec<(N, AncestryPath)> = vec![(root.clone(), AncestryPath::root())];

        while let Some((node, path)) = stack.pop() {
            let entry = NodeSnapshot::capture(&node, path.clone())
                .map_err(|e| ScanError::node(&path, e))?;
            let descend = config.should_descend(entry.role);
            nodes.push(entry);
            self.report(nodes.len() as u64, &path, start);

            if !descend {
                continue;
            }

            let children = node.children().map_err(|e| ScanError::node(&path, e))?;
            let mut visible = Vec::with_capacity(children.len());
            for (index, child) in children.into_iter().enumerate() {
                let child_path = path.child(index);
                let shown = child
                    .is_visible()
                    .map_err(|e| ScanError::node(&child_path, e))?;
                if shown {
                    visible.push((child, child_path));
                }
            }

            // Reversed so the lowest index is visited first.
            stack.extend(visible.into_iter().rev());
        }

        let scan_duration = start.elapsed();
        debug!(
            nodes = nodes.len(),
            elapsed_ms = scan_duration.as_millis() as u64,
            "scan finished"
        );
        let _ = self.progress_tx.send(ScanProgress::Finished {
            nodes_visited: nodes.len() as u64,
            elapsed: scan_duration,
        });

        Ok(Snapshot::new(root.clone(), nodes, app_name, scan_duration))
    }

    fn report(&self, visited: u64, path: &AncestryPath, start: Instant) {
        if visited % PROGRESS_EVERY == 0 {
            let _ = self.progress_tx.send(ScanProgress::Visited {
                nodes_visited: visited,
                current_path: path.clone(),
                elapsed: start.elapsed(),
            });
        }
    }
}

impl Default for TreeScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axinspect_core::memory::{MemoryNode, MemoryTree, NodeSpec};
    use axinspect_core::{Bounds, NodeError, Role, State};

    fn create_test_tree() -> MemoryNode {
        MemoryTree::build(
            "editor",
            NodeSpec::visible(Role::Window).named("Editor").with_children(vec![
                // 0: hidden menu bar, skipped with its subtree
                NodeSpec::visible(Role::MenuBar)
                    .with_state(State::Invisible)
                    .with_children(vec![NodeSpec::visible(Role::MenuItem).named("File")]),
                // 1: tool bar
                NodeSpec::visible(Role::ToolBar).with_children(vec![
                    NodeSpec::new(Role::Button).named("Offscreen"),
                    NodeSpec::visible(Role::Button).named("Save"),
                ]),
                // 2: zero-size pane, skipped
                NodeSpec::new(Role::Pane).at(Bounds::default()),
                // 3: document
                NodeSpec::visible(Role::Document).named("Body").with_children(vec![
                    NodeSpec::visible(Role::Paragraph).with_value("Hello"),
                ]),
                // 4: status bar
                NodeSpec::visible(Role::StatusBar).named("Ready"),
            ]),
        )
    }

    fn paths(snapshot: &Snapshot<MemoryNode>) -> Vec<Vec<usize>> {
        snapshot.iter().map(|n| n.path.as_slice().to_vec()).collect()
    }

    #[test]
    fn test_basic_scan() {
        let root = create_test_tree();
        let snapshot = TreeScanner::new()
            .scan(&root, &InspectConfig::default())
            .unwrap();

        assert_eq!(
            paths(&snapshot),
            vec![vec![], vec![1], vec![1, 1], vec![3], vec![4]]
        );
        assert_eq!(snapshot.get(0).unwrap().caption, "window, Editor");
        assert_eq!(snapshot.get(2).unwrap().caption, "button, Save");
        assert_eq!(snapshot.app_name(), "editor");
    }

    #[test]
    fn test_drill_into_documents() {
        let root = create_test_tree();
        let config = InspectConfig::builder()
            .drill_into_documents(true)
            .build()
            .unwrap();
        let snapshot = TreeScanner::new().scan(&root, &config).unwrap();

        assert_eq!(
            paths(&snapshot),
            vec![vec![], vec![1], vec![1, 1], vec![3], vec![3, 0], vec![4]]
        );
        assert_eq!(snapshot.get(4).unwrap().caption, "paragraph, Hello");
    }

    #[test]
    fn test_rescan_is_stable() {
        let root = create_test_tree();
        let scanner = TreeScanner::new();
        let first = scanner.scan(&root, &InspectConfig::default()).unwrap();
        let second = scanner.scan(&root, &InspectConfig::default()).unwrap();
        assert_eq!(first.nodes(), second.nodes());
    }

    #[test]
    fn test_faulty_node_aborts_scan() {
        let root = MemoryTree::build(
            "app",
            NodeSpec::visible(Role::Window).with_children(vec![
                NodeSpec::visible(Role::Pane).with_children(vec![
                    NodeSpec::visible(Role::Button),
                    NodeSpec::visible(Role::Button).faulty(),
                ]),
            ]),
        );
        let err = TreeScanner::new()
            .scan(&root, &InspectConfig::default())
            .unwrap_err();

        match err {
            ScanError::NodeAccess { path, source } => {
                assert_eq!(path, AncestryPath::from(vec![0, 1]));
                assert!(matches!(source, NodeError::Unavailable { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_root_document_not_entered() {
        let root = MemoryTree::build(
            "browser",
            NodeSpec::visible(Role::Document).with_children(vec![NodeSpec::visible(Role::Link)]),
        );
        let snapshot = TreeScanner::new()
            .scan(&root, &InspectConfig::default())
            .unwrap();
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_finished_progress_sent() {
        let scanner = TreeScanner::new();
        let mut rx = scanner.subscribe();
        let root = create_test_tree();
        scanner.scan(&root, &InspectConfig::default()).unwrap();

        match rx.try_recv().unwrap() {
            ScanProgress::Finished { nodes_visited, .. } => assert_eq!(nodes_visited, 5),
            other => panic!("unexpected progress: {other:?}"),
        }
    }
}
