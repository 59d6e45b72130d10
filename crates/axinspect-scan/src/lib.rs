//! Accessibility tree scanning engine for axinspect.
//!
//! This crate walks the live object tree of a foreground window and produces
//! a flat, ordered [`Snapshot`].
//!
//! # Overview
//!
//! - **Pre-order traversal** with an explicit work stack
//! - **Visibility filtering**: children without a real bounding box or
//!   flagged invisible are skipped, together with their subtrees
//! - **Stable addressing**: every entry carries the child indices leading to
//!   it, counted over all children
//! - **Progress updates** via broadcast channels, plus a heartbeat task
//!   for "still searching" notifications
//!
//! # Example
//!
//! ```rust,no_run
//! use axinspect_core::memory::MemoryTree;
//! use axinspect_scan::{InspectConfig, TreeScanner};
//!
//! let root = MemoryTree::load("window.json").unwrap();
//! let scanner = TreeScanner::new();
//! let snapshot = scanner.scan(&root, &InspectConfig::default()).unwrap();
//!
//! for node in snapshot.iter() {
//!     println!("{}  {}", node.path, node.caption);
//! }
//! ```

mod progress;
mod scanner;

pub use progress::{Heartbeat, ScanProgress};
pub use scanner::TreeScanner;

// Re-export core types for convenience
pub use axinspect_core::{
    AccessibleNode, AncestryPath, InspectConfig, NodeError, NodeSnapshot, Role, ScanError,
    Snapshot,
};
