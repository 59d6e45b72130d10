//! Core types and traits for axinspect.
//!
//! This crate provides the fundamental data structures used throughout the
//! axinspect workspace: the [`AccessibleNode`] capability through which the
//! host tree is read, ancestry paths, snapshot entries, scanned snapshots and
//! configuration.

mod config;
mod error;
pub mod memory;
mod node;
mod tree;

pub use config::{InspectConfig, InspectConfigBuilder};
pub use error::{NodeError, PathParseError, ResolveError, ScanError};
pub use node::{
    AncestryPath, Bounds, CAPTION_VALUE_LIMIT, NodeSnapshot, Role, State, StateSet,
    UNTAGGED_CAPTION, compose_caption,
};
pub use tree::{AccessibleNode, Snapshot, resolve, resolve_chain};
