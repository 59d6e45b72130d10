//! Error types for tree access and scanning.

use thiserror::Error;

use crate::node::AncestryPath;

/// Failure reading an attribute from a live accessible object.
///
/// The host owns the tree and may mutate or destroy objects at any time, so
/// every accessor on [`AccessibleNode`](crate::AccessibleNode) can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    /// An attribute could not be read.
    #[error("Attribute `{attribute}` is unavailable: {message}")]
    Unavailable {
        attribute: &'static str,
        message: String,
    },

    /// The object was destroyed by its owner.
    #[error("Object is no longer alive")]
    Defunct,
}

impl NodeError {
    /// Create an unavailable-attribute error.
    pub fn unavailable(attribute: &'static str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            attribute,
            message: message.into(),
        }
    }
}

/// Errors that abort a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The live tree failed mid-traversal.
    #[error("Search failed at {path}: {source}")]
    NodeAccess {
        path: AncestryPath,
        #[source]
        source: NodeError,
    },

    /// Inspecting this window is not permitted.
    #[error("Not available here: {reason}")]
    Unavailable { reason: String },

    /// The blocking scan task could not complete.
    #[error("Scan task failed: {message}")]
    Task { message: String },
}

impl ScanError {
    /// Create a node access error with path context.
    pub fn node(path: &AncestryPath, source: NodeError) -> Self {
        Self::NodeAccess {
            path: path.clone(),
            source,
        }
    }
}

/// Errors re-locating a path in the live tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The parent no longer has a child at this index.
    #[error("Object {parent} has no child at index {index}")]
    MissingChild { parent: AncestryPath, index: usize },

    /// An attribute read failed while walking the path.
    #[error("Object access failed at {path}: {source}")]
    Node {
        path: AncestryPath,
        #[source]
        source: NodeError,
    },
}

/// Error parsing a path expression such as `root.child[2].child[0]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid path expression `{input}`: {reason}")]
pub struct PathParseError {
    pub input: String,
    pub reason: &'static str,
}

impl PathParseError {
    pub(crate) fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}
