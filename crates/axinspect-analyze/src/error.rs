//! Error types for identity, favorites and navigation.

use std::path::PathBuf;

use thiserror::Error;

use axinspect_core::{AncestryPath, NodeError, ResolveError};

/// A node could not be identified for favorite purposes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The path no longer leads to an object in the live tree.
    #[error("Object can not be identified: {0}")]
    Lookup(#[from] ResolveError),

    /// A structural attribute could not be read.
    #[error("Object at {path} can not be identified: {source}")]
    Node {
        path: AncestryPath,
        #[source]
        source: NodeError,
    },

    /// A stored identifier is not a 64-character hex string.
    #[error("Invalid identifier `{input}`: {reason}")]
    InvalidId { input: String, reason: &'static str },
}

/// Errors loading or saving the favorite set.
#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed favorites file {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported favorites file version {version} in {path}")]
    UnsupportedVersion { path: PathBuf, version: u32 },

    #[error("The file already exists: {path}")]
    AlreadyExists { path: PathBuf },

    #[error("No location configured for the favorites file")]
    NoLocation,
}

impl FavoritesError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors answering a relatives query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Object attribute unavailable at {path}: {source}")]
    Node {
        path: AncestryPath,
        #[source]
        source: NodeError,
    },

    /// The live object reports no parent although it is not the root.
    #[error("Object at {path} has no parent")]
    Detached { path: AncestryPath },
}
