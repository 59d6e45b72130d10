//! Error types for the inspection session.

use thiserror::Error;

use axinspect_analyze::{FavoritesError, IdentityError, NavigationError};
use axinspect_core::{AncestryPath, NodeError, ResolveError, ScanError};

/// Errors surfaced by [`Inspector`](crate::Inspector) commands.
#[derive(Debug, Error)]
pub enum InspectError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("No window has been scanned yet")]
    NoSnapshot,

    /// Filter controls are disabled while relatives are listed.
    #[error("Filters are disabled while relatives are listed; clear the filter first")]
    FiltersDisabled,

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Favorites(#[from] FavoritesError),

    #[error("Object not found: {0}")]
    Lookup(#[from] ResolveError),

    #[error("Object at {path} can not be read: {source}")]
    Node {
        path: AncestryPath,
        #[source]
        source: NodeError,
    },

    #[error("Favorite tagging failed: {message}")]
    Tagging { message: String },
}

/// Invalid input for a list position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("No results.")]
    Empty,

    #[error("The field only accepts numbers and cannot be left empty. Only a number between 1 and {total} is allowed.")]
    Invalid { input: String, total: usize },
}
