//! Identity, favorites, filtering and navigation over scanned snapshots.
//!
//! Everything here works on a [`Snapshot`](axinspect_core::Snapshot)
//! produced by `axinspect-scan`:
//!
//! - [`IdentityHasher`] derives a [`StableId`] from an entry's structural
//!   chain in the live tree.
//! - [`FavoriteStore`] keeps the persisted set of favorite identifiers.
//! - [`FilterEngine`] narrows a snapshot to a [`FilteredView`].
//! - [`NavigationQueries`] lists ascendants, siblings and children.

mod error;
mod favorites;
mod filter;
mod identity;
mod navigation;

pub use error::{FavoritesError, IdentityError, NavigationError};
pub use favorites::{FAVORITES_FORMAT_VERSION, FavoriteStore, ImportSummary};
pub use filter::{FilterEngine, FilterState, FilteredView, RoleCategory};
pub use identity::{IdentityHasher, StableId};
pub use navigation::{NavigationQueries, Relation};
