//! Persistent favorite set.
//!
//! Favorites are stored as a JSON document listing hex-encoded
//! [`StableId`]s. The store is saved after every mutation by its owner; a
//! failed load yields an empty set instead of an error.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::FavoritesError;
use crate::identity::StableId;

/// Current on-disk format version.
pub const FAVORITES_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct FavoritesFile {
    version: u32,
    favorites: Vec<StableId>,
}

/// Result of merging an imported favorites file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Identifiers that were not already present.
    pub added: usize,
    /// Size of the set after the merge.
    pub total: usize,
}

impl ImportSummary {
    /// Message shown to the user after an import.
    pub fn message(&self) -> String {
        if self.added == 0 {
            "There are no new favorites to add".to_string()
        } else {
            format!("{} favorites added, {} total", self.added, self.total)
        }
    }
}

/// Set of favorite identifiers, optionally backed by a file.
#[derive(Debug, Clone, Default)]
pub struct FavoriteStore {
    ids: IndexSet<StableId>,
    path: Option<PathBuf>,
}

impl FavoriteStore {
    /// Create an empty store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Default favorites file in the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("axinspect").join("favorites.json"))
    }

    /// Open the store backed by `path`.
    ///
    /// A missing or unreadable file yields an empty set.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let ids = match Self::read(&path) {
            Ok(ids) => {
                debug!(count = ids.len(), path = %path.display(), "favorites loaded");
                ids
            }
            Err(FavoritesError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                IndexSet::new()
            }
            Err(err) => {
                warn!(error = %err, "favorites could not be loaded, starting empty");
                IndexSet::new()
            }
        };
        Self {
            ids,
            path: Some(path),
        }
    }

    /// Open the store at [`default_path`](Self::default_path), or an
    /// in-memory store when no config directory exists.
    pub fn open_default() -> Self {
        match Self::default_path() {
            Some(path) => Self::open(path),
            None => Self::in_memory(),
        }
    }

    /// Read an identifier set from a favorites file.
    pub fn read(path: &Path) -> Result<IndexSet<StableId>, FavoritesError> {
        let bytes = std::fs::read(path).map_err(|e| FavoritesError::io(path, e))?;
        Self::decode(&bytes).map_err(|err| match err {
            FavoritesError::Format { source, .. } => FavoritesError::Format {
                path: path.to_path_buf(),
                source,
            },
            FavoritesError::UnsupportedVersion { version, .. } => {
                FavoritesError::UnsupportedVersion {
                    path: path.to_path_buf(),
                    version,
                }
            }
            other => other,
        })
    }

    /// Decode a favorites document.
    pub fn decode(bytes: &[u8]) -> Result<IndexSet<StableId>, FavoritesError> {
        let file: FavoritesFile =
            serde_json::from_slice(bytes).map_err(|source| FavoritesError::Format {
                path: PathBuf::new(),
                source,
            })?;
        if file.version != FAVORITES_FORMAT_VERSION {
            return Err(FavoritesError::UnsupportedVersion {
                path: PathBuf::new(),
                version: file.version,
            });
        }
        Ok(file.favorites.into_iter().collect())
    }

    /// Encode the set as a favorites document.
    pub fn encode(&self) -> Vec<u8> {
        let file = FavoritesFile {
            version: FAVORITES_FORMAT_VERSION,
            favorites: self.ids.iter().copied().collect(),
        };
        // A list of hex strings always serializes.
        serde_json::to_vec_pretty(&file).unwrap_or_default()
    }

    /// Write the set to its backing file.
    ///
    /// In-memory stores have nothing to write and succeed.
    pub fn save(&self) -> Result<(), FavoritesError> {
        match &self.path {
            Some(path) => self.write_to(path),
            None => Ok(()),
        }
    }

    /// Copy the set to another file.
    ///
    /// Refuses to replace an existing file unless `overwrite` is set.
    /// Returns the number of identifiers written.
    pub fn export_to(&self, dest: &Path, overwrite: bool) -> Result<usize, FavoritesError> {
        if dest.exists() && !overwrite {
            return Err(FavoritesError::AlreadyExists {
                path: dest.to_path_buf(),
            });
        }
        self.write_to(dest)?;
        Ok(self.ids.len())
    }

    /// Merge the identifiers stored in another file.
    ///
    /// The caller decides when to [`save`](Self::save).
    pub fn import_from(&mut self, src: &Path) -> Result<ImportSummary, FavoritesError> {
        let imported = Self::read(src)?;
        let added = self.merge(imported);
        Ok(ImportSummary {
            added,
            total: self.ids.len(),
        })
    }

    /// Add every identifier in `ids`, returning how many were new.
    pub fn merge(&mut self, ids: impl IntoIterator<Item = StableId>) -> usize {
        ids.into_iter().filter(|id| self.ids.insert(*id)).count()
    }

    fn write_to(&self, path: &Path) -> Result<(), FavoritesError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| FavoritesError::io(parent, e))?;
            }
        }
        std::fs::write(path, self.encode()).map_err(|e| FavoritesError::io(path, e))
    }

    /// Flip membership of `id`. Returns `true` if it is now a favorite.
    pub fn toggle(&mut self, id: StableId) -> bool {
        if self.ids.shift_remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn insert(&mut self, id: StableId) -> bool {
        self.ids.insert(id)
    }

    pub fn remove(&mut self, id: &StableId) -> bool {
        self.ids.shift_remove(id)
    }

    pub fn contains(&self, id: &StableId) -> bool {
        self.ids.contains(id)
    }

    /// The identifier set.
    pub fn ids(&self) -> &IndexSet<StableId> {
        &self.ids
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
