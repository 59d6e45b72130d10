//! Inspection session over one scanned window.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use axinspect_analyze::{
    FavoriteStore, FavoritesError, FilterEngine, FilterState, IdentityHasher, ImportSummary,
    NavigationQueries, Relation,
};
use axinspect_core::{
    AccessibleNode, AncestryPath, InspectConfig, NodeSnapshot, Role, ScanError, Snapshot,
    resolve,
};
use axinspect_scan::{ScanProgress, TreeScanner};

use crate::error::InspectError;
use crate::tasks::{self, TagOutcome};
use crate::view::ListView;

/// Outcome of toggling a favorite.
#[derive(Debug)]
pub struct ToggleOutcome {
    /// Whether the object is now a favorite.
    pub favorited: bool,
    /// Set when the favorite file could not be written; the in-memory set
    /// already reflects the toggle.
    pub save_error: Option<FavoritesError>,
}

impl ToggleOutcome {
    pub fn message(&self) -> &'static str {
        if self.favorited { "Favorited" } else { "Unfavorited" }
    }
}

/// Outcome of importing a favorites file.
#[derive(Debug)]
pub struct ImportOutcome {
    pub summary: ImportSummary,
    /// Set when the merged set could not be written back.
    pub save_error: Option<FavoritesError>,
}

#[derive(Debug, Clone)]
struct RelativesView {
    relation: Relation,
    anchor: String,
    entries: Vec<NodeSnapshot>,
}

/// One inspection session: the latest snapshot, the filter, the favorite
/// set, and an optional relatives listing shown instead of the filtered list.
pub struct Inspector<N> {
    config: InspectConfig,
    scanner: Arc<TreeScanner>,
    favorites: FavoriteStore,
    hasher: IdentityHasher,
    engine: FilterEngine,
    snapshot: Option<Snapshot<N>>,
    filter: FilterState,
    relatives: Option<RelativesView>,
    tagging: Option<JoinHandle<TagOutcome>>,
}

impl<N: AccessibleNode> Inspector<N> {
    /// Create a session using an already opened favorite store.
    pub fn new(config: InspectConfig, favorites: FavoriteStore) -> Self {
        Self {
            config,
            scanner: Arc::new(TreeScanner::new()),
            favorites,
            hasher: IdentityHasher::new(),
            engine: FilterEngine::new(),
            snapshot: None,
            filter: FilterState::default(),
            relatives: None,
            tagging: None,
        }
    }

    /// Create a session with the favorite store named by the config, or the
    /// default store.
    pub fn open(config: InspectConfig) -> Self {
        let favorites = match &config.favorites_path {
            Some(path) => FavoriteStore::open(path.clone()),
            None => FavoriteStore::open_default(),
        };
        Self::new(config, favorites)
    }

    /// Subscribe to scan progress, including "Searching..." heartbeats.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.scanner.subscribe()
    }

    pub fn config(&self) -> &InspectConfig {
        &self.config
    }

    pub fn favorites(&self) -> &FavoriteStore {
        &self.favorites
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn snapshot(&self) -> Option<&Snapshot<N>> {
        self.snapshot.as_ref()
    }

    /// Scan the window below `root` and replace the current snapshot.
    ///
    /// The filter is cleared and favorite tagging starts in the background;
    /// call [`wait_for_favorites`](Self::wait_for_favorites) before relying
    /// on favorite flags. A failed scan leaves the session unchanged.
    pub async fn scan(&mut self, root: N) -> Result<&Snapshot<N>, InspectError> {
        self.ensure_available(&root)?;

        let snapshot =
            tasks::run_scan(Arc::clone(&self.scanner), root, self.config.clone()).await?;
        info!(
            app = snapshot.app_name(),
            nodes = snapshot.len(),
            "window scanned"
        );

        self.filter.clear();
        self.relatives = None;
        self.tagging = Some(tasks::spawn_tagging(&snapshot, self.favorites.ids().clone()));
        Ok(&*self.snapshot.insert(snapshot))
    }

    /// Refuse to inspect the inspector's own dialogs.
    fn ensure_available(&self, root: &N) -> Result<(), ScanError> {
        let Some(self_app) = self.config.self_app_name.as_deref() else {
            return Ok(());
        };
        let root_path = AncestryPath::root();
        let role = root.role().map_err(|e| ScanError::node(&root_path, e))?;
        if role != Role::Dialog {
            return Ok(());
        }
        let app_name = root.app_name().map_err(|e| ScanError::node(&root_path, e))?;
        if app_name == self_app {
            return Err(ScanError::Unavailable {
                reason: format!("{app_name} dialogs can not be inspected"),
            });
        }
        Ok(())
    }

    /// Join the favorite tagging task and apply its result.
    ///
    /// Returns the number of favorite entries in the snapshot.
    pub async fn wait_for_favorites(&mut self) -> Result<usize, InspectError> {
        if let Some(handle) = self.tagging.take() {
            let outcome = handle.await.map_err(|e| InspectError::Tagging {
                message: e.to_string(),
            })?;
            if outcome.unidentifiable > 0 {
                debug!(
                    count = outcome.unidentifiable,
                    "entries skipped while tagging favorites"
                );
            }
            if let Some(snapshot) = self.snapshot.as_mut() {
                snapshot.mark_favorites(&outcome.favorite_indices);
            }
        }
        Ok(self.snapshot.as_ref().map_or(0, |s| s.favorite_count()))
    }

    /// Whether favorite flags are final for the current snapshot.
    pub fn is_favorites_ready(&self) -> bool {
        self.tagging.is_none()
    }

    /// Replace the filter.
    pub fn apply_filter(&mut self, filter: FilterState) -> Result<ListView, InspectError> {
        if self.relatives.is_some() {
            return Err(InspectError::FiltersDisabled);
        }
        self.filter = filter;
        self.view()
    }

    /// Reset the filter and leave any relatives listing.
    pub fn clear_filter(&mut self) -> Result<ListView, InspectError> {
        self.filter.clear();
        self.relatives = None;
        self.view()
    }

    /// Whether the filter controls accept input.
    pub fn filters_enabled(&self) -> bool {
        self.relatives.is_none()
    }

    /// The list as currently displayed.
    pub fn view(&self) -> Result<ListView, InspectError> {
        let snapshot = self.snapshot.as_ref().ok_or(InspectError::NoSnapshot)?;

        if let Some(relatives) = &self.relatives {
            return Ok(ListView {
                title: snapshot.title(),
                label: format!(
                    "{} {} {}",
                    relatives.entries.len(),
                    relatives.relation.label(),
                    relatives.anchor
                ),
                entries: relatives.entries.clone(),
                filters_enabled: false,
            });
        }

        let filtered = self.engine.apply(snapshot.nodes(), &self.filter);
        Ok(ListView {
            title: snapshot.title(),
            label: filtered.label(),
            entries: filtered.nodes().cloned().collect(),
            filters_enabled: true,
        })
    }

    /// List the relatives of `node` in place of the filtered list.
    pub fn show_relatives(
        &mut self,
        relation: Relation,
        node: &NodeSnapshot,
    ) -> Result<ListView, InspectError> {
        let snapshot = self.snapshot.as_ref().ok_or(InspectError::NoSnapshot)?;
        let entries = NavigationQueries::new(snapshot).query(relation, node)?;
        self.relatives = Some(RelativesView {
            relation,
            anchor: node.caption.clone(),
            entries,
        });
        self.view()
    }

    pub fn ascendants(&mut self, node: &NodeSnapshot) -> Result<ListView, InspectError> {
        self.show_relatives(Relation::Ascendants, node)
    }

    pub fn siblings(&mut self, node: &NodeSnapshot) -> Result<ListView, InspectError> {
        self.show_relatives(Relation::Siblings, node)
    }

    pub fn children(&mut self, node: &NodeSnapshot) -> Result<ListView, InspectError> {
        self.show_relatives(Relation::Children, node)
    }

    /// Snapshot entry at `path`, or a fresh capture of the live object when
    /// the scan skipped it.
    pub fn locate(&self, path: &AncestryPath) -> Result<NodeSnapshot, InspectError> {
        let snapshot = self.snapshot.as_ref().ok_or(InspectError::NoSnapshot)?;
        if let Some(node) = snapshot.position_of(path).and_then(|i| snapshot.get(i)) {
            return Ok(node.clone());
        }
        let live = resolve(snapshot.root(), path)?;
        NodeSnapshot::capture(&live, path.clone()).map_err(|source| InspectError::Node {
            path: path.clone(),
            source,
        })
    }

    /// Expression that locates `node` from the root object.
    pub fn describe(&self, node: &NodeSnapshot) -> String {
        node.path.describe()
    }

    /// Add or remove `node` from the favorites and save the set.
    ///
    /// Waits for favorite tagging first. An object that can no longer be
    /// identified is an error; a failed save is reported in the outcome.
    pub async fn toggle_favorite(
        &mut self,
        node: &NodeSnapshot,
    ) -> Result<ToggleOutcome, InspectError> {
        self.wait_for_favorites().await?;
        let snapshot = self.snapshot.as_mut().ok_or(InspectError::NoSnapshot)?;

        let id = self.hasher.identify(snapshot, node)?;
        let favorited = self.favorites.toggle(id);

        snapshot.set_favorite(&node.path, favorited);
        if let Some(relatives) = self.relatives.as_mut() {
            for entry in relatives.entries.iter_mut().filter(|e| e.path == node.path) {
                entry.favorite = favorited;
            }
        }

        let save_error = self.save_favorites();
        Ok(ToggleOutcome {
            favorited,
            save_error,
        })
    }

    /// Copy the favorite set to `dest`.
    pub fn export_favorites(&self, dest: &Path, overwrite: bool) -> Result<usize, InspectError> {
        let count = self.favorites.export_to(dest, overwrite)?;
        info!(count, path = %dest.display(), "favorites exported");
        Ok(count)
    }

    /// Merge the favorites stored in `src`, save, and re-tag the snapshot.
    pub async fn import_favorites(&mut self, src: &Path) -> Result<ImportOutcome, InspectError> {
        self.wait_for_favorites().await?;
        let summary = self.favorites.import_from(src)?;
        info!(added = summary.added, total = summary.total, "favorites imported");

        let save_error = if summary.added > 0 {
            if let Some(snapshot) = &self.snapshot {
                self.tagging = Some(tasks::spawn_tagging(snapshot, self.favorites.ids().clone()));
            }
            self.save_favorites()
        } else {
            None
        };

        Ok(ImportOutcome {
            summary,
            save_error,
        })
    }

    fn save_favorites(&self) -> Option<FavoritesError> {
        match self.favorites.save() {
            Ok(()) => None,
            Err(err) => {
                warn!(error = %err, "favorites could not be saved");
                Some(err)
            }
        }
    }
}
