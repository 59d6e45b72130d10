//! Relatives of a snapshot entry, read from the live tree.

use strum::{EnumIter, IntoStaticStr};

use axinspect_core::{AccessibleNode, AncestryPath, NodeSnapshot, Snapshot, resolve, resolve_chain};

use crate::error::NavigationError;

/// Which relatives to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Relation {
    Ascendants,
    Siblings,
    Children,
}

impl Relation {
    /// Label fragment used in `"N ascendants of <caption>"`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Ascendants => "ascendants of",
            Self::Siblings => "siblings of",
            Self::Children => "children of",
        }
    }
}

/// Relatives queries anchored on one snapshot.
///
/// Every query re-resolves paths from the snapshot's root; nothing but the
/// root handle is kept between calls. Entries already flagged favorite in the
/// snapshot keep that flag in the results.
#[derive(Debug)]
pub struct NavigationQueries<'a, N> {
    snapshot: &'a Snapshot<N>,
}

impl<'a, N: AccessibleNode> NavigationQueries<'a, N> {
    pub fn new(snapshot: &'a Snapshot<N>) -> Self {
        Self { snapshot }
    }

    /// Run the query for `relation`.
    pub fn query(
        &self,
        relation: Relation,
        node: &NodeSnapshot,
    ) -> Result<Vec<NodeSnapshot>, NavigationError> {
        match relation {
            Relation::Ascendants => self.ascendants(node),
            Relation::Siblings => self.siblings(node),
            Relation::Children => self.children(node),
        }
    }

    /// Chain from the root down to `node`, both included.
    pub fn ascendants(&self, node: &NodeSnapshot) -> Result<Vec<NodeSnapshot>, NavigationError> {
        let chain = resolve_chain(self.snapshot.root(), &node.path)?;

        let mut path = AncestryPath::root();
        let mut entries = Vec::with_capacity(chain.len());
        let mut indices = node.path.iter();
        for live in &chain {
            entries.push(self.capture(live, path.clone())?);
            if let Some(index) = indices.next() {
                path = path.child(index);
            }
        }
        Ok(entries)
    }

    /// Every child of `node`'s live parent, `node` included.
    ///
    /// The root has no siblings and yields itself.
    pub fn siblings(&self, node: &NodeSnapshot) -> Result<Vec<NodeSnapshot>, NavigationError> {
        let Some(parent_path) = node.path.parent() else {
            let root = self.snapshot.root();
            return Ok(vec![self.capture(root, AncestryPath::root())?]);
        };

        let live = resolve(self.snapshot.root(), &node.path)?;
        let parent = live
            .parent()
            .map_err(|source| NavigationError::Node {
                path: node.path.clone(),
                source,
            })?
            .ok_or_else(|| NavigationError::Detached {
                path: node.path.clone(),
            })?;

        self.list_children(&parent, &parent_path)
    }

    /// Raw listing of `node`'s live children, visible or not.
    pub fn children(&self, node: &NodeSnapshot) -> Result<Vec<NodeSnapshot>, NavigationError> {
        let live = resolve(self.snapshot.root(), &node.path)?;
        self.list_children(&live, &node.path)
    }

    fn list_children(
        &self,
        parent: &N,
        parent_path: &AncestryPath,
    ) -> Result<Vec<NodeSnapshot>, NavigationError> {
        let children = parent.children().map_err(|source| NavigationError::Node {
            path: parent_path.clone(),
            source,
        })?;

        children
            .iter()
            .enumerate()
            .map(|(index, child)| self.capture(child, parent_path.child(index)))
            .collect()
    }

    fn capture(&self, live: &N, path: AncestryPath) -> Result<NodeSnapshot, NavigationError> {
        let favorite = self
            .snapshot
            .position_of(&path)
            .and_then(|index| self.snapshot.get(index))
            .is_some_and(|entry| entry.favorite);

        let mut entry = NodeSnapshot::capture(live, path.clone())
            .map_err(|source| NavigationError::Node { path, source })?;
        entry.favorite = favorite;
        Ok(entry)
    }
}
