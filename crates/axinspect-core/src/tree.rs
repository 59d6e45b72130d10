//! Live tree capability and scanned snapshot container.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{NodeError, ResolveError};
use crate::node::{AncestryPath, Bounds, NodeSnapshot, Role, State, StateSet};

/// Handle to an object in a host-owned accessibility tree.
///
/// Handles are cheap to clone and may cross threads. Implementations must not
/// assume the tree stays unchanged between calls.
pub trait AccessibleNode: Clone + Send + Sync + 'static {
    fn role(&self) -> Result<Role, NodeError>;

    fn name(&self) -> Result<Option<String>, NodeError>;

    fn description(&self) -> Result<Option<String>, NodeError>;

    fn value(&self) -> Result<Option<String>, NodeError>;

    /// Screen bounding box, `None` when the object has no location.
    fn location(&self) -> Result<Option<Bounds>, NodeError>;

    fn states(&self) -> Result<StateSet, NodeError>;

    /// Children in native order.
    fn children(&self) -> Result<Vec<Self>, NodeError>;

    fn parent(&self) -> Result<Option<Self>, NodeError>;

    /// Name of the application owning the object.
    fn app_name(&self) -> Result<String, NodeError>;

    /// Window class of the native window backing the object.
    fn window_class(&self) -> Result<String, NodeError>;

    /// Child at `index`, if any.
    fn child_at(&self, index: usize) -> Result<Option<Self>, NodeError> {
        Ok(self.children()?.into_iter().nth(index))
    }

    /// On screen with a real bounding box and not flagged invisible.
    fn is_visible(&self) -> Result<bool, NodeError> {
        let on_screen = self.location()?.is_some_and(|bounds| !bounds.is_degenerate());
        if !on_screen {
            return Ok(false);
        }
        Ok(!self.states()?.contains(State::Invisible))
    }
}

/// Follow `path` from `root` through the live tree.
pub fn resolve<N: AccessibleNode>(root: &N, path: &AncestryPath) -> Result<N, ResolveError> {
    let mut current = root.clone();
    let mut walked = AncestryPath::root();
    for index in path.iter() {
        current = step(&current, &walked, index)?;
        walked = walked.child(index);
    }
    Ok(current)
}

/// Follow `path` from `root`, returning every object on the way.
///
/// The first element is `root`, the last is the object `path` points at.
pub fn resolve_chain<N: AccessibleNode>(
    root: &N,
    path: &AncestryPath,
) -> Result<Vec<N>, ResolveError> {
    let mut chain = Vec::with_capacity(path.depth() + 1);
    chain.push(root.clone());
    let mut walked = AncestryPath::root();
    for index in path.iter() {
        let next = step(&chain[chain.len() - 1], &walked, index)?;
        chain.push(next);
        walked = walked.child(index);
    }
    Ok(chain)
}

fn step<N: AccessibleNode>(
    parent: &N,
    parent_path: &AncestryPath,
    index: usize,
) -> Result<N, ResolveError> {
    parent
        .child_at(index)
        .map_err(|source| ResolveError::Node {
            path: parent_path.clone(),
            source,
        })?
        .ok_or_else(|| ResolveError::MissingChild {
            parent: parent_path.clone(),
            index,
        })
}

/// Ordered result of one scan.
///
/// Entry 0 is always the root; the rest follow in pre-order. The snapshot
/// keeps a handle to the root object only, so every other entry is reached by
/// re-resolving its path.
#[derive(Debug, Clone)]
pub struct Snapshot<N> {
    root: N,
    nodes: Vec<NodeSnapshot>,
    app_name: String,
    scanned_at: DateTime<Utc>,
    scan_duration: Duration,
}

impl<N: AccessibleNode> Snapshot<N> {
    /// Create a new snapshot.
    pub fn new(
        root: N,
        nodes: Vec<NodeSnapshot>,
        app_name: impl Into<String>,
        scan_duration: Duration,
    ) -> Self {
        Self {
            root,
            nodes,
            app_name: app_name.into(),
            scanned_at: Utc::now(),
            scan_duration,
        }
    }

    /// Handle to the scanned root object.
    pub fn root(&self) -> &N {
        &self.root
    }

    pub fn nodes(&self) -> &[NodeSnapshot] {
        &self.nodes
    }

    pub fn get(&self, index: usize) -> Option<&NodeSnapshot> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeSnapshot> {
        self.nodes.iter()
    }

    /// Index of the entry with this path.
    pub fn position_of(&self, path: &AncestryPath) -> Option<usize> {
        self.nodes.iter().position(|node| &node.path == path)
    }

    /// Set the favorite flag on the entry with this path.
    ///
    /// Returns `false` when no entry has the path.
    pub fn set_favorite(&mut self, path: &AncestryPath, favorite: bool) -> bool {
        match self.nodes.iter_mut().find(|node| &node.path == path) {
            Some(node) => {
                node.favorite = favorite;
                true
            }
            None => false,
        }
    }

    /// Set the favorite flag on the entries at these indices.
    pub fn mark_favorites(&mut self, indices: &[usize]) {
        for &index in indices {
            if let Some(node) = self.nodes.get_mut(index) {
                node.favorite = true;
            }
        }
    }

    /// Number of entries flagged favorite.
    pub fn favorite_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.favorite).count()
    }

    /// Name of the application that owns the root.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn scanned_at(&self) -> DateTime<Utc> {
        self.scanned_at
    }

    pub fn scan_duration(&self) -> Duration {
        self.scan_duration
    }

    /// Window title for the listing.
    pub fn title(&self) -> String {
        format!("Objects in {} window", self.app_name)
    }

    /// List label for the unfiltered listing.
    pub fn label(&self) -> String {
        format!("{} items", self.nodes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryTree, NodeSpec};

    fn tree() -> crate::memory::MemoryNode {
        MemoryTree::build(
            "notepad",
            NodeSpec::visible(Role::Window).with_children(vec![
                NodeSpec::visible(Role::MenuBar),
                NodeSpec::visible(Role::Pane)
                    .with_children(vec![NodeSpec::visible(Role::EditableText).named("Text")]),
            ]),
        )
    }

    #[test]
    fn test_resolve() {
        let root = tree();
        let node = resolve(&root, &AncestryPath::from(vec![1, 0])).unwrap();
        assert_eq!(node.role().unwrap(), Role::EditableText);
        assert_eq!(node.name().unwrap().as_deref(), Some("Text"));
    }

    #[test]
    fn test_resolve_missing_child() {
        let root = tree();
        let err = resolve(&root, &AncestryPath::from(vec![1, 4])).unwrap_err();
        assert_eq!(
            err,
            ResolveError::MissingChild {
                parent: AncestryPath::from(vec![1]),
                index: 4
            }
        );
    }

    #[test]
    fn test_resolve_chain() {
        let root = tree();
        let chain = resolve_chain(&root, &AncestryPath::from(vec![1, 0])).unwrap();
        let roles: Vec<Role> = chain.iter().map(|n| n.role().unwrap()).collect();
        assert_eq!(roles, vec![Role::Window, Role::Pane, Role::EditableText]);
    }

    #[test]
    fn test_is_visible() {
        let root = MemoryTree::build(
            "app",
            NodeSpec::visible(Role::Window).with_children(vec![
                NodeSpec::new(Role::Button),
                NodeSpec::new(Role::Button).at(Bounds::default()),
                NodeSpec::visible(Role::Button).with_state(State::Invisible),
                NodeSpec::visible(Role::Button),
            ]),
        );
        let visible: Vec<bool> = root
            .children()
            .unwrap()
            .iter()
            .map(|c| c.is_visible().unwrap())
            .collect();
        assert_eq!(visible, vec![false, false, false, true]);
    }
}
