//! In-memory accessibility tree.
//!
//! Stands in for a host accessibility API: trees are described as nested
//! [`NodeSpec`] values (or loaded from a JSON dump) and flattened into an
//! arena. [`MemoryNode`] handles are an `Arc` plus an index, so they are cheap
//! to clone and safe to send to background tasks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::NodeError;
use crate::node::{Bounds, Role, State, StateSet};
use crate::tree::AccessibleNode;

/// Location given to nodes built with [`NodeSpec::visible`].
const DEFAULT_BOUNDS: Bounds = Bounds {
    left: 0,
    top: 0,
    width: 100,
    height: 20,
};

/// Declarative description of one object and its subtree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub role: Role,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub value: Option<String>,

    #[serde(default)]
    pub location: Option<Bounds>,

    #[serde(default)]
    pub states: StateSet,

    #[serde(default)]
    pub window_class: String,

    /// Every attribute read on this object fails.
    #[serde(default)]
    pub faulty: bool,

    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    /// An object without a location.
    pub fn new(role: Role) -> Self {
        Self {
            role,
            ..Self::default()
        }
    }

    /// An object with a non-empty bounding box.
    pub fn visible(role: Role) -> Self {
        Self::new(role).at(DEFAULT_BOUNDS)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn at(mut self, bounds: Bounds) -> Self {
        self.location = Some(bounds);
        self
    }

    pub fn with_state(mut self, state: State) -> Self {
        self.states.insert(state);
        self
    }

    pub fn with_class(mut self, window_class: impl Into<String>) -> Self {
        self.window_class = window_class.into();
        self
    }

    pub fn with_children(mut self, children: Vec<NodeSpec>) -> Self {
        self.children = children;
        self
    }

    pub fn faulty(mut self) -> Self {
        self.faulty = true;
        self
    }
}

/// JSON dump of a foreground window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeDump {
    pub app_name: String,
    pub root: NodeSpec,
}

/// Errors loading a tree dump.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed tree dump: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug)]
struct NodeData {
    role: Role,
    name: Option<String>,
    description: Option<String>,
    value: Option<String>,
    location: Option<Bounds>,
    states: StateSet,
    window_class: CompactString,
    faulty: bool,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Arena holding a whole tree.
#[derive(Debug)]
pub struct MemoryTree {
    app_name: CompactString,
    nodes: Vec<NodeData>,
}

impl MemoryTree {
    /// Flatten `root` into an arena and return a handle to the root object.
    pub fn build(app_name: impl Into<CompactString>, root: NodeSpec) -> MemoryNode {
        let mut nodes: Vec<NodeData> = Vec::new();
        let mut pending: Vec<(NodeSpec, Option<usize>)> = vec![(root, None)];

        while let Some((spec, parent)) = pending.pop() {
            let index = nodes.len();
            let NodeSpec {
                role,
                name,
                description,
                value,
                location,
                states,
                window_class,
                faulty,
                children,
            } = spec;

            nodes.push(NodeData {
                role,
                name,
                description,
                value,
                location,
                states,
                window_class: window_class.into(),
                faulty,
                parent,
                children: Vec::with_capacity(children.len()),
            });
            if let Some(parent) = parent {
                nodes[parent].children.push(index);
            }

            // Reversed so the first child is popped (and numbered) first.
            for child in children.into_iter().rev() {
                pending.push((child, Some(index)));
            }
        }

        MemoryNode {
            tree: Arc::new(Self {
                app_name: app_name.into(),
                nodes,
            }),
            index: 0,
        }
    }

    /// Build a tree from a parsed dump.
    pub fn from_dump(dump: TreeDump) -> MemoryNode {
        Self::build(dump.app_name, dump.root)
    }

    /// Parse a JSON dump.
    pub fn from_json(json: &str) -> Result<MemoryNode, DumpError> {
        let dump: TreeDump = serde_json::from_str(json)?;
        Ok(Self::from_dump(dump))
    }

    /// Load a JSON dump from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<MemoryNode, DumpError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| DumpError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Total number of objects, visible or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Handle to one object of a [`MemoryTree`].
#[derive(Debug, Clone)]
pub struct MemoryNode {
    tree: Arc<MemoryTree>,
    index: usize,
}

impl MemoryNode {
    /// The tree this handle points into.
    pub fn tree(&self) -> &MemoryTree {
        &self.tree
    }

    fn data(&self, attribute: &'static str) -> Result<&NodeData, NodeError> {
        let data = &self.tree.nodes[self.index];
        if data.faulty {
            return Err(NodeError::unavailable(attribute, "object is not responding"));
        }
        Ok(data)
    }

    fn handle(&self, index: usize) -> Self {
        Self {
            tree: Arc::clone(&self.tree),
            index,
        }
    }
}

impl PartialEq for MemoryNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree) && self.index == other.index
    }
}

impl Eq for MemoryNode {}

impl AccessibleNode for MemoryNode {
    fn role(&self) -> Result<Role, NodeError> {
        Ok(self.data("role")?.role)
    }

    fn name(&self) -> Result<Option<String>, NodeError> {
        Ok(self.data("name")?.name.clone())
    }

    fn description(&self) -> Result<Option<String>, NodeError> {
        Ok(self.data("description")?.description.clone())
    }

    fn value(&self) -> Result<Option<String>, NodeError> {
        Ok(self.data("value")?.value.clone())
    }

    fn location(&self) -> Result<Option<Bounds>, NodeError> {
        Ok(self.data("location")?.location)
    }

    fn states(&self) -> Result<StateSet, NodeError> {
        Ok(self.data("states")?.states.clone())
    }

    fn children(&self) -> Result<Vec<Self>, NodeError> {
        Ok(self
            .data("children")?
            .children
            .iter()
            .map(|&index| self.handle(index))
            .collect())
    }

    fn child_at(&self, index: usize) -> Result<Option<Self>, NodeError> {
        Ok(self
            .data("children")?
            .children
            .get(index)
            .map(|&child| self.handle(child)))
    }

    fn parent(&self) -> Result<Option<Self>, NodeError> {
        Ok(self.data("parent")?.parent.map(|index| self.handle(index)))
    }

    fn app_name(&self) -> Result<String, NodeError> {
        self.data("app_name")?;
        Ok(self.tree.app_name.to_string())
    }

    fn window_class(&self) -> Result<String, NodeError> {
        Ok(self.data("window_class")?.window_class.to_string())
    }
}
