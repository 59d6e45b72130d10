//! Multi-criteria filtering of scanned snapshots.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

use axinspect_core::{NodeSnapshot, Role};

const INTERACTIVE_ROLES: &[Role] = &[
    Role::Button,
    Role::CheckBox,
    Role::CheckMenuItem,
    Role::ColorChooser,
    Role::ComboBox,
    Role::EditableText,
    Role::Menu,
    Role::MenuButton,
    Role::MenuItem,
    Role::PasswordEdit,
    Role::RadioButton,
    Role::RadioMenuItem,
    Role::SpinButton,
    Role::ToggleButton,
];

const DATA_ROLES: &[Role] = &[
    Role::DataItem,
    Role::Document,
    Role::ListItem,
    Role::TreeViewItem,
    Role::RichEdit,
];

const STATIC_ROLES: &[Role] = &[
    Role::Graphic,
    Role::Icon,
    Role::Label,
    Role::StaticText,
    Role::StatusBar,
];

const CONTAINER_ROLES: &[Role] = &[
    Role::Application,
    Role::DesktopPane,
    Role::Dialog,
    Role::DirectoryPane,
    Role::Frame,
    Role::GlassPane,
    Role::MenuBar,
    Role::OptionPane,
    Role::Pane,
    Role::Panel,
    Role::ToolBar,
    Role::Window,
];

/// Coarse grouping of roles.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RoleCategory {
    /// Every role, including those outside the four groups.
    #[default]
    All,
    Interactive,
    Data,
    Static,
    Container,
}

impl RoleCategory {
    /// Roles belonging to this category (empty for `All`).
    pub fn roles(self) -> &'static [Role] {
        match self {
            Self::All => &[],
            Self::Interactive => INTERACTIVE_ROLES,
            Self::Data => DATA_ROLES,
            Self::Static => STATIC_ROLES,
            Self::Container => CONTAINER_ROLES,
        }
    }

    /// Check if a role passes this category.
    pub fn contains(self, role: Role) -> bool {
        match self {
            Self::All => true,
            other => other.roles().contains(&role),
        }
    }

    /// Category a role belongs to, if any.
    pub fn of(role: Role) -> Option<Self> {
        [
            Self::Interactive,
            Self::Data,
            Self::Static,
            Self::Container,
        ]
        .into_iter()
        .find(|category| category.roles().contains(&role))
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All objects",
            Self::Interactive => "Interactive objects",
            Self::Data => "Data objects",
            Self::Static => "Static objects",
            Self::Container => "Container objects",
        }
    }
}

/// Current filter selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub role_category: RoleCategory,
    /// Case-insensitive caption substring.
    pub search_text: String,
    /// Drop objects with neither name nor description.
    pub hide_untagged: bool,
    /// Keep only favorites.
    pub favorites_only: bool,
}

impl FilterState {
    /// The cleared filter.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role_category(mut self, category: RoleCategory) -> Self {
        self.role_category = category;
        self
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    pub fn hiding_untagged(mut self, hide: bool) -> Self {
        self.hide_untagged = hide;
        self
    }

    pub fn only_favorites(mut self, only: bool) -> Self {
        self.favorites_only = only;
        self
    }

    /// Reset to the cleared filter.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_cleared(&self) -> bool {
        *self == Self::default()
    }
}

/// Ordered subset of a snapshot that passed a filter.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    entries: Vec<(usize, &'a NodeSnapshot)>,
    total: usize,
}

impl<'a> FilteredView<'a> {
    /// Indices into the unfiltered snapshot.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|(index, _)| *index)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &'a NodeSnapshot> + '_ {
        self.entries.iter().map(|(_, node)| *node)
    }

    /// Entry at a displayed position, with its snapshot index.
    pub fn get(&self, position: usize) -> Option<(usize, &'a NodeSnapshot)> {
        self.entries.get(position).copied()
    }

    pub fn displayed(&self) -> usize {
        self.entries.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the filter hides anything.
    pub fn is_filter_active(&self) -> bool {
        self.entries.len() < self.total
    }

    /// List label: `"N items"`, suffixed with `[filter active]` when
    /// entries are hidden.
    pub fn label(&self) -> String {
        let mut label = format!("{} items", self.entries.len());
        if self.is_filter_active() {
            label.push_str(" [filter active]");
        }
        label
    }
}

/// Applies a [`FilterState`] to snapshot entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEngine;

impl FilterEngine {
    pub fn new() -> Self {
        Self
    }

    /// Keep the entries passing every predicate, in their original order.
    pub fn apply<'a>(&self, nodes: &'a [NodeSnapshot], filter: &FilterState) -> FilteredView<'a> {
        let needle = filter.search_text.to_lowercase();
        let entries = nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| Self::accepts(node, filter, &needle))
            .collect();

        FilteredView {
            entries,
            total: nodes.len(),
        }
    }

    /// Evaluate the predicates for one entry; `needle` is the lowercased search text.
    fn accepts(node: &NodeSnapshot, filter: &FilterState, needle: &str) -> bool {
        if filter.hide_untagged && !node.tagged {
            return false;
        }
        if !needle.is_empty() && !node.caption.to_lowercase().contains(needle) {
            return false;
        }
        if !filter.role_category.contains(node.role) {
            return false;
        }
        if filter.favorites_only && !node.favorite {
            return false;
        }
        true
    }
}
