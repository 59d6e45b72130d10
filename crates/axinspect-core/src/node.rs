//! Accessible object value types.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoStaticStr};

use crate::error::{NodeError, PathParseError};
use crate::tree::AccessibleNode;

/// Maximum number of value characters shown in a caption.
pub const CAPTION_VALUE_LIMIT: usize = 50;

/// Caption used when an object exposes no name, description or value.
pub const UNTAGGED_CAPTION: &str = "untagged";

const ROOT_EXPR: &str = "root";
const CHILD_OPEN: &str = ".child[";

/// Role of an accessible object.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    #[default]
    Unknown,
    Window,
    TitleBar,
    Pane,
    Dialog,
    CheckBox,
    RadioButton,
    StaticText,
    EditableText,
    Button,
    MenuBar,
    MenuItem,
    PopupMenu,
    ComboBox,
    List,
    ListItem,
    Graphic,
    HelpBalloon,
    Tooltip,
    Link,
    TreeView,
    TreeViewItem,
    Tab,
    TabControl,
    Slider,
    ProgressBar,
    ScrollBar,
    StatusBar,
    Table,
    TableCell,
    TableColumn,
    TableRow,
    TableColumnHeader,
    TableRowHeader,
    Frame,
    ToolBar,
    DropDownButton,
    Clock,
    Separator,
    Form,
    Heading,
    Grouping,
    Document,
    Application,
    Panel,
    Menu,
    MenuButton,
    CheckMenuItem,
    ColorChooser,
    PasswordEdit,
    RadioMenuItem,
    SpinButton,
    ToggleButton,
    DataItem,
    RichEdit,
    Icon,
    Label,
    DesktopPane,
    DirectoryPane,
    GlassPane,
    OptionPane,
    Paragraph,
    Section,
    Canvas,
    Alert,
}

impl Role {
    /// Stable machine name of the role (`check_box`).
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Human-readable role label (`check box`).
    pub fn label(self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// State flag reported by an accessible object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Unavailable,
    Focused,
    Selected,
    Busy,
    Pressed,
    Checked,
    HalfChecked,
    ReadOnly,
    Expanded,
    Collapsed,
    Invisible,
    Visited,
    Linked,
    HasPopup,
    Protected,
    Required,
    Defunct,
    InvalidEntry,
    Modal,
    Multiline,
    Offscreen,
    Selectable,
    Focusable,
    Clickable,
    Editable,
}

/// Set of state flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateSet(BTreeSet<State>);

impl StateSet {
    /// Create an empty state set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a state.
    pub fn insert(&mut self, state: State) -> bool {
        self.0.insert(state)
    }

    /// Check if a state is present.
    pub fn contains(&self, state: State) -> bool {
        self.0.contains(&state)
    }

    /// Check if the object is flagged invisible.
    pub fn is_invisible(&self) -> bool {
        self.contains(State::Invisible)
    }

    pub fn iter(&self) -> impl Iterator<Item = State> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<State> for StateSet {
    fn from_iter<I: IntoIterator<Item = State>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Screen bounding box of an object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    /// Create a bounding box.
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// An all-zero box, reported by hosts for objects that are not laid out.
    pub fn is_degenerate(&self) -> bool {
        *self == Self::default()
    }
}

/// Child indices leading from the root object to a node.
///
/// Each element is the zero-based index of a child within its parent's full
/// child list, including children the scan skipped. The empty path is the
/// root. The display form is an expression that can be parsed back:
/// `root.child[0].child[3]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AncestryPath(Vec<usize>);

impl AncestryPath {
    /// The root path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path of the child at `index` under this path.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = Vec::with_capacity(self.0.len() + 1);
        indices.extend_from_slice(&self.0);
        indices.push(index);
        Self(indices)
    }

    /// Path of the parent, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        self.0
            .split_last()
            .map(|(_, parent)| Self(parent.to_vec()))
    }

    /// Index of this node within its parent.
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of levels below the root.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Expression locating this node from the root object.
    pub fn describe(&self) -> String {
        let mut expr = String::from(ROOT_EXPR);
        for index in &self.0 {
            expr.push_str(CHILD_OPEN);
            expr.push_str(&index.to_string());
            expr.push(']');
        }
        expr
    }
}

impl From<Vec<usize>> for AncestryPath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for AncestryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl FromStr for AncestryPath {
    type Err = PathParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut rest = input
            .trim()
            .strip_prefix(ROOT_EXPR)
            .ok_or_else(|| PathParseError::new(input, "expression must start with `root`"))?;

        let mut indices = Vec::new();
        while !rest.is_empty() {
            let after = rest
                .strip_prefix(CHILD_OPEN)
                .ok_or_else(|| PathParseError::new(input, "expected `.child[`"))?;
            let close = after
                .find(']')
                .ok_or_else(|| PathParseError::new(input, "unterminated child index"))?;
            let digits = &after[..close];
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(PathParseError::new(input, "child index is not a number"));
            }
            let index = digits
                .parse::<usize>()
                .map_err(|_| PathParseError::new(input, "child index is out of range"))?;
            indices.push(index);
            rest = &after[close + 1..];
        }

        Ok(Self(indices))
    }
}

/// One visited object as captured by a scan or a relatives query.
///
/// Holds no handle into the live tree; `path` is the only way back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// Location of the object relative to the root.
    pub path: AncestryPath,

    /// List caption: `role, name[, description]`.
    pub caption: String,

    /// Role at capture time.
    pub role: Role,

    /// Whether the object had a name or a description.
    pub tagged: bool,

    /// Whether the object is in the favorite set.
    #[serde(default)]
    pub favorite: bool,
}

impl NodeSnapshot {
    /// Build a snapshot entry from raw attributes.
    pub fn new(
        path: AncestryPath,
        role: Role,
        name: Option<&str>,
        description: Option<&str>,
        value: Option<&str>,
    ) -> Self {
        let name = name.unwrap_or_default();
        let description = description.unwrap_or_default();
        Self {
            caption: compose_caption(role, name, description, value.unwrap_or_default()),
            tagged: !name.is_empty() || !description.is_empty(),
            path,
            role,
            favorite: false,
        }
    }

    /// Read the attributes of a live object.
    pub fn capture<N: AccessibleNode>(node: &N, path: AncestryPath) -> Result<Self, NodeError> {
        let role = node.role()?;
        let name = node.name()?;
        let description = node.description()?;
        let value = node.value()?;
        Ok(Self::new(
            path,
            role,
            name.as_deref(),
            description.as_deref(),
            value.as_deref(),
        ))
    }

    pub fn is_root(&self) -> bool {
        self.path.is_root()
    }
}

/// Compose a list caption.
///
/// `role, name, description` with empty parts dropped; objects with neither
/// name nor description fall back to their value (truncated) or to
/// [`UNTAGGED_CAPTION`].
pub fn compose_caption(role: Role, name: &str, description: &str, value: &str) -> String {
    let mut caption = format!("{}, ", role.label());

    match (name.is_empty(), description.is_empty()) {
        (false, false) => {
            caption.push_str(name);
            caption.push_str(", ");
            caption.push_str(description);
        }
        (false, true) => caption.push_str(name),
        (true, false) => caption.push_str(description),
        (true, true) if !value.is_empty() => {
            if value.chars().count() > CAPTION_VALUE_LIMIT {
                caption.extend(value.chars().take(CAPTION_VALUE_LIMIT));
                caption.push_str("...");
            } else {
                caption.push_str(value);
            }
        }
        (true, true) => caption.push_str(UNTAGGED_CAPTION),
    }

    caption
}
