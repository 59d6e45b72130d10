//! Structural identity of objects across scans.
//!
//! An object's identifier is a BLAKE3 digest over facts that survive content
//! changes: the owning application, the role and window class of every
//! object from the root down to it, and its path. Names, descriptions and
//! values are left out, so a favorite survives a counter ticking or a title
//! changing, but not a sibling being inserted before it.
//!
//! The chain is read from the live tree at hash time, not from the cached
//! snapshot entries.

use std::fmt;

use blake3::Hasher;
use serde::{Deserialize, Serialize};

use axinspect_core::{AccessibleNode, AncestryPath, NodeSnapshot, Snapshot, resolve_chain};

use crate::error::IdentityError;

/// BLAKE3 digest identifying an object across sessions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct StableId(pub [u8; 32]);

impl StableId {
    /// Create a new identifier from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Get the identifier as a hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(input: &str) -> Result<Self, IdentityError> {
        let invalid = |reason| IdentityError::InvalidId {
            input: input.to_string(),
            reason,
        };

        if input.len() != 64 || !input.is_ascii() {
            return Err(invalid("expected 64 hex digits"));
        }

        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&input[i * 2..i * 2 + 2], 16)
                .map_err(|_| invalid("not a hex digit"))?;
        }
        Ok(Self(bytes))
    }
}

impl fmt::Debug for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StableId({})", self.to_hex())
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<StableId> for String {
    fn from(id: StableId) -> Self {
        id.to_hex()
    }
}

impl TryFrom<String> for StableId {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

/// Computes [`StableId`]s by re-resolving paths through the live tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityHasher;

impl IdentityHasher {
    pub fn new() -> Self {
        Self
    }

    /// Identify a snapshot entry.
    pub fn identify<N: AccessibleNode>(
        &self,
        snapshot: &Snapshot<N>,
        node: &NodeSnapshot,
    ) -> Result<StableId, IdentityError> {
        self.identify_path(snapshot.root(), &node.path)
    }

    /// Identify the object at `path` below `root`.
    pub fn identify_path<N: AccessibleNode>(
        &self,
        root: &N,
        path: &AncestryPath,
    ) -> Result<StableId, IdentityError> {
        let text = self.canonical_form(root, path)?;
        let mut hasher = Hasher::new();
        hasher.update(text.as_bytes());
        Ok(StableId(*hasher.finalize().as_bytes()))
    }

    /// Text that gets hashed.
    ///
    /// ```text
    /// <application name>
    /// <root role> <root window class>
    ///  <role> <window class>        one line per path element
    /// <path expression>
    /// ```
    ///
    /// The second line describes the root rather than the target, so the
    /// target's own role and class enter only through its path element.
    pub fn canonical_form<N: AccessibleNode>(
        &self,
        root: &N,
        path: &AncestryPath,
    ) -> Result<String, IdentityError> {
        let chain = resolve_chain(root, path)?;

        let target = &chain[chain.len() - 1];
        let app_name = target.app_name().map_err(|source| IdentityError::Node {
            path: path.clone(),
            source,
        })?;

        let mut text = format!("{app_name}\n{}\n", structural_line(root, &AncestryPath::root())?);

        let mut walked = AncestryPath::root();
        for (node, index) in chain[1..].iter().zip(path.iter()) {
            walked = walked.child(index);
            text.push(' ');
            text.push_str(&structural_line(node, &walked)?);
            text.push('\n');
        }

        text.push_str(&path.describe());
        Ok(text)
    }
}

fn structural_line<N: AccessibleNode>(
    node: &N,
    path: &AncestryPath,
) -> Result<String, IdentityError> {
    let attr_error = |source| IdentityError::Node {
        path: path.clone(),
        source,
    };
    let role = node.role().map_err(attr_error)?;
    let window_class = node.window_class().map_err(attr_error)?;
    Ok(format!("{} {}", role.as_str(), window_class))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axinspect_core::memory::{MemoryNode, MemoryTree, NodeSpec};
    use axinspect_core::{ResolveError, Role};

    fn tree(counter: &str) -> MemoryNode {
        MemoryTree::build(
            "clock",
            NodeSpec::visible(Role::Window)
                .with_class("ClockFrame")
                .with_children(vec![NodeSpec::visible(Role::Pane)
                    .with_class("Panel")
                    .with_children(vec![NodeSpec::visible(Role::StaticText)
                        .with_class("Static")
                        .named(counter)])]),
        )
    }

    #[test]
    fn test_canonical_form() {
        let text = IdentityHasher::new()
            .canonical_form(&tree("1"), &AncestryPath::from(vec![0, 0]))
            .unwrap();
        assert_eq!(
            text,
            "clock\nwindow ClockFrame\n pane Panel\n static_text Static\nroot.child[0].child[0]"
        );
    }

    #[test]
    fn test_canonical_form_root() {
        let text = IdentityHasher::new()
            .canonical_form(&tree("1"), &AncestryPath::root())
            .unwrap();
        assert_eq!(text, "clock\nwindow ClockFrame\nroot");
    }

    #[test]
    fn test_name_does_not_change_identity() {
        let hasher = IdentityHasher::new();
        let path = AncestryPath::from(vec![0, 0]);
        let a = hasher.identify_path(&tree("1"), &path).unwrap();
        let b = hasher.identify_path(&tree("42"), &path).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_path_is_lookup_error() {
        let err = IdentityHasher::new()
            .identify_path(&tree("1"), &AncestryPath::from(vec![0, 3]))
            .unwrap_err();
        assert!(matches!(
            err,
            IdentityError::Lookup(ResolveError::MissingChild { index: 3, .. })
        ));
    }

    #[test]
    fn test_hex_round_trip() {
        let id = IdentityHasher::new()
            .identify_path(&tree("1"), &AncestryPath::root())
            .unwrap();
        let hex = id.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(StableId::from_hex(&hex).unwrap(), id);
        assert!(StableId::from_hex("abc").is_err());
        assert!(StableId::from_hex(&"zz".repeat(32)).is_err());
    }
}
