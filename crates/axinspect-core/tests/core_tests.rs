use axinspect_core::memory::{MemoryTree, NodeSpec, TreeDump};
use axinspect_core::{
    AccessibleNode, AncestryPath, Bounds, NodeSnapshot, Role, Snapshot, State, StateSet,
    UNTAGGED_CAPTION, resolve,
};
use std::time::Duration;

fn sample_tree() -> axinspect_core::memory::MemoryNode {
    MemoryTree::build(
        "explorer",
        NodeSpec::visible(Role::Window)
            .named("Downloads")
            .with_class("CabinetWClass")
            .with_children(vec![
                NodeSpec::visible(Role::ToolBar).with_children(vec![
                    NodeSpec::visible(Role::Button).named("Back"),
                    NodeSpec::visible(Role::Button).named("Forward"),
                ]),
                NodeSpec::visible(Role::List).with_children(vec![
                    NodeSpec::visible(Role::ListItem).named("report.pdf"),
                    NodeSpec::visible(Role::ListItem).named("photo.png"),
                    NodeSpec::visible(Role::ListItem).named("notes.txt"),
                ]),
            ]),
    )
}

#[test]
fn test_path_expression_round_trip() {
    let paths = [
        AncestryPath::root(),
        AncestryPath::from(vec![0]),
        AncestryPath::from(vec![1, 2]),
        AncestryPath::from(vec![10, 0, 7, 3]),
    ];

    for path in paths {
        let expr = path.describe();
        let parsed: AncestryPath = expr.parse().unwrap();
        assert_eq!(parsed, path, "expression {expr}");
    }
}

#[test]
fn test_path_expression_resolves_to_origin() {
    let root = sample_tree();

    // Accumulate a path by walking children, then resolve its expression.
    let list = root.child_at(1).unwrap().unwrap();
    let item = list.child_at(2).unwrap().unwrap();
    let path = AncestryPath::root().child(1).child(2);

    let parsed: AncestryPath = path.describe().parse().unwrap();
    let found = resolve(&root, &parsed).unwrap();
    assert_eq!(found, item);
    assert_eq!(found.name().unwrap().as_deref(), Some("notes.txt"));
}

#[test]
fn test_capture_snapshot_entry() {
    let root = sample_tree();
    let button = resolve(&root, &AncestryPath::from(vec![0, 1])).unwrap();
    let entry = NodeSnapshot::capture(&button, AncestryPath::from(vec![0, 1])).unwrap();

    assert_eq!(entry.caption, "button, Forward");
    assert_eq!(entry.role, Role::Button);
    assert!(entry.tagged);
    assert!(!entry.favorite);
}

#[test]
fn test_untagged_caption() {
    let entry = NodeSnapshot::new(AncestryPath::root(), Role::Grouping, None, None, None);
    assert_eq!(entry.caption, format!("grouping, {UNTAGGED_CAPTION}"));
    assert!(!entry.tagged);
}

#[test]
fn test_caption_truncates_by_characters() {
    let value: String = "é".repeat(55);
    let entry = NodeSnapshot::new(
        AncestryPath::root(),
        Role::StaticText,
        None,
        None,
        Some(value.as_str()),
    );
    let shown = entry.caption.trim_start_matches("static text, ");
    assert_eq!(shown.chars().count(), 53);
    assert!(shown.ends_with("..."));
}

#[test]
fn test_snapshot_accessors() {
    let root = sample_tree();
    let nodes = vec![
        NodeSnapshot::capture(&root, AncestryPath::root()).unwrap(),
        NodeSnapshot::new(AncestryPath::from(vec![0]), Role::ToolBar, None, None, None),
    ];
    let mut snapshot = Snapshot::new(root, nodes, "explorer", Duration::from_millis(3));

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.title(), "Objects in explorer window");
    assert_eq!(snapshot.label(), "2 items");
    assert_eq!(snapshot.position_of(&AncestryPath::from(vec![0])), Some(1));

    assert!(snapshot.set_favorite(&AncestryPath::from(vec![0]), true));
    assert!(!snapshot.set_favorite(&AncestryPath::from(vec![5]), true));
    assert_eq!(snapshot.favorite_count(), 1);

    snapshot.mark_favorites(&[0, 9]);
    assert_eq!(snapshot.favorite_count(), 2);
}

#[test]
fn test_state_set() {
    let states: StateSet = [State::Focusable, State::Invisible].into_iter().collect();
    assert!(states.is_invisible());
    assert_eq!(states.len(), 2);
    assert!(!StateSet::new().is_invisible());
}

#[test]
fn test_dump_serde() {
    let dump = TreeDump {
        app_name: "paint".to_string(),
        root: NodeSpec::visible(Role::Window)
            .with_children(vec![NodeSpec::new(Role::Canvas).at(Bounds::new(5, 5, 50, 50))]),
    };
    let json = serde_json::to_string(&dump).unwrap();
    let root = MemoryTree::from_json(&json).unwrap();

    assert_eq!(root.app_name().unwrap(), "paint");
    let canvas = root.child_at(0).unwrap().unwrap();
    assert_eq!(canvas.location().unwrap(), Some(Bounds::new(5, 5, 50, 50)));
}
