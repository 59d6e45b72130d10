use axinspect_analyze::{FavoriteStore, FilterState, IdentityError, RoleCategory};
use axinspect_core::memory::{MemoryNode, MemoryTree, NodeSpec};
use axinspect_core::{AncestryPath, InspectConfig, NodeSnapshot, Role, ScanError};
use axinspect_inspector::{InspectError, Inspector, PositionError};
use tempfile::TempDir;

fn confirm_dialog() -> MemoryNode {
    MemoryTree::build(
        "setup",
        NodeSpec::visible(Role::Window)
            .named("Setup")
            .with_children(vec![
                NodeSpec::visible(Role::Pane).with_children(vec![
                    NodeSpec::visible(Role::StaticText).named("Install now?"),
                ]),
                NodeSpec::visible(Role::Button).named("OK"),
                NodeSpec::visible(Role::Button).named("Cancel"),
            ]),
    )
}

fn inspector(temp: &TempDir) -> Inspector<MemoryNode> {
    inspector_at(temp.path().join("favorites.json"))
}

/// Favorites stored below a regular file, so every save fails.
fn unwritable_inspector(temp: &TempDir) -> Inspector<MemoryNode> {
    let blocker = temp.path().join("blocker");
    std::fs::write(&blocker, b"").unwrap();
    inspector_at(blocker.join("favorites.json"))
}

fn inspector_at(path: std::path::PathBuf) -> Inspector<MemoryNode> {
    Inspector::new(
        InspectConfig::builder()
            .self_app_name(Some("axinspect".to_string()))
            .build()
            .unwrap(),
        FavoriteStore::open(path),
    )
}

#[tokio::test]
async fn test_scan_and_view() {
    let temp = TempDir::new().unwrap();
    let mut inspector = inspector(&temp);

    assert!(matches!(inspector.view(), Err(InspectError::NoSnapshot)));

    let count = inspector.scan(confirm_dialog()).await.unwrap().len();
    assert_eq!(count, 5);

    let view = inspector.view().unwrap();
    assert_eq!(view.title, "Objects in setup window");
    assert_eq!(view.label, "5 items");
    assert!(view.filters_enabled);
    assert_eq!(view.position_message(Some(1)), "Result 2 of 5");
}

#[tokio::test]
async fn test_own_dialog_is_refused() {
    let temp = TempDir::new().unwrap();
    let mut inspector = inspector(&temp);

    let own = MemoryTree::build("axinspect", NodeSpec::visible(Role::Dialog).named("Objects"));
    let err = inspector.scan(own).await.unwrap_err();
    assert!(matches!(err, InspectError::Scan(ScanError::Unavailable { .. })));
    assert!(inspector.snapshot().is_none());

    // Other applications' dialogs are fine.
    let other = MemoryTree::build("setup", NodeSpec::visible(Role::Dialog).named("Confirm"));
    assert!(inspector.scan(other).await.is_ok());
}

#[tokio::test]
async fn test_failed_scan_keeps_previous_snapshot() {
    let temp = TempDir::new().unwrap();
    let mut inspector = inspector(&temp);
    inspector.scan(confirm_dialog()).await.unwrap();

    let broken = MemoryTree::build(
        "setup",
        NodeSpec::visible(Role::Window)
            .with_children(vec![NodeSpec::visible(Role::Button).faulty()]),
    );
    let err = inspector.scan(broken).await.unwrap_err();
    assert!(matches!(err, InspectError::Scan(ScanError::NodeAccess { .. })));
    assert_eq!(inspector.snapshot().unwrap().len(), 5);
}

#[tokio::test]
async fn test_filter_and_clear() {
    let temp = TempDir::new().unwrap();
    let mut inspector = inspector(&temp);
    inspector.scan(confirm_dialog()).await.unwrap();

    let view = inspector
        .apply_filter(FilterState::new().with_role_category(RoleCategory::Interactive))
        .unwrap();
    assert_eq!(view.label, "2 items [filter active]");
    assert_eq!(view.jump_to("2").unwrap().caption, "button, Cancel");
    assert!(matches!(
        view.jump_to("3"),
        Err(PositionError::Invalid { total: 2, .. })
    ));

    let view = inspector.clear_filter().unwrap();
    assert_eq!(view.len(), 5);
    assert!(inspector.filter().is_cleared());
}

#[tokio::test]
async fn test_relatives_disable_filters() {
    let temp = TempDir::new().unwrap();
    let mut inspector = inspector(&temp);
    inspector.scan(confirm_dialog()).await.unwrap();

    let ok = inspector.locate(&AncestryPath::from(vec![1])).unwrap();
    let view = inspector.siblings(&ok).unwrap();
    assert_eq!(view.label, "3 siblings of button, OK");
    assert!(!view.filters_enabled);
    assert!(!inspector.filters_enabled());

    assert!(matches!(
        inspector.apply_filter(FilterState::new().with_search("ok")),
        Err(InspectError::FiltersDisabled)
    ));

    let root = inspector.locate(&AncestryPath::root()).unwrap();
    let view = inspector.children(&root).unwrap();
    assert_eq!(view.label, "3 children of window, Setup");

    let text = inspector.locate(&AncestryPath::from(vec![0, 0])).unwrap();
    let view = inspector.ascendants(&text).unwrap();
    assert_eq!(view.label, "3 ascendants of static text, Install now?");

    let view = inspector.clear_filter().unwrap();
    assert!(view.filters_enabled);
    assert_eq!(view.label, "5 items");
}

#[tokio::test]
async fn test_favorite_persists_across_sessions() {
    let temp = TempDir::new().unwrap();

    {
        let mut inspector = inspector(&temp);
        inspector.scan(confirm_dialog()).await.unwrap();
        assert_eq!(inspector.wait_for_favorites().await.unwrap(), 0);

        let ok = inspector.locate(&AncestryPath::from(vec![1])).unwrap();
        let outcome = inspector.toggle_favorite(&ok).await.unwrap();
        assert!(outcome.favorited);
        assert!(outcome.save_error.is_none());
        assert_eq!(outcome.message(), "Favorited");
    }

    let mut inspector = inspector(&temp);
    assert_eq!(inspector.favorites().len(), 1);
    inspector.scan(confirm_dialog()).await.unwrap();
    assert_eq!(inspector.wait_for_favorites().await.unwrap(), 1);
    assert!(inspector.is_favorites_ready());

    let view = inspector
        .apply_filter(FilterState::new().only_favorites(true))
        .unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view.entries[0].path, AncestryPath::from(vec![1]));

    let ok = view.entries[0].clone();
    let outcome = inspector.toggle_favorite(&ok).await.unwrap();
    assert_eq!(outcome.message(), "Unfavorited");
    assert!(inspector.view().unwrap().is_empty());
}

#[tokio::test]
async fn test_export_and_import() {
    let temp = TempDir::new().unwrap();
    let export = temp.path().join("export.json");

    let mut source = inspector(&temp);
    source.scan(confirm_dialog()).await.unwrap();
    let cancel = source.locate(&AncestryPath::from(vec![2])).unwrap();
    source.toggle_favorite(&cancel).await.unwrap();
    assert_eq!(source.export_favorites(&export, false).unwrap(), 1);
    assert!(source.export_favorites(&export, false).is_err());

    let other_dir = TempDir::new().unwrap();
    let mut target = inspector(&other_dir);
    target.scan(confirm_dialog()).await.unwrap();

    let outcome = target.import_favorites(&export).await.unwrap();
    assert_eq!(outcome.summary.message(), "1 favorites added, 1 total");
    assert!(outcome.save_error.is_none());
    assert_eq!(target.wait_for_favorites().await.unwrap(), 1);

    let again = target.import_favorites(&export).await.unwrap();
    assert_eq!(again.summary.added, 0);
}

#[tokio::test]
async fn test_failed_save_keeps_favorite() {
    let temp = TempDir::new().unwrap();
    let mut inspector = unwritable_inspector(&temp);
    inspector.scan(confirm_dialog()).await.unwrap();

    let ok = inspector.locate(&AncestryPath::from(vec![1])).unwrap();
    let outcome = inspector.toggle_favorite(&ok).await.unwrap();
    assert!(outcome.favorited);
    assert!(outcome.save_error.is_some());
    assert_eq!(inspector.favorites().len(), 1);
    assert!(inspector.locate(&ok.path).unwrap().favorite);
}

#[tokio::test]
async fn test_failed_save_keeps_import() {
    let temp = TempDir::new().unwrap();
    let export = temp.path().join("export.json");

    let mut source = inspector(&temp);
    source.scan(confirm_dialog()).await.unwrap();
    let cancel = source.locate(&AncestryPath::from(vec![2])).unwrap();
    source.toggle_favorite(&cancel).await.unwrap();
    source.export_favorites(&export, false).unwrap();

    let mut target = unwritable_inspector(&temp);
    target.scan(confirm_dialog()).await.unwrap();
    let outcome = target.import_favorites(&export).await.unwrap();
    assert_eq!(outcome.summary.added, 1);
    assert!(outcome.save_error.is_some());
    assert_eq!(target.favorites().len(), 1);
    assert_eq!(target.wait_for_favorites().await.unwrap(), 1);
    assert!(target.locate(&cancel.path).unwrap().favorite);
}

#[tokio::test]
async fn test_vanished_object_can_not_be_favorited() {
    let temp = TempDir::new().unwrap();
    let mut inspector = inspector(&temp);
    inspector.scan(confirm_dialog()).await.unwrap();

    let gone = NodeSnapshot::new(
        AncestryPath::from(vec![9]),
        Role::Button,
        Some("Gone"),
        None,
        None,
    );
    let err = inspector.toggle_favorite(&gone).await.unwrap_err();
    assert!(matches!(
        err,
        InspectError::Identity(IdentityError::Lookup(..))
    ));
    assert!(inspector.favorites().is_empty());
    assert_eq!(inspector.snapshot().unwrap().favorite_count(), 0);
}
