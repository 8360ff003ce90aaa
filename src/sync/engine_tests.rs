use super::*;
use crate::item::Skill;
use crate::store::MemoryStore;

fn skill(id: &str, order: Option<u32>) -> Skill {
    Skill {
        id: id.to_string(),
        order,
        name: id.to_uppercase(),
        icon_url: None,
        category: None,
        created_at: None,
        updated_at: None,
    }
}

fn abc() -> Vec<Skill> {
    vec![skill("a", Some(0)), skill("b", Some(1)), skill("c", Some(2))]
}

fn ids(items: &[Skill]) -> Vec<&str> {
    items.iter().map(|s| s.id.as_str()).collect()
}

async fn loaded_engine(items: &[Skill]) -> (Arc<MemoryStore<Skill>>, ReorderEngine<Skill>) {
    let store = Arc::new(MemoryStore::with_items(items).unwrap());
    let engine = ReorderEngine::start(store.clone());
    engine.refresh().await.unwrap();
    (store, engine)
}

#[test]
fn test_plan_reorder_builds_batch() {
    let planned = plan_reorder(&abc(), 0, 2, None).unwrap().unwrap();

    assert_eq!(ids(&planned.items), vec!["b", "c", "a"]);
    let mut updates = planned.updates;
    updates.sort_by(|x, y| x.id.cmp(&y.id));
    assert_eq!(
        updates,
        vec![
            OrderUpdate::new("a", 2),
            OrderUpdate::new("b", 0),
            OrderUpdate::new("c", 1),
        ]
    );
}

#[test]
fn test_plan_reorder_same_index_is_none() {
    assert!(plan_reorder(&abc(), 1, 1, None).unwrap().is_none());
}

#[test]
fn test_plan_reorder_same_index_still_checks_bounds() {
    let result = plan_reorder(&abc(), 5, 5, None);
    assert!(matches!(
        result,
        Err(SyncError::IndexOutOfRange { index: 5, len: 3 })
    ));
}

#[test]
fn test_plan_reorder_detects_stale_index() {
    let result = plan_reorder(&abc(), 0, 2, Some("b"));
    assert!(matches!(
        result,
        Err(SyncError::StaleIndex { ref expected, index: 0 }) if expected == "b"
    ));
}

#[test]
fn test_plan_reorder_stale_when_from_vanished() {
    let result = plan_reorder(&abc(), 3, 0, Some("d"));
    assert!(matches!(result, Err(SyncError::StaleIndex { index: 3, .. })));
}

#[tokio::test]
async fn test_refresh_loads_sorted_collection() {
    let (_store, engine) =
        loaded_engine(&[skill("c", Some(2)), skill("legacy", None), skill("a", Some(0))]).await;

    let view = engine.snapshot();
    assert!(view.is_loaded());
    assert!(!view.is_syncing());
    assert_eq!(ids(view.items()), vec!["a", "c", "legacy"]);
}

#[tokio::test]
async fn test_reorder_is_visible_before_persistence() {
    let (_store, engine) = loaded_engine(&abc()).await;

    let handle = engine.reorder(0, 2).unwrap();

    // Nothing has yielded to the worker yet
    assert!(engine.is_syncing());
    let visible = engine.items();
    assert_eq!(ids(&visible), vec!["b", "c", "a"]);
    assert_eq!(
        visible.iter().map(|s| s.order).collect::<Vec<_>>(),
        vec![Some(0), Some(1), Some(2)]
    );

    handle.wait().await.unwrap();
    assert!(!engine.is_syncing());
}

#[tokio::test]
async fn test_noop_move_returns_ready_handle() {
    let (_store, engine) = loaded_engine(&abc()).await;

    let handle = engine.reorder(1, 1).unwrap();

    assert!(handle.is_noop());
    assert!(!engine.is_syncing());
    handle.wait().await.unwrap();
}

#[tokio::test]
async fn test_out_of_range_leaves_state_untouched() {
    let (_store, engine) = loaded_engine(&abc()).await;

    let result = engine.reorder(0, 3);

    assert!(matches!(
        result,
        Err(SyncError::IndexOutOfRange { index: 3, len: 3 })
    ));
    assert_eq!(ids(&engine.items()), vec!["a", "b", "c"]);
    assert!(!engine.is_syncing());
}

#[tokio::test]
async fn test_apply_move_persists_when_id_matches() {
    let (store, engine) = loaded_engine(&abc()).await;

    engine
        .apply_move(&MoveEvent::new("c", 2, 0))
        .unwrap()
        .wait()
        .await
        .unwrap();

    let mut stored = store.list_items().await.unwrap();
    crate::ordering::sort_for_display(&mut stored);
    assert_eq!(ids(&stored), vec!["c", "a", "b"]);
}

#[tokio::test]
async fn test_subscribers_see_optimistic_state() {
    let (_store, engine) = loaded_engine(&abc()).await;
    let mut receiver = engine.subscribe();
    receiver.borrow_and_update();

    let handle = engine.reorder(2, 0).unwrap();

    assert!(receiver.has_changed().unwrap());
    assert_eq!(ids(receiver.borrow_and_update().items()), vec!["c", "a", "b"]);
    handle.wait().await.unwrap();
}
