use serde_json::json;

use super::*;

fn project(id: &str) -> Project {
    Project::new(id, format!("Board {id}"))
}

// =============================================================================
// Project record
// =============================================================================

#[test]
fn project_record_uses_dashboard_field_names() {
    let mut p = project("abc");
    p.canvas_data = Some(json!({"background": "#ffffff", "objects": []}));
    let value = serde_json::to_value(&p).unwrap();

    assert_eq!(value["id"], "abc");
    assert_eq!(value["type"], "board");
    assert!(value["createdAt"].is_string());
    assert!(value["updatedAt"].is_string());
    assert!(value["canvasData"].is_object());
}

#[test]
fn project_record_preserves_unknown_fields() {
    let raw = json!({
        "id": "p1",
        "name": "Imported",
        "type": "import",
        "createdAt": "2024-03-01T10:00:00.000Z",
        "updatedAt": "2024-03-02T11:30:00.000Z",
        "starred": true,
        "thumbnail": "data:image/png;base64,AAAA"
    });
    let p: Project = serde_json::from_value(raw).unwrap();
    assert_eq!(p.kind, ProjectKind::Import);
    assert_eq!(p.extra.get("starred"), Some(&json!(true)));
    assert!(p.canvas_data.is_none());

    let back = serde_json::to_value(&p).unwrap();
    assert_eq!(back["starred"], true);
    assert_eq!(back["thumbnail"], "data:image/png;base64,AAAA");
}

#[test]
fn project_record_tolerates_missing_metadata() {
    let p: Project = serde_json::from_value(json!({"id": "bare"})).unwrap();
    assert_eq!(p.kind, ProjectKind::Board);
    assert!(p.name.is_empty());
    assert!(p.created_at.is_none());
    assert!(p.updated_at.is_none());
}

#[test]
fn store_error_codes() {
    let io = StoreError::Io(std::io::Error::other("disk"));
    assert_eq!(io.error_code(), "E_STORE_IO");
    assert!(io.retryable());
    assert_eq!(StoreError::Rejected("quota".into()).error_code(), "E_STORE_REJECTED");
    let parse = serde_json::from_str::<Project>("{").unwrap_err();
    assert!(!StoreError::from(parse).retryable());
}

// =============================================================================
// MemoryStore
// =============================================================================

#[tokio::test]
async fn memory_store_get_put() {
    let store = MemoryStore::new();
    assert!(store.get("missing").await.unwrap().is_none());

    store.put(project("a")).await.unwrap();
    assert_eq!(store.get("a").await.unwrap().unwrap().name, "Board a");
    assert_eq!(store.len().await, 1);

    let mut renamed = project("a");
    renamed.name = "Renamed".into();
    store.put(renamed).await.unwrap();
    assert_eq!(store.get("a").await.unwrap().unwrap().name, "Renamed");
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn memory_store_seeded() {
    let store = MemoryStore::with_projects([project("a"), project("b")]);
    assert_eq!(store.len().await, 2);
    assert!(!store.is_empty().await);
}

// =============================================================================
// JsonFileStore
// =============================================================================

#[tokio::test]
async fn json_store_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("projects.json"));
    assert!(store.list().await.unwrap().is_empty());
    assert!(store.get("a").await.unwrap().is_none());
}

#[tokio::test]
async fn json_store_put_replaces_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("projects.json"));
    store.put(project("a")).await.unwrap();
    store.put(project("b")).await.unwrap();

    let mut updated = project("a");
    updated.canvas_data = Some(json!({"objects": []}));
    store.put(updated).await.unwrap();

    let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, ["a", "b"]);
    assert!(store.get("a").await.unwrap().unwrap().canvas_data.is_some());
}

#[tokio::test]
async fn json_store_reads_dashboard_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("projects.json");
    let body = json!([
        {"id": "x1", "name": "Sketch", "type": "board", "createdAt": "2024-01-01T00:00:00.000Z",
         "updatedAt": "2024-01-01T00:00:00.000Z", "starred": false}
    ]);
    std::fs::write(&path, body.to_string()).unwrap();

    let store = JsonFileStore::new(&path);
    let p = store.get("x1").await.unwrap().unwrap();
    assert_eq!(p.name, "Sketch");
    assert_eq!(p.extra.get("starred"), Some(&json!(false)));
}

#[tokio::test]
async fn json_store_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("projects.json");
    std::fs::write(&path, "not json").unwrap();

    let store = JsonFileStore::new(&path);
    let err = store.get("x").await.unwrap_err();
    assert_eq!(err.error_code(), "E_STORE_SERIALIZE");
}

#[tokio::test]
async fn json_store_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("projects.json"));
    store.put(project("a")).await.unwrap();

    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["projects.json"]);
    assert_eq!(store.path(), dir.path().join("projects.json"));
}
