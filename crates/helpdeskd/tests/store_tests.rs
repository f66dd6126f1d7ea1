//! Repository behaviour shared by both backends, plus file durability.

use helpdesk_shared::inventory::{Condition, InventoryItem};
use helpdesk_shared::{DeskError, Role, User};
use helpdeskd::store::{JsonFileRepository, MemoryRepository, Repositories, Repository};

fn item(id: &str, stock: u32) -> InventoryItem {
    InventoryItem {
        id: id.to_string(),
        name: format!("Item {}", id),
        category: "consumable".to_string(),
        stock,
        min_stock: 1,
        location: "Gudang".to_string(),
        condition: Condition::Baik,
        version: 0,
    }
}

/// Contract every backend must satisfy
fn exercise(repo: &dyn Repository<InventoryItem>) {
    let stored = repo.insert(item("a", 5)).unwrap();
    assert_eq!(stored.version, 1);

    let dup = repo.insert(item("a", 1)).unwrap_err();
    assert!(matches!(dup, DeskError::Conflict(_)));

    let mut fresh = repo.require("a").unwrap();
    let stale = fresh.clone();
    fresh.stock = 4;
    let updated = repo.update(fresh).unwrap();
    assert_eq!(updated.version, 2);
    assert_eq!(repo.require("a").unwrap().stock, 4);

    // Writing an out-of-date copy is refused and changes nothing
    let err = repo.update(stale).unwrap_err();
    match err {
        DeskError::VersionMismatch {
            expected, found, ..
        } => {
            assert_eq!(expected, 1);
            assert_eq!(found, 2);
        }
        other => panic!("expected version mismatch, got {:?}", other),
    }
    assert_eq!(repo.require("a").unwrap().stock, 4);

    let missing = repo.update(item("zzz", 1)).unwrap_err();
    assert!(matches!(missing, DeskError::NotFound { .. }));
    assert_eq!(repo.require("zzz").unwrap_err().status_code(), 404);

    repo.insert(item("b", 0)).unwrap();
    assert_eq!(repo.list().unwrap().len(), 2);
    assert!(repo.delete("a").unwrap());
    assert!(!repo.delete("a").unwrap());
    assert!(repo.get("a").unwrap().is_none());
}

#[test]
fn test_memory_repository_contract() {
    exercise(&MemoryRepository::<InventoryItem>::new());
}

#[test]
fn test_json_repository_contract() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonFileRepository::<InventoryItem>::open(dir.path()).unwrap();
    exercise(&repo);
}

#[test]
fn test_json_repository_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let repo = JsonFileRepository::<User>::open(dir.path()).unwrap();
        repo.insert(User::new("u1", "Andi", "andi@kampus.ac.id", vec![Role::User]))
            .unwrap();
        let mut u = repo.require("u1").unwrap();
        u.unit = "Biro Umum".to_string();
        repo.update(u).unwrap();
    }

    let reopened = JsonFileRepository::<User>::open(dir.path()).unwrap();
    let u = reopened.require("u1").unwrap();
    assert_eq!(u.unit, "Biro Umum");
    assert_eq!(u.version, 2);

    assert!(reopened.path().ends_with("users.json"));
    assert!(!dir.path().join("users.json.tmp").exists());
}

#[test]
fn test_json_repository_rejects_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("users.json"), "{ not json").unwrap();
    let err = JsonFileRepository::<User>::open(dir.path()).err().unwrap();
    assert_eq!(err.status_code(), 500);
}

#[test]
fn test_open_json_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("nested/data");
    let repos = Repositories::open_json(&data).unwrap();
    repos.users
        .insert(User::new("u1", "Andi", "a@kampus.ac.id", vec![Role::User]))
        .unwrap();
    assert!(data.join("users.json").exists());
}

#[test]
fn test_legacy_status_file_loads() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = r#"[{
        "id": "wo-1",
        "ticket_id": "t-1",
        "ticket_number": "TKT-PR-20240105-0042",
        "type": "vendor",
        "description": "Service PSU",
        "status": "diproses",
        "requested_by": {"id": "tek-1", "name": "Budi"},
        "created_at": "2024-01-05T02:00:00Z",
        "updated_at": "2024-01-05T02:00:00Z",
        "version": 3
    }]"#;
    std::fs::write(dir.path().join("work_orders.json"), legacy).unwrap();

    let repo = JsonFileRepository::<helpdesk_shared::WorkOrder>::open(dir.path()).unwrap();
    let order = repo.require("wo-1").unwrap();
    assert_eq!(order.status, helpdesk_shared::WorkOrderStatus::InProcurement);

    // Rewritten with the canonical name
    repo.update(order).unwrap();
    let raw = std::fs::read_to_string(dir.path().join("work_orders.json")).unwrap();
    assert!(raw.contains("\"in_procurement\""));
    assert!(!raw.contains("diproses"));
}
