use serde_json::json;
use supplytrack_core::db::open_db_in_memory;
use supplytrack_core::{
    EventRepository, ItemFields, NewItem, ServiceError, SqliteEventRepository, SqliteItemService,
};
use uuid::Uuid;

#[test]
fn create_item_rejects_invalid_payload_and_persists_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteItemService::sqlite(&conn);

    let err = service
        .create_item(&json!({"color": "red", "weight": 3}))
        .unwrap_err();
    match err {
        ServiceError::Validation(violations) => assert_eq!(
            violations,
            vec![
                "must have required property 'name'",
                "must NOT have additional property 'weight'",
            ]
        ),
        other => panic!("unexpected error: {other}"),
    }
    assert!(service.list_items().unwrap().is_empty());
}

#[test]
fn created_item_can_be_fetched_by_id() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteItemService::sqlite(&conn);

    let created = service
        .create_item(&json!({"name": "Widget", "color": "red", "price": 9.99}))
        .unwrap();
    let fetched = service.get_item(created.id).unwrap();

    assert_eq!(fetched.name, "Widget");
    assert_eq!(fetched.color.as_deref(), Some("red"));
    assert_eq!(fetched.price, Some(9.99));
    assert_eq!(fetched.reference_data, None);
}

#[test]
fn insert_item_accepts_reference_data() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteItemService::sqlite(&conn);

    let created = service
        .insert_item(&NewItem {
            fields: ItemFields::named("Drum"),
            reference_data: Some(json!({"hazmat": true})),
        })
        .unwrap();

    let fetched = service.get_item(created.id).unwrap();
    assert_eq!(fetched.reference_data, Some(json!({"hazmat": true})));
}

#[test]
fn get_and_update_unknown_item_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteItemService::sqlite(&conn);
    let missing = Uuid::new_v4();

    assert!(matches!(
        service.get_item(missing).unwrap_err(),
        ServiceError::ItemNotFound(id) if id == missing
    ));
    assert!(matches!(
        service.update_item(missing, &json!({"name": "Ghost"})).unwrap_err(),
        ServiceError::ItemNotFound(id) if id == missing
    ));
    assert!(service.list_items().unwrap().is_empty());
}

#[test]
fn update_validates_before_lookup() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteItemService::sqlite(&conn);

    let err = service
        .update_item(Uuid::new_v4(), &json!({"name": "x", "extra": 1}))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[test]
fn add_event_appends_reference_and_lists_full_events() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteItemService::sqlite(&conn);

    let item = service.create_item(&json!({"name": "Widget"})).unwrap();
    let updated = service
        .add_event(
            item.id,
            &json!({"location": "Warehouse A", "custodian": "Alice"}),
        )
        .unwrap();
    assert_eq!(updated.events.len(), 1);

    let events = service.list_item_events(item.id).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, updated.events[0]);
    assert_eq!(events[0].location, "Warehouse A");
    assert_eq!(events[0].custodian, "Alice");
}

#[test]
fn add_event_rejects_invalid_payload_without_writing_event() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteItemService::sqlite(&conn);
    let item = service.create_item(&json!({"name": "Widget"})).unwrap();

    let err = service
        .add_event(item.id, &json!({"location": "Dock"}))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let stored: i64 = conn
        .query_row("SELECT COUNT(*) FROM events;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored, 0);
}

#[test]
fn add_event_to_unknown_item_leaves_orphan_event() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteItemService::sqlite(&conn);
    let missing = Uuid::new_v4();

    let err = service
        .add_event(missing, &json!({"location": "Dock", "custodian": "Frank"}))
        .unwrap_err();
    assert!(matches!(err, ServiceError::ItemNotFound(id) if id == missing));

    let orphan_id: String = conn
        .query_row("SELECT uuid FROM events;", [], |row| row.get(0))
        .unwrap();
    let events = SqliteEventRepository::new(&conn);
    let orphan = events
        .get_event(Uuid::parse_str(&orphan_id).unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(orphan.custodian, "Frank");
}
