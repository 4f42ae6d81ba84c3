use serde_json::json;
use supplytrack_core::db::open_db_in_memory;
use supplytrack_core::{
    ItemFields, ItemRepository, NewItem, RepoError, SqliteItemRepository,
};
use uuid::Uuid;

fn widget() -> ItemFields {
    ItemFields {
        name: "Widget".to_string(),
        color: Some("red".to_string()),
        price: Some(9.99),
    }
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    let created = repo.create_item(&NewItem::from(widget())).unwrap();
    assert!(!created.id.is_nil());
    assert!(created.events.is_empty());

    let loaded = repo.get_item(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.fields(), widget());
}

#[test]
fn create_preserves_reference_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    let item = NewItem {
        fields: ItemFields::named("Container"),
        reference_data: Some(json!({"sku": "C-42", "dims": [2.4, 2.6, 12.2]})),
    };
    let created = repo.create_item(&item).unwrap();

    let loaded = repo.get_item(created.id).unwrap().unwrap();
    assert_eq!(
        loaded.reference_data,
        Some(json!({"sku": "C-42", "dims": [2.4, 2.6, 12.2]}))
    );
}

#[test]
fn get_unknown_item_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    assert!(repo.get_item(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn list_returns_items_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    assert!(repo.list_items().unwrap().is_empty());

    let names = ["zeta", "alpha", "mid"];
    let ids = names
        .iter()
        .map(|name| repo.create_item(&ItemFields::named(*name).into()).unwrap().id)
        .collect::<Vec<_>>();

    let listed = repo.list_items().unwrap();
    assert_eq!(listed.iter().map(|item| item.id).collect::<Vec<_>>(), ids);
    assert_eq!(
        listed.iter().map(|item| item.name.as_str()).collect::<Vec<_>>(),
        names
    );
}

#[test]
fn update_replaces_mutable_fields_and_keeps_reference_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    let created = repo
        .create_item(&NewItem {
            fields: widget(),
            reference_data: Some(json!({"batch": 7})),
        })
        .unwrap();

    let updated = repo
        .update_item(created.id, &ItemFields::named("Widget v2"))
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Widget v2");
    assert_eq!(updated.color, None);
    assert_eq!(updated.price, None);
    assert_eq!(updated.reference_data, Some(json!({"batch": 7})));

    let loaded = repo.get_item(created.id).unwrap().unwrap();
    assert_eq!(loaded, updated);
}

#[test]
fn update_not_found_returns_not_found_and_creates_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);
    let missing = Uuid::new_v4();

    let err = repo.update_item(missing, &widget()).unwrap_err();
    assert!(matches!(err, RepoError::ItemNotFound(id) if id == missing));
    assert!(repo.list_items().unwrap().is_empty());
}

#[test]
fn validation_failure_blocks_create_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    let mut invalid = widget();
    invalid.price = Some(f64::INFINITY);
    let create_err = repo.create_item(&invalid.clone().into()).unwrap_err();
    assert!(matches!(create_err, RepoError::Validation(_)));

    let created = repo.create_item(&widget().into()).unwrap();
    let update_err = repo.update_item(created.id, &invalid).unwrap_err();
    assert!(matches!(update_err, RepoError::Validation(_)));

    let loaded = repo.get_item(created.id).unwrap().unwrap();
    assert_eq!(loaded.price, Some(9.99));
}

#[test]
fn corrupt_persisted_uuid_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO items (uuid, name) VALUES ('not-a-uuid', 'broken');",
        [],
    )
    .unwrap();
    let repo = SqliteItemRepository::new(&conn);

    let err = repo.list_items().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("items.uuid")));
}
