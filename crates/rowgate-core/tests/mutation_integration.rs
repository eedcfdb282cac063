//! Integration tests for create, update and delete.

mod common;

use common::{expected, memdb, read_all, row, shot, shot_asset_catalog};
use rowgate_core::{
    Catalog, ColumnDef, ColumnType, Database, DatabaseConfig, Error, IdStrategy, Order,
    ReadRequest, SequenceGenerator, TableDef, UuidGenerator, Value,
};
use serde_json::json;

#[test]
fn test_create_with_generated_ids() {
    let db = memdb().with_id_generator(UuidGenerator::new(32).unwrap());
    let to_create = vec![
        row(&[("name", Value::from("a"))]),
        row(&[("name", Value::from("b")), ("id", Value::Int(123))]),
        row(&[("name", Value::from("c"))]),
    ];

    let ids = db.create("Shot", &to_create, None).unwrap();
    assert_eq!(ids.len(), to_create.len());
    assert_eq!(ids[1], Value::Int(123));
    assert!(ids.iter().all(|id| id.as_i64().is_some()));

    // Caller rows are untouched.
    assert!(!to_create[0].contains_key("id"));
    assert!(!to_create[2].contains_key("id"));

    let rows = read_all(
        &db,
        ReadRequest::new("Shot")
            .filters(json!({"in": {"id": ids}}))
            .order_by("name", Order::Asc),
    );
    let expected_rows: Vec<_> = ["a", "b", "c"]
        .iter()
        .zip(&ids)
        .map(|(name, id)| expected(&[("id", id.clone()), ("name", Value::from(*name))]))
        .collect();
    assert_eq!(rows, expected_rows);
}

#[test]
fn test_create_never_overwrites_keys() {
    let db = Database::open(
        DatabaseConfig::in_memory().with_id_strategy(IdStrategy::Sequence { start: 1 }),
        shot_asset_catalog(),
    )
    .unwrap();

    let ids = db
        .create(
            "Shot",
            &[
                row(&[("name", Value::from("kept")), ("id", Value::Int(2))]),
                row(&[("name", Value::from("generated"))]),
                row(&[("name", Value::from("null key")), ("id", Value::Null)]),
            ],
            None,
        )
        .unwrap();

    // 2 is taken by the caller, so the sequence skips it.
    assert_eq!(ids, vec![Value::Int(2), Value::Int(1), Value::Int(3)]);
    assert_eq!(
        read_all(&db, ReadRequest::new("Shot").order_by("id", Order::Asc)),
        vec![shot(1, "generated"), shot(2, "kept"), shot(3, "null key")]
    );
}

#[test]
fn test_round_trip_in_insert_order() {
    let db = memdb();
    let rows: Vec<_> = (1..=5)
        .map(|i| row(&[("id", Value::Int(i)), ("name", Value::from(format!("S{i}")))]))
        .collect();
    db.create("Shot", &rows, None).unwrap();

    let read = read_all(&db, ReadRequest::new("Shot"));
    assert_eq!(
        read,
        (1..=5).map(|i| shot(i, &format!("S{i}"))).collect::<Vec<_>>()
    );
}

#[test]
fn test_unique_violation_is_database_error() {
    let db = memdb();
    let link = row(&[("asset_id", Value::Int(1)), ("shot_id", Value::Int(1))]);
    db.create("AssetXShot", &[link.clone()], None).unwrap();

    let result = db.create("AssetXShot", &[link], None);
    assert!(matches!(result, Err(Error::Database(_))));
}

#[test]
fn test_each_table_enforces_its_unique_constraint() {
    let constrained = |table: &str, index: &str| {
        TableDef::new(table)
            .with_column(ColumnDef::new("x", ColumnType::Int))
            .with_unique(index, ["x"])
    };

    let shared = Catalog::builder()
        .table(constrained("A", "uniq"))
        .table(constrained("B", "uniq"))
        .build();
    assert!(matches!(shared, Err(Error::Schema(_))));

    let catalog = Catalog::builder()
        .table(constrained("A", "uniq_a"))
        .table(constrained("B", "uniq_b"))
        .build()
        .unwrap();
    let db = Database::open_in_memory(catalog).unwrap();
    let value = row(&[("x", Value::Int(1))]);
    for table in ["A", "B"] {
        db.create(table, &[value.clone()], None).unwrap();
        let result = db.create(table, &[value.clone()], None);
        assert!(matches!(result, Err(Error::Database(_))), "{}", table);
        assert_eq!(read_all(&db, ReadRequest::new(table)).len(), 1);
    }
}

#[test]
fn test_failed_create_leaves_no_rows() {
    let db = memdb();
    let result = db.create(
        "Shot",
        &[
            row(&[("id", Value::Int(1)), ("name", Value::from("A"))]),
            row(&[("id", Value::Int(1)), ("name", Value::from("B"))]),
        ],
        None,
    );
    assert!(matches!(result, Err(Error::Database(_))));
    assert!(read_all(&db, ReadRequest::new("Shot")).is_empty());
}

#[test]
fn test_type_mismatch_and_missing_values() {
    let db = memdb();

    let wrong = row(&[("id", Value::from("abc")), ("name", Value::Int(1))]);
    assert!(matches!(
        db.create("Shot", &[wrong], None),
        Err(Error::Database(_))
    ));

    // name is required.
    assert!(matches!(
        db.create("Shot", &[row(&[("id", Value::Int(1))])], None),
        Err(Error::Database(_))
    ));

    assert!(matches!(
        db.create("Shot", &[row(&[("banana", Value::Int(1))])], None),
        Err(Error::Schema(_))
    ));
}

#[test]
fn test_update_and_delete() {
    let db = memdb().with_id_generator(SequenceGenerator::default());
    let names = ["First", "Second", "Third"];
    let rows: Vec<_> = names.iter().map(|n| row(&[("name", Value::from(*n))])).collect();
    db.create("Shot", &rows, None).unwrap();

    let updated = db
        .update(
            "Shot",
            &row(&[("name", Value::from("Renamed"))]),
            Some(&json!({"or": [{"eq": {"id": 1}}, {"eq": {"Shot.id": 3}}]})),
            None,
        )
        .unwrap();
    assert_eq!(updated, 2);
    assert_eq!(
        read_all(&db, ReadRequest::new("Shot")),
        vec![shot(1, "Renamed"), shot(2, "Second"), shot(3, "Renamed")]
    );

    let deleted = db
        .delete("Shot", Some(&json!({"eq": {"name": "Renamed"}})), None)
        .unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(read_all(&db, ReadRequest::new("Shot")), vec![shot(2, "Second")]);

    // No filters affects every row.
    assert_eq!(db.delete("Shot", None, None).unwrap(), 1);
}

#[test]
fn test_update_rejects_bad_input() {
    let db = memdb();

    assert!(matches!(
        db.update("Shot", &row(&[]), None, None),
        Err(Error::InvalidRequest(_))
    ));
    assert!(matches!(
        db.update(
            "Shot",
            &row(&[("name", Value::from("x"))]),
            Some(&json!({"eq": {"Asset.id": 1}})),
            None
        ),
        Err(Error::Schema(_))
    ));
    assert!(matches!(
        db.delete("Shot", Some(&json!({"or": {"eq": {"id": 1}}})), None),
        Err(Error::InvalidFilters(_))
    ));
}

#[test]
fn test_on_disk_database_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studio.db");

    {
        let db = Database::open(DatabaseConfig::new(&path), shot_asset_catalog()).unwrap();
        db.create("Shot", &[row(&[("id", Value::Int(7)), ("name", Value::from("Kept"))])], None)
            .unwrap();
    }

    let db = Database::open(DatabaseConfig::new(&path), shot_asset_catalog()).unwrap();
    assert_eq!(read_all(&db, ReadRequest::new("Shot")), vec![shot(7, "Kept")]);
    assert_eq!(db.config().path(), Some(path.as_path()));
}
