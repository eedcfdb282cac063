//! Integration tests for reads: columns, filters, joins and ordering.

mod common;

use common::{expected, memdb, populate_shot_assets, read_all, shot};
use rowgate_core::{Error, Order, ReadRequest, Value};
use serde_json::json;

fn shot_assets_join(request: ReadRequest, alias: &str) -> ReadRequest {
    request.join(
        alias,
        [
            ["id", "eq", "AssetXShot", "shot_id"],
            ["asset_id", "eq", "Asset", "id"],
        ],
    )
}

#[test]
fn test_read_all_rows() {
    let db = memdb();
    populate_shot_assets(&db);

    let all = vec![shot(1, "First"), shot(2, "Second"), shot(3, "Third")];
    assert_eq!(read_all(&db, ReadRequest::new("Shot")), all);
    assert_eq!(read_all(&db, ReadRequest::new("Shot").columns(["*"])), all);
}

#[test]
fn test_read_explicit_columns() {
    let db = memdb();
    populate_shot_assets(&db);

    let rows = read_all(&db, ReadRequest::new("Shot").columns(["name"]));
    assert_eq!(
        rows,
        vec![
            expected(&[("name", Value::from("First"))]),
            expected(&[("name", Value::from("Second"))]),
            expected(&[("name", Value::from("Third"))]),
        ]
    );
}

#[test]
fn test_read_filters() {
    let db = memdb();
    populate_shot_assets(&db);

    let cases = [
        (json!({"eq": {"id": 2}}), vec![shot(2, "Second")]),
        (
            json!({"like": {"name": "%d"}}),
            vec![shot(2, "Second"), shot(3, "Third")],
        ),
        (
            json!({"or": [{"eq": {"id": 1}}, {"eq": {"id": 3}}]}),
            vec![shot(1, "First"), shot(3, "Third")],
        ),
        (
            json!({"in": {"id": [1, 3]}}),
            vec![shot(1, "First"), shot(3, "Third")],
        ),
        (
            json!({"not_in": {"id": [1, 3]}, "unlike": {"name": "F%"}}),
            vec![shot(2, "Second")],
        ),
        (json!({"ge": {"id": 2}, "le": {"id": 2}}), vec![shot(2, "Second")]),
        (json!({}), vec![shot(1, "First"), shot(2, "Second"), shot(3, "Third")]),
    ];

    for (filters, rows) in cases {
        let request = ReadRequest::new("Shot").filters(filters.clone());
        assert_eq!(read_all(&db, request), rows, "filters: {filters}");
    }
}

#[test]
fn test_read_ordering_and_limit() {
    let db = memdb();
    populate_shot_assets(&db);

    let request = ReadRequest::new("Shot").order_by("id", Order::Desc);
    assert_eq!(
        read_all(&db, request.clone()),
        vec![shot(3, "Third"), shot(2, "Second"), shot(1, "First")]
    );
    assert_eq!(
        read_all(&db, request.limit(2)),
        vec![shot(3, "Third"), shot(2, "Second")]
    );
}

#[test]
fn test_read_join_ordering() {
    let db = memdb();
    populate_shot_assets(&db);

    let request = shot_assets_join(ReadRequest::new("Shot"), "Asset")
        .order_by("Asset.id", Order::Desc)
        .order_by("name", Order::Asc);

    assert_eq!(
        read_all(&db, request),
        vec![
            shot(1, "First"),
            shot(1, "First"),
            shot(2, "Second"),
            shot(1, "First"),
            shot(2, "Second"),
            shot(3, "Third"),
        ]
    );
}

#[test]
fn test_read_complex_query() {
    let db = memdb();
    populate_shot_assets(&db);

    let request = shot_assets_join(ReadRequest::new("Shot"), "AssetAlias")
        .columns(["*", "AssetAlias.*"])
        .filters(json!({
            "or": [
                {"gt": {"id": 1}, "lt": {"AssetAlias.id": 2}},
                {"eq": {"AssetAlias.name": "AstonMartin"}}
            ]
        }))
        .order_by("id", Order::Asc);

    let asset_row = |shot_id: i64, shot_name: &str, asset_id: i64, asset_name: &str| {
        expected(&[
            ("id", Value::Int(shot_id)),
            ("name", Value::from(shot_name)),
            ("AssetAlias.id", Value::Int(asset_id)),
            ("AssetAlias.name", Value::from(asset_name)),
        ])
    };
    assert_eq!(
        read_all(&db, request),
        vec![
            asset_row(1, "First", 3, "AstonMartin"),
            asset_row(2, "Second", 1, "James"),
            asset_row(3, "Third", 1, "James"),
        ]
    );
}

#[test]
fn test_read_same_table_under_two_aliases() {
    let db = memdb();
    populate_shot_assets(&db);

    // Both aliases reach Asset; the second one only keeps the Gun link.
    let request = shot_assets_join(ReadRequest::new("Shot"), "Any")
        .join(
            "Gun",
            [
                ["id", "eq", "AssetXShot", "shot_id"],
                ["asset_id", "eq", "Asset", "id"],
            ],
        )
        .columns(["id", "Any.name"])
        .filters(json!({"eq": {"Gun.name": "Gun", "Any.name": "James"}}))
        .order_by("id", Order::Asc);

    let rows = read_all(&db, request);
    let ids: Vec<_> = rows.iter().map(|r| r.get("id").cloned()).collect();
    assert_eq!(ids, vec![Some(Value::Int(1)), Some(Value::Int(2))]);
}

#[test]
fn test_invalid_filters() {
    let db = memdb();
    populate_shot_assets(&db);

    for filters in [
        json!({"name": "First"}),
        json!({"is": {"name": "First"}}),
        json!({"or": {"name": "First"}}),
        json!({"in": {"id": 1}}),
    ] {
        let result = db.read(&ReadRequest::new("Shot").filters(filters.clone()), None);
        assert!(
            matches!(result, Err(Error::InvalidFilters(_))),
            "filters: {filters}"
        );
    }
}

#[test]
fn test_invalid_schema_references() {
    let db = memdb();
    populate_shot_assets(&db);

    let requests = [
        ReadRequest::new("Banana"),
        ReadRequest::new("Shot").columns(["banana"]),
        ReadRequest::new("Shot").columns(["Asset.name"]),
        ReadRequest::new("Shot").filters(json!({"eq": {"Asset.name": "Gun"}})),
        ReadRequest::new("Shot").join("Asset", [["id", "eq", "Banana", "id"]]),
    ];
    for request in requests {
        let result = db.read(&request, None);
        assert!(matches!(result, Err(Error::Schema(_))), "{request:?}");
    }
}

#[test]
fn test_invalid_joins() {
    let db = memdb();

    let requests = [
        ReadRequest::new("Shot").join("Shot", [["id", "eq", "Asset", "id"]]),
        ReadRequest::new("Shot").join("Asset", Vec::<[&str; 4]>::new()),
        ReadRequest::new("Shot").join("Asset", [["id", "is", "Asset", "id"]]),
    ];
    for request in requests {
        let result = db.read(&request, None);
        assert!(matches!(result, Err(Error::InvalidJoin(_))), "{request:?}");
    }
}

#[test]
fn test_read_is_idempotent() {
    let db = memdb();
    populate_shot_assets(&db);

    let request = shot_assets_join(ReadRequest::new("Shot"), "Asset")
        .columns(["name", "Asset.name"])
        .order_by("Asset.id", Order::Asc)
        .order_by("id", Order::Asc);
    assert_eq!(read_all(&db, request.clone()), read_all(&db, request));
}
