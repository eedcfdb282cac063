//! Shared fixtures for integration tests.

#![allow(dead_code)]

use rowgate_core::{
    Catalog, ColumnDef, ColumnType, Database, ReadRequest, Row, RowValues, TableDef, Value,
};

/// Shot, Asset and the AssetXShot link table.
pub fn shot_asset_catalog() -> Catalog {
    Catalog::builder()
        .table(
            TableDef::new("Shot")
                .with_column(ColumnDef::new("id", ColumnType::Int).primary_key())
                .with_column(ColumnDef::new("name", ColumnType::String)),
        )
        .table(
            TableDef::new("Asset")
                .with_column(ColumnDef::new("id", ColumnType::Int).primary_key())
                .with_column(ColumnDef::new("name", ColumnType::String)),
        )
        .table(
            TableDef::new("AssetXShot")
                .with_column(ColumnDef::new("asset_id", ColumnType::Int))
                .with_column(ColumnDef::new("shot_id", ColumnType::Int))
                .with_unique("asset_shot", ["asset_id", "shot_id"]),
        )
        .build()
        .unwrap()
}

pub fn memdb() -> Database {
    Database::open_in_memory(shot_asset_catalog()).unwrap()
}

pub fn row(fields: &[(&str, Value)]) -> RowValues {
    fields
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

pub fn expected(fields: &[(&str, Value)]) -> Row {
    fields
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

pub fn shot(id: i64, name: &str) -> Row {
    expected(&[("id", Value::Int(id)), ("name", Value::from(name))])
}

/// Three shots, three assets and six links between them.
pub fn populate_shot_assets(db: &Database) {
    let named = |id: i64, name: &str| row(&[("id", Value::Int(id)), ("name", Value::from(name))]);
    db.create(
        "Shot",
        &[named(1, "First"), named(2, "Second"), named(3, "Third")],
        None,
    )
    .unwrap();
    db.create(
        "Asset",
        &[named(1, "James"), named(2, "Gun"), named(3, "AstonMartin")],
        None,
    )
    .unwrap();

    let links: Vec<RowValues> = [(1, 1), (2, 1), (3, 1), (1, 2), (2, 2), (1, 3)]
        .into_iter()
        .map(|(asset, shot)| {
            row(&[
                ("asset_id", Value::Int(asset)),
                ("shot_id", Value::Int(shot)),
            ])
        })
        .collect();
    db.create("AssetXShot", &links, None).unwrap();
}

pub fn read_all(db: &Database, request: ReadRequest) -> Vec<Row> {
    db.read(&request, None).unwrap().collect()
}
