//! Built-in animation studio schema, used when no schema file is given.

use rowgate_core::{Catalog, ColumnDef, ColumnType, DefaultValue, Result, TableDef, Value};

/// Projects, sequences, shots, assets, tasks and published outputs.
pub fn studio_catalog() -> Result<Catalog> {
    let key = || ColumnDef::new("id", ColumnType::Int).primary_key();
    let text = |name: &str| ColumnDef::new(name, ColumnType::String);
    let int = |name: &str| ColumnDef::new(name, ColumnType::Int);

    Catalog::builder()
        .table(
            TableDef::new("Project")
                .with_column(key())
                .with_column(text("name").unique()),
        )
        .table(
            TableDef::new("Sequence")
                .with_columns([key(), text("name"), int("project_id")])
                .with_unique("unique_sequence_name_project_id", ["name", "project_id"]),
        )
        .table(
            TableDef::new("Shot")
                .with_columns([
                    key(),
                    text("name"),
                    int("sequence_id"),
                    ColumnDef::optional("frame_start", ColumnType::Int),
                    ColumnDef::optional("frame_end", ColumnType::Int),
                ])
                .with_unique("unique_shot_name_sequence_id", ["name", "sequence_id"]),
        )
        .table(
            TableDef::new("Asset")
                .with_columns([
                    key(),
                    text("type"),
                    text("name"),
                    text("variant"),
                    int("project_id"),
                ])
                .with_unique(
                    "unique_asset_name_project_id",
                    ["name", "variant", "project_id"],
                ),
        )
        .table(
            TableDef::new("AssetXShot")
                .with_columns([int("asset_id"), int("shot_id")])
                .with_unique("asset_shot", ["asset_id", "shot_id"]),
        )
        .table(
            TableDef::new("Task")
                .with_columns([
                    key(),
                    text("entity_table"),
                    int("entity_id"),
                    text("name"),
                    int("status").with_default(DefaultValue::Value(Value::Int(0))),
                    ColumnDef::optional("assignee", ColumnType::String),
                    ColumnDef::optional("due_date", ColumnType::Timestamp),
                ])
                .with_unique("unique_tasks", ["entity_table", "entity_id", "name"]),
        )
        .table(output_table())
        .build()
}

fn output_table() -> TableDef {
    let text = |name: &str| ColumnDef::new(name, ColumnType::String);
    let optional_text = |name: &str| ColumnDef::optional(name, ColumnType::String);
    let flag = |name: &str| {
        ColumnDef::optional(name, ColumnType::Bool)
            .with_default(DefaultValue::Value(Value::Bool(false)))
    };
    let at = |name: &str| ColumnDef::optional(name, ColumnType::Timestamp);

    TableDef::new("Output")
        .with_columns([
            ColumnDef::new("id", ColumnType::Int).primary_key(),
            // Context
            text("env"),
            text("project"),
            text("pipeline"),
            text("sequence"),
            text("shot"),
            text("department"),
            text("task"),
            // Output
            text("datatype"),
            optional_text("variant"),
            ColumnDef::new("version", ColumnType::Int),
            text("format"),
            text("pathtemplate"),
            text("relative_path").unique(),
            optional_text("frame_range"),
            optional_text("name"),
            optional_text("lod"),
            optional_text("instance"),
            // Approval
            flag("is_approved"),
            at("approved_at"),
            optional_text("approved_by"),
            flag("is_starred"),
            at("starred_at"),
            optional_text("starred_by"),
            // Metadata
            ColumnDef::new("created_at", ColumnType::Timestamp)
                .with_default(DefaultValue::CurrentTimestamp),
            text("created_by"),
            ColumnDef::optional("status", ColumnType::Int)
                .with_default(DefaultValue::Value(Value::Int(0))),
            at("status_at"),
            optional_text("status_by"),
        ])
        .with_unique(
            "unique_output",
            [
                "env", "project", "pipeline", "sequence", "shot", "task", "datatype", "variant",
                "version",
            ],
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_studio_catalog_builds() {
        let catalog = studio_catalog().unwrap();
        assert_eq!(
            catalog.table_names(),
            vec!["Asset", "AssetXShot", "Output", "Project", "Sequence", "Shot", "Task"]
        );
        assert!(catalog.has_column("Output", "relative_path"));
        assert!(catalog.primary_key("AssetXShot").unwrap().is_none());
    }
}
