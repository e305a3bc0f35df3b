use crate::schema::{OnDelete, PrimaryKey, TableSchema};

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (\n", schema.name);
    let mut columns = Vec::new();

    if let PrimaryKey::Surrogate = schema.primary_key {
        columns.push("    id INTEGER PRIMARY KEY AUTOINCREMENT".to_string());
    }

    for col in schema.columns {
        let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
        let unique = if col.unique { " UNIQUE" } else { "" };

        columns.push(format!(
            "    {} {}{}{}",
            col.name,
            col.col_type.sql_type(),
            null_constraint,
            unique
        ));
    }

    if let PrimaryKey::Composite(key_columns) = &schema.primary_key {
        columns.push(format!("    PRIMARY KEY ({})", key_columns.join(", ")));
    }

    for fk in schema.foreign_keys {
        let on_delete = match fk.on_delete {
            OnDelete::Cascade => " ON DELETE CASCADE",
            OnDelete::Restrict => "",
        };
        columns.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({}){}",
            fk.column, fk.references_table, fk.references_column, on_delete
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for foreign key columns.
///
/// A column leading the composite primary key is already indexed and is skipped.
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    let leading_key = match &schema.primary_key {
        PrimaryKey::Composite(key_columns) => key_columns.first().copied(),
        PrimaryKey::Surrogate => None,
    };

    schema
        .foreign_keys
        .iter()
        .filter(|fk| Some(fk.column) != leading_key)
        .map(|fk| {
            format!(
                "CREATE INDEX IF NOT EXISTS idx_{}_{} ON {}({})",
                schema.name, fk.column, schema.name, fk.column
            )
        })
        .collect()
}
