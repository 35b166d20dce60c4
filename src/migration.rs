//! Create the catalog tables from the entity schemas. Idempotent: every statement is IF NOT EXISTS.

use crate::schema::{catalog, Column, EntitySchema, ValueKind};
use crate::sql::builder::quoted;
use crate::store::StoreError;
use sqlx::PgPool;

fn column_type(column: &Column) -> &'static str {
    match column.kind {
        ValueKind::Integer => "BIGINT",
        ValueKind::Decimal => "NUMERIC",
        ValueKind::Text | ValueKind::Enum(_) => "TEXT",
        ValueKind::Date => "DATE",
        ValueKind::Bytes => "BYTEA",
    }
}

/// CREATE TABLE for one entity. Enumerations become CHECK constraints; foreign keys are plain integers.
pub fn create_table_sql(schema: &EntitySchema) -> String {
    let mut defs = Vec::new();
    for c in schema.columns {
        let name = quoted(c.name);
        if c.name == schema.primary_key {
            defs.push(format!("{} BIGSERIAL PRIMARY KEY", name));
            continue;
        }
        let mut def = format!("{} {}", name, column_type(c));
        if !c.nullable {
            def.push_str(" NOT NULL");
        }
        if let ValueKind::Enum(options) = c.kind {
            let values: Vec<String> = options
                .iter()
                .map(|o| format!("'{}'", o.replace('\'', "''")))
                .collect();
            def.push_str(&format!(" CHECK ({} IN ({}))", name, values.join(", ")));
        }
        defs.push(def);
    }
    for set in schema.unique {
        let cols: Vec<String> = set.iter().map(|c| quoted(c)).collect();
        defs.push(format!("UNIQUE ({})", cols.join(", ")));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        quoted(schema.table),
        defs.join(",\n  ")
    )
}

/// Create every catalog table that does not exist yet.
pub async fn apply_migrations(pool: &PgPool) -> Result<(), StoreError> {
    for schema in catalog::ALL {
        sqlx::query(&create_table_sql(schema)).execute(pool).await?;
        tracing::debug!(table = schema.table, "table ensured");
    }
    tracing::info!(tables = catalog::ALL.len(), "migrations applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::catalog::{ALBUM_SONG_BRIDGE, ARTIST, TO_SELL_LISTING};

    #[test]
    fn enum_columns_get_check_constraint() {
        let sql = create_table_sql(&ARTIST);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"artist\" ("));
        assert!(sql.contains("\"artist_id\" BIGSERIAL PRIMARY KEY"));
        assert!(sql.contains(
            "\"gender\" TEXT NOT NULL CHECK (\"gender\" IN ('male', 'female', 'nonbinary'))"
        ));
        assert!(sql.contains("\"birth_date\" DATE NOT NULL"));
    }

    #[test]
    fn nullable_columns_have_no_not_null() {
        let sql = create_table_sql(&TO_SELL_LISTING);
        assert!(sql.contains("\"asking_price\" NUMERIC NOT NULL"));
        assert!(sql.contains("\"date_posted\" DATE,"));
        assert!(sql.contains("\"seller_id\" BIGINT\n"));
    }

    #[test]
    fn bridges_declare_unique_sets() {
        let sql = create_table_sql(&ALBUM_SONG_BRIDGE);
        assert!(sql.contains("UNIQUE (\"album_id\", \"song_id\")"));
        assert!(sql.contains("UNIQUE (\"album_id\", \"disc_number\", \"track_number\")"));
    }
}
