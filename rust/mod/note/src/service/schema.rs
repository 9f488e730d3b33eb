use notes_core::ServiceError;
use notes_sql::SQLStore;

/// DDL for the note schema. Column widths mirror the declared field sizes;
/// SQLite does not enforce them.
const SCHEMA: &[&str] = &["CREATE TABLE IF NOT EXISTS notes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title VARCHAR(50),
        description VARCHAR(50),
        created_at VARCHAR(50),
        created_by VARCHAR(50),
        priority INTEGER
    )"];

const DROP: &[&str] = &["DROP TABLE IF EXISTS notes"];

/// Create any missing tables. Safe to call on every start.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), ServiceError> {
    for stmt in SCHEMA {
        sql.exec(stmt, &[])
            .map_err(|e| ServiceError::Storage(format!("schema init failed: {}", e)))?;
    }
    Ok(())
}

/// Drop every note table and recreate it empty.
pub fn reset_schema(sql: &dyn SQLStore) -> Result<(), ServiceError> {
    for stmt in DROP {
        sql.exec(stmt, &[])
            .map_err(|e| ServiceError::Storage(format!("schema reset failed: {}", e)))?;
    }
    init_schema(sql)
}
