pub mod schema;

use std::sync::Arc;

use notes_core::ServiceError;
use notes_sql::{with_tx, Row, SQLStore, SQLTx, Value};
use tracing::{debug, info};

use crate::model::Note;

const SELECT_ALL: &str =
    "SELECT id, title, description, created_at, created_by, priority FROM notes ORDER BY id";

const SELECT_ONE: &str =
    "SELECT id, title, description, created_at, created_by, priority FROM notes WHERE id = ?1";

const INSERT: &str = "INSERT INTO notes (title, description, created_at, created_by, priority)
    VALUES (?1, ?2, ?3, ?4, ?5)";

const UPDATE: &str = "UPDATE notes
    SET title = ?1, description = ?2, created_at = ?3, created_by = ?4, priority = ?5
    WHERE id = ?6";

const DELETE: &str = "DELETE FROM notes WHERE id = ?1";

/// Note service. Owns the SQL store and runs each operation in its own
/// transaction.
pub struct NoteService {
    pub(crate) sql: Arc<dyn SQLStore>,
}

impl NoteService {
    /// Wrap a store, creating the note table if it does not exist.
    pub fn new(sql: Arc<dyn SQLStore>) -> Result<Self, ServiceError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Self { sql })
    }

    /// Drop all notes and recreate the table.
    pub fn reset_schema(&self) -> Result<(), ServiceError> {
        schema::reset_schema(self.sql.as_ref())?;
        info!("note schema reset");
        Ok(())
    }

    /// All notes in primary-key order.
    pub fn list_notes(&self) -> Result<Vec<Note>, ServiceError> {
        with_tx(self.sql.as_ref(), select_all)
    }

    /// Insert a note and return it with its assigned id.
    pub fn create_note(&self, note: Note) -> Result<Note, ServiceError> {
        with_tx(self.sql.as_ref(), |tx| insert(tx, note))
    }

    /// Insert a note and return the whole collection as it stands after
    /// the insert, both in one transaction.
    pub fn create_and_list(&self, note: Note) -> Result<Vec<Note>, ServiceError> {
        with_tx(self.sql.as_ref(), |tx| {
            insert(tx, note)?;
            select_all(tx)
        })
    }

    pub fn get_note(&self, id: i64) -> Result<Note, ServiceError> {
        with_tx(self.sql.as_ref(), |tx| {
            select_one(tx, id)?.ok_or_else(|| not_found(id))
        })
    }

    /// Replace all mutable fields of an existing note. Fails with NotFound
    /// before touching storage if the id does not exist.
    pub fn update_note(&self, id: i64, fields: Note) -> Result<Note, ServiceError> {
        with_tx(self.sql.as_ref(), |tx| {
            let mut note = select_one(tx, id)?.ok_or_else(|| not_found(id))?;
            note.replace_fields(fields);
            tx.exec(
                UPDATE,
                &[
                    Value::Text(note.title.clone()),
                    Value::Text(note.description.clone()),
                    Value::Text(note.created_at.clone()),
                    Value::Text(note.created_by.clone()),
                    Value::Integer(note.priority),
                    Value::Integer(id),
                ],
            )?;
            info!(id, "note updated");
            Ok(note)
        })
    }

    pub fn delete_note(&self, id: i64) -> Result<(), ServiceError> {
        with_tx(self.sql.as_ref(), |tx| {
            let affected = tx.exec(DELETE, &[Value::Integer(id)])?;
            if affected == 0 {
                return Err(not_found(id));
            }
            info!(id, "note deleted");
            Ok(())
        })
    }
}

fn not_found(id: i64) -> ServiceError {
    ServiceError::NotFound(format!("note {} not found", id))
}

fn insert(tx: &dyn SQLTx, mut note: Note) -> Result<Note, ServiceError> {
    tx.exec(
        INSERT,
        &[
            Value::Text(note.title.clone()),
            Value::Text(note.description.clone()),
            Value::Text(note.created_at.clone()),
            Value::Text(note.created_by.clone()),
            Value::Integer(note.priority),
        ],
    )?;
    let id = tx.last_insert_rowid();
    note.id = Some(id);
    info!(id, "note created");
    Ok(note)
}

fn select_all(tx: &dyn SQLTx) -> Result<Vec<Note>, ServiceError> {
    let rows = tx.query(SELECT_ALL, &[])?;
    debug!(count = rows.len(), "listed notes");
    rows.iter().map(note_from_row).collect()
}

fn select_one(tx: &dyn SQLTx, id: i64) -> Result<Option<Note>, ServiceError> {
    let rows = tx.query(SELECT_ONE, &[Value::Integer(id)])?;
    rows.first().map(note_from_row).transpose()
}

/// Rows written by other tools may hold NULLs; those read back as empty
/// strings and zero priority.
fn note_from_row(row: &Row) -> Result<Note, ServiceError> {
    let id = row
        .get_i64("id")
        .ok_or_else(|| ServiceError::Internal("note row without integer id".into()))?;
    Ok(Note {
        id: Some(id),
        title: row.get_str("title").unwrap_or_default().to_string(),
        description: row.get_str("description").unwrap_or_default().to_string(),
        created_at: row.get_str("created_at").unwrap_or_default().to_string(),
        created_by: row.get_str("created_by").unwrap_or_default().to_string(),
        priority: row.get_i64("priority").unwrap_or_default(),
    })
}
