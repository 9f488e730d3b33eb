use std::path::Path;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::rusqlite::types::ValueRef;
use r2d2_sqlite::rusqlite::{self, Connection};
use r2d2_sqlite::SqliteConnectionManager;

use crate::error::SQLError;
use crate::traits::{Row, SQLStore, SQLTx, Value};

/// Pool size used by [`SqliteStore::open`].
pub const DEFAULT_POOL_SIZE: usize = 4;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SqliteStore is a SQLStore implementation backed by rusqlite (bundled SQLite).
///
/// Connections live in an r2d2 pool. Every statement or transaction checks
/// one out and hands it back when done; callers block while the pool is
/// exhausted. An in-memory store has exactly one connection, since each
/// in-memory connection would otherwise see its own private database.
pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path.
    pub fn open(path: &Path) -> Result<Self, SQLError> {
        Self::open_pooled(path, DEFAULT_POOL_SIZE)
    }

    /// Open or create a SQLite database with at most `max_connections`
    /// concurrently open connections.
    pub fn open_pooled(path: &Path, max_connections: usize) -> Result<Self, SQLError> {
        let max_size = u32::try_from(max_connections).unwrap_or(u32::MAX).max(1);
        let manager = SqliteConnectionManager::file(path).with_init(init_file_connection);
        // The builder opens the connections up front, so a bad path fails here.
        let pool = Pool::builder()
            .max_size(max_size)
            .build(manager)
            .map_err(|e| SQLError::Connection(e.to_string()))?;
        tracing::debug!(path = %path.display(), max_size, "opened sqlite pool");
        Ok(Self { pool })
    }

    /// Create an in-memory SQLite database (useful for tests).
    pub fn open_in_memory() -> Result<Self, SQLError> {
        // The database lives only as long as its one connection.
        let pool = Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .build(SqliteConnectionManager::memory())
            .map_err(|e| SQLError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Number of connections currently open (idle or checked out).
    pub fn open_connections(&self) -> usize {
        self.pool.state().connections as usize
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, SQLError> {
        self.pool
            .get()
            .map_err(|e| SQLError::Connection(e.to_string()))
    }
}

/// Per-connection setup. The busy timeout goes first so the WAL switch
/// waits on a locked database instead of failing.
fn init_file_connection(conn: &mut Connection) -> Result<(), rusqlite::Error> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")
}

// ── Transactions ──

/// A transaction pinned to one pooled connection.
struct SqliteTx {
    conn: PooledConnection<SqliteConnectionManager>,
    finished: bool,
}

impl SQLTx for SqliteTx {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError> {
        query_on(&self.conn, sql, params)
    }

    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError> {
        exec_on(&self.conn, sql, params)
    }

    fn last_insert_rowid(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    fn commit(mut self: Box<Self>) -> Result<(), SQLError> {
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| SQLError::Transaction(e.to_string()))?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for SqliteTx {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                tracing::warn!("rollback failed: {}", e);
            }
        }
    }
}

// ── Statement helpers ──

/// Convert our Value enum to rusqlite's ToSql.
fn bind_params(params: &[Value]) -> Vec<Box<dyn rusqlite::types::ToSql + '_>> {
    params
        .iter()
        .map(|v| -> Box<dyn rusqlite::types::ToSql + '_> {
            match v {
                Value::Null => Box::new(rusqlite::types::Null),
                Value::Integer(i) => Box::new(*i),
                Value::Real(f) => Box::new(*f),
                Value::Text(s) => Box::new(s.as_str()),
                Value::Blob(b) => Box::new(b.as_slice()),
            }
        })
        .collect()
}

fn query_on(conn: &Connection, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError> {
    let bound = bind_params(params);
    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        bound.iter().map(|b| b.as_ref()).collect();

    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| SQLError::Query(e.to_string()))?;

    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let rows = stmt
        .query_map(param_refs.as_slice(), |row| {
            let mut columns = Vec::with_capacity(column_names.len());
            for (i, name) in column_names.iter().enumerate() {
                columns.push((name.clone(), row_value_at(row, i)));
            }
            Ok(Row { columns })
        })
        .map_err(|e| SQLError::Query(e.to_string()))?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(|e| SQLError::Query(e.to_string()))?);
    }
    Ok(result)
}

fn exec_on(conn: &Connection, sql: &str, params: &[Value]) -> Result<u64, SQLError> {
    let bound = bind_params(params);
    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        bound.iter().map(|b| b.as_ref()).collect();

    let affected = conn
        .execute(sql, param_refs.as_slice())
        .map_err(|e| SQLError::Execution(e.to_string()))?;

    Ok(affected as u64)
}

/// Extract a Value from a rusqlite row at a given column index, following
/// the storage class SQLite reports for that cell.
fn row_value_at(row: &rusqlite::Row, idx: usize) -> Value {
    match row.get_ref(idx) {
        Ok(ValueRef::Integer(i)) => Value::Integer(i),
        Ok(ValueRef::Real(f)) => Value::Real(f),
        Ok(ValueRef::Text(t)) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        Ok(ValueRef::Blob(b)) => Value::Blob(b.to_vec()),
        Ok(ValueRef::Null) | Err(_) => Value::Null,
    }
}

impl SQLStore for SqliteStore {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError> {
        let conn = self.conn()?;
        query_on(&conn, sql, params)
    }

    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError> {
        let conn = self.conn()?;
        exec_on(&conn, sql, params)
    }

    fn begin(&self) -> Result<Box<dyn SQLTx + '_>, SQLError> {
        let conn = self.conn()?;
        // Take the write lock up front.
        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| SQLError::Transaction(e.to_string()))?;
        Ok(Box::new(SqliteTx {
            conn,
            finished: false,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::traits::with_tx;

    fn make_store(dir: &tempfile::TempDir) -> SqliteStore {
        let store = SqliteStore::open(&dir.path().join("test.db")).unwrap();
        store
            .exec(
                "CREATE TABLE items (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT, score REAL, raw BLOB)",
                &[],
            )
            .unwrap();
        store
    }

    #[test]
    fn exec_and_query_roundtrip_types() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);

        let n = store
            .exec(
                "INSERT INTO items (name, score, raw) VALUES (?1, ?2, ?3)",
                &[
                    Value::Text("alpha".into()),
                    Value::Real(1.5),
                    Value::Blob(vec![1, 2, 3]),
                ],
            )
            .unwrap();
        assert_eq!(n, 1);

        let rows = store.query("SELECT * FROM items", &[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_i64("id"), Some(1));
        assert_eq!(rows[0].get_str("name"), Some("alpha"));
        assert_eq!(rows[0].get_f64("score"), Some(1.5));
        assert_eq!(rows[0].get("raw"), Some(&Value::Blob(vec![1, 2, 3])));
    }

    #[test]
    fn numeric_looking_text_stays_text() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);
        store
            .exec("INSERT INTO items (name) VALUES (?1)", &[Value::Text("42".into())])
            .unwrap();

        let rows = store.query("SELECT name, score FROM items", &[]).unwrap();
        assert_eq!(rows[0].get_str("name"), Some("42"));
        assert_eq!(rows[0].get("score"), Some(&Value::Null));
    }

    #[test]
    fn committed_transaction_is_visible() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);

        let id = with_tx(&store, |tx| {
            tx.exec("INSERT INTO items (name) VALUES (?1)", &[Value::Text("a".into())])?;
            Ok::<_, SQLError>(tx.last_insert_rowid())
        })
        .unwrap();
        assert_eq!(id, 1);

        let rows = store.query("SELECT name FROM items WHERE id = ?1", &[Value::Integer(id)]).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn failed_closure_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);

        let result: Result<(), SQLError> = with_tx(&store, |tx| {
            tx.exec("INSERT INTO items (name) VALUES (?1)", &[Value::Text("a".into())])?;
            Err(SQLError::Execution("abort".into()))
        });
        assert!(result.is_err());

        let rows = store.query("SELECT * FROM items", &[]).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn dropped_transaction_rolls_back_and_releases_connection() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open_pooled(&dir.path().join("test.db"), 1).unwrap();
        store.exec("CREATE TABLE t (v INTEGER)", &[]).unwrap();

        {
            let tx = store.begin().unwrap();
            tx.exec("INSERT INTO t (v) VALUES (1)", &[]).unwrap();
        }

        // The single connection is back in the pool, so this does not block.
        let rows = store.query("SELECT * FROM t", &[]).unwrap();
        assert!(rows.is_empty());
        assert_eq!(store.open_connections(), 1);
    }

    #[test]
    fn pool_never_exceeds_max_size() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteStore::open_pooled(&dir.path().join("test.db"), 2).unwrap());
        store.exec("CREATE TABLE t (v INTEGER)", &[]).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    with_tx(store.as_ref(), |tx| {
                        tx.exec("INSERT INTO t (v) VALUES (?1)", &[Value::Integer(i)])
                    })
                    .unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let rows = store.query("SELECT COUNT(*) AS cnt FROM t", &[]).unwrap();
        assert_eq!(rows[0].get_i64("cnt"), Some(8));
        assert!(store.open_connections() <= 2);
    }

    #[test]
    fn file_connections_wait_on_locks_and_use_wal() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open_pooled(&dir.path().join("test.db"), 2).unwrap();

        let rows = store.query("PRAGMA busy_timeout", &[]).unwrap();
        assert_eq!(rows[0].columns[0].1, Value::Integer(5000));
        let rows = store.query("PRAGMA journal_mode", &[]).unwrap();
        assert_eq!(rows[0].columns[0].1, Value::Text("wal".into()));
    }

    #[test]
    fn second_store_opens_while_writer_holds_lock() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let store = SqliteStore::open_pooled(&path, 1).unwrap();
        store.exec("CREATE TABLE t (v INTEGER)", &[]).unwrap();

        let tx = store.begin().unwrap();
        tx.exec("INSERT INTO t (v) VALUES (1)", &[]).unwrap();
        let other = SqliteStore::open_pooled(&path, 2).unwrap();
        tx.commit().unwrap();

        let rows = other.query("SELECT v FROM t", &[]).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn in_memory_store_shares_one_database() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.exec("CREATE TABLE t (v INTEGER)", &[]).unwrap();
        with_tx(&store, |tx| tx.exec("INSERT INTO t (v) VALUES (7)", &[])).unwrap();

        let rows = store.query("SELECT v FROM t", &[]).unwrap();
        assert_eq!(rows[0].get_i64("v"), Some(7));
        assert_eq!(store.open_connections(), 1);
    }
}
