use crate::error::SQLError;

/// A dynamically-typed SQL parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// A row returned from a SQL query, keyed by column name.
#[derive(Debug, Clone)]
pub struct Row {
    pub columns: Vec<(String, Value)>,
}

impl Row {
    /// Get a column value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Get a text column value by name.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(Value::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get an integer column value by name.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(Value::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    /// Get a real column value by name.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(Value::Real(f)) => Some(*f),
            _ => None,
        }
    }
}

/// SQLStore provides a SQL execution interface backed by an embedded database.
pub trait SQLStore: Send + Sync {
    /// Execute a query outside any explicit transaction and return rows.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError>;

    /// Execute a statement (INSERT/UPDATE/DELETE/DDL) in autocommit mode
    /// and return the affected row count.
    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError>;

    /// Begin a transaction on a connection held for the transaction's lifetime.
    fn begin(&self) -> Result<Box<dyn SQLTx + '_>, SQLError>;
}

/// An open transaction.
///
/// Dropping a transaction without calling [`SQLTx::commit`] rolls it back
/// and releases its connection.
pub trait SQLTx {
    /// Execute a query inside the transaction and return rows.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError>;

    /// Execute a statement inside the transaction and return the affected row count.
    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError>;

    /// Rowid of the most recent successful INSERT on this connection.
    fn last_insert_rowid(&self) -> i64;

    /// Commit the transaction.
    fn commit(self: Box<Self>) -> Result<(), SQLError>;
}

/// Run `f` inside one transaction: commit when it returns `Ok`, roll back
/// when it returns `Err`.
pub fn with_tx<T, E, F>(store: &dyn SQLStore, f: F) -> Result<T, E>
where
    E: From<SQLError>,
    F: FnOnce(&dyn SQLTx) -> Result<T, E>,
{
    let tx = store.begin()?;
    let out = f(tx.as_ref())?;
    tx.commit()?;
    Ok(out)
}
