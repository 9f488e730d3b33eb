use thiserror::Error;

#[derive(Error, Debug)]
pub enum SQLError {
    #[error("query error: {0}")]
    Query(String),

    #[error("execution error: {0}")]
    Execution(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("transaction error: {0}")]
    Transaction(String),
}

impl From<SQLError> for notes_core::ServiceError {
    fn from(e: SQLError) -> Self {
        notes_core::ServiceError::Storage(e.to_string())
    }
}
