use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Duplicate entry: {0}")]
    Duplicate(String),
    #[error("Not found")]
    NotFound,
}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Duplicate(db.message().to_string())
            }
            _ => RepositoryError::DatabaseError(e.to_string()),
        }
    }
}
