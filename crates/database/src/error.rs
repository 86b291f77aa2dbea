use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load environment variables for database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Database query failed: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Stored row is inconsistent: {0}")]
    CorruptRow(String),

    #[error("Value {value} for '{field}' does not fit the database column")]
    OutOfRange { field: &'static str, value: u32 },

    #[error("Payment '{0}' has already been recorded")]
    DuplicatePayment(String),

    #[error("The requested data was not found in the database.")]
    NotFound,
}
