use crate::aggregate::AggregationError;

/// The errors that may occur below the command line layer.
#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    /// One or more input rules failed. Every failed rule is listed.
    #[error("Invalid data: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// The record does not exist, or it belongs to another user.
    #[error("the requested record could not be found")]
    NotFound,

    /// The acting user has no row in the store yet, i.e. the identity
    /// provider never told us about them.
    #[error("user {0} is not synchronized with the database")]
    UserNotSynchronized(String),

    #[error("a category named \"{0}\" already exists")]
    DuplicateCategory(String),

    /// The category ID given for a transaction is not one of the user's.
    #[error("category {0} does not exist")]
    InvalidCategory(i64),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    /// A stored value could not be read back (bad date, bad amount, ...).
    #[error("corrupt {column} value in the database: \"{value}\"")]
    CorruptRecord { column: &'static str, value: String },

    /// The file was written by a newer release.
    #[error("database schema version {0} is newer than this build supports")]
    UnsupportedSchema(i32),

    #[error("an unexpected SQL error occurred: {0}")]
    Sql(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {error}");
                Error::Sql(error)
            }
        }
    }
}

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;
