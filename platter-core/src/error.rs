use diesel::result::DatabaseErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing, malformed, or expired credentials, or a principal
    /// that no longer exists. Deliberately carries no detail about
    /// which check failed.
    #[error("Could not validate credentials")]
    Unauthorized,
    #[error("Not enough permissions")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    Internal(String),
    #[error(transparent)]
    Database(#[from] diesel::result::Error),
}

impl Error {
    /// Translates a store-level unique violation into Conflict,
    /// leaving every other database error untouched. Uniqueness is
    /// enforced by constraints rather than check-then-insert, so a
    /// concurrent duplicate always surfaces here.
    pub(crate) fn conflict_on_unique(err: diesel::result::Error, message: &str) -> Error {
        match err {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                Error::Conflict(message.to_string())
            }
            other => Error::Database(other),
        }
    }

    /// Same idea for foreign-key violations on explicit deletes.
    pub(crate) fn conflict_on_fk(err: diesel::result::Error, message: &str) -> Error {
        match err {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                Error::Conflict(message.to_string())
            }
            other => Error::Database(other),
        }
    }
}
