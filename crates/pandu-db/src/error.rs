use thiserror::Error;

/// Storage-level failures. Constraint violations that carry business meaning
/// (duplicate handle, second check-in on the same day) are mapped to their
/// own variants at the query site; everything else surfaces as `Sqlite`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("handle already taken")]
    DuplicateHandle,

    #[error("already checked in today")]
    AlreadyCheckedIn,

    #[error("record not found")]
    NotFound,

    #[error("the root admin cannot be deleted or demoted")]
    RootAdmin,

    #[error("database lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// True when `err` is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// True when `err` is a FOREIGN KEY constraint violation.
pub(crate) fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}
