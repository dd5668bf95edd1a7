// src/common/db_utils.rs

use crate::common::error::AppError;

// Postgres SQLSTATE codes the core reacts to
const EXCLUSION_VIOLATION: &str = "23P01";
const UNIQUE_VIOLATION: &str = "23505";

fn sqlstate(err: &sqlx::Error) -> Option<String> {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .map(|code| code.into_owned())
}

/// The reservation overlap constraint fired.
pub fn is_exclusion_violation(err: &sqlx::Error) -> bool {
    sqlstate(err).as_deref() == Some(EXCLUSION_VIOLATION)
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    sqlstate(err).as_deref() == Some(UNIQUE_VIOLATION)
}

/// Maps an overlap rejection to `BookingConflict`, anything else stays a database error.
pub fn map_overlap(err: sqlx::Error) -> AppError {
    if is_exclusion_violation(&err) {
        AppError::BookingConflict
    } else {
        AppError::DatabaseError(err)
    }
}

/// Maps a uniqueness rejection to the given domain error.
pub fn map_unique(err: sqlx::Error, on_duplicate: AppError) -> AppError {
    if is_unique_violation(&err) {
        on_duplicate
    } else {
        AppError::DatabaseError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_stay_opaque() {
        assert!(!is_exclusion_violation(&sqlx::Error::RowNotFound));
        assert!(matches!(map_overlap(sqlx::Error::RowNotFound), AppError::DatabaseError(_)));
        assert!(matches!(
            map_unique(sqlx::Error::PoolTimedOut, AppError::DuplicateRequest),
            AppError::DatabaseError(_)
        ));
    }
}
