//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use tidyhome_domain::TidyHomeError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct InfraError(pub TidyHomeError);

impl From<InfraError> for TidyHomeError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<TidyHomeError> for InfraError {
    fn from(value: TidyHomeError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoTidyHomeError {
    fn into_tidyhome(self) -> TidyHomeError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → TidyHomeError */
/* -------------------------------------------------------------------------- */

impl IntoTidyHomeError for SqlError {
    fn into_tidyhome(self) -> TidyHomeError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        TidyHomeError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        TidyHomeError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        TidyHomeError::Database(format!("unique constraint violation: {message}"))
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        TidyHomeError::Database("foreign key constraint violation".into())
                    }
                    _ => TidyHomeError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => TidyHomeError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                TidyHomeError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                TidyHomeError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                TidyHomeError::Database("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidPath(path) => TidyHomeError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => TidyHomeError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_tidyhome())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → TidyHomeError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(TidyHomeError::Database(format!("connection pool: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TidyHomeError */
/* -------------------------------------------------------------------------- */

impl IntoTidyHomeError for HttpError {
    fn into_tidyhome(self) -> TidyHomeError {
        if self.is_timeout() {
            return TidyHomeError::Timeout("HTTP request timed out".into());
        }

        if self.is_connect() {
            return TidyHomeError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                404 => TidyHomeError::NotFound(message),
                429 | 500..=599 => TidyHomeError::Network(message),
                _ => TidyHomeError::Gateway(message),
            };
        }

        if self.is_decode() {
            return TidyHomeError::Gateway(format!("unreadable gateway response: {self}"));
        }

        TidyHomeError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_tidyhome())
    }
}

/// Map an error that converts into [`InfraError`] straight to the domain.
pub fn to_domain(err: impl Into<InfraError>) -> TidyHomeError {
    err.into().0
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
