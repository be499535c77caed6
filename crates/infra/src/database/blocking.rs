//! Helpers shared by the SQLite repositories.
//!
//! rusqlite is synchronous, so every repository call checks out a pooled
//! connection inside `spawn_blocking`.

use std::str::FromStr;
use std::sync::Arc;

use rusqlite::types::Type;
use rusqlite::Row;
use rust_decimal::Decimal;
use tidyhome_domain::{Result as DomainResult, TidyHomeError};
use tokio::task;

use super::manager::DbManager;
use super::sqlite_pool::SqliteConnection;
use crate::errors::to_domain;

/// Run `op` on a pooled connection off the async runtime.
pub(crate) async fn with_connection<T, F>(db: &Arc<DbManager>, op: F) -> DomainResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut SqliteConnection) -> rusqlite::Result<T> + Send + 'static,
{
    let db = Arc::clone(db);
    task::spawn_blocking(move || -> DomainResult<T> {
        let mut conn = db.get_connection()?;
        op(&mut conn).map_err(to_domain)
    })
    .await
    .map_err(map_join_error)?
}

/// Map JoinError from spawn_blocking to TidyHomeError.
pub(crate) fn map_join_error(err: task::JoinError) -> TidyHomeError {
    if err.is_cancelled() {
        TidyHomeError::Internal("blocking task cancelled".into())
    } else {
        TidyHomeError::Internal(format!("blocking task failed: {err}"))
    }
}

/// Decimal stored as TEXT.
pub(crate) fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Enum stored as its lowercase name.
pub(crate) fn enum_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
    })
}

/// Nullable enum stored as its lowercase name.
pub(crate) fn optional_enum_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr<Err = String>,
{
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => raw.parse().map(Some).map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
        }),
        None => Ok(None),
    }
}

/// SQLite counts are i64; clamp into u32.
pub(crate) fn count_to_u32(count: i64) -> u32 {
    u32::try_from(count.max(0)).unwrap_or(u32::MAX)
}
