pub mod groups;
pub mod plans;
pub mod profiles;
pub mod schema;
pub mod sessions;
pub mod words;

use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::AppError;

pub use schema::run_migrations;

pub type DbPool = Arc<Mutex<Connection>>;

/// Try to acquire the database lock, returning an error if poisoned
pub fn try_lock(pool: &DbPool) -> std::result::Result<MutexGuard<'_, Connection>, AppError> {
  pool.lock().map_err(|_: PoisonError<_>| {
    tracing::error!("Database mutex poisoned - a thread panicked while holding the lock");
    AppError::Lock
  })
}

pub fn init_db(path: &Path) -> Result<DbPool> {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).ok();
  }

  // Create backup before migrations if database exists
  if path.exists() {
    let backup_path = path.with_extension("db.backup");
    if let Err(e) = std::fs::copy(path, &backup_path) {
      tracing::warn!("Could not create database backup: {}", e);
    }
  }

  let conn = Connection::open(path)?;
  run_migrations(&conn)?;
  Ok(Arc::new(Mutex::new(conn)))
}

/// Current time as the stored RFC 3339 column format
pub(crate) fn now_string() -> String {
  chrono::Utc::now().to_rfc3339()
}

/// Parse a stored RFC 3339 timestamp, falling back to now on corruption
pub(crate) fn parse_timestamp(raw: &str) -> chrono::DateTime<chrono::Utc> {
  chrono::DateTime::parse_from_rfc3339(raw)
    .map(|dt| dt.with_timezone(&chrono::Utc))
    .unwrap_or_else(|_| chrono::Utc::now())
}
