//! Test utilities for database setup.
//!
//! Reuses the authoritative schema initialization so test code never
//! duplicates table definitions.

use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;

use crate::config::DEFAULT_LANGUAGE;

/// Test environment backed by a real database file in a temporary
/// directory, dropped (and cleaned up) with the value.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    pub conn: Connection,
}

impl TestEnv {
    /// Open a fresh database and run all migrations against it.
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        let db_path = temp.path().join("wordbook.db");
        let conn = Connection::open(&db_path)?;
        crate::db::schema::run_migrations(&conn)?;
        Ok(Self { temp, conn })
    }

    /// Get the temporary directory path for creating test files.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }
}

pub fn seed_profile(conn: &Connection, name: &str, pass_threshold: i64) -> i64 {
    crate::db::profiles::insert_profile(conn, name, pass_threshold).unwrap()
}

pub fn seed_folder(conn: &Connection, profile_id: i64, name: &str) -> i64 {
    crate::db::groups::insert_folder(conn, profile_id, name).unwrap()
}

pub fn seed_group(conn: &Connection, profile_id: i64, folder_id: i64, name: &str) -> i64 {
    crate::db::groups::insert_group(conn, profile_id, folder_id, name).unwrap()
}

/// Insert `(term, meaning)` pairs into a group with star 0, returning the
/// new word ids in insertion order.
pub fn seed_words(conn: &Connection, group_id: i64, pairs: &[(&str, &str)]) -> Vec<i64> {
    pairs
        .iter()
        .map(|(term, meaning)| {
            crate::db::words::insert_word(
                conn,
                &crate::domain::NewWord {
                    group_id,
                    language: Some(DEFAULT_LANGUAGE.to_string()),
                    term: (*term).to_string(),
                    meaning: (*meaning).to_string(),
                    reading: None,
                    pos: None,
                    example: None,
                    memo: None,
                    star: None,
                },
            )
            .unwrap()
        })
        .collect()
}
