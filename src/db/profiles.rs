//! Profile rows: quiz sessions, folders, and plans all hang off a profile.

use rusqlite::{Connection, Result, params};

use crate::config::DEFAULT_PASS_THRESHOLD;
use crate::domain::Profile;

pub fn insert_profile(conn: &Connection, name: &str, exam_pass_threshold: i64) -> Result<i64> {
    conn.execute(
        "INSERT INTO profiles (name, exam_pass_threshold, created_at) VALUES (?1, ?2, ?3)",
        params![name, exam_pass_threshold, super::now_string()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_profile(conn: &Connection, id: i64) -> Result<Option<Profile>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, exam_pass_threshold, created_at FROM profiles WHERE id = ?1",
    )?;
    let mut rows = stmt.query(params![id])?;
    if let Some(row) = rows.next()? {
        Ok(Some(row_to_profile(row)?))
    } else {
        Ok(None)
    }
}

/// Seed a default profile on an empty database so the service is usable
/// before any profile management happens.
pub fn seed_default_profile(conn: &Connection) -> Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM profiles", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(());
    }
    insert_profile(conn, "Default", DEFAULT_PASS_THRESHOLD)?;
    Ok(())
}

fn row_to_profile(row: &rusqlite::Row) -> Result<Profile> {
    let created_at: String = row.get(3)?;
    Ok(Profile {
        id: row.get(0)?,
        name: row.get(1)?,
        exam_pass_threshold: row.get(2)?,
        created_at: super::parse_timestamp(&created_at),
    })
}
