//! Folder and group rows. Groups belong to exactly one profile and folder.

use rusqlite::{Connection, Result, params};

use crate::domain::{Folder, Group};

pub fn insert_folder(conn: &Connection, profile_id: i64, name: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO folders (profile_id, name, created_at) VALUES (?1, ?2, ?3)",
        params![profile_id, name, super::now_string()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_folder(conn: &Connection, id: i64) -> Result<Option<Folder>> {
    let mut stmt =
        conn.prepare("SELECT id, profile_id, name, created_at FROM folders WHERE id = ?1")?;
    let mut rows = stmt.query(params![id])?;
    if let Some(row) = rows.next()? {
        Ok(Some(row_to_folder(row)?))
    } else {
        Ok(None)
    }
}

pub fn list_folders(conn: &Connection, profile_id: i64) -> Result<Vec<Folder>> {
    let mut stmt = conn.prepare(
        "SELECT id, profile_id, name, created_at FROM folders WHERE profile_id = ?1 ORDER BY id ASC",
    )?;
    let folders = stmt
        .query_map(params![profile_id], row_to_folder)?
        .collect::<Result<Vec<_>>>()?;
    Ok(folders)
}

pub fn insert_group(conn: &Connection, profile_id: i64, folder_id: i64, name: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO groups (profile_id, folder_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![profile_id, folder_id, name, super::now_string()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_group(conn: &Connection, id: i64) -> Result<Option<Group>> {
    let mut stmt = conn
        .prepare("SELECT id, profile_id, folder_id, name, created_at FROM groups WHERE id = ?1")?;
    let mut rows = stmt.query(params![id])?;
    if let Some(row) = rows.next()? {
        Ok(Some(row_to_group(row)?))
    } else {
        Ok(None)
    }
}

/// Load a set of groups by id. Order of the result is unspecified; callers
/// that care about caller-supplied order index into a map.
pub fn get_groups_by_ids(conn: &Connection, ids: &[i64]) -> Result<Vec<Group>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let id_list = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let query = format!(
        "SELECT id, profile_id, folder_id, name, created_at FROM groups WHERE id IN ({})",
        id_list
    );
    let mut stmt = conn.prepare(&query)?;
    let groups = stmt
        .query_map([], row_to_group)?
        .collect::<Result<Vec<_>>>()?;
    Ok(groups)
}

pub fn list_groups(conn: &Connection, folder_id: i64) -> Result<Vec<Group>> {
    let mut stmt = conn.prepare(
        "SELECT id, profile_id, folder_id, name, created_at FROM groups WHERE folder_id = ?1 ORDER BY id ASC",
    )?;
    let groups = stmt
        .query_map(params![folder_id], row_to_group)?
        .collect::<Result<Vec<_>>>()?;
    Ok(groups)
}

fn row_to_folder(row: &rusqlite::Row) -> Result<Folder> {
    let created_at: String = row.get(3)?;
    Ok(Folder {
        id: row.get(0)?,
        profile_id: row.get(1)?,
        name: row.get(2)?,
        created_at: super::parse_timestamp(&created_at),
    })
}

fn row_to_group(row: &rusqlite::Row) -> Result<Group> {
    let created_at: String = row.get(4)?;
    Ok(Group {
        id: row.get(0)?,
        profile_id: row.get(1)?,
        folder_id: row.get(2)?,
        name: row.get(3)?,
        created_at: super::parse_timestamp(&created_at),
    })
}
