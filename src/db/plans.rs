//! Study plan rows. The scheduler reads quiz outcomes; nothing here stores
//! a completion flag.

use chrono::NaiveDate;
use rusqlite::{Connection, Result, params};

use crate::domain::StudyPlan;

/// A plan joined with its folder and group names for display.
#[derive(Debug, Clone)]
pub struct PlanRow {
    pub plan: StudyPlan,
    pub folder_name: String,
    pub group_name: String,
}

const PLAN_COLUMNS: &str = "p.id, p.profile_id, p.study_date, p.folder_id, p.group_id, p.created_at, f.name, g.name";

const PLAN_JOINS: &str = "FROM study_plans p JOIN folders f ON f.id = p.folder_id JOIN groups g ON g.id = p.group_id";

pub fn insert_plan(
    conn: &Connection,
    profile_id: i64,
    study_date: NaiveDate,
    folder_id: i64,
    group_id: i64,
) -> Result<i64> {
    conn.execute(
        r#"
    INSERT INTO study_plans (profile_id, study_date, folder_id, group_id, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5)
    "#,
        params![
            profile_id,
            study_date.to_string(),
            folder_id,
            group_id,
            super::now_string()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_plan_for_profile(conn: &Connection, id: i64, profile_id: i64) -> Result<Option<PlanRow>> {
    let query = format!(
        "SELECT {} {} WHERE p.id = ?1 AND p.profile_id = ?2",
        PLAN_COLUMNS, PLAN_JOINS
    );
    let mut stmt = conn.prepare(&query)?;
    let mut rows = stmt.query(params![id, profile_id])?;
    if let Some(row) = rows.next()? {
        Ok(Some(row_to_plan(row)?))
    } else {
        Ok(None)
    }
}

/// Plans of a profile within an optional date window, ordered by date then id.
pub fn list_plans(
    conn: &Connection,
    profile_id: i64,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<PlanRow>> {
    let mut clauses = vec!["p.profile_id = ?1".to_string()];
    if let Some(start) = start {
        clauses.push(format!("p.study_date >= '{}'", start));
    }
    if let Some(end) = end {
        clauses.push(format!("p.study_date <= '{}'", end));
    }
    let query = format!(
        "SELECT {} {} WHERE {} ORDER BY p.study_date ASC, p.id ASC",
        PLAN_COLUMNS,
        PLAN_JOINS,
        clauses.join(" AND ")
    );
    let mut stmt = conn.prepare(&query)?;
    let plans = stmt
        .query_map(params![profile_id], row_to_plan)?
        .collect::<Result<Vec<_>>>()?;
    Ok(plans)
}

pub fn delete_plans_for_date(
    conn: &Connection,
    profile_id: i64,
    study_date: NaiveDate,
) -> Result<usize> {
    conn.execute(
        "DELETE FROM study_plans WHERE profile_id = ?1 AND study_date = ?2",
        params![profile_id, study_date.to_string()],
    )
}

pub fn update_plan_date(conn: &Connection, id: i64, study_date: NaiveDate) -> Result<()> {
    conn.execute(
        "UPDATE study_plans SET study_date = ?1 WHERE id = ?2",
        params![study_date.to_string(), id],
    )?;
    Ok(())
}

pub fn delete_plan(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM study_plans WHERE id = ?1", params![id])
}

fn row_to_plan(row: &rusqlite::Row) -> Result<PlanRow> {
    let study_date: String = row.get(2)?;
    let created_at: String = row.get(5)?;
    Ok(PlanRow {
        plan: StudyPlan {
            id: row.get(0)?,
            profile_id: row.get(1)?,
            study_date: study_date
                .parse()
                .unwrap_or_else(|_| chrono::Utc::now().date_naive()),
            folder_id: row.get(3)?,
            group_id: row.get(4)?,
            created_at: super::parse_timestamp(&created_at),
        },
        folder_name: row.get(6)?,
        group_name: row.get(7)?,
    })
}
