use std::collections::HashSet;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::db::{self, DbPool};
use crate::db::plans::PlanRow;
use crate::error::{AppError, AppResult};
use crate::quiz::{self, ExamOutcome};

/// A plan annotated with the exam sessions that count toward it. A plan is
/// completed once any attributed exam on its date passed.
#[derive(Debug, Serialize)]
pub struct PlanView {
    pub id: i64,
    pub study_date: NaiveDate,
    pub folder_id: i64,
    pub folder_name: String,
    pub group_id: i64,
    pub group_name: String,
    pub is_completed: bool,
    pub exam_sessions: Vec<ExamOutcome>,
}

fn annotate(conn: &Connection, profile_id: i64, plans: Vec<PlanRow>) -> AppResult<Vec<PlanView>> {
    if plans.is_empty() {
        return Ok(vec![]);
    }
    let tracked: HashSet<i64> = plans.iter().map(|p| p.plan.group_id).collect();
    let min_date = plans.iter().map(|p| p.plan.study_date).min().unwrap_or_default();
    let max_date = plans.iter().map(|p| p.plan.study_date).max().unwrap_or(min_date);
    let mut outcomes = quiz::exam_outcomes(conn, profile_id, &tracked, min_date, max_date)?;

    Ok(plans
        .into_iter()
        .map(|row| {
            let sessions = outcomes
                .remove(&(row.plan.group_id, row.plan.study_date))
                .unwrap_or_default();
            PlanView {
                id: row.plan.id,
                study_date: row.plan.study_date,
                folder_id: row.plan.folder_id,
                folder_name: row.folder_name,
                group_id: row.plan.group_id,
                group_name: row.group_name,
                is_completed: sessions.iter().any(|s| s.passed),
                exam_sessions: sessions,
            }
        })
        .collect())
}

#[derive(Debug, Deserialize)]
pub struct ListPlansQuery {
    pub profile_id: i64,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

pub async fn list(
    State(pool): State<DbPool>,
    Query(query): Query<ListPlansQuery>,
) -> AppResult<Json<Vec<PlanView>>> {
    let conn = db::try_lock(&pool)?;
    let plans = db::plans::list_plans(&conn, query.profile_id, query.start, query.end)?;
    Ok(Json(annotate(&conn, query.profile_id, plans)?))
}

#[derive(Debug, Deserialize)]
pub struct SetPlansRequest {
    pub profile_id: i64,
    #[serde(default)]
    pub group_ids: Vec<i64>,
}

/// Replace the plans of one date with the given groups. An empty list
/// clears the date.
pub async fn set_for_date(
    State(pool): State<DbPool>,
    Path(study_date): Path<NaiveDate>,
    Json(req): Json<SetPlansRequest>,
) -> AppResult<Json<Vec<PlanView>>> {
    let mut group_ids: Vec<i64> = Vec::new();
    for id in &req.group_ids {
        if !group_ids.contains(id) {
            group_ids.push(*id);
        }
    }

    let conn = db::try_lock(&pool)?;
    let groups = db::groups::get_groups_by_ids(&conn, &group_ids)?;
    let owned: Vec<_> = groups
        .into_iter()
        .filter(|g| g.profile_id == req.profile_id)
        .collect();
    if owned.len() != group_ids.len() {
        return Err(AppError::not_found("one or more groups not found"));
    }

    let tx = conn.unchecked_transaction()?;
    db::plans::delete_plans_for_date(&tx, req.profile_id, study_date)?;
    for group_id in &group_ids {
        // owned is unordered; look the folder up per id
        let group = owned
            .iter()
            .find(|g| g.id == *group_id)
            .ok_or_else(|| AppError::not_found("one or more groups not found"))?;
        db::plans::insert_plan(&tx, req.profile_id, study_date, group.folder_id, group.id)?;
    }
    tx.commit()?;

    let refreshed =
        db::plans::list_plans(&conn, req.profile_id, Some(study_date), Some(study_date))?;
    Ok(Json(annotate(&conn, req.profile_id, refreshed)?))
}

#[derive(Debug, Deserialize)]
pub struct MovePlanRequest {
    pub profile_id: i64,
    pub study_date: NaiveDate,
}

pub async fn move_plan(
    State(pool): State<DbPool>,
    Path(plan_id): Path<i64>,
    Json(req): Json<MovePlanRequest>,
) -> AppResult<Json<PlanView>> {
    let conn = db::try_lock(&pool)?;
    db::plans::get_plan_for_profile(&conn, plan_id, req.profile_id)?
        .ok_or_else(|| AppError::not_found("study plan not found"))?;
    db::plans::update_plan_date(&conn, plan_id, req.study_date)?;

    let moved = db::plans::get_plan_for_profile(&conn, plan_id, req.profile_id)?
        .ok_or_else(|| AppError::not_found("study plan not found"))?;
    let mut views = annotate(&conn, req.profile_id, vec![moved])?;
    views
        .pop()
        .map(Json)
        .ok_or_else(|| AppError::not_found("study plan not found"))
}

#[derive(Debug, Deserialize)]
pub struct DeletePlanQuery {
    pub profile_id: i64,
}

pub async fn remove(
    State(pool): State<DbPool>,
    Path(plan_id): Path<i64>,
    Query(query): Query<DeletePlanQuery>,
) -> AppResult<Json<Value>> {
    let conn = db::try_lock(&pool)?;
    db::plans::get_plan_for_profile(&conn, plan_id, query.profile_id)?
        .ok_or_else(|| AppError::not_found("study plan not found"))?;
    db::plans::delete_plan(&conn, plan_id)?;
    Ok(Json(json!({ "ok": true })))
}
