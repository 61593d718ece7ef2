use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::db::{self, DbPool};
use crate::domain::{Direction, QuizMode};
use crate::error::AppResult;
use crate::quiz::{
    self, HistoryItem, QuizProgress, QuizStart, RetryParams, StartParams,
};

#[derive(Debug, Deserialize)]
pub struct StartQuizRequest {
    pub profile_id: i64,
    /// Single-group form, kept for older clients; prepended to `group_ids`
    pub group_id: Option<i64>,
    #[serde(default)]
    pub group_ids: Vec<i64>,
    pub limit: Option<i64>,
    #[serde(default = "default_true")]
    pub random: bool,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub mode: QuizMode,
    pub min_star: Option<i64>,
    pub star_values: Option<Vec<i64>>,
    pub number_start: Option<i64>,
    pub number_end: Option<i64>,
}

fn default_true() -> bool {
    true
}

pub async fn start(
    State(pool): State<DbPool>,
    Json(req): Json<StartQuizRequest>,
) -> AppResult<Json<QuizStart>> {
    let conn = db::try_lock(&pool)?;
    let mut group_ids = Vec::new();
    if let Some(primary) = req.group_id {
        group_ids.push(primary);
    }
    group_ids.extend(&req.group_ids);

    let started = quiz::start_session(
        &conn,
        &StartParams {
            profile_id: req.profile_id,
            group_ids,
            direction: req.direction,
            mode: req.mode,
            random: req.random,
            limit: req.limit,
            min_star: req.min_star,
            star_values: req.star_values,
            number_start: req.number_start,
            number_end: req.number_end,
        },
    )?;
    Ok(Json(started))
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub profile_id: i64,
    pub question_id: i64,
    pub answer: Option<String>,
    pub is_correct: bool,
}

pub async fn answer(
    State(pool): State<DbPool>,
    Path(session_id): Path<i64>,
    Json(req): Json<AnswerRequest>,
) -> AppResult<Json<QuizProgress>> {
    let conn = db::try_lock(&pool)?;
    let progress = quiz::submit_answer(
        &conn,
        req.profile_id,
        session_id,
        req.question_id,
        req.answer.as_deref(),
        req.is_correct,
    )?;
    Ok(Json(progress))
}

#[derive(Debug, Deserialize)]
pub struct RetryRequest {
    pub profile_id: i64,
    pub question_ids: Option<Vec<i64>>,
    pub random: Option<bool>,
}

pub async fn retry(
    State(pool): State<DbPool>,
    Path(session_id): Path<i64>,
    Json(req): Json<RetryRequest>,
) -> AppResult<Json<QuizStart>> {
    let conn = db::try_lock(&pool)?;
    let started = quiz::retry_session(
        &conn,
        req.profile_id,
        session_id,
        &RetryParams {
            question_ids: req.question_ids,
            random: req.random,
        },
    )?;
    Ok(Json(started))
}

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub profile_id: i64,
}

pub async fn progress(
    State(pool): State<DbPool>,
    Path(session_id): Path<i64>,
    Query(query): Query<ProfileQuery>,
) -> AppResult<Json<QuizProgress>> {
    let conn = db::try_lock(&pool)?;
    let progress = quiz::progress(&conn, query.profile_id, session_id)?;
    Ok(Json(progress))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub profile_id: i64,
    pub limit: Option<i64>,
}

pub async fn history(
    State(pool): State<DbPool>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<HistoryItem>>> {
    let conn = db::try_lock(&pool)?;
    let items = quiz::list_history(&conn, query.profile_id, query.limit)?;
    Ok(Json(items))
}
