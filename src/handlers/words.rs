use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::db::{self, DbPool};
use crate::domain::{NewWord, Word, WordPatch};
use crate::error::{AppError, AppResult};
use crate::quiz;

/// UNIQUE violations on (group, language, term) surface as a client
/// error, not a 500.
fn map_duplicate(err: rusqlite::Error) -> AppError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            AppError::validation("word already exists in this group")
        }
        _ => AppError::Db(err),
    }
}

pub async fn create(
    State(pool): State<DbPool>,
    Json(word): Json<NewWord>,
) -> AppResult<Json<Word>> {
    word.validate()?;
    let conn = db::try_lock(&pool)?;
    if db::groups::get_group(&conn, word.group_id)?.is_none() {
        return Err(AppError::not_found("group not found"));
    }
    let id = db::words::insert_word(&conn, &word).map_err(map_duplicate)?;
    let created = db::words::get_word(&conn, id)?
        .ok_or_else(|| AppError::not_found("word not found"))?;
    Ok(Json(created))
}

#[derive(Debug, Deserialize)]
pub struct ListWordsQuery {
    pub group_id: i64,
}

pub async fn list(
    State(pool): State<DbPool>,
    Query(query): Query<ListWordsQuery>,
) -> AppResult<Json<Vec<Word>>> {
    let conn = db::try_lock(&pool)?;
    let words = db::words::list_words(&conn, query.group_id)?;
    Ok(Json(words))
}

pub async fn update(
    State(pool): State<DbPool>,
    Path(word_id): Path<i64>,
    Json(patch): Json<WordPatch>,
) -> AppResult<Json<Word>> {
    patch.validate()?;
    let conn = db::try_lock(&pool)?;
    if db::words::get_word(&conn, word_id)?.is_none() {
        return Err(AppError::not_found("word not found"));
    }
    if !patch.is_empty() {
        db::words::update_word(&conn, word_id, &patch).map_err(map_duplicate)?;
    }
    let updated = db::words::get_word(&conn, word_id)?
        .ok_or_else(|| AppError::not_found("word not found"))?;
    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
pub struct DeleteWordQuery {
    pub profile_id: i64,
}

pub async fn remove(
    State(pool): State<DbPool>,
    Path(word_id): Path<i64>,
    Query(query): Query<DeleteWordQuery>,
) -> AppResult<Json<Value>> {
    let conn = db::try_lock(&pool)?;
    quiz::delete_word(&conn, query.profile_id, word_id)?;
    Ok(Json(json!({ "ok": true })))
}
