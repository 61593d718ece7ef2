use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use crate::db::{self, DbPool};
use crate::domain::{Folder, Group};
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    pub profile_id: i64,
    pub name: String,
}

pub async fn create_folder(
    State(pool): State<DbPool>,
    Json(req): Json<CreateFolderRequest>,
) -> AppResult<Json<Folder>> {
    if req.name.trim().is_empty() {
        return Err(AppError::validation("folder name must not be empty"));
    }
    let conn = db::try_lock(&pool)?;
    let id = db::groups::insert_folder(&conn, req.profile_id, req.name.trim())?;
    let folder = db::groups::get_folder(&conn, id)?
        .ok_or_else(|| AppError::not_found("folder not found"))?;
    Ok(Json(folder))
}

#[derive(Debug, Deserialize)]
pub struct ListFoldersQuery {
    pub profile_id: i64,
}

pub async fn list_folders(
    State(pool): State<DbPool>,
    Query(query): Query<ListFoldersQuery>,
) -> AppResult<Json<Vec<Folder>>> {
    let conn = db::try_lock(&pool)?;
    let folders = db::groups::list_folders(&conn, query.profile_id)?;
    Ok(Json(folders))
}

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub profile_id: i64,
    pub folder_id: i64,
    pub name: String,
}

pub async fn create_group(
    State(pool): State<DbPool>,
    Json(req): Json<CreateGroupRequest>,
) -> AppResult<Json<Group>> {
    if req.name.trim().is_empty() {
        return Err(AppError::validation("group name must not be empty"));
    }
    let conn = db::try_lock(&pool)?;
    db::groups::get_folder(&conn, req.folder_id)?
        .filter(|f| f.profile_id == req.profile_id)
        .ok_or_else(|| AppError::not_found("folder not found"))?;
    let id = db::groups::insert_group(&conn, req.profile_id, req.folder_id, req.name.trim())?;
    let group = db::groups::get_group(&conn, id)?
        .ok_or_else(|| AppError::not_found("group not found"))?;
    Ok(Json(group))
}

#[derive(Debug, Deserialize)]
pub struct ListGroupsQuery {
    pub folder_id: i64,
}

pub async fn list_groups(
    State(pool): State<DbPool>,
    Query(query): Query<ListGroupsQuery>,
) -> AppResult<Json<Vec<Group>>> {
    let conn = db::try_lock(&pool)?;
    let groups = db::groups::list_groups(&conn, query.folder_id)?;
    Ok(Json(groups))
}
