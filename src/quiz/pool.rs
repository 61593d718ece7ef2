//! Word pool selection: filter, slice, shuffle, truncate.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rusqlite::Connection;

use crate::config::MAX_STAR;
use crate::db;
use crate::domain::{Group, Word};
use crate::error::{AppError, AppResult};

/// Selection parameters for a word pool.
#[derive(Debug, Clone, Default)]
pub struct PoolParams {
    pub min_star: Option<i64>,
    pub star_values: Option<Vec<i64>>,
    /// 1-based slice bounds; only legal when exactly one group is selected
    pub number_start: Option<i64>,
    pub number_end: Option<i64>,
    pub randomize: bool,
    pub limit: Option<i64>,
}

/// De-duplicate caller-supplied group ids preserving their order, rejecting
/// an empty selection.
pub fn normalize_group_ids(ids: &[i64]) -> AppResult<Vec<i64>> {
    let mut seen = HashSet::new();
    let deduped: Vec<i64> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
    if deduped.is_empty() {
        return Err(AppError::validation("select at least one group to quiz"));
    }
    Ok(deduped)
}

/// Build the ordered candidate pool for a session.
///
/// Words are loaded per group in insertion order and concatenated in the
/// caller-supplied group order, so a non-random multi-group pool is
/// deterministic. The number-range slice applies before shuffling and the
/// result limit after, as a final truncation.
pub fn select_pool(
    conn: &Connection,
    profile_id: i64,
    group_ids: &[i64],
    params: &PoolParams,
) -> AppResult<Vec<Word>> {
    let group_ids = normalize_group_ids(group_ids)?;
    check_star_filters(params)?;

    let groups = db::groups::get_groups_by_ids(conn, &group_ids)?;
    let by_id: HashMap<i64, &Group> = groups.iter().map(|g| (g.id, g)).collect();

    let missing: Vec<i64> = group_ids
        .iter()
        .copied()
        .filter(|id| !by_id.contains_key(id))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::not_found(format!(
            "groups not found: {:?}",
            missing
        )));
    }
    if groups.iter().any(|g| g.profile_id != profile_id) {
        // Foreign groups read the same as absent ones
        return Err(AppError::not_found("groups not found"));
    }

    let folder_ids: HashSet<i64> = groups.iter().map(|g| g.folder_id).collect();
    if folder_ids.len() > 1 {
        return Err(AppError::validation(
            "groups must belong to a single folder",
        ));
    }

    let mut pool = Vec::new();
    for group_id in &group_ids {
        pool.extend(db::words::list_words_filtered(
            conn,
            *group_id,
            params.min_star,
            params.star_values.as_deref(),
        )?);
    }

    if params.number_start.is_some() || params.number_end.is_some() {
        pool = slice_number_range(pool, &group_ids, params)?;
    }

    if params.randomize {
        pool.shuffle(&mut rand::rng());
    }

    if let Some(limit) = params.limit {
        if limit <= 0 {
            return Err(AppError::validation("limit must be positive"));
        }
        pool.truncate(limit as usize);
    }

    if pool.is_empty() {
        return Err(AppError::validation("no words match the selected filters"));
    }
    Ok(pool)
}

fn check_star_filters(params: &PoolParams) -> AppResult<()> {
    let star_range = 0..=MAX_STAR;
    if let Some(min) = params.min_star {
        if !star_range.contains(&min) {
            return Err(AppError::validation(format!(
                "min_star must be between 0 and {}",
                MAX_STAR
            )));
        }
    }
    if let Some(values) = &params.star_values {
        if values.iter().any(|v| !star_range.contains(v)) {
            return Err(AppError::validation(format!(
                "star values must be between 0 and {}",
                MAX_STAR
            )));
        }
    }
    Ok(())
}

/// Apply the 1-based `[start, end]` slice. End is clamped to the pool size;
/// a start past the pool or past the end is rejected.
fn slice_number_range(
    pool: Vec<Word>,
    group_ids: &[i64],
    params: &PoolParams,
) -> AppResult<Vec<Word>> {
    if group_ids.len() != 1 {
        return Err(AppError::validation(
            "number range requires a single group",
        ));
    }
    let start = params.number_start.unwrap_or(1);
    let end = params.number_end.unwrap_or(start);
    if start < 1 || end < 1 {
        return Err(AppError::validation("number range starts at 1"));
    }

    let len = pool.len() as i64;
    let end = end.min(len);
    if start > len {
        return Err(AppError::validation("start exceeds pool size"));
    }
    if start > end {
        return Err(AppError::validation("start cannot exceed end"));
    }
    Ok(pool
        .into_iter()
        .skip(start as usize - 1)
        .take((end - start + 1) as usize)
        .collect())
}
