//! Retry sessions built from a previous session's missed questions.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rusqlite::Connection;

use crate::db;
use crate::db::sessions::NewSession;
use crate::error::{AppError, AppResult};

use super::session::{QuestionView, QuizStart};

/// Optional narrowing of a retry. With no `question_ids` every currently
/// incorrect question is retried; `random` overrides the source session's
/// shuffle flag when set.
#[derive(Debug, Clone, Default)]
pub struct RetryParams {
    pub question_ids: Option<Vec<i64>>,
    pub random: Option<bool>,
}

/// Derive a new session from the incorrect questions of an existing one.
/// Prompt and answer snapshots are copied from the source questions, so a
/// word edit between exam and retry does not change what is asked.
pub fn retry_session(
    conn: &Connection,
    profile_id: i64,
    session_id: i64,
    params: &RetryParams,
) -> AppResult<QuizStart> {
    let source = db::sessions::get_session_for_profile(conn, session_id, profile_id)?
        .ok_or_else(|| AppError::not_found("quiz session not found"))?;

    let mut subset = match &params.question_ids {
        Some(ids) => db::sessions::get_questions_by_ids(conn, session_id, ids)?,
        None => db::sessions::list_incorrect_questions(conn, session_id)?,
    };
    if subset.is_empty() {
        return Err(AppError::validation("no questions to retry"));
    }

    let randomize = params.random.unwrap_or(source.randomize);
    if randomize {
        subset.shuffle(&mut rand::rng());
    }

    let word_ids: Vec<i64> = subset.iter().map(|q| q.word_id).collect();
    let words: HashMap<i64, _> = db::words::get_words_by_ids(conn, &word_ids)?
        .into_iter()
        .map(|w| (w.id, w))
        .collect();

    let tx = conn.unchecked_transaction()?;
    let retry_id = db::sessions::insert_session(
        &tx,
        &NewSession {
            profile_id: source.profile_id,
            group_id: source.group_id,
            direction: source.direction,
            mode: source.mode,
            randomize,
            limit_count: Some(subset.len() as i64),
            min_star: source.min_star,
            star_values: source.star_values.clone(),
            total_questions: subset.len() as i64,
            is_retry: true,
        },
    )?;

    let mut questions = Vec::with_capacity(subset.len());
    for (idx, question) in subset.iter().enumerate() {
        let position = idx as i64 + 1;
        let question_id = db::sessions::insert_question(
            &tx,
            retry_id,
            question.word_id,
            position,
            &question.prompt,
            &question.answer,
        )?;
        let word = words.get(&question.word_id);
        questions.push(QuestionView {
            id: question_id,
            word_id: question.word_id,
            position,
            prompt: question.prompt.clone(),
            answer: question.answer.clone(),
            star: word.map(|w| w.star).unwrap_or(0),
            reading: word.and_then(|w| w.reading.clone()),
        });
    }
    tx.commit()?;

    tracing::debug!(
        source = session_id,
        retry = retry_id,
        total = questions.len(),
        "retry session started"
    );
    Ok(QuizStart {
        session_id: retry_id,
        total: questions.len() as i64,
        direction: source.direction,
        questions,
    })
}
