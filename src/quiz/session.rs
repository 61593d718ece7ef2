//! Session construction from a selected word pool.

use rusqlite::Connection;
use serde::Serialize;

use crate::db;
use crate::db::sessions::NewSession;
use crate::domain::{Direction, QuizMode, Word, quiz::serialize_star_values};
use crate::error::AppResult;

use super::pool::{self, PoolParams};

/// Everything needed to start a session.
#[derive(Debug, Clone)]
pub struct StartParams {
    pub profile_id: i64,
    pub group_ids: Vec<i64>,
    pub direction: Direction,
    pub mode: QuizMode,
    pub random: bool,
    pub limit: Option<i64>,
    pub min_star: Option<i64>,
    pub star_values: Option<Vec<i64>>,
    pub number_start: Option<i64>,
    pub number_end: Option<i64>,
}

/// A question as handed to the client: the stored snapshot plus the word's
/// current star and reading (display projection, not persisted on the
/// question).
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: i64,
    pub word_id: i64,
    pub position: i64,
    pub prompt: String,
    pub answer: String,
    pub star: i64,
    pub reading: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuizStart {
    pub session_id: i64,
    pub total: i64,
    pub direction: Direction,
    pub questions: Vec<QuestionView>,
}

/// Select the pool and persist the session with its questions atomically.
/// An empty pool fails before anything is written; no partial session
/// survives an error mid-build.
pub fn start_session(conn: &Connection, params: &StartParams) -> AppResult<QuizStart> {
    let group_ids = pool::normalize_group_ids(&params.group_ids)?;
    let pool_params = PoolParams {
        min_star: params.min_star,
        star_values: params.star_values.clone(),
        number_start: params.number_start,
        number_end: params.number_end,
        randomize: params.random,
        limit: params.limit,
    };
    let pool = pool::select_pool(conn, params.profile_id, &group_ids, &pool_params)?;

    let tx = conn.unchecked_transaction()?;
    let session_id = db::sessions::insert_session(
        &tx,
        &NewSession {
            profile_id: params.profile_id,
            group_id: group_ids[0],
            direction: params.direction,
            mode: params.mode,
            randomize: params.random,
            limit_count: params.limit,
            min_star: params.min_star,
            star_values: params
                .star_values
                .as_deref()
                .and_then(serialize_star_values),
            total_questions: pool.len() as i64,
            is_retry: false,
        },
    )?;

    let mut questions = Vec::with_capacity(pool.len());
    for (idx, word) in pool.iter().enumerate() {
        let position = idx as i64 + 1;
        let (prompt, answer) = prompt_and_answer(word, params.direction);
        let question_id =
            db::sessions::insert_question(&tx, session_id, word.id, position, &prompt, &answer)?;
        questions.push(QuestionView {
            id: question_id,
            word_id: word.id,
            position,
            prompt,
            answer,
            star: word.star,
            reading: word.reading.clone(),
        });
    }
    tx.commit()?;

    tracing::debug!(session_id, total = questions.len(), "quiz session started");
    Ok(QuizStart {
        session_id,
        total: questions.len() as i64,
        direction: params.direction,
        questions,
    })
}

fn prompt_and_answer(word: &Word, direction: Direction) -> (String, String) {
    match direction {
        Direction::TermToMeaning => (word.term.clone(), word.meaning.clone()),
        Direction::MeaningToTerm => (word.meaning.clone(), word.term.clone()),
    }
}
