//! Quiz session and question rows.
//!
//! Counter mutations happen inside the caller's transaction; the single
//! writer-per-request model (one connection behind a mutex) serializes the
//! read-modify-write of a session's counters.

use rusqlite::{Connection, Result, params};

use crate::domain::{Direction, QuizMode, QuizQuestion, QuizSession};

const SESSION_COLUMNS: &str = "id, profile_id, group_id, direction, mode, randomize, limit_count, \
     min_star, star_values, total_questions, answered_questions, correct_questions, is_retry, created_at";

const QUESTION_COLUMNS: &str =
    "id, session_id, word_id, position, prompt, answer, user_answer, is_correct, created_at";

/// Insert payload for a session; counters start at zero.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub profile_id: i64,
    pub group_id: i64,
    pub direction: Direction,
    pub mode: QuizMode,
    pub randomize: bool,
    pub limit_count: Option<i64>,
    pub min_star: Option<i64>,
    pub star_values: Option<String>,
    pub total_questions: i64,
    pub is_retry: bool,
}

pub fn insert_session(conn: &Connection, session: &NewSession) -> Result<i64> {
    conn.execute(
        r#"
    INSERT INTO quiz_sessions (profile_id, group_id, direction, mode, randomize, limit_count,
                               min_star, star_values, total_questions, answered_questions,
                               correct_questions, is_retry, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, 0, ?10, ?11)
    "#,
        params![
            session.profile_id,
            session.group_id,
            session.direction.as_str(),
            session.mode.as_str(),
            session.randomize,
            session.limit_count,
            session.min_star,
            session.star_values,
            session.total_questions,
            session.is_retry,
            super::now_string(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_session(conn: &Connection, id: i64) -> Result<Option<QuizSession>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM quiz_sessions WHERE id = ?1",
        SESSION_COLUMNS
    ))?;
    let mut rows = stmt.query(params![id])?;
    if let Some(row) = rows.next()? {
        Ok(Some(row_to_session(row)?))
    } else {
        Ok(None)
    }
}

/// Ownership-checked lookup; a session of another profile reads as absent.
pub fn get_session_for_profile(
    conn: &Connection,
    id: i64,
    profile_id: i64,
) -> Result<Option<QuizSession>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM quiz_sessions WHERE id = ?1 AND profile_id = ?2",
        SESSION_COLUMNS
    ))?;
    let mut rows = stmt.query(params![id, profile_id])?;
    if let Some(row) = rows.next()? {
        Ok(Some(row_to_session(row)?))
    } else {
        Ok(None)
    }
}

pub fn update_session_counts(
    conn: &Connection,
    id: i64,
    answered_questions: i64,
    correct_questions: i64,
) -> Result<()> {
    conn.execute(
        "UPDATE quiz_sessions SET answered_questions = ?1, correct_questions = ?2 WHERE id = ?3",
        params![answered_questions, correct_questions, id],
    )?;
    Ok(())
}

/// Subtract a deleted word's contribution from a session, floored at zero.
pub fn subtract_session_counts(
    conn: &Connection,
    id: i64,
    total: i64,
    answered: i64,
    correct: i64,
) -> Result<()> {
    conn.execute(
        r#"
    UPDATE quiz_sessions SET
      total_questions = MAX(total_questions - ?1, 0),
      answered_questions = MAX(answered_questions - ?2, 0),
      correct_questions = MAX(correct_questions - ?3, 0)
    WHERE id = ?4
    "#,
        params![total, answered, correct, id],
    )?;
    Ok(())
}

pub fn list_recent_sessions(
    conn: &Connection,
    profile_id: i64,
    limit: i64,
) -> Result<Vec<QuizSession>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM quiz_sessions WHERE profile_id = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2",
        SESSION_COLUMNS
    ))?;
    let sessions = stmt
        .query_map(params![profile_id, limit], row_to_session)?
        .collect::<Result<Vec<_>>>()?;
    Ok(sessions)
}

/// Exam-mode sessions created within `[start, end)`, newest first.
pub fn list_exam_sessions_between(
    conn: &Connection,
    profile_id: i64,
    start: &str,
    end: &str,
) -> Result<Vec<QuizSession>> {
    let mut stmt = conn.prepare(&format!(
        r#"
    SELECT {} FROM quiz_sessions
    WHERE profile_id = ?1 AND mode = 'exam' AND created_at >= ?2 AND created_at < ?3
    ORDER BY created_at DESC, id DESC
    "#,
        SESSION_COLUMNS
    ))?;
    let sessions = stmt
        .query_map(params![profile_id, start, end], row_to_session)?
        .collect::<Result<Vec<_>>>()?;
    Ok(sessions)
}

pub fn insert_question(
    conn: &Connection,
    session_id: i64,
    word_id: i64,
    position: i64,
    prompt: &str,
    answer: &str,
) -> Result<i64> {
    conn.execute(
        r#"
    INSERT INTO quiz_questions (session_id, word_id, position, prompt, answer, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
        params![session_id, word_id, position, prompt, answer, super::now_string()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_question(conn: &Connection, id: i64) -> Result<Option<QuizQuestion>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM quiz_questions WHERE id = ?1",
        QUESTION_COLUMNS
    ))?;
    let mut rows = stmt.query(params![id])?;
    if let Some(row) = rows.next()? {
        Ok(Some(row_to_question(row)?))
    } else {
        Ok(None)
    }
}

pub fn list_questions(conn: &Connection, session_id: i64) -> Result<Vec<QuizQuestion>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM quiz_questions WHERE session_id = ?1 ORDER BY position ASC",
        QUESTION_COLUMNS
    ))?;
    let questions = stmt
        .query_map(params![session_id], row_to_question)?
        .collect::<Result<Vec<_>>>()?;
    Ok(questions)
}

/// Session questions restricted to the given ids, in original position order.
/// Ids outside the session are dropped silently.
pub fn get_questions_by_ids(
    conn: &Connection,
    session_id: i64,
    ids: &[i64],
) -> Result<Vec<QuizQuestion>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let id_list = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let query = format!(
        "SELECT {} FROM quiz_questions WHERE session_id = ?1 AND id IN ({}) ORDER BY position ASC",
        QUESTION_COLUMNS, id_list
    );
    let mut stmt = conn.prepare(&query)?;
    let questions = stmt
        .query_map(params![session_id], row_to_question)?
        .collect::<Result<Vec<_>>>()?;
    Ok(questions)
}

/// Questions explicitly marked incorrect, in position order. Unanswered
/// questions (NULL) do not count as incorrect.
pub fn list_incorrect_questions(conn: &Connection, session_id: i64) -> Result<Vec<QuizQuestion>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM quiz_questions WHERE session_id = ?1 AND is_correct = 0 ORDER BY position ASC",
        QUESTION_COLUMNS
    ))?;
    let questions = stmt
        .query_map(params![session_id], row_to_question)?
        .collect::<Result<Vec<_>>>()?;
    Ok(questions)
}

pub fn incorrect_question_ids(conn: &Connection, session_id: i64) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT id FROM quiz_questions WHERE session_id = ?1 AND is_correct = 0 ORDER BY position ASC",
    )?;
    let ids = stmt
        .query_map(params![session_id], |row| row.get(0))?
        .collect::<Result<Vec<_>>>()?;
    Ok(ids)
}

pub fn update_question_answer(
    conn: &Connection,
    id: i64,
    user_answer: Option<&str>,
    is_correct: bool,
) -> Result<()> {
    conn.execute(
        "UPDATE quiz_questions SET user_answer = ?1, is_correct = ?2 WHERE id = ?3",
        params![user_answer, is_correct, id],
    )?;
    Ok(())
}

/// (session_id, is_correct) for every question referencing a word. Drives
/// the counter reconciliation when the word is deleted.
pub fn questions_for_word(conn: &Connection, word_id: i64) -> Result<Vec<(i64, Option<bool>)>> {
    let mut stmt =
        conn.prepare("SELECT session_id, is_correct FROM quiz_questions WHERE word_id = ?1")?;
    let rows = stmt
        .query_map(params![word_id], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn delete_questions_for_word(conn: &Connection, word_id: i64) -> Result<usize> {
    conn.execute("DELETE FROM quiz_questions WHERE word_id = ?1", params![word_id])
}

/// Distinct (session_id, group_id, group_name, folder_id, folder_name)
/// reached by joining each session's questions through words to groups and
/// folders. Join order follows question position so first-seen names are
/// stable.
pub fn touched_groups(
    conn: &Connection,
    session_ids: &[i64],
) -> Result<Vec<(i64, i64, String, i64, String)>> {
    if session_ids.is_empty() {
        return Ok(vec![]);
    }
    let id_list = session_ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let query = format!(
        r#"
    SELECT q.session_id, g.id, g.name, f.id, f.name
    FROM quiz_questions q
    JOIN words w ON w.id = q.word_id
    JOIN groups g ON g.id = w.group_id
    JOIN folders f ON f.id = g.folder_id
    WHERE q.session_id IN ({})
    GROUP BY q.session_id, g.id
    ORDER BY q.session_id, MIN(q.position)
    "#,
        id_list
    );
    let mut stmt = conn.prepare(&query)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(rows)
}

/// Distinct (session_id, group_id) pairs for attribution of sessions to
/// study-plan groups.
pub fn session_group_ids(conn: &Connection, session_ids: &[i64]) -> Result<Vec<(i64, i64)>> {
    if session_ids.is_empty() {
        return Ok(vec![]);
    }
    let id_list = session_ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let query = format!(
        r#"
    SELECT DISTINCT q.session_id, w.group_id
    FROM quiz_questions q
    JOIN words w ON w.id = q.word_id
    WHERE q.session_id IN ({})
    "#,
        id_list
    );
    let mut stmt = conn.prepare(&query)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>>>()?;
    Ok(rows)
}

fn row_to_session(row: &rusqlite::Row) -> Result<QuizSession> {
    let direction: String = row.get(3)?;
    let mode: String = row.get(4)?;
    let created_at: String = row.get(13)?;
    Ok(QuizSession {
        id: row.get(0)?,
        profile_id: row.get(1)?,
        group_id: row.get(2)?,
        direction: Direction::from_str(&direction).unwrap_or_default(),
        mode: QuizMode::from_str(&mode).unwrap_or_default(),
        randomize: row.get(5)?,
        limit_count: row.get(6)?,
        min_star: row.get(7)?,
        star_values: row.get(8)?,
        total_questions: row.get(9)?,
        answered_questions: row.get(10)?,
        correct_questions: row.get(11)?,
        is_retry: row.get(12)?,
        created_at: super::parse_timestamp(&created_at),
    })
}

fn row_to_question(row: &rusqlite::Row) -> Result<QuizQuestion> {
    let created_at: String = row.get(8)?;
    Ok(QuizQuestion {
        id: row.get(0)?,
        session_id: row.get(1)?,
        word_id: row.get(2)?,
        position: row.get(3)?,
        prompt: row.get(4)?,
        answer: row.get(5)?,
        user_answer: row.get(6)?,
        is_correct: row.get(7)?,
        created_at: super::parse_timestamp(&created_at),
    })
}
