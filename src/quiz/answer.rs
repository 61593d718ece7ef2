//! Answer recording with idempotent re-answer reconciliation.

use rusqlite::Connection;
use serde::Serialize;

use crate::db;
use crate::domain::{QuizMode, QuizSession};
use crate::error::{AppError, AppResult};

/// Running totals for a session plus the questions currently marked
/// incorrect. Unanswered questions are not incorrect.
#[derive(Debug, Serialize)]
pub struct QuizProgress {
    pub session_id: i64,
    pub total: i64,
    pub answered: i64,
    pub correct: i64,
    pub remaining: i64,
    pub incorrect_question_ids: Vec<i64>,
}

/// Record one answer. Correctness grading is the caller's job; this
/// reconciles counters against the question's previously stored state, so
/// arbitrary resubmissions never drift the totals.
pub fn submit_answer(
    conn: &Connection,
    profile_id: i64,
    session_id: i64,
    question_id: i64,
    user_answer: Option<&str>,
    is_correct: bool,
) -> AppResult<QuizProgress> {
    let tx = conn.unchecked_transaction()?;

    let session = db::sessions::get_session_for_profile(&tx, session_id, profile_id)?
        .ok_or_else(|| AppError::not_found("quiz session not found"))?;
    let question = db::sessions::get_question(&tx, question_id)?
        .filter(|q| q.session_id == session_id)
        .ok_or_else(|| AppError::not_found("question not found in this session"))?;

    let previous = question.is_correct;
    db::sessions::update_question_answer(&tx, question_id, user_answer, is_correct)?;

    let mut answered = session.answered_questions;
    let mut correct = session.correct_questions;
    match previous {
        None => {
            answered += 1;
            if is_correct {
                correct += 1;
            }
        }
        Some(true) if !is_correct => correct -= 1,
        Some(false) if is_correct => correct += 1,
        _ => {}
    }

    // Cascading word deletes can leave stale totals behind; clamp instead
    // of failing the submission.
    if answered > session.total_questions || correct > answered || correct < 0 {
        tracing::warn!(
            session_id,
            answered,
            correct,
            total = session.total_questions,
            "session counters out of range, clamping"
        );
        answered = answered.clamp(0, session.total_questions);
        correct = correct.clamp(0, answered);
    }
    db::sessions::update_session_counts(&tx, session_id, answered, correct)?;

    // Penalize first-exam misses only: never on retries, never on
    // resubmissions, never in study mode.
    if session.mode == QuizMode::Exam && !session.is_retry && previous.is_none() && !is_correct {
        db::words::bump_star(&tx, question.word_id)?;
    }

    tx.commit()?;

    let incorrect = db::sessions::incorrect_question_ids(conn, session_id)?;
    Ok(QuizProgress {
        session_id,
        total: session.total_questions,
        answered,
        correct,
        remaining: (session.total_questions - answered).max(0),
        incorrect_question_ids: incorrect,
    })
}

/// Progress snapshot without submitting anything.
pub fn progress(conn: &Connection, profile_id: i64, session_id: i64) -> AppResult<QuizProgress> {
    let session = db::sessions::get_session_for_profile(conn, session_id, profile_id)?
        .ok_or_else(|| AppError::not_found("quiz session not found"))?;
    build_progress(conn, &session)
}

fn build_progress(conn: &Connection, session: &QuizSession) -> AppResult<QuizProgress> {
    let incorrect = db::sessions::incorrect_question_ids(conn, session.id)?;
    Ok(QuizProgress {
        session_id: session.id,
        total: session.total_questions,
        answered: session.answered_questions,
        correct: session.correct_questions,
        remaining: (session.total_questions - session.answered_questions).max(0),
        incorrect_question_ids: incorrect,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Direction;
    use crate::quiz::session::{QuizStart, StartParams, start_session};
    use crate::testing::{TestEnv, seed_folder, seed_group, seed_profile, seed_words};

    fn start_exam(env: &TestEnv, words: &[(&str, &str)]) -> (i64, QuizStart) {
        let profile = seed_profile(&env.conn, "p", 90);
        let folder = seed_folder(&env.conn, profile, "f");
        let group = seed_group(&env.conn, profile, folder, "g");
        seed_words(&env.conn, group, words);
        let start = start_session(
            &env.conn,
            &StartParams {
                profile_id: profile,
                group_ids: vec![group],
                direction: Direction::TermToMeaning,
                mode: QuizMode::Exam,
                random: false,
                limit: None,
                min_star: None,
                star_values: None,
                number_start: None,
                number_end: None,
            },
        )
        .unwrap();
        (profile, start)
    }

    fn word_star(env: &TestEnv, word_id: i64) -> i64 {
        db::words::get_word(&env.conn, word_id).unwrap().unwrap().star
    }

    #[test]
    fn test_first_exam_miss_counts_and_penalizes() {
        // Scenario: five fresh words, miss the first question twice
        let env = TestEnv::new().unwrap();
        let (profile, start) = start_exam(
            &env,
            &[("w1", "m1"), ("w2", "m2"), ("w3", "m3"), ("w4", "m4"), ("w5", "m5")],
        );
        let q1 = &start.questions[0];

        let progress =
            submit_answer(&env.conn, profile, start.session_id, q1.id, Some("nope"), false)
                .unwrap();
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.correct, 0);
        assert_eq!(progress.remaining, 4);
        assert_eq!(progress.incorrect_question_ids, vec![q1.id]);
        assert_eq!(word_star(&env, q1.word_id), 1);

        // Same miss again: counters unchanged, no double star penalty
        let progress =
            submit_answer(&env.conn, profile, start.session_id, q1.id, Some("nope"), false)
                .unwrap();
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.correct, 0);
        assert_eq!(word_star(&env, q1.word_id), 1);
    }

    #[test]
    fn test_idempotent_resubmission() {
        let env = TestEnv::new().unwrap();
        let (profile, start) = start_exam(&env, &[("w1", "m1"), ("w2", "m2")]);
        let q = &start.questions[0];

        let first =
            submit_answer(&env.conn, profile, start.session_id, q.id, Some("m1"), true).unwrap();
        let second =
            submit_answer(&env.conn, profile, start.session_id, q.id, Some("m1"), true).unwrap();
        assert_eq!(first.answered, second.answered);
        assert_eq!(first.correct, second.correct);
    }

    #[test]
    fn test_correction_decrements_correct_only() {
        let env = TestEnv::new().unwrap();
        let (profile, start) = start_exam(&env, &[("w1", "m1")]);
        let q = &start.questions[0];

        let after_correct =
            submit_answer(&env.conn, profile, start.session_id, q.id, Some("m1"), true).unwrap();
        assert_eq!((after_correct.answered, after_correct.correct), (1, 1));

        let after_flip =
            submit_answer(&env.conn, profile, start.session_id, q.id, Some("x"), false).unwrap();
        assert_eq!((after_flip.answered, after_flip.correct), (1, 0));
        // correct->incorrect on a resubmission is not a first miss
        assert_eq!(word_star(&env, q.word_id), 0);

        let after_fix =
            submit_answer(&env.conn, profile, start.session_id, q.id, Some("m1"), true).unwrap();
        assert_eq!((after_fix.answered, after_fix.correct), (1, 1));
    }

    #[test]
    fn test_invariant_holds_through_submissions() {
        let env = TestEnv::new().unwrap();
        let (profile, start) = start_exam(&env, &[("w1", "m1"), ("w2", "m2"), ("w3", "m3")]);

        for (idx, q) in start.questions.iter().enumerate() {
            let correct = idx % 2 == 0;
            let progress =
                submit_answer(&env.conn, profile, start.session_id, q.id, None, correct).unwrap();
            assert!(0 <= progress.correct);
            assert!(progress.correct <= progress.answered);
            assert!(progress.answered <= progress.total);
        }
    }

    #[test]
    fn test_star_capped_at_max() {
        let env = TestEnv::new().unwrap();
        let (profile, start) = start_exam(&env, &[("w1", "m1")]);
        let q = &start.questions[0];
        env.conn
            .execute(
                "UPDATE words SET star = ?1 WHERE id = ?2",
                rusqlite::params![crate::config::MAX_STAR, q.word_id],
            )
            .unwrap();

        submit_answer(&env.conn, profile, start.session_id, q.id, None, false).unwrap();
        assert_eq!(word_star(&env, q.word_id), crate::config::MAX_STAR);
    }

    #[test]
    fn test_study_mode_never_penalizes() {
        let env = TestEnv::new().unwrap();
        let profile = seed_profile(&env.conn, "p", 90);
        let folder = seed_folder(&env.conn, profile, "f");
        let group = seed_group(&env.conn, profile, folder, "g");
        seed_words(&env.conn, group, &[("w1", "m1")]);
        let start = start_session(
            &env.conn,
            &StartParams {
                profile_id: profile,
                group_ids: vec![group],
                direction: Direction::TermToMeaning,
                mode: QuizMode::Study,
                random: false,
                limit: None,
                min_star: None,
                star_values: None,
                number_start: None,
                number_end: None,
            },
        )
        .unwrap();
        let q = &start.questions[0];

        submit_answer(&env.conn, profile, start.session_id, q.id, None, false).unwrap();
        assert_eq!(word_star(&env, q.word_id), 0);
    }

    #[test]
    fn test_question_must_belong_to_session() {
        let env = TestEnv::new().unwrap();
        let (profile, first) = start_exam(&env, &[("w1", "m1")]);
        let (profile2, second) = start_exam(&env, &[("x1", "y1")]);

        // Question from another session
        let err = submit_answer(
            &env.conn,
            profile2,
            second.session_id,
            first.questions[0].id,
            None,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        // Session owned by another profile
        let err = submit_answer(
            &env.conn,
            profile,
            second.session_id,
            second.questions[0].id,
            None,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_progress_snapshot() {
        let env = TestEnv::new().unwrap();
        let (profile, start) = start_exam(&env, &[("w1", "m1"), ("w2", "m2")]);
        submit_answer(
            &env.conn,
            profile,
            start.session_id,
            start.questions[0].id,
            None,
            false,
        )
        .unwrap();

        let snapshot = progress(&env.conn, profile, start.session_id).unwrap();
        assert_eq!(snapshot.answered, 1);
        assert_eq!(snapshot.remaining, 1);
        assert_eq!(snapshot.incorrect_question_ids, vec![start.questions[0].id]);
    }
}
