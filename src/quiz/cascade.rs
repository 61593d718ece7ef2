//! Word deletion with session counter reconciliation.

use std::collections::HashMap;

use rusqlite::Connection;

use crate::db;
use crate::error::{AppError, AppResult};

#[derive(Debug, Default, Clone, Copy)]
struct Contribution {
    total: i64,
    answered: i64,
    correct: i64,
}

/// Delete a word and every question referencing it, subtracting the
/// removed questions from each affected session's counters. Past sessions
/// shrink rather than keep pointing at a missing word.
pub fn delete_word(conn: &Connection, profile_id: i64, word_id: i64) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;

    let word = db::words::get_word(&tx, word_id)?
        .ok_or_else(|| AppError::not_found("word not found"))?;
    let group = db::groups::get_group(&tx, word.group_id)?
        .filter(|g| g.profile_id == profile_id)
        .ok_or_else(|| AppError::not_found("word not found"))?;

    let mut contributions: HashMap<i64, Contribution> = HashMap::new();
    for (session_id, is_correct) in db::sessions::questions_for_word(&tx, word_id)? {
        let entry = contributions.entry(session_id).or_default();
        entry.total += 1;
        if is_correct.is_some() {
            entry.answered += 1;
        }
        if is_correct == Some(true) {
            entry.correct += 1;
        }
    }

    for (session_id, contribution) in &contributions {
        if let Some(session) = db::sessions::get_session(&tx, *session_id)? {
            if session.total_questions < contribution.total
                || session.answered_questions < contribution.answered
                || session.correct_questions < contribution.correct
            {
                tracing::warn!(
                    session_id,
                    word_id,
                    "session counters below word contribution, flooring at zero"
                );
            }
        }
        db::sessions::subtract_session_counts(
            &tx,
            *session_id,
            contribution.total,
            contribution.answered,
            contribution.correct,
        )?;
    }

    db::sessions::delete_questions_for_word(&tx, word_id)?;
    db::words::delete_word_row(&tx, word_id)?;
    tx.commit()?;

    tracing::debug!(
        word_id,
        group_id = group.id,
        sessions = contributions.len(),
        "word deleted with question cascade"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, QuizMode};
    use crate::quiz::answer::submit_answer;
    use crate::quiz::session::{QuizStart, StartParams, start_session};
    use crate::testing::{TestEnv, seed_folder, seed_group, seed_profile, seed_words};

    fn exam(env: &TestEnv, profile: i64, group: i64) -> QuizStart {
        start_session(
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
        .unwrap()
    }

    #[test]
    fn test_delete_subtracts_contribution_per_session() {
        let env = TestEnv::new().unwrap();
        let profile = seed_profile(&env.conn, "p", 90);
        let folder = seed_folder(&env.conn, profile, "f");
        let group = seed_group(&env.conn, profile, folder, "g");
        let word_ids = seed_words(&env.conn, group, &[("a", "1"), ("b", "2"), ("c", "3")]);

        // Answer the doomed word correctly in one session, leave it
        // unanswered in a second.
        let first = exam(&env, profile, group);
        for q in &first.questions {
            let correct = q.word_id == word_ids[0];
            submit_answer(&env.conn, profile, first.session_id, q.id, None, correct).unwrap();
        }
        let second = exam(&env, profile, group);

        delete_word(&env.conn, profile, word_ids[0]).unwrap();

        let s1 = db::sessions::get_session(&env.conn, first.session_id).unwrap().unwrap();
        assert_eq!(s1.total_questions, 2);
        assert_eq!(s1.answered_questions, 2);
        assert_eq!(s1.correct_questions, 0);

        let s2 = db::sessions::get_session(&env.conn, second.session_id).unwrap().unwrap();
        assert_eq!(s2.total_questions, 2);
        assert_eq!(s2.answered_questions, 0);
        assert_eq!(s2.correct_questions, 0);

        assert!(db::words::get_word(&env.conn, word_ids[0]).unwrap().is_none());
        let remaining = db::sessions::list_questions(&env.conn, first.session_id).unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|q| q.word_id != word_ids[0]));
    }

    #[test]
    fn test_counters_floor_at_zero() {
        let env = TestEnv::new().unwrap();
        let profile = seed_profile(&env.conn, "p", 90);
        let folder = seed_folder(&env.conn, profile, "f");
        let group = seed_group(&env.conn, profile, folder, "g");
        let word_ids = seed_words(&env.conn, group, &[("a", "1")]);

        let start = exam(&env, profile, group);
        submit_answer(&env.conn, profile, start.session_id, start.questions[0].id, None, true)
            .unwrap();
        // Corrupt the stored counters below the word's contribution
        env.conn
            .execute(
                "UPDATE quiz_sessions SET total_questions = 0, answered_questions = 0, correct_questions = 0 WHERE id = ?1",
                [start.session_id],
            )
            .unwrap();

        delete_word(&env.conn, profile, word_ids[0]).unwrap();

        let session = db::sessions::get_session(&env.conn, start.session_id).unwrap().unwrap();
        assert_eq!(session.total_questions, 0);
        assert_eq!(session.answered_questions, 0);
        assert_eq!(session.correct_questions, 0);
    }

    #[test]
    fn test_delete_requires_owning_profile() {
        let env = TestEnv::new().unwrap();
        let profile = seed_profile(&env.conn, "p", 90);
        let folder = seed_folder(&env.conn, profile, "f");
        let group = seed_group(&env.conn, profile, folder, "g");
        let word_ids = seed_words(&env.conn, group, &[("a", "1")]);
        let other = seed_profile(&env.conn, "other", 90);

        let err = delete_word(&env.conn, other, word_ids[0]).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(db::words::get_word(&env.conn, word_ids[0]).unwrap().is_some());
    }

    #[test]
    fn test_delete_without_sessions_is_plain() {
        let env = TestEnv::new().unwrap();
        let profile = seed_profile(&env.conn, "p", 90);
        let folder = seed_folder(&env.conn, profile, "f");
        let group = seed_group(&env.conn, profile, folder, "g");
        let word_ids = seed_words(&env.conn, group, &[("a", "1")]);

        delete_word(&env.conn, profile, word_ids[0]).unwrap();
        assert!(db::words::get_word(&env.conn, word_ids[0]).unwrap().is_none());
    }
}
