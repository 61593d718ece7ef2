//! Session history and exam outcome aggregation.
//!
//! History is a display feed of recent sessions. Outcomes feed the
//! study-plan view: an exam session is attributed to every planned group
//! its questions actually touched, falling back to the session's primary
//! group when no touched group is planned.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

use crate::config::{DEFAULT_PASS_THRESHOLD, HISTORY_LIMIT_DEFAULT, HISTORY_LIMIT_MAX};
use crate::db;
use crate::domain::{Direction, QuizMode, QuizSession, quiz::parse_star_values};
use crate::error::AppResult;

/// One session in the history feed, newest first.
#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub session_id: i64,
    pub created_at: DateTime<Utc>,
    pub mode: QuizMode,
    pub direction: Direction,
    pub random: bool,
    pub limit: Option<i64>,
    pub min_star: Option<i64>,
    pub star_values: Vec<i64>,
    pub is_retry: bool,
    pub folder_id: Option<i64>,
    pub folder_name: Option<String>,
    pub group_ids: Vec<i64>,
    pub group_names: Vec<String>,
    pub total: i64,
    pub answered: i64,
    pub correct: i64,
    pub incorrect: i64,
    pub score: f64,
    pub passed: bool,
}

/// An exam session's result as attributed to a planned group and date.
#[derive(Debug, Clone, Serialize)]
pub struct ExamOutcome {
    pub session_id: i64,
    pub created_at: DateTime<Utc>,
    pub total: i64,
    pub correct: i64,
    pub score: f64,
    pub passed: bool,
}

/// Recent sessions of a profile with their touched folder and group names.
/// `limit` is clamped into `[1, HISTORY_LIMIT_MAX]`; `None` means the
/// default page size.
pub fn list_history(
    conn: &Connection,
    profile_id: i64,
    limit: Option<i64>,
) -> AppResult<Vec<HistoryItem>> {
    let limit = limit.unwrap_or(HISTORY_LIMIT_DEFAULT).clamp(1, HISTORY_LIMIT_MAX);
    let sessions = db::sessions::list_recent_sessions(conn, profile_id, limit)?;
    if sessions.is_empty() {
        return Ok(vec![]);
    }

    let threshold = pass_threshold_fraction(conn, profile_id)?;
    let session_ids: Vec<i64> = sessions.iter().map(|s| s.id).collect();

    // First-touched folder and de-duplicated groups per session, in
    // question order.
    let mut folder_by_session: HashMap<i64, (i64, String)> = HashMap::new();
    let mut groups_by_session: HashMap<i64, Vec<(i64, String)>> = HashMap::new();
    for (session_id, group_id, group_name, folder_id, folder_name) in
        db::sessions::touched_groups(conn, &session_ids)?
    {
        folder_by_session
            .entry(session_id)
            .or_insert((folder_id, folder_name));
        let groups = groups_by_session.entry(session_id).or_default();
        if !groups.iter().any(|(id, _)| *id == group_id) {
            groups.push((group_id, group_name));
        }
    }

    let history = sessions
        .into_iter()
        .map(|session| {
            let (score, passed) = score_session(&session, threshold);
            let folder = folder_by_session.remove(&session.id);
            let (group_ids, group_names) = groups_by_session
                .remove(&session.id)
                .unwrap_or_default()
                .into_iter()
                .unzip();
            HistoryItem {
                session_id: session.id,
                created_at: session.created_at,
                mode: session.mode,
                direction: session.direction,
                random: session.randomize,
                limit: session.limit_count,
                min_star: session.min_star,
                star_values: parse_star_values(session.star_values.as_deref()),
                is_retry: session.is_retry,
                folder_id: folder.as_ref().map(|(id, _)| *id),
                folder_name: folder.map(|(_, name)| name),
                group_ids,
                group_names,
                total: session.total_questions,
                answered: session.answered_questions,
                correct: session.correct_questions,
                incorrect: (session.total_questions - session.correct_questions).max(0),
                score,
                passed,
            }
        })
        .collect();
    Ok(history)
}

/// Exam sessions between `start` and `end` (both inclusive, by calendar
/// day of creation), grouped by `(group_id, day)` for the planned groups
/// in `tracked`. A session with no touched planned group is attributed to
/// its primary group when that group is planned, and dropped otherwise.
pub fn exam_outcomes(
    conn: &Connection,
    profile_id: i64,
    tracked: &HashSet<i64>,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<HashMap<(i64, NaiveDate), Vec<ExamOutcome>>> {
    let mut outcomes: HashMap<(i64, NaiveDate), Vec<ExamOutcome>> = HashMap::new();
    if tracked.is_empty() {
        return Ok(outcomes);
    }

    let start_str = start.and_time(NaiveTime::MIN).and_utc().to_rfc3339();
    let end_excl = end.succ_opt().unwrap_or(end);
    let end_str = end_excl.and_time(NaiveTime::MIN).and_utc().to_rfc3339();
    let sessions =
        db::sessions::list_exam_sessions_between(conn, profile_id, &start_str, &end_str)?;
    if sessions.is_empty() {
        return Ok(outcomes);
    }

    let threshold = pass_threshold_fraction(conn, profile_id)?;
    let session_ids: Vec<i64> = sessions.iter().map(|s| s.id).collect();

    let mut touched_by_session: HashMap<i64, HashSet<i64>> = HashMap::new();
    for (session_id, group_id) in db::sessions::session_group_ids(conn, &session_ids)? {
        if tracked.contains(&group_id) {
            touched_by_session.entry(session_id).or_default().insert(group_id);
        }
    }

    for session in sessions {
        let day = session.created_at.date_naive();
        if day < start || day > end {
            continue;
        }
        let targets = match touched_by_session.get(&session.id) {
            Some(groups) if !groups.is_empty() => groups.clone(),
            _ if tracked.contains(&session.group_id) => HashSet::from([session.group_id]),
            _ => continue,
        };

        let (score, passed) = score_session(&session, threshold);
        let entry = ExamOutcome {
            session_id: session.id,
            created_at: session.created_at,
            total: session.total_questions,
            correct: session.correct_questions,
            score,
            passed,
        };
        for group_id in targets {
            outcomes.entry((group_id, day)).or_default().push(entry.clone());
        }
    }
    Ok(outcomes)
}

fn pass_threshold_fraction(conn: &Connection, profile_id: i64) -> AppResult<f64> {
    let threshold = db::profiles::get_profile(conn, profile_id)?
        .map(|p| p.pass_threshold_fraction())
        .unwrap_or(DEFAULT_PASS_THRESHOLD as f64 / 100.0);
    Ok(threshold)
}

/// Percentage score rounded to one decimal, and pass verdict on the
/// unrounded ratio. A session with no questions never passes.
fn score_session(session: &QuizSession, threshold: f64) -> (f64, bool) {
    if session.total_questions <= 0 {
        return (0.0, false);
    }
    let ratio = session.correct_questions as f64 / session.total_questions as f64;
    ((ratio * 1000.0).round() / 10.0, ratio >= threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::answer::submit_answer;
    use crate::quiz::retry::{RetryParams, retry_session};
    use crate::quiz::session::{QuizStart, StartParams, start_session};
    use crate::testing::{TestEnv, seed_folder, seed_group, seed_profile, seed_words};

    fn params(profile_id: i64, group_ids: Vec<i64>, mode: QuizMode) -> StartParams {
        StartParams {
            profile_id,
            group_ids,
            direction: Direction::TermToMeaning,
            mode,
            random: false,
            limit: None,
            min_star: None,
            star_values: None,
            number_start: None,
            number_end: None,
        }
    }

    fn answer_all(env: &TestEnv, profile: i64, start: &QuizStart, misses: &[usize]) {
        for (idx, q) in start.questions.iter().enumerate() {
            let correct = !misses.contains(&idx);
            submit_answer(&env.conn, profile, start.session_id, q.id, None, correct).unwrap();
        }
    }

    #[test]
    fn test_pass_verdict_uses_profile_threshold() {
        // Scenario: threshold 90, ten words; 8/10 fails, then 9/10 passes
        let env = TestEnv::new().unwrap();
        let profile = seed_profile(&env.conn, "p", 90);
        let folder = seed_folder(&env.conn, profile, "f");
        let group = seed_group(&env.conn, profile, folder, "g");
        let words: Vec<(String, String)> =
            (1..=10).map(|i| (format!("w{i}"), format!("m{i}"))).collect();
        let word_refs: Vec<(&str, &str)> =
            words.iter().map(|(t, m)| (t.as_str(), m.as_str())).collect();
        seed_words(&env.conn, group, &word_refs);

        let first = start_session(&env.conn, &params(profile, vec![group], QuizMode::Exam)).unwrap();
        answer_all(&env, profile, &first, &[0, 1]);
        let second = start_session(&env.conn, &params(profile, vec![group], QuizMode::Exam)).unwrap();
        answer_all(&env, profile, &second, &[0]);

        let history = list_history(&env.conn, profile, None).unwrap();
        assert_eq!(history.len(), 2);
        // Newest first
        assert_eq!(history[0].session_id, second.session_id);
        assert_eq!(history[0].score, 90.0);
        assert!(history[0].passed);
        assert_eq!(history[1].score, 80.0);
        assert!(!history[1].passed);
        assert_eq!(history[1].incorrect, 2);
        assert_eq!(history[1].group_ids, vec![group]);
        assert_eq!(history[1].group_names, vec!["g"]);
        assert_eq!(history[1].folder_id, Some(folder));
        assert_eq!(history[1].folder_name.as_deref(), Some("f"));
    }

    #[test]
    fn test_history_marks_retries_and_filters() {
        let env = TestEnv::new().unwrap();
        let profile = seed_profile(&env.conn, "p", 90);
        let folder = seed_folder(&env.conn, profile, "f");
        let group = seed_group(&env.conn, profile, folder, "g");
        seed_words(&env.conn, group, &[("a", "1"), ("b", "2")]);

        let mut start_params = params(profile, vec![group], QuizMode::Exam);
        start_params.star_values = Some(vec![0]);
        let start = start_session(&env.conn, &start_params).unwrap();
        answer_all(&env, profile, &start, &[0]);
        retry_session(&env.conn, profile, start.session_id, &RetryParams::default()).unwrap();

        let history = list_history(&env.conn, profile, None).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].is_retry);
        assert!(!history[1].is_retry);
        assert_eq!(history[1].star_values, vec![0]);
        assert_eq!(history[1].mode, QuizMode::Exam);
    }

    #[test]
    fn test_history_limit_clamped() {
        let env = TestEnv::new().unwrap();
        let profile = seed_profile(&env.conn, "p", 90);
        let folder = seed_folder(&env.conn, profile, "f");
        let group = seed_group(&env.conn, profile, folder, "g");
        seed_words(&env.conn, group, &[("a", "1")]);
        for _ in 0..3 {
            start_session(&env.conn, &params(profile, vec![group], QuizMode::Exam)).unwrap();
        }

        assert_eq!(list_history(&env.conn, profile, Some(2)).unwrap().len(), 2);
        // Nonsense limits fall back to the clamp bounds
        assert_eq!(list_history(&env.conn, profile, Some(0)).unwrap().len(), 1);
        assert_eq!(list_history(&env.conn, profile, Some(10_000)).unwrap().len(), 3);
    }

    #[test]
    fn test_empty_session_scores_zero_and_never_passes() {
        let session = QuizSession {
            id: 1,
            profile_id: 1,
            group_id: 1,
            direction: Direction::TermToMeaning,
            mode: QuizMode::Exam,
            randomize: false,
            limit_count: None,
            min_star: None,
            star_values: None,
            total_questions: 0,
            answered_questions: 0,
            correct_questions: 0,
            is_retry: false,
            created_at: Utc::now(),
        };
        assert_eq!(score_session(&session, 0.0), (0.0, false));
    }

    #[test]
    fn test_outcomes_attributed_to_touched_groups() {
        // An exam over group A and group B counts toward plans for both
        let env = TestEnv::new().unwrap();
        let profile = seed_profile(&env.conn, "p", 90);
        let folder = seed_folder(&env.conn, profile, "f");
        let group_a = seed_group(&env.conn, profile, folder, "a");
        let group_b = seed_group(&env.conn, profile, folder, "b");
        seed_words(&env.conn, group_a, &[("a1", "x")]);
        seed_words(&env.conn, group_b, &[("b1", "y")]);

        let start =
            start_session(&env.conn, &params(profile, vec![group_a, group_b], QuizMode::Exam))
                .unwrap();
        answer_all(&env, profile, &start, &[]);

        let today = Utc::now().date_naive();
        let tracked = HashSet::from([group_a, group_b]);
        let outcomes = exam_outcomes(&env.conn, profile, &tracked, today, today).unwrap();

        for group in [group_a, group_b] {
            let entries = &outcomes[&(group, today)];
            assert_eq!(entries.len(), 1);
            assert!(entries[0].passed);
            assert_eq!(entries[0].score, 100.0);
        }
    }

    #[test]
    fn test_outcomes_fall_back_to_primary_group() {
        // Every question's word was deleted, so no touched group remains;
        // the session still counts toward its primary group's plan.
        let env = TestEnv::new().unwrap();
        let profile = seed_profile(&env.conn, "p", 90);
        let folder = seed_folder(&env.conn, profile, "f");
        let group = seed_group(&env.conn, profile, folder, "g");
        seed_words(&env.conn, group, &[("a", "1")]);

        let start = start_session(&env.conn, &params(profile, vec![group], QuizMode::Exam)).unwrap();
        answer_all(&env, profile, &start, &[]);
        env.conn
            .execute("DELETE FROM quiz_questions WHERE session_id = ?1", [start.session_id])
            .unwrap();

        let today = Utc::now().date_naive();
        let tracked = HashSet::from([group]);
        let outcomes = exam_outcomes(&env.conn, profile, &tracked, today, today).unwrap();
        assert_eq!(outcomes[&(group, today)].len(), 1);
    }

    #[test]
    fn test_outcomes_ignore_study_mode_and_untracked_groups() {
        let env = TestEnv::new().unwrap();
        let profile = seed_profile(&env.conn, "p", 90);
        let folder = seed_folder(&env.conn, profile, "f");
        let group = seed_group(&env.conn, profile, folder, "g");
        let other = seed_group(&env.conn, profile, folder, "other");
        seed_words(&env.conn, group, &[("a", "1")]);

        let start = start_session(&env.conn, &params(profile, vec![group], QuizMode::Study)).unwrap();
        answer_all(&env, profile, &start, &[]);

        let today = Utc::now().date_naive();
        let outcomes =
            exam_outcomes(&env.conn, profile, &HashSet::from([group, other]), today, today)
                .unwrap();
        assert!(outcomes.is_empty());

        // Exam over a group nobody planned contributes nothing
        let exam = start_session(&env.conn, &params(profile, vec![group], QuizMode::Exam)).unwrap();
        answer_all(&env, profile, &exam, &[]);
        let outcomes =
            exam_outcomes(&env.conn, profile, &HashSet::from([other]), today, today).unwrap();
        assert!(outcomes.is_empty());
    }
}
