use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which side of a word is shown as the prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
  #[default]
  TermToMeaning,
  MeaningToTerm,
}

impl Direction {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "term_to_meaning" => Some(Self::TermToMeaning),
      "meaning_to_term" => Some(Self::MeaningToTerm),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::TermToMeaning => "term_to_meaning",
      Self::MeaningToTerm => "meaning_to_term",
    }
  }
}

/// Exam-mode misses feed star penalties and study-plan completion;
/// study mode does neither.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
  Study,
  #[default]
  Exam,
}

impl QuizMode {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "study" => Some(Self::Study),
      "exam" => Some(Self::Exam),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Study => "study",
      Self::Exam => "exam",
    }
  }
}

/// One quiz attempt. Counters obey
/// `0 <= correct_questions <= answered_questions <= total_questions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSession {
  pub id: i64,
  pub profile_id: i64,
  /// Primary group, kept for backward display of single-group sessions
  pub group_id: i64,
  pub direction: Direction,
  pub mode: QuizMode,
  pub randomize: bool,
  pub limit_count: Option<i64>,
  pub min_star: Option<i64>,
  /// Sorted, de-duplicated comma list, e.g. "0,2,5"
  pub star_values: Option<String>,
  pub total_questions: i64,
  pub answered_questions: i64,
  pub correct_questions: i64,
  pub is_retry: bool,
  pub created_at: DateTime<Utc>,
}

/// One question within a session. `prompt`/`answer` are snapshots taken at
/// session creation; later word edits do not change them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
  pub id: i64,
  pub session_id: i64,
  pub word_id: i64,
  /// 1-based, contiguous within the session
  pub position: i64,
  pub prompt: String,
  pub answer: String,
  pub user_answer: Option<String>,
  /// None = unanswered, Some(false) = explicitly incorrect
  pub is_correct: Option<bool>,
  pub created_at: DateTime<Utc>,
}

/// Serialize a star filter as a sorted, de-duplicated comma list.
/// Empty input serializes to None.
pub fn serialize_star_values(values: &[i64]) -> Option<String> {
  if values.is_empty() {
    return None;
  }
  let mut unique: Vec<i64> = values.to_vec();
  unique.sort_unstable();
  unique.dedup();
  Some(
    unique
      .iter()
      .map(|v| v.to_string())
      .collect::<Vec<_>>()
      .join(","),
  )
}

/// Parse a stored star filter back into values. Malformed entries are
/// skipped rather than failing the whole session row.
pub fn parse_star_values(raw: Option<&str>) -> Vec<i64> {
  match raw {
    Some(raw) => raw
      .split(',')
      .filter_map(|part| part.trim().parse::<i64>().ok())
      .collect(),
    None => Vec::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_direction_roundtrip() {
    for dir in [Direction::TermToMeaning, Direction::MeaningToTerm] {
      assert_eq!(Direction::from_str(dir.as_str()), Some(dir));
    }
    assert_eq!(Direction::from_str("sideways"), None);
  }

  #[test]
  fn test_mode_roundtrip() {
    for mode in [QuizMode::Study, QuizMode::Exam] {
      assert_eq!(QuizMode::from_str(mode.as_str()), Some(mode));
    }
    assert_eq!(QuizMode::from_str(""), None);
  }

  #[test]
  fn test_serialize_star_values_sorts_and_dedups() {
    assert_eq!(serialize_star_values(&[3, 1, 3, 0]), Some("0,1,3".to_string()));
    assert_eq!(serialize_star_values(&[]), None);
  }

  #[test]
  fn test_parse_star_values() {
    assert_eq!(parse_star_values(Some("0,1,3")), vec![0, 1, 3]);
    assert_eq!(parse_star_values(Some("2, oops,5")), vec![2, 5]);
    assert_eq!(parse_star_values(None), Vec::<i64>::new());
  }
}
