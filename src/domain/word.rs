use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::MAX_STAR;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
  pub id: i64,
  pub name: String,
  /// Exam pass threshold as a percentage (0-100)
  pub exam_pass_threshold: i64,
  pub created_at: DateTime<Utc>,
}

impl Profile {
  /// Pass threshold normalized to `[0, 1]`, clamped into `[0, 100]` first.
  pub fn pass_threshold_fraction(&self) -> f64 {
    self.exam_pass_threshold.clamp(0, 100) as f64 / 100.0
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
  pub id: i64,
  pub profile_id: i64,
  pub name: String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
  pub id: i64,
  pub profile_id: i64,
  pub folder_id: i64,
  pub name: String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
  pub id: i64,
  pub group_id: i64,
  pub language: String,
  pub term: String,
  pub meaning: String,
  pub reading: Option<String>,
  pub pos: Option<String>,
  pub example: Option<String>,
  pub memo: Option<String>,
  /// Proficiency/penalty counter in `[0, MAX_STAR]`. Only the quiz engine
  /// and word CRUD touch this.
  pub star: i64,
  pub created_at: DateTime<Utc>,
}

/// Insert payload for a word. `(group, language, term)` must be unique
/// within the group, compared case-insensitively.
#[derive(Debug, Clone, Deserialize)]
pub struct NewWord {
  pub group_id: i64,
  pub language: Option<String>,
  pub term: String,
  pub meaning: String,
  pub reading: Option<String>,
  pub pos: Option<String>,
  pub example: Option<String>,
  pub memo: Option<String>,
  pub star: Option<i64>,
}

impl NewWord {
  pub fn validate(&self) -> AppResult<()> {
    if self.term.trim().is_empty() {
      return Err(AppError::validation("term must not be empty"));
    }
    if self.meaning.trim().is_empty() {
      return Err(AppError::validation("meaning must not be empty"));
    }
    validate_star(self.star)
  }
}

/// Explicit optional-field patch for a word. Absent fields are left
/// unchanged; there is no way to null out an existing optional field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WordPatch {
  pub group_id: Option<i64>,
  pub language: Option<String>,
  pub term: Option<String>,
  pub meaning: Option<String>,
  pub reading: Option<String>,
  pub pos: Option<String>,
  pub example: Option<String>,
  pub memo: Option<String>,
  pub star: Option<i64>,
}

impl WordPatch {
  pub fn validate(&self) -> AppResult<()> {
    if let Some(term) = &self.term {
      if term.trim().is_empty() {
        return Err(AppError::validation("term must not be empty"));
      }
    }
    if let Some(meaning) = &self.meaning {
      if meaning.trim().is_empty() {
        return Err(AppError::validation("meaning must not be empty"));
      }
    }
    validate_star(self.star)
  }

  pub fn is_empty(&self) -> bool {
    self.group_id.is_none()
      && self.language.is_none()
      && self.term.is_none()
      && self.meaning.is_none()
      && self.reading.is_none()
      && self.pos.is_none()
      && self.example.is_none()
      && self.memo.is_none()
      && self.star.is_none()
  }
}

fn validate_star(star: Option<i64>) -> AppResult<()> {
  if let Some(star) = star {
    if !(0..=MAX_STAR).contains(&star) {
      return Err(AppError::validation(format!(
        "star must be between 0 and {}",
        MAX_STAR
      )));
    }
  }
  Ok(())
}
