use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A planned (date, group) study entry. Completion is never stored: it is
/// derived from whether any exam session on that date for that group met
/// the profile's pass threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyPlan {
  pub id: i64,
  pub profile_id: i64,
  pub study_date: NaiveDate,
  pub folder_id: i64,
  pub group_id: i64,
  pub created_at: DateTime<Utc>,
}
