//! Request-level error taxonomy.
//!
//! Validation and not-found conditions are surfaced to the caller with a
//! descriptive reason; nothing in this service retries internally. Counter
//! underflows from cascading deletes are clamped where they occur and only
//! logged, so they never appear here.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
  /// Bad input shape: empty group list, cross-folder groups, empty pool,
  /// invalid star/number range, empty retry subset.
  #[error("{0}")]
  Validation(String),

  /// Unknown or unauthorized session, question, group, or word. Ownership
  /// checks fall in this category; every lookup is pre-filtered by profile.
  #[error("{0}")]
  NotFound(String),

  #[error("database error: {0}")]
  Db(#[from] rusqlite::Error),

  #[error("database unavailable")]
  Lock,
}

impl AppError {
  pub fn validation(msg: impl Into<String>) -> Self {
    Self::Validation(msg.into())
  }

  pub fn not_found(msg: impl Into<String>) -> Self {
    Self::NotFound(msg.into())
  }
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = match &self {
      Self::Validation(_) => StatusCode::BAD_REQUEST,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Db(e) => {
        tracing::error!("database error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
      }
      Self::Lock => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(json!({ "detail": self.to_string() }))).into_response()
  }
}
