//! Application configuration constants.

use serde::Deserialize;
use std::path::PathBuf;

// ==================== Database Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Deserialize)]
struct AppConfig {
  database: Option<DatabaseConfig>,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
  path: Option<String>,
}

/// Load database path with priority: config.toml > .env > default
pub fn load_database_path() -> PathBuf {
  // Load .env file if present
  let _ = dotenvy::dotenv();

  // Priority 1: config.toml
  if let Ok(contents) = std::fs::read_to_string("config.toml") {
    if let Ok(config) = toml::from_str::<AppConfig>(&contents) {
      if let Some(db) = config.database {
        if let Some(path) = db.path {
          tracing::info!("Using database from config.toml: {}", path);
          return PathBuf::from(path);
        }
      }
    }
  }

  // Priority 2: .env DATABASE_PATH
  if let Ok(path) = std::env::var("DATABASE_PATH") {
    tracing::info!("Using database from DATABASE_PATH env: {}", path);
    return PathBuf::from(path);
  }

  // Default
  let default = PathBuf::from("data/wordbook.db");
  tracing::info!("Using default database path: {}", default.display());
  default
}

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

/// Get the full server bind address
pub fn server_bind_addr() -> String {
  format!("{}:{}", SERVER_ADDR, SERVER_PORT)
}

// ==================== Quiz Configuration ====================

/// Upper bound for a word's star rating. Exam misses push the star
/// toward this cap; it is never exceeded.
pub const MAX_STAR: i64 = 10;

/// Language tag assigned to words created without an explicit one
pub const DEFAULT_LANGUAGE: &str = "default";

/// Pass threshold (percent) assigned to newly created profiles
pub const DEFAULT_PASS_THRESHOLD: i64 = 90;

// ==================== Query Limits ====================

/// Default number of history entries returned
pub const HISTORY_LIMIT_DEFAULT: i64 = 20;

/// Hard cap on history entries per request
pub const HISTORY_LIMIT_MAX: i64 = 100;
