use rusqlite::{Connection, Result};

pub fn run_migrations(conn: &Connection) -> Result<()> {
  // Create tables with COMPLETE schema for new databases
  // Migrations below handle upgrades for existing databases
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS profiles (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      name TEXT NOT NULL,
      exam_pass_threshold INTEGER NOT NULL DEFAULT 90,
      created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS folders (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      profile_id INTEGER NOT NULL,
      name TEXT NOT NULL,
      created_at TEXT NOT NULL,
      FOREIGN KEY (profile_id) REFERENCES profiles(id)
    );

    CREATE TABLE IF NOT EXISTS groups (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      profile_id INTEGER NOT NULL,
      folder_id INTEGER NOT NULL,
      name TEXT NOT NULL,
      created_at TEXT NOT NULL,
      FOREIGN KEY (profile_id) REFERENCES profiles(id),
      FOREIGN KEY (folder_id) REFERENCES folders(id)
    );

    CREATE TABLE IF NOT EXISTS words (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      group_id INTEGER NOT NULL,
      language TEXT NOT NULL DEFAULT 'default',
      term TEXT NOT NULL,
      meaning TEXT NOT NULL,
      reading TEXT,
      pos TEXT,
      example TEXT,
      memo TEXT,
      star INTEGER NOT NULL DEFAULT 0,
      created_at TEXT NOT NULL,
      FOREIGN KEY (group_id) REFERENCES groups(id),
      UNIQUE (group_id, language COLLATE NOCASE, term COLLATE NOCASE)
    );

    CREATE TABLE IF NOT EXISTS quiz_sessions (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      profile_id INTEGER NOT NULL,
      group_id INTEGER NOT NULL,
      direction TEXT NOT NULL,
      mode TEXT NOT NULL,
      randomize INTEGER NOT NULL DEFAULT 1,
      limit_count INTEGER,
      min_star INTEGER,
      star_values TEXT,
      total_questions INTEGER NOT NULL,
      answered_questions INTEGER NOT NULL DEFAULT 0,
      correct_questions INTEGER NOT NULL DEFAULT 0,
      is_retry INTEGER NOT NULL DEFAULT 0,
      created_at TEXT NOT NULL,
      FOREIGN KEY (profile_id) REFERENCES profiles(id),
      FOREIGN KEY (group_id) REFERENCES groups(id)
    );

    CREATE TABLE IF NOT EXISTS quiz_questions (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      session_id INTEGER NOT NULL,
      word_id INTEGER NOT NULL,
      position INTEGER NOT NULL,
      prompt TEXT NOT NULL,
      answer TEXT NOT NULL,
      user_answer TEXT,
      is_correct INTEGER,
      created_at TEXT NOT NULL,
      FOREIGN KEY (session_id) REFERENCES quiz_sessions(id),
      FOREIGN KEY (word_id) REFERENCES words(id)
    );

    CREATE TABLE IF NOT EXISTS study_plans (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      profile_id INTEGER NOT NULL,
      study_date TEXT NOT NULL,
      folder_id INTEGER NOT NULL,
      group_id INTEGER NOT NULL,
      created_at TEXT NOT NULL,
      FOREIGN KEY (profile_id) REFERENCES profiles(id),
      FOREIGN KEY (folder_id) REFERENCES folders(id),
      FOREIGN KEY (group_id) REFERENCES groups(id),
      UNIQUE (profile_id, study_date, group_id)
    );

    -- Indexes
    CREATE INDEX IF NOT EXISTS idx_groups_folder ON groups(folder_id);
    CREATE INDEX IF NOT EXISTS idx_words_group ON words(group_id);
    CREATE INDEX IF NOT EXISTS idx_words_star ON words(star);
    CREATE INDEX IF NOT EXISTS idx_sessions_profile_created ON quiz_sessions(profile_id, created_at);
    CREATE INDEX IF NOT EXISTS idx_questions_session ON quiz_questions(session_id);
    CREATE INDEX IF NOT EXISTS idx_questions_word ON quiz_questions(word_id);
    CREATE INDEX IF NOT EXISTS idx_plans_profile_date ON study_plans(profile_id, study_date);
    "#,
  )?;

  // ============================================================
  // MIGRATIONS FOR EXISTING DATABASES
  // These are no-ops for new databases (columns already exist)
  // ============================================================

  // Migration: Per-profile pass threshold (was a global constant)
  add_column_if_missing(
    conn,
    "profiles",
    "exam_pass_threshold",
    "INTEGER NOT NULL DEFAULT 90",
  )?;

  // Migration: Retry sessions
  add_column_if_missing(conn, "quiz_sessions", "is_retry", "INTEGER NOT NULL DEFAULT 0")?;

  // Migration: Explicit star-value filter alongside min_star
  add_column_if_missing(conn, "quiz_sessions", "star_values", "TEXT")?;

  Ok(())
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
  conn
    .prepare(&format!("SELECT {} FROM {} LIMIT 1", column, table))
    .is_ok()
}

/// Add a column if it doesn't already exist
fn add_column_if_missing(conn: &Connection, table: &str, column: &str, column_def: &str) -> Result<()> {
  if !column_exists(conn, table, column) {
    conn.execute(
      &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def),
      [],
    )?;
  }
  Ok(())
}
