//! Word CRUD and the filtered reads the quiz pool selector builds on.

use rusqlite::{Connection, Result, params};

use crate::config::{DEFAULT_LANGUAGE, MAX_STAR};
use crate::domain::{NewWord, Word, WordPatch};

const WORD_COLUMNS: &str =
    "id, group_id, language, term, meaning, reading, pos, example, memo, star, created_at";

pub fn insert_word(conn: &Connection, word: &NewWord) -> Result<i64> {
    conn.execute(
        r#"
    INSERT INTO words (group_id, language, term, meaning, reading, pos, example, memo, star, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    "#,
        params![
            word.group_id,
            word.language.as_deref().unwrap_or(DEFAULT_LANGUAGE),
            word.term,
            word.meaning,
            word.reading,
            word.pos,
            word.example,
            word.memo,
            word.star.unwrap_or(0),
            super::now_string(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_word(conn: &Connection, id: i64) -> Result<Option<Word>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM words WHERE id = ?1", WORD_COLUMNS))?;
    let mut rows = stmt.query(params![id])?;
    if let Some(row) = rows.next()? {
        Ok(Some(row_to_word(row)?))
    } else {
        Ok(None)
    }
}

pub fn get_words_by_ids(conn: &Connection, ids: &[i64]) -> Result<Vec<Word>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let id_list = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let query = format!("SELECT {} FROM words WHERE id IN ({})", WORD_COLUMNS, id_list);
    let mut stmt = conn.prepare(&query)?;
    let words = stmt.query_map([], row_to_word)?.collect::<Result<Vec<_>>>()?;
    Ok(words)
}

pub fn list_words(conn: &Connection, group_id: i64) -> Result<Vec<Word>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM words WHERE group_id = ?1 ORDER BY id ASC",
        WORD_COLUMNS
    ))?;
    let words = stmt
        .query_map(params![group_id], row_to_word)?
        .collect::<Result<Vec<_>>>()?;
    Ok(words)
}

/// Words of one group for quiz building, ordered by insertion (id). Both
/// star constraints apply together when given (AND semantics).
pub fn list_words_filtered(
    conn: &Connection,
    group_id: i64,
    min_star: Option<i64>,
    star_values: Option<&[i64]>,
) -> Result<Vec<Word>> {
    let mut clauses = vec!["group_id = ?1".to_string()];
    if let Some(min) = min_star {
        clauses.push(format!("star >= {}", min));
    }
    if let Some(values) = star_values {
        if !values.is_empty() {
            let value_list = values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(",");
            clauses.push(format!("star IN ({})", value_list));
        }
    }
    let query = format!(
        "SELECT {} FROM words WHERE {} ORDER BY id ASC",
        WORD_COLUMNS,
        clauses.join(" AND ")
    );
    let mut stmt = conn.prepare(&query)?;
    let words = stmt
        .query_map(params![group_id], row_to_word)?
        .collect::<Result<Vec<_>>>()?;
    Ok(words)
}

/// Apply a partial update. Fields absent from the patch keep their value.
pub fn update_word(conn: &Connection, id: i64, patch: &WordPatch) -> Result<()> {
    let mut sets: Vec<String> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    let mut push = |sets: &mut Vec<String>, column: &str, value: Box<dyn rusqlite::ToSql>| {
        values.push(value);
        sets.push(format!("{} = ?{}", column, values.len()));
    };

    if let Some(v) = patch.group_id {
        push(&mut sets, "group_id", Box::new(v));
    }
    if let Some(v) = &patch.language {
        push(&mut sets, "language", Box::new(v.clone()));
    }
    if let Some(v) = &patch.term {
        push(&mut sets, "term", Box::new(v.clone()));
    }
    if let Some(v) = &patch.meaning {
        push(&mut sets, "meaning", Box::new(v.clone()));
    }
    if let Some(v) = &patch.reading {
        push(&mut sets, "reading", Box::new(v.clone()));
    }
    if let Some(v) = &patch.pos {
        push(&mut sets, "pos", Box::new(v.clone()));
    }
    if let Some(v) = &patch.example {
        push(&mut sets, "example", Box::new(v.clone()));
    }
    if let Some(v) = &patch.memo {
        push(&mut sets, "memo", Box::new(v.clone()));
    }
    if let Some(v) = patch.star {
        push(&mut sets, "star", Box::new(v));
    }

    if sets.is_empty() {
        return Ok(());
    }

    values.push(Box::new(id));
    let query = format!(
        "UPDATE words SET {} WHERE id = ?{}",
        sets.join(", "),
        values.len()
    );
    let params = values
        .iter()
        .map(|v| v.as_ref() as &dyn rusqlite::ToSql)
        .collect::<Vec<_>>();
    conn.execute(&query, params.as_slice())?;
    Ok(())
}

/// Increment a word's star, never past MAX_STAR.
pub fn bump_star(conn: &Connection, id: i64) -> Result<()> {
    conn.execute(
        "UPDATE words SET star = MIN(star + 1, ?1) WHERE id = ?2",
        params![MAX_STAR, id],
    )?;
    Ok(())
}

/// Raw row delete. Callers go through the quiz cascade, which reconciles
/// session counters and removes referencing questions first.
pub fn delete_word_row(conn: &Connection, id: i64) -> Result<()> {
    conn.execute("DELETE FROM words WHERE id = ?1", params![id])?;
    Ok(())
}

fn row_to_word(row: &rusqlite::Row) -> Result<Word> {
    let created_at: String = row.get(10)?;
    Ok(Word {
        id: row.get(0)?,
        group_id: row.get(1)?,
        language: row.get(2)?,
        term: row.get(3)?,
        meaning: row.get(4)?,
        reading: row.get(5)?,
        pos: row.get(6)?,
        example: row.get(7)?,
        memo: row.get(8)?,
        star: row.get(9)?,
        created_at: super::parse_timestamp(&created_at),
    })
}
