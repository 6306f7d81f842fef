use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;

use super::record::{stored_history, PromptRecord, StoredPromptRecord};
use super::{schema, PromptRepository};
use crate::errors::Result;

const SELECT_COLUMNS: &str = "id, title, text, tags, created_at, is_favorite, use_count, \
                              last_copied_at, is_generating_details, history, custom_title";

/// Prompt repository backed by a SQLite database
pub struct SqliteRepository {
    conn:          Connection,
    history_limit: usize,
}

impl SqliteRepository {
    /// Open (or create) the database file at `path`
    pub fn open(path: &Path, history_limit: usize) -> Result<Self> {
        // Create directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    anyhow::anyhow!("Failed to create database directory: {}", e)
                })?;
            }
        }

        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        Self::init(conn, history_limit)
    }

    /// Private in-memory database for tests
    pub fn open_in_memory(history_limit: usize) -> Result<Self> {
        Self::init(Connection::open_in_memory()?, history_limit)
    }

    fn init(conn: Connection, history_limit: usize) -> Result<Self> {
        conn.execute_batch(schema::SCHEMA)?;

        // Nothing can still be generating for a database that was just opened
        let stale = conn.execute(
            "UPDATE prompts SET is_generating_details = 0 WHERE is_generating_details != 0",
            [],
        )?;
        if stale > 0 {
            tracing::debug!(stale, "cleared stale generating flags");
        }

        Ok(Self {
            conn,
            history_limit,
        })
    }

    fn read_row(row: &Row<'_>, history_limit: usize) -> rusqlite::Result<PromptRecord> {
        let tags: String = row.get("tags")?;
        let history: String = row.get("history")?;

        let stored = StoredPromptRecord {
            id:                    Some(row.get("id")?),
            title:                 Some(row.get("title")?),
            text:                  Some(row.get("text")?),
            tags:                  serde_json::from_str::<Value>(&tags).ok(),
            created_at:            Some(row.get("created_at")?),
            is_favorite:           Some(row.get("is_favorite")?),
            use_count:             Some(row.get("use_count")?),
            last_copied_at:        row.get("last_copied_at")?,
            is_generating_details: Some(row.get("is_generating_details")?),
            history:               serde_json::from_str::<Value>(&history)
                .ok()
                .as_ref()
                .and_then(stored_history),
            custom_title:          Some(row.get("custom_title")?),
        };

        Ok(stored.normalize(history_limit))
    }
}

impl PromptRepository for SqliteRepository {
    fn list(&self) -> Result<Vec<PromptRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM prompts ORDER BY created_at DESC, rowid DESC",
            SELECT_COLUMNS
        ))?;
        let limit = self.history_limit;
        let prompts = stmt
            .query_map([], |row| Self::read_row(row, limit))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(prompts)
    }

    fn get(&self, id: &str) -> Result<Option<PromptRecord>> {
        let limit = self.history_limit;
        let prompt = self
            .conn
            .query_row(
                &format!("SELECT {} FROM prompts WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                |row| Self::read_row(row, limit),
            )
            .optional()?;

        Ok(prompt)
    }

    fn upsert(&mut self, record: PromptRecord) -> Result<()> {
        let tags_json = serde_json::to_string(&record.tags)?;
        let history_json = serde_json::to_string(&record.history)?;

        self.conn.execute(
            "INSERT INTO prompts (id, title, text, tags, created_at, is_favorite, use_count,
                                  last_copied_at, is_generating_details, history, custom_title)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                text = excluded.text,
                tags = excluded.tags,
                is_favorite = excluded.is_favorite,
                use_count = excluded.use_count,
                last_copied_at = excluded.last_copied_at,
                is_generating_details = excluded.is_generating_details,
                history = excluded.history,
                custom_title = excluded.custom_title",
            params![
                record.id,
                record.title,
                record.text,
                tags_json,
                record.created_at,
                record.is_favorite,
                record.use_count,
                record.last_copied_at,
                record.is_generating_details,
                history_json,
                record.custom_title,
            ],
        )?;

        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM prompts WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM prompts", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
