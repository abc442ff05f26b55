//! Prompt history store

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use super::Database;
use crate::model::{ChainStep, PromptConfig, PromptRecord, RecordKind};
use crate::types::{PromptError, Result};

const SELECT_COLUMNS: &str =
    "SELECT id, name, kind, config, final_prompt, chain_steps, created_at FROM prompts";

/// Raw column values of one `prompts` row
type PromptRow = (String, String, String, String, String, Option<String>, String);

pub struct HistoryStore<'a> {
    db: &'a Database,
}

impl<'a> HistoryStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert or replace a record; returns its id
    pub fn save(&self, record: &PromptRecord) -> Result<String> {
        let (config, chain_steps) = Self::encode(record)?;

        self.db.execute(
            r#"
            INSERT INTO prompts (id, name, kind, config, final_prompt, chain_steps, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                kind = excluded.kind,
                config = excluded.config,
                final_prompt = excluded.final_prompt,
                chain_steps = excluded.chain_steps
            "#,
            &[
                &record.id,
                &record.name,
                &record.kind.as_str(),
                &config,
                &record.final_prompt,
                &chain_steps,
                &super::timestamp(record.created_at),
            ],
        )?;
        Ok(record.id.clone())
    }

    /// Newest first, optionally restricted to one kind
    pub fn list(&self, kind: Option<RecordKind>, limit: usize) -> Result<Vec<PromptRecord>> {
        let conn = self.db.connection()?;
        let limit = limit as i64;

        let rows: Vec<PromptRow> = match kind {
            Some(kind) => {
                let mut stmt = conn.prepare(&format!(
                    "{} WHERE kind = ?1 ORDER BY created_at DESC LIMIT ?2",
                    SELECT_COLUMNS
                ))?;
                stmt.query_map(params![kind.as_str(), limit], Self::map_row)?
                    .collect::<rusqlite::Result<_>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "{} ORDER BY created_at DESC LIMIT ?1",
                    SELECT_COLUMNS
                ))?;
                stmt.query_map(params![limit], Self::map_row)?
                    .collect::<rusqlite::Result<_>>()?
            }
        };

        rows.into_iter().map(Self::row_to_record).collect()
    }

    pub fn get(&self, id: &str) -> Result<Option<PromptRecord>> {
        let conn = self.db.connection()?;
        Self::fetch(&conn, id)
    }

    /// Returns whether a record was removed
    pub fn delete(&self, id: &str) -> Result<bool> {
        let affected = self
            .db
            .execute("DELETE FROM prompts WHERE id = ?1", &[&id])?;
        Ok(affected > 0)
    }

    /// Read, modify and write back one record in a single transaction
    ///
    /// `id` and `created_at` are kept whatever `change` does to them. An error
    /// from `change` leaves the stored record untouched.
    pub fn update<F>(&self, id: &str, change: F) -> Result<PromptRecord>
    where
        F: FnOnce(&mut PromptRecord) -> Result<()>,
    {
        self.db.transaction(|conn| {
            let mut record =
                Self::fetch(conn, id)?.ok_or_else(|| PromptError::not_found("prompt", id))?;
            let created_at = record.created_at;

            change(&mut record)?;
            record.id = id.to_string();
            record.created_at = created_at;

            let (config, chain_steps) = Self::encode(&record)?;
            conn.execute(
                r#"
                UPDATE prompts
                SET name = ?1, kind = ?2, config = ?3, final_prompt = ?4, chain_steps = ?5
                WHERE id = ?6
                "#,
                params![
                    record.name,
                    record.kind.as_str(),
                    config,
                    record.final_prompt,
                    chain_steps,
                    id
                ],
            )?;
            Ok(record)
        })
    }

    pub fn rename(&self, id: &str, name: &str) -> Result<()> {
        self.update(id, |record| {
            record.name = name.to_string();
            Ok(())
        })?;
        Ok(())
    }

    fn fetch(conn: &Connection, id: &str) -> Result<Option<PromptRecord>> {
        let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", SELECT_COLUMNS))?;
        stmt.query_row(params![id], Self::map_row)
            .optional()?
            .map(Self::row_to_record)
            .transpose()
    }

    /// JSON columns for `config` and `chain_steps` (NULL when there are no steps)
    fn encode(record: &PromptRecord) -> Result<(String, Option<String>)> {
        let config = serde_json::to_string(&record.config)?;
        let chain_steps = if record.chain_steps.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&record.chain_steps)?)
        };
        Ok((config, chain_steps))
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PromptRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
        ))
    }

    fn row_to_record(row: PromptRow) -> Result<PromptRecord> {
        let (id, name, kind, config, final_prompt, chain_steps, created_at) = row;

        let kind = kind.parse::<RecordKind>().map_err(PromptError::Storage)?;
        let config: PromptConfig = serde_json::from_str(&config)?;
        let chain_steps: Vec<ChainStep> = match chain_steps {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        };
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                PromptError::Storage(format!("Invalid timestamp for prompt {}: {}", id, e))
            })?;

        Ok(PromptRecord {
            id,
            name,
            kind,
            config,
            final_prompt,
            chain_steps,
            created_at,
        })
    }
}
