//! Append-only usage log

use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::Serialize;
use serde_json::Value;

use super::Database;
use crate::ai::provider::ProviderKind;
use crate::model::UsageRecord;
use crate::types::{PromptError, Result};

/// A usage record as stored, with its row id and insertion time
#[derive(Debug, Clone, Serialize)]
pub struct StoredUsage {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: UsageRecord,
}

/// Totals per provider and model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSummary {
    pub provider: ProviderKind,
    pub model: String,
    pub calls: u64,
    /// Calls recorded for the generator's compile fallback
    pub fallbacks: u64,
    pub prompt_tokens: u64,
    pub response_tokens: u64,
    pub total_tokens: u64,
    pub cost: f64,
}

type UsageRow = (i64, String, String, i64, i64, i64, f64, Option<String>, String);

pub struct UsageStore<'a> {
    db: &'a Database,
}

impl<'a> UsageStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn append(&self, record: &UsageRecord) -> Result<i64> {
        let metadata = serde_json::to_string(&record.metadata)?;
        let conn = self.db.connection()?;
        conn.execute(
            r#"
            INSERT INTO usage_stats
                (provider, model, prompt_tokens, response_tokens, total_tokens, cost, metadata, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                record.provider.as_str(),
                record.model,
                record.prompt_tokens,
                record.response_tokens,
                record.total_tokens,
                record.cost,
                metadata,
                super::timestamp(Utc::now()),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Most recent first
    pub fn list(&self, limit: usize) -> Result<Vec<StoredUsage>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, provider, model, prompt_tokens, response_tokens, total_tokens, cost, metadata, created_at
            FROM usage_stats ORDER BY id DESC LIMIT ?1
            "#,
        )?;

        let rows: Vec<UsageRow> = stmt
            .query_map(params![limit as i64], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                    row.get(8)?,
                ))
            })?
            .collect::<rusqlite::Result<_>>()?;

        rows.into_iter().map(Self::row_to_usage).collect()
    }

    /// Aggregate per provider and model, busiest first
    pub fn summary(&self) -> Result<Vec<UsageSummary>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT provider, model, COUNT(*),
                   SUM(CASE WHEN json_extract(metadata, '$.fallback') = 1 THEN 1 ELSE 0 END),
                   SUM(prompt_tokens), SUM(response_tokens), SUM(total_tokens), SUM(cost)
            FROM usage_stats
            GROUP BY provider, model
            ORDER BY COUNT(*) DESC, provider, model
            "#,
        )?;

        let rows: Vec<(String, String, i64, i64, i64, i64, i64, f64)> = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                ))
            })?
            .collect::<rusqlite::Result<_>>()?;

        rows.into_iter()
            .map(
                |(provider, model, calls, fallbacks, prompt, response, total, cost)| {
                    Ok(UsageSummary {
                        provider: parse_provider(&provider)?,
                        model,
                        calls: count_column(calls),
                        fallbacks: count_column(fallbacks),
                        prompt_tokens: count_column(prompt),
                        response_tokens: count_column(response),
                        total_tokens: count_column(total),
                        cost,
                    })
                },
            )
            .collect()
    }

    fn row_to_usage(row: UsageRow) -> Result<StoredUsage> {
        let (id, provider, model, prompt, response, total, cost, metadata, created_at) = row;

        let metadata = match metadata {
            Some(json) => serde_json::from_str(&json)?,
            None => Value::Null,
        };
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| PromptError::Storage(format!("Invalid timestamp for usage {}: {}", id, e)))?;

        Ok(StoredUsage {
            id,
            created_at,
            record: UsageRecord {
                provider: parse_provider(&provider)?,
                model,
                prompt_tokens: token_column(prompt),
                response_tokens: token_column(response),
                total_tokens: token_column(total),
                cost,
                metadata,
            },
        })
    }
}

fn parse_provider(value: &str) -> Result<ProviderKind> {
    value.parse().map_err(PromptError::Storage)
}

/// SQLite integers are i64; out-of-range values clamp instead of wrapping
fn token_column(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

fn count_column(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
