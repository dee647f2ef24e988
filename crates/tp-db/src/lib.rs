//! Storage layer for rule presets and the change history.
//!
//! Provides persistence using `rusqlite`. The engine in `tp-core` never
//! touches storage; this crate is where the CLI keeps what the engine
//! produces.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! Wrap it in a `Mutex` or open one instance per thread for shared access.
//!
//! # Schema
//!
//! Timestamps are stored as TEXT in RFC 3339 format with millisecond
//! precision (e.g., `2025-03-03T09:30:00.000Z`), so lexicographic order matches
//! chronological order. Metrics and rule lists are stored as JSON TEXT in the
//! same camelCase shape the engine serializes.
//!
//! Both tables are bounded logs: every insert trims the table down to the
//! most recent `limit` rows.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;
use tp_core::history::HistoryEntry;
use tp_core::template::RuleTemplate;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored JSON column could not be encoded or decoded.
    #[error("invalid {context} JSON for {id}")]
    Json {
        context: &'static str,
        id: String,
        #[source]
        source: serde_json::Error,
    },
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for {id}: {value}")]
    Timestamp {
        id: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A preset as stored in the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPreset {
    pub template: RuleTemplate,
    pub saved_at: DateTime<Utc>,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- Change history: one row per committed preview or manual edit
            -- metrics: JSON-encoded PreviewMetrics
            CREATE TABLE IF NOT EXISTS history (
                id TEXT PRIMARY KEY,
                timestamp TEXT NOT NULL,
                summary TEXT NOT NULL,
                metrics TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_history_timestamp ON history(timestamp);

            -- Preset library
            -- tags: JSON array of strings
            -- rules: JSON array of rules
            CREATE TABLE IF NOT EXISTS presets (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                tags TEXT NOT NULL DEFAULT '[]',
                rules TEXT NOT NULL,
                saved_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_presets_saved_at ON presets(saved_at);
            ",
        )?;
        Ok(())
    }

    // ========== History ==========

    /// Appends an entry and keeps only the most recent `limit` entries.
    ///
    /// Returns the number of entries trimmed.
    pub fn append_history(&mut self, entry: &HistoryEntry, limit: usize) -> Result<usize, DbError> {
        let metrics = serde_json::to_string(&entry.metrics).map_err(|source| DbError::Json {
            context: "metrics",
            id: entry.id.clone(),
            source,
        })?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO history (id, timestamp, summary, metrics) VALUES (?, ?, ?, ?)",
            params![entry.id, format_timestamp(entry.timestamp), entry.summary, metrics],
        )?;
        let trimmed = tx.execute(
            "
            DELETE FROM history
            WHERE id NOT IN (
                SELECT id FROM history
                ORDER BY timestamp DESC, rowid DESC
                LIMIT ?
            )
            ",
            [sql_limit(Some(limit))],
        )?;
        tx.commit()?;

        if trimmed > 0 {
            tracing::debug!(trimmed, limit, "trimmed history");
        }
        Ok(trimmed)
    }

    /// Lists history entries, newest first.
    pub fn list_history(&self, limit: Option<usize>) -> Result<Vec<HistoryEntry>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, timestamp, summary, metrics
            FROM history
            ORDER BY timestamp DESC, rowid DESC
            LIMIT ?
            ",
        )?;
        let rows = stmt.query_map([sql_limit(limit)], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, timestamp, summary, metrics) = row?;
            let timestamp = parse_timestamp(&timestamp, &id)?;
            let metrics = serde_json::from_str(&metrics).map_err(|source| DbError::Json {
                context: "metrics",
                id: id.clone(),
                source,
            })?;
            entries.push(HistoryEntry {
                id,
                timestamp,
                summary,
                metrics,
            });
        }
        Ok(entries)
    }

    // ========== Presets ==========

    /// Saves a preset, replacing any preset with the same id, and keeps only
    /// the most recent `limit` presets.
    pub fn save_preset(&mut self, template: &RuleTemplate, limit: usize) -> Result<(), DbError> {
        self.save_preset_at(template, limit, Utc::now())
    }

    fn save_preset_at(
        &mut self,
        template: &RuleTemplate,
        limit: usize,
        saved_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let to_json = |context: &'static str, value: serde_json::Result<String>| {
            value.map_err(|source| DbError::Json {
                context,
                id: template.id.clone(),
                source,
            })
        };
        let tags = to_json("tags", serde_json::to_string(&template.tags))?;
        let rules = to_json("rules", serde_json::to_string(&template.rules))?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "
            INSERT INTO presets (id, name, description, tags, rules, saved_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                tags = excluded.tags,
                rules = excluded.rules,
                saved_at = excluded.saved_at
            ",
            params![
                template.id,
                template.name,
                template.description,
                tags,
                rules,
                format_timestamp(saved_at),
            ],
        )?;
        let trimmed = tx.execute(
            "
            DELETE FROM presets
            WHERE id NOT IN (
                SELECT id FROM presets
                ORDER BY saved_at DESC, rowid DESC
                LIMIT ?
            )
            ",
            [sql_limit(Some(limit))],
        )?;
        tx.commit()?;

        tracing::debug!(preset = %template.name, trimmed, "saved preset");
        Ok(())
    }

    /// Lists presets, most recently saved first.
    pub fn list_presets(&self) -> Result<Vec<StoredPreset>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, name, description, tags, rules, saved_at
            FROM presets
            ORDER BY saved_at DESC, rowid DESC
            ",
        )?;
        let rows = stmt.query_map([], PresetRow::from_row)?;
        let mut presets = Vec::new();
        for row in rows {
            presets.push(row?.decode()?);
        }
        Ok(presets)
    }

    /// Finds a preset by id or by case-insensitive name.
    ///
    /// When several presets share a name, the most recently saved wins.
    pub fn find_preset(&self, key: &str) -> Result<Option<StoredPreset>, DbError> {
        let row = self
            .conn
            .query_row(
                "
                SELECT id, name, description, tags, rules, saved_at
                FROM presets
                WHERE id = ?1 OR name = ?1 COLLATE NOCASE
                ORDER BY saved_at DESC, rowid DESC
                LIMIT 1
                ",
                [key],
                PresetRow::from_row,
            )
            .optional()?;
        row.map(PresetRow::decode).transpose()
    }

    /// Deletes a preset by id or case-insensitive name.
    ///
    /// Returns whether anything was deleted.
    pub fn delete_preset(&mut self, key: &str) -> Result<bool, DbError> {
        let deleted = self.conn.execute(
            "DELETE FROM presets WHERE id = ?1 OR name = ?1 COLLATE NOCASE",
            [key],
        )?;
        Ok(deleted > 0)
    }
}

/// Raw preset columns before JSON decoding.
struct PresetRow {
    id: String,
    name: String,
    description: String,
    tags: String,
    rules: String,
    saved_at: String,
}

impl PresetRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            tags: row.get(3)?,
            rules: row.get(4)?,
            saved_at: row.get(5)?,
        })
    }

    fn decode(self) -> Result<StoredPreset, DbError> {
        let saved_at = parse_timestamp(&self.saved_at, &self.id)?;
        let tags = serde_json::from_str(&self.tags).map_err(|source| DbError::Json {
            context: "tags",
            id: self.id.clone(),
            source,
        })?;
        let rules = serde_json::from_str(&self.rules).map_err(|source| DbError::Json {
            context: "rules",
            id: self.id.clone(),
            source,
        })?;
        Ok(StoredPreset {
            template: RuleTemplate {
                id: self.id,
                name: self.name,
                description: self.description,
                tags,
                rules,
            },
            saved_at,
        })
    }
}

/// SQLite treats a negative LIMIT as unbounded.
fn sql_limit(limit: Option<usize>) -> i64 {
    limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX))
}

fn parse_timestamp(value: &str, id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::Timestamp {
            id: id.to_string(),
            value: value.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
