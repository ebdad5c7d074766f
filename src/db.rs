//! Database module for the induction bot
//!
//! Provides persistence for user sessions and the topic catalog.

mod schema;

pub use schema::*;

use crate::catalog::{Catalog, ItemKind, TopicItem};
use crate::state_machine::{Session, SessionField, SessionState};
use chrono::{NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    #[error("Corrupt session row for {user_id}: {reason}")]
    CorruptSession { user_id: String, reason: String },
    #[error("Unknown topic item kind: {0}")]
    UnknownItemKind(String),
    #[error("Value out of range for column {0}")]
    OutOfRange(&'static str),
    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Run raw SQL against the connection (for testing)
    #[cfg(test)]
    pub fn execute_raw(&self, sql: &str) -> DbResult<()> {
        self.lock()?.execute_batch(sql)?;
        Ok(())
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }

    // ==================== Session Operations ====================

    /// Get the session of a user, `None` on first contact
    pub fn get_session(&self, user_id: &str) -> DbResult<Option<Session>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT user_id, name, document_id, conversation_date, state, current_topic,
                        item_index, retry_count, completed_topics, correct_count, incorrect_count
                 FROM users WHERE user_id = ?1",
                params![user_id],
                SessionRow::from_row,
            )
            .optional()?;

        row.map(SessionRow::into_session).transpose()
    }

    /// Create the session of a new user. Creating an existing session is a
    /// no-op that returns the stored one.
    pub fn create_session(&self, user_id: &str) -> DbResult<Session> {
        {
            let conn = self.lock()?;
            let now = Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO users (user_id, state, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?3)
                 ON CONFLICT (user_id) DO NOTHING",
                params![user_id, SessionState::AwaitingName.as_str(), now],
            )?;
        }
        self.get_session(user_id)?
            .ok_or_else(|| DbError::SessionNotFound(user_id.to_string()))
    }

    /// Write the given fields of a session in a single transaction
    pub fn update_session(&self, user_id: &str, fields: &[SessionField]) -> DbResult<()> {
        if fields.is_empty() {
            return Ok(());
        }

        let mut assignments = Vec::with_capacity(fields.len() + 1);
        let mut values = Vec::with_capacity(fields.len() + 2);
        for field in fields {
            values.push(field_value(field)?);
            assignments.push(format!("{} = ?{}", field.column(), values.len()));
        }
        values.push(Value::Text(Utc::now().to_rfc3339()));
        assignments.push(format!("updated_at = ?{}", values.len()));
        values.push(Value::Text(user_id.to_string()));

        let sql = format!(
            "UPDATE users SET {} WHERE user_id = ?{}",
            assignments.join(", "),
            values.len()
        );

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let updated = tx.execute(&sql, params_from_iter(values))?;
        if updated == 0 {
            return Err(DbError::SessionNotFound(user_id.to_string()));
        }
        tx.commit()?;
        Ok(())
    }

    // ==================== Topic Operations ====================

    /// Number of rows in the `topics` table
    pub fn topic_row_count(&self) -> DbResult<i64> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM topics", [], |row| row.get(0))
            .map_err(DbError::from)
    }

    /// Replace the whole catalog with `items`, in order
    pub fn seed_topics(&self, items: &[(&str, TopicItem)]) -> DbResult<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM topics", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO topics (topic, kind, content, correct_answer) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (topic, item) in items {
                stmt.execute(params![
                    topic,
                    item.kind.as_str(),
                    item.content,
                    item.correct_answer
                ])?;
            }
        }
        tx.commit()?;
        Ok(items.len())
    }

    /// Load every topic item, ordered by insertion
    pub fn load_catalog(&self) -> DbResult<Catalog> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT topic, kind, content, correct_answer FROM topics ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut catalog = Catalog::new();
        for row in rows {
            let (topic, kind, content, correct_answer) = row?;
            let kind = ItemKind::parse(&kind).ok_or(DbError::UnknownItemKind(kind))?;
            catalog.push(
                &topic,
                TopicItem {
                    kind,
                    content,
                    correct_answer,
                },
            );
        }
        Ok(catalog)
    }
}

/// Raw `users` columns before validation
struct SessionRow {
    user_id: String,
    name: Option<String>,
    document_id: Option<String>,
    conversation_date: Option<String>,
    state: String,
    current_topic: Option<String>,
    item_index: i64,
    retry_count: i64,
    completed_topics: String,
    correct_count: i64,
    incorrect_count: i64,
}

impl SessionRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get(0)?,
            name: row.get(1)?,
            document_id: row.get(2)?,
            conversation_date: row.get(3)?,
            state: row.get(4)?,
            current_topic: row.get(5)?,
            item_index: row.get(6)?,
            retry_count: row.get(7)?,
            completed_topics: row.get(8)?,
            correct_count: row.get(9)?,
            incorrect_count: row.get(10)?,
        })
    }

    fn into_session(self) -> DbResult<Session> {
        let corrupt = |reason: String| DbError::CorruptSession {
            user_id: self.user_id.clone(),
            reason,
        };

        let state: SessionState = self.state.parse().map_err(corrupt)?;
        let conversation_date = self
            .conversation_date
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(|d| NaiveDate::parse_from_str(d, DATE_FORMAT))
            .transpose()
            .map_err(|e| corrupt(format!("conversation_date: {e}")))?;
        let item_index = usize::try_from(self.item_index)
            .map_err(|_| corrupt(format!("item_index {}", self.item_index)))?;
        let count = |column: &str, value: i64| {
            u32::try_from(value).map_err(|_| corrupt(format!("{column} {value}")))
        };
        let retry_count = count("retry_count", self.retry_count)?;
        let correct_count = count("correct_count", self.correct_count)?;
        let incorrect_count = count("incorrect_count", self.incorrect_count)?;

        let completed_topics: BTreeSet<String> = self
            .completed_topics
            .split(COMPLETED_TOPICS_SEPARATOR)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();

        Ok(Session {
            user_id: self.user_id,
            name: self.name,
            document_id: self.document_id,
            conversation_date,
            state,
            current_topic: self.current_topic.filter(|t| !t.is_empty()),
            item_index,
            retry_count,
            completed_topics,
            correct_count,
            incorrect_count,
        })
    }
}

/// SQL value stored for a session field
fn field_value(field: &SessionField) -> DbResult<Value> {
    let value = match field {
        SessionField::Name(v) | SessionField::DocumentId(v) => Value::Text(v.clone()),
        SessionField::ConversationDate(date) => Value::Text(date.format(DATE_FORMAT).to_string()),
        SessionField::State(state) => Value::Text(state.as_str().to_string()),
        SessionField::CurrentTopic(topic) => topic.clone().map_or(Value::Null, Value::Text),
        SessionField::ItemIndex(index) => Value::Integer(
            i64::try_from(*index).map_err(|_| DbError::OutOfRange(field.column()))?,
        ),
        SessionField::RetryCount(n)
        | SessionField::CorrectCount(n)
        | SessionField::IncorrectCount(n) => Value::Integer(i64::from(*n)),
        SessionField::CompletedTopics(topics) => Value::Text(
            topics
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(&COMPLETED_TOPICS_SEPARATOR.to_string()),
        ),
    };
    Ok(value)
}
