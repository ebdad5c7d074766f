//! Database schema

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT UNIQUE NOT NULL,
    name TEXT,
    document_id TEXT,
    conversation_date TEXT,
    state TEXT NOT NULL DEFAULT 'awaiting_name',
    current_topic TEXT,
    item_index INTEGER NOT NULL DEFAULT 0,
    retry_count INTEGER NOT NULL DEFAULT 0,
    completed_topics TEXT NOT NULL DEFAULT '',
    correct_count INTEGER NOT NULL DEFAULT 0,
    incorrect_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS topics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    topic TEXT NOT NULL,
    kind TEXT NOT NULL,
    content TEXT NOT NULL,
    correct_answer TEXT
);

CREATE INDEX IF NOT EXISTS idx_topics_topic ON topics(topic, id);
";

/// Separator of the `completed_topics` column
pub const COMPLETED_TOPICS_SEPARATOR: char = ',';
