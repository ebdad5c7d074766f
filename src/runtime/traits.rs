//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the runtime with mock implementations.

use crate::db::Database;
use crate::state_machine::{Session, SessionField};
use async_trait::async_trait;
use std::sync::Arc;

/// Storage for user sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Get the session of a user, `None` when the user never wrote before
    async fn get_session(&self, user_id: &str) -> Result<Option<Session>, String>;

    /// Create the session of a new user in its initial state
    async fn create_session(&self, user_id: &str) -> Result<Session, String>;

    /// Apply all field updates of one turn atomically
    async fn update_session(&self, user_id: &str, fields: &[SessionField]) -> Result<(), String>;
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn get_session(&self, user_id: &str) -> Result<Option<Session>, String> {
        (**self).get_session(user_id).await
    }

    async fn create_session(&self, user_id: &str) -> Result<Session, String> {
        (**self).create_session(user_id).await
    }

    async fn update_session(&self, user_id: &str, fields: &[SessionField]) -> Result<(), String> {
        (**self).update_session(user_id, fields).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use Database as `SessionStore`
#[derive(Clone)]
pub struct DatabaseStorage {
    db: Database,
}

impl DatabaseStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for DatabaseStorage {
    async fn get_session(&self, user_id: &str) -> Result<Option<Session>, String> {
        self.db.get_session(user_id).map_err(|e| e.to_string())
    }

    async fn create_session(&self, user_id: &str) -> Result<Session, String> {
        self.db.create_session(user_id).map_err(|e| e.to_string())
    }

    async fn update_session(&self, user_id: &str, fields: &[SessionField]) -> Result<(), String> {
        self.db
            .update_session(user_id, fields)
            .map_err(|e| e.to_string())
    }
}
