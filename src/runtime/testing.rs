//! Mock implementations for testing
//!
//! These mocks enable runtime testing without real I/O.

use super::traits::*;
use crate::state_machine::{Session, SessionField};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

// ============================================================================
// In-Memory Storage
// ============================================================================

/// In-memory session store for testing
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    /// Every batch passed to `update_session`, in order
    pub updates: Mutex<Vec<(String, Vec<SessionField>)>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            updates: Mutex::new(Vec::new()),
        }
    }

    /// Seed a stored session
    pub fn with_session(self, session: Session) -> Self {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.user_id.clone(), session);
        self
    }

    /// Current stored session of a user
    pub fn session(&self, user_id: &str) -> Option<Session> {
        self.sessions.lock().unwrap().get(user_id).cloned()
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_session(&self, user_id: &str) -> Result<Option<Session>, String> {
        Ok(self.session(user_id))
    }

    async fn create_session(&self, user_id: &str) -> Result<Session, String> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .entry(user_id.to_string())
            .or_insert_with(|| Session::new(user_id))
            .clone())
    }

    async fn update_session(&self, user_id: &str, fields: &[SessionField]) -> Result<(), String> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .get_mut(user_id)
            .ok_or_else(|| format!("Session not found: {user_id}"))?;
        for field in fields {
            session.apply(field);
        }
        drop(sessions);

        self.updates
            .lock()
            .unwrap()
            .push((user_id.to_string(), fields.to_vec()));
        Ok(())
    }
}

// ============================================================================
// Failing Storage
// ============================================================================

/// Session store whose writes always fail
pub struct FailingSessionStore {
    inner: InMemorySessionStore,
}

impl FailingSessionStore {
    pub fn new(session: Session) -> Self {
        Self {
            inner: InMemorySessionStore::new().with_session(session),
        }
    }

    pub fn session(&self, user_id: &str) -> Option<Session> {
        self.inner.session(user_id)
    }
}

#[async_trait]
impl SessionStore for FailingSessionStore {
    async fn get_session(&self, user_id: &str) -> Result<Option<Session>, String> {
        self.inner.get_session(user_id).await
    }

    async fn create_session(&self, user_id: &str) -> Result<Session, String> {
        self.inner.create_session(user_id).await
    }

    async fn update_session(&self, _user_id: &str, _fields: &[SessionField]) -> Result<(), String> {
        Err("disk I/O error".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, TOPICS};
    use crate::db::Database;
    use crate::runtime::{ChatRuntime, DatabaseStorage, RuntimeError};
    use crate::state_machine::SessionState;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn runtime(store: Arc<InMemorySessionStore>) -> ChatRuntime<Arc<InMemorySessionStore>> {
        ChatRuntime::new(store, Arc::new(Catalog::builtin()))
    }

    fn registered(user_id: &str) -> Session {
        let mut session = Session::new(user_id);
        session.name = Some("Ana".to_string());
        session.document_id = Some("123".to_string());
        session.conversation_date = NaiveDate::from_ymd_opt(2025, 8, 22);
        session.state = SessionState::Registered;
        session
    }

    #[tokio::test]
    async fn test_first_contact_records_name() {
        let store = Arc::new(InMemorySessionStore::new());
        let rt = runtime(store.clone());

        let reply = rt.handle_turn("u1", "ana gómez").await.unwrap();
        assert!(reply.message.contains("Ana Gómez"));

        let session = store.session("u1").unwrap();
        assert_eq!(session.state, SessionState::AwaitingDocument);
        assert_eq!(session.name.as_deref(), Some("Ana Gómez"));
    }

    #[tokio::test]
    async fn test_full_registration() {
        let store = Arc::new(InMemorySessionStore::new());
        let rt = runtime(store.clone());

        rt.handle_turn("u1", "Ana").await.unwrap();
        rt.handle_turn("u1", "1020").await.unwrap();
        let reply = rt.handle_turn("u1", "2025-08-22").await.unwrap();

        assert!(reply.message.contains("Registro completado"));
        assert!(reply.secondary_message.is_some());
        let session = store.session("u1").unwrap();
        assert_eq!(session.state, SessionState::Registered);
        assert_eq!(session.document_id.as_deref(), Some("1020"));
        assert_eq!(store.update_count(), 3);
    }

    #[tokio::test]
    async fn test_rejection_leaves_session_untouched() {
        let mut session = Session::new("u1");
        session.name = Some("Ana".to_string());
        session.document_id = Some("1".to_string());
        session.state = SessionState::AwaitingDate;
        let store = Arc::new(InMemorySessionStore::new().with_session(session.clone()));
        let rt = runtime(store.clone());

        let reply = rt.handle_turn("u1", "22/08/2025").await.unwrap();
        assert!(reply.message.contains("AAAA-MM-DD"));
        assert_eq!(store.session("u1").unwrap(), session);
        assert_eq!(store.update_count(), 0);
    }

    #[tokio::test]
    async fn test_listing_topics_writes_nothing() {
        let store = Arc::new(InMemorySessionStore::new().with_session(registered("u1")));
        let rt = runtime(store.clone());

        let reply = rt.handle_turn("u1", "TEMA").await.unwrap();
        assert_eq!(reply.pending_topics.map(|t| t.len()), Some(TOPICS.len()));
        assert_eq!(store.update_count(), 0);
    }

    #[tokio::test]
    async fn test_topic_walkthrough_persists_each_turn() {
        let store = Arc::new(InMemorySessionStore::new().with_session(registered("u1")));
        let rt = runtime(store.clone());

        rt.handle_turn("u1", "riesgos").await.unwrap();
        let reply = rt.handle_turn("u1", "si").await.unwrap();
        assert_eq!(reply.options.map(|o| o.len()), Some(4));

        rt.handle_turn("u1", "b").await.unwrap();
        let session = store.session("u1").unwrap();
        assert!(session.is_completed("riesgos"));
        assert_eq!(session.correct_count, 1);
        assert_eq!(session.state, SessionState::Registered);
        assert!(session.current_topic.is_none());
    }

    #[tokio::test]
    async fn test_each_turn_is_one_update() {
        let store = Arc::new(InMemorySessionStore::new().with_session(registered("u1")));
        let rt = runtime(store.clone());

        rt.handle_turn("u1", "impacto").await.unwrap();
        rt.handle_turn("u1", "sí").await.unwrap();
        rt.handle_turn("u1", "a").await.unwrap();

        let updates = store.updates.lock().unwrap();
        assert_eq!(updates.len(), 3);
        let (_, last) = &updates[2];
        assert!(last.contains(&SessionField::RetryCount(1)));
    }

    #[tokio::test]
    async fn test_storage_failure_is_an_error() {
        let rt = ChatRuntime::new(
            FailingSessionStore::new(registered("u1")),
            Arc::new(Catalog::builtin()),
        );

        let err = rt.handle_turn("u1", "riesgos").await.unwrap_err();
        assert!(matches!(err, RuntimeError::Storage(msg) if msg.contains("disk")));
    }

    #[tokio::test]
    async fn test_rejection_needs_no_write() {
        let rt = ChatRuntime::new(
            FailingSessionStore::new(registered("u1")),
            Arc::new(Catalog::builtin()),
        );

        let reply = rt.handle_turn("u1", "hola").await.unwrap();
        assert!(reply.message.contains("tema"));
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_session() {
        let store = Arc::new(FailingSessionStore::new(registered("u1")));
        let rt = ChatRuntime::new(store.clone(), Arc::new(Catalog::builtin()));

        assert!(rt.handle_turn("u1", "riesgos").await.is_err());
        let session = store.session("u1").unwrap();
        assert_eq!(session.state, SessionState::Registered);
        assert!(session.current_topic.is_none());
    }

    #[tokio::test]
    async fn test_database_storage_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let rt = ChatRuntime::new(DatabaseStorage::new(db.clone()), Arc::new(Catalog::builtin()));

        rt.handle_turn("u1", "Ana").await.unwrap();
        rt.handle_turn("u1", "99").await.unwrap();
        rt.handle_turn("u1", "2025-01-31").await.unwrap();
        rt.handle_turn("u1", "comites").await.unwrap();

        let session = db.get_session("u1").unwrap().unwrap();
        assert_eq!(session.state, SessionState::AwaitingTopicConfirmation);
        assert_eq!(session.current_topic.as_deref(), Some("comites"));
        assert_eq!(session.conversation_date, NaiveDate::from_ymd_opt(2025, 1, 31));
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let store = Arc::new(InMemorySessionStore::new());
        let rt = runtime(store.clone());

        rt.handle_turn("u1", "Ana").await.unwrap();
        rt.handle_turn("u2", "Luis").await.unwrap();

        assert_eq!(store.session("u1").unwrap().name.as_deref(), Some("Ana"));
        assert_eq!(store.session("u2").unwrap().name.as_deref(), Some("Luis"));
    }
}
