//! Runtime for chat turns
//!
//! Loads the session of the caller, runs the pure transition and carries out
//! the returned effects in order.

pub mod traits;

#[cfg(test)]
pub mod testing;

pub use traits::*;

use crate::catalog::Catalog;
use crate::state_machine::{transition, Effect, Reply, UserInput};
use std::sync::Arc;
use thiserror::Error;

/// Type alias for production runtime with concrete implementations
pub type ProductionRuntime = ChatRuntime<DatabaseStorage>;

/// Faults that prevent a turn from completing
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Processes chat turns against any session store
pub struct ChatRuntime<S: SessionStore> {
    storage: S,
    catalog: Arc<Catalog>,
}

impl<S: SessionStore> ChatRuntime<S> {
    pub fn new(storage: S, catalog: Arc<Catalog>) -> Self {
        Self { storage, catalog }
    }

    /// Run one turn for `user_id`. Rejected input produces a reply and leaves
    /// the stored session as it was.
    pub async fn handle_turn(&self, user_id: &str, text: &str) -> Result<Reply, RuntimeError> {
        let session = match self
            .storage
            .get_session(user_id)
            .await
            .map_err(RuntimeError::Storage)?
        {
            Some(session) => session,
            None => {
                tracing::info!(user_id = %user_id, "Creating session for new user");
                self.storage
                    .create_session(user_id)
                    .await
                    .map_err(RuntimeError::Storage)?
            }
        };

        let input = UserInput::new(text);
        let result = match transition(&session, &self.catalog, &input) {
            Ok(result) => result,
            Err(rejection) => {
                tracing::debug!(
                    user_id = %user_id,
                    state = %session.state,
                    reason = ?rejection,
                    "Input rejected"
                );
                return Ok(Reply::new(rejection.to_string()));
            }
        };

        tracing::debug!(
            user_id = %user_id,
            from = %session.state,
            to = %result.session.state,
            "Transition"
        );

        for effect in result.effects {
            self.execute_effect(user_id, effect).await?;
        }

        Ok(result.reply)
    }

    async fn execute_effect(&self, user_id: &str, effect: Effect) -> Result<(), RuntimeError> {
        match effect {
            Effect::PersistFields { fields } => {
                if fields.is_empty() {
                    return Ok(());
                }
                self.storage
                    .update_session(user_id, &fields)
                    .await
                    .map_err(|e| {
                        tracing::error!(user_id = %user_id, error = %e, "Failed to persist session");
                        RuntimeError::Storage(e)
                    })
            }
            Effect::RegistrationCompleted { name } => {
                tracing::info!(user_id = %user_id, name = %name, "Registration completed");
                Ok(())
            }
            Effect::TopicStarted { topic } => {
                tracing::info!(user_id = %user_id, topic = %topic, "Topic started");
                Ok(())
            }
            Effect::TopicCompleted { topic } => {
                tracing::info!(user_id = %user_id, topic = %topic, "Topic completed");
                Ok(())
            }
            Effect::AnswerRevealed { topic, item_index } => {
                tracing::info!(
                    user_id = %user_id,
                    topic = %topic,
                    item_index,
                    "Answer revealed after final attempt"
                );
                Ok(())
            }
        }
    }
}
