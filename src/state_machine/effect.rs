//! Effects produced by state transitions

use super::state::SessionField;

/// Work the runtime performs after a transition, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write the changed session fields in one atomic update
    PersistFields { fields: Vec<SessionField> },

    /// Onboarding finished
    RegistrationCompleted { name: String },

    /// A topic was selected and its description shown
    TopicStarted { topic: String },

    /// A topic was added to the completed set
    TopicCompleted { topic: String },

    /// The answer of a question was revealed after the last failed attempt
    AnswerRevealed { topic: String, item_index: usize },
}

impl Effect {
    pub fn persist_fields(fields: Vec<SessionField>) -> Self {
        Effect::PersistFields { fields }
    }

    pub fn topic_completed(topic: &str) -> Self {
        Effect::TopicCompleted {
            topic: topic.to_string(),
        }
    }
}
