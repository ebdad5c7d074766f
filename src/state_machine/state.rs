//! Session state types

use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Wrong answers allowed on one question before the answer is revealed
pub const MAX_ATTEMPTS: u32 = 3;

/// Where a user is in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// Fresh session, the next message is the user's name
    #[default]
    AwaitingName,
    AwaitingDocument,
    AwaitingDate,
    /// Onboarding done; choosing topics or finished
    Registered,
    /// Topic description shown, waiting for yes/no to start its questions
    AwaitingTopicConfirmation,
    /// Answering the questions of `current_topic`
    InTopic,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::AwaitingName => "awaiting_name",
            SessionState::AwaitingDocument => "awaiting_document",
            SessionState::AwaitingDate => "awaiting_date",
            SessionState::Registered => "registered",
            SessionState::AwaitingTopicConfirmation => "awaiting_topic_confirmation",
            SessionState::InTopic => "in_topic",
        }
    }

    /// States in which a topic is selected
    pub fn has_topic(self) -> bool {
        matches!(
            self,
            SessionState::AwaitingTopicConfirmation | SessionState::InTopic
        )
    }

    #[allow(dead_code)] // Used in tests
    pub fn is_registered(self) -> bool {
        !matches!(
            self,
            SessionState::AwaitingName | SessionState::AwaitingDocument | SessionState::AwaitingDate
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "awaiting_name" => Ok(SessionState::AwaitingName),
            "awaiting_document" => Ok(SessionState::AwaitingDocument),
            "awaiting_date" => Ok(SessionState::AwaitingDate),
            "registered" => Ok(SessionState::Registered),
            "awaiting_topic_confirmation" => Ok(SessionState::AwaitingTopicConfirmation),
            "in_topic" => Ok(SessionState::InTopic),
            other => Err(format!("unknown session state: {other}")),
        }
    }
}

/// Persisted conversation state of one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub name: Option<String>,
    pub document_id: Option<String>,
    pub conversation_date: Option<NaiveDate>,
    pub state: SessionState,
    pub current_topic: Option<String>,
    pub item_index: usize,
    pub retry_count: u32,
    pub completed_topics: BTreeSet<String>,
    pub correct_count: u32,
    pub incorrect_count: u32,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: None,
            document_id: None,
            conversation_date: None,
            state: SessionState::AwaitingName,
            current_topic: None,
            item_index: 0,
            retry_count: 0,
            completed_topics: BTreeSet::new(),
            correct_count: 0,
            incorrect_count: 0,
        }
    }

    pub fn is_completed(&self, topic: &str) -> bool {
        self.completed_topics.contains(topic)
    }

    /// Topics from `all` that are not completed yet, in listing order
    pub fn pending_topics(&self, all: &[&str]) -> Vec<String> {
        all.iter()
            .filter(|t| !self.is_completed(t))
            .map(|t| (*t).to_string())
            .collect()
    }

    pub fn answered_count(&self) -> u32 {
        self.correct_count.saturating_add(self.incorrect_count)
    }

    /// Final grade on a 0-5 scale in hundredths. Exact halves round to the
    /// even hundredth.
    fn score_hundredths(&self) -> u32 {
        let total = u64::from(self.correct_count) + u64::from(self.incorrect_count);
        if total == 0 {
            return 0;
        }
        let scaled = u64::from(self.correct_count) * 500;
        let mut hundredths = scaled / total;
        match (2 * (scaled % total)).cmp(&total) {
            Ordering::Greater => hundredths += 1,
            Ordering::Equal if hundredths % 2 == 1 => hundredths += 1,
            _ => {}
        }
        u32::try_from(hundredths).unwrap_or(500)
    }

    /// Final grade on a 0-5 scale, rounded to two decimals
    pub fn score(&self) -> f64 {
        f64::from(self.score_hundredths()) / 100.0
    }

    /// Final grade as shown to the user: `0` when nothing was answered,
    /// otherwise the shortest decimal form with at least one fraction digit
    /// (`5.0`, `3.1`, `0.62`).
    pub fn score_label(&self) -> String {
        if self.answered_count() == 0 {
            return "0".to_string();
        }
        let hundredths = self.score_hundredths();
        let (units, fraction) = (hundredths / 100, hundredths % 100);
        if fraction % 10 == 0 {
            format!("{units}.{}", fraction / 10)
        } else {
            format!("{units}.{fraction:02}")
        }
    }

    /// Apply one typed update
    pub fn apply(&mut self, field: &SessionField) {
        match field {
            SessionField::Name(v) => self.name = Some(v.clone()),
            SessionField::DocumentId(v) => self.document_id = Some(v.clone()),
            SessionField::ConversationDate(v) => self.conversation_date = Some(*v),
            SessionField::State(v) => self.state = *v,
            SessionField::CurrentTopic(v) => self.current_topic.clone_from(v),
            SessionField::ItemIndex(v) => self.item_index = *v,
            SessionField::RetryCount(v) => self.retry_count = *v,
            SessionField::CompletedTopics(v) => self.completed_topics.clone_from(v),
            SessionField::CorrectCount(v) => self.correct_count = *v,
            SessionField::IncorrectCount(v) => self.incorrect_count = *v,
        }
    }
}

/// A typed write to one session column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionField {
    Name(String),
    DocumentId(String),
    ConversationDate(NaiveDate),
    State(SessionState),
    CurrentTopic(Option<String>),
    ItemIndex(usize),
    RetryCount(u32),
    CompletedTopics(BTreeSet<String>),
    CorrectCount(u32),
    IncorrectCount(u32),
}

impl SessionField {
    /// Column in the `users` table backing this field
    pub fn column(&self) -> &'static str {
        match self {
            SessionField::Name(_) => "name",
            SessionField::DocumentId(_) => "document_id",
            SessionField::ConversationDate(_) => "conversation_date",
            SessionField::State(_) => "state",
            SessionField::CurrentTopic(_) => "current_topic",
            SessionField::ItemIndex(_) => "item_index",
            SessionField::RetryCount(_) => "retry_count",
            SessionField::CompletedTopics(_) => "completed_topics",
            SessionField::CorrectCount(_) => "correct_count",
            SessionField::IncorrectCount(_) => "incorrect_count",
        }
    }
}
