//! Bot replies

/// What the bot answers for one turn
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    pub message: String,
    pub secondary_message: Option<String>,
    pub pending_topics: Option<Vec<String>>,
    pub options: Option<Vec<String>>,
}

impl Reply {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_secondary(mut self, secondary: impl Into<String>) -> Self {
        self.secondary_message = Some(secondary.into());
        self
    }

    pub fn with_pending_topics(mut self, topics: Vec<String>) -> Self {
        self.pending_topics = Some(topics);
        self
    }

    /// Attach answer options; an empty list is omitted
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = (!options.is_empty()).then_some(options);
        self
    }
}
