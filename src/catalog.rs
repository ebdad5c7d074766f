//! Topic catalog
//!
//! Read-only, ordered content for every induction topic. Loaded once from the
//! `topics` table at startup and shared by every turn.

mod content;

pub use content::builtin_items;

use std::collections::HashMap;
use std::fmt;

/// Topics offered by the bot, in listing order
pub const TOPICS: [&str; 7] = [
    "riesgos",
    "aspectos",
    "impacto",
    "procedimientos",
    "comites",
    "emergencias",
    "responsabilidades",
];

/// Returns the canonical topic name if `text` (already case-folded) names one
pub fn known_topic(text: &str) -> Option<&'static str> {
    TOPICS.iter().copied().find(|t| *t == text)
}

/// Kind of a topic item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Info,
    Question,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Info => "info",
            ItemKind::Question => "question",
        }
    }

    /// Parse a stored kind. `pregunta` is accepted for rows written by older
    /// deployments.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "info" => Some(ItemKind::Info),
            "question" | "pregunta" => Some(ItemKind::Question),
            _ => None,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry of a topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicItem {
    pub kind: ItemKind,
    pub content: String,
    pub correct_answer: Option<String>,
}

impl TopicItem {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Info,
            content: content.into(),
            correct_answer: None,
        }
    }

    pub fn question(content: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Question,
            content: content.into(),
            correct_answer: Some(answer.into()),
        }
    }

    pub fn is_question(&self) -> bool {
        self.kind == ItemKind::Question
    }

    /// True when `folded` (trimmed, lowercased input) is the expected answer
    pub fn accepts(&self, folded: &str) -> bool {
        self.correct_answer
            .as_deref()
            .is_some_and(|answer| answer.trim().to_lowercase() == folded)
    }

    /// Split question content into prompt and options
    pub fn question_view(&self) -> QuestionView {
        QuestionView::parse(&self.content)
    }
}

/// A question split into its prompt and the options shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub prompt: String,
    pub options: Vec<String>,
}

impl QuestionView {
    /// Newline-separated content wins: line 0 is the prompt, the remaining
    /// lines are options. Otherwise `;` is the delimiter.
    pub fn parse(content: &str) -> Self {
        let delimiter = if content.contains('\n') { '\n' } else { ';' };
        let mut parts = content
            .split(delimiter)
            .map(str::trim)
            .filter(|part| !part.is_empty());

        let prompt = parts.next().unwrap_or_default().to_string();
        let options = parts.map(String::from).collect();
        Self { prompt, options }
    }
}

/// In-memory catalog keyed by lowercase topic name
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    topics: HashMap<String, Vec<TopicItem>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the content shipped with the bot
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for (topic, item) in builtin_items() {
            catalog.push(topic, item);
        }
        catalog
    }

    /// Append an item to a topic, preserving insertion order
    pub fn push(&mut self, topic: &str, item: TopicItem) {
        self.topics
            .entry(topic.trim().to_lowercase())
            .or_default()
            .push(item);
    }

    /// Builder form of [`Catalog::push`]
    #[allow(dead_code)] // Used in tests
    pub fn with_item(mut self, topic: &str, item: TopicItem) -> Self {
        self.push(topic, item);
        self
    }

    /// Ordered items of a topic; `None` when the topic has no rows
    pub fn items(&self, topic: &str) -> Option<&[TopicItem]> {
        self.topics
            .get(&topic.to_lowercase())
            .map(Vec::as_slice)
            .filter(|items| !items.is_empty())
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}
