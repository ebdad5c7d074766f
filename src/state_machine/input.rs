//! Normalized user input

/// Text of one turn: trimmed as typed, plus a case-folded copy for matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInput {
    raw: String,
    folded: String,
}

impl UserInput {
    pub fn new(text: &str) -> Self {
        let raw = text.trim().to_string();
        let folded = raw.to_lowercase();
        Self { raw, folded }
    }

    /// Trimmed text with the user's casing, used when storing profile fields
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Trimmed, lowercased text, used for every comparison
    pub fn folded(&self) -> &str {
        &self.folded
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

impl From<&str> for UserInput {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}
