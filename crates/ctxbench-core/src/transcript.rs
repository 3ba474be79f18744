use serde::{Deserialize, Serialize};
use std::fmt;

/// Speaker tag for a conversation turn. The set is closed — anything
/// else in the input data is a load error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message in a conversation. An ordered `Vec<Turn>` is a
/// conversation or a curated thread; insertion order reconstructs the
/// chronological dialogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Whitespace-token count of the content. Punctuation is not
    /// stripped; this is a rough size proxy, not a tokenizer.
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// Total whitespace-token count across a sequence of turns.
pub fn word_count(turns: &[Turn]) -> usize {
    turns.iter().map(Turn::word_count).sum()
}
