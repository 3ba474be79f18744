//! Dataset loading and validation.
//!
//! Three JSON files in a data directory:
//! - `conversation.json` — ordered list of `{role, content}` turns
//! - `questions.json` — list of `{id, question, expected, keywords, thread}`
//! - `threads.json` — map of thread name to ordered list of turns
//!
//! Validation happens once at load. There is no meaningful partial-result
//! state without valid inputs, so any problem here is fatal to the run.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{BenchError, BenchResult};
use crate::transcript::Turn;

/// One benchmark question. `keywords` drive scoring; `expected` is the
/// human-readable reference answer, echoed in progress output only.
#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    pub id: u32,
    pub question: String,
    pub expected: String,
    pub keywords: Vec<String>,
    pub thread: String,
}

/// The three fixed inputs, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub conversation: Vec<Turn>,
    pub questions: Vec<Question>,
    pub threads: BTreeMap<String, Vec<Turn>>,
}

impl Dataset {
    /// Load and validate the dataset from `dir`.
    pub fn load(dir: &Path) -> BenchResult<Self> {
        let conversation: Vec<Turn> = read_json(&dir.join("conversation.json"))?;
        let questions: Vec<Question> = read_json(&dir.join("questions.json"))?;
        let threads: BTreeMap<String, Vec<Turn>> = read_json(&dir.join("threads.json"))?;

        let dataset = Self {
            conversation,
            questions,
            threads,
        };
        dataset.validate()?;
        debug!(
            turns = dataset.conversation.len(),
            questions = dataset.questions.len(),
            threads = dataset.threads.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    fn validate(&self) -> BenchResult<()> {
        if self.conversation.is_empty() {
            return Err(BenchError::Dataset("conversation is empty".into()));
        }
        if self.questions.is_empty() {
            return Err(BenchError::Dataset("question list is empty".into()));
        }

        let mut seen = HashSet::new();
        for q in &self.questions {
            if !seen.insert(q.id) {
                return Err(BenchError::Dataset(format!("duplicate question id {}", q.id)));
            }
            match self.threads.get(&q.thread) {
                None => {
                    return Err(BenchError::UnknownThread {
                        question: q.id,
                        thread: q.thread.clone(),
                    })
                }
                Some(turns) if turns.is_empty() => {
                    return Err(BenchError::Dataset(format!(
                        "thread '{}' is empty",
                        q.thread
                    )))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Resolve a question's thread. Validation guarantees presence, so a
    /// miss here is a logic error surfaced as `UnknownThread`.
    pub fn thread(&self, q: &Question) -> BenchResult<&[Turn]> {
        self.threads
            .get(&q.thread)
            .map(Vec::as_slice)
            .ok_or_else(|| BenchError::UnknownThread {
                question: q.id,
                thread: q.thread.clone(),
            })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> BenchResult<T> {
    let content = std::fs::read_to_string(path).map_err(|e| BenchError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(serde_json::from_str(&content)?)
}
