//! Trial bookkeeping and the persisted experiment record.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::error::{BenchError, BenchResult};

/// One of the two context-construction strategies under comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Full,
    Curated,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Curated => write!(f, "curated"),
        }
    }
}

/// Per-condition, per-question trial outcomes, in run order.
/// Integer keys serialize as JSON object keys ("1", "2", ...), matching
/// the on-disk record format.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrialResults {
    pub full: BTreeMap<u32, Vec<bool>>,
    pub curated: BTreeMap<u32, Vec<bool>>,
}

impl TrialResults {
    pub fn record(&mut self, condition: Condition, question_id: u32, correct: bool) {
        let map = match condition {
            Condition::Full => &mut self.full,
            Condition::Curated => &mut self.curated,
        };
        map.entry(question_id).or_default().push(correct);
    }

    /// Correct-trial count for one question under one condition.
    pub fn correct(&self, condition: Condition, question_id: u32) -> usize {
        let map = match condition {
            Condition::Full => &self.full,
            Condition::Curated => &self.curated,
        };
        map.get(&question_id)
            .map(|runs| runs.iter().filter(|ok| **ok).count())
            .unwrap_or(0)
    }

    pub fn total_correct(&self, condition: Condition) -> usize {
        let map = match condition {
            Condition::Full => &self.full,
            Condition::Curated => &self.curated,
        };
        map.values()
            .map(|runs| runs.iter().filter(|ok| **ok).count())
            .sum()
    }

    pub fn trial_count(&self, condition: Condition) -> usize {
        let map = match condition {
            Condition::Full => &self.full,
            Condition::Curated => &self.curated,
        };
        map.values().map(Vec::len).sum()
    }
}

/// Overall accuracy percentages for the two conditions.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Accuracy {
    pub full: f64,
    pub curated: f64,
    pub delta: f64,
}

impl Accuracy {
    /// `total_trials` is `num_questions * runs`, the denominator for both
    /// conditions.
    pub fn compute(results: &TrialResults, total_trials: usize) -> Self {
        let pct = |correct: usize| (correct as f64 / total_trials as f64) * 100.0;
        let full = pct(results.total_correct(Condition::Full));
        let curated = pct(results.total_correct(Condition::Curated));
        Self {
            full,
            curated,
            delta: curated - full,
        }
    }

    /// One-line natural-language verdict for the report footer.
    pub fn verdict(&self) -> String {
        if self.delta > 0.0 {
            format!(
                "Curated context outperformed full context by {:.1} percentage points.",
                self.delta
            )
        } else if self.delta == 0.0 {
            "No difference between conditions.".to_string()
        } else {
            format!(
                "Full context outperformed curated context by {:.1} percentage points.",
                -self.delta
            )
        }
    }
}

/// The single immutable document persisted at the end of a run. Each run
/// overwrites the prior record at the same path.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentRecord {
    pub model: String,
    pub runs: usize,
    pub temperature: f32,
    pub conversation_turns: usize,
    pub full_context_words: usize,
    pub results: TrialResults,
    pub accuracy: Accuracy,
}

impl ExperimentRecord {
    pub fn new(
        model: String,
        runs: usize,
        temperature: f32,
        conversation_turns: usize,
        full_context_words: usize,
        results: TrialResults,
        num_questions: usize,
    ) -> Self {
        let accuracy = Accuracy::compute(&results, num_questions * runs);
        Self {
            model,
            runs,
            temperature,
            conversation_turns,
            full_context_words,
            results,
            accuracy,
        }
    }

    /// Write the record as pretty JSON, replacing any prior file.
    pub fn save(&self, path: &Path) -> BenchResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| BenchError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }
}
