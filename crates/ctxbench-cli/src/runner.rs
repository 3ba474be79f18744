//! The experiment loop: two conditions per question, `runs` trials each,
//! fully sequential.
//!
//! Trial independence is the one hard rule here: a failed model query is
//! printed distinctly, recorded as an incorrect trial, and the loop moves
//! on. Nothing short of invalid input data aborts a run.

use ctxbench_core::{
    score_answer, word_count, Condition, Dataset, ExperimentRecord, ModelQuery, Question,
    TrialResults, Turn,
};

/// Effective settings for one run, after config and CLI flags merge.
/// Carried into the persisted record verbatim.
pub struct RunSettings {
    pub model: String,
    pub runs: usize,
    pub temperature: f32,
}

/// Execute the full two-condition comparison and return the record.
/// Progress is streamed to stdout as trials complete.
pub fn run_experiment(
    dataset: &Dataset,
    model: &dyn ModelQuery,
    settings: &RunSettings,
) -> ExperimentRecord {
    // Shared baseline for every question's "full" condition.
    let full_words = word_count(&dataset.conversation);
    let mut results = TrialResults::default();

    for q in &dataset.questions {
        // Validation guarantees the thread exists; an empty slice keeps
        // the trials going if that ever changes.
        let thread: &[Turn] = dataset.thread(q).unwrap_or(&[]);
        let curated_words = word_count(thread);

        println!("Q{}: {}", q.id, q.question);
        println!("  Expected: {}", q.expected);
        println!(
            "  Thread: {} (~{curated_words} words vs ~{full_words} full)",
            q.thread
        );

        run_condition(
            model,
            Condition::Full,
            &dataset.conversation,
            q,
            settings.runs,
            &mut results,
        );
        run_condition(model, Condition::Curated, thread, q, settings.runs, &mut results);

        println!();
    }

    ExperimentRecord::new(
        settings.model.clone(),
        settings.runs,
        settings.temperature,
        dataset.conversation.len(),
        full_words,
        results,
        dataset.questions.len(),
    )
}

fn run_condition(
    model: &dyn ModelQuery,
    condition: Condition,
    context: &[Turn],
    q: &Question,
    runs: usize,
    results: &mut TrialResults,
) {
    let label = match condition {
        Condition::Full => "Full   ",
        Condition::Curated => "Curated",
    };
    for run in 0..runs {
        match model.query(context, &q.question) {
            Ok(answer) => {
                let correct = score_answer(&answer, &q.keywords);
                results.record(condition, q.id, correct);
                let mark = if correct { "Y" } else { "N" };
                println!("  {label} run {}: [{mark}] {}...", run + 1, truncate(&answer, 80));
            }
            Err(e) => {
                println!("  {label} run {}: ERROR - {e}", run + 1);
                results.record(condition, q.id, false);
            }
        }
    }
}

/// Truncate to at most `max` characters, respecting char boundaries.
pub fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxbench_core::{QueryError, Role};
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    fn dataset() -> Dataset {
        let conversation = vec![
            Turn::new(Role::User, "Where should we deploy?"),
            Turn::new(Role::Assistant, "Frankfurt has the lowest latency."),
            Turn::new(Role::User, "What database did we pick?"),
            Turn::new(Role::Assistant, "Postgres 16 with pgvector."),
        ];
        let mut threads = BTreeMap::new();
        threads.insert("deploy".to_string(), conversation[0..2].to_vec());
        threads.insert("db".to_string(), conversation[2..4].to_vec());
        let questions = vec![
            Question {
                id: 1,
                question: "Where do we deploy?".into(),
                expected: "Frankfurt".into(),
                keywords: vec!["frankfurt".into()],
                thread: "deploy".into(),
            },
            Question {
                id: 2,
                question: "Which database?".into(),
                expected: "Postgres 16".into(),
                keywords: vec!["postgres".into(), "16".into()],
                thread: "db".into(),
            },
        ];
        Dataset {
            conversation,
            questions,
            threads,
        }
    }

    fn settings(runs: usize) -> RunSettings {
        RunSettings {
            model: "stub".into(),
            runs,
            temperature: 0.1,
        }
    }

    /// Answers every question correctly and records the context size of
    /// each call, in call order.
    struct EchoModel {
        context_sizes: RefCell<Vec<usize>>,
    }

    impl EchoModel {
        fn new() -> Self {
            Self {
                context_sizes: RefCell::new(Vec::new()),
            }
        }
    }

    impl ModelQuery for EchoModel {
        fn query(&self, context: &[Turn], question: &str) -> Result<String, QueryError> {
            self.context_sizes.borrow_mut().push(context.len());
            let answer = if question.contains("deploy") {
                "We deploy to Frankfurt."
            } else {
                "Postgres 16."
            };
            Ok(answer.to_string())
        }
    }

    /// Fails on selected zero-based call indices, succeeds otherwise.
    struct FlakyModel {
        calls: RefCell<usize>,
        fail_on: Vec<usize>,
    }

    impl ModelQuery for FlakyModel {
        fn query(&self, _context: &[Turn], _question: &str) -> Result<String, QueryError> {
            let n = *self.calls.borrow();
            *self.calls.borrow_mut() = n + 1;
            if self.fail_on.contains(&n) {
                Err(QueryError::Transport("connection refused".into()))
            } else {
                Ok("frankfurt postgres 16".to_string())
            }
        }
    }

    #[test]
    fn test_exactly_runs_trials_per_condition() {
        let ds = dataset();
        let record = run_experiment(&ds, &EchoModel::new(), &settings(3));
        for q in &ds.questions {
            assert_eq!(record.results.full[&q.id].len(), 3);
            assert_eq!(record.results.curated[&q.id].len(), 3);
        }
        assert_eq!(record.results.trial_count(Condition::Full), 6);
        assert_eq!(record.results.trial_count(Condition::Curated), 6);
    }

    #[test]
    fn test_full_gets_conversation_curated_gets_thread() {
        let ds = dataset();
        let model = EchoModel::new();
        run_experiment(&ds, &model, &settings(2));

        // Per question: 2 full trials (4 turns), then 2 curated (2 turns).
        let sizes = model.context_sizes.borrow();
        assert_eq!(*sizes, vec![4, 4, 2, 2, 4, 4, 2, 2]);
    }

    #[test]
    fn test_correct_answers_score_100() {
        let ds = dataset();
        let record = run_experiment(&ds, &EchoModel::new(), &settings(3));
        assert_eq!(record.accuracy.full, 100.0);
        assert_eq!(record.accuracy.curated, 100.0);
        assert_eq!(record.accuracy.delta, 0.0);
    }

    #[test]
    fn test_single_failure_does_not_abort_run() {
        let ds = dataset();
        // Call 0 is Q1's first full trial; everything after must proceed.
        let model = FlakyModel {
            calls: RefCell::new(0),
            fail_on: vec![0],
        };
        let record = run_experiment(&ds, &model, &settings(3));

        assert_eq!(*model.calls.borrow(), 12);
        assert_eq!(record.results.trial_count(Condition::Full), 6);
        assert_eq!(record.results.trial_count(Condition::Curated), 6);
        // Only Q1's full numerator lost the one trial.
        assert_eq!(record.results.correct(Condition::Full, 1), 2);
        assert_eq!(record.results.correct(Condition::Curated, 1), 3);
        assert_eq!(record.results.correct(Condition::Full, 2), 3);
        assert_eq!(record.results.full[&1], vec![false, true, true]);
    }

    #[test]
    fn test_record_carries_settings_and_sizes() {
        let ds = dataset();
        let record = run_experiment(&ds, &EchoModel::new(), &settings(1));
        assert_eq!(record.model, "stub");
        assert_eq!(record.runs, 1);
        assert_eq!(record.conversation_turns, 4);
        assert_eq!(record.full_context_words, word_count(&ds.conversation));
    }

    #[test]
    fn test_rerun_overwrites_results_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("results.json");
        let ds = dataset();

        // First run: every first full trial fails.
        let flaky = FlakyModel {
            calls: RefCell::new(0),
            fail_on: vec![0, 6],
        };
        run_experiment(&ds, &flaky, &settings(3)).save(&out).unwrap();

        // Second run with a clean model replaces the record outright.
        run_experiment(&ds, &EchoModel::new(), &settings(3))
            .save(&out)
            .unwrap();

        let on_disk: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(on_disk["accuracy"]["full"], 100.0);
        assert_eq!(on_disk["results"]["full"]["1"].as_array().unwrap().len(), 3);
        assert_eq!(on_disk["runs"], 3);
    }

    #[test]
    fn test_truncate_char_boundary() {
        assert_eq!(truncate("hello", 80), "hello");
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("héllo", 2), "hé");
    }
}
