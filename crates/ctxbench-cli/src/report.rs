//! Console report: run header before the trials, summary table after.

use ctxbench_core::{Condition, Dataset, ExperimentRecord};

use crate::runner::truncate;

const WIDTH: usize = 70;

/// Experiment parameters, printed once before the first trial.
pub fn print_run_header(record_model: &str, dataset: &Dataset, runs: usize, temperature: f32) {
    println!("{}", "=".repeat(WIDTH));
    println!("Context Curation Experiment");
    println!("{}", "=".repeat(WIDTH));
    println!("Model: {record_model}");
    println!("Conversation turns: {}", dataset.conversation.len());
    println!("Questions: {}", dataset.questions.len());
    println!("Runs per condition: {runs}");
    println!("Temperature: {temperature}");
    println!();
    println!(
        "Full context size: ~{} words",
        ctxbench_core::word_count(&dataset.conversation)
    );
    println!();
}

/// Fixed-width summary: per-question counts, totals, signed delta, verdict.
pub fn print_report(dataset: &Dataset, record: &ExperimentRecord) {
    println!("{}", "=".repeat(WIDTH));
    println!("RESULTS SUMMARY");
    println!("{}", "=".repeat(WIDTH));
    println!("{:<4} {:<55} {:>8} {:>8}", "Q#", "Question", "Full", "Curated");
    println!("{}", "-".repeat(WIDTH));

    for q in &dataset.questions {
        println!(
            "{}",
            question_row(
                q.id,
                &q.question,
                record.results.correct(Condition::Full, q.id),
                record.results.correct(Condition::Curated, q.id),
                record.runs,
            )
        );
    }

    println!("{}", "-".repeat(WIDTH));
    println!(
        "{:<60} {:>5.1}%   {:>5.1}%",
        "TOTAL", record.accuracy.full, record.accuracy.curated
    );
    println!(
        "{:<60} {}{:.1}%",
        "DELTA",
        if record.accuracy.delta >= 0.0 { "+" } else { "" },
        record.accuracy.delta
    );
    println!();
    println!("{}", record.accuracy.verdict());
}

fn question_row(
    id: u32,
    question: &str,
    full_correct: usize,
    curated_correct: usize,
    runs: usize,
) -> String {
    format!(
        "Q{:<3} {:<55} {}/{}      {}/{}",
        id,
        truncate(question, 53),
        full_correct,
        runs,
        curated_correct,
        runs
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_row_counts() {
        let row = question_row(3, "Which database?", 1, 3, 3);
        assert!(row.starts_with("Q3 "));
        assert!(row.contains("Which database?"));
        assert!(row.contains("1/3"));
        assert!(row.contains("3/3"));
    }

    #[test]
    fn test_question_row_truncates_long_question() {
        let long = "x".repeat(100);
        let row = question_row(1, &long, 0, 0, 3);
        assert!(row.contains(&"x".repeat(53)));
        assert!(!row.contains(&"x".repeat(54)));
    }
}
