//! Keyword-containment scoring.
//!
//! Deliberately crude: case-folded substring containment, all keywords
//! required, no stemming, no word boundaries, no partial credit. Near-miss
//! phrasing scores false and spurious substrings score true; that tradeoff
//! is part of the measured signal and must stay as-is.

/// True iff every keyword, lowercased, occurs in the lowercased answer.
pub fn score_answer(answer: &str, keywords: &[String]) -> bool {
    let answer_lower = answer.to_lowercase();
    keywords
        .iter()
        .all(|kw| answer_lower.contains(&kw.to_lowercase()))
}
