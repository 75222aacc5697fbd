//! crates/flash_core/src/qa.rs
//!
//! Turns pasted study material into a prompt, and turns the model's reply back
//! into question/answer pairs.
//!
//! The split is a best-effort heuristic: the model is asked for questions and
//! answers "one after another" but nothing forces it to put each pair on one
//! line, so a reply that wraps an answer onto its own line yields a pair with
//! a question made of answer text and an empty answer.

use crate::domain::QAPair;

const STUDY_PROMPT_TEMPLATE: &str = concat!(
    "Extract the main points from the following text and turn them into questions ",
    "and answers one after another that a student can use for study purposes:\n\n{text}",
);

/// Builds the prompt sent to the text generator for one submission.
pub fn build_study_prompt(text: &str) -> String {
    STUDY_PROMPT_TEMPLATE.replace("{text}", text)
}

/// Splits generated text into one `QAPair` per non-blank line.
///
/// Each line is cut at its first `?`: the part before it (trimmed, with the `?`
/// put back) is the question, the rest (trimmed) is the answer. A line with no
/// `?` becomes a question with an empty answer.
pub fn parse_qa_pairs(text: &str) -> Vec<QAPair> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> QAPair {
    let mut parts = line.splitn(2, '?');
    let question = parts.next().unwrap_or_default().trim();
    let answer = parts.next().map(str::trim).unwrap_or_default();
    QAPair {
        question: format!("{}?", question),
        answer: answer.to_string(),
    }
}
