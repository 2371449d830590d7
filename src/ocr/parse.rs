use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::core::model::{AnswerRecord, OptionLabel};

/// Matches `Q3: B`, `q12 - d`, `3. C`, `7 A`: an optional Q, the question
/// number, at least one separator, then a single option letter.
fn answer_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:[Qq])?\s?([0-9]+)[:.\-\s]+([A-Da-d])\b").expect("answer pattern is valid")
    })
}

/// Pull `(question, option)` pairs out of recognized page text, in reading
/// order. Question numbers outside `1..=max_question` are dropped.
pub fn parse_answers(text: &str, max_question: u32) -> Vec<AnswerRecord> {
    // Folds full-width digits and punctuation into ASCII.
    let normalized: String = text.nfkc().collect();

    answer_pattern()
        .captures_iter(&normalized)
        .filter_map(|caps| {
            let number: u32 = caps.get(1)?.as_str().parse().ok()?;
            if !(1..=max_question).contains(&number) {
                return None;
            }
            let letter = caps.get(2)?.as_str().chars().next()?;
            OptionLabel::from_char(letter).map(|label| AnswerRecord::marked(number, label))
        })
        .collect()
}
