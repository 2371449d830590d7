use std::collections::BTreeMap;

use crate::core::model::AnswerRecord;

/// Collapse a record stream to one record per question number, sorted.
///
/// Among marked records the last one seen wins. A question that only ever
/// appears unmarked is kept as a blank record, and a blank never overrides an
/// earlier mark.
pub fn merge_records<I>(records: I) -> Vec<AnswerRecord>
where
    I: IntoIterator<Item = AnswerRecord>,
{
    let mut merged: BTreeMap<u32, AnswerRecord> = BTreeMap::new();
    for record in records {
        match merged.get(&record.question_number) {
            Some(existing) if existing.answer.is_some() && record.answer.is_none() => {}
            _ => {
                merged.insert(record.question_number, record);
            }
        }
    }
    merged.into_values().collect()
}

/// Shift page-local question numbers by `offset`.
pub fn renumber(records: Vec<AnswerRecord>, offset: u32) -> Vec<AnswerRecord> {
    records
        .into_iter()
        .map(|r| AnswerRecord {
            question_number: r.question_number + offset,
            ..r
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::OptionLabel::{A, B, C, D};
    use pretty_assertions::assert_eq;

    #[test]
    fn last_mark_wins_and_output_is_sorted() {
        let stream = vec![
            AnswerRecord::marked(3, A),
            AnswerRecord::marked(1, B),
            AnswerRecord::marked(3, C),
            AnswerRecord::marked(2, D),
        ];
        assert_eq!(
            merge_records(stream),
            vec![
                AnswerRecord::marked(1, B),
                AnswerRecord::marked(2, D),
                AnswerRecord::marked(3, C),
            ]
        );
    }

    #[test]
    fn blank_does_not_erase_a_mark() {
        let stream = vec![
            AnswerRecord::marked(1, A),
            AnswerRecord::blank(1),
            AnswerRecord::blank(2),
            AnswerRecord::marked(2, B),
            AnswerRecord::blank(3),
        ];
        assert_eq!(
            merge_records(stream),
            vec![
                AnswerRecord::marked(1, A),
                AnswerRecord::marked(2, B),
                AnswerRecord::blank(3),
            ]
        );
    }

    #[test]
    fn merging_twice_changes_nothing() {
        let stream = vec![
            AnswerRecord::marked(5, A),
            AnswerRecord::blank(4),
            AnswerRecord::marked(5, D),
            AnswerRecord::marked(1, C),
        ];
        let once = merge_records(stream.clone());
        let twice = merge_records(once.clone());
        assert_eq!(once, twice);
        assert_eq!(merge_records(stream), once);
    }

    #[test]
    fn renumber_shifts_every_record() {
        let shifted = renumber(vec![AnswerRecord::marked(1, A), AnswerRecord::blank(2)], 10);
        assert_eq!(shifted, vec![AnswerRecord::marked(11, A), AnswerRecord::blank(12)]);
    }
}
