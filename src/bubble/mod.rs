pub mod columns;
pub mod detector;
pub mod fill;
pub mod rows;
pub mod select;

use tracing::debug;

use crate::core::config::SheetConfig;
use crate::core::model::{AnswerRecord, Page};

use columns::order_rows;
use detector::detect_circles;
use fill::score_row;
use rows::{answer_rows, group_into_rows, split_at_gaps};
use select::{select_answer, SelectionRule};

/// What the bubble pass found on one page. Question numbers in `records`
/// start at 1 for every page; `rows_read` is how many numbers the page used.
#[derive(Debug, Clone, PartialEq)]
pub struct PageAnswers {
    pub rows_read: usize,
    pub records: Vec<AnswerRecord>,
}

impl PageAnswers {
    fn nothing() -> Self {
        Self {
            rows_read: 0,
            records: Vec::new(),
        }
    }

    pub fn marked_count(&self) -> usize {
        self.records.iter().filter(|r| r.answer.is_some()).count()
    }
}

/// Run detection, grouping, ordering, scoring and selection on one page.
///
/// Pages without circles, or without usable answer rows, simply yield no
/// records.
pub fn analyze_page(page: &mut Page, config: &SheetConfig) -> PageAnswers {
    page.circles = detect_circles(&page.image, config);
    if page.circles.is_empty() {
        debug!(page = page.index + 1, "no bubbles on page");
        return PageAnswers::nothing();
    }

    let grouped = split_at_gaps(
        group_into_rows(&page.circles, config.row_tolerance()),
        config.column_gap(),
    );
    let ordered = order_rows(answer_rows(&grouped));
    if ordered.rows.is_empty() {
        debug!(
            page = page.index + 1,
            circles = page.circles.len(),
            rows = grouped.len(),
            "no four-option rows on page"
        );
        return PageAnswers::nothing();
    }

    let rule = SelectionRule::from_config(config);
    let border = config.border();
    let mut records = Vec::with_capacity(ordered.rows.len());
    for (idx, mut row) in ordered.rows.into_iter().enumerate() {
        score_row(&page.image, &mut row, border);
        records.push(AnswerRecord {
            question_number: idx as u32 + 1,
            answer: select_answer(&row, rule),
        });
    }

    let answers = PageAnswers {
        rows_read: records.len(),
        records,
    };
    debug!(
        page = page.index + 1,
        layout = ?ordered.layout,
        rows = answers.rows_read,
        marked = answers.marked_count(),
        "page analyzed"
    );
    answers
}
