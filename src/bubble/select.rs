use crate::core::config::SheetConfig;
use crate::core::model::{OptionLabel, Row};

/// Thresholds the selector applies to a scored row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRule {
    /// Share of the lightest-to-darkest spread a bubble must sit below the
    /// lightest one to count as marked.
    pub margin_ratio: f32,
    /// Spreads below this are treated as an unmarked row.
    pub min_contrast: f32,
}

impl SelectionRule {
    pub fn from_config(config: &SheetConfig) -> Self {
        Self {
            margin_ratio: config.fill_margin_ratio,
            min_contrast: config.min_fill_contrast,
        }
    }
}

impl Default for SelectionRule {
    fn default() -> Self {
        Self {
            margin_ratio: 0.3,
            min_contrast: 0.0,
        }
    }
}

/// Pick the marked option from fill scores ordered A, B, C, D.
///
/// `threshold = max − (max − min) × margin_ratio`. The darkest bubble wins
/// when it is below the threshold and is the only one that is; equal
/// darkness across the row, or several bubbles below the threshold, gives
/// `None`.
pub fn select_from_scores(fills: &[f32], rule: SelectionRule) -> Option<OptionLabel> {
    if fills.is_empty() || fills.len() > OptionLabel::ALL.len() {
        return None;
    }
    if fills.iter().any(|f| !f.is_finite()) {
        return None;
    }

    let (darkest_idx, min_fill) = fills
        .iter()
        .copied()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(&b.1))?;
    let max_fill = fills.iter().copied().fold(f32::MIN, f32::max);

    let spread = max_fill - min_fill;
    if spread < rule.min_contrast {
        return None;
    }
    let threshold = max_fill - spread * rule.margin_ratio;
    if min_fill >= threshold {
        return None;
    }
    if fills.iter().filter(|&&f| f < threshold).count() > 1 {
        return None;
    }
    OptionLabel::from_index(darkest_idx)
}

/// Select on a scored four-circle row. Rows of another size, or with an
/// unscored circle, never produce an answer.
pub fn select_answer(row: &Row, rule: SelectionRule) -> Option<OptionLabel> {
    if row.len() != OptionLabel::ALL.len() {
        return None;
    }
    let fills: Option<Vec<f32>> = row.circles.iter().map(|c| c.fill_score).collect();
    select_from_scores(&fills?, rule)
}
