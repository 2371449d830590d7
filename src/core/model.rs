use std::fmt;
use std::str::FromStr;

use image::GrayImage;
use serde::{Deserialize, Serialize};

/// Answer option printed on the sheet, left to right.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    pub const ALL: [OptionLabel; 4] = [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];

    /// Label for the bubble at `idx` within a left-to-right row.
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn as_char(&self) -> char {
        match self {
            OptionLabel::A => 'A',
            OptionLabel::B => 'B',
            OptionLabel::C => 'C',
            OptionLabel::D => 'D',
        }
    }

    /// Case-insensitive parse of a single letter.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(OptionLabel::A),
            'B' => Some(OptionLabel::B),
            'C' => Some(OptionLabel::C),
            'D' => Some(OptionLabel::D),
            _ => None,
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for OptionLabel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Self::from_char(c).ok_or_else(|| anyhow::anyhow!("not an answer option: {s}"))
            }
            _ => anyhow::bail!("not an answer option: {s}"),
        }
    }
}

/// A detected bubble. `fill_score` stays `None` until the row it belongs to
/// has been scored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub x: i32,
    pub y: i32,
    pub radius: i32,
    pub fill_score: Option<f32>,
}

impl Circle {
    pub fn new(x: i32, y: i32, radius: i32) -> Self {
        Self {
            x,
            y,
            radius,
            fill_score: None,
        }
    }

    pub fn with_fill(mut self, fill_score: f32) -> Self {
        self.fill_score = Some(fill_score);
        self
    }
}

/// Circles believed to belong to one question, ordered left to right.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub circles: Vec<Circle>,
}

impl Row {
    pub fn new(mut circles: Vec<Circle>) -> Self {
        circles.sort_by_key(|c| (c.x, c.y));
        Self { circles }
    }

    pub fn len(&self) -> usize {
        self.circles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }

    pub fn avg_x(&self) -> f32 {
        if self.circles.is_empty() {
            return 0.0;
        }
        self.circles.iter().map(|c| c.x as f32).sum::<f32>() / self.circles.len() as f32
    }

    pub fn avg_y(&self) -> f32 {
        if self.circles.is_empty() {
            return 0.0;
        }
        self.circles.iter().map(|c| c.y as f32).sum::<f32>() / self.circles.len() as f32
    }

    pub fn min_x(&self) -> Option<i32> {
        self.circles.iter().map(|c| c.x).min()
    }

    pub fn max_x(&self) -> Option<i32> {
        self.circles.iter().map(|c| c.x).max()
    }
}

/// One rasterized PDF page and what was found on it.
#[derive(Debug, Clone)]
pub struct Page {
    pub index: usize,
    pub image: GrayImage,
    pub circles: Vec<Circle>,
}

impl Page {
    pub fn new(index: usize, image: GrayImage) -> Self {
        Self {
            index,
            image,
            circles: Vec::new(),
        }
    }
}

/// Result for one question. `answer == None` means the row was read but no
/// bubble was confidently marked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerRecord {
    pub question_number: u32,
    pub answer: Option<OptionLabel>,
}

impl AnswerRecord {
    pub fn marked(question_number: u32, answer: OptionLabel) -> Self {
        Self {
            question_number,
            answer: Some(answer),
        }
    }

    pub fn blank(question_number: u32) -> Self {
        Self {
            question_number,
            answer: None,
        }
    }
}

/// Entry of the flat external contract: only questions with a mark.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkedAnswer {
    pub question_number: u32,
    pub answer: OptionLabel,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionSource {
    Bubbles,
    Ocr,
    Nothing,
}

/// Merged, sorted result of one extraction call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionResult {
    pub source: ExtractionSource,
    pub page_count: usize,
    pub records: Vec<AnswerRecord>,
}

impl ExtractionResult {
    pub fn empty(page_count: usize) -> Self {
        Self {
            source: ExtractionSource::Nothing,
            page_count,
            records: Vec::new(),
        }
    }

    pub fn answers(&self) -> Vec<MarkedAnswer> {
        self.records
            .iter()
            .filter_map(|r| {
                r.answer.map(|answer| MarkedAnswer {
                    question_number: r.question_number,
                    answer,
                })
            })
            .collect()
    }

    /// Questions whose row was read but carried no confident mark.
    pub fn blank_questions(&self) -> Vec<u32> {
        self.records
            .iter()
            .filter(|r| r.answer.is_none())
            .map(|r| r.question_number)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_labels_follow_row_order() {
        assert_eq!(OptionLabel::from_index(0), Some(OptionLabel::A));
        assert_eq!(OptionLabel::from_index(3), Some(OptionLabel::D));
        assert_eq!(OptionLabel::from_index(4), None);
        assert_eq!("c".parse::<OptionLabel>().unwrap(), OptionLabel::C);
        assert!("E".parse::<OptionLabel>().is_err());
        assert!("AB".parse::<OptionLabel>().is_err());
    }

    #[test]
    fn answers_skip_blank_records() {
        let result = ExtractionResult {
            source: ExtractionSource::Bubbles,
            page_count: 1,
            records: vec![
                AnswerRecord::marked(1, OptionLabel::B),
                AnswerRecord::blank(2),
                AnswerRecord::marked(3, OptionLabel::D),
            ],
        };
        let answers = result.answers();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[1].question_number, 3);
        assert_eq!(result.blank_questions(), vec![2]);
    }

    #[test]
    fn label_serializes_as_letter() {
        let json = serde_json::to_string(&AnswerRecord::marked(4, OptionLabel::A)).unwrap();
        assert_eq!(json, r#"{"question_number":4,"answer":"A"}"#);
    }
}
