use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::{AnswerRecord, ExtractionResult};
use crate::export::Exporter;

/// Plain `question: answer` listing, one line per question; blank questions
/// are written as `-`.
#[derive(Debug, Clone)]
pub struct TextExporter {
    out_dir: PathBuf,
}

impl TextExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    fn format_record(record: &AnswerRecord) -> String {
        match record.answer {
            Some(answer) => format!("{}: {}", record.question_number, answer),
            None => format!("{}: -", record.question_number),
        }
    }

    pub fn render(result: &ExtractionResult) -> String {
        let mut text = String::new();
        for record in &result.records {
            text.push_str(&Self::format_record(record));
            text.push('\n');
        }
        text
    }
}

impl Exporter for TextExporter {
    fn export(&self, result: &ExtractionResult) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        fs::write(self.out_dir.join("answers.txt"), Self::render(result))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{ExtractionSource, OptionLabel};
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_one_line_per_question() {
        let result = ExtractionResult {
            source: ExtractionSource::Ocr,
            page_count: 2,
            records: vec![
                AnswerRecord::marked(1, OptionLabel::C),
                AnswerRecord::blank(2),
                AnswerRecord::marked(3, OptionLabel::A),
            ],
        };
        assert_eq!(TextExporter::render(&result), "1: C\n2: -\n3: A\n");
    }
}
