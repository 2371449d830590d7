use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::core::model::{ExtractionResult, ExtractionSource, MarkedAnswer};
use crate::export::Exporter;

#[derive(Debug, Clone)]
pub struct JsonExporter {
    out_dir: PathBuf,
}

impl JsonExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

/// On-disk shape of `answers.json`.
#[derive(Debug, Serialize)]
struct AnswersFile {
    source: ExtractionSource,
    page_count: usize,
    answers: Vec<MarkedAnswer>,
    blank_questions: Vec<u32>,
}

impl Exporter for JsonExporter {
    fn export(&self, result: &ExtractionResult) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join("answers.json");
        let file = AnswersFile {
            source: result.source,
            page_count: result.page_count,
            answers: result.answers(),
            blank_questions: result.blank_questions(),
        };
        let data = serde_json::to_string_pretty(&file)?;
        fs::write(path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{AnswerRecord, OptionLabel};

    #[test]
    fn writes_answers_and_blanks() -> Result<()> {
        let out = tempfile::tempdir()?;
        let result = ExtractionResult {
            source: ExtractionSource::Bubbles,
            page_count: 1,
            records: vec![AnswerRecord::marked(1, OptionLabel::B), AnswerRecord::blank(2)],
        };

        JsonExporter::new(out.path().to_path_buf()).export(&result)?;

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.path().join("answers.json"))?)?;
        assert_eq!(value["source"], "bubbles");
        assert_eq!(value["answers"][0]["answer"], "B");
        assert_eq!(value["blank_questions"][0], 2);
        Ok(())
    }
}
