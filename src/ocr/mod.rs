pub mod bridge;
pub mod parse;

pub use bridge::OcrBridge;

use anyhow::Result;
use image::GrayImage;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::core::model::AnswerRecord;

/// Whole-page text recognition.
pub trait TextRecognizer: Sync {
    fn recognize(&self, page: &GrayImage) -> Result<String>;
}

/// Recognize every page and collect answer pairs in page order. A page whose
/// recognition fails is logged and contributes nothing.
pub fn extract_from_pages<T: TextRecognizer + ?Sized>(
    recognizer: &T,
    pages: &[GrayImage],
    max_question: u32,
) -> Vec<AnswerRecord> {
    let per_page: Vec<Vec<AnswerRecord>> = pages
        .par_iter()
        .enumerate()
        .map(|(idx, page)| match recognizer.recognize(page) {
            Ok(text) => {
                let records = parse::parse_answers(&text, max_question);
                debug!(page = idx + 1, matches = records.len(), "OCR page parsed");
                records
            }
            Err(err) => {
                warn!(page = idx + 1, "OCR failed, skipping page: {err:#}");
                Vec::new()
            }
        })
        .collect();
    per_page.into_iter().flatten().collect()
}
