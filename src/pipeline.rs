use std::path::{Path, PathBuf};

use anyhow::Result;
use image::GrayImage;
use rayon::prelude::*;
use tracing::info;

use crate::bubble::{analyze_page, PageAnswers};
use crate::core::config::{NumberingMode, SheetConfig};
use crate::core::model::{AnswerRecord, ExtractionResult, ExtractionSource, MarkedAnswer, Page};
use crate::export::{Exporter, JsonExporter, TextExporter};
use crate::merge::{merge_records, renumber};
use crate::ocr::{self, OcrBridge, TextRecognizer};
use crate::raster::{PageRenderer, PdfReader, Rasterizer};

/// Outcome of the bubble pass over a whole document. `Empty` means no row
/// anywhere carried a confident mark, which sends the document to OCR.
#[derive(Debug, Clone, PartialEq)]
pub enum BubbleOutcome {
    Found(Vec<AnswerRecord>),
    Empty,
}

/// Extraction driver, generic over the PDF and OCR backends.
pub struct AnswerSheetReader<R = PageRenderer, T = OcrBridge> {
    config: SheetConfig,
    rasterizer: R,
    recognizer: T,
}

impl AnswerSheetReader {
    /// Reader backed by `pdftoppm` and `tesseract`.
    pub fn new(config: SheetConfig) -> Self {
        let recognizer = OcrBridge::new()
            .with_lang(config.ocr_lang.clone())
            .with_dpi(config.ocr_dpi);
        Self {
            config,
            rasterizer: PageRenderer::new(),
            recognizer,
        }
    }
}

impl<R: Rasterizer, T: TextRecognizer> AnswerSheetReader<R, T> {
    pub fn with_backends(config: SheetConfig, rasterizer: R, recognizer: T) -> Self {
        Self {
            config,
            rasterizer,
            recognizer,
        }
    }

    pub fn extract(&self, pdf_path: &Path) -> Result<ExtractionResult> {
        let pdf = PdfReader::open(pdf_path)?;
        info!(input = %pdf_path.display(), dpi = self.config.dpi, "extracting answers");

        let pages = self.rasterizer.rasterize(&pdf, self.config.dpi)?;
        let page_count = pages.len();

        let result = match self.bubble_pass(pages) {
            BubbleOutcome::Found(records) => ExtractionResult {
                source: ExtractionSource::Bubbles,
                page_count,
                records: merge_records(records),
            },
            BubbleOutcome::Empty => {
                info!("bubble detection found no answers, falling back to OCR");
                let ocr_pages = self.rasterizer.rasterize(&pdf, self.config.ocr_dpi)?;
                let records = ocr::extract_from_pages(
                    &self.recognizer,
                    &ocr_pages,
                    self.config.max_question_number,
                );
                let records = merge_records(records);
                if records.is_empty() {
                    ExtractionResult::empty(page_count)
                } else {
                    ExtractionResult {
                        source: ExtractionSource::Ocr,
                        page_count,
                        records,
                    }
                }
            }
        };

        info!(
            source = ?result.source,
            pages = result.page_count,
            answered = result.answers().len(),
            blank = result.blank_questions().len(),
            "extraction finished"
        );
        Ok(result)
    }

    /// Analyze pages in parallel and concatenate their records in page order.
    pub fn bubble_pass(&self, images: Vec<GrayImage>) -> BubbleOutcome {
        let config = &self.config;
        let per_page: Vec<PageAnswers> = images
            .into_par_iter()
            .enumerate()
            .map(|(idx, image)| {
                let mut page = Page::new(idx, image);
                analyze_page(&mut page, config)
            })
            .collect();

        let mut offset = 0u32;
        let mut stream = Vec::new();
        for page in per_page {
            let records = match config.numbering {
                NumberingMode::PerPage => page.records,
                NumberingMode::Continuous => renumber(page.records, offset),
            };
            offset += page.rows_read as u32;
            stream.extend(records);
        }

        if stream.iter().any(|r| r.answer.is_some()) {
            BubbleOutcome::Found(stream)
        } else {
            BubbleOutcome::Empty
        }
    }
}

/// Marked answers of a bubble sheet with the default template settings.
/// Questions without a confident mark are left out.
pub fn extract_answers_from_pdf(pdf_path: impl AsRef<Path>) -> Result<Vec<MarkedAnswer>> {
    Ok(extract_with_config(pdf_path, &SheetConfig::default())?.answers())
}

pub fn extract_with_config(
    pdf_path: impl AsRef<Path>,
    config: &SheetConfig,
) -> Result<ExtractionResult> {
    config.validate()?;
    AnswerSheetReader::new(config.clone()).extract(pdf_path.as_ref())
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub sheet: SheetConfig,
}

impl PipelineConfig {
    pub fn new(input: PathBuf, output: PathBuf, sheet: SheetConfig) -> Self {
        Self {
            input,
            output,
            sheet,
        }
    }
}

pub fn build_result(config: &PipelineConfig) -> Result<ExtractionResult> {
    extract_with_config(&config.input, &config.sheet)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Text,
}

pub fn export_result(result: &ExtractionResult, output: &Path, formats: &[ExportFormat]) -> Result<()> {
    for format in formats {
        match format {
            ExportFormat::Json => JsonExporter::new(output.to_path_buf()).export(result)?,
            ExportFormat::Text => TextExporter::new(output.to_path_buf()).export(result)?,
        }
    }
    Ok(())
}

/// Extract `config.input` and write every requested format to `config.output`.
pub fn run_pipeline(config: &PipelineConfig, formats: &[ExportFormat]) -> Result<ExtractionResult> {
    let result = build_result(config)?;
    export_result(&result, &config.output, formats)?;
    Ok(result)
}
