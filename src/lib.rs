pub mod bubble;
pub mod core;
pub mod export;
pub mod merge;
pub mod ocr;
pub mod pipeline;
pub mod raster;

pub use core::error::InputError;
pub use core::model::{AnswerRecord, ExtractionResult, ExtractionSource, MarkedAnswer, OptionLabel};
pub use core::{NumberingMode, SheetConfig};
pub use pipeline::{extract_answers_from_pdf, extract_with_config, AnswerSheetReader};
