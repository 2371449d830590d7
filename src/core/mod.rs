pub mod config;
pub mod error;
pub mod geometry;
pub mod model;

pub use config::{NumberingMode, SheetConfig, REFERENCE_DPI, SCAN_MIN_FILL_CONTRAST};
pub use error::InputError;
