use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// DPI at which every pixel-valued field of [`SheetConfig`] is expressed.
pub const REFERENCE_DPI: u32 = 200;

/// Fill contrast that separates a pencil mark from scan noise (gray levels).
pub const SCAN_MIN_FILL_CONTRAST: f32 = 40.0;

/// How question numbers continue from one page to the next.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NumberingMode {
    /// Every page restarts at question 1; later pages win duplicates.
    #[default]
    PerPage,
    /// Numbering carries over across pages.
    Continuous,
}

/// Tuning knobs for one answer-sheet template.
///
/// Pixel values are given at [`REFERENCE_DPI`] and rescaled to `dpi` by the
/// accessor methods, so raising the render resolution does not require
/// retuning the template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SheetConfig {
    /// Render resolution for bubble detection.
    pub dpi: u32,
    /// Render resolution for the OCR fallback.
    pub ocr_dpi: u32,
    /// Gaussian sigma applied before edge detection.
    pub blur_sigma: f32,
    /// Canny hysteresis thresholds.
    pub canny_low: f32,
    pub canny_high: f32,
    /// Inverse accumulator resolution (1.0 = one cell per pixel).
    pub accumulator_dp: f32,
    /// Minimum votes in the 3x3 neighbourhood of a circle center.
    pub vote_threshold: u32,
    /// Minimum distance between two accepted circle centers (px).
    pub min_center_dist: f32,
    /// Bubble radius band (px).
    pub min_radius: u32,
    pub max_radius: u32,
    /// Fraction of a circle's circumference that must be backed by edge
    /// pixels for the radius to be accepted.
    pub min_edge_support: f32,
    /// Max vertical offset from the row anchor for a circle to join a row (px).
    pub row_tolerance_px: f32,
    /// Horizontal gap that separates two rows sharing a baseline (px).
    pub column_gap_px: f32,
    /// Band excluded from the fill sample to skip the printed outline (px).
    pub border_px: u32,
    /// Relative darkness margin used by the answer selector.
    pub fill_margin_ratio: f32,
    /// Rows with a smaller lightest-minus-darkest spread count as unmarked.
    /// 0 accepts any spread, which lets scanner noise in an empty row read
    /// as a mark; real scans want [`SCAN_MIN_FILL_CONTRAST`].
    pub min_fill_contrast: f32,
    pub numbering: NumberingMode,
    /// OCR matches above this question number are discarded.
    pub max_question_number: u32,
    /// Tesseract language string.
    pub ocr_lang: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            dpi: REFERENCE_DPI,
            ocr_dpi: 300,
            blur_sigma: 1.1,
            canny_low: 25.0,
            canny_high: 50.0,
            accumulator_dp: 1.2,
            vote_threshold: 30,
            min_center_dist: 20.0,
            min_radius: 8,
            max_radius: 25,
            min_edge_support: 0.3,
            row_tolerance_px: 15.0,
            column_gap_px: 150.0,
            border_px: 2,
            fill_margin_ratio: 0.3,
            min_fill_contrast: 0.0,
            numbering: NumberingMode::PerPage,
            max_question_number: 100,
            ocr_lang: "eng".to_string(),
        }
    }
}

impl SheetConfig {
    /// Defaults with the noise guard enabled; what the CLI starts from.
    pub fn for_scans() -> Self {
        Self {
            min_fill_contrast: SCAN_MIN_FILL_CONTRAST,
            ..Self::default()
        }
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: SheetConfig = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dpi == 0 || self.ocr_dpi == 0 {
            anyhow::bail!("dpi must be positive");
        }
        if self.min_radius == 0 || self.min_radius > self.max_radius {
            anyhow::bail!(
                "invalid radius band: {}..{}",
                self.min_radius,
                self.max_radius
            );
        }
        if !(0.0..=1.0).contains(&self.fill_margin_ratio) {
            anyhow::bail!(
                "fill_margin_ratio must be within 0..=1, got {}",
                self.fill_margin_ratio
            );
        }
        if self.min_fill_contrast.is_nan() || self.min_fill_contrast < 0.0 {
            anyhow::bail!(
                "min_fill_contrast must be non-negative, got {}",
                self.min_fill_contrast
            );
        }
        if self.accumulator_dp < 1.0 {
            anyhow::bail!("accumulator_dp must be >= 1.0");
        }
        if self.max_question_number == 0 {
            anyhow::bail!("max_question_number must be positive");
        }
        Ok(())
    }

    /// Convert a length given at [`REFERENCE_DPI`] to the configured DPI.
    pub fn scale_px(&self, value: f32) -> f32 {
        value * self.dpi as f32 / REFERENCE_DPI as f32
    }

    pub fn radius_band(&self) -> (i32, i32) {
        let min = self.scale_px(self.min_radius as f32).round().max(1.0) as i32;
        let max = self.scale_px(self.max_radius as f32).round() as i32;
        (min, max.max(min))
    }

    pub fn row_tolerance(&self) -> f32 {
        self.scale_px(self.row_tolerance_px)
    }

    pub fn column_gap(&self) -> f32 {
        self.scale_px(self.column_gap_px)
    }

    pub fn center_distance(&self) -> f32 {
        self.scale_px(self.min_center_dist)
    }

    pub fn border(&self) -> i32 {
        self.scale_px(self.border_px as f32).round() as i32
    }
}
