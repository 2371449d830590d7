use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};
use image::{GrayImage, ImageFormat};

use crate::ocr::TextRecognizer;

/// Runs the `tesseract` command-line tool on a temporary PNG of the page.
#[derive(Debug, Clone)]
pub struct OcrBridge {
    binary: PathBuf,
    lang: String,
    dpi: Option<u32>,
}

impl OcrBridge {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            lang: "eng".to_string(),
            dpi: None,
        }
    }

    pub fn with_lang(mut self, lang: String) -> Self {
        self.lang = lang;
        self
    }

    /// Resolution hint passed to tesseract; PNGs written here carry none.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = Some(dpi);
        self
    }

    pub fn run(&self, page: &GrayImage) -> Result<String> {
        let mut tmp = tempfile::Builder::new()
            .prefix("bubblescan-ocr-")
            .suffix(".png")
            .tempfile()
            .with_context(|| "failed to create temp file for OCR")?;
        page.write_to(tmp.as_file_mut(), ImageFormat::Png)
            .with_context(|| "failed to write temp image for OCR")?;

        let mut cmd = Command::new(&self.binary);
        cmd.arg(tmp.path()).arg("stdout").arg("-l").arg(&self.lang);
        if let Some(dpi) = self.dpi {
            cmd.arg("--dpi").arg(dpi.to_string());
        }
        let output = cmd
            .output()
            .with_context(|| "failed to run tesseract (is it installed?)")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("tesseract failed: {}", stderr.trim());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for OcrBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRecognizer for OcrBridge {
    fn recognize(&self, page: &GrayImage) -> Result<String> {
        self.run(page)
    }
}
