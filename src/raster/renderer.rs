use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use image::GrayImage;
use rayon::prelude::*;
use tracing::debug;

use crate::raster::pdf_reader::PdfReader;
use crate::raster::Rasterizer;

/// Renders pages through poppler's `pdftoppm` into a scratch directory that
/// is removed when rendering finishes, whether it succeeded or not.
#[derive(Debug, Clone, Default)]
pub struct PageRenderer {
    scratch_root: Option<PathBuf>,
}

impl PageRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create scratch directories under `root` instead of the system temp dir.
    pub fn with_scratch_root(mut self, root: PathBuf) -> Self {
        self.scratch_root = Some(root);
        self
    }

    pub fn render_page(
        &self,
        pdf_path: &Path,
        page_idx: usize,
        dpi: u32,
        out_dir: &Path,
    ) -> Result<GrayImage> {
        // pdftoppm uses 1-based page indices
        let page_number = page_idx + 1;
        let prefix = out_dir.join(format!("page_{:04}", page_number));

        let output = Command::new("pdftoppm")
            .arg("-png")
            .arg("-gray")
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-f")
            .arg(page_number.to_string())
            .arg("-l")
            .arg(page_number.to_string())
            .arg("-singlefile")
            .arg(pdf_path)
            .arg(&prefix)
            .output()
            .with_context(|| "failed to invoke pdftoppm; is poppler-utils installed?")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("pdftoppm failed on page {page_number}: {}", stderr.trim());
        }

        // -singlefile writes exactly `<prefix>.png`
        let image_path = prefix.with_extension("png");
        let image = image::open(&image_path)
            .with_context(|| format!("failed to load rendered page {}", image_path.display()))?
            .to_luma8();
        debug!(
            page = page_number,
            width = image.width(),
            height = image.height(),
            dpi,
            "rendered page"
        );
        Ok(image)
    }
}

impl Rasterizer for PageRenderer {
    fn rasterize(&self, pdf: &PdfReader, dpi: u32) -> Result<Vec<GrayImage>> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("bubblescan-");
        let scratch = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .with_context(|| "failed to create scratch directory for rendering")?;

        let pages = pdf.page_count().and_then(|page_count| {
            (0..page_count)
                .into_par_iter()
                .map(|page_idx| self.render_page(pdf.path(), page_idx, dpi, scratch.path()))
                .collect::<Result<Vec<_>>>()
        });

        // Explicit close so a failed cleanup is at least visible in the logs.
        if let Err(err) = scratch.close() {
            tracing::warn!("failed to remove render scratch directory: {err}");
        }
        pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn scratch_directory_is_removed_after_a_failed_render() -> Result<()> {
        let root = tempfile::tempdir()?;
        let pdf_path = root.path().join("broken.pdf");
        fs::write(&pdf_path, b"%PDF-1.4\nthis body is not a PDF object graph\n")?;
        let scratch_root = root.path().join("scratch");
        fs::create_dir(&scratch_root)?;

        let pdf = PdfReader::open(&pdf_path)?;
        let renderer = PageRenderer::new().with_scratch_root(scratch_root.clone());

        // Fails in pdfinfo, or earlier when poppler is not installed.
        assert!(renderer.rasterize(&pdf, 72).is_err());
        let leftovers: Vec<_> = fs::read_dir(&scratch_root)?.collect();
        assert!(leftovers.is_empty(), "scratch left behind: {leftovers:?}");
        Ok(())
    }
}
