pub mod pdf_reader;
pub mod renderer;

pub use pdf_reader::PdfReader;
pub use renderer::PageRenderer;

use anyhow::Result;
use image::GrayImage;

/// Turns every page of a validated PDF into a grayscale raster, in page order.
pub trait Rasterizer: Sync {
    fn rasterize(&self, pdf: &PdfReader, dpi: u32) -> Result<Vec<GrayImage>>;
}
