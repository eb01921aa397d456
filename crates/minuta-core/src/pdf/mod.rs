//! PDF processing: reading uploaded documents and writing the final draft.

mod reader;
mod writer;

pub use reader::PdfReader;
pub use writer::{PdfWriter, encode_win_ansi, wrap_line};

use crate::error::PdfError;
use image::DynamicImage;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF reading implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Embedded text of every page, in page order.
    fn extract_page_texts(&self) -> Result<Vec<String>>;

    /// Extract embedded images from a page (1-based).
    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>>;

    /// Best raster representation of a page for OCR.
    fn render_page(&self, page: u32) -> Result<DynamicImage>;
}
