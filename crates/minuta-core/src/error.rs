//! Error types for the minuta-core library.

use thiserror::Error;

/// Main error type for the minuta library.
#[derive(Error, Debug)]
pub enum MinutaError {
    /// PDF reading error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Placeholder catalog error.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// PDF output error.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Invalid assembly input.
    #[error("invalid input: {0}")]
    Assembly(#[from] AssemblyError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to reading PDF documents.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to extract images from PDF.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// OCR is disabled or no backend is configured.
    #[error("OCR backend unavailable: {0}")]
    Unavailable(String),

    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Page rasterization failed.
    #[error("failed to rasterize pages: {0}")]
    Rasterize(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Temporary workspace could not be prepared.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to the placeholder catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog has no tokens.
    #[error("catalog is empty")]
    Empty,

    /// A token is not wrapped in the placeholder delimiters.
    #[error("token {0:?} is not wrapped in '¿' and '>'")]
    Malformed(String),

    /// A token appears more than once.
    #[error("duplicate token {0:?}")]
    Duplicate(String),

    /// The search pattern for a token could not be compiled.
    #[error("invalid pattern for {token:?}: {reason}")]
    Pattern { token: String, reason: String },

    /// The resolver settings cannot produce usable patterns.
    #[error("invalid resolver settings: {0}")]
    Settings(String),

    /// The catalog file could not be read.
    #[error("failed to load catalog: {0}")]
    Load(String),
}

/// Errors related to writing the output PDF.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Page geometry leaves no room for text.
    #[error("invalid page layout: {0}")]
    Layout(String),

    /// Content stream encoding failed.
    #[error("failed to encode page content: {0}")]
    Encode(String),

    /// Serializing the document failed.
    #[error("failed to write PDF: {0}")]
    Write(String),
}

/// Input validation errors raised before any extraction work.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    /// No documents were supplied.
    #[error("at least one document is required")]
    NoDocuments,

    /// The template is missing or blank.
    #[error("the draft template is empty")]
    EmptyTemplate,
}

/// Result type for the minuta library.
pub type Result<T> = std::result::Result<T, MinutaError>;
