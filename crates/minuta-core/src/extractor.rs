//! Per-document text extraction: embedded text first, OCR as fallback.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{OcrError, PdfError};
use crate::models::config::{FallbackPolicy, MinutaConfig, PdfConfig};
use crate::models::document::{DocumentText, SourceDocument};
use crate::ocr::{OcrBackend, create_backend};
use crate::pdf::{PdfProcessor, PdfReader};

/// Turns one uploaded document into text. Never fails: problems are
/// reported through [`DocumentText::failure`].
pub trait TextExtractor: Send + Sync {
    fn extract(&self, document: &SourceDocument) -> DocumentText;
}

/// Extractor for PDF uploads.
pub struct PdfTextExtractor {
    max_pages: usize,
    fallback: FallbackPolicy,
    ocr: Option<Box<dyn OcrBackend>>,
}

impl PdfTextExtractor {
    /// Extractor without OCR.
    pub fn new(config: &PdfConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            fallback: config.fallback,
            ocr: None,
        }
    }

    /// Attach an OCR backend for the fallback path.
    pub fn with_ocr(mut self, backend: Box<dyn OcrBackend>) -> Self {
        self.ocr = Some(backend);
        self
    }

    /// Extractor with the configured OCR backend. A backend that cannot be
    /// created disables the fallback instead of failing startup.
    pub fn from_config(config: &MinutaConfig) -> Self {
        let extractor = Self::new(&config.pdf);
        match create_backend(&config.ocr) {
            Ok(Some(backend)) => extractor.with_ocr(backend),
            Ok(None) => extractor,
            Err(e) => {
                warn!("OCR fallback unavailable: {}", e);
                extractor
            }
        }
    }

    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }

    fn extract_direct(&self, data: &[u8]) -> Result<String, PdfError> {
        let reader = PdfReader::open(data)?;
        let mut pages = reader.extract_page_texts()?;
        if self.max_pages > 0 && pages.len() > self.max_pages {
            debug!("Limiting text extraction to {} of {} pages", self.max_pages, pages.len());
            pages.truncate(self.max_pages);
        }
        Ok(pages.join("\n"))
    }

    fn extract_ocr(&self, data: &[u8]) -> Result<String, OcrError> {
        let backend = self
            .ocr
            .as_ref()
            .ok_or_else(|| OcrError::Unavailable("OCR is disabled".to_string()))?;
        Ok(backend.recognize_pdf(data, self.max_pages)?.text())
    }

    fn needs_ocr(&self, direct: &Result<String, PdfError>) -> bool {
        match (self.fallback, direct) {
            (FallbackPolicy::Always, _) => true,
            (_, Err(_)) => true,
            (FallbackPolicy::OnFailureOrBlank, Ok(text)) => text.trim().is_empty(),
            (FallbackPolicy::OnFailure, Ok(_)) => false,
        }
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, document: &SourceDocument) -> DocumentText {
        let start = Instant::now();
        let direct = self.extract_direct(&document.data);

        if let Err(e) = &direct {
            warn!("Direct extraction failed for {}: {}", document.name, e);
        }

        if !self.needs_ocr(&direct) {
            let text = direct.unwrap_or_default();
            info!(
                "Extracted {} chars from {} (direct, {}ms)",
                text.len(),
                document.name,
                start.elapsed().as_millis()
            );
            return DocumentText::direct(text);
        }

        debug!("Running OCR on {}", document.name);
        let result = match (self.extract_ocr(&document.data), direct) {
            // With OCR forced, a blank OCR pass still defers to embedded text
            (Ok(ocr), Ok(text)) if ocr.trim().is_empty() && !text.trim().is_empty() => {
                DocumentText::direct(text)
            }
            (Ok(ocr), _) => DocumentText::ocr(ocr),
            (Err(e), Ok(text)) => {
                warn!("OCR failed for {}: {}", document.name, e);
                if text.trim().is_empty() {
                    DocumentText::failed(format!("no embedded text; {}", e))
                } else {
                    DocumentText::direct(text)
                }
            }
            (Err(ocr_err), Err(pdf_err)) => {
                warn!("OCR failed for {}: {}", document.name, ocr_err);
                DocumentText::failed(format!("{}; {}", pdf_err, ocr_err))
            }
        };

        info!(
            "Extracted {} chars from {} ({:?}, {}ms)",
            result.text.len(),
            document.name,
            result.method,
            start.elapsed().as_millis()
        );
        result
    }
}
