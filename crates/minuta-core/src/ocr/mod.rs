//! OCR fallback for documents without a usable text layer.
//!
//! Two backends are available: the `tesseract` command line tool (pages are
//! rasterized with `pdftoppm`), and a pure Rust engine built on
//! `pure-onnx-ocr` behind the `onnx-ocr` feature.

mod tesseract;

#[cfg(feature = "onnx-ocr")]
mod pure_engine;

pub use tesseract::TesseractOcr;

#[cfg(feature = "onnx-ocr")]
pub use pure_engine::PureOcrEngine;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::OcrError;
use crate::models::config::{OcrBackendKind, OcrConfig};

/// Recognized text of one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrResult {
    /// Recognized text per page, in page order.
    pub pages: Vec<String>,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl OcrResult {
    /// Page texts joined by newlines.
    pub fn text(&self) -> String {
        self.pages.join("\n")
    }

    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|p| p.trim().is_empty())
    }
}

/// A recognizer that turns a whole PDF into text.
pub trait OcrBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Recognize the text of `pdf`. `max_pages` of zero means every page.
    fn recognize_pdf(&self, pdf: &[u8], max_pages: usize) -> Result<OcrResult, OcrError>;
}

/// Build the configured backend, or `None` when OCR is disabled.
pub fn create_backend(config: &OcrConfig) -> Result<Option<Box<dyn OcrBackend>>, OcrError> {
    if !config.enabled {
        info!("OCR fallback disabled");
        return Ok(None);
    }

    let backend: Box<dyn OcrBackend> = match config.backend {
        OcrBackendKind::Tesseract => Box::new(TesseractOcr::from_config(config)),
        #[cfg(feature = "onnx-ocr")]
        OcrBackendKind::Onnx => Box::new(PureOcrEngine::from_config(config)?),
        #[cfg(not(feature = "onnx-ocr"))]
        OcrBackendKind::Onnx => {
            return Err(OcrError::Unavailable(
                "built without the onnx-ocr feature".to_string(),
            ));
        }
    };

    info!("Using {} OCR backend", backend.name());
    Ok(Some(backend))
}
