//! OCR through the `pdftoppm` and `tesseract` command line tools.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::{OcrBackend, OcrResult};
use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// Rasterizes pages with `pdftoppm` and reads each with `tesseract`.
///
/// All intermediate files live in a temporary directory that is removed
/// when recognition returns, on success or failure.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    language: String,
    dpi: u32,
    page_segmentation_mode: u8,
    pdftoppm: OsString,
    tesseract: OsString,
}

impl TesseractOcr {
    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            language: config.language.clone(),
            dpi: config.dpi,
            page_segmentation_mode: config.page_segmentation_mode,
            pdftoppm: "pdftoppm".into(),
            tesseract: "tesseract".into(),
        }
    }

    /// Use specific executables instead of the ones on `PATH`.
    pub fn with_programs(mut self, pdftoppm: impl Into<OsString>, tesseract: impl Into<OsString>) -> Self {
        self.pdftoppm = pdftoppm.into();
        self.tesseract = tesseract.into();
        self
    }

    fn rasterize(&self, pdf_path: &Path, out_dir: &Path, max_pages: usize) -> Result<Vec<PathBuf>, OcrError> {
        let mut cmd = Command::new(&self.pdftoppm);
        cmd.arg("-png").arg("-r").arg(self.dpi.to_string());
        if max_pages > 0 {
            cmd.arg("-l").arg(max_pages.to_string());
        }
        cmd.arg(pdf_path).arg(out_dir.join("page"));

        let output = cmd.output().map_err(|e| {
            OcrError::Rasterize(format!("failed to run {}: {}", self.pdftoppm.to_string_lossy(), e))
        })?;
        if !output.status.success() {
            return Err(OcrError::Rasterize(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        // pdftoppm zero-pads page numbers, so name order is page order
        let mut images: Vec<PathBuf> = std::fs::read_dir(out_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "png"))
            .collect();
        images.sort();

        if images.is_empty() {
            return Err(OcrError::Rasterize("no pages were rasterized".to_string()));
        }

        debug!("Rasterized {} page(s) at {} dpi", images.len(), self.dpi);
        Ok(images)
    }

    fn recognize_image(&self, image: &Path) -> Result<String, OcrError> {
        let output = Command::new(&self.tesseract)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(self.page_segmentation_mode.to_string())
            .output()
            .map_err(|e| {
                OcrError::Recognition(format!(
                    "failed to run {}: {}",
                    self.tesseract.to_string_lossy(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(OcrError::Recognition(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl OcrBackend for TesseractOcr {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize_pdf(&self, pdf: &[u8], max_pages: usize) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let workdir = tempfile::Builder::new().prefix("minuta-ocr-").tempdir()?;

        let pdf_path = workdir.path().join("document.pdf");
        std::fs::write(&pdf_path, pdf)?;

        let images = self.rasterize(&pdf_path, workdir.path(), max_pages)?;

        let mut pages = Vec::with_capacity(images.len());
        let mut failures = 0;
        for (i, image) in images.iter().enumerate() {
            match self.recognize_image(image) {
                Ok(text) => pages.push(text),
                Err(e) => {
                    warn!("OCR failed on page {}: {}", i + 1, e);
                    failures += 1;
                    pages.push(String::new());
                }
            }
        }

        if failures == images.len() {
            return Err(OcrError::Recognition(format!(
                "{} failed on every page",
                self.tesseract.to_string_lossy()
            )));
        }

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "OCR complete: {} page(s) in {}ms",
            pages.len(),
            processing_time_ms
        );

        Ok(OcrResult {
            pages,
            processing_time_ms,
        })
    }
}
