//! Pure Rust OCR backend using `pure-onnx-ocr`.

use std::path::PathBuf;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info, warn};

use super::{OcrBackend, OcrResult};
use crate::error::OcrError;
use crate::models::config::OcrConfig;
use crate::pdf::{PdfProcessor, PdfReader};

const DET_MODEL: &str = "det.onnx";
const REC_MODEL: &str = "latin_rec.onnx";
const DICTIONARY: &str = "latin_dict.txt";

/// Row height, in pixels, used to group text regions into lines.
const ROW_BUCKET: f64 = 20.0;

/// OCR over the embedded page images of a scanned PDF.
///
/// The engine is built per document from the model directory, so the
/// backend itself holds only paths.
pub struct PureOcrEngine {
    model_dir: PathBuf,
    keep_unknown_glyphs: bool,
}

impl PureOcrEngine {
    /// Check the model directory and create the backend.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        for file in [DET_MODEL, REC_MODEL, DICTIONARY] {
            let path = config.model_dir.join(file);
            if !path.is_file() {
                return Err(OcrError::ModelLoad(format!(
                    "missing model file {}",
                    path.display()
                )));
            }
        }

        Ok(Self {
            model_dir: config.model_dir.clone(),
            keep_unknown_glyphs: config.keep_unknown_glyphs,
        })
    }

    fn build_engine(&self) -> Result<pure_onnx_ocr::engine::OcrEngine, OcrError> {
        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&self.model_dir.join(DET_MODEL))
            .rec_model_path(&self.model_dir.join(REC_MODEL))
            .dictionary_path(&self.model_dir.join(DICTIONARY))
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        debug!("Loaded pure-onnx-ocr engine from {}", self.model_dir.display());
        Ok(engine)
    }

    fn recognize_image(
        &self,
        engine: &pure_onnx_ocr::engine::OcrEngine,
        image: &DynamicImage,
    ) -> Result<String, OcrError> {
        let (width, height) = image.dimensions();
        debug!("Recognizing page image: {}x{}", width, height);

        let results = engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let mut regions: Vec<(f64, f64, String)> = results
            .iter()
            .map(|r| {
                let (x, y) = top_left(&r.bounding_box);
                let text = if self.keep_unknown_glyphs {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                (x, y, text)
            })
            .collect();

        // Reading order: rows top to bottom, then left to right
        regions.sort_by(|a, b| {
            let row_a = (a.1 / ROW_BUCKET) as i64;
            let row_b = (b.1 / ROW_BUCKET) as i64;
            row_a
                .cmp(&row_b)
                .then(a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
        });

        Ok(regions
            .into_iter()
            .map(|(_, _, text)| text)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

impl OcrBackend for PureOcrEngine {
    fn name(&self) -> &'static str {
        "pure-onnx-ocr"
    }

    fn recognize_pdf(&self, pdf: &[u8], max_pages: usize) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let reader = PdfReader::open(pdf).map_err(|e| OcrError::Rasterize(e.to_string()))?;
        let engine = self.build_engine()?;

        let page_count = page_limit(reader.page_count(), max_pages);

        let mut pages = Vec::with_capacity(page_count as usize);
        for page in 1..=page_count {
            let text = reader
                .render_page(page)
                .map_err(|e| OcrError::Rasterize(e.to_string()))
                .and_then(|image| self.recognize_image(&engine, &image));
            match text {
                Ok(text) => pages.push(text),
                Err(e) => {
                    warn!("OCR failed on page {}: {}", page, e);
                    pages.push(String::new());
                }
            }
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

/// Smallest x and y of a detected region.
fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f64, f64) {
    polygon
        .exterior()
        .coords()
        .fold((f64::INFINITY, f64::INFINITY), |(x, y), c| {
            (x.min(c.x), y.min(c.y))
        })
}

/// Pages to recognize; `max_pages == 0` means all of them.
fn page_limit(page_count: u32, max_pages: usize) -> u32 {
    if max_pages == 0 {
        return page_count;
    }
    page_count.min(u32::try_from(max_pages).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_models_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = OcrConfig {
            model_dir: dir.path().to_path_buf(),
            ..OcrConfig::default()
        };
        assert!(matches!(
            PureOcrEngine::from_config(&config),
            Err(OcrError::ModelLoad(_))
        ));
    }

    #[test]
    fn test_page_limit() {
        assert_eq!(page_limit(12, 0), 12);
        assert_eq!(page_limit(12, 5), 5);
        assert_eq!(page_limit(3, 5), 3);
        assert_eq!(page_limit(7, usize::MAX), 7);
    }
}
