//! Configuration structures for the draft generation pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sentinel substituted for placeholders with no value in the documents.
pub const NOT_FOUND_SENTINEL: &str = "DADO NÃO ENCONTRADO";

/// Port used when neither the config file nor `PORT` sets one.
pub const DEFAULT_PORT: u16 = 10000;

/// Environment variable that overrides the listening port.
pub const PORT_ENV: &str = "PORT";

/// Main configuration for the minuta pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MinutaConfig {
    /// PDF text extraction configuration.
    pub pdf: PdfConfig,

    /// OCR fallback configuration.
    pub ocr: OcrConfig,

    /// Placeholder resolution configuration.
    pub resolver: ResolverConfig,

    /// Placeholder catalog source.
    pub catalog: CatalogConfig,

    /// Corpus assembly configuration.
    pub assembly: AssemblyConfig,

    /// Output PDF layout.
    pub render: RenderConfig,

    /// HTTP server configuration.
    pub server: ServerConfig,
}

/// When the OCR fallback runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Only when direct extraction fails.
    OnFailure,
    /// When direct extraction fails or yields whitespace-only text.
    #[default]
    OnFailureOrBlank,
    /// On every document; the OCR text wins unless it is blank.
    Always,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to read per document (0 = unlimited).
    pub max_pages: usize,

    /// OCR fallback trigger.
    pub fallback: FallbackPolicy,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_pages: 0,
            fallback: FallbackPolicy::default(),
        }
    }
}

/// OCR engine selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrBackendKind {
    /// `pdftoppm` rasterization + `tesseract` recognition.
    #[default]
    Tesseract,
    /// Embedded page images + PaddleOCR models through `pure-onnx-ocr`.
    Onnx,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Enable the OCR fallback.
    pub enabled: bool,

    /// Which engine to run.
    pub backend: OcrBackendKind,

    /// Tesseract language code.
    pub language: String,

    /// DPI for rendering PDF pages to images.
    pub dpi: u32,

    /// Tesseract page segmentation mode.
    pub page_segmentation_mode: u8,

    /// Directory containing `det.onnx`, `latin_rec.onnx` and `latin_dict.txt`.
    pub model_dir: PathBuf,

    /// Keep `[UNK]` markers emitted by the ONNX recognizer.
    pub keep_unknown_glyphs: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: OcrBackendKind::default(),
            language: "por".to_string(),
            dpi: 300,
            page_segmentation_mode: 3,
            model_dir: PathBuf::from("models"),
            keep_unknown_glyphs: false,
        }
    }
}

/// How far the search may run between a label and its colon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Any distance, across lines.
    #[default]
    Unbounded,
    /// Label and colon must share a line.
    SameLine,
    /// At most this many characters, across lines.
    MaxChars(usize),
}

/// Largest accepted [`GapPolicy::MaxChars`] value.
pub const MAX_GAP_CHARS: usize = 1000;

impl GapPolicy {
    /// Reject gaps too wide to compile into a search pattern.
    pub fn check(self) -> Result<Self, String> {
        match self {
            Self::MaxChars(max) if max > MAX_GAP_CHARS => Err(format!(
                "resolver.gap.max_chars is {max}, the limit is {MAX_GAP_CHARS}"
            )),
            gap => Ok(gap),
        }
    }
}

/// Placeholder resolution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Label-to-colon gap policy.
    pub gap: GapPolicy,

    /// Treat captured values such as `N/A` or `-` as not found.
    pub reject_blank_values: bool,

    /// Value substituted for unresolved placeholders.
    pub sentinel: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            gap: GapPolicy::default(),
            reject_blank_values: true,
            sentinel: NOT_FOUND_SENTINEL.to_string(),
        }
    }
}

/// Placeholder catalog source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON array of tokens replacing the built-in catalog.
    pub path: Option<PathBuf>,
}

/// Corpus assembly configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Append an error marker to the corpus for documents that failed.
    pub annotate_failures: bool,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            annotate_failures: true,
        }
    }
}

/// Output PDF layout, in points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub page_width: i64,
    pub page_height: i64,
    pub margin: i64,
    pub font_size: i64,
    pub line_height: i64,
    /// Compress content streams.
    pub compress: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        // A4 with ~15mm margins
        Self {
            page_width: 595,
            page_height: 842,
            margin: 42,
            font_size: 11,
            line_height: 14,
            compress: true,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,

    /// Listening port.
    pub port: u16,

    /// Maximum multipart request size in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Apply a `PORT`-style override. Unparseable values are ignored.
    pub fn with_port_override(mut self, value: Option<&str>) -> Self {
        if let Some(port) = value.and_then(|v| v.trim().parse::<u16>().ok()) {
            self.port = port;
        }
        self
    }

    /// Apply the `PORT` environment variable.
    pub fn with_env_port(self) -> Self {
        let value = std::env::var(PORT_ENV).ok();
        self.with_port_override(value.as_deref())
    }
}

impl MinutaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        config
            .validate()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), String> {
        self.resolver.gap.check()?;
        Ok(())
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
