//! Core library for notarial draft ("minuta") generation.
//!
//! This crate provides:
//! - PDF text extraction with an OCR fallback for scanned documents
//! - The placeholder catalog and label-anchored value resolution
//! - Template filling and plain-text PDF rendering

pub mod assembler;
pub mod catalog;
pub mod error;
pub mod extractor;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod resolver;
pub mod template;

pub use assembler::{AssembledDraft, DocumentAssembler, GeneratedDraft};
pub use catalog::{PlaceholderCatalog, PlaceholderToken};
pub use error::{AssemblyError, MinutaError, Result};
pub use extractor::{PdfTextExtractor, TextExtractor};
pub use models::config::{MinutaConfig, NOT_FOUND_SENTINEL};
pub use models::document::{CorpusText, DocumentText, ExtractionMethod, SourceDocument};
pub use ocr::{OcrBackend, OcrResult};
pub use pdf::{PdfProcessor, PdfReader, PdfWriter};
pub use resolver::{Resolution, ResolvedValue, VariableResolver};
pub use template::{FilledTemplate, fill_template};
