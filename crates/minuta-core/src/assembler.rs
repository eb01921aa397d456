//! Draft assembly: extraction, resolution and template filling for one request.

use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::info;

use crate::catalog::PlaceholderCatalog;
use crate::error::{AssemblyError, MinutaError};
use crate::extractor::{PdfTextExtractor, TextExtractor};
use crate::models::config::{AssemblyConfig, MinutaConfig};
use crate::models::document::{CorpusText, ExtractedText, SourceDocument};
use crate::pdf::PdfWriter;
use crate::resolver::VariableResolver;
use crate::template::{FilledTemplate, fill_template};

/// Everything produced while assembling one draft.
#[derive(Debug, Clone, Serialize)]
pub struct AssembledDraft {
    pub filled: FilledTemplate,
    pub corpus: CorpusText,
}

impl AssembledDraft {
    pub fn text(&self) -> &str {
        &self.filled.text
    }
}

/// A rendered draft and the data behind it.
#[derive(Debug, Clone)]
pub struct GeneratedDraft {
    pub pdf: Vec<u8>,
    pub draft: AssembledDraft,
}

/// Orchestrates one generation request. Shared read-only across requests.
#[derive(Clone)]
pub struct DocumentAssembler {
    extractor: Arc<dyn TextExtractor>,
    resolver: Arc<VariableResolver>,
    config: AssemblyConfig,
}

impl DocumentAssembler {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        resolver: Arc<VariableResolver>,
        config: AssemblyConfig,
    ) -> Self {
        Self {
            extractor,
            resolver,
            config,
        }
    }

    /// Wire the assembler from configuration: catalog, resolver and the PDF
    /// extractor with its OCR fallback.
    pub fn from_config(config: &MinutaConfig) -> Result<Self, MinutaError> {
        let catalog = PlaceholderCatalog::from_config(&config.catalog)?;
        Self::with_catalog(&catalog, config)
    }

    /// Like [`DocumentAssembler::from_config`], with an already loaded catalog.
    pub fn with_catalog(
        catalog: &PlaceholderCatalog,
        config: &MinutaConfig,
    ) -> Result<Self, MinutaError> {
        let resolver = VariableResolver::new(catalog, config.resolver.clone())?;
        let extractor = PdfTextExtractor::from_config(config);

        Ok(Self::new(
            Arc::new(extractor),
            Arc::new(resolver),
            config.assembly.clone(),
        ))
    }

    /// Reject requests that cannot produce a draft.
    pub fn validate(documents: &[SourceDocument], template: &str) -> Result<(), AssemblyError> {
        if documents.is_empty() {
            return Err(AssemblyError::NoDocuments);
        }
        if template.trim().is_empty() {
            return Err(AssemblyError::EmptyTemplate);
        }
        Ok(())
    }

    /// Extract every document in order into one corpus.
    pub fn build_corpus(&self, documents: &[SourceDocument]) -> CorpusText {
        let mut corpus = CorpusText::new();
        for document in documents {
            let content = self.extractor.extract(document);
            corpus.push(
                ExtractedText {
                    source_name: document.name.clone(),
                    content,
                },
                self.config.annotate_failures,
            );
        }
        corpus
    }

    /// Assemble a draft dated today.
    pub fn assemble(
        &self,
        documents: &[SourceDocument],
        template: &str,
    ) -> Result<AssembledDraft, AssemblyError> {
        self.assemble_on(documents, template, Local::now().date_naive())
    }

    /// Assemble a draft with an explicit drafting date.
    pub fn assemble_on(
        &self,
        documents: &[SourceDocument],
        template: &str,
        today: NaiveDate,
    ) -> Result<AssembledDraft, AssemblyError> {
        Self::validate(documents, template)?;
        let start = Instant::now();

        let corpus = self.build_corpus(documents);
        let resolution = self.resolver.resolve_on(corpus.as_str(), today);
        let filled = fill_template(template, resolution);

        info!(
            "Assembled draft: {} chars from {} document(s) in {}ms",
            filled.text.len(),
            documents.len(),
            start.elapsed().as_millis()
        );

        Ok(AssembledDraft { filled, corpus })
    }

    /// Assemble and render a draft to PDF.
    pub fn generate(
        &self,
        documents: &[SourceDocument],
        template: &str,
        writer: &PdfWriter,
    ) -> Result<GeneratedDraft, MinutaError> {
        let draft = self.assemble(documents, template)?;
        let pdf = writer.render_text(draft.text())?;
        Ok(GeneratedDraft { pdf, draft })
    }
}
