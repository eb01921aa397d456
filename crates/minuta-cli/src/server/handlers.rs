//! Request handlers.

use axum::{
    Json,
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, info};

use minuta_core::catalog::CatalogEntry;
use minuta_core::{DocumentAssembler, SourceDocument};

use super::AppState;
use super::error::ApiError;

/// Multipart field carrying the uploaded documents (repeatable).
pub const FILES_FIELD: &str = "files";

/// Multipart field carrying the draft template text.
pub const TEMPLATE_FIELD: &str = "modelo_minuta";

/// File name of the generated draft.
pub const OUTPUT_FILENAME: &str = "minuta_final.pdf";

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    placeholders: usize,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        placeholders: state.catalog.len(),
    })
}

#[derive(Serialize)]
pub struct PlaceholderList {
    placeholders: Vec<CatalogEntry>,
    total: usize,
}

/// GET /api/v1/placeholders
pub async fn list_placeholders(State(state): State<AppState>) -> Json<PlaceholderList> {
    Json(PlaceholderList {
        placeholders: state.catalog.entries().to_vec(),
        total: state.catalog.len(),
    })
}

/// POST /gerar-minuta
///
/// Reads every `files` part and the `modelo_minuta` text, then returns the
/// filled draft as a PDF attachment.
pub async fn generate_draft(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut documents = Vec::new();
    let mut template = String::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            FILES_FIELD => {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await?;

                // Browsers send an empty part when no file was chosen
                if filename.is_empty() && data.is_empty() {
                    continue;
                }

                let filename = if filename.is_empty() {
                    format!("documento_{}.pdf", documents.len() + 1)
                } else {
                    filename
                };
                debug!("Received document '{}' ({} bytes)", filename, data.len());
                documents.push(SourceDocument::new(filename, data.to_vec()));
            }
            TEMPLATE_FIELD => {
                template = field.text().await?;
            }
            other => debug!("Ignoring multipart field '{}'", other),
        }
    }

    DocumentAssembler::validate(&documents, &template)?;
    info!(
        "Generating draft from {} document(s), template {} chars",
        documents.len(),
        template.len()
    );

    let assembler = state.assembler.clone();
    let writer = state.writer.clone();
    let generated = tokio::task::spawn_blocking(move || {
        assembler.generate(&documents, &template, &writer)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    info!(
        "Draft ready: {}/{} placeholders found, {} bytes",
        generated.draft.filled.resolution.found_count(),
        generated.draft.filled.resolution.len(),
        generated.pdf.len()
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", OUTPUT_FILENAME),
            ),
        ],
        generated.pdf,
    )
        .into_response())
}
