//! HTTP service exposing draft generation.
//!
//! Endpoints:
//! - POST /gerar-minuta - multipart upload, returns the filled draft PDF
//! - GET /api/v1/placeholders - the placeholder catalog
//! - GET /health - liveness

mod error;
mod handlers;

pub use error::ApiError;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use minuta_core::models::config::ServerConfig;
use minuta_core::{DocumentAssembler, MinutaConfig, MinutaError, PdfWriter, PlaceholderCatalog};

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState {
    pub assembler: DocumentAssembler,
    pub writer: Arc<PdfWriter>,
    pub catalog: Arc<PlaceholderCatalog>,
}

impl AppState {
    pub fn new(assembler: DocumentAssembler, writer: PdfWriter, catalog: PlaceholderCatalog) -> Self {
        Self {
            assembler,
            writer: Arc::new(writer),
            catalog: Arc::new(catalog),
        }
    }

    /// Build the catalog, resolver, extractor and writer from configuration.
    pub fn from_config(config: &MinutaConfig) -> Result<Self, MinutaError> {
        let catalog = PlaceholderCatalog::from_config(&config.catalog)?;
        let assembler = DocumentAssembler::with_catalog(&catalog, config)?;

        Ok(Self::new(
            assembler,
            PdfWriter::new(config.render.clone()),
            catalog,
        ))
    }
}

/// Create the application router.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/placeholders", get(handlers::list_placeholders))
        .route("/gerar-minuta", post(handlers::generate_draft))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl+C or SIGTERM.
pub async fn serve(state: AppState, config: &ServerConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("Minuta server listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state, config.max_upload_bytes))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use minuta_core::models::config::{AssemblyConfig, RenderConfig, ResolverConfig};
    use minuta_core::{DocumentText, SourceDocument, TextExtractor, VariableResolver};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    const BOUNDARY: &str = "minuta-test-boundary";

    /// Uses each upload's bytes as its text.
    #[derive(Default)]
    struct PlainTextExtractor {
        calls: AtomicUsize,
    }

    impl TextExtractor for PlainTextExtractor {
        fn extract(&self, document: &SourceDocument) -> DocumentText {
            self.calls.fetch_add(1, Ordering::SeqCst);
            DocumentText::direct(String::from_utf8_lossy(&document.data).into_owned())
        }
    }

    fn app_with_limit(limit: usize) -> (Router, Arc<PlainTextExtractor>) {
        let extractor = Arc::new(PlainTextExtractor::default());
        let catalog = PlaceholderCatalog::from_tokens(["¿nome>", "¿cpf>"]).unwrap();
        let resolver = VariableResolver::new(&catalog, ResolverConfig::default()).unwrap();
        let assembler = DocumentAssembler::new(
            extractor.clone(),
            Arc::new(resolver),
            AssemblyConfig::default(),
        );
        let writer = PdfWriter::new(RenderConfig {
            compress: false,
            ..RenderConfig::default()
        });

        let state = AppState::new(assembler, writer, catalog);
        (router(state, limit), extractor)
    }

    fn app() -> (Router, Arc<PlainTextExtractor>) {
        app_with_limit(1024 * 1024)
    }

    fn multipart_body(files: &[(&str, &str)], template: Option<&str>) -> Vec<u8> {
        let mut body = String::new();
        for (filename, content) in files {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n{content}\r\n"
            ));
        }
        if let Some(template) = template {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"modelo_minuta\"\r\n\r\n{template}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body.into_bytes()
    }

    fn upload(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/gerar-minuta")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["placeholders"], 2);
    }

    #[tokio::test]
    async fn test_list_placeholders() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::get("/api/v1/placeholders").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let json = json_body(response).await;
        assert_eq!(json["total"], 2);
        assert_eq!(json["placeholders"][0]["token"], "¿nome>");
        assert_eq!(json["placeholders"][1]["label"], "cpf");
    }

    #[tokio::test]
    async fn test_generate_returns_pdf_attachment() {
        let (app, extractor) = app();
        let body = multipart_body(
            &[("certidao.pdf", "nome: Ana Souza"), ("rg.pdf", "cpf: 111.222.333-44")],
            Some("Outorgante: ¿nome>, CPF ¿cpf>"),
        );

        let response = app.oneshot(upload(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"minuta_final.pdf\""
        );

        let pdf = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        assert!(contains(&pdf, b"Outorgante: Ana Souza, CPF 111.222.333-44"));
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_files_rejected() {
        let (app, extractor) = app();
        let response = app
            .oneshot(upload(multipart_body(&[], Some("¿nome>"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "NO_DOCUMENTS");
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_file_part_is_ignored() {
        let (app, _) = app();
        let response = app
            .oneshot(upload(multipart_body(&[("", "")], Some("¿nome>"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "NO_DOCUMENTS");
    }

    #[tokio::test]
    async fn test_missing_template_rejected() {
        let (app, extractor) = app();
        let response = app
            .oneshot(upload(multipart_body(&[("a.pdf", "nome: Ana")], None)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "EMPTY_TEMPLATE");
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected() {
        let (app, _) = app_with_limit(256);
        let big = "x".repeat(4096);
        let response = app
            .oneshot(upload(multipart_body(&[("grande.pdf", &big)], Some("¿nome>"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_state_from_config() {
        let mut config = MinutaConfig::default();
        config.ocr.enabled = false;

        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.catalog.len(), PlaceholderCatalog::builtin().len());

        config.resolver.gap = minuta_core::models::config::GapPolicy::MaxChars(100_000);
        assert!(AppState::from_config(&config).is_err());
    }
}
