//! Serve command - run the HTTP service.

use clap::Args;
use tracing::info;

use minuta_core::MinutaConfig;

use crate::server::{self, AppState};

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Interface to bind (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides config and $PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Disable the OCR fallback
    #[arg(long)]
    no_ocr: bool,
}

pub async fn run(args: ServeArgs, mut config: MinutaConfig) -> anyhow::Result<()> {
    let mut server_config = config.server.clone().with_env_port();
    if let Some(host) = args.host {
        server_config.host = host;
    }
    if let Some(port) = args.port {
        server_config.port = port;
    }
    if args.no_ocr {
        config.ocr.enabled = false;
    }

    let state = AppState::from_config(&config)?;
    info!(
        "Starting minuta server v{} with {} placeholders",
        env!("CARGO_PKG_VERSION"),
        state.catalog.len()
    );

    server::serve(state, &server_config).await
}
