//! PDF Form Filler - Entry point
//!
//! Serves the form filling tools over MCP stdio. Configuration comes from
//! `PDF_FORM_FILLER_*` environment variables, logging from `RUST_LOG`.

use pdf_form_filler::{run_server_with_config, PdfiumBackend, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the MCP transport
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_form_filler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        resource_dirs = ?config.resource_dirs,
        allow_private_urls = config.allow_private_urls,
        max_download_bytes = config.max_download_bytes,
        cache_max_entries = config.cache_max_entries,
        "Starting PDF form filler"
    );

    if !PdfiumBackend::is_available() {
        tracing::warn!("PDFium library not found; form tools will fail until it is installed");
    }

    run_server_with_config(config).await
}
