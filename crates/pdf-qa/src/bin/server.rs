//! PDF question answering server binary
//!
//! Run with: cargo run -p pdf-qa --bin pdf-qa-server

use pdf_qa::{config::AppConfig, server::QaServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_qa=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                         PDF Q&A                           ║
║          Upload PDFs, ask grounded questions              ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    let config = AppConfig::from_env()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.openai.embedding_model);
    tracing::info!("  - Embedding dimensions: {}", config.openai.embedding_dimensions);
    tracing::info!("  - Completion model: {}", config.openai.completion_model);
    tracing::info!(
        "  - Chunk size: {} (overlap {})",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );
    tracing::info!("  - Top K: {}", config.retrieval.top_k);
    tracing::info!("  - Vector backend: {:?}", config.vector_index.backend);

    let server = QaServer::new(config).await?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  GET  /                - Status message");
    println!("  POST /upload-document - Upload a PDF (form field 'document')");
    println!("  POST /ask-question    - Ask a question {{\"question\": \"...\"}}");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
