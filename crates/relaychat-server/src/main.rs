#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::Context;
use relaychat_ai::{LlmClient, OpenAICompatibleClient};
use relaychat_server::{api::AppState, config::ServerConfig, router};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing logger
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,relaychat_server=debug,relaychat_ai=debug".into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting RelayChat server");

    let config = ServerConfig::load()?;
    if let Err(e) = config.llm.credentials() {
        tracing::warn!(error = %e, "Chat requests will fail until credentials are configured");
    }

    let llm: Arc<dyn LlmClient> = Arc::new(
        OpenAICompatibleClient::new(config.llm.clone())
            .context("Failed to build upstream HTTP client")?,
    );
    let app = router(AppState::new(llm));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;

    tracing::info!("RelayChat running on http://{}", address);

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
