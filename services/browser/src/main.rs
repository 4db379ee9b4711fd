//! Serve the registry browser.

use clap::Parser as _;
use eyre::WrapErr as _;
use registry_browser::BrowserBuilder;
use registry_browser::config::{Args, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::load(Args::parse())?;
    tracing::debug!(?config, "loaded configuration");

    let client = config
        .client()
        .wrap_err_with(|| format!("connecting to registry {}", config.url))?;
    tracing::info!(
        registry = %client.registry(),
        platform = %client.platform(),
        "Browsing registry"
    );

    let mut builder = BrowserBuilder::new(client);
    if let Some(title) = &config.title {
        builder = builder.title(title);
    }
    let app = builder.build()?;

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("binding {addr}"))?;

    tracing::info!("Registry browser listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown())
        .await?;

    Ok(())
}

async fn shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
