use anyhow::{Context, Result};
use locale_editor::{config::Config, server, LocaleStore};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("locale_editor=info".parse()?),
        )
        .init();

    info!("Starting locale editor");

    let config = Config::from_env()?;

    if !config.locales_dir.is_dir() {
        warn!(
            "Locales directory {} does not exist; every request will fail until it is created",
            config.locales_dir.display()
        );
    }

    let store = Arc::new(LocaleStore::new(
        &config.locales_dir,
        config.folders.clone(),
        &config.template_language,
    ));
    let app = server::router(store, &config.static_dir, config.max_body_bytes);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(
        "✓ Serving {} (folders: {}) on http://{}",
        config.locales_dir.display(),
        config.folders.iter().collect::<Vec<_>>().join(", "),
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
