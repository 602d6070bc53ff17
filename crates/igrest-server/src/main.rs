//! igrest server binary.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use igrest_client::GatewayFactory;
use igrest_server::{LogFormat, ServerConfig, create_router, logging};
use igrest_session::SessionRegistry;

#[derive(Debug, Parser)]
#[command(name = "igrest", version, about = "REST API over session-scoped automation clients")]
struct Cli {
    /// Path to a TOML config file (default: ./igrest.toml if present).
    #[arg(short, long, env = "IGREST_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long, env = "IGREST_BIND")]
    bind: Option<SocketAddr>,

    /// Base URL of the automation gateway.
    #[arg(long, env = "IGREST_GATEWAY_URL")]
    gateway_url: Option<String>,

    /// Log output format.
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    /// Log level filter used when RUST_LOG is unset.
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn resolve(self) -> anyhow::Result<ServerConfig> {
        let mut config = ServerConfig::load(self.config.as_deref())?;
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(gateway_url) = self.gateway_url {
            config.gateway_url = gateway_url;
        }
        if let Some(format) = self.log_format {
            config.log.format = format;
        }
        if let Some(level) = self.log_level {
            config.log.level = level;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().resolve()?;
    logging::init(&config.log).context("Failed to initialize logging")?;

    let factory = GatewayFactory::new(&config.gateway_url, config.client.clone())
        .context("Invalid gateway configuration")?;
    let registry = Arc::new(SessionRegistry::new(factory));
    let app = create_router(Arc::clone(&registry));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    tracing::info!(gateway = %config.gateway_url, "Server listening on http://{}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    let dropped = registry.clear();
    tracing::info!(sessions = dropped, "Shut down, dropped all sessions");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
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
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
