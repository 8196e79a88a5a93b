use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::info;

use redactr::api::{create_router, AppState};
use redactr::audit::SafeLogger;
use redactr::config::{CheckConfig, Command, Config, ServeConfig};
use redactr::domain::AccessRequest;
use redactr::engine;
use redactr::observability::init_tracing;
use redactr::policy::{load_policy_files, PolicyLoader, PolicyWatcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    init_tracing(&config.log_level);

    match config.command {
        Command::Serve(serve_config) => serve(serve_config).await,
        Command::Check(check_config) => check(check_config),
    }
}

/// Run the HTTP decision service.
async fn serve(config: ServeConfig) -> anyhow::Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting redactr decision service"
    );

    // Start the policy watcher; reloads swap the store atomically
    let loader = PolicyLoader::new(config.policy_paths.clone());
    let watcher = PolicyWatcher::new(loader, config.policy_reload_interval());
    let (store_rx, policy_handle) = watcher.start();

    let state = Arc::new(AppState {
        store_rx,
        audit: SafeLogger::new(config.audit_redact_fields.clone()),
        start_time: Instant::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    });

    let app = create_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen address {}", config.listen_addr))?;

    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    if config.graceful_shutdown {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    } else {
        axum::serve(listener, app).await?;
    }

    info!("Shutting down...");
    policy_handle.abort();

    info!("Shutdown complete");
    Ok(())
}

/// Evaluate a policy file against a test resource and print the decision.
fn check(config: CheckConfig) -> anyhow::Result<()> {
    let store = load_policy_files(&config.policy_files).context("failed to load policy files")?;

    let input = std::fs::read_to_string(&config.input)
        .with_context(|| format!("failed to read {}", config.input.display()))?;
    let resource = serde_json::from_str(&input).context("input must be a JSON object")?;

    let attributes =
        serde_json::from_str(&config.attributes).context("attributes must be a JSON object")?;

    let request = AccessRequest::new(config.role, config.intent, attributes, resource);
    let result = engine::evaluate(&store, &request)?;

    let logger = SafeLogger::new(config.redact_fields);
    logger.info("Access decision", &result.fields);

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}
