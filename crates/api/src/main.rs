use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use cast_api::app::build_router;
use cast_api::config::{IntegrationConfig, ServerConfig};
use cast_api::state::AppState;
use cast_llm::ChatCompletionsProvider;
use cast_pipeline::{ProfileGenerator, Reconciler};
use cast_registry::PayloadRegistry;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cast_api=debug,cast_pipeline=debug,tower_http=debug".into()
            }),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let integrations = IntegrationConfig::from_env().context("Invalid integration configuration")?;
    tracing::info!(
        max_characters = integrations.generation.max_characters,
        registry_enabled = integrations.registry.is_some(),
        provider_enabled = integrations.provider.is_some(),
        "Loaded integration configuration"
    );

    // --- Pipeline ---
    let reconciler_cancel = CancellationToken::new();
    let mut reconciler_handle = None;
    let mut generator = ProfileGenerator::new(integrations.generation.clone());

    if let Some(registry_config) = integrations.registry {
        let registry =
            Arc::new(PayloadRegistry::new(registry_config).context("Failed to build registry client")?);
        let (reconciler, handle) = Reconciler::new(
            registry.clone(),
            integrations.generation.reconciler_queue_capacity,
            integrations.generation.registry_timeout,
        );
        reconciler_handle = Some(tokio::spawn(reconciler.run(reconciler_cancel.clone())));
        generator = generator.with_registry(registry).with_reconciler(handle);
        tracing::info!("Registry integration and reconciler started");
    }

    if let Some(provider_config) = integrations.provider {
        let provider = ChatCompletionsProvider::new(provider_config)
            .context("Failed to build provider client")?;
        generator = generator.with_provider(Arc::new(provider));
        tracing::info!("Text-generation provider configured");
    }

    // --- App state ---
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let state = AppState {
        config: Arc::new(config.clone()),
        generator: Arc::new(generator),
    };
    let app = build_router(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST address")?,
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, draining reconciler");

    reconciler_cancel.cancel();
    if let Some(handle) = reconciler_handle {
        if tokio::time::timeout(shutdown_timeout, handle).await.is_err() {
            tracing::warn!(
                timeout_secs = shutdown_timeout.as_secs(),
                "Reconciler did not drain before shutdown timeout"
            );
        }
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
