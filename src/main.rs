//! Noteblog Server entry point.

use std::net::SocketAddr;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use noteblog_server::config::Config;
use noteblog_server::{AppState, ServiceState};

#[tokio::main]
async fn main() {
    let config = Config::parse();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let service = match ServiceState::new(&config.service_config()) {
        Ok(service) => service,
        Err(e) => {
            tracing::error!("failed to initialize application context: {e}");
            std::process::exit(1);
        }
    };
    let state = AppState::new(service, config.cors_origins.clone());

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        session_ttl = config.session_ttl,
        cookie = %config.session_cookie,
        "Noteblog Server starting",
    );

    let app = noteblog_server::router(state.clone());

    let addr = SocketAddr::new(config.host.parse().expect("invalid host"), config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");

    // Spawn expired-session eviction task
    let cleanup_state = state.clone();
    let interval = Duration::from_secs(config.eviction_interval.max(1));
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            let removed = cleanup_state.cleanup_expired_sessions();
            if removed > 0 {
                tracing::info!(removed, "Cleaned up expired sessions");
            }
        }
    });

    tracing::info!(%addr, "Noteblog Server ready");

    noteblog_server::serve(listener, app, shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("Noteblog Server shut down");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install signal handler");
    tracing::info!("Shutdown signal received");
}
