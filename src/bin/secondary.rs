//! Entry point for a secondary ("replica") process.

use log::info;
use replog::config::SecondaryConfig;
use replog::secondary::log::SecondaryLog;
use replog::secondary::routes::{self, SecondaryState};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = SecondaryConfig::from_env();
    info!("starting secondary on port {}", config.port);

    let state = SecondaryState {
        log: Arc::new(SecondaryLog::new()),
        secondary_delay: config.secondary_delay,
    };
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .unwrap_or_else(|e| panic!("failed to bind port {}: {e}", config.port));
    info!("secondary listening on {}", listener.local_addr().expect("local_addr"));

    axum::serve(listener, app).await.expect("secondary server exited unexpectedly");
}
