//! Entry point for the primary ("master") process.

use log::info;
use replog::config::PrimaryConfig;
use replog::primary::{routes, Replicator};

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = PrimaryConfig::from_env();
    info!(
        "starting primary on port {} with {} configured secondaries",
        config.port,
        config.secondaries.len()
    );

    let port = config.port;
    let replicator = Replicator::spawn(config);
    let app = routes::router(replicator);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .unwrap_or_else(|e| panic!("failed to bind port {port}: {e}"));
    info!("primary listening on {}", listener.local_addr().expect("local_addr"));

    axum::serve(listener, app).await.expect("primary server exited unexpectedly");
}
