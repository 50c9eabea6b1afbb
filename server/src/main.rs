mod config;
mod pdf;
mod routes;
mod state;

use std::sync::Arc;

use agent::BlogAgent;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = match config::ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid server configuration");
            std::process::exit(2);
        }
    };

    let agent = match BlogAgent::from_env() {
        Ok(agent) => agent,
        Err(e) => {
            tracing::error!(code = e.error_code(), error = %e, "agent init failed");
            std::process::exit(2);
        }
    };

    let app = routes::app(state::AppState::new(Arc::new(agent)));
    let addr = config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, "obsixiv relay listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server failed");
        std::process::exit(1);
    }
}
