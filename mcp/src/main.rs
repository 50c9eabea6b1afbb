mod config;
mod protocol;
mod server;
mod tools;

use std::sync::Arc;

use agent::relay::RelayClient;
use agent::sources::PaperSources;
use clap::Parser;
use tokio::io::BufReader;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args = config::McpArgs::parse();
    tracing::info!(
        server = server::SERVER_NAME,
        relay = %args.relay_url,
        api_key_set = !args.api_key.trim().is_empty(),
        "starting"
    );

    let sources = match PaperSources::from_env() {
        Ok(sources) => sources,
        Err(e) => {
            tracing::error!(error = %e, "paper sources init failed");
            std::process::exit(2);
        }
    };
    let relay = match RelayClient::new(&args.relay_url) {
        Ok(relay) => relay,
        Err(e) => {
            tracing::error!(error = %e, "relay client init failed");
            std::process::exit(2);
        }
    };

    let backend = Arc::new(tools::LiveBackend::new(sources, relay));
    let server = server::McpServer::new(tools::ToolRouter::new(backend, args.api_key));
    if let Err(e) = server.run(BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await {
        tracing::error!(error = %e, "stdio transport failed");
        std::process::exit(1);
    }
}
