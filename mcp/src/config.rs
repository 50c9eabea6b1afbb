//! Command-line / environment configuration.

use agent::relay::DEFAULT_RELAY_URL;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "obsixiv-mcp", about = "ObsiXiv paper tools over a stdio JSON-RPC protocol")]
pub struct McpArgs {
    /// Base URL of the ObsiXiv relay.
    #[arg(long, env = "OBSIXIV_RELAY_URL", default_value = DEFAULT_RELAY_URL)]
    pub relay_url: String,

    /// Provider credential forwarded to the relay for `generate_blog`.
    #[arg(long, env = "API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,
}
