//! Interactive WebSocket chat client.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin aizuchi-client -- --user-id u-alice --username alice
//! ```

use clap::Parser;

use aizuchi_client::{run_client, ClientConfig};
use aizuchi_shared::setup_logger;

#[derive(Debug, Parser)]
#[command(name = "aizuchi-client", about = "Realtime chat client")]
struct Args {
    /// WebSocket server base URL
    #[arg(long, default_value = "ws://127.0.0.1:8080")]
    server_url: String,

    /// Stable user identifier
    #[arg(long)]
    user_id: String,

    /// Display name shown to other users
    #[arg(long)]
    username: String,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = ClientConfig {
        server_url: args.server_url,
        user_id: args.user_id,
        username: args.username,
    };
    if let Err(e) = run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
