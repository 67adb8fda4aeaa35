//! Collaborative session server.
//!
//! Hosts text and drawing rooms over WebSocket and fans out every change to
//! the other members of the room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin huddle-server
//! cargo run --bin huddle-server -- --host 0.0.0.0 --port 3000
//! cargo run --bin huddle-server -- --empty-room-ttl-secs 3600
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use huddle_server::{
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository},
    ui::Server,
};
use huddle_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "huddle-server")]
#[command(about = "Collaborative session server for shared text and drawing rooms", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Delete rooms that have been empty and unchanged for this many seconds (disabled by default)
    #[arg(long)]
    empty_room_ttl_secs: Option<u64>,

    /// How often to look for idle rooms, in seconds
    #[arg(long, default_value = "60")]
    reap_interval_secs: u64,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(&[env!("CARGO_BIN_NAME"), "tower_http"], &args.log_level);

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. Server

    // 1. Create Repository (in-memory room store)
    let repository = Arc::new(InMemoryRoomRepository::new());

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create and run the server
    let mut server = Server::new(repository, message_pusher);
    if let Some(ttl) = args.empty_room_ttl_secs {
        server = server.with_reaper(
            Duration::from_secs(ttl),
            Duration::from_secs(args.reap_interval_secs.max(1)),
        );
    }

    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
