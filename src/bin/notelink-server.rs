// ABOUTME: Server binary for the Notelink Notion integration service
// ABOUTME: Loads configuration, opens the database, and serves the HTTP API
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Notelink Integration Server Binary
//!
//! Starts the HTTP service that handles Notion OAuth provisioning for
//! Notelink users.

use anyhow::Result;
use clap::Parser;
use notelink::{
    config::ServerConfig,
    database::Database,
    logging,
    server::{HttpServer, ServerResources},
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "notelink-server")]
#[command(about = "Notelink - Notion workspace integration service")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Container environments sometimes pass arguments clap does not know;
    // fall back to environment-only configuration rather than exiting.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Argument parsing failed: {e}");
            eprintln!("Using environment configuration");
            Args {
                http_port: None,
                database_url: None,
            }
        }
    };

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }

    logging::init_from_env()?;

    info!("Starting Notelink integration service");
    info!("{}", config.summary());

    config.notion.validate_and_log();

    let database = Database::new(&config.database_url).await?;
    info!("Database initialized: {}", config.database_url);

    let resources = Arc::new(ServerResources::new(database, Arc::new(config)));
    let server = HttpServer::new(resources);

    server.run().await
}
