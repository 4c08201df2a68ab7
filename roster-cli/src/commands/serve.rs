//! Serve command - run the HTTP API

use std::sync::Arc;

use clap::Args;
use roster_core::{Config, Services};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use super::open_database;

/// Run the HTTP server until Ctrl-C
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on (overrides config and env)
    #[arg(long, env = "ROSTER_ADDRESS")]
    address: Option<String>,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(&self, config: Config) -> anyhow::Result<()> {
        let config = config.with_cli_overrides(self.address.clone(), None, None)?;

        let db = open_database(&config).await?;
        let strategy = config.assignment.strategy;
        let services = Services::new(Arc::new(db.store()), strategy.build());

        let app = roster_http::router(services, config.server.request_timeout);
        let listener = TcpListener::bind(&config.server.address)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", config.server.address, e))?;

        tracing::info!(
            address = %config.server.address,
            strategy = strategy.as_str(),
            "Starting roster server"
        );

        let shutdown = CancellationToken::new();
        tokio::spawn(roster_http::shutdown_on_ctrl_c(shutdown.clone()));

        roster_http::serve(listener, app, shutdown, config.server.shutdown_timeout).await?;

        db.close().await;
        Ok(())
    }
}
