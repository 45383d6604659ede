// ABOUTME: Server resource container and HTTP server assembly
// ABOUTME: Wires database, Notion client, state registry, and flow behind one Arc
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Notelink

//! # Server Assembly
//!
//! Centralized resource container for dependency injection plus the HTTP
//! server that mounts the routers. Expensive objects (database pool, HTTP
//! client, state registry) are created once here and shared by `Arc`.

use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::database::{ConnectionStore, Database};
use crate::oauth::client::NotionClient;
use crate::oauth::flow::ProvisioningFlow;
use crate::oauth::state::OAuthStateRegistry;
use crate::oauth::NotionApi;
use crate::routes::{HealthRoutes, NotionRoutes};

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Shared database handle
    pub database: Arc<Database>,
    /// Loaded server configuration
    pub config: Arc<ServerConfig>,
    /// Outbound Notion API client
    pub notion: Arc<dyn NotionApi>,
    /// Issued-state registry for the OAuth flow
    pub oauth_states: Arc<OAuthStateRegistry>,
    /// The provisioning flow, assembled once
    pub flow: Arc<ProvisioningFlow>,
    store: Arc<dyn ConnectionStore>,
}

impl ServerResources {
    /// Create resources with the production Notion client
    #[must_use]
    pub fn new(database: Database, config: Arc<ServerConfig>) -> Self {
        let notion: Arc<dyn NotionApi> = Arc::new(NotionClient::new(config.notion.clone()));
        Self::with_notion_api(Arc::new(database), config, notion)
    }

    /// Create resources with an injected Notion API implementation
    ///
    /// Tests use this to run the whole stack against a fake provider.
    #[must_use]
    pub fn with_notion_api(
        database: Arc<Database>,
        config: Arc<ServerConfig>,
        notion: Arc<dyn NotionApi>,
    ) -> Self {
        let oauth_states = Arc::new(OAuthStateRegistry::new());
        let store: Arc<dyn ConnectionStore> = database.clone();
        let flow = Arc::new(ProvisioningFlow::new(
            config.notion.clone(),
            notion.clone(),
            store.clone(),
            oauth_states.clone(),
        ));

        Self {
            database,
            config,
            notion,
            oauth_states,
            flow,
            store,
        }
    }

    /// The connection store the flow persists into
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ConnectionStore> {
        &self.store
    }
}

/// HTTP server for the integration service
pub struct HttpServer {
    resources: Arc<ServerResources>,
}

impl HttpServer {
    /// Create a server over the given resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Assemble the full router with middleware layers
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .merge(HealthRoutes::routes())
            .merge(NotionRoutes::routes(self.resources.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }

    /// Bind and serve until the process is stopped
    ///
    /// # Errors
    ///
    /// Returns an error if binding the port or serving fails
    pub async fn run(&self) -> Result<()> {
        let port = self.resources.config.http_port;
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
        info!("HTTP server listening on port {port}");

        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}
