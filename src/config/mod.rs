// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Loads environment-based config for the HTTP server, database, and Notion OAuth
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Notelink

//! Configuration management
//!
//! All configuration comes from the environment and is loaded once at startup
//! into an explicit struct that gets passed to the components needing it.
//! Components never read environment variables ad hoc at call time.

pub mod notion;

use anyhow::{Context, Result};
use std::env;

use crate::constants::ports;
use notion::NotionOAuthConfig;

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP port the server binds to
    pub http_port: u16,
    /// Externally visible base URL, used to derive default callback URIs
    pub base_url: String,
    /// Database connection URL (SQLite)
    pub database_url: String,
    /// Notion OAuth configuration
    pub notion: NotionOAuthConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `HTTP_PORT` is set but not a valid port number
    pub fn from_env() -> Result<Self> {
        let http_port = match env::var("HTTP_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("invalid HTTP_PORT value: {value}"))?,
            Err(_) => ports::DEFAULT_HTTP_PORT,
        };

        let base_url = env::var("BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{http_port}"));

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:notelink.db".to_owned());

        let notion = NotionOAuthConfig::from_env(&base_url);

        Ok(Self {
            http_port,
            base_url,
            database_url,
            notion,
        })
    }

    /// One-line configuration summary for startup logging, no secrets included
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "http_port={} base_url={} database_url={} notion_configured={} callback_mode={}",
            self.http_port,
            self.base_url,
            self.database_url,
            self.notion.is_configured(),
            self.notion.callback_mode,
        )
    }
}
