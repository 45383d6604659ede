// ABOUTME: Notion OAuth configuration types and environment loading
// ABOUTME: Handles client credentials, redirect URI, API base, and callback presentation mode
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Notelink

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::env;
use std::fmt;
use tracing::{info, warn};

use crate::constants::{notion, routes};

/// How the OAuth callback reports its result to the end user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CallbackMode {
    /// HTML page that posts a message to the opener window and closes itself
    #[default]
    Popup,
    /// HTTP 302 back to the settings page with result query parameters
    Redirect,
}

impl CallbackMode {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "redirect" => Self::Redirect,
            _ => Self::Popup,
        }
    }
}

impl fmt::Display for CallbackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Popup => f.write_str("popup"),
            Self::Redirect => f.write_str("redirect"),
        }
    }
}

/// Notion OAuth configuration
///
/// Credentials are optional so the server can start without them: the
/// callback then fails with a misconfiguration result instead of crashing
/// the process at boot.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NotionOAuthConfig {
    /// OAuth client ID
    pub client_id: Option<String>,
    /// OAuth client secret
    pub client_secret: Option<String>,
    /// OAuth redirect URI registered with the provider
    pub redirect_uri: String,
    /// Base URL of the Notion API
    pub api_base: String,
    /// Callback presentation mode
    pub callback_mode: CallbackMode,
}

impl NotionOAuthConfig {
    /// Load Notion OAuth configuration from environment
    #[must_use]
    pub fn from_env(base_url: &str) -> Self {
        Self {
            client_id: env::var("NOTION_CLIENT_ID").ok().filter(|v| !v.is_empty()),
            client_secret: env::var("NOTION_CLIENT_SECRET")
                .ok()
                .filter(|v| !v.is_empty()),
            redirect_uri: env::var("NOTION_REDIRECT_URI")
                .unwrap_or_else(|_| format!("{base_url}{}", routes::CALLBACK_PATH)),
            api_base: env::var("NOTION_API_BASE")
                .unwrap_or_else(|_| notion::DEFAULT_API_BASE.to_owned()),
            callback_mode: env::var("NOTION_CALLBACK_MODE")
                .map(|v| CallbackMode::parse(&v))
                .unwrap_or_default(),
        }
    }

    /// Whether both client credentials are present and non-empty
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }

    /// Borrow `(client_id, client_secret)` when both are usable
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some((id, secret))
            }
            _ => None,
        }
    }

    /// Compute SHA256 fingerprint of the client secret (first 8 hex chars)
    ///
    /// Allows comparing deployed secrets in logs without ever logging values.
    #[must_use]
    pub fn secret_fingerprint(&self) -> Option<String> {
        self.client_secret.as_ref().map(|secret| {
            let mut hasher = Sha256::new();
            hasher.update(secret.as_bytes());
            let result = hasher.finalize();
            format!("{result:x}").chars().take(8).collect()
        })
    }

    /// Validate OAuth credentials and log diagnostics
    ///
    /// Returns true if credentials appear usable, false otherwise.
    pub fn validate_and_log(&self) -> bool {
        let Some((client_id, client_secret)) = self.credentials() else {
            warn!(
                "Notion OAuth credentials missing or empty; callback requests will \
                 fail as misconfigured until NOTION_CLIENT_ID and NOTION_CLIENT_SECRET are set"
            );
            return false;
        };

        let fingerprint = self
            .secret_fingerprint()
            .unwrap_or_else(|| "none".to_owned());
        info!(
            "Notion OAuth configured: client_id={client_id}, secret_length={}, \
             secret_fingerprint={fingerprint}, redirect_uri={}",
            client_secret.len(),
            self.redirect_uri
        );

        if client_secret.len() < 20 {
            warn!(
                "Notion client_secret is unusually short ({} chars), check the deployment",
                client_secret.len()
            );
            return false;
        }
        true
    }
}
