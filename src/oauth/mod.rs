// ABOUTME: OAuth module for the Notion workspace integration
// ABOUTME: Centralizes the provisioning flow, API client, state registry, and presenters
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Notion OAuth Module
//!
//! The authorization-code exchange and post-authorization provisioning flow:
//! receive the provider redirect, exchange the code for an access token,
//! provision a notes database in the workspace, and persist the credential
//! bundle against the initiating user.

pub mod client;
pub mod flow;
pub mod presenter;
pub mod state;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Query parameters delivered by the provider's authorization redirect
///
/// Consumed exactly once per invocation; never persisted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    /// One-time exchangeable authorization code, present only on success
    pub code: Option<String>,
    /// Correlation token issued by this service when the flow started
    pub state: Option<String>,
    /// Provider error code when the user denied authorization
    pub error: Option<String>,
    /// Provider's human-readable error detail
    pub error_description: Option<String>,
}

/// Product of a successful token exchange, held in memory only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    /// Bearer credential for subsequent provider API calls
    pub access_token: String,
    /// Workspace display name, empty when the provider omits it
    pub workspace_name: String,
    /// Provider-assigned workspace identifier
    pub workspace_id: String,
    /// Provider-assigned bot user identifier
    pub bot_id: String,
}

/// Result of the database-provisioning step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedDatabase {
    /// Id of the created database, `None` when creation failed
    pub database_id: Option<String>,
    /// Title of the created database, or the fixed fallback name
    pub database_name: String,
}

impl ProvisionedDatabase {
    /// The degraded result used when provisioning fails: no id, fallback name
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            database_id: None,
            database_name: crate::constants::notion::DEFAULT_DATABASE_NAME.to_owned(),
        }
    }
}

/// OAuth error types
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// Token endpoint rejected the exchange or could not be reached
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// Database-creation endpoint rejected the request or could not be reached
    #[error("Database provisioning failed: {0}")]
    ProvisioningFailed(String),

    /// State parameter unknown, expired, or already consumed
    #[error("Invalid state parameter")]
    InvalidState,

    /// Client credentials missing or unusable
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Outbound Notion API surface used by the provisioning flow
///
/// Trait seam so the flow is testable without network access.
#[async_trait]
pub trait NotionApi: Send + Sync {
    /// Build the user-facing authorization URL carrying the given state
    ///
    /// # Errors
    ///
    /// Returns an error if the client ID is not configured
    fn authorization_url(&self, state: &str) -> Result<String, OAuthError>;

    /// Exchange an authorization code for an access token
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, OAuthError>;

    /// Create the notes database in the authorized workspace
    async fn create_notes_database(
        &self,
        access_token: &str,
    ) -> Result<ProvisionedDatabase, OAuthError>;
}

/// Terminal failure reasons of the provisioning flow
///
/// Resource-creation and persistence failures are recoverable-and-continue,
/// so they do not appear here; they surface as a missing database id and the
/// persistence-warning outcome respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The provider reported an error on the redirect (user denied access)
    ProviderDenied,
    /// The redirect carried neither a code nor an error
    MissingCode,
    /// The state token was unknown, expired, or already consumed
    InvalidState,
    /// Client credentials are not configured
    Misconfigured,
    /// The token endpoint rejected the exchange
    TokenExchangeFailed,
    /// Unexpected internal error
    ServerError,
}

impl FailureReason {
    /// Stable machine-readable identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProviderDenied => "provider_denied",
            Self::MissingCode => "missing_code",
            Self::InvalidState => "invalid_state",
            Self::Misconfigured => "misconfigured",
            Self::TokenExchangeFailed => "token_exchange_failed",
            Self::ServerError => "server_error",
        }
    }

    /// Short human-readable message shown to the end user
    #[must_use]
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::ProviderDenied => "Notion authorization was denied",
            Self::MissingCode => "No authorization code was received from Notion",
            Self::InvalidState => "This authorization link is no longer valid, please try again",
            Self::Misconfigured => "Notion integration is not configured on this server",
            Self::TokenExchangeFailed => "Could not complete the Notion authorization",
            Self::ServerError => "Something went wrong while connecting to Notion",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one provisioning-flow invocation
///
/// The flow never returns `Err` and never panics outward; every path lands in
/// one of these variants so the presentation layer is always reached.
#[derive(Debug, Clone)]
pub enum FlowOutcome {
    /// Token exchanged, record persisted
    Succeeded {
        /// The persisted connection
        connection: crate::models::NotionConnection,
    },
    /// Token exchanged but the record could not be persisted; externally
    /// indistinguishable from success, distinguishable here for callers
    SucceededWithPersistenceWarning {
        /// The connection that failed to persist
        connection: crate::models::NotionConnection,
    },
    /// Terminal failure
    Failed {
        /// Why the flow stopped
        reason: FailureReason,
    },
}

impl FlowOutcome {
    /// The connection if the flow succeeded in either form
    #[must_use]
    pub const fn connection(&self) -> Option<&crate::models::NotionConnection> {
        match self {
            Self::Succeeded { connection } | Self::SucceededWithPersistenceWarning { connection } => {
                Some(connection)
            }
            Self::Failed { .. } => None,
        }
    }

    /// Whether the user should see a success message
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.connection().is_some()
    }
}
