// ABOUTME: The OAuth provisioning flow from provider redirect to persisted connection
// ABOUTME: Single-pass state machine with terminal failures and two non-fatal degradations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Notelink

//! # Provisioning Flow
//!
//! One invocation handles one authorization redirect end to end:
//!
//! 1. Inspect the callback for a provider error or a missing code.
//! 2. Validate and consume the `state` token, resolving the initiating user.
//! 3. Exchange the code for an access token.
//! 4. Provision the notes database with the token. Failure here is non-fatal:
//!    the flow continues with no database id and the fallback name.
//! 5. Persist the connection onto the user's record. Failure here is logged
//!    and swallowed; the user still sees success.
//!
//! Each step performs at most one side effect and is terminal on failure; a
//! transient network error reports as failure and the user re-initiates the
//! whole flow, which issues a fresh state.

use std::sync::Arc;
use tracing::{error, info, warn};

use super::state::OAuthStateRegistry;
use super::{CallbackParams, FailureReason, FlowOutcome, NotionApi, ProvisionedDatabase};
use crate::config::notion::NotionOAuthConfig;
use crate::database::ConnectionStore;
use crate::models::NotionConnection;

/// The OAuth provisioning flow
pub struct ProvisioningFlow {
    config: NotionOAuthConfig,
    notion: Arc<dyn NotionApi>,
    store: Arc<dyn ConnectionStore>,
    states: Arc<OAuthStateRegistry>,
}

impl ProvisioningFlow {
    /// Assemble the flow from its collaborators
    #[must_use]
    pub fn new(
        config: NotionOAuthConfig,
        notion: Arc<dyn NotionApi>,
        store: Arc<dyn ConnectionStore>,
        states: Arc<OAuthStateRegistry>,
    ) -> Self {
        Self {
            config,
            notion,
            store,
            states,
        }
    }

    /// Run the flow for one authorization redirect
    ///
    /// Never returns an error and never panics outward: every path lands in a
    /// [`FlowOutcome`] so the presentation layer is always reached.
    pub async fn handle_callback(&self, params: &CallbackParams) -> FlowOutcome {
        if let Some(provider_error) = &params.error {
            warn!(
                "Notion authorization denied: {provider_error} ({})",
                params.error_description.as_deref().unwrap_or("no detail")
            );
            return FlowOutcome::Failed {
                reason: FailureReason::ProviderDenied,
            };
        }

        let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
            warn!("Notion callback carried neither code nor error");
            return FlowOutcome::Failed {
                reason: FailureReason::MissingCode,
            };
        };

        let Some(state) = params.state.as_deref().filter(|s| !s.is_empty()) else {
            warn!("Notion callback missing state parameter");
            return FlowOutcome::Failed {
                reason: FailureReason::InvalidState,
            };
        };

        let user_id = match self.states.consume(state).await {
            Ok(user_id) => user_id,
            Err(e) => {
                warn!("Rejecting Notion callback with unusable state: {e}");
                return FlowOutcome::Failed {
                    reason: FailureReason::InvalidState,
                };
            }
        };

        if !self.config.is_configured() {
            warn!("Notion callback received but client credentials are not configured");
            return FlowOutcome::Failed {
                reason: FailureReason::Misconfigured,
            };
        }

        let grant = match self.notion.exchange_code(code).await {
            Ok(grant) => grant,
            Err(e) => {
                error!("Notion token exchange failed for user {user_id}: {e}");
                return FlowOutcome::Failed {
                    reason: FailureReason::TokenExchangeFailed,
                };
            }
        };

        info!(
            "Notion token exchanged for user {user_id}, workspace {}",
            grant.workspace_id
        );

        let database = match self.notion.create_notes_database(&grant.access_token).await {
            Ok(database) => database,
            Err(e) => {
                // Non-fatal: the user keeps a working connection without the
                // provisioned database and can create one from settings later.
                warn!("Notes database provisioning failed for user {user_id}: {e}");
                ProvisionedDatabase::fallback()
            }
        };

        let connection = NotionConnection::from_flow(grant, database);

        match self.store.upsert_connection(user_id, &connection).await {
            Ok(()) => {
                info!("Notion connection stored for user {user_id}");
                FlowOutcome::Succeeded { connection }
            }
            Err(e) => {
                // Swallowed: the token is valid and the user already granted
                // access, so the UX reports success while operators see the
                // storage failure in the logs.
                error!("Failed to persist Notion connection for user {user_id}: {e}");
                FlowOutcome::SucceededWithPersistenceWarning { connection }
            }
        }
    }
}
