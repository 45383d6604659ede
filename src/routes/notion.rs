// ABOUTME: Route handlers for the Notion integration REST API
// ABOUTME: Connect URL issuance, OAuth callback entry point, status, and disconnect
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Notelink

//! Notion integration routes
//!
//! The authenticated endpoints trust the `x-user-id` header injected by the
//! upstream auth gateway; session mechanics live there, not here. The callback
//! endpoint is unauthenticated by nature (the browser arrives from Notion) and
//! correlates the request to a user through the consumed state token.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::notion::CallbackMode;
use crate::constants::oauth::STATE_TTL_MINUTES;
use crate::errors::AppError;
use crate::oauth::presenter::{CallbackPresenter, PopupPresenter, RedirectPresenter};
use crate::oauth::CallbackParams;
use crate::server::ServerResources;

/// Response for `GET /api/notion/connect`
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthorizationUrlResponse {
    /// URL the client should open in a popup or full page
    pub authorization_url: String,
    /// State token bound to this flow attempt
    pub state: String,
    /// How long the state stays valid
    pub expires_in_minutes: i64,
}

/// Response for `GET /api/notion/status`
#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectionStatusResponse {
    /// Whether a connection exists for the user
    pub connected: bool,
    /// Workspace display name, when connected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_name: Option<String>,
    /// Workspace identifier, when connected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    /// Provisioned database id, when one was created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,
    /// Provisioned database title, when connected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    /// When the authorization completed, when connected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<DateTime<Utc>>,
}

/// Notion integration route handlers
pub struct NotionRoutes;

impl NotionRoutes {
    /// Create all Notion integration routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/notion/connect", get(Self::handle_connect))
            .route("/api/notion/callback", get(Self::handle_callback))
            .route("/api/notion/status", get(Self::handle_status))
            .route("/api/notion/connection", delete(Self::handle_disconnect))
            .with_state(resources)
    }

    /// Resolve the authenticated user from the gateway-injected header
    async fn authenticate(
        headers: &HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> Result<Uuid, AppError> {
        let user_id = headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(AppError::auth_required)?;

        let user_id = Uuid::parse_str(user_id)
            .map_err(|_| AppError::auth_invalid("x-user-id is not a valid user id"))?;

        resources
            .database
            .get_user(user_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load user {user_id}: {e}")))?
            .ok_or_else(|| AppError::not_found(format!("User {user_id}")))?;

        Ok(user_id)
    }

    /// Handle `GET /api/notion/connect` - issue a state and authorization URL
    async fn handle_connect(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user_id = Self::authenticate(&headers, &resources).await?;

        let state = resources.oauth_states.issue(user_id).await;
        let authorization_url = resources
            .notion
            .authorization_url(&state)
            .map_err(|e| AppError::config(format!("Cannot build authorization URL: {e}")))?;

        tracing::info!("Issued Notion authorization URL for user {user_id}");

        let response = AuthorizationUrlResponse {
            authorization_url,
            state,
            expires_in_minutes: STATE_TTL_MINUTES,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle `GET /api/notion/callback` - the provisioning flow entry point
    ///
    /// Always renders through the configured presenter; never returns an
    /// error response shape of its own.
    async fn handle_callback(
        State(resources): State<Arc<ServerResources>>,
        Query(params): Query<CallbackParams>,
    ) -> Response {
        let outcome = resources.flow.handle_callback(&params).await;

        match resources.config.notion.callback_mode {
            CallbackMode::Popup => PopupPresenter.render(&outcome),
            CallbackMode::Redirect => RedirectPresenter::new().render(&outcome),
        }
    }

    /// Handle `GET /api/notion/status` - connection summary without the token
    async fn handle_status(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user_id = Self::authenticate(&headers, &resources).await?;

        let connection = resources
            .store()
            .get_connection(user_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load connection: {e}")))?;

        let response = connection.map_or_else(
            || ConnectionStatusResponse {
                connected: false,
                workspace_name: None,
                workspace_id: None,
                database_id: None,
                database_name: None,
                connected_at: None,
            },
            |connection| ConnectionStatusResponse {
                connected: true,
                workspace_name: Some(connection.workspace_name),
                workspace_id: Some(connection.workspace_id),
                database_id: connection.database_id,
                database_name: Some(connection.database_name),
                connected_at: Some(connection.connected_at),
            },
        );

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle `DELETE /api/notion/connection` - drop the stored connection
    async fn handle_disconnect(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user_id = Self::authenticate(&headers, &resources).await?;

        resources
            .store()
            .clear_connection(user_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to clear connection: {e}")))?;

        tracing::info!("Notion connection removed for user {user_id}");
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }
}
