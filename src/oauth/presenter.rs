// ABOUTME: Callback result presentation strategies for the OAuth flow
// ABOUTME: Popup postMessage HTML and settings-page redirect, selected by deployment config
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Notelink

//! Callback presenters
//!
//! The flow produces a [`FlowOutcome`]; how that reaches the end user is a
//! deployment concern. Web clients opening the authorization in a popup get an
//! HTML page that posts a message to the opener window and closes itself;
//! full-page flows get a 302 back to the settings page with result query
//! parameters. The persistence-warning outcome renders identically to success
//! in both modes.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::error;

use super::{FailureReason, FlowOutcome};
use crate::constants::routes::SETTINGS_PATH;
use crate::models::NotionConnection;

/// Message type posted to the opener on success
pub const POPUP_SUCCESS_TYPE: &str = "NOTION_AUTH_SUCCESS";
/// Message type posted to the opener on failure
pub const POPUP_ERROR_TYPE: &str = "NOTION_AUTH_ERROR";

/// Renders a flow outcome as an HTTP response
pub trait CallbackPresenter: Send + Sync {
    /// Produce the response delivered to the user's browser
    fn render(&self, outcome: &FlowOutcome) -> Response;
}

/// Popup-window presenter: posts the result to `window.opener` and closes
pub struct PopupPresenter;

impl PopupPresenter {
    /// Escape a serialized JSON payload for embedding inside a `<script>`
    /// element. Every `<` is rewritten to its unicode escape so a
    /// `</script>` inside a string field cannot terminate the element.
    fn escape_for_script(json: &str) -> String {
        json.replace('<', "\\u003c")
    }

    fn payload(outcome: &FlowOutcome) -> String {
        let value = match outcome {
            FlowOutcome::Succeeded { connection }
            | FlowOutcome::SucceededWithPersistenceWarning { connection } => {
                serde_json::json!({ "type": POPUP_SUCCESS_TYPE, "data": connection })
            }
            FlowOutcome::Failed { reason } => {
                serde_json::json!({ "type": POPUP_ERROR_TYPE, "error": reason.user_message() })
            }
        };

        match serde_json::to_string(&value) {
            Ok(json) => Self::escape_for_script(&json),
            Err(e) => {
                error!("Failed to serialize popup payload: {e}");
                let fallback = serde_json::json!({
                    "type": POPUP_ERROR_TYPE,
                    "error": FailureReason::ServerError.user_message(),
                });
                fallback.to_string()
            }
        }
    }
}

impl CallbackPresenter for PopupPresenter {
    fn render(&self, outcome: &FlowOutcome) -> Response {
        let payload = Self::payload(outcome);
        let notice = if outcome.is_success() {
            "Notion connected. You can close this window."
        } else {
            "Notion connection failed. You can close this window."
        };

        let html = format!(
            r#"<!DOCTYPE html>
<html>
<head><title>Notion Connection</title></head>
<body>
    <p>{notice}</p>
    <script>
        if (window.opener) {{
            window.opener.postMessage({payload}, "*");
        }}
        window.close();
    </script>
</body>
</html>
"#
        );

        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            html,
        )
            .into_response()
    }
}

/// Redirect presenter: 302 back to the settings page with result parameters
pub struct RedirectPresenter {
    settings_path: String,
}

impl RedirectPresenter {
    /// Presenter targeting the fixed settings path
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings_path: SETTINGS_PATH.to_owned(),
        }
    }

    fn success_location(&self, connection: &NotionConnection) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query.append_pair("notion", "connected");
        query.append_pair("workspace_name", &connection.workspace_name);
        query.append_pair("database_name", &connection.database_name);
        if let Some(database_id) = &connection.database_id {
            query.append_pair("database_id", database_id);
        }
        format!("{}?{}", self.settings_path, query.finish())
    }

    fn failure_location(&self, reason: FailureReason) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query.append_pair("notionError", reason.user_message());
        format!("{}?{}", self.settings_path, query.finish())
    }
}

impl Default for RedirectPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackPresenter for RedirectPresenter {
    fn render(&self, outcome: &FlowOutcome) -> Response {
        let location = match outcome {
            FlowOutcome::Succeeded { connection }
            | FlowOutcome::SucceededWithPersistenceWarning { connection } => {
                self.success_location(connection)
            }
            FlowOutcome::Failed { reason } => self.failure_location(*reason),
        };

        (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
    }
}
