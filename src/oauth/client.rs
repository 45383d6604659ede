// ABOUTME: Notion API client for token exchange and workspace database provisioning
// ABOUTME: Implements the outbound half of the OAuth provisioning flow over reqwest
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 Notelink

//! Notion API client
//!
//! Two outbound calls back the provisioning flow: the authorization-code
//! exchange (HTTP Basic, JSON body) and the database creation (Bearer token,
//! fixed property schema). Non-2xx responses surface as typed errors with the
//! provider body logged server-side, never bubbled to the user verbatim.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;
use url::Url;

use super::{NotionApi, OAuthError, ProvisionedDatabase, TokenGrant};
use crate::config::notion::NotionOAuthConfig;
use crate::constants::notion;
use crate::constants::oauth::HTTP_TIMEOUT_SECS;

/// Notion token endpoint response format
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    workspace_name: Option<String>,
    workspace_id: String,
    bot_id: String,
}

/// Notion database-creation response, reduced to the fields we read
#[derive(Debug, Deserialize)]
struct CreatedDatabase {
    id: String,
    #[serde(default)]
    title: Vec<TitleItem>,
}

#[derive(Debug, Deserialize)]
struct TitleItem {
    text: Option<TitleText>,
}

#[derive(Debug, Deserialize)]
struct TitleText {
    content: String,
}

/// HTTP client for the Notion API
pub struct NotionClient {
    config: NotionOAuthConfig,
    client: reqwest::Client,
}

impl NotionClient {
    /// Create a new client from the given configuration
    #[must_use]
    pub fn new(config: NotionOAuthConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    fn token_url(&self) -> String {
        format!("{}/v1/oauth/token", self.config.api_base)
    }

    fn databases_url(&self) -> String {
        format!("{}/v1/databases", self.config.api_base)
    }

    /// Fixed schema of the provisioned notes database: one title property,
    /// fixed-option selects, one multi-select, one date property.
    fn database_request_body() -> serde_json::Value {
        serde_json::json!({
            "parent": { "type": "workspace", "workspace": true },
            "title": [
                { "type": "text", "text": { "content": notion::DEFAULT_DATABASE_NAME } }
            ],
            "properties": {
                "Name": { "title": {} },
                "Status": {
                    "select": {
                        "options": [
                            { "name": "Draft", "color": "gray" },
                            { "name": "In Progress", "color": "blue" },
                            { "name": "Done", "color": "green" }
                        ]
                    }
                },
                "Priority": {
                    "select": {
                        "options": [
                            { "name": "Low", "color": "gray" },
                            { "name": "Medium", "color": "yellow" },
                            { "name": "High", "color": "red" }
                        ]
                    }
                },
                "Tags": {
                    "multi_select": {
                        "options": [
                            { "name": "Personal", "color": "purple" },
                            { "name": "Work", "color": "orange" },
                            { "name": "Ideas", "color": "pink" }
                        ]
                    }
                },
                "Due Date": { "date": {} }
            }
        })
    }
}

#[async_trait]
impl NotionApi for NotionClient {
    fn authorization_url(&self, state: &str) -> Result<String, OAuthError> {
        let (client_id, _) = self.config.credentials().ok_or_else(|| {
            OAuthError::ConfigurationError("NOTION_CLIENT_ID not set".to_owned())
        })?;

        let mut url = Url::parse(notion::AUTHORIZE_URL)
            .map_err(|e| OAuthError::ConfigurationError(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("owner", "user")
            .append_pair("state", state);

        Ok(url.to_string())
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, OAuthError> {
        let (client_id, client_secret) = self.config.credentials().ok_or_else(|| {
            OAuthError::ConfigurationError("Notion client credentials not set".to_owned())
        })?;

        let auth_header =
            general_purpose::STANDARD.encode(format!("{client_id}:{client_secret}"));

        let response = self
            .client
            .post(self.token_url())
            .header("Authorization", format!("Basic {auth_header}"))
            .header("Notion-Version", notion::API_VERSION)
            .json(&serde_json::json!({
                "grant_type": "authorization_code",
                "code": code,
                "redirect_uri": self.config.redirect_uri,
            }))
            .send()
            .await
            .map_err(|e| OAuthError::TokenExchangeFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Notion token endpoint returned {status}: {body}");
            return Err(OAuthError::TokenExchangeFailed(format!(
                "provider returned {status}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| OAuthError::TokenExchangeFailed(format!("parse error: {e}")))?;

        Ok(TokenGrant {
            access_token: token_response.access_token,
            workspace_name: token_response.workspace_name.unwrap_or_default(),
            workspace_id: token_response.workspace_id,
            bot_id: token_response.bot_id,
        })
    }

    async fn create_notes_database(
        &self,
        access_token: &str,
    ) -> Result<ProvisionedDatabase, OAuthError> {
        let response = self
            .client
            .post(self.databases_url())
            .header("Authorization", format!("Bearer {access_token}"))
            .header("Notion-Version", notion::API_VERSION)
            .json(&Self::database_request_body())
            .send()
            .await
            .map_err(|e| OAuthError::ProvisioningFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Notion database creation returned {status}: {body}");
            return Err(OAuthError::ProvisioningFailed(format!(
                "provider returned {status}"
            )));
        }

        let created: CreatedDatabase = response
            .json()
            .await
            .map_err(|e| OAuthError::ProvisioningFailed(format!("parse error: {e}")))?;

        let database_name = created
            .title
            .first()
            .and_then(|item| item.text.as_ref())
            .map(|text| text.content.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| notion::DEFAULT_DATABASE_NAME.to_owned());

        Ok(ProvisionedDatabase {
            database_id: Some(created.id),
            database_name,
        })
    }
}
