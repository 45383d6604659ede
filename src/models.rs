// ABOUTME: Core data models for the Notelink integration service
// ABOUTME: Defines User and NotionConnection, the persisted credential bundle
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Notelink

//! # Data Models
//!
//! Core data structures shared across the service. `NotionConnection` is the
//! persisted bundle of token, workspace, and provisioned-database metadata tied
//! to exactly one user; each new authorization replaces the previous bundle
//! wholesale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::oauth::{ProvisionedDatabase, TokenGrant};

/// A registered user of the notes platform
///
/// Account management (registration, login, sessions) lives in the upstream
/// auth service; this service only reads user rows to anchor connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// User email address (used for identification)
    pub email: String,
    /// Display name
    pub display_name: Option<String>,
    /// When the user account was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the given email
    #[must_use]
    pub fn new(email: String, display_name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            display_name,
            created_at: Utc::now(),
        }
    }
}

/// Persisted Notion authorization for one user
///
/// Union of the token-exchange result, the provisioned database, and the
/// authorization timestamp. A row exists only as a complete record written in
/// one statement, so `connected_at` is present exactly when `access_token` is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotionConnection {
    /// Bearer credential for Notion API calls on behalf of this user
    pub access_token: String,
    /// Workspace the integration was installed into (empty if not reported)
    pub workspace_name: String,
    /// Provider-assigned workspace identifier
    pub workspace_id: String,
    /// Provider-assigned bot user identifier
    pub bot_id: String,
    /// Id of the provisioned notes database, `None` if provisioning failed
    pub database_id: Option<String>,
    /// Title of the provisioned database, or the fixed fallback name
    pub database_name: String,
    /// When the authorization completed
    pub connected_at: DateTime<Utc>,
}

impl NotionConnection {
    /// Assemble the persisted record from the two flow products
    #[must_use]
    pub fn from_flow(grant: TokenGrant, database: ProvisionedDatabase) -> Self {
        Self {
            access_token: grant.access_token,
            workspace_name: grant.workspace_name,
            workspace_id: grant.workspace_id,
            bot_id: grant.bot_id,
            database_id: database.database_id,
            database_name: database.database_name,
            connected_at: Utc::now(),
        }
    }
}
