// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides database fixtures, fake collaborators, and user creation helpers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 Notelink
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
//! Shared test utilities for `notelink`
//!
//! Common setup functions and fake collaborators to reduce duplication across
//! integration tests.

use anyhow::Result;
use async_trait::async_trait;
use notelink::{
    config::notion::{CallbackMode, NotionOAuthConfig},
    database::{ConnectionStore, Database},
    models::{NotionConnection, User},
    oauth::{NotionApi, OAuthError, ProvisionedDatabase, TokenGrant},
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use tokio::sync::RwLock;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Arc<Database>> {
    init_test_logging();
    let database = Arc::new(Database::new("sqlite::memory:").await?);
    Ok(database)
}

/// Create a standard test user
pub async fn create_test_user(database: &Database) -> Result<(Uuid, User)> {
    let user = User::new(
        "test@example.com".to_string(),
        Some("Test User".to_string()),
    );
    let user_id = user.id;

    database.create_user(&user).await?;
    Ok((user_id, user))
}

/// Create a test user with custom email
pub async fn create_test_user_with_email(database: &Database, email: &str) -> Result<(Uuid, User)> {
    let user = User::new(email.to_string(), Some("Test User".to_string()));
    let user_id = user.id;

    database.create_user(&user).await?;
    Ok((user_id, user))
}

/// Notion OAuth config with usable or intentionally missing credentials
pub fn test_notion_config(configured: bool) -> NotionOAuthConfig {
    NotionOAuthConfig {
        client_id: configured.then(|| "test-client-id".to_string()),
        client_secret: configured.then(|| "test-client-secret-long-enough".to_string()),
        redirect_uri: "http://localhost:8081/api/notion/callback".to_string(),
        api_base: "http://localhost:9999".to_string(),
        callback_mode: CallbackMode::Popup,
    }
}

/// The token grant the fake provider hands out
pub fn sample_grant() -> TokenGrant {
    TokenGrant {
        access_token: "secret-token".to_string(),
        workspace_name: "Acme Workspace".to_string(),
        workspace_id: "ws-123".to_string(),
        bot_id: "bot-456".to_string(),
    }
}

/// The database the fake provider provisions
pub fn sample_database() -> ProvisionedDatabase {
    ProvisionedDatabase {
        database_id: Some("db-789".to_string()),
        database_name: "Notes".to_string(),
    }
}

/// A persisted connection for presenter and storage tests
pub fn sample_connection() -> NotionConnection {
    NotionConnection::from_flow(sample_grant(), sample_database())
}

/// Fake Notion API with per-endpoint failure switches and call counters
pub struct FakeNotionApi {
    /// Fail the token exchange with a provider error
    pub fail_exchange: bool,
    /// Fail the database creation with a provider error
    pub fail_create: bool,
    exchange_calls: AtomicUsize,
    create_calls: AtomicUsize,
}

impl FakeNotionApi {
    pub fn succeeding() -> Self {
        Self::new(false, false)
    }

    pub fn new(fail_exchange: bool, fail_create: bool) -> Self {
        Self {
            fail_exchange,
            fail_create,
            exchange_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
        }
    }

    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotionApi for FakeNotionApi {
    fn authorization_url(&self, state: &str) -> Result<String, OAuthError> {
        Ok(format!("https://example.test/authorize?state={state}"))
    }

    async fn exchange_code(&self, _code: &str) -> Result<TokenGrant, OAuthError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_exchange {
            return Err(OAuthError::TokenExchangeFailed(
                "provider returned 400".to_string(),
            ));
        }
        Ok(sample_grant())
    }

    async fn create_notes_database(
        &self,
        _access_token: &str,
    ) -> Result<ProvisionedDatabase, OAuthError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create {
            return Err(OAuthError::ProvisioningFailed(
                "provider returned 500".to_string(),
            ));
        }
        Ok(sample_database())
    }
}

/// In-memory connection store for observing flow writes
#[derive(Default)]
pub struct MemoryStore {
    connections: RwLock<HashMap<Uuid, NotionConnection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionStore for MemoryStore {
    async fn upsert_connection(
        &self,
        user_id: Uuid,
        connection: &NotionConnection,
    ) -> Result<()> {
        self.connections
            .write()
            .await
            .insert(user_id, connection.clone());
        Ok(())
    }

    async fn get_connection(&self, user_id: Uuid) -> Result<Option<NotionConnection>> {
        Ok(self.connections.read().await.get(&user_id).cloned())
    }

    async fn clear_connection(&self, user_id: Uuid) -> Result<()> {
        self.connections.write().await.remove(&user_id);
        Ok(())
    }
}

/// Connection store whose writes always fail
pub struct FailingStore;

#[async_trait]
impl ConnectionStore for FailingStore {
    async fn upsert_connection(
        &self,
        _user_id: Uuid,
        _connection: &NotionConnection,
    ) -> Result<()> {
        Err(anyhow::anyhow!("storage backend unavailable"))
    }

    async fn get_connection(&self, _user_id: Uuid) -> Result<Option<NotionConnection>> {
        Err(anyhow::anyhow!("storage backend unavailable"))
    }

    async fn clear_connection(&self, _user_id: Uuid) -> Result<()> {
        Err(anyhow::anyhow!("storage backend unavailable"))
    }
}
