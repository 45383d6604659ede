// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Database Layer
//!
//! SQLite-backed persistence for user records and Notion connections. The
//! schema is created idempotently at startup. Connection writes are single
//! upsert statements, so a re-authorization replaces every field of the prior
//! record atomically; partial old/new mixes are not observable.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::{NotionConnection, User};

/// Persistence seam for Notion connections
///
/// The provisioning flow depends on this trait rather than on [`Database`]
/// directly so tests can observe upserts and inject storage failures.
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    /// Replace the user's connection record with the given one
    async fn upsert_connection(&self, user_id: Uuid, connection: &NotionConnection)
        -> Result<()>;

    /// Fetch the user's connection record, if any
    async fn get_connection(&self, user_id: Uuid) -> Result<Option<NotionConnection>>;

    /// Remove the user's connection record
    async fn clear_connection(&self, user_id: Uuid) -> Result<()>;
}

/// SQLite database handle
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if necessary) the database and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the file cannot be created,
    /// or a migration statement fails
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid database URL: {database_url}"))?
            .create_if_missing(true);

        // A pooled in-memory SQLite gives every connection its own empty
        // database; pin those to a single connection so the schema survives.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("failed to open database")?;

        let database = Self { pool };
        database.migrate().await?;
        Ok(database)
    }

    /// Create tables and indexes if they do not exist
    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                display_name TEXT,
                created_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS notion_connections (
                user_id TEXT PRIMARY KEY,
                access_token TEXT NOT NULL,
                workspace_name TEXT NOT NULL,
                workspace_id TEXT NOT NULL,
                bot_id TEXT NOT NULL,
                database_id TEXT,
                database_name TEXT NOT NULL,
                connected_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a new user record
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already registered or the write fails
    pub async fn create_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO users (id, email, display_name, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch a user by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed
    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| Self::row_to_user(&r)).transpose()
    }

    /// Fetch a user by email
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| Self::row_to_user(&r)).transpose()
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
        let id: String = row.try_get("id")?;
        Ok(User {
            id: Uuid::parse_str(&id).context("malformed user id")?,
            email: row.try_get("email")?,
            display_name: row.try_get("display_name")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_connection(row: &sqlx::sqlite::SqliteRow) -> Result<NotionConnection> {
        Ok(NotionConnection {
            access_token: row.try_get("access_token")?,
            workspace_name: row.try_get("workspace_name")?,
            workspace_id: row.try_get("workspace_id")?,
            bot_id: row.try_get("bot_id")?,
            database_id: row.try_get("database_id")?,
            database_name: row.try_get("database_name")?,
            connected_at: row.try_get::<DateTime<Utc>, _>("connected_at")?,
        })
    }
}

#[async_trait]
impl ConnectionStore for Database {
    async fn upsert_connection(
        &self,
        user_id: Uuid,
        connection: &NotionConnection,
    ) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO notion_connections (
                user_id, access_token, workspace_name, workspace_id, bot_id,
                database_id, database_name, connected_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id)
            DO UPDATE SET
                access_token = EXCLUDED.access_token,
                workspace_name = EXCLUDED.workspace_name,
                workspace_id = EXCLUDED.workspace_id,
                bot_id = EXCLUDED.bot_id,
                database_id = EXCLUDED.database_id,
                database_name = EXCLUDED.database_name,
                connected_at = EXCLUDED.connected_at,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(user_id.to_string())
        .bind(&connection.access_token)
        .bind(&connection.workspace_name)
        .bind(&connection.workspace_id)
        .bind(&connection.bot_id)
        .bind(&connection.database_id)
        .bind(&connection.database_name)
        .bind(connection.connected_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_connection(&self, user_id: Uuid) -> Result<Option<NotionConnection>> {
        let row = sqlx::query("SELECT * FROM notion_connections WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| Self::row_to_connection(&r)).transpose()
    }

    async fn clear_connection(&self, user_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM notion_connections WHERE user_id = $1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
