// ABOUTME: Tests for the SQLite persistence layer
// ABOUTME: Covers user fixtures and atomic overwrite semantics of connection upserts
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 Notelink

mod common;

use common::{create_test_database, create_test_user, create_test_user_with_email};
use notelink::database::ConnectionStore;
use notelink::models::NotionConnection;
use notelink::oauth::{ProvisionedDatabase, TokenGrant};

fn connection(token: &str, workspace: &str, database_id: Option<&str>) -> NotionConnection {
    NotionConnection::from_flow(
        TokenGrant {
            access_token: token.to_string(),
            workspace_name: workspace.to_string(),
            workspace_id: format!("{workspace}-id"),
            bot_id: format!("{workspace}-bot"),
        },
        ProvisionedDatabase {
            database_id: database_id.map(ToOwned::to_owned),
            database_name: "Notes".to_string(),
        },
    )
}

#[tokio::test]
async fn users_round_trip_by_id_and_email() {
    let database = create_test_database().await.unwrap();
    let (user_id, user) = create_test_user(&database).await.unwrap();

    let by_id = database.get_user(user_id).await.unwrap().unwrap();
    assert_eq!(by_id.email, user.email);
    assert_eq!(by_id.display_name, user.display_name);

    let by_email = database
        .get_user_by_email(&user.email)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, user_id);

    assert!(database
        .get_user(uuid::Uuid::new_v4())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn duplicate_emails_are_rejected() {
    let database = create_test_database().await.unwrap();
    create_test_user_with_email(&database, "dup@example.com")
        .await
        .unwrap();

    assert!(create_test_user_with_email(&database, "dup@example.com")
        .await
        .is_err());
}

#[tokio::test]
async fn connection_round_trips_with_every_field() {
    let database = create_test_database().await.unwrap();
    let (user_id, _user) = create_test_user(&database).await.unwrap();

    let stored = connection("token-a", "Workspace A", Some("db-a"));
    database.upsert_connection(user_id, &stored).await.unwrap();

    let loaded = database.get_connection(user_id).await.unwrap().unwrap();
    assert_eq!(loaded, stored);
}

#[tokio::test]
async fn reupsert_replaces_every_field_atomically() {
    let database = create_test_database().await.unwrap();
    let (user_id, _user) = create_test_user(&database).await.unwrap();

    let first = connection("token-a", "Workspace A", Some("db-a"));
    database.upsert_connection(user_id, &first).await.unwrap();

    let second = connection("token-b", "Workspace B", None);
    database.upsert_connection(user_id, &second).await.unwrap();

    // No field of the first record survives the second authorization.
    let loaded = database.get_connection(user_id).await.unwrap().unwrap();
    assert_eq!(loaded, second);
    assert_eq!(loaded.database_id, None);
    assert_ne!(loaded.access_token, first.access_token);
    assert_ne!(loaded.workspace_id, first.workspace_id);
}

#[tokio::test]
async fn clear_connection_removes_the_record() {
    let database = create_test_database().await.unwrap();
    let (user_id, _user) = create_test_user(&database).await.unwrap();

    let stored = connection("token-a", "Workspace A", Some("db-a"));
    database.upsert_connection(user_id, &stored).await.unwrap();
    database.clear_connection(user_id).await.unwrap();

    assert!(database.get_connection(user_id).await.unwrap().is_none());

    // Clearing an absent record is a no-op, not an error.
    database.clear_connection(user_id).await.unwrap();
}
