// ABOUTME: End-to-end tests for the Notion integration REST API
// ABOUTME: Drives the axum router with a fake provider through connect, callback, status, disconnect
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 Notelink

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::{create_test_database, create_test_user, test_notion_config, FakeNotionApi};
use notelink::config::notion::CallbackMode;
use notelink::config::ServerConfig;
use notelink::oauth::NotionApi;
use notelink::server::{HttpServer, ServerResources};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn test_config(callback_mode: CallbackMode) -> ServerConfig {
    let mut notion = test_notion_config(true);
    notion.callback_mode = callback_mode;
    ServerConfig {
        http_port: 0,
        base_url: "http://localhost:8081".to_string(),
        database_url: "sqlite::memory:".to_string(),
        notion,
    }
}

async fn test_stack(
    callback_mode: CallbackMode,
    api: FakeNotionApi,
) -> anyhow::Result<(Router, Arc<ServerResources>, Uuid)> {
    let database = create_test_database().await?;
    let (user_id, _user) = create_test_user(&database).await?;

    let resources = Arc::new(ServerResources::with_notion_api(
        database,
        Arc::new(test_config(callback_mode)),
        Arc::new(api) as Arc<dyn NotionApi>,
    ));
    let router = HttpServer::new(resources.clone()).router();
    Ok((router, resources, user_id))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str, user_id: Option<Uuid>) -> Request<Body> {
    let builder = Request::builder().uri(uri);
    let builder = match user_id {
        Some(user_id) => builder.header("x-user-id", user_id.to_string()),
        None => builder,
    };
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_the_service() {
    let (router, _resources, _user_id) =
        test_stack(CallbackMode::Popup, FakeNotionApi::succeeding())
            .await
            .unwrap();

    let response = router.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "notelink");
}

#[tokio::test]
async fn connect_requires_authentication() {
    let (router, _resources, _user_id) =
        test_stack(CallbackMode::Popup, FakeNotionApi::succeeding())
            .await
            .unwrap();

    let response = router
        .oneshot(get("/api/notion/connect", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn connect_rejects_unknown_users() {
    let (router, _resources, _user_id) =
        test_stack(CallbackMode::Popup, FakeNotionApi::succeeding())
            .await
            .unwrap();

    let response = router
        .oneshot(get("/api/notion/connect", Some(Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn connect_issues_a_state_bound_authorization_url() {
    let (router, resources, user_id) =
        test_stack(CallbackMode::Popup, FakeNotionApi::succeeding())
            .await
            .unwrap();

    let response = router
        .oneshot(get("/api/notion/connect", Some(user_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let state = json["state"].as_str().unwrap();
    assert!(state.starts_with(&user_id.to_string()));
    assert!(json["authorization_url"]
        .as_str()
        .unwrap()
        .contains(state));
    assert_eq!(resources.oauth_states.outstanding().await, 1);
}

#[tokio::test]
async fn full_flow_connect_callback_status_disconnect() {
    let (router, resources, user_id) =
        test_stack(CallbackMode::Popup, FakeNotionApi::succeeding())
            .await
            .unwrap();

    let state = resources.oauth_states.issue(user_id).await;
    let callback_uri = format!("/api/notion/callback?code=auth-code&state={state}");
    let response = router
        .clone()
        .oneshot(get(&callback_uri, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/html; charset=utf-8"
    );

    let response = router
        .clone()
        .oneshot(get("/api/notion/status", Some(user_id)))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["connected"], true);
    assert_eq!(json["workspace_name"], "Acme Workspace");
    assert_eq!(json["database_id"], "db-789");
    // The access token never leaves through the status endpoint.
    assert!(json.get("access_token").is_none());

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/notion/connection")
                .header("x-user-id", user_id.to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = router
        .oneshot(get("/api/notion/status", Some(user_id)))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["connected"], false);
}

#[tokio::test]
async fn callback_with_provider_error_renders_the_error_in_redirect_mode() {
    let (router, _resources, _user_id) =
        test_stack(CallbackMode::Redirect, FakeNotionApi::succeeding())
            .await
            .unwrap();

    let response = router
        .oneshot(get("/api/notion/callback?error=access_denied", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);

    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with("/settings?"));
    assert!(location.contains("notionError="));
}

#[tokio::test]
async fn callback_with_stale_state_fails_but_still_renders() {
    let (router, _resources, _user_id) =
        test_stack(CallbackMode::Popup, FakeNotionApi::succeeding())
            .await
            .unwrap();

    let response = router
        .oneshot(get(
            "/api/notion/callback?code=auth-code&state=stale-state",
            None,
        ))
        .await
        .unwrap();

    // Popup mode always answers 200 HTML so the window can close itself.
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(body.contains("NOTION_AUTH_ERROR"));
}
