// ABOUTME: Main library entry point for the Notelink integration service
// ABOUTME: Provides the Notion OAuth provisioning flow and its REST API surface
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Notelink

#![deny(unsafe_code)]

//! # Notelink Integration Service
//!
//! Backend service connecting Notelink accounts to Notion workspaces. The core
//! is the OAuth authorization-code exchange and post-authorization
//! provisioning flow: receive the provider redirect, exchange the code for an
//! access token, provision a notes database in the workspace, and persist the
//! credential bundle against the initiating user.
//!
//! ## Architecture
//!
//! - **`oauth`**: the provisioning flow, Notion API client, state registry,
//!   and result presenters
//! - **`database`**: SQLite persistence for users and connections
//! - **`routes`**: REST endpoints (connect, callback, status, disconnect)
//! - **`config`**: environment-driven configuration, validated at startup
//! - **`server`**: resource container and HTTP server assembly
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use notelink::config::ServerConfig;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = ServerConfig::from_env()?;
//! println!("Notelink configured: {}", config.summary());
//! # Ok(())
//! # }
//! ```

/// Configuration management and environment loading
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// SQLite persistence for users and Notion connections
pub mod database;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Logging configuration and initialization
pub mod logging;

/// Core data models
pub mod models;

/// Notion OAuth provisioning flow and collaborators
pub mod oauth;

/// HTTP route definitions
pub mod routes;

/// Resource container and HTTP server
pub mod server;
