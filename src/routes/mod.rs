// ABOUTME: Route module organization for Notelink HTTP endpoints
// ABOUTME: Provides route definitions organized by domain with thin handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Notelink

//! Route modules
//!
//! Each domain module contains route definitions and thin handler functions
//! that delegate to the flow and storage layers.

/// Health check and system status routes
pub mod health;
/// Notion integration routes (connect, callback, status, disconnect)
pub mod notion;

pub use health::HealthRoutes;
pub use notion::NotionRoutes;
