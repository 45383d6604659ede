// ABOUTME: Application constants shared across the Notelink integration service
// ABOUTME: Centralizes Notion API endpoints, ports, and OAuth flow parameters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Notelink

//! Application-wide constants

/// Default network ports
pub mod ports {
    /// Default HTTP port for the integration service
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
}

/// Notion API endpoints and protocol values
pub mod notion {
    /// Base URL of the Notion API (overridable via `NOTION_API_BASE`)
    pub const DEFAULT_API_BASE: &str = "https://api.notion.com";

    /// Notion API version header value sent on every request
    pub const API_VERSION: &str = "2022-06-28";

    /// User-facing authorization endpoint
    pub const AUTHORIZE_URL: &str = "https://api.notion.com/v1/oauth/authorize";

    /// Name used for the provisioned notes database, and the fallback when
    /// provisioning fails or the provider omits a title
    pub const DEFAULT_DATABASE_NAME: &str = "Notes";
}

/// OAuth flow parameters
pub mod oauth {
    /// How long an issued `state` token stays valid
    pub const STATE_TTL_MINUTES: i64 = 10;

    /// Default timeout for outbound OAuth HTTP calls, in seconds
    pub const HTTP_TIMEOUT_SECS: u64 = 30;
}

/// Fixed route paths referenced outside the router
pub mod routes {
    /// Settings page the redirect presentation mode sends users back to
    pub const SETTINGS_PATH: &str = "/settings";

    /// OAuth callback path, appended to `BASE_URL` for the default redirect URI
    pub const CALLBACK_PATH: &str = "/api/notion/callback";
}

/// Service identity used in logs and health payloads
pub mod service {
    /// Canonical service name
    pub const NAME: &str = "notelink";
}
