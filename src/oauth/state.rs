// ABOUTME: Server-side OAuth state registry for CSRF protection and user correlation
// ABOUTME: Issues single-use state tokens with a TTL and consumes them on callback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Notelink

//! OAuth state registry
//!
//! The `state` parameter does two jobs: it proves the callback belongs to a
//! flow this server started, and it identifies which user started it. Both are
//! handled by issuing `"{user_id}:{nonce}"` tokens that are recorded here and
//! consumed exactly once by the callback. Anything not found in the registry
//! (never issued, expired, or already consumed) is rejected before any
//! outbound call is made.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::OAuthError;
use crate::constants::oauth::STATE_TTL_MINUTES;

/// Issued-state bookkeeping
#[derive(Debug, Clone)]
struct StateData {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}

/// Registry of issued, not-yet-consumed OAuth states
pub struct OAuthStateRegistry {
    states: RwLock<HashMap<String, StateData>>,
    ttl: Duration,
}

impl OAuthStateRegistry {
    /// Create a registry with the default TTL
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(STATE_TTL_MINUTES))
    }

    /// Create a registry with a custom TTL
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Issue a fresh state token for the given user
    ///
    /// Expired entries are purged on the way in so the map stays bounded by
    /// the number of flows started within one TTL window.
    pub async fn issue(&self, user_id: Uuid) -> String {
        let state = format!("{user_id}:{}", Uuid::new_v4());
        let now = Utc::now();

        let mut states = self.states.write().await;
        states.retain(|_, data| data.expires_at > now);
        states.insert(
            state.clone(),
            StateData {
                user_id,
                expires_at: now + self.ttl,
            },
        );

        state
    }

    /// Validate and consume a state token, yielding the initiating user
    ///
    /// A state is consumable exactly once; replaying it fails.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidState`] if the state was never issued,
    /// has expired, or was already consumed.
    pub async fn consume(&self, state: &str) -> Result<Uuid, OAuthError> {
        let mut states = self.states.write().await;
        let data = states.remove(state).ok_or(OAuthError::InvalidState)?;

        if data.expires_at < Utc::now() {
            return Err(OAuthError::InvalidState);
        }

        Ok(data.user_id)
    }

    /// Number of outstanding states, for diagnostics
    pub async fn outstanding(&self) -> usize {
        self.states.read().await.len()
    }
}

impl Default for OAuthStateRegistry {
    fn default() -> Self {
        Self::new()
    }
}
