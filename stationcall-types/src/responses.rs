/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! Response types for the auth backend.
//!
//! Unlike the meeting API, the auth backend returns bare JSON objects with no
//! `{ success, result }` envelope.

use serde::{Deserialize, Serialize};

/// Response body for `POST /acs/azureauth`.
///
/// # Example
///
/// ```json
/// { "userId": "8:acs:1f2e...", "token": "eyJhbGciOi...", "expiresOn": "2025-06-01T12:00:00Z" }
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Calling identity the station joins as.
    #[serde(default)]
    pub user_id: String,

    /// Short-lived access token for the calling backend.
    #[serde(default)]
    pub token: String,

    /// Token expiry as reported by the backend (RFC 3339), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<String>,
}

// The token must never end up in logs.
impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("user_id", &self.user_id)
            .field("token", &"[REDACTED]")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Response body for `GET /acs`.
///
/// Same shape as [`AuthResponse`]; the backend issues a fresh identity and
/// token without a station code.
pub type TokenResponse = AuthResponse;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_payload() {
        let response: AuthResponse = serde_json::from_str(
            r#"{ "userId": "u1", "token": "tok", "expiresOn": "2025-06-01T12:00:00Z" }"#,
        )
        .unwrap();
        assert_eq!(response.user_id, "u1");
        assert_eq!(response.token, "tok");
        assert_eq!(response.expires_on.as_deref(), Some("2025-06-01T12:00:00Z"));
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let response: AuthResponse = serde_json::from_str("{}").unwrap();
        assert!(response.user_id.is_empty());
        assert!(response.token.is_empty());
        assert!(response.expires_on.is_none());
    }

    #[test]
    fn debug_redacts_token() {
        let response = AuthResponse {
            user_id: "u1".to_string(),
            token: "super-secret-token".to_string(),
            expires_on: None,
        };
        let debug_str = format!("{response:?}");
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("super-secret-token"));
    }
}
