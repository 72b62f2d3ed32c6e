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

//! API error body.
//!
//! Failed requests may carry a structured `{ code, message }` body. Older
//! deployments answer with plain text instead, so consumers must treat this
//! shape as optional.

use serde::{Deserialize, Serialize};

/// Structured error body returned by the auth backend.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct APIError {
    /// Machine-readable error code (e.g. `"STATION_NOT_FOUND"`).
    pub code: String,

    /// Human-readable error message.
    pub message: String,
}

impl APIError {
    pub fn station_not_found(station_code: &str) -> Self {
        Self {
            code: "STATION_NOT_FOUND".to_string(),
            message: format!("Unknown station: {station_code}"),
        }
    }

    /// Best-effort parse of an error response body.
    ///
    /// Returns the structured message when the body is an [`APIError`],
    /// otherwise the trimmed body itself.
    pub fn message_from_body(body: &str) -> String {
        match serde_json::from_str::<APIError>(body) {
            Ok(err) => err.message,
            Err(_) => body.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_from_structured_body() {
        let body = serde_json::to_string(&APIError::station_not_found("station-9")).unwrap();
        assert_eq!(APIError::message_from_body(&body), "Unknown station: station-9");
    }

    #[test]
    fn message_from_plain_text_body() {
        assert_eq!(APIError::message_from_body("  bad gateway\n"), "bad gateway");
    }
}
