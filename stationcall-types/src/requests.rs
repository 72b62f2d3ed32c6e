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

//! Request types for the auth backend.

use serde::{Deserialize, Serialize};

/// Request body for `POST /acs/azureauth`.
///
/// The backend uses the station code to decide which calling identity the
/// station should appear as.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    /// Logical station / room identifier, e.g. `"DashboardData"`.
    pub station_code: String,
}

impl AuthRequest {
    pub fn new(station_code: impl Into<String>) -> Self {
        Self {
            station_code: station_code.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_station_code_in_camel_case() {
        let body = serde_json::to_value(AuthRequest::new("station-7")).unwrap();
        assert_eq!(body, serde_json::json!({ "stationCode": "station-7" }));
    }
}
