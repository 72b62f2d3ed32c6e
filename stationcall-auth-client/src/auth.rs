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

//! Credential endpoints: `/acs/azureauth` and `/acs`.

use log::{debug, info};
use stationcall_types::{AuthRequest, AuthResponse, TokenResponse};

use crate::error::ApiError;
use crate::{parse_json_response, AuthApiClient};

impl AuthApiClient {
    /// Exchange a station code for a calling identity and access token.
    ///
    /// Calls `POST /acs/azureauth`. A 2xx answer missing either the user id or
    /// the token is reported as [`ApiError::IncompleteCredential`] rather than
    /// handed back half-filled.
    pub async fn authenticate(&self, station_code: &str) -> Result<AuthResponse, ApiError> {
        debug!("Requesting credential for station '{station_code}'");
        let response = self
            .post("/acs/azureauth")
            .json(&AuthRequest::new(station_code))
            .send()
            .await?;
        let auth: AuthResponse = parse_json_response(response).await?;
        validate(&auth)?;
        info!("Credential issued for station '{station_code}' as '{}'", auth.user_id);
        Ok(auth)
    }

    /// Ask the backend for a fresh identity and token without a station code.
    ///
    /// Calls `GET /acs`.
    pub async fn issue_token(&self) -> Result<TokenResponse, ApiError> {
        let response = self.get("/acs").send().await?;
        let token: TokenResponse = parse_json_response(response).await?;
        validate(&token)?;
        Ok(token)
    }
}

fn validate(auth: &AuthResponse) -> Result<(), ApiError> {
    if auth.user_id.is_empty() {
        return Err(ApiError::IncompleteCredential("missing userId"));
    }
    if auth.token.is_empty() {
        return Err(ApiError::IncompleteCredential("missing token"));
    }
    Ok(())
}
