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

//! Cross-platform REST client for the station auth backend.
//!
//! Works on WASM (browser), desktop, and mobile targets via [`reqwest`].
//!
//! # Example
//!
//! ```no_run
//! use stationcall_auth_client::{AuthApiClient, AuthMode};
//!
//! # async fn example() -> Result<(), stationcall_auth_client::ApiError> {
//! // Browser: cookies are sent automatically
//! let client = AuthApiClient::new("http://localhost:3000", AuthMode::Cookie);
//!
//! let auth = client.authenticate("DashboardData").await?;
//! println!("Joining as: {}", auth.user_id);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod error;

pub use error::ApiError;
pub use stationcall_types;

use reqwest::{Client, Method, RequestBuilder};
use stationcall_types::APIError;

/// Credentials attached to outgoing requests.
#[derive(Debug, Clone)]
pub enum AuthMode {
    /// Let the browser attach its session cookies (`credentials: include`).
    /// On native targets nothing is attached.
    Cookie,
    /// Send `Authorization: Bearer <token>`. Kiosk builds and tests use this.
    Bearer(String),
}

/// REST client for the station auth backend.
#[derive(Debug, Clone)]
pub struct AuthApiClient {
    base_url: String,
    auth: AuthMode,
    http: Client,
}

impl AuthApiClient {
    /// * `base_url` - backend root, e.g. `"http://localhost:3000"`. A trailing
    ///   slash is ignored.
    pub fn new(base_url: &str, auth: AuthMode) -> Self {
        Self::with_http(base_url, auth, Client::new())
    }

    /// Like [`new`](Self::new), but every request fails after `timeout`.
    ///
    /// Native only: `fetch` has no per-client timeout.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn with_timeout(
        base_url: &str,
        auth: AuthMode,
        timeout: std::time::Duration,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self::with_http(base_url, auth, http))
    }

    fn with_http(base_url: &str, auth: AuthMode, http: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth,
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.request(Method::POST, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{path}", self.base_url));
        match &self.auth {
            #[cfg(target_arch = "wasm32")]
            AuthMode::Cookie => builder.fetch_credentials_include(),
            #[cfg(not(target_arch = "wasm32"))]
            AuthMode::Cookie => builder,
            AuthMode::Bearer(token) => builder.bearer_auth(token),
        }
    }
}

/// Decode a 2xx JSON body into `T`; map any other status to [`ApiError`].
pub(crate) async fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let body = APIError::message_from_body(&response.text().await.unwrap_or_default());
    Err(match status.as_u16() {
        401 => ApiError::NotAuthenticated,
        403 => ApiError::Forbidden(body),
        404 => ApiError::UnknownStation(body),
        code => ApiError::ServerError { status: code, body },
    })
}
