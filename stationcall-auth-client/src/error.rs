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

//! Error types for the auth API client.

use thiserror::Error;

/// Errors returned by [`AuthApiClient`](crate::AuthApiClient) methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The caller is not allowed to request tokens (HTTP 401).
    #[error("Not authenticated. Please log in.")]
    NotAuthenticated,

    /// The server denied access (HTTP 403).
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// The station code is not known to the backend (HTTP 404).
    #[error("Unknown station: {0}")]
    UnknownStation(String),

    /// The backend answered 2xx but without a usable identity or token.
    #[error("Incomplete credential: {0}")]
    IncompleteCredential(&'static str),

    /// A server error with status code and body.
    #[error("Server error ({status}): {body}")]
    ServerError { status: u16, body: String },

    /// A network, transport or decoding error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A configuration error (e.g. unusable HTTP client settings).
    #[error("Configuration error: {0}")]
    Config(String),
}
