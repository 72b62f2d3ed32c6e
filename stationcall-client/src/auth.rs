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
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Credentials and the authentication contract.
//!
//! The controller only needs something that turns a station tag into a
//! [`Credential`]. [`AuthApiClient`] from `stationcall-auth-client` is the
//! HTTP implementation; tests substitute their own.

use log::debug;
use secrecy::{ExposeSecret, SecretString};
use stationcall_auth_client::stationcall_types::AuthResponse;
use stationcall_auth_client::{ApiError, AuthApiClient};
use thiserror::Error;

/// Short-lived identity + secret token authorizing a call session.
///
/// The token is held as a [`SecretString`]: `Debug` output redacts it and it
/// is never written to logs.
#[derive(Debug)]
pub struct Credential {
    user_id: String,
    token: SecretString,
    expires_on: Option<String>,
}

impl Credential {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: SecretString::from(token.into()),
            expires_on: None,
        }
    }

    pub fn with_expiry(mut self, expires_on: impl Into<String>) -> Self {
        self.expires_on = Some(expires_on.into());
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The raw token. Only hand this to the calling engine.
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    pub fn expires_on(&self) -> Option<&str> {
        self.expires_on.as_deref()
    }
}

impl Clone for Credential {
    fn clone(&self) -> Self {
        Self {
            user_id: self.user_id.clone(),
            token: SecretString::from(self.token.expose_secret().to_owned()),
            expires_on: self.expires_on.clone(),
        }
    }
}

impl TryFrom<AuthResponse> for Credential {
    type Error = AuthError;

    fn try_from(response: AuthResponse) -> Result<Self, Self::Error> {
        if response.user_id.is_empty() {
            return Err(AuthError::Incomplete("missing userId"));
        }
        if response.token.is_empty() {
            return Err(AuthError::Incomplete("missing token"));
        }
        let credential = Credential::new(response.user_id, response.token);
        Ok(match response.expires_on {
            Some(expiry) => credential.with_expiry(expiry),
            None => credential,
        })
    }
}

/// Why a station tag could not be exchanged for a [`Credential`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The backend answered but refused (unknown tag, forbidden, 5xx...).
    #[error("{0}")]
    Rejected(String),

    /// The backend could not be reached at all.
    #[error("Auth backend unreachable: {0}")]
    Unreachable(String),

    /// The backend answered with an empty identity or token.
    #[error("Incomplete credential: {0}")]
    Incomplete(&'static str),
}

/// Exchanges a station/session tag for a [`Credential`].
///
/// Implementations must not retry on their own; the controller treats every
/// error as terminal for the current attempt.
#[allow(async_fn_in_trait)]
pub trait AuthGateway {
    async fn authenticate(&self, session_tag: &str) -> Result<Credential, AuthError>;
}

impl AuthGateway for AuthApiClient {
    async fn authenticate(&self, session_tag: &str) -> Result<Credential, AuthError> {
        match AuthApiClient::authenticate(self, session_tag).await {
            Ok(response) => Credential::try_from(response),
            Err(ApiError::Network(e)) => {
                debug!("Auth request for '{session_tag}' failed in transport: {e}");
                Err(AuthError::Unreachable(e.to_string()))
            }
            Err(ApiError::IncompleteCredential(what)) => Err(AuthError::Incomplete(what)),
            Err(e) => Err(AuthError::Rejected(e.to_string())),
        }
    }
}
