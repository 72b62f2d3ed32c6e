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

//! Session configuration.
//!
//! Loaded either from `STATIONCALL_*` environment variables (native kiosks,
//! tests) or from a JSON document (the browser's runtime config blob).

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stationcall_auth_client::{AuthApiClient, AuthMode};
use thiserror::Error;

use crate::engine::{EngineLogLevel, JoinTarget};
use crate::event_bus::EVENT_BUS_CAPACITY;

/// Station tag used when none is configured.
pub const DEFAULT_STATION_CODE: &str = "DashboardData";

/// Name the station shows up as in the call.
pub const DEFAULT_DISPLAY_NAME: &str = "Dashboard";

pub const DEFAULT_AUTH_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is invalid: {reason}")]
    InvalidVar { var: &'static str, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Malformed configuration document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration for a [`SessionController`](crate::SessionController).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Base URL of the auth backend, e.g. `"https://api.example.com"`.
    pub auth_base_url: String,

    /// Station tag sent to the auth backend when the user presses join.
    pub station_code: String,

    /// Name shown to the other participants.
    pub display_name: String,

    /// The call the station joins.
    pub join_target: JoinTarget,

    /// Join with a microphone only when no camera exists.
    pub allow_audio_only: bool,

    /// Give up authenticating after this many milliseconds. `None` waits forever.
    pub auth_timeout_ms: Option<u64>,

    /// Give up negotiating devices (including the permission prompt) after
    /// this many milliseconds.
    pub negotiation_timeout_ms: Option<u64>,

    /// Give up joining after this many milliseconds.
    pub join_timeout_ms: Option<u64>,

    pub engine_log_level: EngineLogLevel,

    pub event_bus_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            station_code: DEFAULT_STATION_CODE.to_string(),
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            join_target: JoinTarget::default(),
            allow_audio_only: false,
            auth_timeout_ms: None,
            negotiation_timeout_ms: None,
            join_timeout_ms: None,
            engine_log_level: EngineLogLevel::default(),
            event_bus_capacity: EVENT_BUS_CAPACITY,
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables.
    ///
    /// # Required
    /// - `STATIONCALL_MEETING_LINK` or `STATIONCALL_GROUP_ID`
    ///
    /// # Optional
    /// - `STATIONCALL_AUTH_URL` (default: `"http://localhost:8080"`)
    /// - `STATIONCALL_STATION_CODE` (default: `"DashboardData"`)
    /// - `STATIONCALL_DISPLAY_NAME` (default: `"Dashboard"`)
    /// - `STATIONCALL_ALLOW_AUDIO_ONLY` (default: `"false"`)
    /// - `STATIONCALL_AUTH_TIMEOUT_MS`, `STATIONCALL_NEGOTIATION_TIMEOUT_MS`,
    ///   `STATIONCALL_JOIN_TIMEOUT_MS`
    /// - `STATIONCALL_ENGINE_LOG_LEVEL` (default: `"verbose"`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let join_target = match (get("STATIONCALL_MEETING_LINK"), get("STATIONCALL_GROUP_ID")) {
            (Some(link), _) => JoinTarget::MeetingLink(link),
            (None, Some(group)) => JoinTarget::Group(group),
            (None, None) => defaults.join_target,
        };

        let engine_log_level = match get("STATIONCALL_ENGINE_LOG_LEVEL") {
            Some(level) => level.parse().map_err(|reason| ConfigError::InvalidVar {
                var: "STATIONCALL_ENGINE_LOG_LEVEL",
                reason,
            })?,
            None => defaults.engine_log_level,
        };

        let config = Self {
            auth_base_url: get("STATIONCALL_AUTH_URL").unwrap_or(defaults.auth_base_url),
            station_code: get("STATIONCALL_STATION_CODE").unwrap_or(defaults.station_code),
            display_name: get("STATIONCALL_DISPLAY_NAME").unwrap_or(defaults.display_name),
            join_target,
            allow_audio_only: parse_var(&get, "STATIONCALL_ALLOW_AUDIO_ONLY")?
                .unwrap_or(defaults.allow_audio_only),
            auth_timeout_ms: parse_var(&get, "STATIONCALL_AUTH_TIMEOUT_MS")?,
            negotiation_timeout_ms: parse_var(&get, "STATIONCALL_NEGOTIATION_TIMEOUT_MS")?,
            join_timeout_ms: parse_var(&get, "STATIONCALL_JOIN_TIMEOUT_MS")?,
            engine_log_level,
            event_bus_capacity: defaults.event_bus_capacity,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON configuration document. Missing fields take their defaults.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.join_target.is_empty() {
            return Err(ConfigError::Invalid(
                "a meeting link or group id to join is required".to_string(),
            ));
        }
        if self.station_code.trim().is_empty() {
            return Err(ConfigError::Invalid("station code must not be empty".to_string()));
        }
        if self.event_bus_capacity == 0 {
            return Err(ConfigError::Invalid(
                "event bus capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn auth_timeout(&self) -> Option<Duration> {
        self.auth_timeout_ms.map(Duration::from_millis)
    }

    pub fn negotiation_timeout(&self) -> Option<Duration> {
        self.negotiation_timeout_ms.map(Duration::from_millis)
    }

    pub fn join_timeout(&self) -> Option<Duration> {
        self.join_timeout_ms.map(Duration::from_millis)
    }

    /// Build the HTTP auth gateway for this configuration.
    pub fn auth_client(&self) -> AuthApiClient {
        AuthApiClient::new(&self.auth_base_url, AuthMode::Cookie)
    }
}

fn parse_var<T, G>(get: &G, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(var)
        .map(|value| {
            value.trim().parse::<T>().map_err(|e| ConfigError::InvalidVar {
                var,
                reason: e.to_string(),
            })
        })
        .transpose()
}
