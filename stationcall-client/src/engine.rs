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

//! Contract of the calling/media engine.
//!
//! Connection negotiation, codecs and transport all live behind these traits.
//! The controller only creates an agent from a [`Credential`], asks it to join
//! a [`JoinTarget`], and then watches and eventually hangs up the resulting
//! [`ActiveCall`].

use std::fmt;
use std::str::FromStr;

use futures::stream::LocalBoxStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::Credential;
use crate::media_devices::DeviceSelection;

/// Errors reported by the calling engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The call is already over (e.g. ended remotely before our hang-up).
    #[error("Call already ended")]
    CallEnded,

    /// The engine refused the request.
    #[error("Engine rejected the request: {0}")]
    Rejected(String),

    /// The capability has not been populated by the engine (yet).
    #[error("Capability unavailable: {0}")]
    Unavailable(&'static str),
}

/// What to join.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum JoinTarget {
    /// A Teams-style meeting link.
    MeetingLink(String),
    /// A group call identifier.
    Group(String),
}

impl JoinTarget {
    pub fn is_empty(&self) -> bool {
        match self {
            JoinTarget::MeetingLink(link) => link.trim().is_empty(),
            JoinTarget::Group(id) => id.trim().is_empty(),
        }
    }
}

impl Default for JoinTarget {
    fn default() -> Self {
        JoinTarget::MeetingLink(String::new())
    }
}

/// Verbosity the engine should log at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineLogLevel {
    Error,
    Warning,
    Info,
    #[default]
    Verbose,
}

impl FromStr for EngineLogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(EngineLogLevel::Error),
            "warning" | "warn" => Ok(EngineLogLevel::Warning),
            "info" => Ok(EngineLogLevel::Info),
            "verbose" | "debug" | "trace" => Ok(EngineLogLevel::Verbose),
            other => Err(format!("unknown engine log level '{other}'")),
        }
    }
}

impl fmt::Display for EngineLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineLogLevel::Error => "error",
            EngineLogLevel::Warning => "warning",
            EngineLogLevel::Info => "info",
            EngineLogLevel::Verbose => "verbose",
        };
        f.write_str(name)
    }
}

/// Options passed along with a join request.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinOptions {
    /// The negotiated devices. The engine picks the active microphone from its
    /// own device default; the camera here is the one to publish.
    pub selection: DeviceSelection,
}

impl JoinOptions {
    pub fn new(selection: DeviceSelection) -> Self {
        Self { selection }
    }

    /// Whether a local video stream should be published on join.
    pub fn video_enabled(&self) -> bool {
        self.selection.camera.is_some()
    }
}

/// Notifications from a live call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallEvent {
    /// The backend assigned the call its identifier.
    IdAssigned(String),
    /// The call is over from the engine's point of view.
    Ended { reason: Option<String> },
}

/// Current state of the in-call controls. `None` means the engine has not
/// populated that capability yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallCapabilities {
    pub microphone_muted: Option<bool>,
    pub camera_on: Option<bool>,
    pub screen_sharing: Option<bool>,
}

/// A remote participant as far as rendering is concerned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteParticipant {
    pub id: String,
    pub display_name: Option<String>,
    pub video_available: bool,
}

/// Entry point into the engine: turns a credential into an agent.
#[allow(async_fn_in_trait)]
pub trait CallingEngine {
    type Agent: CallAgent;

    /// Adjust engine-side logging. Engines without a log knob ignore this.
    fn set_log_level(&self, _level: EngineLogLevel) {}

    async fn create_agent(
        &self,
        credential: &Credential,
        display_name: &str,
    ) -> Result<Self::Agent, EngineError>;
}

/// An authenticated calling agent.
#[allow(async_fn_in_trait)]
pub trait CallAgent {
    type Call: ActiveCall;

    async fn join(&self, target: &JoinTarget, options: JoinOptions)
        -> Result<Self::Call, EngineError>;
}

/// A call started by [`CallAgent::join`].
#[allow(async_fn_in_trait)]
pub trait ActiveCall {
    /// The call identifier, if the backend has assigned one already.
    fn id(&self) -> Option<String>;

    /// Stream of call notifications. Called once per call by the controller.
    fn events(&self) -> LocalBoxStream<'static, CallEvent>;

    fn capabilities(&self) -> CallCapabilities;

    fn remote_participants(&self) -> Vec<RemoteParticipant> {
        Vec::new()
    }

    async fn set_muted(&self, muted: bool) -> Result<(), EngineError>;

    async fn set_camera(&self, on: bool) -> Result<(), EngineError>;

    async fn set_screen_share(&self, on: bool) -> Result<(), EngineError>;

    async fn hang_up(&self) -> Result<(), EngineError>;
}

/// The call type produced by an engine's agent.
pub type CallOf<E> = <<E as CallingEngine>::Agent as CallAgent>::Call;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_target_serde_shape() {
        let target: JoinTarget = serde_json::from_value(serde_json::json!({
            "kind": "meeting_link",
            "value": "https://teams.example/l/meetup-join/abc"
        }))
        .unwrap();
        assert_eq!(
            target,
            JoinTarget::MeetingLink("https://teams.example/l/meetup-join/abc".to_string())
        );
        assert!(JoinTarget::default().is_empty());
        assert!(!JoinTarget::Group("g-1".to_string()).is_empty());
    }

    #[test]
    fn log_level_parses_aliases() {
        assert_eq!("WARN".parse::<EngineLogLevel>(), Ok(EngineLogLevel::Warning));
        assert_eq!("debug".parse::<EngineLogLevel>(), Ok(EngineLogLevel::Verbose));
        assert!("loud".parse::<EngineLogLevel>().is_err());
        assert_eq!(EngineLogLevel::default().to_string(), "verbose");
    }
}
