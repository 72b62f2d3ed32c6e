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

//! Lifecycle states of a call session.

use std::fmt;

use crate::error::SessionError;

/// Where a session currently is in its lifecycle.
///
/// Only the [`SessionController`](super::SessionController) moves a session
/// between states; everyone else observes them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Authenticating,
    AgentReady,
    NegotiatingDevices,
    Joining,
    InCall,
    Ended,
    Failed(SessionError),
}

impl SessionState {
    /// `true` while a `start()` pipeline is running.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            SessionState::Authenticating
                | SessionState::AgentReady
                | SessionState::NegotiatingDevices
                | SessionState::Joining
        )
    }

    /// `true` once the session is over and can only be reset.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Ended | SessionState::Failed(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Authenticating => "Authenticating",
            SessionState::AgentReady => "AgentReady",
            SessionState::NegotiatingDevices => "NegotiatingDevices",
            SessionState::Joining => "Joining",
            SessionState::InCall => "InCall",
            SessionState::Ended => "Ended",
            SessionState::Failed(_) => "Failed",
        }
    }

    pub(crate) fn can_transition_to(&self, next: &SessionState) -> bool {
        use SessionState::*;
        match (self, next) {
            (Idle, Authenticating) => true,
            (Authenticating, AgentReady) => true,
            (AgentReady, NegotiatingDevices) => true,
            (NegotiatingDevices, Joining) => true,
            (Joining, InCall) => true,
            // Any in-flight state may fail, or be cancelled by end_call().
            (from, Failed(_)) | (from, Ended) if from.is_in_flight() => true,
            (InCall, Ended) => true,
            (Ended, Idle) | (Failed(_), Idle) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Failed(reason) => write!(f, "Failed({reason})"),
            other => f.write_str(other.name()),
        }
    }
}

/// The awaited steps of the pipeline that can be bounded by a deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Authentication,
    DeviceNegotiation,
    Join,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Authentication => f.write_str("Authentication"),
            Stage::DeviceNegotiation => f.write_str("Device negotiation"),
            Stage::Join => f.write_str("Join"),
        }
    }
}
