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

//! Error taxonomy of the call-session core.

use thiserror::Error;

use crate::media_devices::NegotiationError;
use crate::session::Stage;

/// Why a `start()` attempt ended in [`SessionState::Failed`](crate::SessionState::Failed).
///
/// Every variant is terminal for the attempt: the controller never retries on
/// its own, the user has to reset and start again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The auth backend rejected the station tag or could not be reached.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The calling engine refused to create an agent for the credential.
    #[error("Calling agent could not be created: {0}")]
    Agent(String),

    /// The user or the OS refused camera or microphone access.
    #[error("Permission denied (audio granted: {audio}, video granted: {video})")]
    PermissionDenied { audio: bool, video: bool },

    /// Permission was granted but there is no usable hardware.
    #[error("No camera or microphone found ({cameras} cameras, {microphones} microphones)")]
    NoDeviceFound { cameras: usize, microphones: usize },

    /// The device subsystem itself failed.
    #[error("Device access failed: {0}")]
    Device(String),

    /// The engine rejected the join request.
    #[error("Joining the call failed: {0}")]
    Join(String),

    #[error("{0} timed out")]
    Timeout(Stage),
}

impl SessionError {
    /// Short text suitable for showing to the person at the station.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::PermissionDenied { .. } => "Permission denied".to_string(),
            SessionError::NoDeviceFound { .. } => "No camera or microphone found".to_string(),
            SessionError::Auth(_) => "Could not sign in to the calling service".to_string(),
            SessionError::Timeout(stage) => format!("{stage} took too long"),
            other => other.to_string(),
        }
    }
}

impl From<NegotiationError> for SessionError {
    fn from(err: NegotiationError) -> Self {
        match err {
            NegotiationError::PermissionDenied { audio, video } => {
                SessionError::PermissionDenied { audio, video }
            }
            NegotiationError::NoDeviceFound {
                cameras,
                microphones,
            } => SessionError::NoDeviceFound {
                cameras,
                microphones,
            },
            NegotiationError::Platform(e) => SessionError::Device(e.to_string()),
        }
    }
}
