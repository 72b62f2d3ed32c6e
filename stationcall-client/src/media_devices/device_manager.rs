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

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of capture device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Camera,
    Microphone,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Camera => f.write_str("camera"),
            DeviceKind::Microphone => f.write_str("microphone"),
        }
    }
}

/// One enumerated capture device.
///
/// A snapshot: device sets may change between enumerations, so descriptors are
/// never cached across negotiation attempts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub id: String,
    pub kind: DeviceKind,
    /// Human readable label. Browsers leave this empty until capture
    /// permission has been granted.
    pub display_name: String,
}

impl DeviceDescriptor {
    pub fn new(id: impl Into<String>, kind: DeviceKind, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            display_name: display_name.into(),
        }
    }

    pub fn camera(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(id, DeviceKind::Camera, display_name)
    }

    pub fn microphone(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(id, DeviceKind::Microphone, display_name)
    }

    pub fn has_label(&self) -> bool {
        !self.display_name.trim().is_empty()
    }
}

/// Resolved camera/microphone pair to use for a call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSelection {
    pub camera: Option<DeviceDescriptor>,
    pub microphone: Option<DeviceDescriptor>,
}

impl DeviceSelection {
    /// Both devices resolved.
    pub fn is_complete(&self) -> bool {
        self.camera.is_some() && self.microphone.is_some()
    }

    /// Microphone only, no camera.
    pub fn is_audio_only(&self) -> bool {
        self.camera.is_none() && self.microphone.is_some()
    }

    pub fn camera_name(&self) -> Option<&str> {
        self.camera.as_ref().map(|camera| camera.display_name.as_str())
    }
}

/// Modalities to ask the platform for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PermissionRequest {
    pub audio: bool,
    pub video: bool,
}

impl PermissionRequest {
    pub const AUDIO_VIDEO: PermissionRequest = PermissionRequest {
        audio: true,
        video: true,
    };
}

/// Modalities the platform granted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PermissionGrant {
    pub audio: bool,
    pub video: bool,
}

impl PermissionGrant {
    pub fn satisfies(&self, request: PermissionRequest) -> bool {
        (self.audio || !request.audio) && (self.video || !request.video)
    }
}

/// Failure of the device subsystem itself (not a refusal by the user).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("Media devices are not available: {0}")]
    Unavailable(String),

    #[error("Device platform error: {0}")]
    Platform(String),
}

/// Platform boundary for capture devices.
#[allow(async_fn_in_trait)]
pub trait DeviceManager {
    /// Enumerate currently available cameras.
    async fn cameras(&self) -> Result<Vec<DeviceDescriptor>, DeviceError>;

    /// Enumerate currently available microphones.
    async fn microphones(&self) -> Result<Vec<DeviceDescriptor>, DeviceError>;

    /// Show the platform permission prompt.
    ///
    /// A refusal is reported through the returned [`PermissionGrant`], not as
    /// an error.
    async fn ask_device_permission(
        &self,
        request: PermissionRequest,
    ) -> Result<PermissionGrant, DeviceError>;
}
