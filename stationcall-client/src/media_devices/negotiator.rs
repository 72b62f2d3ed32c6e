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

use log::{debug, info, warn};
use thiserror::Error;

use super::device_manager::{
    DeviceDescriptor, DeviceError, DeviceManager, DeviceSelection, PermissionRequest,
};
use crate::event_bus::EventBus;
use crate::events::SessionEvent;

/// Result of a successful negotiation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Negotiation {
    pub selection: DeviceSelection,
    /// Whether the platform permission prompt was shown.
    pub prompted: bool,
}

/// Why no usable device selection could be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NegotiationError {
    #[error("Permission denied (audio granted: {audio}, video granted: {video})")]
    PermissionDenied { audio: bool, video: bool },

    #[error("No camera or microphone found ({cameras} cameras, {microphones} microphones)")]
    NoDeviceFound { cameras: usize, microphones: usize },

    #[error(transparent)]
    Platform(#[from] DeviceError),
}

/// Discovers cameras and microphones, asks for permission when needed, and
/// resolves a [`DeviceSelection`].
///
/// The negotiator keeps no state between calls; remembering the previously
/// chosen camera is the caller's job.
pub struct DeviceNegotiator<D> {
    manager: D,
    events: EventBus,
    allow_audio_only: bool,
}

impl<D: DeviceManager> DeviceNegotiator<D> {
    pub fn new(manager: D, events: EventBus) -> Self {
        Self {
            manager,
            events,
            allow_audio_only: false,
        }
    }

    /// Accept a microphone without any camera instead of failing with
    /// [`NegotiationError::NoDeviceFound`].
    pub fn allow_audio_only(mut self, allow: bool) -> Self {
        self.allow_audio_only = allow;
        self
    }

    pub fn manager(&self) -> &D {
        &self.manager
    }

    /// Resolve the devices for a call.
    ///
    /// * `requested` - display name of a previously selected camera, if any.
    ///
    /// Without prompting, succeeds when cameras and microphones are present
    /// and either `requested` names one of the cameras exactly, or no camera
    /// was requested and the platform already exposes device labels (which it
    /// only does once capture permission exists). A requested name that
    /// matches nothing counts as "nothing found". Every other case shows the
    /// permission prompt exactly once and re-enumerates afterwards.
    pub async fn resolve_devices(
        &self,
        requested: Option<&str>,
    ) -> Result<Negotiation, NegotiationError> {
        let cameras = self.manager.cameras().await?;
        let microphones = self.manager.microphones().await?;
        self.events.emit(SessionEvent::DevicesLoaded {
            cameras: cameras.len(),
            microphones: microphones.len(),
        });

        if !cameras.is_empty() && !microphones.is_empty() {
            let preselected = match requested {
                Some(name) => {
                    let found = find_by_name(&cameras, name);
                    if found.is_none() {
                        debug!("Requested camera '{name}' is not present, asking for permission");
                    }
                    found
                }
                None if labels_visible(&cameras, &microphones) => cameras.first(),
                None => None,
            };
            if let Some(camera) = preselected {
                info!("Using camera '{}' without prompting", camera.display_name);
                return Ok(Negotiation {
                    selection: DeviceSelection {
                        camera: Some(camera.clone()),
                        microphone: microphones.first().cloned(),
                    },
                    prompted: false,
                });
            }
        }

        self.prompt_and_select(requested).await
    }

    async fn prompt_and_select(
        &self,
        requested: Option<&str>,
    ) -> Result<Negotiation, NegotiationError> {
        self.events.emit(SessionEvent::PermissionRequested);
        let grant = self
            .manager
            .ask_device_permission(PermissionRequest::AUDIO_VIDEO)
            .await?;

        if !grant.satisfies(PermissionRequest::AUDIO_VIDEO) {
            warn!(
                "Device permission denied (audio: {}, video: {})",
                grant.audio, grant.video
            );
            self.events.emit(SessionEvent::PermissionDenied {
                audio: grant.audio,
                video: grant.video,
            });
            return Err(NegotiationError::PermissionDenied {
                audio: grant.audio,
                video: grant.video,
            });
        }
        self.events.emit(SessionEvent::PermissionGranted);

        let cameras = self.manager.cameras().await?;
        let microphones = self.manager.microphones().await?;
        self.events.emit(SessionEvent::DevicesLoaded {
            cameras: cameras.len(),
            microphones: microphones.len(),
        });

        let camera_missing = cameras.is_empty() && !self.allow_audio_only;
        if microphones.is_empty() || camera_missing {
            warn!(
                "No usable devices after permission was granted ({} cameras, {} microphones)",
                cameras.len(),
                microphones.len()
            );
            return Err(NegotiationError::NoDeviceFound {
                cameras: cameras.len(),
                microphones: microphones.len(),
            });
        }

        let camera = requested
            .and_then(|name| find_by_name(&cameras, name))
            .or_else(|| cameras.first());
        match camera {
            Some(camera) => info!("Selected camera '{}'", camera.display_name),
            None => info!("No camera present, continuing audio-only"),
        }

        Ok(Negotiation {
            selection: DeviceSelection {
                camera: camera.cloned(),
                microphone: microphones.first().cloned(),
            },
            prompted: true,
        })
    }
}

fn find_by_name<'a>(cameras: &'a [DeviceDescriptor], name: &str) -> Option<&'a DeviceDescriptor> {
    cameras.iter().find(|camera| camera.display_name == name)
}

fn labels_visible(cameras: &[DeviceDescriptor], microphones: &[DeviceDescriptor]) -> bool {
    cameras
        .iter()
        .chain(microphones.iter())
        .all(DeviceDescriptor::has_label)
}
