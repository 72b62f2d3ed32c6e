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

//! View-facing adapter over a [`SessionController`].
//!
//! The surface turns the controller's state into a [`SurfaceModel`] a UI can
//! render directly, and turns button presses back into controller calls. It
//! owns no state of its own.

use thiserror::Error;

use crate::auth::AuthGateway;
use crate::engine::{CallOf, CallingEngine, EngineError, RemoteParticipant};
use crate::error::SessionError;
use crate::media_devices::DeviceManager;
use crate::session::{EndOutcome, SessionController, SessionState, StartOutcome};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GalleryLayout {
    /// Remote participants fill the stage, local video floats in a corner.
    #[default]
    FloatingLocalVideo,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScalingMode {
    /// Letterbox the video so the whole frame is visible.
    #[default]
    Fit,
    Crop,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VideoViewOptions {
    pub scaling: ScalingMode,
    pub mirrored: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteTile {
    pub participant_id: String,
    pub display_name: Option<String>,
    pub video_available: bool,
    pub view: VideoViewOptions,
}

impl From<RemoteParticipant> for RemoteTile {
    fn from(participant: RemoteParticipant) -> Self {
        Self {
            participant_id: participant.id,
            display_name: participant.display_name,
            video_available: participant.video_available,
            view: VideoViewOptions::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GalleryModel {
    pub layout: GalleryLayout,
    /// `None` when the call runs without a local camera.
    pub local_video: Option<VideoViewOptions>,
    pub remote: Vec<RemoteTile>,
}

/// A call control button and its current value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    EndCall,
    ScreenShare { active: bool },
    Camera { on: bool },
    Microphone { muted: bool },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceModel {
    /// Show the join button.
    JoinPrompt,
    /// A start is in progress; the state says which step.
    Connecting(SessionState),
    InCall {
        call_id: Option<String>,
        gallery: GalleryModel,
        controls: Vec<Control>,
    },
    Ended,
    /// The attempt failed. The view offers a restart.
    Failed { message: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlOutcome {
    /// The control was applied; carries the new value.
    Applied(bool),
    /// The engine has not reported this capability yet.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("No call in progress")]
    NotInCall,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub struct CallSurface<A, E: CallingEngine, D> {
    controller: SessionController<A, E, D>,
}

impl<A, E: CallingEngine, D> Clone for CallSurface<A, E, D> {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
        }
    }
}

impl<A, E, D> CallSurface<A, E, D>
where
    A: AuthGateway + 'static,
    E: CallingEngine + 'static,
    E::Agent: 'static,
    CallOf<E>: 'static,
    D: DeviceManager + 'static,
{
    pub fn new(controller: SessionController<A, E, D>) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &SessionController<A, E, D> {
        &self.controller
    }

    pub fn model(&self) -> SurfaceModel {
        match self.controller.state() {
            SessionState::Idle => SurfaceModel::JoinPrompt,
            SessionState::InCall => self.in_call_model(),
            SessionState::Ended => SurfaceModel::Ended,
            SessionState::Failed(reason) => SurfaceModel::Failed {
                message: reason.user_message(),
            },
            connecting => SurfaceModel::Connecting(connecting),
        }
    }

    fn in_call_model(&self) -> SurfaceModel {
        let Some(call) = self.controller.call_handle() else {
            return SurfaceModel::Connecting(SessionState::InCall);
        };
        let has_camera = self
            .controller
            .device_selection()
            .is_some_and(|selection| selection.camera.is_some());
        let capabilities = call.capabilities();

        let mut controls = vec![Control::EndCall];
        if let Some(active) = capabilities.screen_sharing {
            controls.push(Control::ScreenShare { active });
        }
        if let Some(on) = capabilities.camera_on {
            controls.push(Control::Camera { on });
        }
        if let Some(muted) = capabilities.microphone_muted {
            controls.push(Control::Microphone { muted });
        }

        SurfaceModel::InCall {
            call_id: call.call_id(),
            gallery: GalleryModel {
                layout: GalleryLayout::FloatingLocalVideo,
                local_video: has_camera.then(VideoViewOptions::default),
                remote: call
                    .remote_participants()
                    .into_iter()
                    .map(RemoteTile::from)
                    .collect(),
            },
            controls,
        }
    }

    pub async fn join(&self, session_tag: &str) -> Result<StartOutcome, SessionError> {
        self.controller.start(session_tag).await
    }

    pub async fn hang_up(&self) -> EndOutcome {
        self.controller.end_call().await
    }

    /// Go back to the join prompt after the call ended or failed.
    pub fn restart(&self) -> bool {
        self.controller.reset()
    }

    pub async fn toggle_mute(&self) -> Result<ControlOutcome, SurfaceError> {
        let call = self.controller.call_handle().ok_or(SurfaceError::NotInCall)?;
        let Some(muted) = call.capabilities().microphone_muted else {
            return Ok(ControlOutcome::Unavailable);
        };
        call.set_muted(!muted).await?;
        Ok(ControlOutcome::Applied(!muted))
    }

    pub async fn toggle_camera(&self) -> Result<ControlOutcome, SurfaceError> {
        let call = self.controller.call_handle().ok_or(SurfaceError::NotInCall)?;
        let Some(on) = call.capabilities().camera_on else {
            return Ok(ControlOutcome::Unavailable);
        };
        call.set_camera(!on).await?;
        Ok(ControlOutcome::Applied(!on))
    }

    pub async fn toggle_screen_share(&self) -> Result<ControlOutcome, SurfaceError> {
        let call = self.controller.call_handle().ok_or(SurfaceError::NotInCall)?;
        let Some(active) = call.capabilities().screen_sharing else {
            return Ok(ControlOutcome::Unavailable);
        };
        call.set_screen_share(!active).await?;
        Ok(ControlOutcome::Applied(!active))
    }
}
