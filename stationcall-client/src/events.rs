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

//! Framework-agnostic event types for the session controller.
//!
//! These events are emitted via the controller's [`EventBus`](crate::EventBus)
//! and can be subscribed to by any frontend framework (Yew, Dioxus, Leptos,
//! React via wasm-bindgen, etc.)

use crate::media_devices::DeviceDescriptor;
use crate::session::SessionState;

/// Events emitted by the [`SessionController`](crate::SessionController) that
/// UI layers can subscribe to.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    // === Lifecycle Events ===
    /// The controller moved to a new state.
    StateChanged(SessionState),

    /// The engine assigned an identifier to the live call.
    CallIdAvailable(String),

    /// The call was terminated by the remote side or the backend.
    CallEndedRemotely { reason: Option<String> },

    /// The engine failed to hang up. The session is `Ended` regardless.
    HangUpFailed(String),

    // === Device Events ===
    /// Media devices have been enumerated.
    DevicesLoaded { cameras: usize, microphones: usize },

    /// A platform permission prompt is about to be shown.
    PermissionRequested,

    /// Media permission was granted for both audio and video.
    PermissionGranted,

    /// Media permission was refused for at least one modality.
    PermissionDenied { audio: bool, video: bool },

    /// The camera that will be used for the call.
    CameraSelected(DeviceDescriptor),
}
