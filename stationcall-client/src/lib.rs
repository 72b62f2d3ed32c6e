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

//! This crate drives a single station's video call session: it exchanges the
//! station tag for a calling credential, negotiates camera and microphone
//! access, joins the configured call and tracks the call until it ends.
//!
//! The calling engine, the auth backend and the device platform are traits,
//! so the same controller runs in the browser (wasm32) and in native tests.
//!
//! # Outline of usage
//!
//! For more detailed documentation see the doc for each struct.
//!
//! ## Controller creation:
//! ```ignore
//! let config = SessionConfig::from_env()?;
//! let auth = config.auth_client();
//! let controller = SessionController::new(config, auth, engine, WebDeviceManager::new());
//! ```
//!
//! ## Observing the session:
//! ```ignore
//! let mut events = controller.subscribe();
//! while let Ok(event) = events.recv().await {
//!     if let SessionEvent::CallIdAvailable(id) = event { ... }
//! }
//! ```
//!
//! ## Starting and ending a call:
//! ```ignore
//! match controller.start("DashboardData").await {
//!     Ok(StartOutcome::InCall) => { ... }
//!     Ok(StartOutcome::Ignored(_)) | Ok(StartOutcome::Abandoned) => {}
//!     Err(reason) => show(reason.user_message()),
//! }
//! let call_id = controller.current_call_id();
//! controller.end_call().await;
//! controller.reset();
//! ```
//!
//! ## Rendering:
//! ```ignore
//! let surface = CallSurface::new(controller.clone());
//! match surface.model() {
//!     SurfaceModel::InCall { gallery, controls, .. } => { ... }
//!     ...
//! }
//! surface.toggle_mute().await?;
//! ```

mod auth;
mod config;
mod engine;
mod error;
mod event_bus;
mod events;
mod media_devices;
pub mod platform;
mod session;
mod surface;

pub use auth::{AuthError, AuthGateway, Credential};
pub use config::{ConfigError, SessionConfig, DEFAULT_DISPLAY_NAME, DEFAULT_STATION_CODE};
pub use engine::{
    ActiveCall, CallAgent, CallCapabilities, CallEvent, CallOf, CallingEngine, EngineError,
    EngineLogLevel, JoinOptions, JoinTarget, RemoteParticipant,
};
pub use error::SessionError;
pub use event_bus::{EventBus, EVENT_BUS_CAPACITY};
pub use events::SessionEvent;
pub use media_devices::{
    DeviceDescriptor, DeviceError, DeviceKind, DeviceManager, DeviceNegotiator, DeviceSelection,
    Negotiation, NegotiationError, PermissionGrant, PermissionRequest,
};
#[cfg(target_arch = "wasm32")]
pub use media_devices::WebDeviceManager;
pub use session::{
    CallHandle, CallStatus, EndOutcome, SessionController, SessionState, Stage, StartOutcome,
};
pub use stationcall_auth_client::{AuthApiClient, AuthMode};
pub use surface::{
    CallSurface, Control, ControlOutcome, GalleryLayout, GalleryModel, RemoteTile, ScalingMode,
    SurfaceError, SurfaceModel, VideoViewOptions,
};
