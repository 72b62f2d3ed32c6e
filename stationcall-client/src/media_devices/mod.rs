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

//! Device discovery and permission negotiation.
//!
//! [`DeviceManager`] is the platform boundary (the browser's `MediaDevices`,
//! or a fake in tests); [`DeviceNegotiator`] holds the decision logic that
//! turns enumerations and permission answers into a [`DeviceSelection`].

mod device_manager;
mod negotiator;
#[cfg(target_arch = "wasm32")]
mod web;

pub use device_manager::{
    DeviceDescriptor, DeviceError, DeviceKind, DeviceManager, DeviceSelection, PermissionGrant,
    PermissionRequest,
};
pub use negotiator::{DeviceNegotiator, Negotiation, NegotiationError};
#[cfg(target_arch = "wasm32")]
pub use web::WebDeviceManager;
