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

//! Browser implementation of [`DeviceManager`] on top of
//! `navigator.mediaDevices`.

use gloo_utils::window;
use js_sys::Array;
use log::warn;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    DomException, MediaDeviceInfo, MediaDeviceKind, MediaStream, MediaStreamConstraints,
    MediaStreamTrack,
};

use super::device_manager::{
    DeviceDescriptor, DeviceError, DeviceKind, DeviceManager, PermissionGrant, PermissionRequest,
};

/// [`DeviceManager`] backed by the browser's `MediaDevices` API.
///
/// Labels come back empty until the page has been granted capture permission,
/// which is exactly what the negotiator relies on to decide whether it must
/// prompt.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebDeviceManager;

impl WebDeviceManager {
    pub fn new() -> Self {
        Self
    }

    async fn enumerate(&self, kind: DeviceKind) -> Result<Vec<DeviceDescriptor>, DeviceError> {
        let media_devices = window()
            .navigator()
            .media_devices()
            .map_err(|e| DeviceError::Unavailable(js_error(&e)))?;
        let promise = media_devices
            .enumerate_devices()
            .map_err(|e| DeviceError::Platform(js_error(&e)))?;
        let devices = JsFuture::from(promise)
            .await
            .map_err(|e| DeviceError::Platform(js_error(&e)))?
            .unchecked_into::<Array>();

        let wanted = match kind {
            DeviceKind::Camera => MediaDeviceKind::Videoinput,
            DeviceKind::Microphone => MediaDeviceKind::Audioinput,
        };
        Ok(devices
            .to_vec()
            .into_iter()
            .map(|d| d.unchecked_into::<MediaDeviceInfo>())
            .filter(|device| device.kind() == wanted)
            .map(|device| DeviceDescriptor::new(device.device_id(), kind, device.label()))
            .collect())
    }
}

impl DeviceManager for WebDeviceManager {
    async fn cameras(&self) -> Result<Vec<DeviceDescriptor>, DeviceError> {
        self.enumerate(DeviceKind::Camera).await
    }

    async fn microphones(&self) -> Result<Vec<DeviceDescriptor>, DeviceError> {
        self.enumerate(DeviceKind::Microphone).await
    }

    async fn ask_device_permission(
        &self,
        request: PermissionRequest,
    ) -> Result<PermissionGrant, DeviceError> {
        let media_devices = window()
            .navigator()
            .media_devices()
            .map_err(|e| DeviceError::Unavailable(js_error(&e)))?;

        let constraints = MediaStreamConstraints::new();
        constraints.set_audio(&JsValue::from_bool(request.audio));
        constraints.set_video(&JsValue::from_bool(request.video));

        let promise = media_devices
            .get_user_media_with_constraints(&constraints)
            .map_err(|e| DeviceError::Platform(js_error(&e)))?;

        match JsFuture::from(promise).await {
            Ok(stream) => {
                // The stream only exists to trigger the prompt; release the
                // camera light straight away.
                let stream = stream.unchecked_into::<MediaStream>();
                for track in stream.get_tracks().to_vec() {
                    track.unchecked_into::<MediaStreamTrack>().stop();
                }
                Ok(PermissionGrant {
                    audio: request.audio,
                    video: request.video,
                })
            }
            Err(e) if is_refusal(&e) => {
                warn!("getUserMedia refused: {}", js_error(&e));
                Ok(PermissionGrant::default())
            }
            // Nothing to capture from. Not a refusal: let the re-enumeration
            // report the missing hardware.
            Err(e) if error_name(&e).as_deref() == Some("NotFoundError") => Ok(PermissionGrant {
                audio: request.audio,
                video: request.video,
            }),
            Err(e) => Err(DeviceError::Platform(js_error(&e))),
        }
    }
}

fn error_name(error: &JsValue) -> Option<String> {
    error.dyn_ref::<DomException>().map(DomException::name)
}

fn is_refusal(error: &JsValue) -> bool {
    matches!(
        error_name(error).as_deref(),
        Some("NotAllowedError") | Some("SecurityError")
    )
}

fn js_error(error: &JsValue) -> String {
    match error.dyn_ref::<DomException>() {
        Some(e) => format!("{}: {}", e.name(), e.message()),
        None => format!("{error:?}"),
    }
}
