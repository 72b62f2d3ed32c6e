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

//! WASM (browser) platform primitives.
//!
//! These implementations use browser APIs through `js-sys`, `gloo-timers`, and
//! `wasm-bindgen-futures`.

use std::future::Future;
use std::time::Duration;

/// Returns the current time in milliseconds since the Unix epoch.
///
/// Uses `js_sys::Date::now()`.
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

pub(super) fn spawn_detached<F: Future<Output = ()> + 'static>(future: F) {
    wasm_bindgen_futures::spawn_local(future);
}

/// Sleep for `duration` using `setTimeout`.
pub async fn sleep(duration: Duration) {
    let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
    gloo_timers::future::TimeoutFuture::new(millis).await;
}
