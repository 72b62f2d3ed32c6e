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

//! Platform abstraction layer for stationcall-client.
//!
//! This module provides the few primitives the session controller needs that
//! differ between WASM (browser) and native (desktop/test) environments:
//!
//! - **`now_ms()`**: current time in milliseconds since the Unix epoch
//! - **`spawn_local(future)`**: spawn a `!Send` task on the current thread,
//!   returning a [`TaskHandle`] that aborts the task when dropped
//! - **`sleep(duration)`**: a timer future
//!
//! The correct implementation is selected at compile time via
//! `cfg(target_arch = "wasm32")`.

use futures::future::{self, AbortHandle, Either};
use std::future::Future;
use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
mod native;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use native::*;
#[cfg(target_arch = "wasm32")]
pub use web::*;

/// Handle to a task started with [`spawn_local`].
///
/// Dropping the handle aborts the task at its next suspension point.
#[derive(Debug)]
pub struct TaskHandle {
    abort: AbortHandle,
}

impl TaskHandle {
    pub fn abort(&self) {
        self.abort.abort();
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.is_aborted()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

/// Spawn a task on the current thread's executor.
///
/// The future does **not** need to be `Send`: the session controller and the
/// collaborators it drives live on a single (UI) thread.
pub fn spawn_local<F: Future<Output = ()> + 'static>(future: F) -> TaskHandle {
    let (task, abort) = future::abortable(future);
    spawn_detached(async move {
        let _ = task.await;
    });
    TaskHandle { abort }
}

/// Error returned by [`with_deadline`] when the deadline passes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed(pub Duration);

/// Run `future` to completion, or give up after `deadline`.
///
/// `None` waits indefinitely.
pub async fn with_deadline<F: Future>(
    deadline: Option<Duration>,
    future: F,
) -> Result<F::Output, Elapsed> {
    let Some(limit) = deadline else {
        return Ok(future.await);
    };
    let future = std::pin::pin!(future);
    let timer = std::pin::pin!(sleep(limit));
    match future::select(future, timer).await {
        Either::Left((output, _)) => Ok(output),
        Either::Right(((), _)) => Err(Elapsed(limit)),
    }
}
