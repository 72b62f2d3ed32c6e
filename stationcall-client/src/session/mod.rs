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

//! Session lifecycle: the state machine, the controller that drives it and
//! the handle to the live call.

mod call_handle;
mod controller;
mod state;

pub use call_handle::{CallHandle, CallStatus};
pub use controller::{EndOutcome, SessionController, StartOutcome};
pub use state::{SessionState, Stage};
