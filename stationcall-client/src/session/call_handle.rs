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

use std::cell::{Cell, RefCell};

use futures::stream::LocalBoxStream;
use log::debug;

use crate::engine::{ActiveCall, CallCapabilities, CallEvent, EngineError, RemoteParticipant};
use crate::platform;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallStatus {
    Live,
    Ended,
}

/// The live call owned by a [`SessionController`](super::SessionController).
///
/// Exists only while the session is `InCall`. Once the call is over every
/// control operation fails with [`EngineError::CallEnded`].
pub struct CallHandle<C> {
    call: C,
    call_id: RefCell<Option<String>>,
    status: Cell<CallStatus>,
    joined_at_ms: f64,
}

impl<C: ActiveCall> CallHandle<C> {
    pub(crate) fn attach(call: C) -> Self {
        let call_id = call.id().filter(|id| !id.is_empty());
        Self {
            call,
            call_id: RefCell::new(call_id),
            status: Cell::new(CallStatus::Live),
            joined_at_ms: platform::now_ms(),
        }
    }

    /// The call identifier, once the backend has assigned one.
    pub fn call_id(&self) -> Option<String> {
        self.call_id.borrow().clone()
    }

    pub fn status(&self) -> CallStatus {
        self.status.get()
    }

    pub fn is_live(&self) -> bool {
        self.status.get() == CallStatus::Live
    }

    /// Milliseconds since the epoch at which the join completed.
    pub fn joined_at_ms(&self) -> f64 {
        self.joined_at_ms
    }

    pub fn capabilities(&self) -> CallCapabilities {
        if self.is_live() {
            self.call.capabilities()
        } else {
            CallCapabilities::default()
        }
    }

    pub fn remote_participants(&self) -> Vec<RemoteParticipant> {
        if self.is_live() {
            self.call.remote_participants()
        } else {
            Vec::new()
        }
    }

    pub async fn set_muted(&self, muted: bool) -> Result<(), EngineError> {
        self.ensure_live()?;
        self.call.set_muted(muted).await
    }

    pub async fn set_camera(&self, on: bool) -> Result<(), EngineError> {
        self.ensure_live()?;
        self.call.set_camera(on).await
    }

    pub async fn set_screen_share(&self, on: bool) -> Result<(), EngineError> {
        self.ensure_live()?;
        self.call.set_screen_share(on).await
    }

    /// Record the call id. The first non-empty id wins; later ones are ignored.
    pub(crate) fn record_call_id(&self, id: &str) -> bool {
        if id.is_empty() {
            return false;
        }
        let mut slot = self.call_id.borrow_mut();
        match slot.as_deref() {
            Some(existing) => {
                if existing != id {
                    debug!("Ignoring call id '{id}', already recorded '{existing}'");
                }
                false
            }
            None => {
                *slot = Some(id.to_string());
                true
            }
        }
    }

    pub(crate) fn mark_ended(&self) {
        self.status.set(CallStatus::Ended);
    }

    pub(crate) fn events(&self) -> LocalBoxStream<'static, CallEvent> {
        self.call.events()
    }

    pub(crate) async fn hang_up(&self) -> Result<(), EngineError> {
        self.mark_ended();
        self.call.hang_up().await
    }

    fn ensure_live(&self) -> Result<(), EngineError> {
        if self.is_live() {
            Ok(())
        } else {
            Err(EngineError::CallEnded)
        }
    }
}

impl<C> std::fmt::Debug for CallHandle<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallHandle")
            .field("call_id", &self.call_id.borrow())
            .field("status", &self.status.get())
            .field("joined_at_ms", &self.joined_at_ms)
            .finish()
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use futures::stream;

    struct StubCall {
        id: Option<String>,
    }

    impl ActiveCall for StubCall {
        fn id(&self) -> Option<String> {
            self.id.clone()
        }

        fn events(&self) -> LocalBoxStream<'static, CallEvent> {
            Box::pin(stream::empty())
        }

        fn capabilities(&self) -> CallCapabilities {
            CallCapabilities {
                microphone_muted: Some(false),
                camera_on: Some(true),
                screen_sharing: None,
            }
        }

        async fn set_muted(&self, _muted: bool) -> Result<(), EngineError> {
            Ok(())
        }

        async fn set_camera(&self, _on: bool) -> Result<(), EngineError> {
            Ok(())
        }

        async fn set_screen_share(&self, _on: bool) -> Result<(), EngineError> {
            Err(EngineError::Unavailable("screen share"))
        }

        async fn hang_up(&self) -> Result<(), EngineError> {
            Ok(())
        }
    }

    #[test]
    fn first_call_id_wins() {
        let handle = CallHandle::attach(StubCall { id: None });
        assert_eq!(handle.call_id(), None);
        assert!(!handle.record_call_id(""));
        assert!(handle.record_call_id("call-1"));
        assert!(!handle.record_call_id("call-2"));
        assert_eq!(handle.call_id().as_deref(), Some("call-1"));
    }

    #[test]
    fn id_known_at_join_is_kept() {
        let handle = CallHandle::attach(StubCall {
            id: Some("call-0".to_string()),
        });
        assert!(!handle.record_call_id("call-1"));
        assert_eq!(handle.call_id().as_deref(), Some("call-0"));
    }

    #[test]
    fn empty_id_at_join_is_not_recorded() {
        let handle = CallHandle::attach(StubCall {
            id: Some(String::new()),
        });
        assert_eq!(handle.call_id(), None);
    }

    #[tokio::test]
    async fn controls_fail_once_ended() {
        let handle = CallHandle::attach(StubCall { id: None });
        assert!(handle.set_muted(true).await.is_ok());
        assert_eq!(handle.capabilities().camera_on, Some(true));

        handle.hang_up().await.unwrap();
        assert_eq!(handle.status(), CallStatus::Ended);
        assert_eq!(handle.set_muted(true).await, Err(EngineError::CallEnded));
        assert_eq!(handle.set_camera(false).await, Err(EngineError::CallEnded));
        assert_eq!(handle.capabilities(), CallCapabilities::default());
    }
}
