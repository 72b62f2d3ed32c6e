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

use std::cell::RefCell;
use std::rc::Rc;

use futures::StreamExt;
use log::{debug, error, info, warn};

use super::call_handle::CallHandle;
use super::state::{SessionState, Stage};
use crate::auth::{AuthGateway, Credential};
use crate::config::SessionConfig;
use crate::engine::{ActiveCall, CallAgent, CallEvent, CallOf, CallingEngine, JoinOptions};
use crate::error::SessionError;
use crate::event_bus::EventBus;
use crate::events::SessionEvent;
use crate::media_devices::{DeviceManager, DeviceNegotiator, DeviceSelection};
use crate::platform::{self, Elapsed, TaskHandle};

/// How a call to [`SessionController::start`] finished without an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// The session is live.
    InCall,
    /// The controller was not idle; nothing happened.
    Ignored(SessionState),
    /// [`SessionController::end_call`] cancelled the attempt while it ran.
    Abandoned,
}

/// What [`SessionController::end_call`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EndOutcome {
    /// A live call was ended.
    Ended,
    /// An in-flight `start` was cancelled from the given state.
    Cancelled(SessionState),
    /// There was nothing to end.
    Ignored(SessionState),
}

enum Interrupt {
    Cancelled,
    Failed(SessionError),
}

impl From<SessionError> for Interrupt {
    fn from(reason: SessionError) -> Self {
        Interrupt::Failed(reason)
    }
}

struct Inner<E: CallingEngine> {
    state: SessionState,
    // Bumped on every start and every cancellation. A pipeline step only
    // applies its result while the attempt it started with is still current.
    attempt: u64,
    credential: Option<Credential>,
    agent: Option<Rc<E::Agent>>,
    selection: Option<DeviceSelection>,
    call: Option<Rc<CallHandle<CallOf<E>>>>,
    call_watcher: Option<TaskHandle>,
    preferred_camera: Option<String>,
}

impl<E: CallingEngine> Inner<E> {
    fn is_current(&self, attempt: u64) -> bool {
        self.attempt == attempt
    }

    /// Drop everything the session acquired. The call, if any, is handed back
    /// so the caller can hang it up outside the borrow.
    fn release(&mut self) -> Option<Rc<CallHandle<CallOf<E>>>> {
        self.credential = None;
        self.agent = None;
        self.selection = None;
        self.call_watcher = None;
        self.call.take()
    }
}

struct Core<A, E: CallingEngine, D> {
    config: SessionConfig,
    auth: A,
    engine: E,
    negotiator: DeviceNegotiator<D>,
    events: EventBus,
    inner: RefCell<Inner<E>>,
}

/// Drives one station session from the join button to hang-up.
///
/// Cloning is cheap and every clone controls the same session. All methods
/// must be called from a single thread; on native targets the controller
/// spawns its call watcher with `tokio::task::spawn_local`, so it has to run
/// inside a `LocalSet`.
pub struct SessionController<A, E: CallingEngine, D> {
    core: Rc<Core<A, E, D>>,
}

impl<A, E: CallingEngine, D> Clone for SessionController<A, E, D> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

impl<A, E: CallingEngine, D> PartialEq for SessionController<A, E, D> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }
}

impl<A, E: CallingEngine, D> std::fmt::Debug for SessionController<A, E, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.core.inner.try_borrow() {
            Ok(inner) => f
                .debug_struct("SessionController")
                .field("state", &inner.state)
                .field("attempt", &inner.attempt)
                .finish(),
            Err(_) => f.write_str("SessionController { <busy> }"),
        }
    }
}

impl<A, E, D> SessionController<A, E, D>
where
    A: AuthGateway + 'static,
    E: CallingEngine + 'static,
    E::Agent: 'static,
    CallOf<E>: 'static,
    D: DeviceManager + 'static,
{
    pub fn new(config: SessionConfig, auth: A, engine: E, devices: D) -> Self {
        engine.set_log_level(config.engine_log_level);
        let events = EventBus::new(config.event_bus_capacity);
        let negotiator =
            DeviceNegotiator::new(devices, events.clone()).allow_audio_only(config.allow_audio_only);
        let core = Core {
            config,
            auth,
            engine,
            negotiator,
            events,
            inner: RefCell::new(Inner {
                state: SessionState::Idle,
                attempt: 0,
                credential: None,
                agent: None,
                selection: None,
                call: None,
                call_watcher: None,
                preferred_camera: None,
            }),
        };
        Self {
            core: Rc::new(core),
        }
    }

    /// Authenticate, negotiate devices and join the configured call.
    ///
    /// Only acts from `Idle`; any other state returns
    /// [`StartOutcome::Ignored`] without side effects.
    pub async fn start(&self, session_tag: &str) -> Result<StartOutcome, SessionError> {
        let attempt = {
            let mut inner = self.core.inner.borrow_mut();
            if inner.state != SessionState::Idle {
                debug!("Ignoring start while {}", inner.state);
                return Ok(StartOutcome::Ignored(inner.state.clone()));
            }
            inner.attempt += 1;
            self.core.transition(&mut inner, SessionState::Authenticating);
            inner.attempt
        };

        match self.core.run(attempt, session_tag).await {
            Ok(()) => Ok(StartOutcome::InCall),
            Err(Interrupt::Cancelled) => {
                info!("Session attempt {attempt} abandoned");
                Ok(StartOutcome::Abandoned)
            }
            Err(Interrupt::Failed(reason)) => {
                if self.core.fail(attempt, reason.clone()) {
                    Err(reason)
                } else {
                    Ok(StartOutcome::Abandoned)
                }
            }
        }
    }

    /// End the session, whether it is live or still starting.
    ///
    /// The hang-up is best effort: a failure is logged and announced as
    /// [`SessionEvent::HangUpFailed`], and the session is `Ended` regardless.
    pub async fn end_call(&self) -> EndOutcome {
        let (prior, call) = {
            let mut inner = self.core.inner.borrow_mut();
            let prior = inner.state.clone();
            if prior != SessionState::InCall && !prior.is_in_flight() {
                debug!("Ignoring end_call while {prior}");
                return EndOutcome::Ignored(prior);
            }
            inner.attempt += 1;
            let call = inner.release();
            self.core.transition(&mut inner, SessionState::Ended);
            (prior, call)
        };

        if let Some(call) = call {
            if let Err(e) = call.hang_up().await {
                warn!("Hang-up failed, session ended anyway: {e}");
                self.core.events.emit(SessionEvent::HangUpFailed(e.to_string()));
            }
        }

        if prior == SessionState::InCall {
            EndOutcome::Ended
        } else {
            info!("Cancelled session start from {prior}");
            EndOutcome::Cancelled(prior)
        }
    }

    /// Move a finished session back to `Idle` so it can be started again.
    pub fn reset(&self) -> bool {
        let mut inner = self.core.inner.borrow_mut();
        if !inner.state.is_terminal() {
            return false;
        }
        self.core.transition(&mut inner, SessionState::Idle)
    }

    pub fn state(&self) -> SessionState {
        self.core.inner.borrow().state.clone()
    }

    /// Receive every [`SessionEvent`] emitted from now on.
    pub fn subscribe(&self) -> async_broadcast::Receiver<SessionEvent> {
        self.core.events.subscribe()
    }

    /// The live call. `Some` only while the session is `InCall`.
    pub fn call_handle(&self) -> Option<Rc<CallHandle<CallOf<E>>>> {
        let inner = self.core.inner.borrow();
        if inner.state == SessionState::InCall {
            inner.call.clone()
        } else {
            None
        }
    }

    pub fn current_call_id(&self) -> Option<String> {
        self.call_handle().and_then(|call| call.call_id())
    }

    pub fn device_selection(&self) -> Option<DeviceSelection> {
        self.core.inner.borrow().selection.clone()
    }

    pub fn has_credential(&self) -> bool {
        self.core.inner.borrow().credential.is_some()
    }

    /// Camera used by the last successful negotiation, or chosen by the view.
    pub fn preferred_camera(&self) -> Option<String> {
        self.core.inner.borrow().preferred_camera.clone()
    }

    /// Choose the camera for the next start. Takes effect on the next
    /// negotiation only.
    pub fn set_preferred_camera(&self, name: Option<String>) {
        self.core.inner.borrow_mut().preferred_camera = name.filter(|n| !n.is_empty());
    }

    pub fn config(&self) -> &SessionConfig {
        &self.core.config
    }

    pub fn device_manager(&self) -> &D {
        self.core.negotiator.manager()
    }
}

impl<A, E, D> Core<A, E, D>
where
    A: AuthGateway + 'static,
    E: CallingEngine + 'static,
    E::Agent: 'static,
    CallOf<E>: 'static,
    D: DeviceManager + 'static,
{
    async fn run(self: &Rc<Self>, attempt: u64, session_tag: &str) -> Result<(), Interrupt> {
        // === Authenticating ===
        let authenticated = platform::with_deadline(
            self.config.auth_timeout(),
            self.auth.authenticate(session_tag),
        )
        .await;
        self.ensure_current(attempt)?;
        let credential = staged(authenticated, Stage::Authentication, |e| {
            SessionError::Auth(e.to_string())
        })?;
        info!("Authenticated station '{session_tag}' as {}", credential.user_id());
        {
            let mut inner = self.inner.borrow_mut();
            inner.credential = Some(credential.clone());
            self.advance(&mut inner, attempt, SessionState::AgentReady)?;
        }

        // === AgentReady ===
        let agent = self
            .engine
            .create_agent(&credential, &self.config.display_name)
            .await;
        self.ensure_current(attempt)?;
        let agent = Rc::new(agent.map_err(|e| SessionError::Agent(e.to_string()))?);
        let preferred = {
            let mut inner = self.inner.borrow_mut();
            inner.agent = Some(Rc::clone(&agent));
            self.advance(&mut inner, attempt, SessionState::NegotiatingDevices)?;
            inner.preferred_camera.clone()
        };

        // === NegotiatingDevices ===
        let negotiated = platform::with_deadline(
            self.config.negotiation_timeout(),
            self.negotiator.resolve_devices(preferred.as_deref()),
        )
        .await;
        self.ensure_current(attempt)?;
        let negotiation = staged(negotiated, Stage::DeviceNegotiation, SessionError::from)?;
        let selection = negotiation.selection;
        {
            let mut inner = self.inner.borrow_mut();
            if let Some(camera) = &selection.camera {
                self.events.emit(SessionEvent::CameraSelected(camera.clone()));
                if camera.has_label() {
                    inner.preferred_camera = Some(camera.display_name.clone());
                }
            }
            inner.selection = Some(selection.clone());
            self.advance(&mut inner, attempt, SessionState::Joining)?;
        }

        // === Joining ===
        let joined = platform::with_deadline(
            self.config.join_timeout(),
            agent.join(&self.config.join_target, JoinOptions::new(selection)),
        )
        .await;
        if !self.is_current(attempt) {
            if let Ok(Ok(orphan)) = joined {
                warn!("Join completed after the attempt was cancelled, hanging up");
                if let Err(e) = orphan.hang_up().await {
                    warn!("Hang-up of abandoned call failed: {e}");
                }
            }
            return Err(Interrupt::Cancelled);
        }
        let call = staged(joined, Stage::Join, |e| SessionError::Join(e.to_string()))?;

        // === InCall ===
        let handle = Rc::new(CallHandle::attach(call));
        {
            let mut inner = self.inner.borrow_mut();
            inner.call = Some(Rc::clone(&handle));
            inner.call_watcher = Some(self.watch_call(attempt, Rc::clone(&handle)));
            self.advance(&mut inner, attempt, SessionState::InCall)?;
        }
        if let Some(id) = handle.call_id() {
            info!("Joined call {id}");
            self.events.emit(SessionEvent::CallIdAvailable(id));
        } else {
            info!("Joined call, waiting for the call id");
        }
        Ok(())
    }

    fn watch_call(
        self: &Rc<Self>,
        attempt: u64,
        handle: Rc<CallHandle<CallOf<E>>>,
    ) -> TaskHandle {
        let weak = Rc::downgrade(self);
        let mut call_events = handle.events();
        platform::spawn_local(async move {
            while let Some(event) = call_events.next().await {
                let Some(core) = weak.upgrade() else {
                    break;
                };
                if !core.is_current(attempt) {
                    break;
                }
                match event {
                    CallEvent::IdAssigned(id) => {
                        if handle.record_call_id(&id) {
                            info!("Call id assigned: {id}");
                            core.events.emit(SessionEvent::CallIdAvailable(id));
                        }
                    }
                    CallEvent::Ended { reason } => {
                        core.remote_ended(attempt, reason);
                        break;
                    }
                }
            }
        })
    }

    fn remote_ended(&self, attempt: u64, reason: Option<String>) {
        let mut inner = self.inner.borrow_mut();
        if !inner.is_current(attempt) || inner.state != SessionState::InCall {
            return;
        }
        info!(
            "Call ended remotely: {}",
            reason.as_deref().unwrap_or("no reason given")
        );
        inner.attempt += 1;
        if let Some(call) = inner.release() {
            call.mark_ended();
        }
        self.transition(&mut inner, SessionState::Ended);
        self.events.emit(SessionEvent::CallEndedRemotely { reason });
    }

    /// Fail the attempt. Returns `false` when the attempt was already cancelled.
    fn fail(&self, attempt: u64, reason: SessionError) -> bool {
        let mut inner = self.inner.borrow_mut();
        if !inner.is_current(attempt) {
            return false;
        }
        error!("Session failed: {reason}");
        let _ = inner.release();
        self.transition(&mut inner, SessionState::Failed(reason))
    }

    fn is_current(&self, attempt: u64) -> bool {
        self.inner.borrow().is_current(attempt)
    }

    fn ensure_current(&self, attempt: u64) -> Result<(), Interrupt> {
        if self.is_current(attempt) {
            Ok(())
        } else {
            Err(Interrupt::Cancelled)
        }
    }

    fn advance(
        &self,
        inner: &mut Inner<E>,
        attempt: u64,
        next: SessionState,
    ) -> Result<(), Interrupt> {
        if !inner.is_current(attempt) || !self.transition(inner, next) {
            return Err(Interrupt::Cancelled);
        }
        Ok(())
    }

    fn transition(&self, inner: &mut Inner<E>, next: SessionState) -> bool {
        if !inner.state.can_transition_to(&next) {
            error!("Refusing session transition {} -> {next}", inner.state);
            return false;
        }
        info!("Session state: {} -> {next}", inner.state);
        inner.state = next.clone();
        self.events.emit(SessionEvent::StateChanged(next));
        true
    }
}

fn staged<T, X>(
    result: Result<Result<T, X>, Elapsed>,
    stage: Stage,
    map_err: impl FnOnce(X) -> SessionError,
) -> Result<T, SessionError> {
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(map_err(e)),
        Err(Elapsed(limit)) => {
            warn!("{stage} did not finish within {limit:?}");
            Err(SessionError::Timeout(stage))
        }
    }
}
