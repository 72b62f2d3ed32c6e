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

//! In-memory collaborators for driving a `SessionController` in tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use async_broadcast::{Receiver, TryRecvError};
use futures::channel::mpsc::{unbounded, UnboundedSender};
use futures::stream::{LocalBoxStream, StreamExt};
use stationcall_client::{
    ActiveCall, AuthError, AuthGateway, CallAgent, CallCapabilities, CallEvent, CallingEngine,
    Credential, DeviceDescriptor, DeviceError, DeviceManager, EngineError, EngineLogLevel,
    JoinOptions, JoinTarget, PermissionGrant, PermissionRequest, RemoteParticipant, SessionConfig,
    SessionController, SessionEvent,
};
use tokio::sync::Notify;

pub const STATION_TAG: &str = "station-7";
pub const MEETING_LINK: &str = "https://teams.example/l/meetup-join/station-7";

pub type Controller = SessionController<FakeAuth, FakeEngine, FakeDevices>;

pub fn config() -> SessionConfig {
    SessionConfig {
        join_target: JoinTarget::MeetingLink(MEETING_LINK.to_string()),
        ..SessionConfig::default()
    }
}

pub fn controller(auth: &FakeAuth, engine: &FakeEngine, devices: &FakeDevices) -> Controller {
    controller_with(config(), auth, engine, devices)
}

pub fn controller_with(
    config: SessionConfig,
    auth: &FakeAuth,
    engine: &FakeEngine,
    devices: &FakeDevices,
) -> Controller {
    init_logging();
    SessionController::new(config, auth.clone(), engine.clone(), devices.clone())
}

/// Route `log` output to the test harness. Run with `RUST_LOG=debug` to see it.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Let spawned local tasks run until they block.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

pub fn drain(rx: &mut Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Overflowed(_)) => continue,
            Err(_) => return events,
        }
    }
}

pub fn camera(name: &str) -> DeviceDescriptor {
    DeviceDescriptor::camera(format!("cam-{name}"), name)
}

pub fn microphone(name: &str) -> DeviceDescriptor {
    DeviceDescriptor::microphone(format!("mic-{name}"), name)
}

/// A device as the browser reports it before capture permission: no label.
pub fn unlabeled_camera(id: &str) -> DeviceDescriptor {
    DeviceDescriptor::camera(id, "")
}

pub fn unlabeled_microphone(id: &str) -> DeviceDescriptor {
    DeviceDescriptor::microphone(id, "")
}

// === Auth ===

struct AuthState {
    response: RefCell<Result<Credential, AuthError>>,
    calls: Cell<usize>,
    gate: RefCell<Option<Rc<Notify>>>,
}

#[derive(Clone)]
pub struct FakeAuth {
    state: Rc<AuthState>,
}

impl FakeAuth {
    pub fn ok() -> Self {
        Self::with(Ok(Credential::new("8:acs:station-7", "token-abc")))
    }

    pub fn failing(error: AuthError) -> Self {
        Self::with(Err(error))
    }

    fn with(response: Result<Credential, AuthError>) -> Self {
        Self {
            state: Rc::new(AuthState {
                response: RefCell::new(response),
                calls: Cell::new(0),
                gate: RefCell::new(None),
            }),
        }
    }

    pub fn respond_with(&self, response: Result<Credential, AuthError>) {
        *self.state.response.borrow_mut() = response;
    }

    /// Hold every authentication until the returned gate is notified.
    pub fn hold(&self) -> Rc<Notify> {
        let gate = Rc::new(Notify::new());
        *self.state.gate.borrow_mut() = Some(Rc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> usize {
        self.state.calls.get()
    }
}

impl AuthGateway for FakeAuth {
    async fn authenticate(&self, _session_tag: &str) -> Result<Credential, AuthError> {
        self.state.calls.set(self.state.calls.get() + 1);
        let gate = self.state.gate.borrow().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.state.response.borrow().clone()
    }
}

// === Devices ===

struct DeviceState {
    cameras_before: Vec<DeviceDescriptor>,
    microphones_before: Vec<DeviceDescriptor>,
    cameras_after: Vec<DeviceDescriptor>,
    microphones_after: Vec<DeviceDescriptor>,
    grant: Cell<PermissionGrant>,
    granted: Cell<bool>,
    prompts: Cell<usize>,
    gate: RefCell<Option<Rc<Notify>>>,
}

#[derive(Clone)]
pub struct FakeDevices {
    state: Rc<DeviceState>,
}

impl FakeDevices {
    /// Devices whose enumeration does not change when permission is granted.
    pub fn present(cameras: Vec<DeviceDescriptor>, microphones: Vec<DeviceDescriptor>) -> Self {
        Self::changing(cameras.clone(), microphones.clone(), cameras, microphones)
    }

    /// Enumeration before and after the permission prompt.
    pub fn changing(
        cameras_before: Vec<DeviceDescriptor>,
        microphones_before: Vec<DeviceDescriptor>,
        cameras_after: Vec<DeviceDescriptor>,
        microphones_after: Vec<DeviceDescriptor>,
    ) -> Self {
        Self {
            state: Rc::new(DeviceState {
                cameras_before,
                microphones_before,
                cameras_after,
                microphones_after,
                grant: Cell::new(PermissionGrant {
                    audio: true,
                    video: true,
                }),
                granted: Cell::new(false),
                prompts: Cell::new(0),
                gate: RefCell::new(None),
            }),
        }
    }

    pub fn station_seven() -> Self {
        Self::present(
            vec![camera("Station Cam A"), camera("Station Cam B")],
            vec![microphone("Station Mic")],
        )
    }

    pub fn answer_with(&self, grant: PermissionGrant) {
        self.state.grant.set(grant);
    }

    /// Hold the permission prompt open until the returned gate is notified.
    pub fn hold_prompt(&self) -> Rc<Notify> {
        let gate = Rc::new(Notify::new());
        *self.state.gate.borrow_mut() = Some(Rc::clone(&gate));
        gate
    }

    pub fn prompts(&self) -> usize {
        self.state.prompts.get()
    }
}

impl DeviceManager for FakeDevices {
    async fn cameras(&self) -> Result<Vec<DeviceDescriptor>, DeviceError> {
        Ok(if self.state.granted.get() {
            self.state.cameras_after.clone()
        } else {
            self.state.cameras_before.clone()
        })
    }

    async fn microphones(&self) -> Result<Vec<DeviceDescriptor>, DeviceError> {
        Ok(if self.state.granted.get() {
            self.state.microphones_after.clone()
        } else {
            self.state.microphones_before.clone()
        })
    }

    async fn ask_device_permission(
        &self,
        request: PermissionRequest,
    ) -> Result<PermissionGrant, DeviceError> {
        self.state.prompts.set(self.state.prompts.get() + 1);
        let gate = self.state.gate.borrow().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let grant = self.state.grant.get();
        if grant.satisfies(request) {
            self.state.granted.set(true);
        }
        Ok(grant)
    }
}

// === Calling engine ===

struct EngineState {
    log_level: Cell<Option<EngineLogLevel>>,
    agent_error: RefCell<Option<EngineError>>,
    join_error: RefCell<Option<EngineError>>,
    join_gate: RefCell<Option<Rc<Notify>>>,
    joins: RefCell<Vec<(JoinTarget, JoinOptions)>>,
    agents_created: Cell<usize>,
    call_id_at_join: RefCell<Option<String>>,
    capabilities: Cell<CallCapabilities>,
    participants: RefCell<Vec<RemoteParticipant>>,
    hang_ups: Cell<usize>,
    hang_up_error: RefCell<Option<EngineError>>,
    call_events: RefCell<Option<UnboundedSender<CallEvent>>>,
}

#[derive(Clone)]
pub struct FakeEngine {
    state: Rc<EngineState>,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self {
            state: Rc::new(EngineState {
                log_level: Cell::new(None),
                agent_error: RefCell::new(None),
                join_error: RefCell::new(None),
                join_gate: RefCell::new(None),
                joins: RefCell::new(Vec::new()),
                agents_created: Cell::new(0),
                call_id_at_join: RefCell::new(None),
                capabilities: Cell::new(CallCapabilities::default()),
                participants: RefCell::new(Vec::new()),
                hang_ups: Cell::new(0),
                hang_up_error: RefCell::new(None),
                call_events: RefCell::new(None),
            }),
        }
    }
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign_id_at_join(&self, id: &str) {
        *self.state.call_id_at_join.borrow_mut() = Some(id.to_string());
    }

    pub fn fail_agent(&self, error: EngineError) {
        *self.state.agent_error.borrow_mut() = Some(error);
    }

    pub fn fail_join(&self, error: EngineError) {
        *self.state.join_error.borrow_mut() = Some(error);
    }

    pub fn fail_hang_up(&self, error: EngineError) {
        *self.state.hang_up_error.borrow_mut() = Some(error);
    }

    pub fn hold_join(&self) -> Rc<Notify> {
        let gate = Rc::new(Notify::new());
        *self.state.join_gate.borrow_mut() = Some(Rc::clone(&gate));
        gate
    }

    pub fn set_capabilities(&self, capabilities: CallCapabilities) {
        self.state.capabilities.set(capabilities);
    }

    pub fn set_participants(&self, participants: Vec<RemoteParticipant>) {
        *self.state.participants.borrow_mut() = participants;
    }

    /// Push an event into the live call's event stream.
    pub fn emit(&self, event: CallEvent) {
        if let Some(sender) = self.state.call_events.borrow().as_ref() {
            let _ = sender.unbounded_send(event);
        }
    }

    pub fn joins(&self) -> Vec<(JoinTarget, JoinOptions)> {
        self.state.joins.borrow().clone()
    }

    pub fn agents_created(&self) -> usize {
        self.state.agents_created.get()
    }

    pub fn hang_ups(&self) -> usize {
        self.state.hang_ups.get()
    }

    pub fn log_level(&self) -> Option<EngineLogLevel> {
        self.state.log_level.get()
    }
}

impl CallingEngine for FakeEngine {
    type Agent = FakeAgent;

    fn set_log_level(&self, level: EngineLogLevel) {
        self.state.log_level.set(Some(level));
    }

    async fn create_agent(
        &self,
        _credential: &Credential,
        _display_name: &str,
    ) -> Result<FakeAgent, EngineError> {
        if let Some(error) = self.state.agent_error.borrow().clone() {
            return Err(error);
        }
        self.state.agents_created.set(self.state.agents_created.get() + 1);
        Ok(FakeAgent {
            state: Rc::clone(&self.state),
        })
    }
}

pub struct FakeAgent {
    state: Rc<EngineState>,
}

impl CallAgent for FakeAgent {
    type Call = FakeCall;

    async fn join(&self, target: &JoinTarget, options: JoinOptions) -> Result<FakeCall, EngineError> {
        self.state
            .joins
            .borrow_mut()
            .push((target.clone(), options));
        let gate = self.state.join_gate.borrow().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(error) = self.state.join_error.borrow().clone() {
            return Err(error);
        }
        Ok(FakeCall {
            state: Rc::clone(&self.state),
            id: self.state.call_id_at_join.borrow().clone(),
        })
    }
}

pub struct FakeCall {
    state: Rc<EngineState>,
    id: Option<String>,
}

impl ActiveCall for FakeCall {
    fn id(&self) -> Option<String> {
        self.id.clone()
    }

    fn events(&self) -> LocalBoxStream<'static, CallEvent> {
        let (tx, rx) = unbounded();
        *self.state.call_events.borrow_mut() = Some(tx);
        rx.boxed_local()
    }

    fn capabilities(&self) -> CallCapabilities {
        self.state.capabilities.get()
    }

    fn remote_participants(&self) -> Vec<RemoteParticipant> {
        self.state.participants.borrow().clone()
    }

    async fn set_muted(&self, muted: bool) -> Result<(), EngineError> {
        let mut capabilities = self.state.capabilities.get();
        capabilities.microphone_muted = Some(muted);
        self.state.capabilities.set(capabilities);
        Ok(())
    }

    async fn set_camera(&self, on: bool) -> Result<(), EngineError> {
        let mut capabilities = self.state.capabilities.get();
        capabilities.camera_on = Some(on);
        self.state.capabilities.set(capabilities);
        Ok(())
    }

    async fn set_screen_share(&self, on: bool) -> Result<(), EngineError> {
        let mut capabilities = self.state.capabilities.get();
        capabilities.screen_sharing = Some(on);
        self.state.capabilities.set(capabilities);
        Ok(())
    }

    async fn hang_up(&self) -> Result<(), EngineError> {
        self.state.hang_ups.set(self.state.hang_ups.get() + 1);
        match self.state.hang_up_error.borrow().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

pub const SHORT_TIMEOUT: Duration = Duration::from_millis(500);
