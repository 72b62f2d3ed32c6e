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

//! Per-session event bus.
//!
//! A MPMC (multi-producer, multi-consumer) broadcast channel for
//! [`SessionEvent`]s. Each [`SessionController`](crate::SessionController) owns
//! one bus, so two controllers never see each other's events.
//!
//! # Example
//!
//! ```ignore
//! let mut rx = controller.subscribe();
//! wasm_bindgen_futures::spawn_local(async move {
//!     while let Ok(event) = rx.recv().await {
//!         match event {
//!             SessionEvent::CallIdAvailable(id) => {
//!                 // Render the call id banner
//!             }
//!             SessionEvent::StateChanged(state) => {
//!                 // Re-render the surface
//!             }
//!             _ => {}
//!         }
//!     }
//! });
//! ```

use crate::events::SessionEvent;
use async_broadcast::{broadcast, InactiveReceiver, Receiver, Sender, TrySendError};
use log::trace;

/// Default capacity of the event bus channel
pub const EVENT_BUS_CAPACITY: usize = 256;

/// Broadcast channel carrying [`SessionEvent`]s.
///
/// The channel runs in overflow mode: when a slow subscriber lets it fill up,
/// the oldest event is dropped and that subscriber sees
/// `RecvError::Overflowed` once before catching up.
#[derive(Clone)]
pub struct EventBus {
    sender: Sender<SessionEvent>,
    // Keeps the channel open while nobody is subscribed.
    _keepalive: InactiveReceiver<SessionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (mut sender, receiver) = broadcast(capacity.max(1));
        sender.set_overflow(true);
        sender.set_await_active(false);
        Self {
            sender,
            _keepalive: receiver.deactivate(),
        }
    }

    /// Subscribe to session events.
    ///
    /// Returns a receiver that will receive all future events. Past events are
    /// not replayed.
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        self.sender.new_receiver()
    }

    /// Emit an event to all subscribers. Never blocks.
    pub fn emit(&self, event: SessionEvent) {
        match self.sender.try_broadcast(event) {
            Ok(_) => {}
            Err(TrySendError::Inactive(event)) => trace!("No subscribers for {event:?}"),
            Err(e) => trace!("Dropped session event: {e:?}"),
        }
    }

    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("capacity", &self.capacity())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EVENT_BUS_CAPACITY)
    }
}
