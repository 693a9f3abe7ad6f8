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
 */

//! Per-controller event bus.
//!
//! A MPMC broadcast channel for [`ClientEvent`]s. Every subscriber receives
//! every event emitted after it subscribed.
//!
//! # Example
//!
//! ```ignore
//! let mut rx = controller.subscribe();
//! tokio::spawn(async move {
//!     while let Ok(event) = rx.recv().await {
//!         if let ClientEvent::Status(message) = event {
//!             println!("{message}");
//!         }
//!     }
//! });
//! ```

use async_broadcast::{broadcast, InactiveReceiver, Receiver, Sender};

use crate::events::ClientEvent;

/// Capacity of the event bus channel
const EVENT_BUS_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct EventBus {
    sender: Sender<ClientEvent>,
    // Keeps the channel open while nobody is subscribed.
    _keepalive: InactiveReceiver<ClientEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (mut sender, receiver) = broadcast(EVENT_BUS_CAPACITY);
        sender.set_overflow(true);
        Self {
            sender,
            _keepalive: receiver.deactivate(),
        }
    }

    /// Subscribe to events emitted from now on.
    pub fn subscribe(&self) -> Receiver<ClientEvent> {
        self.sender.new_receiver()
    }

    /// Emit an event to all subscribers.
    ///
    /// Never blocks. When the channel is full the oldest event is dropped;
    /// with no active subscriber the event is discarded.
    pub fn emit(&self, event: ClientEvent) {
        let _ = self.sender.try_broadcast(event);
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("receivers", &self.sender.receiver_count())
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
