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

//! Framework-agnostic event types for the session controller.
//!
//! These events are emitted on the controller's [`EventBus`](crate::EventBus)
//! and can be consumed by any front-end.

use std::fmt;

use crate::effects::BackgroundMode;
use crate::provider::DeviceInfo;
use crate::tiles::DisplaySlot;

/// Which local media a joined session is sending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaMode {
    AudioOnly,
    AudioVideo,
}

/// Lifecycle state of the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Authenticating,
    Requesting,
    Joined(MediaMode),
    Leaving,
}

impl SessionState {
    pub fn is_joined(&self) -> bool {
        matches!(self, SessionState::Joined(_))
    }

    pub fn video_active(&self) -> bool {
        matches!(self, SessionState::Joined(MediaMode::AudioVideo))
    }

    /// A join is in flight or has completed.
    pub(crate) fn holds_session(&self) -> bool {
        matches!(
            self,
            SessionState::Authenticating | SessionState::Requesting | SessionState::Joined(_)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Authenticating => write!(f, "authenticating"),
            SessionState::Requesting => write!(f, "requesting"),
            SessionState::Joined(MediaMode::AudioOnly) => write!(f, "joined (audio only)"),
            SessionState::Joined(MediaMode::AudioVideo) => write!(f, "joined (audio and video)"),
            SessionState::Leaving => write!(f, "leaving"),
        }
    }
}

/// Events emitted by the [`SessionController`](crate::SessionController).
#[derive(Clone, Debug, PartialEq)]
pub enum ClientEvent {
    // === Lifecycle Events ===
    StateChanged(SessionState),

    Joined {
        meeting_id: String,
        attendee_id: String,
    },

    Left,

    // === Device Events ===
    /// Input devices were enumerated after joining
    DevicesLoaded {
        cameras: Vec<DeviceInfo>,
        microphones: Vec<DeviceInfo>,
    },

    // === Projection Events ===
    /// The roster changed; read it with `SessionController::roster`
    RosterChanged,

    TileAttached {
        tile_id: u32,
        slot: DisplaySlot,
    },

    TileDetached {
        tile_id: u32,
        slot: DisplaySlot,
    },

    // === Media Events ===
    BackgroundEffectChanged(BackgroundMode),

    ScreenShareChanged(bool),

    /// Local microphone mute state (true = muted)
    AudioMuted(bool),

    /// Human-readable progress or error message
    Status(String),
}
