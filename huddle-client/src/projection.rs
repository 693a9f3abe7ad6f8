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

//! Roster and tile projection driven by provider events.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;

use crate::event_bus::EventBus;
use crate::events::ClientEvent;
use crate::provider::ProviderEvent;
use crate::roster::{content_owner, Roster, RosterEntry};
use crate::tiles::{MediaTileBinding, RenderInstruction, RenderSurface, TileBindings};

#[derive(Default)]
struct ProjectionState {
    // Bumped on every session start and end; stale sinks are ignored.
    generation: u64,
    local_attendee_id: Option<String>,
    roster: Roster,
    tiles: TileBindings,
    // content tile id -> owning attendee id
    content_tiles: HashMap<u32, String>,
}

pub(crate) struct Projection {
    state: Mutex<ProjectionState>,
    renderer: Arc<dyn RenderSurface>,
    bus: EventBus,
}

#[derive(Default)]
struct Effects {
    render: Vec<RenderInstruction>,
    roster_changed: bool,
}

impl Projection {
    pub fn new(renderer: Arc<dyn RenderSurface>, bus: EventBus) -> Self {
        Self {
            state: Mutex::new(ProjectionState::default()),
            renderer,
            bus,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ProjectionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start projecting a new session and return the sink its provider feeds.
    pub fn begin_session(self: &Arc<Self>, local_attendee_id: &str) -> ProviderEventSink {
        let (effects, generation) = {
            let mut state = self.lock();
            state.generation += 1;
            state.local_attendee_id = Some(local_attendee_id.to_string());
            (Self::reset(&mut state), state.generation)
        };
        self.realise(effects);
        ProviderEventSink {
            generation,
            projection: Arc::clone(self),
        }
    }

    /// Drop everything projected for the current session.
    pub fn end_session(&self) {
        let effects = {
            let mut state = self.lock();
            state.generation += 1;
            state.local_attendee_id = None;
            Self::reset(&mut state)
        };
        self.realise(effects);
    }

    pub fn clear_local_preview(&self) {
        let render = self.lock().tiles.clear_local_preview();
        self.realise(Effects {
            render,
            roster_changed: false,
        });
    }

    pub fn roster(&self) -> Vec<RosterEntry> {
        self.lock().roster.entries()
    }

    pub fn bindings(&self) -> Vec<MediaTileBinding> {
        self.lock().tiles.snapshot()
    }

    fn reset(state: &mut ProjectionState) -> Effects {
        let roster_changed = !state.roster.is_empty();
        state.roster.clear();
        state.content_tiles.clear();
        Effects {
            render: state.tiles.clear(),
            roster_changed,
        }
    }

    fn apply(&self, generation: u64, event: ProviderEvent) {
        let effects = {
            let mut state = self.lock();
            if state.generation != generation {
                debug!("discarding event from a finished session: {event:?}");
                return;
            }
            Self::project(&mut state, event)
        };
        self.realise(effects);
    }

    fn project(state: &mut ProjectionState, event: ProviderEvent) -> Effects {
        let mut effects = Effects::default();
        match event {
            ProviderEvent::Presence {
                attendee_id,
                present: true,
                external_user_id,
            } => {
                state.roster.join(&attendee_id, &external_user_id);
                effects.roster_changed = true;
            }
            ProviderEvent::Presence {
                attendee_id,
                present: false,
                ..
            } => {
                effects.roster_changed = state.roster.leave(&attendee_id);
            }
            ProviderEvent::LocalAudioMuted(muted) => {
                if let Some(local) = state.local_attendee_id.clone() {
                    effects.roster_changed = state.roster.set_muted(&local, muted);
                }
            }
            ProviderEvent::Volume {
                attendee_id,
                muted: Some(muted),
                ..
            } => {
                effects.roster_changed = state.roster.set_muted(&attendee_id, muted);
            }
            ProviderEvent::Volume { .. } => {}
            ProviderEvent::TileUpdated(tile) => {
                let Some(bound) = tile.bound_attendee_id.as_deref() else {
                    return effects;
                };
                if tile.is_content {
                    let owner = content_owner(bound).to_string();
                    effects.roster_changed = state.roster.set_content(&owner, true);
                    state.content_tiles.insert(tile.tile_id, owner);
                } else if let Some(owner) = state.content_tiles.remove(&tile.tile_id) {
                    effects.roster_changed = state.roster.set_content(&owner, false);
                }
                effects.render = state.tiles.update(&tile);
            }
            ProviderEvent::TileRemoved(tile_id) => {
                if let Some(owner) = state.content_tiles.remove(&tile_id) {
                    let still_sharing = state.content_tiles.values().any(|o| *o == owner);
                    if !still_sharing {
                        effects.roster_changed = state.roster.set_content(&owner, false);
                    }
                }
                effects.render = state.tiles.remove(tile_id);
            }
        }
        effects
    }

    // Runs outside the state lock so renderers and subscribers may call back in.
    fn realise(&self, effects: Effects) {
        for instruction in effects.render {
            match instruction {
                RenderInstruction::Attach(MediaTileBinding { tile_id, slot }) => {
                    self.renderer.attach(tile_id, slot);
                    self.bus.emit(ClientEvent::TileAttached { tile_id, slot });
                }
                RenderInstruction::Detach(MediaTileBinding { tile_id, slot }) => {
                    self.renderer.detach(tile_id, slot);
                    self.bus.emit(ClientEvent::TileDetached { tile_id, slot });
                }
            }
        }
        if effects.roster_changed {
            self.bus.emit(ClientEvent::RosterChanged);
        }
    }
}

/// Handle a [`MediaSessionProvider`](crate::MediaSessionProvider) pushes its
/// notifications into.
///
/// Each sink belongs to one session. After that session ends its events are
/// discarded.
#[derive(Clone)]
pub struct ProviderEventSink {
    generation: u64,
    projection: Arc<Projection>,
}

impl ProviderEventSink {
    pub fn dispatch(&self, event: ProviderEvent) {
        self.projection.apply(self.generation, event);
    }
}

impl fmt::Debug for ProviderEventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderEventSink")
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::TileState;
    use crate::tiles::DisplaySlot;

    #[derive(Default)]
    struct RecordingSurface {
        calls: Mutex<Vec<(bool, u32, DisplaySlot)>>,
    }

    impl RenderSurface for RecordingSurface {
        fn attach(&self, tile_id: u32, slot: DisplaySlot) {
            self.calls.lock().unwrap().push((true, tile_id, slot));
        }
        fn detach(&self, tile_id: u32, slot: DisplaySlot) {
            self.calls.lock().unwrap().push((false, tile_id, slot));
        }
    }

    fn setup() -> (Arc<Projection>, Arc<RecordingSurface>, ProviderEventSink) {
        let surface = Arc::new(RecordingSurface::default());
        let projection = Arc::new(Projection::new(surface.clone(), EventBus::new()));
        let sink = projection.begin_session("me");
        (projection, surface, sink)
    }

    fn present(id: &str, external: &str) -> ProviderEvent {
        ProviderEvent::Presence {
            attendee_id: id.to_string(),
            present: true,
            external_user_id: external.to_string(),
        }
    }

    #[test]
    fn volume_before_presence_is_ignored() {
        let (projection, _, sink) = setup();
        sink.dispatch(ProviderEvent::Volume {
            attendee_id: "a-1".into(),
            volume: Some(0.4),
            muted: Some(true),
        });
        sink.dispatch(present("a-1", "Alice#x"));
        let roster = projection.roster();
        assert_eq!(roster.len(), 1);
        assert!(!roster[0].muted);
        assert_eq!(roster[0].display_name, "Alice");
    }

    #[test]
    fn local_mute_updates_own_entry() {
        let (projection, _, sink) = setup();
        sink.dispatch(present("me", "Me#1"));
        sink.dispatch(present("a-1", "Alice#2"));
        sink.dispatch(ProviderEvent::LocalAudioMuted(true));
        let roster = projection.roster();
        assert!(roster.iter().find(|e| e.attendee_id == "me").unwrap().muted);
        assert!(!roster.iter().find(|e| e.attendee_id == "a-1").unwrap().muted);
    }

    #[test]
    fn content_tile_flags_its_owner() {
        let (projection, surface, sink) = setup();
        sink.dispatch(present("a-1", "Alice"));
        sink.dispatch(ProviderEvent::TileUpdated(TileState {
            tile_id: 7,
            bound_attendee_id: Some("a-1#content".into()),
            local_tile: false,
            is_content: true,
        }));
        assert!(projection.roster()[0].is_content);
        assert_eq!(
            projection.bindings(),
            vec![MediaTileBinding { tile_id: 7, slot: DisplaySlot::ScreenShareSlot }]
        );

        sink.dispatch(ProviderEvent::TileRemoved(7));
        assert!(!projection.roster()[0].is_content);
        assert!(projection.bindings().is_empty());
        assert_eq!(
            *surface.calls.lock().unwrap(),
            vec![
                (true, 7, DisplaySlot::ScreenShareSlot),
                (false, 7, DisplaySlot::ScreenShareSlot)
            ]
        );
    }

    #[test]
    fn unbound_tile_is_ignored() {
        let (projection, surface, sink) = setup();
        sink.dispatch(ProviderEvent::TileUpdated(TileState {
            tile_id: 3,
            bound_attendee_id: None,
            local_tile: true,
            is_content: false,
        }));
        assert!(projection.bindings().is_empty());
        assert!(surface.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn stale_sink_is_discarded() {
        let (projection, _, old) = setup();
        projection.end_session();
        let current = projection.begin_session("me");
        old.dispatch(present("ghost", "Ghost"));
        current.dispatch(present("a-1", "Alice"));
        let roster = projection.roster();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].attendee_id, "a-1");
    }

    #[test]
    fn end_session_detaches_all_tiles() {
        let (projection, surface, sink) = setup();
        sink.dispatch(ProviderEvent::TileUpdated(TileState {
            tile_id: 1,
            bound_attendee_id: Some("me".into()),
            local_tile: true,
            is_content: false,
        }));
        projection.end_session();
        assert!(projection.bindings().is_empty());
        assert_eq!(
            surface.calls.lock().unwrap().last(),
            Some(&(false, 1, DisplaySlot::LocalPreview))
        );
    }
}
