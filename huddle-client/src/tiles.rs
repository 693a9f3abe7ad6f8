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

//! Tile-to-slot bindings.
//!
//! Every provider tile with a bound attendee is rendered in exactly one named
//! slot. The local preview slot shows a single tile; a newer local tile
//! evicts the previous one.

use std::collections::HashMap;
use std::fmt;

use crate::provider::TileState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DisplaySlot {
    LocalPreview,
    RemoteGrid,
    ScreenShareSlot,
}

impl DisplaySlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplaySlot::LocalPreview => "local-preview",
            DisplaySlot::RemoteGrid => "remote-grid",
            DisplaySlot::ScreenShareSlot => "screen-share-slot",
        }
    }

    pub fn for_tile(tile: &TileState) -> Self {
        if tile.is_content {
            DisplaySlot::ScreenShareSlot
        } else if tile.local_tile {
            DisplaySlot::LocalPreview
        } else {
            DisplaySlot::RemoteGrid
        }
    }
}

impl fmt::Display for DisplaySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives attach/detach instructions. Implementations own the actual
/// rendering elements.
pub trait RenderSurface: Send + Sync {
    fn attach(&self, tile_id: u32, slot: DisplaySlot);
    fn detach(&self, tile_id: u32, slot: DisplaySlot);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MediaTileBinding {
    pub tile_id: u32,
    pub slot: DisplaySlot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RenderInstruction {
    Attach(MediaTileBinding),
    Detach(MediaTileBinding),
}

#[derive(Debug, Default)]
pub(crate) struct TileBindings {
    slots: HashMap<u32, DisplaySlot>,
    local_preview: Option<u32>,
}

impl TileBindings {
    /// Bind `tile` to its slot, returning the instructions that realise the change.
    pub fn update(&mut self, tile: &TileState) -> Vec<RenderInstruction> {
        let slot = DisplaySlot::for_tile(tile);
        let mut out = Vec::new();

        match self.slots.get(&tile.tile_id) {
            Some(current) if *current == slot => return out,
            Some(_) => out.extend(self.remove(tile.tile_id)),
            None => {}
        }

        if slot == DisplaySlot::LocalPreview {
            if let Some(previous) = self.local_preview {
                out.extend(self.remove(previous));
            }
            self.local_preview = Some(tile.tile_id);
        }

        self.slots.insert(tile.tile_id, slot);
        out.push(RenderInstruction::Attach(MediaTileBinding {
            tile_id: tile.tile_id,
            slot,
        }));
        out
    }

    pub fn remove(&mut self, tile_id: u32) -> Vec<RenderInstruction> {
        let Some(slot) = self.slots.remove(&tile_id) else {
            return Vec::new();
        };
        if self.local_preview == Some(tile_id) {
            self.local_preview = None;
        }
        vec![RenderInstruction::Detach(MediaTileBinding { tile_id, slot })]
    }

    pub fn clear_local_preview(&mut self) -> Vec<RenderInstruction> {
        match self.local_preview {
            Some(tile_id) => self.remove(tile_id),
            None => Vec::new(),
        }
    }

    pub fn clear(&mut self) -> Vec<RenderInstruction> {
        self.local_preview = None;
        let mut out: Vec<_> = self
            .slots
            .drain()
            .map(|(tile_id, slot)| RenderInstruction::Detach(MediaTileBinding { tile_id, slot }))
            .collect();
        out.sort_by_key(|i| match i {
            RenderInstruction::Attach(b) | RenderInstruction::Detach(b) => b.tile_id,
        });
        out
    }

    pub fn snapshot(&self) -> Vec<MediaTileBinding> {
        let mut bindings: Vec<_> = self
            .slots
            .iter()
            .map(|(tile_id, slot)| MediaTileBinding {
                tile_id: *tile_id,
                slot: *slot,
            })
            .collect();
        bindings.sort_by_key(|b| b.tile_id);
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(tile_id: u32, local_tile: bool, is_content: bool) -> TileState {
        TileState {
            tile_id,
            bound_attendee_id: Some("a-1".to_string()),
            local_tile,
            is_content,
        }
    }

    fn attach(tile_id: u32, slot: DisplaySlot) -> RenderInstruction {
        RenderInstruction::Attach(MediaTileBinding { tile_id, slot })
    }

    fn detach(tile_id: u32, slot: DisplaySlot) -> RenderInstruction {
        RenderInstruction::Detach(MediaTileBinding { tile_id, slot })
    }

    #[test]
    fn slots_follow_tile_kind() {
        assert_eq!(DisplaySlot::for_tile(&tile(1, true, false)), DisplaySlot::LocalPreview);
        assert_eq!(DisplaySlot::for_tile(&tile(2, false, false)), DisplaySlot::RemoteGrid);
        // A local screen share is still content.
        assert_eq!(DisplaySlot::for_tile(&tile(3, true, true)), DisplaySlot::ScreenShareSlot);
    }

    #[test]
    fn repeated_update_is_a_noop() {
        let mut tiles = TileBindings::default();
        assert_eq!(tiles.update(&tile(4, false, false)), vec![attach(4, DisplaySlot::RemoteGrid)]);
        assert!(tiles.update(&tile(4, false, false)).is_empty());
        assert_eq!(tiles.snapshot().len(), 1);
    }

    #[test]
    fn newer_local_tile_evicts_previous() {
        let mut tiles = TileBindings::default();
        tiles.update(&tile(1, true, false));
        let out = tiles.update(&tile(2, true, false));
        assert_eq!(
            out,
            vec![detach(1, DisplaySlot::LocalPreview), attach(2, DisplaySlot::LocalPreview)]
        );
        assert_eq!(
            tiles.snapshot(),
            vec![MediaTileBinding { tile_id: 2, slot: DisplaySlot::LocalPreview }]
        );
    }

    #[test]
    fn slot_change_rebinds() {
        let mut tiles = TileBindings::default();
        tiles.update(&tile(5, false, false));
        let out = tiles.update(&tile(5, false, true));
        assert_eq!(
            out,
            vec![detach(5, DisplaySlot::RemoteGrid), attach(5, DisplaySlot::ScreenShareSlot)]
        );
    }

    #[test]
    fn remove_unknown_tile_is_empty() {
        let mut tiles = TileBindings::default();
        assert!(tiles.remove(99).is_empty());
        assert!(tiles.clear_local_preview().is_empty());
    }

    #[test]
    fn clear_detaches_everything() {
        let mut tiles = TileBindings::default();
        tiles.update(&tile(1, true, false));
        tiles.update(&tile(2, false, false));
        assert_eq!(
            tiles.clear(),
            vec![detach(1, DisplaySlot::LocalPreview), detach(2, DisplaySlot::RemoteGrid)]
        );
        assert!(tiles.snapshot().is_empty());
    }
}
