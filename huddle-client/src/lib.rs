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

//! Session controller for huddle calls.
//!
//! [`SessionController`] owns the lifecycle of one call: it asks the backend
//! for session credentials, constructs a media provider from them, selects
//! devices, starts and stops local video, swaps background-effect processors
//! and keeps a roster and a tile-to-slot binding table up to date from the
//! provider's events. Everything it talks to is behind a trait:
//!
//! - [`BackendGateway`] obtains credentials (implemented for
//!   [`huddle_gateway::JoinApiClient`]).
//! - [`ProviderFactory`] / [`MediaSessionProvider`] wrap the vendor media SDK.
//! - [`ProcessorFactory`] / [`EffectProcessor`] wrap the segmentation worker.
//! - [`DisplayCapture`] hands out screen-capture streams.
//! - [`RenderSurface`] receives attach/detach instructions for tiles.
//!
//! UI layers observe the controller through [`SessionController::subscribe`].

pub mod auth;
pub mod config;
pub mod controller;
pub mod effects;
pub mod error;
pub mod event_bus;
pub mod events;
pub mod gateway;
mod projection;
pub mod provider;
pub mod roster;
pub mod segmentation;
pub mod tiles;

pub use auth::{AuthGate, JwtExpiryGate};
pub use config::{ClientConfig, EffectAssets};
pub use controller::{BackgroundEffectState, Collaborators, Session, SessionController};
pub use effects::{
    BackgroundMode, EffectError, EffectProcessor, EffectSpec, ImageAsset, ProcessorFactory,
};
pub use error::SessionError;
pub use event_bus::EventBus;
pub use events::{ClientEvent, MediaMode, SessionState};
pub use gateway::{BackendGateway, Credential};
pub use projection::ProviderEventSink;
pub use provider::{
    DeviceInfo, DisplayCapture, DisplayStream, MediaError, MediaSessionProvider, ProviderEvent,
    ProviderFactory, TileState, TransformDevice, VideoInput,
};
pub use roster::RosterEntry;
pub use tiles::{DisplaySlot, MediaTileBinding, RenderSurface};
