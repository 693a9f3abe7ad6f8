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

//! Media session provider port.
//!
//! The vendor media SDK is reached only through these traits. A provider
//! instance is scoped to one set of session credentials and pushes its
//! notifications into the [`ProviderEventSink`] it was created with.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use huddle_types::JoinMeetingResponse;
use thiserror::Error;

use crate::effects::EffectProcessor;
use crate::projection::ProviderEventSink;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("device {0} is unavailable")]
    DeviceUnavailable(String),

    #[error("permission denied for {0}")]
    PermissionDenied(String),

    #[error("{0}")]
    Failed(String),
}

/// An enumerated capture device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub device_id: String,
    pub label: String,
}

impl DeviceInfo {
    pub fn new(device_id: &str, label: &str) -> Self {
        Self {
            device_id: device_id.to_string(),
            label: label.to_string(),
        }
    }
}

/// A capture device wrapped so its frames run through an effect processor.
#[derive(Clone)]
pub struct TransformDevice {
    pub device_id: String,
    pub processor: Arc<dyn EffectProcessor>,
}

impl fmt::Debug for TransformDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformDevice")
            .field("device_id", &self.device_id)
            .field("mode", &self.processor.mode())
            .finish()
    }
}

/// What to feed into the provider's video input.
#[derive(Debug, Clone)]
pub enum VideoInput {
    Device(String),
    Transform(TransformDevice),
}

impl VideoInput {
    pub fn device_id(&self) -> &str {
        match self {
            VideoInput::Device(id) => id,
            VideoInput::Transform(t) => &t.device_id,
        }
    }
}

/// A display-capture stream handed out by [`DisplayCapture`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayStream {
    pub stream_id: String,
}

/// Provider view of one renderable stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileState {
    pub tile_id: u32,
    pub bound_attendee_id: Option<String>,
    pub local_tile: bool,
    pub is_content: bool,
}

/// Notifications pushed by the provider.
///
/// Ordering across variants is not guaranteed.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    Presence {
        attendee_id: String,
        present: bool,
        external_user_id: String,
    },
    LocalAudioMuted(bool),
    Volume {
        attendee_id: String,
        volume: Option<f32>,
        muted: Option<bool>,
    },
    TileUpdated(TileState),
    TileRemoved(u32),
}

#[async_trait]
pub trait MediaSessionProvider: Send + Sync {
    async fn list_audio_inputs(&self) -> Result<Vec<DeviceInfo>, MediaError>;
    async fn list_video_inputs(&self) -> Result<Vec<DeviceInfo>, MediaError>;
    async fn start_audio_input(&self, device_id: &str) -> Result<(), MediaError>;

    /// Connect to the session and join its audio.
    async fn start(&self) -> Result<(), MediaError>;
    async fn stop(&self) -> Result<(), MediaError>;

    async fn start_video_input(&self, input: VideoInput) -> Result<(), MediaError>;
    async fn stop_video_input(&self) -> Result<(), MediaError>;
    async fn start_local_video_tile(&self) -> Result<(), MediaError>;
    async fn stop_local_video_tile(&self) -> Result<(), MediaError>;

    async fn start_content_share(&self, stream: &DisplayStream) -> Result<(), MediaError>;
    async fn stop_content_share(&self) -> Result<(), MediaError>;

    async fn set_local_audio_muted(&self, muted: bool) -> Result<(), MediaError>;
}

#[async_trait]
pub trait ProviderFactory: Send + Sync {
    async fn create(
        &self,
        credentials: &JoinMeetingResponse,
        events: ProviderEventSink,
    ) -> Result<Box<dyn MediaSessionProvider>, MediaError>;
}

/// Source of screen-capture streams.
#[async_trait]
pub trait DisplayCapture: Send + Sync {
    async fn request_display(&self) -> Result<DisplayStream, MediaError>;
    async fn release(&self, stream: DisplayStream) -> Result<(), MediaError>;
}
