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

//! The session controller.
//!
//! One [`SessionController`] drives one call at a time through
//! `Idle -> Authenticating -> Requesting -> Joined(AudioOnly) <-> Joined(AudioVideo) -> Leaving -> Idle`.
//! Screen sharing and background effects are sub-states of `Joined`.
//!
//! Operations are serialized: an operation that arrives while another is
//! still running fails with [`SessionError::Busy`] (a second join fails with
//! [`SessionError::AlreadyActive`]). Every failure restores the last stable
//! state before returning.

use std::sync::{Arc, Mutex, MutexGuard};

use async_broadcast::Receiver;
use huddle_types::{JoinMeetingRequest, JoinMeetingResponse};
use log::{debug, error, info, warn};
use tokio::sync::Mutex as AsyncMutex;

use crate::auth::AuthGate;
use crate::config::ClientConfig;
use crate::effects::{
    BackgroundMode, EffectProcessor, EffectSlot, EffectSpec, ImageAsset, ProcessorFactory,
};
use crate::error::SessionError;
use crate::event_bus::EventBus;
use crate::events::{ClientEvent, MediaMode, SessionState};
use crate::gateway::{BackendGateway, Credential};
use crate::projection::Projection;
use crate::provider::{
    DisplayCapture, DisplayStream, MediaError, MediaSessionProvider, ProviderFactory,
    TransformDevice, VideoInput,
};
use crate::roster::RosterEntry;
use crate::tiles::{MediaTileBinding, RenderSurface};

/// Snapshot of the active call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub meeting_id: String,
    pub attendee_id: String,
    pub state: SessionState,
    pub audio_enabled: bool,
    pub video_enabled: bool,
    pub screen_share_enabled: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BackgroundEffectState {
    pub mode: BackgroundMode,
    pub has_processor: bool,
    /// Name of the stored replacement image, if any.
    pub image: Option<String>,
}

/// The external collaborators a controller drives.
#[derive(Clone)]
pub struct Collaborators {
    pub gateway: Arc<dyn BackendGateway>,
    pub providers: Arc<dyn ProviderFactory>,
    pub processors: Arc<dyn ProcessorFactory>,
    pub display: Arc<dyn DisplayCapture>,
    pub renderer: Arc<dyn RenderSurface>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VideoFeed {
    Stopped,
    Raw,
    Transformed,
}

impl VideoFeed {
    fn is_on(self) -> bool {
        self != VideoFeed::Stopped
    }
}

struct ActiveSession {
    provider: Box<dyn MediaSessionProvider>,
    meeting_id: String,
    attendee_id: String,
    selected_camera: Option<String>,
    selected_microphone: Option<String>,
    video: VideoFeed,
    effect: EffectSlot,
    share: Option<DisplayStream>,
    audio_enabled: bool,
}

impl ActiveSession {
    fn new(provider: Box<dyn MediaSessionProvider>, credentials: &JoinMeetingResponse) -> Self {
        Self {
            provider,
            meeting_id: credentials.meeting.meeting_id.clone(),
            attendee_id: credentials.attendee.attendee_id.clone(),
            selected_camera: None,
            selected_microphone: None,
            video: VideoFeed::Stopped,
            effect: EffectSlot::default(),
            share: None,
            audio_enabled: false,
        }
    }

    fn state(&self) -> SessionState {
        if self.video.is_on() {
            SessionState::Joined(MediaMode::AudioVideo)
        } else {
            SessionState::Joined(MediaMode::AudioOnly)
        }
    }
}

#[derive(Default)]
struct Inner {
    active: Option<ActiveSession>,
    background_image: Option<ImageAsset>,
}

#[derive(Default)]
struct Published {
    state: SessionState,
    session: Option<Session>,
    effect: BackgroundEffectState,
}

pub struct SessionController {
    gateway: Arc<dyn BackendGateway>,
    providers: Arc<dyn ProviderFactory>,
    processors: Arc<dyn ProcessorFactory>,
    display: Arc<dyn DisplayCapture>,
    auth: Option<Arc<dyn AuthGate>>,
    config: ClientConfig,
    bus: EventBus,
    projection: Arc<Projection>,
    published: Mutex<Published>,
    inner: AsyncMutex<Inner>,
}

fn best_effort(step: &str, result: Result<(), MediaError>) {
    if let Err(e) = result {
        warn!("{step} failed: {e}");
    }
}

impl SessionController {
    pub fn new(config: ClientConfig, collaborators: Collaborators) -> Self {
        let bus = EventBus::new();
        let projection = Arc::new(Projection::new(collaborators.renderer, bus.clone()));
        Self {
            gateway: collaborators.gateway,
            providers: collaborators.providers,
            processors: collaborators.processors,
            display: collaborators.display,
            auth: None,
            config,
            bus,
            projection,
            published: Mutex::new(Published::default()),
            inner: AsyncMutex::new(Inner::default()),
        }
    }

    /// Require a credential from `gate` before every join.
    pub fn with_auth_gate(mut self, gate: Arc<dyn AuthGate>) -> Self {
        self.auth = Some(gate);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn subscribe(&self) -> Receiver<ClientEvent> {
        self.bus.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.published().state
    }

    pub fn session(&self) -> Option<Session> {
        self.published().session.clone()
    }

    pub fn background_effect(&self) -> BackgroundEffectState {
        self.published().effect.clone()
    }

    pub fn roster(&self) -> Vec<RosterEntry> {
        self.projection.roster()
    }

    pub fn bindings(&self) -> Vec<MediaTileBinding> {
        self.projection.bindings()
    }

    // === Operations ===

    /// Join `meeting_id` as `display_name`. An empty `region` falls back to
    /// the configured default.
    pub async fn join(
        &self,
        meeting_id: &str,
        display_name: &str,
        region: &str,
    ) -> Result<Session, SessionError> {
        let mut inner = match self.inner.try_lock() {
            Ok(inner) => inner,
            Err(_) if self.state().holds_session() => {
                return self.report("Join", Err(SessionError::AlreadyActive))
            }
            Err(_) => return self.report("Join", Err(SessionError::Busy)),
        };
        if inner.active.is_some() {
            return self.report("Join", Err(SessionError::AlreadyActive));
        }

        let result = self
            .join_locked(&mut inner, meeting_id.trim(), display_name.trim(), region.trim())
            .await;
        if result.is_err() {
            self.projection.end_session();
            self.publish(SessionState::Idle, &inner);
        }
        self.report("Join", result)
    }

    async fn join_locked(
        &self,
        inner: &mut Inner,
        meeting_id: &str,
        display_name: &str,
        region: &str,
    ) -> Result<Session, SessionError> {
        if meeting_id.is_empty() || display_name.is_empty() {
            return Err(SessionError::InvalidArgument(
                "Please enter meeting ID and your name.".to_string(),
            ));
        }

        let credential = self.authenticate(inner).await?;

        self.publish(SessionState::Requesting, inner);
        self.status("Requesting meeting...");
        let region = if region.is_empty() {
            self.config.default_region.as_str()
        } else {
            region
        };
        let request = JoinMeetingRequest::new(meeting_id, display_name, region);
        let credentials = self
            .gateway
            .create_session(&request, credential.as_ref())
            .await?;
        info!(
            "Obtained credentials for meeting {} as attendee {}",
            credentials.meeting.meeting_id, credentials.attendee.attendee_id
        );

        let sink = self
            .projection
            .begin_session(&credentials.attendee.attendee_id);
        let provider = self.providers.create(&credentials, sink).await?;
        let mut active = ActiveSession::new(provider, &credentials);

        if let Err(e) = self.bring_up(&mut active).await {
            debug!("releasing provider after failed join");
            best_effort("stop provider", active.provider.stop().await);
            return Err(e);
        }

        inner.active = Some(active);
        self.publish(SessionState::Joined(MediaMode::AudioOnly), inner);
        self.bus.emit(ClientEvent::Joined {
            meeting_id: credentials.meeting.meeting_id.clone(),
            attendee_id: credentials.attendee.attendee_id.clone(),
        });
        self.status("Meeting joined. Start video when ready.");
        self.session().ok_or(SessionError::NotJoined)
    }

    async fn authenticate(&self, inner: &Inner) -> Result<Option<Credential>, SessionError> {
        let Some(gate) = &self.auth else {
            return Ok(None);
        };
        self.publish(SessionState::Authenticating, inner);
        let credential = gate.credential().await?;
        debug!("authenticated as {}", credential.subject);
        Ok(Some(credential))
    }

    async fn bring_up(&self, active: &mut ActiveSession) -> Result<(), SessionError> {
        let cameras = active.provider.list_video_inputs().await?;
        let microphones = active.provider.list_audio_inputs().await?;
        debug!(
            "found {} cameras and {} microphones",
            cameras.len(),
            microphones.len()
        );

        active.selected_camera = cameras.first().map(|d| d.device_id.clone());
        if let Some(mic) = microphones.first() {
            active.provider.start_audio_input(&mic.device_id).await?;
            active.selected_microphone = Some(mic.device_id.clone());
        }
        self.bus.emit(ClientEvent::DevicesLoaded {
            cameras,
            microphones,
        });

        self.status("Joining audio...");
        active.provider.start().await?;
        active.audio_enabled = true;
        Ok(())
    }

    /// Start the camera `device_id` and publish the local tile. Switches the
    /// camera when video is already running.
    pub async fn start_video(&self, device_id: &str) -> Result<(), SessionError> {
        let mut inner = self.acquire("Video")?;
        let result = self.start_video_locked(&mut inner, device_id).await;
        self.publish_current(&inner);
        self.report("Video", result)
    }

    async fn start_video_locked(
        &self,
        inner: &mut Inner,
        device_id: &str,
    ) -> Result<(), SessionError> {
        let Inner {
            active,
            background_image,
        } = inner;
        let active = active.as_mut().ok_or(SessionError::NotJoined)?;
        if device_id.is_empty() {
            return Err(SessionError::InvalidArgument("no camera selected".to_string()));
        }
        if active.video.is_on() {
            return self
                .switch_camera_active(active, background_image.as_ref(), device_id)
                .await;
        }

        active
            .provider
            .start_video_input(VideoInput::Device(device_id.to_string()))
            .await
            .map_err(|e| SessionError::DeviceUnavailable(e.to_string()))?;
        if let Err(e) = active.provider.start_local_video_tile().await {
            best_effort("stop video input", active.provider.stop_video_input().await);
            return Err(SessionError::DeviceUnavailable(e.to_string()));
        }

        active.selected_camera = Some(device_id.to_string());
        active.video = VideoFeed::Raw;
        info!("Video started on {device_id}");
        self.status("Video started");
        Ok(())
    }

    /// Unpublish the local tile, release the camera and drop any background effect.
    pub async fn stop_video(&self) -> Result<(), SessionError> {
        let mut inner = self.acquire("Video")?;
        let mode_before = self.background_effect().mode;
        let result = match inner.active.as_mut() {
            Some(active) if active.video.is_on() => {
                self.stop_video_active(active).await;
                self.status("Video stopped");
                Ok(())
            }
            _ => Err(SessionError::VideoNotActive),
        };
        self.publish_current(&inner);
        self.emit_effect_change(mode_before);
        self.report("Video", result)
    }

    // Tile first, then the device, then the processor.
    async fn stop_video_active(&self, active: &mut ActiveSession) {
        best_effort(
            "stop local video tile",
            active.provider.stop_local_video_tile().await,
        );
        best_effort("stop video input", active.provider.stop_video_input().await);
        active.video = VideoFeed::Stopped;
        self.release_effect(active).await;
        self.projection.clear_local_preview();
        info!("Video stopped");
    }

    /// The only place a processor is destroyed. A transform input still
    /// running on the processor is stopped first.
    async fn release_effect(&self, active: &mut ActiveSession) {
        if active.video == VideoFeed::Transformed {
            best_effort("stop video input", active.provider.stop_video_input().await);
            active.video = VideoFeed::Stopped;
        }
        if let Some(processor) = active.effect.take() {
            debug!("destroying {} processor", processor.mode());
            if let Err(e) = processor.destroy().await {
                warn!("destroy background processor failed: {e}");
            }
        }
    }

    /// Bring back the plain camera after an effect was removed or failed.
    /// Falls back to audio only when the camera cannot be restarted.
    async fn restore_raw_camera(&self, active: &mut ActiveSession) -> Result<(), SessionError> {
        if active.video == VideoFeed::Raw {
            return Ok(());
        }
        let result = self.restart_raw(active).await;
        if let Err(e) = &result {
            warn!("restoring camera failed, stopping video: {e}");
            self.stop_video_active(active).await;
        }
        result
    }

    async fn restart_raw(&self, active: &mut ActiveSession) -> Result<(), SessionError> {
        let device_id = active
            .selected_camera
            .clone()
            .ok_or_else(|| SessionError::DeviceUnavailable("no camera selected".to_string()))?;
        if active.video.is_on() {
            best_effort("stop video input", active.provider.stop_video_input().await);
            active.video = VideoFeed::Stopped;
        }
        active
            .provider
            .start_video_input(VideoInput::Device(device_id))
            .await?;
        active.video = VideoFeed::Raw;
        active.provider.start_local_video_tile().await?;
        Ok(())
    }

    /// Create a processor for `mode` and swap it in as the video input.
    async fn install_effect(
        &self,
        active: &mut ActiveSession,
        mode: BackgroundMode,
        image: Option<ImageAsset>,
    ) -> Result<(), SessionError> {
        let device_id = active
            .selected_camera
            .clone()
            .ok_or_else(|| SessionError::DeviceUnavailable("no camera selected".to_string()))?;
        let processor = self
            .processors
            .create(EffectSpec::new(mode, &self.config, image))
            .await
            .map_err(|e| SessionError::ProcessorInitFailed(e.to_string()))?;
        active.effect.install(mode, Arc::clone(&processor));

        if let Err(e) = self.swap_in_transform(active, device_id, processor).await {
            self.release_effect(active).await;
            return Err(SessionError::DeviceUnavailable(e.to_string()));
        }
        Ok(())
    }

    // Old input stopped, transform input started, tile republished.
    async fn swap_in_transform(
        &self,
        active: &mut ActiveSession,
        device_id: String,
        processor: Arc<dyn EffectProcessor>,
    ) -> Result<(), MediaError> {
        if active.video.is_on() {
            best_effort("stop video input", active.provider.stop_video_input().await);
            active.video = VideoFeed::Stopped;
        }
        active
            .provider
            .start_video_input(VideoInput::Transform(TransformDevice {
                device_id,
                processor,
            }))
            .await?;
        active.video = VideoFeed::Transformed;
        active.provider.start_local_video_tile().await
    }

    /// Replace the camera background. `asset`, when given, becomes the stored
    /// replacement image.
    pub async fn apply_background_effect(
        &self,
        mode: BackgroundMode,
        asset: Option<ImageAsset>,
    ) -> Result<BackgroundMode, SessionError> {
        let mut inner = self.acquire("Background")?;
        let before = self.background_effect().mode;
        let result = self.apply_effect_locked(&mut inner, mode, asset).await;
        self.publish_current(&inner);
        let after = self.background_effect().mode;
        if before != after || result.is_ok() {
            self.bus.emit(ClientEvent::BackgroundEffectChanged(after));
        }
        self.report("Background", result)
    }

    async fn apply_effect_locked(
        &self,
        inner: &mut Inner,
        mode: BackgroundMode,
        asset: Option<ImageAsset>,
    ) -> Result<BackgroundMode, SessionError> {
        let Inner {
            active,
            background_image,
        } = inner;
        let active = active
            .as_mut()
            .filter(|a| a.video.is_on())
            .ok_or(SessionError::VideoNotActive)?;
        if asset.is_some() {
            *background_image = asset;
        }

        self.status("Applying background...");
        self.release_effect(active).await;

        if mode == BackgroundMode::None {
            self.restore_raw_camera(active).await?;
            self.status("Background removed");
            return Ok(BackgroundMode::None);
        }

        let image = match mode {
            BackgroundMode::ImageReplacement => match background_image.clone() {
                Some(image) => Some(image),
                None => {
                    best_effort_restore(self.restore_raw_camera(active).await);
                    return Err(SessionError::MissingAsset);
                }
            },
            _ => None,
        };

        if let Err(e) = self.install_effect(active, mode, image).await {
            best_effort_restore(self.restore_raw_camera(active).await);
            return Err(e);
        }
        info!("Background effect {mode} applied");
        self.status("Background applied.");
        Ok(mode)
    }

    /// Select a different camera. An active background effect is rebuilt on
    /// the new camera.
    pub async fn switch_camera(&self, device_id: &str) -> Result<(), SessionError> {
        let mut inner = self.acquire("Camera")?;
        let mode_before = self.background_effect().mode;
        let Inner {
            active,
            background_image,
        } = &mut *inner;
        let result = match active.as_mut() {
            None => Err(SessionError::NotJoined),
            Some(_) if device_id.is_empty() => Err(SessionError::InvalidArgument(
                "no camera selected".to_string(),
            )),
            Some(active) => {
                self.switch_camera_active(active, background_image.as_ref(), device_id)
                    .await
            }
        };
        self.publish_current(&inner);
        self.emit_effect_change(mode_before);
        self.report("Camera", result)
    }

    async fn switch_camera_active(
        &self,
        active: &mut ActiveSession,
        background_image: Option<&ImageAsset>,
        device_id: &str,
    ) -> Result<(), SessionError> {
        match active.video {
            VideoFeed::Stopped => {
                active.selected_camera = Some(device_id.to_string());
            }
            VideoFeed::Raw => {
                active
                    .provider
                    .start_video_input(VideoInput::Device(device_id.to_string()))
                    .await
                    .map_err(|e| SessionError::DeviceUnavailable(e.to_string()))?;
                active.selected_camera = Some(device_id.to_string());
            }
            VideoFeed::Transformed => {
                let mode = active.effect.mode();
                let image = match mode {
                    BackgroundMode::ImageReplacement => background_image.cloned(),
                    _ => None,
                };
                let previous = active.selected_camera.replace(device_id.to_string());
                self.release_effect(active).await;
                if let Err(e) = self.install_effect(active, mode, image).await {
                    active.selected_camera = previous;
                    best_effort_restore(self.restore_raw_camera(active).await);
                    return Err(e);
                }
                info!("Rebuilt {mode} pipeline on {device_id}");
            }
        }
        self.status("Camera switched");
        Ok(())
    }

    pub async fn switch_microphone(&self, device_id: &str) -> Result<(), SessionError> {
        let mut inner = self.acquire("Microphone")?;
        let result = match inner.active.as_mut() {
            None => Err(SessionError::NotJoined),
            Some(_) if device_id.is_empty() => Err(SessionError::InvalidArgument(
                "no microphone selected".to_string(),
            )),
            Some(active) => {
                match active.provider.start_audio_input(device_id).await {
                    Ok(()) => {
                        active.selected_microphone = Some(device_id.to_string());
                        self.status("Microphone switched");
                        Ok(())
                    }
                    Err(e) => Err(SessionError::DeviceUnavailable(e.to_string())),
                }
            }
        };
        self.report("Microphone", result)
    }

    /// Start or stop sharing the screen. Returns whether sharing is now on.
    pub async fn toggle_screen_share(&self) -> Result<bool, SessionError> {
        let mut inner = self.acquire("Screen share")?;
        let result = match inner.active.as_mut() {
            Some(active) => self.toggle_share_active(active).await,
            None => Err(SessionError::NotJoined),
        };
        self.publish_current(&inner);
        if let Ok(sharing) = result {
            self.bus.emit(ClientEvent::ScreenShareChanged(sharing));
        }
        self.report("Screen share", result)
    }

    async fn toggle_share_active(&self, active: &mut ActiveSession) -> Result<bool, SessionError> {
        if let Some(stream) = active.share.take() {
            self.stop_share(active, stream).await;
            self.status("Screen sharing stopped");
            return Ok(false);
        }

        let stream = self.display.request_display().await?;
        if let Err(e) = active.provider.start_content_share(&stream).await {
            best_effort("release display stream", self.display.release(stream).await);
            return Err(e.into());
        }
        info!("Screen sharing started with {}", stream.stream_id);
        active.share = Some(stream);
        self.status("Screen sharing started");
        Ok(true)
    }

    async fn stop_share(&self, active: &ActiveSession, stream: DisplayStream) {
        best_effort(
            "stop content share",
            active.provider.stop_content_share().await,
        );
        best_effort("release display stream", self.display.release(stream).await);
    }

    /// Mute or unmute the microphone. Returns whether audio is now enabled.
    pub async fn toggle_audio(&self) -> Result<bool, SessionError> {
        let mut inner = self.acquire("Audio")?;
        let result = match inner.active.as_mut() {
            Some(active) => {
                let mute = active.audio_enabled;
                match active.provider.set_local_audio_muted(mute).await {
                    Ok(()) => {
                        active.audio_enabled = !mute;
                        self.bus.emit(ClientEvent::AudioMuted(mute));
                        self.status(if mute { "Muted" } else { "Unmuted" });
                        Ok(!mute)
                    }
                    Err(e) => Err(e.into()),
                }
            }
            None => Err(SessionError::NotJoined),
        };
        self.publish_current(&inner);
        self.report("Audio", result)
    }

    /// Store the image used by [`BackgroundMode::ImageReplacement`].
    pub fn set_background_image(&self, asset: ImageAsset) -> Result<(), SessionError> {
        let mut inner = self
            .inner
            .try_lock()
            .map_err(|_| SessionError::Busy)?;
        debug!("background image set to {}", asset.name);
        inner.background_image = Some(asset);
        self.publish_current(&inner);
        self.status("Background image loaded.");
        Ok(())
    }

    /// Tear the call down. Succeeds without doing anything when idle.
    pub async fn leave(&self) -> Result<(), SessionError> {
        let mut inner = self.acquire("Leave")?;
        let Some(mut active) = inner.active.take() else {
            return Ok(());
        };
        let mode_before = self.background_effect().mode;
        self.publish_state(SessionState::Leaving);

        if active.video.is_on() {
            self.stop_video_active(&mut active).await;
        }
        if let Some(stream) = active.share.take() {
            self.stop_share(&active, stream).await;
            self.bus.emit(ClientEvent::ScreenShareChanged(false));
        }
        best_effort("stop provider", active.provider.stop().await);
        self.release_effect(&mut active).await;
        drop(active);

        self.projection.end_session();
        inner.background_image = None;
        self.publish(SessionState::Idle, &inner);
        self.emit_effect_change(mode_before);
        info!("Left the meeting");
        self.bus.emit(ClientEvent::Left);
        self.status("Left the meeting.");
        Ok(())
    }

    // === Bookkeeping ===

    fn acquire(&self, op: &str) -> Result<tokio::sync::MutexGuard<'_, Inner>, SessionError> {
        self.inner.try_lock().map_err(|_| {
            warn!("{op} rejected: another operation is in progress");
            self.status(&format!("{op} error: {}", SessionError::Busy));
            SessionError::Busy
        })
    }

    fn published(&self) -> MutexGuard<'_, Published> {
        self.published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish_current(&self, inner: &Inner) {
        let state = match &inner.active {
            Some(active) => active.state(),
            None => SessionState::Idle,
        };
        self.publish(state, inner);
    }

    fn publish(&self, state: SessionState, inner: &Inner) {
        let session = inner.active.as_ref().map(|active| Session {
            meeting_id: active.meeting_id.clone(),
            attendee_id: active.attendee_id.clone(),
            state,
            audio_enabled: active.audio_enabled,
            video_enabled: active.video.is_on(),
            screen_share_enabled: active.share.is_some(),
        });
        let effect = BackgroundEffectState {
            mode: inner
                .active
                .as_ref()
                .map_or(BackgroundMode::None, |a| a.effect.mode()),
            has_processor: inner
                .active
                .as_ref()
                .is_some_and(|a| a.effect.has_processor()),
            image: inner.background_image.as_ref().map(|i| i.name.clone()),
        };
        let changed = {
            let mut published = self.published();
            let changed = published.state != state;
            published.state = state;
            published.session = session;
            published.effect = effect;
            changed
        };
        if changed {
            debug!("state -> {state}");
            self.bus.emit(ClientEvent::StateChanged(state));
        }
    }

    fn publish_state(&self, state: SessionState) {
        let changed = {
            let mut published = self.published();
            let changed = published.state != state;
            published.state = state;
            if let Some(session) = published.session.as_mut() {
                session.state = state;
            }
            changed
        };
        if changed {
            debug!("state -> {state}");
            self.bus.emit(ClientEvent::StateChanged(state));
        }
    }

    fn emit_effect_change(&self, before: BackgroundMode) {
        let after = self.background_effect().mode;
        if before != after {
            self.bus.emit(ClientEvent::BackgroundEffectChanged(after));
        }
    }

    fn status(&self, message: &str) {
        self.bus.emit(ClientEvent::Status(message.to_string()));
    }

    fn report<T>(&self, op: &str, result: Result<T, SessionError>) -> Result<T, SessionError> {
        if let Err(e) = &result {
            error!("{op} error: {e}");
            self.status(&format!("{op} error: {e}"));
        }
        result
    }
}

fn best_effort_restore(result: Result<(), SessionError>) {
    if let Err(e) = result {
        warn!("restoring camera after failed effect: {e}");
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state())
            .field("backend_url", &self.config.backend_url)
            .finish()
    }
}
