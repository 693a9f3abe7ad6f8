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

//! Recording fakes for the controller's collaborators.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

use async_trait::async_trait;
use huddle_client::{
    AuthGate, BackendGateway, BackgroundMode, ClientConfig, Collaborators, Credential, DeviceInfo,
    DisplayCapture, DisplaySlot, DisplayStream, EffectError, EffectProcessor, EffectSpec,
    MediaError, MediaSessionProvider, ProcessorFactory, ProviderEvent, ProviderEventSink,
    ProviderFactory, RenderSurface, SessionController, SessionError, TileState, VideoInput,
};
use huddle_types::{
    AttendeeDescriptor, JoinMeetingRequest, JoinMeetingResponse, MediaPlacement,
    MeetingDescriptor,
};

// === Provider ===

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    ListAudio,
    ListVideo,
    StartAudio(String),
    Start,
    Stop,
    StartVideo { device_id: String, transformed: bool },
    StopVideo,
    StartTile,
    StopTile,
    StartShare(String),
    StopShare,
    Mute(bool),
    DestroyProcessor(BackgroundMode),
}

/// State shared by the provider factory and every provider it creates.
#[derive(Default)]
pub struct ProviderState {
    pub calls: Mutex<Vec<Call>>,
    pub failing: Mutex<HashSet<&'static str>>,
    pub sink: Mutex<Option<ProviderEventSink>>,
    pub created: AtomicUsize,
    pub live: AtomicUsize,
    pub current_input: Mutex<Option<VideoInput>>,
    pub cameras: Mutex<Vec<DeviceInfo>>,
    pub microphones: Mutex<Vec<DeviceInfo>>,
}

impl ProviderState {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn fail(&self, step: &'static str) {
        self.failing.lock().unwrap().insert(step);
    }

    pub fn recover(&self, step: &'static str) {
        self.failing.lock().unwrap().remove(step);
    }

    pub fn dispatch(&self, event: ProviderEvent) {
        let sink = self.sink.lock().unwrap().clone().expect("no provider created");
        sink.dispatch(event);
    }

    pub fn transform_starts(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::StartVideo { transformed: true, .. }))
            .count()
    }

    fn record(&self, call: Call, step: &'static str) -> Result<(), MediaError> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(step) {
            Err(MediaError::DeviceUnavailable(step.to_string()))
        } else {
            Ok(())
        }
    }
}

pub struct FakeProvider {
    state: Arc<ProviderState>,
}

impl Drop for FakeProvider {
    fn drop(&mut self) {
        self.state.live.fetch_sub(1, Ordering::SeqCst);
        self.state.current_input.lock().unwrap().take();
    }
}

#[async_trait]
impl MediaSessionProvider for FakeProvider {
    async fn list_audio_inputs(&self) -> Result<Vec<DeviceInfo>, MediaError> {
        self.state.record(Call::ListAudio, "list_audio_inputs")?;
        Ok(self.state.microphones.lock().unwrap().clone())
    }

    async fn list_video_inputs(&self) -> Result<Vec<DeviceInfo>, MediaError> {
        self.state.record(Call::ListVideo, "list_video_inputs")?;
        Ok(self.state.cameras.lock().unwrap().clone())
    }

    async fn start_audio_input(&self, device_id: &str) -> Result<(), MediaError> {
        self.state
            .record(Call::StartAudio(device_id.to_string()), "start_audio_input")
    }

    async fn start(&self) -> Result<(), MediaError> {
        self.state.record(Call::Start, "start")
    }

    async fn stop(&self) -> Result<(), MediaError> {
        self.state.record(Call::Stop, "stop")
    }

    async fn start_video_input(&self, input: VideoInput) -> Result<(), MediaError> {
        let call = Call::StartVideo {
            device_id: input.device_id().to_string(),
            transformed: matches!(input, VideoInput::Transform(_)),
        };
        self.state.record(call, "start_video_input")?;
        *self.state.current_input.lock().unwrap() = Some(input);
        Ok(())
    }

    async fn stop_video_input(&self) -> Result<(), MediaError> {
        self.state.current_input.lock().unwrap().take();
        self.state.record(Call::StopVideo, "stop_video_input")
    }

    async fn start_local_video_tile(&self) -> Result<(), MediaError> {
        self.state.record(Call::StartTile, "start_local_video_tile")
    }

    async fn stop_local_video_tile(&self) -> Result<(), MediaError> {
        self.state.record(Call::StopTile, "stop_local_video_tile")
    }

    async fn start_content_share(&self, stream: &DisplayStream) -> Result<(), MediaError> {
        self.state
            .record(Call::StartShare(stream.stream_id.clone()), "start_content_share")
    }

    async fn stop_content_share(&self) -> Result<(), MediaError> {
        self.state.record(Call::StopShare, "stop_content_share")
    }

    async fn set_local_audio_muted(&self, muted: bool) -> Result<(), MediaError> {
        self.state.record(Call::Mute(muted), "set_local_audio_muted")
    }
}

pub struct FakeProviderFactory {
    pub state: Arc<ProviderState>,
}

#[async_trait]
impl ProviderFactory for FakeProviderFactory {
    async fn create(
        &self,
        _credentials: &JoinMeetingResponse,
        events: ProviderEventSink,
    ) -> Result<Box<dyn MediaSessionProvider>, MediaError> {
        if self.state.failing.lock().unwrap().contains("create") {
            return Err(MediaError::Failed("provider construction failed".into()));
        }
        self.state.created.fetch_add(1, Ordering::SeqCst);
        self.state.live.fetch_add(1, Ordering::SeqCst);
        *self.state.sink.lock().unwrap() = Some(events);
        Ok(Box::new(FakeProvider {
            state: Arc::clone(&self.state),
        }))
    }
}

// === Processors ===

/// Holds the next processor teardown until released.
#[derive(Default)]
pub struct DestroyGate {
    armed: AtomicBool,
    pub entered: tokio::sync::Notify,
    pub release: tokio::sync::Notify,
}

impl DestroyGate {
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    async fn pass(&self) {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }
}

pub struct FakeProcessor {
    mode: BackgroundMode,
    destroyed: Arc<AtomicUsize>,
    gate: Arc<DestroyGate>,
    log: Arc<ProviderState>,
}

#[async_trait]
impl EffectProcessor for FakeProcessor {
    fn mode(&self) -> BackgroundMode {
        self.mode
    }

    async fn destroy(&self) -> Result<(), EffectError> {
        self.gate.pass().await;
        self.destroyed.fetch_add(1, Ordering::SeqCst);
        self.log
            .calls
            .lock()
            .unwrap()
            .push(Call::DestroyProcessor(self.mode));
        Ok(())
    }
}

pub struct FakeProcessorFactory {
    log: Arc<ProviderState>,
    pub created: AtomicUsize,
    pub destroyed: Arc<AtomicUsize>,
    pub destroy_gate: Arc<DestroyGate>,
    pub fail: Mutex<bool>,
    pub specs: Mutex<Vec<EffectSpec>>,
    instances: Mutex<Vec<Weak<dyn EffectProcessor>>>,
}

impl FakeProcessorFactory {
    /// Destroy calls are recorded in `log` alongside the provider calls.
    pub fn new(log: Arc<ProviderState>) -> Self {
        Self {
            log,
            created: AtomicUsize::new(0),
            destroyed: Arc::new(AtomicUsize::new(0)),
            destroy_gate: Arc::new(DestroyGate::default()),
            fail: Mutex::new(false),
            specs: Mutex::new(Vec::new()),
            instances: Mutex::new(Vec::new()),
        }
    }

    /// Processors created and not yet destroyed.
    pub fn undestroyed(&self) -> usize {
        self.created.load(Ordering::SeqCst) - self.destroyed.load(Ordering::SeqCst)
    }

    /// Processors something still holds a reference to.
    pub fn referenced(&self) -> usize {
        self.instances
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn last_spec(&self) -> Option<EffectSpec> {
        self.specs.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ProcessorFactory for FakeProcessorFactory {
    async fn create(&self, spec: EffectSpec) -> Result<Arc<dyn EffectProcessor>, EffectError> {
        self.specs.lock().unwrap().push(spec.clone());
        if *self.fail.lock().unwrap() {
            return Err(EffectError::AssetLoad {
                path: spec.assets.wasm.clone(),
                reason: "404".to_string(),
            });
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        let processor: Arc<dyn EffectProcessor> = Arc::new(FakeProcessor {
            mode: spec.mode,
            destroyed: Arc::clone(&self.destroyed),
            gate: Arc::clone(&self.destroy_gate),
            log: Arc::clone(&self.log),
        });
        self.instances.lock().unwrap().push(Arc::downgrade(&processor));
        Ok(processor)
    }
}

// === Backend ===

pub fn join_response(meeting_id: &str, attendee_id: &str, external_user_id: &str) -> JoinMeetingResponse {
    JoinMeetingResponse {
        meeting: MeetingDescriptor {
            meeting_id: meeting_id.to_string(),
            external_meeting_id: Some("room-1".to_string()),
            media_region: "us-east-1".to_string(),
            media_placement: MediaPlacement {
                audio_host_url: "audio.test:3478".to_string(),
                signaling_url: format!("wss://signal.test/control/{meeting_id}"),
                ..MediaPlacement::default()
            },
        },
        attendee: AttendeeDescriptor {
            external_user_id: external_user_id.to_string(),
            attendee_id: attendee_id.to_string(),
            join_token: "join-token".to_string(),
        },
    }
}

#[derive(Default)]
pub struct FakeGateway {
    pub requests: Mutex<Vec<(JoinMeetingRequest, Option<Credential>)>>,
    pub failure: Mutex<Option<SessionError>>,
}

impl FakeGateway {
    pub fn fail_with(&self, err: SessionError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl BackendGateway for FakeGateway {
    async fn create_session(
        &self,
        request: &JoinMeetingRequest,
        credential: Option<&Credential>,
    ) -> Result<JoinMeetingResponse, SessionError> {
        self.requests
            .lock()
            .unwrap()
            .push((request.clone(), credential.cloned()));
        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        let name = request.name.clone().unwrap_or_default();
        Ok(join_response("m-1", "me", &format!("{name}#local")))
    }
}

/// Gateway whose join blocks until released, for overlap tests.
#[derive(Default)]
pub struct GatedGateway {
    pub release: tokio::sync::Notify,
    pub entered: tokio::sync::Notify,
}

#[async_trait]
impl BackendGateway for GatedGateway {
    async fn create_session(
        &self,
        _request: &JoinMeetingRequest,
        _credential: Option<&Credential>,
    ) -> Result<JoinMeetingResponse, SessionError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(join_response("m-1", "me", "Alice#local"))
    }
}

pub struct StaticGate(pub Result<Credential, SessionError>);

#[async_trait]
impl AuthGate for StaticGate {
    async fn credential(&self) -> Result<Credential, SessionError> {
        self.0.clone()
    }
}

// === Display and rendering ===

#[derive(Default)]
pub struct FakeDisplay {
    pub requested: AtomicUsize,
    pub released: AtomicUsize,
    pub fail: Mutex<bool>,
}

impl FakeDisplay {
    pub fn outstanding(&self) -> usize {
        self.requested.load(Ordering::SeqCst) - self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DisplayCapture for FakeDisplay {
    async fn request_display(&self) -> Result<DisplayStream, MediaError> {
        if *self.fail.lock().unwrap() {
            return Err(MediaError::PermissionDenied("display".into()));
        }
        let n = self.requested.fetch_add(1, Ordering::SeqCst);
        Ok(DisplayStream {
            stream_id: format!("display-{n}"),
        })
    }

    async fn release(&self, _stream: DisplayStream) -> Result<(), MediaError> {
        self.released.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Render {
    Attach(u32, DisplaySlot),
    Detach(u32, DisplaySlot),
}

#[derive(Default)]
pub struct RecordingSurface {
    pub calls: Mutex<Vec<Render>>,
}

impl RecordingSurface {
    pub fn calls(&self) -> Vec<Render> {
        self.calls.lock().unwrap().clone()
    }
}

impl RenderSurface for RecordingSurface {
    fn attach(&self, tile_id: u32, slot: DisplaySlot) {
        self.calls.lock().unwrap().push(Render::Attach(tile_id, slot));
    }

    fn detach(&self, tile_id: u32, slot: DisplaySlot) {
        self.calls.lock().unwrap().push(Render::Detach(tile_id, slot));
    }
}

// === Harness ===

pub struct Harness {
    pub controller: SessionController,
    pub provider: Arc<ProviderState>,
    pub processors: Arc<FakeProcessorFactory>,
    pub gateway: Arc<FakeGateway>,
    pub display: Arc<FakeDisplay>,
    pub surface: Arc<RecordingSurface>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_gateway(Arc::new(FakeGateway::default()))
    }

    pub fn with_gateway(gateway: Arc<FakeGateway>) -> Self {
        Self::assemble(gateway.clone(), gateway)
    }

    /// A harness whose joins go through `backend` instead of the recording gateway.
    pub fn with_backend(backend: Arc<dyn BackendGateway>) -> Self {
        Self::assemble(backend, Arc::new(FakeGateway::default()))
    }

    fn assemble(backend: Arc<dyn BackendGateway>, gateway: Arc<FakeGateway>) -> Self {
        let provider = Arc::new(ProviderState::default());
        *provider.cameras.lock().unwrap() = vec![
            DeviceInfo::new("camA", "Front camera"),
            DeviceInfo::new("camB", "USB camera"),
        ];
        *provider.microphones.lock().unwrap() = vec![
            DeviceInfo::new("mic1", "Built-in microphone"),
            DeviceInfo::new("mic2", "Headset"),
        ];
        let processors = Arc::new(FakeProcessorFactory::new(Arc::clone(&provider)));
        let display = Arc::new(FakeDisplay::default());
        let surface = Arc::new(RecordingSurface::default());

        let controller = SessionController::new(
            ClientConfig::default(),
            Collaborators {
                gateway: backend,
                providers: Arc::new(FakeProviderFactory {
                    state: Arc::clone(&provider),
                }),
                processors: processors.clone(),
                display: display.clone(),
                renderer: surface.clone(),
            },
        );

        Self {
            controller,
            provider,
            processors,
            gateway,
            display,
            surface,
        }
    }

    /// Join `room-1` as Alice and start `camA`.
    pub async fn joined_with_video() -> Self {
        let harness = Self::new();
        harness
            .controller
            .join("room-1", "Alice", "us-east-1")
            .await
            .unwrap();
        harness.controller.start_video("camA").await.unwrap();
        harness.local_tile(1);
        harness
    }

    /// Simulate the provider announcing the local camera tile.
    pub fn local_tile(&self, tile_id: u32) {
        self.provider.dispatch(ProviderEvent::TileUpdated(TileState {
            tile_id,
            bound_attendee_id: Some("me".to_string()),
            local_tile: true,
            is_content: false,
        }));
    }

    pub fn presence(&self, attendee_id: &str, external_user_id: &str, present: bool) {
        self.provider.dispatch(ProviderEvent::Presence {
            attendee_id: attendee_id.to_string(),
            present,
            external_user_id: external_user_id.to_string(),
        });
    }
}
