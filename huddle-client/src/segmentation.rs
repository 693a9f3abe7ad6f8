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

//! Segmentation worker protocol.
//!
//! The background-filter worker speaks `{ "msg": ..., "payload": ... }`
//! messages:
//!
//! | request     | reply                                   |
//! |-------------|-----------------------------------------|
//! | `initialize`| `initialize` with `1` (ok) or `0`       |
//! | `loadModel` | `loadModel` with `1` or `0`             |
//! | `predict`   | `predict` with `{ "output": mask }`     |
//!
//! A failed prediction replies with `"output": null`; an unparseable message
//! is answered with `error`. [`SegmentationWorker`]
//! is an in-process worker that answers predictions with a placeholder mask
//! (a centred disc), and [`WorkerProcessorFactory`] exposes it to the
//! controller as a [`ProcessorFactory`].

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::effects::{
    BackgroundMode, EffectError, EffectProcessor, EffectSpec, ImageAsset, ProcessorFactory,
};

const WASM_MAGIC: &[u8; 4] = b"\0asm";
const FOREGROUND_RADIUS: f64 = 0.3;
// 8K UHD.
pub const MAX_MASK_PIXELS: u64 = 7680 * 4320;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializePayload {
    pub wasm_path: String,
    pub simd_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSpec {
    pub model_url: String,
    #[serde(flatten)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl ModelSpec {
    pub fn new(model_url: &str) -> Self {
        Self {
            model_url: model_url.to_string(),
            options: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictPayload {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "msg", content = "payload", rename_all = "camelCase")]
pub enum WorkerRequest {
    Initialize(InitializePayload),
    LoadModel(ModelSpec),
    Predict(PredictPayload),
}

/// RGBA mask, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mask {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictReply {
    pub output: Option<Mask>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "msg", content = "payload", rename_all = "camelCase")]
pub enum WorkerReply {
    Initialize(u8),
    LoadModel(u8),
    Predict(PredictReply),
    Error(ErrorReply),
}

/// Fetches WASM binaries for the worker.
#[async_trait]
pub trait WasmLoader: Send + Sync {
    async fn load(&self, path: &str) -> Result<Vec<u8>, EffectError>;
}

/// Reads binaries from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FileWasmLoader;

#[async_trait]
impl WasmLoader for FileWasmLoader {
    async fn load(&self, path: &str) -> Result<Vec<u8>, EffectError> {
        tokio::fs::read(path)
            .await
            .map_err(|e| EffectError::AssetLoad {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LoadedModule {
    path: String,
    size: usize,
}

pub struct SegmentationWorker {
    loader: Arc<dyn WasmLoader>,
    simd_supported: bool,
    module: Option<LoadedModule>,
    model: Option<ModelSpec>,
}

impl SegmentationWorker {
    pub fn new(loader: Arc<dyn WasmLoader>, simd_supported: bool) -> Self {
        Self {
            loader,
            simd_supported,
            module: None,
            model: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.module.is_some() && self.model.is_some()
    }

    /// Path and size of the loaded WASM binary.
    pub fn loaded_module(&self) -> Option<(&str, usize)> {
        self.module.as_ref().map(|m| (m.path.as_str(), m.size))
    }

    /// Handle a raw JSON message. Unknown message types get no reply.
    pub async fn handle_json(&mut self, raw: &str) -> Option<WorkerReply> {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => return Some(error_reply(&e.to_string())),
        };
        match serde_json::from_value::<WorkerRequest>(value.clone()) {
            Ok(request) => Some(self.handle(request).await),
            Err(e) => match value.get("msg").and_then(|m| m.as_str()) {
                Some(msg @ ("initialize" | "loadModel" | "predict")) => {
                    Some(error_reply(&format!("malformed {msg} payload: {e}")))
                }
                Some(other) => {
                    warn!("Unknown message type: {other}");
                    None
                }
                None => Some(error_reply("message has no msg field")),
            },
        }
    }

    pub async fn handle(&mut self, request: WorkerRequest) -> WorkerReply {
        match request {
            WorkerRequest::Initialize(payload) => {
                WorkerReply::Initialize(u8::from(self.initialize(payload).await))
            }
            WorkerRequest::LoadModel(spec) => WorkerReply::LoadModel(u8::from(self.load_model(spec))),
            WorkerRequest::Predict(payload) => WorkerReply::Predict(PredictReply {
                output: self.predict(payload),
            }),
        }
    }

    async fn initialize(&mut self, payload: InitializePayload) -> bool {
        let path = match (&payload.simd_path, self.simd_supported) {
            (Some(simd), true) => simd.clone(),
            _ => payload.wasm_path.clone(),
        };
        match self.loader.load(&path).await {
            Ok(bytes) if bytes.starts_with(WASM_MAGIC) => {
                info!("WASM module initialized from {path}");
                self.module = Some(LoadedModule {
                    path,
                    size: bytes.len(),
                });
                true
            }
            Ok(_) => {
                warn!("WASM initialization failed: {path} is not a WebAssembly binary");
                false
            }
            Err(e) => {
                warn!("WASM initialization failed: {e}");
                false
            }
        }
    }

    fn load_model(&mut self, spec: ModelSpec) -> bool {
        if spec.model_url.trim().is_empty() {
            warn!("Model loading failed: empty model url");
            return false;
        }
        debug!("model registered: {}", spec.model_url);
        self.model = Some(spec);
        true
    }

    fn predict(&self, payload: PredictPayload) -> Option<Mask> {
        if !self.is_ready() {
            warn!("Prediction failed: worker not properly initialized");
            return None;
        }
        let mask = placeholder_mask(payload.width, payload.height);
        if mask.is_none() {
            warn!(
                "Prediction failed: {}x{} frame is too large",
                payload.width, payload.height
            );
        }
        mask
    }
}

fn error_reply(error: &str) -> WorkerReply {
    WorkerReply::Error(ErrorReply {
        error: error.to_string(),
    })
}

/// Foreground is a disc of radius `0.3 * min(width, height)` centred in the
/// frame. Colour channels carry the foreground value, alpha is opaque.
/// Returns `None` for frames over [`MAX_MASK_PIXELS`].
pub fn placeholder_mask(width: u32, height: u32) -> Option<Mask> {
    let pixels = u64::from(width) * u64::from(height);
    if pixels > MAX_MASK_PIXELS {
        return None;
    }
    let w = width as usize;
    let len = usize::try_from(pixels).ok()?.checked_mul(4)?;
    let centre_x = f64::from(width) / 2.0;
    let centre_y = f64::from(height) / 2.0;
    let radius = f64::from(width.min(height)) * FOREGROUND_RADIUS;

    let mut data = vec![0u8; len];
    for (i, pixel) in data.chunks_exact_mut(4).enumerate() {
        let x = (i % w) as f64;
        let y = (i / w) as f64;
        let distance = ((x - centre_x).powi(2) + (y - centre_y).powi(2)).sqrt();
        let value = if distance < radius { 255 } else { 0 };
        pixel[..3].fill(value);
        pixel[3] = 255;
    }
    Some(Mask {
        width,
        height,
        data,
    })
}

/// Background processor backed by a [`SegmentationWorker`].
pub struct WorkerProcessor {
    mode: BackgroundMode,
    blur_strength: u8,
    image: Option<ImageAsset>,
    worker: Mutex<Option<SegmentationWorker>>,
}

impl WorkerProcessor {
    pub fn blur_strength(&self) -> u8 {
        self.blur_strength
    }

    pub fn image(&self) -> Option<&ImageAsset> {
        self.image.as_ref()
    }

    /// Segment one frame.
    pub async fn predict(&self, width: u32, height: u32) -> Result<Mask, EffectError> {
        let mut guard = self.worker.lock().await;
        let worker = guard.as_mut().ok_or(EffectError::Destroyed)?;
        match worker
            .handle(WorkerRequest::Predict(PredictPayload { width, height }))
            .await
        {
            WorkerReply::Predict(PredictReply {
                output: Some(mask),
            }) => Ok(mask),
            _ => Err(EffectError::Worker("prediction failed".to_string())),
        }
    }
}

#[async_trait]
impl EffectProcessor for WorkerProcessor {
    fn mode(&self) -> BackgroundMode {
        self.mode
    }

    async fn destroy(&self) -> Result<(), EffectError> {
        if self.worker.lock().await.take().is_some() {
            debug!("segmentation worker for {} released", self.mode);
        }
        Ok(())
    }
}

/// [`ProcessorFactory`] that boots a fresh [`SegmentationWorker`] per processor.
pub struct WorkerProcessorFactory {
    loader: Arc<dyn WasmLoader>,
    simd_supported: bool,
    model: ModelSpec,
}

impl WorkerProcessorFactory {
    pub fn new(loader: Arc<dyn WasmLoader>, simd_supported: bool, model: ModelSpec) -> Self {
        Self {
            loader,
            simd_supported,
            model,
        }
    }
}

#[async_trait]
impl ProcessorFactory for WorkerProcessorFactory {
    async fn create(&self, spec: EffectSpec) -> Result<Arc<dyn EffectProcessor>, EffectError> {
        if spec.mode == BackgroundMode::None {
            return Err(EffectError::Worker("no processor for mode none".to_string()));
        }
        let mut worker = SegmentationWorker::new(Arc::clone(&self.loader), self.simd_supported);

        let init = WorkerRequest::Initialize(InitializePayload {
            wasm_path: spec.assets.wasm.clone(),
            simd_path: spec.assets.simd.clone(),
        });
        if worker.handle(init).await != WorkerReply::Initialize(1) {
            return Err(EffectError::Worker(format!(
                "failed to initialize {}",
                spec.assets.worker
            )));
        }
        if worker
            .handle(WorkerRequest::LoadModel(self.model.clone()))
            .await
            != WorkerReply::LoadModel(1)
        {
            return Err(EffectError::Worker("failed to load model".to_string()));
        }

        Ok(Arc::new(WorkerProcessor {
            mode: spec.mode,
            blur_strength: spec.blur_strength,
            image: spec.image,
            worker: Mutex::new(Some(worker)),
        }))
    }
}
