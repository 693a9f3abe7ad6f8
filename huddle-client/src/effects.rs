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

//! Background effect processors.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ClientConfig, EffectAssets};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    #[default]
    None,
    Blur,
    #[serde(rename = "image")]
    ImageReplacement,
}

impl fmt::Display for BackgroundMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackgroundMode::None => write!(f, "none"),
            BackgroundMode::Blur => write!(f, "blur"),
            BackgroundMode::ImageReplacement => write!(f, "image"),
        }
    }
}

/// An uploaded replacement background.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageAsset {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl ImageAsset {
    pub fn new(name: &str, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.to_string(),
            bytes: bytes.into(),
        }
    }
}

/// Everything a processor needs to start.
#[derive(Clone, Debug)]
pub struct EffectSpec {
    pub mode: BackgroundMode,
    pub assets: EffectAssets,
    pub blur_strength: u8,
    pub image: Option<ImageAsset>,
}

impl EffectSpec {
    pub fn new(mode: BackgroundMode, config: &ClientConfig, image: Option<ImageAsset>) -> Self {
        Self {
            mode,
            assets: config.effect_assets.clone(),
            blur_strength: config.blur_strength,
            image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EffectError {
    #[error("failed to load {path}: {reason}")]
    AssetLoad { path: String, reason: String },

    #[error("segmentation worker error: {0}")]
    Worker(String),

    #[error("processor has been destroyed")]
    Destroyed,
}

#[async_trait]
pub trait EffectProcessor: Send + Sync {
    fn mode(&self) -> BackgroundMode;

    /// Release the worker and everything it holds.
    async fn destroy(&self) -> Result<(), EffectError>;
}

#[async_trait]
pub trait ProcessorFactory: Send + Sync {
    async fn create(&self, spec: EffectSpec) -> Result<Arc<dyn EffectProcessor>, EffectError>;
}

/// The controller's single effect slot.
///
/// Holds at most one processor; a mode other than `None` always has one.
#[derive(Default)]
pub(crate) struct EffectSlot {
    active: Option<(BackgroundMode, Arc<dyn EffectProcessor>)>,
}

impl EffectSlot {
    pub fn mode(&self) -> BackgroundMode {
        self.active
            .as_ref()
            .map_or(BackgroundMode::None, |(mode, _)| *mode)
    }

    pub fn has_processor(&self) -> bool {
        self.active.is_some()
    }

    pub fn install(&mut self, mode: BackgroundMode, processor: Arc<dyn EffectProcessor>) {
        self.active = Some((mode, processor));
    }

    /// Empty the slot, handing back the processor so it can be destroyed.
    pub fn take(&mut self) -> Option<Arc<dyn EffectProcessor>> {
        self.active.take().map(|(_, processor)| processor)
    }
}
