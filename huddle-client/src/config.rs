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

use serde::{Deserialize, Serialize};
use std::fs;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_BLUR_STRENGTH: u8 = 40;

/// Locations of the segmentation worker bundle.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct EffectAssets {
    pub worker: String,
    pub wasm: String,
    /// SIMD build of the WASM binary, preferred when the host supports it.
    pub simd: Option<String>,
}

impl Default for EffectAssets {
    fn default() -> Self {
        Self {
            worker: "background-filters/worker.js".to_string(),
            wasm: "background-filters/segmentation.wasm".to_string(),
            simd: Some("background-filters/segmentation-simd.wasm".to_string()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    pub backend_url: String,
    /// Region sent to the backend when a join is requested without one.
    pub default_region: String,
    pub effect_assets: EffectAssets,
    pub blur_strength: u8,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            default_region: DEFAULT_REGION.to_string(),
            effect_assets: EffectAssets::default(),
            blur_strength: DEFAULT_BLUR_STRENGTH,
        }
    }
}

impl ClientConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: ClientConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load `HUDDLE_CONFIG_PATH` if set, otherwise start from defaults, then
    /// apply the `HUDDLE_*` environment overrides.
    pub fn from_env_or_default() -> anyhow::Result<Self> {
        let mut config = match std::env::var("HUDDLE_CONFIG_PATH") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };

        if let Ok(url) = std::env::var("HUDDLE_BACKEND_URL") {
            config.backend_url = url;
        }
        if let Ok(region) = std::env::var("HUDDLE_DEFAULT_REGION") {
            config.default_region = region;
        }
        if let Ok(worker) = std::env::var("HUDDLE_EFFECT_WORKER") {
            config.effect_assets.worker = worker;
        }
        if let Ok(wasm) = std::env::var("HUDDLE_EFFECT_WASM") {
            config.effect_assets.wasm = wasm;
        }
        if let Ok(simd) = std::env::var("HUDDLE_EFFECT_SIMD") {
            // An empty value disables the SIMD build.
            config.effect_assets.simd = Some(simd).filter(|s| !s.is_empty());
        }
        if let Ok(strength) = std::env::var("HUDDLE_BLUR_STRENGTH") {
            config.blur_strength = strength.parse().unwrap_or(DEFAULT_BLUR_STRENGTH);
        }

        anyhow::ensure!(
            !config.backend_url.is_empty(),
            "backend_url must not be empty"
        );
        Ok(config)
    }
}
