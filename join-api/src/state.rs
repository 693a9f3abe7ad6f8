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

//! Shared application state passed to every Axum handler via `State`.

use std::sync::Arc;

use crate::config::Config;
use crate::provisioner::MeetingProvisioner;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Port to the meeting provisioning service.
    pub provisioner: Arc<dyn MeetingProvisioner>,
    /// Media region used when the request omits one.
    pub default_region: String,
    /// Bearer token secret. `None` disables the authentication guard.
    pub jwt_secret: Option<String>,
}

impl AppState {
    pub fn new(provisioner: Arc<dyn MeetingProvisioner>, config: &Config) -> Self {
        Self {
            provisioner,
            default_region: config.default_region.clone(),
            jwt_secret: config.jwt_secret.clone(),
        }
    }
}
