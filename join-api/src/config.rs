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

//! Application configuration loaded from environment variables.

use std::env;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_MEDIA_BASE_URL: &str = "wss://media.localhost";
pub const DEFAULT_MEETING_CAPACITY: usize = crate::provisioner::DEFAULT_MEETING_CAPACITY;

/// Configuration for the join service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP server (e.g. "0.0.0.0:8080").
    pub listen_addr: String,
    /// Media region used when a request does not name one.
    pub default_region: String,
    /// Shared secret for bearer tokens (HMAC-SHA256). `None` disables the
    /// authentication guard.
    pub jwt_secret: Option<String>,
    /// Base URL the local provisioner derives media placement URLs from.
    pub media_base_url: String,
    /// Meetings the local provisioner remembers before evicting the oldest.
    pub meeting_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            default_region: DEFAULT_REGION.to_string(),
            jwt_secret: None,
            media_base_url: DEFAULT_MEDIA_BASE_URL.to_string(),
            meeting_capacity: DEFAULT_MEETING_CAPACITY,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Optional
    /// - `LISTEN_ADDR` (default: `"0.0.0.0:8080"`)
    /// - `DEFAULT_REGION` (default: `"us-east-1"`)
    /// - `JWT_SECRET` (unset or empty: no authentication guard)
    /// - `MEDIA_BASE_URL` (default: `"wss://media.localhost"`)
    /// - `MEETING_CAPACITY` (default: `1024`)
    pub fn from_env() -> Result<Self, String> {
        let listen_addr =
            env::var("LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());
        let default_region = env::var("DEFAULT_REGION")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        let jwt_secret = env::var("JWT_SECRET").ok().filter(|s| !s.is_empty());
        let media_base_url =
            env::var("MEDIA_BASE_URL").unwrap_or_else(|_| DEFAULT_MEDIA_BASE_URL.to_string());

        let meeting_capacity = match env::var("MEETING_CAPACITY") {
            Ok(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(format!(
                        "MEETING_CAPACITY must be a positive integer, got {raw:?}"
                    ))
                }
            },
            Err(_) => DEFAULT_MEETING_CAPACITY,
        };

        if !media_base_url.contains("://") {
            return Err(format!(
                "MEDIA_BASE_URL must be an absolute URL, got {media_base_url:?}"
            ));
        }

        Ok(Self {
            listen_addr,
            default_region,
            jwt_secret,
            media_base_url,
            meeting_capacity,
        })
    }
}
