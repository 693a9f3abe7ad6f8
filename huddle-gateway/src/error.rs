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

//! Error types for the join API client.

use thiserror::Error;

/// Errors returned by [`JoinApiClient`](crate::JoinApiClient) methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The bearer token is missing, expired, or invalid (HTTP 401).
    #[error("Not authenticated. Please log in.")]
    NotAuthenticated,

    /// Any other non-2xx answer, with the status code and raw body.
    #[error("Server error ({status}): {body}")]
    ServerError { status: u16, body: String },

    /// A 2xx answer whose body is not a join response.
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A network or transport error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ApiError {
    /// HTTP status associated with the error, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotAuthenticated => Some(401),
            ApiError::ServerError { status, .. } => Some(*status),
            ApiError::Decode(_) | ApiError::Network(_) => None,
        }
    }
}
