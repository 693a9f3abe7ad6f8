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

//! Errors surfaced by [`SessionController`](crate::SessionController) operations.

use huddle_gateway::ApiError;
use thiserror::Error;

use crate::provider::MediaError;

/// Failure of a controller operation.
///
/// The `Display` text of every variant is suitable as a status message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Not authenticated. Please sign in before joining.")]
    Unauthenticated,

    #[error("Backend error {status}: {body}")]
    BackendError { status: u16, body: String },

    #[error("A session is already active")]
    AlreadyActive,

    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Start video first.")]
    VideoNotActive,

    #[error("Upload a background image first.")]
    MissingAsset,

    #[error("Background effect failed to initialize: {0}")]
    ProcessorInitFailed(String),

    #[error("Another operation is still in progress")]
    Busy,

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Not in a meeting")]
    NotJoined,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Media provider error: {0}")]
    Provider(String),
}

impl From<ApiError> for SessionError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotAuthenticated => SessionError::Unauthenticated,
            ApiError::ServerError { status: 401, .. } => SessionError::Unauthenticated,
            ApiError::ServerError { status, body } => SessionError::BackendError { status, body },
            ApiError::Decode(e) => SessionError::Network(format!("unexpected response body: {e}")),
            ApiError::Network(e) => SessionError::Network(e.to_string()),
        }
    }
}

impl From<MediaError> for SessionError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::DeviceUnavailable(_) | MediaError::PermissionDenied(_) => {
                SessionError::DeviceUnavailable(err.to_string())
            }
            MediaError::Failed(msg) => SessionError::Provider(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_errors_map_by_status() {
        assert_eq!(
            SessionError::from(ApiError::NotAuthenticated),
            SessionError::Unauthenticated
        );
        assert_eq!(
            SessionError::from(ApiError::ServerError {
                status: 500,
                body: "{\"error\":\"boom\"}".to_string(),
            }),
            SessionError::BackendError {
                status: 500,
                body: "{\"error\":\"boom\"}".to_string(),
            }
        );
    }

    #[test]
    fn decode_failures_are_network_errors() {
        let decode = serde_json::from_str::<u8>("nope").unwrap_err();
        assert!(matches!(
            SessionError::from(ApiError::Decode(decode)),
            SessionError::Network(_)
        ));
    }

    #[test]
    fn media_errors_split_into_device_and_provider() {
        assert!(matches!(
            SessionError::from(MediaError::PermissionDenied("camA".into())),
            SessionError::DeviceUnavailable(_)
        ));
        assert_eq!(
            SessionError::from(MediaError::Failed("signaling closed".into())),
            SessionError::Provider("signaling closed".into())
        );
    }
}
