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

//! Cross-platform REST client for the huddle join endpoint.
//!
//! Works on WASM (browser), desktop, and mobile targets via [`reqwest`].
//!
//! # Example
//!
//! ```no_run
//! use huddle_gateway::{AuthMode, JoinApiClient};
//! use huddle_types::JoinMeetingRequest;
//!
//! # async fn example() -> Result<(), huddle_gateway::ApiError> {
//! let client = JoinApiClient::new("https://api.example.com/prod", AuthMode::Anonymous);
//! let joined = client
//!     .create_session(&JoinMeetingRequest::new("room-1", "Alice", "us-east-1"), None)
//!     .await?;
//! println!("Joined meeting {}", joined.meeting.meeting_id);
//! # Ok(())
//! # }
//! ```

pub mod error;

pub use error::ApiError;
pub use huddle_types;

use huddle_types::{JoinMeetingRequest, JoinMeetingResponse};
use log::{debug, warn};
use reqwest::Client;

/// How the client authenticates with the join endpoint.
#[derive(Debug, Clone)]
pub enum AuthMode {
    /// No credentials; the endpoint runs without an authentication guard.
    Anonymous,
    /// Attach `Authorization: Bearer <token>` to every request.
    Bearer(String),
}

/// A typed REST client for the join endpoint.
#[derive(Debug, Clone)]
pub struct JoinApiClient {
    base_url: String,
    auth: AuthMode,
    http: Client,
}

impl JoinApiClient {
    /// Create a new client pointing at the given base URL.
    ///
    /// * `base_url` - e.g. `"https://abc.execute-api.example.com/prod"`
    /// * `auth` - how to authenticate requests
    pub fn new(base_url: &str, auth: AuthMode) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            http: Client::new(),
        }
    }

    /// Update the bearer token (e.g. after a token refresh).
    pub fn set_bearer_token(&mut self, token: String) {
        self.auth = AuthMode::Bearer(token);
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Obtain session credentials for a meeting.
    ///
    /// Calls `POST /join` with `{meetingId, name, region}`. `bearer` overrides
    /// the client's [`AuthMode`] for this one request.
    pub async fn create_session(
        &self,
        request: &JoinMeetingRequest,
        bearer: Option<&str>,
    ) -> Result<JoinMeetingResponse, ApiError> {
        debug!(
            "POST {}/join for meeting {:?}",
            self.base_url, request.meeting_id
        );
        let builder = self.http.post(self.url("/join")).json(request);
        let response = self.apply_auth(builder, bearer).send().await?;
        parse_join_response(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(
        &self,
        builder: reqwest::RequestBuilder,
        bearer: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let token = match (bearer, &self.auth) {
            (Some(token), _) => Some(token),
            (None, AuthMode::Bearer(token)) => Some(token.as_str()),
            (None, AuthMode::Anonymous) => None,
        };
        match token {
            Some(token) => {
                builder.header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"))
            }
            None => builder,
        }
    }
}

/// Map a join response to the typed body or an [`ApiError`].
pub(crate) async fn parse_join_response(
    response: reqwest::Response,
) -> Result<JoinMeetingResponse, ApiError> {
    let status = response.status().as_u16();
    match status {
        200..=299 => {
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        }
        401 => {
            warn!("join rejected: not authenticated");
            Err(ApiError::NotAuthenticated)
        }
        _ => {
            let text = response.text().await.unwrap_or_default();
            warn!("join failed with status {status}: {text}");
            Err(ApiError::ServerError { status, body: text })
        }
    }
}
