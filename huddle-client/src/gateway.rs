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

//! Backend gateway port and its REST implementation.

use async_trait::async_trait;
use huddle_gateway::JoinApiClient;
use huddle_types::{JoinMeetingRequest, JoinMeetingResponse};

use crate::error::SessionError;

/// A bearer credential accepted by the authentication gate.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub subject: String,
    token: String,
}

impl Credential {
    pub fn new(subject: &str, token: &str) -> Self {
        Self {
            subject: subject.to_string(),
            token: token.to_string(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("subject", &self.subject)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Obtain session credentials. HTTP 401 must surface as
    /// [`SessionError::Unauthenticated`], other failures as
    /// [`SessionError::BackendError`].
    async fn create_session(
        &self,
        request: &JoinMeetingRequest,
        credential: Option<&Credential>,
    ) -> Result<JoinMeetingResponse, SessionError>;
}

#[async_trait]
impl BackendGateway for JoinApiClient {
    async fn create_session(
        &self,
        request: &JoinMeetingRequest,
        credential: Option<&Credential>,
    ) -> Result<JoinMeetingResponse, SessionError> {
        JoinApiClient::create_session(self, request, credential.map(Credential::token))
            .await
            .map_err(SessionError::from)
    }
}
