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

//! Client-side authentication gate.
//!
//! When configured, [`SessionController::join`](crate::SessionController::join)
//! refuses to contact the backend unless the gate yields a credential. The
//! join endpoint verifies the signature; the gate only screens out tokens that
//! are certain to be rejected.

use async_trait::async_trait;
use chrono::Utc;
use huddle_types::AccessTokenClaims;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use log::warn;

use crate::error::SessionError;
use crate::gateway::Credential;

#[async_trait]
pub trait AuthGate: Send + Sync {
    async fn credential(&self) -> Result<Credential, SessionError>;
}

/// Accepts a bearer JWT whose issuer matches and whose `exp` is in the future.
#[derive(Clone)]
pub struct JwtExpiryGate {
    token: Option<String>,
}

impl JwtExpiryGate {
    pub fn new(token: &str) -> Self {
        Self {
            token: Some(token.to_string()).filter(|t| !t.trim().is_empty()),
        }
    }

    /// A gate with no token; every join is refused until one is set.
    pub fn signed_out() -> Self {
        Self { token: None }
    }

    pub fn set_token(&mut self, token: &str) {
        *self = Self::new(token);
    }

    fn inspect(token: &str) -> Result<AccessTokenClaims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.set_issuer(&[AccessTokenClaims::ISSUER]);
        validation.leeway = 0;

        let claims = jsonwebtoken::decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(&[]),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            warn!("access token rejected: {e}");
            SessionError::Unauthenticated
        })?;

        if claims.exp <= Utc::now().timestamp() {
            warn!("access token for {} has expired", claims.sub);
            return Err(SessionError::Unauthenticated);
        }
        Ok(claims)
    }
}

#[async_trait]
impl AuthGate for JwtExpiryGate {
    async fn credential(&self) -> Result<Credential, SessionError> {
        let token = self.token.as_deref().ok_or(SessionError::Unauthenticated)?;
        let claims = Self::inspect(token)?;
        Ok(Credential::new(&claims.sub, token))
    }
}
