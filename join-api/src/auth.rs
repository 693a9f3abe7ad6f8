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

//! Bearer token guard for the join endpoint.
//!
//! Parses the `Authorization: Bearer <jwt>` header, verifies the HMAC
//! signature, checks `exp` and the issuer.

use axum::http::{header, HeaderMap};
use huddle_types::AccessTokenClaims;
use jsonwebtoken::{DecodingKey, Validation};

use crate::error::AppError;

/// Decode and validate a bearer token, extracting its claims.
pub fn decode_access_token(secret: &str, token: &str) -> Result<AccessTokenClaims, AppError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::default();
    validation.set_required_spec_claims(&["exp", "sub"]);
    validation.set_issuer(&[AccessTokenClaims::ISSUER]);
    validation.validate_exp = true;

    jsonwebtoken::decode::<AccessTokenClaims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::unauthorized("token has expired")
            }
            _ => AppError::unauthorized(&format!("invalid token: {e}")),
        })
}

/// Enforce the guard when a secret is configured.
///
/// Returns `Ok(None)` when the guard is disabled, the caller's claims when the
/// token is valid, and a 401 otherwise.
pub fn authorize(
    secret: Option<&str>,
    headers: &HeaderMap,
) -> Result<Option<AccessTokenClaims>, AppError> {
    let Some(secret) = secret else {
        return Ok(None);
    };

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::unauthorized("bearer token is required"))?;

    decode_access_token(secret, token).map(Some)
}
