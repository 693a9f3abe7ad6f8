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

//! Access token (JWT) claims.
//!
//! When the join endpoint runs with an authentication guard, callers present
//! an HMAC-SHA256 signed JWT carrying these claims as a bearer token. The
//! endpoint verifies the signature; the client only checks issuer and expiry
//! before attempting a join.

use serde::{Deserialize, Serialize};

/// JWT payload of a huddle access token.
///
/// # Example payload
///
/// ```json
/// {
///   "sub": "alice@example.com",
///   "name": "Alice",
///   "exp": 1707004800,
///   "iss": "huddle-auth"
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessTokenClaims {
    /// Authenticated identity.
    pub sub: String,

    /// Display name of the authenticated identity.
    #[serde(default)]
    pub name: String,

    /// Expiration timestamp (Unix seconds).
    pub exp: i64,

    /// Issuer identifier. Always [`AccessTokenClaims::ISSUER`].
    pub iss: String,
}

impl AccessTokenClaims {
    /// The expected issuer value for huddle access tokens.
    pub const ISSUER: &'static str = "huddle-auth";
}
