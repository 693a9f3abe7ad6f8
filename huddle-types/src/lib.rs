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

//! Shared wire types for the huddle join endpoint.
//!
//! This crate defines the contract between the join function (`join-api`)
//! and its consumers (`huddle-gateway`, `huddle-client`, integration tests).
//! It is intentionally framework-agnostic: serde only.

pub mod error;
pub mod requests;
pub mod responses;
pub mod token;

pub use error::ErrorBody;
pub use requests::JoinMeetingRequest;
pub use responses::{AttendeeDescriptor, JoinMeetingResponse, MediaPlacement, MeetingDescriptor};
pub use token::AccessTokenClaims;
