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

//! Response types for the join endpoint.
//!
//! The meeting and attendee descriptors keep the PascalCase field names of the
//! cloud meeting API that produces them. The media provider consumes them
//! verbatim, so clients must not reshape them.

use serde::{Deserialize, Serialize};

/// Response payload for a successful `POST /join`.
///
/// ```json
/// { "meeting": { "MeetingId": "...", ... }, "attendee": { "AttendeeId": "...", ... } }
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct JoinMeetingResponse {
    pub meeting: MeetingDescriptor,
    pub attendee: AttendeeDescriptor,
}

/// A provisioned meeting.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct MeetingDescriptor {
    pub meeting_id: String,

    /// The caller-facing meeting identifier the meeting was created for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_meeting_id: Option<String>,

    pub media_region: String,

    pub media_placement: MediaPlacement,
}

/// Media service endpoints assigned to a meeting.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct MediaPlacement {
    pub audio_host_url: String,
    #[serde(default)]
    pub audio_fallback_url: String,
    pub signaling_url: String,
    #[serde(default)]
    pub turn_control_url: String,
    #[serde(default)]
    pub screen_data_url: String,
    #[serde(default)]
    pub screen_viewing_url: String,
    #[serde(default)]
    pub screen_sharing_url: String,
    #[serde(default)]
    pub event_ingestion_url: String,
}

/// A provisioned attendee of a meeting.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct AttendeeDescriptor {
    /// Opaque external identity. By convention `"<display name>#<suffix>"`
    /// or just the display name.
    pub external_user_id: String,

    pub attendee_id: String,

    pub join_token: String,
}
