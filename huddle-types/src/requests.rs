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

//! Request types for the join endpoint.

use serde::{Deserialize, Serialize};

/// Request body for `POST /join`.
///
/// Every field is optional on the wire; the join function fills in
/// defaults for whatever the caller leaves out.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JoinMeetingRequest {
    /// Caller-chosen meeting identifier (e.g. `"room-1"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_id: Option<String>,

    /// Display name of the joining attendee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Media region the meeting should be hosted in (e.g. `"us-east-1"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl JoinMeetingRequest {
    pub fn new(meeting_id: &str, name: &str, region: &str) -> Self {
        Self {
            meeting_id: Some(meeting_id.to_string()),
            name: Some(name.to_string()),
            region: Some(region.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_camel_case_fields() {
        let req = JoinMeetingRequest::new("room-1", "Alice", "us-east-1");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["meetingId"], "room-1");
        assert_eq!(json["name"], "Alice");
        assert_eq!(json["region"], "us-east-1");
    }

    #[test]
    fn empty_body_deserializes_to_defaults() {
        let req: JoinMeetingRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req, JoinMeetingRequest::default());
    }
}
