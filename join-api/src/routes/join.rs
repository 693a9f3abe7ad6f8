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

//! Handler for `POST /join`.

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use chrono::Utc;
use huddle_types::{JoinMeetingRequest, JoinMeetingResponse};

use crate::auth::authorize;
use crate::error::AppError;
use crate::state::AppState;

const DEFAULT_ATTENDEE_NAME: &str = "Guest";

/// Request fields after defaults have been applied.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ResolvedJoin {
    pub meeting_id: String,
    pub name: String,
    pub region: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn resolve(request: JoinMeetingRequest, default_region: &str, now_ms: i64) -> ResolvedJoin {
    ResolvedJoin {
        meeting_id: non_empty(request.meeting_id).unwrap_or_else(|| format!("demo-{now_ms}")),
        name: non_empty(request.name).unwrap_or_else(|| DEFAULT_ATTENDEE_NAME.to_string()),
        region: non_empty(request.region).unwrap_or_else(|| default_region.to_string()),
    }
}

/// POST /join
///
/// Body `{meetingId?, name?, region?}`; an empty body is accepted.
pub async fn join_meeting(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<JoinMeetingResponse>, AppError> {
    let caller = authorize(state.jwt_secret.as_deref(), &headers)?;

    let request: JoinMeetingRequest = if body.iter().all(u8::is_ascii_whitespace) {
        JoinMeetingRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::bad_request(&format!("invalid request body: {e}")))?
    };

    let now_ms = Utc::now().timestamp_millis();
    let join = resolve(request, &state.default_region, now_ms);
    let request_token = format!("{}-{now_ms}", join.meeting_id);

    tracing::info!(
        "Join request for meeting {} by {} in {} (caller: {:?})",
        join.meeting_id,
        join.name,
        join.region,
        caller.as_ref().map(|c| c.sub.as_str())
    );

    let meeting = state
        .provisioner
        .create_meeting(&request_token, &join.region, &join.meeting_id)
        .await?;
    let attendee = state
        .provisioner
        .create_attendee(&meeting.meeting_id, &join.name)
        .await?;

    Ok(Json(JoinMeetingResponse { meeting, attendee }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let join = resolve(JoinMeetingRequest::default(), "us-east-1", 1234);
        assert_eq!(
            join,
            ResolvedJoin {
                meeting_id: "demo-1234".to_string(),
                name: "Guest".to_string(),
                region: "us-east-1".to_string(),
            }
        );
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let request = JoinMeetingRequest {
            meeting_id: Some("  ".to_string()),
            name: Some(String::new()),
            region: None,
        };
        let join = resolve(request, "ap-southeast-2", 7);
        assert_eq!(join.meeting_id, "demo-7");
        assert_eq!(join.name, "Guest");
        assert_eq!(join.region, "ap-southeast-2");
    }

    #[test]
    fn provided_fields_are_kept() {
        let join = resolve(
            JoinMeetingRequest::new("room-1", "Alice", "eu-west-1"),
            "us-east-1",
            0,
        );
        assert_eq!(join.meeting_id, "room-1");
        assert_eq!(join.name, "Alice");
        assert_eq!(join.region, "eu-west-1");
    }
}
