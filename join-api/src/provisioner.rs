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

//! Meeting provisioning port and its in-process implementation.
//!
//! The join function makes exactly two provisioning calls per request:
//! create (or look up) a meeting for an idempotency token, then create an
//! attendee in it. [`MeetingProvisioner`] is that seam; a cloud-backed
//! implementation lives outside this crate.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use huddle_types::{AttendeeDescriptor, MediaPlacement, MeetingDescriptor};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Meeting {0} not found")]
    MeetingNotFound(String),

    #[error("Invalid media region: {0:?}")]
    InvalidRegion(String),

    #[error("Invalid external user id: {0:?}")]
    InvalidExternalUserId(String),

    #[error("Provisioning backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait MeetingProvisioner: Send + Sync {
    /// Create a meeting, or return the one already created for
    /// `client_request_token`.
    async fn create_meeting(
        &self,
        client_request_token: &str,
        media_region: &str,
        external_meeting_id: &str,
    ) -> Result<MeetingDescriptor, ProvisionError>;

    /// Add an attendee to an existing meeting.
    async fn create_attendee(
        &self,
        meeting_id: &str,
        external_user_id: &str,
    ) -> Result<AttendeeDescriptor, ProvisionError>;
}

// Matches the cloud API's limits on external user ids.
const MAX_EXTERNAL_USER_ID_LEN: usize = 64;
const MIN_EXTERNAL_USER_ID_LEN: usize = 2;

/// Meetings a [`LocalProvisioner`] remembers before evicting the oldest.
pub const DEFAULT_MEETING_CAPACITY: usize = 1024;

fn valid_region(region: &str) -> bool {
    !region.is_empty()
        && region
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && region.contains('-')
}

#[derive(Default)]
struct Registry {
    by_request_token: HashMap<String, MeetingDescriptor>,
    attendees: HashMap<String, Vec<AttendeeDescriptor>>,
    // Request tokens, oldest first.
    order: VecDeque<String>,
}

impl Registry {
    fn insert(&mut self, token: &str, meeting: MeetingDescriptor, capacity: usize) {
        self.attendees.insert(meeting.meeting_id.clone(), Vec::new());
        self.by_request_token.insert(token.to_string(), meeting);
        self.order.push_back(token.to_string());
        while self.order.len() > capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            if let Some(evicted) = self.by_request_token.remove(&oldest) {
                self.attendees.remove(&evicted.meeting_id);
                tracing::debug!("Evicted meeting {}", evicted.meeting_id);
            }
        }
    }
}

/// In-process provisioner for development and tests.
///
/// Meeting and attendee ids are random UUIDs; media placement URLs are
/// derived from a base URL. Only the most recent `capacity` meetings are
/// kept; older ones are forgotten along with their attendees.
pub struct LocalProvisioner {
    media_base_url: String,
    capacity: usize,
    registry: Mutex<Registry>,
}

impl LocalProvisioner {
    pub fn new(media_base_url: &str) -> Self {
        Self::with_capacity(media_base_url, DEFAULT_MEETING_CAPACITY)
    }

    pub fn with_capacity(media_base_url: &str, capacity: usize) -> Self {
        Self {
            media_base_url: media_base_url.trim_end_matches('/').to_string(),
            capacity: capacity.max(1),
            registry: Mutex::new(Registry::default()),
        }
    }

    fn placement_for(&self, region: &str, meeting_id: &str) -> MediaPlacement {
        let base = format!("{}/{region}", self.media_base_url);
        MediaPlacement {
            audio_host_url: format!("{base}/audio/{meeting_id}"),
            audio_fallback_url: format!("{base}/audio-fallback/{meeting_id}"),
            signaling_url: format!("{base}/control/{meeting_id}"),
            turn_control_url: format!("{base}/turn/{meeting_id}"),
            screen_data_url: format!("{base}/screen/data/{meeting_id}"),
            screen_viewing_url: format!("{base}/screen/view/{meeting_id}"),
            screen_sharing_url: format!("{base}/screen/share/{meeting_id}"),
            event_ingestion_url: format!("{base}/events/{meeting_id}"),
        }
    }

    /// Number of meetings currently remembered.
    pub fn meeting_count(&self) -> usize {
        self.registry
            .lock()
            .map(|r| r.by_request_token.len())
            .unwrap_or(0)
    }

    /// Number of attendees created in `meeting_id` so far.
    pub fn attendee_count(&self, meeting_id: &str) -> usize {
        self.registry
            .lock()
            .map(|r| r.attendees.get(meeting_id).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

#[async_trait]
impl MeetingProvisioner for LocalProvisioner {
    async fn create_meeting(
        &self,
        client_request_token: &str,
        media_region: &str,
        external_meeting_id: &str,
    ) -> Result<MeetingDescriptor, ProvisionError> {
        if !valid_region(media_region) {
            return Err(ProvisionError::InvalidRegion(media_region.to_string()));
        }

        let mut registry = self
            .registry
            .lock()
            .map_err(|_| ProvisionError::Backend("registry lock poisoned".to_string()))?;

        if let Some(existing) = registry.by_request_token.get(client_request_token) {
            return Ok(existing.clone());
        }

        let meeting_id = Uuid::new_v4().to_string();
        let meeting = MeetingDescriptor {
            media_placement: self.placement_for(media_region, &meeting_id),
            meeting_id: meeting_id.clone(),
            external_meeting_id: Some(external_meeting_id.to_string()),
            media_region: media_region.to_string(),
        };
        registry.insert(client_request_token, meeting.clone(), self.capacity);
        tracing::info!(
            "Provisioned meeting {meeting_id} in {media_region} for {external_meeting_id}"
        );
        Ok(meeting)
    }

    async fn create_attendee(
        &self,
        meeting_id: &str,
        external_user_id: &str,
    ) -> Result<AttendeeDescriptor, ProvisionError> {
        let len = external_user_id.chars().count();
        if !(MIN_EXTERNAL_USER_ID_LEN..=MAX_EXTERNAL_USER_ID_LEN).contains(&len) {
            return Err(ProvisionError::InvalidExternalUserId(
                external_user_id.to_string(),
            ));
        }

        let mut registry = self
            .registry
            .lock()
            .map_err(|_| ProvisionError::Backend("registry lock poisoned".to_string()))?;

        let attendees = registry
            .attendees
            .get_mut(meeting_id)
            .ok_or_else(|| ProvisionError::MeetingNotFound(meeting_id.to_string()))?;

        let attendee = AttendeeDescriptor {
            external_user_id: external_user_id.to_string(),
            attendee_id: Uuid::new_v4().to_string(),
            join_token: Uuid::new_v4().simple().to_string(),
        };
        attendees.push(attendee.clone());
        Ok(attendee)
    }
}
