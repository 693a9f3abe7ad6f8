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

//! Participant roster.

use std::collections::HashMap;

const IDENTITY_SEPARATOR: char = '#';

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RosterEntry {
    pub attendee_id: String,
    pub display_name: String,
    pub muted: bool,
    pub is_content: bool,
}

/// Display name carried by an external user id (`"Alice#42"` -> `"Alice"`).
pub fn display_name(external_user_id: &str) -> &str {
    external_user_id
        .split(IDENTITY_SEPARATOR)
        .next()
        .unwrap_or(external_user_id)
}

/// Attendee that owns a content attendee id (`"a-1#content"` -> `"a-1"`).
pub fn content_owner(attendee_id: &str) -> &str {
    display_name(attendee_id)
}

#[derive(Debug, Default)]
pub(crate) struct Roster {
    entries: HashMap<String, RosterEntry>,
}

impl Roster {
    pub fn join(&mut self, attendee_id: &str, external_user_id: &str) {
        self.entries.insert(
            attendee_id.to_string(),
            RosterEntry {
                attendee_id: attendee_id.to_string(),
                display_name: display_name(external_user_id).to_string(),
                muted: false,
                is_content: false,
            },
        );
    }

    pub fn leave(&mut self, attendee_id: &str) -> bool {
        self.entries.remove(attendee_id).is_some()
    }

    /// Returns true when the entry exists and its flag changed.
    pub fn set_muted(&mut self, attendee_id: &str, muted: bool) -> bool {
        match self.entries.get_mut(attendee_id) {
            Some(entry) if entry.muted != muted => {
                entry.muted = muted;
                true
            }
            _ => false,
        }
    }

    pub fn set_content(&mut self, attendee_id: &str, is_content: bool) -> bool {
        match self.entries.get_mut(attendee_id) {
            Some(entry) if entry.is_content != is_content => {
                entry.is_content = is_content;
                true
            }
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries ordered by display name, then attendee id.
    pub fn entries(&self) -> Vec<RosterEntry> {
        let mut entries: Vec<_> = self.entries.values().cloned().collect();
        entries.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.attendee_id.cmp(&b.attendee_id))
        });
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_is_prefix_before_separator() {
        assert_eq!(display_name("Alice#1f2e"), "Alice");
        assert_eq!(display_name("Bob"), "Bob");
        assert_eq!(display_name("#anon"), "");
        assert_eq!(content_owner("a-1#content"), "a-1");
    }

    #[test]
    fn leave_removes_only_that_attendee() {
        let mut roster = Roster::default();
        roster.join("a-1", "Alice#1");
        roster.join("b-2", "Bob#2");
        assert!(roster.leave("a-1"));
        assert!(!roster.leave("a-1"));
        let names: Vec<_> = roster.entries().into_iter().map(|e| e.display_name).collect();
        assert_eq!(names, vec!["Bob"]);
    }

    #[test]
    fn flags_for_unknown_attendees_are_ignored() {
        let mut roster = Roster::default();
        assert!(!roster.set_muted("ghost", true));
        assert!(!roster.set_content("ghost", true));
        assert!(roster.is_empty());
    }

    #[test]
    fn unchanged_flag_reports_no_change() {
        let mut roster = Roster::default();
        roster.join("a-1", "Alice");
        assert!(!roster.set_muted("a-1", false));
        assert!(roster.set_muted("a-1", true));
        assert!(!roster.set_muted("a-1", true));
    }
}
