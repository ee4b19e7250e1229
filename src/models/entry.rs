//! Scheduled class entries and instructor identity.
//!
//! An entry is a class placed on the weekly grid. Entries are never
//! partially mutated after creation: an edit replaces the whole entry.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::time::{occupied_buckets, ClassDuration, ClockTime, Weekday};

/// Instructor identity (first/last name pair).
///
/// Two instructors are the same person when their normalized full names
/// match (case and whitespace insensitive), see [`Instructor::key`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    /// Given name.
    pub first_name: String,
    /// Family name (may be empty).
    pub last_name: String,
}

impl Instructor {
    /// Creates an instructor from first and last name.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Splits a full name: first token is the first name, the rest the last name.
    pub fn from_full_name(full_name: &str) -> Self {
        let mut parts = full_name.split_whitespace();
        let first = parts.next().unwrap_or_default().to_string();
        let last = parts.collect::<Vec<_>>().join(" ");
        Self::new(first, last)
    }

    /// Display name (`"First Last"`).
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Normalized identity key.
    pub fn key(&self) -> String {
        normalize_name(&self.full_name())
    }

    /// Whether two instructors are the same person.
    pub fn same_as(&self, other: &Instructor) -> bool {
        self.key() == other.key()
    }
}

impl PartialEq for Instructor {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for Instructor {}

impl fmt::Display for Instructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Lowercases and collapses whitespace.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Boolean markers carried by an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryFlags {
    /// Historically strong combination.
    pub top_performer: bool,
    /// Frozen by the user; assembly never places into a locked slot.
    pub locked: bool,
    /// Private session.
    pub private: bool,
    /// Hosted (client-booked) class.
    pub hosted: bool,
}

/// A class placed on the weekly schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledClassEntry {
    /// Unique identifier.
    pub id: String,
    /// Day of week.
    pub day: Weekday,
    /// Start time.
    pub time: ClockTime,
    /// Location name.
    pub location: String,
    /// Class format label.
    pub class_format: String,
    /// Assigned instructor.
    pub instructor: Instructor,
    /// Class length.
    pub duration: ClassDuration,
    /// Expected check-ins (from history).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_participants: Option<u32>,
    /// Expected revenue (from history).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_revenue: Option<f64>,
    /// Markers.
    #[serde(default)]
    pub flags: EntryFlags,
    /// Substitute instructor name, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_instructor: Option<String>,
    /// Client details for hosted classes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_details: Option<String>,
}

impl ScheduledClassEntry {
    /// Creates an entry; the duration is derived from the class format.
    pub fn new(
        id: impl Into<String>,
        day: Weekday,
        time: ClockTime,
        location: impl Into<String>,
        class_format: impl Into<String>,
        instructor: Instructor,
    ) -> Self {
        let class_format = class_format.into();
        Self {
            id: id.into(),
            day,
            time,
            location: location.into(),
            duration: ClassDuration::for_format(&class_format),
            class_format,
            instructor,
            expected_participants: None,
            expected_revenue: None,
            flags: EntryFlags::default(),
            cover_instructor: None,
            client_details: None,
        }
    }

    /// Overrides the format-derived duration.
    pub fn with_duration(mut self, duration: ClassDuration) -> Self {
        self.duration = duration;
        self
    }

    /// Sets expected participants and revenue.
    pub fn with_expectations(mut self, participants: u32, revenue: f64) -> Self {
        self.expected_participants = Some(participants);
        self.expected_revenue = Some(revenue);
        self
    }

    /// Marks the entry as a top performer.
    pub fn top_performer(mut self) -> Self {
        self.flags.top_performer = true;
        self
    }

    /// Marks the entry as locked.
    pub fn locked(mut self) -> Self {
        self.flags.locked = true;
        self
    }

    /// Marks the entry as private.
    pub fn private(mut self) -> Self {
        self.flags.private = true;
        self
    }

    /// Marks the entry as hosted for a client.
    pub fn hosted(mut self, client_details: impl Into<String>) -> Self {
        self.flags.hosted = true;
        self.client_details = Some(client_details.into());
        self
    }

    /// Sets a cover instructor.
    pub fn with_cover(mut self, name: impl Into<String>) -> Self {
        self.cover_instructor = Some(name.into());
        self
    }

    /// Length in hours.
    #[inline]
    pub fn hours(&self) -> f64 {
        self.duration.hours()
    }

    /// End time (exclusive).
    pub fn end_time(&self) -> ClockTime {
        self.time.plus_minutes(self.duration.minutes())
    }

    /// Occupied 15-minute buckets.
    pub fn buckets(&self) -> Vec<ClockTime> {
        occupied_buckets(self.time, self.hours())
    }

    /// Whether the entry occupies `bucket`.
    pub fn occupies(&self, bucket: ClockTime) -> bool {
        bucket >= self.time && bucket < self.end_time()
    }

    /// Whether the entry is taught by `instructor`.
    pub fn is_taught_by(&self, instructor: &Instructor) -> bool {
        self.instructor.same_as(instructor)
    }
}
