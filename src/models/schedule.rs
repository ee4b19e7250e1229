//! Weekly schedule model.
//!
//! A schedule is the ordered list of placed class entries, plus any
//! constraint violations detected by an audit. Edits replace whole
//! entries; nothing mutates an entry in place.

use serde::{Deserialize, Serialize};

use super::entry::{Instructor, ScheduledClassEntry};
use super::time::{ClockTime, Weekday};

/// A weekly class schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// Placed classes, in placement order.
    pub entries: Vec<ScheduledClassEntry>,
    /// Constraint violations detected in this schedule.
    #[serde(default)]
    pub violations: Vec<Violation>,
}

/// A constraint violation found by an audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Offending entry ID.
    pub entry_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of constraint violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// More parallel classes than studios at a location.
    CapacityExceeded,
    /// Instructor booked into overlapping classes or two locations on one day.
    InstructorConflict,
    /// Instructor over the daily class count or hours.
    DailyLimit,
    /// Instructor with too many back-to-back classes.
    ConsecutiveLimit,
    /// Instructor over the weekly hour cap (overridable).
    WeeklyCap,
    /// Inactive instructor scheduled.
    InactiveInstructor,
    /// Start time inside the blocked midday band.
    RestrictedTime,
    /// Format not allowed at the location.
    FormatNotAllowed,
    /// Sunday class limit exceeded at a location.
    SundayLimit,
    /// Recovery class early in the week.
    EarlyWeekRecovery,
    /// Domain-specific violation.
    Custom(String),
}

impl Violation {
    /// Creates a violation.
    pub fn new(
        violation_type: ViolationType,
        entry_id: impl Into<String>,
        message: impl Into<String>,
        severity: i32,
    ) -> Self {
        Self {
            violation_type,
            entry_id: entry_id.into(),
            message: message.into(),
            severity,
        }
    }

    /// Creates a capacity exceeded violation.
    pub fn capacity_exceeded(entry_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ViolationType::CapacityExceeded, entry_id, message, 90)
    }

    /// Creates a weekly cap violation. Lower severity: a human may override it.
    pub fn weekly_cap(entry_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ViolationType::WeeklyCap, entry_id, message, 50)
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a schedule from existing entries.
    pub fn from_entries(entries: Vec<ScheduledClassEntry>) -> Self {
        Self {
            entries,
            violations: Vec::new(),
        }
    }

    /// Appends an entry without validation.
    pub fn add_entry(&mut self, entry: ScheduledClassEntry) {
        self.entries.push(entry);
    }

    /// Replaces the entry with the same ID. Returns the previous entry.
    pub fn replace(&mut self, entry: ScheduledClassEntry) -> Option<ScheduledClassEntry> {
        let slot = self.entries.iter_mut().find(|e| e.id == entry.id)?;
        Some(std::mem::replace(slot, entry))
    }

    /// Removes an entry by ID.
    pub fn remove(&mut self, id: &str) -> Option<ScheduledClassEntry> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(idx))
    }

    /// Removes every entry and violation.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.violations.clear();
    }

    /// Adds a violation.
    pub fn add_violation(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Whether the schedule has no violations.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Finds an entry by ID.
    pub fn entry(&self, id: &str) -> Option<&ScheduledClassEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries taught by an instructor.
    pub fn entries_for_instructor(&self, instructor: &Instructor) -> Vec<&ScheduledClassEntry> {
        self.entries
            .iter()
            .filter(|e| e.is_taught_by(instructor))
            .collect()
    }

    /// Entries at a location on a day.
    pub fn entries_at(&self, location: &str, day: Weekday) -> Vec<&ScheduledClassEntry> {
        self.entries
            .iter()
            .filter(|e| e.location == location && e.day == day)
            .collect()
    }

    /// Entries starting exactly at a (location, day, time) slot.
    pub fn entries_in_slot(
        &self,
        location: &str,
        day: Weekday,
        time: ClockTime,
    ) -> Vec<&ScheduledClassEntry> {
        self.entries
            .iter()
            .filter(|e| e.location == location && e.day == day && e.time == time)
            .collect()
    }

    /// Total scheduled hours.
    pub fn total_hours(&self) -> f64 {
        self.entries.iter().map(|e| e.hours()).sum()
    }

    /// Number of entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, day: Weekday, h: u16, location: &str, teacher: &str) -> ScheduledClassEntry {
        ScheduledClassEntry::new(
            id,
            day,
            ClockTime::from_hm(h, 0),
            location,
            "Studio Mat 57",
            Instructor::from_full_name(teacher),
        )
    }

    fn sample_schedule() -> Schedule {
        let mut s = Schedule::new();
        s.add_entry(entry("a", Weekday::Monday, 8, "Kenkere House", "Anisha Shah"));
        s.add_entry(entry("b", Weekday::Monday, 9, "Kenkere House", "Rohan Mehta"));
        s.add_entry(entry("c", Weekday::Tuesday, 8, "Kenkere House", "Anisha Shah"));
        s
    }

    #[test]
    fn test_schedule_queries() {
        let s = sample_schedule();
        assert_eq!(s.entry_count(), 3);
        assert!((s.total_hours() - 3.0).abs() < 1e-10);
        assert_eq!(s.entries_at("Kenkere House", Weekday::Monday).len(), 2);
        assert_eq!(
            s.entries_for_instructor(&Instructor::new("anisha", "shah")).len(),
            2
        );
        assert_eq!(
            s.entries_in_slot("Kenkere House", Weekday::Monday, ClockTime::from_hm(9, 0))
                .len(),
            1
        );
        assert!(s.entry("zzz").is_none());
    }

    #[test]
    fn test_replace_whole_entry() {
        let mut s = sample_schedule();
        let edited = entry("b", Weekday::Monday, 18, "Kenkere House", "Reshma Nair");
        let previous = s.replace(edited).unwrap();
        assert_eq!(previous.instructor.first_name, "Rohan");
        assert_eq!(s.entry("b").unwrap().time, ClockTime::from_hm(18, 0));
        assert_eq!(s.entry_count(), 3);

        assert!(s.replace(entry("missing", Weekday::Friday, 8, "X", "Y Z")).is_none());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut s = sample_schedule();
        assert!(s.remove("a").is_some());
        assert!(s.remove("a").is_none());
        assert_eq!(s.entry_count(), 2);

        s.add_violation(Violation::capacity_exceeded("b", "full"));
        assert!(!s.is_valid());
        s.clear();
        assert_eq!(s.entry_count(), 0);
        assert!(s.is_valid());
    }

    #[test]
    fn test_violation_factories() {
        let v = Violation::capacity_exceeded("a", "3/2 studios");
        assert_eq!(v.violation_type, ViolationType::CapacityExceeded);
        assert_eq!(v.severity, 90);
        let v = Violation::weekly_cap("a", "16h");
        assert_eq!(v.violation_type, ViolationType::WeeklyCap);
        assert!(v.severity < 90);
    }
}
