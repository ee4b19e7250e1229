//! Running instructor state and the evaluation context passed to rules.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::config::PolicyConfig;
use crate::models::{Instructor, ScheduledClassEntry, Shift, Weekday};

/// Shift classification of one instructor-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftPattern {
    /// No morning or evening class yet.
    #[default]
    None,
    /// Only morning classes.
    Morning,
    /// Only evening classes.
    Evening,
    /// Both morning and evening classes.
    Mixed,
}

impl ShiftPattern {
    /// Pattern after adding a class in `shift`. Afternoon classes leave it unchanged.
    pub fn with(self, shift: Shift) -> Self {
        match (self, shift) {
            (p, Shift::Afternoon) => p,
            (ShiftPattern::None, Shift::Morning) => ShiftPattern::Morning,
            (ShiftPattern::None, Shift::Evening) => ShiftPattern::Evening,
            (ShiftPattern::Morning, Shift::Morning) => ShiftPattern::Morning,
            (ShiftPattern::Evening, Shift::Evening) => ShiftPattern::Evening,
            _ => ShiftPattern::Mixed,
        }
    }
}

/// One instructor's load on one day.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DayLoad {
    /// Hours taught.
    pub hours: f64,
    /// Classes taught.
    pub classes: usize,
    /// Location of the first class that day.
    pub location: Option<String>,
    /// Shift classification.
    pub shift: ShiftPattern,
}

/// One instructor's weekly load.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstructorLoad {
    /// Hours taught this week.
    pub weekly_hours: f64,
    /// Per-day loads.
    pub days: BTreeMap<Weekday, DayLoad>,
}

impl InstructorLoad {
    fn record(&mut self, entry: &ScheduledClassEntry) {
        self.weekly_hours += entry.hours();
        let day = self.days.entry(entry.day).or_default();
        day.hours += entry.hours();
        day.classes += 1;
        if day.location.is_none() {
            day.location = Some(entry.location.clone());
        }
        day.shift = day.shift.with(Shift::of(entry.time));
    }
}

/// Per-instructor running totals for one assembly or validation pass.
///
/// Always derived from a set of entries, never edited independently, so it
/// cannot drift from the schedule it describes.
#[derive(Debug, Clone, Default)]
pub struct RunningState {
    loads: HashMap<String, InstructorLoad>,
}

impl RunningState {
    /// Empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// State for every instructor in `entries`.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a ScheduledClassEntry>) -> Self {
        let mut state = Self::new();
        for entry in entries {
            state.record(entry);
        }
        state
    }

    /// State for a single instructor.
    pub fn for_instructor<'a>(
        entries: impl IntoIterator<Item = &'a ScheduledClassEntry>,
        instructor: &Instructor,
    ) -> Self {
        Self::from_entries(
            entries
                .into_iter()
                .filter(|e| e.is_taught_by(instructor)),
        )
    }

    /// Adds a placed entry to the totals.
    pub fn record(&mut self, entry: &ScheduledClassEntry) {
        self.loads
            .entry(entry.instructor.key())
            .or_default()
            .record(entry);
    }

    /// Load for an instructor, if any class is recorded.
    pub fn load(&self, instructor: &Instructor) -> Option<&InstructorLoad> {
        self.loads.get(&instructor.key())
    }

    /// Weekly hours (0 when unrecorded).
    pub fn weekly_hours(&self, instructor: &Instructor) -> f64 {
        self.load(instructor).map_or(0.0, |l| l.weekly_hours)
    }

    /// Load on one day, if any.
    pub fn day(&self, instructor: &Instructor, day: Weekday) -> Option<&DayLoad> {
        self.load(instructor).and_then(|l| l.days.get(&day))
    }

    /// Hours on one day.
    pub fn daily_hours(&self, instructor: &Instructor, day: Weekday) -> f64 {
        self.day(instructor, day).map_or(0.0, |d| d.hours)
    }

    /// Classes on one day.
    pub fn daily_classes(&self, instructor: &Instructor, day: Weekday) -> usize {
        self.day(instructor, day).map_or(0, |d| d.classes)
    }

    /// Shift pattern on one day.
    pub fn shift_pattern(&self, instructor: &Instructor, day: Weekday) -> ShiftPattern {
        self.day(instructor, day).map_or(ShiftPattern::None, |d| d.shift)
    }

    /// Number of instructors recorded.
    pub fn instructor_count(&self) -> usize {
        self.loads.len()
    }
}

/// Everything a rule can see while judging a candidate.
#[derive(Debug, Clone, Copy)]
pub struct PolicyContext<'a> {
    /// Business policy.
    pub config: &'a PolicyConfig,
    /// Entries placed so far (may include an entry the candidate replaces).
    pub entries: &'a [ScheduledClassEntry],
    /// Running totals matching `entries`, excluding any replaced entry.
    pub state: &'a RunningState,
}

impl<'a> PolicyContext<'a> {
    /// Creates a context.
    pub fn new(
        config: &'a PolicyConfig,
        entries: &'a [ScheduledClassEntry],
        state: &'a RunningState,
    ) -> Self {
        Self {
            config,
            entries,
            state,
        }
    }

    /// Entries other than the one `candidate` replaces.
    pub fn others(
        &self,
        candidate: &'a ScheduledClassEntry,
    ) -> impl Iterator<Item = &'a ScheduledClassEntry> + 'a {
        let id = candidate.id.as_str();
        self.entries.iter().filter(move |e| e.id != id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClockTime;

    fn class(id: &str, day: Weekday, h: u16, teacher: &str) -> ScheduledClassEntry {
        ScheduledClassEntry::new(
            id,
            day,
            ClockTime::from_hm(h, 0),
            "Kenkere House",
            "Studio Mat 57",
            Instructor::from_full_name(teacher),
        )
    }

    #[test]
    fn test_shift_pattern_transitions() {
        let p = ShiftPattern::None.with(Shift::Afternoon);
        assert_eq!(p, ShiftPattern::None);
        let p = p.with(Shift::Morning);
        assert_eq!(p, ShiftPattern::Morning);
        assert_eq!(p.with(Shift::Morning), ShiftPattern::Morning);
        assert_eq!(p.with(Shift::Evening), ShiftPattern::Mixed);
        assert_eq!(ShiftPattern::Mixed.with(Shift::Morning), ShiftPattern::Mixed);
    }

    #[test]
    fn test_running_state_from_entries() {
        let entries = vec![
            class("a", Weekday::Monday, 8, "Rohan Mehta"),
            class("b", Weekday::Monday, 18, "Rohan Mehta"),
            class("c", Weekday::Tuesday, 9, "Rohan Mehta"),
            class("d", Weekday::Monday, 9, "Reshma Nair"),
        ];
        let state = RunningState::from_entries(&entries);
        let rohan = Instructor::new("rohan", "mehta");
        assert_eq!(state.instructor_count(), 2);
        assert!((state.weekly_hours(&rohan) - 3.0).abs() < 1e-10);
        assert_eq!(state.daily_classes(&rohan, Weekday::Monday), 2);
        assert!((state.daily_hours(&rohan, Weekday::Tuesday) - 1.0).abs() < 1e-10);
        assert_eq!(state.shift_pattern(&rohan, Weekday::Monday), ShiftPattern::Mixed);
        assert_eq!(state.shift_pattern(&rohan, Weekday::Tuesday), ShiftPattern::Morning);
        assert_eq!(
            state.day(&rohan, Weekday::Monday).unwrap().location.as_deref(),
            Some("Kenkere House")
        );
        assert_eq!(state.daily_classes(&rohan, Weekday::Sunday), 0);
    }

    #[test]
    fn test_running_state_for_instructor() {
        let entries = vec![
            class("a", Weekday::Monday, 8, "Rohan Mehta"),
            class("d", Weekday::Monday, 9, "Reshma Nair"),
        ];
        let state = RunningState::for_instructor(&entries, &Instructor::new("Reshma", "Nair"));
        assert_eq!(state.instructor_count(), 1);
        assert_eq!(state.weekly_hours(&Instructor::new("Rohan", "Mehta")), 0.0);
    }

    #[test]
    fn test_context_others_skips_replaced() {
        let config = PolicyConfig::default();
        let entries = vec![
            class("a", Weekday::Monday, 8, "Rohan Mehta"),
            class("b", Weekday::Monday, 9, "Rohan Mehta"),
        ];
        let state = RunningState::new();
        let ctx = PolicyContext::new(&config, &entries, &state);
        let edited = class("a", Weekday::Monday, 10, "Rohan Mehta");
        let ids: Vec<&str> = ctx.others(&edited).map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["b"]);
    }
}
