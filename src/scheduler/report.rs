//! Schedule aggregation and reporting.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Teacher hours | Sum of entry durations per active instructor (one decimal) |
//! | Format counts | Entries per class format, optionally per day |
//! | Near cap | Instructors within the warning margin of their weekly cap |
//! | Below target | Priority-tier instructors under the hour target |
//! | Location load | Entries per location |

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::config::PolicyConfig;
use crate::models::{
    normalize_name, HistoricClassRecord, Instructor, InstructorTier, Roster, ScheduledClassEntry,
    Weekday,
};
use crate::scoring::{observations, round1};

/// Minimum average checked-in count for a format to count as a specialty.
pub const SPECIALTY_THRESHOLD: f64 = 5.0;

/// Maximum number of specialties returned.
pub const MAX_SPECIALTIES: usize = 5;

/// Weekly hours per active instructor, keyed by display name.
///
/// Name variants of the same instructor are merged under the first
/// spelling seen.
pub fn teacher_hours(entries: &[ScheduledClassEntry], roster: &Roster) -> BTreeMap<String, f64> {
    let mut by_key: HashMap<String, (String, f64)> = HashMap::new();
    for entry in entries {
        let name = entry.instructor.full_name();
        if roster.is_inactive(&name) {
            continue;
        }
        by_key
            .entry(entry.instructor.key())
            .or_insert_with(|| (name, 0.0))
            .1 += entry.hours();
    }
    by_key
        .into_values()
        .map(|(name, hours)| (name, round1(hours)))
        .collect()
}

/// Entries per class format.
pub fn class_format_counts(entries: &[ScheduledClassEntry]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.class_format.clone()).or_insert(0) += 1;
    }
    counts
}

/// Entries per class format on one day.
pub fn format_counts_for_day(
    entries: &[ScheduledClassEntry],
    day: Weekday,
) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for entry in entries.iter().filter(|e| e.day == day) {
        *counts.entry(entry.class_format.clone()).or_insert(0) += 1;
    }
    counts
}

/// Formats an instructor draws well in, best first.
///
/// Averages are taken over all of the instructor's historic rows per
/// format; formats below [`SPECIALTY_THRESHOLD`] are dropped and at most
/// [`MAX_SPECIALTIES`] are returned. Inactive instructors have none.
pub fn teacher_specialties(
    records: &[HistoricClassRecord],
    roster: &Roster,
    instructor: &Instructor,
) -> Vec<String> {
    if roster.tier_of(instructor) == InstructorTier::Inactive {
        return Vec::new();
    }

    // format -> (checked-in sum, count), first-seen order kept for ties
    let mut stats: Vec<(String, f64, usize)> = Vec::new();
    for obs in observations(records, roster).filter(|o| o.instructor.same_as(instructor)) {
        let format = obs.record.class_format.trim();
        match stats.iter_mut().find(|(f, _, _)| f.as_str() == format) {
            Some((_, sum, count)) => {
                *sum += obs.record.checked_in;
                *count += 1;
            }
            None => stats.push((format.to_string(), obs.record.checked_in, 1)),
        }
    }

    let mut averages: Vec<(String, f64)> = stats
        .into_iter()
        .map(|(format, sum, count)| (format, sum / count as f64))
        .filter(|(_, avg)| *avg >= SPECIALTY_THRESHOLD)
        .collect();
    averages.sort_by(|a, b| b.1.total_cmp(&a.1));
    averages
        .into_iter()
        .take(MAX_SPECIALTIES)
        .map(|(format, _)| format)
        .collect()
}

/// A priority instructor's shortfall against the hour target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoursShortfall {
    /// Instructor display name (roster key when not scheduled at all).
    pub instructor: String,
    /// Scheduled hours.
    pub hours: f64,
    /// Target hours.
    pub target: f64,
}

/// Summary of a weekly schedule.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleReport {
    /// Number of entries.
    pub total_classes: usize,
    /// Sum of entry durations.
    pub total_hours: f64,
    /// Hours per active instructor.
    pub teacher_hours: BTreeMap<String, f64>,
    /// Instructors within the warning margin of (or above) their cap.
    pub near_cap: Vec<String>,
    /// Priority instructors below the hour target.
    pub below_target: Vec<HoursShortfall>,
    /// Entries per location.
    pub location_counts: BTreeMap<String, usize>,
    /// Entries per class format.
    pub format_counts: BTreeMap<String, usize>,
}

impl ScheduleReport {
    /// Builds the report for `entries` under `config`.
    pub fn calculate(entries: &[ScheduledClassEntry], config: &PolicyConfig) -> Self {
        let roster = &config.roster;
        let hours = teacher_hours(entries, roster);

        let near_cap = hours
            .iter()
            .filter(|(name, h)| {
                let cap = config.weekly_cap(&Instructor::from_full_name(name));
                **h > cap - config.cap_warning_margin
            })
            .map(|(name, _)| name.clone())
            .collect();

        let target = config.priority_target_hours;
        let mut below_target: Vec<HoursShortfall> = hours
            .iter()
            .filter(|(name, h)| {
                roster.tier(name) == InstructorTier::Priority && **h < target
            })
            .map(|(name, h)| HoursShortfall {
                instructor: name.clone(),
                hours: *h,
                target,
            })
            .collect();
        // priority instructors with nothing scheduled
        for key in roster.names_with_tier(InstructorTier::Priority) {
            let scheduled = hours.keys().any(|name| {
                let name = normalize_name(name);
                name == key || name.split(' ').next() == Some(key)
            });
            if !scheduled {
                below_target.push(HoursShortfall {
                    instructor: key.to_string(),
                    hours: 0.0,
                    target,
                });
            }
        }

        let mut location_counts = BTreeMap::new();
        for entry in entries {
            *location_counts.entry(entry.location.clone()).or_insert(0) += 1;
        }

        Self {
            total_classes: entries.len(),
            total_hours: entries.iter().map(ScheduledClassEntry::hours).sum(),
            teacher_hours: hours,
            near_cap,
            below_target,
            location_counts,
            format_counts: class_format_counts(entries),
        }
    }

    /// Whether every priority instructor meets the hour target.
    pub fn priority_targets_met(&self) -> bool {
        self.below_target.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClockTime;

    fn entry(id: &str, day: Weekday, h: u16, format: &str, teacher: &str) -> ScheduledClassEntry {
        ScheduledClassEntry::new(
            id,
            day,
            ClockTime::from_hm(h, 0),
            "Kenkere House",
            format,
            Instructor::from_full_name(teacher),
        )
    }

    #[test]
    fn test_teacher_hours_merges_and_excludes_inactive() {
        let entries = vec![
            entry("1", Weekday::Monday, 9, "Studio Mat 57", "Rohan Mehta"),
            entry("2", Weekday::Tuesday, 9, "Studio Recovery", "rohan  MEHTA"),
            entry("3", Weekday::Monday, 18, "Studio FIT", "Saniya Patel"),
        ];
        let hours = teacher_hours(&entries, &Roster::studio_default());
        assert_eq!(hours.len(), 1);
        assert!((hours["Rohan Mehta"] - 1.5).abs() < 1e-10);
    }

    #[test]
    fn test_format_counts() {
        let entries = vec![
            entry("1", Weekday::Monday, 9, "Studio Mat 57", "Rohan Mehta"),
            entry("2", Weekday::Tuesday, 9, "Studio Mat 57", "Reshma Nair"),
            entry("3", Weekday::Monday, 18, "Studio FIT", "Anisha Shah"),
        ];
        let all = class_format_counts(&entries);
        assert_eq!(all["Studio Mat 57"], 2);
        assert_eq!(all["Studio FIT"], 1);
        let monday = format_counts_for_day(&entries, Weekday::Monday);
        assert_eq!(monday.len(), 2);
        assert_eq!(monday["Studio Mat 57"], 1);
        assert!(format_counts_for_day(&entries, Weekday::Sunday).is_empty());
    }

    #[test]
    fn test_teacher_specialties() {
        let row = |format: &str, checked_in: f64| {
            HistoricClassRecord::new("Kenkere House", "Monday", "09:00", format, "Rohan Mehta")
                .with_checked_in(checked_in)
        };
        let records = vec![
            row("Studio Mat 57", 6.0),
            row("Studio Mat 57", 8.0),
            row("Studio FIT", 9.0),
            row("Studio Barre 57", 4.0),
            HistoricClassRecord::new("Kenkere House", "Monday", "09:00", "Studio Cardio Barre", "Reshma Nair")
                .with_checked_in(12.0),
        ];
        let roster = Roster::new();
        let rohan = Instructor::new("Rohan", "Mehta");
        assert_eq!(
            teacher_specialties(&records, &roster, &rohan),
            vec!["Studio FIT".to_string(), "Studio Mat 57".to_string()]
        );
        let inactive = Roster::new().with_tier("Rohan", InstructorTier::Inactive);
        assert!(teacher_specialties(&records, &inactive, &rohan).is_empty());
    }

    #[test]
    fn test_specialties_capped() {
        let records: Vec<_> = (0..7)
            .map(|i| {
                HistoricClassRecord::new("Kenkere House", "Monday", "09:00", &format!("Format {i}"), "Rohan Mehta")
                    .with_checked_in(6.0 + i as f64)
            })
            .collect();
        let specialties = teacher_specialties(&records, &Roster::new(), &Instructor::new("Rohan", "Mehta"));
        assert_eq!(specialties.len(), MAX_SPECIALTIES);
        assert_eq!(specialties[0], "Format 6");
    }

    #[test]
    fn test_report() {
        let config = PolicyConfig::default().with_roster(
            Roster::new()
                .with_tier("Rohan", InstructorTier::Priority)
                .with_tier("Anisha", InstructorTier::Priority),
        );
        let mut entries: Vec<_> = (0..15)
            .map(|i: usize| {
                entry(&format!("r{i}"), Weekday::ALL[i % 7], 7 + 2 * (i / 7) as u16, "Studio Mat 57", "Rohan Mehta")
            })
            .collect();
        entries.push(entry("x", Weekday::Monday, 18, "Studio FIT", "Reshma Nair"));

        let report = ScheduleReport::calculate(&entries, &config);
        assert_eq!(report.total_classes, 16);
        assert!((report.total_hours - 16.0).abs() < 1e-10);
        assert_eq!(report.near_cap, vec!["Rohan Mehta".to_string()]);
        assert_eq!(report.below_target.len(), 1);
        assert_eq!(report.below_target[0].instructor, "anisha");
        assert!(!report.priority_targets_met());
        assert_eq!(report.location_counts["Kenkere House"], 16);
        assert_eq!(report.format_counts["Studio FIT"], 1);
    }
}
