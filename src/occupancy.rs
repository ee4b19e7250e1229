//! Studio and instructor occupancy checks.
//!
//! Pure functions over a slice of placed entries and one candidate. An
//! existing entry with the candidate's ID is ignored, so checking an edited
//! entry against the schedule it replaces does not conflict with itself.
//!
//! # Capacity
//! For every bucket the candidate occupies, the number of entries at the
//! same location and day already occupying it must stay below the
//! location's studio count.

use crate::models::{ClockTime, ScheduledClassEntry, Weekday};

fn others<'a>(
    entries: &'a [ScheduledClassEntry],
    candidate: &'a ScheduledClassEntry,
) -> impl Iterator<Item = &'a ScheduledClassEntry> {
    entries.iter().filter(move |e| e.id != candidate.id)
}

/// Entries at `location`/`day` occupying `bucket`.
pub fn bucket_load(
    entries: &[ScheduledClassEntry],
    location: &str,
    day: Weekday,
    bucket: ClockTime,
) -> usize {
    entries
        .iter()
        .filter(|e| e.location == location && e.day == day && e.occupies(bucket))
        .count()
}

/// Whether the candidate fits within `capacity` parallel studios.
pub fn fits_capacity(
    entries: &[ScheduledClassEntry],
    candidate: &ScheduledClassEntry,
    capacity: usize,
) -> bool {
    candidate.buckets().into_iter().all(|bucket| {
        let load = others(entries, candidate)
            .filter(|e| {
                e.location == candidate.location && e.day == candidate.day && e.occupies(bucket)
            })
            .count();
        load < capacity
    })
}

/// Whether the candidate's instructor is already busy.
///
/// True when a same-day entry for the instructor shares a bucket with the
/// candidate, or when the instructor already teaches that day at another
/// location.
pub fn conflicts_with_instructor(
    entries: &[ScheduledClassEntry],
    candidate: &ScheduledClassEntry,
) -> bool {
    let buckets = candidate.buckets();
    others(entries, candidate)
        .filter(|e| e.day == candidate.day && e.is_taught_by(&candidate.instructor))
        .any(|e| {
            e.location != candidate.location || buckets.iter().any(|b| e.occupies(*b))
        })
}

/// Longest back-to-back run for the candidate's instructor on its day,
/// with the candidate inserted.
///
/// Two classes are back to back when the later one starts within
/// `tolerance_minutes` of the earlier one's end.
///
/// ```
/// use studio_schedule::models::{ClockTime, Instructor, ScheduledClassEntry, Weekday};
/// use studio_schedule::occupancy::consecutive_run;
///
/// let class = |id: &str, h| ScheduledClassEntry::new(
///     id, Weekday::Monday, ClockTime::from_hm(h, 0),
///     "Kenkere House", "Studio Mat 57", Instructor::new("Rohan", "Mehta"),
/// );
/// let existing = vec![class("a", 8), class("b", 9)];
/// assert_eq!(consecutive_run(&existing, &class("c", 10), 15), 3);
/// assert_eq!(consecutive_run(&existing, &class("c", 18), 15), 2);
/// ```
pub fn consecutive_run(
    entries: &[ScheduledClassEntry],
    candidate: &ScheduledClassEntry,
    tolerance_minutes: u16,
) -> usize {
    let mut day: Vec<(ClockTime, ClockTime)> = others(entries, candidate)
        .filter(|e| e.day == candidate.day && e.is_taught_by(&candidate.instructor))
        .map(|e| (e.time, e.end_time()))
        .collect();
    day.push((candidate.time, candidate.end_time()));
    day.sort();

    let mut longest = 0;
    let mut run = 0;
    let mut prev_end: Option<ClockTime> = None;
    for (start, end) in day {
        run = match prev_end {
            Some(prev) if start.distance(prev) <= tolerance_minutes => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev_end = Some(end);
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Instructor;

    fn class(id: &str, h: u16, m: u16, location: &str, teacher: &str) -> ScheduledClassEntry {
        ScheduledClassEntry::new(
            id,
            Weekday::Tuesday,
            ClockTime::from_hm(h, m),
            location,
            "Studio Mat 57",
            Instructor::from_full_name(teacher),
        )
    }

    #[test]
    fn test_fits_capacity() {
        let existing = vec![
            class("a", 9, 0, "Kenkere House", "A One"),
            class("b", 9, 30, "Kenkere House", "B Two"),
        ];
        // 09:30 bucket already holds two classes
        assert!(!fits_capacity(&existing, &class("c", 9, 45, "Kenkere House", "C Three"), 2));
        assert!(fits_capacity(&existing, &class("c", 9, 45, "Kenkere House", "C Three"), 3));
        // 10:00 only overlaps "b"
        assert!(fits_capacity(&existing, &class("c", 10, 0, "Kenkere House", "C Three"), 2));
        // other location is independent
        assert!(fits_capacity(&existing, &class("c", 9, 0, "Elsewhere", "C Three"), 1));
    }

    #[test]
    fn test_capacity_ignores_same_id() {
        let existing = vec![class("a", 9, 0, "Kenkere House", "A One")];
        let edited = class("a", 9, 0, "Kenkere House", "B Two");
        assert!(fits_capacity(&existing, &edited, 1));
    }

    #[test]
    fn test_bucket_load() {
        let existing = vec![
            class("a", 9, 0, "Kenkere House", "A One"),
            class("b", 9, 30, "Kenkere House", "B Two"),
        ];
        let load = |h, m| bucket_load(&existing, "Kenkere House", Weekday::Tuesday, ClockTime::from_hm(h, m));
        assert_eq!(load(9, 0), 1);
        assert_eq!(load(9, 45), 2);
        assert_eq!(load(10, 15), 1);
        assert_eq!(load(10, 30), 0);
    }

    #[test]
    fn test_instructor_conflicts() {
        let existing = vec![class("a", 9, 0, "Kenkere House", "Rohan Mehta")];
        assert!(conflicts_with_instructor(&existing, &class("b", 9, 30, "Kenkere House", "rohan mehta")));
        assert!(!conflicts_with_instructor(&existing, &class("b", 10, 0, "Kenkere House", "Rohan Mehta")));
        // same day, different location
        assert!(conflicts_with_instructor(&existing, &class("b", 18, 0, "Elsewhere", "Rohan Mehta")));
        // different instructor
        assert!(!conflicts_with_instructor(&existing, &class("b", 9, 0, "Kenkere House", "Reshma Nair")));
    }

    #[test]
    fn test_consecutive_run_with_tolerance() {
        let existing = vec![
            class("a", 8, 0, "Kenkere House", "Rohan Mehta"),
            class("b", 9, 15, "Kenkere House", "Rohan Mehta"),
        ];
        // 15-minute gap counts as adjacent
        assert_eq!(consecutive_run(&existing, &class("c", 10, 15, "Kenkere House", "Rohan Mehta"), 15), 3);
        // 30-minute gap breaks the run
        assert_eq!(consecutive_run(&existing, &class("c", 10, 45, "Kenkere House", "Rohan Mehta"), 15), 2);
        // inserted before the existing pair
        assert_eq!(consecutive_run(&existing, &class("c", 7, 0, "Kenkere House", "Rohan Mehta"), 15), 3);
        assert_eq!(consecutive_run(&[], &class("c", 7, 0, "Kenkere House", "Rohan Mehta"), 15), 1);
    }
}
