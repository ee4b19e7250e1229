//! Per-slot historic analysis.
//!
//! Drill-down views over one (location, day, time) slot, used when a
//! human places or edits a single class.
//!
//! # Adjusted Score
//! `0.4 * avg_with_empty + 0.3 * revenue_per_class / 100
//!  + 0.2 * (100 - late_cancel_rate) / 100 + 0.1 * fill_rate / 100`
//!
//! # Instructor Ranking
//! `0.6 * avg_checked_in + 0.4 * avg_revenue / 1000`, top 3.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::{observations, round1, round2, Observation};
use crate::models::{ClockTime, HistoricClassRecord, Instructor, Roster, Weekday};

/// Historic performance of one instructor in a slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorPerformance {
    /// Instructor.
    pub instructor: Instructor,
    /// Weighted average (two decimals).
    pub weighted_avg: f64,
    /// Classes observed.
    pub class_count: usize,
}

/// Aggregate statistics for one slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAnalysis {
    /// Classes observed.
    pub total_classes: usize,
    /// Sum of checked-in counts.
    pub total_checked_in: f64,
    /// Sum of bookings.
    pub total_participants: f64,
    /// Classes nobody checked into.
    pub empty_classes: usize,
    /// Classes with at least one check-in.
    pub non_empty_classes: usize,
    /// Average checked-in count over all classes.
    pub avg_attendance_with_empty: f64,
    /// Average checked-in count over non-empty classes.
    pub avg_attendance_without_empty: f64,
    /// Sum of revenue.
    pub total_revenue: f64,
    /// Revenue per class.
    pub revenue_per_class: f64,
    /// Late cancellations per class.
    pub avg_late_cancels: f64,
    /// Non-paying attendees per class.
    pub avg_non_paid: f64,
    /// Sum of tips.
    pub total_tips: f64,
    /// Tips per class.
    pub tips_per_class: f64,
    /// Checked-in over booked, percent.
    pub fill_rate: f64,
    /// Revenue per checked-in attendee.
    pub revenue_per_seat: f64,
    /// Late cancellations over booked, percent.
    pub late_cancel_rate: f64,
    /// Non-paying over booked, percent.
    pub non_paid_rate: f64,
    /// Composite score (see module docs).
    pub adjusted_score: f64,
    /// Best three instructors.
    pub top_instructors: Vec<InstructorPerformance>,
}

/// Best class/instructor pairing for a slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRecommendation {
    /// Class format.
    pub class_format: String,
    /// Instructor.
    pub instructor: Instructor,
    /// Average checked-in count (one decimal).
    pub avg_checked_in: f64,
}

fn in_slot<'a>(
    records: &'a [HistoricClassRecord],
    roster: &'a Roster,
    location: &'a str,
    day: Weekday,
    time: ClockTime,
) -> impl Iterator<Item = Observation<'a>> + 'a {
    observations(records, roster).filter(move |o| {
        o.record.location.trim() == location.trim() && o.day == day && o.time == time
    })
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Detailed statistics for a slot, excluding hosted/private classes.
///
/// Returns `None` when the slot has no usable history.
pub fn slot_analysis(
    records: &[HistoricClassRecord],
    roster: &Roster,
    location: &str,
    day: Weekday,
    time: ClockTime,
) -> Option<SlotAnalysis> {
    let rows: Vec<Observation<'_>> = in_slot(records, roster, location, day, time)
        .filter(|o| !o.record.is_hosted_or_private())
        .collect();
    if rows.is_empty() {
        return None;
    }

    let total_classes = rows.len();
    let n = total_classes as f64;
    let sum = |f: fn(&HistoricClassRecord) -> f64| rows.iter().map(|o| f(o.record)).sum::<f64>();
    let total_checked_in = sum(|r| r.checked_in);
    let total_participants = sum(|r| r.participants);
    let total_revenue = sum(|r| r.revenue);
    let total_late = sum(|r| r.late_cancellations);
    let total_non_paid = sum(|r| r.non_paid);
    let total_tips = sum(|r| r.tips);
    let empty_classes = rows.iter().filter(|o| o.record.checked_in == 0.0).count();
    let non_empty_classes = total_classes - empty_classes;

    let avg_attendance_with_empty = round2(total_checked_in / n);
    let fill_rate = round2(ratio(total_checked_in, total_participants) * 100.0);
    let revenue_per_class = round2(total_revenue / n);
    let late_cancel_rate = round2(ratio(total_late, total_participants) * 100.0);
    let adjusted_score = round2(
        avg_attendance_with_empty * 0.4
            + revenue_per_class / 100.0 * 0.3
            + (100.0 - late_cancel_rate) / 100.0 * 0.2
            + fill_rate / 100.0 * 0.1,
    );

    let mut by_instructor: BTreeMap<String, (Instructor, f64, f64, usize)> = BTreeMap::new();
    for o in &rows {
        let stats = by_instructor
            .entry(o.instructor.key())
            .or_insert_with(|| (o.instructor.clone(), 0.0, 0.0, 0));
        stats.1 += o.record.checked_in;
        stats.2 += o.record.revenue;
        stats.3 += 1;
    }
    let mut top_instructors: Vec<InstructorPerformance> = by_instructor
        .into_values()
        .map(|(instructor, checked_in, revenue, count)| {
            let c = count as f64;
            InstructorPerformance {
                instructor,
                weighted_avg: round2(checked_in / c * 0.6 + revenue / c / 1000.0 * 0.4),
                class_count: count,
            }
        })
        .collect();
    top_instructors.sort_by(|a, b| b.weighted_avg.total_cmp(&a.weighted_avg));
    top_instructors.truncate(3);

    Some(SlotAnalysis {
        total_classes,
        total_checked_in,
        total_participants,
        empty_classes,
        non_empty_classes,
        avg_attendance_with_empty,
        avg_attendance_without_empty: round2(ratio(total_checked_in, non_empty_classes as f64)),
        total_revenue,
        revenue_per_class,
        avg_late_cancels: round2(total_late / n),
        avg_non_paid: round2(total_non_paid / n),
        total_tips,
        tips_per_class: round2(total_tips / n),
        fill_rate,
        revenue_per_seat: round2(ratio(total_revenue, total_checked_in)),
        late_cancel_rate,
        non_paid_rate: round2(ratio(total_non_paid, total_participants) * 100.0),
        adjusted_score,
        top_instructors,
    })
}

/// Best (format, instructor) pair for a slot by average checked-in count.
pub fn best_slot_recommendation(
    records: &[HistoricClassRecord],
    roster: &Roster,
    location: &str,
    day: Weekday,
    time: ClockTime,
) -> Option<SlotRecommendation> {
    let mut pairs: BTreeMap<(String, String), (Instructor, f64, usize)> = BTreeMap::new();
    for o in in_slot(records, roster, location, day, time) {
        if o.record.is_hosted_or_private() {
            continue;
        }
        let stats = pairs
            .entry((o.record.class_format.trim().to_string(), o.instructor.key()))
            .or_insert_with(|| (o.instructor.clone(), 0.0, 0));
        stats.1 += o.record.checked_in;
        stats.2 += 1;
    }
    let mut best: Option<SlotRecommendation> = None;
    for ((class_format, _), (instructor, checked_in, count)) in pairs {
        let avg_checked_in = round1(checked_in / count as f64);
        if best.as_ref().map_or(true, |b| avg_checked_in > b.avg_checked_in) {
            best = Some(SlotRecommendation {
                class_format,
                instructor,
                avg_checked_in,
            });
        }
    }
    best
}

/// Instructor with the highest average checked-in count for a format in a slot.
pub fn best_instructor_for_class(
    records: &[HistoricClassRecord],
    roster: &Roster,
    class_format: &str,
    location: &str,
    day: Weekday,
    time: ClockTime,
) -> Option<Instructor> {
    let mut stats: BTreeMap<String, (Instructor, f64, usize)> = BTreeMap::new();
    for o in in_slot(records, roster, location, day, time) {
        if o.record.class_format.trim() != class_format.trim() {
            continue;
        }
        let s = stats
            .entry(o.instructor.key())
            .or_insert_with(|| (o.instructor.clone(), 0.0, 0));
        s.1 += o.record.checked_in;
        s.2 += 1;
    }
    let mut best: Option<(Instructor, f64)> = None;
    for (instructor, checked_in, count) in stats.into_values() {
        let avg = round1(checked_in / count as f64);
        if best.as_ref().map_or(true, |(_, b)| avg > *b) {
            best = Some((instructor, avg));
        }
    }
    best.map(|(i, _)| i)
}

/// Average checked-in count (one decimal) and observation count for a
/// format in a slot, optionally for one instructor.
pub fn class_average_for_slot(
    records: &[HistoricClassRecord],
    roster: &Roster,
    class_format: &str,
    location: &str,
    day: Weekday,
    time: ClockTime,
    instructor: Option<&Instructor>,
) -> (f64, usize) {
    let (total, count) = in_slot(records, roster, location, day, time)
        .filter(|o| o.record.class_format.trim() == class_format.trim())
        .filter(|o| instructor.map_or(true, |i| o.instructor.same_as(i)))
        .fold((0.0, 0), |(t, c), o| (t + o.record.checked_in, c + 1));
    if count == 0 {
        (0.0, 0)
    } else {
        (round1(total / count as f64), count)
    }
}

/// Whether any active instructor has taught in the slot.
pub fn has_historical_data(
    records: &[HistoricClassRecord],
    roster: &Roster,
    location: &str,
    day: Weekday,
    time: ClockTime,
) -> bool {
    in_slot(records, roster, location, day, time).next().is_some()
}

/// Start times with history at a location, any day.
pub fn time_slots_with_data(
    records: &[HistoricClassRecord],
    roster: &Roster,
    location: &str,
) -> BTreeSet<ClockTime> {
    observations(records, roster)
        .filter(|o| o.record.location.trim() == location.trim())
        .map(|o| o.time)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InstructorTier;

    const KENKERE: &str = "Kenkere House";

    fn row(format: &str, teacher: &str, checked_in: f64, booked: f64, revenue: f64) -> HistoricClassRecord {
        HistoricClassRecord::new(KENKERE, "Monday", "09:00", format, teacher)
            .with_checked_in(checked_in)
            .with_participants(booked)
            .with_revenue(revenue)
    }

    fn monday_nine() -> (Weekday, ClockTime) {
        (Weekday::Monday, ClockTime::from_hm(9, 0))
    }

    #[test]
    fn test_slot_analysis_metrics() {
        let rows = vec![
            row("Studio Mat 57", "Rohan Mehta", 8.0, 10.0, 4000.0).with_attrition(1.0, 2.0),
            row("Studio Mat 57", "Rohan Mehta", 0.0, 2.0, 0.0).with_attrition(1.0, 0.0),
            row("Studio FIT", "Reshma Nair", 4.0, 8.0, 2000.0).with_tips(300.0),
        ];
        let (day, time) = monday_nine();
        let a = slot_analysis(&rows, &Roster::new(), KENKERE, day, time).unwrap();
        assert_eq!(a.total_classes, 3);
        assert_eq!(a.empty_classes, 1);
        assert_eq!(a.non_empty_classes, 2);
        assert!((a.avg_attendance_with_empty - 4.0).abs() < 1e-10);
        assert!((a.avg_attendance_without_empty - 6.0).abs() < 1e-10);
        assert!((a.revenue_per_class - 2000.0).abs() < 1e-10);
        assert!((a.fill_rate - 60.0).abs() < 1e-10);
        assert!((a.late_cancel_rate - 10.0).abs() < 1e-10);
        assert!((a.non_paid_rate - 10.0).abs() < 1e-10);
        assert!((a.revenue_per_seat - 500.0).abs() < 1e-10);
        assert!((a.tips_per_class - 100.0).abs() < 1e-10);
        // 1.6 + 6.0 + 0.18 + 0.06
        assert!((a.adjusted_score - 7.84).abs() < 1e-10);

        assert_eq!(a.top_instructors.len(), 2);
        // Rohan: 0.6*4 + 0.4*2 = 3.2, Reshma: 0.6*4 + 0.4*2 = 3.2; BTreeMap order keeps Reshma first
        assert!((a.top_instructors[0].weighted_avg - 3.2).abs() < 1e-10);
        assert_eq!(a.top_instructors[0].instructor.first_name, "Reshma");
    }

    #[test]
    fn test_slot_analysis_empty_and_inactive() {
        let roster = Roster::new().with_tier("Saniya", InstructorTier::Inactive);
        let rows = vec![row("Studio Mat 57", "Saniya Patel", 9.0, 10.0, 1000.0)];
        let (day, time) = monday_nine();
        assert!(slot_analysis(&rows, &roster, KENKERE, day, time).is_none());
        assert!(!has_historical_data(&rows, &roster, KENKERE, day, time));
        assert!(has_historical_data(&rows, &Roster::new(), KENKERE, day, time));
    }

    #[test]
    fn test_best_slot_recommendation() {
        let rows = vec![
            row("Studio Mat 57", "Rohan Mehta", 6.0, 0.0, 0.0),
            row("Studio FIT", "Reshma Nair", 9.0, 0.0, 0.0),
            row("Studio Hosted Class", "Anisha Shah", 20.0, 0.0, 0.0),
        ];
        let (day, time) = monday_nine();
        let rec = best_slot_recommendation(&rows, &Roster::new(), KENKERE, day, time).unwrap();
        assert_eq!(rec.class_format, "Studio FIT");
        assert_eq!(rec.instructor.first_name, "Reshma");
        assert!((rec.avg_checked_in - 9.0).abs() < 1e-10);
    }

    #[test]
    fn test_best_instructor_and_average() {
        let rows = vec![
            row("Studio Mat 57", "Rohan Mehta", 6.0, 0.0, 0.0),
            row("Studio Mat 57", "Rohan Mehta", 7.0, 0.0, 0.0),
            row("Studio Mat 57", "Reshma Nair", 9.0, 0.0, 0.0),
            row("Studio FIT", "Anisha Shah", 15.0, 0.0, 0.0),
        ];
        let roster = Roster::new();
        let (day, time) = monday_nine();
        let best = best_instructor_for_class(&rows, &roster, "Studio Mat 57", KENKERE, day, time).unwrap();
        assert_eq!(best.first_name, "Reshma");

        let (avg, count) = class_average_for_slot(&rows, &roster, "Studio Mat 57", KENKERE, day, time, None);
        assert_eq!(count, 3);
        assert!((avg - 7.3).abs() < 1e-10);

        let rohan = Instructor::new("Rohan", "Mehta");
        let (avg, count) =
            class_average_for_slot(&rows, &roster, "Studio Mat 57", KENKERE, day, time, Some(&rohan));
        assert_eq!(count, 2);
        assert!((avg - 6.5).abs() < 1e-10);

        let (avg, count) = class_average_for_slot(&rows, &roster, "Studio Barre 57", KENKERE, day, time, None);
        assert_eq!((avg, count), (0.0, 0));
    }

    #[test]
    fn test_time_slots_with_data() {
        let rows = vec![
            row("Studio Mat 57", "Rohan Mehta", 6.0, 0.0, 0.0),
            HistoricClassRecord::new(KENKERE, "Friday", "18:30:00", "Studio FIT", "Reshma Nair"),
            HistoricClassRecord::new("Elsewhere", "Friday", "07:00", "Studio FIT", "Reshma Nair"),
        ];
        let slots = time_slots_with_data(&rows, &Roster::new(), KENKERE);
        let labels: Vec<String> = slots.iter().map(|t| t.label()).collect();
        assert_eq!(labels, ["09:00", "18:30"]);
    }
}
