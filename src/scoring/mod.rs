//! Historic performance scoring.
//!
//! Aggregates historic class observations into per-slot statistics and
//! ranks the class/instructor/slot combinations the assembler should try
//! first. An optional external score feed refines the order.
//!
//! # Algorithm
//!
//! 1. Keep rows with a parseable day and time, a named active instructor,
//!    a format and a location; drop hosted and private formats.
//! 2. Group by (format, location, day, time). In [`ScoringMode::Strict`]
//!    the instructor is chosen per group (largest checked-in share); in
//!    [`ScoringMode::Loose`] the instructor is part of the key.
//! 3. Join the score feed on (location, day, time, format[, instructor]).
//! 4. Filter on the rounded average checked-in count.
//! 5. Rank (see [`rank_combinations`]).
//!
//! # Example
//!
//! ```
//! use studio_schedule::models::{HistoricClassRecord, Roster};
//! use studio_schedule::scoring::PerformanceScorer;
//!
//! let rows: Vec<_> = (0..3)
//!     .map(|_| HistoricClassRecord::new("Kenkere House", "Monday", "09:00", "Studio Mat 57", "Rohan Mehta")
//!         .with_checked_in(8.0)
//!         .with_revenue(4000.0))
//!     .collect();
//!
//! let ranked = PerformanceScorer::strict(Roster::new()).score(&rows, None);
//! assert_eq!(ranked.len(), 1);
//! assert_eq!(ranked[0].occurrences, 3);
//! assert_eq!(ranked[0].expected_participants(), 8);
//! ```

mod feed;
mod scorer;
mod slot;

pub use feed::ScoreFeed;
pub use scorer::{rank_combinations, PerformanceScorer, ScoringMode, STRICT_THRESHOLD};
pub use slot::{
    best_instructor_for_class, best_slot_recommendation, class_average_for_slot,
    has_historical_data, slot_analysis, time_slots_with_data, InstructorPerformance,
    SlotAnalysis, SlotRecommendation,
};

use serde::{Deserialize, Serialize};

use crate::models::{ClockTime, HistoricClassRecord, Instructor, Roster, Weekday};

/// Average checked-in count at or above which a combination is a top performer.
pub const TOP_PERFORMER_AVERAGE: f64 = 6.0;

/// Adjusted score above which a combination is a top performer.
pub const TOP_PERFORMER_SCORE: f64 = 100.0;

/// A class/slot/instructor combination with its historic statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCombination {
    /// Class format.
    pub class_format: String,
    /// Location.
    pub location: String,
    /// Day of week.
    pub day: Weekday,
    /// Start time.
    pub time: ClockTime,
    /// Representative instructor.
    pub instructor: Instructor,
    /// Average checked-in count (one decimal).
    pub avg_checked_in: f64,
    /// Average revenue.
    pub avg_revenue: f64,
    /// Number of observations.
    pub occurrences: usize,
    /// Adjusted score from the feed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_score: Option<f64>,
    /// Popularity tier from the feed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<String>,
    /// Consistency tier from the feed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consistency: Option<String>,
}

impl RankedCombination {
    /// Whether the combination counts as a top performer.
    pub fn is_top_performer(&self) -> bool {
        self.avg_checked_in >= TOP_PERFORMER_AVERAGE
            || self
                .adjusted_score
                .is_some_and(|s| s > TOP_PERFORMER_SCORE)
    }

    /// Expected check-ins for a new entry.
    pub fn expected_participants(&self) -> u32 {
        self.avg_checked_in.round().max(0.0) as u32
    }

    /// Expected revenue for a new entry.
    pub fn expected_revenue(&self) -> f64 {
        self.avg_revenue.round()
    }

    /// Deterministic tie-break key.
    fn slot_key(&self) -> (&str, &str, Weekday, ClockTime) {
        (&self.class_format, &self.location, self.day, self.time)
    }
}

/// A historic row that passed the identity filters.
#[derive(Debug, Clone)]
pub(crate) struct Observation<'a> {
    pub record: &'a HistoricClassRecord,
    pub day: Weekday,
    pub time: ClockTime,
    pub instructor: Instructor,
}

/// Rows usable for aggregation: named active instructor, parseable day
/// and time, non-empty format and location.
pub(crate) fn observations<'a>(
    records: &'a [HistoricClassRecord],
    roster: &'a Roster,
) -> impl Iterator<Item = Observation<'a>> + 'a {
    records.iter().filter_map(move |record| {
        if record.class_format.trim().is_empty() || record.location.trim().is_empty() {
            return None;
        }
        let instructor = record.instructor()?;
        if roster.is_inactive(&instructor.full_name()) {
            return None;
        }
        Some(Observation {
            record,
            day: record.day()?,
            time: record.time()?,
            instructor,
        })
    })
}

/// Rounds to one decimal.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Rounds to two decimals.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
