//! Strict and loose performance scorers.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::{observations, round1, RankedCombination, ScoreFeed};
use crate::models::{ClockTime, HistoricClassRecord, Instructor, Roster, Weekday};

/// Default strict threshold on average checked-in count (exclusive).
pub const STRICT_THRESHOLD: f64 = 5.0;

/// Grouping and filtering variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoringMode {
    /// One combination per slot; keeps groups averaging above `threshold`.
    Strict {
        /// Exclusive lower bound on average checked-in count.
        threshold: f64,
    },
    /// One combination per slot and instructor; optional inclusive floor.
    Loose {
        /// Inclusive lower bound on average checked-in count.
        floor: Option<f64>,
    },
}

impl Default for ScoringMode {
    fn default() -> Self {
        ScoringMode::Strict {
            threshold: STRICT_THRESHOLD,
        }
    }
}

type GroupKey = (String, String, Weekday, ClockTime, Option<String>);

#[derive(Debug, Default)]
struct Group {
    checked_in: f64,
    revenue: f64,
    count: usize,
    by_instructor: BTreeMap<String, (Instructor, f64)>,
}

impl Group {
    /// Instructor with the largest checked-in total (first key on ties).
    fn representative(&self) -> Option<&Instructor> {
        let mut best: Option<(&Instructor, f64)> = None;
        for (instructor, total) in self.by_instructor.values() {
            if best.map_or(true, |(_, t)| *total > t) {
                best = Some((instructor, *total));
            }
        }
        best.map(|(i, _)| i)
    }
}

/// Aggregates historic rows into ranked combinations.
#[derive(Debug, Clone, Default)]
pub struct PerformanceScorer {
    mode: ScoringMode,
    roster: Roster,
}

impl PerformanceScorer {
    /// Creates a scorer.
    pub fn new(mode: ScoringMode, roster: Roster) -> Self {
        Self { mode, roster }
    }

    /// Strict scorer with the default threshold.
    pub fn strict(roster: Roster) -> Self {
        Self::new(ScoringMode::default(), roster)
    }

    /// Loose scorer with no floor.
    pub fn loose(roster: Roster) -> Self {
        Self::new(ScoringMode::Loose { floor: None }, roster)
    }

    /// Sets the mode.
    pub fn with_mode(mut self, mode: ScoringMode) -> Self {
        self.mode = mode;
        self
    }

    /// Current mode.
    pub fn mode(&self) -> ScoringMode {
        self.mode
    }

    /// Scores historic rows, returning qualifying combinations in rank order.
    pub fn score(
        &self,
        records: &[HistoricClassRecord],
        feed: Option<&ScoreFeed>,
    ) -> Vec<RankedCombination> {
        let per_instructor = matches!(self.mode, ScoringMode::Loose { .. });
        let mut groups: BTreeMap<GroupKey, Group> = BTreeMap::new();

        for obs in observations(records, &self.roster) {
            if obs.record.is_hosted_or_private() {
                continue;
            }
            let instructor_key = obs.instructor.key();
            let key = (
                obs.record.class_format.trim().to_string(),
                obs.record.location.trim().to_string(),
                obs.day,
                obs.time,
                per_instructor.then(|| instructor_key.clone()),
            );
            let group = groups.entry(key).or_default();
            group.checked_in += obs.record.checked_in;
            group.revenue += obs.record.revenue;
            group.count += 1;
            group
                .by_instructor
                .entry(instructor_key)
                .or_insert_with(|| (obs.instructor.clone(), 0.0))
                .1 += obs.record.checked_in;
        }

        let combos: Vec<RankedCombination> = groups
            .into_iter()
            .filter_map(|((class_format, location, day, time, _), group)| {
                let avg_checked_in = round1(group.checked_in / group.count as f64);
                let keep = match self.mode {
                    ScoringMode::Strict { threshold } => avg_checked_in > threshold,
                    ScoringMode::Loose { floor } => floor.map_or(true, |f| avg_checked_in >= f),
                };
                if !keep {
                    return None;
                }
                let instructor = group.representative()?.clone();
                let score = feed.and_then(|f| {
                    f.lookup(&class_format, &location, day, time, Some(&instructor))
                });
                Some(RankedCombination {
                    avg_revenue: group.revenue / group.count as f64,
                    occurrences: group.count,
                    adjusted_score: score.map(|s| s.adjusted_score),
                    popularity: score.map(|s| s.popularity.clone()).filter(|p| !p.is_empty()),
                    consistency: score.map(|s| s.consistency.clone()).filter(|c| !c.is_empty()),
                    class_format,
                    location,
                    day,
                    time,
                    instructor,
                    avg_checked_in,
                })
            })
            .collect();

        rank_combinations(combos)
    }
}

fn by_avg_desc(a: &RankedCombination, b: &RankedCombination) -> Ordering {
    b.avg_checked_in.total_cmp(&a.avg_checked_in)
}

fn by_score_desc(a: &RankedCombination, b: &RankedCombination) -> Ordering {
    let sa = a.adjusted_score.unwrap_or(0.0);
    let sb = b.adjusted_score.unwrap_or(0.0);
    sb.total_cmp(&sa)
}

fn by_slot(a: &RankedCombination, b: &RankedCombination) -> Ordering {
    a.slot_key()
        .cmp(&b.slot_key())
        .then_with(|| a.instructor.key().cmp(&b.instructor.key()))
}

/// Orders combinations for greedy placement.
///
/// Scored combinations are ordered among themselves by adjusted score,
/// unscored ones by average checked-in count. The two lists are then
/// merged by average checked-in count, scored first on equal averages.
/// Remaining ties fall back to (format, location, day, time, instructor).
/// Every step is a total order.
pub fn rank_combinations(combos: Vec<RankedCombination>) -> Vec<RankedCombination> {
    let total = combos.len();
    let (mut scored, mut unscored): (Vec<_>, Vec<_>) = combos
        .into_iter()
        .partition(|c| c.adjusted_score.is_some());

    scored.sort_by(|a, b| {
        by_score_desc(a, b)
            .then_with(|| by_avg_desc(a, b))
            .then_with(|| by_slot(a, b))
    });
    unscored.sort_by(|a, b| by_avg_desc(a, b).then_with(|| by_slot(a, b)));

    let mut ranked = Vec::with_capacity(total);
    let mut scored = scored.into_iter().peekable();
    let mut unscored = unscored.into_iter().peekable();
    loop {
        let take_scored = match (scored.peek(), unscored.peek()) {
            (Some(s), Some(u)) => s.avg_checked_in >= u.avg_checked_in,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_scored {
            scored.next()
        } else {
            unscored.next()
        };
        ranked.extend(next);
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InstructorTier, ScoreRecord};

    fn row(format: &str, day: &str, time: &str, teacher: &str, checked_in: f64) -> HistoricClassRecord {
        HistoricClassRecord::new("Kenkere House", day, time, format, teacher)
            .with_checked_in(checked_in)
            .with_revenue(checked_in * 500.0)
    }

    #[test]
    fn test_strict_groups_slot_and_picks_largest_share() {
        let rows = vec![
            row("Studio Mat 57", "Monday", "09:00", "Rohan Mehta", 6.0),
            row("Studio Mat 57", "Monday", "09:00", "Reshma Nair", 8.0),
            row("Studio Mat 57", "Monday", "09:00:00", "Rohan Mehta", 7.0),
        ];
        let ranked = PerformanceScorer::strict(Roster::new()).score(&rows, None);
        assert_eq!(ranked.len(), 1);
        let c = &ranked[0];
        assert_eq!(c.occurrences, 3);
        assert!((c.avg_checked_in - 7.0).abs() < 1e-10);
        // Rohan: 13 checked in vs Reshma: 8
        assert_eq!(c.instructor.full_name(), "Rohan Mehta");
        assert!((c.avg_revenue - 3500.0).abs() < 1e-10);
    }

    #[test]
    fn test_strict_threshold_is_exclusive() {
        let rows = vec![
            row("Studio Mat 57", "Monday", "09:00", "Rohan Mehta", 5.0),
            row("Studio Mat 57", "Monday", "09:00", "Rohan Mehta", 5.0),
            row("Studio FIT", "Monday", "18:00", "Rohan Mehta", 4.0),
        ];
        assert!(PerformanceScorer::strict(Roster::new()).score(&rows, None).is_empty());
    }

    #[test]
    fn test_strict_excludes_inactive_and_hosted() {
        let roster = Roster::new().with_tier("Saniya", InstructorTier::Inactive);
        let rows = vec![
            row("Studio Mat 57", "Monday", "09:00", "Saniya Patel", 12.0),
            row("Studio Hosted Class", "Monday", "18:00", "Rohan Mehta", 20.0),
            row("Studio Private Barre", "Monday", "19:00", "Rohan Mehta", 20.0),
        ];
        assert!(PerformanceScorer::strict(roster).score(&rows, None).is_empty());
    }

    #[test]
    fn test_loose_groups_by_instructor_with_floor() {
        let rows = vec![
            row("Studio Mat 57", "Monday", "09:00", "Rohan Mehta", 6.0),
            row("Studio Mat 57", "Monday", "09:00", "Reshma Nair", 3.0),
        ];
        let all = PerformanceScorer::loose(Roster::new()).score(&rows, None);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].instructor.full_name(), "Rohan Mehta");

        let floored = PerformanceScorer::loose(Roster::new())
            .with_mode(ScoringMode::Loose { floor: Some(3.0) })
            .score(&rows, None);
        assert_eq!(floored.len(), 2);
        let floored = PerformanceScorer::loose(Roster::new())
            .with_mode(ScoringMode::Loose { floor: Some(3.1) })
            .score(&rows, None);
        assert_eq!(floored.len(), 1);
    }

    #[test]
    fn test_feed_join_and_ranking() {
        let rows = vec![
            row("Studio Mat 57", "Monday", "09:00", "Rohan Mehta", 9.0),
            row("Studio FIT", "Monday", "18:00", "Rohan Mehta", 7.0),
            row("Studio Barre 57", "Tuesday", "09:00", "Reshma Nair", 6.0),
        ];
        let feed = ScoreFeed::new(&[
            ScoreRecord::new("Kenkere House", "Monday", "18:00", "Studio FIT", 80.0)
                .with_tiers("High", "Stable"),
            ScoreRecord::new("Kenkere House", "Tuesday", "09:00", "Studio Barre 57", 95.0),
        ]);
        let ranked = PerformanceScorer::strict(Roster::new()).score(&rows, Some(&feed));
        let order: Vec<&str> = ranked.iter().map(|c| c.class_format.as_str()).collect();
        // scored: Barre (95) before FIT (80); unscored Mat (avg 9) merges first
        assert_eq!(order, ["Studio Mat 57", "Studio Barre 57", "Studio FIT"]);
        let fit = &ranked[2];
        assert_eq!(fit.adjusted_score, Some(80.0));
        assert_eq!(fit.popularity.as_deref(), Some("High"));
        assert!(ranked[0].adjusted_score.is_none());
    }

    #[test]
    fn test_rank_ties_are_deterministic() {
        let rows = vec![
            row("Studio FIT", "Monday", "09:00", "Rohan Mehta", 7.0),
            row("Studio Barre 57", "Monday", "09:00", "Reshma Nair", 7.0),
        ];
        let ranked = PerformanceScorer::strict(Roster::new()).score(&rows, None);
        assert_eq!(ranked[0].class_format, "Studio Barre 57");
        assert_eq!(ranked[1].class_format, "Studio FIT");
    }

    #[test]
    fn test_rank_scored_first_on_equal_average() {
        let mut a = PerformanceScorer::strict(Roster::new())
            .score(&[row("Studio FIT", "Monday", "09:00", "Rohan Mehta", 7.0)], None)
            .remove(0);
        let b = RankedCombination {
            class_format: "Studio Barre 57".into(),
            ..a.clone()
        };
        a.adjusted_score = Some(1.0);
        let ranked = rank_combinations(vec![b, a]);
        assert_eq!(ranked[0].adjusted_score, Some(1.0));
    }
}
