//! Keyed index over the external score feed.

use std::collections::HashMap;

use crate::models::{normalize_name, ClockTime, Instructor, ScoreRecord, Weekday};

type FeedKey = (String, Weekday, ClockTime, String);

/// Score rows indexed by (location, day, time, format).
///
/// Location and format are matched case-insensitively. Rows with an
/// unparseable day or time are dropped.
#[derive(Debug, Clone, Default)]
pub struct ScoreFeed {
    rows: HashMap<FeedKey, Vec<ScoreRecord>>,
}

fn key(location: &str, day: Weekday, time: ClockTime, class_format: &str) -> FeedKey {
    (
        normalize_name(location),
        day,
        time,
        normalize_name(class_format),
    )
}

impl ScoreFeed {
    /// Indexes the feed.
    pub fn new(records: &[ScoreRecord]) -> Self {
        let mut rows: HashMap<FeedKey, Vec<ScoreRecord>> = HashMap::new();
        for record in records {
            let (Some(day), Some(time)) = (record.day(), record.time()) else {
                continue;
            };
            rows.entry(key(&record.location, day, time, &record.class_format))
                .or_default()
                .push(record.clone());
        }
        Self { rows }
    }

    /// Finds the score row for a combination.
    ///
    /// With an instructor, a row specific to that trainer wins; otherwise
    /// the first trainer-agnostic row, else the first row for the slot.
    pub fn lookup(
        &self,
        class_format: &str,
        location: &str,
        day: Weekday,
        time: ClockTime,
        instructor: Option<&Instructor>,
    ) -> Option<&ScoreRecord> {
        let rows = self.rows.get(&key(location, day, time, class_format))?;
        if let Some(instructor) = instructor {
            let wanted = instructor.key();
            if let Some(row) = rows
                .iter()
                .find(|r| r.trainer_key().as_deref() == Some(wanted.as_str()))
            {
                return Some(row);
            }
        }
        rows.iter()
            .find(|r| r.trainer_key().is_none())
            .or_else(|| rows.first())
    }

    /// Number of indexed rows.
    pub fn len(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }

    /// Whether the feed holds no usable rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed() -> ScoreFeed {
        ScoreFeed::new(&[
            ScoreRecord::new("Kenkere House", "Monday", "09:00", "Studio Mat 57", 40.0)
                .with_trainer("Reshma Nair"),
            ScoreRecord::new("Kenkere House", "Monday", "09:00:00", "Studio Mat 57", 30.0),
            ScoreRecord::new("Kenkere House", "Monday", "09:00", "Studio Mat 57", 50.0)
                .with_trainer("Rohan Mehta"),
            ScoreRecord::new("Kenkere House", "Someday", "09:00", "Studio Mat 57", 99.0),
        ])
    }

    #[test]
    fn test_lookup_prefers_trainer_row() {
        let f = feed();
        let nine = ClockTime::from_hm(9, 0);
        let rohan = Instructor::new("rohan", "MEHTA");
        let row = f
            .lookup("studio mat 57", "Kenkere House", Weekday::Monday, nine, Some(&rohan))
            .unwrap();
        assert!((row.adjusted_score - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_lookup_falls_back_to_generic_row() {
        let f = feed();
        let nine = ClockTime::from_hm(9, 0);
        let other = Instructor::new("Anisha", "Shah");
        let row = f
            .lookup("Studio Mat 57", "kenkere house", Weekday::Monday, nine, Some(&other))
            .unwrap();
        assert!((row.adjusted_score - 30.0).abs() < 1e-10);
        let row = f
            .lookup("Studio Mat 57", "Kenkere House", Weekday::Monday, nine, None)
            .unwrap();
        assert!((row.adjusted_score - 30.0).abs() < 1e-10);
    }

    #[test]
    fn test_lookup_miss_and_bad_rows() {
        let f = feed();
        assert_eq!(f.len(), 3);
        assert!(f
            .lookup("Studio Mat 57", "Kenkere House", Weekday::Tuesday, ClockTime::from_hm(9, 0), None)
            .is_none());
        assert!(ScoreFeed::default().is_empty());
    }
}
