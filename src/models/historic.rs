//! Historic class observations and the optional external score feed.
//!
//! Both record types arrive already parsed from tabular text. Numeric
//! fields are lenient: numbers, numeric strings (with thousands
//! separators), empty strings, and nulls are all accepted, and anything
//! unparseable becomes zero. Identity fields (day, time) stay textual here
//! and are parsed by consumers, which skip rows that fail.

use serde::{Deserialize, Deserializer, Serialize};

use super::entry::{normalize_name, Instructor};
use super::time::{ClockTime, Weekday};

/// One observed past class occurrence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricClassRecord {
    /// Location name.
    #[serde(default)]
    pub location: String,
    /// Day of week as recorded.
    #[serde(default)]
    pub day_of_week: String,
    /// Class time as recorded (`"HH:MM"` or longer).
    #[serde(default)]
    pub class_time: String,
    /// Cleaned class-format label.
    #[serde(default, alias = "cleanedClass")]
    pub class_format: String,
    /// Instructor given name.
    #[serde(default)]
    pub teacher_first_name: String,
    /// Instructor family name.
    #[serde(default)]
    pub teacher_last_name: String,
    /// Instructor full name, when the source provides one.
    #[serde(default)]
    pub teacher_name: Option<String>,
    /// Checked-in attendees.
    #[serde(default, deserialize_with = "lenient_number")]
    pub checked_in: f64,
    /// Booked participants.
    #[serde(default, deserialize_with = "lenient_number")]
    pub participants: f64,
    /// Revenue.
    #[serde(default, alias = "totalRevenue", deserialize_with = "lenient_number")]
    pub revenue: f64,
    /// Late cancellations.
    #[serde(default, deserialize_with = "lenient_number")]
    pub late_cancellations: f64,
    /// Non-paying attendees.
    #[serde(default, alias = "nonPaidCustomers", deserialize_with = "lenient_number")]
    pub non_paid: f64,
    /// Tip total.
    #[serde(default, alias = "tip", deserialize_with = "lenient_number")]
    pub tips: f64,
}

impl HistoricClassRecord {
    /// Creates a record with zeroed metrics.
    pub fn new(
        location: impl Into<String>,
        day_of_week: impl Into<String>,
        class_time: impl Into<String>,
        class_format: impl Into<String>,
        instructor: &str,
    ) -> Self {
        let instructor = Instructor::from_full_name(instructor);
        Self {
            location: location.into(),
            day_of_week: day_of_week.into(),
            class_time: class_time.into(),
            class_format: class_format.into(),
            teacher_first_name: instructor.first_name,
            teacher_last_name: instructor.last_name,
            ..Default::default()
        }
    }

    /// Sets the checked-in count.
    pub fn with_checked_in(mut self, checked_in: f64) -> Self {
        self.checked_in = checked_in;
        self
    }

    /// Sets participants.
    pub fn with_participants(mut self, participants: f64) -> Self {
        self.participants = participants;
        self
    }

    /// Sets revenue.
    pub fn with_revenue(mut self, revenue: f64) -> Self {
        self.revenue = revenue;
        self
    }

    /// Sets late cancellations and non-paid counts.
    pub fn with_attrition(mut self, late_cancellations: f64, non_paid: f64) -> Self {
        self.late_cancellations = late_cancellations;
        self.non_paid = non_paid;
        self
    }

    /// Sets the tip total.
    pub fn with_tips(mut self, tips: f64) -> Self {
        self.tips = tips;
        self
    }

    /// Instructor display name; prefers the full-name column.
    ///
    /// Returns `None` when no name is present.
    pub fn instructor_name(&self) -> Option<String> {
        let name = match self.teacher_name.as_deref().map(str::trim) {
            Some(full) if !full.is_empty() => full.to_string(),
            _ => format!(
                "{} {}",
                self.teacher_first_name.trim(),
                self.teacher_last_name.trim()
            )
            .trim()
            .to_string(),
        };
        (!name.is_empty()).then_some(name)
    }

    /// Instructor identity, if named.
    pub fn instructor(&self) -> Option<Instructor> {
        self.instructor_name()
            .map(|name| Instructor::from_full_name(&name))
    }

    /// Parsed day of week.
    pub fn day(&self) -> Option<Weekday> {
        self.day_of_week.parse().ok()
    }

    /// Parsed start time.
    pub fn time(&self) -> Option<ClockTime> {
        self.class_time.parse().ok()
    }

    /// Whether the format label marks a hosted or private class.
    pub fn is_hosted_or_private(&self) -> bool {
        let lower = self.class_format.to_lowercase();
        lower.contains("hosted") || lower.contains("private")
    }
}

/// Precomputed quality metrics for a slot from the external score feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    /// Location name.
    #[serde(default)]
    pub location: String,
    /// Day of week as recorded.
    #[serde(default)]
    pub day_of_week: String,
    /// Class time as recorded.
    #[serde(default)]
    pub class_time: String,
    /// Class-format label.
    #[serde(default, alias = "cleanedClass")]
    pub class_format: String,
    /// Instructor the score is specific to, if any.
    #[serde(default)]
    pub trainer_name: Option<String>,
    /// Weighted performance score.
    #[serde(default, deserialize_with = "lenient_number")]
    pub adjusted_score: f64,
    /// Popularity tier (free text, e.g. "High").
    #[serde(default)]
    pub popularity: String,
    /// Consistency tier (free text).
    #[serde(default)]
    pub consistency: String,
    /// Variance across trainers.
    #[serde(default, deserialize_with = "lenient_number")]
    pub trainer_variance: f64,
    /// Free-text observations.
    #[serde(default)]
    pub observations: String,
}

impl ScoreRecord {
    /// Creates a score row.
    pub fn new(
        location: impl Into<String>,
        day_of_week: impl Into<String>,
        class_time: impl Into<String>,
        class_format: impl Into<String>,
        adjusted_score: f64,
    ) -> Self {
        Self {
            location: location.into(),
            day_of_week: day_of_week.into(),
            class_time: class_time.into(),
            class_format: class_format.into(),
            adjusted_score,
            ..Default::default()
        }
    }

    /// Restricts the row to one trainer.
    pub fn with_trainer(mut self, name: impl Into<String>) -> Self {
        self.trainer_name = Some(name.into());
        self
    }

    /// Sets popularity and consistency tiers.
    pub fn with_tiers(mut self, popularity: impl Into<String>, consistency: impl Into<String>) -> Self {
        self.popularity = popularity.into();
        self.consistency = consistency.into();
        self
    }

    /// Parsed day of week.
    pub fn day(&self) -> Option<Weekday> {
        self.day_of_week.parse().ok()
    }

    /// Parsed start time.
    pub fn time(&self) -> Option<ClockTime> {
        self.class_time.parse().ok()
    }

    /// Normalized trainer key, if the row is trainer-specific.
    pub fn trainer_key(&self) -> Option<String> {
        self.trainer_name
            .as_deref()
            .map(normalize_name)
            .filter(|k| !k.is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientValue {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

/// Deserializes a number, coercing anything unparseable to zero.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match LenientValue::deserialize(deserializer)? {
        LenientValue::Number(n) => n,
        LenientValue::Text(s) => s.trim().replace(',', "").parse().unwrap_or(0.0),
        LenientValue::Other(_) => 0.0,
    };
    Ok(if value.is_finite() { value } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_lenient_numbers() {
        let json = r#"{
            "location": "Kenkere House",
            "dayOfWeek": "Monday",
            "classTime": "07:30:00",
            "cleanedClass": "Studio Barre 57",
            "teacherFirstName": "Anisha",
            "teacherLastName": "Shah",
            "checkedIn": "7",
            "participants": 9,
            "totalRevenue": "4,250.50",
            "lateCancellations": "n/a",
            "nonPaidCustomers": null
        }"#;
        let r: HistoricClassRecord = serde_json::from_str(json).unwrap();
        assert!((r.checked_in - 7.0).abs() < 1e-10);
        assert!((r.participants - 9.0).abs() < 1e-10);
        assert!((r.revenue - 4250.5).abs() < 1e-10);
        assert_eq!(r.late_cancellations, 0.0);
        assert_eq!(r.non_paid, 0.0);
        assert_eq!(r.tips, 0.0);
        assert_eq!(r.day(), Some(Weekday::Monday));
        assert_eq!(r.time(), Some(ClockTime::from_hm(7, 30)));
        assert_eq!(r.instructor_name().as_deref(), Some("Anisha Shah"));
    }

    #[test]
    fn test_record_identity_fields() {
        let mut r = HistoricClassRecord::new("Kenkere House", "Someday", "late", "Studio FIT", "");
        assert!(r.day().is_none());
        assert!(r.time().is_none());
        assert!(r.instructor_name().is_none());

        r.teacher_name = Some("Rohan Mehta".into());
        assert_eq!(r.instructor().unwrap().last_name, "Mehta");
    }

    #[test]
    fn test_hosted_or_private() {
        let r = HistoricClassRecord::new("Kenkere House", "Monday", "09:00", "Studio Hosted Class", "A B");
        assert!(r.is_hosted_or_private());
        let r = HistoricClassRecord::new("Kenkere House", "Monday", "09:00", "Studio Private Session", "A B");
        assert!(r.is_hosted_or_private());
        let r = HistoricClassRecord::new("Kenkere House", "Monday", "09:00", "Studio FIT", "A B");
        assert!(!r.is_hosted_or_private());
    }

    #[test]
    fn test_score_record() {
        let s = ScoreRecord::new("Supreme HQ, Bandra", "Friday", "18:00", "Studio powerCycle", 42.5)
            .with_trainer(" Vivaran  Dhasmana ")
            .with_tiers("High", "Stable");
        assert_eq!(s.trainer_key().as_deref(), Some("vivaran dhasmana"));
        assert_eq!(s.time(), Some(ClockTime::from_hm(18, 0)));

        let json = r#"{"location":"Kenkere House","dayOfWeek":"Sunday","classTime":"10:00",
                       "cleanedClass":"Studio Mat 57","adjustedScore":"12.5","trainerVariance":""}"#;
        let s: ScoreRecord = serde_json::from_str(json).unwrap();
        assert!((s.adjusted_score - 12.5).abs() < 1e-10);
        assert_eq!(s.trainer_variance, 0.0);
        assert!(s.trainer_key().is_none());
    }
}
