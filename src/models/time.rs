//! Clock, day, and duration primitives.
//!
//! The schedule is a repeating week, so times are wall-clock minutes within
//! a day rather than absolute instants. Occupancy is accounted in fixed
//! 15-minute buckets.
//!
//! # Bucket Model
//! A class starting at `s` with duration `d` occupies the buckets
//! `s, s+15, s+30, ...` up to (excluding) `s + round15(d)`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Width of one occupancy bucket in minutes.
pub const BUCKET_MINUTES: u16 = 15;

/// First bookable start time of the day (07:00).
pub const DAY_START: ClockTime = ClockTime::from_hm(7, 0);

/// Last bookable start time of the day (20:45).
pub const DAY_END: ClockTime = ClockTime::from_hm(20, 45);

// ================================
// ClockTime
// ================================

/// A wall-clock time, stored as minutes since midnight.
///
/// Parses from `"HH:MM"` strings; only the first five characters are
/// significant, so `"09:00:00"` and `"09:00 AM"` both parse as 09:00.
///
/// # Examples
///
/// ```
/// use studio_schedule::models::ClockTime;
///
/// let t: ClockTime = "18:30:00".parse().unwrap();
/// assert_eq!(t.to_string(), "18:30");
/// assert_eq!(t.hour(), 18);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    /// Creates a time from hours and minutes.
    pub const fn from_hm(hour: u16, minute: u16) -> Self {
        Self(hour * 60 + minute)
    }

    /// Creates a time from minutes since midnight.
    pub const fn from_minutes(minutes: u16) -> Self {
        Self(minutes)
    }

    /// Minutes since midnight.
    #[inline]
    pub fn minutes(self) -> u16 {
        self.0
    }

    /// Hour component (0-23 for valid times).
    #[inline]
    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    /// Minute component (0-59).
    #[inline]
    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// Returns this time shifted forward by `minutes`.
    pub fn plus_minutes(self, minutes: u16) -> Self {
        Self(self.0.saturating_add(minutes))
    }

    /// Absolute difference in minutes.
    pub fn distance(self, other: Self) -> u16 {
        self.0.abs_diff(other.0)
    }

    /// Bucket label (`"HH:MM"`).
    pub fn label(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidTime {
            value: s.to_string(),
        };
        let head: String = s.trim().chars().take(5).collect();
        let (h, m) = head.split_once(':').ok_or_else(invalid)?;
        let hour: u16 = h.trim().parse().map_err(|_| invalid())?;
        let minute: u16 = m.trim().parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }
        Ok(Self::from_hm(hour, minute))
    }
}

impl TryFrom<String> for ClockTime {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(t: ClockTime) -> Self {
        t.to_string()
    }
}

// ================================
// Weekday
// ================================

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All days, Monday first.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Saturday or Sunday.
    pub fn is_weekend(self) -> bool {
        matches!(self, Weekday::Saturday | Weekday::Sunday)
    }

    /// Monday through Wednesday.
    pub fn is_early_week(self) -> bool {
        matches!(self, Weekday::Monday | Weekday::Tuesday | Weekday::Wednesday)
    }

    /// Earliest hour a second (evening) shift may start.
    ///
    /// Weekdays: 17:00. Weekends: 16:00.
    pub fn second_shift_start_hour(self) -> u16 {
        if self.is_weekend() {
            16
        } else {
            17
        }
    }

    /// Full English name.
    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Weekday {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let day = match lower.as_str() {
            "monday" | "mon" => Weekday::Monday,
            "tuesday" | "tue" | "tues" => Weekday::Tuesday,
            "wednesday" | "wed" => Weekday::Wednesday,
            "thursday" | "thu" | "thurs" => Weekday::Thursday,
            "friday" | "fri" => Weekday::Friday,
            "saturday" | "sat" => Weekday::Saturday,
            "sunday" | "sun" => Weekday::Sunday,
            _ => {
                return Err(Error::InvalidDay {
                    value: s.to_string(),
                })
            }
        };
        Ok(day)
    }
}

// ================================
// ClassDuration
// ================================

/// Supported class lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum ClassDuration {
    /// 30 minutes (recovery formats).
    HalfHour,
    /// 45 minutes (express and foundations formats).
    ThreeQuarters,
    /// 60 minutes (default).
    Hour,
}

impl ClassDuration {
    /// Duration in hours.
    pub fn hours(self) -> f64 {
        match self {
            ClassDuration::HalfHour => 0.5,
            ClassDuration::ThreeQuarters => 0.75,
            ClassDuration::Hour => 1.0,
        }
    }

    /// Duration in minutes.
    pub fn minutes(self) -> u16 {
        match self {
            ClassDuration::HalfHour => 30,
            ClassDuration::ThreeQuarters => 45,
            ClassDuration::Hour => 60,
        }
    }

    /// Derives the duration from a class-format naming convention.
    ///
    /// "express" → 0.75h, "recovery" → 0.5h, "foundations" → 0.75h,
    /// anything else → 1h. Matching is case-insensitive and checked in
    /// that order.
    ///
    /// ```
    /// use studio_schedule::models::ClassDuration;
    ///
    /// assert_eq!(ClassDuration::for_format("Studio Barre 57 (Express)"), ClassDuration::ThreeQuarters);
    /// assert_eq!(ClassDuration::for_format("Studio Recovery"), ClassDuration::HalfHour);
    /// assert_eq!(ClassDuration::for_format("Studio Mat 57"), ClassDuration::Hour);
    /// ```
    pub fn for_format(class_format: &str) -> Self {
        let lower = class_format.to_lowercase();
        if lower.contains("express") {
            ClassDuration::ThreeQuarters
        } else if lower.contains("recovery") {
            ClassDuration::HalfHour
        } else if lower.contains("foundations") {
            ClassDuration::ThreeQuarters
        } else {
            ClassDuration::Hour
        }
    }
}

impl TryFrom<f64> for ClassDuration {
    type Error = Error;

    fn try_from(hours: f64) -> Result<Self> {
        if (hours - 0.5).abs() < 1e-9 {
            Ok(ClassDuration::HalfHour)
        } else if (hours - 0.75).abs() < 1e-9 {
            Ok(ClassDuration::ThreeQuarters)
        } else if (hours - 1.0).abs() < 1e-9 {
            Ok(ClassDuration::Hour)
        } else {
            Err(Error::InvalidDuration { hours })
        }
    }
}

impl From<ClassDuration> for f64 {
    fn from(d: ClassDuration) -> Self {
        d.hours()
    }
}

// ================================
// Shift
// ================================

/// Coarse classification of a start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shift {
    /// 07:00–11:59.
    Morning,
    /// 12:00–16:59, and anything outside the studio day.
    Afternoon,
    /// 17:00–20:59.
    Evening,
}

impl Shift {
    /// Classifies a start time.
    pub fn of(time: ClockTime) -> Self {
        match time.hour() {
            7..=11 => Shift::Morning,
            17..=20 => Shift::Evening,
            _ => Shift::Afternoon,
        }
    }
}

// ================================
// Bucket helpers
// ================================

/// Buckets occupied by a class starting at `start` lasting `duration_hours`.
///
/// The duration is rounded to the nearest 15 minutes.
///
/// ```
/// use studio_schedule::models::{occupied_buckets, ClockTime};
///
/// let buckets = occupied_buckets(ClockTime::from_hm(9, 0), 1.0);
/// let labels: Vec<String> = buckets.iter().map(|b| b.label()).collect();
/// assert_eq!(labels, ["09:00", "09:15", "09:30", "09:45"]);
/// ```
pub fn occupied_buckets(start: ClockTime, duration_hours: f64) -> Vec<ClockTime> {
    let minutes = duration_hours.max(0.0) * 60.0;
    let buckets = (minutes / f64::from(BUCKET_MINUTES)).round() as u16;
    (0..buckets)
        .map(|i| start.plus_minutes(i * BUCKET_MINUTES))
        .collect()
}

/// Whether `time` falls in the blocked midday band for `day`.
///
/// Weekdays block 12:00–16:59, weekends 12:00–15:59. Only the hour of the
/// start time is considered.
pub fn is_time_restricted(time: ClockTime, day: Weekday) -> bool {
    let hour = time.hour();
    hour >= 12 && hour < day.second_shift_start_hour()
}

/// Bookable start times for `day` on the 15-minute grid.
///
/// Morning slots 07:00–11:45 plus evening slots from the day's second-shift
/// start through 20:45.
pub fn available_start_times(day: Weekday) -> Vec<ClockTime> {
    let evening_start = day.second_shift_start_hour();
    (DAY_START.minutes()..=DAY_END.minutes())
        .step_by(usize::from(BUCKET_MINUTES))
        .map(ClockTime::from_minutes)
        .filter(|t| {
            let h = t.hour();
            (7..=11).contains(&h) || (evening_start..=20).contains(&h)
        })
        .collect()
}
