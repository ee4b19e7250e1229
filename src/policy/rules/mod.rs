//! Built-in policy rules.
//!
//! # Categories
//!
//! - **Eligibility**: inactive instructors, format/location, midday band,
//!   early-week recovery
//! - **Capacity**: studio capacity, Sunday limit
//! - **Labor**: instructor conflicts, consecutive run, daily count/hours,
//!   weekly cap, new-instructor formats
//!
//! # Evaluation Order
//! [`standard_rules`] lists rules in the order the engine evaluates them.
//! Only [`WeeklyHourCap`] produces an overridable outcome; only
//! [`WeeklyHourCap`] and [`NewInstructorFormats`] produce warnings.

use std::sync::Arc;

use super::{PolicyContext, PolicyRule, RuleOutcome};
use crate::models::{is_time_restricted, InstructorTier, ScheduledClassEntry, ViolationType, Weekday};
use crate::occupancy::{conflicts_with_instructor, consecutive_run, fits_capacity};

const EPSILON: f64 = 1e-9;

/// The full rule set in evaluation order.
pub fn standard_rules() -> Vec<Arc<dyn PolicyRule>> {
    vec![
        Arc::new(ActiveInstructor),
        Arc::new(FormatAllowed),
        Arc::new(MiddayBand),
        Arc::new(StudioCapacity),
        Arc::new(InstructorConflict),
        Arc::new(ConsecutiveLimit),
        Arc::new(DailyClassLimit),
        Arc::new(DailyHoursLimit),
        Arc::new(WeeklyHourCap),
        Arc::new(SundayLimit),
        Arc::new(EarlyWeekRecovery),
        Arc::new(NewInstructorFormats),
    ]
}

// ======================== Eligibility rules ========================

/// Inactive instructors are never scheduled.
#[derive(Debug, Clone, Copy)]
pub struct ActiveInstructor;

impl PolicyRule for ActiveInstructor {
    fn name(&self) -> &'static str {
        "active-instructor"
    }

    fn evaluate(&self, candidate: &ScheduledClassEntry, context: &PolicyContext<'_>) -> RuleOutcome {
        if context.config.tier_of(&candidate.instructor) == InstructorTier::Inactive {
            RuleOutcome::Deny(format!(
                "{} is inactive and cannot be assigned to classes",
                candidate.instructor
            ))
        } else {
            RuleOutcome::Allow
        }
    }

    fn violation_type(&self) -> ViolationType {
        ViolationType::InactiveInstructor
    }

    fn description(&self) -> &'static str {
        "Instructor is not on the inactive list"
    }
}

/// Format family and deny list per location.
#[derive(Debug, Clone, Copy)]
pub struct FormatAllowed;

impl PolicyRule for FormatAllowed {
    fn name(&self) -> &'static str {
        "format-allowed"
    }

    fn evaluate(&self, candidate: &ScheduledClassEntry, context: &PolicyContext<'_>) -> RuleOutcome {
        if context
            .config
            .is_format_allowed(&candidate.class_format, &candidate.location)
        {
            RuleOutcome::Allow
        } else {
            RuleOutcome::Deny(format!(
                "{} is not offered at {}",
                candidate.class_format, candidate.location
            ))
        }
    }

    fn violation_type(&self) -> ViolationType {
        ViolationType::FormatNotAllowed
    }

    fn description(&self) -> &'static str {
        "Format is allowed at the location"
    }
}

/// No class may start inside the midday band.
///
/// Weekdays block 12:00 until 17:00, weekends 12:00 until 16:00.
#[derive(Debug, Clone, Copy)]
pub struct MiddayBand;

impl PolicyRule for MiddayBand {
    fn name(&self) -> &'static str {
        "midday-band"
    }

    fn evaluate(&self, candidate: &ScheduledClassEntry, _context: &PolicyContext<'_>) -> RuleOutcome {
        if !is_time_restricted(candidate.time, candidate.day) {
            return RuleOutcome::Allow;
        }
        let earliest = candidate.day.second_shift_start_hour();
        let kind = if candidate.day.is_weekend() {
            "Weekend"
        } else {
            "Weekday"
        };
        RuleOutcome::Deny(format!(
            "{kind} second shift classes must start at {earliest}:00 or later (attempted: {})",
            candidate.time
        ))
    }

    fn violation_type(&self) -> ViolationType {
        ViolationType::RestrictedTime
    }

    fn description(&self) -> &'static str {
        "Start time is outside the midday band"
    }
}

/// Recovery formats are not run Monday through Wednesday.
#[derive(Debug, Clone, Copy)]
pub struct EarlyWeekRecovery;

impl PolicyRule for EarlyWeekRecovery {
    fn name(&self) -> &'static str {
        "early-week-recovery"
    }

    fn evaluate(&self, candidate: &ScheduledClassEntry, _context: &PolicyContext<'_>) -> RuleOutcome {
        let recovery = candidate.class_format.to_lowercase().contains("recovery");
        if recovery && candidate.day.is_early_week() {
            RuleOutcome::Deny(format!(
                "Recovery classes are not scheduled on {}",
                candidate.day
            ))
        } else {
            RuleOutcome::Allow
        }
    }

    fn violation_type(&self) -> ViolationType {
        ViolationType::EarlyWeekRecovery
    }
}

// ======================== Capacity rules ========================

/// Parallel classes at a location stay within its studio count.
#[derive(Debug, Clone, Copy)]
pub struct StudioCapacity;

impl PolicyRule for StudioCapacity {
    fn name(&self) -> &'static str {
        "studio-capacity"
    }

    fn evaluate(&self, candidate: &ScheduledClassEntry, context: &PolicyContext<'_>) -> RuleOutcome {
        let capacity = context.config.capacity_at(&candidate.location);
        if fits_capacity(context.entries, candidate, capacity) {
            RuleOutcome::Allow
        } else {
            RuleOutcome::Deny(format!(
                "Studio capacity exceeded at {} for {} {}",
                candidate.location, candidate.day, candidate.time
            ))
        }
    }

    fn violation_type(&self) -> ViolationType {
        ViolationType::CapacityExceeded
    }

    fn description(&self) -> &'static str {
        "Studio capacity is not exceeded"
    }
}

/// Location-specific cap on Sunday classes.
#[derive(Debug, Clone, Copy)]
pub struct SundayLimit;

impl PolicyRule for SundayLimit {
    fn name(&self) -> &'static str {
        "sunday-limit"
    }

    fn evaluate(&self, candidate: &ScheduledClassEntry, context: &PolicyContext<'_>) -> RuleOutcome {
        if candidate.day != Weekday::Sunday {
            return RuleOutcome::Allow;
        }
        let limit = context.config.sunday_limit(&candidate.location);
        let placed = context
            .others(candidate)
            .filter(|e| e.day == Weekday::Sunday && e.location == candidate.location)
            .count();
        if placed >= limit {
            RuleOutcome::Deny(format!(
                "{} already has {placed} Sunday classes (max {limit})",
                candidate.location
            ))
        } else {
            RuleOutcome::Allow
        }
    }

    fn violation_type(&self) -> ViolationType {
        ViolationType::SundayLimit
    }
}

// ======================== Labor rules ========================

/// Instructor is free and at the same location all day.
#[derive(Debug, Clone, Copy)]
pub struct InstructorConflict;

impl PolicyRule for InstructorConflict {
    fn name(&self) -> &'static str {
        "instructor-conflict"
    }

    fn evaluate(&self, candidate: &ScheduledClassEntry, context: &PolicyContext<'_>) -> RuleOutcome {
        if !conflicts_with_instructor(context.entries, candidate) {
            return RuleOutcome::Allow;
        }
        let elsewhere = context
            .others(candidate)
            .find(|e| {
                e.day == candidate.day
                    && e.is_taught_by(&candidate.instructor)
                    && e.location != candidate.location
            })
            .map(|e| e.location.clone());
        match elsewhere {
            Some(location) => RuleOutcome::Deny(format!(
                "{} already teaches at {location} on {}",
                candidate.instructor, candidate.day
            )),
            None => RuleOutcome::Deny(format!(
                "{} is already teaching at {} {}",
                candidate.instructor, candidate.day, candidate.time
            )),
        }
    }

    fn violation_type(&self) -> ViolationType {
        ViolationType::InstructorConflict
    }

    fn description(&self) -> &'static str {
        "Instructor has no overlapping class and one location per day"
    }
}

/// Limits back-to-back classes.
#[derive(Debug, Clone, Copy)]
pub struct ConsecutiveLimit;

impl PolicyRule for ConsecutiveLimit {
    fn name(&self) -> &'static str {
        "consecutive-limit"
    }

    fn evaluate(&self, candidate: &ScheduledClassEntry, context: &PolicyContext<'_>) -> RuleOutcome {
        let max = context.config.max_consecutive;
        let run = consecutive_run(
            context.entries,
            candidate,
            context.config.adjacency_tolerance_minutes,
        );
        if run > max {
            RuleOutcome::Deny(format!(
                "{} would have {run} consecutive classes (max {max} allowed)",
                candidate.instructor
            ))
        } else {
            RuleOutcome::Allow
        }
    }

    fn violation_type(&self) -> ViolationType {
        ViolationType::ConsecutiveLimit
    }
}

/// Limits classes per instructor per day.
#[derive(Debug, Clone, Copy)]
pub struct DailyClassLimit;

impl PolicyRule for DailyClassLimit {
    fn name(&self) -> &'static str {
        "daily-class-limit"
    }

    fn evaluate(&self, candidate: &ScheduledClassEntry, context: &PolicyContext<'_>) -> RuleOutcome {
        let max = context.config.max_daily_classes;
        let placed = context
            .state
            .daily_classes(&candidate.instructor, candidate.day);
        if placed >= max {
            RuleOutcome::Deny(format!(
                "{} would have {} classes on {} (max {max} allowed)",
                candidate.instructor,
                placed + 1,
                candidate.day
            ))
        } else {
            RuleOutcome::Allow
        }
    }

    fn violation_type(&self) -> ViolationType {
        ViolationType::DailyLimit
    }
}

/// Limits hours per instructor per day.
#[derive(Debug, Clone, Copy)]
pub struct DailyHoursLimit;

impl PolicyRule for DailyHoursLimit {
    fn name(&self) -> &'static str {
        "daily-hours-limit"
    }

    fn evaluate(&self, candidate: &ScheduledClassEntry, context: &PolicyContext<'_>) -> RuleOutcome {
        let max = context.config.max_daily_hours;
        let after = context
            .state
            .daily_hours(&candidate.instructor, candidate.day)
            + candidate.hours();
        if after > max + EPSILON {
            RuleOutcome::Deny(format!(
                "{} would teach {after:.2}h on {} (max {max}h)",
                candidate.instructor, candidate.day
            ))
        } else {
            RuleOutcome::Allow
        }
    }

    fn violation_type(&self) -> ViolationType {
        ViolationType::DailyLimit
    }
}

/// Weekly hour cap by tier.
///
/// Exceeding the cap is overridable; landing within the warning margin of
/// it produces a warning.
#[derive(Debug, Clone, Copy)]
pub struct WeeklyHourCap;

impl PolicyRule for WeeklyHourCap {
    fn name(&self) -> &'static str {
        "weekly-hour-cap"
    }

    fn evaluate(&self, candidate: &ScheduledClassEntry, context: &PolicyContext<'_>) -> RuleOutcome {
        let cap = context.config.weekly_cap(&candidate.instructor);
        let after = context.state.weekly_hours(&candidate.instructor) + candidate.hours();
        if after > cap + EPSILON {
            RuleOutcome::Overridable(format!(
                "{} would exceed {cap}h limit ({after:.1}h total)",
                candidate.instructor
            ))
        } else if after > cap - context.config.cap_warning_margin + EPSILON {
            RuleOutcome::Warn(format!(
                "{} approaching {cap}h limit ({after:.1}h total)",
                candidate.instructor
            ))
        } else {
            RuleOutcome::Allow
        }
    }

    fn violation_type(&self) -> ViolationType {
        ViolationType::WeeklyCap
    }

    fn description(&self) -> &'static str {
        "Weekly hours stay within the instructor's cap"
    }
}

/// New instructors are warned off formats outside their approved list.
#[derive(Debug, Clone, Copy)]
pub struct NewInstructorFormats;

impl PolicyRule for NewInstructorFormats {
    fn name(&self) -> &'static str {
        "new-instructor-formats"
    }

    fn evaluate(&self, candidate: &ScheduledClassEntry, context: &PolicyContext<'_>) -> RuleOutcome {
        let config = context.config;
        if config.tier_of(&candidate.instructor) == InstructorTier::New
            && !config.is_new_instructor_format(&candidate.class_format)
        {
            RuleOutcome::Warn(format!(
                "{} is a new instructor and not yet approved for {}",
                candidate.instructor, candidate.class_format
            ))
        } else {
            RuleOutcome::Allow
        }
    }
}
