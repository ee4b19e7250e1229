//! Incremental validation, audit, and repair of weekly schedules.
//!
//! - [`validate_input`]: structural checks on entries (duplicate IDs,
//!   missing identity fields, start times off the bookable grid)
//! - [`IncrementalValidator::validate`]: rule verdict for one candidate
//! - [`IncrementalValidator::commit`]: applies a verdict to a schedule under
//!   an explicit [`Acknowledgement`]
//! - [`IncrementalValidator::audit`]: every rule violation in a schedule
//! - [`IncrementalValidator::repair`]: replays a schedule and drops entries
//!   that no longer pass

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PolicyConfig;
use crate::error::{Error, Result};
use crate::models::{
    ScheduledClassEntry, Schedule, Violation, ViolationType, BUCKET_MINUTES, DAY_END, DAY_START,
};
use crate::policy::{PolicyEngine, RuleOutcome, RunningState};

pub use crate::policy::Verdict;

/// Validation result.
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entries share the same ID.
    DuplicateId,
    /// An entry has no instructor name.
    MissingInstructor,
    /// An entry has no location.
    MissingLocation,
    /// An entry has no class format.
    MissingFormat,
    /// Start time outside 07:00–20:45 or off the 15-minute grid.
    OffGridTime,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the structure of a set of entries.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(entries: &[ScheduledClassEntry]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for entry in entries {
        if !ids.insert(entry.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate entry ID: {}", entry.id),
            ));
        }
        if entry.instructor.full_name().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingInstructor,
                format!("Entry '{}' has no instructor", entry.id),
            ));
        }
        if entry.location.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingLocation,
                format!("Entry '{}' has no location", entry.id),
            ));
        }
        if entry.class_format.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingFormat,
                format!("Entry '{}' has no class format", entry.id),
            ));
        }
        if entry.time < DAY_START
            || entry.time > DAY_END
            || entry.time.minutes() % BUCKET_MINUTES != 0
        {
            errors.push(ValidationError::new(
                ValidationErrorKind::OffGridTime,
                format!("Entry '{}' starts at {}, outside the bookable grid", entry.id, entry.time),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// How far a caller agrees to go past a non-clean verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Acknowledgement {
    /// Only clean verdicts are applied.
    #[default]
    None,
    /// Verdicts carrying a warning are applied.
    AcceptWarnings,
    /// Overridable rejections (and warnings) are applied.
    ForceOverride,
}

/// Why an entry was dropped or flagged during repair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairNote {
    /// Affected entry.
    pub entry_id: String,
    /// Rule that failed.
    pub rule: Option<&'static str>,
    /// Rule message.
    pub reason: String,
}

/// Result of [`IncrementalValidator::repair`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Repair {
    /// Entries that pass, locked entries first.
    pub kept: Vec<ScheduledClassEntry>,
    /// Entries removed.
    pub dropped: Vec<ScheduledClassEntry>,
    /// One note per dropped entry, plus locked entries kept despite failing.
    pub notes: Vec<RepairNote>,
}

/// Validates edits against a schedule one candidate at a time.
///
/// # Example
///
/// ```
/// use studio_schedule::config::PolicyConfig;
/// use studio_schedule::models::{ClockTime, Instructor, Schedule, ScheduledClassEntry, Weekday};
/// use studio_schedule::validation::{Acknowledgement, IncrementalValidator};
///
/// let validator = IncrementalValidator::new(PolicyConfig::default());
/// let mut schedule = Schedule::new();
/// let class = ScheduledClassEntry::new(
///     "c1", Weekday::Monday, ClockTime::from_hm(18, 0),
///     "Kenkere House", "Studio Mat 57", Instructor::new("Rohan", "Mehta"),
/// );
/// let verdict = validator.commit(&mut schedule, class, Acknowledgement::None).unwrap();
/// assert!(verdict.is_valid);
/// assert_eq!(schedule.entry_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct IncrementalValidator {
    engine: PolicyEngine,
}

impl IncrementalValidator {
    /// Creates a validator with the standard rule set.
    pub fn new(config: PolicyConfig) -> Self {
        Self::with_engine(PolicyEngine::standard(config))
    }

    /// Creates a validator around a custom engine.
    pub fn with_engine(engine: PolicyEngine) -> Self {
        Self { engine }
    }

    /// Underlying rule engine.
    pub fn engine(&self) -> &PolicyEngine {
        &self.engine
    }

    /// Verdict for placing `candidate` into `existing`.
    ///
    /// An existing entry with the candidate's ID is treated as the entry
    /// being edited and ignored.
    pub fn validate(&self, existing: &[ScheduledClassEntry], candidate: &ScheduledClassEntry) -> Verdict {
        self.engine.check(existing, candidate)
    }

    /// Validates `candidate` and, if `ack` covers the verdict, adds it to
    /// `schedule` (replacing an entry with the same ID).
    ///
    /// # Errors
    /// [`Error::Rejected`] when the verdict needs more than `ack` allows.
    /// The schedule is unchanged in that case.
    pub fn commit(
        &self,
        schedule: &mut Schedule,
        candidate: ScheduledClassEntry,
        ack: Acknowledgement,
    ) -> Result<Verdict> {
        let verdict = self.validate(&schedule.entries, &candidate);

        let required = if verdict.is_hard_rejection() {
            None
        } else if !verdict.is_valid {
            Some(Acknowledgement::ForceOverride)
        } else if verdict.warning.is_some() {
            Some(Acknowledgement::AcceptWarnings)
        } else {
            Some(Acknowledgement::None)
        };

        match required {
            Some(needed) if ack >= needed => {
                if schedule.replace(candidate.clone()).is_none() {
                    schedule.add_entry(candidate);
                }
                Ok(verdict)
            }
            Some(_) => {
                let reason = verdict
                    .error
                    .clone()
                    .or_else(|| verdict.warning.clone())
                    .unwrap_or_default();
                debug!(id = %candidate.id, %reason, "Commit needs acknowledgement");
                Err(Error::Rejected {
                    reason,
                    overridable: true,
                })
            }
            None => {
                let reason = verdict.error.clone().unwrap_or_default();
                debug!(id = %candidate.id, %reason, "Commit refused");
                Err(Error::Rejected {
                    reason,
                    overridable: false,
                })
            }
        }
    }

    /// Every rule violation in `entries`.
    ///
    /// Each entry is checked against all the others; warnings are not
    /// violations. A conflict between two entries is reported for both.
    pub fn audit(&self, entries: &[ScheduledClassEntry]) -> Vec<Violation> {
        let mut violations = Vec::new();
        for entry in entries {
            let state = RunningState::for_instructor(
                entries.iter().filter(|e| e.id != entry.id),
                &entry.instructor,
            );
            for finding in self.engine.findings(entries, entry, &state) {
                let violation = match finding.outcome {
                    RuleOutcome::Allow | RuleOutcome::Warn(_) => continue,
                    RuleOutcome::Overridable(message) => Violation::weekly_cap(&entry.id, message),
                    RuleOutcome::Deny(message) => match finding.violation_type {
                        ViolationType::CapacityExceeded => {
                            Violation::capacity_exceeded(&entry.id, message)
                        }
                        other => Violation::new(other, &entry.id, message, 80),
                    },
                };
                violations.push(violation);
            }
        }
        violations
    }

    /// Audits `schedule` and records the result on it.
    pub fn audit_schedule(&self, schedule: &mut Schedule) {
        schedule.violations = self.audit(&schedule.entries);
    }

    /// Replays `entries`, locked ones first, keeping those that still pass.
    ///
    /// Locked entries are always kept, as are entries past the weekly cap
    /// that an override admitted; both are noted. Other failures are dropped.
    pub fn repair(&self, entries: &[ScheduledClassEntry]) -> Repair {
        let (locked, free): (Vec<_>, Vec<_>) = entries.iter().partition(|e| e.flags.locked);
        let mut kept: Vec<ScheduledClassEntry> = Vec::with_capacity(entries.len());
        let mut dropped = Vec::new();
        let mut notes = Vec::new();
        let mut state = RunningState::new();

        for entry in locked.into_iter().chain(free) {
            let verdict = self.engine.evaluate(&kept, entry, &state);
            if !verdict.is_valid {
                notes.push(RepairNote {
                    entry_id: entry.id.clone(),
                    rule: verdict.rule,
                    reason: verdict.error.unwrap_or_default(),
                });
                if entry.flags.locked {
                    warn!(id = %entry.id, "Locked entry violates policy");
                } else if verdict.can_override {
                    debug!(id = %entry.id, "Keeping overridden entry");
                } else {
                    dropped.push(entry.clone());
                    continue;
                }
            }
            state.record(entry);
            kept.push(entry.clone());
        }

        info!(kept = kept.len(), dropped = dropped.len(), "Schedule repaired");
        Repair {
            kept,
            dropped,
            notes,
        }
    }
}
