//! Business policy rules and the rule engine.
//!
//! Each rule is a stateless predicate over a candidate entry and a
//! [`PolicyContext`] (placed entries, running totals, configuration). The
//! [`PolicyEngine`] evaluates rules in a fixed order and folds their
//! outcomes into a [`Verdict`].
//!
//! # Usage
//!
//! ```
//! use studio_schedule::config::PolicyConfig;
//! use studio_schedule::models::{ClockTime, Instructor, ScheduledClassEntry, Weekday};
//! use studio_schedule::policy::PolicyEngine;
//!
//! let engine = PolicyEngine::standard(PolicyConfig::default());
//! let candidate = ScheduledClassEntry::new(
//!     "c1", Weekday::Monday, ClockTime::from_hm(16, 0),
//!     "Kenkere House", "Studio Mat 57", Instructor::new("Rohan", "Mehta"),
//! );
//!
//! let verdict = engine.check(&[], &candidate);
//! assert!(!verdict.is_valid);
//! assert!(!verdict.can_override);
//! ```
//!
//! # Outcome Precedence
//! A hard denial ends evaluation immediately. An overridable outcome is
//! remembered while later rules still run, so a hard denial further down
//! the list wins over it. Warnings accumulate.

mod context;
mod engine;
pub mod rules;

pub use context::{DayLoad, InstructorLoad, PolicyContext, RunningState, ShiftPattern};
pub use engine::{PolicyEngine, RuleFinding};

use serde::Serialize;
use std::fmt::Debug;

use crate::models::{ScheduledClassEntry, ViolationType};

/// Result of evaluating one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// Rule satisfied.
    Allow,
    /// Satisfied, with a message the caller should surface.
    Warn(String),
    /// Violated, but a human may force placement.
    Overridable(String),
    /// Violated unconditionally.
    Deny(String),
}

impl RuleOutcome {
    /// Whether the outcome blocks automatic placement.
    pub fn is_blocking(&self) -> bool {
        matches!(self, RuleOutcome::Overridable(_) | RuleOutcome::Deny(_))
    }

    /// Message attached to a non-allow outcome.
    pub fn message(&self) -> Option<&str> {
        match self {
            RuleOutcome::Allow => None,
            RuleOutcome::Warn(m) | RuleOutcome::Overridable(m) | RuleOutcome::Deny(m) => Some(m),
        }
    }
}

/// A business policy rule.
pub trait PolicyRule: Send + Sync + Debug {
    /// Rule name (e.g., "daily-class-limit").
    fn name(&self) -> &'static str;

    /// Evaluates a candidate against the context.
    fn evaluate(&self, candidate: &ScheduledClassEntry, context: &PolicyContext<'_>) -> RuleOutcome;

    /// Violation category reported by audits.
    fn violation_type(&self) -> ViolationType {
        ViolationType::Custom(self.name().to_string())
    }

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// Verdict on one candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// Whether the candidate may be placed without intervention.
    pub is_valid: bool,
    /// Reason for rejection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Non-blocking message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Whether an explicit override may admit a rejected candidate.
    pub can_override: bool,
    /// Name of the rule that rejected the candidate.
    #[serde(skip)]
    pub rule: Option<&'static str>,
}

impl Verdict {
    /// Unconditional acceptance.
    pub fn accept() -> Self {
        Self {
            is_valid: true,
            ..Default::default()
        }
    }

    /// Hard rejection by `rule`.
    pub fn deny(rule: &'static str, error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(error.into()),
            rule: Some(rule),
            ..Default::default()
        }
    }

    /// Overridable rejection by `rule`.
    pub fn overridable(rule: &'static str, error: impl Into<String>) -> Self {
        Self {
            can_override: true,
            ..Self::deny(rule, error)
        }
    }

    /// Attaches a warning.
    pub fn with_warning(mut self, warning: Option<String>) -> Self {
        self.warning = warning;
        self
    }

    /// Whether the verdict is a hard rejection.
    pub fn is_hard_rejection(&self) -> bool {
        !self.is_valid && !self.can_override
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_helpers() {
        assert!(!RuleOutcome::Allow.is_blocking());
        assert!(!RuleOutcome::Warn("w".into()).is_blocking());
        assert!(RuleOutcome::Overridable("o".into()).is_blocking());
        assert_eq!(RuleOutcome::Deny("d".into()).message(), Some("d"));
        assert_eq!(RuleOutcome::Allow.message(), None);
    }

    #[test]
    fn test_verdict_serializes_camel_case() {
        let v = Verdict::overridable("weekly-hour-cap", "16.0h exceeds 15h cap");
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["isValid"], false);
        assert_eq!(json["canOverride"], true);
        assert_eq!(json["error"], "16.0h exceeds 15h cap");
        assert!(json.get("warning").is_none());
        assert!(json.get("rule").is_none());

        let v = Verdict::accept().with_warning(Some("near cap".into()));
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["isValid"], true);
        assert_eq!(json["warning"], "near cap");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_verdict_kinds() {
        assert!(Verdict::deny("r", "no").is_hard_rejection());
        assert!(!Verdict::overridable("r", "maybe").is_hard_rejection());
        assert!(!Verdict::accept().is_hard_rejection());
    }
}
