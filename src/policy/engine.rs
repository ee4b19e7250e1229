//! Rule engine folding rule outcomes into a verdict.
//!
//! Rules run in registration order. A hard denial short-circuits; an
//! overridable outcome is held while the remaining rules run; warnings are
//! joined with `"; "`.

use std::sync::Arc;

use super::rules::standard_rules;
use super::{PolicyContext, PolicyRule, RuleOutcome, RunningState, Verdict};
use crate::config::PolicyConfig;
use crate::models::{ScheduledClassEntry, ViolationType};

/// One non-allow outcome, labelled with the rule that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleFinding {
    /// Rule name.
    pub rule: &'static str,
    /// Violation category for audits.
    pub violation_type: ViolationType,
    /// The outcome.
    pub outcome: RuleOutcome,
}

/// An ordered, composable set of policy rules bound to a configuration.
///
/// # Example
/// ```
/// use studio_schedule::config::PolicyConfig;
/// use studio_schedule::policy::PolicyEngine;
///
/// let engine = PolicyEngine::standard(PolicyConfig::default())
///     .without_rule("midday-band");
/// assert_eq!(engine.rule_names().len(), 11);
/// ```
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    rules: Vec<Arc<dyn PolicyRule>>,
    config: PolicyConfig,
}

impl PolicyEngine {
    /// Creates an engine with no rules.
    pub fn new(config: PolicyConfig) -> Self {
        Self {
            rules: Vec::new(),
            config,
        }
    }

    /// Creates an engine with the full rule set.
    pub fn standard(config: PolicyConfig) -> Self {
        Self {
            rules: standard_rules(),
            config,
        }
    }

    /// Appends a rule.
    pub fn with_rule<R: PolicyRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Removes every rule with the given name.
    pub fn without_rule(mut self, name: &str) -> Self {
        self.rules.retain(|r| r.name() != name);
        self
    }

    /// Configuration the rules consult.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Rule names in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Evaluates a candidate against `entries` with precomputed running totals.
    ///
    /// `state` must describe `entries` excluding any entry the candidate
    /// replaces; the assembler maintains it incrementally.
    pub fn evaluate(
        &self,
        entries: &[ScheduledClassEntry],
        candidate: &ScheduledClassEntry,
        state: &RunningState,
    ) -> Verdict {
        let context = PolicyContext::new(&self.config, entries, state);
        let mut warnings: Vec<String> = Vec::new();
        let mut held: Option<Verdict> = None;

        for rule in &self.rules {
            match rule.evaluate(candidate, &context) {
                RuleOutcome::Allow => {}
                RuleOutcome::Warn(message) => warnings.push(message),
                RuleOutcome::Overridable(message) => {
                    if held.is_none() {
                        held = Some(Verdict::overridable(rule.name(), message));
                    }
                }
                RuleOutcome::Deny(message) => return Verdict::deny(rule.name(), message),
            }
        }

        let warning = (!warnings.is_empty()).then(|| warnings.join("; "));
        held.unwrap_or_else(Verdict::accept).with_warning(warning)
    }

    /// Evaluates a candidate, rebuilding only its instructor's running state.
    pub fn check(&self, entries: &[ScheduledClassEntry], candidate: &ScheduledClassEntry) -> Verdict {
        let state = RunningState::for_instructor(
            entries.iter().filter(|e| e.id != candidate.id),
            &candidate.instructor,
        );
        self.evaluate(entries, candidate, &state)
    }

    /// Every non-allow outcome, without short-circuiting.
    pub fn findings(
        &self,
        entries: &[ScheduledClassEntry],
        candidate: &ScheduledClassEntry,
        state: &RunningState,
    ) -> Vec<RuleFinding> {
        let context = PolicyContext::new(&self.config, entries, state);
        self.rules
            .iter()
            .filter_map(|rule| match rule.evaluate(candidate, &context) {
                RuleOutcome::Allow => None,
                outcome => Some(RuleFinding {
                    rule: rule.name(),
                    violation_type: rule.violation_type(),
                    outcome,
                }),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClockTime, Instructor, Weekday};

    fn class(id: &str, day: Weekday, h: u16, teacher: &str) -> ScheduledClassEntry {
        ScheduledClassEntry::new(
            id,
            day,
            ClockTime::from_hm(h, 0),
            "Kenkere House",
            "Studio Mat 57",
            Instructor::from_full_name(teacher),
        )
    }

    /// 14h for `teacher` spread Monday to Saturday.
    fn heavy_week(teacher: &str) -> Vec<ScheduledClassEntry> {
        (0..14)
            .map(|i: usize| {
                class(
                    &format!("w{i}"),
                    Weekday::ALL[i % 6],
                    7 + 2 * (i / 6) as u16,
                    teacher,
                )
            })
            .collect()
    }

    #[test]
    fn test_accept_clean_candidate() {
        let engine = PolicyEngine::standard(PolicyConfig::default());
        let v = engine.check(&[], &class("c", Weekday::Monday, 9, "Rohan Mehta"));
        assert_eq!(v, Verdict::accept());
    }

    #[test]
    fn test_deny_short_circuits_with_first_failure() {
        let engine = PolicyEngine::standard(PolicyConfig::default());
        // inactive and in the midday band: inactive is reported
        let v = engine.check(&[], &class("c", Weekday::Monday, 13, "Saniya Patel"));
        assert!(v.is_hard_rejection());
        assert_eq!(v.rule, Some("active-instructor"));
    }

    #[test]
    fn test_overridable_weekly_cap() {
        let engine = PolicyEngine::standard(PolicyConfig::default());
        let mut existing = heavy_week("Rohan Mehta");
        existing.push(class("x", Weekday::Sunday, 8, "Rohan Mehta"));
        let v = engine.check(&existing, &class("c", Weekday::Sunday, 18, "Rohan Mehta"));
        assert!(!v.is_valid);
        assert!(v.can_override);
        assert_eq!(v.rule, Some("weekly-hour-cap"));
    }

    #[test]
    fn test_later_deny_beats_overridable() {
        let engine = PolicyEngine::standard(PolicyConfig::default());
        let mut existing = heavy_week("Rohan Mehta");
        existing.push(class("x", Weekday::Thursday, 18, "Rohan Mehta"));
        // recovery on Tuesday: weekly cap is overridable, rule 11 is not
        let mut c = class("c", Weekday::Tuesday, 18, "Rohan Mehta");
        c.class_format = "Studio Recovery".into();
        let v = engine.check(&existing, &c);
        assert!(v.is_hard_rejection());
        assert_eq!(v.rule, Some("early-week-recovery"));
    }

    #[test]
    fn test_warnings_joined() {
        let engine = PolicyEngine::standard(PolicyConfig::default());
        let existing: Vec<_> = (0..8)
            .map(|i: usize| class(&format!("k{i}"), Weekday::ALL[i % 6], 7 + 2 * (i / 6) as u16, "Kabir Arora"))
            .collect();
        let v = engine.check(&existing, &class("c", Weekday::Sunday, 9, "Kabir Arora"));
        assert!(v.is_valid);
        let warning = v.warning.unwrap();
        assert!(warning.contains("approaching 10h"));
        assert!(warning.contains("; "));
    }

    #[test]
    fn test_check_ignores_replaced_entry() {
        let engine = PolicyEngine::standard(PolicyConfig::default());
        let existing = vec![class("a", Weekday::Monday, 9, "Rohan Mehta")];
        let moved = class("a", Weekday::Monday, 9, "Rohan Mehta");
        assert!(engine.check(&existing, &moved).is_valid);
    }

    #[test]
    fn test_without_rule() {
        let engine = PolicyEngine::standard(PolicyConfig::default()).without_rule("midday-band");
        assert!(!engine.rule_names().contains(&"midday-band"));
        assert!(engine.check(&[], &class("c", Weekday::Monday, 16, "Rohan Mehta")).is_valid);
    }

    #[test]
    fn test_findings_collects_all() {
        let engine = PolicyEngine::standard(PolicyConfig::default());
        let c = class("c", Weekday::Monday, 13, "Saniya Patel");
        let findings = engine.findings(&[], &c, &RunningState::new());
        let rules: Vec<&str> = findings.iter().map(|f| f.rule).collect();
        assert_eq!(rules, ["active-instructor", "midday-band"]);
        assert_eq!(findings[1].violation_type, ViolationType::RestrictedTime);
    }

    #[test]
    fn test_empty_engine_accepts() {
        let engine = PolicyEngine::new(PolicyConfig::default());
        assert!(engine.check(&[], &class("c", Weekday::Monday, 13, "Saniya Patel")).is_valid);
    }
}
