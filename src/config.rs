//! Policy configuration.
//!
//! Every business constant the rule set consults lives here: studio counts
//! and Sunday limits per location, format rules, hour caps, daily limits,
//! and the instructor roster. [`PolicyConfig::default`] reproduces the
//! studio network's standing policy; a TOML document may override any
//! subset of it.
//!
//! ```
//! use studio_schedule::config::PolicyConfig;
//!
//! let config = PolicyConfig::from_toml_str(r#"
//!     standard_weekly_cap = 12.0
//!     max_daily_classes = 3
//! "#).unwrap();
//!
//! assert_eq!(config.standard_weekly_cap, 12.0);
//! assert_eq!(config.max_daily_classes, 3);
//! // untouched fields keep their defaults
//! assert_eq!(config.capacity_at("Supreme HQ, Bandra"), 3);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Instructor, InstructorTier, Roster};

/// Which class formats a location accepts, by cycle/non-cycle family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatRule {
    /// Only cycle formats.
    CycleOnly,
    /// Anything except cycle formats.
    #[default]
    NoCycle,
    /// No family restriction (deny list still applies).
    Any,
}

/// Per-location policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPolicy {
    /// Location name as it appears in entries and historic rows.
    pub name: String,
    /// Number of parallel studios.
    pub studios: usize,
    /// Maximum entries on Sunday.
    pub sunday_limit: usize,
    /// Format family rule.
    #[serde(default)]
    pub format_rule: FormatRule,
    /// Lowercase substrings of forbidden format labels.
    #[serde(default)]
    pub deny: Vec<String>,
}

impl LocationPolicy {
    /// Creates a location policy with no deny list.
    pub fn new(
        name: impl Into<String>,
        studios: usize,
        sunday_limit: usize,
        format_rule: FormatRule,
    ) -> Self {
        Self {
            name: name.into(),
            studios,
            sunday_limit,
            format_rule,
            deny: Vec::new(),
        }
    }

    /// Adds forbidden format substrings.
    pub fn with_deny(mut self, patterns: &[&str]) -> Self {
        self.deny
            .extend(patterns.iter().map(|p| p.to_lowercase()));
        self
    }
}

/// Business policy consulted by the rule set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Known locations.
    pub locations: Vec<LocationPolicy>,
    /// Studios at an unknown location.
    pub default_studios: usize,
    /// Sunday limit at an unknown location.
    pub default_sunday_limit: usize,
    /// Format rule at an unknown location.
    pub default_format_rule: FormatRule,
    /// Lowercase substrings identifying cycle formats.
    pub cycle_markers: Vec<String>,
    /// Instructor tiers.
    pub roster: Roster,
    /// Weekly hour cap for standard and priority instructors.
    pub standard_weekly_cap: f64,
    /// Weekly hour cap for new instructors.
    pub new_weekly_cap: f64,
    /// Hours below the cap at which a warning is raised.
    pub cap_warning_margin: f64,
    /// Maximum classes per instructor per day.
    pub max_daily_classes: usize,
    /// Maximum hours per instructor per day.
    pub max_daily_hours: f64,
    /// Maximum back-to-back classes.
    pub max_consecutive: usize,
    /// Gap (minutes) still counted as back to back.
    pub adjacency_tolerance_minutes: u16,
    /// Formats approved for new instructors.
    pub new_instructor_formats: Vec<String>,
    /// Weekly hour target for priority instructors.
    pub priority_target_hours: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            locations: vec![
                LocationPolicy::new("Kwality House, Kemps Corner", 2, 5, FormatRule::NoCycle),
                LocationPolicy::new("Supreme HQ, Bandra", 3, 7, FormatRule::CycleOnly)
                    .with_deny(&["hiit", "amped up"]),
                LocationPolicy::new("Kenkere House", 2, 6, FormatRule::NoCycle),
            ],
            default_studios: 1,
            default_sunday_limit: 6,
            default_format_rule: FormatRule::NoCycle,
            cycle_markers: vec!["powercycle".into(), "power cycle".into()],
            roster: Roster::studio_default(),
            standard_weekly_cap: 15.0,
            new_weekly_cap: 10.0,
            cap_warning_margin: 2.0,
            max_daily_classes: 4,
            max_daily_hours: 4.0,
            max_consecutive: 2,
            adjacency_tolerance_minutes: 15,
            new_instructor_formats: vec![
                "Studio Barre 57".into(),
                "Studio Barre 57 (Express)".into(),
                "Studio powerCycle".into(),
                "Studio powerCycle (Express)".into(),
                "Studio Cardio Barre".into(),
            ],
            priority_target_hours: 15.0,
        }
    }
}

impl PolicyConfig {
    /// Parses a TOML document; missing fields take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Replaces the roster.
    pub fn with_roster(mut self, roster: Roster) -> Self {
        self.roster = roster;
        self
    }

    /// Overrides the standard weekly cap.
    pub fn with_standard_weekly_cap(mut self, hours: f64) -> Self {
        self.standard_weekly_cap = hours;
        self
    }

    /// Overrides the new-instructor weekly cap.
    pub fn with_new_weekly_cap(mut self, hours: f64) -> Self {
        self.new_weekly_cap = hours;
        self
    }

    /// Adds or replaces a location policy.
    pub fn with_location(mut self, policy: LocationPolicy) -> Self {
        self.locations.retain(|l| !same_location(&l.name, &policy.name));
        self.locations.push(policy);
        self
    }

    /// Overrides the priority hour target.
    pub fn with_priority_target(mut self, hours: f64) -> Self {
        self.priority_target_hours = hours;
        self
    }

    /// Policy for a known location.
    pub fn location(&self, name: &str) -> Option<&LocationPolicy> {
        self.locations.iter().find(|l| same_location(&l.name, name))
    }

    /// Parallel studios at a location (unknown locations get the default).
    pub fn capacity_at(&self, location: &str) -> usize {
        self.location(location)
            .map_or(self.default_studios, |l| l.studios)
    }

    /// Sunday entry limit at a location.
    pub fn sunday_limit(&self, location: &str) -> usize {
        self.location(location)
            .map_or(self.default_sunday_limit, |l| l.sunday_limit)
    }

    /// Whether a format label belongs to the cycle family.
    pub fn is_cycle_format(&self, class_format: &str) -> bool {
        let lower = class_format.to_lowercase();
        self.cycle_markers.iter().any(|m| lower.contains(m.as_str()))
    }

    /// Whether a format may run at a location.
    pub fn is_format_allowed(&self, class_format: &str, location: &str) -> bool {
        let lower = class_format.to_lowercase();
        let (rule, deny) = match self.location(location) {
            Some(l) => (l.format_rule, l.deny.as_slice()),
            None => (self.default_format_rule, &[][..]),
        };
        if deny.iter().any(|d| lower.contains(d.as_str())) {
            return false;
        }
        match rule {
            FormatRule::CycleOnly => self.is_cycle_format(class_format),
            FormatRule::NoCycle => !self.is_cycle_format(class_format),
            FormatRule::Any => true,
        }
    }

    /// Tier of an instructor.
    pub fn tier_of(&self, instructor: &Instructor) -> InstructorTier {
        self.roster.tier_of(instructor)
    }

    /// Weekly hour cap applicable to an instructor.
    pub fn weekly_cap(&self, instructor: &Instructor) -> f64 {
        match self.tier_of(instructor) {
            InstructorTier::New => self.new_weekly_cap,
            _ => self.standard_weekly_cap,
        }
    }

    /// Whether a format is on the new-instructor approved list.
    pub fn is_new_instructor_format(&self, class_format: &str) -> bool {
        self.new_instructor_formats
            .iter()
            .any(|f| f.eq_ignore_ascii_case(class_format.trim()))
    }
}

fn same_location(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacities() {
        let c = PolicyConfig::default();
        assert_eq!(c.capacity_at("Kwality House, Kemps Corner"), 2);
        assert_eq!(c.capacity_at("Supreme HQ, Bandra"), 3);
        assert_eq!(c.capacity_at("kenkere house"), 2);
        assert_eq!(c.capacity_at("Pop-up Rooftop"), 1);
    }

    #[test]
    fn test_default_sunday_limits() {
        let c = PolicyConfig::default();
        assert_eq!(c.sunday_limit("Kwality House, Kemps Corner"), 5);
        assert_eq!(c.sunday_limit("Supreme HQ, Bandra"), 7);
        assert_eq!(c.sunday_limit("Kenkere House"), 6);
        assert_eq!(c.sunday_limit("Elsewhere"), 6);
    }

    #[test]
    fn test_format_rules() {
        let c = PolicyConfig::default();
        let supreme = "Supreme HQ, Bandra";
        assert!(c.is_format_allowed("Studio powerCycle", supreme));
        assert!(c.is_format_allowed("Studio Power Cycle (Express)", supreme));
        assert!(!c.is_format_allowed("Studio Barre 57", supreme));
        assert!(!c.is_format_allowed("Studio HIIT", supreme));

        assert!(c.is_format_allowed("Studio Barre 57", "Kenkere House"));
        assert!(!c.is_format_allowed("Studio powerCycle", "Kenkere House"));
        assert!(!c.is_format_allowed("Studio powerCycle", "Unknown Studio"));
    }

    #[test]
    fn test_weekly_caps_by_tier() {
        let c = PolicyConfig::default();
        assert_eq!(c.weekly_cap(&Instructor::new("Kabir", "Arora")), 10.0);
        assert_eq!(c.weekly_cap(&Instructor::new("Anisha", "Shah")), 15.0);
        let c = c.with_standard_weekly_cap(12.0);
        assert_eq!(c.weekly_cap(&Instructor::new("Someone", "Else")), 12.0);
    }

    #[test]
    fn test_new_instructor_formats() {
        let c = PolicyConfig::default();
        assert!(c.is_new_instructor_format("studio barre 57"));
        assert!(!c.is_new_instructor_format("Studio Mat 57"));
    }

    #[test]
    fn test_from_toml_overrides() {
        let src = r#"
            new_weekly_cap = 8.0

            [[locations]]
            name = "Rooftop"
            studios = 1
            sunday_limit = 2
            format_rule = "any"
            deny = ["aqua"]

            [roster]
            "Meera" = "inactive"
        "#;
        let c = PolicyConfig::from_toml_str(src).unwrap();
        assert_eq!(c.new_weekly_cap, 8.0);
        assert_eq!(c.locations.len(), 1);
        assert_eq!(c.capacity_at("Rooftop"), 1);
        assert!(c.is_format_allowed("Studio powerCycle", "Rooftop"));
        assert!(!c.is_format_allowed("Aqua Flow", "Rooftop"));
        assert!(c.roster.is_inactive("Meera Rao"));
        assert_eq!(c.max_daily_classes, 4);
    }

    #[test]
    fn test_from_toml_invalid() {
        let err = PolicyConfig::from_toml_str("max_daily_classes = \"many\"").unwrap_err();
        assert!(err.to_string().starts_with("invalid policy configuration"));
    }

    #[test]
    fn test_with_location_replaces() {
        let c = PolicyConfig::default()
            .with_location(LocationPolicy::new("Kenkere House", 4, 8, FormatRule::Any));
        assert_eq!(c.capacity_at("Kenkere House"), 4);
        assert_eq!(c.locations.len(), 3);
    }
}
