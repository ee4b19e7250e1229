//! Instructor roster and tier classification.
//!
//! Instructors are classified into tiers that drive policy: inactive
//! instructors are never scheduled, new instructors have a lower weekly
//! cap and an approved format list, priority instructors have an hour
//! target. Anyone not on the roster is [`InstructorTier::Standard`].
//!
//! # Matching
//! Roster keys are normalized names. A lookup first tries the full
//! normalized name, then the first-name token alone, so a roster keyed by
//! first name (`"Kabir"`) matches `"Kabir Arora"` but not `"Kabirraj"`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::entry::{normalize_name, Instructor};

/// Instructor classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstructorTier {
    /// Regular instructor.
    #[default]
    Standard,
    /// Recently onboarded; reduced weekly cap and restricted formats.
    New,
    /// Preferred instructor with an hour target.
    Priority,
    /// Excluded from all scheduling.
    Inactive,
}

/// Lookup from instructor identity to tier.
///
/// # Examples
///
/// ```
/// use studio_schedule::models::{InstructorTier, Roster};
///
/// let roster = Roster::new()
///     .with_tier("Kabir", InstructorTier::New)
///     .with_tier("Saniya", InstructorTier::Inactive);
///
/// assert_eq!(roster.tier("Kabir Arora"), InstructorTier::New);
/// assert!(roster.is_inactive("saniya"));
/// assert_eq!(roster.tier("Kabirraj Menon"), InstructorTier::Standard);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, InstructorTier>", into = "BTreeMap<String, InstructorTier>")]
pub struct Roster {
    tiers: BTreeMap<String, InstructorTier>,
}

impl Roster {
    /// Creates an empty roster (everyone is standard).
    pub fn new() -> Self {
        Self::default()
    }

    /// Roster used by the studio network out of the box.
    pub fn studio_default() -> Self {
        let priority = [
            "Anisha", "Vivaran", "Mrigakshi", "Pranjali", "Atulan", "Cauveri", "Rohan", "Reshma",
            "Richard", "Karanvir",
        ];
        let new = ["Kabir", "Simonelle", "Karan"];
        let inactive = ["Nishanth", "Saniya"];

        let mut roster = Self::new();
        for name in priority {
            roster.set(name, InstructorTier::Priority);
        }
        for name in new {
            roster.set(name, InstructorTier::New);
        }
        for name in inactive {
            roster.set(name, InstructorTier::Inactive);
        }
        roster
    }

    /// Adds or replaces an instructor's tier.
    pub fn with_tier(mut self, name: &str, tier: InstructorTier) -> Self {
        self.set(name, tier);
        self
    }

    /// Sets an instructor's tier in place.
    pub fn set(&mut self, name: &str, tier: InstructorTier) {
        let key = normalize_name(name);
        if !key.is_empty() {
            self.tiers.insert(key, tier);
        }
    }

    /// Tier for a display name.
    pub fn tier(&self, name: &str) -> InstructorTier {
        let key = normalize_name(name);
        if let Some(tier) = self.tiers.get(&key) {
            return *tier;
        }
        key.split(' ')
            .next()
            .and_then(|first| self.tiers.get(first))
            .copied()
            .unwrap_or_default()
    }

    /// Tier for an instructor.
    pub fn tier_of(&self, instructor: &Instructor) -> InstructorTier {
        self.tier(&instructor.full_name())
    }

    /// Whether the instructor is excluded from scheduling.
    pub fn is_inactive(&self, name: &str) -> bool {
        self.tier(name) == InstructorTier::Inactive
    }

    /// Whether the instructor is on the new-instructor tier.
    pub fn is_new(&self, name: &str) -> bool {
        self.tier(name) == InstructorTier::New
    }

    /// Roster keys with the given tier.
    pub fn names_with_tier(&self, tier: InstructorTier) -> Vec<&str> {
        self.tiers
            .iter()
            .filter(|(_, t)| **t == tier)
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Number of roster entries.
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

impl From<BTreeMap<String, InstructorTier>> for Roster {
    fn from(map: BTreeMap<String, InstructorTier>) -> Self {
        let mut roster = Self::new();
        for (name, tier) in map {
            roster.set(&name, tier);
        }
        roster
    }
}

impl From<Roster> for BTreeMap<String, InstructorTier> {
    fn from(roster: Roster) -> Self {
        roster.tiers
    }
}
