//! Greedy schedule assembler.
//!
//! # Algorithm
//!
//! `INIT → SCORING → PLACEMENT_LOOP → DONE`
//!
//! 1. INIT: seed entries (fill mode) or empty (populate mode); running
//!    state is derived from the seed.
//! 2. SCORING: rank combinations with the strict scorer (loose when
//!    `strict_top_classes_only` is off). No combinations ends the pass with
//!    [`AssemblyOutcome::NoQualifyingCombinations`].
//! 3. PLACEMENT_LOOP: for each combination in rank order, build an entry
//!    (duration from the format name), evaluate every policy rule, place it
//!    on a clean pass, skip it otherwise. A start slot already holding a
//!    class is skipped. Skipped candidates are never revisited.
//! 4. DONE: return the accumulated entries.
//!
//! Fill mode stops after `fill_quota` additions, skips instructors within
//! `fill_hours_buffer` of their cap, and (with `optimize_teacher_hours`)
//! orders equally ranked candidates by the instructor's current hours.
//!
//! # Complexity
//! O(c * n) rule work where c = combinations, n = placed entries.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::PolicyConfig;
use crate::models::{
    normalize_name, ClockTime, HistoricClassRecord, ScheduledClassEntry, Shift, Weekday,
};
use crate::policy::{PolicyEngine, RunningState, ShiftPattern};
use crate::scoring::{PerformanceScorer, RankedCombination, ScoreFeed};

/// Objective hint forwarded to an advisory service. The local algorithm
/// ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationType {
    /// Favor revenue.
    Revenue,
    /// Favor attendance.
    Attendance,
    /// Weigh both.
    #[default]
    Balanced,
}

/// Per-run assembly flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssemblerConfig {
    /// Flag placed entries from top-performing combinations.
    pub prioritize_top_performers: bool,
    /// Skip candidates that would give an instructor both a morning and an
    /// evening class on one day.
    pub balance_shifts: bool,
    /// Order equally ranked fill-mode candidates by instructor hours.
    pub optimize_teacher_hours: bool,
    /// Enforce the midday band.
    pub respect_time_restrictions: bool,
    /// Advisory hint only.
    pub minimize_trainers_per_shift: bool,
    /// Advisory hint only.
    pub optimization_type: OptimizationType,
    /// Seeds entry ID generation.
    pub iteration: u64,
    /// Restrict candidates to one day.
    pub target_day: Option<Weekday>,
    /// Override the standard weekly cap.
    pub target_teacher_hours: Option<f64>,
    /// Fill mode: extend `existing_schedule` instead of building from empty.
    pub fill_empty_slots_only: bool,
    /// Seed entries for fill mode.
    pub existing_schedule: Vec<ScheduledClassEntry>,
    /// Use the strict scorer.
    pub strict_top_classes_only: bool,
    /// Instructors never given new classes.
    pub locked_instructors: Vec<String>,
    /// Maximum additions in fill mode.
    pub fill_quota: usize,
    /// Fill mode skips instructors with at least `cap - fill_hours_buffer` hours.
    pub fill_hours_buffer: f64,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            prioritize_top_performers: true,
            balance_shifts: false,
            optimize_teacher_hours: true,
            respect_time_restrictions: true,
            minimize_trainers_per_shift: false,
            optimization_type: OptimizationType::Balanced,
            iteration: 0,
            target_day: None,
            target_teacher_hours: None,
            fill_empty_slots_only: false,
            existing_schedule: Vec::new(),
            strict_top_classes_only: true,
            locked_instructors: Vec::new(),
            fill_quota: 5,
            fill_hours_buffer: 0.5,
        }
    }
}

impl AssemblerConfig {
    /// Populate-mode configuration.
    pub fn populate() -> Self {
        Self::default()
    }

    /// Fill-mode configuration seeded with `existing`.
    pub fn fill(existing: Vec<ScheduledClassEntry>) -> Self {
        Self {
            fill_empty_slots_only: true,
            existing_schedule: existing,
            ..Self::default()
        }
    }

    /// Sets the iteration counter.
    pub fn with_iteration(mut self, iteration: u64) -> Self {
        self.iteration = iteration;
        self
    }

    /// Restricts candidates to one day.
    pub fn with_target_day(mut self, day: Weekday) -> Self {
        self.target_day = Some(day);
        self
    }

    /// Overrides the standard weekly cap.
    pub fn with_target_teacher_hours(mut self, hours: f64) -> Self {
        self.target_teacher_hours = Some(hours);
        self
    }

    /// Enables or disables shift balancing.
    pub fn with_balance_shifts(mut self, on: bool) -> Self {
        self.balance_shifts = on;
        self
    }

    /// Enables or disables the midday band.
    pub fn with_time_restrictions(mut self, on: bool) -> Self {
        self.respect_time_restrictions = on;
        self
    }

    /// Switches between the strict and loose scorer.
    pub fn with_strict_top_classes(mut self, on: bool) -> Self {
        self.strict_top_classes_only = on;
        self
    }

    /// Enables or disables fill-mode load balancing.
    pub fn with_optimize_teacher_hours(mut self, on: bool) -> Self {
        self.optimize_teacher_hours = on;
        self
    }

    /// Adds a locked instructor.
    pub fn with_locked_instructor(mut self, name: impl Into<String>) -> Self {
        self.locked_instructors.push(name.into());
        self
    }

    /// Sets the advisory objective.
    pub fn with_optimization_type(mut self, optimization_type: OptimizationType) -> Self {
        self.optimization_type = optimization_type;
        self
    }

    fn is_fill(&self) -> bool {
        self.fill_empty_slots_only
    }
}

/// How an assembly pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AssemblyOutcome {
    /// Ranked candidates were processed.
    Completed,
    /// Nothing cleared the scoring filter; entries are the seed unchanged.
    NoQualifyingCombinations,
}

/// Result of an assembly pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assembly {
    /// Seed entries followed by placed entries.
    pub entries: Vec<ScheduledClassEntry>,
    /// Entries placed in this pass.
    pub added: usize,
    /// Candidates skipped by a filter or rule.
    pub skipped: usize,
    /// Terminal state.
    pub outcome: AssemblyOutcome,
}

/// Deterministic entry ID source.
///
/// IDs have the form `{prefix}-{iteration}-{seq}-{salt}` where the salt
/// comes from a generator seeded with the iteration. Reserved IDs are
/// never produced.
#[derive(Debug, Clone)]
pub struct EntryIdGenerator {
    prefix: String,
    iteration: u64,
    seq: usize,
    rng: StdRng,
    reserved: HashSet<String>,
}

impl EntryIdGenerator {
    /// Creates a generator.
    pub fn new(prefix: impl Into<String>, iteration: u64) -> Self {
        Self {
            prefix: prefix.into(),
            iteration,
            seq: 0,
            rng: StdRng::seed_from_u64(iteration),
            reserved: HashSet::new(),
        }
    }

    /// Marks IDs already in use, typically those of a seed schedule.
    pub fn with_reserved<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Next unique ID.
    pub fn next_id(&mut self) -> String {
        loop {
            let salt: u32 = self.rng.random();
            let id = format!("{}-{}-{}-{salt:08x}", self.prefix, self.iteration, self.seq);
            self.seq += 1;
            if self.reserved.insert(id.clone()) {
                return id;
            }
        }
    }
}

/// Builds or extends a weekly schedule from historic performance.
///
/// # Example
///
/// ```
/// use studio_schedule::config::PolicyConfig;
/// use studio_schedule::models::HistoricClassRecord;
/// use studio_schedule::scheduler::{AssemblerConfig, AssemblyOutcome, ScheduleAssembler};
///
/// let history: Vec<_> = (0..2)
///     .map(|_| HistoricClassRecord::new("Kenkere House", "Monday", "07:30", "Studio Mat 57", "Rohan Mehta")
///         .with_checked_in(9.0))
///     .collect();
///
/// let assembler = ScheduleAssembler::new(PolicyConfig::default(), AssemblerConfig::populate());
/// let assembly = assembler.assemble(&history, None);
/// assert_eq!(assembly.outcome, AssemblyOutcome::Completed);
/// assert_eq!(assembly.entries.len(), 1);
/// assert!(assembly.entries[0].flags.top_performer);
/// ```
#[derive(Debug, Clone)]
pub struct ScheduleAssembler {
    engine: PolicyEngine,
    config: AssemblerConfig,
}

impl ScheduleAssembler {
    /// Creates an assembler; run flags adjust the policy where they apply.
    pub fn new(mut policy: PolicyConfig, config: AssemblerConfig) -> Self {
        if let Some(hours) = config.target_teacher_hours {
            policy.standard_weekly_cap = hours;
        }
        let mut engine = PolicyEngine::standard(policy);
        if !config.respect_time_restrictions {
            engine = engine.without_rule("midday-band");
        }
        Self { engine, config }
    }

    /// Rule engine used for placement.
    pub fn engine(&self) -> &PolicyEngine {
        &self.engine
    }

    /// Run flags.
    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Scores `records` and places the ranked combinations.
    pub fn assemble(&self, records: &[HistoricClassRecord], feed: Option<&ScoreFeed>) -> Assembly {
        let roster = self.engine.config().roster.clone();
        let scorer = if self.config.strict_top_classes_only {
            PerformanceScorer::strict(roster)
        } else {
            PerformanceScorer::loose(roster)
        };
        info!(
            fill = self.config.is_fill(),
            strict = self.config.strict_top_classes_only,
            iteration = self.config.iteration,
            records = records.len(),
            "Scoring historic classes"
        );
        let ranked = scorer.score(records, feed);
        self.place(ranked)
    }

    /// Places already ranked combinations in order.
    pub fn place(&self, ranked: Vec<RankedCombination>) -> Assembly {
        let seed = if self.config.is_fill() {
            self.config.existing_schedule.clone()
        } else {
            Vec::new()
        };

        if ranked.is_empty() {
            warn!(seed = seed.len(), "No class combinations qualified for placement");
            return Assembly {
                entries: seed,
                added: 0,
                skipped: 0,
                outcome: AssemblyOutcome::NoQualifyingCombinations,
            };
        }

        let mut state = RunningState::from_entries(&seed);
        let locked_instructors = self.locked_instructors(&seed);
        // one class per start slot; locked seed entries are covered here too
        let mut filled_slots: HashSet<(String, Weekday, ClockTime)> = seed
            .iter()
            .map(|e| (e.location.trim().to_string(), e.day, e.time))
            .collect();

        let mut candidates: Vec<RankedCombination> = ranked
            .into_iter()
            .filter(|c| self.config.target_day.map_or(true, |d| c.day == d))
            .collect();
        if self.config.is_fill() && self.config.optimize_teacher_hours {
            balance_load(&mut candidates, &state);
        }

        let prefix = match (self.config.is_fill(), self.config.strict_top_classes_only) {
            (true, _) => "fill",
            (false, true) => "strict-top",
            (false, false) => "top",
        };
        let mut ids = EntryIdGenerator::new(prefix, self.config.iteration)
            .with_reserved(seed.iter().map(|e| e.id.clone()));
        let mut entries = seed;
        let mut added = 0;
        let mut skipped = 0;

        for combo in candidates {
            if self.config.is_fill() && added >= self.config.fill_quota {
                debug!(quota = self.config.fill_quota, "Fill quota reached");
                break;
            }
            if locked_instructors.contains(&combo.instructor.key()) {
                debug!(instructor = %combo.instructor, day = %combo.day, time = %combo.time, "Skipping locked instructor");
                skipped += 1;
                continue;
            }
            let slot = (combo.location.trim().to_string(), combo.day, combo.time);
            if filled_slots.contains(&slot) {
                debug!(location = %combo.location, day = %combo.day, time = %combo.time, "Skipping filled slot");
                skipped += 1;
                continue;
            }
            if self.config.is_fill() {
                let cap = self.engine.config().weekly_cap(&combo.instructor);
                if state.weekly_hours(&combo.instructor) >= cap - self.config.fill_hours_buffer {
                    debug!(instructor = %combo.instructor, "Skipping instructor near weekly cap");
                    skipped += 1;
                    continue;
                }
            }

            let candidate = self.entry_for(&combo, ids.next_id());
            if self.config.balance_shifts && splits_shift(&state, &candidate) {
                debug!(instructor = %combo.instructor, day = %combo.day, "Skipping split shift");
                skipped += 1;
                continue;
            }

            let verdict = self.engine.evaluate(&entries, &candidate, &state);
            if !verdict.is_valid {
                debug!(
                    format = %candidate.class_format,
                    location = %candidate.location,
                    day = %candidate.day,
                    time = %candidate.time,
                    rule = verdict.rule.unwrap_or_default(),
                    "Candidate rejected"
                );
                skipped += 1;
                continue;
            }

            state.record(&candidate);
            filled_slots.insert(slot);
            entries.push(candidate);
            added += 1;
        }

        info!(added, skipped, total = entries.len(), "Schedule assembly finished");
        Assembly {
            entries,
            added,
            skipped,
            outcome: AssemblyOutcome::Completed,
        }
    }

    fn entry_for(&self, combo: &RankedCombination, id: String) -> ScheduledClassEntry {
        let entry = ScheduledClassEntry::new(
            id,
            combo.day,
            combo.time,
            combo.location.clone(),
            combo.class_format.clone(),
            combo.instructor.clone(),
        )
        .with_expectations(combo.expected_participants(), combo.expected_revenue());
        if self.config.prioritize_top_performers && combo.is_top_performer() {
            entry.top_performer()
        } else {
            entry
        }
    }

    fn locked_instructors(&self, seed: &[ScheduledClassEntry]) -> HashSet<String> {
        self.config
            .locked_instructors
            .iter()
            .map(|name| normalize_name(name))
            .chain(seed.iter().filter(|e| e.flags.locked).map(|e| e.instructor.key()))
            .collect()
    }
}

/// Whether placing `candidate` would turn a single-shift day into a mixed one.
fn splits_shift(state: &RunningState, candidate: &ScheduledClassEntry) -> bool {
    let current = state.shift_pattern(&candidate.instructor, candidate.day);
    current != ShiftPattern::Mixed && current.with(Shift::of(candidate.time)) == ShiftPattern::Mixed
}

/// Within runs of equally ranked candidates, puts less-loaded instructors first.
fn balance_load(candidates: &mut [RankedCombination], state: &RunningState) {
    let same_rank = |a: &RankedCombination, b: &RankedCombination| {
        a.adjusted_score == b.adjusted_score && a.avg_checked_in == b.avg_checked_in
    };
    let mut start = 0;
    while start < candidates.len() {
        let mut end = start + 1;
        while end < candidates.len() && same_rank(&candidates[start], &candidates[end]) {
            end += 1;
        }
        candidates[start..end].sort_by(|a, b| {
            state
                .weekly_hours(&a.instructor)
                .total_cmp(&state.weekly_hours(&b.instructor))
        });
        start = end;
    }
}
