//! Schedule assembly and reporting.
//!
//! Builds a weekly schedule greedily from ranked historic combinations and
//! summarizes the result.
//!
//! # Algorithm
//!
//! `ScheduleAssembler` is a greedy first-fit placer: candidates are tried
//! once in rank order and placed when every policy rule passes. It never
//! backtracks, so a strong early placement can block a later one. It is
//! not optimal, but is fast and predictable.
//!
//! # Modes
//!
//! - **Populate**: start from an empty week, place everything that fits.
//! - **Fill**: extend an existing week by at most a handful of classes,
//!   favouring instructors with fewer hours.
//!
//! An optional [`ScheduleAdvisor`] can propose a schedule instead; see
//! [`plan_schedule`].

mod advisor;
mod assembler;
mod report;

pub use advisor::{plan_schedule, Plan, PlanSource, ScheduleAdvisor};
pub use assembler::{
    AssemblerConfig, Assembly, AssemblyOutcome, EntryIdGenerator, OptimizationType,
    ScheduleAssembler,
};
pub use report::{
    class_format_counts, format_counts_for_day, teacher_hours, teacher_specialties,
    HoursShortfall, ScheduleReport, MAX_SPECIALTIES, SPECIALTY_THRESHOLD,
};
