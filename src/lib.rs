//! Weekly class scheduling for a multi-location fitness studio network.
//!
//! Turns historic class attendance into a weekly timetable that respects
//! studio capacity, instructor labor rules, and location format policies,
//! and validates manual edits against the same rules.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `ClockTime`, `Weekday`, `ScheduledClassEntry`,
//!   `Instructor`, `HistoricClassRecord`, `Roster`, `Schedule`
//! - **`config`**: Business policy (`PolicyConfig`), loadable from TOML
//! - **`occupancy`**: Per-bucket studio load and instructor adjacency
//! - **`policy`**: The rule set (`PolicyRule`) and its evaluation engine
//! - **`scoring`**: Historic performance aggregation and ranking
//! - **`scheduler`**: Greedy schedule assembly, advisory fallback, reports
//! - **`validation`**: Incremental validation, audit, and repair
//!
//! # Example
//!
//! ```
//! use studio_schedule::config::PolicyConfig;
//! use studio_schedule::models::HistoricClassRecord;
//! use studio_schedule::scheduler::{AssemblerConfig, ScheduleAssembler};
//! use studio_schedule::validation::IncrementalValidator;
//!
//! let history: Vec<_> = (0..3)
//!     .map(|_| HistoricClassRecord::new("Kwality House, Kemps Corner", "Tuesday", "18:00", "Studio Barre 57", "Anisha Shah")
//!         .with_checked_in(10.0)
//!         .with_revenue(5200.0))
//!     .collect();
//!
//! let policy = PolicyConfig::default();
//! let assembly = ScheduleAssembler::new(policy.clone(), AssemblerConfig::populate())
//!     .assemble(&history, None);
//! assert_eq!(assembly.added, 1);
//!
//! let audit = IncrementalValidator::new(policy).audit(&assembly.entries);
//! assert!(audit.is_empty());
//! ```
//!
//! # Logging
//!
//! Emits `tracing` events; installing a subscriber is left to the caller.

pub mod config;
pub mod error;
pub mod models;
pub mod occupancy;
pub mod policy;
pub mod scheduler;
pub mod scoring;
pub mod validation;

pub use error::{Error, Result};
