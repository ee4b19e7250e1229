//! External recommendation seam with local fallback.

use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::models::{HistoricClassRecord, ScheduledClassEntry};
use crate::scoring::ScoreFeed;

use super::assembler::{AssemblerConfig, Assembly, AssemblyOutcome, ScheduleAssembler};

/// An external schedule recommendation service.
///
/// Implementations may call out to a remote model; failures are reported
/// as [`crate::Error::Advisor`] and never abort planning.
pub trait ScheduleAdvisor {
    /// Provider name used in logs.
    fn name(&self) -> &str;

    /// Proposes a complete set of entries for the run described by `config`.
    fn recommend(
        &self,
        records: &[HistoricClassRecord],
        config: &AssemblerConfig,
    ) -> Result<Vec<ScheduledClassEntry>>;
}

/// Where a plan came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlanSource {
    /// The advisory service, by provider name.
    Advisor(String),
    /// The local greedy assembler.
    Local,
}

/// A planned schedule and its provenance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Planned entries.
    pub entries: Vec<ScheduledClassEntry>,
    /// Producer.
    pub source: PlanSource,
    /// Advisor entries dropped for naming an inactive instructor.
    pub filtered: usize,
    /// Outcome of the local pass, when it ran.
    pub outcome: Option<AssemblyOutcome>,
}

/// Plans a schedule, preferring `advisor` and falling back to the local
/// assembler when it is absent, fails, or proposes nothing usable.
pub fn plan_schedule(
    assembler: &ScheduleAssembler,
    records: &[HistoricClassRecord],
    feed: Option<&ScoreFeed>,
    advisor: Option<&dyn ScheduleAdvisor>,
) -> Plan {
    if let Some(advisor) = advisor {
        match advisor.recommend(records, assembler.config()) {
            Ok(proposed) => {
                let roster = &assembler.engine().config().roster;
                let total = proposed.len();
                let entries: Vec<_> = proposed
                    .into_iter()
                    .filter(|e| !roster.is_inactive(&e.instructor.full_name()))
                    .collect();
                let filtered = total - entries.len();
                if !entries.is_empty() {
                    info!(
                        provider = advisor.name(),
                        entries = entries.len(),
                        filtered,
                        "Using advisory schedule"
                    );
                    return Plan {
                        entries,
                        source: PlanSource::Advisor(advisor.name().to_string()),
                        filtered,
                        outcome: None,
                    };
                }
                warn!(provider = advisor.name(), "Advisory schedule was empty, using local assembler");
            }
            Err(e) => {
                warn!(provider = advisor.name(), error = %e, "Advisory service failed, using local assembler");
            }
        }
    }

    let Assembly {
        entries, outcome, ..
    } = assembler.assemble(records, feed);
    Plan {
        entries,
        source: PlanSource::Local,
        filtered: 0,
        outcome: Some(outcome),
    }
}
