//! Visit-day scheduling and solution reporting.
//!
//! [`Scheduler`] owns the configured grid, catalog, visitors and movement
//! rules, and runs the assignment model through a solver backend.
//!
//! # KPI
//!
//! [`SolutionSummary`] computes the per-rank summary row: objective gap,
//! requested-vs-actual matches, group usage, load spread, and counts of
//! legacy and external meetings.
//!
//! # Diagnostics
//!
//! [`InfeasibilityReport`] compares host and visitor capacity against the
//! minimums demanded by the run parameters.

mod diagnostics;
mod kpi;
mod visit;
mod warning;

pub use diagnostics::{CapacityDiagnosis, HostShortfall, InfeasibilityReport};
pub use kpi::SolutionSummary;
pub use visit::{Scheduler, SchedulerBuilder};
pub use warning::SchedulerWarning;
