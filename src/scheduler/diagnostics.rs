//! Infeasibility diagnostics.
//!
//! When a solve ends without a feasible assignment, compares what both
//! sides could take at most against what the run parameters demand.

use std::fmt;

use crate::config::RunParams;
use crate::models::{Host, TerminationStatus, Visitor};

/// Hosts listed by name in the shortfall line.
const MAX_LISTED_HOSTS: usize = 6;

/// A host that cannot reach `min_visitors`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostShortfall {
    /// Host name.
    pub host: String,
    /// Most meetings the host can have.
    pub achievable: u64,
}

/// Capacity figures for an infeasible run.
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityDiagnosis {
    /// Termination of the failed solve.
    pub termination: TerminationStatus,
    /// Number of visitors.
    pub visitors: usize,
    /// Number of schedulable hosts.
    pub hosts: usize,
    /// Number of slots.
    pub number_of_slots: usize,
    /// Meetings visitors can attend in total.
    pub visitor_capacity: u64,
    /// Meetings hosts can hold in total.
    pub host_capacity: u64,
    /// Smaller of the two capacities.
    pub effective_capacity: u64,
    /// Meetings demanded by `min_meetings_per_visitor`.
    pub required_by_visitors: u64,
    /// Meetings demanded by `min_visitors`.
    pub required_by_hosts: u64,
    /// Hosts whose own capacity is below `min_visitors`.
    pub host_shortfalls: Vec<HostShortfall>,
}

impl CapacityDiagnosis {
    /// Computes the figures for the given hosts and visitors.
    pub fn analyze(
        hosts: &[&Host],
        visitors: &[Visitor],
        number_of_slots: usize,
        params: &RunParams,
        termination: TerminationStatus,
    ) -> Self {
        let max_group = u64::from(params.max_group);
        let max_visitors = u64::from(params.max_visitors);
        let min_visitors = u64::from(params.min_visitors);
        let n_hosts = hosts.len() as u64;
        let n_visitors = visitors.len() as u64;

        let mut host_capacity = 0;
        let mut host_shortfalls = Vec::new();
        for host in hosts {
            let by_slots = host.availability.len() as u64 * max_group;
            let achievable = by_slots.min(max_visitors).min(n_visitors);
            host_capacity += by_slots.min(max_visitors);
            if achievable < min_visitors {
                host_shortfalls.push(HostShortfall {
                    host: host.name.clone(),
                    achievable,
                });
            }
        }

        let mut visitor_capacity = 0;
        let mut required_by_visitors = 0;
        for visitor in visitors {
            let slots = visitor.available_slot_count(number_of_slots) as u64;
            visitor_capacity += slots.min(n_hosts);
            required_by_visitors += slots.min(u64::from(params.min_meetings_per_visitor));
        }

        Self {
            termination,
            visitors: visitors.len(),
            hosts: hosts.len(),
            number_of_slots,
            visitor_capacity,
            host_capacity,
            effective_capacity: visitor_capacity.min(host_capacity),
            required_by_visitors,
            required_by_hosts: min_visitors * n_hosts,
            host_shortfalls,
        }
    }

    /// Visitor minimums cannot all be met.
    pub fn visitor_minimum_exceeds_capacity(&self) -> bool {
        self.required_by_visitors > self.effective_capacity
    }

    /// Host minimums cannot all be met.
    pub fn host_minimum_exceeds_capacity(&self) -> bool {
        self.required_by_hosts > self.effective_capacity
    }
}

impl fmt::Display for CapacityDiagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Termination: {}, status: {}",
            self.termination,
            self.termination.solver_status()
        )?;
        writeln!(
            f,
            "Visitors: {}, Hosts (available): {}, Time slots: {}",
            self.visitors, self.hosts, self.number_of_slots
        )?;
        writeln!(
            f,
            "Capacity (visitors): {}, Capacity (hosts): {}, Effective capacity: {}",
            self.visitor_capacity, self.host_capacity, self.effective_capacity
        )?;
        writeln!(
            f,
            "Required meetings from visitors (min_meetings_per_visitor): {}",
            self.required_by_visitors
        )?;
        writeln!(
            f,
            "Required meetings from hosts (min_visitors): {}",
            self.required_by_hosts
        )?;
        if self.visitor_minimum_exceeds_capacity() {
            writeln!(
                f,
                "Infeasibility likely: min_meetings_per_visitor requirement exceeds total capacity."
            )?;
        }
        if self.host_minimum_exceeds_capacity() {
            writeln!(
                f,
                "Infeasibility likely: min_visitors requirement exceeds total capacity."
            )?;
        }
        if !self.host_shortfalls.is_empty() {
            writeln!(
                f,
                "Infeasibility likely: min_visitors exceeds achievable capacity for {} host(s).",
                self.host_shortfalls.len()
            )?;
            let mut listed: Vec<String> = self
                .host_shortfalls
                .iter()
                .take(MAX_LISTED_HOSTS)
                .map(|s| format!("{} (max {})", s.host, s.achievable))
                .collect();
            if self.host_shortfalls.len() > MAX_LISTED_HOSTS {
                listed.push("...".to_owned());
            }
            writeln!(
                f,
                "Hosts with insufficient availability for min_visitors: {}",
                listed.join(", ")
            )?;
        }
        write!(
            f,
            "Try reducing min_meetings_per_visitor or min_visitors, or widening availability."
        )
    }
}

/// Outcome explanation returned by `Scheduler::infeasibility_report`.
#[derive(Debug, Clone, PartialEq)]
pub enum InfeasibilityReport {
    /// Nothing has been solved yet.
    NotSolved,
    /// The last solve was feasible.
    Feasible(TerminationStatus),
    /// The last solve was not feasible.
    Infeasible(CapacityDiagnosis),
}

impl InfeasibilityReport {
    /// Whether this explains an infeasible run.
    pub fn is_infeasible(&self) -> bool {
        matches!(self, InfeasibilityReport::Infeasible(_))
    }
}

impl fmt::Display for InfeasibilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfeasibilityReport::NotSolved => f.write_str("No solver results available."),
            InfeasibilityReport::Feasible(t) => {
                write!(f, "Model is feasible (termination: {t}).")
            }
            InfeasibilityReport::Infeasible(d) => d.fmt(f),
        }
    }
}
