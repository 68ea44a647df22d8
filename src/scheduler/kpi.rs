//! Solution quality metrics.
//!
//! Computes the summary row reported for each ranked solution.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Gap from best | `best objective - objective` (0 for rank 1) |
//! | Requested assignments | Meetings with a host the visitor asked for |
//! | Weighted preference sum | Sum of utility weights over all meetings |
//! | Group / one-on-one slots | Occupied (host, slot) pairs with >1 / exactly 1 visitor |
//! | Visitor / host load | Meetings per visitor / host: min, mean, max |
//! | Legacy / external assignments | Meetings with hosts of that status |

use serde::{Deserialize, Serialize};

use crate::models::{HostStatus, Solution, TerminationStatus};

/// Summary statistics of one solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionSummary {
    /// 1-based rank.
    pub rank: usize,
    /// Objective value.
    pub objective_value: f64,
    /// Distance below the best objective of the run.
    pub objective_gap_from_best: f64,
    /// Termination status.
    pub termination: TerminationStatus,
    /// Coarse status label (`ok` / `warning`).
    pub solver_status: String,
    /// Total meetings.
    pub num_assignments: usize,
    /// Meetings matching a visitor request.
    pub num_requested_assignments: usize,
    /// Sum of utility weights of all meetings.
    pub weighted_preference_sum: f64,
    /// (host, slot) pairs with more than one visitor.
    pub num_group_slots: usize,
    /// (host, slot) pairs with exactly one visitor.
    pub num_one_on_one_slots: usize,
    /// Largest group.
    pub max_group_size: usize,
    /// Visitors with at least one meeting.
    pub num_visitors_scheduled: usize,
    /// Fewest meetings of any visitor.
    pub min_visitor_meetings: usize,
    /// Mean meetings per visitor.
    pub avg_visitor_meetings: f64,
    /// Most meetings of any visitor.
    pub max_visitor_meetings: usize,
    /// Hosts with at least one meeting.
    pub num_hosts_scheduled: usize,
    /// Fewest meetings of any scheduled host.
    pub min_host_meetings: usize,
    /// Mean meetings per host.
    pub avg_host_meetings: f64,
    /// Most meetings of any host.
    pub max_host_meetings: usize,
    /// Meetings with legacy hosts.
    pub legacy_assignments: usize,
    /// Meetings with external hosts.
    pub external_assignments: usize,
}

impl SolutionSummary {
    /// Computes the summary of `solution`.
    ///
    /// # Arguments
    /// * `solution` - A solved snapshot.
    /// * `best_objective` - Objective of the best solution of the run; the
    ///   gap is 0 when absent.
    pub fn calculate(solution: &Solution, best_objective: Option<f64>) -> Self {
        let ctx = &solution.context;
        let weights = &ctx.weights;

        let mut num_requested_assignments = 0;
        let mut weighted_preference_sum = 0.0;
        let mut legacy_assignments = 0;
        let mut external_assignments = 0;
        for m in &solution.meetings {
            if weights.is_requested(&m.visitor, &m.host) {
                num_requested_assignments += 1;
            }
            weighted_preference_sum += weights.get(&m.visitor, &m.host);
            match ctx.host(&m.host).map(|h| h.status) {
                Some(HostStatus::Legacy) => legacy_assignments += 1,
                Some(HostStatus::External) => external_assignments += 1,
                _ => {}
            }
        }

        let groups = solution.group_sizes();
        let num_group_slots = groups.values().filter(|&&n| n > 1).count();
        let num_one_on_one_slots = groups.values().filter(|&&n| n == 1).count();
        let max_group_size = groups.values().copied().max().unwrap_or(0);

        let visitor_loads: Vec<usize> = ctx
            .visitors
            .iter()
            .map(|v| solution.visitor_meetings(v).count())
            .collect();
        let host_loads: Vec<usize> = ctx
            .hosts
            .iter()
            .map(|h| solution.host_meetings(&h.name).count())
            .collect();
        let (min_visitor_meetings, avg_visitor_meetings, max_visitor_meetings) = load_stats(&visitor_loads);
        let (min_host_meetings, avg_host_meetings, max_host_meetings) = load_stats(&host_loads);

        Self {
            rank: solution.rank,
            objective_value: solution.objective_value,
            objective_gap_from_best: best_objective.map_or(0.0, |best| best - solution.objective_value),
            termination: solution.termination,
            solver_status: solution.termination.solver_status().to_owned(),
            num_assignments: solution.meetings.len(),
            num_requested_assignments,
            weighted_preference_sum,
            num_group_slots,
            num_one_on_one_slots,
            max_group_size,
            num_visitors_scheduled: visitor_loads.iter().filter(|&&n| n > 0).count(),
            min_visitor_meetings,
            avg_visitor_meetings,
            max_visitor_meetings,
            num_hosts_scheduled: host_loads.iter().filter(|&&n| n > 0).count(),
            min_host_meetings,
            avg_host_meetings,
            max_host_meetings,
            legacy_assignments,
            external_assignments,
        }
    }

    /// Share of meetings that match a request (0.0 when there are none).
    pub fn requested_share(&self) -> f64 {
        if self.num_assignments == 0 {
            0.0
        } else {
            self.num_requested_assignments as f64 / self.num_assignments as f64
        }
    }
}

fn load_stats(loads: &[usize]) -> (usize, f64, usize) {
    let min = loads.iter().copied().min().unwrap_or(0);
    let max = loads.iter().copied().max().unwrap_or(0);
    let avg = if loads.is_empty() {
        0.0
    } else {
        loads.iter().sum::<usize>() as f64 / loads.len() as f64
    };
    (min, avg, max)
}
