//! Solution snapshots.
//!
//! A [`Solution`] is detached from the model that produced it: it owns
//! its active meetings and shares an immutable [`SolutionContext`] with
//! the other ranks of the same run. Adding cuts to the live model never
//! changes a solution that was already returned.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use super::{Host, HostStatus, TimeGrid, UtilityWeights};
use crate::scheduler::SolutionSummary;

/// One active assignment: `visitor` meets `host` at `slot`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Meeting {
    /// Visitor name.
    pub visitor: String,
    /// Host name.
    pub host: String,
    /// 1-based slot index.
    pub slot: usize,
}

impl Meeting {
    /// Creates a meeting.
    pub fn new(visitor: impl Into<String>, host: impl Into<String>, slot: usize) -> Self {
        Self {
            visitor: visitor.into(),
            host: host.into(),
            slot,
        }
    }
}

/// Backend termination outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationStatus {
    /// Proven optimal.
    Optimal,
    /// Feasible, optimality not proven.
    Feasible,
    /// No feasible assignment exists.
    Infeasible,
    /// Objective unbounded.
    Unbounded,
}

impl TerminationStatus {
    /// Whether a usable assignment was produced.
    pub fn is_feasible(&self) -> bool {
        match self {
            Self::Optimal | Self::Feasible => true,
            Self::Infeasible | Self::Unbounded => false,
        }
    }

    /// Lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
            Self::Feasible => "feasible",
            Self::Infeasible => "infeasible",
            Self::Unbounded => "unbounded",
        }
    }

    /// Coarse solver status label paired with the termination label.
    pub fn solver_status(&self) -> &'static str {
        match self {
            Self::Optimal | Self::Feasible => "ok",
            Self::Infeasible | Self::Unbounded => "warning",
        }
    }
}

impl fmt::Display for TerminationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata needed to interpret solutions of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionContext {
    /// Time grid at solve time.
    pub grid: TimeGrid,
    /// Hosts included in the model (non-empty availability).
    pub hosts: Vec<Host>,
    /// Visitor names included in the model.
    pub visitors: Vec<String>,
    /// Utility weights and matched requests.
    pub weights: UtilityWeights,
}

impl SolutionContext {
    /// Looks up a scheduled host.
    pub fn host(&self, name: &str) -> Option<&Host> {
        self.hosts.iter().find(|h| h.name == name)
    }

    /// Whether `name` is a legacy host.
    pub fn is_legacy(&self, name: &str) -> bool {
        self.host(name)
            .is_some_and(|h| h.status == HostStatus::Legacy)
    }

    /// Whether `name` is an external host.
    pub fn is_external(&self, name: &str) -> bool {
        self.host(name)
            .is_some_and(|h| h.status == HostStatus::External)
    }
}

/// A requested host the visitor does not meet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmetRequest {
    /// Visitor name.
    pub visitor: String,
    /// Requested host.
    pub host: String,
    /// Utility weight of the missed pair.
    pub weight: f64,
}

/// One solved schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// 1-based rank within a top-N run.
    pub rank: usize,
    /// Objective value.
    pub objective_value: f64,
    /// Backend termination status.
    pub termination: TerminationStatus,
    /// Active meetings.
    pub meetings: BTreeSet<Meeting>,
    /// Shared run metadata.
    pub context: Arc<SolutionContext>,
}

impl Solution {
    /// Whether `visitor` meets `host` at `slot`.
    pub fn is_assigned(&self, visitor: &str, host: &str, slot: usize) -> bool {
        self.meetings.contains(&Meeting::new(visitor, host, slot))
    }

    /// Number of active meetings.
    pub fn meeting_count(&self) -> usize {
        self.meetings.len()
    }

    /// Meetings of one visitor, ordered by host then slot.
    pub fn visitor_meetings<'a>(&'a self, visitor: &'a str) -> impl Iterator<Item = &'a Meeting> {
        self.meetings.iter().filter(move |m| m.visitor == visitor)
    }

    /// Meetings of one host.
    pub fn host_meetings<'a>(&'a self, host: &'a str) -> impl Iterator<Item = &'a Meeting> {
        self.meetings.iter().filter(move |m| m.host == host)
    }

    /// Visitors per (host, slot) among occupied pairs.
    pub fn group_sizes(&self) -> BTreeMap<(&str, usize), usize> {
        let mut sizes = BTreeMap::new();
        for m in &self.meetings {
            *sizes.entry((m.host.as_str(), m.slot)).or_insert(0) += 1;
        }
        sizes
    }

    /// Requested hosts each visitor was not scheduled with.
    pub fn unmet_requests(&self) -> Vec<UnmetRequest> {
        let weights = &self.context.weights;
        let mut unmet = Vec::new();
        for visitor in &self.context.visitors {
            for host in weights.requests(visitor) {
                if !self.visitor_meetings(visitor).any(|m| &m.host == host) {
                    unmet.push(UnmetRequest {
                        visitor: visitor.clone(),
                        host: host.clone(),
                        weight: weights.get(visitor, host),
                    });
                }
            }
        }
        unmet
    }

    /// Number of visitors by meeting count (`meetings -> visitors`).
    pub fn meeting_count_histogram(&self) -> BTreeMap<usize, usize> {
        let mut histogram = BTreeMap::new();
        for visitor in &self.context.visitors {
            let n = self.visitor_meetings(visitor).count();
            *histogram.entry(n).or_insert(0) += 1;
        }
        histogram
    }

    /// Summary statistics. `best_objective` sets the gap reference.
    pub fn summary(&self, best_objective: Option<f64>) -> SolutionSummary {
        SolutionSummary::calculate(self, best_objective)
    }
}

/// Ranked solutions of a top-N run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolutionSet {
    solutions: Vec<Solution>,
}

impl SolutionSet {
    /// Wraps ranked solutions (rank 1 first).
    pub fn new(solutions: Vec<Solution>) -> Self {
        Self { solutions }
    }

    /// Number of solutions found.
    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    /// Whether no solution was found.
    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// Rank-1 solution.
    pub fn best(&self) -> Option<&Solution> {
        self.solutions.first()
    }

    /// Solution by 1-based rank.
    pub fn get(&self, rank: usize) -> Option<&Solution> {
        rank.checked_sub(1).and_then(|i| self.solutions.get(i))
    }

    /// Iterates in rank order.
    pub fn iter(&self) -> std::slice::Iter<'_, Solution> {
        self.solutions.iter()
    }

    /// One summary per rank, with gaps measured from rank 1.
    pub fn summaries(&self) -> Vec<SolutionSummary> {
        let best = self.best().map(|s| s.objective_value);
        self.solutions.iter().map(|s| s.summary(best)).collect()
    }
}

impl<'a> IntoIterator for &'a SolutionSet {
    type Item = &'a Solution;
    type IntoIter = std::slice::Iter<'a, Solution>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::TimeGridSpec;
    use crate::models::{compute_utility_weights, Visitor, WeightConfig};

    fn sample_context() -> Arc<SolutionContext> {
        let grid = TimeGrid::from_spec(
            &TimeGridSpec::new().with_location("A", ["1:00-1:25", "1:30-1:55", "2:00-2:25"]),
        )
        .unwrap();
        let hosts = vec![
            Host::new("Faculty A", "A").with_availability([1, 2, 3]),
            Host::new("Faculty B", "A")
                .with_availability([1, 2, 3])
                .with_status(HostStatus::Legacy),
            Host::new("Guest", "A")
                .with_availability([2])
                .with_status(HostStatus::External),
        ];
        let visitors = vec![
            Visitor::new("V1").with_request("Faculty A").with_request("Faculty B"),
            Visitor::new("V2").with_request("Guest"),
            Visitor::new("V3"),
        ];
        let weights =
            compute_utility_weights(&hosts, &visitors, str::to_owned, &WeightConfig::default());
        Arc::new(SolutionContext {
            grid,
            hosts,
            visitors: visitors.into_iter().map(|v| v.name).collect(),
            weights,
        })
    }

    pub(crate) fn sample_solution(rank: usize, objective: f64) -> Solution {
        Solution {
            rank,
            objective_value: objective,
            termination: TerminationStatus::Optimal,
            meetings: [
                Meeting::new("V1", "Faculty A", 1),
                Meeting::new("V2", "Guest", 2),
                Meeting::new("V1", "Guest", 2),
            ]
            .into_iter()
            .collect(),
            context: sample_context(),
        }
    }

    #[test]
    fn test_assignment_lookup() {
        let s = sample_solution(1, 7.0);
        assert!(s.is_assigned("V1", "Faculty A", 1));
        assert!(!s.is_assigned("V1", "Faculty A", 2));
        assert_eq!(s.meeting_count(), 3);
        assert_eq!(s.visitor_meetings("V1").count(), 2);
        assert_eq!(s.host_meetings("Guest").count(), 2);
        assert_eq!(s.group_sizes()[&("Guest", 2)], 2);
    }

    #[test]
    fn test_solution_json_round_trip() {
        let set = SolutionSet::new(vec![sample_solution(1, 8.2), sample_solution(2, 6.0)]);
        let json = serde_json::to_string(&set).unwrap();
        let back: SolutionSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
        let best = back.best().unwrap();
        assert!(best.is_assigned("V2", "Guest", 2));
        assert!((best.context.weights.get("V1", "Faculty A") - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_unmet_requests() {
        let s = sample_solution(1, 7.0);
        let unmet = s.unmet_requests();
        assert_eq!(unmet.len(), 1);
        assert_eq!(unmet[0].visitor, "V1");
        assert_eq!(unmet[0].host, "Faculty B");
        assert!((unmet[0].weight - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_histogram() {
        let s = sample_solution(1, 7.0);
        let h = s.meeting_count_histogram();
        assert_eq!(h[&0], 1); // V3
        assert_eq!(h[&1], 1); // V2
        assert_eq!(h[&2], 1); // V1
    }

    #[test]
    fn test_context_status_lookup() {
        let ctx = sample_context();
        assert!(ctx.is_legacy("Faculty B"));
        assert!(ctx.is_external("Guest"));
        assert!(!ctx.is_legacy("Faculty A"));
        assert!(!ctx.is_external("Nobody"));
    }

    #[test]
    fn test_solution_set_ranks() {
        let set = SolutionSet::new(vec![sample_solution(1, 7.0), sample_solution(2, 6.5)]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.best().map(|s| s.rank), Some(1));
        assert_eq!(set.get(2).map(|s| s.rank), Some(2));
        assert!(set.get(0).is_none());
        assert!(set.get(3).is_none());
        assert_eq!((&set).into_iter().count(), 2);
    }

    #[test]
    fn test_termination_labels() {
        assert!(TerminationStatus::Optimal.is_feasible());
        assert!(TerminationStatus::Feasible.is_feasible());
        assert!(!TerminationStatus::Infeasible.is_feasible());
        assert_eq!(TerminationStatus::Infeasible.to_string(), "infeasible");
        assert_eq!(TerminationStatus::Optimal.solver_status(), "ok");
    }
}
