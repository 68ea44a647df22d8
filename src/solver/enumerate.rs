//! Top-N enumeration by no-good cuts.

use std::collections::BTreeSet;

use super::{solve, SolverBackend, TerminationStatus};
use crate::mip::{AssignmentModel, VarId};
use crate::validation::{ConfigError, ConfigErrorKind};

/// One feasible solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedAssignment {
    /// 1-based rank.
    pub rank: usize,
    /// Termination of this solve.
    pub termination: TerminationStatus,
    /// Objective value.
    pub objective_value: f64,
    /// Active assignment variables.
    pub active: BTreeSet<VarId>,
    /// Full value vector.
    pub values: Vec<f64>,
}

/// Result of a top-N run.
#[derive(Debug, Clone, PartialEq)]
pub struct Enumeration {
    /// Solutions in rank order.
    pub solutions: Vec<SolvedAssignment>,
    /// Termination of the last solve performed.
    pub last_termination: TerminationStatus,
}

/// Solves repeatedly, excluding each solution's assignment set before the
/// next solve. Stops after `n` solutions or at the first solve that is
/// not feasible.
///
/// Cuts stay on `model`, so a later call continues below the solutions
/// already found.
pub fn solve_top_n(
    model: &mut AssignmentModel,
    backend: SolverBackend,
    n: usize,
) -> crate::Result<Enumeration> {
    if n < 1 {
        return Err(ConfigError::new(
            ConfigErrorKind::InvalidParameter,
            format!("solutions must be at least 1, got {n}."),
        )
        .into());
    }

    let mut solutions = Vec::with_capacity(n);
    let mut last_termination = TerminationStatus::Infeasible;
    for rank in 1..=n {
        let outcome = solve(model, backend)?;
        last_termination = outcome.termination;
        if !outcome.has_solution() {
            tracing::debug!(rank, termination = %outcome.termination, "enumeration stopped");
            break;
        }

        let active: BTreeSet<VarId> = model.active_assignments(&outcome.values).map(|a| a.var).collect();
        let objective_value = model.objective_value(&outcome.values);
        tracing::debug!(rank, objective_value, meetings = active.len(), "solution found");

        let cut = model.no_good_cut(&active);
        model.add_cut(cut);
        solutions.push(SolvedAssignment {
            rank,
            termination: outcome.termination,
            objective_value,
            active,
            values: outcome.values,
        });
    }

    Ok(Enumeration {
        solutions,
        last_termination,
    })
}
