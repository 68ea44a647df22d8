//! Solver adapter.
//!
//! Hands an [`AssignmentModel`] to a `good_lp` backend and maps the result
//! to a [`TerminationStatus`]. Backends are selected at runtime but each
//! one only exists when its cargo feature is enabled:
//!
//! | Backend | Feature |
//! |---------|---------|
//! | [`SolverBackend::Microlp`] | `microlp` (default) |
//! | [`SolverBackend::Highs`] | `highs` |
//! | [`SolverBackend::Cbc`] | `coin_cbc` |

mod enumerate;
#[cfg(any(feature = "microlp", feature = "highs", feature = "coin_cbc"))]
mod translate;

pub use crate::models::TerminationStatus;
pub use enumerate::{solve_top_n, Enumeration, SolvedAssignment};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::mip::AssignmentModel;
use crate::validation::{ConfigError, ConfigErrorKind};

/// MIP backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackend {
    /// Pure-Rust branch and bound.
    #[default]
    Microlp,
    /// HiGHS.
    Highs,
    /// COIN-OR CBC.
    Cbc,
}

impl SolverBackend {
    /// Lower-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            SolverBackend::Microlp => "microlp",
            SolverBackend::Highs => "highs",
            SolverBackend::Cbc => "cbc",
        }
    }

    /// Cargo feature providing the backend.
    pub fn feature(self) -> &'static str {
        match self {
            SolverBackend::Microlp => "microlp",
            SolverBackend::Highs => "highs",
            SolverBackend::Cbc => "coin_cbc",
        }
    }

    /// Whether the backend was compiled in.
    pub fn is_available(self) -> bool {
        match self {
            SolverBackend::Microlp => cfg!(feature = "microlp"),
            SolverBackend::Highs => cfg!(feature = "highs"),
            SolverBackend::Cbc => cfg!(feature = "coin_cbc"),
        }
    }
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SolverBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "microlp" => Ok(SolverBackend::Microlp),
            "highs" => Ok(SolverBackend::Highs),
            "cbc" | "coin_cbc" => Ok(SolverBackend::Cbc),
            other => Err(ConfigError::new(
                ConfigErrorKind::InvalidParameter,
                format!("Unknown solver backend '{other}'. Use 'microlp', 'highs' or 'cbc'."),
            )),
        }
    }
}

/// Backend failure.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The backend was not compiled in.
    #[error("solver backend '{backend}' is not available; rebuild with `--features {feature}`")]
    BackendUnavailable {
        /// Requested backend.
        backend: SolverBackend,
        /// Feature to enable.
        feature: &'static str,
    },
    /// The backend raised an error that is not a termination status.
    #[error("solver backend failed: {0}")]
    Backend(String),
}

impl SolverError {
    fn unavailable(backend: SolverBackend) -> Self {
        SolverError::BackendUnavailable {
            backend,
            feature: backend.feature(),
        }
    }
}

/// Result of one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    /// How the solve ended.
    pub termination: TerminationStatus,
    /// Variable values indexed by `VarId`; empty unless feasible.
    pub values: Vec<f64>,
}

impl SolveOutcome {
    /// Outcome without a primal solution.
    pub fn without_solution(termination: TerminationStatus) -> Self {
        Self {
            termination,
            values: Vec::new(),
        }
    }

    /// Whether a primal solution is present.
    pub fn has_solution(&self) -> bool {
        self.termination.is_feasible() && !self.values.is_empty()
    }
}

/// Solves the model once, including every cut added so far.
pub fn solve(model: &AssignmentModel, backend: SolverBackend) -> Result<SolveOutcome, SolverError> {
    tracing::debug!(%backend, model = %model, "solving assignment model");
    let outcome = match backend {
        SolverBackend::Microlp => solve_microlp(model),
        SolverBackend::Highs => solve_highs(model),
        SolverBackend::Cbc => solve_cbc(model),
    }?;
    tracing::debug!(termination = %outcome.termination, "solve finished");
    Ok(outcome)
}

#[cfg(feature = "microlp")]
fn solve_microlp(model: &AssignmentModel) -> Result<SolveOutcome, SolverError> {
    translate::solve_with(model, good_lp::solvers::microlp::microlp)
}

#[cfg(not(feature = "microlp"))]
fn solve_microlp(_model: &AssignmentModel) -> Result<SolveOutcome, SolverError> {
    Err(SolverError::unavailable(SolverBackend::Microlp))
}

#[cfg(feature = "highs")]
fn solve_highs(model: &AssignmentModel) -> Result<SolveOutcome, SolverError> {
    translate::solve_with(model, good_lp::solvers::highs::highs)
}

#[cfg(not(feature = "highs"))]
fn solve_highs(_model: &AssignmentModel) -> Result<SolveOutcome, SolverError> {
    Err(SolverError::unavailable(SolverBackend::Highs))
}

#[cfg(feature = "coin_cbc")]
fn solve_cbc(model: &AssignmentModel) -> Result<SolveOutcome, SolverError> {
    translate::solve_with(model, good_lp::solvers::coin_cbc::coin_cbc)
}

#[cfg(not(feature = "coin_cbc"))]
fn solve_cbc(_model: &AssignmentModel) -> Result<SolveOutcome, SolverError> {
    Err(SolverError::unavailable(SolverBackend::Cbc))
}

/// Backends report "no feasible solution" in different ways; only this
/// exact wording is read as infeasibility; anything else is an error.
pub(crate) fn is_no_feasible_message(message: &str) -> bool {
    message
        .to_ascii_lowercase()
        .contains("feasible solution was not found")
}
