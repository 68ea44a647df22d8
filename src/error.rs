//! Crate error type.

use thiserror::Error;

use crate::solver::SolverError;
use crate::validation::ConfigError;

/// Errors that abort a scheduling run.
///
/// An infeasible model is not an error.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration or parameters.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Backend missing or failing.
    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// Result alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
