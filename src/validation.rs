//! Configuration validation.
//!
//! Every configuration problem is fatal and surfaces before any solve
//! attempt. Errors carry a machine-matchable [`ConfigErrorKind`] and a
//! message naming the offending field or value.
//!
//! Run parameters (penalty, meeting bounds, group size) are checked here
//! as well, so that the model builder only ever sees consistent input.

use thiserror::Error;

use crate::config::RunParams;

/// Result alias for configuration checks.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// A fatal configuration error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ConfigError {
    /// Error category.
    pub kind: ConfigErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// No locations were configured.
    NoLocations,
    /// A location has an empty slot list.
    EmptyLocation,
    /// Two locations share a name.
    DuplicateLocation,
    /// Locations disagree on the number of slots.
    SlotCountMismatch,
    /// A slot label is not of the form `H:MM-H:MM`.
    MalformedSlot,
    /// A break index is outside `1..=N`.
    InvalidBreakSlot,
    /// A slot index (availability, phase) is outside `1..=N`.
    InvalidSlot,
    /// A location name is not configured.
    UnknownLocation,
    /// Movement policy token is not recognized.
    UnsupportedPolicy,
    /// Phase slot outside the valid range.
    InvalidPhaseSlot,
    /// Travel-lag matrix is malformed (missing row/column, negative entry, wrong shape).
    InvalidTravelSlots,
    /// Buffer minutes must be non-negative.
    InvalidBuffer,
    /// Legacy sequencing mode is incompatible with the location count.
    InvalidLegacyMode,
    /// Host catalog is empty.
    EmptyCatalog,
    /// Alias points at a host that is not in the catalog.
    UnknownAliasTarget,
    /// Host status tag is not one of `active`, `legacy`, `external`.
    InvalidStatus,
    /// Two visitors share a name.
    DuplicateVisitor,
    /// An external host would replace a catalog host.
    DuplicateHost,
    /// Visitor table lacks a required column.
    MissingColumn,
    /// Host name is not known to the scheduler.
    UnknownHost,
    /// Visitor name is not known to the scheduler.
    UnknownVisitor,
    /// Break enforcement requested without break slots.
    MissingBreaks,
    /// A run parameter is out of range.
    InvalidParameter,
}

impl ConfigError {
    /// Creates a new configuration error.
    pub fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates tunable run parameters.
///
/// Checks:
/// 1. `group_penalty` is finite and non-negative
/// 2. `max_group >= 1`
/// 3. `min_visitors <= max_visitors`
pub fn validate_run_params(params: &RunParams) -> ConfigResult<()> {
    if !params.group_penalty.is_finite() || params.group_penalty < 0.0 {
        return Err(ConfigError::new(
            ConfigErrorKind::InvalidParameter,
            format!(
                "group_penalty must be a nonnegative number, got {}",
                params.group_penalty
            ),
        ));
    }
    if params.max_group < 1 {
        return Err(ConfigError::new(
            ConfigErrorKind::InvalidParameter,
            "max_group must be at least 1",
        ));
    }
    if params.min_visitors > params.max_visitors {
        return Err(ConfigError::new(
            ConfigErrorKind::InvalidParameter,
            format!(
                "min_visitors ({}) exceeds max_visitors ({})",
                params.min_visitors, params.max_visitors
            ),
        ));
    }
    Ok(())
}

/// Validates a 1-based slot index against the grid size.
pub(crate) fn check_slot(slot: usize, number_of_slots: usize) -> ConfigResult<()> {
    if slot < 1 || slot > number_of_slots {
        return Err(ConfigError::new(
            ConfigErrorKind::InvalidSlot,
            format!("{slot} is not a valid time slot (expected 1..={number_of_slots})"),
        ));
    }
    Ok(())
}
