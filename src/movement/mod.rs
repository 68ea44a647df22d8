//! Movement policy engine.
//!
//! Turns a declared movement configuration into a [`MovementPlan`]:
//! per-location phase slots plus a travel-lag matrix that the model
//! builder converts into presence constraints.
//!
//! # Policies
//!
//! | Policy | Phase slots | Travel lags |
//! |--------|-------------|-------------|
//! | `none` | yes | none (overlap-risk warning on shifted clocks) |
//! | `travel_time` | yes | explicit matrix, `"auto"`, or 1 between distinct locations |
//! | `nonoverlap_time` | yes | always derived from slot windows |
//!
//! The deprecated [`LegacyMode`] input is folded in by [`resolve_movement`],
//! the single place that decides between the two input formats.

mod travel;

pub use travel::{compute_min_travel_lags, divergent_pairs, min_lag_between, TravelMatrix};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::config::{LegacyMode, MovementSpec, TravelSlotsSpec};
use crate::models::TimeGrid;
use crate::scheduler::SchedulerWarning;
use crate::validation::{ConfigError, ConfigErrorKind, ConfigResult};

/// How visitors move between locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementPolicy {
    /// Phase offsets only.
    None,
    /// Explicit or auto-derived travel lags.
    TravelTime,
    /// Travel lags derived from absolute slot windows.
    NonOverlapTime,
}

impl MovementPolicy {
    /// Configuration token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::TravelTime => "travel_time",
            Self::NonOverlapTime => "nonoverlap_time",
        }
    }

    /// Whether the model needs presence variables and travel constraints.
    pub fn tracks_presence(&self) -> bool {
        match self {
            Self::None => false,
            Self::TravelTime | Self::NonOverlapTime => true,
        }
    }
}

impl FromStr for MovementPolicy {
    type Err = ConfigError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "travel_time" => Ok(Self::TravelTime),
            "nonoverlap_time" => Ok(Self::NonOverlapTime),
            other => Err(ConfigError::new(
                ConfigErrorKind::UnsupportedPolicy,
                format!(
                    "Unsupported movement policy '{other}' \
                     (expected none, travel_time or nonoverlap_time)."
                ),
            )),
        }
    }
}

impl fmt::Display for MovementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved movement rules for one grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementPlan {
    policy: MovementPolicy,
    phase_slots: Vec<usize>,
    travel: TravelMatrix,
    min_buffer_minutes: u32,
    requires_breaks: bool,
}

impl MovementPlan {
    /// Active policy.
    pub fn policy(&self) -> MovementPolicy {
        self.policy
    }

    /// Earliest slot by location index.
    pub fn phase_slot_at(&self, location: usize) -> usize {
        self.phase_slots.get(location).copied().unwrap_or(1)
    }

    /// Earliest slot by location name (1 for unknown names).
    pub fn phase_slot(&self, location: &str) -> usize {
        self.travel
            .locations()
            .iter()
            .position(|l| l == location)
            .map_or(1, |i| self.phase_slot_at(i))
    }

    /// Travel lags (all zero under `none`).
    pub fn travel(&self) -> &TravelMatrix {
        &self.travel
    }

    /// Buffer used for derived lags.
    pub fn min_buffer_minutes(&self) -> u32 {
        self.min_buffer_minutes
    }

    /// Whether the movement input implies break enforcement.
    pub fn requires_breaks(&self) -> bool {
        self.requires_breaks
    }
}

/// Resolved plan plus the soft conditions found along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMovement {
    /// The plan.
    pub plan: MovementPlan,
    /// Non-fatal conditions.
    pub warnings: Vec<SchedulerWarning>,
}

/// Resolves movement input against a grid.
///
/// `movement` wins when both inputs are given; `legacy` alone is
/// translated and flagged as deprecated.
///
/// # Errors
/// Any malformed policy, phase slot, buffer or lag matrix, and legacy
/// modes that do not fit the number of locations.
pub fn resolve_movement(
    grid: &TimeGrid,
    movement: Option<&MovementSpec>,
    legacy: Option<LegacyMode>,
) -> ConfigResult<ResolvedMovement> {
    let mut warnings = Vec::new();

    let (spec, requires_breaks) = match (movement, legacy) {
        (Some(spec), Some(mode)) => {
            let w = SchedulerWarning::LegacyModeIgnored { mode };
            warn!("{w}");
            warnings.push(w);
            (spec.clone(), false)
        }
        (None, Some(mode)) => {
            let w = SchedulerWarning::LegacyModeDeprecated { mode };
            warn!("{w}");
            warnings.push(w);
            legacy_movement(grid, mode)?
        }
        (Some(spec), None) => (spec.clone(), false),
        (None, None) => (MovementSpec::default(), false),
    };

    let policy = spec
        .policy
        .as_deref()
        .unwrap_or("none")
        .parse::<MovementPolicy>()?;

    let min_buffer_minutes = match spec.min_buffer_minutes {
        None => 0,
        Some(m) => u32::try_from(m).map_err(|_| {
            ConfigError::new(
                ConfigErrorKind::InvalidBuffer,
                format!("movement.min_buffer_minutes must be a nonnegative integer, got {m}."),
            )
        })?,
    };

    let phase_slots = resolve_phase_slots(grid, &spec.phase_slot)?;

    let locations: Vec<String> = grid.location_names().map(str::to_owned).collect();
    let travel = match policy {
        MovementPolicy::None => TravelMatrix::zeros(locations),
        MovementPolicy::TravelTime => match &spec.travel_slots {
            None => TravelMatrix::uniform(locations, 1),
            Some(TravelSlotsSpec::Token(t)) if is_auto(t) => {
                compute_min_travel_lags(grid, min_buffer_minutes)
            }
            Some(TravelSlotsSpec::Matrix(m)) => explicit_matrix(locations, m)?,
            Some(_) => return Err(bad_travel_shape()),
        },
        MovementPolicy::NonOverlapTime => match &spec.travel_slots {
            None => compute_min_travel_lags(grid, min_buffer_minutes),
            Some(TravelSlotsSpec::Token(t)) if is_auto(t) => {
                compute_min_travel_lags(grid, min_buffer_minutes)
            }
            Some(TravelSlotsSpec::Matrix(_)) => {
                return Err(ConfigError::new(
                    ConfigErrorKind::InvalidTravelSlots,
                    "movement.travel_slots cannot be given explicitly with policy \
                     'nonoverlap_time'; lags are derived from slot windows.",
                ))
            }
            Some(_) => return Err(bad_travel_shape()),
        },
    };

    if policy == MovementPolicy::None {
        let pairs = divergent_pairs(grid);
        if !pairs.is_empty() {
            let w = SchedulerWarning::OverlapRisk { pairs };
            warn!("{w}");
            warnings.push(w);
        }
    }

    Ok(ResolvedMovement {
        plan: MovementPlan {
            policy,
            phase_slots,
            travel,
            min_buffer_minutes,
            requires_breaks,
        },
        warnings,
    })
}

/// Translates a legacy mode into the equivalent movement input.
///
/// Returns the spec and whether breaks are implied.
fn legacy_movement(grid: &TimeGrid, mode: LegacyMode) -> ConfigResult<(MovementSpec, bool)> {
    let names: Vec<&str> = grid.location_names().collect();
    let second_slot = i64::try_from(grid.number_of_slots().min(2)).unwrap_or(2);
    match mode {
        LegacyMode::LocationAFirst | LegacyMode::LocationBFirst => {
            let [a, b] = names.as_slice() else {
                return Err(ConfigError::new(
                    ConfigErrorKind::InvalidLegacyMode,
                    format!(
                        "Legacy {mode:?} mode requires exactly two locations, got {}.",
                        names.len()
                    ),
                ));
            };
            let (phase_a, phase_b) = if mode == LegacyMode::LocationAFirst {
                (1, second_slot)
            } else {
                (second_slot, 1)
            };
            Ok((
                MovementSpec::none()
                    .with_phase_slot(*a, phase_a)
                    .with_phase_slot(*b, phase_b),
                false,
            ))
        }
        LegacyMode::NoOffset => {
            let mut spec = MovementSpec::travel_time();
            for &from in &names {
                spec = spec.with_phase_slot(from, 1);
                for &to in &names {
                    spec = spec.with_travel_lag(from, to, i64::from(from != to));
                }
            }
            Ok((spec, true))
        }
    }
}

fn resolve_phase_slots(grid: &TimeGrid, phase: &BTreeMap<String, i64>) -> ConfigResult<Vec<usize>> {
    if let Some(unknown) = phase.keys().find(|name| !grid.has_location(name)) {
        return Err(ConfigError::new(
            ConfigErrorKind::UnknownLocation,
            format!("movement.phase_slot references unknown location '{unknown}'."),
        ));
    }
    let n = grid.number_of_slots();
    grid.location_names()
        .map(|name| {
            let value = phase.get(name).copied().unwrap_or(1);
            match usize::try_from(value) {
                Ok(slot) if (1..=n).contains(&slot) => Ok(slot),
                _ => Err(ConfigError::new(
                    ConfigErrorKind::InvalidPhaseSlot,
                    format!("movement.phase_slot[{name}]={value} is outside valid slot range 1..{n}."),
                )),
            }
        })
        .collect()
}

fn explicit_matrix(
    locations: Vec<String>,
    rows: &BTreeMap<String, BTreeMap<String, i64>>,
) -> ConfigResult<TravelMatrix> {
    if let Some(unknown) = rows
        .iter()
        .flat_map(|(from, row)| std::iter::once(from).chain(row.keys()))
        .find(|name| !locations.contains(name))
    {
        return Err(ConfigError::new(
            ConfigErrorKind::InvalidTravelSlots,
            format!("movement.travel_slots references unknown location '{unknown}'."),
        ));
    }

    let mut matrix = TravelMatrix::zeros(locations.clone());
    for (i, from) in locations.iter().enumerate() {
        let row = rows.get(from).ok_or_else(|| {
            ConfigError::new(
                ConfigErrorKind::InvalidTravelSlots,
                format!("movement.travel_slots is missing row for '{from}'."),
            )
        })?;
        for (j, to) in locations.iter().enumerate() {
            let lag = *row.get(to).ok_or_else(|| {
                ConfigError::new(
                    ConfigErrorKind::InvalidTravelSlots,
                    format!("movement.travel_slots['{from}'] is missing destination '{to}'."),
                )
            })?;
            let lag = u32::try_from(lag).map_err(|_| {
                ConfigError::new(
                    ConfigErrorKind::InvalidTravelSlots,
                    format!(
                        "movement.travel_slots values must be nonnegative integers \
                         ('{from}' -> '{to}' is {lag})."
                    ),
                )
            })?;
            matrix.set(i, j, lag);
        }
    }
    Ok(matrix)
}

fn is_auto(token: &str) -> bool {
    token.trim().eq_ignore_ascii_case("auto")
}

fn bad_travel_shape() -> ConfigError {
    ConfigError::new(
        ConfigErrorKind::InvalidTravelSlots,
        "movement.travel_slots must be a dictionary or 'auto'.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimeGridSpec;

    fn aligned() -> TimeGrid {
        TimeGrid::from_spec(
            &TimeGridSpec::new()
                .with_location("A", ["1:00-1:25", "1:30-1:55"])
                .with_location("B", ["1:00-1:25", "1:30-1:55"]),
        )
        .unwrap()
    }

    fn shifted() -> TimeGrid {
        TimeGrid::from_spec(
            &TimeGridSpec::new()
                .with_location("A", ["1:00-1:25", "1:30-1:55", "2:00-2:25"])
                .with_location("B", ["1:15-1:40", "1:45-2:10", "2:15-2:40"]),
        )
        .unwrap()
    }

    fn resolve(grid: &TimeGrid, spec: MovementSpec) -> ConfigResult<ResolvedMovement> {
        resolve_movement(grid, Some(&spec), None)
    }

    #[test]
    fn test_default_is_none_policy() {
        let r = resolve_movement(&aligned(), None, None).unwrap();
        assert_eq!(r.plan.policy(), MovementPolicy::None);
        assert_eq!(r.plan.phase_slot("A"), 1);
        assert_eq!(r.plan.travel().max_lag(), 0);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn test_policy_tokens() {
        assert_eq!("Travel_Time".parse::<MovementPolicy>().unwrap(), MovementPolicy::TravelTime);
        let err = "teleport".parse::<MovementPolicy>().unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::UnsupportedPolicy);
        assert!(err.message.contains("Unsupported movement policy"));
    }

    #[test]
    fn test_none_on_identical_grids_has_no_warning() {
        let r = resolve(&aligned(), MovementSpec::none()).unwrap();
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn test_none_on_shifted_grids_warns() {
        let r = resolve(&shifted(), MovementSpec::none()).unwrap();
        assert_eq!(r.warnings.len(), 1);
        let text = r.warnings[0].to_string();
        assert!(text.contains("real-time visitor overlaps"));
        assert!(text.contains("A/B"));
    }

    #[test]
    fn test_travel_time_default_lag() {
        let r = resolve(&aligned(), MovementSpec::travel_time()).unwrap();
        assert_eq!(r.plan.travel().get("A", "B"), Some(1));
        assert_eq!(r.plan.travel().get("B", "A"), Some(1));
        assert!(r.plan.policy().tracks_presence());
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn test_auto_matches_nonoverlap() {
        let g = shifted();
        for buffer in [0, 5, 15] {
            let auto = resolve(
                &g,
                MovementSpec::travel_time().with_auto_travel().with_buffer_minutes(buffer),
            )
            .unwrap();
            let derived =
                resolve(&g, MovementSpec::nonoverlap_time().with_buffer_minutes(buffer)).unwrap();
            let explicit_auto = resolve(
                &g,
                MovementSpec::nonoverlap_time().with_auto_travel().with_buffer_minutes(buffer),
            )
            .unwrap();
            assert_eq!(auto.plan.travel(), derived.plan.travel());
            assert_eq!(derived.plan.travel(), explicit_auto.plan.travel());
            assert_eq!(
                derived.plan.travel(),
                &compute_min_travel_lags(&g, u32::try_from(buffer).unwrap())
            );
        }
    }

    #[test]
    fn test_nonoverlap_rejects_explicit_matrix() {
        let spec = MovementSpec::nonoverlap_time().with_travel_lag("A", "B", 1);
        let err = resolve(&aligned(), spec).unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::InvalidTravelSlots);
        assert!(err.message.contains("nonoverlap_time"));
    }

    #[test]
    fn test_bad_travel_shape() {
        let mut spec = MovementSpec::travel_time();
        spec.travel_slots = Some(TravelSlotsSpec::Token("manual".into()));
        let err = resolve(&aligned(), spec).unwrap_err();
        assert!(err.message.contains("dictionary or 'auto'"));

        let mut spec = MovementSpec::travel_time();
        spec.travel_slots = Some(TravelSlotsSpec::Number(2));
        assert!(resolve(&aligned(), spec).is_err());
    }

    #[test]
    fn test_matrix_missing_row() {
        let spec = MovementSpec::travel_time()
            .with_travel_lag("A", "A", 0)
            .with_travel_lag("A", "B", 1);
        let err = resolve(&aligned(), spec).unwrap_err();
        assert!(err.message.contains("missing row"));
    }

    #[test]
    fn test_matrix_missing_destination() {
        let spec = MovementSpec::travel_time()
            .with_travel_lag("A", "A", 0)
            .with_travel_lag("B", "A", 1)
            .with_travel_lag("B", "B", 0);
        let err = resolve(&aligned(), spec).unwrap_err();
        assert!(err.message.contains("missing destination"));
    }

    #[test]
    fn test_matrix_negative_entry() {
        let spec = MovementSpec::travel_time()
            .with_travel_lag("A", "A", 0)
            .with_travel_lag("A", "B", -1)
            .with_travel_lag("B", "A", 1)
            .with_travel_lag("B", "B", 0);
        let err = resolve(&aligned(), spec).unwrap_err();
        assert!(err.message.contains("nonnegative integers"));
    }

    #[test]
    fn test_matrix_valid_zero_diagonal() {
        let spec = MovementSpec::travel_time()
            .with_travel_lag("A", "A", 3)
            .with_travel_lag("A", "B", 2)
            .with_travel_lag("B", "A", 0)
            .with_travel_lag("B", "B", 0);
        let r = resolve(&aligned(), spec).unwrap();
        assert_eq!(r.plan.travel().get("A", "A"), Some(0));
        assert_eq!(r.plan.travel().get("A", "B"), Some(2));
        assert_eq!(r.plan.travel().get("B", "A"), Some(0));
    }

    #[test]
    fn test_negative_buffer() {
        let spec = MovementSpec::travel_time().with_buffer_minutes(-1);
        let err = resolve(&aligned(), spec).unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::InvalidBuffer);
        assert!(err.message.contains("min_buffer_minutes"));
    }

    #[test]
    fn test_phase_slot_range() {
        let spec = MovementSpec::none().with_phase_slot("A", 0);
        let err = resolve(&aligned(), spec).unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::InvalidPhaseSlot);
        assert!(err.message.contains("movement.phase_slot[A]=0"));
        assert!(err.message.contains("1..2"));

        let spec = MovementSpec::none().with_phase_slot("B", 2);
        let r = resolve(&aligned(), spec).unwrap();
        assert_eq!(r.plan.phase_slot("B"), 2);
        assert_eq!(r.plan.phase_slot_at(0), 1);
    }

    #[test]
    fn test_phase_slot_unknown_location() {
        let spec = MovementSpec::none().with_phase_slot("Annex", 1);
        let err = resolve(&aligned(), spec).unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::UnknownLocation);
    }

    #[test]
    fn test_legacy_modes() {
        let g = aligned();
        let r = resolve_movement(&g, None, Some(LegacyMode::LocationAFirst)).unwrap();
        assert_eq!(r.plan.policy(), MovementPolicy::None);
        assert_eq!(r.plan.phase_slot("A"), 1);
        assert_eq!(r.plan.phase_slot("B"), 2);
        assert!(matches!(
            r.warnings[0],
            SchedulerWarning::LegacyModeDeprecated { .. }
        ));

        let r = resolve_movement(&g, None, Some(LegacyMode::LocationBFirst)).unwrap();
        assert_eq!(r.plan.phase_slot("A"), 2);
        assert_eq!(r.plan.phase_slot("B"), 1);

        let r = resolve_movement(&g, None, Some(LegacyMode::NoOffset)).unwrap();
        assert_eq!(r.plan.policy(), MovementPolicy::TravelTime);
        assert_eq!(r.plan.travel().get("A", "B"), Some(1));
        assert!(r.plan.requires_breaks());
    }

    #[test]
    fn test_legacy_mode_needs_two_locations() {
        let g = TimeGrid::from_spec(&TimeGridSpec::new().with_location("A", ["1:00-1:25"])).unwrap();
        let err = resolve_movement(&g, None, Some(LegacyMode::LocationAFirst)).unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::InvalidLegacyMode);
        assert!(err.message.contains("exactly two locations"));
    }

    #[test]
    fn test_movement_wins_over_legacy() {
        let spec = MovementSpec::none();
        let r = resolve_movement(&aligned(), Some(&spec), Some(LegacyMode::NoOffset)).unwrap();
        assert_eq!(r.plan.policy(), MovementPolicy::None);
        assert!(!r.plan.requires_breaks());
        assert!(matches!(r.warnings[0], SchedulerWarning::LegacyModeIgnored { .. }));
    }
}
