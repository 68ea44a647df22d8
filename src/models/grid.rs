//! Location time grids.
//!
//! All locations share the same slot *count* but may run on shifted
//! clocks: slot `t` at one location can cover a different absolute
//! window than slot `t` at another. Slot indices are 1-based.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use super::SlotWindow;
use crate::config::TimeGridSpec;
use crate::validation::{ConfigError, ConfigErrorKind, ConfigResult};

/// A named venue with its slot windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Location name.
    pub name: String,
    /// Slot labels as configured, in slot order.
    pub labels: Vec<String>,
    /// Parsed windows, in slot order.
    pub windows: Vec<SlotWindow>,
}

impl Location {
    /// Window for a 1-based slot index.
    pub fn window(&self, slot: usize) -> Option<SlotWindow> {
        slot.checked_sub(1).and_then(|i| self.windows.get(i)).copied()
    }
}

/// Validated multi-location slot grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    locations: Vec<Location>,
    number_of_slots: usize,
    breaks: Vec<usize>,
}

impl TimeGrid {
    /// Builds and validates a grid.
    ///
    /// # Errors
    /// - no locations
    /// - a location with no slots, or a duplicate location name
    /// - unequal slot counts
    /// - malformed slot labels
    /// - break indices outside `1..=N`
    pub fn from_spec(spec: &TimeGridSpec) -> ConfigResult<Self> {
        let first = spec.locations.first().ok_or_else(|| {
            ConfigError::new(
                ConfigErrorKind::NoLocations,
                "Run config must define at least one location.",
            )
        })?;
        let number_of_slots = first.slots.len();

        let mut seen = BTreeSet::new();
        let mut locations = Vec::with_capacity(spec.locations.len());
        for loc in &spec.locations {
            if !seen.insert(loc.name.as_str()) {
                return Err(ConfigError::new(
                    ConfigErrorKind::DuplicateLocation,
                    format!("Location '{}' is defined more than once.", loc.name),
                ));
            }
            if loc.slots.is_empty() {
                return Err(ConfigError::new(
                    ConfigErrorKind::EmptyLocation,
                    format!("Location '{}' must define at least one time slot.", loc.name),
                ));
            }
            if loc.slots.len() != number_of_slots {
                return Err(ConfigError::new(
                    ConfigErrorKind::SlotCountMismatch,
                    format!(
                        "Each location should have the same number of time slots \
                         ('{}' has {}, '{}' has {}).",
                        first.name,
                        number_of_slots,
                        loc.name,
                        loc.slots.len()
                    ),
                ));
            }
            let windows = loc
                .slots
                .iter()
                .map(|label| label.parse::<SlotWindow>())
                .collect::<ConfigResult<Vec<_>>>()?;
            locations.push(Location {
                name: loc.name.clone(),
                labels: loc.slots.clone(),
                windows,
            });
        }

        let mut breaks = spec.breaks.clone();
        for &b in &breaks {
            if b < 1 || b > number_of_slots {
                return Err(ConfigError::new(
                    ConfigErrorKind::InvalidBreakSlot,
                    format!("{b} is not a valid break time (expected 1..={number_of_slots})"),
                ));
            }
        }
        breaks.sort_unstable();
        breaks.dedup();

        Ok(Self {
            locations,
            number_of_slots,
            breaks,
        })
    }

    /// Number of slots per location.
    #[inline]
    pub fn number_of_slots(&self) -> usize {
        self.number_of_slots
    }

    /// Slot indices `1..=N`.
    pub fn time_slots(&self) -> RangeInclusive<usize> {
        1..=self.number_of_slots
    }

    /// Whether `slot` is a valid 1-based index.
    pub fn contains_slot(&self, slot: usize) -> bool {
        (1..=self.number_of_slots).contains(&slot)
    }

    /// Locations in configuration order.
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Location names in configuration order.
    pub fn location_names(&self) -> impl Iterator<Item = &str> {
        self.locations.iter().map(|l| l.name.as_str())
    }

    /// The primary (first) location.
    pub fn primary(&self) -> &Location {
        // from_spec guarantees at least one location
        &self.locations[0]
    }

    /// Looks up a location by name.
    pub fn location(&self, name: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.name == name)
    }

    /// Position of a location in configuration order.
    pub fn location_index(&self, name: &str) -> Option<usize> {
        self.locations.iter().position(|l| l.name == name)
    }

    /// Whether a location is configured.
    pub fn has_location(&self, name: &str) -> bool {
        self.location(name).is_some()
    }

    /// Absolute window of `slot` at `location`.
    pub fn window(&self, location: &str, slot: usize) -> Option<SlotWindow> {
        self.location(location).and_then(|l| l.window(slot))
    }

    /// Break-eligible slots (sorted, deduplicated).
    pub fn breaks(&self) -> &[usize] {
        &self.breaks
    }

    /// Whether every location uses exactly the same absolute windows.
    pub fn clocks_aligned(&self) -> bool {
        self.locations
            .windows(2)
            .all(|pair| pair[0].windows == pair[1].windows)
    }
}
