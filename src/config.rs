//! Configuration input types.
//!
//! Plain serde-deserialisable structures produced by whatever front end
//! reads configuration files. Nothing here is validated on construction;
//! validation happens when the scheduler consumes them (see
//! [`crate::validation`]).
//!
//! # Layout
//!
//! | Type | Content |
//! |------|---------|
//! | `TimeGridSpec` | Ordered locations with slot labels, break slots |
//! | `CatalogSpec` | Host entries and aliases |
//! | `MovementSpec` | Movement policy, phase slots, travel lags |
//! | `LegacyMode` | Deprecated sequencing mode |
//! | `RunConfig` | Grid + movement + host availability + area weights |
//! | `RunParams` | Tunable solve parameters |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One location and its ordered slot labels (`"H:MM-H:MM"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSpec {
    /// Location name.
    pub name: String,
    /// Slot labels in slot-index order.
    pub slots: Vec<String>,
}

/// Time grid input: locations in priority order plus break slots.
///
/// The first location is the primary one (placeholder location for
/// external hosts).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeGridSpec {
    /// Locations, in order.
    #[serde(default)]
    pub locations: Vec<LocationSpec>,
    /// 1-based break-eligible slot indices.
    #[serde(default)]
    pub breaks: Vec<usize>,
}

impl TimeGridSpec {
    /// Creates an empty grid spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a location with its slot labels.
    pub fn with_location<S: Into<String>>(
        mut self,
        name: impl Into<String>,
        slots: impl IntoIterator<Item = S>,
    ) -> Self {
        self.locations.push(LocationSpec {
            name: name.into(),
            slots: slots.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Sets the break slots.
    pub fn with_breaks(mut self, breaks: Vec<usize>) -> Self {
        self.breaks = breaks;
        self
    }
}

/// A host catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostEntry {
    /// Display name (unique within the catalog).
    pub name: String,
    /// Home location. Defaults to the primary location.
    #[serde(default)]
    pub location: Option<String>,
    /// Room label.
    #[serde(default)]
    pub room: String,
    /// Topical areas.
    #[serde(default)]
    pub areas: Vec<String>,
    /// Status tag: `active` (default), `legacy` or `external`.
    #[serde(default)]
    pub status: Option<String>,
}

impl HostEntry {
    /// Creates an active host entry at a location.
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: Some(location.into()),
            room: String::new(),
            areas: Vec::new(),
            status: None,
        }
    }

    /// Sets the room label.
    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = room.into();
        self
    }

    /// Adds a topical area.
    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.areas.push(area.into());
        self
    }

    /// Sets the status tag.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Host catalog input: entries plus an alias map (alias -> canonical name).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSpec {
    /// Catalog entries.
    #[serde(default)]
    pub hosts: Vec<HostEntry>,
    /// Alias -> canonical host name.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl CatalogSpec {
    /// Creates an empty catalog spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a host entry.
    pub fn with_host(mut self, entry: HostEntry) -> Self {
        self.hosts.push(entry);
        self
    }

    /// Adds an alias.
    pub fn with_alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), target.into());
        self
    }
}

/// Travel-lag input: the `"auto"` token or an explicit matrix.
///
/// Any other shape is kept so that validation can report it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TravelSlotsSpec {
    /// Explicit lag matrix, `from -> to -> slots`.
    Matrix(BTreeMap<String, BTreeMap<String, i64>>),
    /// A string token; only `"auto"` is accepted.
    Token(String),
    /// A bare number (rejected during validation).
    Number(i64),
}

impl TravelSlotsSpec {
    /// The auto-derivation token.
    pub fn auto() -> Self {
        Self::Token("auto".to_owned())
    }
}

/// Movement configuration input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementSpec {
    /// Policy token: `none`, `travel_time` or `nonoverlap_time`.
    #[serde(default)]
    pub policy: Option<String>,
    /// Earliest permissible slot per location (1-based, default 1).
    #[serde(default)]
    pub phase_slot: BTreeMap<String, i64>,
    /// Travel lags between locations.
    #[serde(default)]
    pub travel_slots: Option<TravelSlotsSpec>,
    /// Extra minutes required between leaving one location and arriving at another.
    #[serde(default)]
    pub min_buffer_minutes: Option<i64>,
}

impl MovementSpec {
    /// Creates a movement spec with the given policy token.
    pub fn with_policy(policy: impl Into<String>) -> Self {
        Self {
            policy: Some(policy.into()),
            ..Self::default()
        }
    }

    /// `none` policy.
    pub fn none() -> Self {
        Self::with_policy("none")
    }

    /// `travel_time` policy.
    pub fn travel_time() -> Self {
        Self::with_policy("travel_time")
    }

    /// `nonoverlap_time` policy.
    pub fn nonoverlap_time() -> Self {
        Self::with_policy("nonoverlap_time")
    }

    /// Sets the phase slot for a location.
    pub fn with_phase_slot(mut self, location: impl Into<String>, slot: i64) -> Self {
        self.phase_slot.insert(location.into(), slot);
        self
    }

    /// Sets an explicit travel-lag entry.
    pub fn with_travel_lag(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        lag: i64,
    ) -> Self {
        let mut matrix = match self.travel_slots.take() {
            Some(TravelSlotsSpec::Matrix(m)) => m,
            _ => BTreeMap::new(),
        };
        matrix.entry(from.into()).or_default().insert(to.into(), lag);
        self.travel_slots = Some(TravelSlotsSpec::Matrix(matrix));
        self
    }

    /// Requests auto-derived travel lags.
    pub fn with_auto_travel(mut self) -> Self {
        self.travel_slots = Some(TravelSlotsSpec::auto());
        self
    }

    /// Sets the travel buffer in minutes.
    pub fn with_buffer_minutes(mut self, minutes: i64) -> Self {
        self.min_buffer_minutes = Some(minutes);
        self
    }
}

/// Deprecated two-location sequencing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegacyMode {
    /// Primary location starts at slot 1, the second at slot 2.
    LocationAFirst,
    /// Second location starts at slot 1, the primary at slot 2.
    LocationBFirst,
    /// Both start at slot 1; one-slot travel lag; breaks enforced.
    NoOffset,
}

/// Run configuration bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Time grid.
    pub grid: TimeGridSpec,
    /// Movement configuration (omitted = `none`).
    #[serde(default)]
    pub movement: Option<MovementSpec>,
    /// Restricted host availability, host -> slots.
    #[serde(default)]
    pub host_availability: BTreeMap<String, Vec<usize>>,
    /// Area weights by preference position, overriding the defaults.
    #[serde(default)]
    pub area_weights: Option<Vec<f64>>,
}

/// Tunable parameters for one solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunParams {
    /// Penalty per visitor beyond the first in a host/slot meeting.
    pub group_penalty: f64,
    /// Minimum total meetings per available host.
    pub min_visitors: u32,
    /// Maximum total meetings per host.
    pub max_visitors: u32,
    /// Minimum meetings per visitor (capped by the visitor's availability).
    pub min_meetings_per_visitor: u32,
    /// Maximum visitors in one host/slot meeting.
    pub max_group: u32,
    /// Enforce break constraints regardless of movement policy.
    pub enforce_breaks: bool,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            group_penalty: 0.1,
            min_visitors: 0,
            max_visitors: 8,
            min_meetings_per_visitor: 0,
            max_group: 2,
            enforce_breaks: false,
        }
    }
}

impl RunParams {
    /// Sets the group penalty.
    pub fn with_group_penalty(mut self, penalty: f64) -> Self {
        self.group_penalty = penalty;
        self
    }

    /// Sets the minimum meetings per host.
    pub fn with_min_visitors(mut self, n: u32) -> Self {
        self.min_visitors = n;
        self
    }

    /// Sets the maximum meetings per host.
    pub fn with_max_visitors(mut self, n: u32) -> Self {
        self.max_visitors = n;
        self
    }

    /// Sets the minimum meetings per visitor.
    pub fn with_min_meetings_per_visitor(mut self, n: u32) -> Self {
        self.min_meetings_per_visitor = n;
        self
    }

    /// Sets the maximum group size.
    pub fn with_max_group(mut self, n: u32) -> Self {
        self.max_group = n;
        self
    }

    /// Enables or disables break enforcement.
    pub fn with_enforce_breaks(mut self, enforce: bool) -> Self {
        self.enforce_breaks = enforce;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_config_from_json() {
        let json = r#"{
            "grid": {
                "locations": [
                    {"name": "A", "slots": ["1:00-1:25", "1:30-1:55"]},
                    {"name": "B", "slots": ["1:15-1:40", "1:45-2:10"]}
                ],
                "breaks": [2]
            },
            "movement": {
                "policy": "travel_time",
                "travel_slots": "auto",
                "min_buffer_minutes": 5
            },
            "host_availability": {"Prof X": [1]}
        }"#;
        let cfg: RunConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.grid.locations.len(), 2);
        assert_eq!(cfg.grid.locations[0].name, "A");
        assert_eq!(cfg.grid.breaks, vec![2]);
        let movement = cfg.movement.unwrap();
        assert_eq!(movement.travel_slots, Some(TravelSlotsSpec::auto()));
        assert_eq!(movement.min_buffer_minutes, Some(5));
        assert_eq!(cfg.host_availability["Prof X"], vec![1]);
    }

    #[test]
    fn test_travel_slots_shapes() {
        let matrix: TravelSlotsSpec =
            serde_json::from_str(r#"{"A": {"A": 0, "B": 1}}"#).unwrap();
        assert!(matches!(matrix, TravelSlotsSpec::Matrix(_)));

        let number: TravelSlotsSpec = serde_json::from_str("3").unwrap();
        assert_eq!(number, TravelSlotsSpec::Number(3));
    }

    #[test]
    fn test_catalog_from_json() {
        let json = r#"{
            "hosts": [
                {"name": "Faculty A", "location": "A", "room": "101", "areas": ["Area1"]},
                {"name": "Emeritus", "status": "legacy"}
            ],
            "aliases": {"Fac A": "Faculty A"}
        }"#;
        let spec: CatalogSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.hosts.len(), 2);
        assert_eq!(spec.hosts[1].location, None);
        assert_eq!(spec.hosts[1].status.as_deref(), Some("legacy"));
        assert_eq!(spec.aliases["Fac A"], "Faculty A");
    }

    #[test]
    fn test_movement_builder() {
        let spec = MovementSpec::travel_time()
            .with_phase_slot("A", 1)
            .with_travel_lag("A", "B", 2)
            .with_travel_lag("B", "A", 1);
        match spec.travel_slots {
            Some(TravelSlotsSpec::Matrix(m)) => {
                assert_eq!(m["A"]["B"], 2);
                assert_eq!(m["B"]["A"], 1);
            }
            other => panic!("unexpected travel slots: {other:?}"),
        }
    }

    #[test]
    fn test_legacy_mode_serde() {
        let mode: LegacyMode = serde_json::from_str(r#""no_offset""#).unwrap();
        assert_eq!(mode, LegacyMode::NoOffset);
    }

    #[test]
    fn test_run_params_defaults() {
        let p = RunParams::default();
        assert!((p.group_penalty - 0.1).abs() < 1e-12);
        assert_eq!(p.max_visitors, 8);
        assert_eq!(p.max_group, 2);
        assert!(!p.enforce_breaks);
    }
}
