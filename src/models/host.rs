//! Host model.
//!
//! Hosts are the people visitors meet (faculty). Each host sits at one
//! location, has topical areas and a slot availability set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::validation::{ConfigError, ConfigErrorKind};

/// Catalog status of a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostStatus {
    /// Always scheduled.
    Active,
    /// Scheduled only when requested (or force-included).
    Legacy,
    /// Outside the primary catalog; unavailable until configured.
    External,
}

impl HostStatus {
    /// Lowercase tag used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Legacy => "legacy",
            Self::External => "external",
        }
    }
}

impl FromStr for HostStatus {
    type Err = ConfigError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "legacy" => Ok(Self::Legacy),
            "external" => Ok(Self::External),
            other => Err(ConfigError::new(
                ConfigErrorKind::InvalidStatus,
                format!("Invalid host status '{other}'."),
            )),
        }
    }
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A host that can receive visitors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    /// Display name (unique).
    pub name: String,
    /// Home location name.
    pub location: String,
    /// Room label.
    pub room: String,
    /// Topical areas.
    pub areas: Vec<String>,
    /// Available 1-based slot indices.
    pub availability: BTreeSet<usize>,
    /// Catalog status.
    pub status: HostStatus,
}

impl Host {
    /// Creates an active host with no availability.
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            room: String::new(),
            areas: Vec::new(),
            availability: BTreeSet::new(),
            status: HostStatus::Active,
        }
    }

    /// Sets the room label.
    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = room.into();
        self
    }

    /// Sets the topical areas.
    pub fn with_areas(mut self, areas: Vec<String>) -> Self {
        self.areas = areas;
        self
    }

    /// Sets the availability set.
    pub fn with_availability(mut self, slots: impl IntoIterator<Item = usize>) -> Self {
        self.availability = slots.into_iter().collect();
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: HostStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether the host can meet at `slot`.
    #[inline]
    pub fn is_available_at(&self, slot: usize) -> bool {
        self.availability.contains(&slot)
    }

    /// Whether the host has any availability at all.
    #[inline]
    pub fn is_schedulable(&self) -> bool {
        !self.availability.is_empty()
    }

    /// Whether the host works in the given area.
    pub fn has_area(&self, area: &str) -> bool {
        self.areas.iter().any(|a| a == area)
    }
}
