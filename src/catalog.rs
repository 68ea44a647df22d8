//! Host catalog and name resolution.
//!
//! Resolves host names into one name space and decides which catalog
//! entries take part in scheduling.
//!
//! # Admission
//!
//! | Status | Scheduled when |
//! |--------|----------------|
//! | `active` | always |
//! | `legacy` | requested by a visitor, or `include_all_legacy` |
//! | `external` | always, but with empty availability until registered |
//!
//! Requested names that match nothing in the catalog become external
//! placeholders at the primary location with no availability.

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::config::CatalogSpec;
use crate::models::{normalize_request, Host, HostStatus, TimeGrid, Visitor};
use crate::validation::{check_slot, ConfigError, ConfigErrorKind, ConfigResult};

/// Resolved host catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct HostCatalog {
    hosts: Vec<Host>,
    legacy_pool: Vec<Host>,
    aliases: BTreeMap<String, String>,
    primary_location: String,
    number_of_slots: usize,
}

impl HostCatalog {
    /// Loads and validates a catalog against a grid.
    ///
    /// Active and legacy hosts start with full availability, external
    /// hosts with none. Legacy hosts are held back until
    /// [`admit_requested`](Self::admit_requested).
    ///
    /// # Errors
    /// - empty catalog
    /// - invalid status tag
    /// - host location not in the grid
    /// - alias target not in the catalog
    pub fn from_spec(spec: &CatalogSpec, grid: &TimeGrid) -> ConfigResult<Self> {
        if spec.hosts.is_empty() {
            return Err(ConfigError::new(
                ConfigErrorKind::EmptyCatalog,
                "Host catalog must define at least one host.",
            ));
        }

        let primary_location = grid.primary().name.clone();
        let mut catalog = Self {
            hosts: Vec::new(),
            legacy_pool: Vec::new(),
            aliases: BTreeMap::new(),
            primary_location,
            number_of_slots: grid.number_of_slots(),
        };

        for entry in &spec.hosts {
            let status = match entry.status.as_deref() {
                None => HostStatus::Active,
                Some(tag) => tag.parse::<HostStatus>().map_err(|e| {
                    ConfigError::new(e.kind, format!("{} (host '{}')", e.message, entry.name))
                })?,
            };
            let location = entry
                .location
                .clone()
                .unwrap_or_else(|| catalog.primary_location.clone());
            if !grid.has_location(&location) {
                return Err(ConfigError::new(
                    ConfigErrorKind::UnknownLocation,
                    format!(
                        "Host '{}' is at location '{location}', which is not a configured location.",
                        entry.name
                    ),
                ));
            }

            let availability: Vec<usize> = match status {
                HostStatus::External => Vec::new(),
                HostStatus::Active | HostStatus::Legacy => grid.time_slots().collect(),
            };
            let host = Host::new(entry.name.clone(), location)
                .with_room(entry.room.clone())
                .with_areas(entry.areas.clone())
                .with_availability(availability)
                .with_status(status);

            match status {
                HostStatus::Legacy => upsert(&mut catalog.legacy_pool, host),
                HostStatus::Active | HostStatus::External => upsert(&mut catalog.hosts, host),
            }
        }

        for (alias, target) in &spec.aliases {
            let known = catalog.hosts.iter().chain(&catalog.legacy_pool).any(|h| &h.name == target);
            if !known {
                return Err(ConfigError::new(
                    ConfigErrorKind::UnknownAliasTarget,
                    format!("Alias target '{target}' for '{alias}' is not in the host catalog."),
                ));
            }
        }
        catalog.aliases = spec.aliases.clone();

        Ok(catalog)
    }

    /// Canonical name for `name` (identity when no alias applies).
    pub fn resolve(&self, name: &str) -> String {
        self.aliases
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_owned())
    }

    /// Normalises a raw request field and resolves aliases.
    ///
    /// Returns `None` for blank or `none`-like fields.
    pub fn resolve_request(&self, raw: &str) -> Option<String> {
        normalize_request(raw).map(|name| self.resolve(&name))
    }

    /// Admits legacy hosts and creates external placeholders from visitor requests.
    ///
    /// Calling this again with the same visitors is a no-op.
    pub fn admit_requested(&mut self, visitors: &[Visitor], include_all_legacy: bool) {
        let requested: BTreeSet<String> = visitors
            .iter()
            .flat_map(|v| v.ranked_requests().map(|(_, name)| self.resolve(name)))
            .collect();

        let legacy: Vec<Host> = self
            .legacy_pool
            .iter()
            .filter(|h| include_all_legacy || requested.contains(&h.name))
            .cloned()
            .collect();
        for host in legacy {
            if self.host(&host.name).is_none() {
                debug!(host = %host.name, "admitting legacy host");
                self.hosts.push(host);
            }
        }

        for name in &requested {
            let in_legacy_pool = self.legacy_pool.iter().any(|h| &h.name == name);
            if self.host(name).is_none() && !in_legacy_pool {
                debug!(host = %name, "creating external placeholder");
                self.hosts.push(
                    Host::new(name.clone(), self.primary_location.clone())
                        .with_status(HostStatus::External),
                );
            }
        }
    }

    /// Adds or replaces an external host.
    ///
    /// `location` defaults to the primary location and `available` to
    /// every slot. Only an earlier external registration is replaced.
    ///
    /// # Errors
    /// - `name` is an active or legacy catalog host
    /// - location not in the grid
    /// - slot outside `1..=N`
    pub fn register_external(
        &mut self,
        name: &str,
        location: Option<&str>,
        room: &str,
        areas: Vec<String>,
        available: Option<Vec<usize>>,
        grid: &TimeGrid,
    ) -> ConfigResult<()> {
        let taken = self
            .hosts
            .iter()
            .any(|h| h.name == name && h.status != HostStatus::External)
            || self.legacy_pool.iter().any(|h| h.name == name);
        if taken {
            return Err(ConfigError::new(
                ConfigErrorKind::DuplicateHost,
                format!("'{name}' is already a catalog host; choose another name for the external host."),
            ));
        }
        let location = location.unwrap_or(&self.primary_location).to_owned();
        if !grid.has_location(&location) {
            return Err(ConfigError::new(
                ConfigErrorKind::UnknownLocation,
                format!("External host '{name}' location '{location}' is not a configured location."),
            ));
        }
        let available = available.unwrap_or_else(|| grid.time_slots().collect());
        for &slot in &available {
            check_slot(slot, self.number_of_slots)?;
        }

        let host = Host::new(name, location)
            .with_room(room)
            .with_areas(areas)
            .with_availability(available)
            .with_status(HostStatus::External);
        upsert(&mut self.hosts, host);
        Ok(())
    }

    /// Restricts a scheduled host to the given slots.
    ///
    /// # Errors
    /// - `name` is not a scheduled host
    /// - slot outside `1..=N`
    pub fn set_availability(&mut self, name: &str, slots: &[usize]) -> ConfigResult<()> {
        let number_of_slots = self.number_of_slots;
        let host = self
            .hosts
            .iter_mut()
            .find(|h| h.name == name)
            .ok_or_else(|| {
                ConfigError::new(
                    ConfigErrorKind::UnknownHost,
                    format!("'{name}' is not a host; check spelling."),
                )
            })?;
        for &slot in slots {
            check_slot(slot, number_of_slots)?;
        }
        host.availability = slots.iter().copied().collect();
        Ok(())
    }

    /// Scheduled hosts (admitted), in admission order.
    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    /// Scheduled hosts with non-empty availability.
    pub fn schedulable(&self) -> impl Iterator<Item = &Host> {
        self.hosts.iter().filter(|h| h.is_schedulable())
    }

    /// Looks up a scheduled host.
    pub fn host(&self, name: &str) -> Option<&Host> {
        self.hosts.iter().find(|h| h.name == name)
    }

    /// Alias map.
    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    /// Location used for placeholders.
    pub fn primary_location(&self) -> &str {
        &self.primary_location
    }
}

/// Applies per-visitor availability. Visitors not listed keep every slot.
///
/// # Errors
/// - unknown visitor name
/// - slot outside `1..=N`
pub fn apply_visitor_availability(
    visitors: &mut [Visitor],
    available: &BTreeMap<String, Vec<usize>>,
    number_of_slots: usize,
) -> ConfigResult<()> {
    for (name, slots) in available {
        if !visitors.iter().any(|v| &v.name == name) {
            return Err(ConfigError::new(
                ConfigErrorKind::UnknownVisitor,
                format!("'{name}' is not a valid visitor name"),
            ));
        }
        for &slot in slots {
            check_slot(slot, number_of_slots)?;
        }
    }
    for visitor in visitors.iter_mut() {
        visitor.availability = available
            .get(&visitor.name)
            .map(|slots| slots.iter().copied().collect());
    }
    Ok(())
}

fn upsert(hosts: &mut Vec<Host>, host: Host) {
    match hosts.iter_mut().find(|h| h.name == host.name) {
        Some(existing) => *existing = host,
        None => hosts.push(host),
    }
}
