//! Visitor model.
//!
//! A visitor carries up to five ranked host requests and up to two
//! topical-area preferences. Positions matter: the request in position
//! `k` earns the rank-`k` weight, so blank fields keep their slot as
//! `None` instead of shifting later entries forward.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::validation::{ConfigError, ConfigErrorKind, ConfigResult};

/// Maximum ranked host requests per visitor.
pub const MAX_REQUESTS: usize = 5;
/// Maximum area preferences per visitor.
pub const MAX_AREAS: usize = 2;

/// Column holding visitor names in tabular input.
pub const NAME_COLUMN: &str = "Name";

/// A prospective visitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visitor {
    /// Unique visitor name.
    pub name: String,
    /// Ranked host requests by position (`None` = no request).
    pub requests: Vec<Option<String>>,
    /// Area preferences by position (`None` = no preference).
    pub areas: Vec<Option<String>>,
    /// Available slots. `None` = every slot.
    pub availability: Option<BTreeSet<usize>>,
}

impl Visitor {
    /// Creates a visitor with no requests.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requests: Vec::new(),
            areas: Vec::new(),
            availability: None,
        }
    }

    /// Appends a ranked request. Blank or `none`-like values keep the rank empty.
    ///
    /// Requests beyond [`MAX_REQUESTS`] are ignored.
    pub fn with_request(mut self, host: impl AsRef<str>) -> Self {
        if self.requests.len() < MAX_REQUESTS {
            self.requests.push(normalize_request(host.as_ref()));
        }
        self
    }

    /// Appends an area preference. Blank values keep the position empty.
    ///
    /// Areas beyond [`MAX_AREAS`] are ignored.
    pub fn with_area(mut self, area: impl AsRef<str>) -> Self {
        if self.areas.len() < MAX_AREAS {
            self.areas.push(normalize_field(area.as_ref()));
        }
        self
    }

    /// Restricts availability to the given slots.
    pub fn with_availability(mut self, slots: impl IntoIterator<Item = usize>) -> Self {
        self.availability = Some(slots.into_iter().collect());
        self
    }

    /// Non-empty requests with their 0-based rank.
    pub fn ranked_requests(&self) -> impl Iterator<Item = (usize, &str)> {
        self.requests
            .iter()
            .enumerate()
            .filter_map(|(rank, r)| r.as_deref().map(|name| (rank, name)))
    }

    /// Non-empty area preferences with their 0-based position.
    pub fn ranked_areas(&self) -> impl Iterator<Item = (usize, &str)> {
        self.areas
            .iter()
            .enumerate()
            .filter_map(|(pos, a)| a.as_deref().map(|area| (pos, area)))
    }

    /// Whether the visitor can meet at `slot`.
    pub fn is_available_at(&self, slot: usize) -> bool {
        self.availability
            .as_ref()
            .map_or(true, |slots| slots.contains(&slot))
    }

    /// Number of available slots in a grid of `number_of_slots`.
    pub fn available_slot_count(&self, number_of_slots: usize) -> usize {
        match &self.availability {
            None => number_of_slots,
            Some(slots) => slots.iter().filter(|&&s| s >= 1 && s <= number_of_slots).count(),
        }
    }
}

/// Cleans a free-text field: trims, and maps empty/`none`/`nan`/`na` to `None`.
pub fn normalize_field(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    match value.to_ascii_lowercase().as_str() {
        "none" | "nan" | "na" => None,
        _ => Some(value.to_owned()),
    }
}

/// Cleans a host request: like [`normalize_field`], then drops anything
/// after a comma (`"Doe, Jane"` -> `"Doe"`).
pub fn normalize_request(raw: &str) -> Option<String> {
    let value = normalize_field(raw)?;
    let head = value.split(',').next().unwrap_or_default().trim();
    if head.is_empty() {
        None
    } else {
        Some(head.to_owned())
    }
}

/// Reads visitors from tabular rows.
///
/// Recognized columns: `Name` (required), `Prof1`..`Prof5`, `Area1`..`Area2`.
/// Missing request/area columns are treated as empty. Visitors are
/// returned sorted by name.
///
/// # Errors
/// - `Name` column missing
/// - duplicate visitor names
pub fn visitors_from_table<S: AsRef<str>>(
    headers: &[S],
    rows: &[Vec<String>],
) -> ConfigResult<Vec<Visitor>> {
    let column = |label: &str| headers.iter().position(|h| h.as_ref().trim() == label);

    let name_col = column(NAME_COLUMN).ok_or_else(|| {
        ConfigError::new(
            ConfigErrorKind::MissingColumn,
            format!("Visitor table must include a '{NAME_COLUMN}' column."),
        )
    })?;
    let request_cols: Vec<Option<usize>> = (1..=MAX_REQUESTS)
        .map(|k| column(&format!("Prof{k}")))
        .collect();
    let area_cols: Vec<Option<usize>> = (1..=MAX_AREAS)
        .map(|k| column(&format!("Area{k}")))
        .collect();

    let cell = |row: &Vec<String>, col: Option<usize>| -> String {
        col.and_then(|c| row.get(c)).cloned().unwrap_or_default()
    };

    let mut visitors = Vec::with_capacity(rows.len());
    for row in rows {
        let name = cell(row, Some(name_col)).trim().to_owned();
        let mut visitor = Visitor::new(name);
        for &col in &request_cols {
            visitor = visitor.with_request(cell(row, col));
        }
        for &col in &area_cols {
            visitor = visitor.with_area(cell(row, col));
        }
        visitors.push(visitor);
    }

    check_unique_names(&visitors)?;
    visitors.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(visitors)
}

/// Fails if two visitors share a name.
pub fn check_unique_names(visitors: &[Visitor]) -> ConfigResult<()> {
    let mut seen = HashSet::new();
    let mut dupes: Vec<&str> = visitors
        .iter()
        .filter(|v| !seen.insert(v.name.as_str()))
        .map(|v| v.name.as_str())
        .collect();
    if dupes.is_empty() {
        return Ok(());
    }
    dupes.sort_unstable();
    dupes.dedup();
    Err(ConfigError::new(
        ConfigErrorKind::DuplicateVisitor,
        format!("Duplicate visitor names found: {dupes:?}"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_owned()).collect()
    }

    #[test]
    fn test_normalize_request() {
        assert_eq!(normalize_request("  Doe, Jane "), Some("Doe".into()));
        assert_eq!(normalize_request("Faculty A"), Some("Faculty A".into()));
        assert_eq!(normalize_request(""), None);
        assert_eq!(normalize_request("None"), None);
        assert_eq!(normalize_request("NaN"), None);
        assert_eq!(normalize_request("na"), None);
        assert_eq!(normalize_request(", Jane"), None);
    }

    #[test]
    fn test_ranked_requests_keep_positions() {
        let v = Visitor::new("V1")
            .with_request("Faculty A")
            .with_request("none")
            .with_request("Faculty B");
        let ranked: Vec<_> = v.ranked_requests().collect();
        assert_eq!(ranked, vec![(0, "Faculty A"), (2, "Faculty B")]);
    }

    #[test]
    fn test_request_cap() {
        let mut v = Visitor::new("V1");
        for i in 0..7 {
            v = v.with_request(format!("H{i}"));
        }
        assert_eq!(v.requests.len(), MAX_REQUESTS);
    }

    #[test]
    fn test_availability_default_all() {
        let v = Visitor::new("V1");
        assert!(v.is_available_at(3));
        assert_eq!(v.available_slot_count(4), 4);

        let v = v.with_availability([1, 2]);
        assert!(!v.is_available_at(3));
        assert_eq!(v.available_slot_count(4), 2);
    }

    #[test]
    fn test_from_table() {
        let headers = ["Name", "Prof1", "Prof2", "Area1", "Area2"];
        let rows = vec![
            row(&["Zed", "Faculty B", "", "Area2", "nan"]),
            row(&["Amy", "Faculty A, Jane", "Faculty B", "Area1"]),
        ];
        let visitors = visitors_from_table(&headers, &rows).unwrap();
        assert_eq!(visitors[0].name, "Amy");
        assert_eq!(visitors[1].name, "Zed");
        assert_eq!(
            visitors[0].ranked_requests().collect::<Vec<_>>(),
            vec![(0, "Faculty A"), (1, "Faculty B")]
        );
        assert_eq!(visitors[0].ranked_areas().collect::<Vec<_>>(), vec![(0, "Area1")]);
        assert_eq!(visitors[1].ranked_areas().collect::<Vec<_>>(), vec![(0, "Area2")]);
    }

    #[test]
    fn test_missing_name_column() {
        let headers = ["Visitor", "Prof1"];
        let err = visitors_from_table(&headers, &[row(&["Amy", "Faculty A"])]).unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::MissingColumn);
        assert!(err.message.contains("Name"));
    }

    #[test]
    fn test_duplicate_names() {
        let headers = ["Name", "Prof1"];
        let rows = vec![row(&["Amy", "A"]), row(&["Amy", "B"]), row(&["Bob", "A"])];
        let err = visitors_from_table(&headers, &rows).unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::DuplicateVisitor);
        assert!(err.message.contains("Duplicate visitor names"));
        assert!(err.message.contains("Amy"));
    }
}
