//! Travel-lag matrices and their derivation from slot windows.
//!
//! A lag `L` from `From` to `To` forbids a visitor who is at `From` in
//! slot `t` from being at `To` in any slot of `(t, t + L]`.
//!
//! # Derivation
//!
//! For each ordered pair of distinct locations, every forward transition
//! `i -> j` (`j > i`) is tested: if `To[j]` starts before `From[i]` ends
//! plus the buffer, the transition is physically impossible. The derived
//! lag is the largest `j - i` among impossible transitions (0 if none),
//! which is the tightest lag blocking all of them.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::models::{SlotWindow, TimeGrid};

/// Square lag matrix over the configured locations (slot units).
///
/// The diagonal is always zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelMatrix {
    locations: Vec<String>,
    lags: Vec<Vec<u32>>,
}

impl TravelMatrix {
    /// All-zero matrix.
    pub fn zeros(locations: Vec<String>) -> Self {
        let n = locations.len();
        Self {
            locations,
            lags: vec![vec![0; n]; n],
        }
    }

    /// Matrix with the same lag between every distinct pair.
    pub fn uniform(locations: Vec<String>, lag: u32) -> Self {
        let mut matrix = Self::zeros(locations);
        let n = matrix.locations.len();
        for (i, j) in (0..n).cartesian_product(0..n) {
            if i != j {
                matrix.lags[i][j] = lag;
            }
        }
        matrix
    }

    /// Sets one entry by index. Diagonal writes are ignored.
    pub(crate) fn set(&mut self, from: usize, to: usize, lag: u32) {
        if from != to {
            self.lags[from][to] = lag;
        }
    }

    /// Location names, in row order.
    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    /// Lag by location index.
    #[inline]
    pub fn lag_at(&self, from: usize, to: usize) -> u32 {
        self.lags[from][to]
    }

    /// Lag by location name.
    pub fn get(&self, from: &str, to: &str) -> Option<u32> {
        let i = self.locations.iter().position(|l| l == from)?;
        let j = self.locations.iter().position(|l| l == to)?;
        Some(self.lags[i][j])
    }

    /// Ordered pairs `(from, to, lag)` with a positive lag.
    pub fn positive_lags(&self) -> impl Iterator<Item = (usize, usize, u32)> + '_ {
        let n = self.locations.len();
        (0..n)
            .cartesian_product(0..n)
            .map(|(i, j)| (i, j, self.lags[i][j]))
            .filter(|&(_, _, lag)| lag > 0)
    }

    /// Largest entry.
    pub fn max_lag(&self) -> u32 {
        self.lags.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Rows as slices.
    pub fn rows(&self) -> &[Vec<u32>] {
        &self.lags
    }
}

/// Minimal lag from one window sequence to another.
///
/// Largest `j - i` (`j > i`, 0-based) with `to[j]` starting before
/// `from[i]` ends plus `buffer_minutes`, or 0 when no forward transition
/// is blocked.
pub fn min_lag_between(from: &[SlotWindow], to: &[SlotWindow], buffer_minutes: u32) -> u32 {
    from.iter()
        .enumerate()
        .flat_map(|(i, wf)| {
            to.iter()
                .enumerate()
                .skip(i + 1)
                .filter(move |(_, wt)| wf.blocks(wt, buffer_minutes))
                .map(move |(j, _)| j - i)
        })
        .max()
        .map_or(0, |lag| u32::try_from(lag).unwrap_or(u32::MAX))
}

/// Derives the minimal travel-lag matrix for a grid.
///
/// Pure function of the grid windows and buffer: repeated calls return
/// identical matrices, and a larger buffer never yields a smaller entry.
pub fn compute_min_travel_lags(grid: &TimeGrid, buffer_minutes: u32) -> TravelMatrix {
    let locations = grid.locations();
    let mut matrix = TravelMatrix::zeros(grid.location_names().map(str::to_owned).collect());
    for ((i, from), (j, to)) in locations
        .iter()
        .enumerate()
        .cartesian_product(locations.iter().enumerate())
    {
        if i == j {
            continue;
        }
        matrix.set(i, j, min_lag_between(&from.windows, &to.windows, buffer_minutes));
    }
    matrix
}

/// Unordered location pairs whose slot windows differ.
pub fn divergent_pairs(grid: &TimeGrid) -> Vec<(String, String)> {
    grid.locations()
        .iter()
        .tuple_combinations()
        .filter(|(a, b)| a.windows != b.windows)
        .map(|(a, b)| (a.name.clone(), b.name.clone()))
        .collect()
}
