//! Visitor/host utility weights.
//!
//! Weights are a pure function of (hosts, visitors, alias resolution,
//! [`WeightConfig`]). The result is an immutable [`UtilityWeights`]
//! snapshot; changing the configuration means computing a new one.
//!
//! # Scoring
//!
//! | Rule | Effect |
//! |------|--------|
//! | Any (visitor, host) pair | `base_weight` |
//! | Host is the visitor's rank-`k` request | replaced by `rank_weights[k]` |
//! | Host has the visitor's `k`-th area | `+ area_weights[k]` per match |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Host, Visitor};

/// Weight configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightConfig {
    /// Weight for the request in each rank position (first to fifth choice).
    pub rank_weights: Vec<f64>,
    /// Bonus for each area-preference position (Area1, Area2).
    pub area_weights: Vec<f64>,
    /// Weight of any pair not otherwise scored.
    pub base_weight: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            rank_weights: vec![4.0, 3.0, 2.0, 1.0, 0.5],
            area_weights: vec![1.0, 0.5],
            base_weight: 0.2,
        }
    }
}

impl WeightConfig {
    /// Uses the same weight for every rank.
    pub fn with_uniform_rank_weight(mut self, weight: f64) -> Self {
        self.rank_weights = vec![weight; self.rank_weights.len().max(1)];
        self
    }

    /// Sets the per-rank weights.
    pub fn with_rank_weights(mut self, weights: Vec<f64>) -> Self {
        self.rank_weights = weights;
        self
    }

    /// Sets the per-area weights.
    pub fn with_area_weights(mut self, weights: Vec<f64>) -> Self {
        self.area_weights = weights;
        self
    }

    /// Sets the base weight.
    pub fn with_base_weight(mut self, weight: f64) -> Self {
        self.base_weight = weight;
        self
    }
}

/// A request naming a host that is not scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedRequest {
    /// Requesting visitor.
    pub visitor: String,
    /// Resolved host name as requested.
    pub host: String,
}

/// Computed utility weights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UtilityWeights {
    /// visitor -> host -> weight
    weights: BTreeMap<String, BTreeMap<String, f64>>,
    requests: BTreeMap<String, Vec<String>>,
    unmatched: Vec<UnmatchedRequest>,
}

impl UtilityWeights {
    /// Weight for a (visitor, host) pair; `0.0` for unknown pairs.
    pub fn get(&self, visitor: &str, host: &str) -> f64 {
        self.weights
            .get(visitor)
            .and_then(|row| row.get(host))
            .copied()
            .unwrap_or(0.0)
    }

    /// Matched requests of a visitor, in rank order.
    pub fn requests(&self, visitor: &str) -> &[String] {
        self.requests.get(visitor).map_or(&[], Vec::as_slice)
    }

    /// All matched requests, keyed by visitor.
    pub fn all_requests(&self) -> &BTreeMap<String, Vec<String>> {
        &self.requests
    }

    /// Whether `visitor` requested `host`.
    pub fn is_requested(&self, visitor: &str, host: &str) -> bool {
        self.requests(visitor).iter().any(|h| h == host)
    }

    /// Requests naming hosts outside the scheduled pool.
    pub fn unmatched(&self) -> &[UnmatchedRequest] {
        &self.unmatched
    }

    /// Iterates `(visitor, host, weight)` in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.weights.iter().flat_map(|(v, row)| {
            row.iter()
                .map(move |(h, &w)| (v.as_str(), h.as_str(), w))
        })
    }

    /// Number of scored pairs.
    pub fn len(&self) -> usize {
        self.weights.values().map(BTreeMap::len).sum()
    }

    /// Whether no pair is scored.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Computes utility weights for every (visitor, host) pair.
///
/// `resolve` maps a (normalised) requested name to its canonical host
/// name. Requests resolving to a host not in `hosts` are reported in
/// [`UtilityWeights::unmatched`] and do not affect any weight.
pub fn compute_utility_weights<F>(
    hosts: &[Host],
    visitors: &[Visitor],
    resolve: F,
    config: &WeightConfig,
) -> UtilityWeights
where
    F: Fn(&str) -> String,
{
    let mut weights: BTreeMap<String, BTreeMap<String, f64>> = visitors
        .iter()
        .map(|v| {
            let row = hosts
                .iter()
                .map(|h| (h.name.clone(), config.base_weight))
                .collect();
            (v.name.clone(), row)
        })
        .collect();

    let mut requests: BTreeMap<String, Vec<String>> = visitors
        .iter()
        .map(|v| (v.name.clone(), Vec::new()))
        .collect();
    let mut unmatched = Vec::new();

    for v in visitors {
        for (rank, raw) in v.ranked_requests() {
            let Some(&rank_weight) = config.rank_weights.get(rank) else {
                continue;
            };
            let name = resolve(raw);
            if hosts.iter().any(|h| h.name == name) {
                weights
                    .entry(v.name.clone())
                    .or_default()
                    .insert(name.clone(), rank_weight);
                requests.entry(v.name.clone()).or_default().push(name);
            } else {
                unmatched.push(UnmatchedRequest {
                    visitor: v.name.clone(),
                    host: name,
                });
            }
        }
    }

    for v in visitors {
        for (pos, area) in v.ranked_areas() {
            let Some(&bonus) = config.area_weights.get(pos) else {
                continue;
            };
            for h in hosts.iter().filter(|h| h.has_area(area)) {
                if let Some(w) = weights.get_mut(&v.name).and_then(|row| row.get_mut(&h.name)) {
                    *w += bonus;
                }
            }
        }
    }

    UtilityWeights {
        weights,
        requests,
        unmatched,
    }
}
