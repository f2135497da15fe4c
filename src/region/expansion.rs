use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::normalizer::RegionNormalizer;
use super::table::fold_key;
use crate::models::{ExpansionLevel, RegionLevel};

/// Weights of the levels that follow the literal input (which is always 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpansionWeights {
    /// Synonyms of the same subregion
    pub alias: f64,
    /// Whole province when the user named a subregion
    pub province_with_subregion: f64,
    /// Province synonyms when the user named a province
    pub province_only: f64,
    /// Provinces bordering the requested one
    pub adjacent: f64,
}

impl ExpansionWeights {
    /// Weights clamped into (0, 1]
    pub fn sanitized(self) -> Self {
        let clamp = |w: f64| if w.is_finite() { w.clamp(f64::EPSILON, 1.0) } else { 1.0 };
        Self {
            alias: clamp(self.alias),
            province_with_subregion: clamp(self.province_with_subregion),
            province_only: clamp(self.province_only),
            adjacent: clamp(self.adjacent),
        }
    }
}

impl Default for ExpansionWeights {
    fn default() -> Self {
        Self {
            alias: 0.9,
            province_with_subregion: 0.7,
            province_only: 0.9,
            adjacent: 0.4,
        }
    }
}

/// Ordered levels plus the inputs that matched no administrative unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionPlan {
    pub levels: Vec<ExpansionLevel>,
    pub unresolved: Vec<String>,
}

/// Builds progressively broader region-match levels with decaying weights
#[derive(Debug, Clone)]
pub struct ExpansionPlanner {
    normalizer: RegionNormalizer,
    weights: ExpansionWeights,
}

impl ExpansionPlanner {
    pub fn new(normalizer: RegionNormalizer, weights: ExpansionWeights) -> Self {
        Self {
            normalizer,
            weights: weights.sanitized(),
        }
    }

    pub fn normalizer(&self) -> &RegionNormalizer {
        &self.normalizer
    }

    pub fn weights(&self) -> &ExpansionWeights {
        &self.weights
    }

    /// Expansion levels for `region_filter`, weight-descending
    pub fn plan<S: AsRef<str>>(&self, region_filter: &[S]) -> Vec<ExpansionLevel> {
        self.plan_with_report(region_filter).levels
    }

    /// Like [`plan`](Self::plan), also reporting unresolved inputs
    ///
    /// Level 0 carries every non-generic input verbatim at weight 1.0. Each
    /// resolved input then contributes alias, province and adjacent levels.
    /// Levels sharing a label and weight are merged and a pattern appears
    /// only in the first (highest weight) level that mentions it.
    pub fn plan_with_report<S: AsRef<str>>(&self, region_filter: &[S]) -> RegionPlan {
        let inputs = self.normalizer.sanitize_filter(region_filter);
        if inputs.is_empty() {
            return RegionPlan {
                levels: Vec::new(),
                unresolved: Vec::new(),
            };
        }

        let table = self.normalizer.table();
        let mut levels = vec![ExpansionLevel::new(inputs.clone(), 1.0, RegionLevel::Exact)];
        let mut unresolved = Vec::new();

        for input in &inputs {
            let Some(resolved) = self.normalizer.resolve(input) else {
                unresolved.push(input.clone());
                continue;
            };

            match resolved.subregion {
                Some(sub_ref) => {
                    merge_into(
                        &mut levels,
                        RegionLevel::Alias,
                        self.weights.alias,
                        table.subregion_patterns(sub_ref),
                    );
                    merge_into(
                        &mut levels,
                        RegionLevel::Province,
                        self.weights.province_with_subregion,
                        table.province_patterns(resolved.province),
                    );
                }
                None => merge_into(
                    &mut levels,
                    RegionLevel::Province,
                    self.weights.province_only,
                    table.province_patterns(resolved.province),
                ),
            }

            let adjacent = table
                .neighbors(resolved.province)
                .iter()
                .flat_map(|&n| table.province_patterns(n))
                .collect();
            merge_into(&mut levels, RegionLevel::Adjacent, self.weights.adjacent, adjacent);
        }

        levels.sort_by(|a, b| {
            b.weight
                .total_cmp(&a.weight)
                .then_with(|| label_rank(a.label).cmp(&label_rank(b.label)))
        });

        let mut seen = HashSet::new();
        for level in &mut levels {
            level.region_patterns.retain(|pattern| {
                let key = fold_key(pattern);
                !key.is_empty() && seen.insert(key)
            });
        }
        levels.retain(|level| !level.region_patterns.is_empty());

        RegionPlan { levels, unresolved }
    }
}

fn merge_into(levels: &mut Vec<ExpansionLevel>, label: RegionLevel, weight: f64, patterns: Vec<String>) {
    if patterns.is_empty() {
        return;
    }
    match levels
        .iter_mut()
        .find(|level| level.label == label && level.weight == weight)
    {
        Some(level) => level.region_patterns.extend(patterns),
        None => levels.push(ExpansionLevel::new(patterns, weight, label)),
    }
}

fn label_rank(label: RegionLevel) -> u8 {
    match label {
        RegionLevel::Exact => 0,
        RegionLevel::Alias => 1,
        RegionLevel::Province => 2,
        RegionLevel::Adjacent => 3,
        RegionLevel::Nationwide => 4,
        RegionLevel::ClosestMatch => 5,
    }
}
