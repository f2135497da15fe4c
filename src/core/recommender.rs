use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::core::{
    error::{DataQualityIssue, EngineError},
    keywords::KeywordMatcher,
    scoring::{calculate_final_score, explain},
    similarity::{cosine_similarity, is_degenerate},
};
use crate::models::{CandidateEntity, EntityKind, RegionLevel, ScoredResult, ScoringWeights, UserQueryProfile};
use crate::region::{ExpansionPlanner, RegionNormalizer};
use crate::services::CandidateSource;

/// Tunables of the accumulation loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommenderOptions {
    /// Keep expanding until at least this many unique results are found
    pub min_results_before_expanding: usize,
    /// Fill remaining slots from the whole pool when every level is exhausted
    pub closest_match_fallback: bool,
    /// Region weight given to closest-match results
    pub fallback_region_weight: f64,
    /// Reject candidates below this vector score unless a keyword matched
    pub similarity_floor: Option<f64>,
}

impl Default for RecommenderOptions {
    fn default() -> Self {
        Self {
            min_results_before_expanding: 5,
            closest_match_fallback: true,
            fallback_region_weight: 0.0,
            similarity_floor: None,
        }
    }
}

/// How a recommendation call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchOutcome {
    /// No region filter: the whole pool at region weight 1.0
    Nationwide,
    /// The region levels produced enough results
    Satisfied,
    /// Every level consumed and still short of the target
    Exhausted,
    /// Exhausted, then topped up from the whole pool
    ExhaustedWithFallback,
}

/// What one expansion level contributed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelReport {
    pub label: RegionLevel,
    pub weight: f64,
    pub patterns: Vec<String>,
    /// Entities returned by the source, summed over patterns
    pub fetched: usize,
    /// New unique results admitted at this level
    pub added: usize,
}

/// Trace of one recommendation call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchDiagnostics {
    pub kind: EntityKind,
    pub outcome: SearchOutcome,
    pub region_filter: Vec<String>,
    pub levels: Vec<LevelReport>,
    pub candidates_considered: usize,
    pub skipped_unusable: usize,
    pub fallback_added: usize,
    pub returned: usize,
    pub issues: Vec<DataQualityIssue>,
}

/// Ranked results and the diagnostics that produced them
#[derive(Debug, Clone)]
pub struct RecommendationResult {
    pub results: Vec<ScoredResult>,
    pub diagnostics: SearchDiagnostics,
}

/// Region-aware recommendation engine
///
/// Built once and shared; holds no per-call state.
///
/// # Pipeline
/// 1. Nationwide scan when the region filter is empty or generic
/// 2. Exact level, then progressively broader levels until enough results
/// 3. Closest-match fallback over the whole pool
/// 4. Sort by final score, then name, then id, and truncate
#[derive(Debug, Clone)]
pub struct Recommender {
    planner: ExpansionPlanner,
    keywords: KeywordMatcher,
    weights: ScoringWeights,
    options: RecommenderOptions,
}

impl Recommender {
    pub fn new(
        planner: ExpansionPlanner,
        keywords: KeywordMatcher,
        weights: ScoringWeights,
        options: RecommenderOptions,
    ) -> Self {
        Self {
            planner,
            keywords,
            weights,
            options,
        }
    }

    pub fn with_defaults(planner: ExpansionPlanner) -> Self {
        Self::new(
            planner,
            KeywordMatcher::default(),
            ScoringWeights::default(),
            RecommenderOptions::default(),
        )
    }

    pub fn planner(&self) -> &ExpansionPlanner {
        &self.planner
    }

    pub fn normalizer(&self) -> &RegionNormalizer {
        self.planner.normalizer()
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn options(&self) -> &RecommenderOptions {
        &self.options
    }

    /// Rank candidates of `kind` for `query`
    ///
    /// # Returns
    /// At most `query.target_count` id-unique results in a deterministic
    /// order. Fails only on programmer errors (zero target, mismatched
    /// embedding dimensions).
    pub fn recommend<S: CandidateSource + ?Sized>(
        &self,
        kind: EntityKind,
        query: &UserQueryProfile,
        source: &S,
    ) -> Result<RecommendationResult, EngineError> {
        if query.target_count == 0 {
            return Err(EngineError::InvalidTargetCount);
        }

        let target = query.target_count;
        let plan = self.planner.plan_with_report(&query.region_filter);
        let mut acc = Accumulator::new(self, kind, query);

        if is_degenerate(&query.embedding) {
            tracing::warn!("Query embedding has zero magnitude; vector scores will be 0");
            acc.issues.push(DataQualityIssue::DegenerateVector { entity_id: None });
        }

        for region in &plan.unresolved {
            tracing::warn!("Region '{}' matched no administrative unit", region);
            acc.issues.push(DataQualityIssue::UnknownRegion {
                region: region.clone(),
            });
        }

        let mut levels = Vec::with_capacity(plan.levels.len());
        let mut fallback_added = 0;

        let outcome = if plan.levels.is_empty() {
            let pool = source.fetch_all(kind);
            acc.check_pool(&pool);
            for entity in &pool {
                acc.admit(entity, 1.0, RegionLevel::Nationwide)?;
            }
            SearchOutcome::Nationwide
        } else {
            // The threshold only decides whether to leave the exact level;
            // once expanding, stop at the first level that reaches the target.
            let threshold = target.max(self.options.min_results_before_expanding);

            for (idx, level) in plan.levels.iter().enumerate() {
                if idx == 1 && acc.results.len() >= threshold {
                    break;
                }

                let before = acc.results.len();
                let mut fetched = 0;
                for pattern in &level.region_patterns {
                    let found = source.fetch_candidates(kind, pattern);
                    fetched += found.len();
                    for entity in &found {
                        acc.admit(entity, level.weight, level.label)?;
                    }
                }
                let added = acc.results.len() - before;

                tracing::debug!(
                    "Level {} ({} @ {:.1}): fetched {}, added {}, total {}",
                    idx,
                    level.label,
                    level.weight,
                    fetched,
                    added,
                    acc.results.len()
                );

                levels.push(LevelReport {
                    label: level.label,
                    weight: level.weight,
                    patterns: level.region_patterns.clone(),
                    fetched,
                    added,
                });

                if idx > 0 && acc.results.len() >= target {
                    break;
                }
            }

            if acc.results.is_empty() {
                acc.check_pool(&source.fetch_all(kind));
            }

            if acc.results.len() >= target {
                SearchOutcome::Satisfied
            } else if self.options.closest_match_fallback {
                fallback_added = acc.fill_closest_matches(source, target)?;
                SearchOutcome::ExhaustedWithFallback
            } else {
                SearchOutcome::Exhausted
            }
        };

        let Accumulator {
            results,
            considered,
            skipped_unusable,
            issues,
            ..
        } = acc;

        let mut results: Vec<ScoredResult> = results.into_values().collect();
        sort_results(&mut results);
        results.truncate(target);

        tracing::info!(
            "Recommended {} {}s ({:?}, {} considered, {} fallback)",
            results.len(),
            kind,
            outcome,
            considered,
            fallback_added
        );

        let diagnostics = SearchDiagnostics {
            kind,
            outcome,
            region_filter: query.region_filter.clone(),
            levels,
            candidates_considered: considered,
            skipped_unusable,
            fallback_added,
            returned: results.len(),
            issues,
        };

        Ok(RecommendationResult {
            results,
            diagnostics,
        })
    }
}

/// Final score descending, then name, then id
pub fn sort_results(results: &mut [ScoredResult]) {
    results.sort_by(|a, b| {
        b.final_score
            .total_cmp(&a.final_score)
            .then_with(|| a.entity.name.cmp(&b.entity.name))
            .then_with(|| a.entity.id.cmp(&b.entity.id))
    });
}

/// Per-call state: results keyed by id, first admission wins
struct Accumulator<'a> {
    engine: &'a Recommender,
    kind: EntityKind,
    query: &'a UserQueryProfile,
    excluded: HashSet<&'a str>,
    /// Ids already decided (admitted, rejected or unusable)
    visited: HashSet<String>,
    results: HashMap<String, ScoredResult>,
    considered: usize,
    skipped_unusable: usize,
    issues: Vec<DataQualityIssue>,
}

impl<'a> Accumulator<'a> {
    fn new(engine: &'a Recommender, kind: EntityKind, query: &'a UserQueryProfile) -> Self {
        Self {
            engine,
            kind,
            query,
            excluded: query.exclude_ids.iter().map(String::as_str).collect(),
            visited: HashSet::new(),
            results: HashMap::new(),
            considered: 0,
            skipped_unusable: 0,
            issues: Vec::new(),
        }
    }

    fn check_pool(&mut self, pool: &[Arc<CandidateEntity>]) {
        if !pool.iter().any(|e| e.is_usable()) {
            tracing::warn!("No usable {} candidates in the pool", self.kind);
            let issue = DataQualityIssue::EmptyCandidatePool { kind: self.kind };
            if !self.issues.contains(&issue) {
                self.issues.push(issue);
            }
        }
    }

    /// Score `entity` at `region_weight`; `None` when it must not be admitted
    fn score(
        &mut self,
        entity: &Arc<CandidateEntity>,
        region_weight: f64,
        label: RegionLevel,
    ) -> Result<Option<ScoredResult>, EngineError> {
        if self.excluded.contains(entity.id.as_str()) || !self.visited.insert(entity.id.clone()) {
            return Ok(None);
        }

        if !entity.is_usable() {
            self.skipped_unusable += 1;
            return Ok(None);
        }

        self.considered += 1;
        let vector_score = cosine_similarity(&self.query.embedding, &entity.embedding)?;
        if is_degenerate(&entity.embedding) {
            tracing::debug!("Candidate {} has a zero-magnitude embedding", entity.id);
            self.issues.push(DataQualityIssue::DegenerateVector {
                entity_id: Some(entity.id.clone()),
            });
        }

        let keyword_score = self
            .engine
            .keywords
            .score(&entity.searchable_text(), &self.query.keyword_filter);

        if let Some(floor) = self.engine.options.similarity_floor {
            if vector_score < floor && keyword_score <= 0.0 {
                return Ok(None);
            }
        }

        let final_score = calculate_final_score(
            self.kind,
            vector_score,
            region_weight,
            keyword_score,
            &self.engine.weights,
        );

        Ok(Some(ScoredResult {
            entity: Arc::clone(entity),
            vector_score,
            region_weight,
            region_label: label,
            keyword_score,
            final_score,
            explanation: explain(vector_score, label, region_weight, keyword_score),
        }))
    }

    fn admit(
        &mut self,
        entity: &Arc<CandidateEntity>,
        region_weight: f64,
        label: RegionLevel,
    ) -> Result<(), EngineError> {
        if let Some(scored) = self.score(entity, region_weight, label)? {
            self.results.insert(scored.entity.id.clone(), scored);
        }
        Ok(())
    }

    /// Best entities outside every region level, up to the missing count
    fn fill_closest_matches<S: CandidateSource + ?Sized>(
        &mut self,
        source: &S,
        target: usize,
    ) -> Result<usize, EngineError> {
        let needed = target.saturating_sub(self.results.len());
        let pool = source.fetch_all(self.kind);
        self.check_pool(&pool);

        let weight = self.engine.options.fallback_region_weight;
        let mut closest = Vec::new();
        for entity in &pool {
            if let Some(scored) = self.score(entity, weight, RegionLevel::ClosestMatch)? {
                closest.push(scored);
            }
        }

        sort_results(&mut closest);
        closest.truncate(needed);
        let added = closest.len();
        for scored in closest {
            self.results.insert(scored.entity.id.clone(), scored);
        }

        tracing::debug!("Closest-match fallback added {} of {} needed", added, needed);
        Ok(added)
    }
}
