// Integration tests for Rural Planner Algo

use ruralplanner_algo::core::{DataQualityIssue, EngineError, Recommender, RecommenderOptions, SearchOutcome};
use ruralplanner_algo::models::{CandidateEntity, EntityKind, RegionLevel, UserQueryProfile};
use ruralplanner_algo::region::{ExpansionPlanner, ExpansionWeights, RegionNormalizer, RegionTable};
use ruralplanner_algo::services::{CandidateSource, CandidateStore};
use ruralplanner_algo::{KeywordMatcher, ScoringWeights};
use std::collections::HashSet;
use std::sync::Arc;

fn create_entity(id: &str, kind: EntityKind, region: &str, embedding: Vec<f32>) -> CandidateEntity {
    CandidateEntity {
        id: id.to_string(),
        kind,
        name: format!("Entity {}", id),
        region: region.to_string(),
        embedding,
        description: None,
        keywords: vec![],
    }
}

fn create_job(id: &str, region: &str, embedding: Vec<f32>) -> CandidateEntity {
    create_entity(id, EntityKind::Job, region, embedding)
}

fn create_recommender(options: RecommenderOptions) -> Recommender {
    let normalizer = RegionNormalizer::new(Arc::new(RegionTable::bundled().unwrap()));
    let planner = ExpansionPlanner::new(normalizer, ExpansionWeights::default());
    Recommender::new(planner, KeywordMatcher::default(), ScoringWeights::default(), options)
}

/// 3 jobs in Gochang and 50 elsewhere in Jeonbuk, all with the same embedding
fn gochang_pool() -> CandidateStore {
    let mut entities: Vec<CandidateEntity> = (0..3)
        .map(|i| create_job(&format!("exact-{}", i), "Jeonbuk Gochang County", vec![1.0, 0.0]))
        .collect();
    entities.extend(
        (0..50).map(|i| create_job(&format!("province-{:02}", i), "Jeonbuk Gimje City", vec![1.0, 0.0])),
    );
    entities.push(create_job("elsewhere", "Gyeongbuk Andong City", vec![1.0, 0.0]));
    CandidateStore::from_entities(entities).unwrap()
}

fn assert_unique_ids(results: &[ruralplanner_algo::ScoredResult]) {
    let mut seen = HashSet::new();
    for result in results {
        assert!(seen.insert(result.entity.id.clone()), "duplicate id {}", result.entity.id);
    }
}

#[test]
fn test_integration_subregion_expands_to_province() {
    let engine = create_recommender(RecommenderOptions::default());
    let query = UserQueryProfile::new(vec![1.0, 0.0], 10).with_regions(["Gochang County"]);

    let result = engine.recommend(EntityKind::Job, &query, &gochang_pool()).unwrap();

    assert_eq!(result.results.len(), 10);
    assert_unique_ids(&result.results);

    let exact: Vec<_> = result.results.iter().filter(|r| r.region_weight == 1.0).collect();
    let province: Vec<_> = result.results.iter().filter(|r| r.region_weight == 0.7).collect();
    assert_eq!(exact.len(), 3);
    assert_eq!(province.len(), 7);
    assert!(exact.iter().all(|r| r.region_label == RegionLevel::Exact));
    assert!(province.iter().all(|r| r.region_label == RegionLevel::Province));

    // exact matches outrank province matches with equal vectors
    assert!(result.results[..3].iter().all(|r| r.region_weight == 1.0));

    let diagnostics = &result.diagnostics;
    assert_eq!(diagnostics.outcome, SearchOutcome::Satisfied);
    assert_eq!(diagnostics.levels[0].added, 3);
    assert_eq!(diagnostics.levels[1].label, RegionLevel::Alias);
    assert_eq!(diagnostics.levels[1].added, 0);
    assert_eq!(diagnostics.levels[2].added, 50);
    // adjacent level never ran
    assert_eq!(diagnostics.levels.len(), 3);
}

#[test]
fn test_integration_nationwide_small_pool() {
    let engine = create_recommender(RecommenderOptions::default());
    let pool = CandidateStore::from_entities(
        (0..5)
            .map(|i| create_job(&format!("j{}", i), "Jeju Seogwipo City", vec![1.0, i as f32]))
            .collect(),
    )
    .unwrap();

    let query = UserQueryProfile::new(vec![1.0, 0.5], 10);
    let result = engine.recommend(EntityKind::Job, &query, &pool).unwrap();

    assert_eq!(result.results.len(), 5);
    assert!(result.results.iter().all(|r| r.region_weight == 1.0));
    assert!(result.results.iter().all(|r| r.region_label == RegionLevel::Nationwide));
    assert_eq!(result.diagnostics.outcome, SearchOutcome::Nationwide);
}

#[test]
fn test_integration_zero_query_vector() {
    let engine = create_recommender(RecommenderOptions::default());
    let query = UserQueryProfile::new(vec![0.0, 0.0], 5).with_regions(["Jeonbuk"]);

    let result = engine.recommend(EntityKind::Job, &query, &gochang_pool()).unwrap();

    assert!(!result.results.is_empty());
    assert!(result.results.iter().all(|r| r.vector_score == 0.0));
    assert!(result
        .diagnostics
        .issues
        .contains(&DataQualityIssue::DegenerateVector { entity_id: None }));
}

#[test]
fn test_integration_zero_candidate_vector() {
    let engine = create_recommender(RecommenderOptions::default());
    let pool = CandidateStore::from_entities(vec![
        create_job("flat", "Jeonbuk Gochang County", vec![0.0, 0.0]),
        create_job("aligned", "Jeonbuk Gochang County", vec![1.0, 0.0]),
    ])
    .unwrap();
    let query = UserQueryProfile::new(vec![1.0, 0.0], 2).with_regions(["Gochang County"]);

    let result = engine.recommend(EntityKind::Job, &query, &pool).unwrap();

    assert_eq!(result.results.len(), 2);
    let flat = result.results.iter().find(|r| r.entity.id == "flat").unwrap();
    assert_eq!(flat.vector_score, 0.0);
    assert_eq!(result.results[0].entity.id, "aligned");
    assert!(result.diagnostics.issues.contains(&DataQualityIssue::DegenerateVector {
        entity_id: Some("flat".to_string())
    }));
    assert!(!result
        .diagnostics
        .issues
        .contains(&DataQualityIssue::DegenerateVector { entity_id: None }));
}

#[test]
fn test_integration_closest_match_fallback() {
    let engine = create_recommender(RecommenderOptions::default());
    let pool = CandidateStore::from_entities(vec![
        create_job("jeju", "Jeju Seogwipo City", vec![0.0, 1.0]),
        create_job("near", "Gyeongbuk Andong City", vec![1.0, 0.1]),
        create_job("far", "Gangwon Sokcho City", vec![-1.0, 0.0]),
        create_job("mid", "Chungnam Nonsan City", vec![0.5, 0.5]),
    ])
    .unwrap();

    let query = UserQueryProfile::new(vec![1.0, 0.0], 3).with_regions(["Seogwipo"]);
    let result = engine.recommend(EntityKind::Job, &query, &pool).unwrap();

    assert_eq!(result.results.len(), 3);
    assert_unique_ids(&result.results);
    assert_eq!(result.diagnostics.outcome, SearchOutcome::ExhaustedWithFallback);
    assert_eq!(result.diagnostics.fallback_added, 2);

    let fallback: Vec<&str> = result
        .results
        .iter()
        .filter(|r| r.is_closest_match())
        .map(|r| r.entity.id.as_str())
        .collect();
    assert_eq!(fallback.len(), 2);
    assert!(fallback.contains(&"near"));
    assert!(fallback.contains(&"mid"));

    for result in result.results.iter().filter(|r| r.is_closest_match()) {
        assert_eq!(result.region_weight, 0.0);
        assert!(result.explanation.contains("closest-match"));
    }
}

#[test]
fn test_integration_target_reached_returns_exact_count() {
    let engine = create_recommender(RecommenderOptions::default());
    for target in [1, 3, 7, 20] {
        let query = UserQueryProfile::new(vec![1.0, 0.0], target).with_regions(["Jeonbuk"]);
        let result = engine.recommend(EntityKind::Job, &query, &gochang_pool()).unwrap();
        assert_eq!(result.results.len(), target);
        assert_unique_ids(&result.results);
    }
}

#[test]
fn test_integration_never_exceeds_target() {
    let engine = create_recommender(RecommenderOptions::default());
    let query = UserQueryProfile::new(vec![1.0, 0.0], 4);
    let result = engine.recommend(EntityKind::Job, &query, &gochang_pool()).unwrap();
    assert_eq!(result.results.len(), 4);
}

#[test]
fn test_integration_idempotent() {
    let engine = create_recommender(RecommenderOptions::default());
    let pool = gochang_pool();
    let query = UserQueryProfile::new(vec![0.3, 0.7], 12)
        .with_regions(["Gochang", "Andong"])
        .with_keywords(["entity"]);

    let first = engine.recommend(EntityKind::Job, &query, &pool).unwrap();
    let second = engine.recommend(EntityKind::Job, &query, &pool).unwrap();

    let ids = |r: &ruralplanner_algo::RecommendationResult| -> Vec<String> {
        r.results.iter().map(|s| s.entity.id.clone()).collect()
    };
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn test_integration_exclude_ids() {
    let engine = create_recommender(RecommenderOptions::default());
    let query = UserQueryProfile::new(vec![1.0, 0.0], 60)
        .with_regions(["Gochang County"])
        .excluding(["exact-0", "elsewhere"]);

    let result = engine.recommend(EntityKind::Job, &query, &gochang_pool()).unwrap();

    assert!(result
        .results
        .iter()
        .all(|r| r.entity.id != "exact-0" && r.entity.id != "elsewhere"));
    assert_eq!(result.results.len(), 52);
}

#[test]
fn test_integration_unknown_region_reported() {
    let engine = create_recommender(RecommenderOptions::default());
    let query = UserQueryProfile::new(vec![1.0, 0.0], 2).with_regions(["Atlantis"]);

    let result = engine.recommend(EntityKind::Job, &query, &gochang_pool()).unwrap();

    assert!(result.diagnostics.issues.contains(&DataQualityIssue::UnknownRegion {
        region: "Atlantis".to_string()
    }));
    assert_eq!(result.results.len(), 2);
    assert!(result.results.iter().all(|r| r.is_closest_match()));
}

#[test]
fn test_integration_empty_pool() {
    let engine = create_recommender(RecommenderOptions::default());
    let query = UserQueryProfile::new(vec![1.0, 0.0], 5);

    let result = engine
        .recommend(EntityKind::Attraction, &query, &gochang_pool())
        .unwrap();

    assert!(result.results.is_empty());
    assert!(result.diagnostics.issues.contains(&DataQualityIssue::EmptyCandidatePool {
        kind: EntityKind::Attraction
    }));
}

#[test]
fn test_integration_dimension_mismatch() {
    let engine = create_recommender(RecommenderOptions::default());
    let query = UserQueryProfile::new(vec![1.0, 0.0, 0.0], 5);
    let err = engine
        .recommend(EntityKind::Job, &query, &gochang_pool())
        .unwrap_err();
    assert!(matches!(err, EngineError::DimensionMismatch { .. }));
}

#[test]
fn test_integration_expansion_threshold_configurable() {
    let query = UserQueryProfile::new(vec![1.0, 0.0], 2).with_regions(["Gochang County"]);

    let eager = create_recommender(RecommenderOptions {
        min_results_before_expanding: 1,
        ..RecommenderOptions::default()
    });
    let result = eager.recommend(EntityKind::Job, &query, &gochang_pool()).unwrap();
    assert_eq!(result.diagnostics.levels.len(), 1);
    assert_eq!(result.results.len(), 2);

    let thorough = create_recommender(RecommenderOptions {
        min_results_before_expanding: 40,
        ..RecommenderOptions::default()
    });
    let result = thorough.recommend(EntityKind::Job, &query, &gochang_pool()).unwrap();
    // below the threshold after the exact level, so one broader level runs,
    // and the target already met there ends the expansion
    assert_eq!(result.diagnostics.levels.len(), 2);
    assert_eq!(result.diagnostics.levels[1].label, RegionLevel::Alias);
    assert_eq!(result.results.len(), 2);
    assert!(result.results.iter().all(|r| r.region_weight == 1.0));
}

#[test]
fn test_integration_expansion_stops_at_target() {
    let engine = create_recommender(RecommenderOptions::default());
    let pool = CandidateStore::from_entities(vec![
        create_job("exact-a", "Jeonbuk Gochang County", vec![0.0, 1.0]),
        create_job("exact-b", "Jeonbuk Gochang County", vec![0.0, 1.0]),
        create_job("province", "Jeonbuk Gimje City", vec![1.0, 0.0]),
    ])
    .unwrap();
    let query = UserQueryProfile::new(vec![1.0, 0.0], 2).with_regions(["Gochang County"]);

    let result = engine.recommend(EntityKind::Job, &query, &pool).unwrap();

    let levels: Vec<(RegionLevel, usize)> = result.diagnostics.levels.iter().map(|l| (l.label, l.added)).collect();
    assert_eq!(levels, vec![(RegionLevel::Exact, 2), (RegionLevel::Alias, 0)]);
    assert_eq!(result.diagnostics.outcome, SearchOutcome::Satisfied);

    let ids: Vec<&str> = result.results.iter().map(|r| r.entity.id.as_str()).collect();
    assert_eq!(ids, vec!["exact-a", "exact-b"]);
    assert!(result.results.iter().all(|r| r.region_label == RegionLevel::Exact));
}

#[test]
fn test_integration_custom_source_as_trait_object() {
    struct Fixed(Vec<Arc<CandidateEntity>>);

    impl CandidateSource for Fixed {
        fn fetch_candidates(&self, _kind: EntityKind, _pattern: &str) -> Vec<Arc<CandidateEntity>> {
            Vec::new()
        }

        fn fetch_all(&self, _kind: EntityKind) -> Vec<Arc<CandidateEntity>> {
            self.0.clone()
        }
    }

    let source: Box<dyn CandidateSource> = Box::new(Fixed(vec![Arc::new(create_job(
        "only",
        "Jeju City",
        vec![1.0, 0.0],
    ))]));

    let engine = create_recommender(RecommenderOptions::default());
    let query = UserQueryProfile::new(vec![1.0, 0.0], 1).with_regions(["Jeju"]);
    let result = engine.recommend(EntityKind::Job, &query, source.as_ref()).unwrap();

    assert_eq!(result.results.len(), 1);
    assert!(result.results[0].is_closest_match());
}

#[test]
fn test_integration_bundled_snapshot() {
    let json = include_str!("../data/candidates.json");
    let store = CandidateStore::from_json_str(json).unwrap();
    let engine = create_recommender(RecommenderOptions::default());

    let dims = store.fetch_all(EntityKind::Job)[0].embedding.len();
    let mut embedding = vec![0.0; dims];
    embedding[0] = 1.0;

    for kind in EntityKind::ALL {
        let query = UserQueryProfile::new(embedding.clone(), 5).with_regions(["고창"]);
        let result = engine.recommend(kind, &query, &store).unwrap();
        assert_eq!(result.results.len(), 5);
        assert_unique_ids(&result.results);
        assert_eq!(result.results.iter().filter(|r| r.region_weight == 1.0).count(), 0);
    }
}
