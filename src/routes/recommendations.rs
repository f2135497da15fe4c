use actix_web::{web, HttpResponse, Responder};
use std::collections::BTreeMap;
use std::sync::Arc;
use validator::Validate;

use crate::core::{scoring::describe_profile, EngineError, RecommendationResult, Recommender};
use crate::models::{
    BundleRecommendationsRequest, BundleRecommendationsResponse, EntityKind, ErrorResponse,
    FindRecommendationsRequest, FindRecommendationsResponse, HealthResponse, KindDiagnosis, KindRecommendations,
    PoolDiagnosisResponse, RecommendationItem,
};
use crate::services::CandidateStore;

/// Regions listed per kind by the pool diagnosis
const TOP_REGIONS: usize = 10;

/// Bounds applied to requested result counts
#[derive(Debug, Clone, Copy)]
pub struct TargetLimits {
    pub default_target_count: usize,
    pub max_target_count: usize,
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub store: Arc<CandidateStore>,
    pub limits: TargetLimits,
}

/// Configure recommendation and pool routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/recommendations/find", web::post().to(find_recommendations))
        .route("/recommendations/bundle", web::post().to(bundle_recommendations))
        .route("/pool/diagnosis", web::get().to(pool_diagnosis));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.store.is_empty() { "degraded" } else { "healthy" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        jobs: state.store.len(EntityKind::Job),
        attractions: state.store.len(EntityKind::Attraction),
    })
}

fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

fn engine_error(err: EngineError) -> HttpResponse {
    tracing::info!("Rejected recommendation request: {}", err);
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Invalid recommendation request".to_string(),
        message: err.to_string(),
        status_code: 400,
    })
}

fn items(result: &RecommendationResult) -> Vec<RecommendationItem> {
    result.results.iter().map(RecommendationItem::from).collect()
}

/// Find recommendations endpoint
///
/// POST /api/v1/recommendations/find
///
/// Request body:
/// ```json
/// {
///   "kind": "job|attraction",
///   "embedding": [0.12, -0.40],
///   "regionFilter": ["Gochang County"],
///   "keywordFilter": ["strawberry"],
///   "targetCount": 10,
///   "excludeIds": ["string"]
/// }
/// ```
async fn find_recommendations(
    state: web::Data<AppState>,
    req: web::Json<FindRecommendationsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find request: {:?}", errors);
        return validation_error(errors);
    }

    let query = req.to_query(state.limits.default_target_count, state.limits.max_target_count);
    tracing::info!(
        "Finding {} {}s for regions {:?}",
        query.target_count,
        req.kind,
        query.region_filter
    );

    let result = match state.recommender.recommend(req.kind, &query, state.store.as_ref()) {
        Ok(result) => result,
        Err(e) => return engine_error(e),
    };

    let recommendations = items(&result);
    HttpResponse::Ok().json(FindRecommendationsResponse {
        request_id: uuid::Uuid::new_v4(),
        generated_at: chrono::Utc::now(),
        total_results: recommendations.len(),
        recommendations,
        diagnostics: result.diagnostics,
    })
}

/// Jobs and attractions for one preference vector
///
/// POST /api/v1/recommendations/bundle
async fn bundle_recommendations(
    state: web::Data<AppState>,
    req: web::Json<BundleRecommendationsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let limits = state.limits;
    let rank = |kind: EntityKind| -> Result<KindRecommendations, EngineError> {
        let query = req.to_query(kind, limits.default_target_count, limits.max_target_count);
        let result = state.recommender.recommend(kind, &query, state.store.as_ref())?;
        Ok(KindRecommendations {
            recommendations: items(&result),
            diagnostics: result.diagnostics,
        })
    };

    let jobs = match rank(EntityKind::Job) {
        Ok(jobs) => jobs,
        Err(e) => return engine_error(e),
    };
    let attractions = match rank(EntityKind::Attraction) {
        Ok(attractions) => attractions,
        Err(e) => return engine_error(e),
    };

    let weights = state.recommender.weights();
    let scoring: BTreeMap<EntityKind, String> = EntityKind::ALL
        .iter()
        .map(|&kind| (kind, describe_profile(weights.for_kind(kind))))
        .collect();

    HttpResponse::Ok().json(BundleRecommendationsResponse {
        request_id: uuid::Uuid::new_v4(),
        generated_at: chrono::Utc::now(),
        jobs,
        attractions,
        scoring,
    })
}

/// Entity counts and most common regions per kind
///
/// GET /api/v1/pool/diagnosis
async fn pool_diagnosis(state: web::Data<AppState>) -> impl Responder {
    let diagnose = |kind: EntityKind| KindDiagnosis {
        total: state.store.len(kind),
        usable: state.store.usable_count(kind),
        top_regions: state.store.region_histogram(kind, TOP_REGIONS),
    };

    HttpResponse::Ok().json(PoolDiagnosisResponse {
        generated_at: chrono::Utc::now(),
        jobs: diagnose(EntityKind::Job),
        attractions: diagnose(EntityKind::Attraction),
    })
}
