use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use super::recommendations::AppState;
use crate::models::{ErrorResponse, NormalizeRegionQuery, NormalizeRegionResponse, PlanRegionsRequest, PlanRegionsResponse};

/// Configure region inspection routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/regions/normalize", web::get().to(normalize_region))
        .route("/regions/plan", web::post().to(plan_regions));
}

/// GET /api/v1/regions/normalize?text=Jeonbuk%20Gochang-gun
async fn normalize_region(
    state: web::Data<AppState>,
    query: web::Query<NormalizeRegionQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let normalizer = state.recommender.normalizer();
    HttpResponse::Ok().json(NormalizeRegionResponse {
        input: query.text.clone(),
        generic: normalizer.is_generic(&query.text),
        region: normalizer.normalize_region(&query.text),
    })
}

/// Preview the expansion levels for a region filter
///
/// POST /api/v1/regions/plan
async fn plan_regions(
    state: web::Data<AppState>,
    req: web::Json<PlanRegionsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let plan = state.recommender.planner().plan_with_report(&req.region_filter);
    HttpResponse::Ok().json(PlanRegionsResponse {
        region_filter: req.region_filter.clone(),
        nationwide: plan.levels.is_empty(),
        levels: plan.levels,
        unresolved: plan.unresolved,
    })
}
