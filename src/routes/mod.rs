// Route exports
pub mod recommendations;
pub mod regions;

pub use recommendations::{AppState, TargetLimits};

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(recommendations::configure)
            .configure(regions::configure),
    );
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::Recommender;
    use crate::models::{CandidateEntity, EntityKind};
    use crate::region::{ExpansionPlanner, ExpansionWeights, RegionNormalizer, RegionTable};
    use crate::services::CandidateStore;
    use std::sync::Arc;

    fn entity(id: &str, kind: EntityKind, region: &str, embedding: Vec<f32>) -> CandidateEntity {
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

    pub(crate) fn test_state() -> AppState {
        let store = CandidateStore::from_entities(vec![
            entity("j1", EntityKind::Job, "Jeonbuk Gochang County", vec![1.0, 0.0]),
            entity("j2", EntityKind::Job, "Jeonbuk Gochang County", vec![0.6, 0.8]),
            entity("j3", EntityKind::Job, "Gyeongbuk Andong City", vec![0.0, 1.0]),
            entity("a1", EntityKind::Attraction, "Jeju City", vec![0.0, 1.0]),
            entity("a2", EntityKind::Attraction, "Jeonbuk Gimje City", vec![1.0, 0.0]),
        ])
        .unwrap();

        let normalizer = RegionNormalizer::new(Arc::new(RegionTable::bundled().unwrap()));
        let planner = ExpansionPlanner::new(normalizer, ExpansionWeights::default());

        AppState {
            recommender: Arc::new(Recommender::with_defaults(planner)),
            store: Arc::new(store),
            limits: TargetLimits {
                default_target_count: 10,
                max_target_count: 100,
            },
        }
    }
}
