// Service exports
pub mod candidate_store;

pub use candidate_store::{CandidateSource, CandidateStore, RegionCount, StoreError};
