pub mod expansion;
pub mod normalizer;
pub mod table;

pub use expansion::{ExpansionPlanner, ExpansionWeights, RegionPlan};
pub use normalizer::{RegionMatch, RegionNormalizer};
pub use table::{fold_key, strip_admin_suffix, RegionTable, RegionTableError};
