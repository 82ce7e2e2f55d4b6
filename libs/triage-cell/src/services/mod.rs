pub mod classifier;
pub mod dispatch;
pub mod geo;
pub mod matcher;

pub use classifier::{SymptomClassifier, TriageRule, TriageRuleTable};
pub use dispatch::EmergencyDispatchService;
pub use geo::haversine_km;
pub use matcher::{rank_hospitals, MatchRequest, LOW_CONFIDENCE_THRESHOLD, MAX_CANDIDATES};
