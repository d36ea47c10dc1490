//! Fund health scoring and zone-risk variance.

pub mod score;
pub mod targets;
pub mod zones;

pub use score::{score_health, HealthBreakdown, HealthScoreResult, HealthStatus, ZONE_TOLERANCE};
pub use targets::AnalyticsTargets;
pub use zones::{zone_variance, ZoneVariance};
