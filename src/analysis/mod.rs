//! Event analytics.
//!
//! Normalization, rate rules and the aggregation passes that feed the
//! dashboard views.

pub mod aggregator;
pub mod metrics;
pub mod normalize;

pub use aggregator::*;
pub use metrics::{conversion_rate, roi, ROI_SENTINEL};
pub use normalize::{NormalizedEvent, OTHER_CATEGORY};
