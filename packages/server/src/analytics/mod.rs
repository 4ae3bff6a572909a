//! Event log writes and the creator-facing rollups computed from it.

pub mod rollup;
pub mod service;

pub use service::AnalyticsService;
