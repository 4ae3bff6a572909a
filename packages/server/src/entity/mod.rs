pub mod analytics_event;
pub mod asset;
pub mod user;
