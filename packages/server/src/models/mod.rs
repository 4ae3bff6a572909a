pub mod admin;
pub mod analytics;
pub mod asset;
pub mod auth;
pub mod creator;
pub mod shared;
