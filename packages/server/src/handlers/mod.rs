pub mod admin;
pub mod analytics;
pub mod assets;
pub mod auth;
pub mod creator;
