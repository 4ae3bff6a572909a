pub mod filename;
pub mod hash;
pub mod image;
pub mod jwt;
pub mod time_ago;
