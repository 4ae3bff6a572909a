pub mod asset;
pub mod event;
pub mod role;
pub mod storage;
pub mod time_range;

pub use asset::{AssetCategory, AssetFormats, AssetStatus, ParseEnumError};
pub use event::EventType;
pub use role::UserRole;
pub use time_range::TimeRange;
