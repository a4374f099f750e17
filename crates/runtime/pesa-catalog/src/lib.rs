//! Category/Video catalog -- row-to-view mapping, premium gating, and the
//! admin CRUD operations.

pub mod admin;
pub mod view;

pub use admin::{delete_category, delete_video, save_category, save_video, AdminError};
pub use view::{gate, video_cards, videos_in_category, VideoCard, WatchDecision};
