//! The `DataStore` seam.
//!
//! Runtime crates (catalog, earnings, session hooks) program against this
//! trait; the web tier decides at startup whether it is backed by the hosted
//! store or the in-memory one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pesa_core::{Category, EarningsRecord, Profile, StoreError, Video};

/// Write payload for a category. `None` ids mean insert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub earn_per_video: f64,
    #[serde(default)]
    pub total_views: String,
    #[serde(default)]
    pub video_count: i64,
    #[serde(default)]
    pub premium: bool,
}

/// Write payload for a video.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoDraft {
    #[serde(default)]
    pub category_id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub earn_amount: Option<f64>,
    #[serde(default)]
    pub video_url: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub premium: bool,
}

/// Typed operations the application needs from the backend. The backend owns
/// all correctness-critical state; implementations never cache rows.
#[async_trait]
pub trait DataStore: Send + Sync {
    // -- catalog reads (ordered by created_at ascending) --
    async fn categories(&self) -> Result<Vec<Category>, StoreError>;
    async fn videos(&self) -> Result<Vec<Video>, StoreError>;

    // -- admin writes --
    async fn insert_category(&self, draft: &CategoryDraft) -> Result<(), StoreError>;
    async fn update_category(&self, id: Uuid, draft: &CategoryDraft) -> Result<(), StoreError>;
    /// Deletes the category row only. Cascade ordering is the caller's job
    /// (videos first, then this).
    async fn delete_category_row(&self, id: Uuid) -> Result<(), StoreError>;
    async fn insert_video(&self, draft: &VideoDraft) -> Result<(), StoreError>;
    async fn update_video(&self, id: Uuid, draft: &VideoDraft) -> Result<(), StoreError>;
    async fn delete_video(&self, id: Uuid) -> Result<(), StoreError>;
    async fn delete_videos_in_category(&self, category_id: Uuid) -> Result<(), StoreError>;

    // -- profile / earnings --
    /// The profile row, or `StoreError::MissingRow` for a first-time user.
    async fn profile(&self, user_id: Uuid) -> Result<Profile, StoreError>;
    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError>;
    async fn earnings_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<EarningsRecord>, StoreError>;
    /// Most recent history rows, newest first.
    async fn recent_earnings(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<EarningsRecord>, StoreError>;

    /// The atomic commit primitive: increments the stored balance and
    /// appends a history record in one call. Never emulate this with a
    /// read-modify-write.
    async fn add_earnings_and_log(&self, amount: f64, description: &str)
        -> Result<(), StoreError>;
}
