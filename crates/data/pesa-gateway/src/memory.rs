//! In-process `DataStore`.
//!
//! Backs the app when no hosted backend is configured, and gives the runtime
//! crates something real to test against. One instance is bound to one user,
//! the same way a signed-in browser session is.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use pesa_core::{Category, EarningsRecord, Profile, StoreError, Video};

use crate::store::{CategoryDraft, DataStore, VideoDraft};

#[derive(Default)]
struct Inner {
    categories: Vec<Category>,
    videos: Vec<Video>,
    profiles: Vec<Profile>,
    history: Vec<EarningsRecord>,
}

pub struct MemoryStore {
    user_id: Uuid,
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Empty store with a default profile for `user_id`.
    pub fn new(user_id: Uuid) -> Self {
        let inner = Inner {
            profiles: vec![Profile::new_default(user_id)],
            ..Inner::default()
        };
        MemoryStore {
            user_id,
            inner: RwLock::new(inner),
        }
    }

    /// Store pre-filled with demo categories and videos.
    pub fn seeded(user_id: Uuid) -> Self {
        let (categories, videos) = seed_catalog();
        let inner = Inner {
            categories,
            videos,
            profiles: vec![Profile::new_default(user_id)],
            history: Vec::new(),
        };
        MemoryStore {
            user_id,
            inner: RwLock::new(inner),
        }
    }

    /// Without a profile row the store behaves like a first login.
    pub fn without_profile(user_id: Uuid) -> Self {
        MemoryStore {
            user_id,
            inner: RwLock::new(Inner::default()),
        }
    }
}

fn category(title: &str, desc: &str, earn: f64, premium: bool, age_min: i64) -> Category {
    Category {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: desc.to_string(),
        thumbnail: String::new(),
        earn_per_video: earn,
        total_views: "18.7K".to_string(),
        video_count: 0,
        premium,
        created_at: Some(Utc::now() - Duration::minutes(age_min)),
    }
}

fn video(
    category_id: Uuid,
    title: &str,
    minutes: u32,
    earn: f64,
    url: &str,
    premium: bool,
    age_min: i64,
) -> Video {
    Video {
        id: Uuid::new_v4(),
        category_id: Some(category_id),
        title: title.to_string(),
        description: format!("{title}. Watch to the end to earn."),
        duration_minutes: Some(minutes),
        duration: None,
        earn_amount: Some(earn),
        video_url: url.to_string(),
        thumbnail: String::new(),
        premium,
        created_at: Some(Utc::now() - Duration::minutes(age_min)),
    }
}

fn seed_catalog() -> (Vec<Category>, Vec<Video>) {
    let music = category("Music", "Trending tracks and sessions", 50.0, false, 300);
    let cooking = category("Cooking", "Recipes and kitchen skills", 50.0, false, 240);
    let tech = category("Tech Reviews", "Gadgets and deep dives", 150.0, true, 180);

    let videos = vec![
        video(music.id, "Afrobeat Mix 2026", 2, 50.0, "https://youtu.be/dQw4w9WgXcQ", false, 170),
        video(music.id, "Gengetone Hits", 3, 50.0, "https://www.youtube.com/watch?v=9bZkp7q19f0", false, 160),
        video(music.id, "Studio Session Live", 5, 150.0, "https://www.youtube.com/embed/kJQP7kiw5Fk", true, 150),
        video(cooking.id, "Chapati From Scratch", 4, 50.0, "https://youtu.be/fJ9rUzIMcZQ", false, 140),
        video(cooking.id, "Nyama Choma Basics", 3, 50.0, "https://www.youtube.com/watch?v=OPf0YbXqDm0", false, 130),
        video(tech.id, "Flagship Phone Review", 6, 200.0, "https://youtu.be/kXYiU_JCYtU", true, 120),
    ];

    let mut categories = vec![music, cooking, tech];
    for c in &mut categories {
        c.video_count = videos
            .iter()
            .filter(|v| v.category_id == Some(c.id))
            .count() as i64;
    }
    (categories, videos)
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut rows = self.inner.read().await.categories.clone();
        rows.sort_by_key(|c| c.created_at);
        Ok(rows)
    }

    async fn videos(&self) -> Result<Vec<Video>, StoreError> {
        let mut rows = self.inner.read().await.videos.clone();
        rows.sort_by_key(|v| v.created_at);
        Ok(rows)
    }

    async fn insert_category(&self, draft: &CategoryDraft) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.categories.push(Category {
            id: Uuid::new_v4(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            thumbnail: draft.thumbnail.clone(),
            earn_per_video: draft.earn_per_video,
            total_views: draft.total_views.clone(),
            video_count: draft.video_count,
            premium: draft.premium,
            created_at: Some(Utc::now()),
        });
        Ok(())
    }

    async fn update_category(&self, id: Uuid, draft: &CategoryDraft) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let row = inner
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::MissingRow("categories"))?;
        row.title = draft.title.clone();
        row.description = draft.description.clone();
        row.thumbnail = draft.thumbnail.clone();
        row.earn_per_video = draft.earn_per_video;
        row.total_views = draft.total_views.clone();
        row.video_count = draft.video_count;
        row.premium = draft.premium;
        Ok(())
    }

    async fn delete_category_row(&self, id: Uuid) -> Result<(), StoreError> {
        self.inner.write().await.categories.retain(|c| c.id != id);
        Ok(())
    }

    async fn insert_video(&self, draft: &VideoDraft) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.videos.push(Video {
            id: Uuid::new_v4(),
            category_id: draft.category_id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            duration_minutes: draft.duration_minutes,
            duration: None,
            earn_amount: draft.earn_amount,
            video_url: draft.video_url.clone(),
            thumbnail: draft.thumbnail.clone(),
            premium: draft.premium,
            created_at: Some(Utc::now()),
        });
        Ok(())
    }

    async fn update_video(&self, id: Uuid, draft: &VideoDraft) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let row = inner
            .videos
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(StoreError::MissingRow("videos"))?;
        row.category_id = draft.category_id;
        row.title = draft.title.clone();
        row.description = draft.description.clone();
        row.duration_minutes = draft.duration_minutes;
        row.earn_amount = draft.earn_amount;
        row.video_url = draft.video_url.clone();
        row.thumbnail = draft.thumbnail.clone();
        row.premium = draft.premium;
        Ok(())
    }

    async fn delete_video(&self, id: Uuid) -> Result<(), StoreError> {
        self.inner.write().await.videos.retain(|v| v.id != id);
        Ok(())
    }

    async fn delete_videos_in_category(&self, category_id: Uuid) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .videos
            .retain(|v| v.category_id != Some(category_id));
        Ok(())
    }

    async fn profile(&self, user_id: Uuid) -> Result<Profile, StoreError> {
        self.inner
            .read()
            .await
            .profiles
            .iter()
            .find(|p| p.id == user_id)
            .cloned()
            .ok_or(StoreError::MissingRow("profiles"))
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.inner.write().await.profiles.push(profile.clone());
        Ok(())
    }

    async fn earnings_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<EarningsRecord>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .history
            .iter()
            .filter(|r| r.user_id == user_id && r.created_at >= since)
            .cloned()
            .collect())
    }

    async fn recent_earnings(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<EarningsRecord>, StoreError> {
        let inner = self.inner.read().await;
        let mut rows: Vec<EarningsRecord> = inner
            .history
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit);
        Ok(rows)
    }

    // Balance bump and history append happen under one write lock -- the
    // same all-or-nothing contract as the hosted procedure.
    async fn add_earnings_and_log(
        &self,
        amount: f64,
        description: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let user_id = self.user_id;
        let profile = inner
            .profiles
            .iter_mut()
            .find(|p| p.id == user_id)
            .ok_or(StoreError::MissingRow("profiles"))?;
        profile.earnings += amount;
        inner.history.push(EarningsRecord {
            id: Uuid::new_v4(),
            user_id,
            amount,
            activity_description: description.to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn commit_updates_balance_and_history_together() {
        let user = Uuid::new_v4();
        let store = MemoryStore::new(user);
        store.add_earnings_and_log(50.0, "Watched \"X\"").await.unwrap();
        let profile = store.profile(user).await.unwrap();
        assert_eq!(profile.earnings, 50.0);
        let recent = store.recent_earnings(user, 10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].amount, 50.0);
    }

    #[tokio::test]
    async fn missing_profile_is_reported() {
        let user = Uuid::new_v4();
        let store = MemoryStore::without_profile(user);
        let err = store.profile(user).await.unwrap_err();
        assert!(err.is_missing_row());
    }

    #[tokio::test]
    async fn seeded_catalog_is_ordered_by_created_at() {
        let store = MemoryStore::seeded(Uuid::new_v4());
        let categories = store.categories().await.unwrap();
        assert_eq!(categories.len(), 3);
        assert!(categories.windows(2).all(|w| w[0].created_at <= w[1].created_at));
        let videos = store.videos().await.unwrap();
        assert_eq!(videos.len(), 6);
    }
}
