//! View-models over raw catalog rows.

use serde::Serialize;
use uuid::Uuid;

use pesa_core::{Category, Tier, Video};

/// A video shaped for display: category title joined in, duration fallback
/// applied.
#[derive(Debug, Clone, Serialize)]
pub struct VideoCard {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub category_title: String,
    pub title: String,
    pub description: String,
    pub duration_min: u32,
    pub earn_amount: Option<f64>,
    pub video_url: String,
    pub thumbnail: String,
    pub premium: bool,
}

/// Map rows into cards, joining each video to its category title.
pub fn video_cards(categories: &[Category], videos: &[Video]) -> Vec<VideoCard> {
    videos
        .iter()
        .map(|v| {
            let category_title = v
                .category_id
                .and_then(|id| categories.iter().find(|c| c.id == id))
                .map(|c| c.title.clone())
                .unwrap_or_default();
            VideoCard {
                id: v.id,
                category_id: v.category_id,
                category_title,
                title: v.title.clone(),
                description: v.description.clone(),
                duration_min: v.duration_min(),
                earn_amount: v.reward(),
                video_url: v.video_url.clone(),
                thumbnail: v.thumbnail.clone(),
                premium: v.premium,
            }
        })
        .collect()
}

/// Cards for one category, non-premium first. The sort is stable, so within
/// each group the backend's created_at order is preserved.
pub fn videos_in_category(cards: &[VideoCard], category_id: Uuid) -> Vec<VideoCard> {
    let mut filtered: Vec<VideoCard> = cards
        .iter()
        .filter(|c| c.category_id == Some(category_id))
        .cloned()
        .collect();
    filtered.sort_by_key(|c| c.premium);
    filtered
}

/// Outcome of a Basic/Elite/Premium gate check on one video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchDecision {
    /// Start a reward session.
    Play,
    /// Premium video, insufficient tier: show the upgrade prompt instead.
    UpgradeRequired,
}

pub fn gate(premium: bool, tier: Tier) -> WatchDecision {
    if premium && !tier.can_watch_premium() {
        WatchDecision::UpgradeRequired
    } else {
        WatchDecision::Play
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn category(title: &str) -> Category {
        Category {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            thumbnail: String::new(),
            earn_per_video: 50.0,
            total_views: String::new(),
            video_count: 0,
            premium: false,
            created_at: Some(Utc::now()),
        }
    }

    fn video(category_id: Option<Uuid>, title: &str, premium: bool) -> Video {
        Video {
            id: Uuid::new_v4(),
            category_id,
            title: title.to_string(),
            description: String::new(),
            duration_minutes: None,
            duration: Some(2),
            earn_amount: Some(50.0),
            video_url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
            thumbnail: String::new(),
            premium,
            created_at: Some(Utc::now()),
        }
    }

    #[test]
    fn cards_join_category_titles() {
        let cat = category("Music");
        let cards = video_cards(
            std::slice::from_ref(&cat),
            &[video(Some(cat.id), "A", false), video(None, "B", false)],
        );
        assert_eq!(cards[0].category_title, "Music");
        assert_eq!(cards[1].category_title, "");
        assert_eq!(cards[0].duration_min, 2);
    }

    #[test]
    fn category_listing_puts_premium_last_stably() {
        let cat = category("Music");
        let videos = vec![
            video(Some(cat.id), "p1", true),
            video(Some(cat.id), "a", false),
            video(Some(cat.id), "p2", true),
            video(Some(cat.id), "b", false),
        ];
        let cards = video_cards(std::slice::from_ref(&cat), &videos);
        let listed = videos_in_category(&cards, cat.id);
        let titles: Vec<&str> = listed.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "p1", "p2"]);
    }

    #[test]
    fn listing_filters_by_category() {
        let cat = category("Music");
        let other = category("Cooking");
        let videos = vec![
            video(Some(cat.id), "a", false),
            video(Some(other.id), "x", false),
        ];
        let cards = video_cards(&[cat.clone(), other], &videos);
        let listed = videos_in_category(&cards, cat.id);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "a");
    }

    #[test]
    fn premium_gate_by_tier() {
        assert_eq!(gate(true, Tier::Basic), WatchDecision::UpgradeRequired);
        assert_eq!(gate(true, Tier::Elite), WatchDecision::Play);
        assert_eq!(gate(true, Tier::Premium), WatchDecision::Play);
        assert_eq!(gate(false, Tier::Basic), WatchDecision::Play);
    }
}
