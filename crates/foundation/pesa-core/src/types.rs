//! Row types for the hosted store.
//!
//! Field names match the backend columns (snake_case) so these deserialize
//! straight out of the REST layer. Older video rows carry `duration` instead
//! of `duration_minutes`; accessors paper over that.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tier::Tier;

/// A video category row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: String,
    /// Advertised per-video earn amount in KSH.
    #[serde(default)]
    pub earn_per_video: f64,
    /// Display string ("18.7K"), not a counter we maintain.
    #[serde(default)]
    pub total_views: String,
    #[serde(default)]
    pub video_count: i64,
    #[serde(default)]
    pub premium: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A watchable video row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: Uuid,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Duration in whole minutes. Newer rows.
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    /// Duration in whole minutes. Legacy column.
    #[serde(default)]
    pub duration: Option<u32>,
    /// Reward in KSH. Absent or non-positive means the video pays nothing.
    #[serde(default)]
    pub earn_amount: Option<f64>,
    #[serde(default)]
    pub video_url: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub premium: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Video {
    /// Watch duration in minutes, never below 1.
    pub fn duration_min(&self) -> u32 {
        self.duration_minutes.or(self.duration).unwrap_or(1).max(1)
    }

    /// The earnable amount, if there is a valid one. `None` for absent,
    /// non-finite, or non-positive amounts -- those must never reach the
    /// commit path.
    pub fn reward(&self) -> Option<f64> {
        match self.earn_amount {
            Some(a) if a.is_finite() && a > 0.0 => Some(a),
            _ => None,
        }
    }
}

/// A user profile row. Earnings are mutated only through the atomic
/// `add_earnings_and_log` procedure, never by client-side arithmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(default)]
    pub earnings: f64,
    #[serde(default)]
    pub tier: Tier,
}

impl Profile {
    /// A fresh profile for a first-time user.
    pub fn new_default(user_id: Uuid) -> Self {
        Profile {
            id: user_id,
            earnings: 0.0,
            tier: Tier::Basic,
        }
    }
}

/// One append-only earnings history row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarningsRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: f64,
    #[serde(default)]
    pub activity_description: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(earn: Option<f64>) -> Video {
        Video {
            id: Uuid::new_v4(),
            category_id: None,
            title: "t".to_string(),
            description: String::new(),
            duration_minutes: None,
            duration: None,
            earn_amount: earn,
            video_url: String::new(),
            thumbnail: String::new(),
            premium: false,
            created_at: None,
        }
    }

    #[test]
    fn duration_prefers_new_column() {
        let mut v = video(None);
        v.duration_minutes = Some(3);
        v.duration = Some(7);
        assert_eq!(v.duration_min(), 3);
    }

    #[test]
    fn duration_falls_back_to_legacy_then_one() {
        let mut v = video(None);
        v.duration = Some(5);
        assert_eq!(v.duration_min(), 5);
        v.duration = None;
        assert_eq!(v.duration_min(), 1);
        v.duration = Some(0);
        assert_eq!(v.duration_min(), 1);
    }

    #[test]
    fn reward_filters_invalid_amounts() {
        assert_eq!(video(Some(50.0)).reward(), Some(50.0));
        assert_eq!(video(Some(0.0)).reward(), None);
        assert_eq!(video(Some(-10.0)).reward(), None);
        assert_eq!(video(Some(f64::NAN)).reward(), None);
        assert_eq!(video(None).reward(), None);
    }

    #[test]
    fn video_row_deserializes_legacy_duration() {
        let v: Video = serde_json::from_str(
            r#"{"id":"4f5e8a33-58a0-4c35-8b7e-111111111111","title":"Intro","duration":4,"earn_amount":25}"#,
        )
        .unwrap();
        assert_eq!(v.duration_min(), 4);
        assert_eq!(v.reward(), Some(25.0));
    }

    #[test]
    fn profile_row_tolerates_unknown_tier() {
        let p: Profile = serde_json::from_str(
            r#"{"id":"4f5e8a33-58a0-4c35-8b7e-111111111111","earnings":120.0,"tier":"Diamond"}"#,
        )
        .unwrap();
        assert_eq!(p.tier, Tier::Basic);
        assert_eq!(p.earnings, 120.0);
    }
}
