//! Profile fetch and history aggregation.

use chrono::{DateTime, Datelike, Duration, Local, LocalResult, TimeZone, Utc};
use serde::Serialize;
use uuid::Uuid;

use pesa_core::{EarningsRecord, Profile, StoreError};
use pesa_gateway::DataStore;

/// Fetch the user's profile. A first-time user has no row yet; insert the
/// default (earnings 0, tier Basic) and fetch again.
pub async fn load_profile(store: &dyn DataStore, user_id: Uuid) -> Result<Profile, StoreError> {
    match store.profile(user_id).await {
        Ok(profile) => Ok(profile),
        Err(err) if err.is_missing_row() => {
            tracing::info!(%user_id, "profile row missing, inserting default");
            store.insert_profile(&Profile::new_default(user_id)).await?;
            store.profile(user_id).await
        }
        Err(err) => Err(err),
    }
}

/// Sum of history amounts since local midnight.
pub async fn today_earnings(store: &dyn DataStore, user_id: Uuid) -> Result<f64, StoreError> {
    let rows = store.earnings_since(user_id, start_of_local_day()).await?;
    Ok(rows.iter().map(|r| r.amount).sum())
}

/// Most recent history rows, newest first.
pub async fn recent_activity(
    store: &dyn DataStore,
    user_id: Uuid,
) -> Result<Vec<EarningsRecord>, StoreError> {
    store.recent_earnings(user_id, 10).await
}

/// One bar of the weekly chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayEarnings {
    /// Short weekday name ("Mon").
    pub day: &'static str,
    pub earnings: f64,
}

/// Per-day totals for the last 7 days, oldest first (today is the last
/// entry). Days with no activity appear with 0.
pub async fn weekly_summary(
    store: &dyn DataStore,
    user_id: Uuid,
) -> Result<Vec<DayEarnings>, StoreError> {
    let week_ago = start_of_local_day() - Duration::days(6);
    let rows = store.earnings_since(user_id, week_ago).await?;
    Ok(group_by_day(&rows, Local::now().with_timezone(&Utc)))
}

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

fn weekday_name(at: DateTime<Utc>) -> &'static str {
    WEEKDAYS[at.with_timezone(&Local).weekday().num_days_from_sunday() as usize]
}

/// Group rows into the 7 calendar days ending at `now`.
pub fn group_by_day(rows: &[EarningsRecord], now: DateTime<Utc>) -> Vec<DayEarnings> {
    (0..7)
        .map(|i| {
            let at = now - Duration::days(6 - i);
            let day = weekday_name(at);
            let earnings = rows
                .iter()
                .filter(|r| weekday_name(r.created_at) == day)
                .map(|r| r.amount)
                .sum();
            DayEarnings { day, earnings }
        })
        .collect()
}

/// Local midnight as a UTC instant, for "today's earnings" queries.
pub fn start_of_local_day() -> DateTime<Utc> {
    let now = Local::now();
    let midnight = now.date_naive().and_hms_opt(0, 0, 0).unwrap_or(now.naive_local());
    match Local.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        // DST gap at midnight: fall back to now, a strictly later bound.
        LocalResult::None => now.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pesa_gateway::{DataStore, MemoryStore};

    #[tokio::test]
    async fn load_profile_bootstraps_first_login() {
        let user = Uuid::new_v4();
        let store = MemoryStore::without_profile(user);
        let profile = load_profile(&store, user).await.unwrap();
        assert_eq!(profile.id, user);
        assert_eq!(profile.earnings, 0.0);
        assert_eq!(profile.tier, pesa_core::Tier::Basic);
        // Row persists after the bootstrap insert.
        assert!(store.profile(user).await.is_ok());
    }

    #[tokio::test]
    async fn today_sums_only_todays_rows() {
        let user = Uuid::new_v4();
        let store = MemoryStore::new(user);
        store.add_earnings_and_log(50.0, "Watched \"A\"").await.unwrap();
        store.add_earnings_and_log(25.0, "Watched \"B\"").await.unwrap();
        let today = today_earnings(&store, user).await.unwrap();
        assert_eq!(today, 75.0);
    }

    #[tokio::test]
    async fn recent_activity_is_newest_first_capped_at_ten() {
        let user = Uuid::new_v4();
        let store = MemoryStore::new(user);
        for i in 0..12 {
            store
                .add_earnings_and_log(10.0, &format!("Watched \"{i}\""))
                .await
                .unwrap();
        }
        let recent = recent_activity(&store, user).await.unwrap();
        assert_eq!(recent.len(), 10);
        assert!(recent.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn group_by_day_fills_empty_days() {
        let user = Uuid::new_v4();
        let now = Utc::now();
        let rows = vec![
            EarningsRecord {
                id: Uuid::new_v4(),
                user_id: user,
                amount: 50.0,
                activity_description: String::new(),
                created_at: now,
            },
            EarningsRecord {
                id: Uuid::new_v4(),
                user_id: user,
                amount: 30.0,
                activity_description: String::new(),
                created_at: now - Duration::days(2),
            },
        ];
        let days = group_by_day(&rows, now);
        assert_eq!(days.len(), 7);
        assert_eq!(days[6].earnings, 50.0);
        assert_eq!(days[4].earnings, 30.0);
        assert_eq!(days.iter().map(|d| d.earnings).sum::<f64>(), 80.0);
    }
}
