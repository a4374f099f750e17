//! Social-proof popup feed: randomly generated "X just earned Y" events.

use std::sync::Arc;

use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use rand::Rng;
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/popup", get(api_popup))
}

const NAMES: [&str; 12] = [
    "Brian O.", "Faith W.", "Kevin M.", "Cynthia A.", "Dennis K.", "Mercy N.",
    "Collins O.", "Esther M.", "Victor K.", "Sharon C.", "Kelvin O.", "Janet W.",
];

#[derive(Debug, Serialize)]
pub struct PopupEvent {
    pub name: &'static str,
    /// 1000 to 5000 KSH, in 50 KSH steps.
    pub amount: u32,
    pub minutes_ago: u32,
}

pub fn generate() -> PopupEvent {
    let mut rng = rand::thread_rng();
    PopupEvent {
        name: NAMES[rng.gen_range(0..NAMES.len())],
        amount: rng.gen_range(20..=100) * 50,
        minutes_ago: rng.gen_range(0..10),
    }
}

async fn api_popup() -> impl IntoResponse {
    Json(generate())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_stay_in_range() {
        for _ in 0..200 {
            let e = generate();
            assert!((1000..=5000).contains(&e.amount));
            assert_eq!(e.amount % 50, 0);
            assert!(e.minutes_ago < 10);
            assert!(NAMES.contains(&e.name));
        }
    }
}
