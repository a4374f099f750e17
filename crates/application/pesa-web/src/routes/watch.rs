//! The watch flow: start a reward session, poll it, leave it.
//!
//! One session at a time. Starting a new watch drops the previous runner,
//! which aborts its tick task, so an abandoned session can never pay out.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::json;
use uuid::Uuid;

use pesa_catalog::{gate, WatchDecision};
use pesa_earnings::{commit_reward, load_profile};
use pesa_session::{RewardSession, SessionHooks, SessionRunner, SessionState};

use crate::routes::{fmt_ksh, html_escape, wrap};
use crate::state::{ActiveWatch, AppState, NoticeKind};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/watch/{id}", post(start_watch))
        .route("/watch", get(watch_page))
        .route("/watch/back", post(back_to_videos))
        .route("/api/watch/state", get(watch_state))
}

/// Bridges session completion to the earnings commit. The outcome lands in
/// the notice slot and is shown on the next page the user loads.
struct CommitHooks {
    state: Arc<AppState>,
}

#[async_trait]
impl SessionHooks for CommitHooks {
    async fn on_complete(&self, amount: f64, video_title: &str) {
        let Some(user) = self.state.current_user().await else {
            return;
        };
        match commit_reward(self.state.store.as_ref(), user.id, amount, video_title).await {
            Ok(profile) => {
                self.state
                    .set_notice(
                        NoticeKind::Success,
                        format!(
                            "You earned {}! New balance: {}",
                            fmt_ksh(amount),
                            fmt_ksh(profile.earnings)
                        ),
                    )
                    .await;
            }
            Err(err) => {
                tracing::error!(%err, "earnings commit failed");
                self.state
                    .set_notice(
                        NoticeKind::Error,
                        format!("Could not save your earnings: {err}"),
                    )
                    .await;
            }
        }
    }

    async fn on_back(&self) {
        tracing::debug!("session reached its end");
    }
}

async fn start_watch(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    let Some(user) = state.current_user().await else {
        return Redirect::to("/login").into_response();
    };
    let store = state.store.as_ref();

    let videos = match store.videos().await {
        Ok(v) => v,
        Err(err) => {
            state
                .set_notice(NoticeKind::Error, format!("Could not load video: {err}"))
                .await;
            return Redirect::to("/videos").into_response();
        }
    };
    let Some(video) = videos.into_iter().find(|v| v.id == id) else {
        state
            .set_notice(NoticeKind::Error, "That video no longer exists.")
            .await;
        return Redirect::to("/videos").into_response();
    };

    // The tier gate is enforced here, not only in the listing markup.
    let tier = load_profile(store, user.id)
        .await
        .map(|p| p.tier)
        .unwrap_or_default();
    if gate(video.premium, tier) == WatchDecision::UpgradeRequired {
        return Redirect::to("/premium").into_response();
    }

    let session = match RewardSession::start(video) {
        Ok(s) => s,
        Err(err) => {
            tracing::warn!(%err, "refusing to start session");
            state
                .set_notice(
                    NoticeKind::Error,
                    "This video cannot be played: its source link is invalid.",
                )
                .await;
            return Redirect::to("/videos").into_response();
        }
    };

    let hooks = Arc::new(CommitHooks {
        state: Arc::clone(&state),
    });
    let runner = SessionRunner::spawn(
        session,
        hooks,
        Duration::from_secs(state.config.celebration_secs),
    );
    *state.watch.write().await = Some(ActiveWatch {
        video_id: id,
        runner,
    });

    Redirect::to("/watch").into_response()
}

const WATCH_SCRIPT: &str = r#"<script>
const poll = setInterval(async () => {
    try {
        const r = await fetch('/api/watch/state');
        if (!r.ok) { clearInterval(poll); window.location = '/videos'; return; }
        const s = await r.json();
        document.getElementById('clock').textContent = s.clock;
        document.getElementById('bar').style.width = s.progress_percent + '%';
        if (s.state === 'celebrating') {
            document.getElementById('celebration').style.display = 'flex';
        }
        if (s.state === 'closed') { clearInterval(poll); window.location = '/'; }
    } catch (e) {}
}, 1000);
</script>"#;

async fn watch_page(State(state): State<Arc<AppState>>) -> Response {
    let Some(user) = state.current_user().await else {
        return Redirect::to("/login").into_response();
    };
    let snap = {
        let watch = state.watch.read().await;
        let Some(active) = watch.as_ref() else {
            return Redirect::to("/videos").into_response();
        };
        active.runner.snapshot().await
    };
    // A runner that already ran to its end is spent; free the slot instead
    // of rendering a dead player.
    if snap.state == SessionState::Closed {
        state.watch.write().await.take();
        return Redirect::to("/").into_response();
    }

    let reward_line = match snap.earn_amount {
        Some(a) => format!(
            r#"<span class="earn-badge" style="position:static">Watch to the end to earn +{}</span>"#,
            fmt_ksh(a)
        ),
        None => String::new(),
    };
    let celebration_amount = snap.earn_amount.map(fmt_ksh).unwrap_or_default();

    let mut body = format!(
        r#"<h2 style="color:#ecfdf5;margin-bottom:0.75rem">{title}</h2>
        <iframe class="player" src="https://www.youtube.com/embed/{embed}?autoplay=1" frameborder="0" allow="autoplay; encrypted-media" allowfullscreen></iframe>
        <div class="progress-track"><div id="bar" class="progress-fill" style="width:{progress}%"></div></div>
        <div style="display:flex;justify-content:space-between;align-items:center">
            <span id="clock" style="color:#86a596">{clock}</span>
            {reward_line}
            <form method="POST" action="/watch/back"><button class="btn btn-outline" type="submit">&larr; Back to videos</button></form>
        </div>
        <div id="celebration" class="overlay">
            <h2>&#127881; Congratulations!</h2>
            <p>You earned {celebration_amount}</p>
        </div>"#,
        title = html_escape(&snap.title),
        embed = snap.embed_id,
        progress = snap.progress_percent,
        clock = snap.clock,
    );
    body.push_str(WATCH_SCRIPT);

    wrap(
        "Watching",
        &body,
        Some(&user.name),
        None,
        state.config.popup_interval_secs,
    )
    .into_response()
}

async fn watch_state(State(state): State<Arc<AppState>>) -> Response {
    let snap = {
        let watch = state.watch.read().await;
        match watch.as_ref() {
            Some(active) => active.runner.snapshot().await,
            None => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": "no active session" })),
                )
                    .into_response();
            }
        }
    };
    // Report the closed state once, then free the slot; the next poll 404s
    // and the player script leaves the page.
    if snap.state == SessionState::Closed {
        state.watch.write().await.take();
    }
    Json(snap).into_response()
}

/// Back while watching: abort the ticker and discard the session. Nothing
/// is committed, even one second short of completion.
async fn back_to_videos(State(state): State<Arc<AppState>>) -> Redirect {
    if let Some(active) = state.watch.write().await.take() {
        tracing::info!(video = %active.video_id, "watch abandoned");
        active.runner.cancel().await;
    }
    Redirect::to("/videos")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CurrentUser;
    use pesa_config::PesaConfig;
    use pesa_core::Video;
    use pesa_gateway::MemoryStore;
    use tokio::sync::RwLock;

    fn test_state(user: Uuid) -> Arc<AppState> {
        Arc::new(AppState {
            config: PesaConfig::default(),
            store: Arc::new(MemoryStore::new(user)),
            supabase: None,
            auth: None,
            user: RwLock::new(Some(CurrentUser {
                id: user,
                name: "demo".to_string(),
            })),
            watch: RwLock::new(None),
            notice: RwLock::new(None),
        })
    }

    fn unrewarded_video() -> Video {
        Video {
            id: Uuid::new_v4(),
            category_id: None,
            title: "Nairobi Street Food Tour".to_string(),
            description: String::new(),
            duration_minutes: Some(1),
            duration: None,
            earn_amount: Some(0.0),
            video_url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
            thumbnail: String::new(),
            premium: false,
            created_at: None,
        }
    }

    async fn park_finished_session(state: &Arc<AppState>) {
        let session = RewardSession::start(unrewarded_video()).unwrap();
        let hooks = Arc::new(CommitHooks {
            state: Arc::clone(state),
        });
        let runner = SessionRunner::spawn(session, hooks, Duration::from_secs(5));
        *state.watch.write().await = Some(ActiveWatch {
            video_id: Uuid::new_v4(),
            runner,
        });
        // Run the session all the way to Closed while it sits in the slot.
        tokio::time::advance(Duration::from_secs(120)).await;
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn watch_page_frees_a_finished_session_and_goes_home() {
        let state = test_state(Uuid::new_v4());
        park_finished_session(&state).await;

        let resp = watch_page(State(Arc::clone(&state))).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()["location"], "/");
        assert!(state.watch.read().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn watch_state_reports_closed_once_then_frees_the_slot() {
        let state = test_state(Uuid::new_v4());
        park_finished_session(&state).await;

        let resp = watch_state(State(Arc::clone(&state))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(state.watch.read().await.is_none());

        let resp = watch_state(State(Arc::clone(&state))).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
