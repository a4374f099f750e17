//! Sign-in / sign-up pages over the hosted auth API.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use pesa_gateway::AuthSession;

use crate::routes::{html_escape, wrap};
use crate::state::{AppState, CurrentUser, NoticeKind};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login_page))
        .route("/login", post(sign_in))
        .route("/signup", post(sign_up))
        .route("/logout", post(sign_out))
}

fn login_body(error: Option<&str>) -> String {
    let error_html = match error {
        Some(msg) => format!(r#"<div class="notice error">{}</div>"#, html_escape(msg)),
        None => String::new(),
    };
    format!(
        r#"{error_html}
        <div style="display:grid;grid-template-columns:1fr 1fr;gap:1.5rem;max-width:760px;margin:2rem auto">
            <div class="card card-body">
                <h3>Sign in</h3>
                <form method="POST" action="/login">
                    <label>Email</label><input name="email" type="email" required>
                    <label>Password</label><input name="password" type="password" required>
                    <button class="btn" type="submit" style="margin-top:1rem;width:100%">Sign in</button>
                </form>
            </div>
            <div class="card card-body">
                <h3>Create account</h3>
                <form method="POST" action="/signup">
                    <label>Username</label><input name="username" required>
                    <label>Email</label><input name="email" type="email" required>
                    <label>Password</label><input name="password" type="password" minlength="6" required>
                    <button class="btn btn-outline" type="submit" style="margin-top:1rem;width:100%">Sign up</button>
                </form>
            </div>
        </div>"#
    )
}

async fn login_page(State(state): State<Arc<AppState>>) -> Response {
    if state.current_user().await.is_some() {
        return Redirect::to("/").into_response();
    }
    let notice = state.take_notice().await;
    wrap(
        "Sign in",
        &login_body(None),
        None,
        notice.as_ref(),
        state.config.popup_interval_secs,
    )
    .into_response()
}

#[derive(Deserialize)]
struct SignInForm {
    email: String,
    password: String,
}

async fn sign_in(State(state): State<Arc<AppState>>, Form(form): Form<SignInForm>) -> Response {
    let Some(auth) = state.auth.as_ref() else {
        // Demo mode has a permanent signed-in user.
        return Redirect::to("/").into_response();
    };
    match auth.sign_in(&form.email, &form.password).await {
        Ok(session) => establish(&state, session).await,
        Err(err) => {
            tracing::warn!(%err, "sign-in failed");
            wrap(
                "Sign in",
                &login_body(Some(&err.to_string())),
                None,
                None,
                state.config.popup_interval_secs,
            )
            .into_response()
        }
    }
}

#[derive(Deserialize)]
struct SignUpForm {
    username: String,
    email: String,
    password: String,
}

async fn sign_up(State(state): State<Arc<AppState>>, Form(form): Form<SignUpForm>) -> Response {
    let Some(auth) = state.auth.as_ref() else {
        return Redirect::to("/").into_response();
    };
    match auth
        .sign_up(&form.email, &form.password, &form.username)
        .await
    {
        Ok(session) if session.access_token.is_some() => establish(&state, session).await,
        Ok(_) => {
            // Email confirmation required before a session exists.
            state
                .set_notice(
                    NoticeKind::Success,
                    "Account created. Check your email to confirm, then sign in.",
                )
                .await;
            Redirect::to("/login").into_response()
        }
        Err(err) => {
            tracing::warn!(%err, "sign-up failed");
            wrap(
                "Sign in",
                &login_body(Some(&err.to_string())),
                None,
                None,
                state.config.popup_interval_secs,
            )
            .into_response()
        }
    }
}

/// Attach the session's token to the gateway and record the user.
async fn establish(state: &AppState, session: AuthSession) -> Response {
    let Some(token) = session.access_token else {
        return wrap(
            "Sign in",
            &login_body(Some("Signed in, but no session token was issued.")),
            None,
            None,
            state.config.popup_interval_secs,
        )
        .into_response();
    };
    // A session started under the previous identity must never commit under
    // the new one: kill it before the token or user changes hands.
    if let Some(active) = state.watch.write().await.take() {
        tracing::info!(video = %active.video_id, "discarding watch from previous sign-in");
        active.runner.cancel().await;
    }
    if let Some(rest) = state.supabase.as_ref() {
        rest.set_bearer(Some(token));
    }
    let name = session.user.display_name();
    tracing::info!(user = %session.user.id, "signed in");
    *state.user.write().await = Some(CurrentUser {
        id: session.user.id,
        name,
    });
    Redirect::to("/").into_response()
}

async fn sign_out(State(state): State<Arc<AppState>>) -> Redirect {
    if state.auth.is_none() {
        state
            .set_notice(NoticeKind::Success, "Demo mode stays signed in.")
            .await;
        return Redirect::to("/");
    }
    // Tear down in order: active session, token, user.
    if let Some(active) = state.watch.write().await.take() {
        active.runner.cancel().await;
    }
    if let Some(rest) = state.supabase.as_ref() {
        rest.set_bearer(None);
    }
    *state.user.write().await = None;
    Redirect::to("/login")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ActiveWatch;
    use async_trait::async_trait;
    use pesa_config::PesaConfig;
    use pesa_core::Video;
    use pesa_gateway::MemoryStore;
    use pesa_session::{RewardSession, SessionHooks, SessionRunner};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::sync::RwLock;
    use uuid::Uuid;

    #[derive(Default)]
    struct Recorder {
        completes: AtomicU32,
    }

    #[async_trait]
    impl SessionHooks for Recorder {
        async fn on_complete(&self, _amount: f64, _video_title: &str) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }
        async fn on_back(&self) {}
    }

    fn test_state(user: Uuid) -> Arc<AppState> {
        Arc::new(AppState {
            config: PesaConfig::default(),
            store: Arc::new(MemoryStore::new(user)),
            supabase: None,
            auth: None,
            user: RwLock::new(Some(CurrentUser {
                id: user,
                name: "first".to_string(),
            })),
            watch: RwLock::new(None),
            notice: RwLock::new(None),
        })
    }

    fn rewarded_video() -> Video {
        Video {
            id: Uuid::new_v4(),
            category_id: None,
            title: "Afrobeat Mix 2026".to_string(),
            description: String::new(),
            duration_minutes: Some(1),
            duration: None,
            earn_amount: Some(50.0),
            video_url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
            thumbnail: String::new(),
            premium: false,
            created_at: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sign_in_discards_the_previous_users_watch() {
        let first = Uuid::new_v4();
        let state = test_state(first);

        let hooks = Arc::new(Recorder::default());
        let session = RewardSession::start(rewarded_video()).unwrap();
        let runner = SessionRunner::spawn(
            session,
            hooks.clone() as Arc<dyn SessionHooks>,
            Duration::from_secs(5),
        );
        *state.watch.write().await = Some(ActiveWatch {
            video_id: Uuid::new_v4(),
            runner,
        });

        let incoming: AuthSession = serde_json::from_value(serde_json::json!({
            "access_token": "jwt",
            "user": {
                "id": Uuid::new_v4(),
                "email": "second@example.com",
                "user_metadata": { "username": "second" },
            },
        }))
        .unwrap();
        establish(&state, incoming).await;

        assert!(state.watch.read().await.is_none());
        let user = state.current_user().await.unwrap();
        assert_eq!(user.name, "second");

        // Well past the would-be completion: the old session must never fire.
        tokio::time::advance(Duration::from_secs(300)).await;
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        assert_eq!(hooks.completes.load(Ordering::SeqCst), 0);
    }
}
