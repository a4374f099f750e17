//! Category browsing, per-category video listings, and the tier page.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use uuid::Uuid;

use pesa_catalog::{gate, video_cards, videos_in_category, VideoCard, WatchDecision};
use pesa_core::{Category, Tier};
use pesa_earnings::load_profile;

use crate::routes::{fmt_ksh, html_escape, wrap};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/videos", get(categories_page))
        .route("/category/{id}", get(category_page))
        .route("/premium", get(premium_page))
}

async fn categories_page(State(state): State<Arc<AppState>>) -> Response {
    let Some(user) = state.current_user().await else {
        return Redirect::to("/login").into_response();
    };
    let notice = state.take_notice().await;

    let categories = match state.store.categories().await {
        Ok(c) => c,
        Err(err) => {
            tracing::error!(%err, "category listing failed");
            return error_page(&state, &user.name, "Videos", &err.to_string()).await;
        }
    };

    let grid: String = categories.iter().map(category_card).collect();
    let body = format!(
        r#"<h2 style="color:#ecfdf5;margin-bottom:1rem">Video Categories</h2>
        <div class="grid">{grid}</div>"#
    );
    wrap(
        "Videos",
        &body,
        Some(&user.name),
        notice.as_ref(),
        state.config.popup_interval_secs,
    )
    .into_response()
}

fn category_card(c: &Category) -> String {
    let premium_badge = if c.premium {
        r#"<span class="premium-badge">PREMIUM</span>"#
    } else {
        ""
    };
    format!(
        r#"<a href="/category/{id}" class="card" style="display:block">
        <div class="thumb">{thumb}{premium_badge}
        <span class="earn-badge">{earn} KSH / video</span></div>
        <div class="card-body"><h3>{title}</h3>
        <p style="color:#86a596;font-size:0.85rem">{desc}</p>
        <div class="meta"><span>{count} videos</span><span>{views} views</span></div>
        </div></a>"#,
        id = c.id,
        thumb = if c.thumbnail.is_empty() { "&#127916;" } else { c.thumbnail.as_str() },
        earn = c.earn_per_video,
        title = html_escape(&c.title),
        desc = html_escape(&c.description),
        count = c.video_count,
        views = html_escape(&c.total_views),
    )
}

async fn category_page(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    let Some(user) = state.current_user().await else {
        return Redirect::to("/login").into_response();
    };
    let notice = state.take_notice().await;
    let store = state.store.as_ref();

    let (categories, videos, profile) = match tokio::try_join!(
        store.categories(),
        store.videos(),
        load_profile(store, user.id),
    ) {
        Ok(v) => v,
        Err(err) => {
            tracing::error!(%err, "video listing failed");
            return error_page(&state, &user.name, "Videos", &err.to_string()).await;
        }
    };

    let Some(category) = categories.iter().find(|c| c.id == id) else {
        return error_page(&state, &user.name, "Videos", "Category not found").await;
    };

    let cards = video_cards(&categories, &videos);
    let listed = videos_in_category(&cards, id);
    let grid: String = listed.iter().map(|v| video_card(v, profile.tier)).collect();

    let body = format!(
        r#"<a href="/videos" style="font-size:0.85rem">&larr; All categories</a>
        <h2 style="color:#ecfdf5;margin:0.5rem 0 1rem">{title}</h2>
        <div class="grid">{grid}</div>"#,
        title = html_escape(&category.title),
    );
    wrap(
        &category.title,
        &body,
        Some(&user.name),
        notice.as_ref(),
        state.config.popup_interval_secs,
    )
    .into_response()
}

fn video_card(v: &VideoCard, tier: Tier) -> String {
    let locked = gate(v.premium, tier) == WatchDecision::UpgradeRequired;
    let premium_badge = if v.premium {
        r#"<span class="premium-badge">PREMIUM</span>"#
    } else {
        ""
    };
    let earn = match v.earn_amount {
        Some(a) => format!(r#"<span class="earn-badge">+{}</span>"#, fmt_ksh(a)),
        None => String::new(),
    };
    let action = if locked {
        r#"<a class="btn btn-outline" href="/premium" style="width:100%;display:block;text-align:center">&#128274; Upgrade to watch</a>"#.to_string()
    } else {
        format!(
            r#"<form method="POST" action="/watch/{id}"><button class="btn" style="width:100%">&#9654; Watch &amp; Earn</button></form>"#,
            id = v.id,
        )
    };
    format!(
        r#"<div class="card{locked_class}">
        <div class="thumb">{thumb}{premium_badge}{earn}</div>
        <div class="card-body"><h3>{title}</h3>
        <p style="color:#86a596;font-size:0.85rem">{desc}</p>
        <div class="meta"><span>{dur} min</span><span>{cat}</span></div>
        <div style="margin-top:0.75rem">{action}</div>
        </div></div>"#,
        locked_class = if locked { " locked" } else { "" },
        thumb = if v.thumbnail.is_empty() { "&#127909;" } else { v.thumbnail.as_str() },
        title = html_escape(&v.title),
        desc = html_escape(&v.description),
        dur = v.duration_min,
        cat = html_escape(&v.category_title),
    )
}

async fn premium_page(State(state): State<Arc<AppState>>) -> Response {
    let Some(user) = state.current_user().await else {
        return Redirect::to("/login").into_response();
    };
    let notice = state.take_notice().await;

    let current = load_profile(state.store.as_ref(), user.id)
        .await
        .map(|p| p.tier)
        .unwrap_or_default();

    let cards: String = Tier::ALL
        .iter()
        .map(|t| {
            let features: String = t
                .features()
                .iter()
                .map(|f| format!("<li>{f}</li>"))
                .collect();
            let price = match t.monthly_price_ksh() {
                0 => "Free".to_string(),
                p => format!("KSH {p} / month"),
            };
            let marker = if *t == current { " current" } else { "" };
            let note = if *t == current {
                r#"<div style="color:#34d399;font-size:0.8rem;margin-top:0.75rem">Your current plan</div>"#
            } else {
                ""
            };
            format!(
                r#"<div class="tier-card{marker}"><h3 style="color:#ecfdf5">{name}</h3>
                <div class="price">{price}</div>
                <div style="color:#86a596;font-size:0.85rem">Earn {earn} KSH per video</div>
                <ul>{features}</ul>{note}</div>"#,
                name = t.name(),
                earn = t.earn_per_video_ksh(),
            )
        })
        .collect();

    let body = format!(
        r#"<h2 style="color:#ecfdf5;margin-bottom:1rem">Membership Tiers</h2>
        <p style="color:#86a596;margin-bottom:1.5rem">Premium videos are available on the Elite and Premium plans.</p>
        <div style="display:grid;grid-template-columns:repeat(3,1fr);gap:1.25rem">{cards}</div>"#
    );
    wrap(
        "Premium",
        &body,
        Some(&user.name),
        notice.as_ref(),
        state.config.popup_interval_secs,
    )
    .into_response()
}

async fn error_page(state: &AppState, user_name: &str, title: &str, message: &str) -> Response {
    let body = format!(
        r#"<div class="notice error">{}</div>"#,
        html_escape(message)
    );
    wrap(
        title,
        &body,
        Some(user_name),
        None,
        state.config.popup_interval_secs,
    )
    .into_response()
}
