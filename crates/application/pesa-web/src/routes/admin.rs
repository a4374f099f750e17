//! Admin console: category and video CRUD.
//!
//! Form fields arrive as strings and are parsed here; the actual validation
//! rules live in the catalog crate and run on every save.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;
use uuid::Uuid;

use pesa_catalog::{delete_category, delete_video, save_category, save_video, AdminError};
use pesa_core::{Category, Video};
use pesa_gateway::{CategoryDraft, VideoDraft};

use crate::routes::{html_escape, wrap};
use crate::state::{AppState, NoticeKind};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin", get(admin_page))
        .route("/admin/category", post(submit_category))
        .route("/admin/category/{id}/delete", post(remove_category))
        .route("/admin/video", post(submit_video))
        .route("/admin/video/{id}/delete", post(remove_video))
}

#[derive(Deserialize, Default)]
struct AdminQuery {
    edit_category: Option<Uuid>,
    edit_video: Option<Uuid>,
}

async fn admin_page(
    State(state): State<Arc<AppState>>,
    Query(q): Query<AdminQuery>,
) -> Response {
    let Some(user) = state.current_user().await else {
        return Redirect::to("/login").into_response();
    };
    let notice = state.take_notice().await;
    let store = state.store.as_ref();

    let (categories, videos) = match tokio::try_join!(store.categories(), store.videos()) {
        Ok(v) => v,
        Err(err) => {
            tracing::error!(%err, "admin listing failed");
            let body = format!(
                r#"<div class="notice error">Could not load catalog: {}</div>"#,
                html_escape(&err.to_string())
            );
            return wrap(
                "Admin",
                &body,
                Some(&user.name),
                notice.as_ref(),
                state.config.popup_interval_secs,
            )
            .into_response();
        }
    };

    let editing_category = q
        .edit_category
        .and_then(|id| categories.iter().find(|c| c.id == id));
    let editing_video = q.edit_video.and_then(|id| videos.iter().find(|v| v.id == id));

    let body = format!(
        r#"<h2 style="color:#ecfdf5;margin-bottom:1rem">Admin Console</h2>
        <div style="display:grid;grid-template-columns:1fr 1fr;gap:1.5rem">
            <div>
                <div class="card card-body" style="margin-bottom:1.5rem">{category_form}</div>
                <div class="card card-body">{category_table}</div>
            </div>
            <div>
                <div class="card card-body" style="margin-bottom:1.5rem">{video_form}</div>
                <div class="card card-body">{video_table}</div>
            </div>
        </div>"#,
        category_form = category_form_html(editing_category),
        category_table = category_table_html(&categories),
        video_form = video_form_html(editing_video, &categories),
        video_table = video_table_html(&videos, &categories),
    );

    wrap(
        "Admin",
        &body,
        Some(&user.name),
        notice.as_ref(),
        state.config.popup_interval_secs,
    )
    .into_response()
}

fn category_form_html(editing: Option<&Category>) -> String {
    let (heading, id, title, description, thumbnail, earn, premium) = match editing {
        Some(c) => (
            "Edit Category",
            c.id.to_string(),
            html_escape(&c.title),
            html_escape(&c.description),
            html_escape(&c.thumbnail),
            c.earn_per_video.to_string(),
            if c.premium { " checked" } else { "" },
        ),
        None => (
            "New Category",
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            "",
        ),
    };
    format!(
        r#"<h3>{heading}</h3>
        <form method="POST" action="/admin/category">
            <input type="hidden" name="id" value="{id}">
            <label>Title</label><input name="title" value="{title}" required>
            <label>Description</label><input name="description" value="{description}">
            <label>Thumbnail (emoji)</label><input name="thumbnail" value="{thumbnail}">
            <label>Earn per video (KSH)</label><input name="earn_per_video" type="number" step="0.01" value="{earn}">
            <label><input type="checkbox" name="premium" style="width:auto"{premium}> Premium category</label>
            <button class="btn" type="submit" style="margin-top:1rem">Save category</button>
        </form>"#
    )
}

fn category_table_html(categories: &[Category]) -> String {
    let rows: String = categories
        .iter()
        .map(|c| {
            format!(
                r#"<tr><td>{title}</td><td>{count}</td><td>{premium}</td>
                <td><a href="/admin?edit_category={id}">edit</a></td>
                <td><form method="POST" action="/admin/category/{id}/delete"
                    onsubmit="return confirm('Delete this category and all of its videos?')">
                    <button class="btn btn-danger" type="submit">delete</button></form></td></tr>"#,
                title = html_escape(&c.title),
                count = c.video_count,
                premium = if c.premium { "yes" } else { "" },
                id = c.id,
            )
        })
        .collect();
    format!(
        r#"<h3>Categories</h3>
        <table><thead><tr><th>Title</th><th>Videos</th><th>Premium</th><th></th><th></th></tr></thead>
        <tbody>{rows}</tbody></table>"#
    )
}

fn video_form_html(editing: Option<&Video>, categories: &[Category]) -> String {
    let (heading, id, title, description, url, duration, earn, premium, selected) = match editing {
        Some(v) => (
            "Edit Video",
            v.id.to_string(),
            html_escape(&v.title),
            html_escape(&v.description),
            html_escape(&v.video_url),
            v.duration_min().to_string(),
            v.earn_amount.map(|a| a.to_string()).unwrap_or_default(),
            if v.premium { " checked" } else { "" },
            v.category_id,
        ),
        None => (
            "New Video",
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            "",
            None,
        ),
    };
    let options: String = categories
        .iter()
        .map(|c| {
            format!(
                r#"<option value="{id}"{sel}>{title}</option>"#,
                id = c.id,
                sel = if selected == Some(c.id) { " selected" } else { "" },
                title = html_escape(&c.title),
            )
        })
        .collect();
    format!(
        r#"<h3>{heading}</h3>
        <form method="POST" action="/admin/video">
            <input type="hidden" name="id" value="{id}">
            <label>Title</label><input name="title" value="{title}" required>
            <label>Category</label><select name="category_id"><option value="">(none)</option>{options}</select>
            <label>Video URL</label><input name="video_url" value="{url}" required>
            <label>Description</label><input name="description" value="{description}">
            <label>Duration (minutes)</label><input name="duration_minutes" type="number" value="{duration}">
            <label>Earn amount (KSH)</label><input name="earn_amount" type="number" step="0.01" value="{earn}">
            <label><input type="checkbox" name="premium" style="width:auto"{premium}> Premium video</label>
            <button class="btn" type="submit" style="margin-top:1rem">Save video</button>
        </form>"#
    )
}

fn video_table_html(videos: &[Video], categories: &[Category]) -> String {
    let rows: String = videos
        .iter()
        .map(|v| {
            let category = v
                .category_id
                .and_then(|id| categories.iter().find(|c| c.id == id))
                .map(|c| html_escape(&c.title))
                .unwrap_or_default();
            format!(
                r#"<tr><td>{title}</td><td>{category}</td><td>{earn}</td>
                <td><a href="/admin?edit_video={id}">edit</a></td>
                <td><form method="POST" action="/admin/video/{id}/delete">
                    <button class="btn btn-danger" type="submit">delete</button></form></td></tr>"#,
                title = html_escape(&v.title),
                earn = v.earn_amount.unwrap_or(0.0),
                id = v.id,
            )
        })
        .collect();
    format!(
        r#"<h3>Videos</h3>
        <table><thead><tr><th>Title</th><th>Category</th><th>Earn</th><th></th><th></th></tr></thead>
        <tbody>{rows}</tbody></table>"#
    )
}

#[derive(Deserialize)]
struct CategoryForm {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    thumbnail: String,
    #[serde(default)]
    earn_per_video: String,
    #[serde(default)]
    premium: Option<String>,
}

async fn submit_category(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CategoryForm>,
) -> Response {
    if state.current_user().await.is_none() {
        return Redirect::to("/login").into_response();
    }
    let id = parse_optional_id(&form.id);
    let draft = CategoryDraft {
        title: form.title,
        description: form.description,
        thumbnail: form.thumbnail,
        earn_per_video: form.earn_per_video.trim().parse().unwrap_or(0.0),
        premium: form.premium.is_some(),
        ..CategoryDraft::default()
    };
    apply(&state, save_category(state.store.as_ref(), id, &draft).await, "Category saved.").await
}

async fn remove_category(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    if state.current_user().await.is_none() {
        return Redirect::to("/login").into_response();
    }
    apply(
        &state,
        delete_category(state.store.as_ref(), id).await,
        "Category and its videos deleted.",
    )
    .await
}

#[derive(Deserialize)]
struct VideoForm {
    id: String,
    title: String,
    #[serde(default)]
    category_id: String,
    video_url: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    duration_minutes: String,
    #[serde(default)]
    earn_amount: String,
    #[serde(default)]
    premium: Option<String>,
}

async fn submit_video(State(state): State<Arc<AppState>>, Form(form): Form<VideoForm>) -> Response {
    if state.current_user().await.is_none() {
        return Redirect::to("/login").into_response();
    }
    let id = parse_optional_id(&form.id);
    let draft = VideoDraft {
        category_id: parse_optional_id(&form.category_id),
        title: form.title,
        description: form.description,
        duration_minutes: form.duration_minutes.trim().parse().ok(),
        earn_amount: form.earn_amount.trim().parse().ok(),
        video_url: form.video_url,
        premium: form.premium.is_some(),
        ..VideoDraft::default()
    };
    apply(&state, save_video(state.store.as_ref(), id, &draft).await, "Video saved.").await
}

async fn remove_video(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    if state.current_user().await.is_none() {
        return Redirect::to("/login").into_response();
    }
    apply(
        &state,
        delete_video(state.store.as_ref(), id).await,
        "Video deleted.",
    )
    .await
}

fn parse_optional_id(raw: &str) -> Option<Uuid> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        trimmed.parse().ok()
    }
}

async fn apply(state: &AppState, result: Result<(), AdminError>, success: &str) -> Response {
    match result {
        Ok(()) => state.set_notice(NoticeKind::Success, success).await,
        Err(err) => {
            tracing::warn!(%err, "admin operation failed");
            state.set_notice(NoticeKind::Error, err.to_string()).await;
        }
    }
    Redirect::to("/admin").into_response()
}
