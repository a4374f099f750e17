//! Earnings dashboard: balance cards, weekly chart, recent activity.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;

use pesa_core::{EarningsRecord, StoreError};
use pesa_earnings::{load_profile, recent_activity, today_earnings, weekly_summary, DayEarnings};

use crate::routes::{fmt_ksh, html_escape, wrap};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(dashboard))
}

async fn dashboard(State(state): State<Arc<AppState>>) -> Response {
    let Some(user) = state.current_user().await else {
        return Redirect::to("/login").into_response();
    };
    let notice = state.take_notice().await;

    let store = state.store.as_ref();
    let data: Result<_, StoreError> = async {
        let profile = load_profile(store, user.id).await?;
        let today = today_earnings(store, user.id).await?;
        let week = weekly_summary(store, user.id).await?;
        let recent = recent_activity(store, user.id).await?;
        Ok((profile, today, week, recent))
    }
    .await;

    let (profile, today, week, recent) = match data {
        Ok(d) => d,
        Err(err) => {
            tracing::error!(%err, "dashboard load failed");
            let body = format!(
                r#"<div class="notice error">Could not load your dashboard: {}</div>"#,
                html_escape(&err.to_string())
            );
            return wrap(
                "Dashboard",
                &body,
                Some(&user.name),
                notice.as_ref(),
                state.config.popup_interval_secs,
            )
            .into_response();
        }
    };

    let body = format!(
        r#"<div class="stats-row">
            <div class="stat-card"><div class="number">{total}</div><div class="label">Total Earnings</div></div>
            <div class="stat-card"><div class="number">{today}</div><div class="label">Earned Today</div></div>
            <div class="stat-card"><div class="number">{tier}</div><div class="label">Membership &middot; {per_video} KSH per video</div></div>
        </div>
        <div style="display:grid;grid-template-columns:3fr 2fr;gap:1.5rem">
            <div class="card card-body">
                <h3>This Week</h3>
                {chart}
            </div>
            <div class="card card-body">
                <h3>Recent Activity</h3>
                {recent}
            </div>
        </div>
        <div style="margin-top:1.5rem;display:flex;gap:0.75rem">
            <a class="btn" href="/videos">Watch videos</a>
            <a class="btn btn-outline" href="/withdraw">Withdraw earnings</a>
        </div>"#,
        total = fmt_ksh(profile.earnings),
        today = fmt_ksh(today),
        tier = profile.tier.name(),
        per_video = profile.tier.earn_per_video_ksh(),
        chart = chart_html(&week),
        recent = recent_html(&recent),
    );

    wrap(
        "Dashboard",
        &body,
        Some(&user.name),
        notice.as_ref(),
        state.config.popup_interval_secs,
    )
    .into_response()
}

fn chart_html(week: &[DayEarnings]) -> String {
    let max = week.iter().map(|d| d.earnings).fold(0.0_f64, f64::max);
    let bars: String = week
        .iter()
        .map(|d| {
            let height = if max > 0.0 {
                (d.earnings / max * 100.0).round()
            } else {
                0.0
            };
            format!(
                r#"<div style="flex:1;display:flex;flex-direction:column;justify-content:flex-end">
                <div class="bar" style="height:{height}%" title="{amount}"></div>
                <div class="day">{day}</div></div>"#,
                amount = fmt_ksh(d.earnings),
                day = d.day,
            )
        })
        .collect();
    format!(r#"<div class="bar-chart">{bars}</div>"#)
}

fn recent_html(recent: &[EarningsRecord]) -> String {
    if recent.is_empty() {
        return r#"<p style="color:#6b8578;margin-top:0.75rem">Nothing yet. Watch a video to start earning.</p>"#.to_string();
    }
    recent
        .iter()
        .map(|r| {
            format!(
                r#"<div class="activity"><div>{desc}<div class="when">{when}</div></div>
                <span class="amount">+{amount}</span></div>"#,
                desc = html_escape(&r.activity_description),
                when = r.created_at.format("%b %e, %H:%M"),
                amount = fmt_ksh(r.amount),
            )
        })
        .collect()
}
